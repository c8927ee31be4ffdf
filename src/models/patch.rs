// src/models/patch.rs

use serde::{Deserialize, Serialize};

/// Criticality bucket of a patch, derived from the raw `Critical` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CriticalKind {
	Security,
	Critical,
	Standard,
}

impl CriticalKind {
	/// Case-insensitive: `"security"` and `"true"` are the only recognized values.
	pub fn classify(raw: &str) -> Self {
		let lowered = raw.to_lowercase();
		match lowered.as_str() {
			"security" => CriticalKind::Security,
			"true" => CriticalKind::Critical,
			_ => CriticalKind::Standard,
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			CriticalKind::Security => "security",
			CriticalKind::Critical => "critical",
			CriticalKind::Standard => "standard",
		}
	}

	pub fn label(&self) -> &'static str {
		match self {
			CriticalKind::Security => "Security",
			CriticalKind::Critical => "Critical",
			CriticalKind::Standard => "Standard",
		}
	}
}

impl std::fmt::Display for CriticalKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.label())
	}
}

/// A downloadable file attached to a patch. Every field is derived from `url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchFile {
	pub url: String,
	pub filename: String,
	pub ext: String,
	/// Best-effort guess, empty when nothing plausible was found.
	pub file_version: String,
}

/// The flattened, normalized unit of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchRow {
	pub name: String,
	pub qfe_id: String,
	/// Group-level version label, authoritative for grouping and filtering.
	pub version: String,
	pub products_raw: String,
	pub products_tokens: Vec<String>,
	pub products_display: String,
	pub platform_raw: String,
	pub platform_tokens: Vec<String>,
	pub release_date_text: String,
	/// Epoch millis at UTC midnight, `0` when the date is unknown or unparseable.
	pub release_date_ms: i64,
	pub critical_kind: CriticalKind,
	pub critical_label: String,
	pub patch_page_url: String,
	pub files: Vec<PatchFile>,
	pub types: Vec<String>,
	pub md5: Vec<String>,
	pub sha256: Vec<String>,
	pub search_blob: String,
}

impl PatchRow {
	pub fn has_release_date(&self) -> bool {
		self.release_date_ms != 0
	}
}
