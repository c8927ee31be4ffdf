// src/utils/file_info.rs

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;

use crate::models::patch::PatchFile;
use crate::utils::version::{SortDirection, VersionComparator};

lazy_static! {
	/// `10.9.1`, `11_4`, `9-2-0` and similar, bounded by non-digits.
	static ref SEPARATED_VERSION: Regex =
		Regex::new(r"(?:^|[^0-9])(9|10|11|12)[._-]([0-9]{1,2})(?:[._-]([0-9]{1,2}))?(?:[^0-9]|$)").unwrap();
	/// Compact digit run following an `arcgis` prefix, e.g. `ArcGIS-Server-1091`.
	static ref ARCGIS_COMPACT: Regex =
		Regex::new(r"(?i)arcgis(?:[._-]?[a-z]+)*[._-]?([0-9]{2,4})(?:[^0-9]|$)").unwrap();
}

/// Builds the derived file record for one download URL.
pub fn derive_file(url: &str, comparator: &VersionComparator) -> PatchFile {
	let url = url.trim();
	let filename = filename_from_url(url);
	let ext = extension_of(&filename);
	let file_version = infer_file_version(url, &filename, comparator).unwrap_or_default();

	PatchFile {
		url: url.to_string(),
		filename,
		ext,
		file_version,
	}
}

/// Last path segment, ignoring any query string or fragment.
pub fn filename_from_url(url: &str) -> String {
	let path = url.split(['?', '#']).next().unwrap_or_default();
	path.rsplit('/').next().unwrap_or_default().to_string()
}

/// Lowercased text after the last dot; empty when there is no dot or the dot leads.
pub fn extension_of(filename: &str) -> String {
	match filename.rfind('.') {
		Some(idx) if idx > 0 => filename[idx + 1..].to_lowercase(),
		_ => String::new(),
	}
}

/// Best guess at the product version a file targets.
///
/// Only a UI aid: candidates from both patterns are collected and the newest
/// numeric one wins. `None` when nothing plausible is found.
pub fn infer_file_version(
	url: &str,
	filename: &str,
	comparator: &VersionComparator,
) -> Option<String> {
	let mut candidates = BTreeSet::new();

	for haystack in [url, filename] {
		for caps in SEPARATED_VERSION.captures_iter(haystack) {
			let label = match caps.get(3) {
				Some(patch) => format!("{}.{}.{}", &caps[1], &caps[2], patch.as_str()),
				None => format!("{}.{}", &caps[1], &caps[2]),
			};
			candidates.insert(label);
		}
		for caps in ARCGIS_COMPACT.captures_iter(haystack) {
			if let Some(label) = decode_compact(&caps[1]) {
				candidates.insert(label);
			}
		}
	}

	candidates
		.into_iter()
		.filter(|label| comparator.kind(label).is_numeric())
		.min_by(|a, b| comparator.compare(a, b, SortDirection::Desc))
}

/// `1091` -> `10.9.1`, `111` -> `11.1`, `92` -> `9.2`.
fn decode_compact(digits: &str) -> Option<String> {
	let (major, rest) = if digits.starts_with('9') {
		digits.split_at(1)
	} else if digits.len() >= 3 && matches!(digits.get(..2), Some("10" | "11" | "12")) {
		digits.split_at(2)
	} else {
		return None;
	};

	let mut parts = rest.chars();
	match (parts.next(), parts.next(), parts.next()) {
		(Some(minor), None, None) => Some(format!("{major}.{minor}")),
		(Some(minor), Some(patch), None) => Some(format!("{major}.{minor}.{patch}")),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_filename_ignores_query_string() {
		assert_eq!(
			filename_from_url("https://downloads.example.com/patches/ArcGIS-1091-S-PF.zip?sig=abc/def"),
			"ArcGIS-1091-S-PF.zip"
		);
		assert_eq!(filename_from_url("https://example.com/dir/"), "");
		assert_eq!(filename_from_url("plain.msp"), "plain.msp");
	}

	#[test]
	fn test_extension_rules() {
		assert_eq!(extension_of("Patch.ZIP"), "zip");
		assert_eq!(extension_of("archive.tar.gz"), "gz");
		assert_eq!(extension_of(".hidden"), "");
		assert_eq!(extension_of("README"), "");
	}

	#[test]
	fn test_decode_compact() {
		assert_eq!(decode_compact("1091").as_deref(), Some("10.9.1"));
		assert_eq!(decode_compact("111").as_deref(), Some("11.1"));
		assert_eq!(decode_compact("92").as_deref(), Some("9.2"));
		assert_eq!(decode_compact("31"), None);
		assert_eq!(decode_compact("10"), None);
		assert_eq!(decode_compact("2024"), None);
		assert_eq!(decode_compact("\u{0967}\u{0966}\u{096F}"), None);
	}

	#[test]
	fn test_infer_separated_version() {
		let comparator = VersionComparator::new();
		let url = "https://example.com/patches/ArcGIS_Server_10.8.1_Security_Patch.zip";
		let file = derive_file(url, &comparator);
		assert_eq!(file.filename, "ArcGIS_Server_10.8.1_Security_Patch.zip");
		assert_eq!(file.ext, "zip");
		assert_eq!(file.file_version, "10.8.1");
	}

	#[test]
	fn test_infer_compact_after_arcgis_prefix() {
		let comparator = VersionComparator::new();
		assert_eq!(
			infer_file_version("https://x/ArcGIS-Server-1091-S-QFE.msp", "ArcGIS-Server-1091-S-QFE.msp", &comparator)
				.as_deref(),
			Some("10.9.1")
		);
	}

	#[test]
	fn test_compact_digits_without_prefix_are_ignored() {
		let comparator = VersionComparator::new();
		assert_eq!(infer_file_version("https://x/2023/1091.zip", "1091.zip", &comparator), None);
	}

	#[test]
	fn test_newest_candidate_wins() {
		let comparator = VersionComparator::new();
		let url = "https://x/11.1/ArcGIS-1091-Patch.zip";
		assert_eq!(
			infer_file_version(url, &filename_from_url(url), &comparator).as_deref(),
			Some("11.1")
		);
	}

	#[test]
	fn test_no_inference_degrades_to_empty() {
		let comparator = VersionComparator::new();
		let file = derive_file("https://example.com/readme.txt", &comparator);
		assert_eq!(file.file_version, "");
	}

	#[test]
	fn test_non_ascii_digits_after_prefix_infer_nothing() {
		let comparator = VersionComparator::new();
		let file = derive_file("https://x/ArcGIS-\u{0967}\u{0966}\u{096F}.zip", &comparator);
		assert_eq!(file.filename, "ArcGIS-\u{0967}\u{0966}\u{096F}.zip");
		assert_eq!(file.file_version, "");
	}

	#[test]
	fn test_normalize_tolerates_non_ascii_digit_urls() {
		let document = serde_json::json!({
			"Product": [{
				"version": "11.1",
				"patches": [{
					"Name": "x",
					"QFE_ID": "1",
					"PatchFiles": ["https://x/ArcGIS-\u{0967}\u{0966}\u{096F}.zip", "https://x/10_\u{0669}.zip"]
				}]
			}]
		});
		let rows = crate::utils::normalizer::normalize(&document, &VersionComparator::new());
		assert_eq!(rows.len(), 1);
		assert!(rows[0].files.iter().all(|f| f.file_version.is_empty()));
	}
}
