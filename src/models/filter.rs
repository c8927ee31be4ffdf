// src/models/filter.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::patch::CriticalKind;

/// One distinct value of a filterable dimension and how many rows carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
	pub value: String,
	pub count: usize,
}

impl FilterOption {
	pub fn new(value: impl Into<String>, count: usize) -> Self {
		Self {
			value: value.into(),
			count,
		}
	}
}

/// Option lists for every multi-select dimension, rebuilt on each dataset load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
	pub products: Vec<FilterOption>,
	pub versions: Vec<FilterOption>,
	pub platforms: Vec<FilterOption>,
	pub types: Vec<FilterOption>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CriticalFilter {
	#[default]
	All,
	Security,
	Critical,
}

impl CriticalFilter {
	/// Unrecognized tokens fall back to `All`.
	pub fn parse(token: &str) -> Self {
		match token.trim().to_lowercase().as_str() {
			"security" => CriticalFilter::Security,
			"critical" => CriticalFilter::Critical,
			_ => CriticalFilter::All,
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			CriticalFilter::All => "all",
			CriticalFilter::Security => "security",
			CriticalFilter::Critical => "critical",
		}
	}

	pub fn accepts(&self, kind: CriticalKind) -> bool {
		match self {
			CriticalFilter::All => true,
			CriticalFilter::Security => kind == CriticalKind::Security,
			CriticalFilter::Critical => kind == CriticalKind::Critical,
		}
	}
}

impl std::fmt::Display for CriticalFilter {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			CriticalFilter::All => write!(f, "All patches"),
			CriticalFilter::Security => write!(f, "Security only"),
			CriticalFilter::Critical => write!(f, "Critical only"),
		}
	}
}

/// What the user wants to see. The default value filters nothing.
///
/// Set-valued dimensions use `BTreeSet` so two logically equal selections
/// compare, hash and serialize identically no matter how they were built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
	pub q: String,
	pub products: BTreeSet<String>,
	pub versions: BTreeSet<String>,
	pub platforms: BTreeSet<String>,
	pub types: BTreeSet<String>,
	pub critical: CriticalFilter,
	pub from: Option<NaiveDate>,
	pub to: Option<NaiveDate>,
}

impl FilterState {
	/// Query text as the evaluator sees it.
	pub fn normalized_query(&self) -> String {
		self.q.trim().to_lowercase()
	}

	/// True when at least one clause can exclude a row.
	pub fn is_active(&self) -> bool {
		!self.normalized_query().is_empty()
			|| !self.products.is_empty()
			|| !self.versions.is_empty()
			|| !self.platforms.is_empty()
			|| !self.types.is_empty()
			|| self.critical != CriticalFilter::All
			|| self.from.is_some()
			|| self.to.is_some()
	}

	pub fn clear(&mut self) {
		*self = FilterState::default();
	}
}

/// Deep link to a single patch: identifier plus human-readable slug.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DetailRoute {
	pub pid: String,
	pub pn: String,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_state_is_inactive() {
		let state = FilterState::default();
		assert!(!state.is_active());
		assert_eq!(state.critical, CriticalFilter::All);
	}

	#[test]
	fn test_whitespace_query_is_inactive() {
		let state = FilterState {
			q: "   ".to_string(),
			..FilterState::default()
		};
		assert!(!state.is_active());
	}

	#[test]
	fn test_any_clause_activates() {
		let mut state = FilterState::default();
		state.types.insert("zip".to_string());
		assert!(state.is_active());

		state.clear();
		state.to = NaiveDate::from_ymd_opt(2024, 1, 1);
		assert!(state.is_active());
	}

	#[test]
	fn test_critical_filter_parse_falls_back() {
		assert_eq!(CriticalFilter::parse("Security"), CriticalFilter::Security);
		assert_eq!(CriticalFilter::parse("critical"), CriticalFilter::Critical);
		assert_eq!(CriticalFilter::parse("urgent"), CriticalFilter::All);
		assert_eq!(CriticalFilter::parse(""), CriticalFilter::All);
	}

	#[test]
	fn test_critical_filter_accepts() {
		assert!(CriticalFilter::All.accepts(CriticalKind::Standard));
		assert!(CriticalFilter::Security.accepts(CriticalKind::Security));
		assert!(!CriticalFilter::Security.accepts(CriticalKind::Critical));
		assert!(!CriticalFilter::Critical.accepts(CriticalKind::Standard));
	}
}
