// src/view/predicate.rs

use chrono::NaiveDate;
use std::collections::BTreeSet;

use crate::models::filter::FilterState;
use crate::models::patch::PatchRow;

pub const MS_PER_DAY: i64 = 86_400_000;

/// Values derived once per pass instead of once per row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Precomputed {
	pub q_lower: String,
	pub from_ms: Option<i64>,
	pub to_ms: Option<i64>,
}

impl Precomputed {
	pub fn new(filters: &FilterState) -> Self {
		Self {
			q_lower: filters.normalized_query(),
			from_ms: filters.from.map(utc_midnight_ms),
			to_ms: filters.to.map(utc_midnight_ms),
		}
	}
}

/// Epoch millis of the date's UTC midnight.
pub fn utc_midnight_ms(date: NaiveDate) -> i64 {
	date.and_hms_opt(0, 0, 0)
		.map(|dt| dt.and_utc().timestamp_millis())
		.unwrap_or(0)
}

/// AND of every clause, cheapest first. Empty clauses never exclude.
pub fn passes(row: &PatchRow, filters: &FilterState, pre: &Precomputed) -> bool {
	if !pre.q_lower.is_empty() && !row.search_blob.contains(&pre.q_lower) {
		return false;
	}
	if !filters.critical.accepts(row.critical_kind) {
		return false;
	}
	if !any_of(&filters.products, &row.products_tokens) {
		return false;
	}
	if !filters.versions.is_empty() && !filters.versions.contains(&row.version) {
		return false;
	}
	if !any_of(&filters.platforms, &row.platform_tokens) {
		return false;
	}
	if !any_of(&filters.types, &row.types) {
		return false;
	}
	within_dates(row, pre)
}

/// Set overlap: an empty selection matches everything.
fn any_of(selected: &BTreeSet<String>, tokens: &[String]) -> bool {
	selected.is_empty() || tokens.iter().any(|t| selected.contains(t))
}

/// Rows without a usable date are never excluded by the range.
fn within_dates(row: &PatchRow, pre: &Precomputed) -> bool {
	if !row.has_release_date() {
		return true;
	}
	if let Some(from_ms) = pre.from_ms {
		if row.release_date_ms < from_ms {
			return false;
		}
	}
	if let Some(to_ms) = pre.to_ms {
		if row.release_date_ms > to_ms + MS_PER_DAY - 1 {
			return false;
		}
	}
	true
}

/// Indices of passing rows, in dataset order.
pub fn matching_indices(rows: &[PatchRow], filters: &FilterState) -> Vec<usize> {
	let pre = Precomputed::new(filters);
	rows.iter()
		.enumerate()
		.filter(|(_, row)| passes(row, filters, &pre))
		.map(|(idx, _)| idx)
		.collect()
}
