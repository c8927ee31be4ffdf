// src/utils/options.rs

use std::collections::{BTreeSet, HashMap};

use crate::models::filter::{FilterOption, FilterOptions};
use crate::models::patch::PatchRow;
use crate::utils::normalizer::locale_cmp;
use crate::utils::version::{SortDirection, VersionComparator};

/// Aggregates distinct values per dimension with occurrence counts.
pub fn derive_options(rows: &[PatchRow], comparator: &VersionComparator) -> FilterOptions {
	FilterOptions {
		products: count_tokens(rows, |row| &row.products_tokens),
		versions: count_versions(rows, comparator),
		platforms: count_tokens(rows, |row| &row.platform_tokens),
		types: count_tokens(rows, |row| &row.types),
	}
}

/// Each row contributes once per distinct token. Ordered by count, then value.
fn count_tokens<F>(rows: &[PatchRow], tokens: F) -> Vec<FilterOption>
where
	F: Fn(&PatchRow) -> &Vec<String>,
{
	let mut counts: HashMap<&str, usize> = HashMap::new();
	for row in rows {
		let distinct: BTreeSet<&str> = tokens(row)
			.iter()
			.map(String::as_str)
			.filter(|t| !t.is_empty())
			.collect();
		for token in distinct {
			*counts.entry(token).or_insert(0) += 1;
		}
	}

	let mut options: Vec<FilterOption> = counts
		.into_iter()
		.map(|(value, count)| FilterOption::new(value, count))
		.collect();
	options.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| locale_cmp(&a.value, &b.value)));
	options
}

/// Exact labels, newest version first; equal-ranked labels by count.
fn count_versions(rows: &[PatchRow], comparator: &VersionComparator) -> Vec<FilterOption> {
	let mut counts: HashMap<&str, usize> = HashMap::new();
	for row in rows.iter().filter(|row| !row.version.is_empty()) {
		*counts.entry(row.version.as_str()).or_insert(0) += 1;
	}

	let mut options: Vec<FilterOption> = counts
		.into_iter()
		.map(|(value, count)| FilterOption::new(value, count))
		.collect();
	options.sort_by(|a, b| {
		comparator
			.compare(&a.value, &b.value, SortDirection::Desc)
			.then_with(|| b.count.cmp(&a.count))
			.then_with(|| a.value.cmp(&b.value))
	});
	options
}
