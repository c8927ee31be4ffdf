// src/view/sort.rs

use std::cmp::Ordering;

use crate::models::patch::{CriticalKind, PatchRow};
use crate::utils::normalizer::locale_cmp;
use crate::utils::version::{SortDirection, VersionComparator};
use super::types::SortField;

/// Presentation re-sort of an already filtered view. Stable, so equal keys
/// keep the newest-first dataset order.
pub fn sort_rows(
	rows: &mut [&PatchRow],
	field: SortField,
	direction: SortDirection,
	comparator: &VersionComparator,
) {
	let directed = |ordering: Ordering| match direction {
		SortDirection::Asc => ordering,
		SortDirection::Desc => ordering.reverse(),
	};

	match field {
		SortField::None => (),
		SortField::Name => rows.sort_by(|a, b| directed(locale_cmp(&a.name, &b.name))),
		SortField::Qfe => rows.sort_by(|a, b| directed(a.qfe_id.cmp(&b.qfe_id))),
		// The comparator applies direction itself and keeps bucket precedence fixed.
		SortField::Version => rows.sort_by(|a, b| comparator.compare(&a.version, &b.version, direction)),
		SortField::Date => rows.sort_by(|a, b| match (a.has_release_date(), b.has_release_date()) {
			(true, true) => directed(a.release_date_ms.cmp(&b.release_date_ms)),
			(true, false) => Ordering::Less,
			(false, true) => Ordering::Greater,
			(false, false) => Ordering::Equal,
		}),
		SortField::Critical => {
			rows.sort_by(|a, b| directed(critical_rank(a.critical_kind).cmp(&critical_rank(b.critical_kind))))
		}
	}
}

fn critical_rank(kind: CriticalKind) -> u8 {
	match kind {
		CriticalKind::Security => 0,
		CriticalKind::Critical => 1,
		CriticalKind::Standard => 2,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::utils::normalizer::normalize;
	use serde_json::json;

	fn rows() -> Vec<PatchRow> {
		let document = json!({
			"Product": [
				{"version": "8.0", "patches": [{"Name": "old", "QFE_ID": "o", "ReleaseDate": "01/01/2010"}]},
				{"version": "9.x", "patches": [{"Name": "nine", "QFE_ID": "n"}]},
				{"version": "11.4", "patches": [{"Name": "new", "QFE_ID": "w", "ReleaseDate": "01/01/2025", "Critical": "true"}]},
				{"version": "10.9.1", "patches": [{"Name": "mid", "QFE_ID": "m", "ReleaseDate": "01/01/2022", "Critical": "security"}]}
			]
		});
		normalize(&document, &VersionComparator::new())
	}

	fn versions(view: &[&PatchRow]) -> Vec<String> {
		view.iter().map(|r| r.version.clone()).collect()
	}

	#[test]
	fn test_version_sort_keeps_bucket_precedence() {
		let rows = rows();
		let comparator = VersionComparator::new();
		let mut view: Vec<&PatchRow> = rows.iter().collect();

		sort_rows(&mut view, SortField::Version, SortDirection::Desc, &comparator);
		assert_eq!(versions(&view), vec!["11.4", "10.9.1", "9.x", "8.0"]);

		sort_rows(&mut view, SortField::Version, SortDirection::Asc, &comparator);
		assert_eq!(versions(&view), vec!["10.9.1", "11.4", "9.x", "8.0"]);
	}

	#[test]
	fn test_date_sort_puts_unknown_last() {
		let rows = rows();
		let comparator = VersionComparator::new();
		let mut view: Vec<&PatchRow> = rows.iter().collect();

		sort_rows(&mut view, SortField::Date, SortDirection::Asc, &comparator);
		let names: Vec<_> = view.iter().map(|r| r.name.as_str()).collect();
		assert_eq!(names, vec!["old", "mid", "new", "nine"]);
	}

	#[test]
	fn test_critical_and_name_sorts() {
		let rows = rows();
		let comparator = VersionComparator::new();
		let mut view: Vec<&PatchRow> = rows.iter().collect();

		sort_rows(&mut view, SortField::Critical, SortDirection::Asc, &comparator);
		assert_eq!(view[0].name, "mid");
		assert_eq!(view[1].name, "new");

		sort_rows(&mut view, SortField::Name, SortDirection::Desc, &comparator);
		let names: Vec<_> = view.iter().map(|r| r.name.as_str()).collect();
		assert_eq!(names, vec!["old", "nine", "new", "mid"]);
	}
}
