use chrono::{DateTime, NaiveDate, Utc};

use crate::models::patch::PatchRow;

pub fn format_count_summary(shown: usize, total: usize, filtered: bool) -> String {
	if filtered {
		format!("{} / {} patches", shown, total)
	} else {
		format!("{} patches", total)
	}
}

/// ISO release date, or "Unknown" for the `0` sentinel.
pub fn format_release_date(row: &PatchRow) -> String {
	if !row.has_release_date() {
		return "Unknown".to_string();
	}
	DateTime::<Utc>::from_timestamp_millis(row.release_date_ms)
		.map(|ts| ts.format("%Y-%m-%d").to_string())
		.unwrap_or_else(|| "Unknown".to_string())
}

pub fn format_release_iso(row: &PatchRow) -> Option<NaiveDate> {
	if !row.has_release_date() {
		return None;
	}
	DateTime::<Utc>::from_timestamp_millis(row.release_date_ms).map(|ts| ts.date_naive())
}

pub fn format_last_updated(updated_at: Option<DateTime<Utc>>) -> String {
	updated_at.map_or_else(
		|| "Last updated: not available".to_string(),
		|ts| format!("Last updated: {}", ts.format("%Y-%m-%d %H:%M UTC")),
	)
}

/// One line per row for terminal output.
pub fn format_row_line(row: &PatchRow) -> String {
	format!(
		"{:<10}  {:<9}  {:<8}  {}  [{}]  {}",
		format_release_date(row),
		row.critical_label,
		row.version,
		row.name,
		row.qfe_id,
		row.products_display
	)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::utils::normalizer::normalize;
	use crate::utils::version::VersionComparator;
	use chrono::TimeZone;
	use serde_json::json;

	fn rows() -> Vec<PatchRow> {
		let document = json!({
			"Product": [{
				"version": "11.3",
				"patches": [
					{"Name": "Dated", "QFE_ID": "D", "ReleaseDate": "07/04/2024", "Critical": "Security"},
					{"Name": "Undated", "QFE_ID": "U", "ReleaseDate": "TBD"}
				]
			}]
		});
		normalize(&document, &VersionComparator::new())
	}

	#[test]
	fn test_count_summary_shapes() {
		assert_eq!(format_count_summary(3, 3, false), "3 patches");
		assert_eq!(format_count_summary(1, 3, true), "1 / 3 patches");
		assert_eq!(format_count_summary(0, 3, true), "0 / 3 patches");
	}

	#[test]
	fn test_release_date_formatting() {
		let rows = rows();
		assert_eq!(format_release_date(&rows[0]), "2024-07-04");
		assert_eq!(format_release_iso(&rows[0]), NaiveDate::from_ymd_opt(2024, 7, 4));
		assert_eq!(format_release_date(&rows[1]), "Unknown");
		assert_eq!(format_release_iso(&rows[1]), None);
	}

	#[test]
	fn test_last_updated_hint() {
		let ts = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
		assert_eq!(format_last_updated(Some(ts)), "Last updated: 2024-05-06 07:08 UTC");
		assert_eq!(format_last_updated(None), "Last updated: not available");
	}

	#[test]
	fn test_row_line_mentions_identity() {
		let line = format_row_line(&rows()[0]);
		assert!(line.starts_with("2024-07-04"));
		assert!(line.contains("Security"));
		assert!(line.contains("[D]"));
	}
}
