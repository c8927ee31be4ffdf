// src/utils/normalizer.rs

use chrono::NaiveDate;
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use serde_json::{Map, Value};
use std::cmp::Ordering;

use crate::models::patch::{CriticalKind, PatchRow};
use crate::utils::file_info::derive_file;
use crate::utils::version::VersionComparator;

lazy_static! {
	static ref RELEASE_DATE: Regex = Regex::new(r"^([0-9]{1,2})/([0-9]{1,2})/([0-9]{4})$").unwrap();
}

/// Number of product tokens shown before the summary is clamped.
const PRODUCTS_DISPLAY_LIMIT: usize = 3;
const SEARCH_SEPARATOR: &str = " | ";

/// Flattens the raw catalog document into rows, newest first.
///
/// Never fails: a missing `Product` list yields no rows and malformed
/// entries degrade field by field to empty defaults.
pub fn normalize(document: &Value, comparator: &VersionComparator) -> Vec<PatchRow> {
	let Some(groups) = document.get("Product").and_then(Value::as_array) else {
		debug!("Catalog document has no Product list");
		return Vec::new();
	};

	let mut rows = Vec::new();
	for group in groups {
		let version = group.get("version").map(scalar_text).unwrap_or_default();
		let Some(patches) = group.get("patches").and_then(Value::as_array) else {
			debug!("Skipping version group '{}' without a patches list", version);
			continue;
		};

		for patch in patches {
			match patch.as_object() {
				Some(fields) => rows.push(normalize_patch(fields, &version, comparator)),
				None => debug!("Skipping non-object patch entry in group '{}'", version),
			}
		}
	}

	sort_newest_first(&mut rows);
	rows
}

fn normalize_patch(fields: &Map<String, Value>, version: &str, comparator: &VersionComparator) -> PatchRow {
	let text = |key: &str| fields.get(key).map(scalar_text).unwrap_or_default();
	let list = |key: &str| fields.get(key).map(string_list).unwrap_or_default();

	let name = text("Name");
	let qfe_id = text("QFE_ID");
	let products_raw = text("Products");
	let platform_raw = text("Platform");
	let release_date_text = text("ReleaseDate");
	let critical_kind = CriticalKind::classify(&text("Critical"));

	let products_tokens = tokenize_csv(&products_raw);
	let platform_tokens = tokenize_csv(&platform_raw);

	let files: Vec<_> = list("PatchFiles")
		.iter()
		.map(|url| derive_file(url, comparator))
		.collect();

	let mut types: Vec<String> = Vec::new();
	for file in &files {
		if !file.ext.is_empty() && !types.contains(&file.ext) {
			types.push(file.ext.clone());
		}
	}

	let mut blob_parts = vec![
		name.as_str(),
		qfe_id.as_str(),
		version,
		products_raw.as_str(),
		platform_raw.as_str(),
		release_date_text.as_str(),
	];
	blob_parts.extend(files.iter().map(|f| f.filename.as_str()));
	let search_blob = blob_parts.join(SEARCH_SEPARATOR).to_lowercase();

	PatchRow {
		products_display: display_products(&products_tokens),
		release_date_ms: parse_release_date(&release_date_text),
		critical_label: critical_kind.label().to_string(),
		patch_page_url: text("url"),
		md5: list("MD5sums"),
		sha256: list("SHA256sums"),
		version: version.to_string(),
		name,
		qfe_id,
		products_raw,
		products_tokens,
		platform_raw,
		platform_tokens,
		release_date_text,
		critical_kind,
		files,
		types,
		search_blob,
	}
}

/// Strings pass through trimmed; numbers and booleans are stringified; anything else is empty.
fn scalar_text(value: &Value) -> String {
	match value {
		Value::String(s) => s.trim().to_string(),
		Value::Number(n) => n.to_string(),
		Value::Bool(b) => b.to_string(),
		_ => String::new(),
	}
}

/// Non-array values become an empty list; non-string members are dropped.
fn string_list(value: &Value) -> Vec<String> {
	value
		.as_array()
		.map(|items| {
			items
				.iter()
				.filter_map(Value::as_str)
				.map(str::trim)
				.filter(|s| !s.is_empty())
				.map(str::to_string)
				.collect()
		})
		.unwrap_or_default()
}

pub fn tokenize_csv(raw: &str) -> Vec<String> {
	raw.split(',')
		.map(str::trim)
		.filter(|t| !t.is_empty())
		.map(str::to_string)
		.collect()
}

fn display_products(tokens: &[String]) -> String {
	if tokens.len() <= PRODUCTS_DISPLAY_LIMIT {
		return tokens.join(", ");
	}
	format!(
		"{} +{} more",
		tokens[..PRODUCTS_DISPLAY_LIMIT].join(", "),
		tokens.len() - PRODUCTS_DISPLAY_LIMIT
	)
}

/// Strict `MM/DD/YYYY` to UTC-midnight epoch millis; `0` for anything else.
pub fn parse_release_date(text: &str) -> i64 {
	release_date(text)
		.and_then(|date| date.and_hms_opt(0, 0, 0))
		.map(|dt| dt.and_utc().timestamp_millis())
		.unwrap_or(0)
}

/// Calendar date of a strict `MM/DD/YYYY` string.
pub fn release_date(text: &str) -> Option<NaiveDate> {
	let caps = RELEASE_DATE.captures(text.trim())?;
	let month = caps[1].parse().ok()?;
	let day = caps[2].parse().ok()?;
	let year = caps[3].parse().ok()?;
	NaiveDate::from_ymd_opt(year, month, day)
}

/// Case-insensitive first, then exact, so `"arcgis"` and `"ArcGIS"` sit together.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
	a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

fn sort_newest_first(rows: &mut [PatchRow]) {
	rows.sort_by(|a, b| {
		b.release_date_ms
			.cmp(&a.release_date_ms)
			.then_with(|| locale_cmp(&a.name, &b.name))
			.then_with(|| a.qfe_id.cmp(&b.qfe_id))
	});
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn sample_document() -> Value {
		json!({
			"Product": [
				{
					"version": "11.1",
					"patches": [
						{
							"Name": "ArcGIS Server Security 2024 Update 1",
							"QFE_ID": "QFE-111-S-1",
							"Products": "ArcGIS Server, ArcGIS Pro, Portal for ArcGIS, ArcGIS Data Store",
							"Platform": "Windows, Linux",
							"ReleaseDate": "01/01/2024",
							"Critical": "Security",
							"PatchFiles": [
								"https://downloads.example.com/ArcGIS-111-S-SU1-Patch.zip",
								"https://downloads.example.com/ArcGIS-111-S-SU1-Patch-linux.tar?x=1"
							],
							"SHA256sums": ["abc123"],
							"MD5sums": ["def456"],
							"url": "https://support.example.com/patches/qfe-111-s-1"
						},
						{
							"Name": "Geocoding Patch",
							"QFE_ID": "QFE-111-G",
							"Products": "ArcGIS Server",
							"Platform": "Windows",
							"ReleaseDate": "06/15/2023",
							"Critical": "true",
							"PatchFiles": ["https://downloads.example.com/geocode.msp"]
						}
					]
				},
				{
					"version": "10.9.1",
					"patches": [
						{
							"Name": "Map Viewer Fix",
							"QFE_ID": 42,
							"Products": "Portal for ArcGIS",
							"ReleaseDate": "12/31/2023",
							"PatchFiles": "not-a-list",
							"MD5sums": [1, "  ", "aa11"]
						},
						"garbage"
					]
				}
			]
		})
	}

	#[test]
	fn test_normalize_sorts_newest_first() {
		let rows = normalize(&sample_document(), &VersionComparator::new());
		let dates: Vec<_> = rows.iter().map(|r| r.release_date_text.as_str()).collect();
		assert_eq!(dates, vec!["01/01/2024", "12/31/2023", "06/15/2023"]);
	}

	#[test]
	fn test_normalize_derives_fields() {
		let rows = normalize(&sample_document(), &VersionComparator::new());
		let row = &rows[0];

		assert_eq!(row.version, "11.1");
		assert_eq!(row.critical_kind, CriticalKind::Security);
		assert_eq!(row.critical_label, "Security");
		assert_eq!(row.products_tokens.len(), 4);
		assert_eq!(row.products_display, "ArcGIS Server, ArcGIS Pro, Portal for ArcGIS +1 more");
		assert_eq!(row.platform_tokens, vec!["Windows", "Linux"]);
		assert_eq!(row.types, vec!["zip", "tar"]);
		assert_eq!(row.files[1].filename, "ArcGIS-111-S-SU1-Patch-linux.tar");
		assert_eq!(row.files[0].file_version, "11.1");
		assert_eq!(row.sha256, vec!["abc123"]);
		assert_eq!(row.patch_page_url, "https://support.example.com/patches/qfe-111-s-1");
		assert_eq!(row.release_date_ms, 1_704_067_200_000);
		assert!(row.search_blob.contains("qfe-111-s-1 | 11.1 | arcgis server"));
		assert!(row.search_blob.ends_with("arcgis-111-s-su1-patch-linux.tar"));
	}

	#[test]
	fn test_malformed_fields_degrade_to_defaults() {
		let rows = normalize(&sample_document(), &VersionComparator::new());
		let row = rows.iter().find(|r| r.name == "Map Viewer Fix").unwrap();

		assert_eq!(row.qfe_id, "42");
		assert!(row.files.is_empty());
		assert!(row.types.is_empty());
		assert_eq!(row.md5, vec!["aa11"]);
		assert!(row.platform_tokens.is_empty());
		assert_eq!(row.critical_kind, CriticalKind::Standard);
		assert_eq!(rows.len(), 3);
	}

	#[test]
	fn test_missing_product_list_yields_empty() {
		let comparator = VersionComparator::new();
		assert!(normalize(&json!({}), &comparator).is_empty());
		assert!(normalize(&json!({"Product": "nope"}), &comparator).is_empty());
		assert!(normalize(&json!([1, 2, 3]), &comparator).is_empty());
		assert!(normalize(&json!({"Product": [{"version": "11.0", "patches": {}}]}), &comparator).is_empty());
	}

	#[test]
	fn test_normalize_is_deterministic() {
		let document = sample_document();
		let first = normalize(&document, &VersionComparator::new());
		let second = normalize(&document, &VersionComparator::new());
		assert_eq!(
			serde_json::to_string(&first).unwrap(),
			serde_json::to_string(&second).unwrap()
		);
	}

	#[test]
	fn test_release_date_parsing() {
		assert_eq!(parse_release_date("01/01/1970"), 0);
		assert_eq!(parse_release_date("1/2/2024"), 1_704_153_600_000);
		assert_eq!(parse_release_date("2024-01-01"), 0);
		assert_eq!(parse_release_date("02/30/2024"), 0);
		assert_eq!(parse_release_date(""), 0);
		assert_eq!(parse_release_date("\u{0661}/\u{0662}/\u{0662}\u{0660}\u{0662}\u{0664}"), 0);
		assert_eq!(release_date("12/31/2023"), NaiveDate::from_ymd_opt(2023, 12, 31));
	}

	#[test]
	fn test_ties_break_by_name_then_qfe() {
		let document = json!({
			"Product": [{
				"version": "11.0",
				"patches": [
					{"Name": "beta", "QFE_ID": "2", "ReleaseDate": "03/01/2023"},
					{"Name": "Alpha", "QFE_ID": "9", "ReleaseDate": "03/01/2023"},
					{"Name": "beta", "QFE_ID": "1", "ReleaseDate": "03/01/2023"},
					{"Name": "undated", "QFE_ID": "0"}
				]
			}]
		});
		let rows = normalize(&document, &VersionComparator::new());
		let keys: Vec<_> = rows.iter().map(|r| (r.name.as_str(), r.qfe_id.as_str())).collect();
		assert_eq!(keys, vec![("Alpha", "9"), ("beta", "1"), ("beta", "2"), ("undated", "0")]);
	}

	#[test]
	fn test_tokenize_csv_drops_empties() {
		assert_eq!(tokenize_csv(" a, ,b ,, c"), vec!["a", "b", "c"]);
		assert!(tokenize_csv("").is_empty());
	}
}
