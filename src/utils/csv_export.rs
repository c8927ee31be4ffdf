// src/utils/csv_export.rs

use anyhow::{Context, Result};
use csv::WriterBuilder;
use log::info;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::models::patch::PatchRow;
use crate::view::formatters::format_release_iso;

/// Separator for multi-valued cells.
const LIST_SEPARATOR: &str = "; ";

/// One exported line. Field order is the column order.
#[derive(Debug, Serialize)]
pub struct PatchCsvRecord<'a> {
	pub name: &'a str,
	pub qfe_id: &'a str,
	pub version: &'a str,
	pub products: String,
	pub platform: String,
	pub release_date: String,
	pub critical: &'a str,
	pub files: String,
	pub md5: String,
	pub sha256: String,
	pub patch_page: &'a str,
}

impl<'a> From<&'a PatchRow> for PatchCsvRecord<'a> {
	fn from(row: &'a PatchRow) -> Self {
		Self {
			name: &row.name,
			qfe_id: &row.qfe_id,
			version: &row.version,
			products: row.products_tokens.join(LIST_SEPARATOR),
			platform: row.platform_tokens.join(LIST_SEPARATOR),
			release_date: format_release_iso(row)
				.map(|d| d.format("%Y-%m-%d").to_string())
				.unwrap_or_default(),
			critical: row.critical_kind.as_str(),
			files: row
				.files
				.iter()
				.map(|f| f.url.as_str())
				.collect::<Vec<_>>()
				.join(LIST_SEPARATOR),
			md5: row.md5.join(LIST_SEPARATOR),
			sha256: row.sha256.join(LIST_SEPARATOR),
			patch_page: &row.patch_page_url,
		}
	}
}

/// Writes rows in the given order, header first. Returns the record count.
pub fn write_patches<W: Write>(writer: W, rows: &[&PatchRow]) -> Result<usize> {
	let mut wtr = WriterBuilder::new().has_headers(true).from_writer(writer);
	for row in rows {
		wtr.serialize(PatchCsvRecord::from(*row))
			.with_context(|| format!("Failed to write CSV record for {}", row.qfe_id))?;
	}
	wtr.flush().context("Failed to flush CSV output")?;
	Ok(rows.len())
}

pub fn export_patches_to_csv(path: &Path, rows: &[&PatchRow]) -> Result<usize> {
	let file = std::fs::File::create(path)
		.with_context(|| format!("Failed to create CSV file {:?}", path))?;
	let count = write_patches(file, rows)?;
	info!("Exported {} patches to {:?}", count, path);
	Ok(count)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::utils::normalizer::normalize;
	use crate::utils::version::VersionComparator;
	use serde_json::json;

	fn rows() -> Vec<PatchRow> {
		let document = json!({
			"Product": [{
				"version": "11.1",
				"patches": [
					{
						"Name": "Alpha, \"quoted\" Fix",
						"QFE_ID": "A-1",
						"Products": "ArcGIS Pro, ArcGIS Server",
						"Platform": "Windows",
						"ReleaseDate": "03/04/2024",
						"Critical": "Security",
						"PatchFiles": ["https://x/a.zip", "https://x/a.msp"],
						"MD5sums": ["m1", "m2"],
						"SHA256sums": ["s1"],
						"url": "https://x/alpha"
					},
					{"Name": "Undated", "QFE_ID": "U-1"}
				]
			}]
		});
		normalize(&document, &VersionComparator::new())
	}

	#[test]
	fn test_header_and_multi_value_cells() {
		let rows = rows();
		let view: Vec<&PatchRow> = rows.iter().collect();
		let mut out = Vec::new();

		let count = write_patches(&mut out, &view).unwrap();
		assert_eq!(count, 2);

		let text = String::from_utf8(out).unwrap();
		let lines: Vec<&str> = text.lines().collect();
		assert_eq!(
			lines[0],
			"name,qfe_id,version,products,platform,release_date,critical,files,md5,sha256,patch_page"
		);
		assert_eq!(
			lines[1],
			"\"Alpha, \"\"quoted\"\" Fix\",A-1,11.1,ArcGIS Pro; ArcGIS Server,Windows,2024-03-04,security,https://x/a.zip; https://x/a.msp,m1; m2,s1,https://x/alpha"
		);
		assert_eq!(lines[2], "Undated,U-1,11.1,,,,standard,,,,");
	}

	#[test]
	fn test_export_to_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("patches.csv");
		let rows = rows();
		let view: Vec<&PatchRow> = rows.iter().take(1).collect();

		assert_eq!(export_patches_to_csv(&path, &view).unwrap(), 1);
		let mut rdr = csv::Reader::from_path(&path).unwrap();
		let records: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
		assert_eq!(records.len(), 1);
		assert_eq!(&records[0][1], "A-1");
	}
}
