// src/utils/sitemap.rs

use log::info;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::patch::PatchRow;
use crate::view::formatters::format_release_iso;
use crate::view::url_state::{slugify, KEY_PATCH_ID, KEY_PATCH_NAME, KEY_PRODUCTS};

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
pub const INDEX_FILE: &str = "sitemap.xml";
pub const PAGES_FILE: &str = "sitemap-pages.xml";
pub const PATCHES_FILE: &str = "sitemap-patches.xml";

/// Everything except RFC 3986 unreserved characters is escaped.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

#[derive(Debug, Error)]
pub enum SitemapError {
	#[error("failed to write XML: {0}")]
	Xml(#[from] quick_xml::Error),

	#[error("failed to write {path:?}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlEntry {
	pub loc: String,
	pub lastmod: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SitemapEntries {
	pub pages: Vec<UrlEntry>,
	pub patches: Vec<UrlEntry>,
}

fn encode_value(value: &str) -> String {
	utf8_percent_encode(value, QUERY_VALUE).to_string()
}

/// The later of two optional ISO dates.
fn newest(current: Option<String>, candidate: Option<String>) -> Option<String> {
	match (current, candidate) {
		(Some(a), Some(b)) => Some(if b > a { b } else { a }),
		(a, b) => a.or(b),
	}
}

/// Landing page, one page per product filter, one deep link per patch.
pub fn build_sitemap(rows: &[PatchRow], base_url: &str, dataset_lastmod: Option<&str>) -> SitemapEntries {
	let dataset_lastmod = dataset_lastmod.map(str::to_string);
	let mut product_lastmods: BTreeMap<&str, Option<String>> = BTreeMap::new();
	let mut patch_lastmods: BTreeMap<String, Option<String>> = BTreeMap::new();

	for row in rows {
		let released = format_release_iso(row).map(|d| d.format("%Y-%m-%d").to_string());

		for product in &row.products_tokens {
			let entry = product_lastmods.entry(product.as_str()).or_insert(None);
			*entry = newest(entry.take(), released.clone());
		}

		if row.qfe_id.is_empty() {
			continue;
		}
		let loc = format!(
			"{}?{}={}&{}={}",
			base_url,
			KEY_PATCH_ID,
			encode_value(&row.qfe_id),
			KEY_PATCH_NAME,
			encode_value(&slugify(&row.name))
		);
		let lastmod = released.or_else(|| dataset_lastmod.clone());
		let entry = patch_lastmods.entry(loc).or_insert(None);
		*entry = newest(entry.take(), lastmod);
	}

	let mut pages = vec![UrlEntry {
		loc: base_url.to_string(),
		lastmod: dataset_lastmod.clone(),
	}];
	pages.extend(product_lastmods.into_iter().map(|(product, lastmod)| UrlEntry {
		loc: format!("{}?{}={}", base_url, KEY_PRODUCTS, encode_value(product)),
		lastmod: lastmod.or_else(|| dataset_lastmod.clone()),
	}));

	let patches = patch_lastmods
		.into_iter()
		.map(|(loc, lastmod)| UrlEntry { loc, lastmod })
		.collect();

	SitemapEntries { pages, patches }
}

fn write_text_element<W: std::io::Write>(
	xml: &mut Writer<W>,
	name: &str,
	text: &str,
) -> Result<(), SitemapError> {
	xml.write_event(Event::Start(BytesStart::new(name)))
		.map_err(quick_xml::Error::from)?;
	xml.write_event(Event::Text(BytesText::new(text)))
		.map_err(quick_xml::Error::from)?;
	xml.write_event(Event::End(BytesEnd::new(name)))
		.map_err(quick_xml::Error::from)?;
	Ok(())
}

fn render(root: &str, item: &str, entries: &[UrlEntry]) -> Result<Vec<u8>, SitemapError> {
	let mut xml = Writer::new_with_indent(Vec::new(), b' ', 2);
	xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
		.map_err(quick_xml::Error::from)?;

	let mut start = BytesStart::new(root);
	start.push_attribute(("xmlns", SITEMAP_NS));
	xml.write_event(Event::Start(start)).map_err(quick_xml::Error::from)?;

	for entry in entries {
		xml.write_event(Event::Start(BytesStart::new(item)))
			.map_err(quick_xml::Error::from)?;
		write_text_element(&mut xml, "loc", &entry.loc)?;
		if let Some(lastmod) = &entry.lastmod {
			write_text_element(&mut xml, "lastmod", lastmod)?;
		}
		xml.write_event(Event::End(BytesEnd::new(item)))
			.map_err(quick_xml::Error::from)?;
	}

	xml.write_event(Event::End(BytesEnd::new(root)))
		.map_err(quick_xml::Error::from)?;

	let mut bytes = xml.into_inner();
	bytes.push(b'\n');
	Ok(bytes)
}

pub fn render_urlset(entries: &[UrlEntry]) -> Result<Vec<u8>, SitemapError> {
	render("urlset", "url", entries)
}

pub fn render_index(base_url: &str, dataset_lastmod: Option<&str>) -> Result<Vec<u8>, SitemapError> {
	let children: Vec<UrlEntry> = [PAGES_FILE, PATCHES_FILE]
		.iter()
		.map(|file| UrlEntry {
			loc: format!("{}{}", base_url, file),
			lastmod: dataset_lastmod.map(str::to_string),
		})
		.collect();
	render("sitemapindex", "sitemap", &children)
}

fn write_file(path: PathBuf, bytes: &[u8]) -> Result<PathBuf, SitemapError> {
	fs::write(&path, bytes).map_err(|source| SitemapError::Io {
		path: path.clone(),
		source,
	})?;
	Ok(path)
}

/// Writes the index, pages and patches sitemaps into `out_dir`.
pub fn write_sitemaps(
	out_dir: &Path,
	rows: &[PatchRow],
	base_url: &str,
	dataset_lastmod: Option<&str>,
) -> Result<Vec<PathBuf>, SitemapError> {
	fs::create_dir_all(out_dir).map_err(|source| SitemapError::Io {
		path: out_dir.to_path_buf(),
		source,
	})?;

	let entries = build_sitemap(rows, base_url, dataset_lastmod);
	let written = vec![
		write_file(out_dir.join(INDEX_FILE), &render_index(base_url, dataset_lastmod)?)?,
		write_file(out_dir.join(PAGES_FILE), &render_urlset(&entries.pages)?)?,
		write_file(out_dir.join(PATCHES_FILE), &render_urlset(&entries.patches)?)?,
	];

	info!(
		"Wrote sitemaps: {} page URLs, {} patch URLs",
		entries.pages.len(),
		entries.patches.len()
	);
	Ok(written)
}
