// src/view/url_state.rs

use chrono::NaiveDate;
use lazy_static::lazy_static;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;
use std::collections::BTreeSet;
use url::form_urlencoded;

use crate::models::filter::{CriticalFilter, DetailRoute, FilterState};

pub const KEY_QUERY: &str = "q";
pub const KEY_PRODUCTS: &str = "p";
pub const KEY_VERSIONS: &str = "v";
pub const KEY_PLATFORMS: &str = "os";
pub const KEY_TYPES: &str = "t";
pub const KEY_CRITICAL: &str = "c";
pub const KEY_FROM: &str = "from";
pub const KEY_TO: &str = "to";
pub const KEY_PATCH_ID: &str = "pid";
pub const KEY_PATCH_NAME: &str = "pn";

const MEMBER_DELIMITER: char = '|';
const ISO_DATE: &str = "%Y-%m-%d";
const SLUG_MAX_LEN: usize = 180;

/// Unreserved characters plus `!*'()` stay literal; `|` inside a member is escaped.
const MEMBER: &AsciiSet = &NON_ALPHANUMERIC
	.remove(b'-')
	.remove(b'_')
	.remove(b'.')
	.remove(b'!')
	.remove(b'~')
	.remove(b'*')
	.remove(b'\'')
	.remove(b'(')
	.remove(b')');

lazy_static! {
	static ref PATCH_ID: Regex = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]{0,63}$").unwrap();
	static ref PATCH_SLUG: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
	static ref NON_SLUG: Regex = Regex::new(r"[^a-z0-9]+").unwrap();
}

/// Everything the address bar carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlState {
	pub filters: FilterState,
	pub detail: Option<DetailRoute>,
}

/// Query string for the non-default parts of `filters` and `detail`, without a leading `?`.
///
/// Keys are emitted in a fixed order and set members sorted, so equal states
/// always produce the same string. The default state produces `""`.
pub fn serialize(filters: &FilterState, detail: Option<&DetailRoute>) -> String {
	let mut out = form_urlencoded::Serializer::new(String::new());

	let q = filters.q.trim();
	if !q.is_empty() {
		out.append_pair(KEY_QUERY, q);
	}
	for (key, members) in [
		(KEY_PRODUCTS, &filters.products),
		(KEY_VERSIONS, &filters.versions),
		(KEY_PLATFORMS, &filters.platforms),
		(KEY_TYPES, &filters.types),
	] {
		if !members.is_empty() {
			out.append_pair(key, &encode_members(members));
		}
	}
	if filters.critical != CriticalFilter::All {
		out.append_pair(KEY_CRITICAL, filters.critical.as_str());
	}
	if let Some(from) = filters.from {
		out.append_pair(KEY_FROM, &from.format(ISO_DATE).to_string());
	}
	if let Some(to) = filters.to {
		out.append_pair(KEY_TO, &to.format(ISO_DATE).to_string());
	}
	if let Some(route) = detail {
		out.append_pair(KEY_PATCH_ID, &route.pid);
		out.append_pair(KEY_PATCH_NAME, &route.pn);
	}

	out.finish()
}

/// Rebuilds state from a query string. Never fails: bad values become defaults.
pub fn hydrate(query: &str) -> UrlState {
	let query = query.trim().trim_start_matches('?');
	let mut filters = FilterState::default();
	let mut pid = None;
	let mut pn = None;
	let mut seen = BTreeSet::new();

	for (key, value) in form_urlencoded::parse(query.as_bytes()) {
		// First occurrence wins.
		if !seen.insert(key.to_string()) {
			continue;
		}
		match &*key {
			KEY_QUERY => filters.q = value.trim().to_string(),
			KEY_PRODUCTS => filters.products = decode_members(&value),
			KEY_VERSIONS => filters.versions = decode_members(&value),
			KEY_PLATFORMS => filters.platforms = decode_members(&value),
			KEY_TYPES => filters.types = decode_members(&value),
			KEY_CRITICAL => filters.critical = CriticalFilter::parse(&value),
			KEY_FROM => filters.from = parse_iso_date(&value),
			KEY_TO => filters.to = parse_iso_date(&value),
			KEY_PATCH_ID => pid = Some(value.into_owned()),
			KEY_PATCH_NAME => pn = Some(value.into_owned()),
			_ => {}
		}
	}

	let detail = match (pid, pn) {
		(Some(pid), Some(pn)) => validate_detail(&pid, &pn),
		_ => None,
	};

	UrlState { filters, detail }
}

pub fn encode_members(members: &BTreeSet<String>) -> String {
	members
		.iter()
		.map(|m| utf8_percent_encode(m, MEMBER).to_string())
		.collect::<Vec<_>>()
		.join("|")
}

/// Splits on `|`, percent-decodes each piece (keeping it raw if that fails), trims, drops empties.
pub fn decode_members(value: &str) -> BTreeSet<String> {
	value
		.split(MEMBER_DELIMITER)
		.map(|piece| match percent_decode_str(piece).decode_utf8() {
			Ok(decoded) => decoded.trim().to_string(),
			Err(_) => piece.trim().to_string(),
		})
		.filter(|member| !member.is_empty())
		.collect()
}

fn parse_iso_date(value: &str) -> Option<NaiveDate> {
	NaiveDate::parse_from_str(value.trim(), ISO_DATE).ok()
}

/// Both parts must look safe, otherwise neither is trusted.
pub fn validate_detail(pid: &str, pn: &str) -> Option<DetailRoute> {
	let (pid, pn) = (pid.trim(), pn.trim());
	if !PATCH_ID.is_match(pid) || pn.len() > SLUG_MAX_LEN || !PATCH_SLUG.is_match(pn) {
		return None;
	}
	Some(DetailRoute {
		pid: pid.to_string(),
		pn: pn.to_string(),
	})
}

/// URL slug of a patch name: lowercase ASCII words joined by dashes.
pub fn slugify(name: &str) -> String {
	let lowered = name.to_lowercase().replace('&', " and ");
	let dashed = NON_SLUG.replace_all(&lowered, "-");
	let trimmed = dashed.trim_matches('-');
	let clamped: String = trimmed.chars().take(SLUG_MAX_LEN).collect();
	clamped.trim_end_matches('-').to_string()
}

/// The browser location, as far as this crate is concerned.
pub trait AddressBar {
	fn current_query(&self) -> String;

	/// Replaces the query in place. Must not navigate or add history entries.
	fn replace_query(&mut self, query: &str);
}

/// Writes `desired` unless it is already there. Returns whether a write happened.
pub fn sync_address_bar<B: AddressBar + ?Sized>(bar: &mut B, desired: &str) -> bool {
	let current = bar.current_query();
	if current.trim_start_matches('?') == desired {
		return false;
	}
	bar.replace_query(desired);
	true
}

/// In-process address bar used by the CLI and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryAddressBar {
	query: String,
	replacements: usize,
}

impl MemoryAddressBar {
	pub fn with_query(query: &str) -> Self {
		Self {
			query: query.trim_start_matches('?').to_string(),
			replacements: 0,
		}
	}

	pub fn replacements(&self) -> usize {
		self.replacements
	}
}

impl AddressBar for MemoryAddressBar {
	fn current_query(&self) -> String {
		self.query.clone()
	}

	fn replace_query(&mut self, query: &str) {
		self.query = query.to_string();
		self.replacements += 1;
	}
}
