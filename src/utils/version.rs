// src/utils/version.rs

use lazy_static::lazy_static;
use regex::Regex;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::HashMap;

lazy_static! {
	static ref NINE_X: Regex = Regex::new(r"^9\.[xX]\b").unwrap();
	static ref NUMERIC: Regex = Regex::new(r"^([0-9]+)\.([0-9]+)(\.([0-9]+))?$").unwrap();
}

/// Majors outside this range fall to the `Other` bucket.
const NUMERIC_MAJORS: std::ops::RangeInclusive<u32> = 9..=12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
	Asc,
	Desc,
}

impl SortDirection {
	fn apply(self, ordering: Ordering) -> Ordering {
		match self {
			SortDirection::Asc => ordering,
			SortDirection::Desc => ordering.reverse(),
		}
	}
}

/// Bucket a version label falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionKind {
	Numeric { major: u32, minor: u32, patch: u32 },
	NineX,
	Other,
}

impl VersionKind {
	/// Fixed precedence, independent of sort direction: numeric, then 9.x, then other.
	fn rank(&self) -> u8 {
		match self {
			VersionKind::Numeric { .. } => 0,
			VersionKind::NineX => 1,
			VersionKind::Other => 2,
		}
	}

	pub fn is_numeric(&self) -> bool {
		matches!(self, VersionKind::Numeric { .. })
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionClass {
	pub raw: String,
	pub kind: VersionKind,
}

/// Classifies a label. Pure; see [`VersionComparator`] for the memoized form.
pub fn classify(label: &str) -> VersionClass {
	let raw = label.trim();
	VersionClass {
		raw: raw.to_string(),
		kind: classify_kind(raw),
	}
}

fn classify_kind(raw: &str) -> VersionKind {
	if raw.is_empty() {
		return VersionKind::Other;
	}
	if NINE_X.is_match(raw) {
		return VersionKind::NineX;
	}
	let Some(caps) = NUMERIC.captures(raw) else {
		return VersionKind::Other;
	};

	let parse = |idx: usize| caps.get(idx).and_then(|m| m.as_str().parse::<u32>().ok());
	match (parse(1), parse(2)) {
		(Some(major), Some(minor)) if NUMERIC_MAJORS.contains(&major) => VersionKind::Numeric {
			major,
			minor,
			patch: parse(4).unwrap_or(0),
		},
		_ => VersionKind::Other,
	}
}

fn compare_kinds(
	a_raw: &str,
	a: VersionKind,
	b_raw: &str,
	b: VersionKind,
	direction: SortDirection,
) -> Ordering {
	let by_rank = a.rank().cmp(&b.rank());
	if by_rank != Ordering::Equal {
		return by_rank;
	}

	match (a, b) {
		(
			VersionKind::Numeric { major: a1, minor: a2, patch: a3 },
			VersionKind::Numeric { major: b1, minor: b2, patch: b3 },
		) => direction.apply((a1, a2, a3).cmp(&(b1, b2, b3))),
		_ => direction.apply(a_raw.cmp(b_raw)),
	}
}

/// Compares two labels without memoization.
pub fn compare(a: &str, b: &str, direction: SortDirection) -> Ordering {
	let (a, b) = (a.trim(), b.trim());
	compare_kinds(a, classify_kind(a), b, classify_kind(b), direction)
}

/// Version ordering with classification memoized per trimmed label.
///
/// Owned by a dataset generation. Interior mutability lets it be borrowed
/// from inside `sort_by` closures.
#[derive(Debug, Default)]
pub struct VersionComparator {
	cache: RefCell<HashMap<String, VersionKind>>,
}

impl VersionComparator {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn kind(&self, label: &str) -> VersionKind {
		let raw = label.trim();
		if let Some(kind) = self.cache.borrow().get(raw) {
			return *kind;
		}
		let kind = classify_kind(raw);
		self.cache.borrow_mut().insert(raw.to_string(), kind);
		kind
	}

	pub fn classify(&self, label: &str) -> VersionClass {
		VersionClass {
			raw: label.trim().to_string(),
			kind: self.kind(label),
		}
	}

	pub fn compare(&self, a: &str, b: &str, direction: SortDirection) -> Ordering {
		let (a_kind, b_kind) = (self.kind(a), self.kind(b));
		compare_kinds(a.trim(), a_kind, b.trim(), b_kind, direction)
	}

	pub fn cached_labels(&self) -> usize {
		self.cache.borrow().len()
	}

	pub fn clear(&self) {
		self.cache.borrow_mut().clear();
	}
}
