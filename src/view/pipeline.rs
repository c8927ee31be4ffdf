// src/view/pipeline.rs

use serde_json::json;

use crate::models::filter::FilterState;
use crate::models::patch::PatchRow;
use crate::view::formatters::format_count_summary;
use crate::view::predicate::matching_indices;

/// Deterministic encoding of everything that can change the filtered result.
///
/// Sets are `BTreeSet`s, so members are already sorted and two equal
/// selections always encode the same way.
pub fn apply_signature(epoch: u64, filters: &FilterState) -> String {
	json!([
		epoch,
		filters.normalized_query(),
		filters.products,
		filters.versions,
		filters.platforms,
		filters.types,
		filters.critical.as_str(),
		filters.from.map(|d| d.to_string()).unwrap_or_default(),
		filters.to.map(|d| d.to_string()).unwrap_or_default(),
	])
	.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum FilteredView {
	/// Nothing active: the whole dataset in its stored order.
	All,
	Subset(Vec<usize>),
}

/// What a call to [`ApplyPipeline::apply`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyOutcome {
	pub recomputed: bool,
	/// The adapter must move its pagination cursor back to the first page.
	pub reset_page: bool,
}

impl ApplyOutcome {
	const UNCHANGED: ApplyOutcome = ApplyOutcome {
		recomputed: false,
		reset_page: false,
	};
}

/// Change-gated filtering over one dataset.
#[derive(Debug)]
pub struct ApplyPipeline {
	last_signature: Option<String>,
	view: FilteredView,
	total: usize,
	filtered: bool,
	recomputes: usize,
	scans: usize,
}

impl Default for ApplyPipeline {
	fn default() -> Self {
		Self::new()
	}
}

impl ApplyPipeline {
	pub fn new() -> Self {
		Self {
			last_signature: None,
			view: FilteredView::All,
			total: 0,
			filtered: false,
			recomputes: 0,
			scans: 0,
		}
	}

	/// Recomputes only when the signature differs from the last pass.
	pub fn apply(&mut self, epoch: u64, rows: &[PatchRow], filters: &FilterState) -> ApplyOutcome {
		let signature = apply_signature(epoch, filters);
		if self.last_signature.as_deref() == Some(signature.as_str()) {
			return ApplyOutcome::UNCHANGED;
		}

		self.filtered = filters.is_active();
		self.view = if self.filtered {
			self.scans += 1;
			FilteredView::Subset(matching_indices(rows, filters))
		} else {
			FilteredView::All
		};
		self.total = rows.len();
		self.recomputes += 1;
		self.last_signature = Some(signature);

		ApplyOutcome {
			recomputed: true,
			reset_page: true,
		}
	}

	/// Forces the next `apply` to recompute.
	pub fn invalidate(&mut self) {
		self.last_signature = None;
	}

	/// Filtered rows in display order. `rows` must be the slice last applied.
	pub fn rows<'a>(&self, rows: &'a [PatchRow]) -> Vec<&'a PatchRow> {
		match &self.view {
			FilteredView::All => rows.iter().collect(),
			FilteredView::Subset(indices) => indices.iter().filter_map(|&idx| rows.get(idx)).collect(),
		}
	}

	pub fn shown(&self) -> usize {
		match &self.view {
			FilteredView::All => self.total,
			FilteredView::Subset(indices) => indices.len(),
		}
	}

	pub fn total(&self) -> usize {
		self.total
	}

	pub fn is_filtered(&self) -> bool {
		self.filtered
	}

	pub fn count_text(&self) -> String {
		format_count_summary(self.shown(), self.total, self.filtered)
	}

	/// Passes that produced a new result.
	pub fn recompute_count(&self) -> usize {
		self.recomputes
	}

	/// Passes that walked the dataset row by row.
	pub fn scan_count(&self) -> usize {
		self.scans
	}
}
