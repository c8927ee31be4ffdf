use crate::models::filter::{DetailRoute, FilterState};
use crate::models::patch::PatchRow;
use crate::repositories::catalog_repo::{CatalogRepository, LoadStatus};
use crate::utils::version::SortDirection;
use super::formatters::format_count_summary;
use super::pipeline::{ApplyOutcome, ApplyPipeline};
use super::sort::sort_rows;
use super::types::SortField;
use super::url_state::{hydrate, serialize, slugify, sync_address_bar, AddressBar};

pub const DEFAULT_PAGE_SIZE: usize = 25;

/// The one owned context: dataset, filter selection and view cursor.
///
/// Event handlers mutate `filters` and then call [`AppState::apply`] once per
/// settle point; everything else reads.
#[derive(Debug)]
pub struct AppState {
	pub catalog: CatalogRepository,
	pub filters: FilterState,
	pub detail: Option<DetailRoute>,
	pub current_page: usize,
	pub page_size: usize,
	pub sort_field: SortField,
	pub sort_direction: SortDirection,
	pipeline: ApplyPipeline,
}

impl AppState {
	pub fn new(page_size: usize) -> Self {
		Self {
			catalog: CatalogRepository::new(),
			filters: FilterState::default(),
			detail: None,
			current_page: 0,
			page_size: page_size.max(1),
			sort_field: SortField::None,
			sort_direction: SortDirection::Desc,
			pipeline: ApplyPipeline::new(),
		}
	}

	/// Replaces filters and detail route with whatever the query string carries.
	pub fn hydrate_from(&mut self, query: &str) {
		let state = hydrate(query);
		self.filters = state.filters;
		self.detail = state.detail;
	}

	/// Runs the apply pipeline; on a real change resets paging and re-syncs the address bar.
	pub fn apply<B: AddressBar + ?Sized>(&mut self, bar: &mut B) -> ApplyOutcome {
		let outcome = self
			.pipeline
			.apply(self.catalog.epoch(), self.catalog.rows(), &self.filters);

		if outcome.reset_page {
			self.current_page = 0;
		}
		if outcome.recomputed {
			sync_address_bar(bar, &self.share_query());
		}
		outcome
	}

	pub fn share_query(&self) -> String {
		serialize(&self.filters, self.detail.as_ref())
	}

	pub fn clear_filters(&mut self) {
		self.filters.clear();
	}

	/// Filtered rows, re-sorted for presentation when a sort column is chosen.
	pub fn filtered_rows(&self) -> Vec<&PatchRow> {
		let mut rows = self.pipeline.rows(self.catalog.rows());
		sort_rows(
			&mut rows,
			self.sort_field,
			self.sort_direction,
			self.catalog.comparator(),
		);
		rows
	}

	pub fn total_pages(&self) -> usize {
		self.pipeline.shown().div_ceil(self.page_size)
	}

	pub fn set_page(&mut self, page: usize) -> bool {
		if page < self.total_pages() {
			self.current_page = page;
			true
		} else {
			false
		}
	}

	pub fn page_rows(&self) -> Vec<&PatchRow> {
		let start = self.current_page * self.page_size;
		self.filtered_rows()
			.into_iter()
			.skip(start)
			.take(self.page_size)
			.collect()
	}

	pub fn count_text(&self) -> String {
		if self.catalog.is_missing() {
			return format_count_summary(0, 0, false);
		}
		self.pipeline.count_text()
	}

	/// Human status line. "Dataset missing" is never confused with zero matches.
	pub fn status_text(&self) -> String {
		match self.catalog.status() {
			LoadStatus::Idle => "No dataset loaded".to_string(),
			LoadStatus::Loading => "Loading patches...".to_string(),
			LoadStatus::Missing(reason) => format!("Dataset missing: {}", reason),
			LoadStatus::Ready if self.pipeline.shown() == 0 && self.pipeline.is_filtered() => {
				"No patches match the current filters".to_string()
			}
			LoadStatus::Ready => self.count_text(),
		}
	}

	/// Row behind the current detail route, if the dataset has it.
	pub fn selected_patch(&self) -> Option<&PatchRow> {
		self.detail
			.as_ref()
			.and_then(|route| self.catalog.find_by_qfe(&route.pid))
	}

	/// Opens the detail view for a QFE id. The address bar is updated in place.
	pub fn open_detail<B: AddressBar + ?Sized>(&mut self, qfe_id: &str, bar: &mut B) -> bool {
		let Some(row) = self.catalog.find_by_qfe(qfe_id) else {
			return false;
		};
		self.detail = Some(DetailRoute {
			pid: row.qfe_id.clone(),
			pn: slugify(&row.name),
		});
		sync_address_bar(bar, &self.share_query());
		true
	}

	pub fn close_detail<B: AddressBar + ?Sized>(&mut self, bar: &mut B) {
		self.detail = None;
		sync_address_bar(bar, &self.share_query());
	}

	pub fn pipeline(&self) -> &ApplyPipeline {
		&self.pipeline
	}
}
