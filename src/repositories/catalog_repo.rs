// src/repositories/catalog_repo.rs

use log::{error, info, warn};
use serde_json::Value;

use crate::models::filter::FilterOptions;
use crate::models::patch::PatchRow;
use crate::utils::dataset_client::{DatasetClient, DatasetError, Source};
use crate::utils::normalizer::normalize;
use crate::utils::options::derive_options;
use crate::utils::version::VersionComparator;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
	Idle,
	Loading,
	Ready,
	/// Retrieval failed. Distinct from a ready dataset that filters to nothing.
	Missing(String),
}

/// In-memory catalog for one dataset generation.
///
/// The epoch increases whenever a load starts, so a result that arrives for
/// an older epoch is recognized as stale and dropped.
#[derive(Debug)]
pub struct CatalogRepository {
	epoch: u64,
	rows: Vec<PatchRow>,
	options: FilterOptions,
	status: LoadStatus,
	comparator: VersionComparator,
}

impl Default for CatalogRepository {
	fn default() -> Self {
		Self::new()
	}
}

impl CatalogRepository {
	pub fn new() -> Self {
		Self {
			epoch: 0,
			rows: Vec::new(),
			options: FilterOptions::default(),
			status: LoadStatus::Idle,
			comparator: VersionComparator::new(),
		}
	}

	pub fn epoch(&self) -> u64 {
		self.epoch
	}

	pub fn rows(&self) -> &[PatchRow] {
		&self.rows
	}

	pub fn options(&self) -> &FilterOptions {
		&self.options
	}

	pub fn status(&self) -> &LoadStatus {
		&self.status
	}

	pub fn comparator(&self) -> &VersionComparator {
		&self.comparator
	}

	pub fn is_missing(&self) -> bool {
		matches!(self.status, LoadStatus::Missing(_))
	}

	pub fn find_by_qfe(&self, qfe_id: &str) -> Option<&PatchRow> {
		self.rows.iter().find(|row| row.qfe_id == qfe_id)
	}

	/// Starts a new generation and returns its epoch.
	pub fn begin_load(&mut self) -> u64 {
		self.epoch += 1;
		self.status = LoadStatus::Loading;
		self.epoch
	}

	/// Applies a finished load. Returns `false` when `epoch` has been superseded.
	pub fn finish_load(&mut self, epoch: u64, result: Result<Value, DatasetError>) -> bool {
		if epoch != self.epoch {
			warn!(
				"Discarding stale dataset load for epoch {} (current epoch {})",
				epoch, self.epoch
			);
			return false;
		}

		match result {
			Ok(document) => {
				let comparator = VersionComparator::new();
				let rows = normalize(&document, &comparator);
				let options = derive_options(&rows, &comparator);
				info!(
					"Dataset epoch {} ready: {} patches, {} versions, {} products",
					epoch,
					rows.len(),
					options.versions.len(),
					options.products.len()
				);

				self.rows = rows;
				self.options = options;
				self.comparator = comparator;
				self.status = LoadStatus::Ready;
			}
			Err(e) => {
				error!("Dataset missing for epoch {}: {}", epoch, e);
				self.rows = Vec::new();
				self.options = FilterOptions::default();
				self.comparator = VersionComparator::new();
				self.status = LoadStatus::Missing(e.to_string());
			}
		}
		true
	}

	/// Fetches `source` once and installs the result as a new generation.
	pub async fn load(&mut self, client: &DatasetClient, source: &Source) -> &LoadStatus {
		let epoch = self.begin_load();
		info!("Loading dataset from {} (epoch {})", source, epoch);
		let result = client.fetch_document(source).await;
		self.finish_load(epoch, result);
		&self.status
	}
}
