// src/utils/dataset_client.rs

use chrono::{DateTime, NaiveDateTime, Utc};
use log::{debug, info, warn};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::StatusCode;
use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_USER_AGENT: &str = "Patch-Finder/0.1";

#[derive(Debug, Error)]
pub enum DatasetError {
	#[error("request to {url} failed: {source}")]
	Request {
		url: String,
		#[source]
		source: reqwest::Error,
	},

	#[error("request to {url} returned status {status}")]
	Status { url: String, status: StatusCode },

	#[error("failed to read {path:?}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("document from {origin} is not valid JSON: {source}")]
	Parse {
		origin: String,
		#[source]
		source: serde_json::Error,
	},

	#[error("failed to create HTTP client: {0}")]
	Client(#[source] reqwest::Error),
}

/// Where a JSON document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
	Remote(String),
	Local(PathBuf),
}

impl Source {
	/// `http(s)://` is remote, anything else is a filesystem path.
	pub fn parse(value: &str) -> Self {
		let trimmed = value.trim();
		let lowered = trimmed.to_lowercase();
		if lowered.starts_with("http://") || lowered.starts_with("https://") {
			Source::Remote(trimmed.to_string())
		} else {
			Source::Local(PathBuf::from(trimmed))
		}
	}
}

impl std::fmt::Display for Source {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Source::Remote(url) => write!(f, "{}", url),
			Source::Local(path) => write!(f, "{}", path.display()),
		}
	}
}

/// Dataset freshness hint. Never affects filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetMeta {
	pub updated_at: Option<DateTime<Utc>>,
}

impl DatasetMeta {
	/// Reads `updated_at_utc` (or `updated_at`); anything unusable yields an empty hint.
	pub fn from_document(document: &Value) -> Self {
		let raw = ["updated_at_utc", "updated_at"]
			.iter()
			.find_map(|key| document.get(*key).and_then(Value::as_str))
			.map(str::trim)
			.unwrap_or_default();

		Self {
			updated_at: parse_timestamp(raw),
		}
	}

	pub fn lastmod_date(&self) -> Option<String> {
		self.updated_at.map(|ts| ts.format("%Y-%m-%d").to_string())
	}
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
	if raw.is_empty() {
		return None;
	}
	if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
		return Some(ts.with_timezone(&Utc));
	}
	NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
		.ok()
		.map(|naive| naive.and_utc())
}

#[derive(Clone)]
pub struct DatasetClient {
	client: reqwest::Client,
}

impl DatasetClient {
	pub fn new(user_agent: &str) -> Result<Self, DatasetError> {
		let mut headers = HeaderMap::new();
		let agent = HeaderValue::from_str(user_agent)
			.unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT));
		headers.insert(USER_AGENT, agent);

		let client = reqwest::Client::builder()
			.default_headers(headers)
			.build()
			.map_err(DatasetError::Client)?;

		Ok(Self { client })
	}

	/// Fetches and parses one JSON document. One attempt, no retries.
	pub async fn fetch_document(&self, source: &Source) -> Result<Value, DatasetError> {
		let body = match source {
			Source::Remote(url) => self.fetch_remote(url).await?,
			Source::Local(path) => {
				debug!("Reading dataset document from {:?}", path);
				tokio::fs::read_to_string(path)
					.await
					.map_err(|source| DatasetError::Io {
						path: path.clone(),
						source,
					})?
			}
		};

		serde_json::from_str(&body).map_err(|err| DatasetError::Parse {
			origin: source.to_string(),
			source: err,
		})
	}

	async fn fetch_remote(&self, url: &str) -> Result<String, DatasetError> {
		debug!("Fetching dataset document from {}", url);

		let response = self
			.client
			.get(url)
			.send()
			.await
			.map_err(|source| DatasetError::Request {
				url: url.to_string(),
				source,
			})?;

		if !response.status().is_success() {
			return Err(DatasetError::Status {
				url: url.to_string(),
				status: response.status(),
			});
		}

		response.text().await.map_err(|source| DatasetError::Request {
			url: url.to_string(),
			source,
		})
	}

	/// Metadata is optional: every failure collapses into an empty hint.
	pub async fn fetch_meta(&self, source: &Source) -> DatasetMeta {
		match self.fetch_document(source).await {
			Ok(document) => {
				let meta = DatasetMeta::from_document(&document);
				info!("Dataset metadata loaded from {}", source);
				meta
			}
			Err(e) => {
				warn!("Dataset metadata unavailable: {}", e);
				DatasetMeta::default()
			}
		}
	}
}
