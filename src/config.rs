// src/config.rs

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::utils::dataset_client::DEFAULT_USER_AGENT;
use crate::view::state::DEFAULT_PAGE_SIZE;

const CONFIG_DIR: &str = "patch-finder";
const CONFIG_FILENAME: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("failed to read settings file {path:?}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to parse settings file {path:?}: {source}")]
	Parse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetSettings {
	/// URL or path of the patch catalog.
	pub source: String,
	/// URL or path of the optional freshness metadata.
	pub meta_source: Option<String>,
	pub user_agent: String,
}

impl Default for DatasetSettings {
	fn default() -> Self {
		Self {
			source: "patches.json".to_string(),
			meta_source: Some("patches.meta.json".to_string()),
			user_agent: DEFAULT_USER_AGENT.to_string(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSettings {
	pub base_url: String,
}

impl Default for SiteSettings {
	fn default() -> Self {
		Self {
			base_url: "https://ceddc.github.io/simple-patch-finder/".to_string(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
	pub page_size: usize,
}

impl Default for ViewSettings {
	fn default() -> Self {
		Self {
			page_size: DEFAULT_PAGE_SIZE,
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
	pub dataset: DatasetSettings,
	pub site: SiteSettings,
	pub view: ViewSettings,
}

/// `<config dir>/patch-finder/config.toml`, when the platform has a config dir.
pub fn default_settings_path() -> Option<PathBuf> {
	dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILENAME))
}

/// Reads an explicit settings file. Errors are reported, not defaulted.
pub fn load_settings_from(path: &Path) -> Result<Settings, ConfigError> {
	let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
		path: path.to_path_buf(),
		source,
	})?;
	toml::from_str(&content).map_err(|source| ConfigError::Parse {
		path: path.to_path_buf(),
		source,
	})
}

/// Reads the implicit settings file, falling back to defaults on any problem.
pub fn load_settings() -> Settings {
	let Some(path) = default_settings_path() else {
		warn!("Could not determine settings path, using defaults");
		return Settings::default();
	};

	match load_settings_from(&path) {
		Ok(settings) => {
			info!("Loaded settings from {:?}", path);
			settings
		}
		Err(ConfigError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
			info!("No settings file at {:?}, using defaults", path);
			Settings::default()
		}
		Err(e) => {
			warn!("{}, using defaults", e);
			Settings::default()
		}
	}
}
