// src/cli.rs

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::view::types::SortField;

#[derive(Debug, Parser)]
#[command(name = "patch-finder", version, about = "Browse, filter and share a patch catalog")]
pub struct Cli {
	/// Settings file. Defaults to the platform config directory.
	#[arg(long, global = true)]
	pub config: Option<PathBuf>,

	/// Catalog URL or path, overriding the settings file.
	#[arg(long, global = true)]
	pub source: Option<String>,

	/// Freshness metadata URL or path, overriding the settings file.
	#[arg(long, global = true)]
	pub meta: Option<String>,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
	/// Print one page of the filtered view and its shareable query string
	List {
		/// Filter state as a query string, e.g. "q=portal&v=11.1|11.3"
		#[arg(long, default_value = "")]
		query: String,

		/// 1-based page number
		#[arg(long, default_value_t = 1)]
		page: usize,

		#[arg(long, value_enum, default_value_t = SortField::None)]
		sort: SortField,

		/// Sort descending
		#[arg(long)]
		desc: bool,
	},

	/// Print filter options with their row counts
	Options,

	/// Write the filtered view to a CSV file
	Export {
		#[arg(long)]
		out: PathBuf,

		#[arg(long, default_value = "")]
		query: String,
	},

	/// Write sitemap index, pages and patches files
	Sitemap {
		#[arg(long)]
		out_dir: PathBuf,

		/// Site root, overriding the settings file
		#[arg(long)]
		base_url: Option<String>,
	},
}
