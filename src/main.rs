// src/main.rs

mod cli;
mod config;
mod models;
mod repositories;
mod utils;
mod view;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use config::Settings;
use log::{info, warn};
use models::filter::FilterOption;
use std::path::Path;
use utils::dataset_client::{DatasetClient, DatasetMeta, Source};
use utils::version::SortDirection;
use view::formatters::{format_last_updated, format_release_date, format_row_line};
use view::state::AppState;
use view::types::SortField;
use view::url_state::MemoryAddressBar;

struct App {
	settings: Settings,
	client: DatasetClient,
	state: AppState,
	meta: DatasetMeta,
}

impl App {
	fn new(cli: &Cli) -> Result<Self> {
		let mut settings = match &cli.config {
			Some(path) => config::load_settings_from(path)
				.with_context(|| format!("Failed to load settings from {:?}", path))?,
			None => config::load_settings(),
		};
		if let Some(source) = &cli.source {
			settings.dataset.source = source.clone();
		}
		if let Some(meta) = &cli.meta {
			settings.dataset.meta_source = Some(meta.clone());
		}

		let client = DatasetClient::new(&settings.dataset.user_agent)
			.context("Failed to create dataset client")?;
		let state = AppState::new(settings.view.page_size);

		Ok(App {
			settings,
			client,
			state,
			meta: DatasetMeta::default(),
		})
	}

	async fn load(&mut self) {
		let source = Source::parse(&self.settings.dataset.source);
		self.state.catalog.load(&self.client, &source).await;

		if let Some(meta_source) = &self.settings.dataset.meta_source {
			self.meta = self.client.fetch_meta(&Source::parse(meta_source)).await;
		}
	}

	/// Hydrates and applies `query`, returning the canonical share string.
	fn apply_query(&mut self, query: &str) -> String {
		let mut bar = MemoryAddressBar::with_query(query);
		self.state.hydrate_from(query);
		self.state.apply(&mut bar);
		self.state.share_query()
	}

	fn ensure_ready(&self) -> Result<()> {
		if self.state.catalog.is_missing() {
			bail!("{}", self.state.status_text());
		}
		Ok(())
	}

	fn list(&mut self, query: &str, page: usize, sort: SortField, desc: bool) {
		let share = self.apply_query(query);
		self.state.sort_field = sort;
		self.state.sort_direction = if desc { SortDirection::Desc } else { SortDirection::Asc };

		if page > 1 && !self.state.set_page(page - 1) {
			warn!("Page {} is out of range ({} pages)", page, self.state.total_pages());
		}

		println!("{}", self.state.status_text());
		println!("{}", format_last_updated(self.meta.updated_at));

		if let Some(row) = self.state.selected_patch() {
			println!();
			println!("{} [{}]", row.name, row.qfe_id);
			println!("  Version:  {}", row.version);
			println!("  Products: {}", row.products_tokens.join(", "));
			println!("  Platform: {}", row.platform_tokens.join(", "));
			println!("  Released: {}", format_release_date(row));
			println!("  Critical: {}", row.critical_label);
			if !row.patch_page_url.is_empty() {
				println!("  Page:     {}", row.patch_page_url);
			}
			for file in &row.files {
				println!("  File:     {} ({})", file.filename, file.url);
			}
		} else if self.state.detail.is_some() {
			warn!("Linked patch is not in the current dataset");
		}

		let rows = self.state.page_rows();
		if !rows.is_empty() {
			println!();
			for row in rows {
				println!("{}", format_row_line(row));
			}
			println!();
			println!(
				"Page {} of {}",
				self.state.current_page + 1,
				self.state.total_pages()
			);
		}

		if !share.is_empty() {
			println!("Share: ?{}", share);
		}
	}

	fn print_options(&self) {
		fn section(title: &str, options: &[FilterOption]) {
			println!("{}:", title);
			for option in options {
				println!("  {} ({})", option.value, option.count);
			}
		}

		println!("{}", self.state.status_text());
		let options = self.state.catalog.options();
		section("Products", &options.products);
		section("Versions", &options.versions);
		section("Platforms", &options.platforms);
		section("Types", &options.types);
	}

	fn export(&mut self, out: &Path, query: &str) -> Result<()> {
		self.ensure_ready()?;
		self.apply_query(query);
		let rows = self.state.filtered_rows();
		let count = utils::csv_export::export_patches_to_csv(out, &rows)?;
		println!("Exported {} patches to {}", count, out.display());
		Ok(())
	}

	fn sitemap(&self, out_dir: &Path, base_url: Option<&str>) -> Result<()> {
		self.ensure_ready()?;
		let base_url = base_url.unwrap_or(&self.settings.site.base_url);
		let lastmod = self.meta.lastmod_date();
		let written = utils::sitemap::write_sitemaps(
			out_dir,
			self.state.catalog.rows(),
			base_url,
			lastmod.as_deref(),
		)
		.context("Failed to write sitemaps")?;

		for path in written {
			println!("Wrote {}", path.display());
		}
		Ok(())
	}

	async fn run(&mut self, command: &Command) -> Result<()> {
		self.load().await;

		match command {
			Command::List { query, page, sort, desc } => self.list(query, *page, *sort, *desc),
			Command::Options => self.print_options(),
			Command::Export { out, query } => self.export(out, query)?,
			Command::Sitemap { out_dir, base_url } => self.sitemap(out_dir, base_url.as_deref())?,
		}
		Ok(())
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	utils::logger::init("info");
	let cli = Cli::parse();
	info!("Starting Patch Finder");

	let mut app = App::new(&cli)?;
	app.run(&cli.command).await
}
