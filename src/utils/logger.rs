use env_logger::{Builder, Env};

/// `RUST_LOG` wins over `default_filter`. Call once, at startup.
pub fn init(default_filter: &str) {
	Builder::from_env(Env::default().default_filter_or(default_filter))
		.format_timestamp_millis()
		.format_module_path(true)
		.init();
}
