pub mod csv_export;
pub mod dataset_client;
pub mod file_info;
pub mod logger;
pub mod normalizer;
pub mod options;
pub mod sitemap;
pub mod version;
