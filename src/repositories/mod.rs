pub mod catalog_repo;
