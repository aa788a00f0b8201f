// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod dataset_fetcher;
pub mod http_response;
pub mod owid_repository;
