// Application layer - Coverage use cases and the dataset port
pub mod classifier;
pub mod completer;
pub mod coverage_service;
pub mod dataset_repository;
pub mod resolver;
