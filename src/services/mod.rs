pub mod csv_import;
pub mod failure_cache;
pub mod fetcher;
pub mod indicators;
pub mod portfolio;
pub mod scoring;
pub mod screening;
pub mod valuation;
