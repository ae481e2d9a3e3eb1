pub mod aggregator;
pub mod config;
pub mod error;
