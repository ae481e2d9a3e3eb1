pub mod audit;
pub mod error;
pub mod event;
pub mod memory;
pub mod metrics;
pub mod records;
pub mod store;
pub mod time;
