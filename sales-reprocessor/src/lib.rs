pub mod reprocessor;
