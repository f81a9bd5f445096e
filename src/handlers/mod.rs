// Handler modules
pub mod reap;

pub use reap::{ReapOptions, ReapSummary, handle_reap};
