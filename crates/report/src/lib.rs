//! Daily report generation.
//!
//! Aggregates the day's sale ledger and current inventory into a
//! deterministic raw report, then condenses it through the summarization
//! collaborator. Read-only over the store.

pub mod generator;

pub use generator::{DailyReport, ReportError, ReportGenerator, DEFAULT_LOW_STOCK_THRESHOLD};
