//! Service layer for cbr-report
//!
//! The service layer drives the cloud clients, the spreadsheet renderer and
//! the mailer through one report run.

pub mod log_fetcher;
pub mod pipeline;

pub use log_fetcher::LogFetcher;
pub use pipeline::{PipelineConfig, ReportPipeline, RunSummary, VaultReport};
