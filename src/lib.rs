//! cbr-report - Daily backup operation-log reports
//!
//! This library implements a scheduled job that authenticates against the
//! identity service, fetches the previous day's backup operation logs, renders
//! one spreadsheet per configured vault, and emails each spreadsheet to that
//! vault's distribution list.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Settings and output path management
//! - `error`: Custom error types
//! - `models`: Time window, operation logs, vault map, credentials
//! - `cloud`: Identity and backup service clients
//! - `export`: Grouping by vault and spreadsheet rendering
//! - `notify`: Report email delivery
//! - `services`: The report pipeline
//! - `handler`: Function entry point
//! - `display`: Terminal formatting for the CLI
//!
//! # Example
//!
//! ```rust,ignore
//! use cbr_report::handler::{handler, EnvContext};
//! use cbr_report::models::ReportWindow;
//! use cbr_report::services::ReportPipeline;
//!
//! let pipeline = ReportPipeline::from_settings(&settings, false)?;
//! handler(&pipeline, &event, &EnvContext, &ReportWindow::yesterday(), |err, result| {
//!     // report completion to the runtime
//! });
//! ```

pub mod cloud;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod handler;
pub mod models;
pub mod notify;
pub mod secret;
pub mod services;

pub use error::ReportError;
