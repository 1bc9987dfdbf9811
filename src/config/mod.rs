//! Configuration module for cbr-report
//!
//! This module provides configuration management including:
//! - Environment-backed runtime settings
//! - SMTP relay settings
//! - Report output paths

pub mod paths;
pub mod settings;

pub use paths::ReportPaths;
pub use settings::{Settings, SmtpSettings, VaultFailurePolicy};
