//! Core data models for cbr-report
//!
//! This module contains the types that flow through the report pipeline:
//! the reported time window, raw and normalized operation logs, the vault
//! distribution lists, and the identity credentials.

pub mod credentials;
pub mod log_record;
pub mod vault_map;
pub mod window;

pub use credentials::{Credentials, Token};
pub use log_record::{LogRecord, OperationLogList, RawOperationLog};
pub use vault_map::{VaultEmailMap, VaultRecipients};
pub use window::ReportWindow;
