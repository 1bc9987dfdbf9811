//! Runtime settings for cbr-report
//!
//! Every setting is a command-line flag with an environment variable
//! fallback, so the scheduled function is configured purely through its
//! environment while the CLI can override any value.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, ValueEnum};

use super::paths::ReportPaths;
use crate::models::VaultEmailMap;
use crate::secret::SecureString;

/// Relay used when `SMTP_HOST` is not set
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";

/// STARTTLS submission port
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// What to do when rendering or sending one vault's report fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum VaultFailurePolicy {
    /// Stop at the first failing vault
    #[default]
    Abort,
    /// Log the failure, finish the remaining vaults, then fail
    Continue,
}

/// Outbound mail relay settings
#[derive(Debug, Clone, Args)]
pub struct SmtpSettings {
    /// SMTP relay host
    #[arg(long = "smtp-host", env = "SMTP_HOST", default_value = DEFAULT_SMTP_HOST)]
    pub host: String,

    /// SMTP relay port (STARTTLS)
    #[arg(long = "smtp-port", env = "SMTP_PORT", default_value_t = DEFAULT_SMTP_PORT)]
    pub port: u16,

    /// SMTP login user (required unless reports are not mailed)
    #[arg(long = "smtp-user", env = "SMTP_USER")]
    pub user: Option<String>,

    /// Sender mailbox (defaults to the login user)
    #[arg(long = "smtp-from", env = "SMTP_FROM")]
    pub from: Option<String>,

    /// SMTP login password (required unless reports are not mailed)
    #[arg(long = "smtp-pass", env = "SMTP_PASS", hide_env_values = true)]
    pub password: Option<SecureString>,
}

impl SmtpSettings {
    /// Mailbox used in the `From` header
    pub fn sender(&self) -> Option<&str> {
        self.from.as_deref().or(self.user.as_deref())
    }
}

/// Settings for one report run
#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// Region, also used as the project scope name when authenticating
    #[arg(long, env = "REGION")]
    pub region: String,

    /// Project id of the backup service
    #[arg(long, env = "PROJECT_ID")]
    pub project_id: String,

    /// JSON object mapping vault ids to recipient lists
    #[arg(long, env = "VAULT_EMAILS", default_value = "{}", hide_env_values = true)]
    pub vault_emails: VaultEmailMap,

    /// Identity service base URL (defaults to the regional endpoint)
    #[arg(long, env = "IAM_ENDPOINT")]
    pub iam_endpoint: Option<String>,

    /// Backup service base URL (defaults to the regional endpoint)
    #[arg(long, env = "CBR_ENDPOINT")]
    pub cbr_endpoint: Option<String>,

    /// Directory reports are written to (defaults to the system temp dir)
    #[arg(long, env = "REPORT_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Timeout applied to every HTTP request, in seconds
    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value_t = 30)]
    pub http_timeout_secs: u64,

    /// Behaviour when one vault's report fails
    #[arg(long, env = "VAULT_FAILURE_POLICY", value_enum, default_value_t = VaultFailurePolicy::Abort)]
    pub failure_policy: VaultFailurePolicy,

    #[command(flatten)]
    pub smtp: SmtpSettings,
}

impl Settings {
    /// Identity service base URL
    pub fn iam_endpoint(&self) -> String {
        self.iam_endpoint
            .as_deref()
            .map(trim_base_url)
            .unwrap_or_else(|| format!("https://iam.{}.myhuaweicloud.com", self.region))
    }

    /// Backup service base URL
    pub fn cbr_endpoint(&self) -> String {
        self.cbr_endpoint
            .as_deref()
            .map(trim_base_url)
            .unwrap_or_else(|| format!("https://cbr.{}.myhuaweicloud.com", self.region))
    }

    /// HTTP client timeout
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Output paths for this run
    pub fn paths(&self) -> ReportPaths {
        match &self.output_dir {
            Some(dir) => ReportPaths::with_output_dir(dir.clone()),
            None => ReportPaths::new(),
        }
    }
}

fn trim_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}
