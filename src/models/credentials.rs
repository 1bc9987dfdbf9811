//! Identity credentials and bearer tokens

use crate::error::{ReportError, ReportResult};
use crate::secret::SecureString;

/// User-data key holding the IAM user name
pub const USERNAME_KEY: &str = "HUAWEI_CLOUD_USERNAME";
/// User-data key holding the IAM password
pub const PASSWORD_KEY: &str = "HUAWEI_CLOUD_PASSWORD";
/// User-data key holding the account (domain) name
pub const DOMAIN_NAME_KEY: &str = "HUAWEI_CLOUD_DOMAIN_NAME";

/// Password-grant credentials for one invocation
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecureString,
    pub domain_name: String,
}

impl Credentials {
    /// Create credentials, rejecting empty values
    pub fn new(
        username: impl Into<String>,
        password: impl Into<SecureString>,
        domain_name: impl Into<String>,
    ) -> ReportResult<Self> {
        let credentials = Self {
            username: username.into(),
            password: password.into(),
            domain_name: domain_name.into(),
        };

        if credentials.username.trim().is_empty() {
            return Err(ReportError::Config("username must not be empty".into()));
        }
        if credentials.password.is_empty() {
            return Err(ReportError::Config("password must not be empty".into()));
        }
        if credentials.domain_name.trim().is_empty() {
            return Err(ReportError::Config("domain name must not be empty".into()));
        }

        Ok(credentials)
    }
}

/// Bearer token issued by the identity service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token(SecureString);

impl Token {
    pub fn new(value: impl Into<SecureString>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}
