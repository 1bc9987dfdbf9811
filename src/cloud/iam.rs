//! Identity service client
//!
//! Password-grant authentication against `/v3/auth/tokens`. The token comes
//! back in the `X-Subject-Token` response header, not the body.

use serde_json::{json, Value};
use tracing::{debug, error};

use super::{excerpt, http_client, IdentityService};
use crate::error::{ReportError, ReportResult};
use crate::models::{Credentials, Token};

/// Response header carrying the issued token
pub const SUBJECT_TOKEN_HEADER: &str = "X-Subject-Token";

/// Blocking client for the identity service
pub struct IamClient {
    http: reqwest::blocking::Client,
    endpoint: String,
}

impl IamClient {
    /// Create a client for `endpoint` (base URL without the `/v3` path)
    pub fn new(endpoint: impl Into<String>, timeout: std::time::Duration) -> ReportResult<Self> {
        Ok(Self::with_client(endpoint, http_client(timeout)?))
    }

    /// Create a client reusing an existing HTTP client
    pub fn with_client(endpoint: impl Into<String>, http: reqwest::blocking::Client) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    fn tokens_url(&self) -> String {
        format!("{}/v3/auth/tokens", self.endpoint)
    }
}

/// Request body for a project-scoped password grant
pub fn auth_request_body(credentials: &Credentials, scope: &str) -> Value {
    json!({
        "auth": {
            "identity": {
                "methods": ["password"],
                "password": {
                    "user": {
                        "name": credentials.username,
                        "password": credentials.password.as_str(),
                        "domain": {
                            "name": credentials.domain_name
                        }
                    }
                }
            },
            "scope": {
                "project": {
                    "name": scope
                }
            }
        }
    })
}

impl IdentityService for IamClient {
    fn issue_token(&self, credentials: &Credentials, scope: &str) -> ReportResult<Token> {
        let url = self.tokens_url();
        debug!(url = %url, user = %credentials.username, scope, "Requesting token");

        let response = self
            .http
            .post(&url)
            .json(&auth_request_body(credentials, scope))
            .send()
            .map_err(|e| {
                error!(error = %e, url = %url, "Failed to obtain token");
                ReportError::Authentication(format!("Token request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            error!(status = %status, body = %excerpt(&body), "Failed to obtain token");
            return Err(ReportError::Authentication(format!(
                "Identity service returned {}: {}",
                status,
                excerpt(&body)
            )));
        }

        let token = response
            .headers()
            .get(SUBJECT_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(Token::new)
            .ok_or_else(|| {
                error!(status = %status, "Identity response carried no token header");
                ReportError::Authentication(format!(
                    "Response has no {} header",
                    SUBJECT_TOKEN_HEADER
                ))
            })?;

        debug!("Token obtained");
        Ok(token)
    }
}
