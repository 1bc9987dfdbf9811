//! Report pipeline
//!
//! One invocation: authenticate, fetch yesterday's logs, then render and mail
//! one spreadsheet per configured vault that had activity.

use std::path::PathBuf;

use tracing::{error, info, warn};

use super::log_fetcher::LogFetcher;
use crate::cloud::{CbrClient, IamClient, IdentityService, OperationLogSource};
use crate::config::{ReportPaths, Settings, VaultFailurePolicy};
use crate::error::{ReportError, ReportResult};
use crate::export::{group_by_vault, ReportRenderer, VaultPartition};
use crate::models::{Credentials, ReportWindow, VaultEmailMap};
use crate::notify::{ReportDelivery, ReportMailer, SmtpMailer};

/// Static inputs of a pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Project scope requested from the identity service
    pub scope: String,
    pub vault_emails: VaultEmailMap,
    pub paths: ReportPaths,
    pub failure_policy: VaultFailurePolicy,
}

/// Outcome for one vault
#[derive(Debug, Clone)]
pub struct VaultReport {
    pub vault_id: String,
    pub file_name: String,
    pub path: PathBuf,
    pub rows: usize,
    pub recipients: Vec<String>,
    /// Relay response; `None` when the report was not mailed
    pub response: Option<String>,
}

/// Outcome of a complete run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub window: ReportWindow,
    /// Rows kept after dropping deletions
    pub records: usize,
    pub reports: Vec<VaultReport>,
}

/// The scheduled report job
pub struct ReportPipeline {
    config: PipelineConfig,
    identity: Box<dyn IdentityService>,
    logs: Box<dyn OperationLogSource>,
    renderer: ReportRenderer,
    /// `None` renders reports without mailing them
    mailer: Option<Box<dyn ReportMailer>>,
}

impl ReportPipeline {
    /// Assemble a pipeline from its parts
    pub fn new(
        config: PipelineConfig,
        identity: Box<dyn IdentityService>,
        logs: Box<dyn OperationLogSource>,
        mailer: Option<Box<dyn ReportMailer>>,
    ) -> Self {
        Self {
            config,
            identity,
            logs,
            renderer: ReportRenderer::new(),
            mailer,
        }
    }

    /// Build the production pipeline from settings
    ///
    /// With `dry_run` set, no mailer is built and SMTP settings are not required.
    pub fn from_settings(settings: &Settings, dry_run: bool) -> ReportResult<Self> {
        let timeout = settings.http_timeout();
        let identity = IamClient::new(settings.iam_endpoint(), timeout)?;
        let logs = CbrClient::new(settings.cbr_endpoint(), &settings.project_id, timeout)?;
        let mailer: Option<Box<dyn ReportMailer>> = if dry_run {
            None
        } else {
            Some(Box::new(SmtpMailer::new(&settings.smtp)?))
        };

        let config = PipelineConfig {
            scope: settings.region.clone(),
            vault_emails: settings.vault_emails.clone(),
            paths: settings.paths(),
            failure_policy: settings.failure_policy,
        };

        Ok(Self::new(config, Box::new(identity), Box::new(logs), mailer))
    }

    /// Run the job for `window`
    pub fn run(&self, credentials: &Credentials, window: &ReportWindow) -> ReportResult<RunSummary> {
        info!(window = %window, date = %window.date_tag_string(), "Starting report run");

        let token = self
            .identity
            .issue_token(credentials, &self.config.scope)?;
        info!("Token obtained");

        let records = LogFetcher::new(self.logs.as_ref()).fetch(&token, window)?;
        let partitions = group_by_vault(&records, &self.config.vault_emails);

        if partitions.is_empty() {
            info!(records = records.len(), "No configured vault had activity");
        } else {
            self.config.paths.ensure_output_dir()?;
        }

        let date_tag = window.date_tag_string();
        let mut reports = Vec::with_capacity(partitions.len());
        let mut failures: Vec<(String, ReportError)> = Vec::new();

        for partition in &partitions {
            match self.process_vault(partition, &date_tag) {
                Ok(report) => reports.push(report),
                Err(e) => {
                    error!(vault = partition.vault_id, stage = e.stage(), error = %e, "Vault report failed");
                    match self.config.failure_policy {
                        VaultFailurePolicy::Abort => return Err(e),
                        VaultFailurePolicy::Continue => {
                            failures.push((partition.vault_id.to_string(), e));
                        }
                    }
                }
            }
        }

        if !failures.is_empty() {
            return Err(combine_failures(failures));
        }

        info!(reports = reports.len(), "Report run complete");
        Ok(RunSummary {
            window: *window,
            records: records.len(),
            reports,
        })
    }

    fn process_vault(
        &self,
        partition: &VaultPartition<'_>,
        date_tag: &str,
    ) -> ReportResult<VaultReport> {
        let paths = &self.config.paths;
        let file_name = paths.report_file_name(partition.vault_id, date_tag);
        let path = paths.report_file(partition.vault_id, date_tag);

        let rows = self
            .renderer
            .render(partition.records.iter().copied(), &path)?;
        info!(vault = partition.vault_id, rows, path = %path.display(), "Report rendered");

        let response = match &self.mailer {
            Some(mailer) => Some(mailer.send_report(&ReportDelivery {
                path: &path,
                file_name: &file_name,
                recipients: partition.recipients,
            })?),
            None => {
                warn!(vault = partition.vault_id, "Mailing disabled; report not sent");
                None
            }
        };

        Ok(VaultReport {
            vault_id: partition.vault_id.to_string(),
            file_name,
            path,
            rows,
            recipients: partition.recipients.to_vec(),
            response,
        })
    }
}

/// Fold per-vault failures into one error naming every failed vault
///
/// The result is a render error if any vault failed to render, otherwise a
/// notification error.
fn combine_failures(failures: Vec<(String, ReportError)>) -> ReportError {
    let any_render = failures
        .iter()
        .any(|(_, e)| matches!(e, ReportError::Render(_)));

    let detail = failures
        .iter()
        .map(|(vault, e)| format!("{} ({})", vault, e))
        .collect::<Vec<_>>()
        .join("; ");
    let message = format!("{} vault report(s) failed: {}", failures.len(), detail);

    if any_render {
        ReportError::Render(message)
    } else {
        ReportError::Notification(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OperationLogList, RawOperationLog, Token};
    use chrono::NaiveDate;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Calls {
        scopes: Vec<String>,
        fetches: usize,
        sent: Vec<(String, Vec<String>)>,
    }

    type Shared = Rc<RefCell<Calls>>;

    struct FakeIdentity {
        calls: Shared,
        fail: bool,
    }

    impl IdentityService for FakeIdentity {
        fn issue_token(&self, _credentials: &Credentials, scope: &str) -> ReportResult<Token> {
            self.calls.borrow_mut().scopes.push(scope.to_string());
            if self.fail {
                Err(ReportError::Authentication("status 401".into()))
            } else {
                Ok(Token::new("tok"))
            }
        }
    }

    struct FakeLogs {
        calls: Shared,
        logs: Option<Vec<RawOperationLog>>,
    }

    impl OperationLogSource for FakeLogs {
        fn list_operation_logs(
            &self,
            token: &Token,
            _window: &ReportWindow,
        ) -> ReportResult<OperationLogList> {
            assert_eq!(token.as_str(), "tok");
            self.calls.borrow_mut().fetches += 1;
            match &self.logs {
                Some(logs) => Ok(OperationLogList {
                    operation_logs: logs.clone(),
                    count: Some(logs.len() as u64),
                }),
                None => Err(ReportError::LogFetch("status 500".into())),
            }
        }
    }

    struct FakeMailer {
        calls: Shared,
        fail_for: Option<&'static str>,
    }

    impl ReportMailer for FakeMailer {
        fn send_report(&self, delivery: &ReportDelivery<'_>) -> ReportResult<String> {
            assert!(delivery.path.exists());
            if self
                .fail_for
                .is_some_and(|vault| delivery.file_name.contains(vault))
            {
                return Err(ReportError::Notification("relay refused".into()));
            }
            self.calls.borrow_mut().sent.push((
                delivery.file_name.to_string(),
                delivery.recipients.to_vec(),
            ));
            Ok("250 OK".into())
        }
    }

    fn raw(id: &str, operation_type: &str, vault_id: &str) -> RawOperationLog {
        RawOperationLog {
            id: id.into(),
            operation_type: operation_type.into(),
            status: "success".into(),
            vault_id: vault_id.into(),
            started_at: Some("2024-03-14T10:00:00Z".into()),
            ..Default::default()
        }
    }

    fn window() -> ReportWindow {
        ReportWindow::for_day(NaiveDate::from_ymd_opt(2024, 3, 14).unwrap())
    }

    fn credentials() -> Credentials {
        Credentials::new("user", "pw", "domain").unwrap()
    }

    struct Harness {
        calls: Shared,
        dir: TempDir,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                calls: Shared::default(),
                dir: TempDir::new().unwrap(),
            }
        }

        fn pipeline(
            &self,
            vault_emails: &str,
            logs: Option<Vec<RawOperationLog>>,
            auth_fails: bool,
            policy: VaultFailurePolicy,
            mail_fails_for: Option<&'static str>,
        ) -> ReportPipeline {
            let config = PipelineConfig {
                scope: "tr-west-1".into(),
                vault_emails: vault_emails.parse().unwrap(),
                paths: ReportPaths::with_output_dir(self.dir.path().join("out")),
                failure_policy: policy,
            };
            ReportPipeline::new(
                config,
                Box::new(FakeIdentity {
                    calls: self.calls.clone(),
                    fail: auth_fails,
                }),
                Box::new(FakeLogs {
                    calls: self.calls.clone(),
                    logs,
                }),
                Some(Box::new(FakeMailer {
                    calls: self.calls.clone(),
                    fail_for: mail_fails_for,
                })),
            )
        }

        fn report_path(&self, vault: &str) -> PathBuf {
            self.dir
                .path()
                .join("out")
                .join(format!("Backup_Reports-{}-(2024-03-14).xlsx", vault))
        }
    }

    #[test]
    fn test_only_vaults_with_rows_are_mailed() {
        let harness = Harness::new();
        let pipeline = harness.pipeline(
            r#"{"v1": ["a@x.com"], "v2": ["b@x.com"]}"#,
            Some(vec![
                raw("t1", "backup", "v1"),
                raw("t2", "delete", "v1"),
                raw("t3", "backup", "v3"),
            ]),
            false,
            VaultFailurePolicy::Abort,
            None,
        );

        let summary = pipeline.run(&credentials(), &window()).unwrap();

        assert_eq!(summary.records, 2);
        assert_eq!(summary.reports.len(), 1);
        assert_eq!(summary.reports[0].vault_id, "v1");
        assert_eq!(summary.reports[0].rows, 1);
        assert_eq!(summary.reports[0].response.as_deref(), Some("250 OK"));

        let calls = harness.calls.borrow();
        assert_eq!(calls.scopes, vec!["tr-west-1"]);
        assert_eq!(
            calls.sent,
            vec![(
                "Backup_Reports-v1-(2024-03-14).xlsx".to_string(),
                vec!["a@x.com".to_string()]
            )]
        );
        assert!(harness.report_path("v1").exists());
        assert!(!harness.report_path("v2").exists());
        assert!(!harness.report_path("v3").exists());
    }

    #[test]
    fn test_auth_failure_stops_before_fetch() {
        let harness = Harness::new();
        let pipeline = harness.pipeline(
            r#"{"v1": ["a@x.com"]}"#,
            Some(vec![raw("t1", "backup", "v1")]),
            true,
            VaultFailurePolicy::Abort,
            None,
        );

        let err = pipeline.run(&credentials(), &window()).unwrap_err();

        assert!(matches!(err, ReportError::Authentication(_)));
        let calls = harness.calls.borrow();
        assert_eq!(calls.fetches, 0);
        assert!(calls.sent.is_empty());
    }

    #[test]
    fn test_fetch_failure_writes_nothing() {
        let harness = Harness::new();
        let pipeline = harness.pipeline(
            r#"{"v1": ["a@x.com"]}"#,
            None,
            false,
            VaultFailurePolicy::Continue,
            None,
        );

        let err = pipeline.run(&credentials(), &window()).unwrap_err();

        assert!(matches!(err, ReportError::LogFetch(_)));
        assert!(harness.calls.borrow().sent.is_empty());
        assert!(!harness.dir.path().join("out").exists());
    }

    #[test]
    fn test_no_activity_succeeds_without_mail() {
        let harness = Harness::new();
        let pipeline = harness.pipeline(
            r#"{"v1": ["a@x.com"]}"#,
            Some(vec![raw("t1", "delete", "v1")]),
            false,
            VaultFailurePolicy::Abort,
            None,
        );

        let summary = pipeline.run(&credentials(), &window()).unwrap();
        assert!(summary.reports.is_empty());
        assert!(harness.calls.borrow().sent.is_empty());
    }

    #[test]
    fn test_abort_policy_stops_at_first_failure() {
        let harness = Harness::new();
        let pipeline = harness.pipeline(
            r#"{"v1": ["a@x.com"], "v2": ["b@x.com"]}"#,
            Some(vec![raw("t1", "backup", "v1"), raw("t2", "backup", "v2")]),
            false,
            VaultFailurePolicy::Abort,
            Some("-v1-"),
        );

        let err = pipeline.run(&credentials(), &window()).unwrap_err();

        assert!(matches!(err, ReportError::Notification(_)));
        assert!(harness.calls.borrow().sent.is_empty());
        assert!(!harness.report_path("v2").exists());
    }

    #[test]
    fn test_continue_policy_finishes_remaining_vaults() {
        let harness = Harness::new();
        let pipeline = harness.pipeline(
            r#"{"v1": ["a@x.com"], "v2": ["b@x.com"]}"#,
            Some(vec![raw("t1", "backup", "v1"), raw("t2", "backup", "v2")]),
            false,
            VaultFailurePolicy::Continue,
            Some("-v1-"),
        );

        let err = pipeline.run(&credentials(), &window()).unwrap_err();

        match err {
            ReportError::Notification(msg) => {
                assert!(msg.starts_with("1 vault report(s) failed"));
                assert!(msg.contains("v1"));
            }
            other => panic!("unexpected error: {other}"),
        }
        let calls = harness.calls.borrow();
        assert_eq!(calls.sent.len(), 1);
        assert_eq!(calls.sent[0].1, vec!["b@x.com".to_string()]);
    }

    #[test]
    fn test_dry_run_renders_without_mailing() {
        let harness = Harness::new();
        let config = PipelineConfig {
            scope: "tr-west-1".into(),
            vault_emails: r#"{"v1": ["a@x.com"]}"#.parse().unwrap(),
            paths: ReportPaths::with_output_dir(harness.dir.path().join("out")),
            failure_policy: VaultFailurePolicy::Abort,
        };
        let pipeline = ReportPipeline::new(
            config,
            Box::new(FakeIdentity {
                calls: harness.calls.clone(),
                fail: false,
            }),
            Box::new(FakeLogs {
                calls: harness.calls.clone(),
                logs: Some(vec![raw("t1", "backup", "v1")]),
            }),
            None,
        );

        let summary = pipeline.run(&credentials(), &window()).unwrap();

        assert_eq!(summary.reports.len(), 1);
        assert!(summary.reports[0].response.is_none());
        assert!(harness.report_path("v1").exists());
    }

    #[test]
    fn test_combine_failures_prefers_render() {
        let err = combine_failures(vec![
            ("v1".into(), ReportError::Notification("x".into())),
            ("v2".into(), ReportError::Render("y".into())),
        ]);
        assert!(matches!(err, ReportError::Render(ref m) if m.contains("v1") && m.contains("v2")));
    }
}
