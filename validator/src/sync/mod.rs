//! Remote report sync.
//!
//! A [`ReportSink`] receives a finished [`Report`]. The validation core never
//! calls a sink; the CLI does, after the report has been persisted, and only
//! when `--sync-sheets` is given.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use csv_email_validator::sync::{ReportSink, SyncConfig, WebhookSink};
//!
//! let sink = WebhookSink::new(SyncConfig::from_env()?)?;
//! sink.deliver(&report).await?;
//! ```

use std::env;
use std::future::Future;
use std::time::Duration;

use crate::error::{SyncError, SyncResult};
use crate::models::Report;

/// Environment variable holding the webhook URL
pub const WEBHOOK_URL_VAR: &str = "SHEETS_WEBHOOK_URL";

/// Environment variable holding the webhook bearer token
pub const WEBHOOK_TOKEN_VAR: &str = "SHEETS_WEBHOOK_TOKEN";

/// Default number of attempts
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Delay between attempts in milliseconds
const RETRY_DELAY_MS: u64 = 1000;

/// Per-request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Something that accepts a finished report.
pub trait ReportSink {
    fn deliver(&self, report: &Report) -> impl Future<Output = SyncResult<()>> + Send;
}

/// Webhook settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub url: String,
    pub token: String,
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl SyncConfig {
    /// Read settings from `SHEETS_WEBHOOK_URL` and `SHEETS_WEBHOOK_TOKEN`.
    ///
    /// Only the process environment is consulted; the binary loads `.env`
    /// once at startup.
    pub fn from_env() -> SyncResult<Self> {
        Self::from_vars(env::var(WEBHOOK_URL_VAR).ok(), env::var(WEBHOOK_TOKEN_VAR).ok())
    }

    /// Build settings from already-read values. Blank values count as unset.
    pub fn from_vars(url: Option<String>, token: Option<String>) -> SyncResult<Self> {
        let url = url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| SyncError::MissingConfig(format!("{} not set", WEBHOOK_URL_VAR)))?;
        let token = token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| SyncError::MissingConfig(format!("{} not set", WEBHOOK_TOKEN_VAR)))?;

        Ok(Self {
            url,
            token,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: Duration::from_millis(RETRY_DELAY_MS),
        })
    }

    pub fn with_retries(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.max_retries = max_retries.max(1);
        self.retry_delay = retry_delay;
        self
    }
}

/// Posts the report as JSON to a webhook.
#[derive(Clone)]
pub struct WebhookSink {
    config: SyncConfig,
    client: reqwest::Client,
}

impl WebhookSink {
    pub fn new(config: SyncConfig) -> SyncResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| SyncError::RequestFailed(e.to_string()))?;
        Ok(Self::with_client(config, client))
    }

    /// Use a preconfigured HTTP client.
    pub fn with_client(config: SyncConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    /// Single delivery attempt
    async fn try_deliver(&self, report: &Report) -> SyncResult<()> {
        let response = self
            .client
            .post(&self.config.url)
            .bearer_auth(&self.config.token)
            .json(report)
            .send()
            .await
            .map_err(|e| SyncError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(SyncError::Rejected { status: status.as_u16(), body })
    }
}

impl ReportSink for WebhookSink {
    async fn deliver(&self, report: &Report) -> SyncResult<()> {
        let mut last_error = None;

        for attempt in 1..=self.config.max_retries {
            match self.try_deliver(report).await {
                Ok(()) => return Ok(()),
                // Client errors will not improve on retry
                Err(SyncError::Rejected { status, body }) if status < 500 => {
                    return Err(SyncError::Rejected { status, body });
                }
                Err(e) => {
                    last_error = Some(e);
                    if attempt < self.config.max_retries {
                        tokio::time::sleep(self.config.retry_delay).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| SyncError::RequestFailed("Unknown error".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ErrorCode, RowError};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn sample_report() -> Report {
        Report {
            total: 2,
            valid: 1,
            invalid: 1,
            errors: vec![RowError::new(3, Some("x@y.co"), ErrorCode::DuplicateEmail)],
        }
    }

    fn sink_for(url: String) -> WebhookSink {
        let config = SyncConfig::from_vars(Some(url), Some("secret".into()))
            .unwrap()
            .with_retries(1, Duration::from_millis(1));
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        WebhookSink::with_client(config, client)
    }

    fn request_complete(buf: &[u8]) -> bool {
        let text = String::from_utf8_lossy(buf);
        let Some(split) = text.find("\r\n\r\n") else {
            return false;
        };
        let length = text[..split]
            .lines()
            .filter_map(|l| l.split_once(':'))
            .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, v)| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        buf.len() >= split + 4 + length
    }

    /// Answer one request with `status_line`, returning the raw request.
    async fn serve_once(status_line: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut buf = vec![0u8; 8192];
            while !request_complete(&received) {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                received.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "{}\r\ncontent-length: 2\r\nconnection: close\r\n\r\nok",
                status_line
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            String::from_utf8_lossy(&received).to_string()
        });

        (format!("http://{}/hook", addr), handle)
    }

    #[test]
    fn test_config_requires_url_and_token() {
        let err = SyncConfig::from_vars(None, Some("t".into())).unwrap_err();
        assert!(err.to_string().contains(WEBHOOK_URL_VAR));

        let err = SyncConfig::from_vars(Some("http://x".into()), Some("  ".into())).unwrap_err();
        assert!(err.to_string().contains(WEBHOOK_TOKEN_VAR));
    }

    #[test]
    fn test_config_defaults() {
        let config = SyncConfig::from_vars(Some("http://x".into()), Some("t".into())).unwrap();
        assert_eq!(config.max_retries, DEFAULT_MAX_RETRIES);
        assert_eq!(config.retry_delay, Duration::from_millis(RETRY_DELAY_MS));
    }

    #[test]
    fn test_from_env_reads_process_environment() {
        env::set_var(WEBHOOK_URL_VAR, "http://hooks.local/report");
        env::set_var(WEBHOOK_TOKEN_VAR, "env-token");

        let config = SyncConfig::from_env();

        env::remove_var(WEBHOOK_URL_VAR);
        env::remove_var(WEBHOOK_TOKEN_VAR);

        let config = config.unwrap();
        assert_eq!(config.url, "http://hooks.local/report");
        assert_eq!(config.token, "env-token");
    }

    #[tokio::test]
    async fn test_webhook_posts_report_with_token() {
        let (url, server) = serve_once("HTTP/1.1 200 OK").await;
        let sink = sink_for(url);

        sink.deliver(&sample_report()).await.unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /hook"));
        assert!(request.to_lowercase().contains("authorization: bearer secret"));
        assert!(request.contains("\"errorCode\":\"DUPLICATE_EMAIL\""));
    }

    #[tokio::test]
    async fn test_webhook_rejection_is_reported() {
        let (url, server) = serve_once("HTTP/1.1 403 Forbidden").await;
        let sink = sink_for(url);

        let err = sink.deliver(&sample_report()).await.unwrap_err();
        server.await.unwrap();

        match err {
            SyncError::Rejected { status, body } => {
                assert_eq!(status, 403);
                assert_eq!(body, "ok");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_webhook_fails() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let sink = sink_for(format!("http://{}/hook", addr));
        let err = sink.deliver(&sample_report()).await.unwrap_err();
        assert!(matches!(err, SyncError::RequestFailed(_)));
    }
}
