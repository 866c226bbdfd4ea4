//! REST Table Backend
//!
//! Implementation of `PaymentStore` that inserts one row per submission into
//! a PostgREST-style endpoint (`POST {base_url}/rest/v1/{table}`).

use std::time::Duration;

use async_trait::async_trait;
use card_form::{FormError, PaymentRecord, PaymentStore, Result};
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;

/// REST backend configuration
#[derive(Clone)]
pub struct StoreConfig {
    /// Project base URL
    pub base_url: String,

    /// API key, sent as `apikey` and as the bearer token
    pub api_key: String,

    /// Target table
    pub table: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:54321".into(),
            api_key: String::new(),
            table: "payments".into(),
            timeout_secs: 30,
        }
    }
}

impl StoreConfig {
    /// Read `CARD_STORE_URL`, `CARD_STORE_API_KEY`, `CARD_STORE_TABLE` and
    /// `CARD_STORE_TIMEOUT_SECS`. URL and key are required.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = lookup("CARD_STORE_URL")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| FormError::Config("CARD_STORE_URL not set".into()))?;
        let api_key = lookup("CARD_STORE_API_KEY")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| FormError::Config("CARD_STORE_API_KEY not set".into()))?;

        let defaults = Self::default();
        let table = lookup("CARD_STORE_TABLE")
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.table);
        let timeout_secs = lookup("CARD_STORE_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.timeout_secs);

        Ok(Self {
            base_url,
            api_key,
            table,
            timeout_secs,
        })
    }

    /// Insert endpoint for the configured table
    pub fn endpoint(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url.trim_end_matches('/'), self.table)
    }
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("table", &self.table)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// REST payment store
#[derive(Debug)]
pub struct RestPaymentStore {
    client: reqwest::Client,
    config: StoreConfig,
}

impl RestPaymentStore {
    /// Create from configuration
    pub fn from_config(config: StoreConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FormError::Config(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_config(StoreConfig::from_env()?)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }
}

#[async_trait]
impl PaymentStore for RestPaymentStore {
    async fn insert(&self, record: &PaymentRecord) -> Result<()> {
        let url = self.config.endpoint();
        tracing::debug!(url = %url, "Inserting payment record");

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
            .header(CONTENT_TYPE, "application/json")
            .header("Prefer", "return=minimal")
            .body(request_body(record)?)
            .send()
            .await
            .map_err(|e| FormError::submission(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        Err(rejection(status, &self.config.table, response.text().await))
    }

    fn name(&self) -> &str {
        "RestPaymentStore"
    }
}

/// Error payload returned by the table endpoint or its gateway
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

/// One-row JSON array, the insert shape the table endpoint expects
fn request_body(record: &PaymentRecord) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(&[record])?)
}

/// Map a non-success response to a submission failure
fn rejection<E: std::fmt::Display>(
    status: StatusCode,
    table: &str,
    body: std::result::Result<String, E>,
) -> FormError {
    match body {
        Ok(body) => {
            tracing::warn!(status = %status, table = %table, "Storage rejected payment record");
            FormError::SubmissionFailed(error_message(&body))
        }
        Err(e) => {
            tracing::warn!(
                status = %status,
                table = %table,
                body_error = %e,
                "Storage rejected payment record, error body unreadable"
            );
            FormError::SubmissionFailed(None)
        }
    }
}

/// Pull a readable message out of an error response body
fn error_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    [parsed.message, parsed.error_description, parsed.error]
        .into_iter()
        .flatten()
        .find(|m| !m.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.table, "payments");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_config_from_lookup() {
        let config = StoreConfig::from_lookup(lookup(&[
            ("CARD_STORE_URL", "https://project.example.co/"),
            ("CARD_STORE_API_KEY", "anon-key"),
            ("CARD_STORE_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.table, "payments");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.endpoint(), "https://project.example.co/rest/v1/payments");
    }

    #[test]
    fn test_config_requires_url_and_key() {
        let err = StoreConfig::from_lookup(lookup(&[("CARD_STORE_API_KEY", "k")])).unwrap_err();
        assert!(matches!(err, FormError::Config(_)));
        assert!(!err.is_retryable());

        let err = StoreConfig::from_lookup(lookup(&[("CARD_STORE_URL", "http://x")])).unwrap_err();
        assert!(err.to_string().contains("CARD_STORE_API_KEY"));
    }

    #[test]
    fn test_config_debug_hides_key() {
        let config = StoreConfig {
            api_key: "secret-key".into(),
            ..StoreConfig::default()
        };
        assert!(!format!("{config:?}").contains("secret-key"));
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(r#"{"code":"42P01","message":"relation \"payments\" does not exist"}"#),
            Some("relation \"payments\" does not exist".into())
        );
        assert_eq!(
            error_message(r#"{"error":"invalid_grant","error_description":"Invalid API key"}"#),
            Some("Invalid API key".into())
        );
        assert_eq!(error_message(r#"{"message":""}"#), None);
        assert_eq!(error_message("<html>bad gateway</html>"), None);
        assert_eq!(error_message(""), None);
    }

    #[test]
    fn test_request_body_is_single_row_array() {
        let record = PaymentRecord::from_snapshot(&card_form::FormSnapshot::default(), chrono::Utc::now());
        let bytes = request_body(&record).unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.as_array().map(Vec::len), Some(1));
        assert_eq!(body[0]["card_brand"], "unknown");
        assert_eq!(body[0]["cvv"], "");
    }

    #[test]
    fn test_rejection_uses_body_message() {
        let err = rejection::<String>(
            StatusCode::NOT_FOUND,
            "payments",
            Ok(r#"{"message":"relation \"payments\" does not exist"}"#.into()),
        );
        assert_eq!(err.user_message(), "relation \"payments\" does not exist");
    }

    #[test]
    fn test_rejection_with_unreadable_body_falls_back() {
        let err = rejection(
            StatusCode::BAD_GATEWAY,
            "payments",
            Err("connection reset while reading body"),
        );
        assert!(matches!(err, FormError::SubmissionFailed(None)));
        assert_eq!(err.user_message(), card_form::FALLBACK_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_transport_error_fails_submission() {
        // An unparseable URL fails inside reqwest before any socket opens
        let store = RestPaymentStore::from_config(StoreConfig {
            base_url: "not a url".into(),
            api_key: "k".into(),
            ..StoreConfig::default()
        })
        .unwrap();

        let record = PaymentRecord::from_snapshot(&card_form::FormSnapshot::default(), chrono::Utc::now());
        let err = store.insert(&record).await.unwrap_err();
        assert!(matches!(err, FormError::SubmissionFailed(Some(_))));
    }
}
