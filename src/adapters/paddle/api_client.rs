//! Paddle vendor API adapter.
//!
//! Implements `PaddleApi` against Paddle Classic's vendor API (`/api/2.0/`).
//! Every request carries `vendor_id` and `vendor_auth_code` in its JSON body.
//! Responses are wrapped in an envelope:
//!
//! ```json
//! {"success": true, "response": [...]}
//! {"success": false, "error": {"code": 107, "message": "..."}}
//! ```
//!
//! # Configuration
//!
//! ```ignore
//! let config = PaddleApiConfig::new("12345", api_key).with_timeout(Duration::from_secs(5));
//! let client = PaddleApiClient::new(config)?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Map, Value};

use crate::domain::billing::PlanData;
use crate::domain::foundation::PlanId;
use crate::ports::{PaddleApi, PaddleApiError};

pub const DEFAULT_API_BASE_URL: &str = "https://vendors.paddle.com/api/2.0/";
pub const SANDBOX_API_BASE_URL: &str = "https://sandbox-vendors.paddle.com/api/2.0/";

const PLANS_URI: &str = "subscription/plans";

/// Paddle API configuration.
#[derive(Clone)]
pub struct PaddleApiConfig {
    vendor_id: String,

    /// Vendor auth code from the Paddle dashboard.
    api_key: SecretString,

    /// Base URL including the trailing slash.
    api_base_url: String,

    timeout: Duration,
}

impl PaddleApiConfig {
    pub fn new(vendor_id: impl Into<String>, api_key: SecretString) -> Self {
        Self {
            vendor_id: vendor_id.into(),
            api_key,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Set a custom API base URL (sandbox or testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let mut url = url.into();
        if !url.ends_with('/') {
            url.push('/');
        }
        self.api_base_url = url;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn url(&self, uri: &str) -> String {
        format!("{}{}", self.api_base_url, uri)
    }

    /// Request body: auth fields merged with `data`.
    fn body(&self, data: Map<String, Value>) -> Value {
        let mut body = Map::new();
        body.insert("vendor_id".to_string(), Value::String(self.vendor_id.clone()));
        body.insert(
            "vendor_auth_code".to_string(),
            Value::String(self.api_key.expose_secret().clone()),
        );
        body.extend(data);
        Value::Object(body)
    }
}

/// Paddle vendor API client.
pub struct PaddleApiClient {
    config: PaddleApiConfig,
    http_client: reqwest::Client,
}

impl PaddleApiClient {
    /// Create a client with a bounded request timeout.
    pub fn new(config: PaddleApiConfig) -> Result<Self, PaddleApiError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PaddleApiError::Transport(e.to_string()))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Issue a GET with a JSON body and unwrap the response envelope.
    async fn retrieve(&self, uri: &str, data: Map<String, Value>) -> Result<Value, PaddleApiError> {
        let url = self.config.url(uri);

        let response = self
            .http_client
            .get(&url)
            .json(&self.config.body(data))
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, uri, "Paddle API request failed");
                PaddleApiError::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), uri, "Paddle API returned error status");
            return Err(PaddleApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PaddleApiError::Transport(e.to_string()))?;

        unwrap_envelope(&bytes)
    }
}

/// Extracts `response` from a Paddle envelope.
///
/// An `error` object wins over everything else; a body without `response`
/// is malformed.
pub fn unwrap_envelope(body: &[u8]) -> Result<Value, PaddleApiError> {
    let mut envelope: Value = serde_json::from_slice(body)
        .map_err(|e| PaddleApiError::MalformedResponse(format!("invalid JSON: {}", e)))?;

    if let Some(error) = envelope.get("error") {
        let code = error
            .get("code")
            .and_then(|c| c.as_i64().or_else(|| c.as_str().and_then(|s| s.parse().ok())))
            .unwrap_or_default();
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        return Err(PaddleApiError::Provider { code, message });
    }

    envelope
        .get_mut("response")
        .map(Value::take)
        .ok_or_else(|| PaddleApiError::MalformedResponse("\"response\" missing.".to_string()))
}

fn parse_plans(response: Value) -> Result<Vec<PlanData>, PaddleApiError> {
    serde_json::from_value(response)
        .map_err(|e| PaddleApiError::MalformedResponse(format!("unexpected plan list: {}", e)))
}

#[async_trait]
impl PaddleApi for PaddleApiClient {
    async fn list_plans(&self) -> Result<Vec<PlanData>, PaddleApiError> {
        let response = self.retrieve(PLANS_URI, Map::new()).await?;
        let plans = parse_plans(response)?;
        tracing::debug!(count = plans.len(), "Fetched Paddle plan catalog");
        Ok(plans)
    }

    async fn get_plan(&self, id: PlanId) -> Result<Option<PlanData>, PaddleApiError> {
        let mut data = Map::new();
        data.insert("plan".to_string(), json!(id.as_i64()));

        let response = self.retrieve(PLANS_URI, data).await?;
        let plans = parse_plans(response)?;
        Ok(plans.into_iter().find(|plan| plan.id == id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PaddleApiConfig {
        PaddleApiConfig::new("12345", SecretString::new("secret-code".to_string()))
    }

    // ══════════════════════════════════════════════════════════════
    // Configuration Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn body_merges_auth_fields_with_request_data() {
        let mut data = Map::new();
        data.insert("plan".to_string(), json!(10));

        let body = config().body(data);
        assert_eq!(body["vendor_id"], "12345");
        assert_eq!(body["vendor_auth_code"], "secret-code");
        assert_eq!(body["plan"], 10);
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        let config = config().with_base_url("http://localhost:9999/api/2.0");
        assert_eq!(config.url(PLANS_URI), "http://localhost:9999/api/2.0/subscription/plans");
    }

    #[test]
    fn default_url_points_at_vendor_api() {
        assert_eq!(
            config().url(PLANS_URI),
            "https://vendors.paddle.com/api/2.0/subscription/plans"
        );
    }

    #[test]
    fn client_builds_with_timeout() {
        let client = PaddleApiClient::new(config().with_timeout(Duration::from_millis(250)));
        assert!(client.is_ok());
    }

    // ══════════════════════════════════════════════════════════════
    // Envelope Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn envelope_returns_response_value() {
        let body = br#"{"success":true,"response":[{"id":1}]}"#;
        assert_eq!(unwrap_envelope(body).unwrap(), json!([{"id": 1}]));
    }

    #[test]
    fn envelope_error_is_provider_error() {
        let body = br#"{"success":false,"error":{"code":107,"message":"permission denied"}}"#;
        assert_eq!(
            unwrap_envelope(body).unwrap_err(),
            PaddleApiError::Provider {
                code: 107,
                message: "permission denied".to_string()
            }
        );
    }

    #[test]
    fn envelope_error_accepts_string_code() {
        let body = br#"{"error":{"code":"108","message":"bad plan"}}"#;
        assert!(matches!(
            unwrap_envelope(body),
            Err(PaddleApiError::Provider { code: 108, .. })
        ));
    }

    #[test]
    fn envelope_without_response_is_malformed() {
        let body = br#"{"success":true}"#;
        assert_eq!(
            unwrap_envelope(body).unwrap_err(),
            PaddleApiError::MalformedResponse("\"response\" missing.".to_string())
        );
    }

    #[test]
    fn non_json_body_is_malformed() {
        assert!(matches!(
            unwrap_envelope(b"<html>maintenance</html>"),
            Err(PaddleApiError::MalformedResponse(_))
        ));
    }

    #[test]
    fn plan_list_parses_into_plan_data() {
        let response = json!([
            {"id": 10, "name": "Monthly", "billing_type": "month", "billing_period": 1,
             "trial_days": 0, "initial_price": {"GBP": "0.00"}, "recurring_price": {"GBP": "5.00"}}
        ]);
        let plans = parse_plans(response).unwrap();
        assert_eq!(plans[0].id, PlanId::new(10));
        assert_eq!(plans[0].recurring_price.get("GBP"), Some(&5.0));
    }

    #[test]
    fn unexpected_plan_shape_is_malformed() {
        assert!(matches!(
            parse_plans(json!({"not": "a list"})),
            Err(PaddleApiError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_host_is_transport_error() {
        let client = PaddleApiClient::new(
            config()
                .with_base_url("http://127.0.0.1:9/")
                .with_timeout(Duration::from_millis(500)),
        )
        .unwrap();
        assert!(matches!(
            client.list_plans().await,
            Err(PaddleApiError::Transport(_))
        ));
    }
}
