//! Paddle configuration

use chrono::FixedOffset;
use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::adapters::paddle::{PaddleApiConfig, DEFAULT_API_BASE_URL, SANDBOX_API_BASE_URL};
use crate::adapters::postgres::is_valid_identifier;
use crate::domain::billing::{parse_utc_offset, PaddleWebhookVerifier};

/// Paddle vendor account and webhook settings
#[derive(Debug, Clone, Deserialize)]
pub struct PaddleConfig {
    /// Vendor id from the Paddle dashboard
    #[serde(default)]
    pub vendor_id: String,

    /// Vendor auth code for the vendor API
    pub api_key: Option<SecretString>,

    /// PEM public key used to verify `p_signature`
    #[serde(default)]
    pub public_key: String,

    /// Vendor API base URL; overrides `sandbox` when set
    pub api_base_url: Option<String>,

    /// Use the sandbox vendor API
    #[serde(default)]
    pub sandbox: bool,

    /// Timeout for vendor API calls in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// UTC offset Paddle's naive timestamps are interpreted in (`+HH:MM`)
    #[serde(default = "default_time_zone")]
    pub time_zone: String,

    /// Host table holding subscriber accounts
    #[serde(default = "default_subscriber_table")]
    pub subscriber_table: String,

    /// Email column of the subscriber table
    #[serde(default = "default_subscriber_email_column")]
    pub subscriber_email_column: String,
}

impl PaddleConfig {
    /// Base URL for the vendor API, sandbox-aware.
    pub fn api_base_url(&self) -> &str {
        match &self.api_base_url {
            Some(url) => url,
            None if self.sandbox => SANDBOX_API_BASE_URL,
            None => DEFAULT_API_BASE_URL,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn time_offset(&self) -> Result<FixedOffset, ValidationError> {
        parse_utc_offset(&self.time_zone)
            .ok_or_else(|| ValidationError::InvalidTimeZone(self.time_zone.clone()))
    }

    /// Signature verifier for the configured public key.
    pub fn verifier(&self) -> Result<PaddleWebhookVerifier, ValidationError> {
        if self.public_key.trim().is_empty() {
            return Err(ValidationError::MissingRequired("PADDLE_PUBLIC_KEY"));
        }
        PaddleWebhookVerifier::from_pem(&self.public_key)
            .map_err(|e| ValidationError::InvalidPublicKey(e.to_string()))
    }

    /// Vendor API client settings.
    pub fn api_config(&self) -> Result<PaddleApiConfig, ValidationError> {
        let api_key = self
            .api_key
            .clone()
            .ok_or(ValidationError::MissingRequired("PADDLE_API_KEY"))?;

        Ok(PaddleApiConfig::new(self.vendor_id.clone(), api_key)
            .with_base_url(self.api_base_url())
            .with_timeout(self.request_timeout()))
    }

    /// Validate Paddle configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.vendor_id.trim().is_empty() {
            return Err(ValidationError::MissingRequired("PADDLE_VENDOR_ID"));
        }
        self.api_config()?;
        self.verifier()?;
        self.time_offset()?;

        let base_url = self.api_base_url();
        if !base_url.starts_with("https://") && !base_url.starts_with("http://") {
            return Err(ValidationError::InvalidApiBaseUrl(base_url.to_string()));
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 120 {
            return Err(ValidationError::InvalidTimeout);
        }
        if !is_valid_identifier(&self.subscriber_table) {
            return Err(ValidationError::InvalidIdentifier {
                field: "subscriber_table",
                value: self.subscriber_table.clone(),
            });
        }
        if !is_valid_identifier(&self.subscriber_email_column)
            || self.subscriber_email_column.contains('.')
        {
            return Err(ValidationError::InvalidIdentifier {
                field: "subscriber_email_column",
                value: self.subscriber_email_column.clone(),
            });
        }
        Ok(())
    }
}

impl Default for PaddleConfig {
    fn default() -> Self {
        Self {
            vendor_id: String::new(),
            api_key: None,
            public_key: String::new(),
            api_base_url: None,
            sandbox: false,
            request_timeout_secs: default_request_timeout(),
            time_zone: default_time_zone(),
            subscriber_table: default_subscriber_table(),
            subscriber_email_column: default_subscriber_email_column(),
        }
    }
}

fn default_request_timeout() -> u64 {
    10
}

fn default_time_zone() -> String {
    "+00:00".to_string()
}

fn default_subscriber_table() -> String {
    "users".to_string()
}

fn default_subscriber_email_column() -> String {
    "email".to_string()
}
