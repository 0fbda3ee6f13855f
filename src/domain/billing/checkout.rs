//! Client-side checkout records.
//!
//! Paddle.js reports a finished checkout to the host before the matching
//! webhook may have arrived. The record is kept as a fallback.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::foundation::CheckoutId;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Checkout {
    pub id: CheckoutId,
    pub completed: Option<bool>,
    pub passthrough: Option<String>,
    pub email: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Parses a truthy/falsy form value.
///
/// Accepts `y/yes/t/true/on/1` and `n/no/f/false/off/0`, case-insensitive.
pub fn parse_truthy(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "t" | "true" | "on" | "1" => Some(true),
        "n" | "no" | "f" | "false" | "off" | "0" => Some(false),
        _ => None,
    }
}
