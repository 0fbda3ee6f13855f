//! Strongly-typed identifier value objects.
//!
//! Plan and subscription identifiers are assigned by Paddle. Subscriber
//! identifiers belong to the host application's account table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use super::ValidationError;

/// Paddle subscription plan identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanId(i64);

impl PlanId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PlanId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// Paddle subscription identifier (at most 32 characters).
///
/// Paddle sends it as a decimal string; it is stored verbatim as the
/// primary key of the local subscription row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(String);

impl SubscriptionId {
    pub const MAX_LEN: usize = 32;

    /// Creates a new SubscriptionId, rejecting empty or over-long values.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::empty_field("subscription_id"));
        }
        let len = id.chars().count();
        if len > Self::MAX_LEN {
            return Err(ValidationError::too_long("subscription_id", Self::MAX_LEN, len));
        }
        Ok(Self(id))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Primary key of a subscriber account in the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriberId(i64);

impl SubscriberId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Paddle checkout identifier (at most 40 characters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckoutId(String);

impl CheckoutId {
    pub const MAX_LEN: usize = 40;

    /// Creates a new CheckoutId, rejecting empty or over-long values.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ValidationError::empty_field("id"));
        }
        let len = id.chars().count();
        if len > Self::MAX_LEN {
            return Err(ValidationError::too_long("id", Self::MAX_LEN, len));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CheckoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_id_parses_from_decimal_string() {
        let id: PlanId = "10".parse().unwrap();
        assert_eq!(id.as_i64(), 10);
        assert_eq!(id.to_string(), "10");
    }

    #[test]
    fn plan_id_rejects_non_numeric_string() {
        assert!("ten".parse::<PlanId>().is_err());
    }

    #[test]
    fn plan_id_serializes_as_bare_number() {
        let json = serde_json::to_string(&PlanId::new(7)).unwrap();
        assert_eq!(json, "7");
    }

    #[test]
    fn subscription_id_accepts_non_empty_string() {
        let id = SubscriptionId::new("1").unwrap();
        assert_eq!(id.as_str(), "1");
    }

    #[test]
    fn subscription_id_rejects_blank_string() {
        match SubscriptionId::new("  ") {
            Err(ValidationError::EmptyField { field }) => assert_eq!(field, "subscription_id"),
            other => panic!("Expected EmptyField error, got {:?}", other),
        }
    }

    #[test]
    fn subscription_id_fits_its_column() {
        assert!(SubscriptionId::new("9".repeat(32)).is_ok());
        assert!(matches!(
            SubscriptionId::new("9".repeat(33)),
            Err(ValidationError::TooLong { max: 32, actual: 33, .. })
        ));
    }

    #[test]
    fn subscriber_id_displays_inner_value() {
        assert_eq!(SubscriberId::new(3).to_string(), "3");
    }

    #[test]
    fn checkout_id_accepts_forty_characters() {
        let raw = "a".repeat(40);
        assert!(CheckoutId::new(raw).is_ok());
    }

    #[test]
    fn checkout_id_rejects_forty_one_characters() {
        let raw = "a".repeat(41);
        assert!(matches!(
            CheckoutId::new(raw),
            Err(ValidationError::TooLong { max: 40, actual: 41, .. })
        ));
    }

    #[test]
    fn checkout_id_rejects_empty_string() {
        assert!(matches!(
            CheckoutId::new(""),
            Err(ValidationError::EmptyField { .. })
        ));
    }
}
