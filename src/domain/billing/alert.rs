//! Webhook alert types recognized by the bridge.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Paddle alert types that are dispatched to listeners.
///
/// Anything else is acknowledged and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertName {
    SubscriptionCreated,
    SubscriptionUpdated,
    SubscriptionCancelled,
    SubscriptionPaymentSucceeded,
    SubscriptionPaymentFailed,
    SubscriptionPaymentRefunded,
    LockerProcessed,
    PaymentSucceeded,
    PaymentRefunded,
    PaymentDisputeCreated,
    PaymentDisputeClosed,
    HighRiskTransactionCreated,
    HighRiskTransactionUpdated,
    TransferCreated,
    TransferPaid,
    NewAudienceMember,
    UpdateAudienceMember,
}

impl AlertName {
    /// Every recognized alert, in Paddle's documentation order.
    pub const ALL: [AlertName; 17] = [
        AlertName::SubscriptionCreated,
        AlertName::SubscriptionUpdated,
        AlertName::SubscriptionCancelled,
        AlertName::SubscriptionPaymentSucceeded,
        AlertName::SubscriptionPaymentFailed,
        AlertName::SubscriptionPaymentRefunded,
        AlertName::LockerProcessed,
        AlertName::PaymentSucceeded,
        AlertName::PaymentRefunded,
        AlertName::PaymentDisputeCreated,
        AlertName::PaymentDisputeClosed,
        AlertName::HighRiskTransactionCreated,
        AlertName::HighRiskTransactionUpdated,
        AlertName::TransferCreated,
        AlertName::TransferPaid,
        AlertName::NewAudienceMember,
        AlertName::UpdateAudienceMember,
    ];

    /// Wire name as sent in the `alert_name` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertName::SubscriptionCreated => "subscription_created",
            AlertName::SubscriptionUpdated => "subscription_updated",
            AlertName::SubscriptionCancelled => "subscription_cancelled",
            AlertName::SubscriptionPaymentSucceeded => "subscription_payment_succeeded",
            AlertName::SubscriptionPaymentFailed => "subscription_payment_failed",
            AlertName::SubscriptionPaymentRefunded => "subscription_payment_refunded",
            AlertName::LockerProcessed => "locker_processed",
            AlertName::PaymentSucceeded => "payment_succeeded",
            AlertName::PaymentRefunded => "payment_refunded",
            AlertName::PaymentDisputeCreated => "payment_dispute_created",
            AlertName::PaymentDisputeClosed => "payment_dispute_closed",
            AlertName::HighRiskTransactionCreated => "high_risk_transaction_created",
            AlertName::HighRiskTransactionUpdated => "high_risk_transaction_updated",
            AlertName::TransferCreated => "transfer_created",
            AlertName::TransferPaid => "transfer_paid",
            AlertName::NewAudienceMember => "new_audience_member",
            AlertName::UpdateAudienceMember => "update_audience_member",
        }
    }

    /// Alerts the bridge reconciles into the subscription table by default.
    ///
    /// Payment alerts lack the subscription's management URLs and share an
    /// `event_time` with `subscription_created`, so they are left to hosts.
    pub fn reconciled_by_default(&self) -> bool {
        matches!(
            self,
            AlertName::SubscriptionCreated
                | AlertName::SubscriptionUpdated
                | AlertName::SubscriptionCancelled
        )
    }
}

impl fmt::Display for AlertName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The alert name is not on the allow-list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported alert: {0}")]
pub struct UnsupportedAlert(pub String);

impl FromStr for AlertName {
    type Err = UnsupportedAlert;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AlertName::ALL
            .iter()
            .copied()
            .find(|alert| alert.as_str() == s)
            .ok_or_else(|| UnsupportedAlert(s.to_string()))
    }
}
