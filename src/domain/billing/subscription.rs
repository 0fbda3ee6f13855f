//! Reconciled subscription state.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::paddle_time::parse_paddle_time;
use super::webhook_errors::WebhookError;
use crate::domain::foundation::{PlanId, SubscriberId, SubscriptionId};

/// Subscription status as reported by Paddle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Trialing,
    PastDue,
    Paused,
    Deleted,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Trialing => "trialing",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Paused => "paused",
            SubscriptionStatus::Deleted => "deleted",
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionStatus {
    type Err = WebhookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(SubscriptionStatus::Active),
            "trialing" => Ok(SubscriptionStatus::Trialing),
            "past_due" => Ok(SubscriptionStatus::PastDue),
            "paused" => Ok(SubscriptionStatus::Paused),
            "deleted" => Ok(SubscriptionStatus::Deleted),
            other => Err(WebhookError::invalid_field(
                "status",
                format!("unknown status '{}'", other),
            )),
        }
    }
}

/// A subscription row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub subscriber_id: Option<SubscriberId>,
    pub plan_id: PlanId,
    pub cancel_url: String,
    pub checkout_id: String,
    pub currency: String,
    pub email: String,
    pub event_time: DateTime<Utc>,
    pub marketing_consent: bool,
    pub next_bill_date: Option<DateTime<Utc>>,
    pub passthrough: String,
    pub quantity: i32,
    pub source: String,
    pub status: SubscriptionStatus,
    pub unit_price: f64,
    pub update_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// Builds a new row from a first-seen alert.
    ///
    /// `status` is required. A missing `event_time` falls back to `now`;
    /// other absent fields take their column defaults.
    pub fn create(update: &SubscriptionUpdate, now: DateTime<Utc>) -> Result<Self, WebhookError> {
        let fields = &update.fields;
        let status = fields.status.ok_or(WebhookError::MissingField("status"))?;

        Ok(Self {
            id: update.id.clone(),
            subscriber_id: update.subscriber_id,
            plan_id: update.plan_id,
            cancel_url: fields.cancel_url.clone().unwrap_or_default(),
            checkout_id: fields.checkout_id.clone().unwrap_or_default(),
            currency: fields.currency.clone().unwrap_or_default(),
            email: fields.email.clone().unwrap_or_default(),
            event_time: fields.event_time.unwrap_or(now),
            marketing_consent: fields.marketing_consent.unwrap_or(false),
            next_bill_date: fields.next_bill_date.flatten(),
            passthrough: fields.passthrough.clone().unwrap_or_default(),
            quantity: fields.quantity.unwrap_or(1),
            source: fields.source.clone().unwrap_or_default(),
            status,
            unit_price: fields.unit_price.unwrap_or(0.0),
            update_url: fields.update_url.clone().unwrap_or_default(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Merges the fields present in `update` onto this row.
    ///
    /// Does not check event ordering; callers apply the guard first. The
    /// subscriber link is only replaced when the update resolved one.
    pub fn merge(&mut self, update: &SubscriptionUpdate, now: DateTime<Utc>) {
        let fields = &update.fields;

        if update.subscriber_id.is_some() {
            self.subscriber_id = update.subscriber_id;
        }
        self.plan_id = update.plan_id;

        if let Some(v) = &fields.cancel_url {
            self.cancel_url = v.clone();
        }
        if let Some(v) = &fields.checkout_id {
            self.checkout_id = v.clone();
        }
        if let Some(v) = &fields.currency {
            self.currency = v.clone();
        }
        if let Some(v) = &fields.email {
            self.email = v.clone();
        }
        if let Some(v) = fields.event_time {
            self.event_time = v;
        }
        if let Some(v) = fields.marketing_consent {
            self.marketing_consent = v;
        }
        if let Some(v) = fields.next_bill_date {
            self.next_bill_date = v;
        }
        if let Some(v) = &fields.passthrough {
            self.passthrough = v.clone();
        }
        if let Some(v) = fields.quantity {
            self.quantity = v;
        }
        if let Some(v) = &fields.source {
            self.source = v.clone();
        }
        if let Some(v) = fields.status {
            self.status = v;
        }
        if let Some(v) = fields.unit_price {
            self.unit_price = v;
        }
        if let Some(v) = &fields.update_url {
            self.update_url = v.clone();
        }
        self.updated_at = now;
    }
}

impl fmt::Display for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.subscriber_id {
            Some(subscriber) => write!(f, "{}:{}", subscriber, self.id),
            None => write!(f, "None:{}", self.id),
        }
    }
}

/// Subscription columns that an alert may set, all optional.
///
/// `next_bill_date` is doubly optional: the outer level records whether the
/// alert carried the field at all, the inner one whether it was empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscriptionFields {
    pub cancel_url: Option<String>,
    pub checkout_id: Option<String>,
    pub currency: Option<String>,
    pub email: Option<String>,
    pub event_time: Option<DateTime<Utc>>,
    pub marketing_consent: Option<bool>,
    pub next_bill_date: Option<Option<DateTime<Utc>>>,
    pub passthrough: Option<String>,
    pub quantity: Option<i32>,
    pub source: Option<String>,
    pub status: Option<SubscriptionStatus>,
    pub unit_price: Option<f64>,
    pub update_url: Option<String>,
}

impl SubscriptionFields {
    /// Column names an alert field can map onto.
    pub const NAMES: [&'static str; 13] = [
        "cancel_url",
        "checkout_id",
        "currency",
        "email",
        "event_time",
        "marketing_consent",
        "next_bill_date",
        "passthrough",
        "quantity",
        "source",
        "status",
        "unit_price",
        "update_url",
    ];

    pub fn is_field(name: &str) -> bool {
        Self::NAMES.contains(&name)
    }

    /// Converts and stores one raw alert value.
    ///
    /// Returns `Ok(false)` when `name` is not a subscription column.
    pub fn set(&mut self, name: &str, raw: String, offset: FixedOffset) -> Result<bool, WebhookError> {
        match name {
            "cancel_url" => self.cancel_url = Some(raw),
            "checkout_id" => self.checkout_id = Some(bounded("checkout_id", raw, MAX_CHECKOUT_ID_LEN)?),
            "currency" => self.currency = Some(parse_currency(raw)?),
            "email" => self.email = Some(bounded("email", raw, MAX_EMAIL_LEN)?),
            "passthrough" => self.passthrough = Some(raw),
            "source" => self.source = Some(raw),
            "update_url" => self.update_url = Some(raw),
            "event_time" => {
                self.event_time = Some(parse_date_field("event_time", &raw, offset)?);
            }
            "next_bill_date" => {
                self.next_bill_date = Some(if raw.trim().is_empty() {
                    None
                } else {
                    Some(parse_date_field("next_bill_date", &raw, offset)?)
                });
            }
            "marketing_consent" => {
                self.marketing_consent = Some(parse_flag("marketing_consent", &raw)?);
            }
            "quantity" => {
                let quantity = raw.trim().parse::<i32>().map_err(|_| {
                    WebhookError::invalid_field("quantity", format!("'{}' is not an integer", raw))
                })?;
                self.quantity = Some(quantity);
            }
            "unit_price" => {
                let price = raw.trim().parse::<f64>().map_err(|_| {
                    WebhookError::invalid_field("unit_price", format!("'{}' is not a number", raw))
                })?;
                self.unit_price = Some(price);
            }
            "status" => self.status = Some(raw.trim().parse()?),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

fn parse_date_field(field: &str, raw: &str, offset: FixedOffset) -> Result<DateTime<Utc>, WebhookError> {
    parse_paddle_time(raw, offset).ok_or_else(|| WebhookError::InvalidDate {
        field: field.to_string(),
        value: raw.to_string(),
    })
}

const MAX_CHECKOUT_ID_LEN: usize = 64;
const MAX_EMAIL_LEN: usize = 254;

fn bounded(field: &str, raw: String, max: usize) -> Result<String, WebhookError> {
    let len = raw.chars().count();
    if len > max {
        return Err(WebhookError::invalid_field(
            field,
            format!("exceeds maximum length of {} characters, got {}", max, len),
        ));
    }
    Ok(raw)
}

/// ISO 4217 code, upper-cased. An empty value is kept as-is.
fn parse_currency(raw: String) -> Result<String, WebhookError> {
    let code = raw.trim();
    if code.is_empty() {
        return Ok(String::new());
    }
    if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Err(WebhookError::invalid_field(
            "currency",
            format!("'{}' is not a three-letter currency code", raw),
        ));
    }
    Ok(code.to_ascii_uppercase())
}

fn parse_flag(field: &str, raw: &str) -> Result<bool, WebhookError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" | "" => Ok(false),
        _ => Err(WebhookError::invalid_field(
            field,
            format!("'{}' is not a boolean", raw),
        )),
    }
}

/// A sanitized alert, ready to be reconciled against the subscription table.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionUpdate {
    pub id: SubscriptionId,
    pub subscriber_id: Option<SubscriberId>,
    pub plan_id: PlanId,
    pub fields: SubscriptionFields,
}
