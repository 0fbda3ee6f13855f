//! Subscription plans and their prices.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{PlanId, ValidationError};

/// Billing cadence of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingType {
    Day,
    Month,
    Year,
}

impl BillingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingType::Day => "day",
            BillingType::Month => "month",
            BillingType::Year => "year",
        }
    }
}

impl fmt::Display for BillingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BillingType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(BillingType::Day),
            "month" => Ok(BillingType::Month),
            "year" => Ok(BillingType::Year),
            other => Err(ValidationError::invalid_format(
                "billing_type",
                format!("unknown billing type '{}'", other),
            )),
        }
    }
}

/// A Paddle subscription plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: PlanId,
    pub name: String,
    pub billing_type: BillingType,
    pub billing_period: i32,
    pub trial_days: i32,
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.id)
    }
}

/// One currency quotation of a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub plan_id: PlanId,
    pub currency: String,
    pub quantity: f64,
    pub recurring: bool,
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.quantity, self.currency)
    }
}

/// A plan as returned by `subscription/plans`.
///
/// ```json
/// {"id": 9092, "name": "Monthly", "billing_type": "month", "billing_period": 1,
///  "initial_price": {"USD": "0.00"}, "recurring_price": {"USD": "10.00"},
///  "trial_days": 0}
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlanData {
    pub id: PlanId,
    pub name: String,
    pub billing_type: BillingType,
    pub billing_period: i32,
    #[serde(default)]
    pub trial_days: i32,
    #[serde(default, deserialize_with = "deserialize_price_map")]
    pub initial_price: BTreeMap<String, f64>,
    #[serde(default, deserialize_with = "deserialize_price_map")]
    pub recurring_price: BTreeMap<String, f64>,
}

impl PlanData {
    /// The plan row this data creates.
    pub fn plan(&self) -> Plan {
        Plan {
            id: self.id,
            name: self.name.clone(),
            billing_type: self.billing_type,
            billing_period: self.billing_period,
            trial_days: self.trial_days,
        }
    }

    /// Initial prices (non-recurring) followed by recurring prices.
    pub fn prices(&self) -> Vec<Price> {
        let initial = self.initial_price.iter().map(|(currency, amount)| (currency, amount, false));
        let recurring = self.recurring_price.iter().map(|(currency, amount)| (currency, amount, true));

        initial
            .chain(recurring)
            .map(|(currency, amount, recurring)| Price {
                plan_id: self.id,
                currency: currency.clone(),
                quantity: *amount,
                recurring,
            })
            .collect()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(f64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPriceMap {
    Map(BTreeMap<String, RawAmount>),
    // PHP encodes an empty associative array as `[]`
    List(Vec<serde_json::Value>),
}

fn deserialize_price_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match RawPriceMap::deserialize(deserializer)? {
        RawPriceMap::List(items) if items.is_empty() => Ok(BTreeMap::new()),
        RawPriceMap::List(_) => Err(de::Error::custom("price list must be a currency map")),
        RawPriceMap::Map(entries) => entries
            .into_iter()
            .map(|(currency, amount)| {
                let value = match amount {
                    RawAmount::Number(n) => n,
                    RawAmount::Text(text) => text.trim().parse::<f64>().map_err(|_| {
                        de::Error::custom(format!("invalid {} amount '{}'", currency, text))
                    })?,
                };
                Ok((currency, value))
            })
            .collect(),
    }
}
