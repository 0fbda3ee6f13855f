//! Raw webhook alert payload.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field carrying the base64 RSA signature.
pub const SIGNATURE_FIELD: &str = "p_signature";

/// Field carrying the alert type.
pub const ALERT_NAME_FIELD: &str = "alert_name";

/// A webhook alert as delivered by Paddle: flat string keys to string values.
///
/// Values are stored in their string form, so anything inserted is coerced
/// with `ToString` first. Keys iterate in byte-lexicographic order, which is
/// the order the signature is computed over.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertPayload(BTreeMap<String, String>);

impl AlertPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a field, coercing the value to its string form.
    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) -> Option<String> {
        self.0.insert(key.into(), value.to_string())
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Removes and returns a field.
    pub fn take(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    /// The `alert_name` field, if present and non-empty.
    pub fn alert_name(&self) -> Option<&str> {
        self.get(ALERT_NAME_FIELD).filter(|name| !name.is_empty())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.0
    }

    pub fn into_map(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl From<BTreeMap<String, String>> for AlertPayload {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for AlertPayload {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.to_string()))
                .collect(),
        )
    }
}

impl IntoIterator for AlertPayload {
    type Item = (String, String);
    type IntoIter = std::collections::btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_coerces_scalars_to_strings() {
        let mut payload = AlertPayload::new();
        payload.insert("quantity", 3);
        payload.insert("marketing_consent", true);
        payload.insert("unit_price", 9.5);

        assert_eq!(payload.get("quantity"), Some("3"));
        assert_eq!(payload.get("marketing_consent"), Some("true"));
        assert_eq!(payload.get("unit_price"), Some("9.5"));
    }

    #[test]
    fn keys_iterate_in_sorted_order() {
        let payload: AlertPayload = vec![("b", "2"), ("a", "1"), ("_z", "0")]
            .into_iter()
            .collect();
        let keys: Vec<&str> = payload.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["_z", "a", "b"]);
    }

    #[test]
    fn take_removes_field() {
        let mut payload = AlertPayload::new().with("subscription_id", "1");
        assert_eq!(payload.take("subscription_id"), Some("1".to_string()));
        assert!(!payload.contains("subscription_id"));
        assert!(payload.is_empty());
    }

    #[test]
    fn alert_name_ignores_empty_value() {
        let payload = AlertPayload::new().with(ALERT_NAME_FIELD, "");
        assert_eq!(payload.alert_name(), None);

        let payload = AlertPayload::new().with(ALERT_NAME_FIELD, "subscription_created");
        assert_eq!(payload.alert_name(), Some("subscription_created"));
    }

    #[test]
    fn deserializes_from_flat_json_object() {
        let payload: AlertPayload =
            serde_json::from_str(r#"{"alert_name":"transfer_paid","alert_id":"9"}"#).unwrap();
        assert_eq!(payload.len(), 2);
        assert_eq!(payload.get("alert_id"), Some("9"));
    }
}
