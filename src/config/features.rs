//! Feature flags configuration

use serde::Deserialize;

/// Feature flags for enabling/disabling functionality
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureFlags {
    /// Link unlinked subscriptions to newly created subscribers by email
    #[serde(default = "default_link_stale_subscriptions")]
    pub link_stale_subscriptions: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            link_stale_subscriptions: default_link_stale_subscriptions(),
        }
    }
}

fn default_link_stale_subscriptions() -> bool {
    true
}
