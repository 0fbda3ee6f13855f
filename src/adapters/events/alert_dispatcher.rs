//! Alert dispatcher.
//!
//! Routes verified webhook alerts to the listeners registered for them.
//! The registry is assembled once through `AlertDispatcherBuilder` and is
//! read-only afterwards, so dispatch takes no locks.
//!
//! # Example
//!
//! ```ignore
//! let dispatcher = AlertDispatcher::builder()
//!     .on(AlertName::SubscriptionCreated, reconciler.clone())
//!     .on(AlertName::PaymentSucceeded, receipts)
//!     .build();
//!
//! dispatcher.dispatch("subscription_created", &payload).await?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::billing::{AlertName, AlertPayload, WebhookError};
use crate::ports::AlertListener;

/// What a dispatch did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The alert is recognized; this many listeners ran.
    Dispatched(usize),
    /// The alert name is not in the allow-list.
    Ignored,
}

/// Immutable alert name to listener registry.
pub struct AlertDispatcher {
    listeners: HashMap<AlertName, Vec<Arc<dyn AlertListener>>>,
}

impl AlertDispatcher {
    pub fn builder() -> AlertDispatcherBuilder {
        AlertDispatcherBuilder::default()
    }

    /// Invokes every listener registered for `alert_name`, in registration
    /// order. The first listener error stops the fan-out and is returned.
    pub async fn dispatch(
        &self,
        alert_name: &str,
        payload: &AlertPayload,
    ) -> Result<DispatchOutcome, WebhookError> {
        let alert: AlertName = match alert_name.parse() {
            Ok(alert) => alert,
            Err(e) => {
                tracing::debug!(alert_name, error = %e, "Ignoring alert");
                return Ok(DispatchOutcome::Ignored);
            }
        };

        let listeners = self.listeners_for(alert);
        for listener in listeners {
            if let Err(e) = listener.on_alert(alert, payload).await {
                tracing::error!(
                    alert_name = %alert,
                    listener = listener.name(),
                    error = %e,
                    "Alert listener failed"
                );
                return Err(e);
            }
        }

        tracing::debug!(alert_name = %alert, listeners = listeners.len(), "Dispatched alert");
        Ok(DispatchOutcome::Dispatched(listeners.len()))
    }

    /// Listeners registered for `alert`, in registration order.
    pub fn listeners_for(&self, alert: AlertName) -> &[Arc<dyn AlertListener>] {
        self.listeners.get(&alert).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of listeners across all alerts.
    pub fn listener_count(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }
}

impl std::fmt::Debug for AlertDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for alert in AlertName::ALL {
            let names: Vec<&str> = self.listeners_for(alert).iter().map(|l| l.name()).collect();
            if !names.is_empty() {
                map.entry(&alert.as_str(), &names);
            }
        }
        map.finish()
    }
}

/// Collects listener registrations before the dispatcher is frozen.
#[derive(Default)]
pub struct AlertDispatcherBuilder {
    listeners: HashMap<AlertName, Vec<Arc<dyn AlertListener>>>,
}

impl AlertDispatcherBuilder {
    /// Registers `listener` for `alert`. The same listener may be registered
    /// for several alerts.
    pub fn on(mut self, alert: AlertName, listener: Arc<dyn AlertListener>) -> Self {
        self.listeners.entry(alert).or_default().push(listener);
        self
    }

    /// Registers `listener` for each alert in `alerts`.
    pub fn on_each(mut self, alerts: &[AlertName], listener: Arc<dyn AlertListener>) -> Self {
        for alert in alerts {
            self = self.on(*alert, listener.clone());
        }
        self
    }

    pub fn build(self) -> AlertDispatcher {
        AlertDispatcher {
            listeners: self.listeners,
        }
    }
}
