//! Composition root.
//!
//! `PaddleBridge` wires the ports, the default listeners and the HTTP
//! surface together. Hosts either build one from configuration with
//! [`PaddleBridge::from_config`] or assemble it piece by piece through
//! [`PaddleBridgeBuilder`], which is also where custom mappers and extra
//! alert listeners are injected.

use std::sync::Arc;

use axum::Router;
use chrono::{FixedOffset, Offset, Utc};
use sqlx::PgPool;
use thiserror::Error;

use crate::adapters::events::AlertDispatcher;
use crate::adapters::http::{paddle_router, PaddleAppState};
use crate::adapters::paddle::PaddleApiClient;
use crate::adapters::postgres::{
    PostgresCheckoutRepository, PostgresPlanRepository, PostgresSubscriberDirectory,
    PostgresSubscriptionRepository,
};
use crate::application::{
    CaseInsensitiveEmailMatcher, EmailSubscriberResolver, LinkStaleSubscriptionsHandler,
    PayloadSanitizer, PlanSyncError, PlanSyncHandler, ReconcileSubscriptionHandler,
    StaleSubscriptionMatcher, SubscriberResolver,
};
use crate::config::{AppConfig, ValidationError};
use crate::domain::billing::{AlertName, PaddleWebhookVerifier, Plan};
use crate::domain::foundation::{self, DomainError};
use crate::ports::{
    AlertListener, CheckoutRepository, PaddleApi, PaddleApiError, PlanRepository, Subscriber,
    SubscriberDirectory, SubscriptionRepository,
};

/// Errors raised while assembling a bridge.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Bridge component not configured: {0}")]
    MissingComponent(&'static str),

    #[error(transparent)]
    Config(#[from] ValidationError),

    #[error("Invalid subscriber directory: {0}")]
    Directory(#[from] foundation::ValidationError),

    #[error("Paddle API client: {0}")]
    Api(#[from] PaddleApiError),
}

/// A fully wired Paddle integration.
pub struct PaddleBridge {
    state: PaddleAppState,
    plan_sync: Arc<PlanSyncHandler>,
    reconciler: Arc<ReconcileSubscriptionHandler>,
    stale_linker: Option<Arc<LinkStaleSubscriptionsHandler>>,
}

impl PaddleBridge {
    pub fn builder(verifier: PaddleWebhookVerifier, api: Arc<dyn PaddleApi>) -> PaddleBridgeBuilder {
        PaddleBridgeBuilder::new(verifier, api)
    }

    /// Builder pre-wired with the Postgres adapters and the vendor API
    /// client described by `config`.
    ///
    /// The caller may still register extra listeners or swap mappers
    /// before calling `build()`.
    pub fn from_config(config: &AppConfig, pool: PgPool) -> Result<PaddleBridgeBuilder, BridgeError> {
        let paddle = &config.paddle;
        let api = PaddleApiClient::new(paddle.api_config()?)?;
        let directory = PostgresSubscriberDirectory::new(
            pool.clone(),
            &paddle.subscriber_table,
            &paddle.subscriber_email_column,
        )?;

        Ok(Self::builder(paddle.verifier()?, Arc::new(api))
            .time_offset(paddle.time_offset()?)
            .plans(Arc::new(PostgresPlanRepository::new(pool.clone())))
            .subscriptions(Arc::new(PostgresSubscriptionRepository::new(pool.clone())))
            .checkouts(Arc::new(PostgresCheckoutRepository::new(pool)))
            .subscriber_directory(Arc::new(directory))
            .link_stale_subscriptions(config.features.link_stale_subscriptions))
    }

    /// Router serving `POST /paddle/webhook/` and `POST /checkout/`.
    pub fn router(&self) -> Router {
        paddle_router().with_state(self.state.clone())
    }

    pub fn state(&self) -> &PaddleAppState {
        &self.state
    }

    pub fn dispatcher(&self) -> &AlertDispatcher {
        &self.state.dispatcher
    }

    pub fn reconciler(&self) -> &Arc<ReconcileSubscriptionHandler> {
        &self.reconciler
    }

    /// `None` when stale-subscription linking is disabled.
    pub fn stale_linker(&self) -> Option<&Arc<LinkStaleSubscriptionsHandler>> {
        self.stale_linker.as_ref()
    }

    /// Hook for the host's subscriber save path.
    ///
    /// Returns the number of subscriptions linked to `subscriber`; always
    /// zero when linking is disabled.
    pub async fn subscriber_saved(&self, subscriber: &Subscriber, created: bool) -> Result<u64, DomainError> {
        match &self.stale_linker {
            Some(linker) => linker.on_subscriber_saved(subscriber, created).await,
            None => Ok(0),
        }
    }

    /// Mirror the whole Paddle plan catalog.
    pub async fn sync_plans(&self) -> Result<Vec<Plan>, PlanSyncError> {
        self.plan_sync.sync_all().await
    }
}

/// Assembles a [`PaddleBridge`].
pub struct PaddleBridgeBuilder {
    verifier: PaddleWebhookVerifier,
    api: Arc<dyn PaddleApi>,
    time_offset: FixedOffset,
    plans: Option<Arc<dyn PlanRepository>>,
    subscriptions: Option<Arc<dyn SubscriptionRepository>>,
    checkouts: Option<Arc<dyn CheckoutRepository>>,
    directory: Option<Arc<dyn SubscriberDirectory>>,
    resolver: Option<Arc<dyn SubscriberResolver>>,
    matcher: Arc<dyn StaleSubscriptionMatcher>,
    link_stale_subscriptions: bool,
    listeners: Vec<(AlertName, Arc<dyn AlertListener>)>,
}

impl PaddleBridgeBuilder {
    pub fn new(verifier: PaddleWebhookVerifier, api: Arc<dyn PaddleApi>) -> Self {
        Self {
            verifier,
            api,
            time_offset: Utc.fix(),
            plans: None,
            subscriptions: None,
            checkouts: None,
            directory: None,
            resolver: None,
            matcher: Arc::new(CaseInsensitiveEmailMatcher),
            link_stale_subscriptions: true,
            listeners: Vec::new(),
        }
    }

    /// Offset Paddle's naive timestamps are interpreted in.
    pub fn time_offset(mut self, offset: FixedOffset) -> Self {
        self.time_offset = offset;
        self
    }

    pub fn plans(mut self, plans: Arc<dyn PlanRepository>) -> Self {
        self.plans = Some(plans);
        self
    }

    pub fn subscriptions(mut self, subscriptions: Arc<dyn SubscriptionRepository>) -> Self {
        self.subscriptions = Some(subscriptions);
        self
    }

    pub fn checkouts(mut self, checkouts: Arc<dyn CheckoutRepository>) -> Self {
        self.checkouts = Some(checkouts);
        self
    }

    /// Directory backing the default email resolver.
    pub fn subscriber_directory(mut self, directory: Arc<dyn SubscriberDirectory>) -> Self {
        self.directory = Some(directory);
        self
    }

    /// Replace the default email resolver.
    pub fn resolver(mut self, resolver: Arc<dyn SubscriberResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Replace the default case-insensitive email matcher.
    pub fn matcher(mut self, matcher: Arc<dyn StaleSubscriptionMatcher>) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn link_stale_subscriptions(mut self, enabled: bool) -> Self {
        self.link_stale_subscriptions = enabled;
        self
    }

    /// Register a host listener. Runs after the built-in reconciler.
    pub fn listener(mut self, alert: AlertName, listener: Arc<dyn AlertListener>) -> Self {
        self.listeners.push((alert, listener));
        self
    }

    pub fn build(self) -> Result<PaddleBridge, BridgeError> {
        let plans = self.plans.ok_or(BridgeError::MissingComponent("plan repository"))?;
        let subscriptions = self
            .subscriptions
            .ok_or(BridgeError::MissingComponent("subscription repository"))?;
        let checkouts = self
            .checkouts
            .ok_or(BridgeError::MissingComponent("checkout repository"))?;
        let resolver: Arc<dyn SubscriberResolver> = match (self.resolver, self.directory) {
            (Some(resolver), _) => resolver,
            (None, Some(directory)) => Arc::new(EmailSubscriberResolver::new(directory)),
            (None, None) => return Err(BridgeError::MissingComponent("subscriber resolver")),
        };

        let plan_sync = Arc::new(PlanSyncHandler::new(plans.clone(), self.api));
        let sanitizer = Arc::new(PayloadSanitizer::new(
            plans,
            plan_sync.clone(),
            resolver,
            self.time_offset,
        ));
        let reconciler = Arc::new(ReconcileSubscriptionHandler::new(
            subscriptions.clone(),
            sanitizer,
        ));

        let defaults: Vec<AlertName> = AlertName::ALL
            .into_iter()
            .filter(AlertName::reconciled_by_default)
            .collect();
        let mut dispatcher = AlertDispatcher::builder().on_each(&defaults, reconciler.clone());
        for (alert, listener) in self.listeners {
            dispatcher = dispatcher.on(alert, listener);
        }
        let dispatcher = dispatcher.build();

        let stale_linker = self
            .link_stale_subscriptions
            .then(|| Arc::new(LinkStaleSubscriptionsHandler::new(subscriptions, self.matcher)));

        tracing::info!(
            listeners = dispatcher.listener_count(),
            link_stale_subscriptions = stale_linker.is_some(),
            "Paddle bridge assembled"
        );

        let state = PaddleAppState::new(
            Arc::new(self.verifier),
            Arc::new(dispatcher),
            checkouts,
            self.time_offset,
        );

        Ok(PaddleBridge {
            state,
            plan_sync,
            reconciler,
            stale_linker,
        })
    }
}
