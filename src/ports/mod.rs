//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Alert Ports
//!
//! - `AlertListener` - Handler invoked for verified webhook alerts
//!
//! ## Storage Ports
//!
//! - `PlanRepository` - Plans and their price lists
//! - `SubscriptionRepository` - Reconciled subscriptions with the event-time guard
//! - `CheckoutRepository` - Client-reported checkouts
//! - `SubscriberDirectory` - Read access to the host's account table
//!
//! ## Provider Ports
//!
//! - `PaddleApi` - Paddle vendor API (plan catalog)

mod alert_listener;
mod checkout_repository;
mod paddle_api;
mod plan_repository;
mod subscriber_directory;
mod subscription_repository;

pub use alert_listener::AlertListener;
pub use checkout_repository::CheckoutRepository;
pub use paddle_api::{PaddleApi, PaddleApiError};
pub use plan_repository::PlanRepository;
pub use subscriber_directory::{Subscriber, SubscriberDirectory};
pub use subscription_repository::{GuardedUpdate, InsertOutcome, SubscriptionRepository};
