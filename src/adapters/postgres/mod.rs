//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresPlanRepository` - Plans and price lists (`paddle_plans`, `paddle_prices`)
//! - `PostgresSubscriptionRepository` - Subscriptions with the event-time guard
//! - `PostgresCheckoutRepository` - Checkout callbacks
//! - `PostgresSubscriberDirectory` - Read-only view of the host account table

mod checkout_repository;
mod plan_repository;
mod subscriber_directory;
mod subscription_repository;

pub use checkout_repository::PostgresCheckoutRepository;
pub use plan_repository::PostgresPlanRepository;
pub use subscriber_directory::{is_valid_identifier, PostgresSubscriberDirectory};
pub use subscription_repository::PostgresSubscriptionRepository;
