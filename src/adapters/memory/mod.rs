//! In-memory adapters.
//!
//! Mutex-backed implementations of the storage ports. Each operation runs
//! under a single lock, which gives the same atomicity the Postgres adapters
//! get from their conditional statements. Used by tests and local demos.

mod checkout_repository;
mod plan_repository;
mod subscriber_directory;
mod subscription_repository;

pub use checkout_repository::InMemoryCheckoutRepository;
pub use plan_repository::InMemoryPlanRepository;
pub use subscriber_directory::InMemorySubscriberDirectory;
pub use subscription_repository::InMemorySubscriptionRepository;
