//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `events` - In-process alert dispatch
//! - `http` - axum routes for webhooks and checkouts
//! - `memory` - In-memory stores for tests and embedding
//! - `paddle` - Paddle vendor API client
//! - `postgres` - PostgreSQL stores

pub mod events;
pub mod http;
pub mod memory;
pub mod paddle;
pub mod postgres;

pub use events::{AlertDispatcher, AlertDispatcherBuilder, DispatchOutcome};
