//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, errors)
//! - `billing` - Paddle alerts, signatures, plans, subscriptions and checkouts

pub mod billing;
pub mod foundation;
