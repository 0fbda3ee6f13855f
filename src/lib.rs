//! Paddle Bridge - Paddle Classic webhook ingestion and reconciliation
//!
//! Verifies signed Paddle alerts, reconciles subscription state into
//! PostgreSQL under an event-time ordering guard, mirrors the plan catalog
//! and links unclaimed subscriptions to newly created subscriber accounts.

pub mod adapters;
pub mod application;
pub mod bridge;
pub mod config;
pub mod domain;
pub mod ports;
