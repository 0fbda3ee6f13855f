//! Alert dispatch adapters.
//!
//! - `AlertDispatcher` - Immutable, in-process fan-out of verified alerts

mod alert_dispatcher;

pub use alert_dispatcher::{AlertDispatcher, AlertDispatcherBuilder, DispatchOutcome};
