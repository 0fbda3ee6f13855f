//! HTTP adapters - REST API implementations.

pub mod paddle;

pub use paddle::paddle_router;
pub use paddle::PaddleAppState;
