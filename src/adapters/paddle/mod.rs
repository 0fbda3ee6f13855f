//! Paddle vendor API adapters.
//!
//! - `PaddleApiClient` - reqwest client for the vendor API
//! - `MockPaddleApi` - in-process catalog for tests

mod api_client;
mod mock_paddle_api;

pub use api_client::{
    unwrap_envelope, PaddleApiClient, PaddleApiConfig, DEFAULT_API_BASE_URL, SANDBOX_API_BASE_URL,
};
pub use mock_paddle_api::{ApiCall, MockPaddleApi};
