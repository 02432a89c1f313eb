//! Test utilities shared across crate-level unit tests.

pub mod clock;
pub mod http;

pub use clock::fixed_now;
pub use http::{mock_token_refresh, start_mock_server};
