//! Authenticated access to the backend.
//!
//! [`Transport`] sends requests and normalizes failures; [`ApiGateway`] adds
//! the session's id token to every JSON body before handing it down.

use std::sync::LazyLock;

use crate::logger::Logger;

mod api;
mod normalize;
mod transport;

pub(crate) static LOGGER: LazyLock<Logger> =
    LazyLock::new(|| Logger::new("@carelink/gateway"));

#[doc(inline)]
pub use api::ApiGateway;

#[doc(inline)]
pub use normalize::{ensure_success, normalize_error_response};

#[doc(inline)]
pub use transport::Transport;
