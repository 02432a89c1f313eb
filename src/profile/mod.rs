//! User profile submission, retrieval and the local profile cache.

use std::sync::LazyLock;

use crate::logger::Logger;

mod api;
mod model;

pub(crate) static LOGGER: LazyLock<Logger> =
    LazyLock::new(|| Logger::new("@carelink/profile"));

#[doc(inline)]
pub use api::{ProfileService, USER_PROFILE_KEY};

#[doc(inline)]
pub use model::UserProfile;
