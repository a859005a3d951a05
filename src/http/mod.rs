//! Protocol vocabulary types.
mod method;
mod status;
mod version;

pub use method::{Method, UnknownMethod};
pub use status::{InvalidStatus, StatusCode};
pub use version::{UnknownVersion, Version};
