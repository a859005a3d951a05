//! Immutable HTTP message values.
//!
//! Requests, responses and their parts are plain values. Mutation goes
//! through `with_*` methods that return a modified copy and leave the
//! original untouched, so a message can be handed around freely.
//!
//! ```
//! use busta::{Request, Uri};
//!
//! let request = Request::new("get", Uri::parse("http://example.com/users?page=2")?)?
//!     .with_header("Accept", "application/json");
//!
//! assert_eq!(request.method().as_str(), "GET");
//! assert_eq!(request.header("host"), ["example.com"]);
//! assert_eq!(request.request_target(), "/users?page=2");
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! ```
#![warn(missing_debug_implementations)]

mod log;

pub mod headers;
pub mod http;
pub mod stream;
pub mod uri;

mod message;
mod request;
mod response;
mod uploaded;

pub mod client;
pub mod server;

pub use headers::HeaderMap;
pub use http::{Method, StatusCode, Version};
pub use message::Message;
pub use request::Request;
pub use response::Response;
pub use server::{Environment, ServerRequest};
pub use stream::{Metadata, Mode, Stream, StreamError};
pub use uploaded::{UploadError, UploadErrorCode, UploadedFile};
pub use uri::{Scheme, Uri, UriError};
