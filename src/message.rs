//! HTTP message base: protocol version, headers, body.
use crate::{
    headers::{HeaderMap, IntoHeaderValues, into_values},
    http::Version,
    stream::Stream,
};

/// Common state of every HTTP message.
///
/// Immutable: every `with_*` method returns a new value and leaves the
/// receiver untouched. The body is always present, an empty stream stands
/// in when none was set.
#[derive(Clone, Debug, Default)]
pub struct Message {
    version: Version,
    headers: HeaderMap,
    body: Stream,
}

impl Message {
    /// Create an empty `HTTP/1.1` message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the protocol version.
    #[inline]
    pub fn version(&self) -> Version {
        self.version
    }

    /// Returns the header map.
    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns all values for the given header, matched case-insensitively.
    ///
    /// Absent headers yield an empty slice.
    #[inline]
    pub fn header(&self, name: &str) -> &[String] {
        self.headers.get(name)
    }

    /// Returns all values for the given header joined with `", "`.
    #[inline]
    pub fn header_line(&self, name: &str) -> String {
        self.headers.get_line(name)
    }

    /// Returns `true` if the header is present, matched case-insensitively.
    #[inline]
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.contains(name)
    }

    /// Returns the message body.
    #[inline]
    pub fn body(&self) -> &Stream {
        &self.body
    }
}

// ===== Mutation =====

impl Message {
    /// Returns a new message with the given protocol version.
    pub fn with_version(&self, version: Version) -> Self {
        let mut new = self.clone();
        new.version = version;
        new
    }

    /// Returns a new message with all values for `name` replaced.
    ///
    /// The casing given in this call becomes the output casing.
    pub fn with_header<V: IntoHeaderValues>(&self, name: &str, values: V) -> Self {
        let mut new = self.clone();
        new.headers.set(name, into_values(values));
        new
    }

    /// Returns a new message with values appended under `name`.
    ///
    /// An existing header keeps its first-seen casing; an absent one
    /// behaves like [`with_header`][Message::with_header].
    pub fn with_added_header<V: IntoHeaderValues>(&self, name: &str, values: V) -> Self {
        let mut new = self.clone();
        new.headers.append(name, into_values(values));
        new
    }

    /// Returns a new message without the given header, dropping both the
    /// values and the recorded casing. Unchanged copy when absent.
    pub fn without_header(&self, name: &str) -> Self {
        let mut new = self.clone();
        new.headers.remove(name);
        new
    }

    /// Returns a new message with the given body.
    ///
    /// Unchanged copy when `body` is the same stream handle.
    pub fn with_body(&self, body: Stream) -> Self {
        let mut new = self.clone();
        if !new.body.same(&body) {
            new.body = body;
        }
        new
    }

    pub(crate) fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }
}

// ===== Macros =====

/// Expose the full [`Message`] surface on a wrapping message type.
macro_rules! impl_message {
    ($ty:ident.$($field:ident).+) => {
        impl $ty {
            /// Returns the protocol version.
            #[inline]
            pub fn version(&self) -> $crate::http::Version {
                self.$($field).+.version()
            }

            /// Returns the header map.
            #[inline]
            pub fn headers(&self) -> &$crate::headers::HeaderMap {
                self.$($field).+.headers()
            }

            /// Returns all values for the given header, matched
            /// case-insensitively. Absent headers yield an empty slice.
            #[inline]
            pub fn header(&self, name: &str) -> &[String] {
                self.$($field).+.header(name)
            }

            /// Returns all values for the given header joined with `", "`.
            #[inline]
            pub fn header_line(&self, name: &str) -> String {
                self.$($field).+.header_line(name)
            }

            /// Returns `true` if the header is present, matched
            /// case-insensitively.
            #[inline]
            pub fn has_header(&self, name: &str) -> bool {
                self.$($field).+.has_header(name)
            }

            /// Returns the message body.
            #[inline]
            pub fn body(&self) -> &$crate::stream::Stream {
                self.$($field).+.body()
            }

            /// Returns a new value with the given protocol version.
            pub fn with_version(&self, version: $crate::http::Version) -> Self {
                let mut new = self.clone();
                new.$($field).+ = new.$($field).+.with_version(version);
                new
            }

            /// Returns a new value with all values for `name` replaced,
            /// recording this call's casing for output.
            pub fn with_header<V: $crate::headers::IntoHeaderValues>(
                &self,
                name: &str,
                values: V,
            ) -> Self {
                let mut new = self.clone();
                new.$($field).+ = new.$($field).+.with_header(name, values);
                new
            }

            /// Returns a new value with values appended under `name`,
            /// keeping the first-seen casing.
            pub fn with_added_header<V: $crate::headers::IntoHeaderValues>(
                &self,
                name: &str,
                values: V,
            ) -> Self {
                let mut new = self.clone();
                new.$($field).+ = new.$($field).+.with_added_header(name, values);
                new
            }

            /// Returns a new value without the given header. Unchanged
            /// copy when absent.
            pub fn without_header(&self, name: &str) -> Self {
                let mut new = self.clone();
                new.$($field).+ = new.$($field).+.without_header(name);
                new
            }

            /// Returns a new value with the given body. Unchanged copy
            /// when `body` is the same stream handle.
            pub fn with_body(&self, body: $crate::stream::Stream) -> Self {
                let mut new = self.clone();
                new.$($field).+ = new.$($field).+.with_body(body);
                new
            }
        }
    };
}

pub(crate) use impl_message;
