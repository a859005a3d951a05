//! Uniform Resource Identifier ([RFC3986])
//!
//! [RFC3986]: <https://datatracker.ietf.org/doc/html/rfc3986>
//!
//! # Value Semantics
//!
//! [`Uri`] is an immutable value. Every `with_*` method returns a new
//! value and leaves the receiver untouched; when the new component equals
//! the current one the returned value is an unchanged copy, so structural
//! equality between the two still holds.
//!
//! # Percent Encoding
//!
//! Path, query and fragment are stored percent-encoded. Encoding is
//! idempotent: an already valid `%XX` sequence is never re-encoded, while
//! a stray `%` is escaped to `%25`.

mod matches;
mod parser;
mod error;

#[cfg(test)]
mod test;

pub use error::UriError;

use parser::{encode_path, encode_query_or_fragment};

/// URI scheme, one of the supported set.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// No scheme, for relative references.
    #[default]
    Empty,
    Http,
    Https,
}

impl Scheme {
    /// Parse a scheme case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`UriError::Scheme`] for anything outside the supported set.
    pub fn parse(scheme: &str) -> Result<Self, UriError> {
        if scheme.is_empty() {
            Ok(Self::Empty)
        } else if scheme.eq_ignore_ascii_case("http") {
            Ok(Self::Http)
        } else if scheme.eq_ignore_ascii_case("https") {
            Ok(Self::Https)
        } else {
            Err(UriError::Scheme)
        }
    }

    /// Returns the scheme in lowercase, or `""` when empty.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "",
            Self::Http => "http",
            Self::Https => "https",
        }
    }

    /// Returns the conventional default port for the scheme.
    pub const fn default_port(&self) -> Option<u16> {
        match self {
            Self::Empty => None,
            Self::Http => Some(80),
            Self::Https => Some(443),
        }
    }
}

impl std::fmt::Debug for Scheme {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// URI Generic Syntax ([RFC3986])
///
/// [RFC3986]: <https://datatracker.ietf.org/doc/html/rfc3986>
///
/// # Syntax Component
///
/// ```not_rust
///   foo://user@example.com:8042/over/there?name=ferret#nose
///   \_/   \___________________/\_________/ \_________/ \__/
///    |             |                |           |        |
/// scheme       authority          path        query   fragment
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Uri {
    scheme: Scheme,
    /// raw, may embed a password after `:`
    userinfo: String,
    /// lowercase
    host: String,
    /// absent when unset or equal to the scheme default
    port: Option<u16>,
    /// percent-encoded per path rules
    path: String,
    /// percent-encoded per query rules, no leading `?`
    query: String,
    /// percent-encoded per query rules, no leading `#`
    fragment: String,
}

impl Uri {
    /// Returns the scheme component in lowercase, `""` when absent.
    #[inline]
    pub const fn scheme(&self) -> &str {
        self.scheme.as_str()
    }

    /// Returns the scheme as typed value.
    #[inline]
    pub const fn as_scheme(&self) -> Scheme {
        self.scheme
    }

    /// Returns the user information, `user[:password]`, `""` when absent.
    #[inline]
    pub fn userinfo(&self) -> &str {
        &self.userinfo
    }

    /// Returns the host component in lowercase, `""` when absent.
    #[inline]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port component.
    ///
    /// Absent when unset or equal to the scheme's default port.
    #[inline]
    pub const fn port(&self) -> Option<u16> {
        self.port
    }

    /// Returns the percent-encoded path component.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the percent-encoded query component without the leading `?`.
    #[inline]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Returns the percent-encoded fragment component without the leading `#`.
    #[inline]
    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// Returns the authority, `[userinfo@]host[:port]`.
    ///
    /// Empty when the host is empty. The port is omitted when absent,
    /// which includes the scheme-default case.
    pub fn authority(&self) -> String {
        if self.host.is_empty() {
            return String::new();
        }

        let mut out = String::new();
        if !self.userinfo.is_empty() {
            out.push_str(&self.userinfo);
            out.push('@');
        }
        out.push_str(&self.host);
        if let Some(port) = self.port {
            out.push(':');
            out.push_str(itoa::Buffer::new().format(port));
        }
        out
    }
}

// ===== Mutation =====

impl Uri {
    /// Returns a new [`Uri`] with the given scheme.
    ///
    /// Default-port normalization is re-applied against the new scheme.
    ///
    /// # Errors
    ///
    /// Returns [`UriError::Scheme`] for an unsupported scheme.
    pub fn with_scheme(&self, scheme: &str) -> Result<Self, UriError> {
        let scheme = Scheme::parse(scheme)?;
        if self.scheme == scheme {
            return Ok(self.clone());
        }
        let mut new = self.clone();
        new.scheme = scheme;
        new.port = normalize_port(self.effective_port(), scheme);
        Ok(new)
    }

    /// Returns a new [`Uri`] with the given user information.
    ///
    /// An empty user clears the component. The password is appended after
    /// `:` when present and non-empty.
    pub fn with_userinfo(&self, user: &str, password: Option<&str>) -> Self {
        let mut userinfo = user.to_owned();
        if let Some(password) = password.filter(|p| !p.is_empty()) {
            userinfo.push(':');
            userinfo.push_str(password);
        }
        if self.userinfo == userinfo {
            return self.clone();
        }
        let mut new = self.clone();
        new.userinfo = userinfo;
        new
    }

    /// Returns a new [`Uri`] with the given host, lowercased.
    pub fn with_host(&self, host: &str) -> Self {
        let host = host.to_ascii_lowercase();
        if self.host == host {
            return self.clone();
        }
        let mut new = self.clone();
        new.host = host;
        new
    }

    /// Returns a new [`Uri`] with the given port, `None` to clear it.
    ///
    /// A port equal to the scheme default normalizes to absent.
    ///
    /// # Errors
    ///
    /// Returns [`UriError::Port`] when the port is `0`.
    pub fn with_port(&self, port: Option<u16>) -> Result<Self, UriError> {
        if port == Some(0) {
            return Err(UriError::Port);
        }
        let port = normalize_port(port, self.scheme);
        if self.port == port {
            return Ok(self.clone());
        }
        let mut new = self.clone();
        new.port = port;
        Ok(new)
    }

    /// Returns a new [`Uri`] with the given path, percent-encoded.
    pub fn with_path(&self, path: &str) -> Self {
        let path = encode_path(path);
        if self.path == path {
            return self.clone();
        }
        let mut new = self.clone();
        new.path = path;
        new
    }

    /// Returns a new [`Uri`] with the given query, percent-encoded.
    ///
    /// The value must not carry a leading `?`.
    pub fn with_query(&self, query: &str) -> Self {
        let query = encode_query_or_fragment(query);
        if self.query == query {
            return self.clone();
        }
        let mut new = self.clone();
        new.query = query;
        new
    }

    /// Returns a new [`Uri`] with the given fragment, percent-encoded.
    ///
    /// The value must not carry a leading `#`.
    pub fn with_fragment(&self, fragment: &str) -> Self {
        let fragment = encode_query_or_fragment(fragment);
        if self.fragment == fragment {
            return self.clone();
        }
        let mut new = self.clone();
        new.fragment = fragment;
        new
    }

    /// Port as set, re-materializing a suppressed scheme default.
    fn effective_port(&self) -> Option<u16> {
        self.port.or(self.scheme.default_port())
    }
}

pub(crate) fn normalize_port(port: Option<u16>, scheme: Scheme) -> Option<u16> {
    match port {
        Some(port) if Some(port) == scheme.default_port() => None,
        other => other,
    }
}

// ===== Format =====

impl std::fmt::Display for Uri {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if !matches!(self.scheme, Scheme::Empty) {
            f.write_str(self.scheme.as_str())?;
            f.write_str(":")?;
        }

        let authority = self.authority();
        if !authority.is_empty() {
            f.write_str("//")?;
            f.write_str(&authority)?;
        }

        if !self.path.is_empty() {
            if !authority.is_empty() && !self.path.starts_with('/') {
                f.write_str("/")?;
            }
            f.write_str(&self.path)?;
        }

        if !self.query.is_empty() {
            f.write_str("?")?;
            f.write_str(&self.query)?;
        }

        if !self.fragment.is_empty() {
            f.write_str("#")?;
            f.write_str(&self.fragment)?;
        }

        Ok(())
    }
}

impl std::fmt::Debug for Uri {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "\"{self}\"")
    }
}

impl std::str::FromStr for Uri {
    type Err = UriError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
