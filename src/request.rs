//! HTTP Request.
use crate::{
    http::{Method, UnknownMethod},
    message::{Message, impl_message},
    uri::Uri,
};

/// HTTP request value.
///
/// The `Host` header is derived from the URI at construction and kept in
/// first position in header iteration order, per wire-format convention.
#[derive(Clone, Debug)]
pub struct Request {
    method: Method,
    uri: Uri,
    target: Option<String>,
    message: Message,
}

impl Request {
    /// Create a request, parsing the method case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownMethod`] for a method outside the fixed
    /// vocabulary.
    pub fn new(method: &str, uri: Uri) -> Result<Self, UnknownMethod> {
        Ok(Self::from_parts(Method::parse(method)?, uri))
    }

    /// Create a request from an already validated method.
    pub fn from_parts(method: Method, uri: Uri) -> Self {
        let mut new = Self {
            method,
            uri,
            target: None,
            message: Message::new(),
        };
        new.update_host_from_uri();
        new
    }

    /// Returns the request method.
    #[inline]
    pub fn method(&self) -> Method {
        self.method
    }

    /// Returns the request URI.
    #[inline]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the request target.
    ///
    /// Unless explicitly set, the origin form `/path[?query]` is derived
    /// from the URI.
    pub fn request_target(&self) -> String {
        if let Some(target) = &self.target {
            return target.clone();
        }
        let mut target = String::from("/");
        target.push_str(self.uri.path().trim_start_matches('/'));
        if !self.uri.query().is_empty() {
            target.push('?');
            target.push_str(self.uri.query());
        }
        target
    }

    fn update_host_from_uri(&mut self) {
        let host = self.uri.host();
        if host.is_empty() {
            return;
        }
        let mut value = host.to_owned();
        if let Some(port) = self.uri.port() {
            value.push(':');
            value.push_str(itoa::Buffer::new().format(port));
        }
        self.message.headers_mut().set_host_first(value);
    }
}

// ===== Mutation =====

impl Request {
    /// Returns a new request with the given method, parsed
    /// case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownMethod`] for a method outside the fixed
    /// vocabulary.
    pub fn with_method(&self, method: &str) -> Result<Self, UnknownMethod> {
        let method = Method::parse(method)?;
        let mut new = self.clone();
        new.method = method;
        Ok(new)
    }

    /// Returns a new request with the given URI.
    ///
    /// The `Host` header is recomputed from the new URI unless
    /// `preserve_host` is set and a `Host` header is already present.
    /// Unchanged copy when the URI is equal to the current one.
    pub fn with_uri(&self, uri: Uri, preserve_host: bool) -> Self {
        if self.uri == uri {
            return self.clone();
        }
        let mut new = self.clone();
        new.uri = uri;
        if !preserve_host || !new.has_header("host") {
            new.update_host_from_uri();
        }
        new
    }

    /// Returns a new request with an explicit request target.
    pub fn with_request_target(&self, target: &str) -> Self {
        if self.target.as_deref() == Some(target) {
            return self.clone();
        }
        let mut new = self.clone();
        new.target = Some(target.to_owned());
        new
    }
}

impl_message!(Request.message);

#[cfg(test)]
mod test {
    use super::*;
    use crate::http::Version;

    fn uri(text: &str) -> Uri {
        Uri::parse(text).unwrap()
    }

    #[test]
    fn test_method_normalization() {
        let request = Request::new("get", uri("http://example.com/")).unwrap();
        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.method().as_str(), "GET");

        assert!(Request::new("BOGUS", uri("http://example.com/")).is_err());
    }

    #[test]
    fn test_host_derived_from_uri() {
        let request = Request::new("GET", uri("http://example.com:8080/x")).unwrap();
        assert_eq!(request.header("host"), ["example.com:8080"]);

        // default port omitted from the derived value
        let request = Request::new("GET", uri("http://example.com:80/x")).unwrap();
        assert_eq!(request.header("host"), ["example.com"]);

        // no host, no header
        let request = Request::new("GET", uri("/relative")).unwrap();
        assert!(!request.has_header("host"));
    }

    #[test]
    fn test_host_is_first_header() {
        let request = Request::new("GET", uri("/relative"))
            .unwrap()
            .with_header("Accept", "*/*")
            .with_uri(uri("http://example.com/"), false);

        let names: Vec<&str> = request.headers().iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["Host", "Accept"]);
    }

    #[test]
    fn test_with_uri_preserve_host() {
        let request = Request::new("GET", uri("http://one.example/")).unwrap();

        let moved = request.with_uri(uri("http://two.example/"), false);
        assert_eq!(moved.header("host"), ["two.example"]);

        let kept = request.with_uri(uri("http://two.example/"), true);
        assert_eq!(kept.header("host"), ["one.example"]);

        // preserve_host without an existing header still derives
        let bare = Request::new("GET", uri("/x")).unwrap();
        let derived = bare.with_uri(uri("http://two.example/"), true);
        assert_eq!(derived.header("host"), ["two.example"]);
    }

    #[test]
    fn test_with_uri_same_value_noop() {
        let request = Request::new("GET", uri("http://example.com/"))
            .unwrap()
            .with_header("Host", "override.example");
        // equal URI: host override survives because nothing is recomputed
        let same = request.with_uri(uri("http://example.com/"), false);
        assert_eq!(same.header("host"), ["override.example"]);
    }

    #[test]
    fn test_request_target() {
        let request = Request::new("GET", uri("http://example.com/foo/bar?x=1")).unwrap();
        assert_eq!(request.request_target(), "/foo/bar?x=1");

        let request = Request::new("GET", uri("http://example.com")).unwrap();
        assert_eq!(request.request_target(), "/");

        let request = request.with_request_target("*");
        assert_eq!(request.request_target(), "*");
    }

    #[test]
    fn test_message_surface() {
        let request = Request::new("POST", uri("http://example.com/"))
            .unwrap()
            .with_version(Version::HTTP_2)
            .with_header("Content-Type", "application/json");

        assert_eq!(request.version(), Version::HTTP_2);
        assert_eq!(request.header_line("content-type"), "application/json");
        assert!(request.without_header("content-type").header("content-type").is_empty());
    }
}
