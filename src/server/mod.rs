//! Server-side request representation.
use std::collections::BTreeMap;

use serde_json::Value;

use crate::{
    http::{UnknownMethod, Version},
    log::debug,
    message::impl_message,
    request::Request,
    uri::{Uri, UriError},
};

mod env;
mod files;

pub use env::{Environment, uri_from_env};
pub use files::{UploadNode, normalize_files};

/// Incoming request enriched with server-side state.
#[derive(Clone, Debug)]
pub struct ServerRequest {
    request: Request,
    attributes: BTreeMap<String, Value>,
    parsed_body: Option<Value>,
    query_params: BTreeMap<String, String>,
    cookie_params: BTreeMap<String, String>,
    uploaded_files: BTreeMap<String, UploadNode>,
    server_params: Environment,
}

impl ServerRequest {
    /// Wrap a request with empty server-side state.
    pub fn new(request: Request) -> Self {
        Self {
            request,
            attributes: BTreeMap::new(),
            parsed_body: None,
            query_params: BTreeMap::new(),
            cookie_params: BTreeMap::new(),
            uploaded_files: BTreeMap::new(),
            server_params: Environment::new(),
        }
    }

    /// Build a request from a CGI-style environment.
    ///
    /// Derives the method from `REQUEST_METHOD`, the URI from the host
    /// and target variables, the protocol version from
    /// `SERVER_PROTOCOL`, headers from `HTTP_*` variables, query
    /// parameters from the query string and cookies from `HTTP_COOKIE`.
    ///
    /// # Errors
    ///
    /// Fails when no host variable is present or when a variable cannot
    /// be interpreted.
    pub fn from_env(env: &Environment) -> Result<Self, ServerError> {
        let method = env.get("REQUEST_METHOD").unwrap_or("GET");
        let uri = uri_from_env(env)?;
        debug!("request from environment: {method} {uri}");
        let mut request = Request::new(method, uri)?;

        if let Some(protocol) = env.get("SERVER_PROTOCOL") {
            let version = protocol.strip_prefix("HTTP/").unwrap_or(protocol);
            match Version::parse(version) {
                Ok(version) => request = request.with_version(version),
                Err(_) => {
                    debug!("unrecognized protocol {protocol:?}, keeping default");
                }
            }
        }

        for (name, value) in env.iter() {
            if let Some(raw) = name.strip_prefix("HTTP_") {
                request = request.with_header(&header_name(raw), value);
            }
        }
        for name in ["CONTENT_TYPE", "CONTENT_LENGTH"] {
            if let Some(value) = env.get(name) {
                request = request.with_header(&header_name(name), value);
            }
        }

        let mut new = Self::new(request);
        new.query_params = parse_pairs(new.request.uri().query(), '&');
        if let Some(cookie) = env.get("HTTP_COOKIE") {
            new.cookie_params = parse_pairs(cookie, ';');
        }
        new.server_params = env.clone();
        Ok(new)
    }
}

// ===== Server state =====

impl ServerRequest {
    /// Returns the environment the request was built from.
    #[inline]
    pub fn server_params(&self) -> &Environment {
        &self.server_params
    }

    /// Returns the decoded query parameters.
    #[inline]
    pub fn query_params(&self) -> &BTreeMap<String, String> {
        &self.query_params
    }

    /// Returns the cookies sent with the request.
    #[inline]
    pub fn cookie_params(&self) -> &BTreeMap<String, String> {
        &self.cookie_params
    }

    /// Returns the deserialized body, if one has been attached.
    #[inline]
    pub fn parsed_body(&self) -> Option<&Value> {
        self.parsed_body.as_ref()
    }

    /// Returns the normalized upload tree.
    #[inline]
    pub fn uploaded_files(&self) -> &BTreeMap<String, UploadNode> {
        &self.uploaded_files
    }

    /// Returns all request attributes.
    #[inline]
    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }

    /// Returns a single attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn with_attribute(&self, name: impl Into<String>, value: Value) -> Self {
        let mut new = self.clone();
        new.attributes.insert(name.into(), value);
        new
    }

    pub fn without_attribute(&self, name: &str) -> Self {
        let mut new = self.clone();
        new.attributes.remove(name);
        new
    }

    pub fn with_parsed_body(&self, body: Option<Value>) -> Self {
        let mut new = self.clone();
        new.parsed_body = body;
        new
    }

    pub fn with_query_params(&self, params: BTreeMap<String, String>) -> Self {
        let mut new = self.clone();
        new.query_params = params;
        new
    }

    pub fn with_cookie_params(&self, params: BTreeMap<String, String>) -> Self {
        let mut new = self.clone();
        new.cookie_params = params;
        new
    }

    pub fn with_uploaded_files(&self, files: BTreeMap<String, UploadNode>) -> Self {
        let mut new = self.clone();
        new.uploaded_files = files;
        new
    }
}

// ===== Request surface =====

impl ServerRequest {
    /// Returns the request method.
    #[inline]
    pub fn method(&self) -> crate::http::Method {
        self.request.method()
    }

    /// Returns the request URI.
    #[inline]
    pub fn uri(&self) -> &Uri {
        self.request.uri()
    }

    /// Returns the request target.
    pub fn request_target(&self) -> String {
        self.request.request_target()
    }

    /// Returns a new request with the given method, parsed
    /// case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownMethod`] for a method outside the fixed
    /// vocabulary.
    pub fn with_method(&self, method: &str) -> Result<Self, UnknownMethod> {
        let mut new = self.clone();
        new.request = self.request.with_method(method)?;
        Ok(new)
    }

    /// Returns a new request with the given URI, recomputing the `Host`
    /// header unless `preserve_host` is set.
    pub fn with_uri(&self, uri: Uri, preserve_host: bool) -> Self {
        let mut new = self.clone();
        new.request = self.request.with_uri(uri, preserve_host);
        new
    }
}

impl_message!(ServerRequest.request);

/// `USER_AGENT` to `User-Agent`.
fn header_name(raw: &str) -> String {
    let mut name = String::with_capacity(raw.len());
    for word in raw.split('_') {
        if !name.is_empty() {
            name.push('-');
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            name.extend(first.to_uppercase());
            name.extend(chars.flat_map(char::to_lowercase));
        }
    }
    name
}

/// Split `a=b<sep>c=d` into a map, trimming whitespace around pairs.
fn parse_pairs(text: &str, sep: char) -> BTreeMap<String, String> {
    let mut pairs = BTreeMap::new();
    for pair in text.split(sep) {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        match pair.split_once('=') {
            Some((key, value)) => pairs.insert(key.to_owned(), value.to_owned()),
            None => pairs.insert(pair.to_owned(), String::new()),
        };
    }
    pairs
}

// ===== Error =====

/// Error while building a request from the environment.
pub enum ServerError {
    /// No host variable in the environment.
    MissingHost,
    /// Rejected request method.
    Method(UnknownMethod),
    /// Rejected reconstructed URI.
    Uri(UriError),
    /// Malformed upload metadata.
    FileSpec(&'static str),
}

impl From<UnknownMethod> for ServerError {
    fn from(err: UnknownMethod) -> Self {
        Self::Method(err)
    }
}

impl From<UriError> for ServerError {
    fn from(err: UriError) -> Self {
        Self::Uri(err)
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Method(err) => Some(err),
            Self::Uri(err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingHost => f.write_str("no host in server environment"),
            Self::Method(err) => write!(f, "{err}"),
            Self::Uri(err) => write!(f, "cannot reconstruct uri: {err}"),
            Self::FileSpec(detail) => write!(f, "malformed upload metadata: {detail}"),
        }
    }
}

impl std::fmt::Debug for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{self}\"")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::http::Method;
    use serde_json::json;

    fn sample_env() -> Environment {
        [
            ("REQUEST_METHOD", "post"),
            ("SERVER_PROTOCOL", "HTTP/1.1"),
            ("HTTP_HOST", "example.com"),
            ("HTTP_USER_AGENT", "busta-test"),
            ("HTTP_ACCEPT_LANGUAGE", "it-IT"),
            ("HTTP_COOKIE", "session=abc123; theme=dark"),
            ("CONTENT_TYPE", "application/x-www-form-urlencoded"),
            ("REQUEST_URI", "/submit?draft=1&tab=files"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_from_env() {
        let request = ServerRequest::from_env(&sample_env()).unwrap();
        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.version(), Version::HTTP_11);
        assert_eq!(request.uri().to_string(), "http://example.com/submit?draft=1&tab=files");
        assert_eq!(request.header("user-agent"), ["busta-test"]);
        assert_eq!(request.header("accept-language"), ["it-IT"]);
        assert_eq!(request.header("content-type"), ["application/x-www-form-urlencoded"]);
    }

    #[test]
    fn test_from_env_host_is_first_header() {
        let request = ServerRequest::from_env(&sample_env()).unwrap();
        let first = request.headers().iter().next().unwrap();
        assert_eq!(first.0, "Host");
    }

    #[test]
    fn test_from_env_query_and_cookies() {
        let request = ServerRequest::from_env(&sample_env()).unwrap();
        assert_eq!(request.query_params()["draft"], "1");
        assert_eq!(request.query_params()["tab"], "files");
        assert_eq!(request.cookie_params()["session"], "abc123");
        assert_eq!(request.cookie_params()["theme"], "dark");
    }

    #[test]
    fn test_from_env_defaults() {
        let env: Environment = [("HTTP_HOST", "example.com")].into_iter().collect();
        let request = ServerRequest::from_env(&env).unwrap();
        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.version(), Version::default());
        assert_eq!(request.request_target(), "/");
    }

    #[test]
    fn test_attributes() {
        let env: Environment = [("HTTP_HOST", "example.com")].into_iter().collect();
        let request = ServerRequest::from_env(&env)
            .unwrap()
            .with_attribute("route", json!("/users/{id}"))
            .with_attribute("id", json!(7));

        assert_eq!(request.attribute("route"), Some(&json!("/users/{id}")));
        let request = request.without_attribute("id");
        assert_eq!(request.attribute("id"), None);
    }

    #[test]
    fn test_parsed_body_and_files() {
        let env: Environment = [("HTTP_HOST", "example.com")].into_iter().collect();
        let files = normalize_files(&json!({
            "avatar": { "tmp_name": "/tmp/a", "size": 3, "error": 0 }
        }))
        .unwrap();
        let request = ServerRequest::from_env(&env)
            .unwrap()
            .with_parsed_body(Some(json!({ "title": "hello" })))
            .with_uploaded_files(files);

        assert_eq!(request.parsed_body().unwrap()["title"], "hello");
        assert!(request.uploaded_files()["avatar"].as_file().is_some());
    }

    #[test]
    fn test_header_name_formatting() {
        assert_eq!(header_name("USER_AGENT"), "User-Agent");
        assert_eq!(header_name("CONTENT_TYPE"), "Content-Type");
        assert_eq!(header_name("X_REQUESTED_WITH"), "X-Requested-With");
    }
}
