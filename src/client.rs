//! Outbound request building on top of a pluggable transport.
use crate::{
    http::Method,
    log::debug,
    request::Request,
    response::Response,
    stream::Stream,
    uri::{Uri, UriError},
};

/// Type erased transport error.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Anything that can exchange a request for a response.
pub trait Transport {
    fn send(&self, request: Request) -> Result<Response, BoxError>;
}

/// Outbound request body.
#[derive(Debug)]
pub enum Body {
    Text(String),
    Json(serde_json::Value),
    Stream(Stream),
}

/// A thin client binding a base URL and default headers to a transport.
///
/// Paths are joined to the base with exactly one slash between them.
/// Per-call headers override the defaults.
#[derive(Debug)]
pub struct Client<T> {
    transport: T,
    base_url: String,
    default_headers: Vec<(String, String)>,
}

impl<T: Transport> Client<T> {
    /// Create a client for the given base URL.
    pub fn new(transport: T, base_url: &str) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_owned(),
            default_headers: Vec::new(),
        }
    }

    /// Add a header applied to every outgoing request.
    pub fn with_default_header(mut self, name: &str, value: &str) -> Self {
        self.default_headers.push((name.to_owned(), value.to_owned()));
        self
    }

    pub fn get(
        &self,
        path: &str,
        query: &[(&str, &str)],
        headers: &[(&str, &str)],
    ) -> Result<Response, ClientError> {
        self.send(Method::GET, path, query, None, headers)
    }

    pub fn delete(&self, path: &str, headers: &[(&str, &str)]) -> Result<Response, ClientError> {
        self.send(Method::DELETE, path, &[], None, headers)
    }

    pub fn post(
        &self,
        path: &str,
        body: Option<Body>,
        headers: &[(&str, &str)],
    ) -> Result<Response, ClientError> {
        self.send(Method::POST, path, &[], body, headers)
    }

    pub fn put(
        &self,
        path: &str,
        body: Option<Body>,
        headers: &[(&str, &str)],
    ) -> Result<Response, ClientError> {
        self.send(Method::PUT, path, &[], body, headers)
    }

    pub fn patch(
        &self,
        path: &str,
        body: Option<Body>,
        headers: &[(&str, &str)],
    ) -> Result<Response, ClientError> {
        self.send(Method::PATCH, path, &[], body, headers)
    }

    fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<Body>,
        headers: &[(&str, &str)],
    ) -> Result<Response, ClientError> {
        let mut uri = self.join(path)?;
        if !query.is_empty() {
            uri = uri.with_query(&build_query(query));
        }
        debug!("{method:?} {uri}");
        let mut request = Request::from_parts(method, uri);

        for (name, value) in &self.default_headers {
            request = request.with_header(name, value.as_str());
        }
        for (name, value) in headers {
            request = request.with_header(name, *value);
        }

        match body {
            Some(Body::Text(text)) => request = request.with_body(Stream::from(text)),
            Some(Body::Json(value)) => {
                let text = serde_json::to_string(&value).map_err(ClientError::JsonEncode)?;
                if !request.has_header("content-type") {
                    request = request.with_header("Content-Type", "application/json");
                }
                request = request.with_body(Stream::from(text));
            }
            Some(Body::Stream(stream)) => request = request.with_body(stream),
            None => {}
        }

        self.transport.send(request).map_err(ClientError::Transport)
    }

    fn join(&self, path: &str) -> Result<Uri, ClientError> {
        let path = path.trim_start_matches('/');
        let text = format!("{}/{path}", self.base_url);
        Ok(Uri::parse(&text)?)
    }
}

/// Join pairs as `a=1&b=2`, percent-encoding is applied by the URI.
fn build_query(query: &[(&str, &str)]) -> String {
    let mut out = String::new();
    for (name, value) in query {
        if !out.is_empty() {
            out.push('&');
        }
        out.push_str(name);
        out.push('=');
        out.push_str(value);
    }
    out
}

// ===== Error =====

/// Error while building or sending an outbound request.
pub enum ClientError {
    /// The joined URL does not parse.
    Uri(UriError),
    /// The JSON body cannot be serialized.
    JsonEncode(serde_json::Error),
    /// The transport failed to deliver the request.
    Transport(BoxError),
}

impl From<UriError> for ClientError {
    fn from(err: UriError) -> Self {
        Self::Uri(err)
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Uri(err) => Some(err),
            Self::JsonEncode(err) => Some(err),
            Self::Transport(err) => Some(&**err),
        }
    }
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uri(err) => write!(f, "invalid request url: {err}"),
            Self::JsonEncode(err) => write!(f, "cannot encode json body: {err}"),
            Self::Transport(err) => write!(f, "transport failure: {err}"),
        }
    }
}

impl std::fmt::Debug for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{self}\"")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;

    struct Capture {
        sent: RefCell<Option<Request>>,
    }

    impl Capture {
        fn new() -> Self {
            Self { sent: RefCell::new(None) }
        }

        fn taken(&self) -> Request {
            self.sent.borrow_mut().take().unwrap()
        }
    }

    impl Transport for &Capture {
        fn send(&self, request: Request) -> Result<Response, BoxError> {
            *self.sent.borrow_mut() = Some(request);
            Ok(Response::new(200).unwrap())
        }
    }

    #[test]
    fn test_path_join() {
        let capture = Capture::new();
        let client = Client::new(&capture, "http://api.example.com/");

        client.get("/users/7", &[], &[]).unwrap();
        assert_eq!(capture.taken().uri().to_string(), "http://api.example.com/users/7");

        client.get("users/7", &[], &[]).unwrap();
        assert_eq!(capture.taken().uri().to_string(), "http://api.example.com/users/7");
    }

    #[test]
    fn test_get_query_params() {
        let capture = Capture::new();
        let client = Client::new(&capture, "http://api.example.com");

        client.get("/users", &[("page", "2"), ("sort", "name asc")], &[]).unwrap();
        let sent = capture.taken();
        assert_eq!(sent.uri().query(), "page=2&sort=name%20asc");
        assert_eq!(
            sent.uri().to_string(),
            "http://api.example.com/users?page=2&sort=name%20asc"
        );

        // no params, no question mark
        client.get("/users", &[], &[]).unwrap();
        assert_eq!(capture.taken().uri().to_string(), "http://api.example.com/users");
    }

    #[test]
    fn test_default_and_call_headers() {
        let capture = Capture::new();
        let client = Client::new(&capture, "http://api.example.com")
            .with_default_header("Accept", "application/json")
            .with_default_header("X-Tenant", "alpha");

        client.get("/ping", &[], &[("X-Tenant", "beta")]).unwrap();
        let sent = capture.taken();
        assert_eq!(sent.header("accept"), ["application/json"]);
        assert_eq!(sent.header("x-tenant"), ["beta"]);
    }

    #[test]
    fn test_json_body_sets_content_type() {
        let capture = Capture::new();
        let client = Client::new(&capture, "http://api.example.com");

        client.post("/users", Some(Body::Json(json!({ "name": "ada" }))), &[]).unwrap();
        let sent = capture.taken();
        assert_eq!(sent.method(), Method::POST);
        assert_eq!(sent.header("content-type"), ["application/json"]);
        assert_eq!(sent.body().to_string(), r#"{"name":"ada"}"#);
    }

    #[test]
    fn test_explicit_content_type_wins() {
        let capture = Capture::new();
        let client = Client::new(&capture, "http://api.example.com");

        client
            .put(
                "/users/7",
                Some(Body::Json(json!({ "name": "ada" }))),
                &[("Content-Type", "application/vnd.example+json")],
            )
            .unwrap();
        assert_eq!(capture.taken().header("content-type"), ["application/vnd.example+json"]);
    }

    #[test]
    fn test_text_and_stream_bodies() {
        let capture = Capture::new();
        let client = Client::new(&capture, "http://api.example.com");

        client.patch("/notes/1", Some(Body::Text("hello".into())), &[]).unwrap();
        assert_eq!(capture.taken().body().to_string(), "hello");

        client.post("/blobs", Some(Body::Stream(Stream::from("raw"))), &[]).unwrap();
        assert_eq!(capture.taken().body().to_string(), "raw");
    }

    #[test]
    fn test_delete_has_no_body() {
        let capture = Capture::new();
        let client = Client::new(&capture, "http://api.example.com");

        client.delete("/users/7", &[]).unwrap();
        let sent = capture.taken();
        assert_eq!(sent.method(), Method::DELETE);
        assert_eq!(sent.body().size().unwrap(), 0);
    }
}
