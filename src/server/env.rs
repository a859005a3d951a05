//! Server environment access.
use std::collections::BTreeMap;
use std::net::Ipv6Addr;

use super::ServerError;
use crate::uri::Uri;

/// CGI-style server environment, keyed by variable name.
#[derive(Clone, Debug, Default)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of a variable.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Set a variable, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Returns an iterator over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Environment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

/// Reconstruct the request URI from the server environment.
///
/// The scheme comes from `HTTPS`, the authority from `HTTP_HOST` with
/// `SERVER_NAME` then `SERVER_ADDR` as fallbacks, and the path and query
/// from `REQUEST_URI` with `QUERY_STRING` as the query fallback.
///
/// # Errors
///
/// Returns [`ServerError::MissingHost`] when no host variable is set.
pub fn uri_from_env(env: &Environment) -> Result<Uri, ServerError> {
    // IIS-style hosts report `Off`, the flag is matched case-insensitively
    let https = env
        .get("HTTPS")
        .is_some_and(|https| !https.eq_ignore_ascii_case("off") && !https.is_empty());
    let scheme = match https {
        true => "https",
        false => "http",
    };

    let mut authority;
    if let Some(host) = env.get("HTTP_HOST") {
        authority = host.to_owned();
    } else if let Some(name) = env.get("SERVER_NAME").or_else(|| env.get("SERVER_ADDR")) {
        authority = format_host(name);
        push_server_port(&mut authority, env, https);
    } else {
        return Err(ServerError::MissingHost);
    }

    let (path, query) = match env.get("REQUEST_URI") {
        Some(target) => match target.split_once('?') {
            Some((path, query)) => (path, query),
            None => (target, env.get("QUERY_STRING").unwrap_or("")),
        },
        None => ("", env.get("QUERY_STRING").unwrap_or("")),
    };

    let mut text = format!("{scheme}://{authority}{path}");
    if !query.is_empty() {
        text.push('?');
        text.push_str(query);
    }
    Ok(Uri::parse(&text)?)
}

/// Bare IPv6 addresses need brackets to form an authority.
fn format_host(host: &str) -> String {
    match host.parse::<Ipv6Addr>() {
        Ok(_) => format!("[{host}]"),
        Err(_) => host.to_owned(),
    }
}

fn push_server_port(authority: &mut String, env: &Environment, https: bool) {
    let Some(port) = env.get("SERVER_PORT") else {
        return;
    };
    let default = match https {
        true => "443",
        false => "80",
    };
    if !port.is_empty() && port != default {
        authority.push(':');
        authority.push_str(port);
    }
}
