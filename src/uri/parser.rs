use super::{Scheme, Uri, UriError, matches, normalize_port};

impl Uri {
    /// Parse a URI from a string.
    ///
    /// The scheme and host are lowercased, the port is validated and
    /// normalized against the scheme default, and path, query and fragment
    /// are percent-encoded per their component rules. Everything else is
    /// kept byte-exact.
    ///
    /// An empty input yields the empty [`Uri`].
    ///
    /// # Errors
    ///
    /// Returns [`UriError::Malformed`] when the input does not fit the URI
    /// grammar, [`UriError::Scheme`] for an unsupported scheme and
    /// [`UriError::Port`] for a port outside `1..=65535`.
    pub fn parse(input: &str) -> Result<Self, UriError> {
        if input.is_empty() {
            return Ok(Self::default());
        }

        // fragment terminates everything after the first `#`
        let (rest, fragment) = match input.split_once('#') {
            Some((rest, fragment)) => (rest, fragment),
            None => (input, ""),
        };

        let (rest, query) = match rest.split_once('?') {
            Some((rest, query)) => (rest, query),
            None => (rest, ""),
        };

        // a scheme is only recognized in absolute form, `scheme://...`
        let mut scheme = Scheme::Empty;
        let mut rest = rest;
        if let Some(at) = rest.find(':') {
            let candidate = &rest[..at];
            if is_scheme_token(candidate) && rest[at + 1..].starts_with("//") {
                scheme = Scheme::parse(candidate)?;
                rest = &rest[at + 1..];
            }
        }

        let (authority, path) = match rest.strip_prefix("//") {
            Some(after) => {
                let at = after.find('/').unwrap_or(after.len());
                (&after[..at], &after[at..])
            }
            None => ("", rest),
        };

        if authority.is_empty() && !matches!(scheme, Scheme::Empty) {
            return Err(UriError::Malformed);
        }

        let (userinfo, hostport) = match matches::split_userinfo(authority) {
            Some((userinfo, hostport)) => (userinfo, hostport),
            None => ("", authority),
        };

        let (host, port) = match matches::split_port(hostport) {
            Some((host, port)) => (host, Some(parse_port(port)?)),
            None => (hostport, None),
        };

        // a colon in the host is only valid inside an IPv6 bracket pair
        if host.contains(':') && !(host.starts_with('[') && host.ends_with(']')) {
            return Err(UriError::Malformed);
        }

        Ok(Self {
            scheme,
            userinfo: userinfo.to_owned(),
            host: host.to_ascii_lowercase(),
            port: normalize_port(port, scheme),
            path: encode_path(path),
            query: encode_query_or_fragment(query),
            fragment: encode_query_or_fragment(fragment),
        })
    }
}

fn is_scheme_token(token: &str) -> bool {
    let mut bytes = token.bytes();
    match bytes.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            bytes.all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'-' | b'.'))
        }
        _ => false,
    }
}

fn parse_port(port: &str) -> Result<u16, UriError> {
    if port.is_empty() {
        return Err(UriError::Malformed);
    }
    match port.parse::<u32>() {
        Ok(port @ 1..=65535) => Ok(port as u16),
        Ok(_) => Err(UriError::Port),
        Err(_) => Err(UriError::Malformed),
    }
}

// ===== Percent Encoding =====

pub(crate) fn encode_path(input: &str) -> String {
    encode(input, matches::is_path)
}

pub(crate) fn encode_query_or_fragment(input: &str) -> String {
    encode(input, matches::is_query_or_fragment)
}

/// Escape every byte outside `keep` as uppercase `%XX`.
///
/// Idempotent: a `%` followed by two hex digits is an escape already and
/// passes through, any other `%` becomes `%25`.
fn encode(input: &str, keep: fn(u8) -> bool) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";

    let bytes = input.as_bytes();
    let mut out = String::with_capacity(bytes.len());
    let mut at = 0;

    while let Some(&byte) = bytes.get(at) {
        if byte == b'%' {
            match bytes.get(at + 1..at + 3) {
                Some([hi, lo]) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => {
                    out.push('%');
                }
                _ => out.push_str("%25"),
            }
        } else if keep(byte) {
            // `keep` only accepts ASCII
            out.push(byte as char);
        } else {
            out.push('%');
            out.push(HEX[(byte >> 4) as usize] as char);
            out.push(HEX[(byte & 0x0F) as usize] as char);
        }
        at += 1;
    }

    out
}
