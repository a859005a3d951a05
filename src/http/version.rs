/// HTTP protocol version.
///
/// [httpwg](https://httpwg.org/specs/rfc9112.html#http.version)
#[derive(Copy, Clone, PartialEq, PartialOrd, Eq, Ord, Hash)]
pub struct Version(Inner);

#[derive(Copy, Clone, PartialEq, PartialOrd, Eq, Ord, Hash)]
enum Inner {
    Http10,
    Http11,
    H2,
}

impl Version {
    /// `HTTP/1.0`
    pub const HTTP_10: Version = Version(Inner::Http10);

    /// `HTTP/1.1`
    pub const HTTP_11: Version = Version(Inner::Http11);

    /// `HTTP/2.0`
    pub const HTTP_2: Version = Version(Inner::H2);

    /// Parse a dotted version number, e.g. `"1.1"`.
    ///
    /// `"2"` is accepted as an alias of `"2.0"`.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownVersion`] for any other input.
    pub fn parse(src: &str) -> Result<Self, UnknownVersion> {
        match src {
            "1.0" => Ok(Self::HTTP_10),
            "1.1" => Ok(Self::HTTP_11),
            "2.0" | "2" => Ok(Self::HTTP_2),
            _ => Err(UnknownVersion),
        }
    }

    /// Returns the dotted version number, e.g. `"1.1"`.
    pub const fn as_str(&self) -> &'static str {
        match self.0 {
            Inner::Http10 => "1.0",
            Inner::Http11 => "1.1",
            Inner::H2 => "2.0",
        }
    }
}

impl Default for Version {
    #[inline]
    fn default() -> Self {
        Self::HTTP_11
    }
}

impl std::str::FromStr for Version {
    type Err = UnknownVersion;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Debug for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(match self.0 {
            Inner::Http10 => "HTTP/1.0",
            Inner::Http11 => "HTTP/1.1",
            Inner::H2 => "HTTP/2.0",
        })
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ===== Error =====

/// Version is not part of the supported set.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct UnknownVersion;

impl std::error::Error for UnknownVersion { }

impl std::fmt::Debug for UnknownVersion {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str("unknown protocol version")
    }
}

impl std::fmt::Display for UnknownVersion {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str("unknown protocol version")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(Version::parse("1.0").unwrap(), Version::HTTP_10);
        assert_eq!(Version::parse("1.1").unwrap(), Version::HTTP_11);
        assert_eq!(Version::parse("2.0").unwrap(), Version::HTTP_2);
        assert_eq!(Version::parse("2").unwrap(), Version::HTTP_2);
        assert!(Version::parse("0.9").is_err());
        assert!(Version::parse("HTTP/1.1").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Version::HTTP_11.to_string(), "1.1");
        assert_eq!(Version::parse("2").unwrap().as_str(), "2.0");
    }
}
