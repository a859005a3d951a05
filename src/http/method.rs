/// HTTP Method.
///
/// The vocabulary is the fixed set from [RFC9110] plus PATCH from
/// [RFC5789]. Arbitrary methods are not supported.
///
/// [RFC5789]: <https://www.rfc-editor.org/rfc/rfc5789>
/// [RFC9110]: <https://www.rfc-editor.org/rfc/rfc9110.html#name-methods>
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Method(u8);

impl Default for Method {
    #[inline]
    fn default() -> Self {
        Self::GET
    }
}

methods! {
    static NAMES: [9];

    pub const OPTIONS = (0, "OPTIONS");
    pub const HEAD = (1, "HEAD");
    pub const GET = (2, "GET");
    pub const POST = (3, "POST");
    pub const PUT = (4, "PUT");
    pub const PATCH = (5, "PATCH");
    pub const DELETE = (6, "DELETE");
    pub const TRACE = (7, "TRACE");
    pub const CONNECT = (8, "CONNECT");
}

impl Method {
    /// Parse a method case-insensitively, normalizing to uppercase.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownMethod`] for anything outside the vocabulary.
    pub fn parse(src: &str) -> Result<Self, UnknownMethod> {
        NAMES
            .iter()
            .position(|name| name.eq_ignore_ascii_case(src))
            .map(|at| Self(at as u8))
            .ok_or(UnknownMethod)
    }

    /// Returns the uppercase string representation of the method.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        NAMES[self.0 as usize]
    }
}

impl std::str::FromStr for Method {
    type Err = UnknownMethod;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Debug for Method {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Display for Method {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ===== Error =====

/// Method is not part of the supported vocabulary.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct UnknownMethod;

impl std::error::Error for UnknownMethod { }

impl std::fmt::Debug for UnknownMethod {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str("unknown method")
    }
}

impl std::fmt::Display for UnknownMethod {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str("unknown method")
    }
}

// ===== Macros =====

macro_rules! methods {
    (
        static $names:ident: [$len:literal];
        $(
            pub const $name:ident = ($idx:literal, $val:literal);
        )*
    ) => {
        impl Method {
            $(
                #[doc = concat!("The `", $val, "` method.")]
                pub const $name: Self = Self($idx);
            )*
        }

        static $names: [&str; $len] = [
            $($val,)*
        ];
    };
}

use methods;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_normalizes_to_upper() {
        assert_eq!(Method::parse("get").unwrap(), Method::GET);
        assert_eq!(Method::parse("get").unwrap().as_str(), "GET");
        assert_eq!(Method::parse("Patch").unwrap(), Method::PATCH);
        assert_eq!(Method::parse("CONNECT").unwrap(), Method::CONNECT);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(Method::parse("BOGUS").is_err());
        assert!(Method::parse("").is_err());
        assert!(Method::parse("GETT").is_err());
    }

    #[test]
    fn test_default_is_get() {
        assert_eq!(Method::default(), Method::GET);
    }
}
