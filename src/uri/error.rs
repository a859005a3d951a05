/// A possible error value when parsing or rewriting a URI.
#[derive(Clone, PartialEq, Eq)]
pub enum UriError {
    /// Input does not match the URI grammar.
    Malformed,
    /// Port is outside `1..=65535`.
    Port,
    /// Scheme is not one of the supported set.
    Scheme,
}

macro_rules! gen_error {
    ($($variant:pat => $msg:literal),* $(,)?) => {
        impl std::fmt::Display for UriError {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                use UriError::*;
                match self {
                    $($variant => f.write_str($msg),)*
                }
            }
        }
    };
}

gen_error! {
    Malformed => "malformed URI",
    Port => "URI port must be between 1 and 65535",
    Scheme => "unsupported URI scheme",
}

impl std::error::Error for UriError { }

impl std::fmt::Debug for UriError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "\"{self}\"")
    }
}
