//! Byte classes for URI component encoding.

/// Unreserved characters, allowed everywhere.
pub(crate) const fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b'-' | b'.' | b'~')
}

/// Bytes that survive path encoding unescaped.
///
/// Unreserved plus `:@&=+$,/;` and `%` itself. A literal `%` is only kept
/// when followed by two hex digits, which is checked by the encoder, not
/// here.
pub(crate) const fn is_path(byte: u8) -> bool {
    is_unreserved(byte)
        || matches!(
            byte,
            b':' | b'@' | b'&' | b'=' | b'+' | b'$' | b',' | b'/' | b';' | b'%'
        )
}

/// Bytes that survive query and fragment encoding unescaped.
///
/// Unreserved plus sub-delims and `:@/?%`.
pub(crate) const fn is_query_or_fragment(byte: u8) -> bool {
    is_unreserved(byte)
        || matches!(
            byte,
            b'!' | b'$'
                | b'&'
                | b'\''
                | b'('
                | b')'
                | b'*'
                | b'+'
                | b','
                | b';'
                | b'='
                | b'%'
                | b':'
                | b'@'
                | b'/'
                | b'?'
        )
}

/// Split `userinfo@rest` at the last `@`, the host itself never contains one.
pub(crate) fn split_userinfo(bytes: &str) -> Option<(&str, &str)> {
    let at = bytes.rfind('@')?;
    Some((&bytes[..at], &bytes[at + 1..]))
}

/// Split `host:port` at the trailing port delimiter.
///
/// Scans digits from the end so bracketed IPv6 literals are left intact:
/// `[a2f::1]:443` splits, `[a2f::1]` does not.
pub(crate) fn split_port(bytes: &str) -> Option<(&str, &str)> {
    let mut iter = bytes.bytes().enumerate().rev();

    loop {
        let (at, byte) = iter.next()?;
        if byte == b':' {
            // reject a colon that is part of an unbracketed IPv6 literal,
            // a port delimiter must have at least one digit after it
            if at + 1 == bytes.len() {
                return Some((&bytes[..at], ""));
            }
            return Some((&bytes[..at], &bytes[at + 1..]));
        }
        if !byte.is_ascii_digit() {
            return None;
        }
    }
}
