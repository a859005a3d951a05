/// HTTP [Status Code][rfc].
///
/// Any value in `100..=599` is a valid status code; codes outside the
/// registered table simply have no canonical reason phrase.
///
/// [rfc]: <https://datatracker.ietf.org/doc/html/rfc9110#name-status-codes>
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StatusCode(u16);

impl Default for StatusCode {
    #[inline]
    fn default() -> Self {
        Self::OK
    }
}

impl StatusCode {
    /// Create a [`StatusCode`] from its numeric value.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidStatus`] outside `100..=599`.
    #[inline]
    pub const fn from_u16(code: u16) -> Result<Self, InvalidStatus> {
        match code {
            100..=599 => Ok(Self(code)),
            _ => Err(InvalidStatus),
        }
    }

    /// Returns the numeric value, e.g. `200`.
    #[inline]
    pub const fn as_u16(&self) -> u16 {
        self.0
    }

    /// Returns `true` for `1xx` codes.
    #[inline]
    pub const fn is_informational(&self) -> bool {
        matches!(self.0, 100..=199)
    }

    /// Returns `true` for `2xx` codes.
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self.0, 200..=299)
    }

    /// Returns `true` for `3xx` codes.
    #[inline]
    pub const fn is_redirection(&self) -> bool {
        matches!(self.0, 300..=399)
    }

    /// Returns `true` for `4xx` codes.
    #[inline]
    pub const fn is_client_error(&self) -> bool {
        matches!(self.0, 400..=499)
    }

    /// Returns `true` for `5xx` codes.
    #[inline]
    pub const fn is_server_error(&self) -> bool {
        matches!(self.0, 500..=599)
    }
}

impl std::fmt::Debug for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(itoa::Buffer::new().format(self.0))
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(itoa::Buffer::new().format(self.0))
    }
}

// ===== Error =====

/// Status code outside the `100..=599` range.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct InvalidStatus;

impl std::error::Error for InvalidStatus { }

impl std::fmt::Debug for InvalidStatus {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str("status code must be between 100 and 599")
    }
}

impl std::fmt::Display for InvalidStatus {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str("status code must be between 100 and 599")
    }
}

// ===== Reason Table =====

macro_rules! status_codes {
    (
        $(
            $int:literal $name:ident $msg:literal;
        )*
    ) => {
        impl StatusCode {
            $(
                #[doc = concat!("`", stringify!($int), " ", $msg, "`")]
                pub const $name: Self = Self($int);
            )*

            /// Returns the canonical reason phrase for the code.
            ///
            /// Codes outside the registered table yield [`None`].
            pub const fn reason(&self) -> Option<&'static str> {
                match self.0 {
                    $(
                        $int => Some($msg),
                    )*
                    _ => None,
                }
            }
        }
    };
}

status_codes! {
    100 CONTINUE "Continue";
    101 SWITCHING_PROTOCOLS "Switching Protocols";
    102 PROCESSING "Processing";
    103 EARLY_HINTS "Early Hints";
    200 OK "OK";
    201 CREATED "Created";
    202 ACCEPTED "Accepted";
    203 NON_AUTHORITATIVE_INFORMATION "Non-Authoritative Information";
    204 NO_CONTENT "No Content";
    205 RESET_CONTENT "Reset Content";
    206 PARTIAL_CONTENT "Partial Content";
    207 MULTI_STATUS "Multi-Status";
    208 ALREADY_REPORTED "Already Reported";
    226 IM_USED "IM Used";
    300 MULTIPLE_CHOICES "Multiple Choices";
    301 MOVED_PERMANENTLY "Moved Permanently";
    302 FOUND "Found";
    303 SEE_OTHER "See Other";
    304 NOT_MODIFIED "Not Modified";
    305 USE_PROXY "Use Proxy";
    307 TEMPORARY_REDIRECT "Temporary Redirect";
    308 PERMANENT_REDIRECT "Permanent Redirect";
    400 BAD_REQUEST "Bad Request";
    401 UNAUTHORIZED "Unauthorized";
    402 PAYMENT_REQUIRED "Payment Required";
    403 FORBIDDEN "Forbidden";
    404 NOT_FOUND "Not Found";
    405 METHOD_NOT_ALLOWED "Method Not Allowed";
    406 NOT_ACCEPTABLE "Not Acceptable";
    407 PROXY_AUTHENTICATION_REQUIRED "Proxy Authentication Required";
    408 REQUEST_TIMEOUT "Request Timeout";
    409 CONFLICT "Conflict";
    410 GONE "Gone";
    411 LENGTH_REQUIRED "Length Required";
    412 PRECONDITION_FAILED "Precondition Failed";
    413 CONTENT_TOO_LARGE "Content Too Large";
    414 URI_TOO_LONG "URI Too Long";
    415 UNSUPPORTED_MEDIA_TYPE "Unsupported Media Type";
    416 RANGE_NOT_SATISFIABLE "Range Not Satisfiable";
    417 EXPECTATION_FAILED "Expectation Failed";
    418 IM_A_TEAPOT "I'm a teapot";
    421 MISDIRECTED_REQUEST "Misdirected Request";
    422 UNPROCESSABLE_CONTENT "Unprocessable Content";
    423 LOCKED "Locked";
    424 FAILED_DEPENDENCY "Failed Dependency";
    425 TOO_EARLY "Too Early";
    426 UPGRADE_REQUIRED "Upgrade Required";
    427 UNASSIGNED "Unassigned";
    428 PRECONDITION_REQUIRED "Precondition Required";
    429 TOO_MANY_REQUESTS "Too Many Requests";
    431 REQUEST_HEADER_FIELDS_TOO_LARGE "Request Header Fields Too Large";
    451 UNAVAILABLE_FOR_LEGAL_REASONS "Unavailable For Legal Reasons";
    500 INTERNAL_SERVER_ERROR "Internal Server Error";
    501 NOT_IMPLEMENTED "Not Implemented";
    502 BAD_GATEWAY "Bad Gateway";
    503 SERVICE_UNAVAILABLE "Service Unavailable";
    504 GATEWAY_TIMEOUT "Gateway Timeout";
    505 HTTP_VERSION_NOT_SUPPORTED "HTTP Version Not Supported";
    506 VARIANT_ALSO_NEGOTIATES "Variant Also Negotiates";
    507 INSUFFICIENT_STORAGE "Insufficient Storage";
    508 LOOP_DETECTED "Loop Detected";
    510 NOT_EXTENDED "Not Extended";
    511 NETWORK_AUTHENTICATION "Network Authentication";
}
