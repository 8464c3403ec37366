use thiserror::Error;

/// Errors surfaced by adapter setup.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration validation failed.
    #[error("config: {0}")]
    Config(String),
}

/// Protocol-level request failures.
///
/// Each kind maps to the canned HTTP/1.1 response clocked out through the
/// reject stream before the source is reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RequestError {
    /// Request line does not split into method, target, and version.
    #[error("malformed request line")]
    BadRequestLine,
    /// Version token is not `HTTP/1.<digit>`.
    #[error("http version not supported")]
    VersionNotSupported,
    /// Neither the request target nor a `Host` header supplied an authority.
    #[error("missing authority")]
    MissingAuthority,
    /// The request target carries userinfo.
    #[error("userinfo in request target")]
    UserInfoInTarget,
    /// A header line is not `name: value`.
    #[error("malformed header line")]
    BadHeader,
    /// `content-length` is not a decimal number.
    #[error("malformed content-length")]
    BadContentLength,
    /// The request head does not fit in a slab slot.
    #[error("request header fields too large")]
    HeadersTooLarge,
    /// No route matched the request headers.
    #[error("no route matched")]
    NoRoute,
}

impl RequestError {
    /// Canned response for this failure: an RFC 7230 status line with an
    /// empty body, written verbatim to the reject stream.
    pub fn response(&self) -> &'static [u8] {
        match self {
            RequestError::BadRequestLine
            | RequestError::MissingAuthority
            | RequestError::UserInfoInTarget
            | RequestError::BadHeader
            | RequestError::BadContentLength => b"HTTP/1.1 400 Bad Request\r\n\r\n",
            RequestError::VersionNotSupported => {
                b"HTTP/1.1 505 HTTP Version Not Supported\r\n\r\n"
            }
            RequestError::HeadersTooLarge => {
                b"HTTP/1.1 431 Request Header Fields Too Large\r\n\r\n"
            }
            RequestError::NoRoute => b"HTTP/1.1 404 Not Found\r\n\r\n",
        }
    }
}
