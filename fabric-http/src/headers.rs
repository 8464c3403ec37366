//! HTTP/1.1 request-head parsing.
//!
//! Produces the ordered header list forwarded on the HTTP-BEGIN extension:
//! pseudo-headers first (`:scheme`, `:method`, `:path`, `:authority`), then
//! the request's own fields with names lowercased. `Host` is folded into
//! `:authority` and only when the request target carried none
//! (RFC 7230 Section 5.5 precedence).

use crate::error::RequestError;

/// Insertion-ordered header list with by-name replacement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: Vec<(String, String)>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a header, replacing the value in place when the name exists.
    pub fn insert(&mut self, name: &str, value: &str) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.entries.push((name.to_string(), value.to_string())),
        }
    }

    /// Insert a header only when the name is absent.
    pub fn set_if_absent(&mut self, name: &str, value: &str) {
        if !self.contains(name) {
            self.entries.push((name.to_string(), value.to_string()));
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Headers in insertion order.
    pub fn as_slice(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A fully parsed request head.
#[derive(Debug)]
pub struct RequestHead {
    pub headers: HeaderMap,
    /// Declared body length; 0 when absent.
    pub content_length: u64,
    /// Whether an `upgrade` header was present.
    pub has_upgrade: bool,
}

/// Scan `data` for the end of a request head. Returns the index just past
/// the `\r\n\r\n` terminator.
pub fn end_of_head(data: &[u8]) -> Option<usize> {
    data.windows(4).position(|w| w == b"\r\n\r\n").map(|i| i + 4)
}

/// Parse a complete request head (request line through the blank line).
pub fn parse_request_head(head: &[u8]) -> Result<RequestHead, RequestError> {
    let text = std::str::from_utf8(head).map_err(|_| RequestError::BadHeader)?;
    let mut lines = text.split("\r\n");

    let request_line = lines.next().ok_or(RequestError::BadRequestLine)?;
    let (method, target, version) = split_request_line(request_line)?;
    check_version(version)?;
    let target = parse_target(target)?;

    let mut headers = HeaderMap::new();
    headers.insert(":scheme", "http");
    headers.insert(":method", method);
    headers.insert(":path", &target.path);
    if let Some(authority) = &target.authority {
        headers.insert(":authority", authority);
    }

    for line in lines {
        if line.is_empty() {
            break;
        }
        let (name, value) = split_header_line(line)?;
        let name = name.to_ascii_lowercase();
        if name == "host" {
            headers.set_if_absent(":authority", value);
        } else {
            headers.insert(&name, value);
        }
    }

    if !headers.contains(":authority") {
        return Err(RequestError::MissingAuthority);
    }

    let content_length = match headers.get("content-length") {
        Some(value) => value
            .parse::<u64>()
            .map_err(|_| RequestError::BadContentLength)?,
        None => 0,
    };
    let has_upgrade = headers.contains("upgrade");

    Ok(RequestHead {
        headers,
        content_length,
        has_upgrade,
    })
}

/// Split `METHOD SP REQUEST-TARGET SP VERSION`. Runs of whitespace are
/// accepted between tokens, but the line may not start with whitespace.
fn split_request_line(line: &str) -> Result<(&str, &str, &str), RequestError> {
    if line.starts_with(|c: char| c.is_whitespace()) {
        return Err(RequestError::BadRequestLine);
    }
    let mut tokens = line.split_whitespace();
    match (tokens.next(), tokens.next(), tokens.next(), tokens.next()) {
        (Some(method), Some(target), Some(version), None) => Ok((method, target, version)),
        _ => Err(RequestError::BadRequestLine),
    }
}

fn check_version(version: &str) -> Result<(), RequestError> {
    let minor = version
        .strip_prefix("HTTP/1.")
        .ok_or(RequestError::VersionNotSupported)?;
    if minor.len() == 1 && minor.as_bytes()[0].is_ascii_digit() {
        Ok(())
    } else {
        Err(RequestError::VersionNotSupported)
    }
}

struct RequestTarget {
    authority: Option<String>,
    path: String,
}

/// Decompose a request target into authority and path.
///
/// Origin-form keeps no authority; absolute-form splits at `://`. The path
/// excludes query and fragment. Targets in neither form (`*` for OPTIONS)
/// pass through as the path verbatim.
fn parse_target(target: &str) -> Result<RequestTarget, RequestError> {
    if target.starts_with('/') {
        return Ok(RequestTarget {
            authority: None,
            path: strip_query(target).to_string(),
        });
    }
    if let Some((_scheme, rest)) = target.split_once("://") {
        let authority_end = rest
            .find(['/', '?', '#'])
            .unwrap_or(rest.len());
        let authority = &rest[..authority_end];
        if authority.contains('@') {
            return Err(RequestError::UserInfoInTarget);
        }
        let path = strip_query(&rest[authority_end..]);
        return Ok(RequestTarget {
            authority: (!authority.is_empty()).then(|| authority.to_string()),
            path: path.to_string(),
        });
    }
    Ok(RequestTarget {
        authority: None,
        path: target.to_string(),
    })
}

fn strip_query(path: &str) -> &str {
    match path.find(['?', '#']) {
        Some(end) => &path[..end],
        None => path,
    }
}

/// Split `name: value`, tolerating whitespace around the colon. The name
/// may not be empty or contain whitespace.
fn split_header_line(line: &str) -> Result<(&str, &str), RequestError> {
    let (raw_name, raw_value) = line.split_once(':').ok_or(RequestError::BadHeader)?;
    let name = raw_name.trim_end();
    if name.is_empty() || name.chars().any(|c| c.is_whitespace()) {
        return Err(RequestError::BadHeader);
    }
    Ok((name, raw_value.trim()))
}
