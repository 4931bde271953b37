//! Request-line routing and response rendering.
//!
//! The whole buffer must be UTF-8, but only the request line is
//! interpreted; headers and body are ignored.  The single route is
//! `POST /snap/{action}`.

use super::listener::MAX_REQUEST_BYTES;
use crate::action::Action;
use serde::Serialize;

/// Every way a request can fail to produce an [`Action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("request is not valid UTF-8")]
    InvalidEncoding,
    #[error("request line is empty")]
    MissingRequestLine,
    #[error("request line has fewer than two tokens")]
    InvalidRequestLine,
    #[error("method is not POST")]
    MethodNotAllowed,
    #[error("path is not /snap/<action>")]
    UnknownRoute,
    /// The request was valid but the dispatcher could not take it.
    #[error("dispatcher is not accepting actions")]
    Busy,
}

impl RouteError {
    /// HTTP status line fragment (`<code> <reason>`).
    pub fn status(self) -> &'static str {
        match self {
            RouteError::InvalidEncoding
            | RouteError::MissingRequestLine
            | RouteError::InvalidRequestLine => "400 Bad Request",
            RouteError::MethodNotAllowed => "405 Method Not Allowed",
            RouteError::UnknownRoute => "404 Not Found",
            RouteError::Busy => "503 Service Unavailable",
        }
    }

    /// Machine-readable error code carried in the JSON body.
    pub fn code(self) -> &'static str {
        match self {
            RouteError::InvalidEncoding => "invalid_encoding",
            RouteError::MissingRequestLine => "missing_request_line",
            RouteError::InvalidRequestLine => "invalid_request_line",
            RouteError::MethodNotAllowed => "only_post_supported",
            RouteError::UnknownRoute => "unknown_route",
            RouteError::Busy => "busy",
        }
    }
}

/// Position of the first `\r\n` in `buf`.
pub fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}

/// Decode a buffered request as UTF-8.
///
/// A multi-byte sequence cut off at the end of the buffer is dropped when the
/// read stopped early (request line complete, or size limit reached), since
/// its remaining bytes were simply never read.  Any other invalid byte fails.
fn decode(buf: &[u8]) -> Result<&str, RouteError> {
    match std::str::from_utf8(buf) {
        Ok(text) => Ok(text),
        Err(e)
            if e.error_len().is_none()
                && (find_crlf(buf).is_some() || buf.len() >= MAX_REQUEST_BYTES) =>
        {
            std::str::from_utf8(&buf[..e.valid_up_to()]).map_err(|_| RouteError::InvalidEncoding)
        }
        Err(_) => Err(RouteError::InvalidEncoding),
    }
}

/// Route a buffered request to an [`Action`].
pub fn parse_request(buf: &[u8]) -> Result<Action, RouteError> {
    let text = decode(buf)?;
    let line = text.split("\r\n").next().unwrap_or_default();
    if line.trim().is_empty() {
        return Err(RouteError::MissingRequestLine);
    }

    let mut tokens = line.split(' ').filter(|t| !t.is_empty());
    let (method, path) = match (tokens.next(), tokens.next()) {
        (Some(method), Some(path)) => (method, path),
        _ => return Err(RouteError::InvalidRequestLine),
    };

    if method != "POST" {
        return Err(RouteError::MethodNotAllowed);
    }
    route(path)
}

/// Match `path` against `/snap/<action>`.
fn route(path: &str) -> Result<Action, RouteError> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
        ["snap", action] => action.parse().map_err(|_| RouteError::UnknownRoute),
        _ => Err(RouteError::UnknownRoute),
    }
}

#[derive(Serialize)]
struct OkBody<'a> {
    status: &'a str,
    action: &'a str,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

/// Full response for an accepted action.
pub fn ok_response(action: Action) -> Vec<u8> {
    let body = serde_json::to_string(&OkBody {
        status: "ok",
        action: action.as_str(),
    })
    .unwrap_or_default();
    render("200 OK", &body)
}

/// Full response for a rejected request.
pub fn error_response(err: RouteError) -> Vec<u8> {
    let body = serde_json::to_string(&ErrorBody { error: err.code() }).unwrap_or_default();
    render(err.status(), &body)
}

fn render(status: &str, body: &str) -> Vec<u8> {
    format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: Close\r\n\r\n{}",
        status,
        body.len(),
        body
    )
    .into_bytes()
}
