//! Wire protocol framing
//!
//! Parses the HTTP/1.1-shaped request format off a buffered byte stream
//! and renders responses back into it. This layer knows nothing about
//! chat semantics: it produces `{method, path, headers, body}` and
//! consumes `(status, payload)`.
//!
//! Request framing:
//! - request line `METHOD SP PATH SP PROTOCOL-VERSION CRLF`
//! - header lines `Key: Value CRLF`, terminated by a bare CRLF
//! - for POST with `Content-Length > 0`, exactly that many body bytes
//!
//! Responses carry a status line, a fixed `Content-Type` header, a blank
//! line and a JSON payload. No `Content-Length`, no keep-alive: the
//! connection serves one exchange and closes.

use std::collections::HashMap;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::error::AppError;

/// Request methods understood by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    /// Parse a method token from the request line
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "GET" => Some(Method::Get),
            "POST" => Some(Method::Post),
            _ => None,
        }
    }

    /// Whether requests with this method carry a body
    pub fn has_body(&self) -> bool {
        matches!(self, Method::Post)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response status codes used by the protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Ok,
    BadRequest,
    Unauthorized,
    NotFound,
    InternalServerError,
}

impl StatusCode {
    pub fn code(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::Unauthorized => 401,
            StatusCode::NotFound => 404,
            StatusCode::InternalServerError => 500,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Unauthorized => "Unauthorized",
            StatusCode::NotFound => "Not Found",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }
}

/// A parsed request
///
/// `body` is `Some` only for body-bearing methods that declared a
/// positive `Content-Length`; typed decoding happens per endpoint.
#[derive(Debug)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: Option<Vec<u8>>,
}

impl Request {
    /// Value of the `Authorization` header, if present
    pub fn token(&self) -> Option<&str> {
        self.headers.get("Authorization").map(|v| v.as_str())
    }
}

/// Read and parse one request from a buffered stream
///
/// An unknown method token is reported as `RouteNotFound` rather than a
/// parse failure: the line itself was well-formed, the server just has
/// nothing registered for it. GET requests never read a body, whatever
/// their headers claim.
pub async fn parse_request<R>(reader: &mut R) -> Result<Request, AppError>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    reader.read_line(&mut line).await?;

    let mut tokens = line.split_whitespace();
    let (method, path) = match (tokens.next(), tokens.next(), tokens.next(), tokens.next()) {
        (Some(method), Some(path), Some(_version), None) => (method, path.to_string()),
        _ => return Err(AppError::MalformedRequestLine(line.trim_end().to_string())),
    };
    let method = Method::parse(method)
        .ok_or_else(|| AppError::RouteNotFound(method.to_string(), path.clone()))?;

    let headers = parse_headers(reader).await?;

    let content_length: usize = headers
        .get("Content-Length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    let body = if method.has_body() && content_length > 0 {
        let mut buf = vec![0u8; content_length];
        // A peer that closes before delivering Content-Length bytes sent
        // a bad request, not a server fault
        reader.read_exact(&mut buf).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                AppError::MissingBody
            } else {
                AppError::Io(e)
            }
        })?;
        Some(buf)
    } else {
        None
    };

    Ok(Request {
        method,
        path,
        headers,
        body,
    })
}

/// Read header lines until the bare CRLF that ends the header block
async fn parse_headers<R>(reader: &mut R) -> Result<HashMap<String, String>, AppError>
where
    R: AsyncBufRead + Unpin,
{
    let mut headers = HashMap::new();
    let mut line = String::new();
    loop {
        line.clear();
        let read = reader.read_line(&mut line).await?;
        if read == 0 || line == "\r\n" || line == "\n" {
            break;
        }
        let trimmed = line.trim_end_matches(['\r', '\n']);
        let (key, value) = trimmed
            .split_once(": ")
            .ok_or_else(|| AppError::MalformedHeader(trimmed.to_string()))?;
        headers.insert(key.to_string(), value.to_string());
    }
    Ok(headers)
}

/// Render a status and JSON payload into the wire format
pub fn render_response(status: StatusCode, payload: &serde_json::Value) -> String {
    let mut response = format!("HTTP/1.1 {} {}\r\n", status.code(), status.reason());
    response.push_str("Content-Type: application/json; charset=utf-8\r\n");
    response.push_str("\r\n");
    response.push_str(&payload.to_string());
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    async fn parse(raw: &str) -> Result<Request, AppError> {
        let mut reader = BufReader::new(raw.as_bytes());
        parse_request(&mut reader).await
    }

    #[tokio::test]
    async fn test_parse_get_request() {
        let req = parse("GET /status/ HTTP/1.1\r\nAuthorization: abc123\r\n\r\n")
            .await
            .unwrap();
        assert_eq!(req.method, Method::Get);
        assert_eq!(req.path, "/status/");
        assert_eq!(req.token(), Some("abc123"));
        assert!(req.body.is_none());
    }

    #[tokio::test]
    async fn test_parse_post_with_body() {
        let body = r#"{"message":"hi"}"#;
        let raw = format!(
            "POST /send/ HTTP/1.1\r\nAuthorization: t\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        );
        let req = parse(&raw).await.unwrap();
        assert_eq!(req.method, Method::Post);
        assert_eq!(req.body.as_deref(), Some(body.as_bytes()));
    }

    #[tokio::test]
    async fn test_post_without_content_length_has_no_body() {
        let req = parse("POST /send/ HTTP/1.1\r\nAuthorization: t\r\n\r\n")
            .await
            .unwrap();
        assert!(req.body.is_none());
    }

    #[tokio::test]
    async fn test_get_ignores_content_length() {
        // GET never reads a body, even with a Content-Length header
        let req = parse("GET /status/ HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello")
            .await
            .unwrap();
        assert!(req.body.is_none());
    }

    #[tokio::test]
    async fn test_malformed_request_line() {
        let err = parse("GET /status/\r\n\r\n").await.unwrap_err();
        assert!(matches!(err, AppError::MalformedRequestLine(_)));

        let err = parse("GET /a/ HTTP/1.1 extra\r\n\r\n").await.unwrap_err();
        assert!(matches!(err, AppError::MalformedRequestLine(_)));
    }

    #[tokio::test]
    async fn test_unknown_method_is_route_not_found() {
        let err = parse("DELETE /status/ HTTP/1.1\r\n\r\n").await.unwrap_err();
        assert!(matches!(err, AppError::RouteNotFound(_, _)));
    }

    #[tokio::test]
    async fn test_malformed_header() {
        let err = parse("GET /status/ HTTP/1.1\r\nNoSeparator\r\n\r\n")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MalformedHeader(_)));
    }

    #[test]
    fn test_render_response_format() {
        let payload = serde_json::json!({"token": "abc"});
        let rendered = render_response(StatusCode::Ok, &payload);
        assert!(rendered.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(rendered.contains("Content-Type: application/json; charset=utf-8\r\n\r\n"));
        assert!(rendered.ends_with(r#"{"token":"abc"}"#));
    }

    #[test]
    fn test_render_response_reasons() {
        for (status, expected) in [
            (StatusCode::BadRequest, "HTTP/1.1 400 Bad Request\r\n"),
            (StatusCode::Unauthorized, "HTTP/1.1 401 Unauthorized\r\n"),
            (StatusCode::NotFound, "HTTP/1.1 404 Not Found\r\n"),
            (
                StatusCode::InternalServerError,
                "HTTP/1.1 500 Internal Server Error\r\n",
            ),
        ] {
            let rendered = render_response(status, &serde_json::json!({}));
            assert!(rendered.starts_with(expected));
        }
    }
}
