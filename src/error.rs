//! Error types for the chat server
//!
//! Defines application-level errors and their mapping to wire status
//! codes. Uses thiserror for ergonomic error definitions.

use thiserror::Error;

use crate::http::StatusCode;

/// Application-level errors
///
/// Covers fatal errors (connection termination) and business errors
/// (serialized back to the client as a status code plus error payload).
#[derive(Debug, Error)]
pub enum AppError {
    /// Request line did not split into METHOD, PATH and PROTOCOL-VERSION
    #[error("malformed request line: {0}")]
    MalformedRequestLine(String),

    /// Header line lacked the `: ` separator
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    /// Body bytes were not a valid payload for the endpoint
    #[error("malformed body: {0}")]
    MalformedBody(#[from] serde_json::Error),

    /// Body-bearing method arrived with absent or zero Content-Length
    #[error("missing request body")]
    MissingBody,

    /// No route registered for this method and path
    #[error("no route for {0} {1}")]
    RouteNotFound(String, String),

    /// Authorization token missing or not bound to a session
    #[error("invalid token")]
    InvalidToken,

    /// No registered user has this login
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// No chat exists with this name
    #[error("chat not found: {0}")]
    ChatNotFound(String),

    /// IO error (fatal)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Channel send error (fatal - the state actor is gone)
    #[error("channel send error")]
    ChannelSend,
}

impl AppError {
    /// Wire status code for this error
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MalformedRequestLine(_)
            | AppError::MalformedHeader(_)
            | AppError::MalformedBody(_)
            | AppError::MissingBody => StatusCode::BadRequest,
            AppError::InvalidToken => StatusCode::Unauthorized,
            AppError::RouteNotFound(_, _)
            | AppError::UserNotFound(_)
            | AppError::ChatNotFound(_) => StatusCode::NotFound,
            AppError::Io(_) | AppError::ChannelSend => StatusCode::InternalServerError,
        }
    }

    /// Client-facing error payload
    ///
    /// Deliberately coarser than the internal error: the wire contract
    /// exposes a fixed set of phrases, not parser details.
    pub fn payload(&self) -> serde_json::Value {
        let message = match self {
            AppError::MalformedRequestLine(_)
            | AppError::MalformedHeader(_)
            | AppError::MalformedBody(_)
            | AppError::MissingBody => "Invalid request",
            AppError::InvalidToken => "User not found",
            AppError::RouteNotFound(_, _) => "Endpoint not found",
            AppError::UserNotFound(_) => "User not found",
            AppError::ChatNotFound(_) => "Chat not found",
            AppError::Io(_) | AppError::ChannelSend => "Internal server error",
        };
        serde_json::json!({ "error": message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_errors_map_to_400() {
        assert_eq!(
            AppError::MalformedRequestLine("GET".into()).status(),
            StatusCode::BadRequest
        );
        assert_eq!(
            AppError::MalformedHeader("oops".into()).status(),
            StatusCode::BadRequest
        );
        assert_eq!(AppError::MissingBody.status(), StatusCode::BadRequest);
    }

    #[test]
    fn test_lookup_errors_map_to_404() {
        assert_eq!(
            AppError::ChatNotFound("nope".into()).status(),
            StatusCode::NotFound
        );
        assert_eq!(
            AppError::UserNotFound("bob".into()).status(),
            StatusCode::NotFound
        );
        assert_eq!(
            AppError::RouteNotFound("GET".into(), "/x/".into()).status(),
            StatusCode::NotFound
        );
    }

    #[test]
    fn test_invalid_token_payload() {
        let err = AppError::InvalidToken;
        assert_eq!(err.status(), StatusCode::Unauthorized);
        assert_eq!(err.payload(), serde_json::json!({"error": "User not found"}));
    }

    #[test]
    fn test_route_not_found_payload() {
        let err = AppError::RouteNotFound("POST".into(), "/nope/".into());
        assert_eq!(
            err.payload(),
            serde_json::json!({"error": "Endpoint not found"})
        );
    }
}
