//! Per-endpoint request body schemas
//!
//! Typed JSON payloads validated at the parse boundary. Unknown fields
//! are rejected instead of silently ignored, and missing fields fail
//! deserialization rather than defaulting to empty values.

use serde::Deserialize;

use crate::error::AppError;

/// Body of `POST /connect/`
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectBody {
    pub login: String,
    pub secret: String,
}

/// Body of `POST /send/`
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendBody {
    pub message: String,
}

/// Body of `POST /send_to/`
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendToBody {
    pub user_login: String,
    pub message: String,
}

/// Decode a request body into its endpoint schema
///
/// Failure maps to 400 via `AppError::MalformedBody`.
pub fn decode_body<'a, T: Deserialize<'a>>(bytes: &'a [u8]) -> Result<T, AppError> {
    Ok(serde_json::from_slice(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_body_deserialize() {
        let body: ConnectBody = decode_body(br#"{"login":"alice","secret":"p1"}"#).unwrap();
        assert_eq!(body.login, "alice");
        assert_eq!(body.secret, "p1");
    }

    #[test]
    fn test_send_to_body_deserialize() {
        let body: SendToBody =
            decode_body(br#"{"user_login":"bob","message":"hey"}"#).unwrap();
        assert_eq!(body.user_login, "bob");
        assert_eq!(body.message, "hey");
    }

    #[test]
    fn test_missing_field_rejected() {
        let err = decode_body::<ConnectBody>(br#"{"login":"alice"}"#).unwrap_err();
        assert!(matches!(err, AppError::MalformedBody(_)));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err =
            decode_body::<SendBody>(br#"{"message":"hi","extra":true}"#).unwrap_err();
        assert!(matches!(err, AppError::MalformedBody(_)));
    }

    #[test]
    fn test_invalid_json_rejected() {
        let err = decode_body::<SendBody>(b"not json").unwrap_err();
        assert!(matches!(err, AppError::MalformedBody(_)));
    }
}
