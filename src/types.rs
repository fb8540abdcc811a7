//! Basic type definitions for the chat server
//!
//! Provides newtype wrappers for type safety:
//! - `Token`: credential-derived opaque session token
//! - `MessageId`: UUID-based unique message identifier

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Opaque session token (newtype pattern)
///
/// A token is the hex-encoded SHA-256 of `login` concatenated with
/// `secret`. Equal credentials always derive the same token, which is
/// what makes registration idempotent: the token doubles as the session
/// key, so there is no separate expiring-session concept.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token(pub String);

impl Token {
    /// Derive the token for a credential pair
    pub fn derive(login: &str, secret: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(login.as_bytes());
        hasher.update(secret.as_bytes());
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Wrap a raw token string received on the wire
    pub fn from_string(token: String) -> Self {
        Self(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique message identifier (newtype pattern)
///
/// Wraps a UUID v4. Implements Hash and Eq so it can serve as a read
/// cursor value compared against stored messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(pub Uuid);

impl MessageId {
    /// Create a new random message ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_deterministic() {
        let t1 = Token::derive("alice", "p1");
        let t2 = Token::derive("alice", "p1");
        assert_eq!(t1, t2);
    }

    #[test]
    fn test_token_differs_per_credentials() {
        let t1 = Token::derive("alice", "p1");
        let t2 = Token::derive("alice", "p2");
        let t3 = Token::derive("bob", "p1");
        assert_ne!(t1, t2);
        assert_ne!(t1, t3);
    }

    #[test]
    fn test_token_is_hex_sha256() {
        let token = Token::derive("alice", "p1");
        assert_eq!(token.as_str().len(), 64);
        assert!(token.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_message_id_unique() {
        let id1 = MessageId::new();
        let id2 = MessageId::new();
        assert_ne!(id1, id2);
    }
}
