//! Session handling
//!
//! Derives and validates opaque session tokens. A session is a mapping
//! from token to login; since the token is a pure function of the
//! credentials, reconnecting with the same credentials resumes the same
//! session.

use std::collections::HashMap;

use crate::store::ChatStore;
use crate::types::Token;

/// Token-to-login session map
#[derive(Debug, Default)]
pub struct AuthManager {
    sessions: HashMap<Token, String>,
}

impl AuthManager {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }

    /// Register a new user or resume an existing session
    ///
    /// Idempotent: the first call for a credential pair creates the
    /// user and their main-chat membership, every later call returns
    /// the same token without touching the store.
    pub fn register_or_resume(
        &mut self,
        store: &mut ChatStore,
        login: &str,
        secret: &str,
    ) -> Token {
        let token = Token::derive(login, secret);
        if !self.sessions.contains_key(&token) {
            store.register_user(login, secret);
            self.sessions.insert(token.clone(), login.to_string());
        }
        token
    }

    /// Look up the login bound to a token
    ///
    /// Absence is not an error at this layer; callers typically map it
    /// to an unauthorized response.
    pub fn resolve(&self, token: &Token) -> Option<&str> {
        self.sessions.get(token).map(String::as_str)
    }
}
