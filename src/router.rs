//! Route table
//!
//! Maps `(method, path)` to an endpoint plus extracted path parameters.
//! The table is typed and built once at startup: each route carries its
//! method, a lookup key and an optional compiled pattern for paths with
//! a variable segment.
//!
//! Lookup is keyed on the path segment immediately preceding the
//! trailing one, which is what lets `/chats/{chat_name}/messages/`
//! resolve without the variable segment participating in the key.

use std::collections::HashMap;

use regex::Regex;

use crate::error::AppError;
use crate::http::Method;

/// Endpoints served by the chat server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Connect,
    Send,
    SendTo,
    Status,
    Messages,
}

/// Pattern for routes with a variable path segment
#[derive(Debug)]
struct RoutePattern {
    regex: Regex,
    /// Parameter names bound to capture groups, in declaration order
    params: &'static [&'static str],
}

#[derive(Debug)]
struct Route {
    method: Method,
    /// Second-to-last path segment this route answers to
    key: &'static str,
    pattern: Option<RoutePattern>,
    endpoint: Endpoint,
}

/// The server's route table
#[derive(Debug)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Build the route table, compiling parameter patterns
    pub fn new() -> Self {
        let routes = vec![
            Route {
                method: Method::Post,
                key: "connect",
                pattern: None,
                endpoint: Endpoint::Connect,
            },
            Route {
                method: Method::Post,
                key: "send",
                pattern: None,
                endpoint: Endpoint::Send,
            },
            Route {
                method: Method::Post,
                key: "send_to",
                pattern: None,
                endpoint: Endpoint::SendTo,
            },
            Route {
                method: Method::Get,
                key: "status",
                pattern: None,
                endpoint: Endpoint::Status,
            },
            Route {
                method: Method::Get,
                key: "messages",
                pattern: Some(RoutePattern {
                    regex: Regex::new(r"^/chats/([^/]+)/messages/$")
                        .expect("route pattern must compile"),
                    params: &["chat_name"],
                }),
                endpoint: Endpoint::Messages,
            },
        ];
        Self { routes }
    }

    /// Resolve a request to an endpoint and its path parameters
    ///
    /// A pattern mismatch on a parameterized route is `RouteNotFound`,
    /// not a bad request: the path simply names nothing we serve.
    pub fn resolve(
        &self,
        method: Method,
        path: &str,
    ) -> Result<(Endpoint, HashMap<String, String>), AppError> {
        let not_found = || AppError::RouteNotFound(method.to_string(), path.to_string());

        let segments: Vec<&str> = path.split('/').collect();
        if segments.len() < 2 {
            return Err(not_found());
        }
        let key = segments[segments.len() - 2];

        let route = self
            .routes
            .iter()
            .find(|r| r.method == method && r.key == key)
            .ok_or_else(not_found)?;

        let mut params = HashMap::new();
        if let Some(pattern) = &route.pattern {
            let captures = pattern.regex.captures(path).ok_or_else(not_found)?;
            for (i, name) in pattern.params.iter().enumerate() {
                if let Some(value) = captures.get(i + 1) {
                    params.insert(name.to_string(), value.as_str().to_string());
                }
            }
        }

        Ok((route.endpoint, params))
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
