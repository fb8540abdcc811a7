//! Minimal Chat Server Library
//!
//! A small chat service speaking a hand-rolled HTTP/1.1-shaped text
//! protocol directly over TCP - no web framework. Clients register with
//! credentials, post to a shared main chat or to lazily-created
//! pairwise chats, and poll for unseen messages.
//!
//! # Features
//! - One request/response exchange per TCP connection
//! - Hand-rolled request framing and parsing
//! - Typed route table with parameterized paths
//! - Credential-derived session tokens (idempotent registration)
//! - In-memory chat store with per-user read-cursor pagination
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `ChatServer` is the central actor owning the session map and chat
//!   store
//! - Each connection has a handler task that sends it a `ServerCommand`
//!   carrying a `oneshot` reply channel
//! - No locks needed - all state access goes through message passing
//!
//! # Example
//! ```ignore
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//! use tokio::sync::mpsc;
//! use wirechat::{handle_connection, ChatServer, Router};
//!
//! #[tokio::main]
//! async fn main() {
//!     let listener = TcpListener::bind("127.0.0.1:8000").await.unwrap();
//!     let router = Arc::new(Router::new());
//!     let (cmd_tx, cmd_rx) = mpsc::channel(256);
//!
//!     tokio::spawn(ChatServer::new(cmd_rx, "main", 20).run());
//!
//!     while let Ok((stream, _)) = listener.accept().await {
//!         let cmd_tx = cmd_tx.clone();
//!         let router = router.clone();
//!         tokio::spawn(handle_connection(stream, cmd_tx, router));
//!     }
//! }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod message;
pub mod router;
pub mod server;
pub mod store;
pub mod types;

// Re-export main types for convenience
pub use auth::AuthManager;
pub use config::Config;
pub use error::AppError;
pub use handler::handle_connection;
pub use http::{Method, StatusCode};
pub use router::{Endpoint, Router};
pub use server::{ChatServer, Reply, ServerCommand};
pub use store::ChatStore;
pub use types::{MessageId, Token};
