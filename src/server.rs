//! ChatServer actor implementation
//!
//! The central actor owning all mutable state: the session map and the
//! chat store. Connection handlers never touch state directly; they
//! send a `ServerCommand` carrying a oneshot reply channel and await
//! the `Reply`. No locks needed - all state access goes through
//! message passing, one command at a time.

use serde_json::json;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::auth::AuthManager;
use crate::error::AppError;
use crate::http::StatusCode;
use crate::store::ChatStore;
use crate::types::Token;

/// Outcome of a handled command: wire status plus JSON payload
#[derive(Debug)]
pub struct Reply {
    pub status: StatusCode,
    pub body: serde_json::Value,
}

impl Reply {
    fn ok(body: serde_json::Value) -> Self {
        Self {
            status: StatusCode::Ok,
            body,
        }
    }

    pub fn error(err: &AppError) -> Self {
        Self {
            status: err.status(),
            body: err.payload(),
        }
    }
}

/// Commands sent from connection handlers to the ChatServer actor
#[derive(Debug)]
pub enum ServerCommand {
    /// Register a user or resume their session
    Connect {
        login: String,
        secret: String,
        respond_to: oneshot::Sender<Reply>,
    },
    /// Post a message to the main chat
    Send {
        token: Option<Token>,
        message: String,
        respond_to: oneshot::Sender<Reply>,
    },
    /// Post a direct message, creating the pairwise chat if needed
    SendTo {
        token: Option<Token>,
        recipient: String,
        message: String,
        respond_to: oneshot::Sender<Reply>,
    },
    /// List the member logins of every chat the caller belongs to
    Status {
        token: Option<Token>,
        respond_to: oneshot::Sender<Reply>,
    },
    /// Poll a chat for unseen messages
    Messages {
        token: Option<Token>,
        chat_name: String,
        respond_to: oneshot::Sender<Reply>,
    },
}

/// The main ChatServer actor
///
/// Processes commands from connection handlers sequentially, which is
/// the mutual-exclusion discipline for the store and session map.
pub struct ChatServer {
    auth: AuthManager,
    store: ChatStore,
    /// Upper bound on messages returned per poll
    batch_size: usize,
    receiver: mpsc::Receiver<ServerCommand>,
}

impl ChatServer {
    pub fn new(
        receiver: mpsc::Receiver<ServerCommand>,
        main_chat_name: &str,
        batch_size: usize,
    ) -> Self {
        Self {
            auth: AuthManager::new(),
            store: ChatStore::new(main_chat_name),
            batch_size,
            receiver,
        }
    }

    /// Run the ChatServer event loop
    ///
    /// Continuously receives and processes commands until all senders
    /// are dropped.
    pub async fn run(mut self) {
        info!("ChatServer started");

        while let Some(cmd) = self.receiver.recv().await {
            self.handle_command(cmd);
        }

        info!("ChatServer shutting down");
    }

    /// Process a single command and send the reply
    ///
    /// A dropped reply receiver means the connection died while we were
    /// working; that aborts only that exchange.
    fn handle_command(&mut self, cmd: ServerCommand) {
        match cmd {
            ServerCommand::Connect {
                login,
                secret,
                respond_to,
            } => {
                let reply = self.handle_connect(login, secret);
                let _ = respond_to.send(reply);
            }
            ServerCommand::Send {
                token,
                message,
                respond_to,
            } => {
                let reply = self
                    .handle_send(token, message)
                    .unwrap_or_else(|e| Reply::error(&e));
                let _ = respond_to.send(reply);
            }
            ServerCommand::SendTo {
                token,
                recipient,
                message,
                respond_to,
            } => {
                let reply = self
                    .handle_send_to(token, recipient, message)
                    .unwrap_or_else(|e| Reply::error(&e));
                let _ = respond_to.send(reply);
            }
            ServerCommand::Status { token, respond_to } => {
                let reply = self
                    .handle_status(token)
                    .unwrap_or_else(|e| Reply::error(&e));
                let _ = respond_to.send(reply);
            }
            ServerCommand::Messages {
                token,
                chat_name,
                respond_to,
            } => {
                let reply = self
                    .handle_messages(token, chat_name)
                    .unwrap_or_else(|e| Reply::error(&e));
                let _ = respond_to.send(reply);
            }
        }
    }

    /// Resolve an Authorization token to a login
    fn authorize(&self, token: Option<&Token>) -> Result<String, AppError> {
        token
            .and_then(|t| self.auth.resolve(t))
            .map(|login| login.to_string())
            .ok_or(AppError::InvalidToken)
    }

    fn handle_connect(&mut self, login: String, secret: String) -> Reply {
        let token = self
            .auth
            .register_or_resume(&mut self.store, &login, &secret);
        info!("User '{}' connected", login);
        Reply::ok(json!({ "token": token.as_str() }))
    }

    fn handle_send(
        &mut self,
        token: Option<Token>,
        message: String,
    ) -> Result<Reply, AppError> {
        let login = self.authorize(token.as_ref())?;
        self.store.post_to_main(&login, message.clone());
        debug!("User '{}' posted to '{}'", login, self.store.main_chat_name());
        Ok(Reply::ok(json!({ "message": message })))
    }

    fn handle_send_to(
        &mut self,
        token: Option<Token>,
        recipient: String,
        message: String,
    ) -> Result<Reply, AppError> {
        let login = self.authorize(token.as_ref())?;
        self.store
            .post_to_user(&login, &recipient, message.clone())?;
        debug!("User '{}' messaged '{}'", login, recipient);
        Ok(Reply::ok(json!({ "message": message })))
    }

    fn handle_status(&mut self, token: Option<Token>) -> Result<Reply, AppError> {
        let login = self.authorize(token.as_ref())?;
        let mut body = serde_json::Map::new();
        for (chat_name, members) in self.store.status(&login) {
            body.insert(chat_name, json!(members));
        }
        Ok(Reply::ok(serde_json::Value::Object(body)))
    }

    fn handle_messages(
        &mut self,
        token: Option<Token>,
        chat_name: String,
    ) -> Result<Reply, AppError> {
        let login = self.authorize(token.as_ref())?;
        let batch = self.store.messages(&login, &chat_name, self.batch_size)?;
        debug!("User '{}' polled '{}': {} message(s)", login, chat_name, batch.len());
        Ok(Reply::ok(json!({ "messages": batch })))
    }
}
