//! Interactive Chat Client - Entry Point
//!
//! Thin command-line client for the chat server. Connects once with the
//! given credentials, then reads commands from stdin (`send`, `send_to`,
//! `status`, `messages`, `close`), issuing one raw-TCP request per
//! command and logging the parsed response.

use std::env;

use serde_json::json;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tokio::net::TcpStream;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use wirechat::{AppError, Config};

/// Client for the chat server
///
/// Holds the session token once connected. Network failures on a
/// command are logged and do not end the session; a failed initial
/// connect leaves the session inactive so the command loop never
/// starts.
struct ChatClient {
    addr: String,
    login: String,
    secret: String,
    token: Option<String>,
    is_session_active: bool,
}

impl ChatClient {
    fn new(addr: String, login: String, secret: String) -> Self {
        Self {
            addr,
            login,
            secret,
            token: None,
            is_session_active: false,
        }
    }

    /// Issue one request over a fresh connection and parse the response
    async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<(u16, serde_json::Value), AppError> {
        let mut stream = TcpStream::connect(&self.addr).await?;

        let mut request = format!("{method} {path} HTTP/1.1\r\n");
        if let Some(token) = &self.token {
            request.push_str(&format!("Authorization: {token}\r\n"));
        }
        match body {
            Some(body) => {
                let body = body.to_string();
                request.push_str(&format!("Content-Length: {}\r\n\r\n{body}", body.len()));
            }
            None => request.push_str("\r\n"),
        }
        stream.write_all(request.as_bytes()).await?;

        // The server closes the connection after one response
        let mut response = String::new();
        stream.read_to_string(&mut response).await?;

        let status: u16 = response
            .strip_prefix("HTTP/1.1 ")
            .and_then(|rest| rest.get(..3))
            .and_then(|code| code.parse().ok())
            .ok_or_else(|| {
                AppError::MalformedRequestLine(response.lines().next().unwrap_or("").to_string())
            })?;
        let payload = match response.split_once("\r\n\r\n") {
            Some((_, payload)) => serde_json::from_str(payload)?,
            None => serde_json::Value::Null,
        };
        Ok((status, payload))
    }

    /// Issue a request and log the outcome, swallowing network errors
    async fn call(&self, method: &str, path: &str, body: Option<serde_json::Value>) {
        match self.request(method, path, body).await {
            Ok((status, data)) => info!("Request [{status}]: {data}"),
            Err(e) => error!("{e}"),
        }
    }

    /// Connect to the server and store the session token
    async fn connect(&mut self) {
        info!("Connecting to server...");
        let body = json!({ "login": self.login, "secret": self.secret });
        match self.request("POST", "/connect/", Some(body)).await {
            Ok((status, data)) => {
                info!("Request [{status}]: {data}");
                self.token = data
                    .get("token")
                    .and_then(|t| t.as_str())
                    .map(String::from);
                self.is_session_active = self.token.is_some();
            }
            Err(e) => {
                error!("{e}");
                self.is_session_active = false;
            }
        }
        if self.is_session_active {
            info!("Connected to server");
        }
    }

    async fn send(&self, message: &str) {
        self.call("POST", "/send/", Some(json!({ "message": message })))
            .await;
    }

    async fn send_to(&self, login: &str, message: &str) {
        self.call(
            "POST",
            "/send_to/",
            Some(json!({ "user_login": login, "message": message })),
        )
        .await;
    }

    async fn status(&self) {
        self.call("GET", "/status/", None).await;
    }

    async fn messages(&self, chat_name: &str) {
        self.call("GET", &format!("/chats/{chat_name}/messages/"), None)
            .await;
    }
}

/// Print a prompt and read one line from stdin
async fn prompt(
    lines: &mut Lines<BufReader<Stdin>>,
    label: &str,
) -> std::io::Result<Option<String>> {
    use std::io::Write as _;
    print!("{label}");
    std::io::stdout().flush()?;
    lines.next_line().await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env();
    let login = env::args().nth(1).unwrap_or_else(|| "user_1".to_string());
    let secret = env::args().nth(2).unwrap_or_else(|| "123456".to_string());

    let mut client = ChatClient::new(config.addr(), login, secret);
    client.connect().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    if client.is_session_active {
        info!("Listening for CLI commands... (send, send_to, status, messages, close)");
    }
    while client.is_session_active {
        let Some(command) = prompt(&mut lines, "Enter command: ").await? else {
            break;
        };
        match command.trim() {
            "send" => {
                let Some(message) = prompt(&mut lines, "Enter message: ").await? else {
                    break;
                };
                client.send(message.trim()).await;
            }
            "send_to" => {
                let Some(login) = prompt(&mut lines, "Enter login: ").await? else {
                    break;
                };
                let Some(message) = prompt(&mut lines, "Enter message: ").await? else {
                    break;
                };
                client.send_to(login.trim(), message.trim()).await;
            }
            "status" => client.status().await,
            "messages" => {
                let Some(chat_name) = prompt(&mut lines, "Enter chat's name: ").await? else {
                    break;
                };
                client.messages(chat_name.trim()).await;
            }
            "close" => client.is_session_active = false,
            "" => {}
            other => info!("Unknown command: {other}"),
        }
    }
    info!("Stopped listening for CLI commands...");

    Ok(())
}
