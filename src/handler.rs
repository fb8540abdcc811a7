//! Connection handler
//!
//! Per-connection control flow: read one request, resolve it to an
//! endpoint, dispatch to the ChatServer actor, write one response and
//! close. No pipelining, no persistent connections.
//!
//! Parse and routing failures never reach the actor: a malformed
//! request line, header or body becomes a 400, an unresolvable route a
//! 404, and a body-bearing method without Content-Length a 400, all
//! serialized by the same response path as success. An unreachable
//! actor is the one unexpected failure and maps to 500.

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::error::AppError;
use crate::http::{parse_request, render_response, Request};
use crate::message::{decode_body, ConnectBody, SendBody, SendToBody};
use crate::router::{Endpoint, Router};
use crate::server::{Reply, ServerCommand};
use crate::types::Token;

/// Serve a single request/response exchange on a connection
///
/// Generic over the stream so tests can drive it with in-memory pipes.
pub async fn handle_connection<S>(
    stream: S,
    cmd_tx: mpsc::Sender<ServerCommand>,
    router: Arc<Router>,
) -> Result<(), AppError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (read_half, mut write_half) = tokio::io::split(stream);
    let mut reader = BufReader::new(read_half);

    let reply = match parse_request(&mut reader).await {
        Ok(request) => {
            debug!("{} {}", request.method, request.path);
            dispatch(request, &router, &cmd_tx)
                .await
                .unwrap_or_else(|e| Reply::error(&e))
        }
        Err(e) => {
            debug!("Rejected request: {}", e);
            Reply::error(&e)
        }
    };

    let response = render_response(reply.status, &reply.body);
    debug!("Response: {} {}", reply.status.code(), reply.body);
    write_half.write_all(response.as_bytes()).await?;
    write_half.flush().await?;
    // Dropping the stream closes the connection: one exchange per connection
    Ok(())
}

/// Route a parsed request and run it through the actor
async fn dispatch(
    mut request: Request,
    router: &Router,
    cmd_tx: &mpsc::Sender<ServerCommand>,
) -> Result<Reply, AppError> {
    let (endpoint, mut params) = router.resolve(request.method, &request.path)?;

    // Route resolution comes first: an unknown path stays a 404 even
    // when the body is also missing
    if request.method.has_body() && request.body.is_none() {
        return Err(AppError::MissingBody);
    }

    let token = request
        .token()
        .map(|raw| Token::from_string(raw.to_string()));
    let body = request.body.take().unwrap_or_default();

    let (respond_to, reply_rx) = oneshot::channel();
    let cmd = match endpoint {
        Endpoint::Connect => {
            let body: ConnectBody = decode_body(&body)?;
            ServerCommand::Connect {
                login: body.login,
                secret: body.secret,
                respond_to,
            }
        }
        Endpoint::Send => {
            let body: SendBody = decode_body(&body)?;
            ServerCommand::Send {
                token,
                message: body.message,
                respond_to,
            }
        }
        Endpoint::SendTo => {
            let body: SendToBody = decode_body(&body)?;
            ServerCommand::SendTo {
                token,
                recipient: body.user_login,
                message: body.message,
                respond_to,
            }
        }
        Endpoint::Status => ServerCommand::Status { token, respond_to },
        Endpoint::Messages => {
            let chat_name = params.remove("chat_name").ok_or_else(|| {
                AppError::RouteNotFound(request.method.to_string(), request.path.clone())
            })?;
            ServerCommand::Messages {
                token,
                chat_name,
                respond_to,
            }
        }
    };

    cmd_tx.send(cmd).await.map_err(|_| AppError::ChannelSend)?;
    reply_rx.await.map_err(|_| AppError::ChannelSend)
}
