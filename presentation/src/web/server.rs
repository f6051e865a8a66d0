//! axum server for the browser front end
//!
//! `GET /` serves the chat page, `GET /ws` upgrades to a WebSocket that is
//! bound to its own chat session for the lifetime of the connection.

use super::protocol::{ClientFrame, ServerFrame};
use axum::{
    Router,
    extract::{
        State,
        ws::{Message as WsMessage, WebSocket, WebSocketUpgrade},
    },
    response::{Html, IntoResponse},
    routing::get,
};
use futures::{Sink, SinkExt, Stream, StreamExt};
use mcpbot_application::{InboundEvent, OutboundEvent, SessionHandle, SessionRegistry};
use mcpbot_domain::Role;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const CHAT_PAGE: &str = include_str!("../../assets/chat.html");

#[derive(Clone)]
pub struct WebState {
    registry: Arc<SessionRegistry>,
}

impl WebState {
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self { registry }
    }
}

pub fn router(state: WebState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/ws", get(ws_upgrade))
        .with_state(state)
}

/// Serve until `shutdown` fires, then close every live session.
pub async fn serve(
    listener: TcpListener,
    registry: Arc<SessionRegistry>,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "Web front end listening");
    }
    let app = router(WebState::new(registry.clone()));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    info!(live = registry.len(), "Shutting down sessions");
    registry.close_all();
    Ok(())
}

async fn index() -> Html<&'static str> {
    Html(CHAT_PAGE)
}

async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<WebState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: WebState) {
    let (sender, receiver) = socket.split();
    drive_socket(receiver, sender, &state.registry).await;
}

async fn ws_send<K>(sender: &mut K, frame: &ServerFrame) -> bool
where
    K: Sink<WsMessage> + Unpin,
{
    sender
        .send(WsMessage::Text(frame.to_json().into()))
        .await
        .is_ok()
}

/// Bind one connection to a fresh session and pump frames until it closes.
///
/// Works on any frame stream/sink pair, so the loop can be driven without a
/// real socket.
pub async fn drive_socket<S, K, E>(mut receiver: S, mut sender: K, registry: &SessionRegistry)
where
    S: Stream<Item = Result<WsMessage, E>> + Unpin,
    K: Sink<WsMessage> + Unpin + Send + 'static,
    E: std::fmt::Display,
{
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<OutboundEvent>();
    let local_tx = out_tx.clone();
    let handle = registry.open(out_tx);
    let session = handle.id();

    let writer = tokio::spawn(async move {
        while let Some(event) = out_rx.recv().await {
            if !ws_send(&mut sender, &ServerFrame::from(&event)).await {
                debug!(%session, "Socket closed while writing");
                break;
            }
        }
    });

    loop {
        let event = match receiver.next().await {
            Some(Ok(WsMessage::Text(text))) => {
                match ClientFrame::parse(&text).and_then(ClientFrame::into_inbound) {
                    Ok(event) => event,
                    Err(message) => {
                        warn!(%session, error = %message, "Rejected client frame");
                        let _ = local_tx.send(OutboundEvent::Error(message));
                        continue;
                    }
                }
            }
            Some(Ok(WsMessage::Close(_))) | None => InboundEvent::Disconnect,
            Some(Ok(_)) => continue,
            Some(Err(e)) => {
                debug!(%session, error = %e, "Socket read failed");
                InboundEvent::Disconnect
            }
        };

        let disconnect = event == InboundEvent::Disconnect;
        echo_answer(&handle, &local_tx, &event);
        if handle.send(event).is_err() || disconnect {
            break;
        }
    }

    drop(handle);
    writer.abort();
}

/// Show an answer in the transcript the way the browser shows its own messages.
fn echo_answer(
    handle: &SessionHandle,
    local_tx: &mpsc::UnboundedSender<OutboundEvent>,
    event: &InboundEvent,
) {
    if let InboundEvent::ElicitationAnswer { text, .. } = event
        && handle.has_pending_elicitation()
    {
        let _ = local_tx.send(OutboundEvent::Echo {
            role: Role::User,
            text: text.clone(),
        });
    }
}
