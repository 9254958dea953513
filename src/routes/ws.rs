// WebSocket handler: one live chart + counters per client, redrawn after every refresh.

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use bytes::Bytes;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::time::{Duration, MissedTickBehavior, timeout};

use super::AppState;
use crate::engine::{DisplayRange, RangeName};
use crate::models::{ServerScope, VolumeFrame};
use crate::view::{StatisticsViewState, ViewError};

pub(super) const WS_PING_INTERVAL: Duration = Duration::from_secs(30);
pub(super) const WS_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Decrements the live client count on drop (connect = +1, drop = -1).
struct WsClientGuard(Arc<AtomicUsize>);

impl Drop for WsClientGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Commands a client may send, e.g. `{"type":"range","range":"hour"}`.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ClientCommand {
    Range { range: RangeName },
    Server { server: usize },
    Period { period: String },
    Lock,
    Unlock,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ServerMessage {
    Frame(VolumeFrame),
    Error { error: String },
}

type WsSender = SplitSink<WebSocket, Message>;

pub(super) async fn ws_volumes(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| async move {
        if let Err(e) = stream_volumes(socket, state).await {
            tracing::info!("Volume stream error: {}", e);
        }
    })
}

/// Send one message; false when the client is gone or too slow.
async fn send(sender: &mut WsSender, message: Message) -> bool {
    matches!(timeout(WS_SEND_TIMEOUT, sender.send(message)).await, Ok(Ok(())))
}

async fn send_json(sender: &mut WsSender, message: &ServerMessage) -> anyhow::Result<bool> {
    let json = serde_json::to_string(message)?;
    Ok(send(sender, Message::Text(json.into())).await)
}

/// Render the viewer's current selection. Nothing is sent before the first snapshot.
async fn send_frame(
    sender: &mut WsSender,
    view: &StatisticsViewState,
    state: &AppState,
) -> anyhow::Result<bool> {
    let message = match view.render(&state.pair(), &state.calendar) {
        Ok(frame) => ServerMessage::Frame(frame),
        Err(ViewError::NoSnapshot) => return Ok(true),
        Err(e) => ServerMessage::Error {
            error: e.to_string(),
        },
    };
    send_json(sender, &message).await
}

/// Apply a client command. `Ok(true)` means the display should be redrawn now.
fn apply(view: &mut StatisticsViewState, state: &AppState, command: ClientCommand) -> Result<bool, String> {
    match command {
        ClientCommand::Range { range } => DisplayRange::from_parts(Some(range), None)
            .map(|r| view.choose_range(r))
            .map_err(|e| e.to_string()),
        ClientCommand::Server { server } => view
            .choose_server(&state.pair(), ServerScope::from(server))
            .map_err(|e| e.to_string()),
        ClientCommand::Period { period } => view.choose_period(&period).map_err(|e| e.to_string()),
        ClientCommand::Lock => {
            view.lock();
            Ok(false)
        }
        ClientCommand::Unlock => Ok(view.unlock()),
    }
}

async fn stream_volumes(socket: WebSocket, state: AppState) -> anyhow::Result<()> {
    state.ws_clients.fetch_add(1, Ordering::Relaxed);
    let _guard = WsClientGuard(state.ws_clients.clone());
    tracing::info!("Client connected to volume stream");

    let (mut sender, mut receiver) = socket.split();
    let mut snapshots = state.snapshots.clone();
    snapshots.mark_unchanged();
    let mut view = StatisticsViewState::new(state.years);

    if !send_frame(&mut sender, &view, &state).await? {
        return Ok(());
    }

    let mut ping_interval = tokio::time::interval(WS_PING_INTERVAL);
    ping_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        let redraw = tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                view.request_redraw()
            }
            incoming = receiver.next() => {
                let text = match incoming {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => continue,
                };
                let command = serde_json::from_str::<ClientCommand>(text.as_str())
                    .map_err(|e| format!("invalid command: {e}"))
                    .and_then(|c| apply(&mut view, &state, c));
                match command {
                    Ok(redraw) => redraw,
                    Err(error) => {
                        if !send_json(&mut sender, &ServerMessage::Error { error }).await? {
                            break;
                        }
                        false
                    }
                }
            }
            _ = ping_interval.tick() => {
                if !send(&mut sender, Message::Ping(Bytes::new())).await {
                    break;
                }
                false
            }
        };

        if redraw && !send_frame(&mut sender, &view, &state).await? {
            break;
        }
    }
    Ok(())
}
