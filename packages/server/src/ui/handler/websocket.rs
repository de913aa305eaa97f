//! WebSocket connection handlers.

use std::{fmt::Display, future::Future, sync::Arc};

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, Stream, StreamExt},
};
use tokio::sync::mpsc;

use crate::{
    domain::ConnectionId,
    ui::{
        router::{MessageRouter, RouterState},
        state::AppState,
    },
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Receives frames from the rx channel and pushes them to the WebSocket sender.
///
/// Replies and room broadcasts both arrive through `rx`, so this is the only
/// writer of the socket.
///
/// # Arguments
///
/// * `rx` - Channel receiver fed by the MessagePusher
/// * `sender` - WebSocket sink to send frames to this client
async fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
) {
    while let Some(msg) = rx.recv().await {
        if let Err(e) = sender.send(Message::Text(msg.into())).await {
            tracing::warn!("Failed to write to socket: {}", e);
            break;
        }
    }
    // Either the pusher dropped the channel or the socket is gone
    let _ = sender.close().await;
}

/// Reads frames from the client and routes them until close or read error.
async fn read_loop<S, E>(mut receiver: S, mut router: MessageRouter)
where
    S: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    while let Some(msg) = receiver.next().await {
        let msg = match msg {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!("WebSocket error on '{}': {}", router.connection_id(), e);
                router.close();
                break;
            }
        };

        if router.handle_message(msg).await == RouterState::Closed {
            break;
        }
    }
}

/// Runs the read and write halves of one connection and tears it down
/// once either of them ends.
///
/// Teardown runs whether a half returned normally, failed, or panicked.
async fn supervise<R, W>(state: &AppState, id: ConnectionId, read: R, write: W)
where
    R: Future<Output = ()> + Send + 'static,
    W: Future<Output = ()> + Send + 'static,
{
    let mut recv_task = tokio::spawn(read);
    let mut send_task = tokio::spawn(write);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        result = &mut recv_task => {
            if let Err(e) = result {
                tracing::error!("Read task for '{}' failed: {}", id, e);
            }
            send_task.abort();
        }
        result = &mut send_task => {
            if let Err(e) = result {
                tracing::error!("Write task for '{}' failed: {}", id, e);
            }
            recv_task.abort();
        }
    };

    state.disconnect_participant_usecase.execute(&id).await;
    tracing::info!("Connection '{}' closed", id);
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let id = ConnectionId::generate();

    // Create a channel for this connection to receive frames
    let (tx, rx) = mpsc::unbounded_channel();

    if let Err(e) = state.connect_participant_usecase.execute(id, tx).await {
        tracing::error!("Failed to register connection '{}': {}", id, e);
        return;
    }
    tracing::info!("Connection '{}' established", id);

    let (sender, receiver) = socket.split();
    let router = MessageRouter::new(id, state.clone());

    supervise(
        &state,
        id,
        read_loop(receiver, router),
        pusher_loop(rx, sender),
    )
    .await;
}
