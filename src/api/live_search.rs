use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;

use crate::services::SearchSession;

use super::AppState;

/// Frames accepted from the client
#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// The search box now holds `query`
    Input { query: String },
    /// Fetch the next page of the current query
    LoadMore,
}

/// Upgrades to a WebSocket running one debounced search session
///
/// Every session state change is pushed to the client as JSON. The session
/// is torn down with the socket.
pub async fn live_search(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| run_session(socket, state))
}

async fn run_session(socket: WebSocket, state: AppState) {
    let session = SearchSession::new(state.provider.clone(), state.search_settle_delay);
    let mut updates = session.subscribe();
    let (mut sender, mut receiver) = socket.split();

    tracing::info!("Live search session opened");

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                let json = match serde_json::to_string(&snapshot) {
                    Ok(json) => json,
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to encode search state");
                        continue;
                    }
                };
                if sender.send(Message::Text(json)).await.is_err() {
                    break;
                }
            }
            message = receiver.next() => match message {
                Some(Ok(Message::Text(text))) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage::Input { query }) => session.input(&query),
                    Ok(ClientMessage::LoadMore) => {
                        if !session.load_more() {
                            tracing::debug!("Load more ignored");
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "Invalid live search message"),
                },
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!(error = %e, "Live search socket error");
                    break;
                }
            },
        }
    }

    session.close();
    tracing::info!("Live search session closed");
}
