//! Collaboration subsystem: per-document WebSocket relay.
//!
//! # Data Flow
//! ```text
//! GET /collaboration/{document} (upgrade)
//!     → join room (broadcast channel per document)
//!     → peer text frames → room → every other peer on the document
//!     → last peer leaves → room dropped
//! ```
//!
//! # Design Decisions
//! - Rooms live in a DashMap; join and leave happen under the shard lock
//! - A slow peer skips messages instead of stalling the room

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, Utf8Bytes, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::Response,
    routing::get,
    Router,
};
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast::{self, error::RecvError};

use crate::config::CollaborationConfig;
use crate::http::response::not_found;
use crate::http::server::ServerHandle;
use crate::observability::metrics;
use crate::services::{MountError, ServiceId, Subsystem};

pub const COLLABORATION_PREFIX: &str = "/collaboration";

static PEER_IDS: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone)]
struct Relay {
    from: u64,
    text: Utf8Bytes,
}

#[derive(Debug, Clone)]
struct Rooms {
    documents: Arc<DashMap<String, broadcast::Sender<Relay>>>,
    capacity: usize,
    max_message_bytes: usize,
}

impl Rooms {
    fn new(config: &CollaborationConfig) -> Self {
        Self {
            documents: Arc::new(DashMap::new()),
            capacity: config.channel_capacity,
            max_message_bytes: config.max_message_bytes,
        }
    }

    fn join(&self, document: &str) -> (broadcast::Sender<Relay>, broadcast::Receiver<Relay>) {
        let room = self
            .documents
            .entry(document.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0);
        let rx = room.subscribe();
        (room.clone(), rx)
    }

    /// Drop the room once nobody is subscribed. Call after dropping the receiver.
    fn leave(&self, document: &str) {
        self.documents
            .remove_if(document, |_, tx| tx.receiver_count() == 0);
    }

    fn len(&self) -> usize {
        self.documents.len()
    }
}

#[derive(Debug)]
pub struct CollaborationService {
    config: CollaborationConfig,
}

impl CollaborationService {
    pub fn new(config: CollaborationConfig) -> Self {
        Self { config }
    }
}

impl Subsystem for CollaborationService {
    fn id(&self) -> ServiceId {
        ServiceId::Collaboration
    }

    fn path_prefix(&self) -> Option<&'static str> {
        Some(COLLABORATION_PREFIX)
    }

    fn mount(&self, handle: &mut ServerHandle) -> Result<(), MountError> {
        let router = Router::new()
            .route("/{document}", get(connect))
            .fallback(not_found)
            .with_state(Rooms::new(&self.config));
        handle.nest(COLLABORATION_PREFIX, router)
    }
}

async fn connect(
    ws: WebSocketUpgrade,
    Path(document): Path<String>,
    State(rooms): State<Rooms>,
) -> Response {
    ws.max_message_size(rooms.max_message_bytes)
        .on_upgrade(move |socket| peer(socket, document, rooms))
}

async fn peer(socket: WebSocket, document: String, rooms: Rooms) {
    let id = PEER_IDS.fetch_add(1, Ordering::Relaxed);
    let (tx, mut rx) = rooms.join(&document);
    let (mut sink, mut stream) = socket.split();

    metrics::record_collaboration_connections(1.0);
    tracing::debug!(document = %document, peer = id, "Peer joined");

    loop {
        tokio::select! {
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    // At least our own receiver is subscribed, so send cannot fail.
                    let _ = tx.send(Relay { from: id, text });
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!(document = %document, peer = id, error = %e, "Peer socket error");
                    break;
                }
            },
            relayed = rx.recv() => match relayed {
                Ok(relay) if relay.from == id => {}
                Ok(relay) => {
                    if sink.send(Message::Text(relay.text)).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(document = %document, peer = id, skipped, "Peer lagging, messages dropped");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    drop(rx);
    rooms.leave(&document);
    metrics::record_collaboration_connections(-1.0);
    tracing::debug!(document = %document, peer = id, rooms = rooms.len(), "Peer left");
}
