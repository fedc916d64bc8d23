//! WebSocket transport for calculator hosts.

use std::sync::Arc;

use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::IntoResponse,
};
use calc_core::{Arithmetic, WrappingArithmetic};
use calc_session::Calculator;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::{
    config::HostConfig,
    dispatch::Connection,
    protocol::{Request, Response},
};

/// Responses queued per connection before a running request blocks.
const OUTBOUND_CAPACITY: usize = 64;

/// WebSocket handler state.
pub struct WsState<A = WrappingArithmetic> {
    /// Component instance shared by every connection.
    pub calculator: Arc<Calculator<A>>,
    /// Batch limit applied to every connection.
    pub max_batch: u32,
}

impl<A> Clone for WsState<A> {
    fn clone(&self) -> Self {
        Self {
            calculator: Arc::clone(&self.calculator),
            max_batch: self.max_batch,
        }
    }
}

impl<A> WsState<A> {
    /// Create new WebSocket state.
    #[must_use]
    pub fn new(calculator: Arc<Calculator<A>>, max_batch: u32) -> Self {
        Self {
            calculator,
            max_batch,
        }
    }
}

/// Emit callback for blocking dispatch.
///
/// Waits while the outbound queue is full and reports `false` once the
/// sending half of the socket is gone, which cancels a running generator.
fn blocking_emit(tx: &mpsc::Sender<Response>) -> impl FnMut(Response) -> bool + '_ {
    |response| tx.blocking_send(response).is_ok()
}

/// WebSocket upgrade handler.
///
/// Use this as an Axum route handler.
pub async fn ws_handler<A>(
    ws: WebSocketUpgrade,
    State(state): State<WsState<A>>,
) -> impl IntoResponse
where
    A: Arithmetic + 'static,
{
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket<A>(socket: WebSocket, state: WsState<A>)
where
    A: Arithmetic + 'static,
{
    let (mut sender, mut receiver) = socket.split();
    let connection = Arc::new(Connection::with_max_batch(
        state.calculator,
        state.max_batch,
    ));

    // Bounded so a fast generator waits for a slow client
    let (tx, mut rx) = mpsc::channel::<Response>(OUTBOUND_CAPACITY);

    // Spawn task to forward messages to WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let json = match msg.encode() {
                Ok(j) => j,
                Err(e) => {
                    tracing::error!("Failed to serialize message: {e}");
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    // Handle incoming messages
    while let Some(msg) = receiver.next().await {
        let msg = match msg {
            Ok(Message::Text(text)) => text.as_str().to_owned(),
            Ok(Message::Binary(data)) => match String::from_utf8(data.to_vec()) {
                Ok(s) => s,
                Err(_) => continue,
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                tracing::error!("WebSocket error: {e}");
                break;
            }
        };

        let request = match Request::decode(&msg) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Invalid client message: {e}");
                let invalid = Response::invalid_request(format!("Invalid message: {e}"));
                if tx.send(invalid).await.is_err() {
                    break;
                }
                continue;
            }
        };

        // Generators can run long; keep them off the async workers.
        let conn = Arc::clone(&connection);
        let tx = tx.clone();
        let dispatched =
            tokio::task::spawn_blocking(move || conn.handle(request, blocking_emit(&tx))).await;
        if let Err(e) = dispatched {
            tracing::error!("Dispatch task failed: {e}");
            break;
        }
    }

    send_task.abort();
    let released = connection.close();
    tracing::info!(released, "WebSocket disconnected");
}

/// Create WebSocket router.
///
/// # Example
/// ```ignore
/// let app = Router::new()
///     .merge(create_ws_router(Arc::new(Calculator::default()), &HostConfig::default()));
/// ```
#[must_use]
pub fn create_ws_router<A>(calculator: Arc<Calculator<A>>, config: &HostConfig) -> axum::Router
where
    A: Arithmetic + 'static,
{
    axum::Router::new()
        .route("/ws", axum::routing::get(ws_handler::<A>))
        .with_state(WsState::new(calculator, config.max_batch))
}
