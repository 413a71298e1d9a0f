//! WebSocket client for the rpel server

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::errors::{Result, RpelError};
use crate::remote::protocol::{ClientMessage, Command, DbObject, Item, MessageData, Object, ServerMessage};
use crate::remote::{RecordLoader, RecordSubmitter};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Request/response client over a single lazily opened WebSocket.
///
/// Requests are serialized through the connection lock, so replies can be
/// matched by id without a dispatcher task. A transport failure or timeout
/// drops the connection; the next request reconnects.
pub struct WsClient {
    url: String,
    token: String,
    timeout: Duration,
    next_id: AtomicI64,
    socket: Mutex<Option<Socket>>,
}

impl WsClient {
    pub fn new(url: &str, token: &str, timeout: Duration) -> Self {
        Self {
            url: url.to_string(),
            token: token.to_string(),
            timeout,
            next_id: AtomicI64::new(1),
            socket: Mutex::new(None),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.server_url, &config.token, config.request_timeout())
    }

    async fn connect(&self) -> Result<Socket> {
        let (socket, _response) =
            connect_async(self.url.as_str())
                .await
                .map_err(|source| RpelError::Connect {
                    url: self.url.clone(),
                    source,
                })?;
        info!("Connected to rpel server at {}", self.url);
        Ok(socket)
    }

    /// Send one command and wait for the reply carrying the same id
    async fn request(&self, command: Command) -> Result<MessageData> {
        let request_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let label = command.label();
        let text = serde_json::to_string(&ClientMessage {
            id: request_id,
            command,
            addon: self.token.clone(),
        })?;

        let mut guard = self.socket.lock().await;
        debug!(request_id, command = %label, "sending request");
        let outcome =
            tokio::time::timeout(self.timeout, self.exchange_on(&mut guard, request_id, text)).await;

        let reply = match outcome {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                warn!(request_id, command = %label, "request failed: {}", e);
                *guard = None;
                return Err(e);
            }
            Err(_) => {
                warn!(request_id, command = %label, "request timed out");
                *guard = None;
                return Err(RpelError::Timeout {
                    request_id,
                    seconds: self.timeout.as_secs(),
                });
            }
        };

        debug!(request_id, command = %reply.command, "received reply");
        reply.into_result()
    }

    /// Connect if needed, then run one exchange. Both steps share the
    /// request timeout.
    async fn exchange_on(
        &self,
        slot: &mut Option<Socket>,
        request_id: i64,
        text: String,
    ) -> Result<ServerMessage> {
        if slot.is_none() {
            *slot = Some(self.connect().await?);
        }
        let socket = slot.as_mut().ok_or(RpelError::ConnectionClosed)?;
        exchange(socket, request_id, text).await
    }
}

async fn exchange(socket: &mut Socket, request_id: i64, text: String) -> Result<ServerMessage> {
    socket.send(Message::Text(text)).await?;

    while let Some(frame) = socket.next().await {
        match frame? {
            Message::Text(body) => {
                // Frames for other requests may carry payloads this client
                // does not model, so only the id is read before matching.
                let frame: serde_json::Value = serde_json::from_str(&body)?;
                let frame_id = frame.get("id").and_then(serde_json::Value::as_i64);
                if frame_id == Some(request_id) {
                    return Ok(serde_json::from_value(frame)?);
                }
                debug!(request_id, ?frame_id, "skipping frame for another request");
            }
            Message::Close(_) => return Err(RpelError::ConnectionClosed),
            _ => {}
        }
    }

    Err(RpelError::ConnectionClosed)
}

#[async_trait::async_trait]
impl RecordLoader for WsClient {
    async fn fetch_item(&self, item: Item) -> Result<DbObject> {
        self.request(Command::Get(Object::Item(item))).await?.into_object()
    }

    async fn fetch_list(&self, name: String) -> Result<DbObject> {
        self.request(Command::Get(Object::List(name))).await?.into_object()
    }
}

#[async_trait::async_trait]
impl RecordSubmitter for WsClient {
    async fn insert_item(&self, object: DbObject) -> Result<i64> {
        self.request(Command::Insert(object)).await?.into_int()
    }

    async fn update_item(&self, object: DbObject) -> Result<i64> {
        self.request(Command::Update(object)).await?.into_int()
    }

    async fn delete_item(&self, item: Item) -> Result<i64> {
        self.request(Command::Delete(item)).await?.into_int()
    }
}
