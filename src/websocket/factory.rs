use super::{Socket, Transport, TransportEvent};
use crate::client::{ConnectorEvent, Generation};
use crate::types::{ChannelError, Result, WS_CLOSE_NORMAL};
use futures::sink::SinkExt;
use futures::stream::StreamExt;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use url::Url;

/// Transport that opens tokio-tungstenite connections, one task per socket
pub struct WebSocketTransport {
    events: mpsc::UnboundedSender<ConnectorEvent>,
    close_timeout: Duration,
}

impl WebSocketTransport {
    pub fn new(events: mpsc::UnboundedSender<ConnectorEvent>, close_timeout: Duration) -> Self {
        Self {
            events,
            close_timeout,
        }
    }
}

impl Transport for WebSocketTransport {
    type Socket = WebSocketSocket;

    fn connect(&mut self, url: &Url, generation: Generation) -> Self::Socket {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let task = SocketTask {
            url: url.to_string(),
            generation,
            events: self.events.clone(),
            close_timeout: self.close_timeout,
        };
        tokio::spawn(task.run(outbound_rx));

        WebSocketSocket {
            outbound: outbound_tx,
        }
    }
}

/// Write side of a socket task
pub struct WebSocketSocket {
    outbound: mpsc::UnboundedSender<Message>,
}

impl Socket for WebSocketSocket {
    fn send_text(&mut self, text: String) -> Result<()> {
        self.outbound
            .send(Message::Text(text.into()))
            .map_err(|_| ChannelError::Transport("socket task has already exited".to_string()))
    }

    fn close(&mut self) {
        if self.outbound.send(normal_close()).is_err() {
            tracing::debug!("Socket task already exited, nothing to close");
        }
    }
}

fn normal_close() -> Message {
    Message::Close(Some(CloseFrame {
        code: CloseCode::Normal,
        reason: "".into(),
    }))
}

struct SocketTask {
    url: String,
    generation: Generation,
    events: mpsc::UnboundedSender<ConnectorEvent>,
    close_timeout: Duration,
}

impl SocketTask {
    fn emit(&self, event: TransportEvent) {
        let generation = self.generation;
        if self
            .events
            .send(ConnectorEvent::Transport { generation, event })
            .is_err()
        {
            tracing::debug!(generation, "Connector dropped, discarding transport event");
        }
    }

    fn emit_closed(&self, clean: bool, code: Option<u16>, reason: String) {
        self.emit(TransportEvent::Closed {
            clean,
            code,
            reason,
        });
    }

    async fn run(self, mut outbound: mpsc::UnboundedReceiver<Message>) {
        tracing::debug!(generation = self.generation, "Opening WebSocket to {}", self.url);

        let ws_stream = match connect_async(self.url.as_str()).await {
            Ok((ws_stream, _response)) => ws_stream,
            Err(e) => {
                tracing::error!("WebSocket handshake with {} failed: {}", self.url, e);
                self.emit(TransportEvent::Error(e.to_string()));
                self.emit_closed(false, None, String::new());
                return;
            }
        };
        self.emit(TransportEvent::Opened);

        let (mut write_half, mut read_half) = ws_stream.split();
        let mut close_deadline: Option<Instant> = None;
        let mut outbound_open = true;

        let (clean, code, reason) = loop {
            let deadline = close_deadline;
            let close_timer = async move {
                match deadline {
                    Some(at) => sleep_until(at).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                frame = read_half.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        tracing::debug!("Received text frame: {}", text.as_str());
                        self.emit(TransportEvent::Frame(text.as_str().to_owned()));
                    }
                    Some(Ok(Message::Close(frame))) => {
                        // Flush the close reply tungstenite queued for us
                        if let Err(e) = write_half.flush().await {
                            tracing::debug!("Could not flush close reply: {}", e);
                        }
                        break match frame {
                            Some(frame) => {
                                let code = u16::from(frame.code);
                                tracing::info!(
                                    "Server closed connection: code={}, reason='{}'",
                                    code,
                                    frame.reason.as_str()
                                );
                                (code == WS_CLOSE_NORMAL, Some(code), frame.reason.as_str().to_owned())
                            }
                            None => {
                                tracing::warn!("Server closed connection without close frame");
                                (false, None, String::new())
                            }
                        };
                    }
                    Some(Ok(Message::Binary(data))) => {
                        tracing::warn!("Received unexpected binary message ({} bytes)", data.len());
                    }
                    Some(Ok(Message::Ping(data))) => {
                        tracing::debug!("Received ping ({} bytes)", data.len());
                    }
                    Some(Ok(Message::Pong(data))) => {
                        tracing::debug!("Received pong ({} bytes)", data.len());
                    }
                    Some(Ok(Message::Frame(_))) => {
                        tracing::debug!("Received raw frame (internal)");
                    }
                    Some(Err(e)) => {
                        tracing::error!("WebSocket read error: {}", e);
                        self.emit(TransportEvent::Error(e.to_string()));
                        break (false, None, String::new());
                    }
                    None => {
                        tracing::warn!("WebSocket stream ended without close handshake");
                        break (false, None, String::new());
                    }
                },
                message = outbound.recv(), if outbound_open => {
                    let message = match message {
                        Some(message) => message,
                        None => {
                            // Connector released the socket without closing it
                            outbound_open = false;
                            if close_deadline.is_some() {
                                continue;
                            }
                            normal_close()
                        }
                    };
                    let is_close = matches!(message, Message::Close(_));
                    if let Err(e) = write_half.send(message).await {
                        tracing::error!("WebSocket write error: {}", e);
                        self.emit(TransportEvent::Error(e.to_string()));
                        break (false, None, String::new());
                    }
                    if is_close && close_deadline.is_none() {
                        close_deadline = Some(Instant::now() + self.close_timeout);
                    }
                },
                _ = close_timer => {
                    tracing::warn!(
                        "Close handshake timed out after {:?}",
                        self.close_timeout
                    );
                    break (false, None, String::new());
                }
            }
        };

        self.emit_closed(clean, code, reason);
        tracing::debug!(generation = self.generation, "Socket task finished");
    }
}
