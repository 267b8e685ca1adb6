//! WebSocket connection plumbing and the per-client receive loop.
//!
//! Each upgraded socket is split in two. A writer task owns the sink and
//! drains an unbounded channel fed by [`WsConnectionHandle`], which the
//! client's session owns. The read half becomes a [`WsMessageSource`]
//! driven by [`run_session`] until the client goes away or the handle is
//! closed.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, watch};

use super::messages::{ConnectRequest, decode_payload};
use crate::domain::{ConnectionHandle, MessageSource, OutboundMessage, Payload};
use crate::error::TransportError;
use crate::service::{ChatService, Registration};

/// Instruction for the writer task.
#[derive(Debug)]
enum WriterCommand {
    Text(String),
    Close,
}

/// Outbound half of a WebSocket client.
///
/// Sends are queued and never block. Closing queues a close frame and
/// signals the paired [`WsMessageSource`] so the receive loop ends even if
/// the remote side never answers the close.
#[derive(Debug)]
pub struct WsConnectionHandle {
    tx: mpsc::UnboundedSender<WriterCommand>,
    closed: watch::Sender<bool>,
}

impl ConnectionHandle for WsConnectionHandle {
    fn send(&self, message: &OutboundMessage) -> Result<(), TransportError> {
        if *self.closed.borrow() {
            return Err(TransportError::Closed);
        }
        let json =
            serde_json::to_string(message).map_err(|e| TransportError::Send(e.to_string()))?;
        self.tx
            .send(WriterCommand::Text(json))
            .map_err(|_| TransportError::Closed)
    }

    fn close(&self) {
        if self.closed.send_replace(true) {
            return;
        }
        let _ = self.tx.send(WriterCommand::Close);
    }
}

/// Inbound half of a WebSocket client.
#[derive(Debug)]
pub struct WsMessageSource {
    stream: SplitStream<WebSocket>,
    closed: watch::Receiver<bool>,
}

impl MessageSource for WsMessageSource {
    async fn next_message(&mut self) -> Result<Payload, TransportError> {
        let closed = &mut self.closed;
        let stream = &mut self.stream;
        loop {
            tokio::select! {
                () = wait_closed(closed) => {
                    return Err(TransportError::Closed);
                }
                frame = stream.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => return decode_payload(text.as_str()),
                        Some(Ok(Message::Close(_))) | None => return Err(TransportError::Closed),
                        Some(Ok(_)) => {}
                        Some(Err(e)) => return Err(TransportError::Receive(e.to_string())),
                    }
                }
            }
        }
    }
}

/// Resolves once the handle is closed or dropped with its session.
async fn wait_closed(closed: &mut watch::Receiver<bool>) {
    let _ = closed.wait_for(|closed| *closed).await;
}

/// Splits `socket` into a connection handle, a message source and a
/// running writer task.
fn split_socket(
    socket: WebSocket,
) -> (
    WsConnectionHandle,
    WsMessageSource,
    tokio::task::JoinHandle<()>,
) {
    let (sink, stream) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel();
    let (closed_tx, closed_rx) = watch::channel(false);

    let writer = tokio::spawn(write_loop(sink, rx));
    (
        WsConnectionHandle {
            tx,
            closed: closed_tx,
        },
        WsMessageSource {
            stream,
            closed: closed_rx,
        },
        writer,
    )
}

async fn write_loop(
    mut sink: SplitSink<WebSocket, Message>,
    mut rx: mpsc::UnboundedReceiver<WriterCommand>,
) {
    while let Some(command) = rx.recv().await {
        match command {
            WriterCommand::Text(json) => {
                if let Err(error) = sink.send(Message::text(json)).await {
                    tracing::debug!(%error, "ws write failed");
                    break;
                }
            }
            WriterCommand::Close => {
                let _ = sink.send(Message::Close(None)).await;
                break;
            }
        }
    }
    let _ = sink.close().await;
}

/// Runs one upgraded WebSocket from registration to teardown.
pub async fn run_connection(socket: WebSocket, service: Arc<ChatService>, request: ConnectRequest) {
    let (handle, source, writer) = split_socket(socket);

    let registration = service
        .connect(request.client_id, Box::new(handle), request.interests)
        .await;
    run_session(&service, &registration, source).await;

    // The writer stops once teardown closed or dropped the handle.
    if let Err(error) = writer.await {
        tracing::warn!(client_id = %registration.id, %error, "ws writer task failed");
    }
    tracing::debug!(client_id = %registration.id, "ws connection closed");
}

/// Receive loop: relays every inbound payload to the partner until the
/// source fails, then tears the session down.
///
/// Any [`TransportError`] counts as a disconnect; nothing is retried.
pub async fn run_session<S: MessageSource>(
    service: &ChatService,
    registration: &Registration,
    mut source: S,
) {
    loop {
        match source.next_message().await {
            Ok(payload) => {
                service
                    .relay(&registration.id, registration.token, payload)
                    .await;
            }
            Err(error) => {
                tracing::debug!(client_id = %registration.id, %error, "receive loop ended");
                break;
            }
        }
    }
    service.disconnect(&registration.id, registration.token).await;
}
