use crate::traits::{
    Frame, LiveboardError, Result, Transport, TransportEvent, TransportSink, TransportStream,
};
use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// WebSocket transport backed by tokio-tungstenite
///
/// This is the production implementation of the transport boundary. Ping
/// and pong frames are handled by the protocol layer and never surface
/// as events.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsTransport;

#[async_trait]
impl Transport for WsTransport {
    type Sink = WsSink;
    type Stream = WsEvents;

    async fn connect(&self, endpoint: &str) -> Result<(WsSink, WsEvents)> {
        let (stream, _) = connect_async(endpoint)
            .await
            .map_err(|e| LiveboardError::TransportConstruction(e.to_string()))?;
        let (write, read) = stream.split();
        Ok((WsSink { write }, WsEvents { read }))
    }
}

/// Write half of a WebSocket session
pub struct WsSink {
    write: SplitSink<WsStream, Message>,
}

#[async_trait]
impl TransportSink for WsSink {
    async fn send(&mut self, frame: Frame) -> Result<()> {
        self.write
            .send(frame_to_tungstenite(frame))
            .await
            .map_err(|e| LiveboardError::Transport(e.to_string()))
    }

    async fn close(&mut self) {
        let _ = self.write.close().await;
    }
}

/// Read half of a WebSocket session
pub struct WsEvents {
    read: SplitStream<WsStream>,
}

#[async_trait]
impl TransportStream for WsEvents {
    async fn next_event(&mut self) -> TransportEvent {
        loop {
            match self.read.next().await {
                Some(Ok(msg)) => {
                    if let Some(frame) = tungstenite_to_frame(msg) {
                        return TransportEvent::Frame(frame);
                    }
                    // control frame, keep reading
                }
                Some(Err(e)) => return TransportEvent::Error(e.to_string()),
                None => return TransportEvent::Closed("stream ended".into()),
            }
        }
    }
}

fn frame_to_tungstenite(frame: Frame) -> Message {
    match frame {
        Frame::Text(text) => Message::Text(text),
        Frame::Binary(data) => Message::Binary(data),
    }
}

fn tungstenite_to_frame(msg: Message) -> Option<Frame> {
    match msg {
        Message::Text(text) => Some(Frame::Text(text)),
        Message::Binary(data) => Some(Frame::Binary(data)),
        Message::Ping(_) | Message::Pong(_) | Message::Close(_) | Message::Frame(_) => None,
    }
}
