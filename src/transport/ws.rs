//! WebSocket transport over tokio-tungstenite.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use tracing::{debug, info};
use url::Url;

use super::{Connector, Inbound, TransportError, WireSink, WireSource};
use crate::config::CarConfig;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Connects to the car's WebSocket endpoint described by [`CarConfig`].
pub struct WsConnector {
    url: Url,
    connect_timeout: Duration,
    read_timeout: Duration,
}

impl WsConnector {
    pub fn new(config: &CarConfig) -> Result<Self, TransportError> {
        Ok(Self {
            url: Url::parse(&config.ws_url())?,
            connect_timeout: config.connect_timeout(),
            read_timeout: config.read_timeout(),
        })
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(
        &self,
    ) -> Result<(Box<dyn WireSink>, Box<dyn WireSource>), TransportError> {
        let attempt = connect_async(self.url.as_str());
        let (stream, _) = tokio::time::timeout(self.connect_timeout, attempt)
            .await
            .map_err(|_| TransportError::ConnectTimeout(self.connect_timeout))?
            .map_err(TransportError::Connect)?;
        info!("WebSocket connected to {}", &self.url);

        let (sink, source) = stream.split();
        Ok((
            Box::new(WsSink { sink }),
            Box::new(WsSource {
                stream: source,
                read_timeout: self.read_timeout,
            }),
        ))
    }
}

struct WsSink {
    sink: SplitSink<WsStream, Message>,
}

#[async_trait]
impl WireSink for WsSink {
    async fn send(&mut self, frame: String) -> Result<(), TransportError> {
        self.sink
            .send(Message::Text(frame.into()))
            .await
            .map_err(TransportError::Send)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.sink.close().await.map_err(TransportError::Close)
    }
}

struct WsSource {
    stream: SplitStream<WsStream>,
    read_timeout: Duration,
}

#[async_trait]
impl WireSource for WsSource {
    async fn receive(&mut self) -> Inbound {
        match tokio::time::timeout(self.read_timeout, self.stream.next()).await {
            Err(_) => Inbound::Idle,
            Ok(Some(Ok(Message::Text(text)))) => Inbound::Text(text.to_string()),
            Ok(Some(Ok(Message::Binary(bytes)))) => {
                Inbound::Text(String::from_utf8_lossy(&bytes).into_owned())
            }
            Ok(Some(Ok(Message::Close(_)))) | Ok(None) => Inbound::Closed,
            // Ping/pong and raw frames carry nothing for the operator.
            Ok(Some(Ok(_))) => Inbound::Idle,
            Ok(Some(Err(e))) => {
                debug!("WebSocket read error: {}", e);
                Inbound::Closed
            }
        }
    }
}
