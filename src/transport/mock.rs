//! In-memory transport for tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio_tungstenite::tungstenite;

use super::{Connector, Inbound, TransportError, WireSink, WireSource};

/// Everything the fake car observed, shared with the test.
#[derive(Debug, Default)]
pub struct WireLog {
    pub connects: usize,
    pub frames: Vec<String>,
    pub closes: usize,
}

/// In-memory connector for tests.
///
/// Records outbound frames and close calls, and replays scripted inbound
/// messages followed by a peer close.
pub struct MockConnector {
    log: Arc<Mutex<WireLog>>,
    inbound: Mutex<Vec<String>>,
    refuse_connect: bool,
    fail_sends: bool,
}

impl MockConnector {
    pub fn new(inbound: &[&str]) -> (Self, Arc<Mutex<WireLog>>) {
        let log = Arc::new(Mutex::new(WireLog::default()));
        (
            Self {
                log: log.clone(),
                inbound: Mutex::new(inbound.iter().map(|s| s.to_string()).collect()),
                refuse_connect: false,
                fail_sends: false,
            },
            log,
        )
    }

    /// A connector whose connect() always fails.
    pub fn refusing() -> (Self, Arc<Mutex<WireLog>>) {
        let (mut connector, log) = Self::new(&[]);
        connector.refuse_connect = true;
        (connector, log)
    }

    /// A connector that accepts the connection but fails every send.
    pub fn failing_sends() -> (Self, Arc<Mutex<WireLog>>) {
        let (mut connector, log) = Self::new(&[]);
        connector.fail_sends = true;
        (connector, log)
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(
        &self,
    ) -> Result<(Box<dyn WireSink>, Box<dyn WireSource>), TransportError> {
        if self.refuse_connect {
            return Err(TransportError::Connect(
                tungstenite::Error::ConnectionClosed,
            ));
        }
        self.log.lock().unwrap().connects += 1;

        let script = std::mem::take(&mut *self.inbound.lock().unwrap());
        Ok((
            Box::new(MockSink {
                log: self.log.clone(),
                fail_sends: self.fail_sends,
            }),
            Box::new(MockSource { script }),
        ))
    }
}

struct MockSink {
    log: Arc<Mutex<WireLog>>,
    fail_sends: bool,
}

#[async_trait]
impl WireSink for MockSink {
    async fn send(&mut self, frame: String) -> Result<(), TransportError> {
        if self.fail_sends {
            return Err(TransportError::Send(tungstenite::Error::ConnectionClosed));
        }
        self.log.lock().unwrap().frames.push(frame);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.log.lock().unwrap().closes += 1;
        Ok(())
    }
}

struct MockSource {
    script: Vec<String>,
}

#[async_trait]
impl WireSource for MockSource {
    async fn receive(&mut self) -> Inbound {
        if self.script.is_empty() {
            return Inbound::Closed;
        }
        Inbound::Text(self.script.remove(0))
    }
}
