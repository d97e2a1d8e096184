//! The car controller: one connection, one background listener.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::command::{Action, CommandTable};
use crate::transport::{Connector, Inbound, WireSink, WireSource};

/// Remote control for one car.
///
/// Owns at most one live connection and one background listener at a time.
/// Every fallible operation logs the failure and returns a bool, so a dead
/// socket costs one `false` per command instead of a panic; the operator
/// decides when to give up.
pub struct CarController {
    connector: Box<dyn Connector>,
    table: CommandTable,
    messages: mpsc::Sender<String>,
    link: Option<Link>,
}

/// Live connection state: outbound half plus the listener draining the
/// inbound half.
struct Link {
    sink: Box<dyn WireSink>,
    listener: JoinHandle<()>,
    stop: CancellationToken,
}

impl CarController {
    /// Inbound text from the car is forwarded on `messages`; the console
    /// prints it so the prompt never blocks on robot chatter.
    pub fn new(
        connector: Box<dyn Connector>,
        table: CommandTable,
        messages: mpsc::Sender<String>,
    ) -> Self {
        Self {
            connector,
            table,
            messages,
            link: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.link.is_some()
    }

    /// Open the connection and start the listener. Returns false and stays
    /// disconnected when the transport refuses.
    pub async fn connect(&mut self) -> bool {
        if self.link.is_some() {
            // A second connect would race two listeners against one socket.
            return true;
        }

        let (sink, source) = match self.connector.connect().await {
            Ok(halves) => halves,
            Err(e) => {
                warn!("Failed to connect: {}", e);
                return false;
            }
        };

        let stop = CancellationToken::new();
        let listener = tokio::spawn(receive_loop(source, self.messages.clone(), stop.clone()));
        self.link = Some(Link {
            sink,
            listener,
            stop,
        });
        true
    }

    /// Single dispatch point for every outbound character.
    pub async fn send_char(&mut self, command: char) -> bool {
        let Some(link) = self.link.as_mut() else {
            warn!("Not connected; call connect() first");
            return false;
        };
        match link.sink.send(command.to_string()).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to send command '{}': {}", command, e);
                false
            }
        }
    }

    /// Speed level 0-9, sent as a single digit.
    pub async fn set_speed(&mut self, level: u8) -> bool {
        if level > 9 {
            warn!("Speed level {} out of range 0-9", level);
            return false;
        }
        self.send_char(char::from(b'0' + level)).await
    }

    pub async fn stop(&mut self) -> bool {
        self.send_action(Action::Stop).await
    }

    pub async fn forward(&mut self) -> bool {
        self.send_action(Action::Forward).await
    }

    pub async fn backward(&mut self) -> bool {
        self.send_action(Action::Backward).await
    }

    pub async fn turn_left(&mut self) -> bool {
        self.send_action(Action::TurnLeft).await
    }

    pub async fn turn_right(&mut self) -> bool {
        self.send_action(Action::TurnRight).await
    }

    /// Fixed-step alias; on the WeMos firmware `forward` already moves
    /// ~15 cm and stops.
    pub async fn forward_15cm(&mut self) -> bool {
        self.send_action(Action::Forward).await
    }

    pub async fn backward_15cm(&mut self) -> bool {
        self.send_action(Action::Backward).await
    }

    pub async fn turn_90_left(&mut self) -> bool {
        self.send_action(Action::TurnLeft).await
    }

    pub async fn turn_90_right(&mut self) -> bool {
        self.send_action(Action::TurnRight).await
    }

    pub async fn arm_up(&mut self) -> bool {
        self.send_action(Action::ArmUp).await
    }

    pub async fn arm_down(&mut self) -> bool {
        self.send_action(Action::ArmDown).await
    }

    pub async fn gripper_open(&mut self) -> bool {
        self.send_action(Action::GripperOpen).await
    }

    pub async fn gripper_close(&mut self) -> bool {
        self.send_action(Action::GripperClose).await
    }

    async fn send_action(&mut self, action: Action) -> bool {
        let command = self.table.char_for(action);
        self.send_char(command).await
    }

    /// Stop the listener and close the connection. Safe to call repeatedly
    /// and safe when never connected; the transport is closed exactly once
    /// per successful connect.
    pub async fn disconnect(&mut self) {
        let Some(mut link) = self.link.take() else {
            return;
        };

        link.stop.cancel();
        if let Err(e) = link.sink.close().await {
            warn!("Failed to close connection: {}", e);
        }
        if link.listener.await.is_err() {
            warn!("Listener task aborted abnormally");
        }
        info!("Disconnected");
    }
}

/// Drains inbound messages until cancelled or the peer goes away. The
/// cancellation interrupts a blocked read instead of waiting out the read
/// timeout.
async fn receive_loop(
    mut source: Box<dyn WireSource>,
    messages: mpsc::Sender<String>,
    stop: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = stop.cancelled() => break,
            inbound = source.receive() => match inbound {
                Inbound::Text(msg) if !msg.is_empty() => {
                    if messages.send(msg).await.is_err() {
                        break;
                    }
                }
                Inbound::Text(_) | Inbound::Idle => continue,
                Inbound::Closed => break,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandTable;
    use crate::transport::mock::MockConnector;

    fn controller_with(
        connector: MockConnector,
        table: CommandTable,
    ) -> (CarController, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(8);
        (CarController::new(Box::new(connector), table, tx), rx)
    }

    #[tokio::test]
    async fn every_alphabet_char_goes_out_once() {
        let (connector, log) = MockConnector::new(&[]);
        let (mut ctrl, _rx) = controller_with(connector, CommandTable::wemos());
        assert!(ctrl.connect().await);

        let alphabet = "FBLRXUJOC0123456789";
        for c in alphabet.chars() {
            assert!(ctrl.send_char(c).await, "send_char('{}') failed", c);
        }

        let log = log.lock().unwrap();
        let sent: String = log.frames.iter().map(String::as_str).collect();
        assert_eq!(sent, alphabet);
    }

    #[tokio::test]
    async fn send_char_while_disconnected_writes_nothing() {
        let (connector, log) = MockConnector::new(&[]);
        let (mut ctrl, _rx) = controller_with(connector, CommandTable::wemos());

        assert!(!ctrl.send_char('F').await);
        assert!(log.lock().unwrap().frames.is_empty());
    }

    #[tokio::test]
    async fn named_operations_follow_the_table() {
        let (connector, log) = MockConnector::new(&[]);
        let (mut ctrl, _rx) = controller_with(connector, CommandTable::wemos());
        assert!(ctrl.connect().await);

        assert!(ctrl.forward().await);
        assert!(ctrl.turn_90_left().await);
        assert!(ctrl.gripper_open().await);
        assert!(ctrl.stop().await);
        assert_eq!(log.lock().unwrap().frames, vec!["F", "L", "O", "X"]);

        let (connector, log) = MockConnector::new(&[]);
        let (mut ctrl, _rx) = controller_with(connector, CommandTable::wasd());
        assert!(ctrl.connect().await);

        assert!(ctrl.forward().await);
        assert!(ctrl.backward().await);
        assert_eq!(log.lock().unwrap().frames, vec!["W", "S"]);
    }

    #[tokio::test]
    async fn set_speed_checks_the_range() {
        let (connector, log) = MockConnector::new(&[]);
        let (mut ctrl, _rx) = controller_with(connector, CommandTable::wemos());
        assert!(ctrl.connect().await);

        assert!(ctrl.set_speed(7).await);
        assert_eq!(log.lock().unwrap().frames.last().unwrap(), "7");

        assert!(!ctrl.set_speed(10).await);
        assert_eq!(log.lock().unwrap().frames.len(), 1);

        assert!(ctrl.set_speed(0).await);
        assert_eq!(log.lock().unwrap().frames.last().unwrap(), "0");
    }

    #[tokio::test]
    async fn failed_send_reports_false_but_stays_connected() {
        let (connector, log) = MockConnector::failing_sends();
        let (mut ctrl, _rx) = controller_with(connector, CommandTable::wemos());
        assert!(ctrl.connect().await);

        assert!(!ctrl.send_char('F').await);
        assert!(ctrl.is_connected());
        assert!(log.lock().unwrap().frames.is_empty());
    }

    #[tokio::test]
    async fn failed_connect_leaves_disconnected_state() {
        let (connector, log) = MockConnector::refusing();
        let (mut ctrl, _rx) = controller_with(connector, CommandTable::wemos());

        assert!(!ctrl.connect().await);
        assert!(!ctrl.is_connected());
        // No connection means no listener and nothing on the wire.
        assert_eq!(log.lock().unwrap().connects, 0);
        assert!(!ctrl.send_char('F').await);
    }

    #[tokio::test]
    async fn connect_twice_keeps_one_connection() {
        let (connector, log) = MockConnector::new(&[]);
        let (mut ctrl, _rx) = controller_with(connector, CommandTable::wemos());

        assert!(ctrl.connect().await);
        assert!(ctrl.connect().await);
        assert_eq!(log.lock().unwrap().connects, 1);
    }

    #[tokio::test]
    async fn disconnect_is_idempotent() {
        let (connector, log) = MockConnector::new(&[]);
        let (mut ctrl, _rx) = controller_with(connector, CommandTable::wemos());
        assert!(ctrl.connect().await);

        ctrl.disconnect().await;
        ctrl.disconnect().await;
        assert!(!ctrl.is_connected());
        assert_eq!(log.lock().unwrap().closes, 1);
    }

    #[tokio::test]
    async fn disconnect_without_connect_is_a_noop() {
        let (connector, log) = MockConnector::new(&[]);
        let (mut ctrl, _rx) = controller_with(connector, CommandTable::wemos());

        ctrl.disconnect().await;
        assert_eq!(log.lock().unwrap().closes, 0);
    }

    #[tokio::test]
    async fn one_command_one_frame_one_close() {
        let (connector, log) = MockConnector::new(&[]);
        let (mut ctrl, _rx) = controller_with(connector, CommandTable::wemos());

        assert!(ctrl.connect().await);
        assert!(ctrl.send_char('F').await);
        ctrl.disconnect().await;

        let log = log.lock().unwrap();
        assert_eq!(log.frames, vec!["F"]);
        assert_eq!(log.closes, 1);
    }

    #[tokio::test]
    async fn inbound_message_reaches_the_console_once() {
        let (connector, _log) = MockConnector::new(&["CONNECTED"]);
        let (mut ctrl, mut rx) = controller_with(connector, CommandTable::wemos());
        assert!(ctrl.connect().await);

        assert_eq!(rx.recv().await.unwrap(), "CONNECTED");
        // Exactly once, and the controller state is untouched.
        assert!(rx.try_recv().is_err());
        assert!(ctrl.is_connected());
        assert!(ctrl.send_char('X').await);
    }

    #[tokio::test]
    async fn empty_inbound_text_is_dropped() {
        let (connector, _log) = MockConnector::new(&["", "ACK:F"]);
        let (mut ctrl, mut rx) = controller_with(connector, CommandTable::wemos());
        assert!(ctrl.connect().await);

        assert_eq!(rx.recv().await.unwrap(), "ACK:F");
        assert!(rx.try_recv().is_err());
    }
}
