//! Operator prompt: one character per command, straight onto the wire.

use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use tokio::io::{self, AsyncBufReadExt};
use tokio::sync::mpsc;

use crate::command::CommandTable;
use crate::controller::CarController;

/// Pause after each dispatched character so the car's command buffer is
/// not overrun.
const SEND_PACING: Duration = Duration::from_millis(50);

/// Run the prompt loop until `Q`, EOF or Ctrl-C.
///
/// Every character of a line is filtered against the firmware alphabet and
/// dispatched one at a time; an empty line is an implicit stop. Cleanup
/// (stop + disconnect) always runs, whatever got the loop to exit.
pub async fn run(
    mut controller: CarController,
    table: CommandTable,
    mut messages: mpsc::Receiver<String>,
) -> Result<()> {
    println!("{}", table.legend());
    println!();

    // Robot chatter goes to the terminal without blocking the prompt.
    let printer = tokio::spawn(async move {
        while let Some(msg) = messages.recv().await {
            println!("car: {msg}");
        }
    });

    let stdin = io::stdin();
    let mut lines = io::BufReader::new(stdin).lines();

    loop {
        print!("command > ");
        std::io::stdout().flush()?;

        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line() => {
                let Ok(Some(line)) = line else { break };
                let line = line.trim().to_uppercase();

                if line.is_empty() {
                    controller.stop().await;
                    continue;
                }
                if line == "Q" {
                    break;
                }

                for c in line.chars().filter(|c| table.accepts(*c)) {
                    // A failed character does not abort the rest of the line.
                    controller.send_char(c).await;
                    tokio::time::sleep(SEND_PACING).await;
                }
            }
        }
    }

    controller.stop().await;
    controller.disconnect().await;
    printer.abort();
    println!("Disconnected.");
    Ok(())
}
