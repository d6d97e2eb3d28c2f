use crossterm::event;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio::sync::mpsc::Sender;
use tracing::warn;

use crate::core::state::KeyBindings;
use crate::io::events::{map_event, InputCommand};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Reads terminal events on a dedicated thread and forwards them as commands.
///
/// The thread ends after forwarding a quit, or once the receiving side is gone.
pub fn spawn_input_reader(
    keys: KeyBindings,
    tx: Sender<InputCommand>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("kindling-input".to_string())
        .spawn(move || loop {
            if tx.is_closed() {
                break;
            }
            match event::poll(POLL_INTERVAL) {
                Ok(false) => continue,
                Ok(true) => {}
                Err(e) => {
                    warn!("Terminal poll error: {}", e);
                    let _ = tx.blocking_send(InputCommand::Quit);
                    break;
                }
            }
            let command = match event::read() {
                Ok(ev) => map_event(&ev, &keys),
                Err(e) => {
                    warn!("Terminal read error: {}", e);
                    continue;
                }
            };
            if let Some(command) = command {
                if tx.blocking_send(command).is_err() || command == InputCommand::Quit {
                    break;
                }
            }
        })
}
