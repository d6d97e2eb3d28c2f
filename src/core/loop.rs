use anyhow::Result;
use tokio::sync::mpsc::Receiver;
use tracing::{debug, info, warn};

use crate::core::bus::{RedrawListener, RedrawSignal};
use crate::core::dispatcher::{ActionDispatcher, Swipe};
use crate::core::profile::{ProfileStore, ProfileView};
use crate::io::events::InputCommand;

/// Something that can put a [`ProfileView`] on screen.
pub trait Frontend: Send {
    fn draw(&mut self, view: &ProfileView) -> Result<()>;

    /// Shown until the first redraw signal arrives.
    fn draw_loading(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Draws one frame per redraw signal until every producer is gone.
///
/// The profile lock is held only while the view is copied out; drawing runs
/// after it has been released.
pub async fn render_loop<F: Frontend>(
    store: ProfileStore,
    mut listener: RedrawListener,
    mut frontend: F,
    match_limit: usize,
) {
    if let Err(e) = frontend.draw_loading() {
        warn!("Initial draw failed: {:#}", e);
    }
    while listener.wait().await {
        let view = store.view(match_limit).await;
        if let Err(e) = frontend.draw(&view) {
            warn!("Draw failed: {:#}", e);
        }
    }
    debug!("render loop stopped: no more producers");
}

/// Runs the dispatcher inline for every command until quit.
pub async fn input_loop(
    mut commands: Receiver<InputCommand>,
    dispatcher: ActionDispatcher,
    redraw: RedrawSignal,
) {
    while let Some(command) = commands.recv().await {
        match command {
            InputCommand::Pass => {
                dispatcher.swipe(Swipe::Pass).await;
            }
            InputCommand::Like => {
                dispatcher.swipe(Swipe::Like).await;
            }
            InputCommand::Redraw => {
                redraw.notify();
            }
            InputCommand::Quit => {
                info!("quit requested");
                break;
            }
        }
    }
}
