pub mod bus;
pub mod dispatcher;
pub mod r#loop;
pub mod model;
pub mod poller;
pub mod profile;
pub mod state;

pub use bus::{redraw_channel, RedrawListener, RedrawSignal};
pub use dispatcher::{ActionDispatcher, Swipe, SwipeOutcome};
pub use poller::{PollReport, Poller};
pub use profile::{Profile, ProfileStore, ProfileView};
pub use state::{AppState, KindlingConfig};
