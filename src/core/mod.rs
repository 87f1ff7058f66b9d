//! Core engine modules - event bus, playback state machines, player
//!
//! These modules form the player core, independent of any view layer.

pub mod dvr;
pub mod event_bus;
pub mod events;
pub mod fullscreen;
pub mod pipeline;
pub mod playback;
pub mod player;
pub mod seek;
pub mod simulator;

// Re-exports for convenience
pub use dvr::{DvrPositionEngine, TimelineSnapshot};
pub use event_bus::{Callback, EventObject, ListenerId, ObjectId};
pub use events::{Event, InternalEvent};
pub use fullscreen::{FullscreenController, FullscreenStrategy, Presenter};
pub use pipeline::{MediaOption, MediaOptionType, MediaPipeline, PlayerStatus, SeekCompletion, TimeRange};
pub use playback::{Playback, ViewBounds};
pub use player::Player;
pub use seek::{SeekCoordinator, SeekDecision, SeekState};
pub use simulator::SimulatedPipeline;
