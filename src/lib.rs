//! PLAYKIT - video player event coordination core
//!
//! Re-exports all modules for use by binary targets.

// Core engine (event bus, fullscreen, DVR, seeking, player)
pub mod core;

// App modules
pub mod cli;
pub mod entities;
pub mod paths;

// Re-export commonly used types from core
pub use core::event_bus::{Callback, EventObject};
pub use core::events::{Event, InternalEvent};
pub use core::pipeline::{MediaPipeline, PlayerStatus, TimeRange};
pub use core::playback::Playback;
pub use core::player::Player;

// Re-export entities
pub use entities::{AttrValue, Attrs};
