//! Entities module - typed values shared by the core
//!
//! - `attrs`: key/value container for options and event payloads
//! - `keys`: option and payload key names
//! - `media_source`: source capability check

pub mod attrs;
pub mod keys;
pub mod media_source;

pub use attrs::{AttrValue, Attrs, EventUserInfo};
