//! Option and payload key constants for Attrs access.
//!
//! Avoid string typos, enable IDE autocomplete.
//! Usage: `options.get_float(K_MIN_DVR_SIZE)`

// === Options ===
/// Minimum seekable window (seconds) for a live stream to count as DVR-capable (Float)
pub const K_MIN_DVR_SIZE: &str = "minDvrSize";
/// Media source URL (Str)
pub const K_SOURCE_URL: &str = "source";
/// MIME type hint used when the URL has no extension (Str)
pub const K_MIME_TYPE: &str = "mimeType";
/// Initial position applied once the pipeline is ready (Float)
pub const K_START_AT: &str = "startAt";
/// Fullscreen is presented by the embedding app instead of the player (Bool)
pub const K_FULLSCREEN_BY_APP: &str = "fullscreenByApp";

// === Payloads ===
/// didChangeDvrStatus
pub const P_IN_USE: &str = "inUse";
/// didChangeDvrAvailability
pub const P_AVAILABLE: &str = "available";
/// positionUpdate
pub const P_POSITION: &str = "position";
/// didSeek
pub const P_FINISHED: &str = "finished";
/// Selected media option name (Str)
pub const P_MEDIA_OPTION: &str = "mediaOption";
/// Selected media option language (Str)
pub const P_LANGUAGE: &str = "language";
/// Selected media option kind: "subtitle" | "audioSource" (Str)
pub const P_MEDIA_OPTION_TYPE: &str = "type";

// === Defaults ===
/// Fallback for a missing or mistyped `minDvrSize`
pub const DEFAULT_MIN_DVR_SIZE: f64 = 60.0;
/// Distance from the live edge still treated as "at live"
pub const LIVE_HEAD_TOLERANCE: f64 = 5.0;
