//! Event names emitted by the player core.
//!
//! `Event` is the public playback contract; `InternalEvent` covers the
//! fullscreen hand-shake between the container and the embedding app.
//! Both convert to the wire name used as the `EventObject` key.

use std::fmt;

/// Playback events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    /// Pipeline reported ready to play
    Ready,
    /// Pipeline reported failure
    Error,
    Playing,
    DidPause,
    WillSeek,
    Seek,
    /// Pipeline finished a seek (payload: `finished`)
    DidSeek,
    /// Caller-facing seek target (payload: `position`)
    PositionUpdate,
    /// payload: `inUse`
    DidChangeDvrStatus,
    /// payload: `available`
    DidChangeDvrAvailability,
    DidUpdateOptions,
    /// payload: `MediaOption::to_attrs()`
    SubtitleSelected,
    /// payload: `MediaOption::to_attrs()`
    AudioSelected,
}

impl Event {
    /// Events re-emitted by the container for embedders.
    pub const ALL: &'static [Event] = &[
        Event::Ready,
        Event::Error,
        Event::Playing,
        Event::DidPause,
        Event::WillSeek,
        Event::Seek,
        Event::DidSeek,
        Event::PositionUpdate,
        Event::DidChangeDvrStatus,
        Event::DidChangeDvrAvailability,
        Event::DidUpdateOptions,
        Event::SubtitleSelected,
        Event::AudioSelected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Event::Ready => "ready",
            Event::Error => "error",
            Event::Playing => "playing",
            Event::DidPause => "didPause",
            Event::WillSeek => "willSeek",
            Event::Seek => "seek",
            Event::DidSeek => "didSeek",
            Event::PositionUpdate => "positionUpdate",
            Event::DidChangeDvrStatus => "didChangeDvrStatus",
            Event::DidChangeDvrAvailability => "didChangeDvrAvailability",
            Event::DidUpdateOptions => "didUpdateOptions",
            Event::SubtitleSelected => "subtitleSelected",
            Event::AudioSelected => "audioSelected",
        }
    }
}

/// Fullscreen events, triggered on the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InternalEvent {
    WillEnterFullscreen,
    DidEnterFullscreen,
    WillExitFullscreen,
    DidExitFullscreen,
    /// Ask the embedder to present fullscreen
    UserRequestEnterInFullscreen,
    /// Ask the embedder to leave fullscreen
    UserRequestExitFullscreen,
}

impl InternalEvent {
    pub const ALL: &'static [InternalEvent] = &[
        InternalEvent::WillEnterFullscreen,
        InternalEvent::DidEnterFullscreen,
        InternalEvent::WillExitFullscreen,
        InternalEvent::DidExitFullscreen,
        InternalEvent::UserRequestEnterInFullscreen,
        InternalEvent::UserRequestExitFullscreen,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InternalEvent::WillEnterFullscreen => "willEnterFullscreen",
            InternalEvent::DidEnterFullscreen => "didEnterFullscreen",
            InternalEvent::WillExitFullscreen => "willExitFullscreen",
            InternalEvent::DidExitFullscreen => "didExitFullscreen",
            InternalEvent::UserRequestEnterInFullscreen => "userRequestEnterInFullscreen",
            InternalEvent::UserRequestExitFullscreen => "userRequestExitFullscreen",
        }
    }
}

impl AsRef<str> for Event {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl AsRef<str> for InternalEvent {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for InternalEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
