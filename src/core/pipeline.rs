//! Media pipeline interface (external collaborator).
//!
//! The playback adapter drives a media engine it does not own: status,
//! timing, seekable/loaded ranges, and a fire-and-forget seek that reports
//! completion through a callback. Implementations live outside the core
//! (platform engines) or in `core::simulator` for tests and the demo.
//!
//! Methods take `&self`: engines are shared handles and do their own
//! synchronization. An implementation must not hold its own locks while
//! invoking a `SeekCompletion`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::attrs::Attrs;
use crate::entities::keys::{P_LANGUAGE, P_MEDIA_OPTION, P_MEDIA_OPTION_TYPE};

/// Pipeline readiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerStatus {
    #[default]
    Unknown,
    ReadyToPlay,
    Failed,
}

/// Contiguous time interval in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimeRange {
    pub start: f64,
    pub duration: f64,
}

impl TimeRange {
    pub fn new(start: f64, duration: f64) -> Self {
        Self { start, duration }
    }

    /// Range covering `[start, end]`.
    pub fn from_bounds(start: f64, end: f64) -> Self {
        Self {
            start,
            duration: (end - start).max(0.0),
        }
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// Kind of selectable media track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MediaOptionType {
    Subtitle,
    AudioSource,
}

impl MediaOptionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaOptionType::Subtitle => "subtitle",
            MediaOptionType::AudioSource => "audioSource",
        }
    }
}

/// Selectable subtitle or audio track exposed by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaOption {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: MediaOptionType,
    /// Language tag (e.g. "eng", "por")
    pub language: String,
}

impl MediaOption {
    pub fn new(name: impl Into<String>, kind: MediaOptionType, language: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            language: language.into(),
        }
    }

    /// Event payload: `mediaOption` (name), `language`, `type`.
    pub fn to_attrs(&self) -> Attrs {
        Attrs::new()
            .with(P_MEDIA_OPTION, self.name.as_str())
            .with(P_LANGUAGE, self.language.as_str())
            .with(P_MEDIA_OPTION_TYPE, self.kind.as_str())
    }

    /// Rebuild an option from a selection event payload.
    pub fn from_attrs(attrs: &Attrs) -> Option<Self> {
        let kind = match attrs.get_str(P_MEDIA_OPTION_TYPE)? {
            "subtitle" => MediaOptionType::Subtitle,
            "audioSource" => MediaOptionType::AudioSource,
            _ => return None,
        };
        Some(Self::new(
            attrs.get_str(P_MEDIA_OPTION)?,
            kind,
            attrs.get_str(P_LANGUAGE).unwrap_or_default(),
        ))
    }
}

/// Called by the pipeline once a seek settles. `true` when it finished,
/// `false` when it was interrupted (for example by a newer seek).
pub type SeekCompletion = Box<dyn FnOnce(bool) + Send + 'static>;

/// Media engine contract consumed by the playback adapter.
pub trait MediaPipeline: Send + Sync {
    fn status(&self) -> PlayerStatus;

    /// Current playhead in seconds.
    fn current_time(&self) -> f64;

    /// Asset duration; `None` when indefinite (live).
    fn duration(&self) -> Option<f64>;

    fn seekable_time_ranges(&self) -> Vec<TimeRange>;

    fn loaded_time_ranges(&self) -> Vec<TimeRange>;

    /// Wall-clock date of the playhead, when the stream carries one.
    fn current_date(&self) -> Option<DateTime<Utc>>;

    fn play(&self);

    fn pause(&self);

    /// Start a seek to absolute `time` (`f64::INFINITY` = live edge).
    /// Must not block; `completion` fires later (or immediately).
    fn seek(&self, time: f64, completion: SeekCompletion);

    // === Media options (engines without tracks keep the defaults) ===

    fn subtitles(&self) -> Vec<MediaOption> {
        Vec::new()
    }

    fn audio_sources(&self) -> Vec<MediaOption> {
        Vec::new()
    }

    fn selected_subtitle(&self) -> Option<MediaOption> {
        None
    }

    fn selected_audio_source(&self) -> Option<MediaOption> {
        None
    }

    /// Switch the track of `option.kind` to `option`.
    fn select_media_option(&self, _option: &MediaOption) {}

    /// Cap the variant resolution to the rendered size in pixels.
    fn set_preferred_maximum_resolution(&self, _width: f64, _height: f64) {}
}

/// Blanket impl: Arc<T> implements MediaPipeline if T does
impl<T: MediaPipeline + ?Sized> MediaPipeline for Arc<T> {
    fn status(&self) -> PlayerStatus {
        (**self).status()
    }

    fn current_time(&self) -> f64 {
        (**self).current_time()
    }

    fn duration(&self) -> Option<f64> {
        (**self).duration()
    }

    fn seekable_time_ranges(&self) -> Vec<TimeRange> {
        (**self).seekable_time_ranges()
    }

    fn loaded_time_ranges(&self) -> Vec<TimeRange> {
        (**self).loaded_time_ranges()
    }

    fn current_date(&self) -> Option<DateTime<Utc>> {
        (**self).current_date()
    }

    fn play(&self) {
        (**self).play()
    }

    fn pause(&self) {
        (**self).pause()
    }

    fn seek(&self, time: f64, completion: SeekCompletion) {
        (**self).seek(time, completion)
    }

    fn subtitles(&self) -> Vec<MediaOption> {
        (**self).subtitles()
    }

    fn audio_sources(&self) -> Vec<MediaOption> {
        (**self).audio_sources()
    }

    fn selected_subtitle(&self) -> Option<MediaOption> {
        (**self).selected_subtitle()
    }

    fn selected_audio_source(&self) -> Option<MediaOption> {
        (**self).selected_audio_source()
    }

    fn select_media_option(&self, option: &MediaOption) {
        (**self).select_media_option(option)
    }

    fn set_preferred_maximum_resolution(&self, width: f64, height: f64) {
        (**self).set_preferred_maximum_resolution(width, height)
    }
}
