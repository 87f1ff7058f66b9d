//! DVR position engine: live-window bookkeeping for the playback adapter.
//!
//! Works on a `TimelineSnapshot` captured from the pipeline, so every query
//! is a pure function of the current pipeline state. The only memory the
//! engine keeps is what it last *reported*:
//!
//! - `last_availability`: suppresses duplicate `didChangeDvrAvailability`
//!   (unset -> any value reports, equal values never do)
//! - `last_in_use`: suppresses duplicate `didChangeDvrStatus` on time ticks
//!
//! # Window mapping
//!
//! ```text
//!  seekable window           live edge
//!  |<------- window ------->|
//!  start        current     end
//!  position = current - start          (live, DVR available)
//!  position = 0                        (live, no DVR)
//!  position = current                  (VOD)
//! ```

use crate::entities::attrs::Attrs;
use crate::entities::keys::{DEFAULT_MIN_DVR_SIZE, K_MIN_DVR_SIZE, LIVE_HEAD_TOLERANCE};

use super::pipeline::{MediaPipeline, TimeRange};

/// Point-in-time view of the pipeline used by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimelineSnapshot {
    /// Indefinite duration
    pub is_live: bool,
    pub paused: bool,
    pub current_time: f64,
    /// Asset duration (VOD only)
    pub duration: Option<f64>,
    /// Union of the seekable ranges: first start to last end
    pub window: Option<TimeRange>,
}

impl TimelineSnapshot {
    pub fn capture(pipeline: &dyn MediaPipeline, paused: bool) -> Self {
        let ranges = pipeline.seekable_time_ranges();
        let window = match (ranges.first(), ranges.last()) {
            (Some(first), Some(last)) => Some(TimeRange::from_bounds(first.start, last.end())),
            _ => None,
        };
        let duration = pipeline.duration();
        Self {
            is_live: duration.is_none(),
            paused,
            current_time: pipeline.current_time(),
            duration,
            window,
        }
    }

    pub fn window_start(&self) -> Option<f64> {
        self.window.map(|w| w.start)
    }

    pub fn window_end(&self) -> Option<f64> {
        self.window.map(|w| w.end())
    }

    pub fn window_size(&self) -> f64 {
        self.window.map(|w| w.duration).unwrap_or(0.0)
    }
}

/// Read `minDvrSize`: only a Float is accepted, anything else means default.
pub fn min_dvr_size_from(options: &Attrs) -> f64 {
    options.get_float(K_MIN_DVR_SIZE).unwrap_or(DEFAULT_MIN_DVR_SIZE)
}

#[derive(Debug, Clone, PartialEq)]
pub struct DvrPositionEngine {
    min_dvr_size: f64,
    last_availability: Option<bool>,
    last_in_use: Option<bool>,
}

impl Default for DvrPositionEngine {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_DVR_SIZE)
    }
}

impl DvrPositionEngine {
    pub fn new(min_dvr_size: f64) -> Self {
        Self {
            min_dvr_size,
            last_availability: None,
            last_in_use: None,
        }
    }

    pub fn from_options(options: &Attrs) -> Self {
        Self::new(min_dvr_size_from(options))
    }

    pub fn min_dvr_size(&self) -> f64 {
        self.min_dvr_size
    }

    pub fn set_min_dvr_size(&mut self, size: f64) {
        self.min_dvr_size = size;
    }

    pub fn last_availability(&self) -> Option<bool> {
        self.last_availability
    }

    /// Override the remembered availability (source switch, tests).
    pub fn set_last_availability(&mut self, value: Option<bool>) {
        self.last_availability = value;
    }

    /// Forget everything reported so far (new media source).
    pub fn reset(&mut self) {
        self.last_availability = None;
        self.last_in_use = None;
    }

    // === Pure queries ===

    pub fn is_dvr_available(&self, t: &TimelineSnapshot) -> bool {
        t.is_live && t.window.is_some() && t.window_size() >= self.min_dvr_size
    }

    /// Live and either paused or behind the live edge by more than the tolerance.
    pub fn is_dvr_in_use(&self, t: &TimelineSnapshot) -> bool {
        if !t.is_live {
            return false;
        }
        let behind_live = t
            .window_end()
            .map(|end| t.current_time < end - LIVE_HEAD_TOLERANCE)
            .unwrap_or(false);
        t.paused || behind_live
    }

    pub fn position(&self, t: &TimelineSnapshot) -> f64 {
        if !t.is_live {
            return t.current_time;
        }
        match t.window_start() {
            Some(start) if self.is_dvr_available(t) => t.current_time - start,
            _ => 0.0,
        }
    }

    /// VOD: asset duration. Live: DVR window size, or 0 without DVR.
    pub fn duration(&self, t: &TimelineSnapshot) -> f64 {
        if !t.is_live {
            return t.duration.unwrap_or(0.0);
        }
        if self.is_dvr_available(t) {
            t.window_size()
        } else {
            0.0
        }
    }

    /// Map a caller-facing target into pipeline time.
    pub fn absolute_time(&self, t: &TimelineSnapshot, target: f64) -> f64 {
        match t.window_start() {
            Some(start) if self.is_dvr_available(t) => target + start,
            _ => target,
        }
    }

    // === Transitions ===

    /// Recompute availability; `Some(new)` only when it differs from the last
    /// reported value (unset counts as different from both).
    pub fn evaluate_availability(&mut self, t: &TimelineSnapshot) -> Option<bool> {
        let available = self.is_dvr_available(t);
        if self.last_availability == Some(available) {
            return None;
        }
        log::trace!(
            "DVR availability {:?} -> {} (window {:.1}s, min {:.1}s)",
            self.last_availability,
            available,
            t.window_size(),
            self.min_dvr_size
        );
        self.last_availability = Some(available);
        Some(available)
    }

    /// Re-evaluate in-use status on a time tick. Reports only changes, and
    /// only while a DVR window is available.
    pub fn evaluate_status(&mut self, t: &TimelineSnapshot) -> Option<bool> {
        if !self.is_dvr_available(t) {
            return None;
        }
        let in_use = self.is_dvr_in_use(t);
        if self.last_in_use == Some(in_use) {
            return None;
        }
        self.last_in_use = Some(in_use);
        Some(in_use)
    }

    /// Status to report unconditionally (pause, seek completion), or `None`
    /// when there is no DVR window to report on.
    pub fn force_status(&mut self, t: &TimelineSnapshot) -> Option<bool> {
        if !self.is_dvr_available(t) {
            return None;
        }
        let in_use = self.is_dvr_in_use(t);
        self.last_in_use = Some(in_use);
        Some(in_use)
    }
}
