//! Scripted in-memory media pipeline.
//!
//! Stands in for a platform media engine in tests and in the demo binary.
//! Everything is driven explicitly: status changes, playhead moves and seek
//! completions only happen when the owner asks for them.
//!
//! Seeks are recorded (absolute pipeline time). With auto-complete on (the
//! default) the playhead jumps and the completion fires inside `seek()`;
//! otherwise completions wait for `complete_pending_seeks()`.

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use super::pipeline::{MediaOption, MediaOptionType, MediaPipeline, PlayerStatus, SeekCompletion, TimeRange};

struct SimState {
    status: PlayerStatus,
    current_time: f64,
    duration: Option<f64>,
    seekable: Vec<TimeRange>,
    loaded: Vec<TimeRange>,
    current_date: Option<DateTime<Utc>>,
    playing: bool,
    auto_complete: bool,
    seek_calls: Vec<f64>,
    pending: Vec<(f64, SeekCompletion)>,
    subtitles: Vec<MediaOption>,
    audio_sources: Vec<MediaOption>,
    selected_subtitle: Option<MediaOption>,
    selected_audio_source: Option<MediaOption>,
    max_resolution: Option<(f64, f64)>,
}

pub struct SimulatedPipeline {
    state: Mutex<SimState>,
}

impl std::fmt::Debug for SimulatedPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self.lock();
        f.debug_struct("SimulatedPipeline")
            .field("status", &s.status)
            .field("current_time", &s.current_time)
            .field("duration", &s.duration)
            .field("seekable", &s.seekable)
            .field("playing", &s.playing)
            .field("pending_seeks", &s.pending.len())
            .finish()
    }
}

impl SimulatedPipeline {
    fn with_duration(duration: Option<f64>) -> Self {
        Self {
            state: Mutex::new(SimState {
                status: PlayerStatus::Unknown,
                current_time: 0.0,
                duration,
                seekable: Vec::new(),
                loaded: Vec::new(),
                current_date: None,
                playing: false,
                auto_complete: true,
                seek_calls: Vec::new(),
                pending: Vec::new(),
                subtitles: Vec::new(),
                audio_sources: Vec::new(),
                selected_subtitle: None,
                selected_audio_source: None,
                max_resolution: None,
            }),
        }
    }

    /// On-demand asset of `duration` seconds, fully seekable.
    pub fn vod(duration: f64) -> Self {
        let sim = Self::with_duration(Some(duration));
        sim.lock().seekable = vec![TimeRange::new(0.0, duration)];
        sim
    }

    /// Live stream with seekable window `[start, end]`, playhead at the edge.
    pub fn live(start: f64, end: f64) -> Self {
        let sim = Self::with_duration(None);
        {
            let mut s = sim.lock();
            s.seekable = vec![TimeRange::from_bounds(start, end)];
            s.current_time = end;
        }
        sim
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    // === Script controls ===

    pub fn set_status(&self, status: PlayerStatus) {
        self.lock().status = status;
    }

    pub fn set_current_time(&self, time: f64) {
        self.lock().current_time = time;
    }

    pub fn set_duration(&self, duration: Option<f64>) {
        self.lock().duration = duration;
    }

    /// Replace the seekable ranges with one window `[start, end]`.
    pub fn set_seekable_window(&self, start: f64, end: f64) {
        self.lock().seekable = vec![TimeRange::from_bounds(start, end)];
    }

    pub fn set_seekable_ranges(&self, ranges: Vec<TimeRange>) {
        self.lock().seekable = ranges;
    }

    pub fn set_loaded_ranges(&self, ranges: Vec<TimeRange>) {
        self.lock().loaded = ranges;
    }

    pub fn set_current_date(&self, date: Option<DateTime<Utc>>) {
        self.lock().current_date = date;
    }

    /// Subtitle tracks; the first one becomes the selected default.
    pub fn set_subtitles(&self, options: Vec<MediaOption>) {
        let mut s = self.lock();
        s.selected_subtitle = options.first().cloned();
        s.subtitles = options;
    }

    /// Audio tracks; the first one becomes the selected default.
    pub fn set_audio_sources(&self, options: Vec<MediaOption>) {
        let mut s = self.lock();
        s.selected_audio_source = options.first().cloned();
        s.audio_sources = options;
    }

    pub fn set_auto_complete_seeks(&self, enabled: bool) {
        self.lock().auto_complete = enabled;
    }

    /// Advance a live window (both ends) and, if playing, the playhead.
    pub fn advance(&self, seconds: f64) {
        let mut s = self.lock();
        if s.duration.is_none() {
            for range in s.seekable.iter_mut() {
                range.start += seconds;
            }
        }
        if s.playing {
            s.current_time += seconds;
        }
    }

    /// Fire every outstanding completion. Returns how many fired.
    pub fn complete_pending_seeks(&self, finished: bool) -> usize {
        let pending = std::mem::take(&mut self.lock().pending);
        let count = pending.len();
        for (time, completion) in pending {
            if finished {
                self.move_playhead(time);
            }
            completion(finished);
        }
        count
    }

    // === Inspection ===

    /// Every seek target received, in order (absolute pipeline time).
    pub fn seek_calls(&self) -> Vec<f64> {
        self.lock().seek_calls.clone()
    }

    pub fn is_playing(&self) -> bool {
        self.lock().playing
    }

    pub fn pending_seek_count(&self) -> usize {
        self.lock().pending.len()
    }

    /// Last resolution cap received, in pixels.
    pub fn preferred_maximum_resolution(&self) -> Option<(f64, f64)> {
        self.lock().max_resolution
    }

    /// Clamp into the seekable union; infinity resolves to the live edge.
    fn move_playhead(&self, time: f64) {
        let mut s = self.lock();
        let (lo, hi) = match (s.seekable.first(), s.seekable.last()) {
            (Some(first), Some(last)) => (first.start, last.end()),
            _ => (0.0, s.duration.unwrap_or(0.0)),
        };
        s.current_time = if time.is_infinite() { hi } else { time.clamp(lo, hi.max(lo)) };
    }
}

impl MediaPipeline for SimulatedPipeline {
    fn status(&self) -> PlayerStatus {
        self.lock().status
    }

    fn current_time(&self) -> f64 {
        self.lock().current_time
    }

    fn duration(&self) -> Option<f64> {
        self.lock().duration
    }

    fn seekable_time_ranges(&self) -> Vec<TimeRange> {
        self.lock().seekable.clone()
    }

    fn loaded_time_ranges(&self) -> Vec<TimeRange> {
        self.lock().loaded.clone()
    }

    fn current_date(&self) -> Option<DateTime<Utc>> {
        self.lock().current_date
    }

    fn play(&self) {
        self.lock().playing = true;
    }

    fn pause(&self) {
        self.lock().playing = false;
    }

    fn seek(&self, time: f64, completion: SeekCompletion) {
        // Lock released before the completion runs
        let immediate = {
            let mut s = self.lock();
            s.seek_calls.push(time);
            if s.auto_complete {
                Some(completion)
            } else {
                s.pending.push((time, completion));
                None
            }
        };
        if let Some(completion) = immediate {
            self.move_playhead(time);
            completion(true);
        }
    }

    fn subtitles(&self) -> Vec<MediaOption> {
        self.lock().subtitles.clone()
    }

    fn audio_sources(&self) -> Vec<MediaOption> {
        self.lock().audio_sources.clone()
    }

    fn selected_subtitle(&self) -> Option<MediaOption> {
        self.lock().selected_subtitle.clone()
    }

    fn selected_audio_source(&self) -> Option<MediaOption> {
        self.lock().selected_audio_source.clone()
    }

    fn select_media_option(&self, option: &MediaOption) {
        let mut s = self.lock();
        match option.kind {
            MediaOptionType::Subtitle => s.selected_subtitle = Some(option.clone()),
            MediaOptionType::AudioSource => s.selected_audio_source = Some(option.clone()),
        }
    }

    fn set_preferred_maximum_resolution(&self, width: f64, height: f64) {
        self.lock().max_resolution = Some((width, height));
    }
}
