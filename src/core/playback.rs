//! Playback adapter: drives a `MediaPipeline` and reports through events.
//!
//! **Architecture**: `Playback` is a cheap `Clone` handle. All mutable state
//! (pipeline, options, DVR engine, seek coordinator, paused flag) sits behind
//! one coarse `Mutex`. The lock is never held across:
//! - `EventObject::trigger*` (listeners may call back into the adapter)
//! - `MediaPipeline::{play, pause, seek}` (completions may fire synchronously)
//!
//! # Seek flow
//!
//! ```text
//! seek(t) --not ready--> PendingSeek(t) --handle_status_change(ready)--+
//!    |                                                                  |
//!    +--ready--> willSeek -> pipeline.seek(abs) -> seek -> positionUpdate{t}
//!                              |
//!                              +-- completion --> didSeek{finished} -> didChangeDvrStatus
//! ```
//!
//! `abs` is `t` shifted by the DVR window start when a DVR window is available.
//! `positionUpdate` always carries the caller-facing `t`. A completion that
//! arrives while `pipeline.seek()` is still issuing is held back until
//! `positionUpdate` has been emitted, so `didSeek` always comes last.

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use chrono::{DateTime, Utc};
use log::{debug, info, trace, warn};

use crate::entities::attrs::Attrs;
use crate::entities::keys::{K_START_AT, P_AVAILABLE, P_FINISHED, P_IN_USE, P_POSITION};
use crate::entities::media_source;

use super::dvr::{min_dvr_size_from, DvrPositionEngine, TimelineSnapshot};
use super::event_bus::EventObject;
use super::events::Event;
use super::pipeline::{MediaOption, MediaOptionType, MediaPipeline, PlayerStatus, TimeRange};
use super::seek::{SeekCoordinator, SeekDecision};

struct PlaybackState {
    pipeline: Option<Arc<dyn MediaPipeline>>,
    options: Attrs,
    dvr: DvrPositionEngine,
    seek: SeekCoordinator,
    paused: bool,
    last_status: PlayerStatus,
    /// Rendered view size in points plus screen scale
    bounds: Option<ViewBounds>,
}

/// View size reported by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBounds {
    pub width: f64,
    pub height: f64,
    pub scale: f64,
}

impl ViewBounds {
    /// Size in device pixels.
    pub fn pixel_size(&self) -> (f64, f64) {
        (self.width * self.scale, self.height * self.scale)
    }
}

/// Completion handoff for one issued seek. While `issuing` is set, a
/// completion only records its result; the issuer reports it afterwards.
#[derive(Default)]
struct SeekHandoff {
    issuing: bool,
    held: Option<bool>,
}

impl PlaybackState {
    fn snapshot(&self) -> Option<TimelineSnapshot> {
        self.pipeline
            .as_ref()
            .map(|p| TimelineSnapshot::capture(&**p, self.paused))
    }

    fn is_ready(&self) -> bool {
        self.pipeline
            .as_ref()
            .is_some_and(|p| p.status() == PlayerStatus::ReadyToPlay)
    }

    /// Pipeline handle plus the absolute time to hand it for `target`.
    fn resolve_seek(&self, target: f64) -> Option<(Arc<dyn MediaPipeline>, f64)> {
        let pipeline = self.pipeline.clone()?;
        let absolute = self
            .snapshot()
            .map(|t| self.dvr.absolute_time(&t, target))
            .unwrap_or(target);
        Some((pipeline, absolute))
    }

    fn evaluate_availability(&mut self) -> Option<bool> {
        let t = self.snapshot()?;
        self.dvr.evaluate_availability(&t)
    }

    fn evaluate_status(&mut self) -> Option<bool> {
        let t = self.snapshot()?;
        self.dvr.evaluate_status(&t)
    }

    fn force_status(&mut self) -> Option<bool> {
        let t = self.snapshot()?;
        self.dvr.force_status(&t)
    }

    fn reset_source(&mut self) {
        self.dvr.reset();
        self.seek.reset();
        self.paused = false;
        self.last_status = PlayerStatus::Unknown;
    }
}

#[derive(Clone)]
pub struct Playback {
    events: EventObject,
    state: Arc<Mutex<PlaybackState>>,
}

impl std::fmt::Debug for Playback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self.lock();
        f.debug_struct("Playback")
            .field("events", &self.events)
            .field("has_pipeline", &s.pipeline.is_some())
            .field("paused", &s.paused)
            .field("seek", &s.seek.state())
            .field("dvr", &s.dvr)
            .finish()
    }
}

impl Default for Playback {
    fn default() -> Self {
        Self::new(Attrs::new())
    }
}

impl Playback {
    pub fn new(options: Attrs) -> Self {
        let dvr = DvrPositionEngine::new(min_dvr_size_from(&options));
        Self {
            events: EventObject::new(),
            state: Arc::new(Mutex::new(PlaybackState {
                pipeline: None,
                options,
                dvr,
                seek: SeekCoordinator::new(),
                paused: false,
                last_status: PlayerStatus::Unknown,
                bounds: None,
            })),
        }
    }

    /// Whether a source described by `options` can be handled.
    pub fn can_play(options: &Attrs) -> bool {
        media_source::can_play(options)
    }

    /// Event object this adapter triggers on.
    pub fn events(&self) -> &EventObject {
        &self.events
    }

    fn lock(&self) -> MutexGuard<'_, PlaybackState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn emit_flag(&self, event: Event, key: &str, value: Option<bool>) {
        if let Some(value) = value {
            self.events.trigger_with(event, Attrs::new().with(key, value));
        }
    }

    // ========== Source ==========

    /// Attach a new pipeline. DVR bookkeeping and any pending seek are reset;
    /// a `startAt` option becomes the pending seek.
    pub fn load(&self, pipeline: Arc<dyn MediaPipeline>) {
        {
            let mut s = self.lock();
            if let Some(bounds) = s.bounds {
                let (width, height) = bounds.pixel_size();
                pipeline.set_preferred_maximum_resolution(width, height);
            }
            s.pipeline = Some(pipeline);
            s.reset_source();
            if let Some(start) = s.options.get_float(K_START_AT) {
                debug!("Playback: startAt {} queued", start);
                s.seek.request(start, false);
            }
        }
        info!("Playback: pipeline loaded");
        self.flush_pending_seek_if_ready();
    }

    pub fn unload(&self) {
        let mut s = self.lock();
        if s.pipeline.take().is_some() {
            info!("Playback: pipeline unloaded");
        }
        s.reset_source();
    }

    pub fn has_pipeline(&self) -> bool {
        self.lock().pipeline.is_some()
    }

    // ========== Options ==========

    pub fn options(&self) -> Attrs {
        self.lock().options.clone()
    }

    /// Replace options and re-read `minDvrSize`. Always emits `didUpdateOptions`.
    pub fn set_options(&self, options: Attrs) {
        {
            let mut s = self.lock();
            s.dvr.set_min_dvr_size(min_dvr_size_from(&options));
            s.options = options;
        }
        self.events.trigger(Event::DidUpdateOptions);
    }

    pub fn min_dvr_size(&self) -> f64 {
        self.lock().dvr.min_dvr_size()
    }

    // ========== Transport ==========

    pub fn play(&self) {
        let pipeline = {
            let mut s = self.lock();
            s.paused = false;
            s.pipeline.clone()
        };
        let Some(pipeline) = pipeline else {
            warn!("Playback: play() without a pipeline");
            return;
        };
        pipeline.play();
        self.events.trigger(Event::Playing);
    }

    /// Pause; reports DVR status unconditionally when a DVR window exists.
    pub fn pause(&self) {
        let pipeline = {
            let mut s = self.lock();
            s.paused = true;
            s.pipeline.clone()
        };
        let Some(pipeline) = pipeline else {
            warn!("Playback: pause() without a pipeline");
            return;
        };
        pipeline.pause();
        let status = self.lock().force_status();
        self.events.trigger(Event::DidPause);
        self.emit_flag(Event::DidChangeDvrStatus, P_IN_USE, status);
    }

    pub fn is_paused(&self) -> bool {
        self.lock().paused
    }

    // ========== Seeking ==========

    /// Seek to `target` seconds (caller-facing; inside the DVR window when one
    /// is available). Deferred until the pipeline is ready.
    pub fn seek(&self, target: f64) {
        let issue = {
            let mut s = self.lock();
            let ready = s.is_ready();
            match s.seek.request(target, ready) {
                SeekDecision::Deferred => None,
                SeekDecision::Issue(target) => s.resolve_seek(target).map(|r| (target, r)),
            }
        };
        if let Some((target, (pipeline, absolute))) = issue {
            self.perform_seek(pipeline, target, absolute);
        }
    }

    pub fn seek_to_live_position(&self) {
        self.seek(f64::INFINITY);
    }

    /// Issue the parked seek if the pipeline became ready. No-op otherwise.
    pub fn flush_pending_seek_if_ready(&self) {
        let issue = {
            let mut s = self.lock();
            let ready = s.is_ready();
            s.seek
                .take_if_ready(ready)
                .and_then(|target| s.resolve_seek(target).map(|r| (target, r)))
        };
        if let Some((target, (pipeline, absolute))) = issue {
            self.perform_seek(pipeline, target, absolute);
        }
    }

    pub fn pending_seek(&self) -> Option<f64> {
        self.lock().seek.pending()
    }

    fn perform_seek(&self, pipeline: Arc<dyn MediaPipeline>, target: f64, absolute: f64) {
        trace!("Playback: seek {} (pipeline time {})", target, absolute);
        self.events.trigger(Event::WillSeek);

        let handoff = Arc::new(Mutex::new(SeekHandoff {
            issuing: true,
            held: None,
        }));
        let events = self.events.clone();
        let state = Arc::downgrade(&self.state);
        let slot = Arc::clone(&handoff);
        pipeline.seek(
            absolute,
            Box::new(move |finished| {
                {
                    let mut h = slot.lock().unwrap_or_else(|e| e.into_inner());
                    if h.issuing {
                        h.held = Some(finished);
                        return;
                    }
                }
                Self::seek_completed(events, state, finished);
            }),
        );

        self.events.trigger(Event::Seek);
        self.events
            .trigger_with(Event::PositionUpdate, Attrs::new().with(P_POSITION, target));

        let held = {
            let mut h = handoff.lock().unwrap_or_else(|e| e.into_inner());
            h.issuing = false;
            h.held.take()
        };
        if let Some(finished) = held {
            Self::seek_completed(self.events.clone(), Arc::downgrade(&self.state), finished);
        }
    }

    /// Pipeline completion. Every completion reports `didSeek`, including
    /// seeks superseded by a newer one (`finished == false`).
    fn seek_completed(events: EventObject, state: Weak<Mutex<PlaybackState>>, finished: bool) {
        let status = state.upgrade().and_then(|state| {
            let mut s = state.lock().unwrap_or_else(|e| e.into_inner());
            s.force_status()
        });
        trace!("Playback: seek completed (finished: {})", finished);
        events.trigger_with(Event::DidSeek, Attrs::new().with(P_FINISHED, finished));
        if let Some(in_use) = status {
            events.trigger_with(Event::DidChangeDvrStatus, Attrs::new().with(P_IN_USE, in_use));
        }
    }

    // ========== Pipeline signals ==========

    /// Pipeline status observer: reports `ready`/`error` on change, flushes
    /// a pending seek and re-evaluates DVR availability.
    pub fn handle_status_change(&self) {
        let (status, changed) = {
            let mut s = self.lock();
            let status = s.pipeline.as_ref().map(|p| p.status()).unwrap_or_default();
            let changed = status != s.last_status;
            s.last_status = status;
            (status, changed)
        };
        if changed {
            debug!("Playback: status {:?}", status);
            match status {
                PlayerStatus::ReadyToPlay => self.events.trigger(Event::Ready),
                PlayerStatus::Failed => self.events.trigger(Event::Error),
                PlayerStatus::Unknown => {}
            }
        }
        if status == PlayerStatus::ReadyToPlay {
            self.flush_pending_seek_if_ready();
        }
        let availability = self.lock().evaluate_availability();
        self.emit_flag(Event::DidChangeDvrAvailability, P_AVAILABLE, availability);
    }

    /// Periodic playhead tick: reports position, DVR availability changes
    /// and DVR status changes.
    pub fn handle_time_update(&self) {
        let (position, availability, status) = {
            let mut s = self.lock();
            let Some(t) = s.snapshot() else {
                return;
            };
            let position = s.dvr.position(&t);
            (position, s.evaluate_availability(), s.evaluate_status())
        };
        self.events
            .trigger_with(Event::PositionUpdate, Attrs::new().with(P_POSITION, position));
        self.emit_flag(Event::DidChangeDvrAvailability, P_AVAILABLE, availability);
        self.emit_flag(Event::DidChangeDvrStatus, P_IN_USE, status);
    }

    /// Remembered availability (`None` = never reported).
    pub fn last_dvr_availability(&self) -> Option<bool> {
        self.lock().dvr.last_availability()
    }

    pub fn set_last_dvr_availability(&self, value: Option<bool>) {
        self.lock().dvr.set_last_availability(value);
    }

    // ========== Media options ==========

    pub fn subtitles(&self) -> Vec<MediaOption> {
        self.pipeline().map(|p| p.subtitles()).unwrap_or_default()
    }

    pub fn audio_sources(&self) -> Vec<MediaOption> {
        self.pipeline().map(|p| p.audio_sources()).unwrap_or_default()
    }

    pub fn selected_subtitle(&self) -> Option<MediaOption> {
        self.pipeline().and_then(|p| p.selected_subtitle())
    }

    pub fn selected_audio_source(&self) -> Option<MediaOption> {
        self.pipeline().and_then(|p| p.selected_audio_source())
    }

    /// Select a subtitle track and emit `subtitleSelected`.
    pub fn set_selected_subtitle(&self, option: MediaOption) {
        self.select_media_option(option, MediaOptionType::Subtitle, Event::SubtitleSelected);
    }

    /// Select an audio track and emit `audioSelected`.
    pub fn set_selected_audio_source(&self, option: MediaOption) {
        self.select_media_option(option, MediaOptionType::AudioSource, Event::AudioSelected);
    }

    fn select_media_option(&self, option: MediaOption, kind: MediaOptionType, event: Event) {
        if option.kind != kind {
            warn!("Playback: {:?} option '{}' offered as {:?}, ignoring", option.kind, option.name, kind);
            return;
        }
        let Some(pipeline) = self.pipeline() else {
            warn!("Playback: cannot select '{}' without a pipeline", option.name);
            return;
        };
        debug!("Playback: selecting {:?} '{}' ({})", kind, option.name, option.language);
        pipeline.select_media_option(&option);
        self.events.trigger_with(event, option.to_attrs());
    }

    // ========== View bounds ==========

    /// Presentation layer reports the rendered size; the pipeline is capped
    /// to that many pixels. Remembered and re-applied on `load()`.
    pub fn set_bounds(&self, width: f64, height: f64, scale: f64) {
        let bounds = ViewBounds { width, height, scale };
        let pipeline = {
            let mut s = self.lock();
            s.bounds = Some(bounds);
            s.pipeline.clone()
        };
        if let Some(pipeline) = pipeline {
            let (w, h) = bounds.pixel_size();
            trace!("Playback: preferred maximum resolution {}x{}", w, h);
            pipeline.set_preferred_maximum_resolution(w, h);
        }
    }

    pub fn bounds(&self) -> Option<ViewBounds> {
        self.lock().bounds
    }

    // ========== Queries ==========

    fn pipeline(&self) -> Option<Arc<dyn MediaPipeline>> {
        self.lock().pipeline.clone()
    }

    fn query<R>(&self, default: R, f: impl FnOnce(&DvrPositionEngine, &TimelineSnapshot) -> R) -> R {
        let s = self.lock();
        match s.snapshot() {
            Some(t) => f(&s.dvr, &t),
            None => default,
        }
    }

    pub fn is_ready_to_seek(&self) -> bool {
        self.lock().is_ready()
    }

    pub fn is_live(&self) -> bool {
        self.query(false, |_, t| t.is_live)
    }

    pub fn is_dvr_available(&self) -> bool {
        self.query(false, |dvr, t| dvr.is_dvr_available(t))
    }

    pub fn is_dvr_in_use(&self) -> bool {
        self.query(false, |dvr, t| dvr.is_dvr_in_use(t))
    }

    /// Playhead in caller-facing seconds.
    pub fn position(&self) -> f64 {
        self.query(0.0, |dvr, t| dvr.position(t))
    }

    pub fn duration(&self) -> f64 {
        self.query(0.0, |dvr, t| dvr.duration(t))
    }

    pub fn current_date(&self) -> Option<DateTime<Utc>> {
        self.lock().pipeline.as_ref().and_then(|p| p.current_date())
    }

    pub fn seekable_time_ranges(&self) -> Vec<TimeRange> {
        self.lock()
            .pipeline
            .as_ref()
            .map(|p| p.seekable_time_ranges())
            .unwrap_or_default()
    }

    pub fn loaded_time_ranges(&self) -> Vec<TimeRange> {
        self.lock()
            .pipeline
            .as_ref()
            .map(|p| p.loaded_time_ranges())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event_bus::Callback;
    use crate::core::simulator::SimulatedPipeline;
    use crate::entities::attrs::AttrValue;
    use crate::entities::keys::{K_MIN_DVR_SIZE, K_SOURCE_URL, P_MEDIA_OPTION};
    use std::sync::atomic::{AtomicI32, Ordering};

    type Log = Arc<Mutex<Vec<(String, Attrs)>>>;

    fn record(playback: &Playback) -> Log {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        for event in Event::ALL {
            let l = Arc::clone(&log);
            let name = event.as_str().to_string();
            playback.events().on(event, Callback::new(move |info| {
                l.lock().unwrap().push((name.clone(), info.clone()));
            }));
        }
        log
    }

    fn names(log: &Log) -> Vec<String> {
        log.lock().unwrap().iter().map(|(n, _)| n.clone()).collect()
    }

    fn payloads(log: &Log, event: Event) -> Vec<Attrs> {
        log.lock()
            .unwrap()
            .iter()
            .filter(|(n, _)| n == event.as_str())
            .map(|(_, a)| a.clone())
            .collect()
    }

    fn ready(sim: SimulatedPipeline) -> Arc<SimulatedPipeline> {
        sim.set_status(PlayerStatus::ReadyToPlay);
        Arc::new(sim)
    }

    fn loaded(sim: &Arc<SimulatedPipeline>) -> Playback {
        let playback = Playback::default();
        playback.load(sim.clone());
        playback
    }

    #[test]
    fn test_min_dvr_size_from_options() {
        assert_eq!(Playback::new(Attrs::new().with(K_MIN_DVR_SIZE, 15.1)).min_dvr_size(), 15.1);
        assert_eq!(
            Playback::new(Attrs::new().with(K_MIN_DVR_SIZE, AttrValue::Int(15))).min_dvr_size(),
            60.0
        );
        assert_eq!(Playback::default().min_dvr_size(), 60.0);
    }

    #[test]
    fn test_seek_when_ready() {
        let sim = ready(SimulatedPipeline::vod(60.0));
        let playback = loaded(&sim);
        let log = record(&playback);

        playback.seek(20.0);

        assert_eq!(sim.seek_calls(), vec![20.0]);
        assert_eq!(playback.pending_seek(), None);
        assert_eq!(names(&log), vec!["willSeek", "seek", "positionUpdate", "didSeek"]);
        assert_eq!(payloads(&log, Event::PositionUpdate)[0].get_float(P_POSITION), Some(20.0));
        assert_eq!(payloads(&log, Event::DidSeek)[0].get_bool(P_FINISHED), Some(true));
    }

    #[test]
    fn test_seek_before_ready_is_deferred() {
        let sim = Arc::new(SimulatedPipeline::vod(60.0));
        let playback = loaded(&sim);
        let log = record(&playback);

        playback.seek(20.0);
        playback.seek(45.0);

        assert!(sim.seek_calls().is_empty());
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(playback.pending_seek(), Some(45.0));

        // Not ready yet: flushing does nothing
        playback.flush_pending_seek_if_ready();
        assert!(sim.seek_calls().is_empty());

        sim.set_status(PlayerStatus::ReadyToPlay);
        playback.handle_status_change();

        assert_eq!(sim.seek_calls(), vec![45.0]);
        assert_eq!(playback.pending_seek(), None);
        assert_eq!(names(&log)[0], "ready");

        playback.flush_pending_seek_if_ready();
        assert_eq!(sim.seek_calls().len(), 1);
    }

    #[test]
    fn test_newer_seek_when_ready_overrides_pending() {
        let sim = Arc::new(SimulatedPipeline::vod(60.0));
        let playback = loaded(&sim);

        playback.seek(20.0);
        sim.set_status(PlayerStatus::ReadyToPlay);
        playback.seek(45.0);
        assert_eq!(playback.pending_seek(), None);

        // Status observer runs after the pipeline is already ready
        playback.handle_status_change();

        assert_eq!(sim.seek_calls(), vec![45.0]);
        assert_eq!(sim.current_time(), 45.0);
    }

    #[test]
    fn test_did_seek_after_position_update_with_later_completion() {
        let sim = ready(SimulatedPipeline::vod(60.0));
        sim.set_auto_complete_seeks(false);
        let playback = loaded(&sim);
        let log = record(&playback);

        playback.seek(10.0);
        assert_eq!(names(&log), vec!["willSeek", "seek", "positionUpdate"]);

        sim.complete_pending_seeks(true);
        assert_eq!(names(&log), vec!["willSeek", "seek", "positionUpdate", "didSeek"]);
    }

    #[test]
    fn test_dvr_status_follows_did_seek() {
        let sim = ready(SimulatedPipeline::live(0.0, 60.0));
        let playback = loaded(&sim);
        let log = record(&playback);

        playback.seek(10.0);

        assert_eq!(
            names(&log),
            vec!["willSeek", "seek", "positionUpdate", "didSeek", "didChangeDvrStatus"]
        );
    }

    #[test]
    fn test_flush_without_pending_seek() {
        let sim = ready(SimulatedPipeline::vod(60.0));
        let playback = loaded(&sim);

        playback.flush_pending_seek_if_ready();

        assert!(sim.seek_calls().is_empty());
        assert_eq!(playback.pending_seek(), None);
    }

    #[test]
    fn test_seek_inside_dvr_window() {
        let sim = ready(SimulatedPipeline::live(60.0, 120.0));
        let playback = loaded(&sim);

        playback.seek(20.0);

        assert_eq!(sim.seek_calls(), vec![80.0]);
    }

    #[test]
    fn test_seek_without_dvr_uses_raw_target() {
        let sim = ready(SimulatedPipeline::live(60.0, 90.0));
        let playback = loaded(&sim);

        playback.seek(20.0);

        assert_eq!(sim.seek_calls(), vec![20.0]);
    }

    #[test]
    fn test_dvr_status_after_seek() {
        let sim = ready(SimulatedPipeline::live(0.0, 60.0));
        sim.set_current_time(54.0);
        let playback = loaded(&sim);
        let log = record(&playback);

        playback.seek(50.0);
        let status = payloads(&log, Event::DidChangeDvrStatus);
        assert_eq!(status.last().and_then(|a| a.get_bool(P_IN_USE)), Some(true));

        playback.seek(60.0);
        let status = payloads(&log, Event::DidChangeDvrStatus);
        assert_eq!(status.last().and_then(|a| a.get_bool(P_IN_USE)), Some(false));
    }

    #[test]
    fn test_no_dvr_status_without_window() {
        let sim = ready(SimulatedPipeline::live(0.0, 60.0));
        sim.set_seekable_ranges(Vec::new());
        sim.set_current_time(59.0);
        let playback = loaded(&sim);
        let log = record(&playback);

        playback.seek(60.0);
        playback.pause();

        assert!(payloads(&log, Event::DidChangeDvrStatus).is_empty());
        assert_eq!(payloads(&log, Event::DidPause).len(), 1);
    }

    #[test]
    fn test_pause_reports_dvr_status() {
        let sim = ready(SimulatedPipeline::live(0.0, 60.0));
        sim.set_current_time(59.0);
        let playback = loaded(&sim);
        let log = record(&playback);

        playback.play();
        assert!(sim.is_playing());
        playback.pause();

        assert!(!sim.is_playing());
        assert!(playback.is_dvr_in_use());
        assert_eq!(names(&log), vec!["playing", "didPause", "didChangeDvrStatus"]);
        assert_eq!(payloads(&log, Event::DidChangeDvrStatus)[0].get_bool(P_IN_USE), Some(true));
    }

    #[test]
    fn test_seek_to_live_position() {
        let sim = ready(SimulatedPipeline::live(0.0, 120.0));
        sim.set_current_time(30.0);
        let playback = loaded(&sim);
        let log = record(&playback);

        playback.seek_to_live_position();

        assert_eq!(sim.seek_calls(), vec![f64::INFINITY]);
        assert_eq!(sim.current_time(), 120.0);
        let position = payloads(&log, Event::PositionUpdate)[0].get_float(P_POSITION);
        assert_eq!(position, Some(f64::INFINITY));
        assert!(!playback.is_dvr_in_use());
    }

    #[test]
    fn test_superseded_seek_still_reports_did_seek() {
        let sim = ready(SimulatedPipeline::vod(60.0));
        sim.set_auto_complete_seeks(false);
        let playback = loaded(&sim);
        let log = record(&playback);

        playback.seek(10.0);
        playback.seek(20.0);
        assert!(payloads(&log, Event::DidSeek).is_empty());

        assert_eq!(sim.complete_pending_seeks(false), 2);

        let did_seek = payloads(&log, Event::DidSeek);
        assert_eq!(did_seek.len(), 2);
        assert!(did_seek.iter().all(|a| a.get_bool(P_FINISHED) == Some(false)));
    }

    #[test]
    fn test_completion_after_playback_dropped() {
        let sim = ready(SimulatedPipeline::vod(60.0));
        sim.set_auto_complete_seeks(false);
        let events = {
            let playback = loaded(&sim);
            playback.seek(10.0);
            playback.events().clone()
        };
        let count = Arc::new(AtomicI32::new(0));
        let c = Arc::clone(&count);
        events.on(Event::DidSeek, Callback::new(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        }));

        sim.complete_pending_seeks(true);

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_listener_can_query_during_seek() {
        let sim = ready(SimulatedPipeline::vod(60.0));
        let playback = loaded(&sim);
        let seen = Arc::new(Mutex::new(None));

        let p = playback.clone();
        let s = Arc::clone(&seen);
        playback.events().on(Event::DidSeek, Callback::new(move |_| {
            *s.lock().unwrap() = Some(p.position());
        }));

        playback.seek(42.0);

        assert_eq!(*seen.lock().unwrap(), Some(42.0));
    }

    #[test]
    fn test_availability_transitions() {
        let sim = ready(SimulatedPipeline::live(0.0, 45.0));
        let playback = loaded(&sim);
        let log = record(&playback);

        playback.handle_status_change();
        playback.handle_time_update();
        assert_eq!(payloads(&log, Event::DidChangeDvrAvailability).len(), 1);
        assert_eq!(playback.last_dvr_availability(), Some(false));

        sim.set_seekable_window(0.0, 75.0);
        playback.handle_time_update();

        let availability = payloads(&log, Event::DidChangeDvrAvailability);
        assert_eq!(availability.len(), 2);
        assert_eq!(availability[1].get_bool(P_AVAILABLE), Some(true));
        assert!(playback.is_dvr_available());
    }

    #[test]
    fn test_availability_from_forced_last_value() {
        let sim = ready(SimulatedPipeline::live(0.0, 85.0));
        let playback = loaded(&sim);
        let log = record(&playback);

        playback.set_last_dvr_availability(Some(true));
        playback.handle_time_update();
        assert!(payloads(&log, Event::DidChangeDvrAvailability).is_empty());

        playback.set_last_dvr_availability(Some(false));
        playback.handle_time_update();
        assert_eq!(payloads(&log, Event::DidChangeDvrAvailability).len(), 1);
    }

    #[test]
    fn test_time_update_status_changes_only() {
        let sim = ready(SimulatedPipeline::live(0.0, 120.0));
        sim.set_current_time(100.0);
        let playback = loaded(&sim);
        let log = record(&playback);

        playback.handle_time_update();
        playback.handle_time_update();
        sim.set_current_time(118.0);
        playback.handle_time_update();

        let status: Vec<_> = payloads(&log, Event::DidChangeDvrStatus)
            .iter()
            .map(|a| a.get_bool(P_IN_USE))
            .collect();
        assert_eq!(status, vec![Some(true), Some(false)]);
        assert_eq!(payloads(&log, Event::PositionUpdate)[0].get_float(P_POSITION), Some(100.0));
    }

    #[test]
    fn test_status_events_on_change() {
        let sim = Arc::new(SimulatedPipeline::vod(60.0));
        let playback = loaded(&sim);
        let log = record(&playback);

        playback.handle_status_change();
        sim.set_status(PlayerStatus::ReadyToPlay);
        playback.handle_status_change();
        playback.handle_status_change();
        sim.set_status(PlayerStatus::Failed);
        playback.handle_status_change();

        let status: Vec<_> = names(&log)
            .into_iter()
            .filter(|n| n == "ready" || n == "error")
            .collect();
        assert_eq!(status, vec!["ready", "error"]);
    }

    #[test]
    fn test_position_and_duration() {
        let live = ready(SimulatedPipeline::live(100.0, 160.0));
        live.set_current_time(125.0);
        let playback = loaded(&live);
        assert!(playback.is_live());
        assert_eq!(playback.position(), 25.0);
        assert_eq!(playback.duration(), 60.0);

        live.set_seekable_ranges(Vec::new());
        assert_eq!(playback.position(), 0.0);
        assert_eq!(playback.duration(), 0.0);

        let vod = ready(SimulatedPipeline::vod(160.0));
        vod.set_current_time(125.0);
        let playback = loaded(&vod);
        assert!(!playback.is_live());
        assert_eq!(playback.position(), 125.0);
        assert_eq!(playback.duration(), 160.0);
    }

    #[test]
    fn test_queries_without_pipeline() {
        let playback = Playback::default();
        assert!(!playback.is_ready_to_seek());
        assert!(!playback.is_live());
        assert_eq!(playback.position(), 0.0);
        assert!(playback.seekable_time_ranges().is_empty());
        assert!(playback.current_date().is_none());

        // Seek without a pipeline parks the target
        playback.seek(5.0);
        assert_eq!(playback.pending_seek(), Some(5.0));
    }

    #[test]
    fn test_time_ranges_and_date() {
        let sim = ready(SimulatedPipeline::vod(60.0));
        sim.set_loaded_ranges(vec![TimeRange::new(0.0, 12.0)]);
        let date = Utc::now();
        sim.set_current_date(Some(date));
        let playback = loaded(&sim);

        assert_eq!(playback.seekable_time_ranges(), vec![TimeRange::new(0.0, 60.0)]);
        assert_eq!(playback.loaded_time_ranges(), vec![TimeRange::new(0.0, 12.0)]);
        assert_eq!(playback.current_date(), Some(date));
    }

    #[test]
    fn test_set_options_emits_update() {
        let playback = Playback::default();
        let count = Arc::new(AtomicI32::new(0));
        let c = Arc::clone(&count);
        playback.events().on(Event::DidUpdateOptions, Callback::new(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        }));

        playback.set_options(Attrs::new());
        assert_eq!(count.load(Ordering::SeqCst), 1);

        playback.set_options(Attrs::new().with(K_MIN_DVR_SIZE, 30.0));
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert_eq!(playback.min_dvr_size(), 30.0);
    }

    #[test]
    fn test_start_at_seeds_pending_seek() {
        let sim = Arc::new(SimulatedPipeline::vod(600.0));
        let playback = Playback::new(Attrs::new().with(K_START_AT, 30.0));
        playback.load(sim.clone());
        assert_eq!(playback.pending_seek(), Some(30.0));

        sim.set_status(PlayerStatus::ReadyToPlay);
        playback.handle_status_change();
        assert_eq!(sim.seek_calls(), vec![30.0]);
    }

    #[test]
    fn test_load_resets_pending_seek() {
        let first = Arc::new(SimulatedPipeline::vod(60.0));
        let playback = loaded(&first);
        playback.seek(20.0);
        assert_eq!(playback.pending_seek(), Some(20.0));

        let second = ready(SimulatedPipeline::vod(60.0));
        playback.load(second.clone());

        assert_eq!(playback.pending_seek(), None);
        assert_eq!(playback.last_dvr_availability(), None);
        assert!(second.seek_calls().is_empty());

        playback.unload();
        assert!(!playback.has_pipeline());
    }

    #[test]
    fn test_subtitle_selection() {
        let sim = ready(SimulatedPipeline::vod(60.0));
        let playback = loaded(&sim);
        assert!(playback.selected_subtitle().is_none());

        let eng = MediaOption::new("English", MediaOptionType::Subtitle, "eng");
        let por = MediaOption::new("Portuguese", MediaOptionType::Subtitle, "por");
        sim.set_subtitles(vec![eng.clone(), por.clone()]);
        assert_eq!(playback.selected_subtitle(), Some(eng));
        assert_eq!(playback.subtitles().len(), 2);

        let log = record(&playback);
        playback.set_selected_subtitle(playback.subtitles()[1].clone());

        let selected = payloads(&log, Event::SubtitleSelected);
        assert_eq!(selected.len(), 1);
        assert_eq!(MediaOption::from_attrs(&selected[0]), Some(por.clone()));
        assert_eq!(playback.selected_subtitle(), Some(por));
    }

    #[test]
    fn test_audio_selection() {
        let sim = ready(SimulatedPipeline::vod(60.0));
        let playback = loaded(&sim);
        assert!(playback.selected_audio_source().is_none());
        let log = record(&playback);

        let english = MediaOption::new("English", MediaOptionType::AudioSource, "eng");
        playback.set_selected_audio_source(english.clone());

        let selected = payloads(&log, Event::AudioSelected);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].get_str(P_MEDIA_OPTION), Some("English"));
        assert_eq!(playback.selected_audio_source(), Some(english));
    }

    #[test]
    fn test_mismatched_or_detached_selection_is_ignored() {
        let playback = Playback::default();
        let log = record(&playback);

        // No pipeline
        playback.set_selected_subtitle(MediaOption::new("English", MediaOptionType::Subtitle, "eng"));

        let sim = ready(SimulatedPipeline::vod(60.0));
        playback.load(sim.clone());
        // Audio track offered as subtitle
        playback.set_selected_subtitle(MediaOption::new("English", MediaOptionType::AudioSource, "eng"));

        assert!(log.lock().unwrap().is_empty());
        assert!(sim.selected_audio_source().is_none());
    }

    #[test]
    fn test_bounds_set_preferred_maximum_resolution() {
        let sim = ready(SimulatedPipeline::vod(60.0));
        let playback = loaded(&sim);

        playback.set_bounds(200.0, 200.0, 2.0);

        assert_eq!(sim.preferred_maximum_resolution(), Some((400.0, 400.0)));
    }

    #[test]
    fn test_bounds_applied_on_load() {
        let playback = Playback::default();
        playback.set_bounds(320.0, 180.0, 3.0);

        let sim = Arc::new(SimulatedPipeline::vod(60.0));
        playback.load(sim.clone());

        assert_eq!(sim.preferred_maximum_resolution(), Some((960.0, 540.0)));
        assert_eq!(playback.bounds().map(|b| b.pixel_size()), Some((960.0, 540.0)));
    }

    #[test]
    fn test_can_play() {
        assert!(Playback::can_play(&Attrs::new().with(K_SOURCE_URL, "http://clappr.io/highline.mp4")));
        assert!(!Playback::can_play(&Attrs::new().with(K_SOURCE_URL, "123123")));
    }
}
