//! Player container: the one object embedders talk to.
//!
//! **Architecture**: Player owns three parts and wires them with the event bus:
//! - `events`: container-level `EventObject` (what embedders subscribe to)
//! - `playback`: the adapter driving the media pipeline
//! - `fullscreen`: controller triggering on the container object
//!
//! Playback events are re-emitted on the container via `listen_to`, so a
//! single subscription point sees both playback and fullscreen traffic.
//! `destroy()` tears every subscription down; the player is inert afterwards.
//!
//! # Event flow
//!
//! ```text
//! pipeline -> Playback.events --listen_to--> Player.events <-- FullscreenController
//!                                                 |
//!                                             embedder
//! ```

use std::sync::Arc;

use log::{debug, info};

use crate::entities::attrs::Attrs;

use super::event_bus::{Callback, EventObject, ObjectId};
use super::events::Event;
use super::fullscreen::{FullscreenController, Presenter};
use super::pipeline::{MediaOption, MediaPipeline};
use super::playback::Playback;

pub struct Player {
    events: EventObject,
    playback: Playback,
    fullscreen: Arc<FullscreenController>,
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("id", &self.events.id())
            .field("playback", &self.playback)
            .field("fullscreen", &self.fullscreen)
            .finish()
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new(Attrs::new())
    }
}

impl Player {
    pub fn new(options: Attrs) -> Self {
        let events = EventObject::new();
        let playback = Playback::new(options.clone());
        let fullscreen = Arc::new(FullscreenController::from_options(&options, events.clone()));

        let player = Self {
            events,
            playback,
            fullscreen,
        };
        player.forward_playback_events();
        info!(
            "Player {} initialized (fullscreen: {:?})",
            player.events.id(),
            player.fullscreen.strategy()
        );
        player
    }

    /// Re-emit every playback event on the container object.
    fn forward_playback_events(&self) {
        for &event in Event::ALL {
            let container = self.events.clone();
            self.events.listen_to(
                self.playback.events(),
                event,
                Callback::new(move |info| container.trigger_with(event, info.clone())),
            );
        }
        debug!("Player {}: forwarding {} playback events", self.events.id(), Event::ALL.len());
    }

    pub fn id(&self) -> ObjectId {
        self.events.id()
    }

    /// Container event object (playback + fullscreen events).
    pub fn events(&self) -> &EventObject {
        &self.events
    }

    pub fn playback(&self) -> &Playback {
        &self.playback
    }

    pub fn fullscreen(&self) -> &Arc<FullscreenController> {
        &self.fullscreen
    }

    pub fn can_play(options: &Attrs) -> bool {
        Playback::can_play(options)
    }

    // ========== Options / source ==========

    pub fn options(&self) -> Attrs {
        self.playback.options()
    }

    pub fn set_options(&self, options: Attrs) {
        self.playback.set_options(options);
    }

    pub fn load(&self, pipeline: Arc<dyn MediaPipeline>) {
        self.playback.load(pipeline);
    }

    // ========== Transport ==========

    pub fn play(&self) {
        self.playback.play();
    }

    pub fn pause(&self) {
        self.playback.pause();
    }

    pub fn seek(&self, target: f64) {
        self.playback.seek(target);
    }

    pub fn seek_to_live_position(&self) {
        self.playback.seek_to_live_position();
    }

    pub fn position(&self) -> f64 {
        self.playback.position()
    }

    pub fn duration(&self) -> f64 {
        self.playback.duration()
    }

    pub fn set_bounds(&self, width: f64, height: f64, scale: f64) {
        self.playback.set_bounds(width, height, scale);
    }

    // ========== Tracks ==========

    pub fn subtitles(&self) -> Vec<MediaOption> {
        self.playback.subtitles()
    }

    pub fn audio_sources(&self) -> Vec<MediaOption> {
        self.playback.audio_sources()
    }

    pub fn selected_subtitle(&self) -> Option<MediaOption> {
        self.playback.selected_subtitle()
    }

    pub fn set_selected_subtitle(&self, option: MediaOption) {
        self.playback.set_selected_subtitle(option);
    }

    pub fn selected_audio_source(&self) -> Option<MediaOption> {
        self.playback.selected_audio_source()
    }

    pub fn set_selected_audio_source(&self, option: MediaOption) {
        self.playback.set_selected_audio_source(option);
    }

    // ========== Fullscreen ==========

    pub fn set_presenter(&self, presenter: Option<Box<dyn Presenter>>) {
        self.fullscreen.set_presenter(presenter);
    }

    pub fn set_fullscreen(&self, fullscreen: bool) {
        self.fullscreen.set(fullscreen);
    }

    pub fn enter_fullscreen(&self) {
        self.fullscreen.enter_fullscreen();
    }

    pub fn exit_fullscreen(&self) {
        self.fullscreen.exit_fullscreen();
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen.is_fullscreen()
    }

    // ========== Teardown ==========

    /// Drop all listeners and subscriptions and detach the pipeline. Idempotent.
    pub fn destroy(&self) {
        self.events.stop_listening();
        self.playback.events().stop_listening();
        self.playback.unload();
        info!("Player {} destroyed", self.events.id());
    }
}
