//! Fullscreen state machine.
//!
//! One controller, two strategies chosen at construction:
//!
//! - `ByApp`: the embedding app owns presentation. `set()` only mirrors the
//!   app's state (will -> flip -> did); `enter_fullscreen()` /
//!   `exit_fullscreen()` just ask the app via the user-request events.
//! - `ByPlayer`: the player presents itself through a `Presenter`.
//!   Enter: will -> flip -> present -> did -> user request. Exit mirrors it
//!   with `restore_to_parent()`.
//!
//! Events are triggered on the container `EventObject` the controller was
//! built with. The flag is atomic so listeners can read `is_fullscreen()`
//! while a transition is in progress; the presenter lock is only held around
//! the presenter call itself.
//!
//! Only one transition runs at a time: the check-and-flip is claimed with a
//! `compare_exchange` on a separate flag. A call made while another transition
//! is in flight (from another thread, or re-entrantly from a `will*`/`did*`
//! listener) is dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use log::{debug, warn};

use crate::entities::attrs::Attrs;
use crate::entities::keys::K_FULLSCREEN_BY_APP;

use super::event_bus::EventObject;
use super::events::InternalEvent;

/// Presentation surface used by the player-embedded strategy.
pub trait Presenter: Send {
    /// Move the player content into a fullscreen surface.
    fn present_fullscreen(&mut self);
    /// Put the player content back into its original parent.
    fn restore_to_parent(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FullscreenStrategy {
    /// Host app presents; the player follows
    ByApp,
    /// Player presents itself
    #[default]
    ByPlayer,
}

impl FullscreenStrategy {
    /// `fullscreenByApp: true` selects `ByApp`; anything else is `ByPlayer`.
    pub fn from_options(options: &Attrs) -> Self {
        if options.get_bool_or(K_FULLSCREEN_BY_APP, false) {
            Self::ByApp
        } else {
            Self::ByPlayer
        }
    }
}

pub struct FullscreenController {
    strategy: FullscreenStrategy,
    events: EventObject,
    is_fullscreen: AtomicBool,
    transitioning: AtomicBool,
    presenter: Mutex<Option<Box<dyn Presenter>>>,
}

/// Releases the transition claim on drop.
struct TransitionGuard<'a>(&'a AtomicBool);

impl Drop for TransitionGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for FullscreenController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FullscreenController")
            .field("strategy", &self.strategy)
            .field("is_fullscreen", &self.is_fullscreen())
            .field("has_presenter", &self.has_presenter())
            .finish()
    }
}

impl FullscreenController {
    pub fn new(strategy: FullscreenStrategy, events: EventObject) -> Self {
        Self {
            strategy,
            events,
            is_fullscreen: AtomicBool::new(false),
            transitioning: AtomicBool::new(false),
            presenter: Mutex::new(None),
        }
    }

    pub fn from_options(options: &Attrs, events: EventObject) -> Self {
        Self::new(FullscreenStrategy::from_options(options), events)
    }

    pub fn strategy(&self) -> FullscreenStrategy {
        self.strategy
    }

    pub fn is_fullscreen(&self) -> bool {
        self.is_fullscreen.load(Ordering::SeqCst)
    }

    pub fn set_presenter(&self, presenter: Option<Box<dyn Presenter>>) {
        *self.lock_presenter() = presenter;
    }

    pub fn has_presenter(&self) -> bool {
        self.lock_presenter().is_some()
    }

    fn lock_presenter(&self) -> MutexGuard<'_, Option<Box<dyn Presenter>>> {
        self.presenter.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn flip(&self, value: bool) {
        self.is_fullscreen.store(value, Ordering::SeqCst);
    }

    /// Claim the transition towards `target`. `None` when another transition
    /// is in flight or the state already is `target`.
    fn begin_transition(&self, target: bool) -> Option<TransitionGuard<'_>> {
        if self
            .transitioning
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Fullscreen transition in progress, dropping request for {}", target);
            return None;
        }
        let guard = TransitionGuard(&self.transitioning);
        if self.is_fullscreen() == target {
            return None;
        }
        Some(guard)
    }

    // ========== Transitions ==========

    /// Drive the state to `fullscreen`. No-op when already there.
    pub fn set(&self, fullscreen: bool) {
        if self.is_fullscreen() == fullscreen {
            return;
        }
        match self.strategy {
            FullscreenStrategy::ByApp => {
                let Some(_guard) = self.begin_transition(fullscreen) else {
                    return;
                };
                let (will, did) = if fullscreen {
                    (InternalEvent::WillEnterFullscreen, InternalEvent::DidEnterFullscreen)
                } else {
                    (InternalEvent::WillExitFullscreen, InternalEvent::DidExitFullscreen)
                };
                debug!("Fullscreen (by app): {}", fullscreen);
                self.events.trigger(will);
                self.flip(fullscreen);
                self.events.trigger(did);
            }
            FullscreenStrategy::ByPlayer => {
                if fullscreen {
                    self.enter_fullscreen();
                } else {
                    self.exit_fullscreen();
                }
            }
        }
    }

    pub fn enter_fullscreen(&self) {
        if self.is_fullscreen() {
            return;
        }
        match self.strategy {
            FullscreenStrategy::ByApp => {
                self.events.trigger(InternalEvent::UserRequestEnterInFullscreen);
            }
            FullscreenStrategy::ByPlayer => {
                if !self.has_presenter() {
                    warn!("Fullscreen requested without a presenter, ignoring");
                    return;
                }
                let Some(_guard) = self.begin_transition(true) else {
                    return;
                };
                debug!("Fullscreen (by player): entering");
                self.events.trigger(InternalEvent::WillEnterFullscreen);
                self.flip(true);
                if let Some(presenter) = self.lock_presenter().as_mut() {
                    presenter.present_fullscreen();
                }
                self.events.trigger(InternalEvent::DidEnterFullscreen);
                self.events.trigger(InternalEvent::UserRequestEnterInFullscreen);
            }
        }
    }

    pub fn exit_fullscreen(&self) {
        if !self.is_fullscreen() {
            return;
        }
        match self.strategy {
            FullscreenStrategy::ByApp => {
                self.events.trigger(InternalEvent::UserRequestExitFullscreen);
            }
            FullscreenStrategy::ByPlayer => {
                let Some(_guard) = self.begin_transition(false) else {
                    return;
                };
                debug!("Fullscreen (by player): exiting");
                self.events.trigger(InternalEvent::WillExitFullscreen);
                self.flip(false);
                if let Some(presenter) = self.lock_presenter().as_mut() {
                    presenter.restore_to_parent();
                }
                self.events.trigger(InternalEvent::DidExitFullscreen);
                self.events.trigger(InternalEvent::UserRequestExitFullscreen);
            }
        }
    }
}
