//! Seek coordinator - defers seeks requested before the pipeline is ready.
//!
//! A seek issued while the pipeline is still loading cannot be honored, so
//! the target is parked and replayed when readiness is signaled:
//! 1. Ready: the caller issues the seek right away
//! 2. Not ready: the target is remembered; a newer request overwrites it
//! 3. On ready: `take_if_ready()` hands back the parked target exactly once
//!
//! Only the most recent target survives; this is a single slot, not a queue.

/// Coordinator state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SeekState {
    #[default]
    Idle,
    PendingSeek(f64),
}

/// What the caller must do with a seek request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeekDecision {
    /// Issue the seek to this (caller-facing) target now
    Issue(f64),
    /// Parked until the pipeline becomes ready
    Deferred,
}

#[derive(Debug, Clone, Default)]
pub struct SeekCoordinator {
    state: SeekState,
}

impl SeekCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SeekState {
        self.state
    }

    /// Route a seek request.
    /// Any pending target is superseded: replaced when not ready, dropped
    /// when the new target is issued right away.
    pub fn request(&mut self, target: f64, ready: bool) -> SeekDecision {
        if ready {
            if let SeekState::PendingSeek(previous) = self.state {
                log::trace!("SeekCoordinator: seek to {} supersedes pending {}", target, previous);
            }
            self.state = SeekState::Idle;
            return SeekDecision::Issue(target);
        }
        if let SeekState::PendingSeek(previous) = self.state {
            log::trace!("SeekCoordinator: replacing pending seek {} with {}", previous, target);
        } else {
            log::trace!("SeekCoordinator: pipeline not ready, parking seek to {}", target);
        }
        self.state = SeekState::PendingSeek(target);
        SeekDecision::Deferred
    }

    /// Hand back the parked target if the pipeline is ready.
    /// Clears the pending state when returned.
    pub fn take_if_ready(&mut self, ready: bool) -> Option<f64> {
        let SeekState::PendingSeek(target) = self.state else {
            return None;
        };
        if !ready {
            return None;
        }
        self.state = SeekState::Idle;
        log::trace!("SeekCoordinator: flushing pending seek to {}", target);
        Some(target)
    }

    /// Pending target (if any)
    pub fn pending(&self) -> Option<f64> {
        match self.state {
            SeekState::PendingSeek(target) => Some(target),
            SeekState::Idle => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending().is_some()
    }

    /// Drop any pending target (source change)
    pub fn reset(&mut self) {
        if self.is_pending() {
            log::trace!("SeekCoordinator: cancelled pending seek");
        }
        self.state = SeekState::Idle;
    }
}
