//! Per-object Pub/Sub event bus for decoupled component communication.
//!
//! Architecture:
//! - Every component (player, container, playback) owns an `EventObject`
//! - Listeners are registered *on* an object by event name and only fire when
//!   that same object triggers the event
//! - `listen_to()` registers on another object but records the subscription on
//!   the subscriber, so `stop_listening()` can undo everything it initiated
//!
//! Callback order: FIFO (first-registered, first-called) within one object.
//! The listener list is snapshotted at trigger time and the registry lock is
//! released before any callback runs, so callbacks may freely register,
//! remove or trigger on the same object.
//!
//! Clones of an `EventObject` are handles to the same registry and share its
//! identity.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use log::trace;
use uuid::Uuid;

use crate::entities::attrs::EventUserInfo;

/// Identity of an event-bearing object (reference identity, not value equality).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(Uuid);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle of a single registration, usable with `remove_listener()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(Uuid);

impl ListenerId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Shared callback. Two registrations are "the same callback" when they were
/// made from clones of the same `Callback` (pointer identity).
#[derive(Clone)]
pub struct Callback(Arc<dyn Fn(&EventUserInfo) + Send + Sync>);

impl Callback {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&EventUserInfo) + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn ptr_eq(&self, other: &Callback) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }

    fn call(&self, info: &EventUserInfo) {
        (self.0)(info)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback({:p})", Arc::as_ptr(&self.0))
    }
}

struct Listener {
    id: ListenerId,
    event: String,
    callback: Callback,
    once: bool,
}

/// Subscription this object holds on another object (created by `listen_to`).
struct Subscription {
    target: Weak<EventInner>,
    listener: ListenerId,
}

#[derive(Default)]
struct Registry {
    listeners: Vec<Listener>,
    subscriptions: Vec<Subscription>,
}

struct EventInner {
    id: ObjectId,
    registry: Mutex<Registry>,
}

impl EventInner {
    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn has_listener(&self, id: ListenerId) -> bool {
        self.lock().listeners.iter().any(|l| l.id == id)
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        let mut reg = self.lock();
        let before = reg.listeners.len();
        reg.listeners.retain(|l| l.id != id);
        reg.listeners.len() != before
    }
}

/// Event-bearing object: owns a listener registry and the list of
/// subscriptions it holds on other objects.
#[derive(Clone)]
pub struct EventObject {
    inner: Arc<EventInner>,
}

impl Default for EventObject {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reg = self.inner.lock();
        f.debug_struct("EventObject")
            .field("id", &self.inner.id)
            .field("listeners", &reg.listeners.len())
            .field("subscriptions", &reg.subscriptions.len())
            .finish()
    }
}

impl EventObject {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(EventInner {
                id: ObjectId(Uuid::new_v4()),
                registry: Mutex::new(Registry::default()),
            }),
        }
    }

    pub fn id(&self) -> ObjectId {
        self.inner.id
    }

    /// True when both handles refer to the same object.
    pub fn same_object(&self, other: &EventObject) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // ========== Own listeners ==========

    /// Register a persistent listener on this object.
    pub fn on(&self, event: impl AsRef<str>, callback: Callback) -> ListenerId {
        self.register(event.as_ref(), callback, false)
    }

    /// Register a listener that is removed right before its first invocation.
    pub fn once(&self, event: impl AsRef<str>, callback: Callback) -> ListenerId {
        self.register(event.as_ref(), callback, true)
    }

    fn register(&self, event: &str, callback: Callback, once: bool) -> ListenerId {
        let id = ListenerId::new();
        self.inner.lock().listeners.push(Listener {
            id,
            event: event.to_string(),
            callback,
            once,
        });
        trace!("{}: registered {} listener for '{}'", self.inner.id, if once { "once" } else { "persistent" }, event);
        id
    }

    /// Remove listeners for `event` on this object.
    ///
    /// With `Some(callback)` only registrations of that callback are removed,
    /// with `None` every listener of the event goes.
    pub fn off(&self, event: impl AsRef<str>, callback: Option<&Callback>) {
        let event = event.as_ref();
        let mut reg = self.inner.lock();
        reg.listeners.retain(|l| {
            if l.event != event {
                return true;
            }
            match callback {
                Some(cb) => !l.callback.ptr_eq(cb),
                None => false,
            }
        });
    }

    /// Remove a single registration. Returns false if it was already gone.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.inner.remove_listener(id)
    }

    // ========== Triggering ==========

    /// Trigger `event` with an empty payload.
    pub fn trigger(&self, event: impl AsRef<str>) {
        self.trigger_with(event, EventUserInfo::new());
    }

    /// Trigger `event`, invoking every matching listener in registration order.
    ///
    /// All listeners see the same payload. Panics from listeners propagate to
    /// the caller; the registry is not locked while they run.
    pub fn trigger_with(&self, event: impl AsRef<str>, info: EventUserInfo) {
        let event = event.as_ref();

        let snapshot: Vec<Callback> = {
            let mut reg = self.inner.lock();
            let matching: Vec<(Callback, bool)> = reg
                .listeners
                .iter()
                .filter(|l| l.event == event)
                .map(|l| (l.callback.clone(), l.once))
                .collect();
            // once-listeners leave the registry before any callback runs
            if matching.iter().any(|(_, once)| *once) {
                reg.listeners.retain(|l| !(l.once && l.event == event));
            }
            matching.into_iter().map(|(cb, _)| cb).collect()
        };

        trace!("{}: trigger '{}' -> {} listener(s)", self.inner.id, event, snapshot.len());

        for cb in &snapshot {
            cb.call(&info);
        }
    }

    // ========== Cross-object listening ==========

    /// Listen to `event` on `target`; the subscription is recorded on self.
    pub fn listen_to(&self, target: &EventObject, event: impl AsRef<str>, callback: Callback) -> ListenerId {
        let id = target.on(event.as_ref(), callback);
        self.record_subscription(target, id);
        id
    }

    /// Like `listen_to()`, but the listener fires at most once.
    pub fn listen_to_once(&self, target: &EventObject, event: impl AsRef<str>, callback: Callback) -> ListenerId {
        let id = target.once(event.as_ref(), callback);
        self.record_subscription(target, id);
        id
    }

    fn record_subscription(&self, target: &EventObject, listener: ListenerId) {
        self.prune_subscriptions();
        let mut reg = self.inner.lock();
        reg.subscriptions.push(Subscription {
            target: Arc::downgrade(&target.inner),
            listener,
        });
        trace!("{}: listening to {}", self.inner.id, target.inner.id);
    }

    /// Drop bookkeeping for targets that are gone and for listeners that no
    /// longer exist on their target (fired `listen_to_once`, removed by id).
    /// Targets are locked one at a time, never while holding our own lock.
    fn prune_subscriptions(&self) {
        let subscriptions: Vec<(Weak<EventInner>, ListenerId)> = self
            .inner
            .lock()
            .subscriptions
            .iter()
            .map(|s| (s.target.clone(), s.listener))
            .collect();
        let dead: Vec<ListenerId> = subscriptions
            .into_iter()
            .filter(|(target, id)| match target.upgrade() {
                Some(target) => !target.has_listener(*id),
                None => true,
            })
            .map(|(_, id)| id)
            .collect();
        if !dead.is_empty() {
            self.inner.lock().subscriptions.retain(|s| !dead.contains(&s.listener));
        }
    }

    /// Remove only the subscriptions self holds on `target`.
    pub fn stop_listening_to(&self, target: &EventObject) {
        let taken: Vec<Subscription> = {
            let mut reg = self.inner.lock();
            let (taken, kept): (Vec<Subscription>, Vec<Subscription>) = std::mem::take(&mut reg.subscriptions)
                .into_iter()
                .partition(|s| std::ptr::eq(s.target.as_ptr(), Arc::as_ptr(&target.inner)));
            reg.subscriptions = kept;
            taken
        };
        for sub in taken {
            target.inner.remove_listener(sub.listener);
        }
    }

    /// Remove every subscription created via `listen_to()` (on every target)
    /// and every listener registered on this object. Safe to call repeatedly.
    pub fn stop_listening(&self) {
        let subscriptions = {
            let mut reg = self.inner.lock();
            reg.listeners.clear();
            std::mem::take(&mut reg.subscriptions)
        };
        let count = subscriptions.len();
        // Targets are locked one at a time, never while holding our own lock
        for sub in subscriptions {
            if let Some(target) = sub.target.upgrade() {
                target.remove_listener(sub.listener);
            }
        }
        trace!("{}: stop_listening ({} subscription(s) dropped)", self.inner.id, count);
    }

    // ========== Utilities ==========

    /// Number of listeners registered on this object for `event`.
    pub fn listener_count(&self, event: impl AsRef<str>) -> usize {
        let event = event.as_ref();
        self.inner.lock().listeners.iter().filter(|l| l.event == event).count()
    }

    pub fn has_listeners(&self, event: impl AsRef<str>) -> bool {
        self.listener_count(event) > 0
    }

    /// Number of live subscriptions this object holds on others.
    pub fn subscription_count(&self) -> usize {
        self.prune_subscriptions();
        self.inner.lock().subscriptions.len()
    }
}
