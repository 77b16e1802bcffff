//! # Event Router
//!
//! Maps event names to ordered listener lists and fans native events out to
//! them. Listeners run in registration order; each one is isolated, so an
//! error or panic in one listener never keeps the others from running.
//!
//! Dispatch works on a snapshot of the listener list taken before the first
//! listener runs. Listeners may therefore subscribe or unsubscribe (even for
//! the event being dispatched) without deadlocking; such changes apply from
//! the next dispatch on.

use crate::error::EventError;
use compact_str::CompactString;
use dashmap::DashMap;
use serde_json::Value;
use smallvec::SmallVec;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error};
use uuid::Uuid;

mod tests;

/// Events the native side is known to fire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationEvent {
    Schedule,
    Trigger,
    Click,
    Clear,
    Cancel,
    Update,
    ClearAll,
    CancelAll,
}

impl NotificationEvent {
    pub const ALL: [NotificationEvent; 8] = [
        NotificationEvent::Schedule,
        NotificationEvent::Trigger,
        NotificationEvent::Click,
        NotificationEvent::Clear,
        NotificationEvent::Cancel,
        NotificationEvent::Update,
        NotificationEvent::ClearAll,
        NotificationEvent::CancelAll,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            NotificationEvent::Schedule => "schedule",
            NotificationEvent::Trigger => "trigger",
            NotificationEvent::Click => "click",
            NotificationEvent::Clear => "clear",
            NotificationEvent::Cancel => "cancel",
            NotificationEvent::Update => "update",
            NotificationEvent::ClearAll => "clearall",
            NotificationEvent::CancelAll => "cancelall",
        }
    }
}

impl fmt::Display for NotificationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for NotificationEvent {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Trait for event listeners
pub trait EventHandler: Send + Sync {
    /// Handle one event with the positional arguments supplied by the bridge
    fn handle(&self, args: &[Value]) -> Result<(), EventError>;

    /// Get handler name for debugging
    fn handler_name(&self) -> &str;
}

/// Listener backed by a plain closure
struct FnHandler<F> {
    name: String,
    callback: F,
}

impl<F> EventHandler for FnHandler<F>
where
    F: Fn(&[Value]) -> Result<(), EventError> + Send + Sync + 'static,
{
    fn handle(&self, args: &[Value]) -> Result<(), EventError> {
        (self.callback)(args)
    }

    fn handler_name(&self) -> &str {
        &self.name
    }
}

/// Listener whose callback runs bound to a scope object
struct ScopedHandler<S, F> {
    name: String,
    scope: Arc<S>,
    callback: F,
}

impl<S, F> EventHandler for ScopedHandler<S, F>
where
    S: Send + Sync + 'static,
    F: Fn(&S, &[Value]) -> Result<(), EventError> + Send + Sync + 'static,
{
    fn handle(&self, args: &[Value]) -> Result<(), EventError> {
        (self.callback)(&self.scope, args)
    }

    fn handler_name(&self) -> &str {
        &self.name
    }
}

/// Handle returned on subscription, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(Uuid);

impl ListenerId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone)]
struct Listener {
    id: ListenerId,
    handler: Arc<dyn EventHandler>,
}

/// Statistics for event router monitoring
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventStats {
    pub events_fired: u64,
    pub listeners_invoked: u64,
    pub listener_failures: u64,
    pub total_listeners: usize,
}

/// Outcome of a single dispatch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Listeners that completed successfully
    pub delivered: usize,
    /// Listeners that returned an error or panicked
    pub failed: usize,
}

/// Listener registry and dispatcher
#[derive(Default)]
pub struct EventRouter {
    /// Listeners organized by event name, in registration order
    listeners: DashMap<CompactString, SmallVec<[Listener; 4]>>,
    events_fired: AtomicU64,
    listeners_invoked: AtomicU64,
    listener_failures: AtomicU64,
}

impl EventRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes a closure to `event`
    pub fn on<F>(&self, event: impl AsRef<str>, callback: F) -> ListenerId
    where
        F: Fn(&[Value]) -> Result<(), EventError> + Send + Sync + 'static,
    {
        let event = event.as_ref();
        let handler = FnHandler {
            name: format!("{}::listener", event),
            callback,
        };
        self.on_handler(event, Arc::new(handler))
    }

    /// Subscribes a callback that receives `scope` on every invocation
    pub fn on_scoped<S, F>(&self, event: impl AsRef<str>, scope: Arc<S>, callback: F) -> ListenerId
    where
        S: Send + Sync + 'static,
        F: Fn(&S, &[Value]) -> Result<(), EventError> + Send + Sync + 'static,
    {
        let event = event.as_ref();
        let handler = ScopedHandler {
            name: format!("{}::{}", event, std::any::type_name::<S>()),
            scope,
            callback,
        };
        self.on_handler(event, Arc::new(handler))
    }

    /// Subscribes a prebuilt handler
    pub fn on_handler(&self, event: impl AsRef<str>, handler: Arc<dyn EventHandler>) -> ListenerId {
        let event = event.as_ref();
        let id = ListenerId::new();

        self.listeners
            .entry(CompactString::new(event))
            .or_default()
            .push(Listener { id, handler });

        debug!("📝 Registered listener {} for '{}'", id, event);
        id
    }

    /// Removes the listener `id` from `event`. Returns whether it was found.
    pub fn un(&self, event: impl AsRef<str>, id: ListenerId) -> bool {
        let event = event.as_ref();

        let removed = match self.listeners.get_mut(event) {
            Some(mut listeners) => match listeners.iter().position(|l| l.id == id) {
                Some(index) => {
                    listeners.remove(index);
                    true
                }
                None => false,
            },
            None => false,
        };

        if removed {
            self.listeners.remove_if(event, |_, listeners| listeners.is_empty());
            debug!("🗑️ Removed listener {} from '{}'", id, event);
        }

        removed
    }

    /// Invokes every listener of `event` in registration order.
    ///
    /// Without listeners this is a no-op.
    pub fn fire_event(&self, event: impl AsRef<str>, args: &[Value]) -> DispatchReport {
        let event = event.as_ref();

        let snapshot = match self.listeners.get(event) {
            Some(listeners) => listeners.value().clone(),
            None => {
                debug!("No listeners for event: {}", event);
                return DispatchReport::default();
            }
        };

        self.events_fired.fetch_add(1, Ordering::Relaxed);
        debug!("📤 Firing '{}' to {} listeners", event, snapshot.len());

        let mut report = DispatchReport::default();
        for listener in snapshot.iter() {
            let outcome = catch_unwind(AssertUnwindSafe(|| listener.handler.handle(args)))
                .unwrap_or_else(|panic| Err(EventError::HandlerPanicked(panic_message(panic))));

            match outcome {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    error!(
                        "❌ Listener {} for '{}' failed: {}",
                        listener.handler.handler_name(),
                        event,
                        e
                    );
                    report.failed += 1;
                }
            }
        }

        self.listeners_invoked
            .fetch_add((report.delivered + report.failed) as u64, Ordering::Relaxed);
        self.listener_failures
            .fetch_add(report.failed as u64, Ordering::Relaxed);

        report
    }

    /// Number of listeners registered for `event`
    pub fn listener_count(&self, event: impl AsRef<str>) -> usize {
        self.listeners
            .get(event.as_ref())
            .map(|listeners| listeners.len())
            .unwrap_or(0)
    }

    pub fn has_listeners(&self, event: impl AsRef<str>) -> bool {
        self.listener_count(event) > 0
    }

    /// Get all event names with at least one listener
    pub fn registered_events(&self) -> Vec<String> {
        self.listeners.iter().map(|entry| entry.key().to_string()).collect()
    }

    /// Get current statistics
    pub fn stats(&self) -> EventStats {
        EventStats {
            events_fired: self.events_fired.load(Ordering::Relaxed),
            listeners_invoked: self.listeners_invoked.load(Ordering::Relaxed),
            listener_failures: self.listener_failures.load(Ordering::Relaxed),
            total_listeners: self.listeners.iter().map(|entry| entry.value().len()).sum(),
        }
    }
}

/// Extracts a readable message from a panic payload
fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
