//! Native event channel.
//!
//! The native side reports notification events (trigger, click, clear, ...)
//! out of band. It pushes them into a [`NativeEventSender`]; the matching
//! [`EventPump`] forwards them, one at a time and in arrival order, to the
//! [`EventRouter`].

use crate::error::NotificationError;
use crate::event::EventRouter;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// An event reported by the native side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NativeEvent {
    pub event: CompactString,
    #[serde(default)]
    pub args: Vec<Value>,
}

impl NativeEvent {
    pub fn new(event: impl AsRef<str>, args: Vec<Value>) -> Self {
        Self {
            event: CompactString::new(event.as_ref()),
            args,
        }
    }

    /// Parses `{"event": "...", "args": [...]}`
    pub fn from_json(raw: &str) -> Result<Self, NotificationError> {
        serde_json::from_str(raw).map_err(|e| NotificationError::InvalidEvent(e.to_string()))
    }
}

/// Creates a connected sender/pump pair for `router`
pub fn event_channel(router: Arc<EventRouter>) -> (NativeEventSender, EventPump) {
    let (tx, rx) = mpsc::unbounded_channel();
    (NativeEventSender { tx }, EventPump { rx, router })
}

/// Native-side handle for reporting events
#[derive(Debug, Clone)]
pub struct NativeEventSender {
    tx: mpsc::UnboundedSender<NativeEvent>,
}

impl NativeEventSender {
    pub fn send(&self, event: NativeEvent) -> Result<(), NotificationError> {
        self.tx.send(event).map_err(|_| NotificationError::ChannelClosed)
    }

    /// Shorthand for sending an event by name
    pub fn fire(&self, event: impl AsRef<str>, args: Vec<Value>) -> Result<(), NotificationError> {
        self.send(NativeEvent::new(event, args))
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Delivers queued native events to the router
pub struct EventPump {
    rx: mpsc::UnboundedReceiver<NativeEvent>,
    router: Arc<EventRouter>,
}

impl EventPump {
    /// Dispatches events until every sender has been dropped.
    ///
    /// Returns the number of events dispatched.
    pub async fn run(mut self) -> usize {
        info!("🚀 Native event pump started");
        let mut dispatched = 0;

        while let Some(event) = self.rx.recv().await {
            self.dispatch(event);
            dispatched += 1;
        }

        info!("🛑 Native event pump stopped after {} events", dispatched);
        dispatched
    }

    /// Dispatches whatever is queued right now without waiting
    pub fn drain_pending(&mut self) -> usize {
        let mut dispatched = 0;
        while let Ok(event) = self.rx.try_recv() {
            self.dispatch(event);
            dispatched += 1;
        }
        dispatched
    }

    fn dispatch(&self, event: NativeEvent) {
        let report = self.router.fire_event(&event.event, &event.args);
        debug!(
            "📬 Native event '{}' delivered to {} listeners ({} failed)",
            event.event, report.delivered, report.failed
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    #[test]
    fn test_native_event_parsing() {
        let event = NativeEvent::from_json(r#"{"event": "click", "args": [{"id": 1}, "foreground"]}"#)
            .unwrap();
        assert_eq!(event.event.as_str(), "click");
        assert_eq!(event.args, vec![json!({"id": 1}), json!("foreground")]);

        let bare = NativeEvent::from_json(r#"{"event": "clearall"}"#).unwrap();
        assert!(bare.args.is_empty());

        assert!(matches!(
            NativeEvent::from_json("not json"),
            Err(NotificationError::InvalidEvent(_))
        ));
    }

    #[tokio::test]
    async fn test_pump_delivers_in_arrival_order() {
        let router = Arc::new(EventRouter::new());
        let seen = Arc::new(Mutex::new(Vec::new()));

        for name in ["trigger", "click"] {
            let seen = seen.clone();
            router.on(name, move |args: &[Value]| {
                seen.lock().unwrap().push(format!("{}:{}", name, args[0]));
                Ok(())
            });
        }

        let (sender, pump) = event_channel(router.clone());
        let handle = tokio::spawn(pump.run());

        sender.fire("trigger", vec![json!(1)]).unwrap();
        sender.fire("click", vec![json!(1)]).unwrap();
        sender.fire("unknown", vec![]).unwrap();
        drop(sender);

        let dispatched = handle.await.unwrap();
        assert_eq!(dispatched, 3);
        assert_eq!(*seen.lock().unwrap(), vec!["trigger:1", "click:1"]);
    }

    #[test]
    fn test_drain_pending_and_closed_channel() {
        let router = Arc::new(EventRouter::new());
        let (sender, mut pump) = event_channel(router);

        sender.fire("clear", vec![json!(2)]).unwrap();
        sender.fire("clear", vec![json!(3)]).unwrap();
        assert_eq!(pump.drain_pending(), 2);
        assert_eq!(pump.drain_pending(), 0);

        drop(pump);
        assert!(sender.is_closed());
        assert!(matches!(
            sender.fire("clear", vec![]),
            Err(NotificationError::ChannelClosed)
        ));
    }
}
