//! Tests for listener registration and dispatch

#[cfg(test)]
mod tests {
    use crate::error::EventError;
    use crate::event::{DispatchReport, EventRouter, ListenerId, NotificationEvent};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    fn recorder() -> Arc<Mutex<Vec<String>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    #[test]
    fn test_fire_event_invokes_listeners_in_order() {
        let router = EventRouter::new();
        let calls = recorder();

        let first = calls.clone();
        router.on("click", move |args: &[Value]| {
            first.lock().unwrap().push(format!("first:{}", args[0]));
            Ok(())
        });

        let second = calls.clone();
        router.on("click", move |args: &[Value]| {
            second.lock().unwrap().push(format!("second:{}", args[0]));
            Ok(())
        });

        let report = router.fire_event("click", &[json!(42)]);

        assert_eq!(report, DispatchReport { delivered: 2, failed: 0 });
        assert_eq!(*calls.lock().unwrap(), vec!["first:42", "second:42"]);
    }

    #[test]
    fn test_fire_event_without_listeners_is_noop() {
        let router = EventRouter::new();
        let report = router.fire_event("missing", &[]);

        assert_eq!(report, DispatchReport::default());
        assert_eq!(router.stats().events_fired, 0);
    }

    #[test]
    fn test_listeners_only_see_their_event() {
        let router = EventRouter::new();
        let calls = recorder();

        let sink = calls.clone();
        router.on(NotificationEvent::Trigger, move |_: &[Value]| {
            sink.lock().unwrap().push("trigger".to_string());
            Ok(())
        });

        router.fire_event(NotificationEvent::Click, &[]);
        router.fire_event("trigger", &[]);

        assert_eq!(*calls.lock().unwrap(), vec!["trigger"]);
    }

    #[test]
    fn test_failing_listener_does_not_stop_dispatch() {
        let router = EventRouter::new();
        let calls = recorder();

        router.on("clear", |_: &[Value]| {
            Err(EventError::HandlerFailed("boom".to_string()))
        });
        router.on("clear", |_: &[Value]| -> Result<(), EventError> {
            panic!("listener exploded");
        });

        let sink = calls.clone();
        router.on("clear", move |_: &[Value]| {
            sink.lock().unwrap().push("survivor".to_string());
            Ok(())
        });

        let report = router.fire_event("clear", &[json!({"id": 1})]);

        assert_eq!(report, DispatchReport { delivered: 1, failed: 2 });
        assert_eq!(*calls.lock().unwrap(), vec!["survivor"]);

        let stats = router.stats();
        assert_eq!(stats.events_fired, 1);
        assert_eq!(stats.listeners_invoked, 3);
        assert_eq!(stats.listener_failures, 2);
    }

    #[test]
    fn test_scoped_listener_receives_its_scope() {
        struct Inbox {
            name: &'static str,
            received: Mutex<Vec<Value>>,
        }

        let router = EventRouter::new();
        let inbox = Arc::new(Inbox {
            name: "inbox",
            received: Mutex::new(Vec::new()),
        });

        router.on_scoped("schedule", inbox.clone(), |scope: &Inbox, args: &[Value]| {
            assert_eq!(scope.name, "inbox");
            scope.received.lock().unwrap().extend(args.iter().cloned());
            Ok(())
        });

        router.fire_event("schedule", &[json!({"id": 3}), json!("foreground")]);

        assert_eq!(
            *inbox.received.lock().unwrap(),
            vec![json!({"id": 3}), json!("foreground")]
        );
    }

    #[test]
    fn test_un_removes_only_the_given_listener() {
        let router = EventRouter::new();
        let calls = recorder();

        let a = calls.clone();
        let first = router.on("update", move |_: &[Value]| {
            a.lock().unwrap().push("a".to_string());
            Ok(())
        });
        let b = calls.clone();
        let second = router.on("update", move |_: &[Value]| {
            b.lock().unwrap().push("b".to_string());
            Ok(())
        });

        assert!(router.un("update", first));
        assert!(!router.un("update", first), "already removed");
        assert!(!router.un("click", second), "wrong event");

        router.fire_event("update", &[]);
        assert_eq!(*calls.lock().unwrap(), vec!["b"]);

        assert!(router.un("update", second));
        assert!(!router.has_listeners("update"));
        assert!(router.registered_events().is_empty());
    }

    #[test]
    fn test_listeners_may_mutate_registry_during_dispatch() {
        let router = Arc::new(EventRouter::new());
        let calls = recorder();
        let own_id: Arc<Mutex<Option<ListenerId>>> = Arc::new(Mutex::new(None));

        let registry = router.clone();
        let log = calls.clone();
        let slot = own_id.clone();
        let id = router.on("trigger", move |_: &[Value]| {
            log.lock().unwrap().push("once".to_string());

            // Unsubscribe itself and subscribe a replacement mid-dispatch
            if let Some(id) = *slot.lock().unwrap() {
                registry.un("trigger", id);
            }
            let late = log.clone();
            registry.on("trigger", move |_: &[Value]| {
                late.lock().unwrap().push("late".to_string());
                Ok(())
            });
            Ok(())
        });
        *own_id.lock().unwrap() = Some(id);

        let log = calls.clone();
        router.on("trigger", move |_: &[Value]| {
            log.lock().unwrap().push("steady".to_string());
            Ok(())
        });

        let report = router.fire_event("trigger", &[]);
        assert_eq!(report.delivered, 2);
        assert_eq!(*calls.lock().unwrap(), vec!["once", "steady"]);

        calls.lock().unwrap().clear();
        router.fire_event("trigger", &[]);
        assert_eq!(*calls.lock().unwrap(), vec!["steady", "late"]);
    }

    #[test]
    fn test_stats_track_listener_totals() {
        let router = EventRouter::new();
        router.on("click", |_: &[Value]| Ok(()));
        router.on("click", |_: &[Value]| Ok(()));
        router.on("clear", |_: &[Value]| Ok(()));

        assert_eq!(router.listener_count("click"), 2);
        assert_eq!(router.stats().total_listeners, 3);

        let mut events = router.registered_events();
        events.sort();
        assert_eq!(events, vec!["clear", "click"]);
    }
}
