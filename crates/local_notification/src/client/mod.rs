//! # Client Facade
//!
//! [`LocalNotification`] is the client context: it owns the platform
//! defaults, the listener registry and the bridge wrapper, and exposes the
//! plugin operations on top of them. Handles are cheap to clone and share
//! all state.

use crate::bridge::{Bridge, BridgeCallback, BridgeClient, ExecArgs};
use crate::defaults::{Defaults, Platform};
use crate::diagnostics::{DiagnosticSink, TracingSink};
use crate::error::EventError;
use crate::event::{DispatchReport, EventRouter, ListenerId};
use crate::normalizer::{convert_ids, Clock, Normalizer};
use crate::options::{NotificationOptions, RawOptions};
use crate::pump::{event_channel, EventPump, NativeEventSender};
use crate::value::OptionValue;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};


/// Builder for [`LocalNotification`]
pub struct LocalNotificationBuilder {
    bridge: Arc<dyn Bridge>,
    platform: Platform,
    service: Option<String>,
    diagnostics: Arc<dyn DiagnosticSink>,
    clock: Option<Clock>,
    overrides: RawOptions,
}

impl LocalNotificationBuilder {
    fn new(bridge: Arc<dyn Bridge>) -> Self {
        Self {
            bridge,
            platform: Platform::current(),
            service: None,
            diagnostics: Arc::new(TracingSink),
            clock: None,
            overrides: RawOptions::new(),
        }
    }

    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Native service name, `LocalNotification` unless set
    pub fn service(mut self, service: &str) -> Self {
        self.service = Some(service.to_string());
        self
    }

    pub fn diagnostics(mut self, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn clock(mut self, clock: Clock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Replaces built-in defaults. Applied once, when the client is built.
    pub fn default_overrides(mut self, overrides: RawOptions) -> Self {
        self.overrides = overrides;
        self
    }

    /// Builds the client and announces it to the native side with `deviceready`
    pub fn build(self) -> LocalNotification {
        let defaults = Defaults::for_platform(self.platform)
            .with_overrides(&self.overrides, self.diagnostics.as_ref());

        let mut normalizer = Normalizer::new(defaults).with_diagnostics(self.diagnostics);
        if let Some(clock) = self.clock {
            normalizer = normalizer.with_clock(clock);
        }

        let mut bridge = BridgeClient::new(self.bridge);
        if let Some(service) = &self.service {
            bridge = bridge.with_service(service);
        }

        let client = LocalNotification {
            inner: Arc::new(ClientInner {
                platform: self.platform,
                normalizer,
                router: Arc::new(EventRouter::new()),
                bridge,
            }),
        };

        client.exec("deviceready", ExecArgs::None, None);
        info!(
            "🔔 {} client ready for platform {}",
            client.inner.bridge.service(),
            client.inner.platform
        );

        client
    }
}

struct ClientInner {
    platform: Platform,
    normalizer: Normalizer,
    router: Arc<EventRouter>,
    bridge: BridgeClient,
}

/// Local notification client
#[derive(Clone)]
pub struct LocalNotification {
    inner: Arc<ClientInner>,
}

impl LocalNotification {
    pub fn builder(bridge: Arc<dyn Bridge>) -> LocalNotificationBuilder {
        LocalNotificationBuilder::new(bridge)
    }

    pub fn platform(&self) -> Platform {
        self.inner.platform
    }

    /// The defaults every notification is merged with
    pub fn get_defaults(&self) -> &Defaults {
        self.inner.normalizer.defaults()
    }

    /// Merges and converts `options` without sending them anywhere
    pub fn normalize(&self, options: RawOptions) -> NotificationOptions {
        self.inner.normalizer.normalize(options)
    }

    /// Runs `action` on the native service
    pub fn exec(&self, action: &str, args: impl Into<ExecArgs>, callback: Option<BridgeCallback>) {
        self.inner.bridge.exec(action, args, callback);
    }

    /// Schedules notifications.
    ///
    /// Platforms that require it ask for permission first and only schedule
    /// once it is granted, unless `skip_permission` is set.
    pub fn schedule(
        &self,
        notifications: Vec<RawOptions>,
        callback: Option<BridgeCallback>,
        skip_permission: bool,
    ) {
        let payload: Vec<Value> = notifications
            .into_iter()
            .map(|options| self.normalize(options).to_bridge_value())
            .collect();

        if skip_permission || !self.inner.platform.requires_permission() {
            self.exec("schedule", payload, callback);
            return;
        }

        let client = self.clone();
        self.register_permission(Some(Arc::new(move |args: &[Value]| {
            if args.first().is_some_and(is_granted) {
                client.exec("schedule", payload.clone(), callback.clone());
            } else {
                warn!(
                    "🚫 Notification permission denied, {} notifications not scheduled",
                    payload.len()
                );
            }
        }) as BridgeCallback));
    }

    /// Updates already scheduled notifications; only given keys change
    pub fn update(&self, notifications: Vec<RawOptions>, callback: Option<BridgeCallback>) {
        let payload: Vec<Value> = notifications
            .into_iter()
            .map(|options| self.inner.normalizer.prepare_update(options).to_bridge_value())
            .collect();

        self.exec("update", payload, callback);
    }

    pub fn clear<I, V>(&self, ids: I, callback: Option<BridgeCallback>)
    where
        I: IntoIterator<Item = V>,
        V: Into<OptionValue>,
    {
        self.exec("clear", convert_ids(ids), callback);
    }

    pub fn cancel<I, V>(&self, ids: I, callback: Option<BridgeCallback>)
    where
        I: IntoIterator<Item = V>,
        V: Into<OptionValue>,
    {
        self.exec("cancel", convert_ids(ids), callback);
    }

    pub fn clear_all(&self, callback: Option<BridgeCallback>) {
        self.exec("clearAll", ExecArgs::None, callback);
    }

    pub fn cancel_all(&self, callback: Option<BridgeCallback>) {
        self.exec("cancelAll", ExecArgs::None, callback);
    }

    pub fn is_present(&self, id: impl Into<OptionValue>, callback: Option<BridgeCallback>) {
        self.exec("isPresent", id_arg(id), callback);
    }

    pub fn is_scheduled(&self, id: impl Into<OptionValue>, callback: Option<BridgeCallback>) {
        self.exec("isScheduled", id_arg(id), callback);
    }

    pub fn is_triggered(&self, id: impl Into<OptionValue>, callback: Option<BridgeCallback>) {
        self.exec("isTriggered", id_arg(id), callback);
    }

    pub fn get_all_ids(&self, callback: Option<BridgeCallback>) {
        self.exec("getAllIds", ExecArgs::None, callback);
    }

    pub fn get_scheduled_ids(&self, callback: Option<BridgeCallback>) {
        self.exec("getScheduledIds", ExecArgs::None, callback);
    }

    pub fn get_triggered_ids(&self, callback: Option<BridgeCallback>) {
        self.exec("getTriggeredIds", ExecArgs::None, callback);
    }

    /// Fetches notifications by id; no ids means all of them
    pub fn get<I, V>(&self, ids: I, callback: Option<BridgeCallback>)
    where
        I: IntoIterator<Item = V>,
        V: Into<OptionValue>,
    {
        self.lookup(("getSingle", "getAll"), ids, callback);
    }

    pub fn get_scheduled<I, V>(&self, ids: I, callback: Option<BridgeCallback>)
    where
        I: IntoIterator<Item = V>,
        V: Into<OptionValue>,
    {
        self.lookup(("getSingleScheduled", "getScheduled"), ids, callback);
    }

    pub fn get_triggered<I, V>(&self, ids: I, callback: Option<BridgeCallback>)
    where
        I: IntoIterator<Item = V>,
        V: Into<OptionValue>,
    {
        self.lookup(("getSingleTriggered", "getTriggered"), ids, callback);
    }

    fn lookup<I, V>(&self, (single, many): (&str, &str), ids: I, callback: Option<BridgeCallback>)
    where
        I: IntoIterator<Item = V>,
        V: Into<OptionValue>,
    {
        let ids = convert_ids(ids);
        if ids.len() == 1 {
            self.exec(single, ids[0], callback);
        } else {
            self.exec(many, ids, callback);
        }
    }

    /// Reports whether notifications may be shown
    pub fn has_permission(&self, callback: Option<BridgeCallback>) {
        self.permission_request("hasPermission", callback);
    }

    /// Asks the user for permission to show notifications
    pub fn register_permission(&self, callback: Option<BridgeCallback>) {
        self.permission_request("registerPermission", callback);
    }

    fn permission_request(&self, action: &str, callback: Option<BridgeCallback>) {
        if self.inner.platform.requires_permission() {
            self.exec(action, ExecArgs::None, callback);
            return;
        }

        debug!("{} is implied on {}", action, self.inner.platform);
        if let Some(callback) = callback {
            callback(&[Value::Bool(true)]);
        }
    }

    /// Shared listener registry of this client
    pub fn router(&self) -> Arc<EventRouter> {
        self.inner.router.clone()
    }

    pub fn on<F>(&self, event: impl AsRef<str>, callback: F) -> ListenerId
    where
        F: Fn(&[Value]) -> Result<(), EventError> + Send + Sync + 'static,
    {
        self.inner.router.on(event, callback)
    }

    pub fn on_scoped<S, F>(&self, event: impl AsRef<str>, scope: Arc<S>, callback: F) -> ListenerId
    where
        S: Send + Sync + 'static,
        F: Fn(&S, &[Value]) -> Result<(), EventError> + Send + Sync + 'static,
    {
        self.inner.router.on_scoped(event, scope, callback)
    }

    pub fn un(&self, event: impl AsRef<str>, id: ListenerId) -> bool {
        self.inner.router.un(event, id)
    }

    pub fn fire_event(&self, event: impl AsRef<str>, args: &[Value]) -> DispatchReport {
        self.inner.router.fire_event(event, args)
    }

    /// Channel the native side uses to report events to this client
    pub fn event_channel(&self) -> (NativeEventSender, EventPump) {
        event_channel(self.router())
    }
}

/// Single id argument; falsy ids are sent as 0
fn id_arg(id: impl Into<OptionValue>) -> f64 {
    let id = id.into();
    if id.is_truthy() {
        id.to_number()
    } else {
        0.0
    }
}

fn is_granted(value: &Value) -> bool {
    match value {
        Value::Bool(granted) => *granted,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        _ => false,
    }
}
