//! Bridge-call wrapper around the native `exec` capability.
//!
//! The native side is reached through an opaque [`Bridge`]: it receives a
//! service name, an action, positional JSON arguments and an optional
//! callback. Everything here is about packaging those pieces; the actions
//! themselves are never validated on this side.

use compact_str::CompactString;
use dashmap::DashMap;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// Service name the native plugin is registered under
pub const SERVICE_NAME: &str = "LocalNotification";

/// Callback the native side invokes with its reply arguments
pub type BridgeCallback = Arc<dyn Fn(&[Value]) + Send + Sync>;

/// One call across the bridge
pub struct BridgeCall {
    pub service: CompactString,
    pub action: CompactString,
    pub args: Vec<Value>,
    pub callback: Option<BridgeCallback>,
}

impl fmt::Debug for BridgeCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeCall")
            .field("service", &self.service)
            .field("action", &self.action)
            .field("args", &self.args)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

/// The native `exec` capability
pub trait Bridge: Send + Sync {
    /// Hands the call to the native side. Must not block on the reply.
    fn exec(&self, call: BridgeCall);
}

/// Arguments as callers pass them to [`BridgeClient::exec`]
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ExecArgs {
    #[default]
    None,
    Single(Value),
    List(Vec<Value>),
}

impl ExecArgs {
    /// Positional argument list: lists pass through, a truthy single value
    /// is wrapped, and anything else becomes empty.
    pub fn into_positional(self) -> Vec<Value> {
        match self {
            ExecArgs::List(args) => args,
            ExecArgs::Single(value) if is_truthy(&value) => vec![value],
            ExecArgs::Single(_) | ExecArgs::None => Vec::new(),
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

impl From<Value> for ExecArgs {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => ExecArgs::List(items),
            other => ExecArgs::Single(other),
        }
    }
}

impl From<Option<Value>> for ExecArgs {
    fn from(value: Option<Value>) -> Self {
        value.map(ExecArgs::from).unwrap_or_default()
    }
}

impl From<Vec<Value>> for ExecArgs {
    fn from(values: Vec<Value>) -> Self {
        ExecArgs::List(values)
    }
}

impl From<Vec<f64>> for ExecArgs {
    fn from(values: Vec<f64>) -> Self {
        ExecArgs::List(values.into_iter().map(crate::value::number_to_json).collect())
    }
}

impl From<f64> for ExecArgs {
    fn from(value: f64) -> Self {
        ExecArgs::Single(crate::value::number_to_json(value))
    }
}

impl From<i64> for ExecArgs {
    fn from(value: i64) -> Self {
        ExecArgs::Single(Value::from(value))
    }
}

impl From<&str> for ExecArgs {
    fn from(value: &str) -> Self {
        ExecArgs::Single(Value::from(value))
    }
}

/// Wraps a reply callback for the bridge. `None` stays `None`.
pub fn create_callback_fn<F>(callback: Option<F>) -> Option<BridgeCallback>
where
    F: Fn(&[Value]) + Send + Sync + 'static,
{
    callback.map(|f| Arc::new(f) as BridgeCallback)
}

/// Wraps a reply callback so it runs bound to `scope`
pub fn create_scoped_callback_fn<S, F>(callback: Option<F>, scope: Arc<S>) -> Option<BridgeCallback>
where
    S: Send + Sync + 'static,
    F: Fn(&S, &[Value]) + Send + Sync + 'static,
{
    callback.map(|f| Arc::new(move |args: &[Value]| f(&scope, args)) as BridgeCallback)
}

/// Packages calls for one native service
#[derive(Clone)]
pub struct BridgeClient {
    bridge: Arc<dyn Bridge>,
    service: CompactString,
}

impl BridgeClient {
    pub fn new(bridge: Arc<dyn Bridge>) -> Self {
        Self {
            bridge,
            service: CompactString::new(SERVICE_NAME),
        }
    }

    pub fn with_service(mut self, service: &str) -> Self {
        self.service = CompactString::new(service);
        self
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Executes `action` on the native side
    pub fn exec(&self, action: &str, args: impl Into<ExecArgs>, callback: Option<BridgeCallback>) {
        let args = args.into().into_positional();
        debug!("🌉 exec {}.{} with {} args", self.service, action, args.len());

        self.bridge.exec(BridgeCall {
            service: self.service.clone(),
            action: CompactString::new(action),
            args,
            callback,
        });
    }
}

/// A bridge call as seen by [`RecordingBridge`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedCall {
    pub service: String,
    pub action: String,
    pub args: Vec<Value>,
    pub has_callback: bool,
}

/// In-process bridge that records every call.
///
/// Canned replies registered with [`RecordingBridge::reply_with`] are passed
/// to the callback of matching calls right away.
#[derive(Default)]
pub struct RecordingBridge {
    calls: Mutex<Vec<RecordedCall>>,
    replies: DashMap<String, Vec<Value>>,
}

impl RecordingBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replies to every future `action` call with `args`
    pub fn reply_with(&self, action: &str, args: Vec<Value>) {
        self.replies.insert(action.to_string(), args);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().clone()
    }

    /// Actions in call order
    pub fn actions(&self) -> Vec<String> {
        self.lock().iter().map(|call| call.action.clone()).collect()
    }

    /// Most recent call for `action`
    pub fn last_call(&self, action: &str) -> Option<RecordedCall> {
        self.lock().iter().rev().find(|call| call.action == action).cloned()
    }

    /// Removes and returns all recorded calls
    pub fn take(&self) -> Vec<RecordedCall> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<RecordedCall>> {
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Bridge for RecordingBridge {
    fn exec(&self, call: BridgeCall) {
        self.lock().push(RecordedCall {
            service: call.service.to_string(),
            action: call.action.to_string(),
            args: call.args,
            has_callback: call.callback.is_some(),
        });

        let reply = self.replies.get(call.action.as_str()).map(|r| r.value().clone());
        if let (Some(callback), Some(reply)) = (call.callback, reply) {
            callback(&reply);
        }
    }
}
