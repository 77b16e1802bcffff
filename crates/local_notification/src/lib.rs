//! # Local Notification
//!
//! Client-side layer of the `LocalNotification` native plugin. It prepares
//! notification options for the native side and routes native events back to
//! registered listeners.
//!
//! ## Architecture
//!
//! - **Normalizer**: merges caller options with the platform [`Defaults`],
//!   resolves key aliases and coerces values into bridge-safe types
//! - **EventRouter**: ordered listener registry with isolated dispatch
//! - **BridgeClient**: packages positional arguments and scoped callbacks for
//!   the injected [`Bridge`] capability
//! - **EventPump**: funnels out-of-band native events into the router
//! - **LocalNotification**: the client context that owns all of the above
//!
//! Nothing here is a process-wide singleton. Every client owns its defaults
//! and listener registry.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use local_notification::*;
//! use std::sync::Arc;
//!
//! let bridge = Arc::new(RecordingBridge::new());
//! let client = LocalNotification::builder(bridge.clone())
//!     .platform(Platform::Android)
//!     .build();
//!
//! client.on("click", |args| {
//!     println!("clicked: {:?}", args);
//!     Ok(())
//! });
//!
//! client.schedule(
//!     vec![RawOptions::new().with("id", 1).with("message", "Hello")],
//!     None,
//!     false,
//! );
//! ```

pub mod bridge;
pub mod client;
pub mod config;
pub mod defaults;
pub mod diagnostics;
pub mod error;
pub mod event;
pub mod normalizer;
pub mod options;
pub mod pump;
pub mod value;

// Re-exports for convenience
pub use bridge::{
    create_callback_fn, create_scoped_callback_fn, Bridge, BridgeCall, BridgeCallback,
    BridgeClient, ExecArgs, RecordedCall, RecordingBridge, SERVICE_NAME,
};
pub use client::{LocalNotification, LocalNotificationBuilder};
pub use config::ClientConfig;
pub use defaults::{Defaults, Platform};
pub use diagnostics::{CollectingSink, DiagnosticSink, TracingSink, Warning};
pub use error::{EventError, NotificationError};
pub use event::{DispatchReport, EventHandler, EventRouter, EventStats, ListenerId, NotificationEvent};
pub use normalizer::{convert_ids, get_value_for, Clock, Normalizer};
pub use options::{NotificationOptions, OptionKey, RawOptions};
pub use pump::{event_channel, EventPump, NativeEvent, NativeEventSender};
pub use value::OptionValue;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, NotificationError>;
