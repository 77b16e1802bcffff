//! # Option Normalizer
//!
//! Turns caller-supplied options into the canonical record the native side
//! expects. Normalization runs in two passes:
//!
//! 1. [`Normalizer::merge_with_defaults`] resolves key aliases, applies the
//!    ongoing/autoClear policy, fills every whitelisted key from the platform
//!    defaults and drops everything else.
//! 2. [`Normalizer::convert_properties`] coerces the merged values into
//!    bridge-safe primitives (numeric ids, epoch seconds, JSON strings).
//!
//! Neither pass can fail. Invalid input is replaced with a default and
//! reported to the configured [`DiagnosticSink`].

use crate::defaults::Defaults;
use crate::diagnostics::{DiagnosticSink, TracingSink, Warning};
use crate::options::{NotificationOptions, OptionKey, RawOptions};
use crate::value::OptionValue;
use chrono::{DateTime, Utc};
use compact_str::CompactString;
use std::sync::Arc;


/// Source of the current time, injectable for tests
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Alias groups; the first key is canonical and wins over the others
const AT_ALIASES: &[&str] = &["at", "firstAt", "date"];
const TEXT_ALIASES: &[&str] = &["text", "message"];
const DATA_ALIASES: &[&str] = &["data", "json"];
const AUTO_CLEAR_ALIASES: &[&str] = &["autoClear", "autoCancel"];

/// Returns the value of the first key in `keys` that is present in
/// `options`, even when that value is undefined.
pub fn get_value_for<'a>(options: &'a RawOptions, keys: &[&str]) -> Option<&'a OptionValue> {
    keys.iter().find_map(|key| options.get(key))
}

/// Coerces every id to a number, keeping order and length.
///
/// Non-numeric ids become NaN; they are not rejected here.
pub fn convert_ids<I, V>(ids: I) -> Vec<f64>
where
    I: IntoIterator<Item = V>,
    V: Into<OptionValue>,
{
    ids.into_iter().map(|id| id.into().to_number()).collect()
}

/// Copies the winning value of an alias group onto its canonical key.
///
/// The alias keys stay in place; they are not whitelisted and get reported
/// as unknown when the options are filtered.
fn resolve_alias(options: &mut RawOptions, group: &[&str]) {
    if let Some(value) = get_value_for(options, group).cloned() {
        options.insert(group[0], value);
    }
}

/// `Math.round`: halves round toward positive infinity
fn round_half_up(value: f64) -> f64 {
    let floor = value.floor();
    if value - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

/// Normalizes options against one platform's defaults
pub struct Normalizer {
    defaults: Defaults,
    diagnostics: Arc<dyn DiagnosticSink>,
    clock: Clock,
}

impl Normalizer {
    /// Creates a normalizer that logs warnings and uses the system clock
    pub fn new(defaults: Defaults) -> Self {
        Self {
            defaults,
            diagnostics: Arc::new(TracingSink),
            clock: Arc::new(Utc::now),
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    /// Full pipeline: merge, then convert
    pub fn normalize(&self, options: RawOptions) -> NotificationOptions {
        let mut merged = self.merge_with_defaults(options);
        self.convert_properties(&mut merged);
        merged
    }

    /// Merges caller options with the platform defaults.
    ///
    /// The result holds exactly the keys of the defaults. `data` and `sound`
    /// that the caller explicitly cleared stay undefined instead of falling
    /// back to the default.
    pub fn merge_with_defaults(&self, mut options: RawOptions) -> NotificationOptions {
        self.resolve_aliases(&mut options);

        // An ongoing notification cannot clear itself
        let ongoing = options.get("ongoing").is_some_and(OptionValue::is_truthy);
        let auto_clear = matches!(options.get("autoClear"), Some(OptionValue::Bool(true)));
        if ongoing && !auto_clear {
            options.insert("autoClear", false);
        }

        if options.get("at").map_or(true, OptionValue::is_nullish) {
            options.insert("at", (self.clock)());
        }

        let mut merged = NotificationOptions::new();
        for (key, default) in self.defaults.iter() {
            let value = match options.remove(key.as_str()) {
                Some(value) if !value.is_nullish() => value,
                Some(_) if matches!(key, OptionKey::Data | OptionKey::Sound) => OptionValue::Undefined,
                _ => default.clone(),
            };
            merged.set(key, value);
        }

        for name in options.keys() {
            self.diagnostics
                .warn(Warning::UnknownProperty(CompactString::new(name)));
        }

        merged
    }

    /// Coerces merged options into the types the native layer expects
    pub fn convert_properties(&self, options: &mut NotificationOptions) {
        self.convert_numeric(options, OptionKey::Id, Warning::InvalidId);

        for key in [OptionKey::Title, OptionKey::Text] {
            if let Some(value) = options.get(key).filter(|v| v.is_truthy()) {
                let text = value.to_js_string();
                options.set(key, text);
            }
        }

        self.convert_numeric(options, OptionKey::Badge, Warning::InvalidBadge);

        if let Some(at) = options.get(OptionKey::At).filter(|v| v.is_truthy()).cloned() {
            let mut millis = at.to_number();
            if millis.is_nan() {
                self.diagnostics.warn(Warning::InvalidTimestamp(at.to_js_string()));
                millis = (self.clock)().timestamp_millis() as f64;
            }
            options.set(OptionKey::At, round_half_up(millis / 1000.0));
        }

        let serialized = match options.get(OptionKey::Data) {
            Some(value) if value.is_structured() => value.to_json().map(|json| json.to_string()),
            _ => None,
        };
        if let Some(json) = serialized {
            options.set(OptionKey::Data, json);
        }
    }

    /// Prepares options for an update of an existing notification.
    ///
    /// Aliases are resolved and unknown keys dropped, but nothing is filled
    /// in from the defaults.
    pub fn prepare_update(&self, mut options: RawOptions) -> NotificationOptions {
        self.resolve_aliases(&mut options);

        let mut prepared = NotificationOptions::new();
        for (name, value) in options.iter() {
            match OptionKey::parse(name).filter(|key| self.defaults.contains(*key)) {
                Some(key) => prepared.set(key, value.clone()),
                None => self
                    .diagnostics
                    .warn(Warning::UnknownProperty(CompactString::new(name))),
            }
        }

        self.convert_properties(&mut prepared);
        prepared
    }

    fn resolve_aliases(&self, options: &mut RawOptions) {
        resolve_alias(options, AT_ALIASES);
        resolve_alias(options, TEXT_ALIASES);
        resolve_alias(options, DATA_ALIASES);

        if self.defaults.contains(OptionKey::AutoClear) {
            resolve_alias(options, AUTO_CLEAR_ALIASES);
        }
    }

    fn convert_numeric(
        &self,
        options: &mut NotificationOptions,
        key: OptionKey,
        warning: fn(String) -> Warning,
    ) {
        let Some(value) = options.get(key).filter(|v| v.is_truthy()).cloned() else {
            return;
        };

        if value.is_nan() {
            self.diagnostics.warn(warning(value.to_js_string()));
            let fallback = self
                .defaults
                .get(key)
                .cloned()
                .unwrap_or(OptionValue::Number(0.0));
            options.set(key, fallback);
        } else {
            options.set(key, value.to_number());
        }
    }
}
