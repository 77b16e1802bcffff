//! Platform identity and the per-platform option defaults.
//!
//! The defaults double as the whitelist of option keys: a key the platform
//! has no default for is never sent to the native side.

use crate::diagnostics::{DiagnosticSink, Warning};
use crate::error::NotificationError;
use crate::options::{OptionKey, RawOptions};
use crate::value::OptionValue;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Platform the native side runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Ios,
    Windows,
    Other,
}

impl Platform {
    /// Platform of the compilation target
    pub fn current() -> Self {
        if cfg!(target_os = "android") {
            Platform::Android
        } else if cfg!(target_os = "ios") {
            Platform::Ios
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Other
        }
    }

    /// Whether the platform understands icon, ongoing, autoClear and led
    pub fn supports_extended_options(self) -> bool {
        matches!(self, Platform::Android)
    }

    /// Whether scheduling must be preceded by a permission request
    pub fn requires_permission(self) -> bool {
        matches!(self, Platform::Ios)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Platform::Android => "android",
            Platform::Ios => "ios",
            Platform::Windows => "windows",
            Platform::Other => "other",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = NotificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "android" => Ok(Platform::Android),
            "ios" => Ok(Platform::Ios),
            "windows" => Ok(Platform::Windows),
            "other" => Ok(Platform::Other),
            other => Err(NotificationError::ConfigError(format!("Unknown platform: {}", other))),
        }
    }
}

/// Default option values for one platform, in declaration order
#[derive(Debug, Clone, PartialEq)]
pub struct Defaults {
    platform: Platform,
    entries: SmallVec<[(OptionKey, OptionValue); 13]>,
}

impl Defaults {
    /// Built-in defaults for `platform`
    pub fn for_platform(platform: Platform) -> Self {
        let mut entries: SmallVec<[(OptionKey, OptionValue); 13]> = SmallVec::new();

        if platform.supports_extended_options() {
            entries.push((OptionKey::Icon, OptionValue::from("res://ic_popup_reminder")));
            entries.push((OptionKey::SmallIcon, OptionValue::Undefined));
            entries.push((OptionKey::Ongoing, OptionValue::Bool(false)));
            entries.push((OptionKey::AutoClear, OptionValue::Bool(true)));
            entries.push((OptionKey::Led, OptionValue::from("FFFFFF")));
        }

        entries.push((OptionKey::Text, OptionValue::from("")));
        entries.push((OptionKey::Title, OptionValue::from("")));
        entries.push((OptionKey::Sound, OptionValue::from("res://platform_default")));
        entries.push((OptionKey::Badge, OptionValue::Number(0.0)));
        entries.push((OptionKey::Id, OptionValue::Number(0.0)));
        entries.push((OptionKey::Data, OptionValue::Undefined));
        entries.push((OptionKey::Every, OptionValue::Undefined));
        entries.push((OptionKey::At, OptionValue::Undefined));

        Self { platform, entries }
    }

    /// Replaces built-in defaults with configured ones.
    ///
    /// Keys the platform does not know are reported and ignored. `id` and
    /// `badge` are coerced to numbers; an override that is not a number is
    /// reported and the built-in default stays.
    pub fn with_overrides(mut self, overrides: &RawOptions, sink: &dyn DiagnosticSink) -> Self {
        for (name, value) in overrides.iter() {
            let slot = OptionKey::parse(name)
                .and_then(|key| self.entries.iter_mut().find(|(k, _)| *k == key));

            let Some((key, current)) = slot else {
                sink.warn(Warning::UnknownDefault(CompactString::new(name)));
                continue;
            };

            let value = match key {
                OptionKey::Id | OptionKey::Badge => {
                    let number = value.to_number();
                    if number.is_nan() {
                        sink.warn(Warning::InvalidDefault(
                            CompactString::new(name),
                            value.to_js_string(),
                        ));
                        continue;
                    }
                    OptionValue::Number(number)
                }
                _ => value.clone(),
            };

            debug!("🔧 Default for {} set to {}", key, value);
            *current = value;
        }
        self
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn get(&self, key: OptionKey) -> Option<&OptionValue> {
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// Whether `key` is on the whitelist
    pub fn contains(&self, key: OptionKey) -> bool {
        self.entries.iter().any(|(k, _)| *k == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = OptionKey> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (OptionKey, &OptionValue)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingSink;

    #[test]
    fn test_android_defaults_have_extended_keys() {
        let defaults = Defaults::for_platform(Platform::Android);
        assert_eq!(defaults.len(), 13);
        assert!(defaults.contains(OptionKey::Ongoing));
        assert_eq!(defaults.get(OptionKey::AutoClear), Some(&OptionValue::Bool(true)));
        assert_eq!(defaults.get(OptionKey::Led), Some(&OptionValue::from("FFFFFF")));
    }

    #[test]
    fn test_ios_defaults_are_the_common_subset() {
        let defaults = Defaults::for_platform(Platform::Ios);
        let keys: Vec<_> = defaults.keys().collect();
        assert_eq!(
            keys,
            vec![
                OptionKey::Text,
                OptionKey::Title,
                OptionKey::Sound,
                OptionKey::Badge,
                OptionKey::Id,
                OptionKey::Data,
                OptionKey::Every,
                OptionKey::At,
            ]
        );
        assert!(!defaults.contains(OptionKey::Icon));
    }

    #[test]
    fn test_overrides_replace_known_keys_and_warn_on_unknown() {
        let sink = CollectingSink::new();
        let overrides = RawOptions::new()
            .with("sound", "res://chime")
            .with("led", "FF0000")
            .with("vibrate", true);

        let defaults = Defaults::for_platform(Platform::Ios).with_overrides(&overrides, &sink);

        assert_eq!(defaults.get(OptionKey::Sound), Some(&OptionValue::from("res://chime")));
        assert!(!defaults.contains(OptionKey::Led));
        assert_eq!(
            sink.warnings(),
            vec![
                Warning::UnknownDefault(CompactString::new("led")),
                Warning::UnknownDefault(CompactString::new("vibrate")),
            ]
        );
    }

    #[test]
    fn test_numeric_overrides_are_coerced_or_rejected() {
        let sink = CollectingSink::new();
        let overrides = RawOptions::new()
            .with("badge", "lots")
            .with("id", "7")
            .with("title", "Reminder");

        let defaults = Defaults::for_platform(Platform::Android).with_overrides(&overrides, &sink);

        assert_eq!(defaults.get(OptionKey::Badge), Some(&OptionValue::Number(0.0)));
        assert_eq!(defaults.get(OptionKey::Id), Some(&OptionValue::Number(7.0)));
        assert_eq!(defaults.get(OptionKey::Title), Some(&OptionValue::from("Reminder")));
        assert_eq!(
            sink.warnings(),
            vec![Warning::InvalidDefault(CompactString::new("badge"), "lots".to_string())]
        );
    }

    #[test]
    fn test_platform_parsing() {
        assert_eq!("Android".parse::<Platform>().unwrap(), Platform::Android);
        assert_eq!("ios".parse::<Platform>().unwrap(), Platform::Ios);
        assert!("symbian".parse::<Platform>().is_err());
        assert!(Platform::Ios.requires_permission());
        assert!(!Platform::Windows.supports_extended_options());
    }
}
