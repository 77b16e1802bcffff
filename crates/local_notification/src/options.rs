//! Raw caller options and the normalized notification record.

use crate::error::NotificationError;
use crate::value::OptionValue;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Every option key the native layer understands.
///
/// The variant order is the order in which keys appear in the platform
/// defaults and in serialized bridge payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OptionKey {
    Icon,
    SmallIcon,
    Ongoing,
    AutoClear,
    Led,
    Text,
    Title,
    Sound,
    Badge,
    Id,
    Data,
    Every,
    At,
}

impl OptionKey {
    pub const ALL: [OptionKey; 13] = [
        OptionKey::Icon,
        OptionKey::SmallIcon,
        OptionKey::Ongoing,
        OptionKey::AutoClear,
        OptionKey::Led,
        OptionKey::Text,
        OptionKey::Title,
        OptionKey::Sound,
        OptionKey::Badge,
        OptionKey::Id,
        OptionKey::Data,
        OptionKey::Every,
        OptionKey::At,
    ];

    /// Wire name of the key
    pub const fn as_str(self) -> &'static str {
        match self {
            OptionKey::Icon => "icon",
            OptionKey::SmallIcon => "smallIcon",
            OptionKey::Ongoing => "ongoing",
            OptionKey::AutoClear => "autoClear",
            OptionKey::Led => "led",
            OptionKey::Text => "text",
            OptionKey::Title => "title",
            OptionKey::Sound => "sound",
            OptionKey::Badge => "badge",
            OptionKey::Id => "id",
            OptionKey::Data => "data",
            OptionKey::Every => "every",
            OptionKey::At => "at",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == name)
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options exactly as the caller supplied them.
///
/// Keys are free-form strings; a key mapped to [`OptionValue::Undefined`] is
/// still considered present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawOptions {
    entries: BTreeMap<CompactString, OptionValue>,
}

impl RawOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: &str, value: impl Into<OptionValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<OptionValue>) -> Option<OptionValue> {
        self.entries.insert(CompactString::new(key), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.entries.get(key)
    }

    /// Own-key presence, regardless of the value
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<OptionValue> {
        self.entries.remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Builds options from a JSON object
    pub fn from_json(value: Value) -> Result<Self, NotificationError> {
        match value {
            Value::Object(map) => Ok(map.into_iter().collect()),
            other => Err(NotificationError::InvalidOptions(format!(
                "expected a JSON object, got {}",
                other
            ))),
        }
    }

    /// Parses a JSON document holding either one options object or an array
    /// of them
    pub fn batch_from_json(value: Value) -> Result<Vec<Self>, NotificationError> {
        match value {
            Value::Array(items) => items.into_iter().map(Self::from_json).collect(),
            single => Ok(vec![Self::from_json(single)?]),
        }
    }
}

impl FromIterator<(String, Value)> for RawOptions {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (CompactString::from(k), OptionValue::from_json(v)))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RawOptions {
    type Item = (&'a CompactString, &'a OptionValue);
    type IntoIter = std::collections::btree_map::Iter<'a, CompactString, OptionValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Normalized options, keyed by the static [`OptionKey`] whitelist
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationOptions {
    values: BTreeMap<OptionKey, OptionValue>,
}

impl NotificationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: OptionKey) -> Option<&OptionValue> {
        self.values.get(&key)
    }

    pub fn set(&mut self, key: OptionKey, value: impl Into<OptionValue>) {
        self.values.insert(key, value.into());
    }

    pub fn contains_key(&self, key: OptionKey) -> bool {
        self.values.contains_key(&key)
    }

    pub fn keys(&self) -> impl Iterator<Item = OptionKey> + '_ {
        self.values.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (OptionKey, &OptionValue)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Notification id, if it is already numeric
    pub fn id(&self) -> Option<f64> {
        self.get(OptionKey::Id).and_then(OptionValue::as_f64)
    }

    /// Trigger time, if it is already converted to epoch seconds
    pub fn at(&self) -> Option<f64> {
        self.get(OptionKey::At).and_then(OptionValue::as_f64)
    }

    pub fn text(&self) -> Option<&str> {
        self.get(OptionKey::Text).and_then(OptionValue::as_str)
    }

    pub fn title(&self) -> Option<&str> {
        self.get(OptionKey::Title).and_then(OptionValue::as_str)
    }

    /// JSON object handed to the bridge. Undefined entries are left out.
    pub fn to_bridge_value(&self) -> Value {
        let map: Map<String, Value> = self
            .values
            .iter()
            .filter_map(|(key, value)| value.to_json().map(|v| (key.as_str().to_string(), v)))
            .collect();
        Value::Object(map)
    }
}
