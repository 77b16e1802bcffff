//! Serializable client configuration.

use crate::bridge::{Bridge, SERVICE_NAME};
use crate::client::LocalNotificationBuilder;
use crate::defaults::Platform;
use crate::error::NotificationError;
use crate::options::RawOptions;
use crate::LocalNotification;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

fn default_service() -> String {
    SERVICE_NAME.to_string()
}

/// Settings a [`LocalNotification`] client is built from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Target platform; detected from the build target when absent
    #[serde(default)]
    pub platform: Option<Platform>,
    /// Native service name
    #[serde(default = "default_service")]
    pub service: String,
    /// Overrides for the built-in option defaults
    #[serde(default)]
    pub defaults: BTreeMap<String, serde_json::Value>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            platform: None,
            service: default_service(),
            defaults: BTreeMap::new(),
        }
    }
}

impl ClientConfig {
    pub fn platform(&self) -> Platform {
        self.platform.unwrap_or_else(Platform::current)
    }

    pub fn default_overrides(&self) -> RawOptions {
        self.defaults.clone().into_iter().collect()
    }

    pub fn validate(&self) -> Result<(), NotificationError> {
        if self.service.trim().is_empty() {
            return Err(NotificationError::ConfigError(
                "service name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Client builder preloaded with these settings
    pub fn builder(&self, bridge: Arc<dyn Bridge>) -> LocalNotificationBuilder {
        LocalNotification::builder(bridge)
            .platform(self.platform())
            .service(&self.service)
            .default_overrides(self.default_overrides())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::RecordingBridge;
    use crate::options::OptionKey;
    use crate::value::OptionValue;
    use serde_json::json;

    #[test]
    fn test_config_from_json_with_defaults() {
        let config: ClientConfig = serde_json::from_value(json!({
            "platform": "android",
            "defaults": {"sound": "res://chime", "badge": 2}
        }))
        .unwrap();

        assert_eq!(config.platform(), Platform::Android);
        assert_eq!(config.service, SERVICE_NAME);
        assert!(config.validate().is_ok());

        let client = config.builder(Arc::new(RecordingBridge::new())).build();
        let defaults = client.get_defaults();
        assert_eq!(defaults.get(OptionKey::Sound), Some(&OptionValue::from("res://chime")));
        assert_eq!(defaults.get(OptionKey::Badge), Some(&OptionValue::Number(2.0)));
    }

    #[test]
    fn test_empty_service_is_rejected() {
        let config = ClientConfig {
            service: "  ".to_string(),
            ..ClientConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
