//! Main application logic.
//!
//! The `Application` owns a notification client wired to a recording bridge,
//! so every command reports exactly what would cross to the native side.

use crate::cli::CliCommand;
use crate::config::AppConfig;
use anyhow::{anyhow, Context};
use local_notification::{
    CollectingSink, LocalNotification, NativeEvent, NotificationEvent, RawOptions, RecordingBridge,
};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

pub struct Application {
    client: LocalNotification,
    bridge: Arc<RecordingBridge>,
    diagnostics: Arc<CollectingSink>,
}

impl Application {
    /// Validates `config` and builds the client it describes.
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        config
            .validate()
            .map_err(|e| anyhow!("Configuration validation failed: {e}"))?;

        let bridge = Arc::new(RecordingBridge::new());
        bridge.reply_with("registerPermission", vec![Value::Bool(true)]);
        bridge.reply_with("hasPermission", vec![Value::Bool(true)]);

        let diagnostics = Arc::new(CollectingSink::new());
        let client = config
            .notification
            .builder(bridge.clone())
            .diagnostics(diagnostics.clone())
            .build();

        info!(
            "✅ Client configured for {} with {} default keys",
            client.platform(),
            client.get_defaults().len()
        );

        Ok(Self {
            client,
            bridge,
            diagnostics,
        })
    }

    /// Runs `command` and returns its JSON report
    pub async fn run(self, command: &CliCommand) -> anyhow::Result<Value> {
        match command {
            CliCommand::Normalize { input } => self.normalize(input).await,
            CliCommand::Replay { input } => self.replay(input).await,
        }
    }

    async fn normalize(&self, input: &Path) -> anyhow::Result<Value> {
        let content = read_input(input).await?;
        let document: Value = serde_json::from_str(&content)
            .with_context(|| format!("{} is not valid JSON", input.display()))?;
        let batch = RawOptions::batch_from_json(document)?;

        info!("🧾 Scheduling {} notifications from {}", batch.len(), input.display());
        self.client.schedule(batch, None, false);

        let calls = serde_json::to_value(self.bridge.take())?;
        Ok(json!({
            "platform": self.client.platform().as_str(),
            "calls": calls,
            "warnings": self.drain_warnings(),
        }))
    }

    async fn replay(&self, input: &Path) -> anyhow::Result<Value> {
        let content = read_input(input).await?;

        for event in NotificationEvent::ALL {
            self.client.on(event, move |args: &[Value]| {
                let payload = Value::Array(args.to_vec());
                info!("🔔 {} {}", event, payload);
                Ok(())
            });
        }

        let (sender, pump) = self.client.event_channel();
        let pump_handle = tokio::spawn(pump.run());

        let mut skipped = 0;
        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match NativeEvent::from_json(line) {
                Ok(event) => sender.send(event)?,
                Err(e) => {
                    warn!("⚠️ Skipping line {}: {}", index + 1, e);
                    skipped += 1;
                }
            }
        }
        drop(sender);

        let dispatched = pump_handle.await?;
        let stats = self.client.router().stats();
        info!("📊 Replayed {} events ({} skipped)", dispatched, skipped);

        Ok(json!({
            "dispatched": dispatched,
            "skipped": skipped,
            "events_fired": stats.events_fired,
            "listeners_invoked": stats.listeners_invoked,
            "listener_failures": stats.listener_failures,
        }))
    }

    /// Logs and returns the warnings collected so far
    fn drain_warnings(&self) -> Vec<String> {
        self.diagnostics
            .take()
            .into_iter()
            .map(|warning| {
                warn!("⚠️ {}", warning);
                warning.to_string()
            })
            .collect()
    }
}

async fn read_input(path: &Path) -> anyhow::Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use local_notification::{ClientConfig, Platform};
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    fn app_for(platform: Platform) -> Application {
        let config = AppConfig {
            notification: ClientConfig {
                platform: Some(platform),
                ..ClientConfig::default()
            },
            ..AppConfig::default()
        };
        Application::new(config).unwrap()
    }

    fn input_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn actions(report: &Value) -> Vec<&str> {
        report["calls"]
            .as_array()
            .unwrap()
            .iter()
            .map(|call| call["action"].as_str().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_normalize_reports_bridge_calls() {
        let file = input_file(r#"[{"id": "5", "message": "Hi", "foo": 1}, {"id": 6}]"#);
        let command = CliCommand::Normalize {
            input: file.path().to_path_buf(),
        };

        let report = app_for(Platform::Android).run(&command).await.unwrap();

        assert_eq!(report["platform"], json!("android"));
        assert_eq!(actions(&report), vec!["deviceready", "schedule"]);

        let scheduled = &report["calls"][1]["args"];
        assert_eq!(scheduled[0]["id"], json!(5));
        assert_eq!(scheduled[0]["text"], json!("Hi"));
        assert_eq!(scheduled[1]["id"], json!(6));
        assert_eq!(
            report["warnings"],
            json!(["Unknown property: foo", "Unknown property: message"])
        );
    }

    #[tokio::test]
    async fn test_normalize_on_ios_asks_for_permission() {
        let file = input_file(r#"{"id": 1, "title": "Reminder"}"#);
        let command = CliCommand::Normalize {
            input: file.path().to_path_buf(),
        };

        let report = app_for(Platform::Ios).run(&command).await.unwrap();

        assert_eq!(
            actions(&report),
            vec!["deviceready", "registerPermission", "schedule"]
        );
    }

    #[tokio::test]
    async fn test_normalize_rejects_non_object_input() {
        let file = input_file("42");
        let command = CliCommand::Normalize {
            input: file.path().to_path_buf(),
        };

        assert!(app_for(Platform::Android).run(&command).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_input_is_an_error() {
        let command = CliCommand::Replay {
            input: PathBuf::from("/nonexistent/events.ndjson"),
        };

        assert!(app_for(Platform::Android).run(&command).await.is_err());
    }

    #[tokio::test]
    async fn test_replay_reports_dispatch_stats() {
        let file = input_file(
            "{\"event\": \"trigger\", \"args\": [{\"id\": 1}]}\n\
             \n\
             not an event\n\
             {\"event\": \"click\", \"args\": [{\"id\": 1}, \"foreground\"]}\n\
             {\"event\": \"custom\"}\n",
        );
        let command = CliCommand::Replay {
            input: file.path().to_path_buf(),
        };

        let report = app_for(Platform::Android).run(&command).await.unwrap();

        assert_eq!(report["dispatched"], json!(3));
        assert_eq!(report["skipped"], json!(1));
        assert_eq!(report["events_fired"], json!(2));
        assert_eq!(report["listeners_invoked"], json!(2));
        assert_eq!(report["listener_failures"], json!(0));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = AppConfig::default();
        config.logging.level = "loud".to_string();

        assert!(Application::new(config).is_err());
    }
}
