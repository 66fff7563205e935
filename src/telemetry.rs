use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TelemetryEvent {
    CheckClicked,
    RepeatCheckSameSession { count: u64 },
    ResultDisplayed { label: String },
    ErrorOccurred { message: String },
}

impl TelemetryEvent {
    pub fn name(&self) -> &'static str {
        match self {
            TelemetryEvent::CheckClicked => "check_clicked",
            TelemetryEvent::RepeatCheckSameSession { .. } => "repeat_check_same_session",
            TelemetryEvent::ResultDisplayed { .. } => "result_displayed",
            TelemetryEvent::ErrorOccurred { .. } => "error_occurred",
        }
    }

    pub fn data(&self) -> Option<Value> {
        match self {
            TelemetryEvent::CheckClicked => None,
            TelemetryEvent::RepeatCheckSameSession { count } => Some(json!({ "count": count })),
            TelemetryEvent::ResultDisplayed { label } => Some(json!({ "label": label })),
            TelemetryEvent::ErrorOccurred { message } => Some(json!({ "message": message })),
        }
    }
}

pub trait TelemetrySink: Send + Sync {
    fn track(&self, event: TelemetryEvent);
}

/// Used when no collector is configured.
pub struct NoopSink;

impl TelemetrySink for NoopSink {
    fn track(&self, event: TelemetryEvent) {
        debug!("[aichecking] telemetry disabled, dropping {}", event.name());
    }
}

#[derive(Clone, Debug)]
pub struct UmamiConfig {
    /// Collector endpoint, e.g. `https://cloud.umami.is/api/send`.
    pub endpoint: String,
    pub website_id: String,
    pub hostname: String,
}

/// Sends events to an Umami-compatible collector.
pub struct UmamiSink {
    client: reqwest::Client,
    config: UmamiConfig,
}

impl UmamiSink {
    pub fn new(config: UmamiConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("aichecking/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(10))
            .build()?;
        Ok(Self { client, config })
    }

    fn payload(&self, event: &TelemetryEvent) -> Value {
        let mut payload = json!({
            "website": self.config.website_id,
            "hostname": self.config.hostname,
            "url": "/",
            "name": event.name(),
        });
        if let (Some(data), Some(obj)) = (event.data(), payload.as_object_mut()) {
            obj.insert("data".to_string(), data);
        }
        json!({ "type": "event", "payload": payload })
    }
}

impl TelemetrySink for UmamiSink {
    fn track(&self, event: TelemetryEvent) {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(h) => h,
            Err(_) => {
                debug!("[aichecking] no runtime, dropping telemetry {}", event.name());
                return;
            }
        };
        let body = self.payload(&event);
        let client = self.client.clone();
        let endpoint = self.config.endpoint.clone();
        handle.spawn(async move {
            match client.post(&endpoint).json(&body).send().await {
                Ok(resp) if resp.status().is_success() => {
                    debug!("[aichecking] telemetry {} sent", event.name());
                }
                Ok(resp) => {
                    warn!(
                        "[aichecking] telemetry {} rejected, status: {}",
                        event.name(),
                        resp.status()
                    );
                }
                Err(e) => {
                    warn!("[aichecking] telemetry {} failed: {:?}", event.name(), e);
                }
            }
        });
    }
}

pub fn sink_from_config(config: Option<UmamiConfig>) -> Arc<dyn TelemetrySink> {
    match config {
        Some(config) => match UmamiSink::new(config) {
            Ok(sink) => Arc::new(sink),
            Err(e) => {
                warn!("[aichecking] telemetry collector unavailable: {:?}", e);
                Arc::new(NoopSink)
            }
        },
        None => Arc::new(NoopSink),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Records events in memory.
    #[derive(Default)]
    pub struct RecordingSink {
        events: Mutex<Vec<TelemetryEvent>>,
    }

    impl RecordingSink {
        pub fn events(&self) -> Vec<TelemetryEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    impl TelemetrySink for RecordingSink {
        fn track(&self, event: TelemetryEvent) {
            self.events.lock().unwrap().push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn umami(endpoint: String) -> UmamiConfig {
        UmamiConfig {
            endpoint,
            website_id: "site-123".to_string(),
            hostname: "aichecking.me".to_string(),
        }
    }

    #[test]
    fn test_event_names_and_data() {
        assert_eq!(TelemetryEvent::CheckClicked.name(), "check_clicked");
        assert_eq!(TelemetryEvent::CheckClicked.data(), None);
        assert_eq!(
            TelemetryEvent::RepeatCheckSameSession { count: 3 }.data(),
            Some(json!({"count": 3}))
        );
        assert_eq!(
            TelemetryEvent::ResultDisplayed {
                label: "Uncertain".into()
            }
            .name(),
            "result_displayed"
        );
        assert_eq!(
            TelemetryEvent::ErrorOccurred {
                message: "Analysis failed".into()
            }
            .data(),
            Some(json!({"message": "Analysis failed"}))
        );
    }

    #[test]
    fn test_payload_shape() {
        let sink = UmamiSink::new(umami("http://collector/api/send".into())).unwrap();
        let payload = sink.payload(&TelemetryEvent::ResultDisplayed {
            label: "AI-generated".into(),
        });
        assert_eq!(
            payload,
            json!({
                "type": "event",
                "payload": {
                    "website": "site-123",
                    "hostname": "aichecking.me",
                    "url": "/",
                    "name": "result_displayed",
                    "data": {"label": "AI-generated"}
                }
            })
        );

        let payload = sink.payload(&TelemetryEvent::CheckClicked);
        assert!(payload["payload"].get("data").is_none());
    }

    #[test]
    fn test_track_without_runtime_is_a_noop() {
        let sink = UmamiSink::new(umami("http://127.0.0.1:1/api/send".into())).unwrap();
        sink.track(TelemetryEvent::CheckClicked);
        NoopSink.track(TelemetryEvent::CheckClicked);
    }

    #[tokio::test]
    async fn test_events_reach_collector() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/send"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let sink = sink_from_config(Some(umami(format!("{}/api/send", server.uri()))));
        sink.track(TelemetryEvent::RepeatCheckSameSession { count: 2 });

        let mut received = Vec::new();
        for _ in 0..50 {
            received = server.received_requests().await.unwrap_or_default();
            if !received.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(received.len(), 1);
        let body: Value = serde_json::from_slice(&received[0].body).unwrap();
        assert_eq!(body["payload"]["name"], "repeat_check_same_session");
        assert_eq!(body["payload"]["data"]["count"], 2);
    }

    #[tokio::test]
    async fn test_unreachable_collector_does_not_panic() {
        let sink = sink_from_config(Some(umami("http://127.0.0.1:1/api/send".into())));
        sink.track(TelemetryEvent::ErrorOccurred {
            message: "boom".into(),
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}
