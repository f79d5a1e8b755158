#![allow(dead_code)]

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sms_relay::adapters::queue::{MessageQueue, QueueError};
use sms_relay::api::{AppState, MgmtState};
use sms_relay::config::{
    DEFAULT_TIME_FORMAT, IngestSettings, LogFormat, LogLevel, QueueSettings, ServerConfig, Settings, TelemetryConfig,
};
use sms_relay::domain::credentials::Credentials;
use sms_relay::domain::event::Envelope;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

static INIT: Once = Once::new();

pub const USER: &str = "device";
pub const PASSWORD: &str = "pa:ss";
pub const SENTINEL: &str = "org.telegram.messenger";

pub fn setup_tracing() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "warn".into())
            .add_directive("sms_relay=debug".parse().unwrap())
            .add_directive("tower=warn".parse().unwrap())
            .add_directive("hyper=warn".parse().unwrap())
            .add_directive("reqwest=warn".parse().unwrap());

        tracing_subscriber::fmt().with_env_filter(filter).with_test_writer().init();
    });
}

/// What the fake queue should do with each send.
#[derive(Clone, Copy, Debug, Default)]
pub enum QueueBehavior {
    #[default]
    Accept,
    Fail,
    Hang,
}

/// In-memory queue that records every published message.
#[derive(Debug, Default)]
pub struct RecordingQueue {
    sent: Mutex<Vec<(String, String)>>,
    behavior: Mutex<QueueBehavior>,
}

impl RecordingQueue {
    pub fn with_behavior(behavior: QueueBehavior) -> Self {
        Self { sent: Mutex::default(), behavior: Mutex::new(behavior) }
    }

    pub fn set_behavior(&self, behavior: QueueBehavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    pub fn envelopes(&self) -> Vec<Envelope> {
        self.sent.lock().unwrap().iter().map(|(body, _)| serde_json::from_str(body).unwrap()).collect()
    }

    pub fn group_ids(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|(_, group)| group.clone()).collect()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl MessageQueue for RecordingQueue {
    async fn send(&self, body: String, group_id: &str) -> Result<String, QueueError> {
        let behavior = *self.behavior.lock().unwrap();
        match behavior {
            QueueBehavior::Accept => {
                let mut sent = self.sent.lock().unwrap();
                sent.push((body, group_id.to_string()));
                Ok(format!("msg-{}", sent.len()))
            }
            QueueBehavior::Fail => Err(QueueError::Request("AccessDenied".into())),
            QueueBehavior::Hang => std::future::pending().await,
        }
    }

    async fn ping(&self) -> Result<(), QueueError> {
        let behavior = *self.behavior.lock().unwrap();
        match behavior {
            QueueBehavior::Accept => Ok(()),
            QueueBehavior::Fail => Err(QueueError::Request("unreachable".into())),
            QueueBehavior::Hang => std::future::pending().await,
        }
    }
}

pub fn get_test_settings() -> Settings {
    Settings {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            mgmt_port: 0,
            request_timeout_secs: 30,
            max_body_bytes: 64 * 1024,
            shutdown_timeout_secs: 1,
        },
        credentials: Credentials::new(USER.to_string(), PASSWORD.to_string()),
        queue: QueueSettings {
            endpoint: "http://127.0.0.1:9324".to_string(),
            region: "test-region".to_string(),
            access_key: "ak".to_string(),
            secret_key: "sk".to_string(),
            queue_url: "http://127.0.0.1:9324/queue/sms.fifo".to_string(),
            message_group_id: "1".to_string(),
            publish_timeout: Duration::from_secs(5),
            ping_timeout: Duration::from_secs(2),
        },
        ingest: IngestSettings {
            display_format: time::format_description::parse_owned::<1>(DEFAULT_TIME_FORMAT).unwrap(),
            ignored_sender: SENTINEL.to_string(),
        },
        telemetry: TelemetryConfig { log_level: LogLevel::Debug, log_format: LogFormat::Text, otlp_endpoint: None },
    }
}

pub fn basic_auth(user: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{user}:{password}")))
}

pub fn valid_auth() -> String {
    basic_auth(USER, PASSWORD)
}

pub struct TestApp {
    pub server_url: String,
    pub mgmt_url: String,
    pub client: reqwest::Client,
    pub queue: Arc<RecordingQueue>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(get_test_settings(), RecordingQueue::default()).await
    }

    pub async fn spawn_with(settings: Settings, queue: RecordingQueue) -> Self {
        setup_tracing();

        let queue = Arc::new(queue);
        let server_config = settings.server.clone();
        let services = sms_relay::AppBuilder::new(settings).with_queue(queue.clone()).build().unwrap();

        let app = sms_relay::api::app_router(
            &server_config,
            AppState { auth_service: services.auth_service, ingest_service: services.ingest_service },
        );
        let mgmt = sms_relay::api::mgmt_router(MgmtState { health_service: services.health_service });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let server_url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await.unwrap();
        });

        let mgmt_listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mgmt_url = format!("http://{}", mgmt_listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(mgmt_listener, mgmt.into_make_service_with_connect_info::<SocketAddr>()).await.unwrap();
        });

        Self { server_url, mgmt_url, client: reqwest::Client::new(), queue }
    }

    pub async fn post_sms(&self, body: impl Into<String>) -> reqwest::Response {
        self.client
            .post(format!("{}/add-sms", self.server_url))
            .header("Authorization", valid_auth())
            .header("Content-Type", "application/json")
            .body(body.into())
            .send()
            .await
            .unwrap()
    }
}
