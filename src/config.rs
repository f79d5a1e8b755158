use crate::domain::credentials::Credentials;
use clap::{Args, Parser, ValueEnum};
use std::time::Duration;
use thiserror::Error;
use time::format_description::OwnedFormatItem;

pub const DEFAULT_TIME_FORMAT: &str = "[day] [month repr:short] [year] [hour]:[minute]:[second] UTC";

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    #[command(flatten)]
    pub server: ServerConfig,

    #[command(flatten)]
    pub auth: AuthConfig,

    #[command(flatten)]
    pub queue: QueueConfig,

    #[command(flatten)]
    pub ingest: IngestConfig,

    #[command(flatten)]
    pub telemetry: TelemetryConfig,
}

#[derive(Clone, Debug, Args)]
pub struct ServerConfig {
    /// Host to listen on
    #[arg(long = "listen-addr", env = "LISTEN_ADDR", default_value = "localhost")]
    pub host: String,

    /// Port to listen on
    #[arg(long = "listen-port", env = "LISTEN_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Port for the management (health) listener
    #[arg(long, env = "MGMT_PORT", default_value_t = 8081)]
    pub mgmt_port: u16,

    /// Upper bound on handling a single request, body I/O and publish included
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Maximum accepted request body size in bytes
    #[arg(long, env = "MAX_BODY_BYTES", default_value_t = 2 * 1024 * 1024)]
    pub max_body_bytes: usize,

    /// How long to wait for in-flight requests on shutdown
    #[arg(long, env = "SHUTDOWN_TIMEOUT_SECS", default_value_t = 10)]
    pub shutdown_timeout_secs: u64,
}

#[derive(Clone, Debug, Args)]
pub struct AuthConfig {
    /// User expected in the Basic credentials
    #[arg(long = "http-user", env = "HTTP_USER")]
    pub user: Option<String>,

    /// Password expected in the Basic credentials
    #[arg(long = "http-password", env = "HTTP_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct QueueConfig {
    /// SQS-compatible API endpoint
    #[arg(long = "sqs-endpoint", env = "SQS_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Queue region
    #[arg(long = "sqs-region", env = "SQS_REGION")]
    pub region: Option<String>,

    /// Static access key id
    #[arg(long = "sqs-access-key", env = "SQS_ACCESS_KEY")]
    pub access_key: Option<String>,

    /// Static secret access key
    #[arg(long = "sqs-secret-key", env = "SQS_SECRET_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,

    /// URL of the destination FIFO queue
    #[arg(long = "sqs-queue-url", env = "SQS_QUEUE_URL")]
    pub queue_url: Option<String>,

    /// Message group id attached to every publish; one group means one ordered stream
    #[arg(long = "sqs-message-group-id", env = "SQS_MESSAGE_GROUP_ID", default_value = "1")]
    pub message_group_id: String,

    /// Deadline for a single publish call
    #[arg(long = "sqs-publish-timeout-secs", env = "SQS_PUBLISH_TIMEOUT_SECS", default_value_t = 10)]
    pub publish_timeout_secs: u64,

    /// Deadline for the readiness probe's queue ping
    #[arg(long = "sqs-ping-timeout-secs", env = "SQS_PING_TIMEOUT_SECS", default_value_t = 5)]
    pub ping_timeout_secs: u64,
}

#[derive(Clone, Debug, Args)]
pub struct IngestConfig {
    /// `time` format description used for `printable_date_time`
    #[arg(long, env = "TIME_FORMAT", default_value = DEFAULT_TIME_FORMAT)]
    pub time_format: String,

    /// Items whose `tel` equals this value are dropped before publishing
    #[arg(long, env = "IGNORED_SENDER", default_value = "org.telegram.messenger")]
    pub ignored_sender: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    #[value(alias = "warning")]
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Debug, Args)]
pub struct TelemetryConfig {
    /// Diagnostic verbosity
    #[arg(long, env = "LOG_LEVEL", value_enum, ignore_case = true, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, ignore_case = true, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// OTLP gRPC endpoint; traces and metrics are exported only when set
    #[arg(long, env = "OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

/// Every problem found by [`Config::validate`].
#[derive(Error, Debug)]
#[error("{}", describe(.missing, .time_format.as_ref()))]
pub struct ConfigError {
    /// Required settings that are absent or empty, in declaration order.
    pub missing: Vec<&'static str>,
    pub time_format: Option<time::error::InvalidFormatDescription>,
}

fn describe(missing: &[&str], time_format: Option<&time::error::InvalidFormatDescription>) -> String {
    let mut problems = Vec::new();
    if !missing.is_empty() {
        problems.push(format!("missing required settings: {}", missing.join(", ")));
    }
    if let Some(e) = time_format {
        problems.push(format!("invalid TIME_FORMAT: {e}"));
    }
    problems.join("; ")
}

/// Connection settings for the queue once every required value is known.
#[derive(Clone)]
pub struct QueueSettings {
    pub endpoint: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    pub queue_url: String,
    pub message_group_id: String,
    pub publish_timeout: Duration,
    pub ping_timeout: Duration,
}

impl std::fmt::Debug for QueueSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueSettings")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("queue_url", &self.queue_url)
            .field("message_group_id", &self.message_group_id)
            .field("publish_timeout", &self.publish_timeout)
            .field("ping_timeout", &self.ping_timeout)
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct IngestSettings {
    pub display_format: OwnedFormatItem,
    pub ignored_sender: String,
}

/// Fully validated runtime settings.
#[derive(Clone, Debug)]
pub struct Settings {
    pub server: ServerConfig,
    pub credentials: Credentials,
    pub queue: QueueSettings,
    pub ingest: IngestSettings,
    pub telemetry: TelemetryConfig,
}

impl Config {
    pub fn load() -> Self {
        Self::parse()
    }

    /// Checks every required setting at once and resolves derived values.
    ///
    /// # Errors
    /// Returns a `ConfigError` listing all absent or empty required settings
    /// together with the `TIME_FORMAT` parse error, if any.
    pub fn validate(self) -> Result<Settings, ConfigError> {
        let mut missing = Vec::new();
        let mut require = |value: Option<String>, name: &'static str| match value.filter(|v| !v.is_empty()) {
            Some(v) => v,
            None => {
                missing.push(name);
                String::new()
            }
        };

        let user = require(self.auth.user, "HTTP_USER");
        let password = require(self.auth.password, "HTTP_PASSWORD");
        let endpoint = require(self.queue.endpoint, "SQS_ENDPOINT");
        let region = require(self.queue.region, "SQS_REGION");
        let access_key = require(self.queue.access_key, "SQS_ACCESS_KEY");
        let secret_key = require(self.queue.secret_key, "SQS_SECRET_KEY");
        let queue_url = require(self.queue.queue_url, "SQS_QUEUE_URL");

        let display_format = match time::format_description::parse_owned::<1>(&self.ingest.time_format) {
            Ok(format) if missing.is_empty() => format,
            result => return Err(ConfigError { missing, time_format: result.err() }),
        };

        Ok(Settings {
            server: self.server,
            credentials: Credentials::new(user, password),
            queue: QueueSettings {
                endpoint,
                region,
                access_key,
                secret_key,
                queue_url,
                message_group_id: self.queue.message_group_id,
                publish_timeout: Duration::from_secs(self.queue.publish_timeout_secs),
                ping_timeout: Duration::from_secs(self.queue.ping_timeout_secs),
            },
            ingest: IngestSettings { display_format, ignored_sender: self.ingest.ignored_sender },
            telemetry: self.telemetry,
        })
    }
}
