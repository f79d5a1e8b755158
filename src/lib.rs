#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

pub mod adapters;
pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod telemetry;

use crate::adapters::queue::MessageQueue;
use crate::api::ServiceContainer;
use crate::config::Settings;
use crate::services::auth_service::AuthService;
use crate::services::health_service::HealthService;
use crate::services::ingest_service::IngestService;
use crate::services::normalizer::EventNormalizer;
use crate::services::queue_publisher::QueuePublisher;
use std::sync::Arc;
use tokio::sync::watch;

/// Wires services from validated settings and an injected queue handle.
#[derive(Debug)]
pub struct AppBuilder {
    settings: Settings,
    queue: Option<Arc<dyn MessageQueue>>,
}

impl AppBuilder {
    #[must_use]
    pub const fn new(settings: Settings) -> Self {
        Self { settings, queue: None }
    }

    #[must_use]
    pub fn with_queue(mut self, queue: Arc<dyn MessageQueue>) -> Self {
        self.queue = Some(queue);
        self
    }

    /// Builds the service container.
    ///
    /// # Errors
    /// Returns an error if no queue handle was provided.
    pub fn build(self) -> anyhow::Result<ServiceContainer> {
        let queue = self.queue.ok_or_else(|| anyhow::anyhow!("Queue is required"))?;
        let Settings { credentials, queue: queue_settings, ingest, .. } = self.settings;

        let publisher = QueuePublisher::new(Arc::clone(&queue), queue_settings.message_group_id);
        let ingest_service = IngestService::new(
            EventNormalizer::new(ingest.display_format),
            publisher,
            ingest.ignored_sender,
            queue_settings.publish_timeout,
        );

        Ok(ServiceContainer {
            auth_service: AuthService::new(credentials),
            ingest_service,
            health_service: HealthService::new(queue, queue_settings.ping_timeout),
        })
    }
}

/// Flips the shutdown channel on SIGINT or SIGTERM.
pub fn spawn_signal_handler(shutdown_tx: watch::Sender<bool>) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            () = ctrl_c => {},
            () = terminate => {},
        }

        tracing::info!("Shutdown signal received, draining connections...");
        let _ = shutdown_tx.send(true);
    });
}

/// Routes panics through `tracing` so they reach the configured log sink.
pub fn setup_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let location = info.location().map(ToString::to_string).unwrap_or_default();
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(ToString::to_string)
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_default();
        tracing::error!(panic.location = %location, panic.payload = %payload, "panic occurred");
    }));
}
