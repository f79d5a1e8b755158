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

use sms_relay::adapters::queue::SqsQueue;
use sms_relay::api::{AppState, MgmtState};
use sms_relay::config::Config;
use sms_relay::{AppBuilder, telemetry};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::Instrument;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Phase 0: Startup validation (every missing setting is reported at once)
    let settings = Config::load().validate()?;
    let telemetry_guard = telemetry::init_telemetry(&settings.telemetry)?;

    sms_relay::setup_panic_hook();

    let server_config = settings.server.clone();
    let boot_span = tracing::info_span!("boot_server");
    let (api_listener, mgmt_listener, app_router, mgmt_app, shutdown_rx) = async {
        // Phase 1: Infrastructure Setup
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        sms_relay::spawn_signal_handler(shutdown_tx);

        let queue = Arc::new(SqsQueue::connect(&settings.queue).await);

        // Phase 2: Component Wiring
        let services = AppBuilder::new(settings).with_queue(queue).build()?;

        // Phase 3: Listeners and Routers
        let app_router = sms_relay::api::app_router(
            &server_config,
            AppState { auth_service: services.auth_service, ingest_service: services.ingest_service },
        );
        let mgmt_app = sms_relay::api::mgmt_router(MgmtState { health_service: services.health_service });

        let api_listener = tokio::net::TcpListener::bind((server_config.host.as_str(), server_config.port)).await?;
        let mgmt_listener =
            tokio::net::TcpListener::bind((server_config.host.as_str(), server_config.mgmt_port)).await?;

        tracing::info!(address = %api_listener.local_addr()?, "listening");
        tracing::info!(address = %mgmt_listener.local_addr()?, "management server listening");

        Ok::<_, anyhow::Error>((api_listener, mgmt_listener, app_router, mgmt_app, shutdown_rx))
    }
    .instrument(boot_span)
    .await?;

    // Phase 4: Serve until a shutdown signal arrives
    let mut api_rx = shutdown_rx.clone();
    let api_server = axum::serve(api_listener, app_router.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(async move {
            let _ = api_rx.wait_for(|&s| s).await;
        });

    let mut mgmt_rx = shutdown_rx.clone();
    let mgmt_server = axum::serve(mgmt_listener, mgmt_app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(async move {
            let _ = mgmt_rx.wait_for(|&s| s).await;
        });

    // Phase 5: Bound the drain of in-flight requests once shutdown begins
    let mut drain_rx = shutdown_rx;
    let drain_budget = Duration::from_secs(server_config.shutdown_timeout_secs);
    let drain_deadline = async move {
        let _ = drain_rx.wait_for(|&s| s).await;
        tokio::time::sleep(drain_budget).await;
    };

    tokio::select! {
        result = async { tokio::try_join!(api_server, mgmt_server) } => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Server error");
            }
        }
        () = drain_deadline => {
            tracing::warn!("Timeout waiting for in-flight requests to finish.");
        }
    }

    telemetry_guard.shutdown();
    Ok(())
}
