//! Gatehouse HTTP server.
//!
//! Wires the in-memory ledger, the development payment provider and the
//! console notifier into the lifecycle services, then serves the API.

use gatehouse_core::admission::AdmissionService;
use gatehouse_core::checkout::CheckoutService;
use gatehouse_core::clock::SystemClock;
use gatehouse_core::comp::CompService;
use gatehouse_core::confirmation::ConfirmationService;
use gatehouse_core::mocks::MockCheckoutProvider;
use gatehouse_core::providers::ConsoleNotifier;
use gatehouse_core::store::{LedgerStore, MemoryLedger};
use gatehouse_core::token::AdmissionTokens;
use gatehouse_core::webhook::WebhookVerifier;
use gatehouse_web::config::Config;
use gatehouse_web::{AppState, build_router};
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gatehouse=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Gatehouse server");

    let config = Arc::new(Config::from_env());
    info!(
        host = %config.server.host,
        port = config.server.port,
        "Configuration loaded"
    );

    let store: Arc<dyn LedgerStore> = Arc::new(MemoryLedger::new());
    let clock = Arc::new(SystemClock);
    let tokens = Arc::new(AdmissionTokens::new(
        config.secrets.admission_token_secret.as_bytes().to_vec(),
        config.secrets.token_issuer.clone(),
    ));
    let webhooks = WebhookVerifier::new(config.secrets.webhook_secret.as_bytes().to_vec());
    let payments = MockCheckoutProvider::shared();
    let notifier = Arc::new(ConsoleNotifier::new());

    let state = AppState::new(
        Arc::clone(&store),
        CheckoutService::new(Arc::clone(&store), payments, clock.clone()),
        ConfirmationService::new(
            Arc::clone(&store),
            Arc::clone(&tokens),
            notifier.clone(),
            clock.clone(),
        ),
        AdmissionService::new(Arc::clone(&store), Arc::clone(&tokens), clock.clone()),
        CompService::new(Arc::clone(&store), tokens, notifier, clock.clone()),
        webhooks,
        clock,
        Arc::clone(&config),
    );

    let router = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "Gatehouse listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gatehouse stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = signal::ctrl_c().await {
        tracing::error!(%error, "failed to install shutdown handler");
    }
    info!("shutdown signal received");
}
