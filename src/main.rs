use std::sync::Arc;

use anyhow::Context;

use intake_bot::config::Config;
use intake_bot::dispatch::DispatchRouter;
use intake_bot::gateway::{MessagingGateway, TelegramGateway};
use intake_bot::survey::SessionStore;
use intake_bot::webhook::webhook_routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("  export BOT_TOKEN=123456:ABC-...");
            eprintln!("  export WEBHOOK_URL=https://bot.example.com");
            std::process::exit(1);
        }
    };

    eprintln!("🤖 intake-bot v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Webhook: {}", config.webhook_url());
    eprintln!("   Listen:  0.0.0.0:{}", config.port);
    eprintln!(
        "   Cleanup: {}",
        if config.cleanup_enabled { "enabled" } else { "disabled" }
    );

    let gateway = Arc::new(TelegramGateway::new(config.bot_token.clone()));

    if let Err(e) = gateway.health_check().await {
        tracing::warn!(error = %e, "Bot API health check failed, continuing anyway");
    }

    let store = SessionStore::new();
    let router = Arc::new(DispatchRouter::new(
        store,
        Arc::clone(&gateway) as Arc<dyn MessagingGateway>,
        config.cleanup_enabled,
    ));
    let app = webhook_routes(router);

    gateway
        .set_webhook(&config.webhook_url())
        .await
        .context("webhook registration")?;

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("failed to bind port {}", config.port))?;
    tracing::info!(port = config.port, "Webhook server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("webhook server")?;

    if let Err(e) = gateway.delete_webhook().await {
        tracing::warn!(error = %e, "Webhook deregistration failed");
    }

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Shutdown signal received");
}
