//! Webhook adapter - push-mode update delivery over HTTP
//!
//! One POST endpoint, one update payload per request. The handler hands
//! the update to a background task and answers 200 immediately, so a slow
//! command can never make the platform re-deliver on timeout. Malformed
//! bodies are rejected by the JSON extractor with a client-error status
//! before they touch any state.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};

use crate::application::errors::BotError;
use crate::application::messaging::Dispatcher;
use crate::domain::traits::Outbound;
use crate::infrastructure::adapters::telegram::TgUpdate;

/// How long in-flight handlers get to finish after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(3);

#[derive(Clone)]
pub struct WebhookState {
    pub dispatcher: Arc<Dispatcher>,
    pub outbound: Arc<dyn Outbound>,
}

/// Build the webhook router. Shared between production startup and tests.
pub fn build_router(path: &str, state: WebhookState) -> Router {
    Router::new().route(path, post(receive_update)).with_state(state)
}

async fn receive_update(
    State(state): State<WebhookState>,
    Json(update): Json<TgUpdate>,
) -> StatusCode {
    // Ack first, process in the background.
    tokio::spawn(async move {
        process_update(state, update).await;
    });
    StatusCode::OK
}

async fn process_update(state: WebhookState, update: TgUpdate) {
    let Some((chat_id, text, sender)) = update.text_parts() else {
        tracing::debug!(update_id = update.update_id, "ignoring update without text");
        return;
    };

    let Some(reply) = state
        .dispatcher
        .handle(update.update_id, &chat_id, text, sender)
    else {
        return;
    };

    if let Err(e) = state.outbound.send_message(&chat_id, &reply).await {
        tracing::error!(chat_id, error = %e, "failed to deliver reply");
    }
}

/// Serve the router until a shutdown signal, then give spawned handlers a
/// bounded grace period before the process exits.
pub async fn serve(addr: SocketAddr, router: Router) -> Result<(), BotError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| BotError::Network(format!("failed to bind {}: {}", addr, e)))?;
    tracing::info!(%addr, "webhook listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| BotError::Network(e.to_string()))?;

    tracing::info!(grace_secs = SHUTDOWN_GRACE.as_secs(), "draining in-flight handlers");
    tokio::time::sleep(SHUTDOWN_GRACE).await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown signal received");
}
