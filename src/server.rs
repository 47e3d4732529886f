//! Webhook HTTP server.

use axum::{
    Form, Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::handler::{self, App, IncomingMessage};
use crate::twiml;

/// Twilio webhook form fields. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
pub struct WebhookForm {
    #[serde(rename = "From", default)]
    pub from: String,
    #[serde(rename = "Body", default)]
    pub body: String,
}

pub fn router(app: Arc<App>) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/whatsapp", post(whatsapp_reply))
        .with_state(app)
}

/// Bind and serve until ctrl-c.
pub async fn run(app: Arc<App>, bind: &str, port: u16) -> std::io::Result<()> {
    let bind_addr = format!("{bind}:{port}");
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("🚀 Webhook server listening on {bind_addr}");

    axum::serve(listener, router(app))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutting down");
}

/// POST /whatsapp — one provider message in, one TwiML reply out.
/// Always 200 with some reply text; failures are handled inside the handler.
async fn whatsapp_reply(
    State(app): State<Arc<App>>,
    Form(form): Form<WebhookForm>,
) -> impl IntoResponse {
    info!("📨 Inbound message from {}", form.from);

    let msg = IncomingMessage {
        sender_id: form.from,
        body: form.body.trim().to_string(),
    };
    let reply = handler::handle_message(&app, &msg).await;

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/xml")],
        twiml::message_response(&reply.body),
    )
}

/// GET / returns a simple health JSON (for probes).
async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "running",
        "service": "aidoc",
    }))
}
