//! Route handlers for the gateway.
//!
//! The webhook contract is status-code-flat: every delivery gets HTTP 200
//! with a JSON body, including secret mismatches and unreadable payloads.
//! The upstream platform treats non-200 as a delivery failure and retries,
//! which would re-feed events this relay has already consumed.

use axum::{Json, extract::State, http::HeaderMap};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::warn;

use voxline_relay::{Envelope, GateOutcome, classify};

use super::server::AppState;

const SECRET_HEADER: &str = "x-vapi-secret";

/// Service banner for the root path.
pub async fn banner() -> Json<Value> {
    Json(json!({
        "service": "voxline",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Health check endpoint.
pub async fn health_check() -> Json<Value> {
    Json(json!({"status": "healthy"}))
}

/// The webhook endpoint. Body arrives as a raw string so a malformed
/// payload can be acknowledged instead of bounced by the extractor.
pub async fn webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> Json<Value> {
    if !state.webhook_secret.is_empty() {
        let presented = headers
            .get(SECRET_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if presented != state.webhook_secret {
            warn!("webhook delivery with missing or wrong secret");
            return Json(json!({"ok": false, "error": "invalid webhook secret"}));
        }
    }

    let envelope: Envelope = match serde_json::from_str(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(error = %e, "unparseable webhook body, acknowledging anyway");
            return Json(json!({"ok": true}));
        }
    };

    let outcome = state.gate.handle(classify(&envelope)).await;
    Json(outcome_response(outcome))
}

/// Map a gate outcome to the wire response. A failed dispatch still
/// acknowledges: the failure was logged, and a retry from upstream could
/// not help because the session claim is already spent.
pub fn outcome_response(outcome: GateOutcome) -> Value {
    match outcome {
        GateOutcome::Acknowledge | GateOutcome::DispatchFailed(_) => json!({"ok": true}),
        GateOutcome::Dispatched(event) => json!({
            "success": true,
            "event": {
                "id": event.id,
                "link": event.link,
                "summary": event.summary,
                "start": event.start,
            },
        }),
        GateOutcome::ToolResults(results) => json!({
            "results": results
                .into_iter()
                .map(|r| json!({"toolCallId": r.tool_call_id, "result": r.result}))
                .collect::<Vec<_>>(),
        }),
    }
}
