// src/http/mod.rs
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::receipt;
use crate::storage::AuditLog;
use crate::utils::AppError;

/// How many audit entries the /logs listing returns.
const LOGS_PAGE_SIZE: i64 = 50;

#[derive(Clone)]
pub struct AppState {
    pub audit_log: AuditLog,
}

/// Failure body returned for every resolution error, regardless of kind;
/// `detail` carries the underlying error message.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    pub detail: String,
    pub transaction_id: String,
}

/// Binds the listener and serves the verify API until the process exits.
pub async fn serve(bind_addr: &str, audit_log: AuditLog) -> Result<(), AppError> {
    let state = AppState { audit_log };

    let app = Router::new()
        .route("/health", get(health))
        .route("/verify/:transaction_id", get(verify))
        .route("/logs", get(logs))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("listening on {}", bind_addr);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

async fn verify(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let ip = client_ip(&headers, &addr);
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .to_string();

    match receipt::resolve(&transaction_id).await {
        Ok(record) => {
            // The resolution already succeeded; a failed append is logged
            // but does not fail the response.
            if let Err(e) = state.audit_log.append(&record, &ip, &user_agent).await {
                tracing::error!("Failed to append audit entry for {}: {}", transaction_id, e);
            }
            (StatusCode::OK, Json(record)).into_response()
        }
        Err(e) => {
            tracing::error!("Resolution failed for {}: {}", transaction_id, e);
            let body = ErrorResponse {
                error: "Failed to process transaction".to_string(),
                detail: e.to_string(),
                transaction_id,
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

async fn logs(State(state): State<AppState>) -> impl IntoResponse {
    match state.audit_log.recent(LOGS_PAGE_SIZE).await {
        Ok(entries) => (StatusCode::OK, Json(entries)).into_response(),
        Err(e) => {
            tracing::error!("Failed to read audit log: {}", e);
            let body = serde_json::json!({ "error": "Failed to read audit log" });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Prefers the first X-Forwarded-For hop over the socket peer address.
fn client_ip(headers: &HeaderMap, addr: &SocketAddr) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| addr.ip().to_string())
}
