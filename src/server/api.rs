use crate::models::api::{
    DiagnosticsResponse,
    ErrorResponse,
    FailedExchangeResponse,
    HealthResponse,
    HistoryResponse,
    SendMessageRequest,
    StatusMessage,
};
use crate::models::chat::now_iso8601;
use crate::service::{ ChatError, ChatService };
use std::sync::Arc;
use axum::{
    routing::{ get, post },
    Router,
    extract::{ State, rejection::JsonRejection },
    response::{ IntoResponse, Response },
    http::{ header, HeaderValue, Method, StatusCode },
    Json,
};
use tower_http::cors::{ AllowOrigin, Any, CorsLayer };
use log::{ info, warn, error };

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ChatService>,
    pub port: u16,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/api/chat/history", get(history_handler).delete(clear_history_handler))
        .route("/api/chat/message", post(send_message_handler))
        .route("/api/health", get(health_handler))
        .route("/api/test", get(diagnostics_handler))
        .with_state(state)
}

/// Browser access for the configured origins. `*` opens the API to any origin
/// (credentials are then not allowed).
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if origins.iter().any(|o| o.trim() == "*") {
        return base.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .map(|o| o.trim())
        .filter(|o| !o.is_empty())
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("Ignoring invalid CORS origin '{}': {}", o, e);
                None
            }
        })
        .collect();

    base.allow_origin(AllowOrigin::list(allowed)).allow_credentials(true)
}

async fn root_handler() -> impl IntoResponse {
    Json(StatusMessage { message: "Chatbot API is running!".into() })
}

async fn history_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(HistoryResponse { history: state.service.history().all().await })
}

async fn clear_history_handler(State(state): State<AppState>) -> impl IntoResponse {
    state.service.history().clear().await;
    info!("Chat history cleared");
    Json(StatusMessage { message: "Chat history cleared".into() })
}

async fn send_message_handler(
    State(state): State<AppState>,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Response {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            warn!("Rejected chat message body: {}", rejection.body_text());
            return (StatusCode::BAD_REQUEST, Json(ErrorResponse {
                error: rejection.body_text(),
            })).into_response();
        }
    };

    let message = req.message.unwrap_or_default();
    match state.service.handle(&message, req.user_id.as_deref()).await {
        Ok(exchange) => Json(exchange).into_response(),
        Err(ChatError::Validation) => (StatusCode::BAD_REQUEST, Json(ErrorResponse {
            error: ChatError::Validation.to_string(),
        })).into_response(),
        Err(ChatError::Internal { reason, exchange }) => {
            error!("Error processing message: {}", reason);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(FailedExchangeResponse {
                error: "Failed to process message".into(),
                message: reason,
                user_message: exchange.user_message,
                bot_message: exchange.bot_message,
            })).into_response()
        }
    }
}

async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse { status: "ok".into(), timestamp: now_iso8601() })
}

async fn diagnostics_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(DiagnosticsResponse {
        message: "Backend is working!".into(),
        port: state.port,
        timestamp: now_iso8601(),
        cors: "enabled".into(),
    })
}
