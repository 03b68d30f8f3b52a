//! Router setup with all API routes and middleware.
//!
//! Configures the axum Router with CORS, tracing, body limits, and all
//! endpoint handlers.

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Create the axum Router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // CORS middleware: allow localhost origins for the configured port.
    let port = state.config.general.port;
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(
            [
                format!("http://127.0.0.1:{}", port),
                format!("http://localhost:{}", port),
            ]
            .iter()
            .filter_map(|origin| origin.parse::<HeaderValue>().ok()),
        ))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    // Upload routes get a larger body budget than the JSON endpoints.
    let upload_routes = Router::new()
        .route("/rag/documents/upload", post(handlers::upload_document))
        .route("/rag/documents/upload-batch", post(handlers::upload_batch))
        .layer(DefaultBodyLimit::max(16 * 1024 * 1024)); // 16MB for uploads

    let api_routes = Router::new()
        .route("/chat", post(handlers::chat))
        .route("/rag/chat", post(handlers::rag_chat))
        .route("/rag/smart-chat", post(handlers::smart_chat))
        .route("/rag/chat/category", post(handlers::category_chat))
        .route("/rag/chat/reset", post(handlers::reset_conversation))
        .route("/rag/chat/history", get(handlers::conversation_history))
        .route("/rag/documents/add-text", post(handlers::add_text))
        .route("/rag/documents/search", get(handlers::search_documents))
        .route(
            "/rag/documents/search/category",
            get(handlers::search_by_category),
        )
        .route("/rag/documents/analyze", get(handlers::analyze))
        .route("/rag/documents/stats", get(handlers::stats))
        .route("/rag/documents/clear-all", delete(handlers::clear_all))
        .route("/rag/status", get(handlers::system_status))
        .layer(DefaultBodyLimit::max(1024 * 1024)); // 1MB for JSON bodies

    api_routes
        .merge(upload_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server on the configured address.
///
/// Binds to 127.0.0.1 (localhost only) on the port from config.
pub async fn start_server(state: AppState) -> Result<(), tome_core::error::TomeError> {
    let port = state.config.general.port;
    let addr = format!("127.0.0.1:{}", port);

    let router = create_router(state);

    tracing::info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| tome_core::error::TomeError::Api(format!("Failed to bind: {}", e)))?;

    axum::serve(listener, router)
        .await
        .map_err(|e| tome_core::error::TomeError::Api(format!("Server error: {}", e)))?;

    Ok(())
}
