//! Route handler functions for all API endpoints.
//!
//! Each handler extracts its parameters via axum extractors, calls into the
//! orchestrator or the document store, and wraps the result in the
//! `{"success": true, ...}` envelope. Failures convert to [`ApiError`] and
//! surface as the HTTP 500 error envelope.

use std::collections::HashMap;

use axum::extract::{Multipart, Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use tome_core::types::{ChatTurn, DocumentMetadata, ScoredDocument, DEFAULT_SESSION_ID};

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Request types
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryChatRequest {
    pub message: String,
    pub category: String,
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddTextRequest {
    pub content: String,
    pub title: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub query: String,
    pub max_results: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySearchParams {
    pub query: String,
    pub category: String,
    pub max_results: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeParams {
    pub query: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionParams {
    pub session_id: Option<String>,
}

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponseBody {
    pub success: bool,
    pub response: String,
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUploadResponse {
    pub success: bool,
    pub results: HashMap<String, String>,
    pub total_files: usize,
    pub success_count: usize,
    pub failure_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddTextResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// One search hit as exposed over the wire.
#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentView {
    pub content: String,
    pub summary: String,
    pub score: f64,
    pub metadata: DocumentMetadata,
}

impl From<&ScoredDocument> for DocumentView {
    fn from(scored: &ScoredDocument) -> Self {
        Self {
            content: scored.document.content.clone(),
            summary: scored.document.summary(200),
            score: scored.score,
            metadata: scored.document.metadata.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponseBody {
    pub success: bool,
    pub query: String,
    pub total_results: usize,
    pub documents: Vec<DocumentView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub query: String,
    pub analysis: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub success: bool,
    pub total_documents: usize,
    pub categories: HashMap<String, usize>,
    pub supported_file_types: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub success: bool,
    pub status: String,
    pub timestamp: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClearAllResponse {
    pub success: bool,
    pub message: String,
    pub warning: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetResponse {
    pub success: bool,
    pub message: String,
    pub session_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub success: bool,
    pub session_id: String,
    pub message_count: usize,
    pub history: Vec<ChatTurn>,
}

fn resolve_session(session_id: Option<String>) -> String {
    session_id
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SESSION_ID.to_string())
}

// =============================================================================
// Chat handlers
// =============================================================================

/// POST /chat - plain chat with session memory, no retrieval.
pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponseBody>, ApiError> {
    let session_id = resolve_session(req.session_id);
    let response = state.orchestrator.chat(&session_id, &req.message).await?;

    Ok(Json(ChatResponseBody {
        success: true,
        response,
        session_id,
        mode: None,
        category: None,
    }))
}

/// POST /rag/chat - retrieval-augmented chat over the full corpus.
pub async fn rag_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponseBody>, ApiError> {
    let session_id = resolve_session(req.session_id);
    let response = state
        .orchestrator
        .chat_with_rag(&session_id, &req.message)
        .await?;

    Ok(Json(ChatResponseBody {
        success: true,
        response,
        session_id,
        mode: Some("RAG".to_string()),
        category: None,
    }))
}

/// POST /rag/smart-chat - automatic RAG-or-plain routing.
pub async fn smart_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponseBody>, ApiError> {
    let session_id = resolve_session(req.session_id);
    let response = state
        .orchestrator
        .smart_chat(&session_id, &req.message)
        .await?;

    Ok(Json(ChatResponseBody {
        success: true,
        response,
        session_id,
        mode: Some("SMART".to_string()),
        category: None,
    }))
}

/// POST /rag/chat/category - retrieval filtered to one category.
pub async fn category_chat(
    State(state): State<AppState>,
    Json(req): Json<CategoryChatRequest>,
) -> Result<Json<ChatResponseBody>, ApiError> {
    let session_id = resolve_session(req.session_id);
    let response = state
        .orchestrator
        .chat_with_rag_by_category(&session_id, &req.message, &req.category)
        .await?;

    Ok(Json(ChatResponseBody {
        success: true,
        response,
        session_id,
        mode: Some("RAG_CATEGORY".to_string()),
        category: Some(req.category),
    }))
}

/// POST /rag/chat/reset - discard a session's history.
pub async fn reset_conversation(
    State(state): State<AppState>,
    Query(params): Query<SessionParams>,
) -> Result<Json<ResetResponse>, ApiError> {
    let session_id = resolve_session(params.session_id);
    state.orchestrator.start_new_conversation(&session_id);

    Ok(Json(ResetResponse {
        success: true,
        message: "conversation reset".to_string(),
        session_id,
    }))
}

/// GET /rag/chat/history - a session's turns, oldest first.
pub async fn conversation_history(
    State(state): State<AppState>,
    Query(params): Query<SessionParams>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let session_id = resolve_session(params.session_id);
    let history = state.orchestrator.conversation_history(&session_id);

    Ok(Json(HistoryResponse {
        success: true,
        session_id,
        message_count: history.len(),
        history,
    }))
}

// =============================================================================
// Document handlers
// =============================================================================

/// POST /rag/documents/upload - multipart single-file upload.
pub async fn upload_document(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let (files, category) = read_multipart(multipart).await?;
    let (filename, bytes) = files
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::new("no file provided in upload"))?;

    let chunks = state
        .store
        .ingest_file(&filename, &bytes, category.clone())
        .await?;

    Ok(Json(UploadResponse {
        success: true,
        message: format!(
            "document '{}' processed into {} chunks and stored",
            filename, chunks
        ),
        filename,
        category,
    }))
}

/// POST /rag/documents/upload-batch - multipart multi-file upload.
///
/// Per-file outcomes are captured individually so one bad file never aborts
/// the batch.
pub async fn upload_batch(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<BatchUploadResponse>, ApiError> {
    let (files, category) = read_multipart(multipart).await?;
    if files.is_empty() {
        return Err(ApiError::new("no files provided in upload"));
    }

    let total_files = files.len();
    let mut results = HashMap::new();
    let mut success_count = 0;

    for (filename, bytes) in files {
        match state
            .store
            .ingest_file(&filename, &bytes, category.clone())
            .await
        {
            Ok(chunks) => {
                success_count += 1;
                results.insert(filename, format!("processed into {} chunks", chunks));
            }
            Err(e) => {
                error!(filename = %filename, "Batch upload item failed: {}", e);
                results.insert(filename, format!("failed: {}", e));
            }
        }
    }

    Ok(Json(BatchUploadResponse {
        success: true,
        results,
        total_files,
        success_count,
        failure_count: total_files - success_count,
        category,
    }))
}

/// POST /rag/documents/add-text - create a document from raw text.
pub async fn add_text(
    State(state): State<AppState>,
    Json(req): Json<AddTextRequest>,
) -> Result<Json<AddTextResponse>, ApiError> {
    let chunks = state
        .store
        .add_text(&req.content, req.title.clone(), req.category.clone())
        .await?;

    let title = req.title.unwrap_or_else(|| "untitled".to_string());
    Ok(Json(AddTextResponse {
        success: true,
        message: format!(
            "text document '{}' added, {} chunks stored",
            title, chunks
        ),
        title: Some(title),
        category: req.category,
    }))
}

/// GET /rag/documents/search - unscoped similarity search.
pub async fn search_documents(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponseBody>, ApiError> {
    let max_results = params.max_results.unwrap_or(10);
    let documents = state.store.search(&params.query, max_results).await?;

    Ok(Json(SearchResponseBody {
        success: true,
        query: params.query,
        total_results: documents.len(),
        documents: documents.iter().map(DocumentView::from).collect(),
        category: None,
    }))
}

/// GET /rag/documents/search/category - category-scoped similarity search.
pub async fn search_by_category(
    State(state): State<AppState>,
    Query(params): Query<CategorySearchParams>,
) -> Result<Json<SearchResponseBody>, ApiError> {
    let max_results = params.max_results.unwrap_or(10);
    let documents = state
        .store
        .search_by_category(&params.query, &params.category, max_results)
        .await?;

    Ok(Json(SearchResponseBody {
        success: true,
        query: params.query,
        total_results: documents.len(),
        documents: documents.iter().map(DocumentView::from).collect(),
        category: Some(params.category),
    }))
}

/// GET /rag/documents/analyze - ranked relevance summary, no generation.
pub async fn analyze(
    State(state): State<AppState>,
    Query(params): Query<AnalyzeParams>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let analysis = state
        .orchestrator
        .analyze_document_relevance(&params.query)
        .await?;

    Ok(Json(AnalyzeResponse {
        success: true,
        query: params.query,
        analysis,
    }))
}

/// GET /rag/documents/stats - corpus statistics.
pub async fn stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let stats = state.store.stats();
    Ok(Json(StatsResponse {
        success: true,
        total_documents: stats.total_documents,
        categories: stats.categories,
        supported_file_types: stats.supported_file_types,
    }))
}

/// GET /rag/status - textual system status.
pub async fn system_status(
    State(state): State<AppState>,
) -> Result<Json<StatusResponse>, ApiError> {
    Ok(Json(StatusResponse {
        success: true,
        status: state.orchestrator.system_status(),
        timestamp: Utc::now().timestamp_millis(),
    }))
}

/// DELETE /rag/documents/clear-all - drop the whole corpus.
pub async fn clear_all(
    State(state): State<AppState>,
) -> Result<Json<ClearAllResponse>, ApiError> {
    let removed = state.store.clear_all()?;
    info!(removed, "Corpus cleared via API");

    Ok(Json(ClearAllResponse {
        success: true,
        message: format!("{} document chunks removed", removed),
        warning: "all documents have been removed; this cannot be undone".to_string(),
    }))
}

// =============================================================================
// Multipart helper
// =============================================================================

/// Drain a multipart body into (filename, bytes) pairs plus an optional
/// category field. Field order is not significant.
async fn read_multipart(
    mut multipart: Multipart,
) -> Result<(Vec<(String, Vec<u8>)>, Option<String>), ApiError> {
    let mut files = Vec::new();
    let mut category = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::new(format!("invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" | "files" => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::new(format!("failed to read upload: {}", e)))?;
                files.push((filename, bytes.to_vec()));
            }
            "category" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::new(format!("failed to read category: {}", e)))?;
                if !value.trim().is_empty() {
                    category = Some(value);
                }
            }
            _ => {}
        }
    }

    Ok((files, category))
}
