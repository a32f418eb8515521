//! HTTP routes.
//!
//! Handlers do the I/O in a fixed order (authorize → fetch object → fetch
//! metadata → classify) and run the triage engine exactly once per request,
//! only after every input is resolved.

use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Path, Query, State};
use axum::http::header::{AsHeaderName, CONTENT_TYPE};
use axum::http::HeaderMap;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use serde::de::DeserializeOwned;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use triage_engine::TriageEngine;

use crate::classifier::EmotionClassifier;
use crate::config::{ConfigError, ServiceConfig};
use crate::contracts::{
    AnalyzeRequest, AnalyzeResponse, HealthResponse, PresignRequest, PresignResponse,
    RequiredHeaders, TimingsMs, UploadQuery, UploadResponse,
};
use crate::error::{ApiError, ApiResult};
use crate::presign::{constant_time_eq, extension_for, SigningError, UploadSigner};
use crate::storage::{ObjectStore, StorageError};

pub const SECRET_HEADER: &str = "x-shared-secret";
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Shared handler state. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
    pub store: Arc<dyn ObjectStore>,
    pub classifier: Arc<dyn EmotionClassifier>,
    pub engine: Arc<TriageEngine>,
    pub signer: Arc<UploadSigner>,
}

impl AppState {
    pub fn new(
        config: ServiceConfig,
        store: Arc<dyn ObjectStore>,
        classifier: Arc<dyn EmotionClassifier>,
    ) -> Result<Self, ConfigError> {
        let engine = TriageEngine::with_config(config.triage)?;
        let signer = UploadSigner::new(
            config.shared_secret.clone(),
            config.public_base_url.clone(),
            config.presign_ttl,
        );
        Ok(Self {
            config: Arc::new(config),
            store,
            classifier,
            engine: Arc::new(engine),
            signer: Arc::new(signer),
        })
    }
}

pub fn router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health))
        .route("/presign", post(presign))
        .route(
            "/upload/*key",
            put(upload).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/analyze", post(analyze))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Decode a JSON body; an empty body reads as `{}`.
fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> ApiResult<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| ApiError::bad_request(format!("Invalid JSON body: {e}")))
}

fn header_str<'a>(headers: &'a HeaderMap, name: impl AsHeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn authorize(state: &AppState, headers: &HeaderMap) -> ApiResult<()> {
    let expected = state.config.shared_secret.expose().as_bytes();
    match header_str(headers, SECRET_HEADER) {
        Some(given) if !expected.is_empty() && constant_time_eq(given.as_bytes(), expected) => {
            Ok(())
        }
        _ => Err(ApiError::Unauthorized),
    }
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        model: state.classifier.model_id().to_string(),
    })
}

async fn presign(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<PresignResponse>> {
    let req: PresignRequest = parse_body(&body)?;
    let content_type = req.content_type.unwrap_or_default();
    if extension_for(&content_type).is_none() {
        return Err(ApiError::InvalidContentType);
    }

    let upload = state.signer.issue(&content_type, Utc::now()).map_err(|e| {
        error!(error = %e, "presign failed");
        ApiError::PresignFailed
    })?;

    info!(key = %upload.key, content_type = %content_type, "issued upload url");
    Ok(Json(PresignResponse {
        ok: true,
        upload_url: upload.url,
        key: upload.key,
        expires_in_sec: upload.expires_in.as_secs(),
        required_headers: RequiredHeaders {
            content_type: upload.content_type,
        },
    }))
}

async fn upload(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<UploadResponse>> {
    let content_type = header_str(&headers, CONTENT_TYPE).unwrap_or_default();

    state
        .signer
        .verify(
            &key,
            content_type,
            query.expires.as_deref(),
            query.signature.as_deref(),
            Utc::now(),
        )
        .map_err(|e| {
            warn!(key = %key, error = %e, "upload rejected");
            match e {
                SigningError::Expired => ApiError::UploadRejected("Upload URL expired.".into()),
                _ => ApiError::UploadRejected("Invalid upload signature.".into()),
            }
        })?;

    let meta = state
        .store
        .put(&key, content_type, body)
        .await
        .map_err(|e| match e {
            StorageError::InvalidKey(_) => ApiError::bad_request("Invalid key."),
            other => {
                error!(key = %key, error = %other, "upload store failed");
                ApiError::UploadFailed
            }
        })?;

    info!(
        key = %key,
        size = meta.size,
        content_type = %meta.content_type,
        stored_at = %meta.stored_at,
        "stored upload"
    );
    Ok(Json(UploadResponse { ok: true, key }))
}

async fn analyze(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<AnalyzeResponse>> {
    let started = Instant::now();

    authorize(&state, &headers)?;

    let req: AnalyzeRequest = parse_body(&body)?;
    let key = req
        .key
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing key."))?;
    let text = req.text_context.unwrap_or_default();

    // Storage
    let storage_start = Instant::now();
    let image = state.store.get(&key).await.map_err(|e| match e {
        StorageError::NotFound(_) => {
            warn!(key = %key, "image not found");
            ApiError::ImageNotFound
        }
        StorageError::InvalidKey(_) => ApiError::bad_request("Invalid key."),
        other => {
            error!(key = %key, error = %other, "image fetch failed");
            ApiError::AnalyzeFailed
        }
    })?;
    let storage_elapsed = storage_start.elapsed();

    // Classifier, including the content-type lookup it depends on
    let classify_start = Instant::now();
    let content_type = match state.store.head(&key).await {
        Ok(meta) => meta.content_type,
        Err(e) => {
            warn!(key = %key, error = %e, "metadata lookup failed; defaulting content-type");
            FALLBACK_CONTENT_TYPE.to_string()
        }
    };
    let predictions = state
        .classifier
        .classify(image, &content_type)
        .await
        .map_err(|e| ApiError::InferenceFailed(e.summary()))?;
    let classify_elapsed = classify_start.elapsed();

    // Rules
    let (result, rules_elapsed) = state.engine.triage_timed(&predictions, &text);

    let timings = TimingsMs::from_durations(
        started.elapsed(),
        storage_elapsed,
        classify_elapsed,
        rules_elapsed,
    );

    info!(
        key = %key,
        priority = %result.priority,
        base_tier = %result.keywords.base_tier,
        label = %result.emotion.label,
        score = result.emotion.score,
        signal = %result.emotion.signal,
        confident = result.emotion.confident,
        total_ms = timings.total,
        storage_ms = timings.storage,
        classifier_ms = timings.classifier,
        "analyzed"
    );

    Ok(Json(AnalyzeResponse::from_result(
        result,
        timings,
        state.classifier.model_id(),
        !text.is_empty(),
    )))
}
