// HTTP surface and the request-scoped prediction pipeline:
// receive upload -> persist file -> decode -> preprocess -> infer -> argmax
// -> record -> recipe lookup -> respond.
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, Request, State};
use axum::middleware::{self, Next};
use axum::response::{Html, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{Local, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::task;
use tower_http::services::ServeDir;

use crate::error::AppError;
use crate::labels::{ClassRegistry, display_name};
use crate::model::{Model, argmax, softmax};
use crate::preprocess::preprocess;
use crate::recipes::RecipeCatalog;
use crate::store::PredictionStore;

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Everything loaded during the startup phase. Read-only at request time
/// apart from the store's own inserts.
pub struct AppState {
    pub registry: ClassRegistry,
    pub recipes: RecipeCatalog,
    pub model: Arc<dyn Model>,
    pub store: PredictionStore,
    pub uploads_dir: PathBuf,
}

#[derive(Serialize)]
pub struct PredictResponse {
    pub prediction: String,
    pub recipe: Option<Value>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(serve_index))
        .route("/predict", post(handle_predict))
        .nest_service("/static", ServeDir::new("static"))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let response = next.run(req).await;
    tracing::info!(%method, %uri, status = %response.status(), "handled request");
    response
}

async fn serve_index() -> Html<String> {
    let html = tokio::fs::read_to_string("static/index.html")
        .await
        .unwrap_or_else(|_| "<h1>Failed to load index.html</h1>".to_string());
    Html(html)
}

async fn handle_predict(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<PredictResponse>, AppError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Internal(e.into()))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Internal(e.into()))?;
            upload = Some((filename, bytes));
            break;
        }
    }
    let (filename, bytes) = upload.ok_or(AppError::MissingFile)?;
    if filename.is_empty() {
        return Err(AppError::NoFileSelected);
    }

    // The upload is persisted before decode validation; an undecodable
    // upload leaves this file behind.
    let stored_name = format!("{}_{filename}", Local::now().format("%Y%m%d_%H%M%S"));
    let image_path = state.uploads_dir.join(stored_name);
    tokio::fs::write(&image_path, &bytes)
        .await
        .map_err(|e| AppError::Internal(e.into()))?;
    tracing::info!(path = %image_path.display(), "image saved");

    let model = Arc::clone(&state.model);
    let scores = task::spawn_blocking(move || -> Result<Vec<f32>, AppError> {
        let image = image::load_from_memory(&bytes).map_err(|_| AppError::InvalidImage)?;
        let input = preprocess(&image);
        model.infer(&input).map_err(AppError::Internal)
    })
    .await
    .map_err(|e| AppError::Internal(e.into()))??;

    let probabilities = softmax(&scores);
    let index = argmax(&probabilities)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("model returned no scores")))?;
    let label = state
        .registry
        .label(index)
        .ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("class index {index} has no label"))
        })?
        .to_string();

    // The record must land before the response is built; a storage failure
    // fails the whole request.
    let image_path = image_path.to_string_lossy().into_owned();
    state.store.append(&image_path, &label, Utc::now()).await?;
    tracing::info!(%label, "prediction recorded");

    let recipe = state.recipes.get(&label).cloned();
    Ok(Json(PredictResponse { prediction: display_name(&label), recipe }))
}
