//! HTTP handlers for the call screen service.

use axum::{
  extract::{Multipart, Path, Query, State},
  http::StatusCode,
  Json,
};
use std::sync::Arc;
use uuid::Uuid;

use risk_aggregator::types::{CallDetail, NewCall, Section, SessionSnapshot};
use risk_aggregator::CallRecord;

use crate::client::AudioUpload;
use crate::error::ServiceError;
use crate::state::AppState;
use crate::types::{AnalysisMode, AnalyzeQuery, CategoryResponse, RiskNumberPayload};

pub async fn health() -> &'static str {
  "ok"
}

pub async fn list_calls(State(state): State<Arc<AppState>>) -> Json<Vec<Section>> {
  Json(state.engine.lock().await.sections())
}

pub async fn create_call(
  State(state): State<Arc<AppState>>,
  Json(mut payload): Json<NewCall>,
) -> Result<(StatusCode, Json<CallRecord>), ServiceError> {
  if payload.id.is_none() {
    payload.id = Some(Uuid::new_v4().to_string());
  }
  let record = state.engine.lock().await.add_call(&payload)?;
  Ok((StatusCode::CREATED, Json(record)))
}

pub async fn get_call(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<CallDetail>, ServiceError> {
  Ok(Json(state.engine.lock().await.call(&id)?))
}

/// Upload one audio file and run it through the analysis services.
///
/// Full mode requests the deepfake verdict before the phishing batch. Results
/// are applied only after every upload succeeded, so a failed request leaves
/// the call as it was.
pub async fn analyze(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Query(query): Query<AnalyzeQuery>,
  multipart: Multipart,
) -> Result<Json<SessionSnapshot>, ServiceError> {
  // Fail fast before uploading anything for an unknown call.
  state.engine.lock().await.call(&id)?;
  let audio = read_audio(multipart).await?;

  let verdict = match query.mode {
    AnalysisMode::Full => Some(state.client.deepfake(&audio).await?),
    AnalysisMode::Phishing => None,
  };
  let batch = state.client.phishing(&audio).await?;

  let snapshot = state
    .engine
    .lock()
    .await
    .apply_analysis(&id, verdict.as_ref(), &batch)?;
  Ok(Json(snapshot))
}

pub async fn decide(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<CategoryResponse>, ServiceError> {
  let category = state.engine.lock().await.decide(&id)?;
  Ok(Json(CategoryResponse {
    call_id: id,
    category,
    label: category.label(),
  }))
}

pub async fn list_risk_numbers(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
  Json(state.engine.lock().await.risk_numbers().to_vec())
}

pub async fn add_risk_number(
  State(state): State<Arc<AppState>>,
  Json(payload): Json<RiskNumberPayload>,
) -> Json<Vec<String>> {
  let mut engine = state.engine.lock().await;
  Json(engine.add_risk_number(&payload.number).to_vec())
}

pub async fn remove_risk_number(
  State(state): State<Arc<AppState>>,
  Path(number): Path<String>,
) -> Json<Vec<String>> {
  let mut engine = state.engine.lock().await;
  Json(engine.remove_risk_number(&number).to_vec())
}

/// Pull the `file` field out of a multipart body.
async fn read_audio(mut multipart: Multipart) -> Result<AudioUpload, ServiceError> {
  while let Some(field) = multipart
    .next_field()
    .await
    .map_err(|e| ServiceError::Multipart(e.to_string()))?
  {
    if field.name() != Some("file") {
      continue;
    }

    let file_name = field
      .file_name()
      .map(str::trim)
      .filter(|n| !n.is_empty())
      .map(str::to_string)
      .unwrap_or_else(AudioUpload::fallback_name);
    let content_type = field
      .content_type()
      .map(str::to_string)
      .unwrap_or_else(|| AudioUpload::DEFAULT_CONTENT_TYPE.to_string());
    let bytes = field
      .bytes()
      .await
      .map_err(|e| ServiceError::Multipart(e.to_string()))?;

    if bytes.is_empty() {
      return Err(ServiceError::MissingFile);
    }
    return Ok(AudioUpload {
      file_name,
      content_type,
      bytes: bytes.to_vec(),
    });
  }
  Err(ServiceError::MissingFile)
}
