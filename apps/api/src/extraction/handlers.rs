use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::errors::AppError;
use crate::extraction::ExtractionReport;
use crate::state::AppState;
use crate::store::{DiscardSink, ResumeId};

#[derive(Deserialize)]
pub struct ExtractTextRequest {
    pub text: String,
}

#[derive(Deserialize)]
pub struct BatchExtractRequest {
    pub resume_ids: Vec<ResumeId>,
}

#[derive(Debug, Serialize)]
pub struct BatchItem {
    pub resume_id: ResumeId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ExtractionReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BatchExtractResponse {
    pub results: Vec<BatchItem>,
    pub succeeded: usize,
    pub failed: usize,
}

/// POST /api/v1/extract
/// Runs every resolver over raw text without storing anything.
pub async fn handle_extract_text(
    State(state): State<AppState>,
    Json(req): Json<ExtractTextRequest>,
) -> Result<Json<ExtractionReport>, AppError> {
    if req.text.trim().is_empty() {
        return Err(AppError::Validation("text must not be empty".to_string()));
    }
    let report = state
        .extractor
        .extract(
            None,
            &req.text,
            state.backend.as_ref(),
            state.prompts.as_ref(),
            &DiscardSink,
        )
        .await?;
    Ok(Json(report))
}

/// POST /api/v1/resumes/:id/extract
pub async fn handle_extract_resume(
    State(state): State<AppState>,
    Path(id): Path<ResumeId>,
) -> Result<Json<ExtractionReport>, AppError> {
    Ok(Json(extract_stored(&state, id).await?))
}

/// POST /api/v1/resumes/extract-batch
pub async fn handle_extract_batch(
    State(state): State<AppState>,
    Json(req): Json<BatchExtractRequest>,
) -> Result<Json<BatchExtractResponse>, AppError> {
    if req.resume_ids.is_empty() {
        return Err(AppError::Validation("resume_ids must not be empty".to_string()));
    }

    let mut seen = HashSet::new();
    let ids: Vec<ResumeId> = req
        .resume_ids
        .into_iter()
        .filter(|id| seen.insert(*id))
        .collect();
    info!(
        documents = ids.len(),
        workers = state.config.batch_concurrency,
        "Batch extraction started"
    );

    let results = run_batch(&state, ids).await;
    let failed = results.iter().filter(|item| item.error.is_some()).count();
    info!(succeeded = results.len() - failed, failed, "Batch extraction finished");

    Ok(Json(BatchExtractResponse {
        succeeded: results.len() - failed,
        failed,
        results,
    }))
}

/// Loads stored text, extracts, and writes each field back as it becomes final.
pub async fn extract_stored(
    state: &AppState,
    resume_id: ResumeId,
) -> Result<ExtractionReport, AppError> {
    let text = state
        .texts
        .document_text(resume_id)
        .await?
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| AppError::NotFound(format!("Resume {resume_id} not found")))?;

    let sink = state.store().sink_for(resume_id);
    state
        .extractor
        .extract(
            Some(resume_id),
            &text,
            state.backend.as_ref(),
            state.prompts.as_ref(),
            &sink,
        )
        .await
}

/// Extracts every id with at most `batch_concurrency` documents in flight.
/// Results keep the order of `ids`. Dropping the returned future aborts all
/// outstanding workers.
async fn run_batch(state: &AppState, ids: Vec<ResumeId>) -> Vec<BatchItem> {
    let semaphore = Arc::new(Semaphore::new(state.config.batch_concurrency));
    let mut workers = JoinSet::new();

    for (index, resume_id) in ids.iter().copied().enumerate() {
        let state = state.clone();
        let semaphore = semaphore.clone();
        workers.spawn(async move {
            let outcome = match semaphore.acquire_owned().await {
                Ok(_permit) => extract_stored(&state, resume_id).await,
                Err(_) => Err(AppError::Internal(anyhow::anyhow!("batch worker pool closed"))),
            };
            (index, outcome)
        });
    }

    let mut slots: Vec<Option<Result<ExtractionReport, String>>> =
        ids.iter().map(|_| None).collect();
    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok((index, outcome)) => {
                if let Some(slot) = slots.get_mut(index) {
                    *slot = Some(outcome.map_err(|e| e.to_string()));
                }
            }
            Err(e) => error!("Batch worker failed: {e}"),
        }
    }

    ids.into_iter()
        .zip(slots)
        .map(|(resume_id, slot)| match slot {
            Some(Ok(report)) => BatchItem {
                resume_id,
                report: Some(report),
                error: None,
            },
            Some(Err(message)) => BatchItem {
                resume_id,
                report: None,
                error: Some(message),
            },
            None => BatchItem {
                resume_id,
                report: None,
                error: Some("worker did not complete".to_string()),
            },
        })
        .collect()
}
