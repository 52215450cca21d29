use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, State},
};
use findoc_core::{AnalysisRecord, AnalysisRequest, AnalysisResult, DEFAULT_QUERY, persist_record};
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub status: &'static str,
    pub output_file: String,
    pub analysis: AnalysisResult,
}

struct Upload {
    file_name: String,
    bytes: Bytes,
    query: String,
}

#[instrument(skip_all)]
pub async fn analyze_document(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let upload = read_upload(multipart).await?;

    tokio::fs::create_dir_all(state.upload_dir())
        .await
        .map_err(AppError::internal)?;

    let file_id = Uuid::new_v4().to_string();
    let input_path = state.upload_dir().join(format!("upload_{file_id}.pdf"));
    tokio::fs::write(&input_path, &upload.bytes)
        .await
        .map_err(AppError::internal)?;

    info!(
        file_name = %upload.file_name,
        path = %input_path.display(),
        "upload saved, starting pipeline"
    );

    let request = AnalysisRequest::new(upload.query.clone(), input_path.clone());
    let outcome = state.analyzer().analyze(&request).await;

    // The upload is scoped to this request: remove it on success and failure
    // alike, and never let a removal error mask the pipeline outcome.
    if let Err(err) = tokio::fs::remove_file(&input_path).await {
        warn!(path = %input_path.display(), error = %err, "failed to remove uploaded file");
    }

    let analysis = outcome.map_err(AppError::from)?;

    let record = AnalysisRecord::new(
        upload.file_name,
        input_path.display().to_string(),
        upload.query,
        analysis.clone(),
    );
    let output_path = persist_record(state.output_dir(), &file_id, &record)?;

    info!(output_file = %output_path.display(), "analysis complete");

    Ok(Json(AnalyzeResponse {
        status: "success",
        output_file: output_path.display().to_string(),
        analysis,
    }))
}

/// Pull the `file` and `query` fields out of the multipart form, rejecting
/// bad uploads before any disk or pipeline work happens.
async fn read_upload(mut multipart: Multipart) -> Result<Upload, AppError> {
    let mut file_name: Option<String> = None;
    let mut bytes: Option<Bytes> = None;
    let mut query: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::bad_request(format!("invalid multipart payload: {err}")))?
    {
        match field.name() {
            Some("file") => {
                file_name = field.file_name().map(str::to_string);
                bytes = Some(field.bytes().await.map_err(|err| {
                    AppError::bad_request(format!("failed to read upload: {err}"))
                })?);
            }
            Some("query") => {
                query = Some(field.text().await.map_err(|err| {
                    AppError::bad_request(format!("failed to read query: {err}"))
                })?);
            }
            _ => {}
        }
    }

    let Some(bytes) = bytes else {
        return Err(AppError::bad_request("A PDF file upload is required."));
    };

    let file_name = file_name
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AppError::bad_request("Uploaded file must have a filename."))?;

    if !file_name.to_lowercase().ends_with(".pdf") {
        return Err(AppError::bad_request("Only PDF uploads are supported."));
    }

    if bytes.is_empty() {
        return Err(AppError::bad_request("Uploaded file is empty."));
    }

    let query = query
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_QUERY.to_string());

    Ok(Upload {
        file_name,
        bytes,
        query,
    })
}
