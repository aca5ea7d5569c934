use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use axum_typed_multipart::{FieldData, TryFromMultipart, TypedMultipart};
use serde_json::json;
use tempfile::NamedTempFile;
use tracing::info;

use common::utils::ingest_limits::validate_ingest_batch;
use ingestion_pipeline::{IngestionBatch, StagedUpload};

use crate::{api_state::ApiState, error::ApiError, middleware_client_identity::ClientId};

#[derive(Debug, TryFromMultipart)]
pub struct ContentBatchParams {
    #[form_data(limit = "25000000")]
    #[form_data(default)]
    pub pdf_files: Vec<FieldData<NamedTempFile>>,
    #[form_data(limit = "25000000")]
    #[form_data(default)]
    pub csv_files: Vec<FieldData<NamedTempFile>>,
    #[form_data(default)]
    pub texts: Vec<String>,
    #[form_data(default)]
    pub links: Vec<String>,
}

/// Multipart ingest endpoint. Validates the request shape before any
/// resource is touched, then hands the staged batch to the coordinator.
pub async fn ingest_content(
    State(state): State<ApiState>,
    Extension(client): Extension<ClientId>,
    TypedMultipart(input): TypedMultipart<ContentBatchParams>,
) -> Result<impl IntoResponse, ApiError> {
    let file_count = input.pdf_files.len() + input.csv_files.len();

    info!(
        client_id = %client.0,
        pdf_count = input.pdf_files.len(),
        csv_count = input.csv_files.len(),
        text_count = input.texts.len(),
        link_count = input.links.len(),
        "Received ingestion request"
    );

    validate_ingest_batch(&state.config, file_count, &input.texts, &input.links)?;

    let batch = IngestionBatch {
        pdf_files: stage_uploads(input.pdf_files)?,
        csv_files: stage_uploads(input.csv_files)?,
        texts: input.texts,
        links: input.links,
    };

    let summary = state.coordinator.ingest(batch, &client.0).await?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": format!("Successfully processed {} document chunks", summary.total_chunks),
            "summary": summary,
        })),
    ))
}

fn stage_uploads(files: Vec<FieldData<NamedTempFile>>) -> Result<Vec<StagedUpload>, ApiError> {
    files
        .into_iter()
        .map(|field| {
            let file_name = field
                .metadata
                .file_name
                .ok_or_else(|| ApiError::ValidationError("Uploaded file has no name".to_string()))?;
            Ok(StagedUpload::new(field.contents, file_name))
        })
        .collect()
}
