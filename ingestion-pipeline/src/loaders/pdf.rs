use std::path::Path;

use tracing::debug;

use common::error::AppError;

use super::RawDocument;

/// Extracts the text layer of a PDF, one raw unit per page. Parsing runs on
/// the blocking pool; `pdf-extract` walks the whole document in one pass.
/// A corrupt file or a document without any extractable text is a
/// recoverable per-file error.
pub async fn load_pdf(path: &Path) -> Result<Vec<RawDocument>, AppError> {
    let pdf_bytes = tokio::fs::read(path).await?;

    let pages = tokio::task::spawn_blocking(move || {
        pdf_extract::extract_text_from_mem_by_pages(&pdf_bytes)
            .map_err(|err| AppError::Processing(format!("Failed to extract text from PDF: {err}")))
    })
    .await??;

    let documents: Vec<RawDocument> = pages
        .into_iter()
        .enumerate()
        .filter_map(|(index, page_text)| {
            let trimmed = page_text.trim();
            if trimmed.is_empty() {
                return None;
            }
            Some(RawDocument::new(
                trimmed.to_string(),
                Some(format!("page {}", index + 1)),
            ))
        })
        .collect();

    if documents.is_empty() {
        return Err(AppError::Processing(
            "PDF contains no extractable text".to_string(),
        ));
    }

    debug!(pages = documents.len(), "Extracted PDF text layer");
    Ok(documents)
}
