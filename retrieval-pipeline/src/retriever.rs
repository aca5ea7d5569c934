use tracing::{debug, instrument};

use common::{
    error::AppError,
    storage::vector_store::{RetrievedChunk, VectorStore},
};

/// Fetches the top-k chunks for one owner. The owner filter lives inside the
/// store query; the assertion here only guards against regressions in that
/// query.
#[instrument(skip_all, fields(user_id = %user_id, k))]
pub async fn retrieve_context(
    store: &VectorStore,
    query: &str,
    user_id: &str,
    k: usize,
) -> Result<Vec<RetrievedChunk>, AppError> {
    let chunks = store.similarity_search(query, user_id, k).await?;

    debug_assert!(
        chunks.iter().all(|hit| hit.chunk.user_id == user_id),
        "similarity search must never cross the owner boundary"
    );

    debug!(hits = chunks.len(), "Retrieved context chunks");
    Ok(chunks)
}

/// Renders retrieved chunks into the provenance-labelled context block the
/// answer prompt embeds.
pub fn format_context(chunks: &[RetrievedChunk]) -> String {
    chunks
        .iter()
        .enumerate()
        .map(|(index, hit)| {
            format!(
                "[Document {} - {}]:\n{}",
                index + 1,
                hit.chunk.source_name,
                hit.chunk.text
            )
        })
        .collect::<Vec<String>>()
        .join("\n\n")
}
