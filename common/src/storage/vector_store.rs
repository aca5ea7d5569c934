use std::sync::Arc;

use tokio_retry::{
    strategy::{jitter, ExponentialBackoff},
    Retry,
};
use tracing::{debug, warn};

use crate::{
    error::AppError,
    storage::{
        db::SurrealDbClient,
        types::{
            document_chunk::{DocumentChunk, NormalizedDocument},
            StoredObject,
        },
    },
    utils::embedding::EmbeddingProvider,
};

/// Breadth of the HNSW candidate pool consulted per KNN query.
const KNN_EFFORT: usize = 40;

/// A chunk plus its relevance score for one query, higher is better.
#[derive(Debug, Clone)]
pub struct RetrievedChunk {
    pub chunk: DocumentChunk,
    pub score: f32,
}

/// Facade over the chunk table: embeds on write, embeds and ranks on read.
/// The ingestion coordinator is the only writer; retrieval is read-only and
/// always scoped by owner.
#[derive(Clone)]
pub struct VectorStore {
    db: Arc<SurrealDbClient>,
    embedder: EmbeddingProvider,
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a <= 0.0 || norm_b <= 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

impl VectorStore {
    pub fn new(db: Arc<SurrealDbClient>, embedder: EmbeddingProvider) -> Self {
        Self { db, embedder }
    }

    pub fn db(&self) -> &Arc<SurrealDbClient> {
        &self.db
    }

    /// Defines the KNN index for the embedding dimension of the active
    /// backend. Must run before the first write.
    pub async fn ensure_index(&self) -> Result<(), AppError> {
        self.db
            .define_chunk_index(self.embedder.dimension())
            .await
            .map_err(AppError::from)
    }

    /// Embeds and writes a set of normalized documents. Writes are
    /// at-least-once: rows already written stay in place when a later write
    /// in the same set fails.
    pub async fn add_documents(
        &self,
        documents: Vec<NormalizedDocument>,
    ) -> Result<usize, AppError> {
        let documents: Vec<NormalizedDocument> = documents
            .into_iter()
            .filter(|doc| {
                if doc.text.trim().is_empty() {
                    warn!(
                        source = %doc.metadata.source_name,
                        chunk_index = doc.metadata.chunk_index,
                        "Dropping empty chunk before write"
                    );
                    return false;
                }
                true
            })
            .collect();

        if documents.is_empty() {
            return Ok(0);
        }

        if let Some(doc) = documents.iter().find(|d| d.metadata.user_id.is_empty()) {
            return Err(AppError::Internal(format!(
                "Chunk from {} reached the store without an owner",
                doc.metadata.source_name
            )));
        }

        let texts: Vec<String> = documents.iter().map(|doc| doc.text.clone()).collect();

        let retry_strategy = ExponentialBackoff::from_millis(100).map(jitter).take(3);
        let embeddings = Retry::spawn(retry_strategy, || self.embedder.embed_batch(texts.clone()))
            .await
            .map_err(AppError::from)?;

        if embeddings.len() != documents.len() {
            return Err(AppError::Internal(format!(
                "Embedding backend returned {} vectors for {} chunks",
                embeddings.len(),
                documents.len()
            )));
        }

        let mut written = 0;
        for (doc, embedding) in documents.into_iter().zip(embeddings) {
            let chunk = DocumentChunk::new(doc.text, embedding, doc.metadata);
            self.db.store_item(chunk).await?;
            written += 1;
        }

        debug!(written, "Wrote chunk batch to vector store");
        Ok(written)
    }

    /// KNN search over the owner's chunks, at most `k` results in descending
    /// relevance. The owner filter is part of the query itself, not applied
    /// after the fact.
    pub async fn similarity_search(
        &self,
        query: &str,
        user_id: &str,
        k: usize,
    ) -> Result<Vec<RetrievedChunk>, AppError> {
        if user_id.trim().is_empty() {
            return Err(AppError::Validation(
                "Owner id must not be empty".to_string(),
            ));
        }
        if k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await.map_err(AppError::from)?;

        let knn_query = format!(
            "SELECT *, vector::distance::knn() AS distance FROM {table} \
             WHERE user_id = $user_id AND embedding <|{k},{KNN_EFFORT}|> {embedding:?} \
             ORDER BY distance",
            table = DocumentChunk::table_name(),
            embedding = query_embedding,
        );

        let mut response = self
            .db
            .query(knn_query)
            .bind(("user_id", user_id.to_string()))
            .await?;
        let rows: Vec<DocumentChunk> = response.take(0)?;

        Ok(rows
            .into_iter()
            .map(|chunk| RetrievedChunk {
                score: cosine_similarity(&query_embedding, &chunk.embedding),
                chunk,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::types::document_chunk::{ChunkMetadata, SourceKind};
    use uuid::Uuid;

    const TEST_DIMENSION: usize = 16;

    async fn setup_store() -> VectorStore {
        let namespace = "test_ns";
        let database = &Uuid::new_v4().to_string();
        let db = Arc::new(
            SurrealDbClient::memory(namespace, database)
                .await
                .expect("Failed to start in-memory surrealdb"),
        );
        let store = VectorStore::new(db, EmbeddingProvider::new_hashed(TEST_DIMENSION));
        store.ensure_index().await.expect("Failed to define index");
        store
    }

    fn doc(text: &str, user_id: &str, index: u32) -> NormalizedDocument {
        NormalizedDocument {
            text: text.to_string(),
            metadata: ChunkMetadata {
                source_name: "notes.txt".to_string(),
                source_kind: SourceKind::Text,
                source_url: None,
                chunk_index: index,
                user_id: user_id.to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_add_documents_writes_rows() {
        let store = setup_store().await;

        let written = store
            .add_documents(vec![
                doc("tokio uses cooperative scheduling", "user_a", 0),
                doc("hyper drives http connections", "user_a", 1),
            ])
            .await
            .expect("write failed");

        assert_eq!(written, 2);

        let rows: Vec<DocumentChunk> = store
            .db
            .get_all_stored_items()
            .await
            .expect("select failed");
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.user_id == "user_a"));
    }

    #[tokio::test]
    async fn test_add_documents_skips_empty_chunks() {
        let store = setup_store().await;

        let written = store
            .add_documents(vec![doc("   ", "user_a", 0), doc("real text", "user_a", 1)])
            .await
            .expect("write failed");

        assert_eq!(written, 1);
    }

    #[tokio::test]
    async fn test_add_documents_rejects_missing_owner() {
        let store = setup_store().await;

        let result = store.add_documents(vec![doc("text", "", 0)]).await;

        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn test_similarity_search_is_scoped_to_owner() {
        let store = setup_store().await;

        store
            .add_documents(vec![
                doc("rust ownership and borrowing", "owner_one", 0),
                doc("rust lifetimes explained", "owner_one", 1),
            ])
            .await
            .expect("write failed");

        let other = store
            .similarity_search("rust ownership", "owner_two", 4)
            .await
            .expect("search failed");
        assert!(
            other.is_empty(),
            "Another owner must never see these chunks"
        );

        let own = store
            .similarity_search("rust ownership", "owner_one", 4)
            .await
            .expect("search failed");
        assert!(!own.is_empty());
        assert!(own.iter().all(|hit| hit.chunk.user_id == "owner_one"));
    }

    #[tokio::test]
    async fn test_similarity_search_bounds_result_count() {
        let store = setup_store().await;

        let docs = (0..6)
            .map(|i| doc(&format!("chunk number {i} about databases"), "user_a", i))
            .collect();
        store.add_documents(docs).await.expect("write failed");

        let hits = store
            .similarity_search("databases", "user_a", 3)
            .await
            .expect("search failed");
        assert!(hits.len() <= 3);

        let scores: Vec<f32> = hits.iter().map(|hit| hit.score).collect();
        let mut sorted = scores.clone();
        sorted.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
        assert_eq!(scores, sorted, "Results must be in descending relevance");
    }

    #[tokio::test]
    async fn test_similarity_search_empty_store_is_not_an_error() {
        let store = setup_store().await;

        let hits = store
            .similarity_search("anything at all", "user_a", 4)
            .await
            .expect("search failed");
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_similarity_search_rejects_blank_owner() {
        let store = setup_store().await;

        let result = store.similarity_search("query", "  ", 4).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
