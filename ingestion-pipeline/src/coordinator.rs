use std::{sync::Arc, time::Duration};

use tokio::time::timeout;
use tracing::{info, info_span, warn, Instrument};

use common::{error::AppError, storage::vector_store::VectorStore, utils::config::AppConfig};

use crate::{
    chunker::ChunkerConfig,
    loaders::{csv::load_csv, pdf::load_pdf, web::load_web_page, RawDocument, StagedUpload},
    normalize::{normalize_chunk, ChunkSource},
    summary::{IngestionSummary, KindSummary},
};

/// Chunk geometry for file uploads.
const FILE_CHUNK_SIZE: usize = 1000;
const FILE_CHUNK_OVERLAP: usize = 50;
/// Pasted text and link bodies carry more context across boundaries.
const FREEFORM_CHUNK_SIZE: usize = 1000;
const FREEFORM_CHUNK_OVERLAP: usize = 200;

/// One ingest request's worth of mixed-kind content. Consumed whole by
/// [`IngestionCoordinator::ingest`]; staged files are deleted when the batch
/// is dropped, whichever way processing ends.
#[derive(Debug, Default)]
pub struct IngestionBatch {
    pub pdf_files: Vec<StagedUpload>,
    pub csv_files: Vec<StagedUpload>,
    pub texts: Vec<String>,
    pub links: Vec<String>,
}

/// Fans a batch out to the per-kind pipelines and folds their tallies into
/// one summary. Kinds run concurrently; items within a kind run one at a
/// time to bound temp-file and network usage.
pub struct IngestionCoordinator {
    store: Arc<VectorStore>,
    http: reqwest::Client,
    file_chunker: ChunkerConfig,
    freeform_chunker: ChunkerConfig,
    item_timeout: Duration,
}

impl IngestionCoordinator {
    pub fn new(store: Arc<VectorStore>, config: &AppConfig) -> Result<Self, AppError> {
        let item_timeout = Duration::from_secs(config.item_timeout_secs);
        let http = reqwest::Client::builder()
            .timeout(item_timeout)
            .build()
            .map_err(AppError::from)?;

        Ok(Self {
            store,
            http,
            file_chunker: ChunkerConfig::new(FILE_CHUNK_SIZE, FILE_CHUNK_OVERLAP)?,
            freeform_chunker: ChunkerConfig::new(FREEFORM_CHUNK_SIZE, FREEFORM_CHUNK_OVERLAP)?,
            item_timeout,
        })
    }

    /// Processes a whole batch for one owner. A bad item is counted and
    /// skipped; a store or embedding failure aborts the batch since nothing
    /// sensible can be counted past that point.
    pub async fn ingest(
        &self,
        batch: IngestionBatch,
        user_id: &str,
    ) -> Result<IngestionSummary, AppError> {
        if user_id.trim().is_empty() {
            return Err(AppError::Validation(
                "Owner id must not be empty".to_string(),
            ));
        }

        let span = info_span!(
            "ingest_batch",
            user_id = %user_id,
            pdf_count = batch.pdf_files.len(),
            csv_count = batch.csv_files.len(),
            text_count = batch.texts.len(),
            link_count = batch.links.len()
        );

        async move {
            let (pdfs, csvs, texts, links) = tokio::join!(
                self.ingest_pdfs(batch.pdf_files, user_id),
                self.ingest_csvs(batch.csv_files, user_id),
                self.ingest_texts(batch.texts, user_id),
                self.ingest_links(batch.links, user_id),
            );

            let summary = IngestionSummary::new(pdfs?, csvs?, texts?, links?);
            info!(
                total_chunks = summary.total_chunks,
                "Ingestion batch complete"
            );
            Ok(summary)
        }
        .instrument(span)
        .await
    }

    async fn ingest_pdfs(
        &self,
        files: Vec<StagedUpload>,
        user_id: &str,
    ) -> Result<KindSummary, AppError> {
        let mut summary = KindSummary::default();
        for staged in files {
            match self.ingest_pdf_file(&staged, user_id).await {
                Ok(chunks) => {
                    info!(file = %staged.file_name, chunks, "PDF ingested");
                    summary.record_success(chunks);
                }
                Err(err) if err.is_fatal_for_ingest() => return Err(err),
                Err(err) => {
                    warn!(file = %staged.file_name, error = %err, "Failed to ingest PDF");
                    summary.record_failure();
                }
            }
        }
        Ok(summary)
    }

    async fn ingest_pdf_file(&self, staged: &StagedUpload, user_id: &str) -> Result<u32, AppError> {
        expect_mime(&staged.file_name, "application/pdf")?;

        let pages = timeout(self.item_timeout, load_pdf(staged.path()))
            .await
            .map_err(|_| AppError::Timeout(format!("Timed out loading PDF {}", staged.file_name)))??;

        let source = ChunkSource::pdf(staged.file_name.clone());
        self.chunk_and_store(&pages, &self.file_chunker, &source, user_id)
            .await
    }

    async fn ingest_csvs(
        &self,
        files: Vec<StagedUpload>,
        user_id: &str,
    ) -> Result<KindSummary, AppError> {
        let mut summary = KindSummary::default();
        for staged in files {
            match self.ingest_csv_file(&staged, user_id).await {
                Ok(chunks) => {
                    info!(file = %staged.file_name, chunks, "CSV ingested");
                    summary.record_success(chunks);
                }
                Err(err) if err.is_fatal_for_ingest() => return Err(err),
                Err(err) => {
                    warn!(file = %staged.file_name, error = %err, "Failed to ingest CSV");
                    summary.record_failure();
                }
            }
        }
        Ok(summary)
    }

    async fn ingest_csv_file(&self, staged: &StagedUpload, user_id: &str) -> Result<u32, AppError> {
        expect_mime(&staged.file_name, "text/csv")?;

        let rows = timeout(self.item_timeout, load_csv(staged.path()))
            .await
            .map_err(|_| AppError::Timeout(format!("Timed out loading CSV {}", staged.file_name)))??;

        let source = ChunkSource::csv(staged.file_name.clone());
        self.chunk_and_store(&rows, &self.file_chunker, &source, user_id)
            .await
    }

    async fn ingest_texts(
        &self,
        texts: Vec<String>,
        user_id: &str,
    ) -> Result<KindSummary, AppError> {
        let mut summary = KindSummary::default();
        for (index, text) in texts.into_iter().enumerate() {
            if text.trim().is_empty() {
                // A blank snippet is accepted and simply contributes nothing.
                summary.record_success(0);
                continue;
            }

            let source = ChunkSource::text(format!("pasted-text-{}", index + 1));
            let raw = [RawDocument::new(text, None)];
            match self
                .chunk_and_store(&raw, &self.freeform_chunker, &source, user_id)
                .await
            {
                Ok(chunks) => {
                    info!(source = %source.name, chunks, "Text snippet ingested");
                    summary.record_success(chunks);
                }
                Err(err) if err.is_fatal_for_ingest() => return Err(err),
                Err(err) => {
                    warn!(source = %source.name, error = %err, "Failed to ingest text snippet");
                    summary.record_failure();
                }
            }
        }
        Ok(summary)
    }

    async fn ingest_links(
        &self,
        links: Vec<String>,
        user_id: &str,
    ) -> Result<KindSummary, AppError> {
        let mut summary = KindSummary::default();
        for url in links {
            let url = url.trim();
            if url.is_empty() {
                continue;
            }

            match self.ingest_link(url, user_id).await {
                Ok(chunks) => {
                    info!(%url, chunks, "Link ingested");
                    summary.record_success(chunks);
                }
                Err(err) if err.is_fatal_for_ingest() => return Err(err),
                Err(err) => {
                    warn!(%url, error = %err, "Failed to ingest link");
                    summary.record_failure();
                }
            }
        }
        Ok(summary)
    }

    async fn ingest_link(&self, url: &str, user_id: &str) -> Result<u32, AppError> {
        let page = timeout(self.item_timeout, load_web_page(&self.http, url))
            .await
            .map_err(|_| AppError::Timeout(format!("Timed out fetching {url}")))??;

        let source = ChunkSource::link(url);
        self.chunk_and_store(
            std::slice::from_ref(&page),
            &self.freeform_chunker,
            &source,
            user_id,
        )
        .await
    }

    /// Shared tail of every kind pipeline: split the raw units, stamp the
    /// metadata envelope with a continuous chunk index, write the batch.
    async fn chunk_and_store(
        &self,
        raw: &[RawDocument],
        chunker: &ChunkerConfig,
        source: &ChunkSource,
        user_id: &str,
    ) -> Result<u32, AppError> {
        let mut documents = Vec::new();
        let mut index = 0u32;
        for unit in raw {
            for piece in chunker.split(&unit.text) {
                documents.push(normalize_chunk(&piece, index, source, user_id));
                index += 1;
            }
        }

        let written = self.store.add_documents(documents).await?;
        Ok(written as u32)
    }
}

fn expect_mime(file_name: &str, expected: &str) -> Result<(), AppError> {
    let guessed = mime_guess::from_path(file_name)
        .first_or(mime::APPLICATION_OCTET_STREAM)
        .essence_str()
        .to_string();

    if guessed != expected {
        return Err(AppError::Validation(format!(
            "{file_name} does not look like a {expected} file"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loaders::pdf::tests::staged_pdf;
    use common::storage::db::SurrealDbClient;
    use common::storage::types::document_chunk::{DocumentChunk, SourceKind};
    use common::utils::embedding::EmbeddingProvider;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use uuid::Uuid;

    const TEST_DIMENSION: usize = 16;

    async fn setup_coordinator() -> (IngestionCoordinator, Arc<VectorStore>) {
        let namespace = "test_ns";
        let database = &Uuid::new_v4().to_string();
        let db = Arc::new(
            SurrealDbClient::memory(namespace, database)
                .await
                .expect("Failed to start in-memory surrealdb"),
        );
        let store = Arc::new(VectorStore::new(
            db,
            EmbeddingProvider::new_hashed(TEST_DIMENSION),
        ));
        store.ensure_index().await.expect("Failed to define index");

        let coordinator = IngestionCoordinator::new(store.clone(), &AppConfig::default())
            .expect("Failed to build coordinator");
        (coordinator, store)
    }

    fn staged_csv(content: &str, file_name: &str) -> StagedUpload {
        let mut tmp = NamedTempFile::new().expect("temp file");
        tmp.write_all(content.as_bytes()).expect("write csv");
        tmp.flush().expect("flush csv");
        StagedUpload::new(tmp, file_name.to_string())
    }

    fn staged_junk(file_name: &str) -> StagedUpload {
        let mut tmp = NamedTempFile::new().expect("temp file");
        tmp.write_all(b"not a real document at all").expect("write");
        StagedUpload::new(tmp, file_name.to_string())
    }

    #[tokio::test]
    async fn test_empty_batch_succeeds_with_zero_counters() {
        let (coordinator, _store) = setup_coordinator().await;

        let summary = coordinator
            .ingest(IngestionBatch::default(), "user_a")
            .await
            .expect("empty batch must succeed");

        assert_eq!(summary, IngestionSummary::empty());
    }

    #[tokio::test]
    async fn test_mixed_batch_counts_per_kind() {
        let (coordinator, _store) = setup_coordinator().await;

        let batch = IngestionBatch {
            pdf_files: vec![
                StagedUpload::new(staged_pdf("First uploaded document"), "one.pdf".to_string()),
                StagedUpload::new(staged_pdf("Second uploaded document"), "two.pdf".to_string()),
                staged_junk("broken.pdf"),
            ],
            csv_files: vec![staged_csv("name,age\nAlice,30\nBob,25\n", "people.csv")],
            texts: vec![],
            links: vec![],
        };

        let summary = coordinator
            .ingest(batch, "user_a")
            .await
            .expect("batch must not abort on a corrupt item");

        assert_eq!(summary.pdfs.processed, 2);
        assert_eq!(summary.pdfs.failed, 1);
        assert_eq!(summary.csvs.processed, 1);
        assert_eq!(summary.csvs.failed, 0);
        assert_eq!(summary.pdfs.total_chunks, 2);
        assert_eq!(summary.csvs.total_chunks, 2);
        assert_eq!(
            summary.total_chunks,
            summary.pdfs.total_chunks + summary.csvs.total_chunks
        );
    }

    #[tokio::test]
    async fn test_wrong_file_type_is_a_counted_failure() {
        let (coordinator, _store) = setup_coordinator().await;

        let batch = IngestionBatch {
            pdf_files: vec![staged_junk("notes.txt")],
            ..Default::default()
        };

        let summary = coordinator.ingest(batch, "user_a").await.expect("ingest");

        assert_eq!(summary.pdfs.processed, 0);
        assert_eq!(summary.pdfs.failed, 1);
    }

    #[tokio::test]
    async fn test_blank_text_is_processed_with_zero_chunks() {
        let (coordinator, _store) = setup_coordinator().await;

        let batch = IngestionBatch {
            texts: vec!["   \n ".to_string(), "real content to keep".to_string()],
            ..Default::default()
        };

        let summary = coordinator.ingest(batch, "user_a").await.expect("ingest");

        assert_eq!(summary.texts.processed, 2);
        assert_eq!(summary.texts.failed, 0);
        assert_eq!(summary.texts.total_chunks, 1);
    }

    #[tokio::test]
    async fn test_blank_links_are_skipped_entirely() {
        let (coordinator, _store) = setup_coordinator().await;

        let batch = IngestionBatch {
            links: vec!["  ".to_string(), String::new()],
            ..Default::default()
        };

        let summary = coordinator.ingest(batch, "user_a").await.expect("ingest");

        assert_eq!(summary.links, KindSummary::default());
    }

    #[tokio::test]
    async fn test_invalid_link_is_a_counted_failure() {
        let (coordinator, _store) = setup_coordinator().await;

        let batch = IngestionBatch {
            links: vec!["definitely not a url".to_string()],
            ..Default::default()
        };

        let summary = coordinator.ingest(batch, "user_a").await.expect("ingest");

        assert_eq!(summary.links.failed, 1);
        assert_eq!(summary.links.processed, 0);
    }

    #[tokio::test]
    async fn test_chunk_indexes_are_continuous_per_source() {
        let (coordinator, store) = setup_coordinator().await;

        let batch = IngestionBatch {
            csv_files: vec![staged_csv("name,age\nAlice,30\nBob,25\n", "people.csv")],
            ..Default::default()
        };

        coordinator.ingest(batch, "user_a").await.expect("ingest");

        let mut rows: Vec<DocumentChunk> = store
            .db()
            .get_all_stored_items()
            .await
            .expect("select");
        rows.sort_by_key(|row| row.chunk_index);

        let indexes: Vec<u32> = rows.iter().map(|row| row.chunk_index).collect();
        assert_eq!(indexes, vec![0, 1]);
        assert!(rows.iter().all(|row| row.source_kind == SourceKind::Csv));
        assert!(rows.iter().all(|row| row.source_name == "people.csv"));
    }

    #[tokio::test]
    async fn test_ingest_rejects_blank_owner() {
        let (coordinator, _store) = setup_coordinator().await;

        let result = coordinator.ingest(IngestionBatch::default(), "  ").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
