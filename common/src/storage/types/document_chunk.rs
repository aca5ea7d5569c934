use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::storage::types::StoredObject;

/// Closed set of origins a chunk can come from. Dispatch on this stays inside
/// the ingestion pipeline; retrieval and rendering never branch on it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Pdf,
    Csv,
    Text,
    Link,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Pdf => write!(f, "pdf"),
            SourceKind::Csv => write!(f, "csv"),
            SourceKind::Text => write!(f, "text"),
            SourceKind::Link => write!(f, "link"),
        }
    }
}

/// The uniform metadata envelope attached to every chunk at normalization
/// time, regardless of which loader produced the text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkMetadata {
    pub source_name: String,
    pub source_kind: SourceKind,
    pub source_url: Option<String>,
    pub chunk_index: u32,
    pub user_id: String,
}

/// A chunk plus its metadata, ready for embedding and storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedDocument {
    pub text: String,
    pub metadata: ChunkMetadata,
}

/// The atomic retrievable unit. Rows are immutable once written;
/// re-ingesting a source writes new rows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentChunk {
    #[serde(deserialize_with = "crate::storage::types::surreal_serde::deserialize_flexible_id")]
    pub id: String,
    #[serde(
        serialize_with = "crate::storage::types::surreal_serde::serialize_datetime",
        deserialize_with = "crate::storage::types::surreal_serde::deserialize_datetime",
        default
    )]
    pub created_at: DateTime<Utc>,
    #[serde(
        serialize_with = "crate::storage::types::surreal_serde::serialize_datetime",
        deserialize_with = "crate::storage::types::surreal_serde::deserialize_datetime",
        default
    )]
    pub updated_at: DateTime<Utc>,
    pub text: String,
    pub embedding: Vec<f32>,
    pub source_name: String,
    pub source_kind: SourceKind,
    pub source_url: Option<String>,
    pub chunk_index: u32,
    pub user_id: String,
}

impl StoredObject for DocumentChunk {
    fn table_name() -> &'static str {
        "document_chunk"
    }

    fn get_id(&self) -> &str {
        &self.id
    }
}

impl DocumentChunk {
    pub fn new(text: String, embedding: Vec<f32>, metadata: ChunkMetadata) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            text,
            embedding,
            source_name: metadata.source_name,
            source_kind: metadata.source_kind,
            source_url: metadata.source_url,
            chunk_index: metadata.chunk_index,
            user_id: metadata.user_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata_for(user_id: &str) -> ChunkMetadata {
        ChunkMetadata {
            source_name: "report.pdf".to_string(),
            source_kind: SourceKind::Pdf,
            source_url: None,
            chunk_index: 3,
            user_id: user_id.to_string(),
        }
    }

    #[test]
    fn test_document_chunk_creation() {
        let chunk = DocumentChunk::new(
            "The quarterly numbers improved".to_string(),
            vec![0.1, 0.2, 0.3],
            metadata_for("user123"),
        );

        assert_eq!(chunk.text, "The quarterly numbers improved");
        assert_eq!(chunk.source_name, "report.pdf");
        assert_eq!(chunk.source_kind, SourceKind::Pdf);
        assert_eq!(chunk.source_url, None);
        assert_eq!(chunk.chunk_index, 3);
        assert_eq!(chunk.user_id, "user123");
        assert!(!chunk.id.is_empty());
    }

    #[test]
    fn test_source_kind_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&SourceKind::Link).expect("serialize"),
            "\"link\""
        );
        assert_eq!(
            serde_json::from_str::<SourceKind>("\"csv\"").expect("deserialize"),
            SourceKind::Csv
        );
    }

    #[test]
    fn test_distinct_chunks_get_distinct_ids() {
        let a = DocumentChunk::new("a".to_string(), vec![0.0], metadata_for("u"));
        let b = DocumentChunk::new("a".to_string(), vec![0.0], metadata_for("u"));
        assert_ne!(a.id, b.id);
    }
}
