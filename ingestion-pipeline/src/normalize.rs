use common::storage::types::document_chunk::{ChunkMetadata, NormalizedDocument, SourceKind};

/// Provenance of one ingested source, stated once and stamped onto every
/// chunk cut from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkSource {
    pub name: String,
    pub kind: SourceKind,
    pub url: Option<String>,
}

impl ChunkSource {
    pub fn pdf(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: SourceKind::Pdf,
            url: None,
        }
    }

    pub fn csv(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: SourceKind::Csv,
            url: None,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: SourceKind::Text,
            url: None,
        }
    }

    pub fn link(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            name: url.clone(),
            kind: SourceKind::Link,
            url: Some(url),
        }
    }
}

/// Attaches the uniform metadata envelope to one chunk. Pure and total:
/// identical inputs always produce identical output, and no source kind is
/// special-cased downstream of this seam.
pub fn normalize_chunk(
    text: &str,
    chunk_index: u32,
    source: &ChunkSource,
    user_id: &str,
) -> NormalizedDocument {
    NormalizedDocument {
        text: text.to_string(),
        metadata: ChunkMetadata {
            source_name: source.name.clone(),
            source_kind: source.kind,
            source_url: source.url.clone(),
            chunk_index,
            user_id: user_id.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_is_idempotent() {
        let source = ChunkSource::pdf("manual.pdf");

        let first = normalize_chunk("chunk text", 2, &source, "user123");
        let second = normalize_chunk("chunk text", 2, &source, "user123");

        assert_eq!(first, second);
    }

    #[test]
    fn test_link_source_carries_url() {
        let source = ChunkSource::link("https://example.com/article");
        let doc = normalize_chunk("body", 0, &source, "user123");

        assert_eq!(doc.metadata.source_kind, SourceKind::Link);
        assert_eq!(doc.metadata.source_name, "https://example.com/article");
        assert_eq!(
            doc.metadata.source_url.as_deref(),
            Some("https://example.com/article")
        );
    }

    #[test]
    fn test_file_sources_have_no_url() {
        let pdf = normalize_chunk("a", 0, &ChunkSource::pdf("a.pdf"), "u");
        let csv = normalize_chunk("b", 0, &ChunkSource::csv("b.csv"), "u");
        let text = normalize_chunk("c", 0, &ChunkSource::text("pasted-text-1"), "u");

        assert_eq!(pdf.metadata.source_url, None);
        assert_eq!(csv.metadata.source_url, None);
        assert_eq!(text.metadata.source_url, None);
        assert_eq!(pdf.metadata.source_kind, SourceKind::Pdf);
        assert_eq!(csv.metadata.source_kind, SourceKind::Csv);
        assert_eq!(text.metadata.source_kind, SourceKind::Text);
    }

    #[test]
    fn test_chunk_index_and_owner_pass_through() {
        let doc = normalize_chunk("text", 7, &ChunkSource::text("pasted-text-3"), "owner-9");

        assert_eq!(doc.metadata.chunk_index, 7);
        assert_eq!(doc.metadata.user_id, "owner-9");
    }
}
