use serde::Serialize;

/// Success/failure tally for one content kind within a batch. Values are
/// immutable once a kind finishes; the batch total is a pure fold over them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KindSummary {
    pub processed: u32,
    pub failed: u32,
    pub total_chunks: u32,
}

impl KindSummary {
    pub fn record_success(&mut self, chunks_created: u32) {
        self.processed += 1;
        self.total_chunks += chunks_created;
    }

    pub fn record_failure(&mut self) {
        self.failed += 1;
    }
}

/// The per-kind counters returned from one ingest call, plus the grand
/// total. Returned once, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionSummary {
    pub pdfs: KindSummary,
    pub csvs: KindSummary,
    pub texts: KindSummary,
    pub links: KindSummary,
    pub total_chunks: u32,
}

impl IngestionSummary {
    pub fn new(
        pdfs: KindSummary,
        csvs: KindSummary,
        texts: KindSummary,
        links: KindSummary,
    ) -> Self {
        let total_chunks =
            pdfs.total_chunks + csvs.total_chunks + texts.total_chunks + links.total_chunks;
        Self {
            pdfs,
            csvs,
            texts,
            links,
            total_chunks,
        }
    }

    pub fn empty() -> Self {
        Self::new(
            KindSummary::default(),
            KindSummary::default(),
            KindSummary::default(),
            KindSummary::default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_summary_counts() {
        let mut summary = KindSummary::default();
        summary.record_success(5);
        summary.record_success(0);
        summary.record_failure();

        assert_eq!(summary.processed, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.total_chunks, 5);
    }

    #[test]
    fn test_total_is_the_sum_across_kinds() {
        let mut pdfs = KindSummary::default();
        pdfs.record_success(3);
        let mut links = KindSummary::default();
        links.record_success(2);

        let summary =
            IngestionSummary::new(pdfs, KindSummary::default(), KindSummary::default(), links);

        assert_eq!(summary.total_chunks, 5);
    }

    #[test]
    fn test_empty_summary_is_all_zero() {
        let summary = IngestionSummary::empty();

        assert_eq!(summary.total_chunks, 0);
        assert_eq!(summary.pdfs, KindSummary::default());
        assert_eq!(summary.links, KindSummary::default());
    }

    #[test]
    fn test_summary_serializes_with_camel_case_fields() {
        let json = serde_json::to_value(IngestionSummary::empty()).expect("serialize");

        assert!(json.get("totalChunks").is_some());
        assert!(json["pdfs"].get("totalChunks").is_some());
        assert!(json["pdfs"].get("processed").is_some());
    }
}
