use super::config::AppConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestValidationError {
    PayloadTooLarge(String),
    BadRequest(String),
}

/// Rejects a batch before any temp file, network call, or store write
/// happens. Per-item content problems are handled later by the coordinator;
/// this layer only bounds the request shape.
pub fn validate_ingest_batch(
    config: &AppConfig,
    file_count: usize,
    texts: &[String],
    links: &[String],
) -> Result<(), IngestValidationError> {
    if file_count > config.ingest_max_files {
        return Err(IngestValidationError::BadRequest(format!(
            "Too many files. Maximum allowed is {}",
            config.ingest_max_files
        )));
    }

    if texts.len() > config.ingest_max_texts {
        return Err(IngestValidationError::BadRequest(format!(
            "Too many text snippets. Maximum allowed is {}",
            config.ingest_max_texts
        )));
    }

    if links.len() > config.ingest_max_links {
        return Err(IngestValidationError::BadRequest(format!(
            "Too many links. Maximum allowed is {}",
            config.ingest_max_links
        )));
    }

    if let Some(text) = texts
        .iter()
        .find(|text| text.len() > config.ingest_max_text_bytes)
    {
        return Err(IngestValidationError::PayloadTooLarge(format!(
            "A text snippet of {} bytes exceeds the maximum of {} bytes",
            text.len(),
            config.ingest_max_text_bytes
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_ingest_batch_rejects_too_many_files() {
        let config = AppConfig {
            ingest_max_files: 1,
            ..Default::default()
        };
        let result = validate_ingest_batch(&config, 2, &[], &[]);

        assert!(matches!(result, Err(IngestValidationError::BadRequest(_))));
    }

    #[test]
    fn validate_ingest_batch_rejects_oversized_text() {
        let config = AppConfig {
            ingest_max_text_bytes: 4,
            ..Default::default()
        };
        let result = validate_ingest_batch(&config, 0, &["12345".to_string()], &[]);

        assert!(matches!(
            result,
            Err(IngestValidationError::PayloadTooLarge(_))
        ));
    }

    #[test]
    fn validate_ingest_batch_rejects_too_many_links() {
        let config = AppConfig {
            ingest_max_links: 2,
            ..Default::default()
        };
        let links = vec![
            "https://a.example".to_string(),
            "https://b.example".to_string(),
            "https://c.example".to_string(),
        ];
        let result = validate_ingest_batch(&config, 0, &[], &links);

        assert!(matches!(result, Err(IngestValidationError::BadRequest(_))));
    }

    #[test]
    fn validate_ingest_batch_accepts_empty_batch() {
        let config = AppConfig::default();
        assert!(validate_ingest_batch(&config, 0, &[], &[]).is_ok());
    }
}
