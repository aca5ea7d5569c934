use std::path::Path;

use tracing::warn;

use common::error::AppError;

use super::RawDocument;

/// Reads a CSV file into one raw unit per row, rendered as `header: value`
/// lines in column order. A malformed row is skipped with a warning; an
/// unreadable header row fails the whole file.
pub async fn load_csv(path: &Path) -> Result<Vec<RawDocument>, AppError> {
    let path = path.to_path_buf();

    tokio::task::spawn_blocking(move || {
        let mut reader = csv::Reader::from_path(&path)
            .map_err(|err| AppError::Processing(format!("Failed to open CSV: {err}")))?;

        let headers = reader
            .headers()
            .map_err(|err| AppError::Processing(format!("Failed to read CSV header: {err}")))?
            .clone();

        let mut documents = Vec::new();
        for (row_number, record) in reader.records().enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(err) => {
                    warn!(row = row_number + 1, error = %err, "Skipping malformed CSV row");
                    continue;
                }
            };

            let text = headers
                .iter()
                .zip(record.iter())
                .map(|(header, value)| format!("{header}: {value}"))
                .collect::<Vec<String>>()
                .join("\n");

            if text.trim().is_empty() {
                continue;
            }

            documents.push(RawDocument::new(
                text,
                Some(format!("row {}", row_number + 1)),
            ));
        }

        Ok(documents)
    })
    .await?
}
