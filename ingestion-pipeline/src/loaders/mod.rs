pub mod csv;
pub mod pdf;
pub mod web;

use tempfile::NamedTempFile;

/// One raw text unit extracted from a source, before chunking. `section` is
/// the loader's native segmentation label (a page number, a row number),
/// kept for logging only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    pub text: String,
    pub section: Option<String>,
}

impl RawDocument {
    pub fn new(text: String, section: Option<String>) -> Self {
        Self { text, section }
    }
}

/// An uploaded file staged on disk for the duration of one ingest call.
/// The temp file is deleted when the value drops, on every exit path.
#[derive(Debug)]
pub struct StagedUpload {
    pub file: NamedTempFile,
    pub file_name: String,
}

impl StagedUpload {
    pub fn new(file: NamedTempFile, file_name: String) -> Self {
        Self { file, file_name }
    }

    pub fn path(&self) -> &std::path::Path {
        self.file.path()
    }
}
