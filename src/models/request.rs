use std::fs;
use std::io;
use std::path::Path;

use crate::types::BusinessId;

/// Content types an upload may declare alongside a `.csv` file name.
/// Browsers and spreadsheet exports disagree on what a CSV is called.
const ACCEPTED_CONTENT_TYPES: [&str; 4] = [
    "text/csv",
    "application/csv",
    "application/vnd.ms-excel",
    "text/plain"
];

/// A single CSV upload bound to a target business.
///
/// Immutable once received: the engine reads the buffered bytes but never
/// mutates the request.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub business_id: BusinessId,
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>
}

impl UploadRequest {
    pub fn new(business_id: BusinessId, file_name: impl Into<String>, content_type: Option<String>, data: Vec<u8>) -> Self {
        Self {
            business_id,
            file_name: file_name.into(),
            content_type,
            data
        }
    }

    /// Builds a request from a file on disk, as the CLI does. No content type
    /// is declared; admission falls back to the file extension alone.
    pub fn from_path(path: &Path, business_id: BusinessId) -> io::Result<Self> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            business_id,
            file_name,
            content_type: None,
            data: fs::read(path)?
        })
    }

    pub fn has_csv_extension(&self) -> bool {
        Path::new(&self.file_name)
            .extension()
            .is_some_and(|extension| extension.eq_ignore_ascii_case("csv"))
    }

    pub fn has_accepted_content_type(&self) -> bool {
        match self.content_type.as_deref() {
            None => true,
            Some(declared) => {
                let media_type = declared.split(';').next().unwrap_or("").trim();

                ACCEPTED_CONTENT_TYPES
                    .iter()
                    .any(|accepted| media_type.eq_ignore_ascii_case(accepted))
            }
        }
    }
}
