use crate::config::Config;
use crate::error::IngestError;
use crate::process::{parse_bytes, process_rows, validate_rows, DashboardData, RawRow};
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

const PREVIEW_ROWS: usize = 5;

/// What the uploader shows about an accepted file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePreview {
    pub file_name: String,
    pub file_size: u64,
    pub row_count: usize,
    pub column_count: usize,
    pub preview_rows: Vec<RawRow>,
}

impl FilePreview {
    fn build(file_name: &str, file_size: u64, rows: &[RawRow]) -> Self {
        Self {
            file_name: file_name.to_string(),
            file_size,
            row_count: rows.len(),
            column_count: rows.first().map_or(0, RawRow::len),
            preview_rows: rows.iter().take(PREVIEW_ROWS).cloned().collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Upload {
    pub preview: FilePreview,
    pub data: DashboardData,
}

/// Parse, validate and process an in-memory upload. Each stage runs only
/// after the previous one succeeded.
pub fn ingest_bytes(file_name: &str, bytes: &[u8]) -> Result<Upload, IngestError> {
    let rows = parse_bytes(bytes)?;

    let validation = validate_rows(&rows);
    if !validation.is_valid {
        warn!(file = file_name, errors = ?validation.errors, "upload rejected");
        return Err(IngestError::Validation(validation));
    }

    let data = process_rows(&rows);
    let preview = FilePreview::build(file_name, bytes.len() as u64, &rows);
    info!(
        file = file_name,
        rows = preview.row_count,
        columns = preview.column_count,
        "upload processed"
    );
    Ok(Upload { preview, data })
}

/// Size-check, read and ingest a file from disk.
#[tracing::instrument(level = "info", skip(path, config), fields(path = %path.as_ref().display()))]
pub async fn ingest_file<P: AsRef<Path>>(path: P, config: &Config) -> Result<Upload, IngestError> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let read_err = |source: std::io::Error| IngestError::Read {
        path: path.to_path_buf(),
        source,
    };
    let size = tokio::fs::metadata(path).await.map_err(read_err)?.len();
    if size > config.max_file_bytes {
        return Err(IngestError::TooLarge {
            name,
            size,
            limit: config.max_file_bytes,
        });
    }
    if !name.to_lowercase().ends_with(".csv") {
        warn!(file = %name, "file does not have a .csv extension");
    }

    let bytes = tokio::fs::read(path).await.map_err(read_err)?;
    ingest_bytes(&name, &bytes)
}
