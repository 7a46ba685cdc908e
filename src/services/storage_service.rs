use std::path::{Path, PathBuf};

use tokio::fs;
use uuid::Uuid;

use crate::error::{Error, Result};

const ALLOWED_EXTENSIONS: [&str; 5] = ["pdf", "doc", "docx", "rtf", "txt"];

/// A CV written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub path: String,
    pub original_name: String,
    pub content_type: String,
}

/// Local-disk store for uploaded CVs, keyed by generated file names.
#[derive(Clone)]
pub struct CvStorage {
    root: PathBuf,
}

impl CvStorage {
    pub fn new(uploads_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: uploads_dir.into().join("cv"),
        }
    }

    pub async fn save(&self, original_name: &str, data: &[u8]) -> Result<StoredFile> {
        if data.is_empty() {
            return Err(Error::BadRequest("Uploaded CV is empty".into()));
        }
        let ext = extension_of(original_name);
        check_content(&ext, data)?;

        fs::create_dir_all(&self.root).await?;
        let path = self.root.join(format!("{}.{}", Uuid::new_v4(), ext));
        fs::write(&path, data).await.map_err(|e| {
            tracing::error!("Failed to write CV file: {}", e);
            Error::Internal(format!("Failed to save file: {}", e))
        })?;

        Ok(StoredFile {
            path: path.to_string_lossy().into_owned(),
            original_name: sanitize_name(original_name),
            content_type: content_type_for(&ext).to_string(),
        })
    }

    /// Reads a stored CV back. Paths outside the storage root are refused.
    pub async fn open(&self, path: &str) -> Result<Vec<u8>> {
        let candidate = Path::new(path);
        if !candidate.starts_with(&self.root)
            || candidate
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(Error::NotFound("File not found".into()));
        }
        match fs::read(candidate).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::NotFound("File not found".into()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Deletes a CV whose submission could not be recorded. Failure is
    /// logged and otherwise ignored.
    pub async fn discard(&self, path: &str) {
        if !Path::new(path).starts_with(&self.root) {
            return;
        }
        if let Err(e) = fs::remove_file(path).await {
            tracing::warn!(error = %e, %path, "Failed to remove orphaned CV file");
        }
    }
}

fn extension_of(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default()
}

fn check_content(ext: &str, data: &[u8]) -> Result<()> {
    if !ALLOWED_EXTENSIONS.contains(&ext) {
        return Err(Error::BadRequest(format!(
            "File type .{} is not allowed; upload one of: {}",
            ext,
            ALLOWED_EXTENSIONS.join(", ")
        )));
    }
    if ext == "pdf" && !data.starts_with(b"%PDF") {
        return Err(Error::BadRequest("Invalid PDF file content".into()));
    }
    // docx is a zip container, legacy doc an OLE compound file
    if ext == "docx" && !data.starts_with(b"PK\x03\x04") {
        return Err(Error::BadRequest("Invalid DOCX file content".into()));
    }
    if ext == "doc" && !data.starts_with(&[0xD0, 0xCF, 0x11, 0xE0]) {
        return Err(Error::BadRequest("Invalid DOC file content".into()));
    }
    Ok(())
}

pub fn content_type_for(ext: &str) -> &'static str {
    match ext {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "rtf" => "application/rtf",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

fn sanitize_name(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("cv");
    base.chars()
        .map(|c| if c.is_control() || c == '"' { '_' } else { c })
        .collect()
}
