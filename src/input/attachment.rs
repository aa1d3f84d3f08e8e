//! Reading résumé files into inline attachments

use crate::error::{AssistantError, Result};
use crate::input::file_detector::FileType;
use crate::types::ResumeAttachment;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use log::info;
use std::path::Path;
use tokio::fs;

/// Read the whole file and base64-encode it with its MIME type.
///
/// No size or content checks are made; the declared type comes from the extension.
pub async fn read_attachment(path: &Path) -> Result<ResumeAttachment> {
    let bytes = fs::read(path).await.map_err(|source| AssistantError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    let file_type = FileType::from_path(path);
    info!(
        "Read {} bytes from {} ({})",
        bytes.len(),
        path.display(),
        file_type.mime_type()
    );

    Ok(ResumeAttachment {
        data: BASE64_STANDARD.encode(&bytes),
        mime_type: file_type.mime_type().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_read_attachment_encodes_bytes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("resume.pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap();

        let attachment = read_attachment(&path).await.unwrap();
        assert_eq!(attachment.mime_type, "application/pdf");
        assert_eq!(attachment.data, "JVBERi0xLjQ=");
    }

    #[tokio::test]
    async fn test_missing_file_is_read_error() {
        let result = read_attachment(Path::new("tests/fixtures/nonexistent.pdf")).await;
        assert!(matches!(result, Err(AssistantError::ReadError { .. })));
    }
}
