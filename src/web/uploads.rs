use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::{
    domain::AttachmentUpload,
    error::{AppError, Result},
};

/// Allowed attachment extensions
const ALLOWED_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "svg", "pdf", "txt",
];

/// Maximum file size (10 MB)
const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Files attached to announcements, stored under
/// `<root>/<quiz_id>/<announcement_id>/<filename>`.
#[derive(Debug, Clone)]
pub struct AttachmentStore {
    root: PathBuf,
}

impl AttachmentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn announcement_dir(&self, quiz_id: i64, announcement_id: i64) -> PathBuf {
        self.root
            .join(quiz_id.to_string())
            .join(announcement_id.to_string())
    }

    /// Decodes and saves an uploaded attachment. Returns the stored file name.
    pub async fn save_upload(
        &self,
        quiz_id: i64,
        announcement_id: i64,
        upload: &AttachmentUpload,
    ) -> Result<String> {
        let data = STANDARD
            .decode(upload.data.trim())
            .map_err(|e| AppError::Validation(format!("Invalid attachment encoding: {}", e)))?;

        self.save(quiz_id, announcement_id, &upload.filename, &data).await
    }

    pub async fn save(
        &self,
        quiz_id: i64,
        announcement_id: i64,
        filename: &str,
        data: &[u8],
    ) -> Result<String> {
        if data.len() > MAX_FILE_SIZE {
            return Err(AppError::Validation("File too large (max 10 MB)".to_string()));
        }

        let filename = sanitize_filename(filename)?;

        let extension = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .ok_or_else(|| AppError::Validation("Invalid filename".to_string()))?;

        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(AppError::Validation(format!(
                "Invalid file type. Allowed: {}",
                ALLOWED_EXTENSIONS.join(", ")
            )));
        }

        let dir = self.announcement_dir(quiz_id, announcement_id);
        fs::create_dir_all(&dir).await.map_err(|e| {
            AppError::Internal(format!("Failed to create attachment directory: {}", e))
        })?;

        let mut file = fs::File::create(dir.join(&filename)).await.map_err(|e| {
            AppError::Internal(format!("Failed to create file: {}", e))
        })?;

        file.write_all(data).await.map_err(|e| {
            AppError::Internal(format!("Failed to write file: {}", e))
        })?;

        tracing::debug!(quiz_id, announcement_id, %filename, bytes = data.len(), "Saved attachment");

        Ok(filename)
    }

    pub async fn list(&self, quiz_id: i64, announcement_id: i64) -> Result<Vec<String>> {
        let dir = self.announcement_dir(quiz_id, announcement_id);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AppError::Internal(format!("Failed to read attachments: {}", e))),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to read attachments: {}", e)))?
        {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    pub async fn delete_for_announcement(&self, quiz_id: i64, announcement_id: i64) -> Result<()> {
        remove_dir(&self.announcement_dir(quiz_id, announcement_id)).await
    }

    pub async fn delete_for_quiz(&self, quiz_id: i64) -> Result<()> {
        remove_dir(&self.root.join(quiz_id.to_string())).await
    }
}

/// Public URL of a stored attachment under `attachments_url`.
pub fn attachment_url(attachments_url: &str, quiz_id: i64, announcement_id: i64, filename: &str) -> String {
    format!(
        "{}/{}/{}/{}",
        attachments_url.trim_end_matches('/'),
        quiz_id,
        announcement_id,
        urlencoding::encode(filename)
    )
}

async fn remove_dir(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(AppError::Internal(format!("Failed to delete attachments: {}", e))),
    }
}

/// Strips any directory part and rejects names that could escape the
/// announcement's directory.
fn sanitize_filename(filename: &str) -> Result<String> {
    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    if name.is_empty() || name == "." || name == ".." || name.starts_with('.') {
        return Err(AppError::Validation("Invalid filename".to_string()));
    }

    Ok(name.to_string())
}
