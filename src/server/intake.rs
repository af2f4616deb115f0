use crate::{Error, Result, config::LimitsConfig, predictor::Modality};
use axum::extract::Multipart;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;
use tracing::debug;

pub const FILE_FIELD: &str = "file";

pub const BYTES_PER_MB: u64 = 1024 * 1024;
const MAX_EXTENSION_LEN: usize = 10;

#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub dir: PathBuf,
    pub limits: LimitsConfig,
}

impl UploadSettings {
    pub fn new(dir: Option<PathBuf>, limits: LimitsConfig) -> Self {
        Self {
            dir: dir.unwrap_or_else(std::env::temp_dir),
            limits,
        }
    }

    /// Upload ceiling for a file modality. Text is never uploaded.
    pub fn max_mb(&self, modality: Modality) -> Option<u64> {
        match modality {
            Modality::Image => Some(self.limits.image_max_mb),
            Modality::Video => Some(self.limits.video_max_mb),
            Modality::Audio => Some(self.limits.audio_max_mb),
            Modality::Text => None,
        }
    }
}

/// An upload copied to disk for the duration of one request. The file is
/// removed when this value is dropped; removal errors are ignored.
#[derive(Debug)]
pub struct StagedUpload {
    path: TempPath,
    original_name: Option<String>,
    size: u64,
}

impl StagedUpload {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn original_name(&self) -> Option<&str> {
        self.original_name.as_deref()
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

pub fn missing_file_message() -> String {
    format!(
        "No file uploaded. Please upload with key '{}'.",
        FILE_FIELD
    )
}

pub fn too_large_message(max_mb: u64) -> String {
    format!("File too large (max {}MB).", max_mb)
}

fn default_extension(modality: Modality) -> &'static str {
    match modality {
        Modality::Image => "jpg",
        Modality::Video => "mp4",
        Modality::Audio => "wav",
        Modality::Text => "bin",
    }
}

/// Lowercased extension of `filename` if it looks sane, otherwise the
/// modality default.
pub fn infer_extension(filename: Option<&str>, modality: Modality) -> String {
    filename
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| {
            !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_else(|| default_extension(modality).to_string())
}

/// A declared content type must match the modality's top-level type.
/// Missing and generic binary content types are let through.
pub fn validate_content_type(content_type: Option<&str>, modality: Modality) -> Result<()> {
    let Some(content_type) = content_type else {
        return Ok(());
    };

    let mime = content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
        .to_ascii_lowercase();

    if mime.is_empty() || mime == "application/octet-stream" {
        return Ok(());
    }

    let top_level = mime.split('/').next().unwrap_or_default();
    if top_level == modality.as_str() {
        Ok(())
    } else {
        Err(Error::unsupported_media_type(format!(
            "Unsupported content type '{}' for {} upload.",
            mime, modality
        )))
    }
}

/// Streams the `file` field of a multipart body into a temp file, enforcing
/// the modality's size ceiling while reading. Other fields are drained, and
/// their bytes count against the same ceiling.
pub async fn stage_upload(
    mut multipart: Multipart,
    modality: Modality,
    settings: &UploadSettings,
) -> Result<StagedUpload> {
    let max_mb = settings
        .max_mb(modality)
        .ok_or_else(|| Error::internal(format!("{} does not accept uploads", modality)))?;
    let max_bytes = max_mb * BYTES_PER_MB;
    let mut skipped: u64 = 0;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::missing_input(format!("Failed to read multipart body: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            while let Some(chunk) = field
                .chunk()
                .await
                .map_err(|e| Error::missing_input(format!("Failed to read multipart body: {}", e)))?
            {
                skipped += chunk.len() as u64;
                if skipped > max_bytes {
                    debug!(
                        "Rejecting {} request after {} bytes of extra fields",
                        modality, skipped
                    );
                    return Err(Error::payload_too_large(too_large_message(max_mb)));
                }
            }
            continue;
        }

        let original_name = field.file_name().map(|s| s.to_string());
        validate_content_type(field.content_type(), modality)?;

        let extension = infer_extension(original_name.as_deref(), modality);
        let named = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(&format!(".{}", extension))
            .tempfile_in(&settings.dir)?;
        let (file, path) = named.into_parts();
        let mut file = tokio::fs::File::from_std(file);

        let mut size: u64 = 0;

        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| Error::missing_input(format!("Failed to read file data: {}", e)))?
        {
            size += chunk.len() as u64;
            if size > max_bytes {
                debug!(
                    "Rejecting {} upload after {} bytes (limit {})",
                    modality, size, max_bytes
                );
                return Err(Error::payload_too_large(too_large_message(max_mb)));
            }
            file.write_all(&chunk).await?;
        }

        file.flush().await?;
        drop(file);

        debug!(
            "Staged {} upload {:?} ({} bytes) at {}",
            modality,
            original_name,
            size,
            path.display()
        );

        return Ok(StagedUpload {
            path,
            original_name,
            size,
        });
    }

    Err(Error::missing_input(missing_file_message()))
}
