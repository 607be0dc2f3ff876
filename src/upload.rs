use std::path::Path;

use anyhow::{Context, Result, bail};
use tokio::sync::watch;

use crate::client::GalleryClient;
use crate::error::{GalleryError, ValidationError};

const MEGABYTE: u64 = 1024 * 1024;
pub const MAX_UPLOAD_SIZE_BYTES: u64 = 100 * MEGABYTE;

/// MIME types the backend accepts, matching its extension whitelist.
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "video/mp4",
    "video/mov",
    "video/avi",
    "video/webm",
];

/// An in-memory handle to a file chosen for upload. Lives only in the
/// coordinator's pending batch between selection and submission/cancel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .with_context(|| format!("{} has no file name", path.display()))?
            .to_string_lossy()
            .into_owned();

        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let Some(mime_type) = mime_type_for(&extension) else {
            bail!("unsupported file extension '.{extension}' for {name}");
        };

        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        Ok(SelectedFile {
            name,
            mime_type: mime_type.to_string(),
            size: bytes.len() as u64,
            bytes,
        })
    }
}

pub fn mime_type_for(extension: &str) -> Option<&'static str> {
    match extension {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "mp4" => Some("video/mp4"),
        "mov" => Some("video/mov"),
        "avi" => Some("video/avi"),
        "webm" => Some("video/webm"),
        _ => None,
    }
}

/// Filters a raw selection down to the files the backend will accept: allowed
/// MIME type and size within the limit. Pure; preserves order.
pub fn validate_selection(
    files: Vec<SelectedFile>,
    max_size_bytes: u64,
    allowed_mime_types: &[&str],
) -> Vec<SelectedFile> {
    files
        .into_iter()
        .filter(|file| {
            allowed_mime_types.contains(&file.mime_type.as_str()) && file.size <= max_size_bytes
        })
        .collect()
}

/// Metadata shared by every file in a batch. Per-file metadata is not
/// supported; one invocation attaches the same fields to each file.
#[derive(Debug, Clone, Default)]
pub struct UploadMetadata {
    pub title: String,
    pub description: String,
    pub category_id: String,
    pub type_id: Option<String>,
    pub brand_id: Option<String>,
    pub tags: Vec<String>,
}

/// Per-submission outcome, used to drive notifications and UI refresh.
#[derive(Debug, Clone)]
pub struct UploadResult {
    pub success: bool,
    pub message: String,
}

/// What a confirmed submission produced: the per-request results plus the
/// first error hit while refreshing the downstream views. A refresh failure
/// cannot undo an upload the backend already accepted, so it is carried here
/// instead of failing the submission.
#[derive(Debug)]
pub struct BatchOutcome {
    pub results: Vec<UploadResult>,
    pub refresh_error: Option<GalleryError>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UploadStrategy {
    /// One request per file; progress advances after each request settles and
    /// the remaining files are skipped on the first failure.
    #[default]
    Sequential,
    /// A single multipart request carrying the whole batch.
    Batch,
}

impl std::str::FromStr for UploadStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sequential" => Ok(UploadStrategy::Sequential),
            "batch" => Ok(UploadStrategy::Batch),
            other => Err(format!("unknown upload strategy '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BatchState {
    #[default]
    Idle,
    Ready,
    Submitting,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadProgress {
    pub uploaded: usize,
    pub total: usize,
}

/// Progress line in the product's locale, e.g. "تم رفع 1 من 3 ملف".
pub fn progress_text(progress: UploadProgress) -> String {
    format!("تم رفع {} من {} ملف", progress.uploaded, progress.total)
}

/// The two downstream views that must be refreshed after a confirmed upload:
/// the content listing and the aggregate stats counters.
pub trait RefreshSink {
    async fn refresh_content(&mut self) -> Result<(), GalleryError>;
    async fn refresh_stats(&mut self) -> Result<(), GalleryError>;
}

/// Coordinates one upload batch: holds the validated selection, guards the
/// submit lifecycle and publishes progress over a watch channel.
///
/// Lifecycle: `Idle -> Ready` when a selection passes validation,
/// `Ready -> Submitting` while requests are in flight, then back to `Idle` on
/// confirmed success or `Ready` on failure (the selection stays intact so the
/// user can retry without reselecting).
pub struct UploadCoordinator {
    pending: Vec<SelectedFile>,
    state: BatchState,
    strategy: UploadStrategy,
    progress: watch::Sender<UploadProgress>,
}

impl UploadCoordinator {
    pub fn new(strategy: UploadStrategy) -> Self {
        let (progress, _) = watch::channel(UploadProgress::default());
        UploadCoordinator {
            pending: Vec::new(),
            state: BatchState::Idle,
            strategy,
            progress,
        }
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    pub fn pending(&self) -> &[SelectedFile] {
        &self.pending
    }

    pub fn subscribe_progress(&self) -> watch::Receiver<UploadProgress> {
        self.progress.subscribe()
    }

    /// Validates a raw selection and stores the accepted subset as the
    /// pending batch. Returns the number of accepted files.
    pub fn select_files(&mut self, files: Vec<SelectedFile>) -> Result<usize, GalleryError> {
        if self.state == BatchState::Submitting {
            return Err(ValidationError::AlreadySubmitting.into());
        }
        if files.is_empty() {
            return Err(ValidationError::EmptySelection.into());
        }

        let accepted = validate_selection(files, MAX_UPLOAD_SIZE_BYTES, ALLOWED_MIME_TYPES);
        if accepted.is_empty() {
            // Selection (and state) untouched so a previous valid batch survives.
            return Err(ValidationError::NoFilesAccepted.into());
        }

        self.pending = accepted;
        self.state = BatchState::Ready;
        Ok(self.pending.len())
    }

    /// Clears the pending batch and resets progress. Never touches the
    /// network; an in-flight request cannot exist here because submission
    /// holds the coordinator exclusively.
    pub fn cancel_batch(&mut self) {
        self.pending.clear();
        self.state = BatchState::Idle;
        let _ = self.progress.send(UploadProgress::default());
    }

    /// Submits the pending batch. All validation happens before any network
    /// I/O. On success the selection is cleared and the content/stats views
    /// are refreshed exactly once each, with any refresh failure reported in
    /// the outcome rather than as an error; an `Err` return always means the
    /// upload itself failed and the selection is left intact for a retry.
    pub async fn submit_batch(
        &mut self,
        client: &GalleryClient,
        metadata: &UploadMetadata,
        uploaded_by: &str,
        refresh: &mut impl RefreshSink,
    ) -> Result<BatchOutcome, GalleryError> {
        if self.state == BatchState::Submitting {
            return Err(ValidationError::AlreadySubmitting.into());
        }
        if self.pending.is_empty() {
            return Err(ValidationError::EmptySelection.into());
        }
        if metadata.category_id.trim().is_empty() {
            return Err(ValidationError::MissingCategory.into());
        }
        if uploaded_by.trim().is_empty() {
            return Err(ValidationError::MissingUploader.into());
        }

        let total = self.pending.len();
        self.state = BatchState::Submitting;
        let _ = self.progress.send(UploadProgress { uploaded: 0, total });

        let outcome = match self.strategy {
            UploadStrategy::Sequential => {
                self.submit_sequential(client, metadata, uploaded_by, total).await
            }
            UploadStrategy::Batch => self.submit_whole(client, metadata, uploaded_by, total).await,
        };

        match outcome {
            Ok(results) => {
                self.pending.clear();
                self.state = BatchState::Idle;

                let mut refresh_error = refresh.refresh_content().await.err();
                if let Err(err) = refresh.refresh_stats().await
                    && refresh_error.is_none()
                {
                    refresh_error = Some(err);
                }

                Ok(BatchOutcome {
                    results,
                    refresh_error,
                })
            }
            Err(err) => {
                self.state = BatchState::Ready;
                Err(err)
            }
        }
    }

    async fn submit_sequential(
        &self,
        client: &GalleryClient,
        metadata: &UploadMetadata,
        uploaded_by: &str,
        total: usize,
    ) -> Result<Vec<UploadResult>, GalleryError> {
        let mut results = Vec::with_capacity(total);

        for (sent, file) in self.pending.iter().enumerate() {
            match client
                .upload(std::slice::from_ref(file), metadata, uploaded_by)
                .await
            {
                Ok(outcome) => {
                    results.push(UploadResult {
                        success: true,
                        message: outcome.message,
                    });
                    let _ = self.progress.send(UploadProgress {
                        uploaded: sent + 1,
                        total,
                    });
                }
                Err(err) => {
                    return Err(GalleryError::Upload {
                        uploaded: sent,
                        total,
                        source: Box::new(err),
                    });
                }
            }
        }

        Ok(results)
    }

    async fn submit_whole(
        &self,
        client: &GalleryClient,
        metadata: &UploadMetadata,
        uploaded_by: &str,
        total: usize,
    ) -> Result<Vec<UploadResult>, GalleryError> {
        let outcome = client.upload(&self.pending, metadata, uploaded_by).await?;
        let _ = self.progress.send(UploadProgress {
            uploaded: total,
            total,
        });

        Ok(vec![UploadResult {
            success: true,
            message: outcome.message,
        }])
    }
}
