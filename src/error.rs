use reqwest::StatusCode;
use thiserror::Error;

/// Failures surfaced by the gallery client and the upload coordinator.
///
/// `Validation` errors are raised before any network I/O; `Network` covers
/// transport failures; `Server` covers non-2xx statuses and `success: false`
/// payloads. None of these trigger an automatic retry.
#[derive(Debug, Error)]
pub enum GalleryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("server error ({status}): {message}")]
    Server { status: StatusCode, message: String },

    #[error("upload stopped after {uploaded} of {total} files: {source}")]
    Upload {
        uploaded: usize,
        total: usize,
        #[source]
        source: Box<GalleryError>,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("no files selected")]
    EmptySelection,

    #[error("none of the selected files passed type/size validation")]
    NoFilesAccepted,

    #[error("a category must be chosen before uploading")]
    MissingCategory,

    #[error("an uploader identity is required")]
    MissingUploader,

    #[error("a batch is already being submitted")]
    AlreadySubmitting,
}

impl GalleryError {
    pub fn is_validation(&self) -> bool {
        matches!(self, GalleryError::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_error_reports_partial_completion() {
        let inner = GalleryError::Server {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "disk full".to_string(),
        };
        let err = GalleryError::Upload {
            uploaded: 2,
            total: 5,
            source: Box::new(inner),
        };
        let text = err.to_string();
        assert!(text.contains("2 of 5"), "unexpected message: {text}");
    }

    #[test]
    fn validation_errors_are_flagged() {
        let err = GalleryError::from(ValidationError::EmptySelection);
        assert!(err.is_validation());

        let err = GalleryError::Server {
            status: StatusCode::BAD_REQUEST,
            message: "bad".to_string(),
        };
        assert!(!err.is_validation());
    }
}
