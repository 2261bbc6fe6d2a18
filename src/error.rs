//! Error taxonomy for the ingestion pipeline.
//!
//! [`IngestError`] is what callers of [`Ingestor::ingest`](crate::ingest::Ingestor::ingest)
//! see: every variant is terminal for the request. [`ChapteringError`] stays
//! inside the chaptering engine and is always absorbed by the fallback chunker.

use thiserror::Error;

/// Terminal ingestion failure.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Unsupported file format: \"{0}\". Supported formats: PDF, TXT, EPUB")]
    UnsupportedFormat(String),

    #[error("File too large: {size} bytes (limit {limit} bytes)")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("{0}")]
    EmptyOrUnreadable(String),

    #[error("Could not extract meaningful text from PDF. It may be a scanned/image-based PDF.")]
    ScannedDocument,

    #[error("{0}")]
    ExtractionFailed(String),

    #[error("Failed to save course: {0}")]
    PersistenceFailed(String),
}

impl IngestError {
    /// True when the cause is the upload itself (wrong type, too big, no text).
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            IngestError::ExtractionFailed(_) | IngestError::PersistenceFailed(_)
        )
    }

    /// Machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            IngestError::UnsupportedFormat(_) => "unsupported_format",
            IngestError::FileTooLarge { .. } => "file_too_large",
            IngestError::EmptyOrUnreadable(_) => "empty_or_unreadable",
            IngestError::ScannedDocument => "scanned_document",
            IngestError::ExtractionFailed(_) => "extraction_failed",
            IngestError::PersistenceFailed(_) => "persistence_failed",
        }
    }
}

/// Why the AI chaptering path produced nothing usable.
#[derive(Debug, Error)]
pub enum ChapteringError {
    /// The model call itself failed (network, auth, provider error).
    #[error("model call failed: {0}")]
    Model(String),

    /// The model answered, but not with a non-empty JSON array.
    #[error("AI returned invalid chapter structure: {0}")]
    InvalidStructure(String),

    /// Valid JSON, but every chapter failed validation.
    #[error("No valid chapters generated from AI analysis")]
    NoValidChapters,
}
