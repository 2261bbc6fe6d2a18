//! Core data models used throughout the ingestion pipeline.
//!
//! These types represent the extracted text, chapters, and courses that flow
//! from an uploaded file through chaptering to the content store, plus the
//! read-side views the store hands back to the CLI and HTTP layer.

use serde::Serialize;

/// Upload formats the pipeline can extract text from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Pdf,
    Txt,
    Epub,
}

impl FileType {
    /// Short tag stored alongside a course (`"pdf"`, `"txt"`, `"epub"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Pdf => "pdf",
            FileType::Txt => "txt",
            FileType::Epub => "epub",
        }
    }

    /// Inverse of [`as_str`](FileType::as_str), used when reading rows back.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "pdf" => Some(FileType::Pdf),
            "txt" => Some(FileType::Txt),
            "epub" => Some(FileType::Epub),
            _ => None,
        }
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Plain text pulled out of one upload, plus format-specific metadata.
///
/// `text` is always trimmed and non-empty; the per-format minimum length
/// has already been enforced by the extractor that produced it.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    pub text: String,
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// One section of a course.
///
/// `chapter_number` is 1-based and dense within a course. `word_count` is
/// always the whitespace-token count of `content`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub chapter_number: u32,
    pub title: String,
    pub summary: String,
    pub content: String,
    pub word_count: usize,
}

/// Where a course came from.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSource {
    pub file_name: String,
    pub file_type: FileType,
    pub file_size: u64,
    pub uploader_id: String,
    /// SHA-256 of the uploaded bytes, hex encoded.
    pub content_hash: String,
}

/// A fully assembled course, ready to hand to a [`CourseStore`](crate::store::CourseStore).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub title: String,
    pub description: String,
    pub chapters: Vec<Chapter>,
    pub total_words: usize,
    /// Minutes.
    pub estimated_reading_time: u64,
    pub source: CourseSource,
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// Chapter entry in an ingestion result (content omitted).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterOutline {
    pub chapter_number: u32,
    pub title: String,
    pub summary: String,
    pub word_count: usize,
}

impl From<&Chapter> for ChapterOutline {
    fn from(ch: &Chapter) -> Self {
        Self {
            chapter_number: ch.chapter_number,
            title: ch.title.clone(),
            summary: ch.summary.clone(),
            word_count: ch.word_count,
        }
    }
}

/// Summary returned to the caller after a successful ingestion.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseIngestResult {
    pub course_id: String,
    pub title: String,
    pub description: String,
    pub chapter_count: usize,
    pub total_words: usize,
    pub estimated_reading_time: u64,
    pub chapters: Vec<ChapterOutline>,
}

/// Row in a user's course list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseListItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub chapter_count: usize,
    pub total_words: usize,
    pub estimated_reading_time: u64,
    pub file_name: String,
    pub file_type: String,
    pub status: String,
    pub created_at: String, // ISO8601
}

/// Chapter metadata within a [`CourseDetail`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterListing {
    pub id: String,
    pub chapter_number: u32,
    pub title: String,
    pub summary: String,
    pub word_count: usize,
}

/// A stored course with its chapter listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDetail {
    pub id: String,
    pub title: String,
    pub description: String,
    pub chapter_count: usize,
    pub total_words: usize,
    pub estimated_reading_time: u64,
    pub file_name: String,
    pub file_type: String,
    pub file_size: u64,
    pub uploader_id: String,
    pub content_hash: String,
    pub status: String,
    pub created_at: String,
    pub metadata: serde_json::Value,
    /// Sent beside the course, not inside it.
    #[serde(skip)]
    pub chapters: Vec<ChapterListing>,
}

/// Full chapter content with neighbours for sequential reading.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterDetail {
    pub id: String,
    pub course_id: String,
    pub course_title: String,
    pub chapter_number: u32,
    pub title: String,
    pub summary: String,
    pub content: String,
    pub word_count: usize,
    pub previous_chapter_id: Option<String>,
    pub next_chapter_id: Option<String>,
}

/// Status recorded for every course the pipeline persists.
pub const STATUS_READY: &str = "ready";

/// Format a unix timestamp as `YYYY-MM-DDTHH:MM:SSZ`.
pub fn format_ts_iso(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_else(|| ts.to_string())
}
