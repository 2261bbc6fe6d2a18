//! Ingestion pipeline orchestration.
//!
//! Coordinates the full flow for one upload: format detection → size check →
//! text extraction → chaptering (AI with deterministic fallback) → title and
//! description → persistence. Only detection/extraction and persistence can
//! fail the request; every AI step recovers locally.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::chapter::chunk_content_with_ai;
use crate::config::{ChapteringConfig, Config, IngestConfig};
use crate::detect::detect_file_type;
use crate::error::IngestError;
use crate::extract::extract;
use crate::llm::{create_generator, TextGenerator};
use crate::models::{ChapterOutline, Course, CourseIngestResult, CourseSource};
use crate::sqlite_store::SqliteStore;
use crate::store::{CourseStore, InMemoryStore};
use crate::summarize::{generate_course_description, generate_course_title};

/// Runs uploads through the pipeline against one model and one store.
///
/// Holds no per-request state; concurrent calls to [`ingest`](Ingestor::ingest)
/// are independent.
pub struct Ingestor {
    generator: Arc<dyn TextGenerator>,
    store: Arc<dyn CourseStore>,
    ingest: IngestConfig,
    chaptering: ChapteringConfig,
}

impl Ingestor {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        store: Arc<dyn CourseStore>,
        config: &Config,
    ) -> Self {
        Self {
            generator,
            store,
            ingest: config.ingest.clone(),
            chaptering: config.chaptering.clone(),
        }
    }

    pub fn store(&self) -> &Arc<dyn CourseStore> {
        &self.store
    }

    pub fn max_file_bytes(&self) -> u64 {
        self.ingest.max_file_bytes
    }

    /// Turn an uploaded file into a persisted course.
    ///
    /// `uploader_id` is opaque and only recorded for attribution.
    pub async fn ingest(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        file_size: u64,
        uploader_id: &str,
    ) -> Result<CourseIngestResult, IngestError> {
        let course = self
            .build_course(bytes, file_name, file_size, uploader_id)
            .await?;

        let course_id = self
            .store
            .save(&course)
            .await
            .map_err(|e| IngestError::PersistenceFailed(format!("{:#}", e)))?;

        info!(
            course_id = %course_id,
            chapters = course.chapters.len(),
            total_words = course.total_words,
            "course created"
        );

        Ok(CourseIngestResult {
            course_id,
            title: course.title,
            description: course.description,
            chapter_count: course.chapters.len(),
            total_words: course.total_words,
            estimated_reading_time: course.estimated_reading_time,
            chapters: course.chapters.iter().map(ChapterOutline::from).collect(),
        })
    }

    /// Every stage of [`ingest`](Ingestor::ingest) except persistence.
    pub async fn build_course(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        file_size: u64,
        uploader_id: &str,
    ) -> Result<Course, IngestError> {
        let file_type = detect_file_type(file_name)
            .ok_or_else(|| IngestError::UnsupportedFormat(file_name.to_string()))?;

        let size = file_size.max(bytes.len() as u64);
        if size > self.ingest.max_file_bytes {
            return Err(IngestError::FileTooLarge {
                size,
                limit: self.ingest.max_file_bytes,
            });
        }

        info!(file_name, %file_type, size, model = self.generator.model_name(), "ingesting upload");

        let content_hash = format!("{:x}", Sha256::digest(&bytes));

        // PDF and EPUB parsing are CPU-bound.
        let document = tokio::task::spawn_blocking(move || extract(&bytes, file_type))
            .await
            .map_err(|e| IngestError::ExtractionFailed(format!("extraction task failed: {}", e)))??;

        let chapters =
            chunk_content_with_ai(self.generator.as_ref(), &document.text, file_name, &self.chaptering)
                .await;
        if chapters.is_empty() {
            return Err(IngestError::EmptyOrUnreadable(format!(
                "Not enough text to build a course (need at least {} characters).",
                self.chaptering.min_chapter_chars
            )));
        }

        let (title, description) = tokio::join!(
            generate_course_title(self.generator.as_ref(), file_name, &document.text),
            generate_course_description(self.generator.as_ref(), &document.text),
        );

        let total_words: usize = chapters.iter().map(|c| c.word_count).sum();
        let estimated_reading_time =
            total_words.div_ceil(self.ingest.reading_words_per_minute) as u64;

        Ok(Course {
            title,
            description,
            chapters,
            total_words,
            estimated_reading_time,
            source: CourseSource {
                file_name: file_name.to_string(),
                file_type,
                file_size: size,
                uploader_id: uploader_id.to_string(),
                content_hash,
            },
            metadata: document.metadata,
        })
    }
}

/// CLI entry point: ingest one local file, or print the chapter plan on `dry_run`.
pub async fn run_ingest_file(
    config: &Config,
    path: &Path,
    uploader_id: &str,
    dry_run: bool,
) -> anyhow::Result<()> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_size = bytes.len() as u64;
    let generator = create_generator(&config.model)?;

    if dry_run {
        let ingestor = Ingestor::new(generator, Arc::new(InMemoryStore::new()), config);
        let course = ingestor
            .build_course(bytes, &file_name, file_size, uploader_id)
            .await?;
        println!("ingest {} (dry-run)", file_name);
        println!("  title: {}", course.title);
        println!("  words: {}", course.total_words);
        println!("  reading time: {} min", course.estimated_reading_time);
        println!("  chapters: {}", course.chapters.len());
        for ch in &course.chapters {
            println!("    {:>3}. {} [{} words]", ch.chapter_number, ch.title, ch.word_count);
        }
        return Ok(());
    }

    let store = Arc::new(SqliteStore::open(config).await?);
    let ingestor = Ingestor::new(generator, store.clone(), config);
    let result = ingestor
        .ingest(bytes, &file_name, file_size, uploader_id)
        .await;
    store.close().await;
    let result = result?;

    println!("ingest {}", file_name);
    println!("  course_id: {}", result.course_id);
    println!("  title: {}", result.title);
    println!("  chapters: {}", result.chapter_count);
    println!("  words: {}", result.total_words);
    println!("  reading time: {} min", result.estimated_reading_time);
    println!("ok");
    Ok(())
}
