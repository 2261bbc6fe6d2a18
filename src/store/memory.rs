//! In-memory [`CourseStore`] for tests and embedding the pipeline without a database.
//!
//! Uses a `Vec` behind `std::sync::RwLock`; insertion order doubles as the
//! tie-breaker for courses created within the same second.

use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    format_ts_iso, ChapterDetail, ChapterListing, Course, CourseDetail, CourseListItem,
    STATUS_READY,
};

use super::{neighbours, CourseStore};

struct StoredCourse {
    id: String,
    course: Course,
    chapter_ids: Vec<String>,
    created_at: i64,
}

/// In-memory store for testing.
pub struct InMemoryStore {
    courses: RwLock<Vec<StoredCourse>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            courses: RwLock::new(Vec::new()),
        }
    }

    /// Number of saved courses.
    pub fn len(&self) -> usize {
        self.courses.read().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: T) -> anyhow::Error {
    anyhow!("in-memory store lock poisoned")
}

#[async_trait]
impl CourseStore for InMemoryStore {
    async fn save(&self, course: &Course) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let chapter_ids = course
            .chapters
            .iter()
            .map(|_| Uuid::new_v4().to_string())
            .collect();
        self.courses.write().map_err(poisoned)?.push(StoredCourse {
            id: id.clone(),
            course: course.clone(),
            chapter_ids,
            created_at: chrono::Utc::now().timestamp(),
        });
        Ok(id)
    }

    async fn list_courses(&self, uploader_id: &str) -> Result<Vec<CourseListItem>> {
        let courses = self.courses.read().map_err(poisoned)?;
        let mut items: Vec<(usize, i64, CourseListItem)> = courses
            .iter()
            .enumerate()
            .filter(|(_, s)| s.course.source.uploader_id == uploader_id)
            .map(|(seq, s)| {
                let item = CourseListItem {
                    id: s.id.clone(),
                    title: s.course.title.clone(),
                    description: s.course.description.clone(),
                    chapter_count: s.course.chapters.len(),
                    total_words: s.course.total_words,
                    estimated_reading_time: s.course.estimated_reading_time,
                    file_name: s.course.source.file_name.clone(),
                    file_type: s.course.source.file_type.to_string(),
                    status: STATUS_READY.to_string(),
                    created_at: format_ts_iso(s.created_at),
                };
                (seq, s.created_at, item)
            })
            .collect();
        items.sort_by(|a, b| b.1.cmp(&a.1).then(b.0.cmp(&a.0)));
        Ok(items.into_iter().map(|(_, _, item)| item).collect())
    }

    async fn get_course(&self, course_id: &str) -> Result<Option<CourseDetail>> {
        let courses = self.courses.read().map_err(poisoned)?;
        let Some(s) = courses.iter().find(|s| s.id == course_id) else {
            return Ok(None);
        };
        let chapters = s
            .course
            .chapters
            .iter()
            .zip(&s.chapter_ids)
            .map(|(ch, id)| ChapterListing {
                id: id.clone(),
                chapter_number: ch.chapter_number,
                title: ch.title.clone(),
                summary: ch.summary.clone(),
                word_count: ch.word_count,
            })
            .collect();
        let source = &s.course.source;
        Ok(Some(CourseDetail {
            id: s.id.clone(),
            title: s.course.title.clone(),
            description: s.course.description.clone(),
            chapter_count: s.course.chapters.len(),
            total_words: s.course.total_words,
            estimated_reading_time: s.course.estimated_reading_time,
            file_name: source.file_name.clone(),
            file_type: source.file_type.to_string(),
            file_size: source.file_size,
            uploader_id: source.uploader_id.clone(),
            content_hash: source.content_hash.clone(),
            status: STATUS_READY.to_string(),
            created_at: format_ts_iso(s.created_at),
            metadata: serde_json::Value::Object(s.course.metadata.clone()),
            chapters,
        }))
    }

    async fn get_chapter(
        &self,
        course_id: &str,
        chapter_id: &str,
    ) -> Result<Option<ChapterDetail>> {
        let courses = self.courses.read().map_err(poisoned)?;
        let Some(s) = courses.iter().find(|s| s.id == course_id) else {
            return Ok(None);
        };
        let Some(index) = s.chapter_ids.iter().position(|id| id == chapter_id) else {
            return Ok(None);
        };
        let ch = &s.course.chapters[index];
        let (previous_chapter_id, next_chapter_id) = neighbours(&s.chapter_ids, index);
        Ok(Some(ChapterDetail {
            id: chapter_id.to_string(),
            course_id: s.id.clone(),
            course_title: s.course.title.clone(),
            chapter_number: ch.chapter_number,
            title: ch.title.clone(),
            summary: ch.summary.clone(),
            content: ch.content.clone(),
            word_count: ch.word_count,
            previous_chapter_id,
            next_chapter_id,
        }))
    }
}
