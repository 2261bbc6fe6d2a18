//! Content store abstraction.
//!
//! The [`CourseStore`] trait is the ingestion pipeline's only persistence
//! seam: [`save`](CourseStore::save) is called once per successful ingestion,
//! and the read methods back the CLI and HTTP views. The store, not the
//! pipeline, assigns course and chapter identifiers.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{ChapterDetail, Course, CourseDetail, CourseListItem};

pub use memory::InMemoryStore;

/// Durable storage for ingested courses.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`save`](CourseStore::save) | Persist a course and its chapters, returning the new course ID |
/// | [`list_courses`](CourseStore::list_courses) | An uploader's courses, newest first |
/// | [`get_course`](CourseStore::get_course) | Course metadata plus chapter listing |
/// | [`get_chapter`](CourseStore::get_chapter) | Full chapter content with previous/next IDs |
#[async_trait]
pub trait CourseStore: Send + Sync {
    /// Persist `course` atomically and return its newly assigned ID.
    async fn save(&self, course: &Course) -> Result<String>;

    /// All courses uploaded by `uploader_id`, newest first.
    async fn list_courses(&self, uploader_id: &str) -> Result<Vec<CourseListItem>>;

    /// A course with its chapters ordered by chapter number.
    async fn get_course(&self, course_id: &str) -> Result<Option<CourseDetail>>;

    /// One chapter of a course. `None` if either ID is unknown.
    async fn get_chapter(&self, course_id: &str, chapter_id: &str)
        -> Result<Option<ChapterDetail>>;
}

/// Previous and next IDs around position `index` of `ids`.
pub(crate) fn neighbours(ids: &[String], index: usize) -> (Option<String>, Option<String>) {
    let previous = index.checked_sub(1).and_then(|i| ids.get(i)).cloned();
    let next = ids.get(index + 1).cloned();
    (previous, next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbours_at_edges() {
        let ids: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        assert_eq!(neighbours(&ids, 0), (None, Some("b".to_string())));
        assert_eq!(
            neighbours(&ids, 1),
            (Some("a".to_string()), Some("c".to_string()))
        );
        assert_eq!(neighbours(&ids, 2), (Some("b".to_string()), None));
    }
}
