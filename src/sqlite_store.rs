//! SQLite-backed [`CourseStore`] implementation.
//!
//! Courses and chapters live in two tables (see [`migrate`](crate::migrate)).
//! A course and all of its chapters are written in one transaction, so a
//! failed save never leaves a half-populated course behind.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::config::Config;
use crate::db;
use crate::migrate;
use crate::models::{
    format_ts_iso, ChapterDetail, ChapterListing, Course, CourseDetail, CourseListItem,
    STATUS_READY,
};
use crate::store::{neighbours, CourseStore};

/// SQLite implementation of the [`CourseStore`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to the configured database and make sure the schema exists.
    pub async fn open(config: &Config) -> Result<Self> {
        let pool = db::connect(config).await?;
        migrate::apply(&pool).await?;
        Ok(Self::new(pool))
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn list_item(row: &SqliteRow) -> CourseListItem {
    CourseListItem {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        chapter_count: row.get::<i64, _>("chapter_count") as usize,
        total_words: row.get::<i64, _>("total_words") as usize,
        estimated_reading_time: row.get::<i64, _>("estimated_reading_time") as u64,
        file_name: row.get("file_name"),
        file_type: row.get("file_type"),
        status: row.get("status"),
        created_at: format_ts_iso(row.get("created_at")),
    }
}

#[async_trait]
impl CourseStore for SqliteStore {
    async fn save(&self, course: &Course) -> Result<String> {
        let course_id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().timestamp();
        let metadata_json = serde_json::to_string(&course.metadata)?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO courses (id, uploader_id, title, description, status, file_name,
                                 file_type, file_size, content_hash, chapter_count,
                                 total_words, estimated_reading_time, metadata_json, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&course_id)
        .bind(&course.source.uploader_id)
        .bind(&course.title)
        .bind(&course.description)
        .bind(STATUS_READY)
        .bind(&course.source.file_name)
        .bind(course.source.file_type.as_str())
        .bind(course.source.file_size as i64)
        .bind(&course.source.content_hash)
        .bind(course.chapters.len() as i64)
        .bind(course.total_words as i64)
        .bind(course.estimated_reading_time as i64)
        .bind(&metadata_json)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for chapter in &course.chapters {
            sqlx::query(
                "INSERT INTO chapters (id, course_id, chapter_number, title, summary, content, word_count) VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&course_id)
            .bind(chapter.chapter_number as i64)
            .bind(&chapter.title)
            .bind(&chapter.summary)
            .bind(&chapter.content)
            .bind(chapter.word_count as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(course_id)
    }

    async fn list_courses(&self, uploader_id: &str) -> Result<Vec<CourseListItem>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, description, chapter_count, total_words, estimated_reading_time,
                   file_name, file_type, status, created_at
            FROM courses
            WHERE uploader_id = ?
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(uploader_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(list_item).collect())
    }

    async fn get_course(&self, course_id: &str) -> Result<Option<CourseDetail>> {
        let row = sqlx::query("SELECT * FROM courses WHERE id = ?")
            .bind(course_id)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };

        let chapter_rows = sqlx::query(
            "SELECT id, chapter_number, title, summary, word_count FROM chapters WHERE course_id = ? ORDER BY chapter_number ASC",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        let chapters: Vec<ChapterListing> = chapter_rows
            .iter()
            .map(|r| ChapterListing {
                id: r.get("id"),
                chapter_number: r.get::<i64, _>("chapter_number") as u32,
                title: r.get("title"),
                summary: r.get("summary"),
                word_count: r.get::<i64, _>("word_count") as usize,
            })
            .collect();

        let metadata_json: String = row.get("metadata_json");
        let metadata = serde_json::from_str(&metadata_json).unwrap_or(serde_json::json!({}));

        Ok(Some(CourseDetail {
            id: row.get("id"),
            title: row.get("title"),
            description: row.get("description"),
            chapter_count: row.get::<i64, _>("chapter_count") as usize,
            total_words: row.get::<i64, _>("total_words") as usize,
            estimated_reading_time: row.get::<i64, _>("estimated_reading_time") as u64,
            file_name: row.get("file_name"),
            file_type: row.get("file_type"),
            file_size: row.get::<i64, _>("file_size") as u64,
            uploader_id: row.get("uploader_id"),
            content_hash: row.get("content_hash"),
            status: row.get("status"),
            created_at: format_ts_iso(row.get("created_at")),
            metadata,
            chapters,
        }))
    }

    async fn get_chapter(
        &self,
        course_id: &str,
        chapter_id: &str,
    ) -> Result<Option<ChapterDetail>> {
        let course_title: Option<String> =
            sqlx::query_scalar("SELECT title FROM courses WHERE id = ?")
                .bind(course_id)
                .fetch_optional(&self.pool)
                .await?;
        let Some(course_title) = course_title else {
            return Ok(None);
        };

        let row = sqlx::query(
            "SELECT id, chapter_number, title, summary, content, word_count FROM chapters WHERE course_id = ? AND id = ?",
        )
        .bind(course_id)
        .bind(chapter_id)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };

        let ids: Vec<String> = sqlx::query_scalar(
            "SELECT id FROM chapters WHERE course_id = ? ORDER BY chapter_number ASC",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;
        let index = ids.iter().position(|id| id == chapter_id).unwrap_or(0);
        let (previous_chapter_id, next_chapter_id) = neighbours(&ids, index);

        Ok(Some(ChapterDetail {
            id: row.get("id"),
            course_id: course_id.to_string(),
            course_title,
            chapter_number: row.get::<i64, _>("chapter_number") as u32,
            title: row.get("title"),
            summary: row.get("summary"),
            content: row.get("content"),
            word_count: row.get::<i64, _>("word_count") as usize,
            previous_chapter_id,
            next_chapter_id,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::tests::sample_course;

    async fn temp_store() -> (tempfile::TempDir, SqliteStore) {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = Config::minimal();
        config.db.path = dir.path().join("data").join("courses.sqlite");
        let store = SqliteStore::open(&config).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn save_and_fetch_course() {
        let (_dir, store) = temp_store().await;
        let id = store.save(&sample_course("u1", "Rust", 3)).await.unwrap();

        let detail = store.get_course(&id).await.unwrap().unwrap();
        assert_eq!(detail.title, "Rust");
        assert_eq!(detail.file_type, "txt");
        assert_eq!(detail.status, "ready");
        let numbers: Vec<u32> = detail.chapters.iter().map(|c| c.chapter_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn chapter_navigation() {
        let (_dir, store) = temp_store().await;
        let id = store.save(&sample_course("u1", "Rust", 2)).await.unwrap();
        let detail = store.get_course(&id).await.unwrap().unwrap();

        let first = store
            .get_chapter(&id, &detail.chapters[0].id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.previous_chapter_id, None);
        assert_eq!(first.next_chapter_id.as_ref(), Some(&detail.chapters[1].id));
        assert_eq!(first.word_count, 50);
        assert_eq!(first.course_title, "Rust");

        assert!(store.get_chapter(&id, "missing").await.unwrap().is_none());
        assert!(store
            .get_chapter("missing", &detail.chapters[0].id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn list_filters_by_uploader() {
        let (_dir, store) = temp_store().await;
        store.save(&sample_course("u1", "A", 1)).await.unwrap();
        store.save(&sample_course("u2", "B", 1)).await.unwrap();
        store.save(&sample_course("u1", "C", 1)).await.unwrap();

        let titles: Vec<String> = store
            .list_courses("u1")
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.title)
            .collect();
        assert_eq!(titles, vec!["C".to_string(), "A".to_string()]);
    }
}
