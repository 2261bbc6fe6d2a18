//! Course and chapter retrieval for the CLI.
//!
//! Backs the `course-ingest courses`, `course` and `chapter` commands. The
//! HTTP server reads the same [`CourseStore`] directly.

use anyhow::{bail, Result};

use crate::config::Config;
use crate::sqlite_store::SqliteStore;
use crate::store::CourseStore;

/// CLI entry point: list one uploader's courses, newest first.
pub async fn run_list_courses(config: &Config, uploader_id: &str) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let courses = store.list_courses(uploader_id).await;
    store.close().await;
    let courses = courses?;

    if courses.is_empty() {
        println!("No courses for uploader '{}'.", uploader_id);
        return Ok(());
    }

    println!(
        "{:<38} {:>8} {:>8} {:>6}  {:<20} TITLE",
        "ID", "CHAPTERS", "WORDS", "MIN", "CREATED"
    );
    for c in &courses {
        println!(
            "{:<38} {:>8} {:>8} {:>6}  {:<20} {}",
            c.id, c.chapter_count, c.total_words, c.estimated_reading_time, c.created_at, c.title
        );
    }
    Ok(())
}

/// CLI entry point: print a course and its chapter listing.
pub async fn run_get_course(config: &Config, course_id: &str) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let course = store.get_course(course_id).await;
    store.close().await;
    let Some(course) = course? else {
        bail!("course not found: {}", course_id);
    };

    println!("--- Course ---");
    println!("id:           {}", course.id);
    println!("title:        {}", course.title);
    println!("description:  {}", course.description);
    println!("source:       {} ({}, {} bytes)", course.file_name, course.file_type, course.file_size);
    println!("uploader:     {}", course.uploader_id);
    println!("status:       {}", course.status);
    println!("created_at:   {}", course.created_at);
    println!("words:        {}", course.total_words);
    println!("reading time: {} min", course.estimated_reading_time);
    println!("metadata:     {}", course.metadata);
    println!();

    println!("--- Chapters ({}) ---", course.chapters.len());
    for ch in &course.chapters {
        println!("{:>3}. {} [{} words]", ch.chapter_number, ch.title, ch.word_count);
        println!("     id: {}", ch.id);
        if !ch.summary.is_empty() {
            println!("     {}", ch.summary);
        }
    }

    Ok(())
}

/// CLI entry point: print one chapter's full content.
pub async fn run_get_chapter(config: &Config, course_id: &str, chapter_id: &str) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let chapter = store.get_chapter(course_id, chapter_id).await;
    store.close().await;
    let Some(chapter) = chapter? else {
        bail!("chapter not found: {}/{}", course_id, chapter_id);
    };

    println!("--- {} ---", chapter.course_title);
    println!("Chapter {}: {}", chapter.chapter_number, chapter.title);
    if !chapter.summary.is_empty() {
        println!("{}", chapter.summary);
    }
    println!("words:    {}", chapter.word_count);
    println!(
        "previous: {}",
        chapter.previous_chapter_id.as_deref().unwrap_or("-")
    );
    println!("next:     {}", chapter.next_chapter_id.as_deref().unwrap_or("-"));
    println!();
    println!("{}", chapter.content);

    Ok(())
}
