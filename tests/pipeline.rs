//! End-to-end pipeline tests through the library API, with a scripted model
//! standing in for a real provider.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use course_ingest::config::Config;
use course_ingest::ingest::Ingestor;
use course_ingest::llm::TextGenerator;
use course_ingest::sqlite_store::SqliteStore;
use course_ingest::store::{CourseStore, InMemoryStore};

/// Answers each kind of prompt with a canned response.
struct ScriptedModel {
    chapters: Result<String, String>,
    title: &'static str,
    description: &'static str,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    fn new(chapters: Result<String, String>) -> Self {
        Self {
            chapters,
            title: "\"Ownership in Rust\"",
            description: "A practical tour of ownership and borrowing.",
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl TextGenerator for ScriptedModel {
    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if prompt.contains("TEXT TO ORGANIZE") {
            return self.chapters.clone().map_err(|e| anyhow::anyhow!(e));
        }
        if prompt.contains("course title") {
            return Ok(self.title.to_string());
        }
        Ok(self.description.to_string())
    }
}

fn paragraph(topic: &str) -> String {
    format!(
        "{topic} is central to writing Rust. Every value has exactly one owner, \
         borrows are checked at compile time, and the compiler rejects programs \
         that would leave dangling references behind. This section walks through \
         {topic} with small examples."
    )
}

fn chapter_json(items: &[(&str, &str)]) -> String {
    let array: Vec<serde_json::Value> = items
        .iter()
        .enumerate()
        .map(|(i, (title, content))| {
            serde_json::json!({
                "chapterNumber": i + 1,
                "title": title,
                "summary": format!("About {}.", title.to_lowercase()),
                "content": content,
            })
        })
        .collect();
    serde_json::to_string(&array).unwrap()
}

#[tokio::test]
async fn ai_chapters_flow_into_the_store() {
    let first = paragraph("Ownership");
    let second = paragraph("Borrowing");
    let text = format!("{first}\n\n{second}");
    let model = Arc::new(ScriptedModel::new(Ok(format!(
        "```json\n{}\n```",
        chapter_json(&[("Ownership", first.as_str()), ("Borrowing", second.as_str())])
    ))));
    let store = Arc::new(InMemoryStore::new());
    let ingestor = Ingestor::new(model.clone(), store.clone(), &Config::minimal());

    let result = ingestor
        .ingest(text.clone().into_bytes(), "ownership.txt", text.len() as u64, "alice")
        .await
        .unwrap();

    assert_eq!(result.title, "Ownership in Rust");
    assert_eq!(result.description, "A practical tour of ownership and borrowing.");
    assert_eq!(result.chapter_count, 2);
    assert_eq!(result.chapters[0].title, "Ownership");
    assert_eq!(result.chapters[1].summary, "About borrowing.");
    let expected_words = first.split_whitespace().count() + second.split_whitespace().count();
    assert_eq!(result.total_words, expected_words);
    assert_eq!(result.estimated_reading_time, 1);

    // chaptering, title, description
    assert_eq!(model.prompts.lock().unwrap().len(), 3);

    let listed = store.list_courses("alice").await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, result.course_id);
    assert_eq!(listed[0].file_type, "txt");
}

#[tokio::test]
async fn invalid_chapter_json_falls_back_to_word_windows() {
    let text = vec!["borrow"; 4500].join(" ");
    let model = Arc::new(ScriptedModel::new(Ok("Sure! Here are your chapters.".to_string())));
    let ingestor = Ingestor::new(model, Arc::new(InMemoryStore::new()), &Config::minimal());

    let result = ingestor
        .ingest(text.into_bytes(), "notes.txt", 0, "bob")
        .await
        .unwrap();

    assert_eq!(result.chapter_count, 3);
    let titles: Vec<&str> = result.chapters.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["Chapter 1", "Chapter 2", "Chapter 3"]);
    assert_eq!(result.chapters[0].summary, "Section 1 of notes.txt");
    assert_eq!(result.total_words, 4500);
    assert_eq!(result.estimated_reading_time, 23);
}

#[tokio::test]
async fn model_outage_still_creates_a_course() {
    let text = vec!["lifetime"; 800].join(" ");
    let model = Arc::new(ScriptedModel::new(Err("503 from provider".to_string())));
    let ingestor = Ingestor::new(model, Arc::new(InMemoryStore::new()), &Config::minimal());

    let result = ingestor
        .ingest(text.into_bytes(), "lifetimes.txt", 0, "carol")
        .await
        .unwrap();

    // 800 words still clamp up to the two-chapter minimum.
    assert_eq!(result.chapter_count, 2);
    assert_eq!(result.chapters[0].word_count, 400);
}

#[tokio::test]
async fn persisted_course_is_readable_from_sqlite() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut config = Config::minimal();
    config.db.path = dir.path().join("courses.sqlite");
    let store = Arc::new(SqliteStore::open(&config).await.unwrap());

    let first = paragraph("Moves");
    let second = paragraph("Clones");
    let third = paragraph("Drops");
    let model = Arc::new(ScriptedModel::new(Ok(chapter_json(&[
        ("Moves", first.as_str()),
        ("", second.as_str()),
        ("Drops", third.as_str()),
    ]))));
    let ingestor = Ingestor::new(model, store.clone(), &config);
    let text = format!("{first}\n\n{second}\n\n{third}");

    let result = ingestor
        .ingest(text.into_bytes(), "moves.txt", 0, "dave")
        .await
        .unwrap();

    // The untitled chapter is dropped and the rest renumbered.
    let numbers: Vec<u32> = result.chapters.iter().map(|c| c.chapter_number).collect();
    assert_eq!(numbers, vec![1, 2]);

    let detail = store.get_course(&result.course_id).await.unwrap().unwrap();
    assert_eq!(detail.chapters[1].title, "Drops");
    let chapter = store
        .get_chapter(&result.course_id, &detail.chapters[1].id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(chapter.content, third);
    assert_eq!(chapter.previous_chapter_id.as_deref(), Some(detail.chapters[0].id.as_str()));
    assert!(chapter.next_chapter_id.is_none());

    store.close().await;
}
