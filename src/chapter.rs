//! AI-driven chaptering.
//!
//! Sends (a bounded prefix of) the extracted text to a [`TextGenerator`] with a
//! structured-output prompt, then treats the response as untrusted JSON:
//! code fences are stripped, every array element is checked field by field,
//! thin or untitled chapters are dropped, and the survivors are renumbered
//! with freshly computed word counts.
//!
//! [`chunk_content_with_ai`] never fails: any [`ChapteringError`] is logged
//! and the deterministic [`fallback_chunk`] takes over.

use serde_json::Value;
use tracing::{debug, warn};

use crate::chunk::{fallback_chunk, word_count};
use crate::config::ChapteringConfig;
use crate::error::ChapteringError;
use crate::llm::TextGenerator;
use crate::models::Chapter;

/// Characters of source text sent to the model (roughly 25k tokens).
pub const MAX_INPUT_CHARS: usize = 100_000;

/// Chapter `text` with the model, falling back to word-count splitting.
pub async fn chunk_content_with_ai(
    generator: &dyn TextGenerator,
    text: &str,
    file_name: &str,
    config: &ChapteringConfig,
) -> Vec<Chapter> {
    match ai_chapters(generator, text, file_name, config).await {
        Ok(chapters) => chapters,
        Err(err) => {
            match &err {
                ChapteringError::Model(_) => {
                    warn!(file_name, error = %err, "AI chaptering call failed, using fallback")
                }
                ChapteringError::InvalidStructure(_) => {
                    warn!(file_name, error = %err, "AI returned no usable JSON, using fallback")
                }
                ChapteringError::NoValidChapters => {
                    warn!(file_name, "AI chapters all failed validation, using fallback")
                }
            }
            fallback_chunk(text, file_name, config)
        }
    }
}

/// The AI path on its own: one model call, then parse and validate.
pub async fn ai_chapters(
    generator: &dyn TextGenerator,
    text: &str,
    file_name: &str,
    config: &ChapteringConfig,
) -> Result<Vec<Chapter>, ChapteringError> {
    let bounded = truncate_chars(text, config.max_input_chars);
    if bounded.len() < text.len() {
        debug!(
            file_name,
            kept = config.max_input_chars,
            "truncated text before chaptering"
        );
    }

    let prompt = build_chaptering_prompt(file_name, bounded, config);
    let raw = generator
        .generate(&prompt)
        .await
        .map_err(|e| ChapteringError::Model(format!("{:#}", e)))?;

    parse_ai_chapters(&raw, config)
}

/// Prompt asking for a bare JSON array of `{chapterNumber, title, summary, content}`.
pub fn build_chaptering_prompt(file_name: &str, text: &str, config: &ChapteringConfig) -> String {
    let min = config.min_chapters;
    let max = config.max_chapters;
    let preferred_min = (min + 1).min(max);
    format!(
        r#"You are an expert educational content organizer. Analyze the following text extracted from a document titled "{file_name}" and break it into logical chapters for a structured course.

INSTRUCTIONS:
1. Identify natural topic boundaries and section breaks
2. Create {preferred_min}-{max} chapters depending on content length
3. Each chapter should cover a coherent topic or concept
4. Generate a clear, descriptive title for each chapter
5. Write a brief 1-2 sentence summary for each chapter
6. Do NOT modify the original text content - only organize it into chapters
7. Ensure no content is lost - all text should be included in some chapter
8. If the text is short, create fewer chapters (minimum {min})

Return your response as a valid JSON array with this exact format:
[
  {{
    "chapterNumber": 1,
    "title": "Chapter Title Here",
    "summary": "Brief summary of what this chapter covers.",
    "content": "The actual text content for this chapter..."
  }}
]

IMPORTANT: Return ONLY the JSON array, no other text, no markdown code fences.

TEXT TO ORGANIZE:
---
{text}
---"#
    )
}

/// Turn a raw model response into validated, densely numbered chapters.
pub fn parse_ai_chapters(
    raw: &str,
    config: &ChapteringConfig,
) -> Result<Vec<Chapter>, ChapteringError> {
    let cleaned = strip_code_fence(raw);
    let value: Value = serde_json::from_str(cleaned)
        .map_err(|e| ChapteringError::InvalidStructure(e.to_string()))?;
    let items = match value.as_array() {
        Some(items) if !items.is_empty() => items,
        Some(_) => return Err(ChapteringError::InvalidStructure("empty array".to_string())),
        None => {
            return Err(ChapteringError::InvalidStructure(
                "expected a JSON array".to_string(),
            ))
        }
    };

    let mut chapters: Vec<Chapter> = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        match validate_item(item, config) {
            Some((title, summary, content)) => chapters.push(Chapter {
                chapter_number: 0,
                word_count: word_count(&content),
                title,
                summary,
                content,
            }),
            None => debug!(index = i, "dropping AI chapter that failed validation"),
        }
    }

    if chapters.is_empty() {
        return Err(ChapteringError::NoValidChapters);
    }

    fold_surplus(&mut chapters, config.max_chapters);
    for (i, ch) in chapters.iter_mut().enumerate() {
        ch.chapter_number = (i + 1) as u32;
    }
    Ok(chapters)
}

/// `(title, summary, content)` if the element is a usable chapter.
fn validate_item(item: &Value, config: &ChapteringConfig) -> Option<(String, String, String)> {
    let title = item.get("title")?.as_str()?.trim();
    let content = item.get("content")?.as_str()?.trim();
    if title.is_empty() || content.chars().count() < config.min_chapter_chars {
        return None;
    }
    let summary = item
        .get("summary")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default();
    Some((title.to_string(), summary.to_string(), content.to_string()))
}

/// Merge chapters past `max` into the last kept one so no text is lost.
fn fold_surplus(chapters: &mut Vec<Chapter>, max: usize) {
    if max == 0 || chapters.len() <= max {
        return;
    }
    let surplus = chapters.split_off(max);
    if let Some(last) = chapters.last_mut() {
        for ch in surplus {
            last.content.push_str("\n\n");
            last.content.push_str(&ch.content);
        }
        last.word_count = word_count(&last.content);
    }
}

/// Remove a surrounding triple-backtick fence (with optional info string).
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = match rest.find('\n') {
        Some(i) if rest[..i].trim().chars().all(|c| c.is_ascii_alphanumeric()) => &rest[i + 1..],
        _ => rest.strip_prefix("json").unwrap_or(rest),
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// The first `max_chars` characters of `text`.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
