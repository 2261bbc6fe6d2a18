//! Course title and description generation.
//!
//! Each helper makes one model call against a short preview of the text and
//! has a static fallback, so a model failure never blocks course creation.

use tracing::warn;

use crate::chapter::truncate_chars;
use crate::llm::TextGenerator;

/// Characters of text shown to the model when titling.
pub const TITLE_PREVIEW_CHARS: usize = 1000;
/// Characters of text shown to the model when describing.
pub const DESCRIPTION_PREVIEW_CHARS: usize = 2000;
pub const MAX_TITLE_CHARS: usize = 80;
pub const FALLBACK_DESCRIPTION: &str = "AI-generated course from uploaded document content.";

/// File name with its extension removed and `_`/`-` turned into spaces.
pub fn clean_file_name(file_name: &str) -> String {
    let stem = match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    };
    stem.replace(['_', '-'], " ").trim().to_string()
}

/// Generate a course title, falling back to the capitalized clean file name.
pub async fn generate_course_title(
    generator: &dyn TextGenerator,
    file_name: &str,
    text: &str,
) -> String {
    let clean_name = clean_file_name(file_name);
    let preview = truncate_chars(text, TITLE_PREVIEW_CHARS);
    let prompt = format!(
        "Given a document with filename \"{clean_name}\" and this text preview:\n\"{preview}\"\n\n\
         Generate a concise, professional course title (max {MAX_TITLE_CHARS} characters).\n\
         Return ONLY the title text, nothing else."
    );

    match generator.generate(&prompt).await {
        Ok(raw) => {
            let title = strip_quotes(&raw);
            if !title.is_empty() {
                return title.to_string();
            }
            warn!(file_name, "model returned an empty title, using file name");
        }
        Err(e) => warn!(file_name, error = %format!("{:#}", e), "title generation failed, using file name"),
    }
    capitalize(&clean_name)
}

/// Generate a 2-3 sentence course description, falling back to a fixed string.
pub async fn generate_course_description(generator: &dyn TextGenerator, text: &str) -> String {
    let preview = truncate_chars(text, DESCRIPTION_PREVIEW_CHARS);
    let prompt = format!(
        "Based on this text preview from an educational document:\n\"{preview}\"\n\n\
         Write a compelling 2-3 sentence course description.\n\
         Return ONLY the description text, nothing else."
    );

    match generator.generate(&prompt).await {
        Ok(raw) => {
            let description = strip_quotes(&raw);
            if !description.is_empty() {
                return description.to_string();
            }
            warn!("model returned an empty description, using default");
        }
        Err(e) => warn!(error = %format!("{:#}", e), "description generation failed, using default"),
    }
    FALLBACK_DESCRIPTION.to_string()
}

/// Trim, then drop one leading and one trailing `"` or `'`.
pub fn strip_quotes(raw: &str) -> &str {
    let s = raw.trim();
    let s = s.strip_prefix(['"', '\'']).unwrap_or(s);
    s.strip_suffix(['"', '\'']).unwrap_or(s).trim()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
