//! Multi-format text extraction (PDF, TXT, EPUB).
//!
//! Callers supply the uploaded bytes and the [`FileType`] chosen by
//! [`detect_file_type`](crate::detect::detect_file_type); this module returns
//! trimmed UTF-8 text plus format-specific metadata, or a terminal
//! [`IngestError`]. Each format enforces its own minimum text length.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::PathBuf;

use epub::doc::{EpubDoc, NavPoint};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Map, Value};

use crate::error::IngestError;
use crate::models::{ExtractedDocument, FileType};

/// Below this many characters a PDF is assumed to have no text layer.
pub const MIN_PDF_CHARS: usize = 50;
/// Below this many characters a text file is treated as empty.
pub const MIN_TXT_CHARS: usize = 10;
/// Minimum joined text length for an EPUB.
pub const MIN_EPUB_CHARS: usize = 50;
/// EPUB sections shorter than this (after markup stripping) are discarded.
pub const MIN_EPUB_SECTION_CHARS: usize = 20;

static NON_TEXT_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<head\b.*?</head\s*>|<script\b.*?</script\s*>|<style\b.*?</style\s*>")
        .expect("static regex")
});
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("static regex"));
static ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(nbsp|amp|lt|gt|quot|#[0-9]+|#[xX][0-9a-fA-F]+);").expect("static regex")
});
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));

/// Extract plain text from `bytes` using the strategy for `file_type`.
pub fn extract(bytes: &[u8], file_type: FileType) -> Result<ExtractedDocument, IngestError> {
    match file_type {
        FileType::Pdf => extract_pdf(bytes),
        FileType::Txt => extract_txt(bytes),
        FileType::Epub => extract_epub(bytes),
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<ExtractedDocument, IngestError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| IngestError::ExtractionFailed(format!("PDF extraction failed: {}", e)))?;

    let text = pages.concat().trim().to_string();
    if text.chars().count() < MIN_PDF_CHARS {
        return Err(IngestError::ScannedDocument);
    }

    let mut metadata = Map::new();
    metadata.insert("pages".to_string(), json!(pages.len()));
    Ok(ExtractedDocument { text, metadata })
}

fn extract_txt(bytes: &[u8]) -> Result<ExtractedDocument, IngestError> {
    let text = String::from_utf8_lossy(bytes).trim().to_string();
    if text.chars().count() < MIN_TXT_CHARS {
        return Err(IngestError::EmptyOrUnreadable(
            "The text file appears to be empty or unreadable.".to_string(),
        ));
    }

    let mut metadata = Map::new();
    metadata.insert("encoding".to_string(), json!("utf-8"));
    Ok(ExtractedDocument { text, metadata })
}

fn extract_epub(bytes: &[u8]) -> Result<ExtractedDocument, IngestError> {
    let mut doc = EpubDoc::from_reader(Cursor::new(bytes.to_vec()))
        .map_err(|e| IngestError::ExtractionFailed(format!("EPUB extraction failed: {}", e)))?;

    let mut titles = HashMap::new();
    collect_toc_titles(&doc.toc, &mut titles);

    let mut sections: Vec<(String, String)> = Vec::new();
    let mut position = 0usize;
    loop {
        position += 1;
        let path = doc.get_current_path();
        // A broken section never aborts the book; it is just left out.
        match doc.get_current_str() {
            Some((markup, mime)) if mime.contains("html") => {
                let text = html_to_text(&markup);
                if text.chars().count() >= MIN_EPUB_SECTION_CHARS {
                    let title = path
                        .as_ref()
                        .and_then(|p| titles.get(p).cloned())
                        .unwrap_or_else(|| format!("Section {}", sections.len() + 1));
                    sections.push((title, text));
                }
            }
            Some((_, mime)) => {
                tracing::debug!(position, %mime, "skipping non-HTML EPUB section");
            }
            None => {
                tracing::debug!(position, path = ?path, "skipping unreadable EPUB section");
            }
        }
        if !doc.go_next() {
            break;
        }
    }

    let text = sections
        .iter()
        .map(|(_, t)| t.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    if text.chars().count() < MIN_EPUB_CHARS {
        return Err(IngestError::ExtractionFailed(
            "Could not extract meaningful text from EPUB file.".to_string(),
        ));
    }

    let chapters: Vec<Value> = sections
        .iter()
        .map(|(title, t)| json!({ "title": title, "length": t.chars().count() }))
        .collect();
    let mut metadata = Map::new();
    metadata.insert("title".to_string(), json!(doc.mdata("title")));
    metadata.insert("author".to_string(), json!(doc.mdata("creator")));
    metadata.insert("chapterCount".to_string(), json!(sections.len()));
    metadata.insert("epubChapters".to_string(), Value::Array(chapters));
    Ok(ExtractedDocument { text, metadata })
}

/// Flatten the navigation tree into content path -> label, first entry wins.
fn collect_toc_titles(points: &[NavPoint], titles: &mut HashMap<PathBuf, String>) {
    for point in points {
        let target = point.content.to_string_lossy();
        let file = target.split('#').next().unwrap_or_default();
        let label = point.label.trim();
        if !label.is_empty() {
            titles
                .entry(PathBuf::from(file))
                .or_insert_with(|| label.to_string());
        }
        collect_toc_titles(&point.children, titles);
    }
}

/// Reduce an (X)HTML fragment to a single line of plain text.
///
/// Drops `<head>`, `<script>` and `<style>` blocks, replaces every tag with a
/// space, decodes `&nbsp; &amp; &lt; &gt; &quot;` and numeric entities in one
/// pass, and collapses whitespace.
pub fn html_to_text(markup: &str) -> String {
    let without_blocks = NON_TEXT_BLOCK.replace_all(markup, " ");
    let without_tags = TAG.replace_all(&without_blocks, " ");
    let decoded = ENTITY.replace_all(&without_tags, |caps: &regex::Captures| {
        decode_entity(&caps[1])
    });
    WHITESPACE.replace_all(&decoded, " ").trim().to_string()
}

fn decode_entity(name: &str) -> String {
    match name {
        "nbsp" => " ".to_string(),
        "amp" => "&".to_string(),
        "lt" => "<".to_string(),
        "gt" => ">".to_string(),
        "quot" => "\"".to_string(),
        _ => {
            let code = match name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => name.strip_prefix('#').and_then(|d| d.parse::<u32>().ok()),
            };
            // Unrepresentable code points and control characters are dropped.
            code.and_then(char::from_u32)
                .filter(|c| !c.is_control())
                .map(|c| c.to_string())
                .unwrap_or_default()
        }
    }
}
