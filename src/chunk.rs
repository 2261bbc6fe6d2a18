//! Deterministic word-count chapter splitter.
//!
//! Used whenever AI chaptering fails. Splits text into `clamp(ceil(n / 1500), 2, 15)`
//! contiguous word windows of equal size, drops windows shorter than the
//! minimum chapter length, and numbers the survivors densely from 1.
//!
//! Pure and repeatable: the same text and file name always give the same chapters.

use crate::config::ChapteringConfig;
use crate::models::Chapter;

/// Target chapter size for the fallback splitter.
pub const TARGET_WORDS_PER_CHAPTER: usize = 1500;
/// Chapters with less content than this (in characters) are never emitted.
pub const MIN_CHAPTER_LENGTH: usize = 200;
/// Fewest chapters the fallback splitter produces for long-enough text.
pub const MIN_CHAPTERS: usize = 2;
/// Upper bound on chapters from either chaptering path.
pub const MAX_CHAPTERS: usize = 15;

/// Whitespace-token count; the only source of [`Chapter::word_count`].
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Split `text` into generic "Chapter N" chapters without calling a model.
///
/// Returns contiguous `chapter_number`s starting at 1. Returns an empty
/// list only when the whole text is shorter than `min_chapter_chars`.
pub fn fallback_chunk(text: &str, file_name: &str, config: &ChapteringConfig) -> Vec<Chapter> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let total = words.len();
    if total == 0 {
        return Vec::new();
    }

    let chapter_count = total
        .div_ceil(config.target_words_per_chapter)
        .clamp(config.min_chapters, config.max_chapters);
    let words_per_chapter = total.div_ceil(chapter_count);

    let mut chapters = Vec::new();
    for window in words.chunks(words_per_chapter) {
        let content = window.join(" ");
        if content.chars().count() < config.min_chapter_chars {
            continue;
        }
        chapters.push(make_chapter(chapters.len() + 1, file_name, content));
    }

    // Many short windows can all fall under the minimum even though the
    // text as a whole is long enough to be one chapter.
    if chapters.is_empty() {
        let content = words.join(" ");
        if content.chars().count() >= config.min_chapter_chars {
            chapters.push(make_chapter(1, file_name, content));
        }
    }

    chapters
}

fn make_chapter(number: usize, file_name: &str, content: String) -> Chapter {
    Chapter {
        chapter_number: number as u32,
        title: format!("Chapter {}", number),
        summary: format!("Section {} of {}", number, file_name),
        word_count: word_count(&content),
        content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("word{}", i)).collect::<Vec<_>>().join(" ")
    }

    fn cfg() -> ChapteringConfig {
        ChapteringConfig::default()
    }

    #[test]
    fn three_thousand_words_make_two_chapters() {
        let chapters = fallback_chunk(&words(3000), "book.txt", &cfg());
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[0].word_count, 1500);
        assert_eq!(chapters[1].word_count, 1500);
        assert_eq!(chapters[0].title, "Chapter 1");
        assert_eq!(chapters[1].summary, "Section 2 of book.txt");
    }

    #[test]
    fn chapter_count_is_capped() {
        let chapters = fallback_chunk(&words(40_000), "big.txt", &cfg());
        assert_eq!(chapters.len(), 15);
        let total: usize = chapters.iter().map(|c| c.word_count).sum();
        assert_eq!(total, 40_000);
    }

    #[test]
    fn numbers_are_contiguous_from_one() {
        let chapters = fallback_chunk(&words(7_777), "x.txt", &cfg());
        for (i, ch) in chapters.iter().enumerate() {
            assert_eq!(ch.chapter_number as usize, i + 1);
        }
    }

    #[test]
    fn word_count_matches_content() {
        let text = "alpha  beta\n\ngamma\tdelta ".repeat(200);
        for ch in fallback_chunk(&text, "x.txt", &cfg()) {
            assert_eq!(ch.word_count, ch.content.split_whitespace().count());
            assert!(ch.content.chars().count() >= MIN_CHAPTER_LENGTH);
        }
    }

    #[test]
    fn short_trailing_window_is_dropped() {
        // Two one-word windows: a 60-char word and a 1-char word.
        let cfg = ChapteringConfig {
            min_chapter_chars: 50,
            ..ChapteringConfig::default()
        };
        let mut text = "x".repeat(60);
        text.push(' ');
        text.push('y');
        let chapters = fallback_chunk(&text, "t.txt", &cfg);
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].chapter_number, 1);
        assert_eq!(chapters[0].content, "x".repeat(60));
    }

    #[test]
    fn short_text_still_yields_one_chapter() {
        // 40 words of 5 chars: both halves are ~120 chars, the whole is ~240.
        let text = vec!["abcde"; 40].join(" ");
        let chapters = fallback_chunk(&text, "short.txt", &cfg());
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].word_count, 40);
    }

    #[test]
    fn too_short_text_yields_nothing() {
        assert!(fallback_chunk("tiny text", "t.txt", &cfg()).is_empty());
        assert!(fallback_chunk("   ", "t.txt", &cfg()).is_empty());
    }

    #[test]
    fn deterministic() {
        let text = words(5_000);
        let a = fallback_chunk(&text, "d.txt", &cfg());
        let b = fallback_chunk(&text, "d.txt", &cfg());
        assert_eq!(a, b);
    }
}
