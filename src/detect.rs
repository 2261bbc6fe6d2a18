//! File format detection from the upload's file name.

use crate::models::FileType;

/// Map a file name to a supported [`FileType`] by its trailing extension.
///
/// Case-insensitive. Returns `None` for unknown extensions and for names
/// without an extension; callers reject those before reading any bytes.
pub fn detect_file_type(file_name: &str) -> Option<FileType> {
    let (_, ext) = file_name.rsplit_once('.')?;
    match ext.to_ascii_lowercase().as_str() {
        "pdf" => Some(FileType::Pdf),
        "txt" | "text" => Some(FileType::Txt),
        "epub" => Some(FileType::Epub),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions() {
        assert_eq!(detect_file_type("book.pdf"), Some(FileType::Pdf));
        assert_eq!(detect_file_type("notes.txt"), Some(FileType::Txt));
        assert_eq!(detect_file_type("notes.text"), Some(FileType::Txt));
        assert_eq!(detect_file_type("novel.epub"), Some(FileType::Epub));
    }

    #[test]
    fn case_insensitive() {
        assert_eq!(detect_file_type("Report.PDF"), Some(FileType::Pdf));
        assert_eq!(detect_file_type("Story.EpUb"), Some(FileType::Epub));
    }

    #[test]
    fn only_the_last_extension_counts() {
        assert_eq!(detect_file_type("archive.pdf.zip"), None);
        assert_eq!(detect_file_type("my.notes.txt"), Some(FileType::Txt));
    }

    #[test]
    fn unsupported_or_missing_extension() {
        assert_eq!(detect_file_type("slides.pptx"), None);
        assert_eq!(detect_file_type("README"), None);
        assert_eq!(detect_file_type("trailing."), None);
    }
}
