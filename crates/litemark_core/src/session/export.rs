//! Standalone markdown export of the open note.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

static NON_ALPHANUMERIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[^a-z0-9]").expect("valid file-name regex"));

const EXPORT_EXTENSION: &str = "md";
const FALLBACK_STEM: &str = "untitled";

/// Markdown document ready to be offered as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDocument {
    pub file_name: String,
    pub contents: String,
}

impl ExportDocument {
    /// Renders `title` as a top-level heading followed by `content`.
    pub fn from_note(title: &str, content: &str) -> Self {
        Self {
            file_name: format!("{}.{EXPORT_EXTENSION}", sanitize_file_stem(title)),
            contents: format!("# {title}\n\n{content}"),
        }
    }

    /// Writes the document into `dir` and returns the full path.
    pub fn write_into(&self, dir: &Path) -> std::io::Result<PathBuf> {
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.contents)?;
        Ok(path)
    }
}

/// Lower-cases `title` and replaces every non-ASCII-alphanumeric char,
/// surrounding spaces included, with `_`. Blank titles map to `untitled`.
pub fn sanitize_file_stem(title: &str) -> String {
    if title.trim().is_empty() {
        return FALLBACK_STEM.to_string();
    }
    NON_ALPHANUMERIC_RE.replace_all(title, "_").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::{sanitize_file_stem, ExportDocument};

    #[test]
    fn sanitize_replaces_symbols_and_lowercases() {
        assert_eq!(sanitize_file_stem("My Budget: 2024!"), "my_budget__2024_");
        assert_eq!(sanitize_file_stem("Café"), "caf_");
        assert_eq!(sanitize_file_stem("   "), "untitled");
    }

    #[test]
    fn sanitize_keeps_surrounding_spaces_as_underscores() {
        assert_eq!(sanitize_file_stem("  Hi "), "__hi_");
        assert_eq!(ExportDocument::from_note(" Plan", "").file_name, "_plan.md");
    }

    #[test]
    fn export_prefixes_title_heading() {
        let doc = ExportDocument::from_note("Recipe", "pasta");
        assert_eq!(doc.file_name, "recipe.md");
        assert_eq!(doc.contents, "# Recipe\n\npasta");
    }

    #[test]
    fn write_into_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let doc = ExportDocument::from_note("Notes", "body");
        let path = doc.write_into(dir.path()).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "# Notes\n\nbody");
    }
}
