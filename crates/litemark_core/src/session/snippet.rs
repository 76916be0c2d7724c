//! Toolbar markdown snippets inserted at the caret.

/// Fixed markdown template offered by the editor toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkdownSnippet {
    Heading1,
    Heading2,
    Heading3,
    Bold,
    Italic,
    Strikethrough,
    Table,
    Checkbox,
    Link,
    CodeBlock,
}

const TABLE_TEMPLATE: &str = "| Column 1 | Column 2 |\n| -------- | -------- |\n| Cell 1   | Cell 2   |\n";

impl MarkdownSnippet {
    /// Literal text inserted in place of the selection.
    pub fn text(self) -> &'static str {
        match self {
            Self::Heading1 => "# ",
            Self::Heading2 => "## ",
            Self::Heading3 => "### ",
            Self::Bold => "****",
            Self::Italic => "**",
            Self::Strikethrough => "~~~~",
            Self::Table => TABLE_TEMPLATE,
            Self::Checkbox => "- [ ] ",
            Self::Link => "[](https://)",
            Self::CodeBlock => "```\n\n```",
        }
    }

    /// Caret position after insertion, in bytes from the start of
    /// [`MarkdownSnippet::text`].
    pub fn caret_offset(self) -> usize {
        match self {
            Self::Bold | Self::Strikethrough => 2,
            Self::Italic | Self::Link => 1,
            // on the empty line between the fences
            Self::CodeBlock => 4,
            Self::Heading1
            | Self::Heading2
            | Self::Heading3
            | Self::Table
            | Self::Checkbox => self.text().len(),
        }
    }
}
