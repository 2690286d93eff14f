//! Block-level IR produced by the parser.
//!
//! Text payloads hold inline HTML that has already been escaped and rendered,
//! except `CodeBlock::content`, which is the raw fenced text.

/// Ordered (`<ol>`) or unordered (`<ul>`) list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Unordered,
    Ordered,
}

/// A run of consecutive list items of one kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct List {
    pub kind: ListKind,
    pub items: Vec<String>,
}

/// Block-level elements parsed from Markdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading {
        level: u8,
        content: String,
    },
    /// One fragment per source line, joined with `<br>` on output.
    Paragraph {
        lines: Vec<String>,
    },
    CodeBlock {
        content: String,
    },
    Blockquote {
        content: String,
    },
    List(List),
    Rule,
}
