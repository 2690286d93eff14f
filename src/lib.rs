//! Capture copied text as todo items and render their notes as HTML.
//!
//! The markdown renderer supports a small fixed subset: headings, rules,
//! single-line blockquotes, flat lists, fenced code and paragraphs, with
//! code spans, images, links, bold, strikethrough and italic inside lines.

mod block;
mod config;
mod error;
mod html;
mod inline;
mod parser;
mod store;
mod task;

pub use block::{Block, List, ListKind};
pub use config::{Config, ExportConfig, LogConfig, StoreConfig, TasksConfig};
pub use error::{Error, Result};
pub use inline::{escape_html, render_inline, sanitize_url};
pub use store::{JsonFileStore, TaskStore};
pub use task::{DateGroup, Source, Task, TaskList, group_by_date};

/// Parse markdown text into a vector of blocks.
pub fn parse(markdown: &str) -> Vec<Block> {
    parser::parse(markdown)
}

/// Convert blocks to an HTML fragment.
pub fn blocks_to_html(blocks: &[Block]) -> String {
    html::blocks_to_html(blocks)
}

/// Convert markdown to an HTML fragment.
///
/// Output only uses `p br h1-h6 hr blockquote ol ul li pre code strong del em a img`,
/// and all source text is escaped before it is wrapped in tags.
pub fn render_markdown(markdown: &str) -> String {
    html::blocks_to_html(&parser::parse(markdown))
}
