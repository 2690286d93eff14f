use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};

use crate::block::{Block, List, ListKind};
use crate::inline::render_inline;

const FENCE: &str = "```";

// Heading markers may follow arbitrary leading text on the same line.
static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?)(#{1,6})\s+(.+)$").unwrap());
static RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\*{3,}|-{3,}|_{3,})$").unwrap());
static BLOCKQUOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^>\s+(.+)$").unwrap());
static ORDERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+\.\s+(.+)$").unwrap());
static UNORDERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-+*]\s+(.+)$").unwrap());

/// Drop a leading byte order mark and normalize `\r\n` and lone `\r` to `\n`
fn normalize_line_endings(markdown: &str) -> String {
    let markdown = markdown.strip_prefix('\u{FEFF}').unwrap_or(markdown);
    markdown.replace("\r\n", "\n").replace('\r', "\n")
}

/// Parse markdown text into a list of blocks
pub fn parse(markdown: &str) -> Vec<Block> {
    let markdown = normalize_line_endings(markdown);
    let mut blocks = Vec::new();
    let mut state = ParseState::default();
    let mut line_count = 0usize;

    for line in markdown.split('\n') {
        process_line(line, &mut state, &mut blocks);
        line_count += 1;
    }

    if state.in_fenced_code {
        trace!("closing unterminated code fence at end of input");
        state.close_fence(&mut blocks);
    }
    state.flush_paragraph(&mut blocks);
    state.close_list(&mut blocks);

    debug!(lines = line_count, blocks = blocks.len(), "parsed markdown");
    blocks
}

#[derive(Default)]
struct ParseState<'a> {
    // Code block state
    in_fenced_code: bool,
    code_buffer: Vec<&'a str>,

    // Open list, if any; its kind is the current list mode
    list: Option<List>,

    // Inline-rendered lines of the paragraph being built
    paragraph: Vec<String>,
}

impl<'a> ParseState<'a> {
    fn flush_paragraph(&mut self, blocks: &mut Vec<Block>) {
        if !self.paragraph.is_empty() {
            let lines = std::mem::take(&mut self.paragraph);
            blocks.push(Block::Paragraph { lines });
        }
    }

    fn close_list(&mut self, blocks: &mut Vec<Block>) {
        if let Some(list) = self.list.take() {
            blocks.push(Block::List(list));
        }
    }

    /// Flush the paragraph and close the list before a standalone block.
    fn end_open_blocks(&mut self, blocks: &mut Vec<Block>) {
        self.flush_paragraph(blocks);
        self.close_list(blocks);
    }

    fn open_fence(&mut self, blocks: &mut Vec<Block>) {
        self.end_open_blocks(blocks);
        self.in_fenced_code = true;
        self.code_buffer.clear();
    }

    fn close_fence(&mut self, blocks: &mut Vec<Block>) {
        self.in_fenced_code = false;
        let content = std::mem::take(&mut self.code_buffer).join("\n");
        blocks.push(Block::CodeBlock { content });
    }

    fn push_list_item(&mut self, kind: ListKind, content: &str, blocks: &mut Vec<Block>) {
        self.flush_paragraph(blocks);
        if self.list.as_ref().is_some_and(|list| list.kind != kind) {
            self.close_list(blocks);
        }
        self.list
            .get_or_insert_with(|| List {
                kind,
                items: Vec::new(),
            })
            .items
            .push(render_inline(content));
    }
}

fn process_line<'a>(line: &'a str, state: &mut ParseState<'a>, blocks: &mut Vec<Block>) {
    let trimmed = line.trim();

    if trimmed.starts_with(FENCE) {
        if state.in_fenced_code {
            state.close_fence(blocks);
        } else {
            state.open_fence(blocks);
        }
        return;
    }

    // Fenced lines are kept verbatim, untrimmed
    if state.in_fenced_code {
        state.code_buffer.push(line);
        return;
    }

    if trimmed.is_empty() {
        state.end_open_blocks(blocks);
        return;
    }

    if let Some(caps) = HEADING.captures(trimmed) {
        state.end_open_blocks(blocks);
        let prefix = caps[1].trim();
        if !prefix.is_empty() {
            blocks.push(Block::Paragraph {
                lines: vec![render_inline(prefix)],
            });
        }
        blocks.push(Block::Heading {
            level: caps[2].len() as u8,
            content: render_inline(&caps[3]),
        });
        return;
    }

    if RULE.is_match(trimmed) {
        state.end_open_blocks(blocks);
        blocks.push(Block::Rule);
        return;
    }

    if let Some(caps) = BLOCKQUOTE.captures(trimmed) {
        state.end_open_blocks(blocks);
        blocks.push(Block::Blockquote {
            content: render_inline(&caps[1]),
        });
        return;
    }

    if let Some(caps) = ORDERED_ITEM.captures(trimmed) {
        state.push_list_item(ListKind::Ordered, &caps[1], blocks);
        return;
    }

    if let Some(caps) = UNORDERED_ITEM.captures(trimmed) {
        state.push_list_item(ListKind::Unordered, &caps[1], blocks);
        return;
    }

    // Lists never absorb a following plain line
    state.close_list(blocks);
    state.paragraph.push(render_inline(trimmed));
}
