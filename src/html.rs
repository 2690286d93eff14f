use crate::block::{Block, List, ListKind};
use crate::inline::escape_html;

/// Convert blocks to an HTML fragment.
///
/// Fragments are concatenated in order with no whitespace between them.
pub fn blocks_to_html(blocks: &[Block]) -> String {
    let mut out = String::new();
    for block in blocks {
        emit_block(block, &mut out);
    }
    out
}

fn emit_block(block: &Block, out: &mut String) {
    match block {
        Block::Heading { level, content } => {
            out.push_str(&format!("<h{level}>{content}</h{level}>"));
        }
        Block::Paragraph { lines } => {
            out.push_str("<p>");
            out.push_str(&lines.join("<br>"));
            out.push_str("</p>");
        }
        Block::CodeBlock { content } => {
            out.push_str("<pre><code>");
            out.push_str(&escape_html(content));
            out.push_str("</code></pre>");
        }
        Block::Blockquote { content } => {
            out.push_str("<blockquote>");
            out.push_str(content);
            out.push_str("</blockquote>");
        }
        Block::List(list) => list_to_html(list, out),
        Block::Rule => out.push_str("<hr>"),
    }
}

fn list_to_html(list: &List, out: &mut String) {
    let tag = match list.kind {
        ListKind::Ordered => "ol",
        ListKind::Unordered => "ul",
    };
    out.push('<');
    out.push_str(tag);
    out.push('>');
    for item in &list.items {
        out.push_str("<li>");
        out.push_str(item);
        out.push_str("</li>");
    }
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_each_block_kind() {
        let blocks = vec![
            Block::Heading {
                level: 3,
                content: "Title".to_owned(),
            },
            Block::Paragraph {
                lines: vec!["a".to_owned(), "b".to_owned()],
            },
            Block::Blockquote {
                content: "q".to_owned(),
            },
            Block::Rule,
            Block::List(List {
                kind: ListKind::Ordered,
                items: vec!["x".to_owned()],
            }),
            Block::CodeBlock {
                content: "if a < b {\n}".to_owned(),
            },
        ];
        assert_eq!(
            blocks_to_html(&blocks),
            "<h3>Title</h3><p>a<br>b</p><blockquote>q</blockquote><hr><ol><li>x</li></ol>\
             <pre><code>if a &lt; b {\n}</code></pre>"
        );
    }

    #[test]
    fn test_no_blocks() {
        assert_eq!(blocks_to_html(&[]), "");
    }
}
