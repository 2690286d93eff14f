use clipdo::{Block, ListKind};

fn main() {
    let path = std::env::args().nth(1).expect("usage: debug_blocks <file.md>");
    let md = std::fs::read_to_string(&path).expect("Failed to read file");

    for (i, block) in clipdo::parse(&md).iter().enumerate() {
        println!("{:3} {}", i, describe(block));
    }
}

fn describe(block: &Block) -> String {
    match block {
        Block::Heading { level, content } => format!("H{} {}", level, content),
        Block::Paragraph { lines } => format!("P  {} line(s)", lines.len()),
        Block::CodeBlock { content } => format!("CODE {} line(s)", content.lines().count()),
        Block::Blockquote { content } => format!("QUOTE {}", content),
        Block::List(list) => {
            let kind = match list.kind {
                ListKind::Ordered => "OL",
                ListKind::Unordered => "UL",
            };
            format!("{} {} item(s)", kind, list.items.len())
        }
        Block::Rule => "HR".to_string(),
    }
}
