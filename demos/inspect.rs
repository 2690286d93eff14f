fn main() {
    let args: Vec<String> = std::env::args().collect();
    let md = if args.len() > 1 {
        std::fs::read_to_string(&args[1]).expect("Failed to read file")
    } else {
        "Call notes # Follow up\n\n- ask about `retry_limit`\n- [ticket](https://example.com/T-12)".to_string()
    };

    println!("{}", clipdo::render_markdown(&md));
}
