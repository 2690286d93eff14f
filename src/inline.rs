//! Inline markup: escaping, code spans, images, links and emphasis.
//!
//! Rendering is an ordered series of pattern passes over one string. Text is
//! escaped before any pass runs, and code spans are swapped for placeholder
//! tokens before the emphasis passes so their contents stay verbatim.

use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};

static CODE_SPAN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`\n]+)`").unwrap());
static IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[([^\]]*)\]\(([^)]*)\)").unwrap());
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]*)\]\(([^)]*)\)").unwrap());
static BOLD_STARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());
static BOLD_UNDERSCORES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__(.+?)__").unwrap());
static STRIKETHROUGH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"~~(.+?)~~").unwrap());
static ITALIC_STAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*_\n]+)\*").unwrap());
static ITALIC_UNDERSCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_([^*_\n]+)_").unwrap());

/// URL schemes a link or image may point at. Compared ASCII-case-insensitively.
const ALLOWED_SCHEMES: [&str; 3] = ["http://", "https://", "mailto:"];

/// Escape the five HTML-significant characters.
///
/// ```
/// assert_eq!(clipdo::escape_html(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
/// ```
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}

/// Check a link or image target against the allowed schemes.
///
/// Returns the trimmed URL when it starts with `http://`, `https://` or
/// `mailto:`, and `None` for anything else (relative paths, `javascript:`,
/// `data:`, blank input).
///
/// ```
/// assert_eq!(clipdo::sanitize_url("  https://x.com/a b "), Some("https://x.com/a b"));
/// assert_eq!(clipdo::sanitize_url("javascript:alert(1)"), None);
/// ```
pub fn sanitize_url(url: &str) -> Option<&str> {
    let url = url.trim();
    let allowed = ALLOWED_SCHEMES.iter().any(|scheme| {
        url.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    });
    allowed.then_some(url)
}

/// Render one line of text to an inline HTML fragment.
///
/// Supports code spans, images, links, bold, strikethrough and italic.
/// Delimiters without a partner are left in place as literal text.
pub fn render_inline(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let escaped = escape_html(text);
    let (mut table, escaped) = Placeholders::for_text(&escaped);

    let out = table.extract_code_spans(&escaped);
    let out = table.substitute_images(&out);
    let out = table.substitute_links(&out);
    let out = apply_emphasis(&out);

    table.restore(&out)
}

fn apply_emphasis(text: &str) -> String {
    // Bold before italic so `**` and `__` are never read as two italics.
    let text = BOLD_STARS.replace_all(text, "<strong>${1}</strong>");
    let text = BOLD_UNDERSCORES.replace_all(&text, "<strong>${1}</strong>");
    let text = STRIKETHROUGH.replace_all(&text, "<del>${1}</del>");
    let text = ITALIC_STAR.replace_all(&text, "<em>${1}</em>");
    let text = ITALIC_UNDERSCORE.replace_all(&text, "<em>${1}</em>");
    text.into_owned()
}

/// Content pulled out of the line while the emphasis passes run.
struct Protected {
    /// What the token turns into in the final output.
    html: String,
    /// The escaped source text the token replaced, used inside attribute values.
    literal: String,
}

/// Per-line placeholder table.
///
/// Tokens have the form `S<index>S`, where `S` is a private-use character that
/// does not occur anywhere in the line, so a token can never collide with user
/// text. Tokens contain no markup delimiters and pass through every pattern
/// untouched.
struct Placeholders {
    sentinel: char,
    entries: Vec<Protected>,
}

fn is_sentinel_candidate(c: char) -> bool {
    matches!(c, '\u{E000}'..='\u{F8FF}' | '\u{F0000}'..='\u{FFFFD}')
}

impl Placeholders {
    /// Build the table for an escaped line, returning the line the passes should run on.
    ///
    /// When the line already uses every private-use character, the first one is
    /// rewritten as a numeric character reference, which renders identically and
    /// frees it for tokens.
    fn for_text(text: &str) -> (Self, Cow<'_, str>) {
        let present: HashSet<char> = text.chars().filter(|c| is_sentinel_candidate(*c)).collect();
        let free = ('\u{E000}'..='\u{F8FF}')
            .chain('\u{F0000}'..='\u{FFFFD}')
            .find(|c| !present.contains(c));

        let (sentinel, text) = match free {
            Some(c) => (c, Cow::Borrowed(text)),
            None => {
                let c = '\u{E000}';
                let reference = format!("&#x{:X};", u32::from(c));
                (c, Cow::Owned(text.replace(c, &reference)))
            }
        };

        let table = Self {
            sentinel,
            entries: Vec::new(),
        };
        (table, text)
    }

    /// Store `html` and hand back the token standing in for it.
    fn protect(&mut self, html: String, literal: String) -> String {
        let s = self.sentinel;
        let token = format!("{s}{}{s}", self.entries.len());
        self.entries.push(Protected { html, literal });
        token
    }

    fn extract_code_spans(&mut self, text: &str) -> String {
        CODE_SPAN
            .replace_all(text, |caps: &Captures| {
                self.protect(format!("<code>{}</code>", &caps[1]), caps[0].to_owned())
            })
            .into_owned()
    }

    fn substitute_images(&mut self, text: &str) -> String {
        IMAGE
            .replace_all(text, |caps: &Captures| {
                let alt = self.literal(&caps[1]).into_owned();
                let target = self.literal(&caps[2]).into_owned();
                match sanitize_url(&target) {
                    Some(src) => {
                        let tag = format!(r#"<img alt="{alt}" src="{src}">"#);
                        let literal = self.literal(&caps[0]).into_owned();
                        self.protect(tag, literal)
                    }
                    None => caps[1].to_owned(),
                }
            })
            .into_owned()
    }

    fn substitute_links(&mut self, text: &str) -> String {
        LINK.replace_all(text, |caps: &Captures| {
            let target = self.literal(&caps[2]).into_owned();
            match sanitize_url(&target) {
                Some(href) => {
                    let open =
                        format!(r#"<a href="{href}" target="_blank" rel="noopener noreferrer">"#);
                    let literal = self.literal(&caps[0]).into_owned();
                    format!("{}{}</a>", self.protect(open, literal), &caps[1])
                }
                None => caps[1].to_owned(),
            }
        })
        .into_owned()
    }

    /// Replace every token with its final html.
    fn restore(&self, text: &str) -> String {
        self.expand(text, |entry| entry.html.as_str()).into_owned()
    }

    /// Replace every token with the escaped source text it stands for.
    fn literal<'a>(&self, text: &'a str) -> Cow<'a, str> {
        self.expand(text, |entry| entry.literal.as_str())
    }

    fn expand<'a>(&self, text: &'a str, pick: impl Fn(&Protected) -> &str) -> Cow<'a, str> {
        let s = self.sentinel;
        if self.entries.is_empty() || !text.contains(s) {
            return Cow::Borrowed(text);
        }

        // Splitting on the sentinel alternates plain text and token indices.
        let mut out = String::with_capacity(text.len());
        for (i, part) in text.split(s).enumerate() {
            if i % 2 == 0 {
                out.push_str(part);
                continue;
            }
            match part.parse::<usize>().ok().and_then(|n| self.entries.get(n)) {
                Some(entry) => out.push_str(pick(entry)),
                None => {
                    out.push(s);
                    out.push_str(part);
                    out.push(s);
                }
            }
        }
        Cow::Owned(out)
    }
}
