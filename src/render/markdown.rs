//! Report text cleaning and markdown-like parsing
//!
//! The workflow emits loosely formatted markdown. Before layout the text is
//! cleaned of template leftovers, then split into blocks (headings, list
//! items, paragraphs, blank spacers) whose text is split into styled spans.

use regex::Regex;
use std::sync::LazyLock;

/// Unfilled template slots such as `[to complete]` or `[insérer la date]`
static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\[[^\]]*(?:compl[eé]ter|completer|ins[eé]rer|insert|à remplir|to complete|to be completed|fill in)[^\]]*\]",
    )
    .expect("valid placeholder regex")
});

static NOT_SPECIFIED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:non spécifié|not specified)\b").expect("valid not-specified regex")
});

static MARKDOWN_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bmarkdown\b").expect("valid markdown-word regex"));

static NUMBERED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.\s+(.+)$").expect("valid numbered-item regex"));

/// `**bold**`, `*italic*` and `` `code` ``, leftmost first
static INLINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*\*(.+?)\*\*|\*([^*]+?)\*|`([^`]*)`").expect("valid inline-span regex")
});

/// Report titles the renderer prints itself
const TITLE_LINES: &[&str] = &["psychiatric report", "rapport psychiatrique"];

/// Line prefixes announcing generation metadata
const BOILERPLATE_PREFIXES: &[&str] = &["generated on ", "généré le ", "page "];

/// Styled run of inline text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    /// Unstyled text
    Plain(String),
    /// `**bold**`
    Bold(String),
    /// `*italic*`
    Italic(String),
    /// `` `code` ``
    Code(String),
}

impl Span {
    /// Text without styling
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Plain(t) | Self::Bold(t) | Self::Italic(t) | Self::Code(t) => t,
        }
    }
}

/// One line-level element of the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// `#` (level 1) or `##`/`###` (level 2)
    Heading {
        /// 1 or 2
        level: u8,
        /// Heading text
        spans: Vec<Span>,
    },
    /// `- item` or `* item`
    Bullet(Vec<Span>),
    /// `3. item`
    Numbered {
        /// Number as written in the text
        number: u32,
        /// Item text
        spans: Vec<Span>,
    },
    /// Any other non-empty line
    Paragraph(Vec<Span>),
    /// Vertical spacer
    Blank,
}

/// Strip template leftovers and boilerplate from report text
///
/// Normalizes line endings, removes placeholders, "not specified" markers and
/// stray "markdown" words, drops generation/page lines, duplicate titles and
/// code fences, and collapses runs of blank lines.
#[must_use]
pub fn clean_report(content: &str) -> String {
    let text = content.replace("\r\n", "\n").replace('\r', "\n");
    let text = PLACEHOLDER_RE.replace_all(&text, "");
    let text = NOT_SPECIFIED_RE.replace_all(&text, "");
    let text = MARKDOWN_WORD_RE.replace_all(&text, "");

    let mut out: Vec<&str> = Vec::new();
    let mut last_blank = false;

    for line in text.split('\n') {
        let trimmed = line.trim();
        let lower = trimmed.to_lowercase();

        if BOILERPLATE_PREFIXES.iter().any(|p| lower.starts_with(p)) {
            continue;
        }
        let bare_title = lower.trim_start_matches('#').trim();
        let fence = !trimmed.is_empty() && trimmed.chars().all(|c| c == '`');
        if fence || TITLE_LINES.contains(&bare_title) {
            continue;
        }

        if trimmed.is_empty() {
            if !last_blank {
                out.push("");
            }
            last_blank = true;
        } else {
            out.push(line.trim_end());
            last_blank = false;
        }
    }

    out.join("\n").trim().to_string()
}

/// Split cleaned text into blocks, one per line
#[must_use]
pub fn parse_blocks(markdown: &str) -> Vec<Block> {
    markdown.lines().map(parse_line).collect()
}

fn parse_line(raw: &str) -> Block {
    let line = raw.trim();
    if line.is_empty() {
        return Block::Blank;
    }

    if let Some(rest) = line.strip_prefix("# ") {
        return Block::Heading {
            level: 1,
            spans: parse_inline(rest.trim()),
        };
    }
    if let Some(rest) = line.strip_prefix("## ").or_else(|| line.strip_prefix("### ")) {
        return Block::Heading {
            level: 2,
            spans: parse_inline(rest.trim()),
        };
    }
    if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
        return Block::Bullet(parse_inline(rest.trim()));
    }
    if let Some(caps) = NUMBERED_RE.captures(line)
        && let Ok(number) = caps[1].parse::<u32>()
    {
        return Block::Numbered {
            number,
            spans: parse_inline(caps[2].trim()),
        };
    }

    Block::Paragraph(parse_inline(line))
}

/// Split one line into styled spans
#[must_use]
pub fn parse_inline(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut last = 0;

    for caps in INLINE_RE.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if whole.start() > last {
            spans.push(Span::Plain(text[last..whole.start()].to_string()));
        }
        let span = if let Some(bold) = caps.get(1) {
            Span::Bold(bold.as_str().to_string())
        } else if let Some(italic) = caps.get(2) {
            Span::Italic(italic.as_str().to_string())
        } else if let Some(code) = caps.get(3) {
            Span::Code(code.as_str().to_string())
        } else {
            Span::Plain(whole.as_str().to_string())
        };
        spans.push(span);
        last = whole.end();
    }

    if last < text.len() {
        spans.push(Span::Plain(text[last..].to_string()));
    }
    spans
}
