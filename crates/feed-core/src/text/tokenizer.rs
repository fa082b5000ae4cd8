use regex::Regex;
use serde::Serialize;
use std::borrow::Cow;
use std::sync::OnceLock;

/// Characters stripped from the end of a detected link
const TRAILING_PUNCTUATION: &[char] = &[')', ',', '.', '!', '?', ';', ':'];

/// One span of tokenized message text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Segment<'a> {
    Literal { text: &'a str },
    Link { text: &'a str, href: Cow<'a, str> },
}

impl<'a> Segment<'a> {
    /// Text as it appears in the input
    pub fn display_text(&self) -> &'a str {
        match self {
            Self::Literal { text } | Self::Link { text, .. } => text,
        }
    }

    #[inline]
    pub fn is_link(&self) -> bool {
        matches!(self, Self::Link { .. })
    }

    /// Link target, if this is a link
    pub fn href(&self) -> Option<&str> {
        match self {
            Self::Link { href, .. } => Some(href),
            Self::Literal { .. } => None,
        }
    }
}

fn link_regex() -> &'static Regex {
    static LINK_RE: OnceLock<Regex> = OnceLock::new();
    LINK_RE.get_or_init(|| {
        Regex::new(r"https?://[^\s]+|www\.[^\s]+|(?:[a-zA-Z0-9-]+\.)+[a-zA-Z]{2,}(?:/\S*)?")
            .expect("valid link regex")
    })
}

fn has_scheme(s: &str) -> bool {
    let lower = s.get(..8).unwrap_or(s).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Split text into literal and link segments.
///
/// Concatenating every segment's display text reproduces the input. No empty
/// literal is emitted.
pub fn tokenize(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    for m in link_regex().find_iter(text) {
        if m.start() > cursor {
            segments.push(Segment::Literal {
                text: &text[cursor..m.start()],
            });
        }

        let matched = m.as_str();
        let trimmed = matched.trim_end_matches(TRAILING_PUNCTUATION);
        let suffix = &matched[trimmed.len()..];

        let href = if has_scheme(trimmed) {
            Cow::Borrowed(trimmed)
        } else {
            Cow::Owned(format!("https://{trimmed}"))
        };
        segments.push(Segment::Link {
            text: trimmed,
            href,
        });
        if !suffix.is_empty() {
            segments.push(Segment::Literal { text: suffix });
        }

        cursor = m.end();
    }

    if cursor < text.len() {
        segments.push(Segment::Literal {
            text: &text[cursor..],
        });
    }

    segments
}

/// Only the link segments of `text`
pub fn links(text: &str) -> Vec<Segment<'_>> {
    tokenize(text).into_iter().filter(Segment::is_link).collect()
}
