//! Line classification for the single forward pass.
//!
//! Classification order matters and is fixed: bullet marker, imperative
//! task line, header, bare URL, continuation, skip.

use std::sync::LazyLock;

use regex::Regex;

// ---------------------------------------------------------------------------
// Marker sets
// ---------------------------------------------------------------------------

/// Single-character bullet glyphs that require trailing whitespace.
const ASCII_BULLETS: &[char] = &['-', '*', '+'];

/// Bullet code points PDF extractors commonly emit, with or without a
/// following space.
const UNICODE_BULLETS: &[char] = &['•', '◦', '▪', '▸', '‣', '·', '●', '○', '»', '›'];

/// Multi-character markers (checkboxes and arrows).
const COMPOUND_MARKERS: &[&str] = &["[ ]", "[x]", "[X]", "☐", "☑", "✓", "✔", "->", "=>", "→", "⇒"];

/// `1.` / `12)` style numbering.
static NUMBERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,3}[.)]\s+").expect("numbered marker regex"));

/// `a.` / `b)` style lettering (a single letter only).
static LETTERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][.)]\s+").expect("lettered marker regex"));

/// Imperative verbs that open an actionable task line.
const TASK_VERBS: &[&str] = &[
    "activate", "add", "attend", "book", "bring", "collect", "complete", "configure",
    "connect", "contact", "create", "download", "enable", "enroll", "explore", "fill",
    "finish", "install", "introduce", "join", "learn", "meet", "obtain", "order",
    "prepare", "read", "register", "request", "return", "review", "schedule", "set up",
    "setup", "shadow", "sign", "submit", "update", "upload", "verify", "visit", "watch",
];

// ---------------------------------------------------------------------------
// LineClass
// ---------------------------------------------------------------------------

/// What the forward pass does with a trimmed, non-empty line.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum LineClass<'a> {
    /// Bullet-marker line; carries the body with the marker stripped.
    Bullet(&'a str),
    /// Imperative task line.
    Task(&'a str),
    /// Colon-terminated header; carries the body without the colon.
    Header(&'a str),
    /// A line that is nothing but a URL.
    Url(&'a str),
    /// Prose that extends whatever came before it.
    Continuation(&'a str),
    /// Too short, too long, or noise.
    Skip,
}

pub(crate) fn classify(line: &str) -> LineClass<'_> {
    if let Some(body) = strip_bullet_marker(line) {
        return LineClass::Bullet(body);
    }
    if is_task_line(line) {
        return LineClass::Task(line);
    }
    if let Some(body) = header_body(line) {
        return LineClass::Header(body);
    }
    if is_url(line) {
        return LineClass::Url(line);
    }
    let chars = line.chars().count();
    if (15..=300).contains(&chars) {
        return LineClass::Continuation(line);
    }
    LineClass::Skip
}

// ---------------------------------------------------------------------------
// Bullet markers
// ---------------------------------------------------------------------------

/// Strip one leading bullet marker, returning the trimmed body.
///
/// A stripped ASCII glyph may itself be followed by a checkbox marker
/// (`- [ ] Task`), which is stripped as well.
pub(crate) fn strip_bullet_marker(line: &str) -> Option<&str> {
    for marker in COMPOUND_MARKERS {
        if let Some(rest) = line.strip_prefix(marker) {
            return nonempty(rest.trim_start());
        }
    }
    if let Some(rest) = line.strip_prefix(ASCII_BULLETS) {
        // ASCII glyphs need whitespace after them: "-5 degrees" is prose.
        let rest = rest.strip_prefix(char::is_whitespace)?.trim_start();
        for marker in COMPOUND_MARKERS {
            if let Some(after_box) = rest.strip_prefix(marker) {
                return nonempty(after_box.trim_start());
            }
        }
        return nonempty(rest);
    }
    if let Some(rest) = line.strip_prefix(UNICODE_BULLETS) {
        // Extractors often drop the space after a bullet code point.
        return nonempty(rest.trim_start());
    }
    if let Some(found) = NUMBERED.find(line).or_else(|| LETTERED.find(line)) {
        return nonempty(line[found.end()..].trim_start());
    }
    // A bare leading period, as in ". Complete the form".
    if let Some(rest) = line.strip_prefix(". ") {
        return nonempty(rest.trim_start());
    }
    None
}

fn nonempty(body: &str) -> Option<&str> {
    if body.is_empty() {
        None
    } else {
        Some(body)
    }
}

// ---------------------------------------------------------------------------
// Task and header lines
// ---------------------------------------------------------------------------

/// An unbulleted line that is still clearly an instruction: opens with a
/// task verb, plausibly sized, and not a header.
pub(crate) fn is_task_line(line: &str) -> bool {
    let chars = line.chars().count();
    (8..=200).contains(&chars) && !line.ends_with(':') && starts_with_task_verb(line)
}

fn starts_with_task_verb(line: &str) -> bool {
    let lower = line.to_lowercase();
    TASK_VERBS.iter().any(|verb| {
        lower
            .strip_prefix(verb)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
    })
}

/// True when any word of `text` opens with a task verb.
pub(crate) fn contains_task_verb(text: &str) -> bool {
    let lower = text.to_lowercase();
    TASK_VERBS.iter().any(|verb| {
        lower.match_indices(verb).any(|(at, _)| {
            let boundary_before =
                at == 0 || lower[..at].ends_with(|c: char| c.is_whitespace());
            let after = &lower[at + verb.len()..];
            boundary_before
                && (after.is_empty()
                    || after.starts_with(char::is_whitespace)
                    || after.starts_with(':'))
        })
    })
}

/// Header body (sans colon) when the line is a section header: ends with a
/// colon, opens with an uppercase letter or digit, sized like a heading.
fn header_body(line: &str) -> Option<&str> {
    let body = line.strip_suffix(':')?;
    let first = line.chars().next()?;
    if !(first.is_uppercase() || first.is_ascii_digit()) {
        return None;
    }
    let chars = line.chars().count();
    if (8..=80).contains(&chars) {
        Some(body.trim_end())
    } else {
        None
    }
}

/// A line that is a URL and nothing else.
fn is_url(line: &str) -> bool {
    (line.starts_with("http://") || line.starts_with("https://") || line.starts_with("www."))
        && !line.contains(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_bullets_need_a_space() {
        assert_eq!(strip_bullet_marker("- Setup laptop"), Some("Setup laptop"));
        assert_eq!(strip_bullet_marker("* Setup laptop"), Some("Setup laptop"));
        assert_eq!(strip_bullet_marker("-5 degrees outside"), None);
    }

    #[test]
    fn test_unicode_bullets_allow_missing_space() {
        assert_eq!(strip_bullet_marker("•Setup laptop"), Some("Setup laptop"));
        assert_eq!(strip_bullet_marker("‣ Setup laptop"), Some("Setup laptop"));
    }

    #[test]
    fn test_checkbox_and_arrow_markers() {
        assert_eq!(strip_bullet_marker("[ ] Order badge"), Some("Order badge"));
        assert_eq!(strip_bullet_marker("- [x] Order badge"), Some("Order badge"));
        assert_eq!(strip_bullet_marker("-> Order badge"), Some("Order badge"));
        assert_eq!(strip_bullet_marker("→ Order badge"), Some("Order badge"));
    }

    #[test]
    fn test_numbered_and_lettered_markers() {
        assert_eq!(strip_bullet_marker("1. Order badge"), Some("Order badge"));
        assert_eq!(strip_bullet_marker("12) Order badge"), Some("Order badge"));
        assert_eq!(strip_bullet_marker("a) Order badge"), Some("Order badge"));
        assert_eq!(strip_bullet_marker("b. Order badge"), Some("Order badge"));
        // Two letters is a word, not a marker.
        assert_eq!(strip_bullet_marker("ab. Order badge"), None);
    }

    #[test]
    fn test_bare_marker_without_body_is_not_a_bullet() {
        assert_eq!(strip_bullet_marker("-"), None);
        assert_eq!(strip_bullet_marker("1. "), None);
    }

    #[test]
    fn test_task_lines() {
        assert!(is_task_line("Install the IDE from the portal"));
        assert!(is_task_line("Set up your development environment"));
        // Ends in a colon: a header, not a task.
        assert!(!is_task_line("Install the following:"));
        // Too short.
        assert!(!is_task_line("Read it"));
        // Does not open with a task verb.
        assert!(!is_task_line("The laptop arrives on Monday"));
    }

    #[test]
    fn test_headers() {
        assert_eq!(classify("Before your first day:"), LineClass::Header("Before your first day"));
        assert_eq!(classify("1st week checklist:"), LineClass::Header("1st week checklist"));
        // Lowercase start is not a header.
        assert!(matches!(classify("before your first day:"), LineClass::Continuation(_)));
    }

    #[test]
    fn test_urls_and_continuations() {
        assert_eq!(
            classify("https://wiki.example.com/laptop"),
            LineClass::Url("https://wiki.example.com/laptop")
        );
        assert!(matches!(
            classify("your buddy will walk you through the rest"),
            LineClass::Continuation(_)
        ));
        assert_eq!(classify("ok"), LineClass::Skip);
    }

    #[test]
    fn test_contains_task_verb_respects_word_boundaries() {
        assert!(contains_task_verb("Complete these before Friday"));
        assert!(contains_task_verb("Things to set up"));
        // "readiness" contains "read" but not as a word.
        assert!(!contains_task_verb("Readiness overview"));
    }
}
