//! The single forward pass over extracted document text.

use serde::{Deserialize, Serialize};

use crate::classify::{classify, contains_task_verb, LineClass};
use crate::links;

/// One proposed checklist step, ready for manager review.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDraft {
    pub title: String,
    pub description: String,
    pub link: Option<String>,
}

/// A hyperlink annotation reported by the document extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkAnnotation {
    pub url: String,
    /// Vertical document coordinate of the link, preserved from the
    /// extractor so annotations arrive in reading order.
    pub y: f64,
}

/// Parse extracted text (and optional link annotations) into step drafts.
///
/// One forward pass over the trimmed, non-empty lines: bullet and task
/// lines emit drafts; non-actionable headers and continuations attach to
/// the most recent draft, or buffer as pending context that the next draft
/// absorbs into its description; bare URL lines fill the most recent
/// draft's empty link. When the pass finds nothing, every plausibly-sized
/// line becomes a draft so the manager still has something to edit. Link
/// annotations are reconciled onto drafts afterwards by URL keywords.
pub fn parse_steps(text: &str, link_annotations: &[LinkAnnotation]) -> Vec<StepDraft> {
    let mut drafts: Vec<StepDraft> = Vec::new();
    let mut pending_context = String::new();

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        match classify(line) {
            LineClass::Bullet(body) | LineClass::Task(body) => {
                emit(body, &mut pending_context, &mut drafts);
            }
            LineClass::Header(body) => {
                // "Complete these forms:" is an instruction wearing a
                // header's clothes; a plain section header is context.
                if contains_task_verb(body) {
                    emit(body, &mut pending_context, &mut drafts);
                } else if let Some(last) = drafts.last_mut() {
                    append(&mut last.description, body);
                } else {
                    append(&mut pending_context, body);
                }
            }
            LineClass::Url(url) => {
                if let Some(last) = drafts.last_mut() {
                    if last.link.is_none() {
                        last.link = Some(url.to_string());
                    }
                }
            }
            LineClass::Continuation(body) => {
                if let Some(last) = drafts.last_mut() {
                    append(&mut last.description, body);
                } else {
                    append(&mut pending_context, body);
                }
            }
            LineClass::Skip => {}
        }
    }

    if drafts.is_empty() {
        drafts = fallback_drafts(text);
    }
    if !link_annotations.is_empty() {
        links::reconcile(&mut drafts, link_annotations);
    }
    drafts
}

/// Emit one draft: split the body into title/description on an em-dash or
/// double-hyphen separator, fold in any pending context, clear the buffer.
fn emit(body: &str, pending_context: &mut String, drafts: &mut Vec<StepDraft>) {
    let (title, separated) = split_title_description(body);
    let mut description = String::new();
    if !pending_context.is_empty() {
        description.push_str(pending_context);
        pending_context.clear();
    }
    if !separated.is_empty() {
        append(&mut description, separated);
    }
    drafts.push(StepDraft {
        title: title.to_string(),
        description,
        link: None,
    });
}

fn split_title_description(body: &str) -> (&str, &str) {
    for separator in ["—", "--"] {
        if let Some(at) = body.find(separator) {
            let title = body[..at].trim_end();
            let description = body[at + separator.len()..].trim_start();
            if !title.is_empty() {
                return (title, description);
            }
        }
    }
    (body, "")
}

fn append(target: &mut String, text: &str) {
    if !target.is_empty() {
        target.push(' ');
    }
    target.push_str(text);
}

/// Last resort: one draft per plausibly-sized line.
fn fallback_drafts(text: &str) -> Vec<StepDraft> {
    text.lines()
        .map(str::trim)
        .filter(|line| {
            let chars = line.chars().count();
            (8..=200).contains(&chars)
        })
        .map(|line| StepDraft {
            title: line.to_string(),
            description: String::new(),
            link: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(drafts: &[StepDraft]) -> Vec<&str> {
        drafts.iter().map(|d| d.title.as_str()).collect()
    }

    #[test]
    fn test_plain_bullets() {
        let drafts = parse_steps("- Setup laptop\n- Install IDE", &[]);
        assert_eq!(titles(&drafts), vec!["Setup laptop", "Install IDE"]);
        assert!(drafts.iter().all(|d| d.description.is_empty()));
        assert!(drafts.iter().all(|d| d.link.is_none()));
    }

    #[test]
    fn test_separator_splits_title_and_description() {
        let drafts = parse_steps("- Setup laptop — collect it from the IT desk", &[]);
        assert_eq!(drafts[0].title, "Setup laptop");
        assert_eq!(drafts[0].description, "collect it from the IT desk");

        let drafts = parse_steps("- Setup laptop -- collect it from the IT desk", &[]);
        assert_eq!(drafts[0].title, "Setup laptop");
        assert_eq!(drafts[0].description, "collect it from the IT desk");
    }

    #[test]
    fn test_pending_context_prepends_to_next_draft() {
        let text = "Before your first day\n- Order your badge";
        let drafts = parse_steps(text, &[]);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].title, "Order your badge");
        assert_eq!(drafts[0].description, "Before your first day");
    }

    #[test]
    fn test_actionable_header_emits_a_step() {
        let text = "Complete these forms today:\nOffice hours overview:\n- Order your badge";
        let drafts = parse_steps(text, &[]);
        // The first header contains a task verb, the second is context for
        // the draft it follows.
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].title, "Complete these forms today");
        assert_eq!(drafts[0].description, "Office hours overview");
        assert_eq!(drafts[1].title, "Order your badge");
    }

    #[test]
    fn test_continuation_extends_last_draft() {
        let text = "- Setup laptop\nask IT if the dock is missing";
        let drafts = parse_steps(text, &[]);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].description, "ask IT if the dock is missing");
    }

    #[test]
    fn test_bare_url_attaches_to_previous_draft_only_once() {
        let text = "- Setup laptop\nhttps://wiki.example.com/laptop\nhttps://other.example.com\n- Install IDE";
        let drafts = parse_steps(text, &[]);
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].link.as_deref(), Some("https://wiki.example.com/laptop"));
        // The second URL neither overwrites nor leaks to the next draft.
        assert!(drafts[1].link.is_none());
    }

    #[test]
    fn test_imperative_lines_without_markers_emit() {
        let text = "Install the IDE from the portal\nSchedule a meeting with your buddy";
        let drafts = parse_steps(text, &[]);
        assert_eq!(
            titles(&drafts),
            vec!["Install the IDE from the portal", "Schedule a meeting with your buddy"]
        );
    }

    #[test]
    fn test_fallback_emits_one_draft_per_sized_line() {
        // No bullets, no verbs, no headers: fall back to plausible lines.
        let text = "laptop and badge\nok\nsecurity briefing notes";
        let drafts = parse_steps(text, &[]);
        assert_eq!(titles(&drafts), vec!["laptop and badge", "security briefing notes"]);
        assert!(drafts.iter().all(|d| d.description.is_empty()));
    }

    #[test]
    fn test_annotation_links_reconcile_after_parsing() {
        let text = "- Complete security training\n- Order your badge";
        let annotation = LinkAnnotation {
            url: "https://example.com/security-training".to_string(),
            y: 42.0,
        };
        let drafts = parse_steps(text, &[annotation]);
        assert_eq!(
            drafts[0].link.as_deref(),
            Some("https://example.com/security-training")
        );
        assert!(drafts[1].link.is_none());
    }

    #[test]
    fn test_blank_and_noise_lines_are_ignored() {
        let text = "\n\n- Setup laptop\n\n   \n- Install IDE\n\n";
        let drafts = parse_steps(text, &[]);
        assert_eq!(drafts.len(), 2);
    }
}
