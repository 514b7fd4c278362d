//! Reconciling extractor link annotations onto drafts.
//!
//! Each annotation URL is reduced to keyword tokens (host and path
//! segments); every still-linkless draft is scored by how many tokens its
//! title + description contain, and the best positive score wins the link.
//! Annotations nothing matched are then handed out, in their original
//! order, to the remaining linkless drafts one-for-one.

use crate::parse::{LinkAnnotation, StepDraft};

/// Tokens too generic to identify a draft.
const STOPLIST: &[&str] = &[
    "www", "com", "org", "net", "http", "https", "html", "htm", "php", "aspx", "index",
    "page", "pages", "docs", "doc", "wiki", "site", "home", "main", "view", "edu", "gov",
    "info",
];

pub(crate) fn reconcile(drafts: &mut [StepDraft], annotations: &[LinkAnnotation]) {
    let mut unmatched: Vec<&LinkAnnotation> = Vec::new();

    for annotation in annotations {
        let tokens = url_keywords(&annotation.url);
        let mut best: Option<(usize, usize)> = None;
        for (index, draft) in drafts.iter().enumerate() {
            if draft.link.is_some() {
                continue;
            }
            let haystack = format!("{} {}", draft.title, draft.description).to_lowercase();
            let score = tokens
                .iter()
                .filter(|token| haystack.contains(token.as_str()))
                .count();
            if score > 0 && best.is_none_or(|(top, _)| score > top) {
                best = Some((score, index));
            }
        }
        match best {
            Some((_, index)) => drafts[index].link = Some(annotation.url.clone()),
            None => unmatched.push(annotation),
        }
    }

    // Leftovers go one-for-one to whichever drafts still lack a link.
    let mut leftovers = unmatched.into_iter();
    for draft in drafts.iter_mut().filter(|d| d.link.is_none()) {
        match leftovers.next() {
            Some(annotation) => draft.link = Some(annotation.url.clone()),
            None => break,
        }
    }
}

/// Lowercase keyword tokens from a URL's host and path.
fn url_keywords(url: &str) -> Vec<String> {
    let stripped = url
        .trim()
        .strip_prefix("https://")
        .or_else(|| url.trim().strip_prefix("http://"))
        .unwrap_or_else(|| url.trim());
    let without_query = stripped
        .split_once(['?', '#'])
        .map_or(stripped, |(path, _)| path);

    without_query
        .split('/')
        .flat_map(|segment| segment.split(['-', '_', '.']))
        .map(str::to_lowercase)
        .filter(|token| token.chars().count() >= 3 && !STOPLIST.contains(&token.as_str()))
        .collect()
}
