//! Heuristic document-text-to-checklist parser.
//!
//! Turns raw text extracted from an onboarding document (plus optional
//! hyperlink annotations from the extractor) into an ordered list of step
//! drafts a manager can review before saving a template. Pure functions,
//! no I/O: extraction itself happens upstream.

mod classify;
mod links;
mod parse;

pub use parse::{parse_steps, LinkAnnotation, StepDraft};
