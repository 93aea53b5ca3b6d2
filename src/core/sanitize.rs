//! Text sanitizer for speech synthesis
//!
//! LLM replies arrive with markdown artifacts that read badly when spoken.
//! `clean` normalizes them into plain prose. The function is pure and
//! idempotent; the caller keeps the original reply for display and feeds
//! only the cleaned variant to synthesis.

use once_cell::sync::Lazy;
use regex::Regex;

/// Marker phrases that introduce trailing meta-commentary; everything from
/// the first marker onward is discarded before synthesis.
const DISCLAIMER_MARKERS: &[&str] = &["Please note", "Disclaimer"];

static MARKDOWN_GLYPHS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[*•#`_]").unwrap());
static NUMBERED_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\.\s*").unwrap());
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Normalize LLM-generated prose into a form safe for speech synthesis
pub fn clean(text: &str) -> String {
    let text = MARKDOWN_GLYPHS.replace_all(text, "");
    // One space after "1." so list items do not run together when spoken
    let text = NUMBERED_ITEM.replace_all(&text, "$1. ");
    // Colons become commas to induce a natural pause
    let text = text.replace(':', ",");
    let text = WHITESPACE_RUN.replace_all(&text, " ");

    let mut text = text.as_ref();
    for marker in DISCLAIMER_MARKERS {
        if let Some(index) = text.find(marker) {
            text = &text[..index];
        }
    }

    text.trim().to_string()
}
