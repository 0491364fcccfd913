//! Bullet extractor — raw resume text to ordered, section-tagged bullets.
//!
//! # Scan
//! A single left-to-right fold over the trimmed, non-empty lines. The accumulator
//! (`ScanState`) carries the current section label and the next order value; it is
//! owned by one call and dropped when the call returns.
//!
//! # Classification order
//! 1. Section header (prefix match) — updates the label, never emitted.
//! 2. Raw line shorter than `min_line_chars` — noise.
//! 3. Neither glyph- nor verb-led — prose.
//! 4. Cleaned text not longer than `min_bullet_chars` — fragment.
//! 5. Otherwise a bullet.
//!
//! Header detection runs first, so "Leadership experience managing..." is a header
//! even though it would also pass the verb test.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::extraction::rules::{trim_line, ExtractionRules};

/// One accomplishment statement recovered from the document.
///
/// `order` is zero-based and contiguous across the whole document (not per section).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bullet {
    pub section_title: String,
    pub text: String,
    pub order: usize,
}

/// Outcome of classifying a single trimmed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass<'a> {
    /// Section header, carrying its cleaned label.
    Header(&'a str),
    /// Too short to be content: names, dates, page numbers.
    Noise,
    /// Long enough, but not glyph- or verb-led.
    Prose,
    /// Bullet-like, but the cleaned text is too short.
    Fragment,
    /// Emittable bullet, carrying its cleaned text.
    Bullet(&'a str),
}

/// Classifies one already-trimmed line against the rules.
pub fn classify_line<'a>(line: &'a str, rules: &ExtractionRules) -> LineClass<'a> {
    if rules.is_section_header(line) {
        return LineClass::Header(rules.clean_header(line));
    }

    if line.chars().count() < rules.min_line_chars {
        return LineClass::Noise;
    }

    if !rules.starts_with_glyph(line) && !rules.starts_with_action_verb(line) {
        return LineClass::Prose;
    }

    let cleaned = rules.strip_glyph(line);
    if cleaned.chars().count() > rules.min_bullet_chars {
        LineClass::Bullet(cleaned)
    } else {
        LineClass::Fragment
    }
}

struct ScanState {
    section: String,
    next_order: usize,
    bullets: Vec<Bullet>,
    lines_scanned: usize,
    headers_seen: usize,
}

impl ScanState {
    fn new(default_section: &str) -> Self {
        Self {
            section: default_section.to_string(),
            next_order: 0,
            bullets: Vec::new(),
            lines_scanned: 0,
            headers_seen: 0,
        }
    }

    fn step(mut self, class: LineClass<'_>) -> Self {
        self.lines_scanned += 1;
        match class {
            LineClass::Header(label) => {
                self.section = label.to_string();
                self.headers_seen += 1;
            }
            LineClass::Bullet(text) => {
                self.bullets.push(Bullet {
                    section_title: self.section.clone(),
                    text: text.to_string(),
                    order: self.next_order,
                });
                self.next_order += 1;
            }
            LineClass::Noise | LineClass::Prose | LineClass::Fragment => {}
        }
        self
    }
}

/// Extracts the ordered bullet list from raw document text.
///
/// Total over every input: empty or all-noise text yields an empty list. Callers
/// decide whether zero bullets is an error.
pub fn extract(raw_text: &str, rules: &ExtractionRules) -> Vec<Bullet> {
    let state = raw_text
        .lines()
        .map(trim_line)
        .filter(|line| !line.is_empty())
        .map(|line| classify_line(line, rules))
        .fold(ScanState::new(&rules.default_section), ScanState::step);

    debug!(
        lines_scanned = state.lines_scanned,
        headers_seen = state.headers_seen,
        bullets = state.bullets.len(),
        "Extracted bullets"
    );

    state.bullets
}
