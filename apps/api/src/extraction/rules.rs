//! Extraction rules — the classifier tables behind bullet extraction.
//!
//! Section-header families, bullet glyphs, and action verbs are data, not branches.
//! The built-in tables can be overridden from a JSON file (`EXTRACTION_RULES_PATH`);
//! every field is optional and missing fields keep their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Section label active before any header line has been seen.
pub const DEFAULT_SECTION: &str = "General";

/// Raw lines shorter than this are names, dates, or contact fragments.
pub const MIN_LINE_CHARS: usize = 15;

/// Cleaned bullet text must be strictly longer than this. Overrides may raise it,
/// never lower it.
pub const MIN_BULLET_CHARS: usize = 10;

const BYTE_ORDER_MARK: char = '\u{feff}';

const SECTION_FAMILIES: &[(&str, &[&str])] = &[
    ("education", &["education", "academic"]),
    (
        "experience",
        &["experience", "work", "professional", "employment"],
    ),
    (
        "leadership",
        &["leadership", "extracurricular", "activities", "volunteer"],
    ),
    (
        "skills",
        &[
            "skills",
            "interests",
            "technical",
            "languages",
            "certifications",
        ],
    ),
    ("projects", &["projects", "research"]),
    ("awards", &["awards", "honors", "achievements"]),
];

const BULLET_GLYPHS: &[char] = &['•', '·', '▪', '▸', '-', '–', '—', '*'];

const HEADER_TRAILING: &[char] = &[':', '-', '–', '—'];

const ACTION_VERBS: &[&str] = &[
    "Led",
    "Managed",
    "Developed",
    "Created",
    "Analyzed",
    "Built",
    "Designed",
    "Implemented",
    "Launched",
    "Drove",
    "Conducted",
    "Collaborated",
    "Spearheaded",
    "Orchestrated",
    "Optimized",
    "Streamlined",
    "Established",
    "Generated",
    "Delivered",
    "Executed",
    "Facilitated",
    "Coordinated",
    "Mentored",
    "Trained",
    "Negotiated",
    "Achieved",
    "Increased",
    "Decreased",
    "Reduced",
    "Improved",
    "Raised",
    "Grew",
    "Expanded",
    "Authored",
    "Published",
    "Presented",
    "Researched",
    "Assessed",
    "Evaluated",
];

#[derive(Debug, Error)]
pub enum RulesError {
    #[error("Failed to read rules file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid rules JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid extraction rules: {0}")]
    Invalid(String),
}

/// A named group of header prefixes, e.g. `experience` → `work`, `employment`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionFamily {
    pub name: String,
    pub prefixes: Vec<String>,
}

/// The full classifier table used by the extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractionRules {
    pub default_section: String,
    pub section_families: Vec<SectionFamily>,
    pub bullet_glyphs: Vec<char>,
    /// Punctuation stripped from the end of a header line to form its label.
    pub header_trailing: Vec<char>,
    pub action_verbs: Vec<String>,
    pub min_line_chars: usize,
    pub min_bullet_chars: usize,
}

impl Default for ExtractionRules {
    fn default() -> Self {
        Self {
            default_section: DEFAULT_SECTION.to_string(),
            section_families: SECTION_FAMILIES
                .iter()
                .map(|(name, prefixes)| SectionFamily {
                    name: name.to_string(),
                    prefixes: prefixes.iter().map(|p| p.to_string()).collect(),
                })
                .collect(),
            bullet_glyphs: BULLET_GLYPHS.to_vec(),
            header_trailing: HEADER_TRAILING.to_vec(),
            action_verbs: ACTION_VERBS.iter().map(|v| v.to_string()).collect(),
            min_line_chars: MIN_LINE_CHARS,
            min_bullet_chars: MIN_BULLET_CHARS,
        }
    }
}

impl ExtractionRules {
    /// Parses and validates a JSON rules document.
    pub fn from_json_str(json: &str) -> Result<Self, RulesError> {
        let rules: Self = serde_json::from_str(json)?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RulesError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| RulesError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Checks the invariants the extractor relies on: a non-empty default label,
    /// and prefixes/verbs that can never match an arbitrary line.
    pub fn validate(&self) -> Result<(), RulesError> {
        if self.default_section.trim().is_empty() {
            return Err(RulesError::Invalid(
                "default_section cannot be empty".to_string(),
            ));
        }

        for family in &self.section_families {
            if let Some(bad) = family.prefixes.iter().find(|p| !has_alphanumeric(p)) {
                return Err(RulesError::Invalid(format!(
                    "section family '{}' has prefix '{}' with no alphanumeric character",
                    family.name, bad
                )));
            }
        }

        if let Some(bad) = self.action_verbs.iter().find(|v| !has_alphanumeric(v)) {
            return Err(RulesError::Invalid(format!(
                "action verb '{bad}' has no alphanumeric character"
            )));
        }

        if self.min_bullet_chars < MIN_BULLET_CHARS {
            return Err(RulesError::Invalid(format!(
                "min_bullet_chars cannot be below {MIN_BULLET_CHARS}, got {}",
                self.min_bullet_chars
            )));
        }

        // Stripping an alphanumeric could empty a header label.
        if let Some(bad) = self.header_trailing.iter().find(|c| c.is_alphanumeric()) {
            return Err(RulesError::Invalid(format!(
                "header_trailing cannot contain alphanumeric character '{bad}'"
            )));
        }

        Ok(())
    }

    /// Returns the section family whose prefix starts `line`, if any.
    pub fn section_family(&self, line: &str) -> Option<&SectionFamily> {
        self.section_families.iter().find(|family| {
            family
                .prefixes
                .iter()
                .any(|prefix| starts_with_ignore_case(line, prefix))
        })
    }

    pub fn is_section_header(&self, line: &str) -> bool {
        self.section_family(line).is_some()
    }

    /// Header line → section label: trailing colon/dash punctuation and whitespace removed.
    pub fn clean_header<'a>(&self, line: &'a str) -> &'a str {
        trim_line(
            line.trim_end_matches(|c: char| {
                is_blank(c) || self.header_trailing.contains(&c)
            }),
        )
    }

    pub fn starts_with_glyph(&self, line: &str) -> bool {
        line.chars()
            .next()
            .is_some_and(|c| self.bullet_glyphs.contains(&c))
    }

    /// Literal, case-insensitive prefix match. `Ledger ...` counts as `Led`.
    pub fn starts_with_action_verb(&self, line: &str) -> bool {
        self.action_verbs
            .iter()
            .any(|verb| starts_with_ignore_case(line, verb))
    }

    /// Removes a single leading glyph (if present) and surrounding whitespace.
    pub fn strip_glyph<'a>(&self, line: &'a str) -> &'a str {
        let mut chars = line.chars();
        match chars.next() {
            Some(c) if self.bullet_glyphs.contains(&c) => trim_line(chars.as_str()),
            _ => trim_line(line),
        }
    }
}

/// `str::trim` that also drops U+FEFF byte-order marks.
pub fn trim_line(line: &str) -> &str {
    line.trim_matches(is_blank)
}

fn is_blank(c: char) -> bool {
    c.is_whitespace() || c == BYTE_ORDER_MARK
}

fn has_alphanumeric(s: &str) -> bool {
    s.chars().any(char::is_alphanumeric)
}

fn starts_with_ignore_case(line: &str, prefix: &str) -> bool {
    let mut chars = line.chars();
    prefix.chars().all(|p| {
        chars
            .next()
            .is_some_and(|c| c == p || c.to_lowercase().eq(p.to_lowercase()))
    })
}
