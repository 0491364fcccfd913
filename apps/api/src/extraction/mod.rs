// Resume text → structured bullets.
// Implements: classifier rules, the single-pass extractor, the PDF text source.
// The extractor is pure; only the PDF source and handlers touch I/O.

pub mod extractor;
pub mod handlers;
pub mod pdf;
pub mod rules;
