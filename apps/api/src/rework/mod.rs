// Rework sessions seeded from extracted bullets.
// Rewrites themselves come from an external collaborator; this module only tracks
// per-bullet state, progress, and export.

pub mod handlers;
pub mod session;
