//! Axum route handlers for the Rework API.
//!
//! Sessions are not stored server-side: the client holds the session JSON and sends
//! it back with each bullet action.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::extractor::extract;
use crate::rework::session::{Progress, ReworkSession};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StartReworkRequest {
    pub extracted_text: String,
}

#[derive(Debug, Serialize)]
pub struct ReworkSessionResponse {
    pub rework_session: ReworkSession,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulletAction {
    Ask,
    Rewrite,
    Accept,
}

#[derive(Debug, Deserialize)]
pub struct BulletActionRequest {
    pub rework_session: ReworkSession,
    pub bullet_id: Uuid,
    pub action: BulletAction,
    pub user_explanation: Option<String>,
    /// Rewrite produced for `user_explanation` (rewrite) or the user's own edit (accept).
    pub revised_text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BulletActionResponse {
    pub rework_session: ReworkSession,
    pub progress: Option<Progress>,
    /// First bullet still awaiting acceptance; `None` once the session is complete.
    pub next_bullet_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub text: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/rework
///
/// Seeds a rework session from extracted resume text.
pub async fn handle_start_rework(
    State(state): State<AppState>,
    Json(request): Json<StartReworkRequest>,
) -> Result<Json<ReworkSessionResponse>, AppError> {
    let bullets = extract(&request.extracted_text, &state.rules);
    let rework_session = ReworkSession::seed(bullets)?;
    info!(
        "Seeded rework session {} with {} bullets",
        rework_session.id, rework_session.total_bullets
    );
    Ok(Json(ReworkSessionResponse { rework_session }))
}

/// POST /api/v1/rework/bullet
///
/// Applies one lifecycle step (`ask`, `rewrite`, `accept`) to a bullet.
pub async fn handle_bullet_action(
    Json(request): Json<BulletActionRequest>,
) -> Result<Json<BulletActionResponse>, AppError> {
    let mut session = request.rework_session;
    session.ensure_consistent()?;
    let bullet_id = request.bullet_id;

    let progress = match request.action {
        BulletAction::Ask => {
            session.begin_conversation(bullet_id)?;
            None
        }
        BulletAction::Rewrite => {
            let explanation = request.user_explanation.as_deref().unwrap_or_default();
            let revised = request.revised_text.as_deref().ok_or_else(|| {
                AppError::Validation("revised_text is required for rewrite".to_string())
            })?;
            session.record_revision(bullet_id, explanation, revised)?;
            None
        }
        BulletAction::Accept => {
            let progress = session.accept(bullet_id, request.revised_text.as_deref())?;
            info!(
                "Session {}: accepted bullet in '{}' ({}/{})",
                session.id,
                session.bullet(bullet_id)?.section_title,
                progress.completed,
                progress.total
            );
            Some(progress)
        }
    };

    let next_bullet_id = session.next_pending().map(|b| b.id);
    Ok(Json(BulletActionResponse {
        rework_session: session,
        progress,
        next_bullet_id,
    }))
}

/// POST /api/v1/rework/export
///
/// Renders a session as plain text grouped by section.
pub async fn handle_export(
    Json(session): Json<ReworkSession>,
) -> Result<Json<ExportResponse>, AppError> {
    session.ensure_consistent()?;
    Ok(Json(ExportResponse {
        text: session.to_plain_text(),
    }))
}
