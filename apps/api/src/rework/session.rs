//! Rework session — the mutable downstream copy of an extraction result.
//!
//! The extractor's `Bullet` list is never modified; seeding copies each bullet into a
//! `ReworkBullet` that moves through `pending` → `in_conversation` → `accepted`.
//! The session completes once every bullet is accepted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::extractor::Bullet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulletStatus {
    Pending,
    InConversation,
    Accepted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReworkBullet {
    pub id: Uuid,
    pub section_title: String,
    pub original_text: String,
    pub user_explanation: Option<String>,
    pub revised_text: Option<String>,
    pub order: usize,
    pub status: BulletStatus,
}

impl ReworkBullet {
    /// Revised text when present and non-empty, otherwise the original.
    pub fn final_text(&self) -> &str {
        self.revised_text
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(&self.original_text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    pub session_completed: bool,
}

/// Bullets sharing a section title, in `order`.
#[derive(Debug)]
pub struct SectionGroup<'a> {
    pub title: &'a str,
    pub bullets: Vec<&'a ReworkBullet>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReworkSession {
    pub id: Uuid,
    pub status: SessionStatus,
    pub total_bullets: usize,
    /// Number of accepted bullets; the index of the next bullet to work on.
    pub current_bullet_index: usize,
    pub created_at: DateTime<Utc>,
    pub bullets: Vec<ReworkBullet>,
}

impl ReworkSession {
    /// Seeds a session from extractor output. Zero bullets means there is nothing
    /// to rework and is reported to the caller.
    pub fn seed(bullets: Vec<Bullet>) -> Result<Self, AppError> {
        if bullets.is_empty() {
            return Err(AppError::Validation(
                "No bullet points found in resume to rework.".to_string(),
            ));
        }

        let mut bullets: Vec<ReworkBullet> = bullets
            .into_iter()
            .map(|b| ReworkBullet {
                id: Uuid::new_v4(),
                section_title: b.section_title,
                original_text: b.text,
                user_explanation: None,
                revised_text: None,
                order: b.order,
                status: BulletStatus::Pending,
            })
            .collect();
        bullets.sort_by_key(|b| b.order);

        Ok(ReworkSession {
            id: Uuid::new_v4(),
            status: SessionStatus::InProgress,
            total_bullets: bullets.len(),
            current_bullet_index: 0,
            created_at: Utc::now(),
            bullets,
        })
    }

    /// Rejects a client-supplied session whose bookkeeping disagrees with its bullets.
    pub fn ensure_consistent(&self) -> Result<(), AppError> {
        if self.bullets.is_empty() {
            return Err(AppError::Validation(
                "Rework session has no bullets".to_string(),
            ));
        }
        if self.total_bullets != self.bullets.len() {
            return Err(AppError::Validation(format!(
                "Rework session total_bullets is {} but it holds {} bullets",
                self.total_bullets,
                self.bullets.len()
            )));
        }
        Ok(())
    }

    pub fn bullet(&self, bullet_id: Uuid) -> Result<&ReworkBullet, AppError> {
        self.bullets
            .iter()
            .find(|b| b.id == bullet_id)
            .ok_or_else(|| AppError::NotFound(format!("Bullet {bullet_id} not found")))
    }

    fn bullet_mut(&mut self, bullet_id: Uuid) -> Result<&mut ReworkBullet, AppError> {
        self.bullets
            .iter_mut()
            .find(|b| b.id == bullet_id)
            .ok_or_else(|| AppError::NotFound(format!("Bullet {bullet_id} not found")))
    }

    /// First bullet not yet accepted, in order.
    pub fn next_pending(&self) -> Option<&ReworkBullet> {
        self.bullets
            .iter()
            .find(|b| b.status != BulletStatus::Accepted)
    }

    /// Opens the conversation on a bullet. Accepted bullets stay accepted.
    pub fn begin_conversation(&mut self, bullet_id: Uuid) -> Result<&ReworkBullet, AppError> {
        let bullet = self.bullet_mut(bullet_id)?;
        if bullet.status == BulletStatus::Accepted {
            return Err(AppError::Validation(format!(
                "Bullet {bullet_id} has already been accepted"
            )));
        }
        bullet.status = BulletStatus::InConversation;
        Ok(bullet)
    }

    /// Stores the user's explanation and the rewrite produced from it.
    pub fn record_revision(
        &mut self,
        bullet_id: Uuid,
        user_explanation: &str,
        revised_text: &str,
    ) -> Result<&ReworkBullet, AppError> {
        let user_explanation = user_explanation.trim();
        if user_explanation.is_empty() {
            return Err(AppError::Validation(
                "Please provide your explanation".to_string(),
            ));
        }

        let bullet = self.bullet_mut(bullet_id)?;
        bullet.user_explanation = Some(user_explanation.to_string());
        bullet.revised_text = Some(revised_text.trim().to_string());
        Ok(bullet)
    }

    /// Accepts a bullet, optionally replacing its revised text with a user edit,
    /// and recomputes session progress.
    pub fn accept(
        &mut self,
        bullet_id: Uuid,
        edited_text: Option<&str>,
    ) -> Result<Progress, AppError> {
        let bullet = self.bullet_mut(bullet_id)?;
        bullet.status = BulletStatus::Accepted;
        if let Some(edited) = edited_text.map(str::trim).filter(|t| !t.is_empty()) {
            bullet.revised_text = Some(edited.to_string());
        }

        let completed = self
            .bullets
            .iter()
            .filter(|b| b.status == BulletStatus::Accepted)
            .count();
        self.current_bullet_index = completed;
        self.total_bullets = self.bullets.len();

        let session_completed = completed == self.total_bullets;
        if session_completed {
            self.status = SessionStatus::Completed;
        }

        Ok(Progress {
            completed,
            total: self.total_bullets,
            session_completed,
        })
    }

    /// Groups bullets by section title in first-appearance order.
    pub fn sections(&self) -> Vec<SectionGroup<'_>> {
        let mut ordered: Vec<&ReworkBullet> = self.bullets.iter().collect();
        ordered.sort_by_key(|b| b.order);

        let mut groups: Vec<SectionGroup<'_>> = Vec::new();
        for bullet in ordered {
            match groups
                .iter_mut()
                .find(|g| g.title == bullet.section_title)
            {
                Some(group) => group.bullets.push(bullet),
                None => groups.push(SectionGroup {
                    title: &bullet.section_title,
                    bullets: vec![bullet],
                }),
            }
        }
        groups
    }

    /// Plain-text export: section title, then one `  - text` line per bullet;
    /// sections separated by a blank line.
    pub fn to_plain_text(&self) -> String {
        self.sections()
            .iter()
            .map(|group| {
                let lines: Vec<String> = group
                    .bullets
                    .iter()
                    .map(|b| format!("  - {}", b.final_text()))
                    .collect();
                format!("{}\n{}", group.title, lines.join("\n"))
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
