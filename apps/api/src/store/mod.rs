//! Collaborator seams around the extraction engine.
//!
//! The engine never touches storage directly. It reads document text through
//! `TextSource`, looks up stored prompts through `PromptRepository` and hands
//! finished field values to a `FieldSink` bound to one document.
//!
//! `postgres` holds the sqlx implementations carried in `AppState`.

pub mod postgres;
#[cfg(test)]
pub mod testing;

use async_trait::async_trait;

use crate::classification::{Classification, ProfileType};
use crate::errors::AppError;
use crate::experience::ExperienceEstimate;
use crate::skills::SkillExtraction;

pub type ResumeId = i64;

/// Generic per-profile prompts are stored under this category.
pub const GENERIC_PROMPT_CATEGORY: &str = "other";

#[async_trait]
pub trait TextSource: Send + Sync {
    /// Normalized UTF-8 text for a resume; `None` for an unknown id.
    async fn document_text(&self, resume_id: ResumeId) -> Result<Option<String>, AppError>;
}

#[async_trait]
pub trait PromptRepository: Send + Sync {
    /// Stored skill prompt for `(profile_type, domain)`. `domain: None` asks for
    /// the generic prompt of the profile type.
    async fn lookup(
        &self,
        profile_type: ProfileType,
        domain: Option<&str>,
    ) -> Result<Option<String>, AppError>;
}

/// Receives each field once its value is final. `None` records the field as
/// explicitly undetermined.
#[async_trait]
pub trait FieldSink: Send + Sync {
    async fn record_experience(&self, estimate: Option<&ExperienceEstimate>) -> Result<(), AppError>;

    async fn record_classification(
        &self,
        classification: &Classification,
        category: Option<&str>,
    ) -> Result<(), AppError>;

    async fn record_skills(&self, skills: Option<&SkillExtraction>) -> Result<(), AppError>;
}

/// Sink for preview runs whose results are returned but never stored.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardSink;

#[async_trait]
impl FieldSink for DiscardSink {
    async fn record_experience(&self, _estimate: Option<&ExperienceEstimate>) -> Result<(), AppError> {
        Ok(())
    }

    async fn record_classification(
        &self,
        _classification: &Classification,
        _category: Option<&str>,
    ) -> Result<(), AppError> {
        Ok(())
    }

    async fn record_skills(&self, _skills: Option<&SkillExtraction>) -> Result<(), AppError> {
        Ok(())
    }
}
