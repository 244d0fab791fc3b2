use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, info};

use super::{FieldSink, PromptRepository, ResumeId, TextSource, GENERIC_PROMPT_CATEGORY};
use crate::classification::{Classification, ProfileType};
use crate::errors::AppError;
use crate::experience::ExperienceEstimate;
use crate::models::resume::{ResumeTextRow, StoredPromptRow};
use crate::skills::SkillExtraction;

/// Source tag written when no experience tier produced a value.
const UNKNOWN_EXPERIENCE_SOURCE: &str = "unknown";

/// Reads resume text and stored prompts from Postgres.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Field sink that writes into the `resume_metadata` row of one resume.
    pub fn sink_for(&self, resume_id: ResumeId) -> PgFieldSink {
        PgFieldSink {
            pool: self.pool.clone(),
            resume_id,
        }
    }
}

#[async_trait]
impl TextSource for PgStore {
    async fn document_text(&self, resume_id: ResumeId) -> Result<Option<String>, AppError> {
        let row: Option<ResumeTextRow> =
            sqlx::query_as("SELECT resume_text FROM resume_metadata WHERE id = $1")
                .bind(resume_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.and_then(|r| r.resume_text))
    }
}

#[async_trait]
impl PromptRepository for PgStore {
    async fn lookup(
        &self,
        profile_type: ProfileType,
        domain: Option<&str>,
    ) -> Result<Option<String>, AppError> {
        let (mastercategory, category) = prompt_key(profile_type, domain);
        let row: Option<StoredPromptRow> = sqlx::query_as(
            "SELECT prompt FROM prompts WHERE mastercategory = $1 AND category = $2 LIMIT 1",
        )
        .bind(mastercategory)
        .bind(category)
        .fetch_optional(&self.pool)
        .await?;

        debug!(
            mastercategory,
            category,
            found = row.as_ref().is_some_and(|r| r.prompt.is_some()),
            "Prompt lookup"
        );
        Ok(row.and_then(|r| r.prompt))
    }
}

/// Writes final field values for a single resume.
pub struct PgFieldSink {
    pool: PgPool,
    resume_id: ResumeId,
}

#[async_trait]
impl FieldSink for PgFieldSink {
    async fn record_experience(&self, estimate: Option<&ExperienceEstimate>) -> Result<(), AppError> {
        let (value, source) = experience_columns(estimate);
        sqlx::query("UPDATE resume_metadata SET experience = $1, experience_source = $2 WHERE id = $3")
            .bind(value)
            .bind(source)
            .bind(self.resume_id)
            .execute(&self.pool)
            .await?;

        info!(resume_id = self.resume_id, source, "Experience stored");
        Ok(())
    }

    async fn record_classification(
        &self,
        classification: &Classification,
        category: Option<&str>,
    ) -> Result<(), AppError> {
        let (mastercategory, category) = classification_columns(classification, category);
        sqlx::query("UPDATE resume_metadata SET mastercategory = $1, category = $2 WHERE id = $3")
            .bind(mastercategory)
            .bind(category)
            .bind(self.resume_id)
            .execute(&self.pool)
            .await?;

        info!(
            resume_id = self.resume_id,
            mastercategory,
            category,
            "Classification stored"
        );
        Ok(())
    }

    async fn record_skills(&self, skills: Option<&SkillExtraction>) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE resume_metadata SET skillset = $1, skills_prompt_source = $2 WHERE id = $3",
        )
        .bind(skills.map(skillset_value))
        .bind(skills.map(|s| s.prompt_source.as_str()))
        .bind(self.resume_id)
        .execute(&self.pool)
        .await?;

        info!(
            resume_id = self.resume_id,
            count = skills.map(|s| s.skills.len()),
            "Skills stored"
        );
        Ok(())
    }
}

/// `(mastercategory, category)` for a prompt lookup.
fn prompt_key(profile_type: ProfileType, domain: Option<&str>) -> (&'static str, &str) {
    (
        profile_type.master_category(),
        domain.unwrap_or(GENERIC_PROMPT_CATEGORY),
    )
}

/// `(mastercategory, category)` for `resume_metadata`. The category falls back
/// to the classifier's domain.
fn classification_columns<'a>(
    classification: &'a Classification,
    category: Option<&'a str>,
) -> (&'static str, Option<&'a str>) {
    (
        classification.profile_type.persisted_label(),
        category.or(classification.domain.as_deref()),
    )
}

fn experience_columns(estimate: Option<&ExperienceEstimate>) -> (Option<&str>, &'static str) {
    match estimate {
        Some(e) => (Some(e.value_text.as_str()), e.source_tier.as_str()),
        None => (None, UNKNOWN_EXPERIENCE_SOURCE),
    }
}

fn skillset_value(skills: &SkillExtraction) -> String {
    skills.skills.join(", ")
}
