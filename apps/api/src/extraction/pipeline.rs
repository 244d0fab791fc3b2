use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::classification::{Classification, ProfileClassifier};
use crate::errors::AppError;
use crate::experience::{ExperienceEstimate, ExperienceResolver};
use crate::llm_client::{BackendClient, BackendTimeouts};
use crate::skills::{SkillExtraction, SkillResolver};
use crate::store::{FieldSink, PromptRepository, ResumeId};

/// Everything derived from one document in one run.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionReport {
    pub run_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_id: Option<ResumeId>,
    pub experience: Option<ExperienceEstimate>,
    pub classification: Classification,
    pub category: Option<String>,
    pub skills: Option<SkillExtraction>,
    /// Set when skill extraction failed outright (backend unreachable or timed out).
    pub skills_error: Option<String>,
    pub extracted_at: DateTime<Utc>,
}

/// Runs every resolver over one document.
///
/// Experience runs concurrently with the classification → skills chain.
/// Classification is recorded before skill resolution starts, and each field
/// reaches the sink only once its value is final, so dropping the future
/// mid-run never leaves a half-written field.
#[derive(Clone)]
pub struct DocumentExtractor {
    experience: ExperienceResolver,
    classifier: ProfileClassifier,
    skills: SkillResolver,
}

impl DocumentExtractor {
    pub fn new(timeouts: &BackendTimeouts) -> Self {
        let classifier = ProfileClassifier::new(timeouts.classification);
        Self {
            experience: ExperienceResolver::new(timeouts.experience),
            skills: SkillResolver::new(classifier.clone(), timeouts.generation),
            classifier,
        }
    }

    pub async fn extract(
        &self,
        resume_id: Option<ResumeId>,
        text: &str,
        backend: &dyn BackendClient,
        prompts: &dyn PromptRepository,
        sink: &dyn FieldSink,
    ) -> Result<ExtractionReport, AppError> {
        let run_id = Uuid::new_v4();
        info!(%run_id, ?resume_id, text_len = text.len(), "Extraction started");

        let experience_branch = async {
            let estimate = self.experience.resolve(text, backend).await;
            sink.record_experience(estimate.as_ref()).await?;
            Ok::<_, AppError>(estimate)
        };

        let routing_branch = async {
            let mut classification = self.classifier.classify(text, backend).await;
            let category = self
                .classifier
                .classify_category(text, classification.profile_type, backend)
                .await;
            if classification.domain.is_none() {
                classification.domain = category.clone();
            }
            sink.record_classification(&classification, category.as_deref())
                .await?;

            let (skills, skills_error) = match self
                .skills
                .resolve(text, Some(&classification), prompts, backend)
                .await
            {
                Ok(extraction) => (Some(extraction), None),
                Err(e) => {
                    warn!(%run_id, error = %e, "Skill extraction failed");
                    (None, Some(e.to_string()))
                }
            };
            sink.record_skills(skills.as_ref()).await?;

            Ok::<_, AppError>((classification, category, skills, skills_error))
        };

        let (experience, routing) = tokio::join!(experience_branch, routing_branch);
        let experience = experience?;
        let (classification, category, skills, skills_error) = routing?;

        info!(
            %run_id,
            experience = experience.as_ref().map(|e| e.value_text.as_str()),
            profile_type = ?classification.profile_type,
            skills = skills.as_ref().map(|s| s.skills.len()),
            "Extraction finished"
        );

        Ok(ExtractionReport {
            run_id,
            resume_id,
            experience,
            classification,
            category,
            skills,
            skills_error,
            extracted_at: Utc::now(),
        })
    }
}
