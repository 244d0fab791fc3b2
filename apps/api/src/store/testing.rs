//! In-memory collaborators for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{FieldSink, PromptRepository, ResumeId, TextSource};
use crate::classification::{Classification, ProfileType};
use crate::errors::AppError;
use crate::experience::ExperienceEstimate;
use crate::skills::SkillExtraction;

/// Prompt repository backed by a map. Records every lookup key.
#[derive(Default)]
pub struct InMemoryPrompts {
    prompts: HashMap<(ProfileType, Option<String>), String>,
    lookups: Mutex<Vec<(ProfileType, Option<String>)>>,
    failing: bool,
}

impl InMemoryPrompts {
    pub fn with(mut self, profile_type: ProfileType, domain: Option<&str>, prompt: &str) -> Self {
        self.prompts
            .insert((profile_type, domain.map(str::to_string)), prompt.to_string());
        self
    }

    /// Every lookup fails as if the database were down.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn lookups(&self) -> Vec<(ProfileType, Option<String>)> {
        self.lookups.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PromptRepository for InMemoryPrompts {
    async fn lookup(
        &self,
        profile_type: ProfileType,
        domain: Option<&str>,
    ) -> Result<Option<String>, AppError> {
        let key = (profile_type, domain.map(str::to_string));
        if let Ok(mut lookups) = self.lookups.lock() {
            lookups.push(key.clone());
        }
        if self.failing {
            return Err(AppError::Internal(anyhow::anyhow!("prompt store offline")));
        }
        Ok(self.prompts.get(&key).cloned())
    }
}

/// Text source backed by a map.
#[derive(Default)]
pub struct InMemoryTexts(pub HashMap<ResumeId, String>);

#[async_trait]
impl TextSource for InMemoryTexts {
    async fn document_text(&self, resume_id: ResumeId) -> Result<Option<String>, AppError> {
        Ok(self.0.get(&resume_id).cloned())
    }
}

/// One recorded sink call, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Experience(Option<ExperienceEstimate>),
    Classification(Classification, Option<String>),
    Skills(Option<SkillExtraction>),
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SinkEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    fn push(&self, event: SinkEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

#[async_trait]
impl FieldSink for RecordingSink {
    async fn record_experience(&self, estimate: Option<&ExperienceEstimate>) -> Result<(), AppError> {
        self.push(SinkEvent::Experience(estimate.cloned()));
        Ok(())
    }

    async fn record_classification(
        &self,
        classification: &Classification,
        category: Option<&str>,
    ) -> Result<(), AppError> {
        self.push(SinkEvent::Classification(
            classification.clone(),
            category.map(str::to_string),
        ));
        Ok(())
    }

    async fn record_skills(&self, skills: Option<&SkillExtraction>) -> Result<(), AppError> {
        self.push(SinkEvent::Skills(skills.cloned()));
        Ok(())
    }
}
