//! Skill resolution: routed prompt selection, one backend call, cleanup.
//!
//! Prompt priority:
//! 1. stored prompt for `(profile type, domain)`
//! 2. stored generic prompt for the profile type
//! 3. built-in prompt for the profile type (non-technical one mentions the domain)
//!
//! This is the one chain that can fail outright: if the backend cannot be
//! reached or times out there is nothing cheaper to fall back to. A readable
//! but useless answer still resolves to an empty list.

pub mod handlers;
pub mod prompts;
pub mod validation;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::classification::{Classification, ProfileClassifier, ProfileType};
use crate::errors::ExtractionError;
use crate::llm_client::prompts::with_resume;
use crate::llm_client::response::{extract_balanced, parse_json_object, strip_json_fences};
use crate::llm_client::{BackendClient, GenerateRequest};
use crate::skills::prompts::{
    NON_TECHNICAL_SKILLS_PROMPT_TEMPLATE, SKILLS_OUTPUT_INSTRUCTION, TECHNICAL_SKILLS_PROMPT,
};
use crate::skills::validation::normalize_skills;
use crate::store::PromptRepository;
use crate::text::{char_prefix, SKILLS_WINDOW};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptSource {
    RepositoryDomain,
    RepositoryProfile,
    BuiltIn,
}

impl PromptSource {
    pub fn as_str(self) -> &'static str {
        match self {
            PromptSource::RepositoryDomain => "repository_domain",
            PromptSource::RepositoryProfile => "repository_profile",
            PromptSource::BuiltIn => "built_in",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedPrompt {
    pub text: String,
    pub source: PromptSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillExtraction {
    pub skills: Vec<String>,
    pub prompt_source: PromptSource,
}

#[derive(Debug, Deserialize)]
struct SkillsPayload {
    skills: Value,
}

#[derive(Debug, Clone)]
pub struct SkillResolver {
    classifier: ProfileClassifier,
    timeout: Duration,
}

impl SkillResolver {
    pub fn new(classifier: ProfileClassifier, timeout: Duration) -> Self {
        Self { classifier, timeout }
    }

    /// Extracts the skill list for `text`. A missing `classification` is
    /// re-derived with a fresh classifier call before routing.
    pub async fn resolve(
        &self,
        text: &str,
        classification: Option<&Classification>,
        prompts: &dyn PromptRepository,
        backend: &dyn BackendClient,
    ) -> Result<SkillExtraction, ExtractionError> {
        let derived;
        let classification = match classification {
            Some(c) => c,
            None => {
                derived = self.classifier.classify(text, backend).await;
                &derived
            }
        };

        let selected = self.select_prompt(classification, prompts).await;
        info!(prompt_source = selected.source.as_str(), "Skill prompt selected");

        let status = backend.probe().await;
        let model = status.usable_model().ok_or_else(|| {
            ExtractionError::BackendUnreachable("probe reported no usable model".to_string())
        })?;

        let instruction = format!("{}\n\n{SKILLS_OUTPUT_INSTRUCTION}", selected.text);
        let prompt = with_resume(&instruction, char_prefix(text, SKILLS_WINDOW));
        let request = GenerateRequest::new(prompt, model, self.timeout);

        let raw = match backend.generate(&request).await.map_err(ExtractionError::from) {
            Ok(raw) => raw,
            Err(ExtractionError::MalformedResponse(reason)) => {
                warn!(%reason, "Skill response unreadable, returning empty list");
                return Ok(SkillExtraction {
                    skills: Vec::new(),
                    prompt_source: selected.source,
                });
            }
            Err(e) => return Err(e),
        };

        let skills = normalize_skills(&parse_skill_payload(&raw));
        info!(count = skills.len(), "Skills extracted");
        Ok(SkillExtraction {
            skills,
            prompt_source: selected.source,
        })
    }

    pub async fn select_prompt(
        &self,
        classification: &Classification,
        prompts: &dyn PromptRepository,
    ) -> SelectedPrompt {
        let profile_type = classification.profile_type;
        let domain = classification.domain.as_deref();

        if let Some(domain) = domain {
            if let Some(text) = stored_prompt(prompts, profile_type, Some(domain)).await {
                return SelectedPrompt {
                    text,
                    source: PromptSource::RepositoryDomain,
                };
            }
        }
        if let Some(text) = stored_prompt(prompts, profile_type, None).await {
            return SelectedPrompt {
                text,
                source: PromptSource::RepositoryProfile,
            };
        }
        SelectedPrompt {
            text: built_in_prompt(profile_type, domain),
            source: PromptSource::BuiltIn,
        }
    }
}

/// Repository errors and blank prompts both count as "unavailable".
async fn stored_prompt(
    prompts: &dyn PromptRepository,
    profile_type: ProfileType,
    domain: Option<&str>,
) -> Option<String> {
    match prompts.lookup(profile_type, domain).await {
        Ok(Some(text)) if !text.trim().is_empty() => Some(text),
        Ok(_) => None,
        Err(e) => {
            warn!(error = %e, ?profile_type, ?domain, "Prompt lookup failed, treating as unavailable");
            None
        }
    }
}

pub fn built_in_prompt(profile_type: ProfileType, domain: Option<&str>) -> String {
    match profile_type {
        ProfileType::Technical => TECHNICAL_SKILLS_PROMPT.to_string(),
        ProfileType::NonTechnical => {
            let clause = domain
                .map(|d| format!(" for a candidate in the {d} domain"))
                .unwrap_or_default();
            NON_TECHNICAL_SKILLS_PROMPT_TEMPLATE.replace("{domain_clause}", &clause)
        }
    }
}

/// Raw skill elements from `{"skills": [...]}`, a bare array, or nothing.
fn parse_skill_payload(raw: &str) -> Vec<Value> {
    if let Ok(payload) = parse_json_object::<SkillsPayload>(raw) {
        return match payload.skills {
            Value::Array(items) => items,
            Value::String(s) => vec![Value::String(s)],
            _ => Vec::new(),
        };
    }

    let array = extract_balanced(strip_json_fences(raw), b'[', b']')
        .and_then(|a| serde_json::from_str::<Vec<Value>>(a).ok());
    match array {
        Some(items) => items,
        None => {
            warn!(response_len = raw.len(), "No skill list found in response");
            Vec::new()
        }
    }
}
