//! Profile classification: routes a document to the technical or
//! non-technical skill prompts.
//!
//! Classification never blocks the pipeline: any backend failure, unreadable
//! answer or unknown token resolves to `{NonTechnical, domain: None}`.
//! The category sub-classifier follows the same contract with a larger label set.

pub mod prompts;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::classification::prompts::{
    CATEGORY_PROMPT_TEMPLATE, IT_CATEGORIES, IT_NAVIGATION_TOKEN, NON_IT_CATEGORIES,
    NON_IT_NAVIGATION_TOKEN, PROFILE_PROMPT,
};
use crate::errors::ExtractionError;
use crate::llm_client::prompts::with_resume;
use crate::llm_client::response::{parse_json_object, strip_json_fences};
use crate::llm_client::{BackendClient, GenerateRequest};
use crate::text::{char_prefix, CLASSIFICATION_WINDOW};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileType {
    Technical,
    #[default]
    NonTechnical,
}

impl ProfileType {
    /// Maps a backend token (`IT`, `NON_IT` or a navigation token) to a profile type.
    pub fn from_token(token: &str) -> Option<Self> {
        let normalized = token
            .trim()
            .trim_matches(|c: char| matches!(c, '"' | '\'' | '`'))
            .to_uppercase()
            .replace(|c: char| c == '-' || c == ' ', "_");
        match normalized.as_str() {
            "IT" | "TECHNICAL" | IT_NAVIGATION_TOKEN => Some(ProfileType::Technical),
            "NON_IT" | "NONIT" | "NON_TECHNICAL" | NON_IT_NAVIGATION_TOKEN => {
                Some(ProfileType::NonTechnical)
            }
            _ => None,
        }
    }

    /// `mastercategory` key of the prompts table.
    pub fn master_category(self) -> &'static str {
        match self {
            ProfileType::Technical => "IT",
            ProfileType::NonTechnical => "non IT",
        }
    }

    /// Value stored in `resume_metadata.mastercategory`.
    pub fn persisted_label(self) -> &'static str {
        match self {
            ProfileType::Technical => "IT",
            ProfileType::NonTechnical => "NON_IT",
        }
    }

    pub fn categories(self) -> &'static [&'static str] {
        match self {
            ProfileType::Technical => IT_CATEGORIES,
            ProfileType::NonTechnical => NON_IT_CATEGORIES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Classification {
    pub profile_type: ProfileType,
    pub domain: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProfilePayload {
    profile_type: Option<String>,
    domain: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ProfileClassifier {
    timeout: Duration,
}

impl ProfileClassifier {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub async fn classify(&self, text: &str, backend: &dyn BackendClient) -> Classification {
        match self.try_classify(text, backend).await {
            Ok(classification) => {
                info!(
                    profile_type = ?classification.profile_type,
                    domain = ?classification.domain,
                    "Profile classified"
                );
                classification
            }
            Err(e) => {
                warn!(error = %e, "Classification failed, defaulting to NonTechnical");
                Classification::default()
            }
        }
    }

    async fn try_classify(
        &self,
        text: &str,
        backend: &dyn BackendClient,
    ) -> Result<Classification, ExtractionError> {
        let status = backend.probe().await;
        let model = status.usable_model().ok_or_else(|| {
            ExtractionError::BackendUnreachable("probe reported no usable model".to_string())
        })?;

        let prompt = with_resume(PROFILE_PROMPT, char_prefix(text, CLASSIFICATION_WINDOW));
        let raw = backend
            .generate(&GenerateRequest::new(prompt, model, self.timeout))
            .await?;
        parse_classification(&raw)
    }

    /// Second-level classifier: picks one enumerated category for `profile_type`.
    /// `None` when the backend is unavailable or the answer is not a listed label.
    pub async fn classify_category(
        &self,
        text: &str,
        profile_type: ProfileType,
        backend: &dyn BackendClient,
    ) -> Option<String> {
        let status = backend.probe().await;
        let model = status.usable_model()?;

        let prompt = with_resume(&category_prompt(profile_type), char_prefix(text, CLASSIFICATION_WINDOW));
        match backend
            .generate(&GenerateRequest::new(prompt, model, self.timeout))
            .await
        {
            Ok(raw) => {
                let category = match_category(&raw, profile_type);
                match &category {
                    Some(c) => info!(category = %c, "Category classified"),
                    None => debug!("Category answer did not match an allowed label"),
                }
                category
            }
            Err(e) => {
                warn!(error = %e, "Category classification failed");
                None
            }
        }
    }
}

/// Reads either the JSON payload or a bare token from a classification answer.
pub fn parse_classification(raw: &str) -> Result<Classification, ExtractionError> {
    if let Ok(ProfilePayload {
        profile_type: Some(token),
        domain,
    }) = parse_json_object::<ProfilePayload>(raw)
    {
        let profile_type = ProfileType::from_token(&token).ok_or(ExtractionError::NoMatch)?;
        let domain = domain
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty() && !d.eq_ignore_ascii_case("null") && !d.eq_ignore_ascii_case("none"));
        return Ok(Classification {
            profile_type,
            domain,
        });
    }

    // Earliest navigation token anywhere in the answer.
    let it = raw.find(IT_NAVIGATION_TOKEN);
    let non_it = raw.find(NON_IT_NAVIGATION_TOKEN);
    let profile_type = match (it, non_it) {
        (Some(a), Some(b)) if a < b => Some(ProfileType::Technical),
        (Some(_), Some(_)) | (None, Some(_)) => Some(ProfileType::NonTechnical),
        (Some(_), None) => Some(ProfileType::Technical),
        (None, None) => strip_json_fences(raw)
            .lines()
            .find(|l| !l.trim().is_empty())
            .and_then(ProfileType::from_token),
    };

    profile_type
        .map(|profile_type| Classification {
            profile_type,
            domain: None,
        })
        .ok_or(ExtractionError::NoMatch)
}

fn category_prompt(profile_type: ProfileType) -> String {
    let label = match profile_type {
        ProfileType::Technical => "IT",
        ProfileType::NonTechnical => "NON-IT",
    };
    let list = profile_type
        .categories()
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{}. {c}", i + 1))
        .collect::<Vec<_>>()
        .join("\n");
    CATEGORY_PROMPT_TEMPLATE
        .replace("{domain_label}", label)
        .replace("{category_list}", &list)
}

/// First non-empty line, stripped of quotes, numbering and trailing punctuation,
/// matched case-insensitively against the labels of `profile_type`.
pub fn match_category(raw: &str, profile_type: ProfileType) -> Option<String> {
    let line = strip_json_fences(raw)
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())?;

    let is_quote = |c: char| matches!(c, '"' | '\'' | '`');
    let cleaned = line
        .trim_matches(is_quote)
        .trim_end_matches(|c: char| matches!(c, '.' | ',' | ';' | ':'))
        .trim_matches(is_quote)
        .trim();
    let cleaned = strip_enumeration(cleaned);

    profile_type
        .categories()
        .iter()
        .find(|label| label.eq_ignore_ascii_case(cleaned))
        .map(|label| label.to_string())
}

/// "7. Data Science" → "Data Science"
fn strip_enumeration(s: &str) -> &str {
    let rest = s.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.len() == s.len() {
        return s;
    }
    rest.strip_prefix('.')
        .or_else(|| rest.strip_prefix(')'))
        .map(str::trim_start)
        .unwrap_or(s)
}
