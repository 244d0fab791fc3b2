//! Experience resolution: three ordered strategies, first non-empty result wins.
//!
//! 1. `Model`: one backend call over the first 20k characters.
//! 2. `Pattern`: deterministic "N years" phrasing search (see `patterns`).
//! 3. `DateInference`: span between the earliest and latest work dates (see `dates`).
//!
//! A tier that yields nothing hands over to the next one. Nothing here ever
//! surfaces an error to the caller; an undeterminable value is `None`.

pub mod dates;
pub mod patterns;
pub mod prompts;

use std::sync::LazyLock;
use std::time::Duration;

use chrono::{Datelike, Local, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::errors::ExtractionError;
use crate::experience::dates::DateTagger;
use crate::experience::patterns::MAX_PLAUSIBLE_YEARS;
use crate::experience::prompts::EXPERIENCE_PROMPT_TEMPLATE;
use crate::llm_client::prompts::with_resume;
use crate::llm_client::response::parse_json_object;
use crate::llm_client::{BackendClient, GenerateRequest};
use crate::text::{char_prefix, EXPERIENCE_WINDOW};

/// Which strategy produced an estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceTier {
    Model,
    Pattern,
    DateInference,
}

impl ExperienceTier {
    /// Tiers in the order they are attempted.
    pub const ORDER: [ExperienceTier; 3] = [
        ExperienceTier::Model,
        ExperienceTier::Pattern,
        ExperienceTier::DateInference,
    ];

    pub fn confidence(self) -> f32 {
        match self {
            ExperienceTier::Model => 0.90,
            ExperienceTier::Pattern => 0.75,
            ExperienceTier::DateInference => 0.60,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExperienceTier::Model => "model",
            ExperienceTier::Pattern => "pattern",
            ExperienceTier::DateInference => "date_inference",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperienceEstimate {
    /// e.g. "5 years", "10+ years", "1 year"
    pub value_text: String,
    pub source_tier: ExperienceTier,
    pub confidence: f32,
}

impl ExperienceEstimate {
    pub fn new(value_text: String, source_tier: ExperienceTier) -> Self {
        Self {
            value_text,
            source_tier,
            confidence: source_tier.confidence(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ExperiencePayload {
    experience: Option<Value>,
}

#[derive(Clone)]
pub struct ExperienceResolver {
    tagger: DateTagger,
    timeout: Duration,
    today: Option<NaiveDate>,
}

impl ExperienceResolver {
    pub fn new(timeout: Duration) -> Self {
        Self {
            tagger: DateTagger::default(),
            timeout,
            today: None,
        }
    }

    pub fn with_tagger(mut self, tagger: DateTagger) -> Self {
        self.tagger = tagger;
        self
    }

    /// Pins "today" instead of reading the local clock.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    pub async fn resolve(&self, text: &str, backend: &dyn BackendClient) -> Option<ExperienceEstimate> {
        for tier in ExperienceTier::ORDER {
            let outcome = match tier {
                ExperienceTier::Model => self.from_model(text, backend).await,
                ExperienceTier::Pattern => patterns::best_match(text)
                    .map(|hit| hit.value_text())
                    .ok_or(ExtractionError::NoMatch),
                ExperienceTier::DateInference => self.from_dates(text),
            };

            match outcome {
                Ok(value_text) => {
                    info!(tier = tier.as_str(), value = %value_text, "Experience resolved");
                    return Some(ExperienceEstimate::new(value_text, tier));
                }
                Err(ExtractionError::NoMatch) => {
                    debug!(tier = tier.as_str(), "Experience tier found nothing");
                }
                Err(e) => {
                    warn!(tier = tier.as_str(), error = %e, "Experience tier failed, falling through");
                }
            }
        }

        info!(text_len = text.len(), "Experience could not be determined");
        None
    }

    async fn from_model(&self, text: &str, backend: &dyn BackendClient) -> Result<String, ExtractionError> {
        let status = backend.probe().await;
        let model = status.usable_model().ok_or_else(|| {
            ExtractionError::BackendUnreachable("probe reported no usable model".to_string())
        })?;

        let instruction = EXPERIENCE_PROMPT_TEMPLATE
            .replace("{current_date}", &self.today().format("%Y-%m-%d").to_string());
        let prompt = with_resume(&instruction, char_prefix(text, EXPERIENCE_WINDOW));
        let request = GenerateRequest::new(prompt, model, self.timeout);

        let raw = backend.generate(&request).await?;
        let payload: ExperiencePayload = parse_json_object(&raw)?;
        payload
            .experience
            .as_ref()
            .and_then(normalize_model_value)
            .ok_or(ExtractionError::NoMatch)
    }

    fn from_dates(&self, text: &str) -> Result<String, ExtractionError> {
        let today = self.today();
        let work_dates: Vec<NaiveDate> = self
            .tagger
            .tag(text, today)
            .into_iter()
            .filter(|o| !o.is_education)
            .map(|o| o.when)
            .collect();

        if work_dates.len() < 2 {
            return Err(ExtractionError::NoMatch);
        }
        let (Some(earliest), Some(latest)) = (work_dates.iter().min(), work_dates.iter().max()) else {
            return Err(ExtractionError::NoMatch);
        };
        let latest = (*latest).min(today);

        debug!(%earliest, %latest, dates = work_dates.len(), "Inferring experience from work dates");
        span_years(*earliest, latest)
            .map(|years| years_text(years, false))
            .ok_or(ExtractionError::NoMatch)
    }
}

/// Whole months from `start` to `end`; a partial final month does not count.
pub fn months_between(start: NaiveDate, end: NaiveDate) -> i32 {
    let mut months = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
    if end.day() < start.day() {
        months -= 1;
    }
    months
}

/// Span policy: under 3 months is nothing, 3 to 11 months is one year,
/// otherwise round to the nearest year, clamped to 0..=50.
pub fn span_years(start: NaiveDate, end: NaiveDate) -> Option<u32> {
    let months = months_between(start, end);
    if months < 3 {
        return None;
    }
    if months < 12 {
        return Some(1);
    }
    let mut years = months / 12;
    if months % 12 >= 6 {
        years += 1;
    }
    Some((years as u32).min(MAX_PLAUSIBLE_YEARS))
}

pub fn years_text(years: u32, plus: bool) -> String {
    match (years, plus) {
        (n, true) => format!("{n}+ years"),
        (1, false) => "1 year".to_string(),
        (n, false) => format!("{n} years"),
    }
}

/// A bare year count as the model is asked to give it: `5`, `5+`, `5 years`,
/// `5+ yrs`, `5.5 years`.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static MODEL_YEARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d{1,3}(?:\.\d+)?)\s*(\+)?\s*(?:years?|yrs?)?\.?$").expect("valid regex")
});

/// Accepts only a year count in 1..=50 written as above. Free text, null-ish
/// answers and implausible numbers yield `None` so the next tier runs.
fn normalize_model_value(value: &Value) -> Option<String> {
    let (years, plus) = match value {
        Value::String(s) => {
            let caps = MODEL_YEARS.captures(s.trim())?;
            let years = caps.get(1)?.as_str().parse::<f64>().ok()?;
            (years, caps.get(2).is_some())
        }
        Value::Number(n) => (n.as_f64()?, false),
        _ => return None,
    };
    let whole = years.floor();
    if !(1.0..=f64::from(MAX_PLAUSIBLE_YEARS)).contains(&whole) {
        return None;
    }
    Some(years_text(whole as u32, plus))
}
