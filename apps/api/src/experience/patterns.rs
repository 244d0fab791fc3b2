//! Deterministic "N years" search used when the model tier yields nothing.
//!
//! Three pattern families run over nested prefixes of the document. Every hit
//! becomes a `PatternMatch`; the best one is chosen by plus sign first, then
//! region priority, then earliest offset.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::experience::years_text;
use crate::text::{char_prefix, char_window, AGGRESSIVE_WINDOW, SUMMARY_WINDOW, WORK_HISTORY_WINDOW};

/// Hits with more years than this are noise ("150 years of history").
pub const MAX_PLAUSIBLE_YEARS: u32 = 50;

/// Characters around an aggressive hit that must mention "experience".
const AGGRESSIVE_PROXIMITY: usize = 60;

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static SUMMARY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\b(\d{1,3})\s*(\+)?\s*years?\s+of\s+(?:professional\s+)?experience\b",
        r"(?i)\b(?:over|more\s+than|with|having)\s+(\d{1,3})\s*(\+)?\s*years?\b",
        r"(?i)\b(\d{1,3})\s*(\+)?\s*years?\s+(?:experience|professional)\b",
        r"(?i)\b(\d{1,3})\s*(\+)?\s*years?\s+in\s+(?:the\s+)?(?:field|industry|profession)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static WORK_HISTORY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\b(?:total\s+)?(?:work\s+|professional\s+)?experience\s*[:\-]\s*(\d{1,3})\s*(\+)?\s*years?\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ANY_YEARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,3})\s*(\+)?\s*years?\b").expect("valid regex"));

/// Where a hit was found. Declaration order is priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Region {
    Summary,
    WorkHistory,
    Aggressive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    pub years: u32,
    pub has_plus_sign: bool,
    pub region: Region,
    /// Byte offset of the hit in the document.
    pub offset: usize,
}

impl PatternMatch {
    pub fn value_text(&self) -> String {
        years_text(self.years, self.has_plus_sign)
    }
}

/// All plausible hits across the three regions.
pub fn candidates(text: &str) -> Vec<PatternMatch> {
    let mut hits = Vec::new();

    let summary = char_prefix(text, SUMMARY_WINDOW);
    for pattern in SUMMARY_PATTERNS.iter() {
        collect(pattern, summary, Region::Summary, &mut hits, |_, _| true);
    }

    let work_history = char_prefix(text, WORK_HISTORY_WINDOW);
    for pattern in WORK_HISTORY_PATTERNS.iter() {
        collect(pattern, work_history, Region::WorkHistory, &mut hits, |_, _| true);
    }

    let aggressive = char_prefix(text, AGGRESSIVE_WINDOW);
    collect(&ANY_YEARS, aggressive, Region::Aggressive, &mut hits, |haystack, range| {
        char_window(haystack, range.start, range.end, AGGRESSIVE_PROXIMITY)
            .to_lowercase()
            .contains("experience")
    });

    hits
}

/// The winning hit, if any.
pub fn best_match(text: &str) -> Option<PatternMatch> {
    let hits = candidates(text);
    debug!(candidates = hits.len(), "Experience pattern candidates");
    hits.into_iter()
        .min_by_key(|hit| (!hit.has_plus_sign, hit.region, hit.offset))
}

fn collect<F>(pattern: &Regex, haystack: &str, region: Region, hits: &mut Vec<PatternMatch>, accept: F)
where
    F: Fn(&str, std::ops::Range<usize>) -> bool,
{
    for caps in pattern.captures_iter(haystack) {
        let (Some(whole), Some(number)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let Ok(years) = number.as_str().parse::<u32>() else {
            continue;
        };
        if years > MAX_PLAUSIBLE_YEARS || !accept(haystack, whole.range()) {
            continue;
        }
        hits.push(PatternMatch {
            years,
            has_plus_sign: caps.get(2).is_some(),
            region,
            offset: whole.start(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn best(text: &str) -> Option<String> {
        best_match(text).map(|m| m.value_text())
    }

    #[test]
    fn test_plus_sign_beats_region() {
        let text = format!(
            "Engineer with over 25+ years of experience.\n{}\nTotal Experience: 28 years",
            "filler ".repeat(900)
        );
        assert!(text.find("28 years").unwrap() > SUMMARY_WINDOW);
        assert_eq!(best(&text).as_deref(), Some("25+ years"));
    }

    #[test]
    fn test_plus_sign_beats_earlier_plain_match() {
        let text = "8 years of experience in retail. Overall 10+ years of professional experience.";
        assert_eq!(best(text).as_deref(), Some("10+ years"));
    }

    #[test]
    fn test_work_history_phrase_alone() {
        let text = "Jane Doe\nAccountant\nWork Experience: 12 years\nSkills: Excel";
        assert_eq!(best(text).as_deref(), Some("12 years"));
    }

    #[test]
    fn test_summary_region_beats_work_history() {
        let text = "Experience: 4 years\nSeasoned analyst having 6 years in banking.";
        assert_eq!(best(text).as_deref(), Some("6 years"));
    }

    #[test]
    fn test_earlier_offset_wins_within_region() {
        let text = "5 years of experience in sales and 7 years of experience in marketing";
        assert_eq!(best(text).as_deref(), Some("5 years"));
    }

    #[test]
    fn test_aggressive_requires_nearby_experience() {
        assert_eq!(best("Relevant experience - roughly 9 yrs, 3 years abroad").as_deref(), Some("3 years"));
        assert_eq!(best("Lived 3 years abroad."), None);
    }

    #[test]
    fn test_implausible_numbers_are_discarded() {
        assert_eq!(best("Company with 120 years of experience in insurance"), None);
    }

    #[test]
    fn test_singular_year() {
        assert_eq!(best("1 year of experience as a barista").as_deref(), Some("1 year"));
    }

    #[test]
    fn test_no_match() {
        assert!(candidates("Rust, Go, Kubernetes").is_empty());
    }
}
