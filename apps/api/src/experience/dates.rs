//! DateTagger: finds every date-like token in a document, keeps a context
//! window around it and decides whether it belongs to education or work.
//!
//! Recognized shapes:
//! - `Month Year` ("August 2022", "Aug. 2022", "Jan'22")
//! - slash dates `a/b/y` with two- or four-digit years
//! - ISO `YYYY-MM-DD`
//! - bare four-digit years in 1950..=2030, unless already part of a richer shape
//!
//! A range ending in an ongoing marker ("- Present", "to Date", ...) yields an
//! extra occurrence dated today.

use std::ops::Range;
use std::sync::{Arc, LazyLock};

use chrono::{Datelike, NaiveDate};
use regex::{Captures, Regex};
use tracing::debug;

use crate::text::char_window;

/// Characters kept on each side of a match.
pub const CONTEXT_RADIUS: usize = 100;

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static MONTH_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?(?:\s+(\d{4})|\s*['’](\d{2}))\b",
    )
    .expect("valid regex")
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static SLASH_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4}|\d{2})\b").expect("valid regex")
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b").expect("valid regex"));

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static BARE_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(19[5-9]\d|20[0-2]\d|2030)\b").expect("valid regex"));

/// Range separator followed by an ongoing marker, anchored at the end of a date.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ONGOING_AFTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:(?:[-–—]|to\b|till\b|until\b)\s*(?:present|current|now|ongoing|till\s+date|to\s+date)|(?:to|till)\s+date)\b",
    )
    .expect("valid regex")
});

const EDUCATION_KEYWORDS: &[&str] = &[
    "education",
    "degree",
    "bachelor",
    "master",
    "phd",
    "doctorate",
    "university",
    "college",
    "school",
    "diploma",
    "graduat",
    "b.tech",
    "m.tech",
    "b.sc",
    "m.sc",
    "gpa",
    "semester",
    "academic",
    "qualification",
];

const WORK_KEYWORDS: &[&str] = &[
    "experience",
    "employer",
    "employment",
    "company",
    "position",
    "intern",
    "job",
    "client",
    "responsibilities",
    "worked",
    "working",
];

/// Words that make a short all-caps or colon-terminated line a section header.
/// Institution names and degree lines ("STANFORD UNIVERSITY", "MBA") stay body text.
const SECTION_VOCABULARY: &[&str] = &[
    "education",
    "academic",
    "qualification",
    "experience",
    "employment",
    "work history",
    "career",
    "skills",
    "projects",
    "certification",
    "summary",
    "profile",
    "objective",
    "achievements",
    "awards",
    "publications",
    "languages",
    "training",
    "interests",
    "references",
    "contact",
];

/// Phrases that override an enclosing education section.
const STRONG_WORK_PHRASES: &[&str] = &["professional experience", "work experience"];

/// A single date found in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateOccurrence {
    pub when: NaiveDate,
    pub context: String,
    pub is_education: bool,
}

/// Decides whether a date belongs to education, given its context window and
/// whether it sits inside an education section of the document.
pub trait EducationPredicate: Send + Sync {
    fn is_education(&self, context: &str, in_education_section: bool) -> bool;
}

/// Vocabulary-based predicate. Ties and silence resolve to work.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordHeuristic;

impl EducationPredicate for KeywordHeuristic {
    fn is_education(&self, context: &str, in_education_section: bool) -> bool {
        let lower = context.to_lowercase();
        if in_education_section {
            return !STRONG_WORK_PHRASES.iter().any(|p| lower.contains(p));
        }
        let education = EDUCATION_KEYWORDS.iter().any(|k| lower.contains(k));
        let work = WORK_KEYWORDS.iter().any(|k| lower.contains(k));
        education && !work
    }
}

#[derive(Clone)]
pub struct DateTagger {
    predicate: Arc<dyn EducationPredicate>,
}

impl Default for DateTagger {
    fn default() -> Self {
        Self::new(Arc::new(KeywordHeuristic))
    }
}

impl DateTagger {
    pub fn new(predicate: Arc<dyn EducationPredicate>) -> Self {
        Self { predicate }
    }

    /// Every date occurrence in `text`, in document order.
    /// `today` resolves ongoing markers and two-digit years.
    pub fn tag(&self, text: &str, today: NaiveDate) -> Vec<DateOccurrence> {
        let mut found: Vec<(Range<usize>, NaiveDate)> = Vec::new();

        for caps in MONTH_YEAR.captures_iter(text) {
            if let Some(date) = month_year(&caps, today) {
                found.push((span(&caps), date));
            }
        }
        for caps in SLASH_DATE.captures_iter(text) {
            if let Some(date) = slash_date(&caps, today) {
                found.push((span(&caps), date));
            }
        }
        for caps in ISO_DATE.captures_iter(text) {
            let date = NaiveDate::from_ymd_opt(
                number(&caps, 1),
                number(&caps, 2) as u32,
                number(&caps, 3) as u32,
            );
            if let Some(date) = date {
                found.push((span(&caps), date));
            }
        }

        let richer: Vec<Range<usize>> = found.iter().map(|(r, _)| r.clone()).collect();
        for m in BARE_YEAR.find_iter(text) {
            if richer.iter().any(|r| r.start < m.end() && m.start() < r.end) {
                continue;
            }
            let year = m.as_str().parse::<i32>().ok();
            if let Some(date) = year.and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1)) {
                found.push((m.range(), date));
            }
        }

        found.sort_by_key(|(r, _)| r.start);

        let sections = education_sections(text);
        let mut occurrences = Vec::with_capacity(found.len());
        for (range, when) in found {
            let context = char_window(text, range.start, range.end, CONTEXT_RADIUS);
            let in_section = sections.iter().any(|s| s.contains(&range.start));
            let is_education = self.predicate.is_education(context, in_section);
            occurrences.push(DateOccurrence {
                when,
                context: context.to_string(),
                is_education,
            });
            if ONGOING_AFTER.is_match(&text[range.end..]) {
                occurrences.push(DateOccurrence {
                    when: today,
                    context: context.to_string(),
                    is_education,
                });
            }
        }

        debug!(count = occurrences.len(), "Tagged date occurrences");
        occurrences
    }
}

fn span(caps: &Captures<'_>) -> Range<usize> {
    caps.get(0).map(|m| m.range()).unwrap_or(0..0)
}

fn number(caps: &Captures<'_>, group: usize) -> i32 {
    caps.get(group)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

fn month_year(caps: &Captures<'_>, today: NaiveDate) -> Option<NaiveDate> {
    let month = month_number(caps.get(1)?.as_str())?;
    let year = match (caps.get(2), caps.get(3)) {
        (Some(full), _) => full.as_str().parse().ok()?,
        (None, Some(short)) => expand_two_digit_year(short.as_str().parse().ok()?, today),
        (None, None) => return None,
    };
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// `a/b/y`: when `a` exceeds 12 it is the day, otherwise `a` is the month.
fn slash_date(caps: &Captures<'_>, today: NaiveDate) -> Option<NaiveDate> {
    let a = number(caps, 1) as u32;
    let b = number(caps, 2) as u32;
    let raw_year = caps.get(3)?.as_str();
    let year = if raw_year.len() == 2 {
        expand_two_digit_year(raw_year.parse().ok()?, today)
    } else {
        raw_year.parse().ok()?
    };
    let (month, day) = if a > 12 { (b, a) } else { (a, b) };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// `yy` maps to the 2000s unless that lands after the current year.
pub fn expand_two_digit_year(yy: i32, today: NaiveDate) -> i32 {
    if 2000 + yy <= today.year() {
        2000 + yy
    } else {
        1900 + yy
    }
}

fn month_number(name: &str) -> Option<u32> {
    let prefix: String = name.chars().take(3).collect::<String>().to_lowercase();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// Byte ranges covered by education sections: from an education header line
/// up to the next section header.
fn education_sections(text: &str) -> Vec<Range<usize>> {
    let mut sections = Vec::new();
    let mut open: Option<usize> = None;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();
        let Some(title) = section_title(line) else {
            continue;
        };
        if let Some(start) = open.take() {
            sections.push(start..line_start);
        }
        if title.contains("education")
            || title.starts_with("academic")
            || title.starts_with("qualification")
        {
            open = Some(offset);
        }
    }
    if let Some(start) = open {
        sections.push(start..text.len());
    }
    sections
}

/// Lowercased title if `line` looks like a section header: `# Title`, or a
/// short all-caps or colon-terminated line naming a known section.
fn section_title(line: &str) -> Option<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(rest) = trimmed.strip_prefix('#') {
        let title = rest.trim_start_matches('#').trim().trim_end_matches(':').trim();
        return Some(title.to_lowercase());
    }

    let bare = trimmed.trim_end_matches(':').trim();
    let short = bare.chars().count() <= 40 && !bare.chars().any(|c| c.is_ascii_digit());
    let shouted = bare.chars().any(char::is_alphabetic) && !bare.chars().any(char::is_lowercase);
    if !short || !(shouted || trimmed.ends_with(':')) {
        return None;
    }
    let title = bare.to_lowercase();
    SECTION_VOCABULARY
        .iter()
        .any(|word| title.contains(word))
        .then_some(title)
}
