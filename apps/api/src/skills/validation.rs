//! SkillList cleanup. Pure, no backend calls.
//!
//! Steps, in order: coerce each element to trimmed text, split comma bundles,
//! drop entries outside 2..=100 chars or without a letter, dedupe
//! case-insensitively keeping the first spelling, keep the first 50.

use std::collections::HashSet;

use serde_json::Value;

pub const MAX_SKILLS: usize = 50;
pub const MIN_SKILL_CHARS: usize = 2;
pub const MAX_SKILL_CHARS: usize = 100;

pub fn normalize_skills(raw: &[Value]) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.iter()
        .filter_map(coerce)
        .flat_map(|entry| split_bundle(&entry))
        .filter(|skill| is_valid_skill(skill))
        .filter(|skill| seen.insert(skill.to_lowercase()))
        .take(MAX_SKILLS)
        .collect()
}

/// Strings are trimmed, numbers and booleans become text; nulls, objects and
/// nested arrays are dropped.
fn coerce(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn split_bundle(entry: &str) -> Vec<String> {
    entry
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn is_valid_skill(skill: &str) -> bool {
    let len = skill.chars().count();
    (MIN_SKILL_CHARS..=MAX_SKILL_CHARS).contains(&len) && skill.chars().any(char::is_alphabetic)
}
