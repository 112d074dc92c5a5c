//! Structural completeness checks run before any blocking export.
//!
//! The report is a value, not an error: the preview path logs it and keeps
//! going, while downloads and Word exports refuse to generate when
//! `is_valid` is false.

use serde::{Deserialize, Serialize};

use crate::models::resume::{has_text, ResumeData};

/// Upper bound on the professional summary, in characters.
pub const SUMMARY_MAX_CHARS: usize = 600;

const MIN_AGE: i64 = 16;
const MAX_AGE: i64 = 99;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    /// All errors joined verbatim, in the order they were found.
    pub fn joined(&self) -> String {
        self.errors.join("; ")
    }
}

/// Validates a résumé for minimum completeness. Collects every failure.
pub fn validate(data: &ResumeData) -> ValidationReport {
    let mut errors = Vec::new();

    let required_identity = [
        ("name", &data.name),
        ("surname", &data.surname),
        ("professional title", &data.title),
    ];
    for (label, field) in required_identity {
        if !has_text(field) {
            errors.push(format!("The {label} is required"));
        }
    }

    if let Some(summary) = data.summary.as_deref() {
        let len = summary.trim().chars().count();
        if len > SUMMARY_MAX_CHARS {
            errors.push(format!(
                "The professional summary has {len} characters; the maximum is {SUMMARY_MAX_CHARS}"
            ));
        }
    }

    if let Some(age) = data.age {
        if !(MIN_AGE..=MAX_AGE).contains(&age) {
            errors.push(format!("Age must be between {MIN_AGE} and {MAX_AGE}"));
        }
    }

    for (i, exp) in data.experiences.iter().enumerate() {
        if exp.is_blank() {
            continue;
        }
        if !has_text(&exp.role) {
            errors.push(format!("Experience #{} is missing the role", i + 1));
        }
        if !has_text(&exp.organization) {
            errors.push(format!("Experience #{} is missing the organization", i + 1));
        }
    }

    for (i, edu) in data.education.iter().enumerate() {
        if edu.is_blank() {
            continue;
        }
        if !has_text(&edu.credential) {
            errors.push(format!("Education #{} is missing the credential", i + 1));
        }
        if !has_text(&edu.institution) {
            errors.push(format!("Education #{} is missing the institution", i + 1));
        }
    }

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
