//! Eligibility evaluation: self-assessment and test modes.
//!
//! Both modes are pure. A failed or ineligible outcome is an ordinary value;
//! only the caller decides what to do with it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::model::{ProficiencyRecord, SkillCategory, SkillRequirement, TestAttempt};

/// Overall result of the latest self-assessment for a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    /// No self-rating was ever recorded for the role.
    None,
    Passed,
    Failed,
}

/// Per-skill line of a self-assessment evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillGap {
    pub skill_id: String,
    pub skill_name: String,
    pub category: SkillCategory,
    pub required: u8,
    /// Latest self-rating, 0 when the skill was never rated.
    pub actual: u8,
    /// `required - actual`, negative when the rating exceeds the bar.
    pub gap: i16,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentEvaluation {
    pub status: AssessmentStatus,
    pub skills: Vec<SkillGap>,
}

impl AssessmentEvaluation {
    pub fn strengths(&self) -> impl Iterator<Item = &SkillGap> {
        self.skills.iter().filter(|skill| skill.passed)
    }

    pub fn development_areas(&self) -> impl Iterator<Item = &SkillGap> {
        self.skills.iter().filter(|skill| !skill.passed)
    }

    /// Failed skills, cloned for handing to the learning path generator.
    #[must_use]
    pub fn failed_skills(&self) -> Vec<SkillGap> {
        self.development_areas().cloned().collect()
    }
}

/// Per-skill line of a test-mode evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSkillOutcome {
    pub skill_id: String,
    pub skill_name: String,
    pub category: SkillCategory,
    pub required_level: u8,
    pub best_score: Option<u8>,
    pub passed: bool,
    pub last_attempt_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestEvaluation {
    pub eligible: bool,
    pub passed_count: usize,
    pub total_count: usize,
    pub skills: Vec<TestSkillOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityResult {
    pub assessment: AssessmentEvaluation,
    pub tests: TestEvaluation,
}

/// Evaluate both modes over the same requirement set.
#[must_use]
pub fn evaluate(
    requirements: &[SkillRequirement],
    proficiencies: &[ProficiencyRecord],
    attempts: &[TestAttempt],
) -> EligibilityResult {
    EligibilityResult {
        assessment: evaluate_self_assessment(requirements, proficiencies),
        tests: evaluate_tests(requirements, attempts),
    }
}

/// Compare the latest self-rating per skill against each requirement.
#[must_use]
pub fn evaluate_self_assessment(
    requirements: &[SkillRequirement],
    proficiencies: &[ProficiencyRecord],
) -> AssessmentEvaluation {
    let skills: Vec<SkillGap> = requirements
        .iter()
        .map(|req| {
            let actual = latest_rating(proficiencies, &req.role_id, &req.skill_id).unwrap_or(0);
            SkillGap {
                skill_id: req.skill_id.clone(),
                skill_name: req.skill_name.clone(),
                category: req.category,
                required: req.required_level,
                actual,
                gap: i16::from(req.required_level) - i16::from(actual),
                passed: actual >= req.required_level,
            }
        })
        .collect();

    let any_record = proficiencies.iter().any(|record| {
        requirements
            .iter()
            .any(|req| req.role_id == record.role_id)
    });

    let status = if !any_record {
        AssessmentStatus::None
    } else if skills.iter().all(|skill| skill.passed) {
        AssessmentStatus::Passed
    } else {
        AssessmentStatus::Failed
    };

    AssessmentEvaluation { status, skills }
}

/// Check testable requirements against recorded test attempts.
///
/// Zero testable skills is never eligible.
#[must_use]
pub fn evaluate_tests(requirements: &[SkillRequirement], attempts: &[TestAttempt]) -> TestEvaluation {
    let skills: Vec<TestSkillOutcome> = requirements
        .iter()
        .filter(|req| req.testable)
        .map(|req| {
            let relevant: Vec<&TestAttempt> = attempts
                .iter()
                .filter(|a| a.skill_id == req.skill_id && a.role_id == req.role_id)
                .collect();
            TestSkillOutcome {
                skill_id: req.skill_id.clone(),
                skill_name: req.skill_name.clone(),
                category: req.category,
                required_level: req.required_level,
                best_score: relevant.iter().map(|a| a.score).max(),
                passed: relevant.iter().any(|a| a.passed),
                last_attempt_at: relevant.iter().map(|a| a.attempted_at).max(),
            }
        })
        .collect();

    let total_count = skills.len();
    let passed_count = skills.iter().filter(|s| s.passed).count();

    TestEvaluation {
        eligible: total_count > 0 && passed_count == total_count,
        passed_count,
        total_count,
        skills,
    }
}

fn latest_rating(records: &[ProficiencyRecord], role_id: &str, skill_id: &str) -> Option<u8> {
    records
        .iter()
        .filter(|r| r.role_id == role_id && r.skill_id == skill_id)
        .max_by_key(|r| r.recorded_at)
        .map(|r| r.self_rating)
}
