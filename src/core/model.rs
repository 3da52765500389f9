//! Value snapshots the engine reads.
//!
//! Everything here is plain data owned by the persistence layer. The engine
//! receives these as immutable slices and never mutates them in place.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CmError, Result};

/// Lowest and highest self-rating / required level on the proficiency scale.
pub const MIN_PROFICIENCY: u8 = 1;
pub const MAX_PROFICIENCY: u8 = 5;

/// Ordinal job level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleLevel {
    Junior,
    Mid,
    Senior,
    Lead,
    Manager,
}

impl RoleLevel {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Junior => "junior",
            Self::Mid => "mid",
            Self::Senior => "senior",
            Self::Lead => "lead",
            Self::Manager => "manager",
        }
    }

    /// Level an employee progresses to from this one, if any.
    ///
    /// Only junior and mid have a defined successor.
    #[must_use]
    pub const fn next(&self) -> Option<Self> {
        match self {
            Self::Junior => Some(Self::Mid),
            Self::Mid => Some(Self::Senior),
            Self::Senior | Self::Lead | Self::Manager => None,
        }
    }
}

impl fmt::Display for RoleLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleLevel {
    type Err = CmError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "junior" => Ok(Self::Junior),
            "mid" => Ok(Self::Mid),
            "senior" => Ok(Self::Senior),
            "lead" => Ok(Self::Lead),
            "manager" => Ok(Self::Manager),
            other => Err(CmError::InvalidInput(format!(
                "invalid role level '{other}' (expected junior|mid|senior|lead|manager)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub title: String,
    pub level: RoleLevel,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    Technical,
    Soft,
}

impl SkillCategory {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Technical => "technical",
            Self::Soft => "soft",
        }
    }
}

impl fmt::Display for SkillCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SkillCategory {
    type Err = CmError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "technical" => Ok(Self::Technical),
            "soft" => Ok(Self::Soft),
            other => Err(CmError::InvalidInput(format!(
                "invalid skill category '{other}' (expected technical|soft)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub id: String,
    pub name: String,
    pub category: SkillCategory,
}

/// A skill a role demands, at a minimum proficiency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRequirement {
    pub role_id: String,
    pub skill_id: String,
    pub skill_name: String,
    pub category: SkillCategory,
    pub required_level: u8,
    /// At least one question exists for the skill.
    pub testable: bool,
}

/// One self-rating submitted by an employee for a skill of a target role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProficiencyRecord {
    pub employee_id: String,
    pub role_id: String,
    pub skill_id: String,
    pub self_rating: u8,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestAttempt {
    pub id: String,
    pub employee_id: String,
    pub skill_id: String,
    pub role_id: String,
    pub score: u8,
    pub passed: bool,
    pub attempted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningStatus {
    Active,
    Completed,
}

impl LearningStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

impl FromStr for LearningStatus {
    type Err = CmError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            other => Err(CmError::InvalidInput(format!(
                "invalid learning status '{other}'"
            ))),
        }
    }
}

/// A remedial resource assigned after a failed self-assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningItem {
    pub id: String,
    pub employee_id: String,
    pub role_id: String,
    pub skill_id: String,
    pub title: String,
    pub resource_url: String,
    /// Per-item checkbox toggled by the employee.
    pub completed: bool,
    /// Whether the item belongs to the employee's live path.
    pub status: LearningStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromotionStatus {
    Pending,
    Approved,
    Rejected,
}

impl PromotionStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl FromStr for PromotionStatus {
    type Err = CmError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(CmError::InvalidInput(format!(
                "invalid promotion status '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionRequest {
    pub id: String,
    pub employee_id: String,
    pub current_role_id: String,
    pub requested_role_id: String,
    pub status: PromotionStatus,
    pub requested_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub id: String,
    pub text: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub skill_id: String,
    pub text: String,
    #[serde(default)]
    pub difficulty: String,
    pub options: Vec<QuestionOption>,
}

impl Question {
    /// Identifier of the correct option, if the question has one.
    #[must_use]
    pub fn correct_option_id(&self) -> Option<&str> {
        self.options
            .iter()
            .find(|option| option.is_correct)
            .map(|option| option.id.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Validate a rating or required level against the 1-5 scale.
pub fn check_proficiency(value: u8, what: &str) -> Result<u8> {
    if (MIN_PROFICIENCY..=MAX_PROFICIENCY).contains(&value) {
        Ok(value)
    } else {
        Err(CmError::InvalidInput(format!(
            "{what} must be between {MIN_PROFICIENCY} and {MAX_PROFICIENCY}, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_level_round_trips_through_str() {
        for level in [
            RoleLevel::Junior,
            RoleLevel::Mid,
            RoleLevel::Senior,
            RoleLevel::Lead,
            RoleLevel::Manager,
        ] {
            assert_eq!(level.as_str().parse::<RoleLevel>().unwrap(), level);
        }
        assert_eq!(" Senior ".parse::<RoleLevel>().unwrap(), RoleLevel::Senior);
        assert!("principal".parse::<RoleLevel>().is_err());
    }

    #[test]
    fn only_junior_and_mid_have_successors() {
        assert_eq!(RoleLevel::Junior.next(), Some(RoleLevel::Mid));
        assert_eq!(RoleLevel::Mid.next(), Some(RoleLevel::Senior));
        assert_eq!(RoleLevel::Senior.next(), None);
        assert_eq!(RoleLevel::Lead.next(), None);
        assert_eq!(RoleLevel::Manager.next(), None);
    }

    #[test]
    fn correct_option_lookup() {
        let question = Question {
            id: "q1".into(),
            skill_id: "s1".into(),
            text: "?".into(),
            difficulty: String::new(),
            options: vec![
                QuestionOption { id: "a".into(), text: "A".into(), is_correct: false },
                QuestionOption { id: "b".into(), text: "B".into(), is_correct: true },
            ],
        };
        assert_eq!(question.correct_option_id(), Some("b"));
    }

    #[test]
    fn proficiency_bounds() {
        assert!(check_proficiency(0, "rating").is_err());
        assert_eq!(check_proficiency(1, "rating").unwrap(), 1);
        assert_eq!(check_proficiency(5, "rating").unwrap(), 5);
        assert!(check_proficiency(6, "rating").is_err());
    }
}
