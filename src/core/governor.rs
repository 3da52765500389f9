//! Test attempt governor.
//!
//! The lock state of a (employee, skill, role) triple is derived from its
//! attempt log every time it is needed; nothing about it is stored.

use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::model::{Question, TestAttempt};
use crate::error::{CmError, Result};

pub const DEFAULT_PASS_SCORE: u8 = 70;
pub const DEFAULT_COOLDOWN_HOURS: u32 = 24;

/// Tunables for scoring and retry windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestPolicy {
    /// Minimum rounded percentage that passes.
    pub pass_score: u8,
    /// Wait after a failed attempt before the next one.
    pub cooldown: Duration,
}

impl Default for TestPolicy {
    fn default() -> Self {
        Self {
            pass_score: DEFAULT_PASS_SCORE,
            cooldown: Duration::hours(i64::from(DEFAULT_COOLDOWN_HOURS)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AttemptState {
    NotAttempted,
    Ready,
    Cooldown { unlock_at: DateTime<Utc> },
    Passed { score: u8, passed_at: DateTime<Utc> },
}

impl AttemptState {
    /// Whether a new submission may be made in this state.
    #[must_use]
    pub const fn accepts_attempts(&self) -> bool {
        matches!(self, Self::NotAttempted | Self::Ready)
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::NotAttempted => "not_attempted",
            Self::Ready => "ready",
            Self::Cooldown { .. } => "cooldown",
            Self::Passed { .. } => "passed",
        }
    }
}

impl fmt::Display for AttemptState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cooldown { unlock_at } => write!(f, "cooldown until {}", unlock_at.to_rfc3339()),
            Self::Passed { score, .. } => write!(f, "passed ({score}%)"),
            other => f.write_str(other.label()),
        }
    }
}

/// The option an employee picked for one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: String,
    pub option_id: String,
}

impl Answer {
    pub fn new(question_id: impl Into<String>, option_id: impl Into<String>) -> Self {
        Self {
            question_id: question_id.into(),
            option_id: option_id.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grade {
    pub correct: usize,
    pub total: usize,
    pub score: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptOutcome {
    pub attempt: TestAttempt,
    pub correct: usize,
    pub total: usize,
    pub next_state: AttemptState,
}

/// Identifies whose attempt is being judged.
#[derive(Debug, Clone, Copy)]
pub struct AttemptSubject<'a> {
    pub employee_id: &'a str,
    pub skill_id: &'a str,
    pub role_id: &'a str,
}

#[derive(Debug, Clone, Default)]
pub struct TestAttemptGovernor {
    policy: TestPolicy,
}

impl TestAttemptGovernor {
    #[must_use]
    pub const fn new(policy: TestPolicy) -> Self {
        Self { policy }
    }

    #[must_use]
    pub const fn policy(&self) -> &TestPolicy {
        &self.policy
    }

    /// Derive the current state from the attempt history of one triple.
    ///
    /// The history may arrive in any order.
    #[must_use]
    pub fn state(&self, attempts: &[TestAttempt], now: DateTime<Utc>) -> AttemptState {
        if let Some(pass) = attempts
            .iter()
            .filter(|a| a.passed)
            .min_by_key(|a| a.attempted_at)
        {
            return AttemptState::Passed {
                score: pass.score,
                passed_at: pass.attempted_at,
            };
        }

        let Some(last) = attempts.iter().max_by_key(|a| a.attempted_at) else {
            return AttemptState::NotAttempted;
        };

        if now - last.attempted_at < self.policy.cooldown {
            AttemptState::Cooldown {
                unlock_at: last.attempted_at + self.policy.cooldown,
            }
        } else {
            AttemptState::Ready
        }
    }

    /// Score a complete answer sheet.
    pub fn grade(&self, questions: &[Question], answers: &[Answer]) -> Result<Grade> {
        if questions.is_empty() {
            return Err(CmError::InvalidInput("question set is empty".to_string()));
        }

        let known: HashSet<&str> = questions.iter().map(|q| q.id.as_str()).collect();
        let mut picked: HashMap<&str, &str> = HashMap::with_capacity(answers.len());
        for answer in answers {
            if !known.contains(answer.question_id.as_str()) {
                return Err(CmError::InvalidInput(format!(
                    "answer for unknown question '{}'",
                    answer.question_id
                )));
            }
            if picked
                .insert(answer.question_id.as_str(), answer.option_id.as_str())
                .is_some()
            {
                return Err(CmError::InvalidInput(format!(
                    "duplicate answer for question '{}'",
                    answer.question_id
                )));
            }
        }

        let total = questions.len();
        if picked.len() != total {
            return Err(CmError::IncompleteSubmission {
                answered: picked.len(),
                expected: total,
            });
        }

        let correct = questions
            .iter()
            .filter(|q| {
                q.correct_option_id()
                    .is_some_and(|right| picked.get(q.id.as_str()) == Some(&right))
            })
            .count();

        Ok(Grade {
            correct,
            total,
            score: percentage(correct, total),
        })
    }

    /// Grade a submission and produce the attempt to append.
    ///
    /// Nothing is produced unless `state` accepts attempts and the answer
    /// sheet is complete.
    pub fn submit_attempt(
        &self,
        state: &AttemptState,
        subject: AttemptSubject<'_>,
        questions: &[Question],
        answers: &[Answer],
        now: DateTime<Utc>,
    ) -> Result<AttemptOutcome> {
        if !state.accepts_attempts() {
            return Err(CmError::AttemptNotAllowed {
                state: state.to_string(),
            });
        }

        let grade = self.grade(questions, answers)?;
        let passed = grade.score >= self.policy.pass_score;

        let attempt = TestAttempt {
            id: Uuid::new_v4().to_string(),
            employee_id: subject.employee_id.to_string(),
            skill_id: subject.skill_id.to_string(),
            role_id: subject.role_id.to_string(),
            score: grade.score,
            passed,
            attempted_at: now,
        };

        let next_state = if passed {
            AttemptState::Passed {
                score: grade.score,
                passed_at: now,
            }
        } else {
            AttemptState::Cooldown {
                unlock_at: now + self.policy.cooldown,
            }
        };

        Ok(AttemptOutcome {
            attempt,
            correct: grade.correct,
            total: grade.total,
            next_state,
        })
    }
}

/// `round(100 * correct / total)`, halves rounding up.
fn percentage(correct: usize, total: usize) -> u8 {
    let rounded = (200 * correct + total) / (2 * total);
    u8::try_from(rounded.min(100)).unwrap_or(100)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentedOption {
    pub id: String,
    pub text: String,
}

/// A question as shown to the test taker, without the answer key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentedQuestion {
    pub id: String,
    pub text: String,
    pub difficulty: String,
    pub options: Vec<PresentedOption>,
}

/// Shuffle questions and, independently, each question's options.
pub fn present_questions<R: Rng + ?Sized>(questions: &[Question], rng: &mut R) -> Vec<PresentedQuestion> {
    let mut presented: Vec<PresentedQuestion> = questions
        .iter()
        .map(|q| PresentedQuestion {
            id: q.id.clone(),
            text: q.text.clone(),
            difficulty: q.difficulty.clone(),
            options: q
                .options
                .iter()
                .map(|o| PresentedOption {
                    id: o.id.clone(),
                    text: o.text.clone(),
                })
                .collect(),
        })
        .collect();

    presented.shuffle(rng);
    for question in &mut presented {
        question.options.shuffle(rng);
    }
    presented
}
