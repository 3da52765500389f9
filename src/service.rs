//! Workflow service: snapshots in, engine decisions, write batches out.
//!
//! Every operation loads what it needs through [`CompetencyRepository`],
//! asks the pure engine in [`crate::core`] what should happen, and persists
//! the result as a single [`WriteBatch`]. Time is always passed in.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::eligibility::{AssessmentEvaluation, AssessmentStatus, SkillGap, evaluate_self_assessment};
use crate::core::gates::{Gate, assessment_gate, test_gate};
use crate::core::governor::{
    Answer, AttemptOutcome, AttemptState, AttemptSubject, PresentedQuestion, TestAttemptGovernor,
    TestPolicy, present_questions,
};
use crate::core::learning::{LearningPathGenerator, LearningPathPlan, PathStatus, path_status};
use crate::core::model::{
    LearningItem, ProficiencyRecord, PromotionRequest, Question, Role, SkillCategory,
    SkillRequirement, TestAttempt, check_proficiency,
};
use crate::core::progression::{GatingTarget, resolve_next_role};
use crate::core::promotion::{
    PromotionEligibility, ReviewDecision, ReviewPlan, latest_request, plan_request, plan_review,
};
use crate::error::{CmError, Result};
use crate::storage::repository::{
    CompetencyRepository, ItemCompletion, PathCompletion, PersistReport, WriteBatch,
};

/// Rating shown for a required skill the employee never rated.
pub const DEFAULT_DISPLAY_RATING: u8 = 1;

/// One self-rating as submitted by an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRating {
    pub skill_id: String,
    pub rating: u8,
}

impl SkillRating {
    pub fn new(skill_id: impl Into<String>, rating: u8) -> Self {
        Self {
            skill_id: skill_id.into(),
            rating,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RatedRequirement {
    #[serde(flatten)]
    pub requirement: SkillRequirement,
    pub current_rating: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssessmentOverview {
    pub employee_id: String,
    pub current_role: Role,
    /// `None` when the current role has no successor.
    pub target: Option<Role>,
    pub requirements: Vec<RatedRequirement>,
    pub evaluation: Option<AssessmentEvaluation>,
    pub learning: PathStatus,
    pub gate: Gate,
}

#[derive(Debug, Clone, Serialize)]
pub struct SelfAssessmentOutcome {
    pub target: Role,
    pub evaluation: AssessmentEvaluation,
    pub learning_items: Vec<LearningItem>,
    pub report: PersistReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssessmentResults {
    pub target: Option<Role>,
    pub status: AssessmentStatus,
    pub strengths: Vec<SkillGap>,
    pub development_areas: Vec<SkillGap>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LearningPathView {
    pub status: PathStatus,
    pub items: Vec<LearningItem>,
    /// Every active item is checked off, so the path can be completed.
    pub all_completed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PathCompletionOutcome {
    pub items_completed: usize,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TestCatalogEntry {
    pub skill_id: String,
    pub skill_name: String,
    pub category: SkillCategory,
    pub required_level: u8,
    pub question_count: usize,
    pub state: AttemptState,
}

#[derive(Debug, Clone, Serialize)]
pub struct TestCatalog {
    pub target: GatingTarget,
    pub gate: Gate,
    /// Empty while the gate is locked.
    pub skills: Vec<TestCatalogEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TestSession {
    pub role_id: String,
    pub skill_id: String,
    pub skill_name: String,
    pub state: AttemptState,
    pub questions: Vec<PresentedQuestion>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PromotionOverview {
    pub current_role: Role,
    pub eligibility: PromotionEligibility,
    pub latest_request: Option<PromotionRequest>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewDetails {
    pub request: PromotionRequest,
    pub current_role: Role,
    pub requested_role: Role,
    pub eligibility: PromotionEligibility,
}

/// Test-mode context for an employee: target role, its requirements, gate.
struct TestContext {
    target: GatingTarget,
    requirements: Vec<SkillRequirement>,
    gate: Gate,
}

pub struct CompetencyService<R> {
    repo: R,
    governor: TestAttemptGovernor,
    generator: LearningPathGenerator,
}

impl<R: CompetencyRepository> CompetencyService<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            governor: TestAttemptGovernor::default(),
            generator: LearningPathGenerator::default(),
        }
    }

    #[must_use]
    pub const fn with_policy(mut self, policy: TestPolicy) -> Self {
        self.governor = TestAttemptGovernor::new(policy);
        self
    }

    #[must_use]
    pub fn with_generator(mut self, generator: LearningPathGenerator) -> Self {
        self.generator = generator;
        self
    }

    pub const fn repository(&self) -> &R {
        &self.repo
    }

    // =========================================================================
    // SELF-ASSESSMENT
    // =========================================================================

    pub fn assessment_overview(&self, employee_id: &str) -> Result<AssessmentOverview> {
        let current_role = self.active_role(employee_id)?;
        let roles = self.repo.fetch_roles()?;
        let (_, learning) = self.learning_snapshot(employee_id)?;

        let Some(target) = resolve_next_role(&current_role, &roles) else {
            return Ok(AssessmentOverview {
                employee_id: employee_id.to_string(),
                current_role,
                target: None,
                requirements: Vec::new(),
                evaluation: None,
                learning,
                gate: assessment_gate(AssessmentStatus::None, learning),
            });
        };

        let requirements = self.repo.fetch_role_requirements(&target.id)?;
        let proficiencies = self.repo.fetch_latest_proficiencies(employee_id, &target.id)?;
        let evaluation = evaluate_self_assessment(&requirements, &proficiencies);
        let gate = assessment_gate(evaluation.status, learning);

        let requirements = requirements
            .into_iter()
            .map(|requirement| {
                let current_rating = proficiencies
                    .iter()
                    .find(|p| p.skill_id == requirement.skill_id)
                    .map_or(DEFAULT_DISPLAY_RATING, |p| p.self_rating);
                RatedRequirement {
                    requirement,
                    current_rating,
                }
            })
            .collect();

        Ok(AssessmentOverview {
            employee_id: employee_id.to_string(),
            current_role,
            target: Some(target),
            requirements,
            evaluation: Some(evaluation),
            learning,
            gate,
        })
    }

    /// Record a full set of self-ratings for the next role.
    ///
    /// A failing result installs a fresh learning path in the same batch.
    pub fn submit_self_assessment(
        &self,
        employee_id: &str,
        ratings: &[SkillRating],
        now: DateTime<Utc>,
    ) -> Result<SelfAssessmentOutcome> {
        let current_role = self.active_role(employee_id)?;
        let roles = self.repo.fetch_roles()?;
        let target = resolve_next_role(&current_role, &roles).ok_or_else(|| {
            CmError::ValidationFailed(format!(
                "'{}' has no next role to assess against",
                current_role.title
            ))
        })?;

        let requirements = self.repo.fetch_role_requirements(&target.id)?;
        if requirements.is_empty() {
            return Err(CmError::ValidationFailed(format!(
                "'{}' has no skill requirements",
                target.title
            )));
        }

        let (active_items, learning) = self.learning_snapshot(employee_id)?;
        let previous = self.repo.fetch_latest_proficiencies(employee_id, &target.id)?;
        let gate = assessment_gate(evaluate_self_assessment(&requirements, &previous).status, learning);
        debug!(employee_id, ?gate, "assessment gate");
        gate.ensure_open()?;

        let records = rating_records(employee_id, &target.id, &requirements, ratings, now)?;
        let evaluation = evaluate_self_assessment(&requirements, &records);

        let plan = if evaluation.status == AssessmentStatus::Failed {
            self.generator
                .generate(employee_id, &target.id, &evaluation.failed_skills(), now)
        } else {
            LearningPathPlan::empty()
        };

        let batch = WriteBatch {
            insert_proficiencies: records,
            ..WriteBatch::default()
        }
        .with_learning_plan(&plan);
        let report = self.repo.persist(&batch)?;

        if let Err(err) = plan.verify_applied(active_items.len(), report.items_retired, report.items_inserted) {
            warn!(employee_id, ?report, "learning path write was not applied whole");
            return Err(err);
        }

        info!(
            employee_id,
            role_id = %target.id,
            status = ?evaluation.status,
            learning_items = plan.insert.len(),
            "self-assessment recorded"
        );

        Ok(SelfAssessmentOutcome {
            target,
            evaluation,
            learning_items: plan.insert,
            report,
        })
    }

    pub fn assessment_results(&self, employee_id: &str) -> Result<AssessmentResults> {
        let current_role = self.active_role(employee_id)?;
        let roles = self.repo.fetch_roles()?;
        let Some(target) = resolve_next_role(&current_role, &roles) else {
            return Ok(AssessmentResults {
                target: None,
                status: AssessmentStatus::None,
                strengths: Vec::new(),
                development_areas: Vec::new(),
            });
        };

        let requirements = self.repo.fetch_role_requirements(&target.id)?;
        let proficiencies = self.repo.fetch_latest_proficiencies(employee_id, &target.id)?;
        let evaluation = evaluate_self_assessment(&requirements, &proficiencies);

        Ok(AssessmentResults {
            status: evaluation.status,
            strengths: evaluation.strengths().cloned().collect(),
            development_areas: evaluation.failed_skills(),
            target: Some(target),
        })
    }

    // =========================================================================
    // LEARNING PATH
    // =========================================================================

    pub fn learning_path(&self, employee_id: &str) -> Result<LearningPathView> {
        let (items, status) = self.learning_snapshot(employee_id)?;
        let all_completed = !items.is_empty() && items.iter().all(|item| item.completed);
        Ok(LearningPathView {
            status,
            items,
            all_completed,
        })
    }

    pub fn set_learning_item_completed(
        &self,
        employee_id: &str,
        item_id: &str,
        completed: bool,
    ) -> Result<LearningPathView> {
        let batch = WriteBatch {
            set_item_completed: Some(ItemCompletion {
                employee_id: employee_id.to_string(),
                item_id: item_id.to_string(),
                completed,
            }),
            ..WriteBatch::default()
        };
        self.repo.persist(&batch)?;
        debug!(employee_id, item_id, completed, "learning item toggled");
        self.learning_path(employee_id)
    }

    /// Close the live path. Every item must be checked off first.
    pub fn complete_learning_path(&self, employee_id: &str, now: DateTime<Utc>) -> Result<PathCompletionOutcome> {
        let active = self.repo.fetch_active_learning_items(employee_id)?;
        if active.is_empty() {
            return Err(CmError::ValidationFailed(format!(
                "employee {employee_id} has no active learning path"
            )));
        }
        let open = active.iter().filter(|item| !item.completed).count();
        if open > 0 {
            return Err(CmError::ValidationFailed(format!(
                "{open} of {} learning items are not completed",
                active.len()
            )));
        }

        let batch = WriteBatch {
            complete_active_path: Some(PathCompletion {
                employee_id: employee_id.to_string(),
                completed_at: now,
            }),
            ..WriteBatch::default()
        };
        let report = self.repo.persist(&batch)?;
        if report.items_completed != active.len() {
            return Err(CmError::InconsistentLearningState {
                expected_retired: active.len(),
                retired: report.items_completed,
                expected_inserted: 0,
                inserted: 0,
            });
        }

        info!(employee_id, items = active.len(), "learning path completed");
        Ok(PathCompletionOutcome {
            items_completed: report.items_completed,
            completed_at: now,
        })
    }

    // =========================================================================
    // SKILL TESTS
    // =========================================================================

    pub fn test_catalog(&self, employee_id: &str, now: DateTime<Utc>) -> Result<TestCatalog> {
        let ctx = self.test_context(employee_id)?;
        if !ctx.gate.is_open() {
            return Ok(TestCatalog {
                target: ctx.target,
                gate: ctx.gate,
                skills: Vec::new(),
            });
        }

        let role_id = ctx.target.role().id.clone();
        let mut skills = Vec::new();
        for requirement in ctx.requirements.iter().filter(|r| r.testable) {
            let question_count = self.repo.fetch_questions(&requirement.skill_id)?.len();
            let attempts = self
                .repo
                .fetch_test_attempts(employee_id, &requirement.skill_id, &role_id)?;
            skills.push(TestCatalogEntry {
                skill_id: requirement.skill_id.clone(),
                skill_name: requirement.skill_name.clone(),
                category: requirement.category,
                required_level: requirement.required_level,
                question_count,
                state: self.governor.state(&attempts, now),
            });
        }

        Ok(TestCatalog {
            target: ctx.target,
            gate: ctx.gate,
            skills,
        })
    }

    /// Open a test: returns the shuffled questions without the answer key.
    pub fn start_test<G: Rng + ?Sized>(
        &self,
        employee_id: &str,
        skill_id: &str,
        now: DateTime<Utc>,
        rng: &mut G,
    ) -> Result<TestSession> {
        let ctx = self.test_context(employee_id)?;
        ctx.gate.ensure_open()?;
        let requirement = required_skill(&ctx, skill_id)?;
        let questions = self.questions_for(skill_id)?;

        let role_id = ctx.target.role().id.clone();
        let attempts = self.repo.fetch_test_attempts(employee_id, skill_id, &role_id)?;
        let state = self.governor.state(&attempts, now);
        if !state.accepts_attempts() {
            return Err(CmError::AttemptNotAllowed {
                state: state.to_string(),
            });
        }

        Ok(TestSession {
            role_id,
            skill_id: skill_id.to_string(),
            skill_name: requirement.skill_name.clone(),
            state,
            questions: present_questions(&questions, rng),
        })
    }

    pub fn submit_test(
        &self,
        employee_id: &str,
        skill_id: &str,
        answers: &[Answer],
        now: DateTime<Utc>,
    ) -> Result<AttemptOutcome> {
        let ctx = self.test_context(employee_id)?;
        ctx.gate.ensure_open()?;
        required_skill(&ctx, skill_id)?;
        let questions = self.questions_for(skill_id)?;

        let role_id = ctx.target.role().id.as_str();
        let attempts = self.repo.fetch_test_attempts(employee_id, skill_id, role_id)?;
        let state = self.governor.state(&attempts, now);
        let subject = AttemptSubject {
            employee_id,
            skill_id,
            role_id,
        };
        let outcome = self
            .governor
            .submit_attempt(&state, subject, &questions, answers, now)?;

        let batch = WriteBatch {
            insert_attempt: Some(outcome.attempt.clone()),
            ..WriteBatch::default()
        };
        self.repo.persist(&batch)?;

        info!(
            employee_id,
            skill_id,
            role_id,
            score = outcome.attempt.score,
            passed = outcome.attempt.passed,
            "test attempt recorded"
        );
        Ok(outcome)
    }

    // =========================================================================
    // PROMOTION
    // =========================================================================

    pub fn promotion_status(&self, employee_id: &str) -> Result<PromotionOverview> {
        let current_role = self.active_role(employee_id)?;
        let roles = self.repo.fetch_roles()?;
        let eligibility = self.eligibility_for(employee_id, &current_role, &roles)?;
        let requests = self.repo.fetch_promotion_requests(employee_id)?;

        Ok(PromotionOverview {
            current_role,
            eligibility,
            latest_request: latest_request(&requests).cloned(),
        })
    }

    pub fn request_promotion(
        &self,
        employee_id: &str,
        requested_role_id: &str,
        now: DateTime<Utc>,
    ) -> Result<PromotionRequest> {
        let current_role = self.active_role(employee_id)?;
        let roles = self.repo.fetch_roles()?;
        let requested = find_role(&roles, requested_role_id)?;
        let eligibility = self.eligibility_for(employee_id, &current_role, &roles)?;
        let history = self.repo.fetch_promotion_requests(employee_id)?;

        let request = plan_request(employee_id, &current_role, requested, &history, &eligibility, now)?;
        let batch = WriteBatch {
            insert_promotion_request: Some(request.clone()),
            ..WriteBatch::default()
        };
        self.repo.persist(&batch)?;

        info!(
            employee_id,
            request_id = %request.id,
            requested_role_id,
            "promotion requested"
        );
        Ok(request)
    }

    /// Test breakdown an administrator sees before deciding.
    pub fn review_details(&self, request_id: &str) -> Result<ReviewDetails> {
        let request = self.require_request(request_id)?;
        let roles = self.repo.fetch_roles()?;
        let current_role = find_role(&roles, &request.current_role_id)?.clone();
        let requested_role = find_role(&roles, &request.requested_role_id)?.clone();
        let eligibility = self.eligibility_for(&request.employee_id, &current_role, &roles)?;

        Ok(ReviewDetails {
            request,
            current_role,
            requested_role,
            eligibility,
        })
    }

    /// Approve or reject a pending request. Approval moves the employee to
    /// the requested role in the same batch.
    pub fn review_promotion(
        &self,
        request_id: &str,
        decision: ReviewDecision,
        now: DateTime<Utc>,
    ) -> Result<ReviewPlan> {
        let request = self.require_request(request_id)?;
        let plan = plan_review(&request, decision, now)?;
        let report = self.repo.persist(&WriteBatch::default().with_review(&plan))?;

        info!(
            request_id,
            employee_id = %request.employee_id,
            %decision,
            roles_assigned = report.roles_assigned,
            "promotion reviewed"
        );
        Ok(plan)
    }

    // =========================================================================
    // SNAPSHOT HELPERS
    // =========================================================================

    fn active_role(&self, employee_id: &str) -> Result<Role> {
        self.repo
            .fetch_active_role(employee_id)?
            .ok_or_else(|| CmError::NoActiveRole(employee_id.to_string()))
    }

    fn learning_snapshot(&self, employee_id: &str) -> Result<(Vec<LearningItem>, PathStatus)> {
        let active = self.repo.fetch_active_learning_items(employee_id)?;
        let latest = self.repo.fetch_latest_learning_item(employee_id)?;
        let status = path_status(&active, latest.as_ref());
        Ok((active, status))
    }

    fn test_context(&self, employee_id: &str) -> Result<TestContext> {
        let current_role = self.active_role(employee_id)?;
        let roles = self.repo.fetch_roles()?;
        let target = GatingTarget::resolve(&current_role, &roles);
        let role_id = target.role().id.clone();

        let requirements = self.repo.fetch_role_requirements(&role_id)?;
        let proficiencies = self.repo.fetch_latest_proficiencies(employee_id, &role_id)?;
        let assessment = evaluate_self_assessment(&requirements, &proficiencies);
        let (_, learning) = self.learning_snapshot(employee_id)?;
        let gate = test_gate(assessment.status, learning);
        debug!(employee_id, role_id = %role_id, fallback = target.is_fallback(), ?gate, "test gate");

        Ok(TestContext {
            target,
            requirements,
            gate,
        })
    }

    fn questions_for(&self, skill_id: &str) -> Result<Vec<Question>> {
        let questions = self.repo.fetch_questions(skill_id)?;
        if questions.is_empty() {
            return Err(CmError::NotFound(format!("questions for skill {skill_id}")));
        }
        Ok(questions)
    }

    fn eligibility_for(&self, employee_id: &str, current_role: &Role, roles: &[Role]) -> Result<PromotionEligibility> {
        let target = GatingTarget::resolve(current_role, roles);
        let requirements = self.repo.fetch_role_requirements(&target.role().id)?;
        let mut attempts: Vec<TestAttempt> = Vec::new();
        for requirement in requirements.iter().filter(|r| r.testable) {
            attempts.extend(self.repo.fetch_test_attempts(
                employee_id,
                &requirement.skill_id,
                &target.role().id,
            )?);
        }
        Ok(PromotionEligibility::assess(target, &requirements, &attempts))
    }

    fn require_request(&self, request_id: &str) -> Result<PromotionRequest> {
        self.repo
            .fetch_promotion_request(request_id)?
            .ok_or_else(|| CmError::NotFound(format!("promotion request {request_id}")))
    }
}

fn find_role<'a>(roles: &'a [Role], role_id: &str) -> Result<&'a Role> {
    roles
        .iter()
        .find(|role| role.id == role_id)
        .ok_or_else(|| CmError::RoleNotFound(role_id.to_string()))
}

fn required_skill<'a>(ctx: &'a TestContext, skill_id: &str) -> Result<&'a SkillRequirement> {
    ctx.requirements
        .iter()
        .find(|r| r.skill_id == skill_id)
        .ok_or_else(|| {
            CmError::InvalidInput(format!(
                "skill '{skill_id}' is not required for '{}'",
                ctx.target.role().title
            ))
        })
}

/// Validate a rating sheet: every required skill exactly once, each in 1..=5.
fn rating_records(
    employee_id: &str,
    role_id: &str,
    requirements: &[SkillRequirement],
    ratings: &[SkillRating],
    now: DateTime<Utc>,
) -> Result<Vec<ProficiencyRecord>> {
    let required: HashSet<&str> = requirements.iter().map(|r| r.skill_id.as_str()).collect();
    let mut seen: HashSet<&str> = HashSet::with_capacity(ratings.len());

    for rating in ratings {
        check_proficiency(rating.rating, &format!("rating for '{}'", rating.skill_id))?;
        if !required.contains(rating.skill_id.as_str()) {
            return Err(CmError::InvalidInput(format!(
                "skill '{}' is not required for this role",
                rating.skill_id
            )));
        }
        if !seen.insert(rating.skill_id.as_str()) {
            return Err(CmError::InvalidInput(format!(
                "duplicate rating for skill '{}'",
                rating.skill_id
            )));
        }
    }

    if let Some(missing) = requirements
        .iter()
        .find(|r| !seen.contains(r.skill_id.as_str()))
    {
        return Err(CmError::InvalidInput(format!(
            "missing rating for '{}'",
            missing.skill_name
        )));
    }

    Ok(ratings
        .iter()
        .map(|rating| ProficiencyRecord {
            employee_id: employee_id.to_string(),
            role_id: role_id.to_string(),
            skill_id: rating.skill_id.clone(),
            self_rating: rating.rating,
            recorded_at: now,
        })
        .collect())
}
