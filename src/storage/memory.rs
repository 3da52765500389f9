//! In-memory repository for tests.
//!
//! Implements [`CompetencyRepository`] over plain vectors so the workflow
//! service can be exercised without SQLite. Batches are applied to a copy
//! of the state and swapped in only when every write succeeds.
//!
//! Error injection mirrors what a flaky store can do:
//!
//! ```rust,ignore
//! let repo = MemoryRepository::new();
//! repo.inject_error(ErrorInjection::Operation("persist".into()));
//! assert!(repo.persist(&WriteBatch::default()).is_err());
//!
//! // Retire lands, inserts are dropped, and the store still reports success.
//! repo.inject_error(ErrorInjection::PartialLearningWrite);
//! ```

use std::cell::RefCell;
use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::core::model::{
    LearningItem, LearningStatus, ProficiencyRecord, PromotionRequest, PromotionStatus, Question,
    Role, Skill, SkillRequirement, TestAttempt,
};
use crate::core::promotion::RoleAssignment;
use crate::error::{CmError, Result};
use crate::storage::repository::{CompetencyRepository, PersistReport, WriteBatch};

/// Error injection configuration for testing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorInjection {
    /// Fail every operation.
    All,

    /// Fail a specific operation (by trait method name).
    Operation(String),

    /// Fail reads and writes that concern one employee.
    Employee(String),

    /// Apply the retire step of a learning path write but silently drop
    /// the inserts.
    PartialLearningWrite,
}

#[derive(Debug, Clone)]
struct Assignment {
    employee_id: String,
    role_id: String,
    active: bool,
    assigned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    roles: Vec<Role>,
    skills: HashMap<String, Skill>,
    requirements: Vec<(String, String, u8)>,
    assignments: Vec<Assignment>,
    proficiencies: Vec<ProficiencyRecord>,
    attempts: Vec<TestAttempt>,
    items: Vec<LearningItem>,
    questions: Vec<Question>,
    requests: Vec<PromotionRequest>,
}

#[derive(Debug, Default)]
pub struct MemoryRepository {
    state: RefCell<MemoryState>,
    error_on: RefCell<Option<ErrorInjection>>,
}

impl MemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_role(&self, role: Role) {
        self.state.borrow_mut().roles.push(role);
    }

    pub fn add_skill(&self, skill: Skill) {
        self.state.borrow_mut().skills.insert(skill.id.clone(), skill);
    }

    /// Require `skill_id` for `role_id`, replacing an earlier level.
    pub fn require(&self, role_id: &str, skill_id: &str, level: u8) {
        let mut state = self.state.borrow_mut();
        state
            .requirements
            .retain(|(role, skill, _)| !(role == role_id && skill == skill_id));
        state
            .requirements
            .push((role_id.to_string(), skill_id.to_string(), level));
    }

    pub fn add_question(&self, question: Question) {
        self.state.borrow_mut().questions.push(question);
    }

    pub fn assign_role(&self, employee_id: &str, role_id: &str, at: DateTime<Utc>) {
        apply_assignment(&mut self.state.borrow_mut(), employee_id, role_id, at);
    }

    pub fn learning_items(&self) -> Vec<LearningItem> {
        self.state.borrow().items.clone()
    }

    pub fn attempts(&self) -> Vec<TestAttempt> {
        self.state.borrow().attempts.clone()
    }

    pub fn proficiencies(&self) -> Vec<ProficiencyRecord> {
        self.state.borrow().proficiencies.clone()
    }

    pub fn promotion_requests(&self) -> Vec<PromotionRequest> {
        self.state.borrow().requests.clone()
    }

    /// Every role ever assigned to the employee, oldest first.
    pub fn role_history(&self, employee_id: &str) -> Vec<RoleAssignment> {
        self.state
            .borrow()
            .assignments
            .iter()
            .filter(|a| a.employee_id == employee_id)
            .map(|a| RoleAssignment {
                employee_id: a.employee_id.clone(),
                role_id: a.role_id.clone(),
                assigned_at: a.assigned_at,
            })
            .collect()
    }

    pub fn inject_error(&self, injection: ErrorInjection) {
        *self.error_on.borrow_mut() = Some(injection);
    }

    pub fn clear_errors(&self) {
        *self.error_on.borrow_mut() = None;
    }

    fn check_error(&self, op: &str, employee_id: Option<&str>) -> Result<()> {
        match self.error_on.borrow().as_ref() {
            Some(ErrorInjection::All) => Err(CmError::Persist(format!("injected failure: {op}"))),
            Some(ErrorInjection::Operation(target)) if target == op => {
                Err(CmError::Persist(format!("injected failure: {op}")))
            }
            Some(ErrorInjection::Employee(target)) if Some(target.as_str()) == employee_id => Err(
                CmError::Persist(format!("injected failure: {op}: {target}")),
            ),
            _ => Ok(()),
        }
    }

    fn partial_learning_write(&self) -> bool {
        matches!(
            self.error_on.borrow().as_ref(),
            Some(ErrorInjection::PartialLearningWrite)
        )
    }
}

impl CompetencyRepository for MemoryRepository {
    fn fetch_active_role(&self, employee_id: &str) -> Result<Option<Role>> {
        self.check_error("fetch_active_role", Some(employee_id))?;
        let state = self.state.borrow();
        let role = state
            .assignments
            .iter()
            .find(|a| a.active && a.employee_id == employee_id)
            .and_then(|a| state.roles.iter().find(|r| r.id == a.role_id))
            .cloned();
        Ok(role)
    }

    fn fetch_roles(&self) -> Result<Vec<Role>> {
        self.check_error("fetch_roles", None)?;
        let mut roles = self.state.borrow().roles.clone();
        roles.sort_by(|a, b| (&a.title, &a.id).cmp(&(&b.title, &b.id)));
        Ok(roles)
    }

    fn fetch_role_requirements(&self, role_id: &str) -> Result<Vec<SkillRequirement>> {
        self.check_error("fetch_role_requirements", None)?;
        let state = self.state.borrow();
        let mut requirements: Vec<SkillRequirement> = state
            .requirements
            .iter()
            .filter(|(role, _, _)| role == role_id)
            .filter_map(|(role, skill_id, level)| {
                let skill = state.skills.get(skill_id)?;
                Some(SkillRequirement {
                    role_id: role.clone(),
                    skill_id: skill.id.clone(),
                    skill_name: skill.name.clone(),
                    category: skill.category,
                    required_level: *level,
                    testable: state.questions.iter().any(|q| &q.skill_id == skill_id),
                })
            })
            .collect();
        requirements.sort_by(|a, b| (&a.skill_name, &a.skill_id).cmp(&(&b.skill_name, &b.skill_id)));
        Ok(requirements)
    }

    fn fetch_latest_proficiencies(&self, employee_id: &str, role_id: &str) -> Result<Vec<ProficiencyRecord>> {
        self.check_error("fetch_latest_proficiencies", Some(employee_id))?;
        let state = self.state.borrow();
        let mut latest: HashMap<&str, &ProficiencyRecord> = HashMap::new();
        for record in state
            .proficiencies
            .iter()
            .filter(|r| r.employee_id == employee_id && r.role_id == role_id)
        {
            let slot = latest.entry(record.skill_id.as_str()).or_insert(record);
            if record.recorded_at >= slot.recorded_at {
                *slot = record;
            }
        }
        let mut records: Vec<ProficiencyRecord> = latest.into_values().cloned().collect();
        records.sort_by(|a, b| a.skill_id.cmp(&b.skill_id));
        Ok(records)
    }

    fn fetch_test_attempts(&self, employee_id: &str, skill_id: &str, role_id: &str) -> Result<Vec<TestAttempt>> {
        self.check_error("fetch_test_attempts", Some(employee_id))?;
        let mut attempts: Vec<TestAttempt> = self
            .state
            .borrow()
            .attempts
            .iter()
            .filter(|a| a.employee_id == employee_id && a.skill_id == skill_id && a.role_id == role_id)
            .cloned()
            .collect();
        attempts.sort_by(|a, b| b.attempted_at.cmp(&a.attempted_at).then_with(|| b.id.cmp(&a.id)));
        Ok(attempts)
    }

    fn fetch_active_learning_items(&self, employee_id: &str) -> Result<Vec<LearningItem>> {
        self.check_error("fetch_active_learning_items", Some(employee_id))?;
        let mut items: Vec<LearningItem> = self
            .state
            .borrow()
            .items
            .iter()
            .filter(|i| i.employee_id == employee_id && i.status == LearningStatus::Active)
            .cloned()
            .collect();
        items.sort_by(|a, b| (a.created_at, &a.title, &a.id).cmp(&(b.created_at, &b.title, &b.id)));
        Ok(items)
    }

    fn fetch_latest_learning_item(&self, employee_id: &str) -> Result<Option<LearningItem>> {
        self.check_error("fetch_latest_learning_item", Some(employee_id))?;
        Ok(self
            .state
            .borrow()
            .items
            .iter()
            .filter(|i| i.employee_id == employee_id)
            .max_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)))
            .cloned())
    }

    fn fetch_questions(&self, skill_id: &str) -> Result<Vec<Question>> {
        self.check_error("fetch_questions", None)?;
        Ok(self
            .state
            .borrow()
            .questions
            .iter()
            .filter(|q| q.skill_id == skill_id)
            .cloned()
            .collect())
    }

    fn fetch_promotion_requests(&self, employee_id: &str) -> Result<Vec<PromotionRequest>> {
        self.check_error("fetch_promotion_requests", Some(employee_id))?;
        let mut requests: Vec<PromotionRequest> = self
            .state
            .borrow()
            .requests
            .iter()
            .filter(|r| r.employee_id == employee_id)
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.requested_at.cmp(&a.requested_at).then_with(|| b.id.cmp(&a.id)));
        Ok(requests)
    }

    fn fetch_promotion_request(&self, request_id: &str) -> Result<Option<PromotionRequest>> {
        self.check_error("fetch_promotion_request", None)?;
        Ok(self
            .state
            .borrow()
            .requests
            .iter()
            .find(|r| r.id == request_id)
            .cloned())
    }

    fn persist(&self, batch: &WriteBatch) -> Result<PersistReport> {
        let employee = batch_employee(batch);
        self.check_error("persist", employee)?;

        let mut next = self.state.borrow().clone();
        let report = apply_batch(&mut next, batch, self.partial_learning_write())?;
        *self.state.borrow_mut() = next;
        Ok(report)
    }
}

/// The employee a batch concerns, for employee-scoped error injection.
fn batch_employee(batch: &WriteBatch) -> Option<&str> {
    batch
        .insert_proficiencies
        .first()
        .map(|r| r.employee_id.as_str())
        .or(batch.retire_active_items.as_deref())
        .or_else(|| batch.insert_items.first().map(|i| i.employee_id.as_str()))
        .or_else(|| batch.set_item_completed.as_ref().map(|c| c.employee_id.as_str()))
        .or_else(|| batch.complete_active_path.as_ref().map(|c| c.employee_id.as_str()))
        .or_else(|| batch.insert_attempt.as_ref().map(|a| a.employee_id.as_str()))
        .or_else(|| batch.insert_promotion_request.as_ref().map(|r| r.employee_id.as_str()))
        .or_else(|| batch.assign_role.as_ref().map(|a| a.employee_id.as_str()))
}

fn apply_batch(state: &mut MemoryState, batch: &WriteBatch, drop_inserts: bool) -> Result<PersistReport> {
    let mut report = PersistReport::default();

    state.proficiencies.extend(batch.insert_proficiencies.iter().cloned());
    report.proficiencies_inserted = batch.insert_proficiencies.len();

    if let Some(employee_id) = &batch.retire_active_items {
        for item in state
            .items
            .iter_mut()
            .filter(|i| &i.employee_id == employee_id && i.status == LearningStatus::Active)
        {
            item.status = LearningStatus::Completed;
            report.items_retired += 1;
        }
    }

    if !drop_inserts {
        for item in &batch.insert_items {
            if state.items.iter().any(|existing| existing.id == item.id) {
                return Err(CmError::Persist(format!("duplicate learning item {}", item.id)));
            }
            state.items.push(item.clone());
            report.items_inserted += 1;
        }
    }

    if let Some(toggle) = &batch.set_item_completed {
        let item = state
            .items
            .iter_mut()
            .find(|i| {
                i.id == toggle.item_id
                    && i.employee_id == toggle.employee_id
                    && i.status == LearningStatus::Active
            })
            .ok_or_else(|| CmError::NotFound(format!("active learning item {}", toggle.item_id)))?;
        item.completed = toggle.completed;
        report.items_updated = 1;
    }

    if let Some(completion) = &batch.complete_active_path {
        for item in state.items.iter_mut().filter(|i| {
            i.employee_id == completion.employee_id && i.status == LearningStatus::Active
        }) {
            item.status = LearningStatus::Completed;
            item.completed_at = Some(completion.completed_at);
            report.items_completed += 1;
        }
    }

    if let Some(attempt) = &batch.insert_attempt {
        state.attempts.push(attempt.clone());
        report.attempts_inserted = 1;
    }

    if let Some(request) = &batch.insert_promotion_request {
        let pending_exists = state.requests.iter().any(|r| {
            r.employee_id == request.employee_id && r.status == PromotionStatus::Pending
        });
        if pending_exists && request.status == PromotionStatus::Pending {
            return Err(CmError::Persist(format!(
                "employee {} already has a pending promotion request",
                request.employee_id
            )));
        }
        state.requests.push(request.clone());
        report.requests_inserted = 1;
    }

    if let Some(review) = &batch.review_promotion {
        let request = state
            .requests
            .iter_mut()
            .find(|r| r.id == review.request_id && r.status == PromotionStatus::Pending)
            .ok_or_else(|| {
                CmError::ValidationFailed(format!(
                    "promotion request {} is no longer pending",
                    review.request_id
                ))
            })?;
        request.status = review.status;
        request.reviewed_at = Some(review.reviewed_at);
        report.requests_reviewed = 1;
    }

    if let Some(assignment) = &batch.assign_role {
        apply_assignment(state, &assignment.employee_id, &assignment.role_id, assignment.assigned_at);
        report.roles_assigned = 1;
    }

    Ok(report)
}

fn apply_assignment(state: &mut MemoryState, employee_id: &str, role_id: &str, at: DateTime<Utc>) {
    for assignment in state
        .assignments
        .iter_mut()
        .filter(|a| a.employee_id == employee_id)
    {
        assignment.active = false;
    }
    state.assignments.push(Assignment {
        employee_id: employee_id.to_string(),
        role_id: role_id.to_string(),
        active: true,
        assigned_at: at,
    });
}
