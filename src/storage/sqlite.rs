//! SQLite database layer

use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::core::model::{
    Employee, LearningItem, ProficiencyRecord, PromotionRequest, PromotionStatus, Question,
    QuestionOption, Role, RoleLevel, Skill, SkillCategory, SkillRequirement, TestAttempt,
    check_proficiency,
};
use crate::core::promotion::RoleAssignment;
use crate::error::{CmError, Result};
use crate::storage::migrations;
use crate::storage::repository::{CompetencyRepository, PersistReport, WriteBatch};

/// SQLite database wrapper for the competency catalog and workflow history
pub struct Database {
    conn: Connection,
    schema_version: u32,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("schema_version", &self.schema_version)
            .finish_non_exhaustive()
    }
}

/// An employee with their active role, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeSummary {
    pub employee: Employee,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewOption {
    pub text: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub employees: u64,
    pub pending_promotions: u64,
    pub roles: u64,
    pub passed_tests: u64,
}

const ROLE_COLUMNS: &str = "r.id, r.title, r.level, r.description";
const ITEM_COLUMNS: &str = "id, employee_id, role_id, skill_id, title, resource_url, completed, \
                            status, created_at, completed_at";
const REQUEST_COLUMNS: &str =
    "id, employee_id, current_role_id, requested_role_id, status, requested_at, reviewed_at";
const ATTEMPT_COLUMNS: &str = "id, employee_id, skill_id, role_id, score, passed, attempted_at";

impl Database {
    /// Open database at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open a private in-memory database with the full schema.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        Self::configure_pragmas(&conn)?;
        let schema_version = migrations::run_migrations(&conn)?;
        debug!(schema_version, "database ready");

        Ok(Self {
            conn,
            schema_version,
        })
    }

    pub const fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Current schema version after migrations.
    pub const fn schema_version(&self) -> u32 {
        self.schema_version
    }

    // =========================================================================
    // DIRECTORY
    // =========================================================================

    pub fn add_employee(
        &self,
        id: Option<&str>,
        full_name: &str,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<Employee> {
        let full_name = required_text(full_name, "employee name")?;
        let email = required_text(email, "email")?;
        if !email.contains('@') {
            return Err(CmError::InvalidInput(format!("'{email}' is not an email address")));
        }

        let employee = Employee {
            id: mint_id(id)?,
            full_name,
            email,
            created_at: now,
        };
        self.conn.execute(
            "INSERT INTO employees (id, full_name, email, created_at) VALUES (?, ?, ?, ?)",
            params![employee.id, employee.full_name, employee.email, ts(now)],
        )?;
        Ok(employee)
    }

    pub fn get_employee(&self, id: &str) -> Result<Option<Employee>> {
        let employee = self
            .conn
            .query_row(
                "SELECT id, full_name, email, created_at FROM employees WHERE id = ?",
                [id],
                employee_from_row,
            )
            .optional()?;
        Ok(employee)
    }

    pub fn require_employee(&self, id: &str) -> Result<Employee> {
        self.get_employee(id)?
            .ok_or_else(|| CmError::EmployeeNotFound(id.to_string()))
    }

    pub fn list_employees(&self) -> Result<Vec<EmployeeSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT e.id, e.full_name, e.email, e.created_at, r.id, r.title, r.level, r.description
             FROM employees e
             LEFT JOIN employee_roles er ON er.employee_id = e.id AND er.is_active = 1
             LEFT JOIN job_roles r ON r.id = er.role_id
             ORDER BY e.full_name, e.id",
        )?;
        let rows = stmt.query_map([], |row| {
            let employee = employee_from_row(row)?;
            let role_id: Option<String> = row.get(4)?;
            let role = match role_id {
                Some(id) => Some(Role {
                    id,
                    title: row.get(5)?,
                    level: parse_column(row, 6)?,
                    description: row.get(7)?,
                }),
                None => None,
            };
            Ok(EmployeeSummary { employee, role })
        })?;
        collect_rows(rows)
    }

    pub fn add_role(
        &self,
        id: Option<&str>,
        title: &str,
        level: RoleLevel,
        description: &str,
    ) -> Result<Role> {
        let role = Role {
            id: mint_id(id)?,
            title: required_text(title, "role title")?,
            level,
            description: description.trim().to_string(),
        };
        self.conn.execute(
            "INSERT INTO job_roles (id, title, level, description) VALUES (?, ?, ?, ?)",
            params![role.id, role.title, role.level.as_str(), role.description],
        )?;
        Ok(role)
    }

    pub fn get_role(&self, id: &str) -> Result<Option<Role>> {
        let role = self
            .conn
            .query_row(
                &format!("SELECT {ROLE_COLUMNS} FROM job_roles r WHERE r.id = ?"),
                [id],
                role_from_row,
            )
            .optional()?;
        Ok(role)
    }

    pub fn require_role(&self, id: &str) -> Result<Role> {
        self.get_role(id)?
            .ok_or_else(|| CmError::RoleNotFound(id.to_string()))
    }

    pub fn add_skill(&self, id: Option<&str>, name: &str, category: SkillCategory) -> Result<Skill> {
        let skill = Skill {
            id: mint_id(id)?,
            name: required_text(name, "skill name")?,
            category,
        };
        self.conn.execute(
            "INSERT INTO skills (id, name, category) VALUES (?, ?, ?)",
            params![skill.id, skill.name, skill.category.as_str()],
        )?;
        Ok(skill)
    }

    pub fn get_skill(&self, id: &str) -> Result<Option<Skill>> {
        let skill = self
            .conn
            .query_row(
                "SELECT id, name, category FROM skills WHERE id = ?",
                [id],
                skill_from_row,
            )
            .optional()?;
        Ok(skill)
    }

    pub fn require_skill(&self, id: &str) -> Result<Skill> {
        self.get_skill(id)?
            .ok_or_else(|| CmError::SkillNotFound(id.to_string()))
    }

    pub fn list_skills(&self) -> Result<Vec<Skill>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, category FROM skills ORDER BY name, id")?;
        let rows = stmt.query_map([], skill_from_row)?;
        collect_rows(rows)
    }

    /// Require `skill_id` for `role_id` at `level`, replacing any earlier level.
    pub fn set_requirement(&self, role_id: &str, skill_id: &str, level: u8) -> Result<()> {
        check_proficiency(level, "required level")?;
        self.require_role(role_id)?;
        self.require_skill(skill_id)?;
        self.conn.execute(
            "INSERT INTO role_skills (role_id, skill_id, required_level) VALUES (?, ?, ?)
             ON CONFLICT(role_id, skill_id) DO UPDATE SET required_level = excluded.required_level",
            params![role_id, skill_id, level],
        )?;
        Ok(())
    }

    /// Returns whether a requirement was removed.
    pub fn remove_requirement(&self, role_id: &str, skill_id: &str) -> Result<bool> {
        let removed = self.conn.execute(
            "DELETE FROM role_skills WHERE role_id = ? AND skill_id = ?",
            params![role_id, skill_id],
        )?;
        Ok(removed > 0)
    }

    /// Add a multiple-choice question. Exactly one option must be correct.
    pub fn add_question(
        &self,
        skill_id: &str,
        text: &str,
        difficulty: &str,
        options: &[NewOption],
        now: DateTime<Utc>,
    ) -> Result<Question> {
        self.require_skill(skill_id)?;
        let text = required_text(text, "question text")?;
        if options.len() < 2 {
            return Err(CmError::InvalidInput(
                "a question needs at least two options".to_string(),
            ));
        }
        let correct = options.iter().filter(|o| o.is_correct).count();
        if correct != 1 {
            return Err(CmError::InvalidInput(format!(
                "a question needs exactly one correct option, got {correct}"
            )));
        }
        let difficulty = match difficulty.trim() {
            "" => "medium".to_string(),
            other => other.to_lowercase(),
        };

        let question = Question {
            id: Uuid::new_v4().to_string(),
            skill_id: skill_id.to_string(),
            text,
            difficulty,
            options: options
                .iter()
                .map(|o| {
                    Ok(QuestionOption {
                        id: Uuid::new_v4().to_string(),
                        text: required_text(&o.text, "option text")?,
                        is_correct: o.is_correct,
                    })
                })
                .collect::<Result<Vec<_>>>()?,
        };

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO questions (id, skill_id, text, difficulty, created_at) VALUES (?, ?, ?, ?, ?)",
            params![question.id, question.skill_id, question.text, question.difficulty, ts(now)],
        )?;
        for (position, option) in (0_i64..).zip(&question.options) {
            tx.execute(
                "INSERT INTO question_options (id, question_id, text, is_correct, position)
                 VALUES (?, ?, ?, ?, ?)",
                params![option.id, question.id, option.text, option.is_correct, position],
            )?;
        }
        tx.commit()?;
        Ok(question)
    }

    /// Make `role_id` the employee's only active role.
    pub fn assign_role(&self, employee_id: &str, role_id: &str, now: DateTime<Utc>) -> Result<RoleAssignment> {
        self.require_employee(employee_id)?;
        self.require_role(role_id)?;
        let assignment = RoleAssignment {
            employee_id: employee_id.to_string(),
            role_id: role_id.to_string(),
            assigned_at: now,
        };
        let batch = WriteBatch {
            assign_role: Some(assignment.clone()),
            ..WriteBatch::default()
        };
        self.persist(&batch)?;
        Ok(assignment)
    }

    /// Pending promotion requests, oldest first.
    pub fn list_pending_promotions(&self) -> Result<Vec<PromotionRequest>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {REQUEST_COLUMNS} FROM promotion_requests
             WHERE status = 'pending' ORDER BY requested_at, id"
        ))?;
        let rows = stmt.query_map([], request_from_row)?;
        collect_rows(rows)
    }

    pub fn stats(&self) -> Result<DashboardStats> {
        Ok(DashboardStats {
            employees: self.count("SELECT COUNT(*) FROM employees")?,
            pending_promotions: self
                .count("SELECT COUNT(*) FROM promotion_requests WHERE status = 'pending'")?,
            roles: self.count("SELECT COUNT(*) FROM job_roles")?,
            passed_tests: self.count("SELECT COUNT(*) FROM test_attempts WHERE passed = 1")?,
        })
    }

    fn count(&self, sql: &str) -> Result<u64> {
        let count: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    /// Run SQLite integrity check
    pub fn integrity_check(&self) -> Result<bool> {
        let result: String = self
            .conn
            .query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
        Ok(result == "ok")
    }

    fn configure_pragmas(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA temp_store = MEMORY;
             PRAGMA foreign_keys = ON;",
        )?;
        Ok(())
    }
}

impl CompetencyRepository for Database {
    fn fetch_active_role(&self, employee_id: &str) -> Result<Option<Role>> {
        let role = self
            .conn
            .query_row(
                &format!(
                    "SELECT {ROLE_COLUMNS} FROM employee_roles er
                     JOIN job_roles r ON r.id = er.role_id
                     WHERE er.employee_id = ? AND er.is_active = 1"
                ),
                [employee_id],
                role_from_row,
            )
            .optional()?;
        Ok(role)
    }

    fn fetch_roles(&self) -> Result<Vec<Role>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ROLE_COLUMNS} FROM job_roles r ORDER BY r.title, r.id"
        ))?;
        let rows = stmt.query_map([], role_from_row)?;
        collect_rows(rows)
    }

    fn fetch_role_requirements(&self, role_id: &str) -> Result<Vec<SkillRequirement>> {
        let mut stmt = self.conn.prepare(
            "SELECT rs.role_id, rs.skill_id, s.name, s.category, rs.required_level,
                    EXISTS (SELECT 1 FROM questions q WHERE q.skill_id = rs.skill_id)
             FROM role_skills rs
             JOIN skills s ON s.id = rs.skill_id
             WHERE rs.role_id = ?
             ORDER BY s.name, s.id",
        )?;
        let rows = stmt.query_map([role_id], requirement_from_row)?;
        collect_rows(rows)
    }

    fn fetch_latest_proficiencies(&self, employee_id: &str, role_id: &str) -> Result<Vec<ProficiencyRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT a.employee_id, a.role_id, a.skill_id, a.self_rating, a.recorded_at
             FROM skill_assessments a
             WHERE a.employee_id = ?1 AND a.role_id = ?2
               AND a.recorded_at = (
                   SELECT MAX(b.recorded_at) FROM skill_assessments b
                   WHERE b.employee_id = a.employee_id
                     AND b.role_id = a.role_id
                     AND b.skill_id = a.skill_id)
             ORDER BY a.skill_id",
        )?;
        let rows = stmt.query_map(params![employee_id, role_id], proficiency_from_row)?;
        collect_rows(rows)
    }

    fn fetch_test_attempts(&self, employee_id: &str, skill_id: &str, role_id: &str) -> Result<Vec<TestAttempt>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ATTEMPT_COLUMNS} FROM test_attempts
             WHERE employee_id = ? AND skill_id = ? AND role_id = ?
             ORDER BY attempted_at DESC, id DESC"
        ))?;
        let rows = stmt.query_map(params![employee_id, skill_id, role_id], attempt_from_row)?;
        collect_rows(rows)
    }

    fn fetch_active_learning_items(&self, employee_id: &str) -> Result<Vec<LearningItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ITEM_COLUMNS} FROM learning_paths
             WHERE employee_id = ? AND status = 'active'
             ORDER BY created_at, title, id"
        ))?;
        let rows = stmt.query_map([employee_id], item_from_row)?;
        collect_rows(rows)
    }

    fn fetch_latest_learning_item(&self, employee_id: &str) -> Result<Option<LearningItem>> {
        let item = self
            .conn
            .query_row(
                &format!(
                    "SELECT {ITEM_COLUMNS} FROM learning_paths
                     WHERE employee_id = ?
                     ORDER BY created_at DESC, id DESC LIMIT 1"
                ),
                [employee_id],
                item_from_row,
            )
            .optional()?;
        Ok(item)
    }

    fn fetch_questions(&self, skill_id: &str) -> Result<Vec<Question>> {
        let mut question_stmt = self.conn.prepare(
            "SELECT id, skill_id, text, difficulty FROM questions
             WHERE skill_id = ? ORDER BY created_at, id",
        )?;
        let mut option_stmt = self.conn.prepare(
            "SELECT id, text, is_correct FROM question_options
             WHERE question_id = ? ORDER BY position",
        )?;

        let rows = question_stmt.query_map([skill_id], |row| {
            Ok(Question {
                id: row.get(0)?,
                skill_id: row.get(1)?,
                text: row.get(2)?,
                difficulty: row.get(3)?,
                options: Vec::new(),
            })
        })?;
        let mut questions = collect_rows(rows)?;

        for question in &mut questions {
            let options = option_stmt.query_map([&question.id], |row| {
                Ok(QuestionOption {
                    id: row.get(0)?,
                    text: row.get(1)?,
                    is_correct: row.get(2)?,
                })
            })?;
            question.options = collect_rows(options)?;
        }
        Ok(questions)
    }

    fn fetch_promotion_requests(&self, employee_id: &str) -> Result<Vec<PromotionRequest>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {REQUEST_COLUMNS} FROM promotion_requests
             WHERE employee_id = ? ORDER BY requested_at DESC, id DESC"
        ))?;
        let rows = stmt.query_map([employee_id], request_from_row)?;
        collect_rows(rows)
    }

    fn fetch_promotion_request(&self, request_id: &str) -> Result<Option<PromotionRequest>> {
        let request = self
            .conn
            .query_row(
                &format!("SELECT {REQUEST_COLUMNS} FROM promotion_requests WHERE id = ?"),
                [request_id],
                request_from_row,
            )
            .optional()?;
        Ok(request)
    }

    fn persist(&self, batch: &WriteBatch) -> Result<PersistReport> {
        let tx = self.conn.unchecked_transaction()?;
        let report = apply_batch(&tx, batch)?;
        tx.commit()?;
        debug!(?report, "write batch committed");
        Ok(report)
    }
}

/// Apply every field of `batch` on `conn`. The caller owns the transaction.
fn apply_batch(conn: &Connection, batch: &WriteBatch) -> Result<PersistReport> {
    let mut report = PersistReport::default();

    for record in &batch.insert_proficiencies {
        report.proficiencies_inserted += conn.execute(
            "INSERT INTO skill_assessments (id, employee_id, role_id, skill_id, self_rating, recorded_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                Uuid::new_v4().to_string(),
                record.employee_id,
                record.role_id,
                record.skill_id,
                record.self_rating,
                ts(record.recorded_at),
            ],
        )?;
    }

    if let Some(employee_id) = &batch.retire_active_items {
        report.items_retired = conn.execute(
            "UPDATE learning_paths SET status = 'completed'
             WHERE employee_id = ? AND status = 'active'",
            [employee_id],
        )?;
    }

    for item in &batch.insert_items {
        report.items_inserted += conn.execute(
            &format!("INSERT INTO learning_paths ({ITEM_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"),
            params![
                item.id,
                item.employee_id,
                item.role_id,
                item.skill_id,
                item.title,
                item.resource_url,
                item.completed,
                item.status.as_str(),
                ts(item.created_at),
                item.completed_at.map(ts),
            ],
        )?;
    }

    if let Some(toggle) = &batch.set_item_completed {
        let updated = conn.execute(
            "UPDATE learning_paths SET completed = ?
             WHERE id = ? AND employee_id = ? AND status = 'active'",
            params![toggle.completed, toggle.item_id, toggle.employee_id],
        )?;
        if updated == 0 {
            return Err(CmError::NotFound(format!(
                "active learning item {}",
                toggle.item_id
            )));
        }
        report.items_updated = updated;
    }

    if let Some(completion) = &batch.complete_active_path {
        report.items_completed = conn.execute(
            "UPDATE learning_paths SET status = 'completed', completed_at = ?
             WHERE employee_id = ? AND status = 'active'",
            params![ts(completion.completed_at), completion.employee_id],
        )?;
    }

    if let Some(attempt) = &batch.insert_attempt {
        report.attempts_inserted = conn.execute(
            &format!("INSERT INTO test_attempts ({ATTEMPT_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?)"),
            params![
                attempt.id,
                attempt.employee_id,
                attempt.skill_id,
                attempt.role_id,
                attempt.score,
                attempt.passed,
                ts(attempt.attempted_at),
            ],
        )?;
    }

    if let Some(request) = &batch.insert_promotion_request {
        report.requests_inserted = conn.execute(
            &format!("INSERT INTO promotion_requests ({REQUEST_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?)"),
            params![
                request.id,
                request.employee_id,
                request.current_role_id,
                request.requested_role_id,
                request.status.as_str(),
                ts(request.requested_at),
                request.reviewed_at.map(ts),
            ],
        )?;
    }

    if let Some(review) = &batch.review_promotion {
        let updated = conn.execute(
            "UPDATE promotion_requests SET status = ?, reviewed_at = ?
             WHERE id = ? AND status = 'pending'",
            params![review.status.as_str(), ts(review.reviewed_at), review.request_id],
        )?;
        if updated == 0 {
            return Err(CmError::ValidationFailed(format!(
                "promotion request {} is no longer pending",
                review.request_id
            )));
        }
        report.requests_reviewed = updated;
    }

    if let Some(assignment) = &batch.assign_role {
        conn.execute(
            "UPDATE employee_roles SET is_active = 0 WHERE employee_id = ? AND is_active = 1",
            [&assignment.employee_id],
        )?;
        report.roles_assigned = conn.execute(
            "INSERT INTO employee_roles (id, employee_id, role_id, is_active, assigned_at)
             VALUES (?, ?, ?, 1, ?)",
            params![
                Uuid::new_v4().to_string(),
                assignment.employee_id,
                assignment.role_id,
                ts(assignment.assigned_at),
            ],
        )?;
    }

    Ok(report)
}

/// RFC 3339 with microseconds and a `Z` suffix, so text order is time order.
fn ts(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_ts(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|value| value.with_timezone(&Utc))
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

fn get_ts(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_ts(idx, &raw)
}

fn get_optional_ts(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|value| parse_ts(idx, &value)).transpose()
}

fn parse_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = CmError>,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|err: CmError| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

fn get_u8(row: &Row<'_>, idx: usize) -> rusqlite::Result<u8> {
    let value: i64 = row.get(idx)?;
    u8::try_from(value)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Integer, Box::new(err)))
}

fn collect_rows<T>(rows: impl Iterator<Item = rusqlite::Result<T>>) -> Result<Vec<T>> {
    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

fn mint_id(explicit: Option<&str>) -> Result<String> {
    match explicit.map(str::trim) {
        Some("") => Err(CmError::InvalidInput("id must not be blank".to_string())),
        Some(id) => Ok(id.to_string()),
        None => Ok(Uuid::new_v4().to_string()),
    }
}

fn required_text(value: &str, what: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CmError::InvalidInput(format!("{what} must not be empty")));
    }
    Ok(trimmed.to_string())
}

fn employee_from_row(row: &Row<'_>) -> rusqlite::Result<Employee> {
    Ok(Employee {
        id: row.get(0)?,
        full_name: row.get(1)?,
        email: row.get(2)?,
        created_at: get_ts(row, 3)?,
    })
}

fn role_from_row(row: &Row<'_>) -> rusqlite::Result<Role> {
    Ok(Role {
        id: row.get(0)?,
        title: row.get(1)?,
        level: parse_column(row, 2)?,
        description: row.get(3)?,
    })
}

fn skill_from_row(row: &Row<'_>) -> rusqlite::Result<Skill> {
    Ok(Skill {
        id: row.get(0)?,
        name: row.get(1)?,
        category: parse_column(row, 2)?,
    })
}

fn requirement_from_row(row: &Row<'_>) -> rusqlite::Result<SkillRequirement> {
    Ok(SkillRequirement {
        role_id: row.get(0)?,
        skill_id: row.get(1)?,
        skill_name: row.get(2)?,
        category: parse_column(row, 3)?,
        required_level: get_u8(row, 4)?,
        testable: row.get(5)?,
    })
}

fn proficiency_from_row(row: &Row<'_>) -> rusqlite::Result<ProficiencyRecord> {
    Ok(ProficiencyRecord {
        employee_id: row.get(0)?,
        role_id: row.get(1)?,
        skill_id: row.get(2)?,
        self_rating: get_u8(row, 3)?,
        recorded_at: get_ts(row, 4)?,
    })
}

fn attempt_from_row(row: &Row<'_>) -> rusqlite::Result<TestAttempt> {
    Ok(TestAttempt {
        id: row.get(0)?,
        employee_id: row.get(1)?,
        skill_id: row.get(2)?,
        role_id: row.get(3)?,
        score: get_u8(row, 4)?,
        passed: row.get(5)?,
        attempted_at: get_ts(row, 6)?,
    })
}

fn item_from_row(row: &Row<'_>) -> rusqlite::Result<LearningItem> {
    Ok(LearningItem {
        id: row.get(0)?,
        employee_id: row.get(1)?,
        role_id: row.get(2)?,
        skill_id: row.get(3)?,
        title: row.get(4)?,
        resource_url: row.get(5)?,
        completed: row.get(6)?,
        status: parse_column(row, 7)?,
        created_at: get_ts(row, 8)?,
        completed_at: get_optional_ts(row, 9)?,
    })
}

fn request_from_row(row: &Row<'_>) -> rusqlite::Result<PromotionRequest> {
    Ok(PromotionRequest {
        id: row.get(0)?,
        employee_id: row.get(1)?,
        current_role_id: row.get(2)?,
        requested_role_id: row.get(3)?,
        status: parse_column::<PromotionStatus>(row, 4)?,
        requested_at: get_ts(row, 5)?,
        reviewed_at: get_optional_ts(row, 6)?,
    })
}
