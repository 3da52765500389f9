use std::path::PathBuf;

use chrono::{DateTime, Duration, TimeZone, Utc};
use tempfile::TempDir;

use competency::core::{Answer, RoleLevel, SkillCategory};
use competency::service::CompetencyService;
use competency::storage::{CompetencyRepository, Database, NewOption};

/// Fixed clock origin for every workflow test.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap()
}

pub fn at(hours: i64) -> DateTime<Utc> {
    t0() + Duration::hours(hours)
}

/// A database file in a private temp directory.
pub struct Fixture {
    _dir: TempDir,
    pub db_path: PathBuf,
    pub db: Database,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("competency.db");
        let db = Database::open(&db_path).unwrap();
        Self {
            _dir: dir,
            db_path,
            db,
        }
    }

    /// Backend track with three levels.
    ///
    /// Mid requires Rust 3 (two questions) and Communication 3 (no
    /// questions, so not testable). Senior requires Rust 4.
    pub fn seeded() -> Self {
        let fixture = Self::new();
        let db = &fixture.db;
        db.add_role(Some("jr"), "Junior Backend Engineer", RoleLevel::Junior, "")
            .unwrap();
        db.add_role(Some("mid"), "Mid-Level Backend Engineer", RoleLevel::Mid, "")
            .unwrap();
        db.add_role(Some("sr"), "Senior Backend Engineer", RoleLevel::Senior, "")
            .unwrap();
        db.add_skill(Some("rust"), "Rust", SkillCategory::Technical).unwrap();
        db.add_skill(Some("comms"), "Communication", SkillCategory::Soft).unwrap();
        db.set_requirement("mid", "rust", 3).unwrap();
        db.set_requirement("mid", "comms", 3).unwrap();
        db.set_requirement("sr", "rust", 4).unwrap();

        for (text, right) in [("Borrow checker runs at?", "compile time"), ("Box stores data on?", "heap")] {
            let options = [
                NewOption {
                    text: right.to_string(),
                    is_correct: true,
                },
                NewOption {
                    text: "never".to_string(),
                    is_correct: false,
                },
            ];
            db.add_question("rust", text, "easy", &options, t0()).unwrap();
        }
        fixture
    }

    pub fn service(&self) -> CompetencyService<&Database> {
        CompetencyService::new(&self.db)
    }

    pub fn hire(&self, employee_id: &str, role_id: &str) {
        let email = format!("{employee_id}@example.com");
        self.db
            .add_employee(Some(employee_id), employee_id, &email, t0())
            .unwrap();
        self.db.assign_role(employee_id, role_id, t0()).unwrap();
    }

    /// One answer per question, correct or not.
    pub fn answers(&self, skill_id: &str, correct: bool) -> Vec<Answer> {
        self.db
            .fetch_questions(skill_id)
            .unwrap()
            .iter()
            .map(|question| {
                let option = question
                    .options
                    .iter()
                    .find(|option| option.is_correct == correct)
                    .unwrap();
                Answer::new(question.id.clone(), option.id.clone())
            })
            .collect()
    }

    pub fn reopen(&self) -> Database {
        Database::open(&self.db_path).unwrap()
    }
}
