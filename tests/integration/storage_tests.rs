use competency::CmError;
use competency::core::{ProficiencyRecord, PromotionRequest, PromotionReview, PromotionStatus};
use competency::storage::{CompetencyRepository, NewOption, WriteBatch};

use crate::fixture::{Fixture, at, t0};

fn pending(id: &str) -> PromotionRequest {
    PromotionRequest {
        id: id.to_string(),
        employee_id: "e1".to_string(),
        current_role_id: "jr".to_string(),
        requested_role_id: "mid".to_string(),
        status: PromotionStatus::Pending,
        requested_at: t0(),
        reviewed_at: None,
    }
}

#[test]
fn second_pending_request_is_refused_by_the_store() {
    let fixture = Fixture::seeded();
    fixture.hire("e1", "jr");

    let first = WriteBatch {
        insert_promotion_request: Some(pending("p1")),
        ..WriteBatch::default()
    };
    fixture.db.persist(&first).unwrap();

    let second = WriteBatch {
        insert_promotion_request: Some(pending("p2")),
        ..WriteBatch::default()
    };
    assert!(fixture.db.persist(&second).is_err());
    assert_eq!(fixture.db.stats().unwrap().pending_promotions, 1);
    assert_eq!(fixture.db.fetch_promotion_requests("e1").unwrap().len(), 1);
}

#[test]
fn failed_batch_leaves_no_partial_writes() {
    let fixture = Fixture::seeded();
    fixture.hire("e1", "jr");

    let batch = WriteBatch {
        insert_proficiencies: vec![ProficiencyRecord {
            employee_id: "e1".to_string(),
            role_id: "mid".to_string(),
            skill_id: "rust".to_string(),
            self_rating: 4,
            recorded_at: t0(),
        }],
        review_promotion: Some(PromotionReview {
            request_id: "missing".to_string(),
            status: PromotionStatus::Approved,
            reviewed_at: t0(),
        }),
        ..WriteBatch::default()
    };
    let err = fixture.db.persist(&batch).unwrap_err();
    assert!(matches!(err, CmError::ValidationFailed(_)));
    assert!(fixture.db.fetch_latest_proficiencies("e1", "mid").unwrap().is_empty());
}

#[test]
fn reassignment_keeps_one_active_role() {
    let fixture = Fixture::seeded();
    fixture.hire("e1", "jr");
    fixture.db.assign_role("e1", "mid", at(1)).unwrap();
    fixture.db.assign_role("e1", "sr", at(2)).unwrap();

    assert_eq!(fixture.db.fetch_active_role("e1").unwrap().unwrap().id, "sr");
    let employees = fixture.db.list_employees().unwrap();
    assert_eq!(employees.len(), 1);
    assert_eq!(employees[0].role.as_ref().unwrap().id, "sr");
}

#[test]
fn requirement_upsert_and_testability() {
    let fixture = Fixture::seeded();
    fixture.db.set_requirement("mid", "rust", 5).unwrap();

    let requirements = fixture.db.fetch_role_requirements("mid").unwrap();
    assert_eq!(requirements.len(), 2);
    let rust = requirements.iter().find(|r| r.skill_id == "rust").unwrap();
    assert_eq!(rust.required_level, 5);
    assert!(rust.testable);
    let comms = requirements.iter().find(|r| r.skill_id == "comms").unwrap();
    assert!(!comms.testable);

    assert!(fixture.db.remove_requirement("mid", "comms").unwrap());
    assert!(!fixture.db.remove_requirement("mid", "comms").unwrap());
    assert_eq!(fixture.db.fetch_role_requirements("mid").unwrap().len(), 1);
}

#[test]
fn directory_rejects_bad_input() {
    let fixture = Fixture::seeded();

    let err = fixture.db.set_requirement("mid", "rust", 0).unwrap_err();
    assert!(matches!(err, CmError::InvalidInput(_)));
    let err = fixture.db.set_requirement("nope", "rust", 3).unwrap_err();
    assert!(matches!(err, CmError::RoleNotFound(_)));

    let two_right = [
        NewOption {
            text: "a".to_string(),
            is_correct: true,
        },
        NewOption {
            text: "b".to_string(),
            is_correct: true,
        },
    ];
    let err = fixture
        .db
        .add_question("rust", "Pick one", "", &two_right, t0())
        .unwrap_err();
    assert!(matches!(err, CmError::InvalidInput(_)));
    assert_eq!(fixture.db.fetch_questions("rust").unwrap().len(), 2);

    let err = fixture
        .db
        .add_employee(None, "No Mail", "not-an-email", t0())
        .unwrap_err();
    assert!(matches!(err, CmError::InvalidInput(_)));
}

#[test]
fn stats_count_the_directory() {
    let fixture = Fixture::seeded();
    fixture.hire("e1", "jr");
    fixture.hire("e2", "mid");

    let stats = fixture.db.stats().unwrap();
    assert_eq!(stats.employees, 2);
    assert_eq!(stats.roles, 3);
    assert_eq!(stats.pending_promotions, 0);
    assert_eq!(stats.passed_tests, 0);
}
