use rand::SeedableRng;
use rand::rngs::StdRng;

use competency::CmError;
use competency::core::{
    AssessmentStatus, AttemptState, Gate, LockReason, PathStatus, PromotionStatus, ReviewDecision,
};
use competency::service::SkillRating;
use competency::storage::CompetencyRepository;

use crate::fixture::{Fixture, at, t0};

fn ratings(rust: u8, comms: u8) -> Vec<SkillRating> {
    vec![SkillRating::new("rust", rust), SkillRating::new("comms", comms)]
}

#[test]
fn junior_reaches_mid_through_every_flow() {
    let fixture = Fixture::seeded();
    fixture.hire("e1", "jr");
    let service = fixture.service();

    let failed = service.submit_self_assessment("e1", &ratings(2, 3), t0()).unwrap();
    assert_eq!(failed.target.id, "mid");
    assert_eq!(failed.evaluation.status, AssessmentStatus::Failed);
    assert_eq!(failed.learning_items.len(), 1);
    assert_eq!(failed.learning_items[0].skill_id, "rust");
    assert_eq!(failed.report.items_inserted, 1);

    let catalog = service.test_catalog("e1", at(1)).unwrap();
    assert_eq!(catalog.gate, Gate::Locked(LockReason::LearningActive));
    assert!(catalog.skills.is_empty());

    let item_id = failed.learning_items[0].id.clone();
    let view = service.set_learning_item_completed("e1", &item_id, true).unwrap();
    assert!(view.all_completed);
    let done = service.complete_learning_path("e1", at(2)).unwrap();
    assert_eq!(done.items_completed, 1);
    assert_eq!(service.learning_path("e1").unwrap().status, PathStatus::Completed);

    let passed = service.submit_self_assessment("e1", &ratings(4, 3), at(3)).unwrap();
    assert_eq!(passed.evaluation.status, AssessmentStatus::Passed);
    assert!(passed.learning_items.is_empty());

    // Only Rust has questions, so it is the one testable skill.
    let catalog = service.test_catalog("e1", at(4)).unwrap();
    assert!(catalog.gate.is_open());
    assert!(!catalog.target.is_fallback());
    assert_eq!(catalog.skills.len(), 1);
    assert_eq!(catalog.skills[0].question_count, 2);

    let mut rng = StdRng::seed_from_u64(11);
    let session = service.start_test("e1", "rust", at(4), &mut rng).unwrap();
    assert_eq!(session.role_id, "mid");
    assert_eq!(session.questions.len(), 2);

    let outcome = service
        .submit_test("e1", "rust", &fixture.answers("rust", true), at(5))
        .unwrap();
    assert_eq!(outcome.attempt.score, 100);
    assert!(matches!(outcome.next_state, AttemptState::Passed { score: 100, .. }));

    let overview = service.promotion_status("e1").unwrap();
    assert!(overview.eligibility.eligible());
    assert!(overview.latest_request.is_none());

    let request = service.request_promotion("e1", "mid", at(6)).unwrap();
    assert_eq!(request.status, PromotionStatus::Pending);
    let details = service.review_details(&request.id).unwrap();
    assert_eq!(details.current_role.id, "jr");
    assert_eq!(details.eligibility.evaluation.passed_count, 1);

    let plan = service
        .review_promotion(&request.id, ReviewDecision::Approve, at(7))
        .unwrap();
    assert_eq!(plan.review.status, PromotionStatus::Approved);
    assert_eq!(fixture.db.fetch_active_role("e1").unwrap().unwrap().id, "mid");

    // The next step is senior, with nothing recorded against it yet.
    let overview = service.assessment_overview("e1").unwrap();
    assert_eq!(overview.target.unwrap().id, "sr");
    assert_eq!(overview.evaluation.unwrap().status, AssessmentStatus::None);
    assert!(overview.gate.is_open());
    assert!(!service.promotion_status("e1").unwrap().eligibility.eligible());
}

#[test]
fn state_survives_reopening_the_database() {
    let fixture = Fixture::seeded();
    fixture.hire("e1", "jr");
    fixture
        .service()
        .submit_self_assessment("e1", &ratings(1, 1), t0())
        .unwrap();

    let reopened = fixture.reopen();
    assert_eq!(reopened.schema_version(), 1);
    assert!(reopened.integrity_check().unwrap());
    let items = reopened.fetch_active_learning_items("e1").unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(reopened.fetch_latest_proficiencies("e1", "mid").unwrap().len(), 2);
}

#[test]
fn new_failure_replaces_the_finished_path() {
    let fixture = Fixture::seeded();
    fixture.hire("e1", "jr");
    let service = fixture.service();

    let first = service.submit_self_assessment("e1", &ratings(2, 2), t0()).unwrap();
    assert_eq!(first.learning_items.len(), 2);
    for item in &first.learning_items {
        service.set_learning_item_completed("e1", &item.id, true).unwrap();
    }
    service.complete_learning_path("e1", at(1)).unwrap();

    let second = service.submit_self_assessment("e1", &ratings(2, 4), at(2)).unwrap();
    assert_eq!(second.learning_items.len(), 1);
    assert_eq!(second.report.items_retired, 0);

    let active = fixture.db.fetch_active_learning_items("e1").unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].skill_id, "rust");
    assert!(!active[0].completed);
}

#[test]
fn locked_assessment_rejects_resubmission() {
    let fixture = Fixture::seeded();
    fixture.hire("e1", "jr");
    let service = fixture.service();

    service.submit_self_assessment("e1", &ratings(1, 5), t0()).unwrap();
    let err = service
        .submit_self_assessment("e1", &ratings(5, 5), at(1))
        .unwrap_err();
    assert!(matches!(err, CmError::Locked(_)));

    let err = service.complete_learning_path("e1", at(1)).unwrap_err();
    assert!(matches!(err, CmError::ValidationFailed(_)));
    let latest = fixture.db.fetch_latest_proficiencies("e1", "mid").unwrap();
    let rust = latest.iter().find(|p| p.skill_id == "rust").unwrap();
    assert_eq!(rust.self_rating, 1);
}

#[test]
fn failed_test_cools_down_for_a_day() {
    let fixture = Fixture::seeded();
    fixture.hire("e1", "jr");
    let service = fixture.service();
    service.submit_self_assessment("e1", &ratings(3, 3), t0()).unwrap();

    let outcome = service
        .submit_test("e1", "rust", &fixture.answers("rust", false), t0())
        .unwrap();
    assert_eq!(outcome.attempt.score, 0);
    assert!(!outcome.attempt.passed);

    let mut rng = StdRng::seed_from_u64(1);
    let err = service.start_test("e1", "rust", at(23), &mut rng).unwrap_err();
    assert!(matches!(err, CmError::AttemptNotAllowed { .. }));

    let session = service.start_test("e1", "rust", at(24), &mut rng).unwrap();
    assert_eq!(session.state, AttemptState::Ready);

    let retry = service
        .submit_test("e1", "rust", &fixture.answers("rust", true), at(24))
        .unwrap();
    assert!(retry.attempt.passed);
    let err = service
        .submit_test("e1", "rust", &fixture.answers("rust", true), at(48))
        .unwrap_err();
    assert!(matches!(err, CmError::AttemptNotAllowed { .. }));
}

#[test]
fn partial_answer_sheet_records_nothing() {
    let fixture = Fixture::seeded();
    fixture.hire("e1", "jr");
    let service = fixture.service();
    service.submit_self_assessment("e1", &ratings(3, 3), t0()).unwrap();

    let mut answers = fixture.answers("rust", true);
    answers.pop();
    let err = service.submit_test("e1", "rust", &answers, t0()).unwrap_err();
    assert!(matches!(
        err,
        CmError::IncompleteSubmission {
            answered: 1,
            expected: 2
        }
    ));
    assert!(fixture.db.fetch_test_attempts("e1", "rust", "mid").unwrap().is_empty());
}

#[test]
fn senior_without_next_role_falls_back_to_current_role() {
    let fixture = Fixture::seeded();
    fixture.hire("e9", "sr");
    let service = fixture.service();

    let err = service
        .submit_self_assessment("e9", &[SkillRating::new("rust", 5)], t0())
        .unwrap_err();
    assert!(matches!(err, CmError::ValidationFailed(_)));

    let catalog = service.test_catalog("e9", t0()).unwrap();
    assert!(catalog.target.is_fallback());
    assert_eq!(catalog.target.role().id, "sr");
    assert_eq!(catalog.gate, Gate::Locked(LockReason::AssessmentNeeded));
}

#[test]
fn rejection_keeps_the_current_role() {
    let fixture = Fixture::seeded();
    fixture.hire("e1", "jr");
    let service = fixture.service();
    service.submit_self_assessment("e1", &ratings(3, 3), t0()).unwrap();
    service
        .submit_test("e1", "rust", &fixture.answers("rust", true), at(1))
        .unwrap();

    let request = service.request_promotion("e1", "mid", at(2)).unwrap();
    let err = service.request_promotion("e1", "mid", at(3)).unwrap_err();
    assert!(matches!(err, CmError::ValidationFailed(_)));

    let plan = service
        .review_promotion(&request.id, ReviewDecision::Reject, at(4))
        .unwrap();
    assert_eq!(plan.review.status, PromotionStatus::Rejected);
    assert!(plan.assignment.is_none());
    assert_eq!(fixture.db.fetch_active_role("e1").unwrap().unwrap().id, "jr");

    let err = service
        .review_promotion(&request.id, ReviewDecision::Approve, at(5))
        .unwrap_err();
    assert!(matches!(err, CmError::ValidationFailed(_)));

    // A rejected request no longer blocks a new one.
    let again = service.request_promotion("e1", "mid", at(6)).unwrap();
    assert_eq!(again.status, PromotionStatus::Pending);
    assert_eq!(fixture.db.list_pending_promotions().unwrap().len(), 1);
}
