//! Competency workflow engine.
//!
//! Pure rules over immutable snapshots. Functions here never touch storage;
//! they return values and write plans for the caller to persist.

pub mod eligibility;
pub mod gates;
pub mod governor;
pub mod learning;
pub mod model;
pub mod progression;
pub mod promotion;

pub use eligibility::{
    AssessmentEvaluation, AssessmentStatus, EligibilityResult, SkillGap, TestEvaluation,
    TestSkillOutcome, evaluate, evaluate_self_assessment, evaluate_tests,
};
pub use gates::{Gate, LockReason, assessment_gate, test_gate};
pub use governor::{
    Answer, AttemptOutcome, AttemptState, AttemptSubject, Grade, PresentedOption,
    PresentedQuestion, TestAttemptGovernor, TestPolicy, present_questions,
};
pub use learning::{LearningPathGenerator, LearningPathPlan, PathStatus, path_status, resource_slug};
pub use model::{
    Employee, LearningItem, LearningStatus, ProficiencyRecord, PromotionRequest, PromotionStatus,
    Question, QuestionOption, Role, RoleLevel, Skill, SkillCategory, SkillRequirement, TestAttempt,
};
pub use progression::{GatingTarget, resolve_next_role, role_family};
pub use promotion::{
    PromotionEligibility, PromotionReview, ReviewDecision, ReviewPlan, RoleAssignment,
    latest_request, plan_request, plan_review,
};
