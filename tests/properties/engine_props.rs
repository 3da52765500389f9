use std::collections::HashSet;

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use competency::core::{
    Answer, AssessmentStatus, AttemptState, LearningPathGenerator, LearningStatus,
    ProficiencyRecord, Question, QuestionOption, Role, RoleLevel, SkillCategory, SkillRequirement,
    TestAttempt, TestAttemptGovernor, TestPolicy, evaluate_self_assessment, evaluate_tests,
    present_questions, resolve_next_role,
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 6, 8, 0, 0).unwrap()
}

// =============================================================================
// Strategies
// =============================================================================

fn level_strategy() -> impl Strategy<Value = RoleLevel> {
    prop_oneof![
        Just(RoleLevel::Junior),
        Just(RoleLevel::Mid),
        Just(RoleLevel::Senior),
        Just(RoleLevel::Lead),
        Just(RoleLevel::Manager),
    ]
}

fn prefix(level: RoleLevel) -> &'static str {
    match level {
        RoleLevel::Junior => "Junior ",
        RoleLevel::Mid => "Mid-Level ",
        RoleLevel::Senior => "Senior ",
        RoleLevel::Lead => "Lead ",
        RoleLevel::Manager => "Manager ",
    }
}

fn family_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "Backend Engineer",
        "Frontend Engineer",
        "Data Analyst",
        "QA Engineer",
    ])
    .prop_map(str::to_string)
}

fn roles_strategy() -> impl Strategy<Value = Vec<Role>> {
    prop::collection::vec((level_strategy(), family_strategy()), 1..12).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(idx, (level, family))| Role {
                id: format!("r{idx}"),
                title: format!("{}{family}", prefix(level)),
                level,
                description: String::new(),
            })
            .collect()
    })
}

/// Requirements for role `target` paired with a rating per skill.
fn rated_requirements() -> impl Strategy<Value = Vec<(u8, u8)>> {
    prop::collection::vec((1u8..=5, 1u8..=5), 1..8)
}

fn requirement(idx: usize, level: u8, testable: bool) -> SkillRequirement {
    SkillRequirement {
        role_id: "target".to_string(),
        skill_id: format!("s{idx}"),
        skill_name: format!("Skill {idx}"),
        category: SkillCategory::Technical,
        required_level: level,
        testable,
    }
}

fn question(idx: usize, option_count: usize) -> Question {
    Question {
        id: format!("q{idx}"),
        skill_id: "s".to_string(),
        text: format!("Question {idx}"),
        difficulty: "medium".to_string(),
        options: (0..option_count)
            .map(|opt| QuestionOption {
                id: format!("q{idx}-o{opt}"),
                text: format!("Option {opt}"),
                is_correct: opt == 0,
            })
            .collect(),
    }
}

fn attempt(passed: bool, offset_hours: i64) -> TestAttempt {
    TestAttempt {
        id: format!("a{offset_hours}"),
        employee_id: "e".to_string(),
        skill_id: "s".to_string(),
        role_id: "target".to_string(),
        score: if passed { 100 } else { 0 },
        passed,
        attempted_at: t0() + Duration::hours(offset_hours),
    }
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn next_role_is_one_level_up_in_the_same_family(roles in roles_strategy(), pick in any::<prop::sample::Index>()) {
        let current = pick.get(&roles).clone();
        match resolve_next_role(&current, &roles) {
            Some(next) => {
                prop_assert_eq!(Some(next.level), current.level.next());
                let family = current.title.trim_start_matches(prefix(current.level)).to_lowercase();
                prop_assert!(next.title.to_lowercase().contains(&family));
            }
            None => {
                if let Some(level) = current.level.next() {
                    let family = current.title.trim_start_matches(prefix(current.level));
                    let expected = format!("{}{family}", prefix(level));
                    prop_assert!(!roles.iter().any(|r| r.level == level && r.title == expected));
                }
            }
        }
    }

    #[test]
    fn top_levels_never_progress(roles in roles_strategy(), family in family_strategy()) {
        for level in [RoleLevel::Senior, RoleLevel::Lead, RoleLevel::Manager] {
            let current = Role {
                id: "me".to_string(),
                title: format!("{}{family}", prefix(level)),
                level,
                description: String::new(),
            };
            prop_assert!(resolve_next_role(&current, &roles).is_none());
        }
    }

    #[test]
    fn assessment_passes_only_when_every_rating_meets_its_level(pairs in rated_requirements()) {
        let requirements: Vec<SkillRequirement> = pairs
            .iter()
            .enumerate()
            .map(|(idx, (level, _))| requirement(idx, *level, true))
            .collect();
        let records: Vec<ProficiencyRecord> = pairs
            .iter()
            .enumerate()
            .map(|(idx, (_, rating))| ProficiencyRecord {
                employee_id: "e".to_string(),
                role_id: "target".to_string(),
                skill_id: format!("s{idx}"),
                self_rating: *rating,
                recorded_at: t0(),
            })
            .collect();

        let evaluation = evaluate_self_assessment(&requirements, &records);
        let below = pairs.iter().filter(|(level, rating)| rating < level).count();
        let expected = if below == 0 { AssessmentStatus::Passed } else { AssessmentStatus::Failed };
        prop_assert_eq!(evaluation.status, expected);
        prop_assert_eq!(evaluation.failed_skills().len(), below);
        for gap in &evaluation.skills {
            prop_assert_eq!(gap.gap, i16::from(gap.required) - i16::from(gap.actual));
        }
    }

    #[test]
    fn learning_plan_has_one_active_item_per_failed_skill(pairs in rated_requirements()) {
        let requirements: Vec<SkillRequirement> = pairs
            .iter()
            .enumerate()
            .map(|(idx, (level, _))| requirement(idx, *level, false))
            .collect();
        let records: Vec<ProficiencyRecord> = pairs
            .iter()
            .enumerate()
            .map(|(idx, (_, rating))| ProficiencyRecord {
                employee_id: "e".to_string(),
                role_id: "target".to_string(),
                skill_id: format!("s{idx}"),
                self_rating: *rating,
                recorded_at: t0(),
            })
            .collect();
        let failed = evaluate_self_assessment(&requirements, &records).failed_skills();

        let plan = LearningPathGenerator::new("https://learn.example/").generate("e", "target", &failed, t0());
        prop_assert_eq!(plan.insert.len(), failed.len());
        prop_assert_eq!(plan.retire.is_some(), !failed.is_empty());
        let skills: HashSet<&str> = plan.insert.iter().map(|item| item.skill_id.as_str()).collect();
        prop_assert_eq!(skills.len(), plan.insert.len());
        prop_assert!(plan.insert.iter().all(|item| item.status == LearningStatus::Active && !item.completed));
    }

    #[test]
    fn untestable_role_is_never_eligible(levels in prop::collection::vec(1u8..=5, 0..6), passes in any::<bool>()) {
        let requirements: Vec<SkillRequirement> = levels
            .iter()
            .enumerate()
            .map(|(idx, level)| requirement(idx, *level, false))
            .collect();
        let attempts = vec![attempt(passes, 0)];
        let evaluation = evaluate_tests(&requirements, &attempts);
        prop_assert!(!evaluation.eligible);
        prop_assert_eq!(evaluation.total_count, 0);
    }

    #[test]
    fn a_pass_is_permanent(
        fails_before in prop::collection::vec(0i64..100, 0..5),
        pass_at in 0i64..100,
        later in 0i64..10_000,
    ) {
        let governor = TestAttemptGovernor::new(TestPolicy::default());
        let mut attempts: Vec<TestAttempt> = fails_before.iter().map(|h| attempt(false, *h)).collect();
        attempts.push(attempt(true, pass_at));
        attempts.reverse();

        let now = t0() + Duration::hours(pass_at.max(fails_before.iter().copied().max().unwrap_or(0)) + later);
        let state = governor.state(&attempts, now);
        prop_assert!(matches!(state, AttemptState::Passed { .. }), "expected passed, got {state:?}");
        prop_assert!(!state.accepts_attempts());
    }

    #[test]
    fn failure_cools_down_for_exactly_the_policy_window(hours in 1u32..200, elapsed in 0i64..400) {
        let policy = TestPolicy {
            pass_score: 70,
            cooldown: Duration::hours(i64::from(hours)),
        };
        let governor = TestAttemptGovernor::new(policy);
        let state = governor.state(&[attempt(false, 0)], t0() + Duration::hours(elapsed));
        if elapsed < i64::from(hours) {
            prop_assert!(matches!(state, AttemptState::Cooldown { .. }), "expected cooldown");
        } else {
            prop_assert_eq!(state, AttemptState::Ready);
        }
    }

    #[test]
    fn score_rounds_half_up(total in 1usize..40, correct_seed in any::<prop::sample::Index>()) {
        let correct = correct_seed.index(total + 1);
        let questions: Vec<Question> = (0..total).map(|idx| question(idx, 3)).collect();
        let answers: Vec<Answer> = questions
            .iter()
            .enumerate()
            .map(|(idx, q)| {
                let option = if idx < correct { 0 } else { 1 };
                Answer::new(q.id.clone(), q.options[option].id.clone())
            })
            .collect();

        let governor = TestAttemptGovernor::new(TestPolicy::default());
        let grade = governor.grade(&questions, &answers).unwrap();
        prop_assert_eq!(grade.correct, correct);
        prop_assert_eq!(grade.total, total);

        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let expected = ((correct as f64 * 100.0 / total as f64) + 0.5).floor() as u8;
        prop_assert_eq!(grade.score, expected);
    }

    #[test]
    fn presentation_is_a_permutation(count in 1usize..12, options in 2usize..6, seed in any::<u64>()) {
        let questions: Vec<Question> = (0..count).map(|idx| question(idx, options)).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        let presented = present_questions(&questions, &mut rng);

        let ids: HashSet<&str> = presented.iter().map(|q| q.id.as_str()).collect();
        let expected: HashSet<&str> = questions.iter().map(|q| q.id.as_str()).collect();
        prop_assert_eq!(ids, expected);
        for shown in &presented {
            let source = questions.iter().find(|q| q.id == shown.id).unwrap();
            let shown_ids: HashSet<&str> = shown.options.iter().map(|o| o.id.as_str()).collect();
            let source_ids: HashSet<&str> = source.options.iter().map(|o| o.id.as_str()).collect();
            prop_assert_eq!(shown_ids, source_ids);
        }
    }
}
