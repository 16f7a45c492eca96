//! Property and scenario tests for the progression engine.

use chrono::{Days, NaiveDate, NaiveDateTime};
use donothing_core::{
    ChallengeRules, DayLog, FreezeTriggerDetector, LogRating, LogStatus, ProgressionCalculator,
    StateUpdater,
};
use proptest::prelude::*;

fn day0() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 11, 4).unwrap()
}

fn plus(days: u64) -> NaiveDate {
    day0().checked_add_days(Days::new(days)).unwrap()
}

fn at(date: NaiveDate, hour: u32) -> NaiveDateTime {
    date.and_hms_opt(hour, 0, 0).unwrap()
}

fn rated_log(offset: u64, rating: Option<LogRating>) -> DayLog {
    DayLog::completed(plus(offset), 5).with_rating(rating)
}

fn rating_strategy() -> impl Strategy<Value = Option<LogRating>> {
    prop_oneof![
        Just(None),
        Just(Some(LogRating::Good)),
        Just(Some(LogRating::Hard)),
        Just(Some(LogRating::Bad)),
    ]
}

proptest! {
    #[test]
    fn week_and_target_stay_in_range(
        now_offset in 0u64..200,
        freeze_offset in proptest::option::of(0u64..120),
        hour in 0u32..24,
    ) {
        let calc = ProgressionCalculator::new();
        let info = calc.compute(
            at(plus(now_offset), hour),
            Some(day0()),
            freeze_offset.map(plus),
            &[],
        );
        prop_assert!((1..=12).contains(&info.week_index));
        prop_assert!((5..=60).contains(&info.target_minutes));
        prop_assert_eq!(info.target_minutes % 5, 0);
        prop_assert!(info.day_index >= 1 && info.day_index <= 84);
    }

    #[test]
    fn target_matches_week_when_not_frozen(now_offset in 0u64..84) {
        let info = ProgressionCalculator::new().compute(at(plus(now_offset), 12), Some(day0()), None, &[]);
        prop_assert!(!info.is_frozen);
        prop_assert_eq!(info.target_minutes, (5 + 5 * (info.week_index - 1)).min(60));
    }

    #[test]
    fn target_never_decreases_without_freeze(a in 0u64..84, b in 0u64..84) {
        let (early, late) = if a <= b { (a, b) } else { (b, a) };
        let calc = ProgressionCalculator::new();
        let first = calc.compute(at(plus(early), 9), Some(day0()), None, &[]);
        let second = calc.compute(at(plus(late), 9), Some(day0()), None, &[]);
        prop_assert!(first.week_index <= second.week_index);
        prop_assert!(first.target_minutes <= second.target_minutes);
    }

    #[test]
    fn updater_is_idempotent(
        ratings in proptest::collection::vec(rating_strategy(), 1..30),
        now_offset in 0u64..40,
    ) {
        let logs: Vec<DayLog> = ratings
            .iter()
            .enumerate()
            .map(|(i, r)| rated_log(i as u64, *r))
            .collect();
        let now = at(plus(now_offset), 22);
        let updater = StateUpdater::new();

        let mut once = donothing_core::ChallengeState::started_on(day0());
        updater.apply_post_log_mutation(&mut once, &logs, now);
        let mut twice = once;
        updater.apply_post_log_mutation(&mut twice, &logs, now);

        prop_assert_eq!(once.freeze_until, twice.freeze_until);
    }

    #[test]
    fn detector_needs_three_bad_logs(
        ratings in proptest::collection::vec(rating_strategy(), 0..20),
    ) {
        let logs: Vec<DayLog> = ratings
            .iter()
            .enumerate()
            .map(|(i, r)| rated_log(i as u64 * 2, *r))
            .collect();
        // Logs are two days apart, so no run of consecutive days exists.
        prop_assert!(!FreezeTriggerDetector::new().should_trigger_freeze(&logs, at(plus(60), 8)));
    }
}

#[test]
fn walkthrough_of_a_full_program_with_one_freeze() {
    let calc = ProgressionCalculator::new();
    let updater = StateUpdater::new();
    let mut state = donothing_core::ChallengeState::started_on(day0());
    let mut logs = Vec::new();

    for offset in 0..84u64 {
        let now = at(plus(offset), 20);
        let info = calc.compute_for_state(now, Some(&state), &logs);
        // Bad days on days 20-22 (offsets 19..=21).
        let rating = if (19..=21).contains(&offset) {
            Some(LogRating::Bad)
        } else {
            Some(LogRating::Good)
        };
        logs.push(DayLog::completed(now.date(), info.target_minutes).with_rating(rating));
        updater.apply_post_log_mutation(&mut state, &logs, now);
    }

    // Frozen from day 22 (offset 21) until offset 35.
    assert_eq!(state.freeze_until, Some(plus(35)));

    let frozen = calc.compute_for_state(at(plus(30), 8), Some(&state), &logs);
    assert!(frozen.is_frozen);
    assert_eq!(frozen.week_index, 4);
    assert_eq!(frozen.target_minutes, 20);

    let resumed = calc.compute_for_state(at(plus(40), 8), Some(&state), &logs);
    assert!(!resumed.is_frozen);
    // day 41 - 14 = effective day 27 -> week 4
    assert_eq!(resumed.week_index, 4);

    let finished = calc.compute_for_state(at(plus(84), 8), Some(&state), &logs);
    assert!(finished.is_finished());
    assert!(finished.is_completed);
    assert_eq!(
        logs.iter().filter(|l| l.status == LogStatus::Completed).count(),
        84
    );
}

#[test]
fn rules_from_config_drive_the_engine() {
    let rules = ChallengeRules {
        freeze_days: 7,
        ..Default::default()
    };
    let updater = StateUpdater::with_rules(rules);
    let mut state = donothing_core::ChallengeState::started_on(day0());
    let logs = vec![
        rated_log(3, Some(LogRating::Bad)),
        rated_log(4, Some(LogRating::Bad)),
        rated_log(5, Some(LogRating::Bad)),
    ];
    updater.apply_post_log_mutation(&mut state, &logs, at(plus(5), 21));
    assert_eq!(state.freeze_until, Some(plus(12)));
}
