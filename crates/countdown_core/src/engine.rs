//! Per-timer lifecycle and recurrence engine.
//!
//! # Responsibility
//! - Classify a timer against "now" (`Pending`, `ExpiredEvent`,
//!   `ExpiredBirthday`).
//! - Produce the remaining-time view for one tick.
//! - Roll an elapsed birthday forward as an explicit transition that the
//!   caller commits to the store.
//!
//! # Invariants
//! - Evaluation is pure: the input timer is never mutated here.
//! - A birthday never reports `is_expired = true`; the view of the tick that
//!   crosses zero already counts toward the rolled-forward target.
//! - Displayed age is derived from the post-rollover target year.

use crate::date_math::{decompose, next_occurrence_after, RemainingTime};
use crate::model::timer::{Timer, TimerKind};
use chrono::NaiveDateTime;
use log::warn;

/// Lifecycle state of a timer at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    /// `now < target_date`.
    Pending,
    /// An event whose target has been reached. Terminal until deletion.
    ExpiredEvent,
    /// A birthday whose target has been reached; must roll over.
    ExpiredBirthday,
}

/// Result of evaluating one timer for one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub remaining: RemainingTime,
    /// Age shown for birthdays, computed after any rollover.
    pub displayed_age: Option<i32>,
    /// Replacement record when a birthday rolled over during this tick.
    pub rolled_over: Option<Timer>,
}

/// Classifies `timer` against `now`.
pub fn classify(timer: &Timer, now: NaiveDateTime) -> TimerState {
    if now < timer.target_date {
        return TimerState::Pending;
    }
    match timer.kind {
        TimerKind::Event => TimerState::ExpiredEvent,
        TimerKind::Birthday { .. } => TimerState::ExpiredBirthday,
    }
}

/// Returns the birthday moved to its next occurrence strictly after `now`.
///
/// The next target is keyed off the timer's anniversary rather than the
/// current target, so a Feb 29 birthday shown on Mar 1 returns to Feb 29 in
/// the next leap year. Returns `None` for events, for birthdays that have not
/// elapsed yet, and for an anniversary that can never recur.
pub fn roll_forward(timer: &Timer, now: NaiveDateTime) -> Option<Timer> {
    if classify(timer, now) != TimerState::ExpiredBirthday {
        return None;
    }

    let (month, day) = timer.anniversary()?;
    let next_target = next_occurrence_after(month, day, now)?;
    Some(Timer {
        target_date: next_target,
        ..timer.clone()
    })
}

/// Evaluates one tick of `timer` at `now`.
///
/// At most one rollover happens per call. The caller owns committing
/// `rolled_over` back to the store before the next tick.
pub fn evaluate(timer: &Timer, now: NaiveDateTime) -> Evaluation {
    match classify(timer, now) {
        TimerState::Pending => Evaluation {
            remaining: decompose(timer.target_date, now),
            displayed_age: timer.displayed_age(),
            rolled_over: None,
        },
        TimerState::ExpiredEvent => Evaluation {
            remaining: RemainingTime::expired(),
            displayed_age: None,
            rolled_over: None,
        },
        TimerState::ExpiredBirthday => match roll_forward(timer, now) {
            Some(next) => Evaluation {
                remaining: decompose(next.target_date, now),
                displayed_age: next.displayed_age(),
                rolled_over: Some(next),
            },
            None => {
                warn!(
                    "event=birthday_rollover module=engine status=skipped reason=no_next_occurrence timer_id={}",
                    timer.id
                );
                Evaluation {
                    remaining: RemainingTime::expired(),
                    displayed_age: timer.displayed_age(),
                    rolled_over: None,
                }
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{classify, evaluate, roll_forward, TimerState};
    use crate::model::timer::{Timer, TimerDraft, TimerKind};
    use chrono::{Duration, NaiveDate, NaiveDateTime};
    use uuid::Uuid;

    fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn timer(target: NaiveDateTime, kind: TimerKind) -> Timer {
        TimerDraft {
            title: "t".to_string(),
            target_date: target,
            kind,
        }
        .into_timer(Uuid::new_v4())
    }

    #[test]
    fn pending_timer_counts_down() {
        let event = timer(at(2025, 1, 2, 0), TimerKind::Event);
        let evaluation = evaluate(&event, at(2025, 1, 1, 0));

        assert_eq!(classify(&event, at(2025, 1, 1, 0)), TimerState::Pending);
        assert_eq!(evaluation.remaining.days, 1);
        assert!(!evaluation.remaining.is_expired);
        assert!(evaluation.rolled_over.is_none());
    }

    #[test]
    fn expired_event_is_terminal() {
        let event = timer(at(2025, 1, 1, 0), TimerKind::Event);
        for later in [at(2025, 1, 1, 0), at(2025, 6, 1, 0), at(2030, 1, 1, 0)] {
            let evaluation = evaluate(&event, later);
            assert_eq!(classify(&event, later), TimerState::ExpiredEvent);
            assert!(evaluation.remaining.is_expired);
            assert!(evaluation.rolled_over.is_none());
        }
    }

    #[test]
    fn birthday_rolls_over_in_the_tick_it_expires() {
        let birthday = timer(
            at(2025, 3, 15, 0),
            TimerKind::birthday(1990, 3, 15),
        );
        let now = at(2025, 3, 15, 0);

        let evaluation = evaluate(&birthday, now);
        let rolled = evaluation.rolled_over.expect("birthday should roll over");

        assert_eq!(rolled.id, birthday.id);
        assert_eq!(rolled.target_date, at(2026, 3, 15, 0));
        assert!(!evaluation.remaining.is_expired);
        assert_eq!(evaluation.remaining.days, 365);
        assert_eq!(evaluation.displayed_age, Some(36));
    }

    #[test]
    fn stale_birthday_jumps_to_the_next_occurrence_after_now() {
        let birthday = timer(
            at(2020, 3, 15, 0),
            TimerKind::birthday(1990, 3, 15),
        );
        let rolled = roll_forward(&birthday, at(2025, 1, 10, 8)).unwrap();
        assert_eq!(rolled.target_date, at(2025, 3, 15, 0));
        assert_eq!(rolled.displayed_age(), Some(35));
    }

    #[test]
    fn pending_birthday_does_not_roll() {
        let birthday = timer(
            at(2025, 3, 15, 0),
            TimerKind::birthday(1990, 3, 15),
        );
        let now = at(2025, 3, 15, 0) - Duration::seconds(1);

        assert!(roll_forward(&birthday, now).is_none());
        let evaluation = evaluate(&birthday, now);
        assert_eq!(evaluation.displayed_age, Some(35));
        assert_eq!(evaluation.remaining.seconds, 1);
    }

    #[test]
    fn leap_day_birthday_recurs_every_year() {
        let birthday = timer(at(2028, 2, 29, 0), TimerKind::birthday(2000, 2, 29));

        let evaluation = evaluate(&birthday, at(2028, 2, 29, 0));
        let rolled = evaluation.rolled_over.expect("birthday should roll over");
        assert_eq!(rolled.target_date, at(2029, 3, 1, 0));
        assert_eq!(evaluation.displayed_age, Some(29));
        assert_eq!(evaluation.remaining.days, 366);

        let mut current = rolled;
        for (year, month, day) in [(2030, 3, 1), (2031, 3, 1), (2032, 2, 29)] {
            let now = current.target_date;
            current = roll_forward(&current, now).unwrap();
            assert_eq!(current.target_date, at(year, month, day, 0));
            assert_eq!(current.displayed_age(), Some(year - 2000));
        }
    }

    #[test]
    fn events_never_roll() {
        let event = timer(at(2025, 3, 15, 0), TimerKind::Event);
        assert!(roll_forward(&event, at(2026, 1, 1, 0)).is_none());
    }
}
