//! Calendar arithmetic for countdown targets.
//!
//! # Responsibility
//! - Answer month-length questions with Gregorian leap-year rules.
//! - Compute the next occurrence of an annual `(month, day)` pair.
//! - Decompose a remaining duration into day/hour/minute/second units.
//!
//! # Invariants
//! - Every function here is pure and total; invalid calendar input yields
//!   `0` / `None` instead of panicking.
//! - Instants are host-local wall-clock date-times (`NaiveDateTime`).

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

const MS_PER_SECOND: i64 = 1_000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// A leap year, used to decide whether a `(month, day)` pair exists at all.
const LEAP_REFERENCE_YEAR: i32 = 2000;

/// Decomposed remaining time shown by a countdown card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemainingTime {
    /// Whole days left. Not calendar-aware, so it can exceed 31.
    pub days: u64,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    /// `true` when the target is at or before "now". All units are zero then.
    pub is_expired: bool,
}

impl RemainingTime {
    /// The view shown once a countdown reaches zero.
    pub fn expired() -> Self {
        Self {
            is_expired: true,
            ..Self::default()
        }
    }
}

/// Returns the number of days in `month` (1-12) of `year`.
///
/// Mirrors "day zero of the following month": the day before the first of
/// the next month is the last day of the target month. Returns `0` for a
/// month outside `1..=12`.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    if !(1..=12).contains(&month) {
        return 0;
    }

    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .map_or(0, |last_day| last_day.day())
}

/// Returns the next `month`/`day` at 00:00 that is not before `from`.
///
/// The candidate is built in `from`'s year; when it is strictly before
/// `from`, the following year is used instead. A day past the end of the
/// month overflows into the next one, so Feb 29 lands on Mar 1 in common
/// years and the pair still recurs every year.
///
/// Returns `None` only when `month`/`day` can never form a date.
pub fn next_occurrence(month: u32, day: u32, from: NaiveDateTime) -> Option<NaiveDateTime> {
    let candidate = occurrence_in_year(month, day, from.year())?;
    if candidate < from {
        return occurrence_in_year(month, day, from.year() + 1);
    }
    Some(candidate)
}

/// Like [`next_occurrence`], but the result is strictly after `from`.
///
/// Used by birthday rollover so a countdown that reached zero exactly at
/// midnight never lands back on the same instant.
pub fn next_occurrence_after(
    month: u32,
    day: u32,
    from: NaiveDateTime,
) -> Option<NaiveDateTime> {
    let candidate = next_occurrence(month, day, from)?;
    if candidate <= from {
        return occurrence_in_year(month, day, from.year() + 1);
    }
    Some(candidate)
}

/// Splits `target - now` into whole days/hours/minutes/seconds.
///
/// `target <= now` is expired. Otherwise the millisecond difference is
/// floor-divided unit by unit, each unit taking the remainder of the coarser
/// one; sub-second remainders are dropped.
pub fn decompose(target: NaiveDateTime, now: NaiveDateTime) -> RemainingTime {
    if target <= now {
        return RemainingTime::expired();
    }

    let difference_ms = (target - now).num_milliseconds();
    RemainingTime {
        days: (difference_ms / MS_PER_DAY) as u64,
        hours: ((difference_ms % MS_PER_DAY) / MS_PER_HOUR) as u32,
        minutes: ((difference_ms % MS_PER_HOUR) / MS_PER_MINUTE) as u32,
        seconds: ((difference_ms % MS_PER_MINUTE) / MS_PER_SECOND) as u32,
        is_expired: false,
    }
}

/// Midnight of `month`/`day` in `year`, overflowing a missing leap day.
fn occurrence_in_year(month: u32, day: u32, year: i32) -> Option<NaiveDateTime> {
    if day == 0 || day > days_in_month(LEAP_REFERENCE_YEAR, month) {
        return None;
    }

    let length = days_in_month(year, month);
    let date = if day <= length {
        NaiveDate::from_ymd_opt(year, month, day)?
    } else {
        NaiveDate::from_ymd_opt(year, month, length)?
            .checked_add_days(Days::new(u64::from(day - length)))?
    };
    date.and_hms_opt(0, 0, 0)
}
