//! Timer use-case service and creation boundary.
//!
//! # Responsibility
//! - Validate raw form input into a `TimerDraft` before anything is stored.
//! - Orchestrate store mutations and per-timer engine evaluation.
//! - Commit birthday rollovers as explicit `replace` calls.
//!
//! # Invariants
//! - Rejected input never creates a record, partial or otherwise.
//! - A new event's target is strictly after "now" at creation time.
//! - Each evaluation applies at most one rollover per timer.

use crate::clock::Clock;
use crate::config::CoreConfig;
use crate::date_math::{days_in_month, next_occurrence, RemainingTime};
use crate::engine::evaluate;
use crate::model::timer::{Timer, TimerDraft, TimerId, TimerKind};
use crate::repo::slot_persistence::TimerPersistence;
use crate::repo::timer_store::TimerStore;
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

const TIME_FORMAT: &str = "%H:%M";

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Raw creation input as submitted by a form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimerInput {
    pub title: String,
    /// `YYYY-MM-DD`. For birthdays only month and day are used.
    pub date: String,
    /// Optional `HH:MM`; events only, defaults to midnight.
    pub time: Option<String>,
    /// `event` or `birthday`.
    pub kind: String,
    /// Required for birthdays.
    pub birth_year: Option<i32>,
}

/// Creation-boundary rejection. `Display` is the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateTimerError {
    MissingField(&'static str),
    UnknownKind(String),
    InvalidDate(String),
    InvalidTime(String),
    DayOutOfRange {
        year: i32,
        month: u32,
        days_in_month: u32,
    },
    BirthYearOutOfRange {
        birth_year: i32,
        min: i32,
        max: i32,
    },
    NotInFuture,
}

impl CreateTimerError {
    /// Short stable code for logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "missing_field",
            Self::UnknownKind(_) => "unknown_kind",
            Self::InvalidDate(_) => "invalid_date",
            Self::InvalidTime(_) => "invalid_time",
            Self::DayOutOfRange { .. } => "day_out_of_range",
            Self::BirthYearOutOfRange { .. } => "birth_year_out_of_range",
            Self::NotInFuture => "not_in_future",
        }
    }
}

impl Display for CreateTimerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => {
                write!(f, "Please fill in all fields ({field} is missing).")
            }
            Self::UnknownKind(kind) => write!(f, "Unknown timer type `{kind}`."),
            Self::InvalidDate(date) => write!(f, "Please enter a valid date (got `{date}`)."),
            Self::InvalidTime(time) => {
                write!(f, "Please enter a valid time as HH:MM (got `{time}`).")
            }
            Self::DayOutOfRange {
                year,
                month,
                days_in_month,
            } => write!(
                f,
                "{} {year} has only {days_in_month} days.",
                month_name(*month)
            ),
            Self::BirthYearOutOfRange {
                birth_year,
                min,
                max,
            } => write!(f, "Birth year {birth_year} must be between {min} and {max}."),
            Self::NotInFuture => write!(f, "The event date must be in the future."),
        }
    }
}

impl Error for CreateTimerError {}

/// Per-tick view of one timer handed to presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerView {
    pub id: TimerId,
    pub title: String,
    pub target_date: NaiveDateTime,
    pub kind: TimerKind,
    pub remaining: RemainingTime,
    pub displayed_age: Option<i32>,
}

/// Validates raw input into a draft at instant `now`.
///
/// # Errors
/// - Missing title/date (and birth year for birthdays).
/// - Unknown kind, malformed date/time, month outside 1-12, day outside the
///   month's length.
/// - Birth year outside `[config.min_birth_year, now.year()]`.
/// - Event target not strictly after `now`.
pub fn validate_input(
    input: &TimerInput,
    now: NaiveDateTime,
    config: &CoreConfig,
) -> Result<TimerDraft, CreateTimerError> {
    let title = input.title.trim();
    if title.is_empty() {
        return Err(CreateTimerError::MissingField("title"));
    }
    let kind = input.kind.trim().to_ascii_lowercase();
    if kind.is_empty() {
        return Err(CreateTimerError::MissingField("kind"));
    }
    if input.date.trim().is_empty() {
        return Err(CreateTimerError::MissingField("date"));
    }
    let (year, month, day) = parse_date_parts(&input.date)?;

    match kind.as_str() {
        "birthday" => {
            let birth_year = input
                .birth_year
                .ok_or(CreateTimerError::MissingField("birth_year"))?;
            let max = now.year();
            if birth_year < config.min_birth_year || birth_year > max {
                return Err(CreateTimerError::BirthYearOutOfRange {
                    birth_year,
                    min: config.min_birth_year,
                    max,
                });
            }
            ensure_day_in_month(birth_year, month, day)?;
            let target_date = next_occurrence(month, day, now)
                .ok_or_else(|| CreateTimerError::InvalidDate(input.date.trim().to_string()))?;

            Ok(TimerDraft {
                title: title.to_string(),
                target_date,
                kind: TimerKind::birthday(birth_year, month, day),
            })
        }
        "event" => {
            ensure_day_in_month(year, month, day)?;
            let time = match input.time.as_deref().map(str::trim) {
                Some(raw) if !raw.is_empty() => parse_time(raw)?,
                _ => NaiveTime::default(),
            };
            let target_date = NaiveDate::from_ymd_opt(year, month, day)
                .ok_or_else(|| CreateTimerError::InvalidDate(input.date.trim().to_string()))?
                .and_time(time);
            if target_date <= now {
                return Err(CreateTimerError::NotInFuture);
            }

            Ok(TimerDraft {
                title: title.to_string(),
                target_date,
                kind: TimerKind::Event,
            })
        }
        other => Err(CreateTimerError::UnknownKind(other.to_string())),
    }
}

/// Use-case service over a timer store and a clock.
pub struct TimerService<P: TimerPersistence, C: Clock> {
    store: TimerStore<P>,
    clock: C,
    config: CoreConfig,
}

impl<P: TimerPersistence, C: Clock> TimerService<P, C> {
    pub fn new(store: TimerStore<P>, clock: C, config: CoreConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// Validates `input` and appends the resulting timer.
    pub fn create(&mut self, input: &TimerInput) -> Result<Timer, CreateTimerError> {
        let draft = validate_input(input, self.clock.now(), &self.config).map_err(|err| {
            info!(
                "event=timer_create module=service status=rejected reason={}",
                err.code()
            );
            err
        })?;
        Ok(self.store.create(draft))
    }

    /// Deletes by id; absent ids are a no-op.
    pub fn delete(&mut self, id: TimerId) -> bool {
        self.store.delete(id)
    }

    /// Runs one tick for `id` at the clock's current instant.
    ///
    /// A birthday that reached zero is replaced in the store before the view
    /// is returned. Returns `None` when the timer no longer exists.
    pub fn tick(&mut self, id: TimerId) -> Option<TimerView> {
        let now = self.clock.now();
        let timer = self.store.get(id)?.clone();
        let evaluation = evaluate(&timer, now);

        let current = match evaluation.rolled_over {
            Some(rolled) => {
                info!(
                    "event=birthday_rollover module=service status=ok timer_id={} target_year={}",
                    rolled.id,
                    rolled.target_date.year()
                );
                self.store.replace(rolled.clone());
                rolled
            }
            None => timer,
        };

        Some(TimerView {
            id: current.id,
            title: current.title,
            target_date: current.target_date,
            kind: current.kind,
            remaining: evaluation.remaining,
            displayed_age: evaluation.displayed_age,
        })
    }

    /// Ticks every timer once, in store order.
    pub fn tick_all(&mut self) -> Vec<TimerView> {
        let ids: Vec<TimerId> = self.store.timers().iter().map(|timer| timer.id).collect();
        ids.into_iter().filter_map(|id| self.tick(id)).collect()
    }

    pub fn timers(&self) -> &[Timer] {
        self.store.timers()
    }

    pub fn store(&self) -> &TimerStore<P> {
        &self.store
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }
}

fn parse_date_parts(raw: &str) -> Result<(i32, u32, u32), CreateTimerError> {
    let trimmed = raw.trim();
    let invalid = || CreateTimerError::InvalidDate(trimmed.to_string());

    let mut parts = trimmed.split('-');
    let (Some(year), Some(month), Some(day), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };
    if year.len() != 4 || month.is_empty() || day.is_empty() {
        return Err(invalid());
    }

    let year = parse_digits::<i32>(year).ok_or_else(invalid)?;
    let month = parse_digits::<u32>(month).ok_or_else(invalid)?;
    let day = parse_digits::<u32>(day).ok_or_else(invalid)?;
    if !(1..=12).contains(&month) || day == 0 {
        return Err(invalid());
    }
    Ok((year, month, day))
}

fn parse_time(raw: &str) -> Result<NaiveTime, CreateTimerError> {
    NaiveTime::parse_from_str(raw, TIME_FORMAT)
        .map_err(|_| CreateTimerError::InvalidTime(raw.to_string()))
}

fn parse_digits<T: std::str::FromStr>(raw: &str) -> Option<T> {
    if raw.is_empty() || !raw.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

fn ensure_day_in_month(year: i32, month: u32, day: u32) -> Result<(), CreateTimerError> {
    let days = days_in_month(year, month);
    if day > days {
        return Err(CreateTimerError::DayOutOfRange {
            year,
            month,
            days_in_month: days,
        });
    }
    Ok(())
}

fn month_name(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|index| MONTH_NAMES.get(index as usize))
        .copied()
        .unwrap_or("Month")
}

#[cfg(test)]
mod tests {
    use super::{parse_date_parts, parse_time, validate_input, CreateTimerError, TimerInput};
    use crate::config::CoreConfig;
    use crate::model::timer::TimerKind;
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn event(date: &str, time: Option<&str>) -> TimerInput {
        TimerInput {
            title: "Launch".to_string(),
            date: date.to_string(),
            time: time.map(str::to_string),
            kind: "event".to_string(),
            birth_year: None,
        }
    }

    fn birthday(date: &str, birth_year: Option<i32>) -> TimerInput {
        TimerInput {
            title: "Anna".to_string(),
            date: date.to_string(),
            time: None,
            kind: "birthday".to_string(),
            birth_year,
        }
    }

    #[test]
    fn event_with_time_builds_exact_target() {
        let input = event("2025-12-31", Some("23:59"));
        let draft = validate_input(&input, now(), &CoreConfig::default()).unwrap();
        assert_eq!(draft.title, "Launch");
        assert_eq!(draft.kind, TimerKind::Event);
        assert_eq!(
            draft.target_date,
            NaiveDate::from_ymd_opt(2025, 12, 31)
                .unwrap()
                .and_hms_opt(23, 59, 0)
                .unwrap()
        );
    }

    #[test]
    fn event_without_time_defaults_to_midnight() {
        let draft = validate_input(&event("2025-07-01", None), now(), &CoreConfig::default())
            .unwrap();
        assert_eq!(draft.target_date.format("%H:%M").to_string(), "00:00");
    }

    #[test]
    fn past_or_present_event_is_rejected() {
        let config = CoreConfig::default();
        assert_eq!(
            validate_input(&event("2025-06-01", None), now(), &config),
            Err(CreateTimerError::NotInFuture)
        );
        assert_eq!(
            validate_input(&event("2025-06-10", Some("12:00")), now(), &config),
            Err(CreateTimerError::NotInFuture)
        );
    }

    #[test]
    fn birthday_targets_next_occurrence() {
        let config = CoreConfig::default();
        let upcoming = validate_input(&birthday("1990-08-15", Some(1990)), now(), &config).unwrap();
        assert_eq!(upcoming.target_date.date(), NaiveDate::from_ymd_opt(2025, 8, 15).unwrap());
        assert_eq!(upcoming.kind, TimerKind::birthday(1990, 8, 15));

        let passed = validate_input(&birthday("1990-03-15", Some(1990)), now(), &config).unwrap();
        assert_eq!(passed.target_date.date(), NaiveDate::from_ymd_opt(2026, 3, 15).unwrap());
    }

    #[test]
    fn leap_day_needs_a_leap_birth_year() {
        let config = CoreConfig::default();
        let err = validate_input(&birthday("2001-02-29", Some(2001)), now(), &config).unwrap_err();
        assert_eq!(
            err,
            CreateTimerError::DayOutOfRange {
                year: 2001,
                month: 2,
                days_in_month: 28,
            }
        );
        assert_eq!(err.to_string(), "February 2001 has only 28 days.");

        let draft = validate_input(&birthday("2000-02-29", Some(2000)), now(), &config).unwrap();
        assert_eq!(draft.target_date.date(), NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        assert_eq!(
            draft.kind,
            TimerKind::Birthday {
                birth_year: 2000,
                leap_day: true,
            }
        );
    }

    #[test]
    fn birth_year_bounds_are_enforced() {
        let config = CoreConfig::default();
        assert!(matches!(
            validate_input(&birthday("1899-01-01", Some(1899)), now(), &config),
            Err(CreateTimerError::BirthYearOutOfRange { min: 1900, max: 2025, .. })
        ));
        assert!(matches!(
            validate_input(&birthday("2026-01-01", Some(2026)), now(), &config),
            Err(CreateTimerError::BirthYearOutOfRange { .. })
        ));
        assert_eq!(
            validate_input(&birthday("1990-01-01", None), now(), &config),
            Err(CreateTimerError::MissingField("birth_year"))
        );
    }

    #[test]
    fn missing_fields_and_unknown_kind_are_rejected() {
        let config = CoreConfig::default();
        let mut input = event("2025-12-31", None);
        input.title = "  ".to_string();
        assert_eq!(
            validate_input(&input, now(), &config),
            Err(CreateTimerError::MissingField("title"))
        );

        let mut input = event("", None);
        input.title = "x".to_string();
        assert_eq!(
            validate_input(&input, now(), &config),
            Err(CreateTimerError::MissingField("date"))
        );

        let mut input = event("2025-12-31", None);
        input.kind = "anniversary".to_string();
        assert_eq!(
            validate_input(&input, now(), &config),
            Err(CreateTimerError::UnknownKind("anniversary".to_string()))
        );
    }

    #[test]
    fn date_parts_reject_malformed_values() {
        assert_eq!(parse_date_parts("2025-02-03"), Ok((2025, 2, 3)));
        for bad in [
            "2025-13-01",
            "2025-00-10",
            "2025-01-00",
            "25-01-01",
            "2025/01/01",
            "2025-01-01-01",
            "2025-aa-01",
        ] {
            assert!(parse_date_parts(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn time_rejects_out_of_range_values() {
        assert_eq!(parse_time("09:30"), Ok(NaiveTime::from_hms_opt(9, 30, 0).unwrap()));
        assert!(parse_time("24:00").is_err());
        assert!(parse_time("12:60").is_err());
        assert!(parse_time("noon").is_err());
        assert!(parse_time("12:30:15").is_err());
    }
}
