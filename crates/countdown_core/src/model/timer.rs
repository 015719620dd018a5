//! Timer domain model.
//!
//! # Responsibility
//! - Define the one tagged record shared by event and birthday countdowns.
//! - Own the persisted wire shape (`id`, `title`, `targetDate`, `type`,
//!   `birthYear`).
//!
//! # Invariants
//! - `id` is stable and never reused for another timer.
//! - `title` is non-empty after trimming.
//! - `birth_year` exists exactly when the kind is `Birthday`, and is never
//!   later than the target year.
//! - A birthday recurs on the same month/day every year. A Feb 29 birthday
//!   keeps Feb 29 as its key and targets Mar 1 in common years.

use chrono::{DateTime, Datelike, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Month/day of the leap day.
pub const LEAP_DAY: (u32, u32) = (2, 29);

/// Stable identifier for every timer in a store.
pub type TimerId = Uuid;

/// Parses a timer id from its canonical string form.
pub fn parse_timer_id(value: &str) -> Option<TimerId> {
    Uuid::parse_str(value.trim()).ok().filter(|id| !id.is_nil())
}

/// Variant tag for a countdown.
///
/// Serialized inline into the timer as `"type": "event"` or
/// `"type": "birthday", "birthYear": 1990`. Feb 29 birthdays also carry
/// `"leapDay": true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimerKind {
    /// One-shot countdown; stays expired once reached.
    Event,
    /// Annual countdown that rolls over to the next year once reached.
    Birthday {
        #[serde(rename = "birthYear")]
        birth_year: i32,
        /// Born on Feb 29. The target then reads Mar 1 in common years.
        #[serde(rename = "leapDay", default, skip_serializing_if = "std::ops::Not::not")]
        leap_day: bool,
    },
}

impl TimerKind {
    /// Birthday kind for a birth `month`/`day`.
    pub fn birthday(birth_year: i32, month: u32, day: u32) -> Self {
        Self::Birthday {
            birth_year,
            leap_day: (month, day) == LEAP_DAY,
        }
    }

    /// Stable lowercase label used on the wire and by UI callers.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Birthday { .. } => "birthday",
        }
    }
}

/// Model-level validation failures for [`Timer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerValidationError {
    NilId,
    EmptyTitle,
    BirthYearAfterTarget { birth_year: i32, target_year: i32 },
}

impl Display for TimerValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "timer id must not be nil"),
            Self::EmptyTitle => write!(f, "timer title must not be empty"),
            Self::BirthYearAfterTarget {
                birth_year,
                target_year,
            } => write!(
                f,
                "birth year ({birth_year}) must not be after target year ({target_year})"
            ),
        }
    }
}

impl Error for TimerValidationError {}

/// Timer fields supplied by the creation boundary; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerDraft {
    pub title: String,
    pub target_date: NaiveDateTime,
    pub kind: TimerKind,
}

impl TimerDraft {
    /// Attaches an identity, producing a full record.
    pub fn into_timer(self, id: TimerId) -> Timer {
        Timer {
            id,
            title: self.title,
            target_date: self.target_date,
            kind: self.kind,
        }
    }
}

/// Canonical countdown record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timer {
    pub id: TimerId,
    pub title: String,
    /// Host-local wall-clock instant the countdown points to.
    #[serde(rename = "targetDate", with = "target_date_format")]
    pub target_date: NaiveDateTime,
    #[serde(flatten)]
    pub kind: TimerKind,
}

impl Timer {
    /// Creates a validated timer with a caller-provided id.
    ///
    /// Used by import paths where identity already exists.
    pub fn with_id(id: TimerId, draft: TimerDraft) -> Result<Self, TimerValidationError> {
        let timer = draft.into_timer(id);
        timer.validate()?;
        Ok(timer)
    }

    /// Checks record-level invariants.
    ///
    /// # Errors
    /// - Returns an error for a nil id, a blank title, or a birthday whose
    ///   birth year is after its target year.
    pub fn validate(&self) -> Result<(), TimerValidationError> {
        if self.id.is_nil() {
            return Err(TimerValidationError::NilId);
        }
        if self.title.trim().is_empty() {
            return Err(TimerValidationError::EmptyTitle);
        }
        if let TimerKind::Birthday { birth_year, .. } = self.kind {
            let target_year = self.target_date.year();
            if birth_year > target_year {
                return Err(TimerValidationError::BirthYearAfterTarget {
                    birth_year,
                    target_year,
                });
            }
        }
        Ok(())
    }

    pub fn is_birthday(&self) -> bool {
        matches!(self.kind, TimerKind::Birthday { .. })
    }

    pub fn birth_year(&self) -> Option<i32> {
        match self.kind {
            TimerKind::Birthday { birth_year, .. } => Some(birth_year),
            TimerKind::Event => None,
        }
    }

    /// Month/day a birthday recurs on; `None` for events.
    pub fn anniversary(&self) -> Option<(u32, u32)> {
        match self.kind {
            TimerKind::Birthday { leap_day: true, .. } => Some(LEAP_DAY),
            TimerKind::Birthday { .. } => {
                Some((self.target_date.month(), self.target_date.day()))
            }
            TimerKind::Event => None,
        }
    }

    /// Age reached on the current target date; `None` for events.
    pub fn displayed_age(&self) -> Option<i32> {
        self.birth_year()
            .map(|birth_year| self.target_date.year() - birth_year)
    }
}

/// ISO-8601 encoding for `targetDate`.
///
/// Writes local date-times without offset. Reads either that form or an
/// RFC 3339 timestamp with offset (as produced by a browser's
/// `Date.toISOString()`), which is converted into host-local time.
mod target_date_format {
    use super::{DateTime, Local, NaiveDateTime};
    use serde::{de, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        let trimmed = raw.trim();
        if let Ok(local) = trimmed.parse::<NaiveDateTime>() {
            return Ok(local);
        }
        DateTime::parse_from_rfc3339(trimmed)
            .map(|with_offset| with_offset.with_timezone(&Local).naive_local())
            .map_err(|_| de::Error::custom(format!("invalid targetDate `{trimmed}`")))
    }
}
