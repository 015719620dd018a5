//! Presentation-side label helpers.
//!
//! # Responsibility
//! - Render displayed ages, countdown units and target dates for UI cards.
//! - Apply locale grammatical-number rules (Russian one/few/many, English
//!   one/other).
//!
//! These rules are presentation only; the core engine exposes plain numbers.

use chrono::{Datelike, NaiveDateTime};

const RU_MONTHS_GENITIVE: [&str; 12] = [
    "января",
    "февраля",
    "марта",
    "апреля",
    "мая",
    "июня",
    "июля",
    "августа",
    "сентября",
    "октября",
    "ноября",
    "декабря",
];

const EN_MONTHS: [&str; 12] = [
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

/// Supported label locales.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelLocale {
    Ru,
    En,
}

impl LabelLocale {
    /// Parses a BCP-47-ish tag; anything not Russian falls back to English.
    pub fn from_tag(tag: &str) -> Self {
        let lowered = tag.trim().to_ascii_lowercase();
        if lowered == "ru" || lowered.starts_with("ru-") || lowered.starts_with("ru_") {
            Self::Ru
        } else {
            Self::En
        }
    }
}

/// Countdown unit shown on a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownUnit {
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl CountdownUnit {
    /// Parses `days|hours|minutes|seconds` (singular accepted).
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "day" | "days" => Some(Self::Days),
            "hour" | "hours" => Some(Self::Hours),
            "minute" | "minutes" => Some(Self::Minutes),
            "second" | "seconds" => Some(Self::Seconds),
            _ => None,
        }
    }
}

/// Russian grammatical number: 1, 21, 101 -> one; 2-4, 22-24 -> few;
/// 0, 5-20, 25-30, 111-114 -> many.
pub fn ru_plural<'a>(value: u64, one: &'a str, few: &'a str, many: &'a str) -> &'a str {
    let last_two = value % 100;
    let last = value % 10;
    if (11..=14).contains(&last_two) {
        return many;
    }
    match last {
        1 => one,
        2..=4 => few,
        _ => many,
    }
}

/// Formats an age such as `35 лет` / `21 год` or `1 year` / `35 years`.
pub fn age_label(age: i32, locale: LabelLocale) -> String {
    let magnitude = u64::from(age.unsigned_abs());
    let noun = match locale {
        LabelLocale::Ru => ru_plural(magnitude, "год", "года", "лет"),
        LabelLocale::En => {
            if magnitude == 1 {
                "year"
            } else {
                "years"
            }
        }
    };
    format!("{age} {noun}")
}

/// Returns the unit caption matching `value`.
pub fn unit_label(unit: CountdownUnit, value: u64, locale: LabelLocale) -> &'static str {
    match locale {
        LabelLocale::Ru => match unit {
            CountdownUnit::Days => ru_plural(value, "день", "дня", "дней"),
            CountdownUnit::Hours => ru_plural(value, "час", "часа", "часов"),
            CountdownUnit::Minutes => ru_plural(value, "минута", "минуты", "минут"),
            CountdownUnit::Seconds => ru_plural(value, "секунда", "секунды", "секунд"),
        },
        LabelLocale::En => {
            let (one, other) = match unit {
                CountdownUnit::Days => ("day", "days"),
                CountdownUnit::Hours => ("hour", "hours"),
                CountdownUnit::Minutes => ("minute", "minutes"),
                CountdownUnit::Seconds => ("second", "seconds"),
            };
            if value == 1 {
                one
            } else {
                other
            }
        }
    }
}

/// Zero-pads a unit value to at least two digits.
pub fn pad_unit(value: u64) -> String {
    format!("{value:02}")
}

/// Zero-padded value followed by its caption, e.g. `05 дней`.
pub fn unit_display(value: u64, unit: CountdownUnit, locale: LabelLocale) -> String {
    format!("{} {}", pad_unit(value), unit_label(unit, value, locale))
}

/// Long date with time, e.g. `15 марта 2026 г., 00:00` or
/// `March 15, 2026, 00:00`.
pub fn target_date_label(target: NaiveDateTime, locale: LabelLocale) -> String {
    let index = target.month0() as usize;
    let time = target.format("%H:%M");
    match locale {
        LabelLocale::Ru => format!(
            "{} {} {} г., {time}",
            target.day(),
            RU_MONTHS_GENITIVE[index],
            target.year()
        ),
        LabelLocale::En => format!(
            "{} {}, {}, {time}",
            EN_MONTHS[index],
            target.day(),
            target.year()
        ),
    }
}

/// Banner shown once an event countdown has expired.
pub fn expired_banner(locale: LabelLocale) -> &'static str {
    match locale {
        LabelLocale::Ru => "Время истекло!",
        LabelLocale::En => "Time is up!",
    }
}
