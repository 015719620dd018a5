//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `countdown_core` linkage without any UI runtime.
//! - Render a few ticks of a seeded in-memory session on a fixed clock, so
//!   output stays deterministic for quick local sanity checks.

use chrono::{Duration, NaiveDate};
use countdown_core::{
    CoreConfig, FixedClock, TickSession, TimerInput, TimerService, TimerStore, TimerView,
};
use std::process::ExitCode;

const DEMO_TICKS: usize = 3;

fn main() -> ExitCode {
    println!("countdown_core ping={}", countdown_core::ping());
    println!("countdown_core version={}", countdown_core::core_version());

    let Some(start) = NaiveDate::from_ymd_opt(2024, 12, 31).and_then(|d| d.and_hms_opt(23, 59, 58))
    else {
        return ExitCode::FAILURE;
    };
    let clock = FixedClock::new(start);
    let mut session = TickSession::new(TimerService::new(
        TimerStore::new(),
        clock.clone(),
        CoreConfig::default(),
    ));

    for input in seed_inputs() {
        if let Err(err) = session.create(&input) {
            eprintln!("seed rejected: {err}");
            return ExitCode::FAILURE;
        }
    }

    for _ in 0..DEMO_TICKS {
        clock.advance(Duration::seconds(1));
        println!("tick now={}", clock_label(&session));
        for view in session.pump() {
            println!("  {}", render(&view));
        }
    }

    ExitCode::SUCCESS
}

fn seed_inputs() -> Vec<TimerInput> {
    vec![
        TimerInput {
            title: "New Year 2025".to_string(),
            date: "2025-01-01".to_string(),
            time: Some("00:00".to_string()),
            kind: "event".to_string(),
            birth_year: None,
        },
        TimerInput {
            title: "Anna".to_string(),
            date: "1990-03-15".to_string(),
            time: None,
            kind: "birthday".to_string(),
            birth_year: Some(1990),
        },
    ]
}

fn clock_label(session: &TickSession<countdown_core::NullPersistence, FixedClock>) -> String {
    session.service().now().format("%Y-%m-%d %H:%M:%S").to_string()
}

fn render(view: &TimerView) -> String {
    let age = view
        .displayed_age
        .map(|age| format!(" (turns {age})"))
        .unwrap_or_default();
    if view.remaining.is_expired {
        return format!("{}{age}: time is up", view.title);
    }
    format!(
        "{}{age}: {}d {:02}h {:02}m {:02}s",
        view.title,
        view.remaining.days,
        view.remaining.hours,
        view.remaining.minutes,
        view.remaining.seconds
    )
}
