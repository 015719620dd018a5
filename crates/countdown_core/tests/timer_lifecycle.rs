use chrono::{Duration, NaiveDate, NaiveDateTime};
use countdown_core::{
    CoreConfig, FixedClock, NullPersistence, TickSession, TimerInput, TimerKind, TimerService,
    TimerStore,
};

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, minute, second)
        .unwrap()
}

fn session(clock: &FixedClock) -> TickSession<NullPersistence, FixedClock> {
    TickSession::new(TimerService::new(
        TimerStore::new(),
        clock.clone(),
        CoreConfig::default(),
    ))
}

fn birthday_input(date: &str, birth_year: i32) -> TimerInput {
    TimerInput {
        title: "Anna".to_string(),
        date: date.to_string(),
        time: None,
        kind: "birthday".to_string(),
        birth_year: Some(birth_year),
    }
}

fn event_input(date: &str, time: &str) -> TimerInput {
    TimerInput {
        title: "Launch".to_string(),
        date: date.to_string(),
        time: Some(time.to_string()),
        kind: "event".to_string(),
        birth_year: None,
    }
}

#[test]
fn birthday_age_increments_once_when_countdown_reaches_zero() {
    let clock = FixedClock::new(at(2025, 3, 14, 23, 59, 55));
    let mut session = session(&clock);
    let timer = session.create(&birthday_input("1990-03-15", 1990)).unwrap();
    assert_eq!(timer.target_date, at(2025, 3, 15, 0, 0, 0));

    let mut ages = Vec::new();
    let mut rollover_instants = Vec::new();
    for _ in 0..10 {
        clock.advance(Duration::seconds(1));
        let views = session.pump();
        assert_eq!(views.len(), 1);
        let view = &views[0];
        assert!(!view.remaining.is_expired, "birthdays never show as expired");
        if ages.last().is_some_and(|previous| *previous != view.displayed_age.unwrap()) {
            rollover_instants.push(clock_now(&session));
        }
        ages.push(view.displayed_age.unwrap());
    }

    assert_eq!(ages.first(), Some(&35));
    assert_eq!(ages.last(), Some(&36));
    assert_eq!(rollover_instants, vec![at(2025, 3, 15, 0, 0, 0)]);
    assert_eq!(
        session.timers()[0].target_date,
        at(2026, 3, 15, 0, 0, 0)
    );
    assert_eq!(
        session.timers()[0].kind,
        TimerKind::birthday(1990, 3, 15)
    );
}

#[test]
fn view_in_rollover_tick_counts_toward_next_year() {
    let clock = FixedClock::new(at(2025, 3, 14, 23, 59, 59));
    let mut session = session(&clock);
    let timer = session.create(&birthday_input("1990-03-15", 1990)).unwrap();

    clock.advance(Duration::seconds(1));
    let view = session.pump().pop().unwrap();

    assert_eq!(view.id, timer.id);
    assert_eq!(view.target_date, at(2026, 3, 15, 0, 0, 0));
    assert_eq!(view.remaining.days, 365);
    assert_eq!(view.remaining.hours, 0);
    assert_eq!(view.displayed_age, Some(36));
}

#[test]
fn leap_day_birthday_ages_by_one_each_year() {
    let clock = FixedClock::new(at(2028, 2, 28, 23, 59, 59));
    let mut session = session(&clock);
    let timer = session.create(&birthday_input("2000-02-29", 2000)).unwrap();
    assert_eq!(timer.target_date, at(2028, 2, 29, 0, 0, 0));
    assert_eq!(timer.displayed_age(), Some(28));

    clock.advance(Duration::seconds(1));
    let view = session.pump().pop().unwrap();
    assert_eq!(view.displayed_age, Some(29));
    assert_eq!(view.target_date, at(2029, 3, 1, 0, 0, 0));
    assert_eq!(view.remaining.days, 366);

    clock.set(at(2029, 3, 1, 0, 0, 0));
    let view = session.pump().pop().unwrap();
    assert_eq!(view.displayed_age, Some(30));
    assert_eq!(view.target_date, at(2030, 3, 1, 0, 0, 0));

    clock.set(at(2031, 3, 1, 0, 0, 0));
    assert_eq!(session.pump().len(), 1);
    assert_eq!(session.timers()[0].target_date, at(2032, 2, 29, 0, 0, 0));
    assert_eq!(session.timers()[0].displayed_age(), Some(32));
}

#[test]
fn event_expires_and_stays_expired() {
    let clock = FixedClock::new(at(2025, 12, 31, 23, 58, 0));
    let mut session = session(&clock);
    session.create(&event_input("2025-12-31", "23:59")).unwrap();

    clock.advance(Duration::seconds(30));
    let pending = session.pump().pop().unwrap();
    assert!(!pending.remaining.is_expired);
    assert_eq!(pending.remaining.seconds, 30);

    for _ in 0..3 {
        clock.advance(Duration::seconds(30));
        let view = session.pump().pop().unwrap();
        assert!(view.remaining.is_expired);
        assert_eq!(view.target_date, at(2025, 12, 31, 23, 59, 0));
    }
}

#[test]
fn unmounted_card_stops_ticking_and_remounts_on_demand() {
    let clock = FixedClock::new(at(2025, 1, 1, 0, 0, 0));
    let mut session = session(&clock);
    let timer = session.create(&event_input("2025-02-01", "10:00")).unwrap();
    assert!(session.is_mounted(timer.id));

    assert!(session.unmount(timer.id));
    clock.advance(Duration::seconds(5));
    assert!(session.pump().is_empty());

    let view = session.mount(timer.id).unwrap();
    assert_eq!(view.id, timer.id);
    clock.advance(Duration::seconds(1));
    assert_eq!(session.pump().len(), 1);
}

#[test]
fn deleted_timer_is_never_ticked_again() {
    let clock = FixedClock::new(at(2025, 1, 1, 0, 0, 0));
    let mut session = session(&clock);
    let kept = session.create(&event_input("2025-02-01", "10:00")).unwrap();
    let gone = session.create(&birthday_input("1990-01-01", 1990)).unwrap();

    assert!(session.delete(gone.id));
    assert!(!session.is_mounted(gone.id));
    assert!(!session.delete(gone.id));

    clock.advance(Duration::seconds(1));
    let views = session.pump();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].id, kept.id);
}

#[test]
fn stalled_card_ticks_once_then_resumes_cadence() {
    let clock = FixedClock::new(at(2025, 1, 1, 0, 0, 0));
    let mut session = session(&clock);
    session.create(&event_input("2025-02-01", "10:00")).unwrap();

    clock.advance(Duration::seconds(10));
    assert_eq!(session.pump().len(), 1);
    assert!(session.pump().is_empty());

    clock.advance(Duration::milliseconds(999));
    assert!(session.pump().is_empty());
    clock.advance(Duration::milliseconds(1));
    assert_eq!(session.pump().len(), 1);
}

#[test]
fn mount_all_renders_in_insertion_order() {
    let clock = FixedClock::new(at(2025, 1, 1, 0, 0, 0));
    let mut session = session(&clock);
    let later = session.create(&event_input("2026-01-01", "00:00")).unwrap();
    let sooner = session.create(&event_input("2025-06-01", "00:00")).unwrap();
    session.unmount(later.id);
    session.unmount(sooner.id);

    let views = session.mount_all();
    let ids: Vec<_> = views.iter().map(|view| view.id).collect();
    assert_eq!(ids, vec![later.id, sooner.id]);
    assert_eq!(session.mounted_count(), 2);
}

fn clock_now(session: &TickSession<NullPersistence, FixedClock>) -> NaiveDateTime {
    session.service().now()
}
