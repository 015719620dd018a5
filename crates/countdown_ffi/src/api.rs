//! FFI use-case API for UI-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level timer functions to the UI via FRB.
//! - Translate core views into flat, string-friendly DTOs.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Every call opens the configured slot, applies one use-case and lets the
//!   store persist before returning, so the next call observes the update.
//! - The UI owns the per-card interval; it calls `timer_tick` every
//!   `tick_interval_ms` and clears the interval when the card unmounts or
//!   when `timer_tick` returns `None`.

use crate::labels::{
    age_label, expired_banner, pad_unit, target_date_label, unit_display, CountdownUnit,
    LabelLocale,
};
use chrono::NaiveDateTime;
use countdown_core::db::open_db;
use countdown_core::{
    core_version as core_version_inner, init_logging as init_logging_inner,
    parse_timer_id, ping as ping_inner, CoreConfig, SqliteSlotPersistence, SystemClock,
    TimerInput, TimerService, TimerStore, TimerView,
};
use log::warn;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const DEFAULT_DB_FILE_NAME: &str = "countdown_timers.sqlite3";
const TARGET_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

static SETTINGS: OnceLock<FfiSettings> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Eq)]
struct FfiSettings {
    db_path: PathBuf,
    config: CoreConfig,
}

impl Default for FfiSettings {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            config: CoreConfig::default(),
        }
    }
}

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - `level`: `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path for rolling logs.
/// - Idempotent for the same `level + log_dir`.
/// - Returns empty string on success and an error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Sets the slot database path and core config for this process.
///
/// # FFI contract
/// - `config_json`: optional JSON object; missing fields take defaults.
/// - May be called once; repeating the same settings is a no-op, different
///   settings are rejected.
/// - Until it succeeds, `timer_*` calls use a temp-dir database with default
///   config. Those calls do not lock the defaults in.
/// - Returns empty string on success and an error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn configure(db_path: String, config_json: Option<String>) -> String {
    configure_in(&SETTINGS, &db_path, config_json.as_deref())
}

/// One countdown card as rendered by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerCardView {
    pub timer_id: String,
    pub title: String,
    /// `event` or `birthday`.
    pub kind: String,
    /// ISO-8601 local date-time.
    pub target_date: String,
    pub birth_year: Option<i32>,
    pub days: u64,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    pub is_expired: bool,
    pub displayed_age: Option<i32>,
}

/// List response envelope for the timer list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerListResponse {
    /// Cards in insertion order.
    pub items: Vec<TimerCardView>,
    pub message: String,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerActionResponse {
    pub ok: bool,
    pub timer_id: Option<String>,
    /// User-facing message; the validation reason on failure.
    pub message: String,
}

impl TimerActionResponse {
    fn success(message: impl Into<String>, timer_id: String) -> Self {
        Self {
            ok: true,
            timer_id: Some(timer_id),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            timer_id: None,
            message: message.into(),
        }
    }
}

/// Creates an event or birthday timer from form input.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Validation failures return `ok=false` with a user-facing message and
///   create nothing.
#[flutter_rust_bridge::frb(sync)]
pub fn timer_create(
    title: String,
    date: String,
    time: Option<String>,
    kind: String,
    birth_year: Option<i32>,
) -> TimerActionResponse {
    let input = TimerInput {
        title,
        date,
        time,
        kind,
        birth_year,
    };
    create_at(&settings(), &input)
}

/// Deletes a timer. Unknown ids succeed as a no-op.
#[flutter_rust_bridge::frb(sync)]
pub fn timer_delete(timer_id: String) -> TimerActionResponse {
    delete_at(&settings(), &timer_id)
}

/// Evaluates every timer once and returns the cards in insertion order.
///
/// Birthday rollovers discovered here are persisted.
#[flutter_rust_bridge::frb(sync)]
pub fn timer_list() -> TimerListResponse {
    list_at(&settings())
}

/// Runs one card tick. `None` means the timer is gone and the UI should
/// clear that card's interval.
#[flutter_rust_bridge::frb(sync)]
pub fn timer_tick(timer_id: String) -> Option<TimerCardView> {
    tick_at(&settings(), &timer_id)
}

/// Number of stored timers, for the list header.
#[flutter_rust_bridge::frb(sync)]
pub fn timer_count() -> u32 {
    count_at(&settings())
}

/// Formats a displayed age with locale plural rules, e.g. `35 лет`.
#[flutter_rust_bridge::frb(sync)]
pub fn format_age(age: i32, locale: String) -> String {
    age_label(age, LabelLocale::from_tag(&locale))
}

/// Zero-padded countdown unit with its caption, e.g. `05 дней`.
///
/// Unknown `unit` tags render the padded value alone.
#[flutter_rust_bridge::frb(sync)]
pub fn format_unit(value: u64, unit: String, locale: String) -> String {
    match CountdownUnit::from_tag(&unit) {
        Some(unit) => unit_display(value, unit, LabelLocale::from_tag(&locale)),
        None => pad_unit(value),
    }
}

/// Long localized label for a card's `target_date`.
///
/// Input that is not a card `target_date` is returned unchanged.
#[flutter_rust_bridge::frb(sync)]
pub fn format_target_date(target_date: String, locale: String) -> String {
    match NaiveDateTime::parse_from_str(target_date.trim(), TARGET_DATE_FORMAT) {
        Ok(target) => target_date_label(target, LabelLocale::from_tag(&locale)),
        Err(_) => target_date,
    }
}

/// Localized banner for an expired event.
#[flutter_rust_bridge::frb(sync)]
pub fn expired_message(locale: String) -> String {
    expired_banner(LabelLocale::from_tag(&locale)).to_string()
}

fn settings() -> FfiSettings {
    settings_in(&SETTINGS)
}

fn settings_in(cell: &OnceLock<FfiSettings>) -> FfiSettings {
    cell.get().cloned().unwrap_or_default()
}

fn configure_in(
    cell: &OnceLock<FfiSettings>,
    db_path: &str,
    config_json: Option<&str>,
) -> String {
    match build_settings(db_path, config_json) {
        Ok(settings) => {
            let active = cell.get_or_init(|| settings.clone());
            if *active == settings {
                String::new()
            } else {
                format!(
                    "already configured with `{}`; refusing to switch",
                    active.db_path.display()
                )
            }
        }
        Err(err) => err,
    }
}

fn build_settings(db_path: &str, config_json: Option<&str>) -> Result<FfiSettings, String> {
    let trimmed = db_path.trim();
    if trimmed.is_empty() {
        return Err("db_path cannot be empty".to_string());
    }
    let config = match config_json.map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => CoreConfig::from_json_str(raw).map_err(|err| err.to_string())?,
        None => CoreConfig::default(),
    };
    Ok(FfiSettings {
        db_path: PathBuf::from(trimmed),
        config,
    })
}

fn with_service<T>(
    settings: &FfiSettings,
    f: impl FnOnce(&mut TimerService<SqliteSlotPersistence<'_>, SystemClock>) -> T,
) -> Result<T, String> {
    let conn = open_db(Path::new(&settings.db_path))
        .map_err(|err| format!("timer DB open failed: {err}"))?;
    let slot = SqliteSlotPersistence::try_new(&conn, settings.config.storage_key.clone())
        .map_err(|err| format!("timer slot init failed: {err}"))?;
    let mut service = TimerService::new(
        TimerStore::load(slot),
        SystemClock,
        settings.config.clone(),
    );
    Ok(f(&mut service))
}

fn create_at(settings: &FfiSettings, input: &TimerInput) -> TimerActionResponse {
    match with_service(settings, |service| service.create(input)) {
        Ok(Ok(timer)) => TimerActionResponse::success("Timer created.", timer.id.to_string()),
        Ok(Err(err)) => TimerActionResponse::failure(err.to_string()),
        Err(err) => TimerActionResponse::failure(format!("timer_create failed: {err}")),
    }
}

fn delete_at(settings: &FfiSettings, raw_id: &str) -> TimerActionResponse {
    let Some(id) = parse_timer_id(raw_id) else {
        return TimerActionResponse::failure(format!("invalid timer id `{}`", raw_id.trim()));
    };
    match with_service(settings, |service| service.delete(id)) {
        Ok(true) => TimerActionResponse::success("Timer deleted.", id.to_string()),
        Ok(false) => TimerActionResponse::success("Timer already gone.", id.to_string()),
        Err(err) => TimerActionResponse::failure(format!("timer_delete failed: {err}")),
    }
}

fn list_at(settings: &FfiSettings) -> TimerListResponse {
    match with_service(settings, |service| service.tick_all()) {
        Ok(views) => {
            let items = views.into_iter().map(to_card_view).collect::<Vec<_>>();
            let message = if items.is_empty() {
                "No active timers yet.".to_string()
            } else {
                format!("Active timers ({}).", items.len())
            };
            TimerListResponse { items, message }
        }
        Err(err) => TimerListResponse {
            items: Vec::new(),
            message: format!("timer_list failed: {err}"),
        },
    }
}

fn tick_at(settings: &FfiSettings, raw_id: &str) -> Option<TimerCardView> {
    let id = parse_timer_id(raw_id)?;
    match with_service(settings, |service| service.tick(id)) {
        Ok(view) => view.map(to_card_view),
        Err(err) => {
            warn!("event=timer_tick module=ffi status=error error={err}");
            None
        }
    }
}

fn count_at(settings: &FfiSettings) -> u32 {
    with_service(settings, |service| service.timers().len())
        .map(|count| u32::try_from(count).unwrap_or(u32::MAX))
        .unwrap_or(0)
}

fn to_card_view(view: TimerView) -> TimerCardView {
    TimerCardView {
        timer_id: view.id.to_string(),
        title: view.title,
        kind: view.kind.label().to_string(),
        target_date: view.target_date.format(TARGET_DATE_FORMAT).to_string(),
        birth_year: match view.kind {
            countdown_core::TimerKind::Birthday { birth_year, .. } => Some(birth_year),
            countdown_core::TimerKind::Event => None,
        },
        days: view.remaining.days,
        hours: view.remaining.hours,
        minutes: view.remaining.minutes,
        seconds: view.remaining.seconds,
        is_expired: view.remaining.is_expired,
        displayed_age: view.displayed_age,
    }
}
