//! Settings file export and import.
//!
//! Export writes the whole editable roster as one JSON document. Import is a
//! validator: the document is checked and decoded into a [`SettingsUpdate`]
//! before anything touches the live state, so a rejected file leaves the
//! roster exactly as it was. Each top-level section is applied only when it
//! is present and of the right shape; worker entries without a string name
//! or a shifts object (an array counts as one with no days) are dropped
//! without failing the import.

use chrono::{DateTime, Local, SecondsFormat, TimeZone, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::breaks::{BreakCode, BreakThresholds};
use super::models::{DailyMemo, Day, DayMap, RosterInfo, Shift, Worker, WorkerId};
use super::store::RosterState;
use crate::error::{settings_error, RosterResult};

/// Message shown when a settings file cannot be used
pub const INVALID_SETTINGS_MESSAGE: &str =
    "Error loading settings file. Please check the file format.";

/// The persisted settings file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettingsDocument {
    pub roles: Vec<String>,
    pub start_times: DayMap<String>,
    pub end_times: DayMap<String>,
    pub break_min_hours: BreakThresholds,
    pub workers: Vec<Worker>,
    pub daily_memos: DayMap<DailyMemo>,
    pub roster_info: RosterInfo,
    /// ISO-8601 time of export
    pub export_date: String,
}

/// Snapshot the roster into a settings document
pub fn export_settings(state: &RosterState, exported_at: DateTime<Utc>) -> SettingsDocument {
    SettingsDocument {
        roles: state.roles.clone(),
        start_times: state.start_times.clone(),
        end_times: state.end_times.clone(),
        break_min_hours: state.break_min_hours.clone(),
        workers: state.workers.clone(),
        daily_memos: state.daily_memos.clone(),
        roster_info: state.roster_info.clone(),
        export_date: exported_at.to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

/// Export as pretty-printed JSON text
pub fn export_settings_json(state: &RosterState, exported_at: DateTime<Utc>) -> RosterResult<String> {
    let document = export_settings(state, exported_at);
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Download name for a settings export, e.g. `roster-settings-20250901T093000.json`
pub fn settings_file_name<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("roster-settings-{}.json", at.format("%Y%m%dT%H%M%S"))
}

/// Settings file name for the local current time
pub fn settings_file_name_now() -> String {
    settings_file_name(&Local::now())
}

/// JSON schema of the settings document
pub fn settings_schema() -> schemars::schema::RootSchema {
    schemars::schema_for!(SettingsDocument)
}

/// Roster info fields found in an imported document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RosterInfoUpdate {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub year: Option<i32>,
    pub week: Option<u32>,
}

/// The validated parts of an imported settings document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsUpdate {
    pub roles: Option<Vec<String>>,
    pub start_times: Option<DayMap<Option<String>>>,
    pub end_times: Option<DayMap<Option<String>>>,
    pub break_min_hours: Option<BreakThresholds>,
    pub workers: Option<Vec<Worker>>,
    /// Worker entries rejected by validation
    pub dropped_workers: usize,
    pub daily_memos: Option<DayMap<DailyMemo>>,
    pub roster_info: Option<RosterInfoUpdate>,
}

impl SettingsUpdate {
    /// Merge the update into `state`; sections absent from the file are left alone
    pub fn apply_to(self, state: &mut RosterState) {
        if let Some(roles) = self.roles {
            state.roles = roles;
        }
        if let Some(times) = self.start_times {
            merge_times(&mut state.start_times, times);
        }
        if let Some(times) = self.end_times {
            merge_times(&mut state.end_times, times);
        }
        if let Some(thresholds) = self.break_min_hours {
            state.break_min_hours = thresholds;
        }
        if let Some(workers) = self.workers {
            state.workers = workers;
        }
        if let Some(memos) = self.daily_memos {
            state.daily_memos = memos;
        }
        if let Some(info) = self.roster_info {
            if let Some(title) = info.title {
                state.roster_info.title = title;
            }
            if let Some(subtitle) = info.subtitle {
                state.roster_info.subtitle = subtitle;
            }
            if let Some(year) = info.year {
                state.roster_info.year = year;
            }
            if let Some(week) = info.week {
                state.roster_info.week = week.max(1);
            }
        }
    }
}

fn merge_times(current: &mut DayMap<String>, update: DayMap<Option<String>>) {
    for (day, time) in current.iter_mut() {
        if let Some(new_time) = &update[day] {
            *time = new_time.clone();
        }
    }
}

/// Parse and validate settings JSON text
pub fn import_settings(json: &str) -> RosterResult<SettingsUpdate> {
    let value: Value = serde_json::from_str(json).map_err(|e| {
        warn!("Settings file is not valid JSON: {}", e);
        settings_error(INVALID_SETTINGS_MESSAGE)
    })?;
    validate_settings(&value)
}

/// Parse, validate and apply settings JSON text to `state`.
///
/// On error the state is left untouched.
pub fn import_settings_into(state: &mut RosterState, json: &str) -> RosterResult<()> {
    let update = import_settings(json)?;
    info!(
        "Importing settings: {} workers accepted, {} dropped",
        update.workers.as_ref().map_or(0, Vec::len),
        update.dropped_workers
    );
    update.apply_to(state);
    Ok(())
}

/// Check a parsed document and decode the sections that have a usable shape
pub fn validate_settings(value: &Value) -> RosterResult<SettingsUpdate> {
    let Some(root) = value.as_object() else {
        warn!("Settings document is not a JSON object");
        return Err(settings_error(INVALID_SETTINGS_MESSAGE));
    };

    let mut update = SettingsUpdate {
        roles: root.get("roles").and_then(decode_roles),
        start_times: root.get("startTimes").and_then(decode_times),
        end_times: root.get("endTimes").and_then(decode_times),
        break_min_hours: root.get("breakMinHours").and_then(decode_thresholds),
        daily_memos: root.get("dailyMemos").and_then(decode_memos),
        roster_info: root.get("rosterInfo").and_then(decode_roster_info),
        ..SettingsUpdate::default()
    };

    if let Some(entries) = root.get("workers").and_then(Value::as_array) {
        let workers: Vec<Worker> = entries.iter().filter_map(decode_worker).collect();
        update.dropped_workers = entries.len() - workers.len();
        if update.dropped_workers > 0 {
            debug!("Dropped {} malformed worker entries", update.dropped_workers);
        }
        update.workers = Some(workers);
    }

    Ok(update)
}

fn decode_roles(value: &Value) -> Option<Vec<String>> {
    let roles = value
        .as_array()?
        .iter()
        .filter_map(Value::as_str)
        .map(String::from)
        .collect();
    Some(roles)
}

fn decode_times(value: &Value) -> Option<DayMap<Option<String>>> {
    let object = value.as_object()?;
    Some(DayMap::from_fn(|day| {
        object
            .get(day.as_str())
            .and_then(Value::as_str)
            .map(String::from)
    }))
}

fn decode_thresholds(value: &Value) -> Option<BreakThresholds> {
    let object = value.as_object()?;
    let mut thresholds = BreakThresholds::default();
    for code in BreakCode::PRIORITY {
        if let Some(hours) = object.get(code.as_str()).and_then(Value::as_f64) {
            thresholds.set(code, hours);
        }
    }
    Some(thresholds)
}

fn decode_memos(value: &Value) -> Option<DayMap<DailyMemo>> {
    let object = value.as_object()?;
    Some(DayMap::from_fn(|day| {
        object
            .get(day.as_str())
            .and_then(|memo| DailyMemo::deserialize(memo).ok())
            .unwrap_or_default()
    }))
}

fn decode_roster_info(value: &Value) -> Option<RosterInfoUpdate> {
    let object = value.as_object()?;
    Some(RosterInfoUpdate {
        title: string_field(object, "title"),
        subtitle: string_field(object, "subtitle"),
        year: object
            .get("year")
            .and_then(Value::as_i64)
            .and_then(|year| i32::try_from(year).ok()),
        week: object
            .get("week")
            .and_then(Value::as_u64)
            .and_then(|week| u32::try_from(week).ok()),
    })
}

/// Accept a worker with a string name and a shifts object; everything else is best effort.
///
/// A shifts array has no day keys, so every day of that worker reads as blank.
fn decode_worker(value: &Value) -> Option<Worker> {
    let object = value.as_object()?;
    let name = object.get("name")?.as_str()?.to_string();
    let shifts = match object.get("shifts")? {
        Value::Object(shifts) => Some(shifts),
        Value::Array(_) => None,
        _ => return None,
    };

    let id = object
        .get("id")
        .and_then(Value::as_str)
        .and_then(|id| Uuid::from_str(id).ok())
        .map(WorkerId::from)
        .unwrap_or_default();

    Some(Worker {
        id,
        name,
        title: string_field(object, "title").unwrap_or_default(),
        remark: string_field(object, "remark").unwrap_or_default(),
        shifts: DayMap::from_fn(|day| match shifts {
            Some(shifts) => decode_shift(shifts, day),
            None => Shift::blank(false),
        }),
    })
}

/// A day entry that cannot be read becomes an unrostered blank shift
fn decode_shift(shifts: &Map<String, Value>, day: Day) -> Shift {
    let Some(mut shift) = shifts
        .get(day.as_str())
        .and_then(|entry| Shift::deserialize(entry).ok())
    else {
        return Shift::blank(false);
    };

    if !shift.editable {
        return Shift::blank(false);
    }
    shift.refresh_hours();
    shift
}

fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(String::from)
}
