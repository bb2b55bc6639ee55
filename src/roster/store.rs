use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::aggregate::{recompute_aggregates, RosterTotals};
use super::breaks::{eligible_breaks, BreakCode, BreakThresholds};
use super::models::{DailyMemo, Day, DayMap, RosterInfo, Shift, Worker};
use super::period::{self, RosterPeriod};
use crate::config::RosterDefaults;
use crate::utils::time::{compute_hours, generate_time_slots};

/// Editable text fields of a worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WorkerField {
    Name,
    Title,
    Remark,
}

/// User-editable fields of a shift; `hours` is always derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShiftField {
    StartTime,
    EndTime,
    Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MemoField {
    DutySupervisor,
    OilChanger,
    TrayOfRice,
    Remark,
}

/// Opening or closing time of a day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DayBound {
    Start,
    End,
}

/// A requested change to the roster, as data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum RosterCommand {
    AddWorker {
        name: String,
        #[serde(default)]
        title: String,
        #[serde(default)]
        remark: String,
        /// Days the new worker is rostered on; all days when absent
        #[serde(default = "all_days")]
        days: DayMap<bool>,
    },
    RemoveWorker {
        index: usize,
    },
    UpdateWorkerField {
        index: usize,
        field: WorkerField,
        value: String,
    },
    ToggleDayEditable {
        index: usize,
        day: Day,
    },
    UpdateShift {
        index: usize,
        day: Day,
        field: ShiftField,
        value: String,
    },
    ResetShift {
        index: usize,
        day: Day,
    },
    AddRole {
        role: String,
    },
    RemoveRole {
        index: usize,
    },
    SetDayBound {
        day: Day,
        bound: DayBound,
        time: String,
    },
    SetBreakThreshold {
        code: BreakCode,
        hours: f64,
    },
    UpdateDailyMemo {
        day: Day,
        field: MemoField,
        value: String,
    },
    SetRosterTitle {
        title: String,
    },
    SetRosterSubtitle {
        subtitle: String,
    },
    SelectPeriod {
        year: i32,
        week: u32,
    },
    AdvanceWeek {
        delta: i64,
    },
    JumpToCurrentWeek,
}

fn all_days() -> DayMap<bool> {
    DayMap::splat(true)
}

/// The whole editable roster: configuration, workers, memos and period
#[derive(Debug, Clone, PartialEq)]
pub struct RosterState {
    pub roles: Vec<String>,
    pub start_times: DayMap<String>,
    pub end_times: DayMap<String>,
    pub break_min_hours: BreakThresholds,
    pub workers: Vec<Worker>,
    pub daily_memos: DayMap<DailyMemo>,
    pub roster_info: RosterInfo,
}

impl RosterState {
    /// Empty roster for `period` using the configured defaults
    pub fn new(defaults: &RosterDefaults, period: RosterPeriod) -> Self {
        Self {
            roles: defaults.roles.clone(),
            start_times: defaults.start_times.clone(),
            end_times: defaults.end_times.clone(),
            break_min_hours: defaults.break_min_hours.clone(),
            workers: Vec::new(),
            daily_memos: DayMap::default(),
            roster_info: RosterInfo {
                title: String::new(),
                subtitle: String::new(),
                year: period.year,
                week: period.week,
            },
        }
    }

    /// Apply a command and hand back the updated state
    #[must_use]
    pub fn apply(mut self, command: RosterCommand) -> Self {
        self.execute(command);
        self
    }

    /// Apply a command in place
    pub fn execute(&mut self, command: RosterCommand) {
        debug!("Applying roster command: {:?}", command);
        match command {
            RosterCommand::AddWorker {
                name,
                title,
                remark,
                days,
            } => self.add_worker(&name, &title, &remark, &days),
            RosterCommand::RemoveWorker { index } => self.remove_worker(index),
            RosterCommand::UpdateWorkerField {
                index,
                field,
                value,
            } => self.update_worker_field(index, field, value),
            RosterCommand::ToggleDayEditable { index, day } => self.toggle_day_editable(index, day),
            RosterCommand::UpdateShift {
                index,
                day,
                field,
                value,
            } => self.update_shift(index, day, field, value),
            RosterCommand::ResetShift { index, day } => self.reset_shift(index, day),
            RosterCommand::AddRole { role } => self.add_role(&role),
            RosterCommand::RemoveRole { index } => self.remove_role(index),
            RosterCommand::SetDayBound { day, bound, time } => self.set_day_bound(day, bound, time),
            RosterCommand::SetBreakThreshold { code, hours } => {
                self.set_break_threshold(code, hours)
            }
            RosterCommand::UpdateDailyMemo { day, field, value } => {
                self.update_daily_memo(day, field, value)
            }
            RosterCommand::SetRosterTitle { title } => self.set_roster_title(title),
            RosterCommand::SetRosterSubtitle { subtitle } => self.set_roster_subtitle(subtitle),
            RosterCommand::SelectPeriod { year, week } => {
                self.select_period(RosterPeriod::new(year, week))
            }
            RosterCommand::AdvanceWeek { delta } => self.advance_week(delta),
            RosterCommand::JumpToCurrentWeek => self.jump_to_current_week(),
        }
    }

    pub fn add_worker(&mut self, name: &str, title: &str, remark: &str, days: &DayMap<bool>) {
        self.workers.push(Worker::new(name, title, remark, days));
    }

    pub fn remove_worker(&mut self, index: usize) {
        if index < self.workers.len() {
            self.workers.remove(index);
        }
    }

    pub fn update_worker_field(&mut self, index: usize, field: WorkerField, value: String) {
        let Some(worker) = self.workers.get_mut(index) else {
            return;
        };
        match field {
            WorkerField::Name => worker.name = value,
            WorkerField::Title => worker.title = value,
            WorkerField::Remark => worker.remark = value,
        }
    }

    /// Flip whether the worker is rostered on `day`; the shift starts blank either way
    pub fn toggle_day_editable(&mut self, index: usize, day: Day) {
        if let Some(shift) = self.shift_mut(index, day) {
            *shift = Shift::blank(!shift.editable);
        }
    }

    /// Set a shift field; changing either time recomputes the hours
    pub fn update_shift(&mut self, index: usize, day: Day, field: ShiftField, value: String) {
        let Some(shift) = self.shift_mut(index, day) else {
            return;
        };
        if !shift.editable {
            return;
        }
        match field {
            ShiftField::StartTime => shift.start_time = value,
            ShiftField::EndTime => shift.end_time = value,
            ShiftField::Role => shift.role = value,
        }
        if field != ShiftField::Role {
            shift.refresh_hours();
        }
    }

    pub fn reset_shift(&mut self, index: usize, day: Day) {
        if let Some(shift) = self.shift_mut(index, day) {
            if shift.editable {
                *shift = Shift::blank(true);
            }
        }
    }

    /// Append a role unless it is blank or already listed
    pub fn add_role(&mut self, role: &str) {
        let role = role.trim();
        if role.is_empty() || self.roles.iter().any(|existing| existing == role) {
            return;
        }
        self.roles.push(role.to_string());
    }

    pub fn remove_role(&mut self, index: usize) {
        if index < self.roles.len() {
            self.roles.remove(index);
        }
    }

    pub fn set_day_bound(&mut self, day: Day, bound: DayBound, time: String) {
        match bound {
            DayBound::Start => self.start_times[day] = time,
            DayBound::End => self.end_times[day] = time,
        }
    }

    pub fn set_break_threshold(&mut self, code: BreakCode, hours: f64) {
        self.break_min_hours.set(code, hours);
    }

    pub fn set_roster_title(&mut self, title: String) {
        self.roster_info.title = title;
    }

    pub fn set_roster_subtitle(&mut self, subtitle: String) {
        self.roster_info.subtitle = subtitle;
    }

    pub fn update_daily_memo(&mut self, day: Day, field: MemoField, value: String) {
        let memo = &mut self.daily_memos[day];
        match field {
            MemoField::DutySupervisor => memo.duty_supervisor = value,
            MemoField::OilChanger => memo.oil_changer = value,
            MemoField::Remark => memo.remark = value,
            MemoField::TrayOfRice => {
                memo.tray_of_rice = value
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|trays| trays.is_finite() && *trays > 0.0)
                    .unwrap_or(0.0);
            }
        }
    }

    /// Select a period; periods without a representable date are ignored
    pub fn select_period(&mut self, period: RosterPeriod) {
        if period::week_start_date(period.year, period.week).is_some() {
            self.roster_info.year = period.year;
            self.roster_info.week = period.week;
        }
    }

    pub fn advance_week(&mut self, delta: i64) {
        if let Some(next) = period::advance_week(self.period(), delta) {
            self.select_period(next);
        }
    }

    /// Select the week containing today's local date
    pub fn jump_to_current_week(&mut self) {
        if let Some(current) = period::current_period() {
            self.select_period(current);
        }
    }

    pub fn period(&self) -> RosterPeriod {
        RosterPeriod::new(self.roster_info.year, self.roster_info.week)
    }

    /// Dates of the selected week, Monday first
    pub fn week_dates(&self) -> Option<DayMap<NaiveDate>> {
        let period = self.period();
        period::week_dates(period.year, period.week)
    }

    /// Selectable shift times for `day`
    pub fn day_time_slots(&self, day: Day) -> Vec<String> {
        generate_time_slots(&self.start_times[day], &self.end_times[day])
    }

    pub fn totals(&self) -> RosterTotals {
        recompute_aggregates(&self.workers)
    }

    /// Breaks earned by one shift under the current thresholds
    pub fn breaks_for(&self, index: usize, day: Day) -> Vec<BreakCode> {
        match self.workers.get(index) {
            Some(worker) if worker.shifts[day].editable => {
                let shift = &worker.shifts[day];
                eligible_breaks(
                    compute_hours(&shift.start_time, &shift.end_time),
                    &self.break_min_hours,
                )
            }
            _ => Vec::new(),
        }
    }

    fn shift_mut(&mut self, index: usize, day: Day) -> Option<&mut Shift> {
        self.workers
            .get_mut(index)
            .map(|worker| &mut worker.shifts[day])
    }
}
