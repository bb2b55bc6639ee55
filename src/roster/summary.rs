use chrono::NaiveDate;
use serde::Serialize;

use super::breaks::{eligible_breaks, BreakCode};
use super::models::{DailyMemo, Day, DayMap, Shift, WorkerId};
use super::store::RosterState;
use crate::utils::time::compute_hours;

/// One rostered day of a worker in the summary table
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryCell {
    pub role: String,
    /// "HH:MM - HH:MM" once both times are set
    pub time_range: Option<String>,
    /// Starts at the day's opening time
    pub opening: bool,
    /// Ends at the day's closing time
    pub closing: bool,
    pub hours: f64,
    pub breaks: Vec<BreakCode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRow {
    pub worker_id: WorkerId,
    pub name: String,
    pub title: String,
    pub remark: String,
    /// e.g. "38.5 hrs"; empty for a worker without hours
    pub weekly_hours: String,
    /// `None` on days the worker is not rostered
    pub cells: DayMap<Option<SummaryCell>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoLine {
    pub label: &'static str,
    pub value: String,
}

/// Printable weekly summary of the roster
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterSummary {
    pub title: String,
    pub subtitle: String,
    /// e.g. "01 Sep - 07 Sep"
    pub week_range: String,
    /// e.g. "01 Sep, 2025"
    pub day_headers: DayMap<String>,
    pub rows: Vec<SummaryRow>,
    pub memos: DayMap<Vec<MemoLine>>,
    pub daily_totals: DayMap<f64>,
    pub week_total: f64,
}

/// Format decimal hours for display, blank when zero
pub fn format_hours(hours: f64) -> String {
    if hours > 0.0 {
        format!("{:.1} hrs", hours)
    } else {
        String::new()
    }
}

/// Project the roster into the summary table
pub fn build_summary(state: &RosterState) -> RosterSummary {
    let totals = state.totals();
    let dates = state.week_dates();

    let week_range = dates
        .as_ref()
        .map(|dates| format!("{} - {}", short_date(dates[Day::Mon]), short_date(dates[Day::Sun])))
        .unwrap_or_default();

    let day_headers = DayMap::from_fn(|day| {
        dates
            .as_ref()
            .map(|dates| dates[day].format("%d %b, %Y").to_string())
            .unwrap_or_default()
    });

    let rows = state
        .workers
        .iter()
        .map(|worker| SummaryRow {
            worker_id: worker.id,
            name: worker.name.clone(),
            title: worker.title.clone(),
            remark: worker.remark.clone(),
            weekly_hours: format_hours(totals.hours_for(worker.id).unwrap_or_default()),
            cells: worker.shifts.map(|day, shift| summary_cell(state, day, shift)),
        })
        .collect();

    RosterSummary {
        title: state.roster_info.title.clone(),
        subtitle: state.roster_info.subtitle.clone(),
        week_range,
        day_headers,
        rows,
        memos: state.daily_memos.map(|_, memo| memo_lines(memo)),
        daily_totals: totals.daily_totals,
        week_total: totals.week_total,
    }
}

fn short_date(date: NaiveDate) -> String {
    date.format("%d %b").to_string()
}

fn summary_cell(state: &RosterState, day: Day, shift: &Shift) -> Option<SummaryCell> {
    if !shift.editable {
        return None;
    }
    let hours = compute_hours(&shift.start_time, &shift.end_time);
    Some(SummaryCell {
        role: shift.role.clone(),
        time_range: shift
            .has_times()
            .then(|| format!("{} - {}", shift.start_time, shift.end_time)),
        opening: !shift.start_time.is_empty() && shift.start_time == state.start_times[day],
        closing: !shift.end_time.is_empty() && shift.end_time == state.end_times[day],
        hours,
        breaks: eligible_breaks(hours, &state.break_min_hours),
    })
}

fn memo_lines(memo: &DailyMemo) -> Vec<MemoLine> {
    let mut lines = Vec::new();
    if !memo.duty_supervisor.is_empty() {
        lines.push(MemoLine {
            label: "Duty supervisor",
            value: memo.duty_supervisor.clone(),
        });
    }
    if memo.tray_of_rice > 0.0 {
        lines.push(MemoLine {
            label: "Rice",
            value: memo.tray_of_rice.to_string(),
        });
    }
    if !memo.oil_changer.is_empty() {
        lines.push(MemoLine {
            label: "Oil",
            value: memo.oil_changer.clone(),
        });
    }
    if !memo.remark.is_empty() {
        lines.push(MemoLine {
            label: "Remark",
            value: memo.remark.clone(),
        });
    }
    lines
}
