use serde::Serialize;
use std::collections::HashMap;

use super::models::{DayMap, Worker, WorkerId};

/// Label used for workers without a name in the name-keyed view
pub const UNNAMED_WORKER: &str = "Unnamed";

/// Weekly hours of one worker
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerHours {
    pub worker_id: WorkerId,
    pub name: String,
    pub hours: f64,
}

/// Hour totals derived from the current roster
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterTotals {
    /// One entry per worker, in roster order
    pub weekly_hours: Vec<WorkerHours>,
    pub daily_totals: DayMap<f64>,
    pub week_total: f64,
}

impl RosterTotals {
    /// Hours for a specific worker
    pub fn hours_for(&self, id: WorkerId) -> Option<f64> {
        self.weekly_hours
            .iter()
            .find(|entry| entry.worker_id == id)
            .map(|entry| entry.hours)
    }

    /// Hours keyed by worker name.
    ///
    /// Workers sharing a name collapse onto one key and the later worker wins.
    pub fn weekly_hours_by_name(&self) -> HashMap<String, f64> {
        self.weekly_hours
            .iter()
            .map(|entry| {
                let name = if entry.name.is_empty() {
                    UNNAMED_WORKER.to_string()
                } else {
                    entry.name.clone()
                };
                (name, entry.hours)
            })
            .collect()
    }
}

/// Recompute weekly, daily and grand totals from scratch
pub fn recompute_aggregates(workers: &[Worker]) -> RosterTotals {
    let mut daily_totals = DayMap::splat(0.0);
    let mut weekly_hours = Vec::with_capacity(workers.len());

    for worker in workers {
        let mut total = 0.0;
        for (day, shift) in worker.shifts.iter() {
            let hours = shift.worked_hours();
            total += hours;
            daily_totals[day] += hours;
        }
        weekly_hours.push(WorkerHours {
            worker_id: worker.id,
            name: worker.name.clone(),
            hours: total,
        });
    }

    let week_total = daily_totals.values().sum();
    RosterTotals {
        weekly_hours,
        daily_totals,
        week_total,
    }
}
