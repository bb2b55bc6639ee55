use serde::Serialize;

use super::models::{Day, DayMap, Worker, WorkerId};
use crate::utils::time::{generate_time_slots, minutes_to_time, time_to_minutes};

/// A worker on shift during one half-hour slot
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveWorker {
    pub worker_index: usize,
    pub worker_id: WorkerId,
    pub worker_name: String,
    pub role: String,
}

/// Workers on shift at one slot time, per day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UtilizationRow {
    pub time: String,
    pub days: DayMap<Vec<ActiveWorker>>,
}

/// Half-hour by day occupancy of the roster
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct UtilizationGrid {
    pub rows: Vec<UtilizationRow>,
}

impl UtilizationGrid {
    /// Highest number of workers on shift in any slot of `day`
    pub fn peak_headcount(&self, day: Day) -> usize {
        self.rows
            .iter()
            .map(|row| row.days[day].len())
            .max()
            .unwrap_or(0)
    }
}

/// Earliest opening and latest closing across the week
pub fn chart_bounds(start_times: &DayMap<String>, end_times: &DayMap<String>) -> Option<(String, String)> {
    let earliest = start_times.values().filter_map(|t| time_to_minutes(t)).min()?;
    let latest = end_times.values().filter_map(|t| time_to_minutes(t)).max()?;
    Some((minutes_to_time(earliest), minutes_to_time(latest)))
}

/// Build the occupancy grid.
///
/// A worker occupies a slot when the day is rostered, the shift has a role,
/// and the slot time falls in `[start, end)`.
pub fn utilization_grid(
    workers: &[Worker],
    start_times: &DayMap<String>,
    end_times: &DayMap<String>,
) -> UtilizationGrid {
    let Some((earliest, latest)) = chart_bounds(start_times, end_times) else {
        return UtilizationGrid::default();
    };

    let rows = generate_time_slots(&earliest, &latest)
        .into_iter()
        .map(|time| {
            let slot = time_to_minutes(&time).unwrap_or_default();
            let days = DayMap::from_fn(|day| active_workers(workers, day, slot));
            UtilizationRow { time, days }
        })
        .collect();

    UtilizationGrid { rows }
}

fn active_workers(workers: &[Worker], day: Day, slot: u32) -> Vec<ActiveWorker> {
    workers
        .iter()
        .enumerate()
        .filter_map(|(index, worker)| {
            let shift = &worker.shifts[day];
            if !shift.editable || shift.role.is_empty() {
                return None;
            }
            let start = time_to_minutes(&shift.start_time)?;
            let end = time_to_minutes(&shift.end_time)?;
            (start <= slot && slot < end).then(|| ActiveWorker {
                worker_index: index,
                worker_id: worker.id,
                worker_name: worker.name.clone(),
                role: shift.role.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RosterDefaults;

    fn worker(name: &str, day: Day, start: &str, end: &str, role: &str) -> Worker {
        let mut worker = Worker::new(name, "", "", &DayMap::splat(true));
        let shift = &mut worker.shifts[day];
        shift.start_time = start.into();
        shift.end_time = end.into();
        shift.role = role.into();
        shift.refresh_hours();
        worker
    }

    #[test]
    fn test_chart_bounds_span_the_week() {
        let defaults = RosterDefaults::default();
        assert_eq!(
            chart_bounds(&defaults.start_times, &defaults.end_times),
            Some(("07:30".to_string(), "19:00".to_string()))
        );
        assert_eq!(chart_bounds(&DayMap::default(), &DayMap::default()), None);
    }

    #[test]
    fn test_slots_are_half_open() {
        let defaults = RosterDefaults::default();
        let workers = vec![
            worker("Aiko", Day::Mon, "09:00", "10:00", "Roll"),
            worker("Ben", Day::Mon, "09:30", "11:00", "Service"),
        ];
        let grid = utilization_grid(&workers, &defaults.start_times, &defaults.end_times);
        let at = |time: &str| {
            grid.rows
                .iter()
                .find(|row| row.time == time)
                .map(|row| row.days[Day::Mon].iter().map(|a| a.worker_name.as_str()).collect::<Vec<_>>())
                .unwrap()
        };

        assert!(at("08:30").is_empty());
        assert_eq!(at("09:00"), vec!["Aiko"]);
        assert_eq!(at("09:30"), vec!["Aiko", "Ben"]);
        assert_eq!(at("10:00"), vec!["Ben"]);
        assert!(at("11:00").is_empty());
        assert_eq!(grid.peak_headcount(Day::Mon), 2);
        assert_eq!(grid.peak_headcount(Day::Tue), 0);
    }

    #[test]
    fn test_shifts_without_role_are_not_charted() {
        let defaults = RosterDefaults::default();
        let workers = vec![worker("Aiko", Day::Fri, "09:00", "12:00", "")];
        let grid = utilization_grid(&workers, &defaults.start_times, &defaults.end_times);
        assert_eq!(grid.peak_headcount(Day::Fri), 0);
        // 07:30 .. 19:00 inclusive
        assert_eq!(grid.rows.len(), 24);
    }
}
