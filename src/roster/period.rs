//! Financial-year week arithmetic.
//!
//! A financial year starts on the Monday of the calendar week that contains
//! July 1 of its year. Weeks are numbered from 1 and always run Monday to
//! Sunday.

use chrono::{Datelike, Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use super::models::DayMap;

/// A roster week identified by financial year and 1-based week number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterPeriod {
    pub year: i32,
    pub week: u32,
}

impl RosterPeriod {
    /// Week numbers below 1 are clamped to the first week
    pub fn new(year: i32, week: u32) -> Self {
        Self {
            year,
            week: week.max(1),
        }
    }
}

/// Monday of the week containing July 1 of `year`
pub fn financial_year_start(year: i32) -> Option<NaiveDate> {
    let july_first = NaiveDate::from_ymd_opt(year, 7, 1)?;
    let offset = july_first.weekday().num_days_from_monday();
    july_first.checked_sub_signed(Duration::days(i64::from(offset)))
}

/// Monday of week `week` in financial year `year`
pub fn week_start_date(year: i32, week: u32) -> Option<NaiveDate> {
    let start = financial_year_start(year)?;
    let weeks = i64::from(week.max(1) - 1);
    start.checked_add_signed(Duration::try_weeks(weeks)?)
}

/// The seven dates of a roster week, Monday first
pub fn week_dates(year: i32, week: u32) -> Option<DayMap<NaiveDate>> {
    let monday = week_start_date(year, week)?;
    let dates: Option<Vec<NaiveDate>> = (0..7)
        .map(|offset| monday.checked_add_signed(Duration::days(offset)))
        .collect();
    let dates = dates?;
    Some(DayMap::from_fn(|day| dates[day.index()]))
}

/// Financial year and week number containing `date`
pub fn resolve_period(date: NaiveDate) -> Option<RosterPeriod> {
    let this_year = financial_year_start(date.year())?;
    let fy_start = if date < this_year {
        financial_year_start(date.year() - 1)?
    } else {
        this_year
    };

    // fy_start never falls before late June, so its calendar year is the financial year
    let days = date.signed_duration_since(fy_start).num_days();
    let week = u32::try_from(days / 7 + 1).ok()?;
    Some(RosterPeriod {
        year: fy_start.year(),
        week,
    })
}

/// Move `delta` weeks forward (or back) and renumber within the right year
pub fn advance_week(period: RosterPeriod, delta: i64) -> Option<RosterPeriod> {
    let monday = week_start_date(period.year, period.week)?;
    // Jumps beyond chrono's range yield None instead of panicking
    let moved = monday.checked_add_signed(Duration::try_weeks(delta)?)?;
    resolve_period(moved)
}

/// Period of the local current date
pub fn current_period() -> Option<RosterPeriod> {
    resolve_period(Local::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::models::Day;
    use chrono::Weekday;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_financial_year_start() {
        // 2024-07-01 is a Monday
        assert_eq!(financial_year_start(2024), Some(date(2024, 7, 1)));
        // 2025-07-01 is a Tuesday
        assert_eq!(financial_year_start(2025), Some(date(2025, 6, 30)));
        // 2029-07-01 is a Sunday, so the week began six days earlier
        assert_eq!(financial_year_start(2029), Some(date(2029, 6, 25)));
        // 2023-07-01 is a Saturday
        assert_eq!(financial_year_start(2023), Some(date(2023, 6, 26)));
    }

    #[test]
    fn test_financial_year_start_is_monday() {
        for year in 1990..2100 {
            let start = financial_year_start(year).unwrap();
            assert_eq!(start.weekday(), Weekday::Mon);
            let july_first = date(year, 7, 1);
            assert!(start <= july_first);
            assert!(july_first.signed_duration_since(start).num_days() < 7);
        }
    }

    #[test]
    fn test_week_dates_are_consecutive() {
        let dates = week_dates(2025, 10).unwrap();
        assert_eq!(dates[Day::Mon], date(2025, 9, 1));
        assert_eq!(dates[Day::Sun], date(2025, 9, 7));
        for (day, d) in dates.iter() {
            assert_eq!(Day::from_weekday(d.weekday()), day);
            assert_eq!(
                d.signed_duration_since(dates[Day::Mon]).num_days(),
                day.index() as i64
            );
        }
    }

    #[test]
    fn test_week_zero_clamps_to_first_week() {
        assert_eq!(week_start_date(2025, 0), week_start_date(2025, 1));
        assert_eq!(RosterPeriod::new(2025, 0).week, 1);
    }

    #[test]
    fn test_resolve_period() {
        // Before the financial start falls back into the previous year
        assert_eq!(
            resolve_period(date(2025, 6, 29)),
            Some(RosterPeriod::new(2024, 52))
        );
        assert_eq!(
            resolve_period(date(2025, 6, 30)),
            Some(RosterPeriod::new(2025, 1))
        );
        assert_eq!(
            resolve_period(date(2025, 7, 6)),
            Some(RosterPeriod::new(2025, 1))
        );
        assert_eq!(
            resolve_period(date(2025, 7, 7)),
            Some(RosterPeriod::new(2025, 2))
        );
        assert_eq!(
            resolve_period(date(2026, 1, 1)),
            Some(RosterPeriod::new(2025, 27))
        );
    }

    #[test]
    fn test_resolve_round_trip() {
        for year in 2000..2060 {
            for week in 1..=52 {
                let monday = week_start_date(year, week).unwrap();
                assert_eq!(
                    resolve_period(monday),
                    Some(RosterPeriod { year, week }),
                    "year {} week {}",
                    year,
                    week
                );
            }
        }
    }

    #[test]
    fn test_advance_week_crosses_year_boundary() {
        // 2024 financial year runs 2024-07-01 .. 2025-06-29, 52 weeks
        let last = RosterPeriod::new(2024, 52);
        assert_eq!(advance_week(last, 1), Some(RosterPeriod::new(2025, 1)));
        assert_eq!(
            advance_week(RosterPeriod::new(2025, 1), -1),
            Some(last)
        );
        assert_eq!(
            advance_week(RosterPeriod::new(2025, 5), 0),
            Some(RosterPeriod::new(2025, 5))
        );
    }

    #[test]
    fn test_advance_week_normalizes_overflowing_week() {
        // FY2023 runs 2023-06-26 .. 2024-06-30 and has 53 weeks
        let last = RosterPeriod::new(2023, 53);
        assert_eq!(
            resolve_period(week_start_date(2023, 53).unwrap()),
            Some(last)
        );
        assert_eq!(advance_week(last, 1), Some(RosterPeriod::new(2024, 1)));
        assert_eq!(
            advance_week(RosterPeriod::new(2024, 60), 0),
            Some(RosterPeriod::new(2025, 8))
        );
    }

    #[test]
    fn test_advance_week_out_of_range() {
        let period = RosterPeriod::new(2025, 10);
        assert_eq!(advance_week(period, 100_000_000_000), None);
        assert_eq!(advance_week(period, i64::MIN), None);
        assert_eq!(advance_week(period, i64::MAX), None);
        assert_eq!(week_start_date(2025, u32::MAX), None);
    }
}
