use schemars::gen::SchemaGenerator;
use schemars::schema::{InstanceType, ObjectValidation, Schema, SchemaObject};
use schemars::JsonSchema;
use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;
use uuid::Uuid;

use crate::utils::time::compute_hours;

/// Day of the roster week, Monday first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub enum Day {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Day {
    /// All days in roster order
    pub const ALL: [Day; 7] = [
        Day::Mon,
        Day::Tue,
        Day::Wed,
        Day::Thu,
        Day::Fri,
        Day::Sat,
        Day::Sun,
    ];

    /// Position within the week, Monday = 0
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Day::Mon => "Mon",
            Day::Tue => "Tue",
            Day::Wed => "Wed",
            Day::Thu => "Thu",
            Day::Fri => "Fri",
            Day::Sat => "Sat",
            Day::Sun => "Sun",
        }
    }

    pub fn from_weekday(weekday: chrono::Weekday) -> Self {
        Day::ALL[weekday.num_days_from_monday() as usize]
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Day {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Day::ALL
            .into_iter()
            .find(|day| day.as_str() == s)
            .ok_or_else(|| format!("Unknown day: {}", s))
    }
}

/// One value per day of the week.
///
/// Every day is always present, and iteration follows roster order
/// regardless of how the value was built or decoded.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DayMap<T>([T; 7]);

impl<T> DayMap<T> {
    /// Build a map by evaluating `f` for each day in order
    pub fn from_fn(mut f: impl FnMut(Day) -> T) -> Self {
        Self(std::array::from_fn(|i| f(Day::ALL[i])))
    }

    /// Iterate `(day, value)` pairs Monday to Sunday
    pub fn iter(&self) -> impl Iterator<Item = (Day, &T)> {
        Day::ALL.into_iter().zip(self.0.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Day, &mut T)> {
        Day::ALL.into_iter().zip(self.0.iter_mut())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.0.iter()
    }

    pub fn map<U>(&self, mut f: impl FnMut(Day, &T) -> U) -> DayMap<U> {
        DayMap::from_fn(|day| f(day, &self[day]))
    }
}

impl<T: Clone> DayMap<T> {
    /// Same value on every day
    pub fn splat(value: T) -> Self {
        Self::from_fn(|_| value.clone())
    }
}

impl<T> Index<Day> for DayMap<T> {
    type Output = T;

    fn index(&self, day: Day) -> &T {
        &self.0[day.index()]
    }
}

impl<T> IndexMut<Day> for DayMap<T> {
    fn index_mut(&mut self, day: Day) -> &mut T {
        &mut self.0[day.index()]
    }
}

impl<T: Serialize> Serialize for DayMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(7))?;
        for (day, value) in self.iter() {
            map.serialize_entry(day.as_str(), value)?;
        }
        map.end()
    }
}

impl<'de, T: Deserialize<'de> + Default> Deserialize<'de> for DayMap<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Days absent from the document fall back to the default value
        let mut entries = HashMap::<Day, T>::deserialize(deserializer)?;
        Ok(Self::from_fn(|day| entries.remove(&day).unwrap_or_default()))
    }
}

impl<T: JsonSchema> JsonSchema for DayMap<T> {
    fn schema_name() -> String {
        format!("DayMap_for_{}", T::schema_name())
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        let mut object = ObjectValidation::default();
        for day in Day::ALL {
            object
                .properties
                .insert(day.as_str().to_string(), gen.subschema_for::<T>());
        }
        SchemaObject {
            instance_type: Some(InstanceType::Object.into()),
            object: Some(Box::new(object)),
            ..Default::default()
        }
        .into()
    }
}

/// Stable identity of a worker, independent of the editable name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct WorkerId(Uuid);

impl WorkerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WorkerId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for WorkerId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One worker's assignment for a single day
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Shift {
    /// Start time (HH:MM), empty when unset
    pub start_time: String,
    /// End time (HH:MM), empty when unset
    pub end_time: String,
    pub role: String,
    /// Derived from the start and end time
    pub hours: f64,
    /// Whether the worker is rostered on this day at all
    pub editable: bool,
}

impl Shift {
    /// An empty shift, rostered or not
    pub fn blank(editable: bool) -> Self {
        Self {
            editable,
            ..Self::default()
        }
    }

    /// Recalculate `hours` from the current time pair
    pub fn refresh_hours(&mut self) {
        self.hours = compute_hours(&self.start_time, &self.end_time);
    }

    /// Hours this shift contributes to totals
    pub fn worked_hours(&self) -> f64 {
        if self.editable {
            compute_hours(&self.start_time, &self.end_time)
        } else {
            0.0
        }
    }

    /// Both ends of the shift are set
    pub fn has_times(&self) -> bool {
        !self.start_time.is_empty() && !self.end_time.is_empty()
    }
}

/// A team member and their week of shifts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
    #[serde(default)]
    pub id: WorkerId,
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub remark: String,
    pub shifts: DayMap<Shift>,
}

impl Worker {
    /// Create a worker rostered on the days flagged in `days`
    pub fn new(name: &str, title: &str, remark: &str, days: &DayMap<bool>) -> Self {
        Self {
            id: WorkerId::new(),
            name: name.trim().to_string(),
            title: title.trim().to_string(),
            remark: remark.trim().to_string(),
            shifts: days.map(|_, &editable| Shift::blank(editable)),
        }
    }

    /// Total hours over the week
    pub fn weekly_hours(&self) -> f64 {
        self.shifts.values().map(Shift::worked_hours).sum()
    }
}

/// Per-day notes shown under the roster
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct DailyMemo {
    pub duty_supervisor: String,
    pub oil_changer: String,
    pub tray_of_rice: f64,
    pub remark: String,
}

/// Heading and selected period of the roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RosterInfo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    pub year: i32,
    pub week: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_order_and_names() {
        let names: Vec<&str> = Day::ALL.iter().map(|d| d.as_str()).collect();
        assert_eq!(names, ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]);
        assert_eq!("Thu".parse::<Day>(), Ok(Day::Thu));
        assert!("thu".parse::<Day>().is_err());
        assert_eq!(Day::from_weekday(chrono::Weekday::Sun), Day::Sun);
    }

    #[test]
    fn test_day_map_serializes_in_roster_order() {
        let map = DayMap::from_fn(|day| day.index());
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(
            json,
            r#"{"Mon":0,"Tue":1,"Wed":2,"Thu":3,"Fri":4,"Sat":5,"Sun":6}"#
        );
    }

    #[test]
    fn test_day_map_fills_missing_days() {
        let map: DayMap<String> = serde_json::from_str(r#"{"Sun":"08:00","Mon":"07:30"}"#).unwrap();
        assert_eq!(map[Day::Mon], "07:30");
        assert_eq!(map[Day::Sun], "08:00");
        assert_eq!(map[Day::Wed], "");
    }

    #[test]
    fn test_new_worker_trims_and_flags_days() {
        let mut days = DayMap::splat(true);
        days[Day::Sat] = false;
        let worker = Worker::new("  Aiko ", " Chef", "", &days);

        assert_eq!(worker.name, "Aiko");
        assert_eq!(worker.title, "Chef");
        assert!(worker.shifts[Day::Mon].editable);
        assert!(!worker.shifts[Day::Sat].editable);
        assert_eq!(worker.shifts[Day::Mon], Shift::blank(true));
        assert_eq!(worker.weekly_hours(), 0.0);
    }

    #[test]
    fn test_worked_hours_ignores_unrostered_days() {
        let mut shift = Shift::blank(true);
        shift.start_time = "09:00".into();
        shift.end_time = "13:30".into();
        shift.refresh_hours();
        assert_eq!(shift.hours, 4.5);
        assert_eq!(shift.worked_hours(), 4.5);

        shift.editable = false;
        assert_eq!(shift.worked_hours(), 0.0);
    }
}
