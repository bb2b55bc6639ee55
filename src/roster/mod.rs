//! Weekly roster editing: the data model, the command reducer and the views
//! derived from it.

pub mod aggregate;
pub mod breaks;
pub mod export;
pub mod models;
pub mod period;
pub mod settings;
pub mod store;
pub mod summary;
pub mod utilization;

pub use aggregate::{recompute_aggregates, RosterTotals, WorkerHours};
pub use breaks::{eligible_breaks, BreakCode, BreakThresholds};
pub use export::{export_utilization_image, ExportFormat, ExportedImage};
pub use models::{DailyMemo, Day, DayMap, RosterInfo, Shift, Worker, WorkerId};
pub use period::RosterPeriod;
pub use settings::{export_settings, import_settings, import_settings_into, SettingsDocument};
pub use store::{RosterCommand, RosterState};
pub use summary::{build_summary, RosterSummary};
pub use utilization::{utilization_grid, UtilizationGrid};
