use axum::{
    extract::{Multipart, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, warn};

use super::AppState;
use crate::error::{settings_error, Error};
use crate::roster::breaks::BreakCode;
use crate::roster::export::{export_utilization_image, ExportFormat};
use crate::roster::models::{DailyMemo, Day, DayMap, RosterInfo, Worker};
use crate::roster::settings::{
    export_settings_json, import_settings_into, settings_file_name_now, settings_schema,
    INVALID_SETTINGS_MESSAGE,
};
use crate::roster::summary::build_summary;
use crate::roster::utilization::utilization_grid;
use crate::roster::{BreakThresholds, RosterCommand, RosterState, RosterTotals};

/// Editor view of the roster with everything derived from it
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterView {
    pub roles: Vec<String>,
    pub start_times: DayMap<String>,
    pub end_times: DayMap<String>,
    pub break_min_hours: BreakThresholds,
    pub workers: Vec<Worker>,
    pub daily_memos: DayMap<DailyMemo>,
    pub roster_info: RosterInfo,
    /// ISO dates of the selected week
    pub week_dates: Option<DayMap<String>>,
    /// Selectable shift times per day
    pub time_slots: DayMap<Vec<String>>,
    pub totals: RosterTotals,
    /// Breaks per worker, in worker order
    pub breaks: Vec<DayMap<Vec<BreakCode>>>,
}

impl RosterView {
    pub fn from_state(state: &RosterState) -> Self {
        let breaks = (0..state.workers.len())
            .map(|index| DayMap::from_fn(|day| state.breaks_for(index, day)))
            .collect();

        Self {
            roles: state.roles.clone(),
            start_times: state.start_times.clone(),
            end_times: state.end_times.clone(),
            break_min_hours: state.break_min_hours.clone(),
            workers: state.workers.clone(),
            daily_memos: state.daily_memos.clone(),
            roster_info: state.roster_info.clone(),
            week_dates: state
                .week_dates()
                .map(|dates| dates.map(|_, date| date.format("%Y-%m-%d").to_string())),
            time_slots: DayMap::from_fn(|day| state.day_time_slots(day)),
            totals: state.totals(),
            breaks,
        }
    }
}

/// Handler for API health check
pub async fn health_handler() -> &'static str {
    "OK"
}

/// Current roster
pub async fn roster_handler(State(state): State<AppState>) -> Json<RosterView> {
    let roster = state.roster.read().await;
    Json(RosterView::from_state(&roster))
}

/// Apply one editing command and return the updated roster
pub async fn apply_command_handler(
    State(state): State<AppState>,
    Json(command): Json<RosterCommand>,
) -> Json<RosterView> {
    let mut roster = state.roster.write().await;
    roster.execute(command);
    Json(RosterView::from_state(&roster))
}

/// Download the roster as a settings file
pub async fn download_settings_handler(State(state): State<AppState>) -> Result<Response, Error> {
    let body = {
        let roster = state.roster.read().await;
        export_settings_json(&roster, Utc::now())?
    };
    let file_name = settings_file_name_now();
    info!("Exporting settings as {}", file_name);

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        body,
    )
        .into_response())
}

/// Import settings sent as the raw request body
pub async fn import_settings_handler(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<RosterView>, Error> {
    import_into(&state, &body).await
}

/// Import settings uploaded as the `settings_file` form field
pub async fn upload_settings_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<RosterView>, Error> {
    let mut settings_file = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        warn!("Malformed settings upload: {}", e);
        settings_error(INVALID_SETTINGS_MESSAGE)
    })? {
        if field.name() == Some("settings_file") {
            let data = field
                .bytes()
                .await
                .map_err(|_| settings_error(INVALID_SETTINGS_MESSAGE))?;
            settings_file = Some(data);
        }
    }

    let Some(data) = settings_file else {
        error!("Missing settings_file field in upload");
        return Err(settings_error(INVALID_SETTINGS_MESSAGE));
    };
    let text = String::from_utf8(data.to_vec()).map_err(|_| {
        warn!("Uploaded settings file is not UTF-8");
        settings_error(INVALID_SETTINGS_MESSAGE)
    })?;

    import_into(&state, &text).await
}

async fn import_into(state: &AppState, json: &str) -> Result<Json<RosterView>, Error> {
    let mut roster = state.roster.write().await;
    import_settings_into(&mut roster, json)?;
    Ok(Json(RosterView::from_state(&roster)))
}

/// JSON schema of the settings file
pub async fn settings_schema_handler() -> impl IntoResponse {
    Json(settings_schema())
}

/// Half-hour occupancy grid for the chart
pub async fn utilization_handler(State(state): State<AppState>) -> impl IntoResponse {
    let roster = state.roster.read().await;
    Json(utilization_grid(
        &roster.workers,
        &roster.start_times,
        &roster.end_times,
    ))
}

/// Printable weekly summary
pub async fn summary_handler(State(state): State<AppState>) -> impl IntoResponse {
    let roster = state.roster.read().await;
    Json(build_summary(&roster))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportQuery {
    pub format: Option<String>,
    /// Answer with a JSON `data:` URL instead of the raw image
    #[serde(default)]
    pub data_url: bool,
}

/// Render the utilization chart as an image download
pub async fn export_image_handler(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, Error> {
    let format = match query.format.as_deref() {
        None => ExportFormat::default(),
        Some(raw) => match raw.parse::<ExportFormat>() {
            Ok(format) => format,
            Err(message) => {
                return Ok((StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response());
            }
        },
    };

    let image = {
        let roster = state.roster.read().await;
        let date = roster
            .week_dates()
            .map(|dates| dates[Day::Mon])
            .unwrap_or_else(|| Local::now().date_naive());
        export_utilization_image(&roster, format, date)?
    };
    info!("Exported {} ({} bytes)", image.file_name, image.bytes.len());

    if query.data_url {
        return Ok(Json(json!({
            "fileName": image.file_name,
            "dataUrl": image.data_url(),
        }))
        .into_response());
    }

    Ok((
        [
            (header::CONTENT_TYPE, image.format.mime_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", image.file_name),
            ),
        ],
        image.bytes,
    )
        .into_response())
}
