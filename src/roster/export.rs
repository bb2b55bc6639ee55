use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::NaiveDate;
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::str::FromStr;
use tracing::info;

use super::models::Day;
use super::store::RosterState;
use super::utilization::{utilization_grid, UtilizationGrid};
use crate::error::{export_error, RosterResult};
use crate::utils::time::time_to_minutes;

/// Message shown when the summary image cannot be produced
pub const EXPORT_FAILED_MESSAGE: &str = "Error exporting roster summary image.";

const TIME_COLUMN_WIDTH: u32 = 48;
const DAY_COLUMN_WIDTH: u32 = 112;
const HEADER_HEIGHT: u32 = 20;
const ROW_HEIGHT: u32 = 16;
const BLOCK_SIZE: u32 = 12;
const BLOCK_GAP: u32 = 2;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const HEADER: Rgb<u8> = Rgb([243, 244, 246]);
const HOUR_ROW: Rgb<u8> = Rgb([249, 250, 251]);
const GRID_LINE: Rgb<u8> = Rgb([209, 213, 219]);

/// Raster formats offered for the summary export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
        }
    }

    fn image_format(self) -> image::ImageFormat {
        match self {
            ExportFormat::Png => image::ImageFormat::Png,
            ExportFormat::Jpeg => image::ImageFormat::Jpeg,
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "jpg" | "jpeg" => Ok(ExportFormat::Jpeg),
            other => Err(format!("Unsupported image format: {}", other)),
        }
    }
}

/// An encoded summary image ready for download
#[derive(Debug, Clone)]
pub struct ExportedImage {
    pub file_name: String,
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
}

impl ExportedImage {
    /// `data:` URL embedding the image
    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.format.mime_type(),
            STANDARD.encode(&self.bytes)
        )
    }
}

/// Download name, e.g. `roster-summary-2025-09-01.png`
pub fn summary_file_name(date: NaiveDate, format: ExportFormat) -> String {
    format!(
        "roster-summary-{}.{}",
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

/// Distinct colour for the worker at `index`
pub fn worker_color(index: usize) -> Rgb<u8> {
    // Golden-angle hue steps keep neighbouring indices apart
    let hue = (index as f32 * 137.508) % 360.0;
    hsl_to_rgb(hue, 0.55, 0.65)
}

fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> Rgb<u8> {
    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let sector = hue / 60.0;
    let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
    let (r, g, b) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = lightness - chroma / 2.0;
    let channel = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgb([channel(r), channel(g), channel(b)])
}

/// Draw the utilization grid: one column per day, one row per half hour,
/// one coloured block per worker on shift
pub fn render_utilization(grid: &UtilizationGrid) -> RgbImage {
    let width = TIME_COLUMN_WIDTH + DAY_COLUMN_WIDTH * Day::ALL.len() as u32;
    let height = HEADER_HEIGHT + ROW_HEIGHT * grid.rows.len() as u32;
    let mut img = RgbImage::from_pixel(width, height, BACKGROUND);

    draw_filled_rect_mut(&mut img, Rect::at(0, 0).of_size(width, HEADER_HEIGHT), HEADER);

    for (row_index, row) in grid.rows.iter().enumerate() {
        let top = HEADER_HEIGHT + ROW_HEIGHT * row_index as u32;

        // Shade rows that start on the hour
        if time_to_minutes(&row.time).is_some_and(|m| m % 60 == 0) {
            draw_filled_rect_mut(
                &mut img,
                Rect::at(0, top as i32).of_size(width, ROW_HEIGHT),
                HOUR_ROW,
            );
        }

        for (day, active) in row.days.iter() {
            let left = TIME_COLUMN_WIDTH + DAY_COLUMN_WIDTH * day.index() as u32;
            for (slot, worker) in active.iter().enumerate() {
                let x = left + BLOCK_GAP + (BLOCK_SIZE + BLOCK_GAP) * slot as u32;
                if x + BLOCK_SIZE > left + DAY_COLUMN_WIDTH {
                    break;
                }
                draw_filled_rect_mut(
                    &mut img,
                    Rect::at(x as i32, (top + BLOCK_GAP) as i32).of_size(BLOCK_SIZE, BLOCK_SIZE),
                    worker_color(worker.worker_index),
                );
            }
        }
    }

    for row_index in 0..=grid.rows.len() as u32 {
        let y = (HEADER_HEIGHT + ROW_HEIGHT * row_index) as f32;
        draw_line_segment_mut(&mut img, (0.0, y), (width as f32, y), GRID_LINE);
    }
    for column in 0..=Day::ALL.len() as u32 {
        let x = (TIME_COLUMN_WIDTH + DAY_COLUMN_WIDTH * column) as f32;
        draw_line_segment_mut(&mut img, (x, 0.0), (x, height as f32), GRID_LINE);
    }

    img
}

/// Encode an image in the requested format
pub fn encode_image(img: RgbImage, format: ExportFormat) -> RosterResult<Vec<u8>> {
    let mut buffer = Vec::new();
    DynamicImage::ImageRgb8(img).write_to(&mut Cursor::new(&mut buffer), format.image_format())?;
    if buffer.is_empty() {
        return Err(export_error("Encoder produced no data"));
    }
    Ok(buffer)
}

/// Render and encode the roster's utilization chart for download.
///
/// The download keeps the `roster-summary-` file name used by the summary page.
pub fn export_utilization_image(
    state: &RosterState,
    format: ExportFormat,
    date: NaiveDate,
) -> RosterResult<ExportedImage> {
    let grid = utilization_grid(&state.workers, &state.start_times, &state.end_times);
    let img = render_utilization(&grid);
    info!(
        "Rendering utilization image {}x{} as {:?}",
        img.width(),
        img.height(),
        format
    );
    let bytes = encode_image(img, format)?;

    Ok(ExportedImage {
        file_name: summary_file_name(date, format),
        format,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RosterDefaults;
    use crate::roster::models::DayMap;
    use crate::roster::period::RosterPeriod;
    use crate::roster::store::ShiftField;

    fn state() -> RosterState {
        let mut state = RosterState::new(&RosterDefaults::default(), RosterPeriod::new(2025, 10));
        state.add_worker("Aiko", "", "", &DayMap::splat(true));
        state.update_shift(0, Day::Mon, ShiftField::StartTime, "07:30".into());
        state.update_shift(0, Day::Mon, ShiftField::EndTime, "09:00".into());
        state.update_shift(0, Day::Mon, ShiftField::Role, "Roll".into());
        state
    }

    #[test]
    fn test_file_name() {
        let date = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
        assert_eq!(
            summary_file_name(date, ExportFormat::Png),
            "roster-summary-2025-09-01.png"
        );
        assert_eq!(
            summary_file_name(date, ExportFormat::Jpeg),
            "roster-summary-2025-09-01.jpg"
        );
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("PNG".parse::<ExportFormat>(), Ok(ExportFormat::Png));
        assert_eq!("jpg".parse::<ExportFormat>(), Ok(ExportFormat::Jpeg));
        assert!("gif".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_render_marks_active_slot() {
        let state = state();
        let grid = utilization_grid(&state.workers, &state.start_times, &state.end_times);
        let img = render_utilization(&grid);

        assert_eq!(img.width(), TIME_COLUMN_WIDTH + DAY_COLUMN_WIDTH * 7);
        assert_eq!(img.height(), HEADER_HEIGHT + ROW_HEIGHT * grid.rows.len() as u32);

        // Centre of the first block on Monday's 07:30 row
        let x = TIME_COLUMN_WIDTH + BLOCK_GAP + BLOCK_SIZE / 2;
        let y = HEADER_HEIGHT + BLOCK_GAP + BLOCK_SIZE / 2;
        assert_eq!(*img.get_pixel(x, y), worker_color(0));

        // Same spot on Tuesday stays empty
        let x = x + DAY_COLUMN_WIDTH;
        assert_ne!(*img.get_pixel(x, y), worker_color(0));
    }

    #[test]
    fn test_export_png_and_jpeg() {
        let date = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();

        let png = export_utilization_image(&state(), ExportFormat::Png, date).unwrap();
        assert_eq!(&png.bytes[1..4], b"PNG");
        assert!(png.data_url().starts_with("data:image/png;base64,"));

        let jpeg = export_utilization_image(&state(), ExportFormat::Jpeg, date).unwrap();
        assert_eq!(&jpeg.bytes[..2], &[0xFF, 0xD8]);
        assert_eq!(jpeg.file_name, "roster-summary-2025-09-01.jpg");
    }

    #[test]
    fn test_worker_colors_differ() {
        assert_ne!(worker_color(0), worker_color(1));
        assert_ne!(worker_color(1), worker_color(2));
    }
}
