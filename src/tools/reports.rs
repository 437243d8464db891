//! Report generation tools
//!
//! Weight progress PDF: a summary and per-entry table on a portrait page,
//! followed by a landscape page with the weight trend chart.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use chrono::{Datelike, NaiveDate, Weekday};
use printpdf::image_crate::{DynamicImage, ImageFormat, RgbImage};
use printpdf::*;
use serde::Serialize;

use crate::analytics::weight::{self, WeightAnalytics};
use crate::analytics::{DateRange, RangeQuery};
use crate::db::Database;
use crate::error::{AppError, AppResult};
use crate::tools::require_user;

// ============================================================================
// Color Constants (RGB 0-255)
// ============================================================================

const COLOR_TITLE: (u8, u8, u8) = (0, 84, 147);
const COLOR_GAIN: (u8, u8, u8) = (192, 0, 0);
const COLOR_LOSS: (u8, u8, u8) = (0, 140, 70);
const COLOR_BLACK: (u8, u8, u8) = (0, 0, 0);
const COLOR_GRAY: (u8, u8, u8) = (128, 128, 128);

const LETTER_WIDTH_MM: f32 = 215.9;
const LETTER_HEIGHT_MM: f32 = 279.4;
/// Lowest y position a table row may use before starting a new page
const TABLE_FLOOR_MM: f32 = 20.0;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct GenerateReportResponse {
    pub success: bool,
    pub file_path: String,
    pub range: DateRange,
    pub total_entries: usize,
    pub message: String,
}

fn report_err(e: impl std::fmt::Display) -> AppError {
    AppError::Report(e.to_string())
}

fn day_of_week_abbrev(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

/// Color for a change in weight; gains are red
fn change_color(change: f64) -> (u8, u8, u8) {
    if change > 0.0 {
        COLOR_GAIN
    } else if change < 0.0 {
        COLOR_LOSS
    } else {
        COLOR_BLACK
    }
}

// ============================================================================
// Chart Generation (plotters)
// ============================================================================

/// Render weight and its 7-entry moving average as PNG bytes
pub fn generate_weight_chart(analytics: &WeightAnalytics, width: u32, height: u32) -> Result<Vec<u8>, String> {
    use plotters::prelude::*;

    let series = &analytics.series;
    if series.is_empty() {
        return Err("No data to chart".to_string());
    }

    let mut buffer = vec![0u8; (width * height * 3) as usize];

    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| e.to_string())?;

        let y_min = series.iter().map(|p| p.weight).fold(f64::INFINITY, f64::min) - 2.0;
        let y_max = series.iter().map(|p| p.weight).fold(f64::NEG_INFINITY, f64::max) + 2.0;
        let x_max = (series.len() as i32).max(2);

        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(0..x_max, y_min..y_max)
            .map_err(|e| e.to_string())?;

        chart
            .configure_mesh()
            .x_labels(series.len().min(10))
            .x_label_formatter(&|x| match series.get(*x as usize) {
                Some(p) if *x >= 0 => p.date.format("%m/%d").to_string(),
                _ => String::new(),
            })
            .y_desc("Weight")
            .draw()
            .map_err(|e| e.to_string())?;

        let weight_color = RGBColor(COLOR_TITLE.0, COLOR_TITLE.1, COLOR_TITLE.2);
        let points: Vec<(i32, f64)> = series
            .iter()
            .enumerate()
            .map(|(i, p)| (i as i32, p.weight))
            .collect();

        chart
            .draw_series(LineSeries::new(points.clone(), weight_color.stroke_width(2)))
            .map_err(|e| e.to_string())?
            .label("Weight")
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], weight_color.stroke_width(2)));

        chart
            .draw_series(points.iter().map(|(x, y)| Circle::new((*x, *y), 3, weight_color.filled())))
            .map_err(|e| e.to_string())?;

        // The k-th average closes the window ending at entry k + 6
        if !analytics.moving_average_7.is_empty() {
            let average: Vec<(i32, f64)> = analytics
                .moving_average_7
                .iter()
                .enumerate()
                .map(|(k, v)| ((k + 6) as i32, v.value))
                .collect();

            chart
                .draw_series(LineSeries::new(average, RGBColor(255, 140, 0).stroke_width(2)))
                .map_err(|e| e.to_string())?
                .label("7-day average")
                .legend(|(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], RGBColor(255, 140, 0).stroke_width(2))
                });
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(|e| e.to_string())?;

        root.present().map_err(|e| e.to_string())?;
    }

    let img = RgbImage::from_raw(width, height, buffer).ok_or("Failed to create image from buffer")?;

    let mut png_bytes = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut std::io::Cursor::new(&mut png_bytes), ImageFormat::Png)
        .map_err(|e| e.to_string())?;

    Ok(png_bytes)
}

// ============================================================================
// PDF Generation Helper Functions
// ============================================================================

fn rgb_to_printpdf(color: (u8, u8, u8)) -> Color {
    Color::Rgb(Rgb::new(
        color.0 as f32 / 255.0,
        color.1 as f32 / 255.0,
        color.2 as f32 / 255.0,
        None,
    ))
}

fn add_text(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    text: &str,
    x: f32,
    y: f32,
    size: f32,
    color: (u8, u8, u8),
) {
    layer.set_fill_color(rgb_to_printpdf(color));
    layer.use_text(text, size, Mm(x), Mm(y), font);
}

fn add_rule(layer: &PdfLayerReference, x1: f32, x2: f32, y: f32) {
    layer.set_outline_color(rgb_to_printpdf(COLOR_GRAY));
    layer.set_outline_thickness(0.5);
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(x1), Mm(y)), false),
            (Point::new(Mm(x2), Mm(y)), false),
        ],
        is_closed: false,
    });
}

// ============================================================================
// Weight Report Generation
// ============================================================================

/// Generate a weight progress PDF for the user over the requested range
pub fn generate_weight_report(
    db: &Database,
    user_id: i64,
    query: &RangeQuery<'_>,
    today: NaiveDate,
    output_path: &str,
) -> AppResult<GenerateReportResponse> {
    if output_path.trim().is_empty() {
        return Err(AppError::invalid("output_path", "must not be empty"));
    }

    let conn = db.get_conn()?;
    let user = require_user(&conn, user_id)?;
    let analytics = weight::weight_analytics(&conn, user_id, query, today)?;
    drop(conn);

    if analytics.series.is_empty() {
        return Err(AppError::invalid("range", "no weight entries in the selected range"));
    }

    let range = analytics.range;
    let summary = &analytics.summary;
    let period = format!("{} to {}", range.start, range.end);

    let (doc, page1, layer1) = PdfDocument::new(
        "Weight Progress Report",
        Mm(LETTER_WIDTH_MM),
        Mm(LETTER_HEIGHT_MM),
        "Layer 1",
    );
    let font = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(report_err)?;
    let font_bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(report_err)?;

    let mut layer = doc.get_page(page1).get_layer(layer1);
    let margin_left = 15.0;
    let mut y = LETTER_HEIGHT_MM - 20.0;

    add_text(&layer, &font_bold, "Weight Progress Report", margin_left, y, 18.0, COLOR_TITLE);
    y -= 10.0;

    let name = user.display_name.as_deref().unwrap_or(&user.username);
    add_text(&layer, &font, &format!("User: {name}"), margin_left, y, 11.0, COLOR_BLACK);
    add_text(&layer, &font, &format!("Generated: {today}"), 120.0, y, 11.0, COLOR_BLACK);
    y -= 6.0;
    add_text(&layer, &font, &format!("Report Period: {period}"), margin_left, y, 11.0, COLOR_BLACK);
    y -= 10.0;

    add_rule(&layer, margin_left, 200.0, y);
    y -= 8.0;

    // Summary
    add_text(&layer, &font_bold, "Summary", margin_left, y, 12.0, COLOR_BLACK);
    y -= 7.0;
    add_text(&layer, &font, &format!("Entries: {}", summary.count), margin_left, y, 10.0, COLOR_BLACK);
    add_text(&layer, &font, &format!("Average: {:.2}", summary.average), 80.0, y, 10.0, COLOR_BLACK);
    y -= 6.0;
    add_text(
        &layer,
        &font,
        &format!("Net Change: {:+.2}", summary.net_change),
        margin_left,
        y,
        10.0,
        change_color(summary.net_change),
    );
    add_text(&layer, &font, &format!("Trend: {}", summary.trend.as_str()), 80.0, y, 10.0, COLOR_BLACK);
    y -= 6.0;
    if let Some(h) = analytics.records.heaviest {
        add_text(&layer, &font, &format!("Heaviest: {:.2} ({})", h.value, h.date), margin_left, y, 10.0, COLOR_BLACK);
    }
    if let Some(l) = analytics.records.lightest {
        add_text(&layer, &font, &format!("Lightest: {:.2} ({})", l.value, l.date), 80.0, y, 10.0, COLOR_BLACK);
    }
    y -= 12.0;

    // Entry table
    add_text(&layer, &font_bold, "Entries", margin_left, y, 12.0, COLOR_BLACK);
    y -= 7.0;

    let col_widths = [25.0, 14.0, 22.0, 22.0, 100.0];
    let headers = ["Date", "Day", "Weight", "Change", "Note"];
    let draw_header = |layer: &PdfLayerReference, y: f32| {
        let mut col_x = margin_left;
        for (header, width) in headers.iter().zip(col_widths) {
            add_text(layer, &font_bold, header, col_x, y, 8.0, COLOR_BLACK);
            col_x += width;
        }
    };
    draw_header(&layer, y);
    y -= 5.0;

    let mut previous: Option<f64> = None;
    for point in &analytics.series {
        if y < TABLE_FLOOR_MM {
            let (page, layer_idx) = doc.add_page(Mm(LETTER_WIDTH_MM), Mm(LETTER_HEIGHT_MM), "Entries");
            layer = doc.get_page(page).get_layer(layer_idx);
            y = LETTER_HEIGHT_MM - 20.0;
            draw_header(&layer, y);
            y -= 5.0;
        }

        let change = previous.map(|p| point.weight - p);
        let values = [
            point.date.to_string(),
            day_of_week_abbrev(point.date).to_string(),
            format!("{:.2}", point.weight),
            change.map(|c| format!("{c:+.2}")).unwrap_or_else(|| "-".to_string()),
            point.note.clone().unwrap_or_default(),
        ];

        let mut col_x = margin_left;
        for (i, value) in values.iter().enumerate() {
            let color = if i == 3 { change_color(change.unwrap_or(0.0)) } else { COLOR_BLACK };
            add_text(&layer, &font, value, col_x, y, 7.0, color);
            col_x += col_widths[i];
        }
        y -= 4.5;
        previous = Some(point.weight);
    }

    // ========================================================================
    // Landscape chart page
    // ========================================================================
    let (page2, layer2) = doc.add_page(Mm(LETTER_HEIGHT_MM), Mm(LETTER_WIDTH_MM), "Chart Page");
    let layer2 = doc.get_page(page2).get_layer(layer2);
    let mut y2 = LETTER_WIDTH_MM - 20.0;

    add_text(&layer2, &font_bold, "Weight Trend", margin_left, y2, 16.0, COLOR_TITLE);
    add_text(&layer2, &font, &period, 120.0, y2, 11.0, COLOR_BLACK);
    y2 -= 10.0;

    match generate_weight_chart(&analytics, 1000, 400) {
        Ok(png_bytes) => {
            let dynamic_image = printpdf::image_crate::load_from_memory(&png_bytes).map_err(report_err)?;
            let pdf_image = Image::from_dynamic_image(&dynamic_image);

            // 1000x400 px at 120 DPI is about 212mm x 85mm
            let transform = ImageTransform {
                translate_x: Some(Mm(margin_left)),
                translate_y: Some(Mm(y2 - 90.0)),
                dpi: Some(120.0),
                ..Default::default()
            };
            pdf_image.add_to_layer(layer2.clone(), transform);
        }
        Err(e) => {
            tracing::warn!(error = %e, "weight chart generation failed");
            add_text(&layer2, &font, &format!("Chart generation error: {e}"), margin_left, y2 - 10.0, 9.0, COLOR_GAIN);
        }
    }

    let path = Path::new(output_path);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    doc.save(&mut writer).map_err(report_err)?;

    tracing::info!(user_id, path = output_path, entries = summary.count, "generated weight report");

    Ok(GenerateReportResponse {
        success: true,
        file_path: output_path.to_string(),
        range,
        total_entries: summary.count,
        message: format!(
            "Weight report generated with {} entries from {}",
            summary.count, period
        ),
    })
}
