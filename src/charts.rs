// Copyright (c) The adsight Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chart generation for daily ad-account metrics.

use crate::aggregate::DailyMetricRow;
use anyhow::{Context, Result};
use camino::Utf8Path;
use chrono::NaiveDate;
use plotters::coord::types::{RangedCoordf64, RangedCoordi64};
use plotters::prelude::*;

const CHART_WIDTH: u32 = 1600;
const CHART_HEIGHT: u32 = 900;

// Typography - Inter font family
const FONT_FAMILY: &str = "Inter";
const TITLE_SIZE: i32 = 24;
const LABEL_SIZE: i32 = 16;
const AXIS_SIZE: i32 = 14;

// Colors - Modern, minimal palette
const BACKGROUND: RGBColor = RGBColor(250, 250, 252); // Off-white
const TEXT_PRIMARY: RGBColor = RGBColor(15, 23, 42); // Slate 900
const TEXT_SECONDARY: RGBColor = RGBColor(100, 116, 139); // Slate 500
const GRID_COLOR: RGBColor = RGBColor(226, 232, 240); // Slate 200
const ACCENT_BLUE: RGBColor = RGBColor(59, 130, 246); // Blue 500
const ACCENT_GREEN: RGBColor = RGBColor(34, 197, 94); // Green 500
const ACCENT_ORANGE: RGBColor = RGBColor(251, 146, 60); // Orange 400

/// Render all charts for a dense daily series.
pub fn generate_all_charts(series: &[DailyMetricRow], output_dir: &Utf8Path) -> Result<()> {
    std::fs::create_dir_all(output_dir.as_std_path())
        .with_context(|| format!("failed to create output directory at {}", output_dir))?;

    if series.is_empty() {
        println!("No data in range, skipping charts.");
        return Ok(());
    }

    println!("\nGenerating charts...");

    generate_spend_chart(series, &output_dir.join("daily-spend.png"))?;
    generate_clicks_chart(series, &output_dir.join("daily-clicks.png"))?;
    generate_revenue_chart(series, &output_dir.join("revenue-vs-spend.png"))?;

    println!("  Charts saved to {}", output_dir);
    Ok(())
}

/// Create a styled drawing area with background.
fn create_drawing_area(
    output_path: &Utf8Path,
) -> Result<DrawingArea<BitMapBackend<'_>, plotters::coord::Shift>> {
    let root = BitMapBackend::new(output_path.as_std_path(), (CHART_WIDTH, CHART_HEIGHT))
        .into_drawing_area();
    root.fill(&BACKGROUND)?;
    Ok(root)
}

/// Configure mesh styling for currency-valued date charts.
fn configure_currency_mesh<DB: DrawingBackend>(
    chart: &mut ChartContext<DB, Cartesian2d<RangedDate<NaiveDate>, RangedCoordf64>>,
) -> Result<()>
where
    <DB as DrawingBackend>::ErrorType: 'static,
{
    chart
        .configure_mesh()
        .bold_line_style(&GRID_COLOR.mix(0.3))
        .light_line_style(&TRANSPARENT)
        .x_labels(8)
        .y_labels(6)
        .x_label_style((FONT_FAMILY, AXIS_SIZE).into_font().color(&TEXT_SECONDARY))
        .y_label_style((FONT_FAMILY, AXIS_SIZE).into_font().color(&TEXT_SECONDARY))
        .x_label_formatter(&|date| date.format("%Y-%m-%d").to_string())
        .y_label_formatter(&|y| format!("${:.2}", y))
        .disable_x_mesh()
        .draw()?;
    Ok(())
}

/// Configure mesh styling for count-valued date charts.
fn configure_count_mesh<DB: DrawingBackend>(
    chart: &mut ChartContext<DB, Cartesian2d<RangedDate<NaiveDate>, RangedCoordi64>>,
) -> Result<()>
where
    <DB as DrawingBackend>::ErrorType: 'static,
{
    chart
        .configure_mesh()
        .bold_line_style(&GRID_COLOR.mix(0.3))
        .light_line_style(&TRANSPARENT)
        .x_labels(8)
        .y_labels(6)
        .x_label_style((FONT_FAMILY, AXIS_SIZE).into_font().color(&TEXT_SECONDARY))
        .y_label_style((FONT_FAMILY, AXIS_SIZE).into_font().color(&TEXT_SECONDARY))
        .x_label_formatter(&|date| date.format("%Y-%m-%d").to_string())
        .y_label_formatter(&|y| format_number(*y as u64))
        .disable_x_mesh()
        .draw()?;
    Ok(())
}

fn date_bounds(series: &[DailyMetricRow]) -> (NaiveDate, NaiveDate) {
    // Series is dense and ascending by construction.
    (series[0].date, series[series.len() - 1].date)
}

/// Daily spend trend (area chart).
fn generate_spend_chart(series: &[DailyMetricRow], output_path: &Utf8Path) -> Result<()> {
    let root = create_drawing_area(output_path)?;

    let (min_date, max_date) = date_bounds(series);
    let max_spend = series.iter().map(|r| r.spend).fold(0.0f64, f64::max).max(1.0);

    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Daily Spend",
            (FONT_FAMILY, TITLE_SIZE).into_font().color(&TEXT_PRIMARY),
        )
        .margin(60)
        .x_label_area_size(70)
        .y_label_area_size(100)
        .build_cartesian_2d(min_date..max_date, 0f64..max_spend)?;

    configure_currency_mesh(&mut chart)?;

    chart.draw_series(AreaSeries::new(
        series.iter().map(|r| (r.date, r.spend)),
        0.0,
        ACCENT_BLUE.mix(0.15),
    ))?;

    chart.draw_series(LineSeries::new(
        series.iter().map(|r| (r.date, r.spend)),
        ShapeStyle {
            color: ACCENT_BLUE.to_rgba(),
            filled: true,
            stroke_width: 3,
        },
    ))?;

    root.present()?;
    println!("  • daily-spend.png");
    Ok(())
}

/// Daily clicks trend (line chart).
fn generate_clicks_chart(series: &[DailyMetricRow], output_path: &Utf8Path) -> Result<()> {
    let root = create_drawing_area(output_path)?;

    let (min_date, max_date) = date_bounds(series);
    let max_clicks = series.iter().map(|r| r.clicks as i64).max().unwrap_or(0).max(1);

    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Daily Clicks",
            (FONT_FAMILY, TITLE_SIZE).into_font().color(&TEXT_PRIMARY),
        )
        .margin(60)
        .x_label_area_size(70)
        .y_label_area_size(100)
        .build_cartesian_2d(min_date..max_date, 0i64..max_clicks)?;

    configure_count_mesh(&mut chart)?;

    chart.draw_series(LineSeries::new(
        series.iter().map(|r| (r.date, r.clicks as i64)),
        ShapeStyle {
            color: ACCENT_GREEN.to_rgba(),
            filled: true,
            stroke_width: 3,
        },
    ))?;

    root.present()?;
    println!("  • daily-clicks.png");
    Ok(())
}

/// Revenue against spend (two lines with legend).
fn generate_revenue_chart(series: &[DailyMetricRow], output_path: &Utf8Path) -> Result<()> {
    let root = create_drawing_area(output_path)?;

    let (min_date, max_date) = date_bounds(series);
    let max_value = series
        .iter()
        .map(|r| r.spend.max(r.revenue))
        .fold(0.0f64, f64::max)
        .max(1.0);

    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Revenue vs Spend",
            (FONT_FAMILY, TITLE_SIZE).into_font().color(&TEXT_PRIMARY),
        )
        .margin(60)
        .x_label_area_size(70)
        .y_label_area_size(100)
        .build_cartesian_2d(min_date..max_date, 0f64..max_value)?;

    configure_currency_mesh(&mut chart)?;

    chart
        .draw_series(LineSeries::new(
            series.iter().map(|r| (r.date, r.spend)),
            ShapeStyle {
                color: ACCENT_ORANGE.to_rgba(),
                filled: true,
                stroke_width: 3,
            },
        ))?
        .label("Spend")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], ACCENT_ORANGE.filled()));

    chart
        .draw_series(LineSeries::new(
            series.iter().map(|r| (r.date, r.revenue)),
            ShapeStyle {
                color: ACCENT_GREEN.to_rgba(),
                filled: true,
                stroke_width: 3,
            },
        ))?
        .label("Revenue")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], ACCENT_GREEN.filled()));

    chart
        .configure_series_labels()
        .label_font((FONT_FAMILY, LABEL_SIZE).into_font().color(&TEXT_PRIMARY))
        .background_style(&BACKGROUND)
        .border_style(&GRID_COLOR)
        .margin(15)
        .draw()?;

    root.present()?;
    println!("  • revenue-vs-spend.png");
    Ok(())
}

/// Format a number with thousands separators.
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    let mut count = 0;

    for c in s.chars().rev() {
        if count > 0 && count % 3 == 0 {
            result.push(',');
        }
        result.push(c);
        count += 1;
    }

    result.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1_234_567), "1,234,567");
    }
}
