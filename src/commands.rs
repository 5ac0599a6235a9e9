// Copyright (c) The adsight Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command implementations.

use crate::aggregate::DailyMetricRow;
use crate::charts;
use crate::config::Config;
use crate::report::{self, Report, ReportRequest};
use crate::server::{self, AppState};
use anyhow::{Context, Result};
use camino::Utf8Path;
use std::fs::File;
use std::io::Write;
use tokio::net::TcpListener;

/// Run the HTTP server until interrupted.
pub async fn run_serve(config: Config) -> Result<()> {
    let bind = config.server.bind.clone();
    let state = AppState::new(config);
    let app = server::router(state);

    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    tracing::info!("listening on {bind}");

    axum::serve(listener, app)
        .await
        .context("server exited with error")?;
    Ok(())
}

/// Run a one-shot report and print it.
pub async fn run_report(config: &Config, request: &ReportRequest) -> Result<()> {
    let report = fetch_report(config, request).await?;
    print_report(&report, request);
    Ok(())
}

/// Export the dense daily series to a CSV file.
pub async fn run_export_csv(
    config: &Config,
    request: &ReportRequest,
    output: &Utf8Path,
) -> Result<()> {
    let report = fetch_report(config, request).await?;

    let mut file = File::create(output.as_std_path())
        .with_context(|| format!("failed to create file at {}", output))?;

    writeln!(
        file,
        "date,spend,clicks,impressions,reach,ctr,cpc,cpm,revenue,roas"
    )?;
    for row in &report.current {
        writeln!(
            file,
            "{},{},{},{},{},{},{},{},{},{}",
            row.date,
            row.spend,
            row.clicks,
            row.impressions,
            row.reach,
            row.ctr,
            row.cpc,
            row.cpm,
            row.revenue,
            row.roas
        )?;
    }

    println!("Exported {} days to {}.", report.current.len(), output);
    Ok(())
}

/// Export the dense daily series to a JSON file.
pub async fn run_export_json(
    config: &Config,
    request: &ReportRequest,
    output: &Utf8Path,
) -> Result<()> {
    let report = fetch_report(config, request).await?;

    let json = serde_json::to_string_pretty(&report.current)?;
    let mut file = File::create(output.as_std_path())
        .with_context(|| format!("failed to create file at {}", output))?;
    file.write_all(json.as_bytes())?;

    println!("Exported {} days to {}.", report.current.len(), output);
    Ok(())
}

/// Render charts for the requested window.
pub async fn run_charts(
    config: &Config,
    request: &ReportRequest,
    output_dir: &Utf8Path,
) -> Result<()> {
    let report = fetch_report(config, request).await?;
    charts::generate_all_charts(&report.current, output_dir)?;
    Ok(())
}

async fn fetch_report(config: &Config, request: &ReportRequest) -> Result<Report> {
    let client = crate::facebook::FacebookClient::new(&config.facebook);
    let report = report::build_report(&client, config, request)
        .await
        .context("failed to build report")?;
    Ok(report)
}

fn print_report(report: &Report, request: &ReportRequest) {
    println!(
        "\nAccount: {} ({}, {})",
        report.account.name, report.account.currency, report.account.timezone
    );
    // Echo the range actually applied; unrecognized selectors fall back.
    println!("Range:   {}", request.selector.as_str());
    println!(
        "Period:  {} to {} ({} days)",
        report.window.since,
        report.window.until,
        report.window.days()
    );
    if report.completeness_warning {
        println!("Note: upstream returned partial data for this period.");
    }

    // Daily breakdown only for windows short enough to scan.
    if report.current.len() <= 31 {
        println!("\n{:<12} {:>12} {:>10} {:>14} {:>12}", "Date", "Spend", "Clicks", "Impressions", "Revenue");
        println!("{}", "=".repeat(64));
        for row in &report.current {
            print_day(row);
        }
    }

    println!("\nTotals");
    println!("  Spend:       ${:.2}", report.totals.total_spent);
    println!("  Clicks:      {}", format_number(report.totals.total_clicks));
    println!(
        "  Impressions: {}",
        format_number(report.totals.total_impressions)
    );
    println!("  Reach:       {}", format_number(report.totals.total_reach));
    println!("  Avg CPC:     ${:.4}", report.totals.avg_cpc);
    println!("  Avg CPM:     ${:.4}", report.totals.avg_cpm);
    println!("  Avg CTR:     {:.4}%", report.totals.avg_ctr);

    if let (Some(summary), Some(prev_window)) = (&report.summary, &report.comparison_window) {
        println!(
            "\nVersus previous period ({} to {})",
            prev_window.since, prev_window.until
        );
        for change in summary.values() {
            println!(
                "  {:<18} {:>12.2} -> {:>12.2}  ({:+.1}%)",
                change.metric, change.previous, change.current, change.change_pct
            );
        }
    }
}

fn print_day(row: &DailyMetricRow) {
    println!(
        "{:<12} {:>12} {:>10} {:>14} {:>12}",
        row.date.to_string(),
        format!("${:.2}", row.spend),
        format_number(row.clicks),
        format_number(row.impressions),
        format!("${:.2}", row.revenue),
    );
}

fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}
