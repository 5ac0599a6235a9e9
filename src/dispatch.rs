// Copyright (c) The adsight Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! CLI argument parsing and command dispatch.

use crate::report::ReportRequest;
use crate::window::{Anchor, RangeSelector};
use crate::{commands, config};
use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: Utf8PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser, Debug)]
enum Command {
    /// Run the HTTP API server
    Serve,

    /// Fetch and print a one-shot account report
    Report {
        #[command(flatten)]
        report: ReportArgs,
    },

    /// Export the daily series to various formats
    Export {
        #[command(subcommand)]
        export_type: ExportType,
    },

    /// Generate charts for the requested window
    Charts {
        /// Output directory for charts
        #[arg(short, long, default_value = "charts")]
        output: Utf8PathBuf,

        #[command(flatten)]
        report: ReportArgs,
    },
}

#[derive(clap::Args, Debug)]
struct ReportArgs {
    /// Ad account id (with or without the act_ prefix)
    #[arg(short, long)]
    account_id: String,

    /// Graph API access token; falls back to FACEBOOK_ACCESS_TOKEN
    #[arg(long)]
    access_token: Option<String>,

    /// Date range: last_7d, last_30d, last_90d, or last_12m
    #[arg(short, long, default_value = "last_30d")]
    date_range: String,

    /// Anchor mode: 'yesterday' for complete data, 'today' for freshness
    #[arg(long, default_value = "yesterday")]
    anchor: String,

    /// Also fetch the immediately preceding period for comparison
    #[arg(long)]
    compare: bool,
}

#[derive(Parser, Debug)]
enum ExportType {
    /// Export to CSV format
    Csv {
        /// Output file path
        #[arg(short, long)]
        output: Utf8PathBuf,

        #[command(flatten)]
        report: ReportArgs,
    },

    /// Export to JSON format
    Json {
        /// Output file path
        #[arg(short, long)]
        output: Utf8PathBuf,

        #[command(flatten)]
        report: ReportArgs,
    },
}

impl ReportArgs {
    fn into_request(self) -> Result<ReportRequest> {
        let access_token = match self.access_token {
            Some(token) => token,
            None => std::env::var("FACEBOOK_ACCESS_TOKEN")
                .context("no access token: pass --access-token or set FACEBOOK_ACCESS_TOKEN")?,
        };

        Ok(ReportRequest {
            access_token,
            account_id: self.account_id,
            selector: RangeSelector::from_param(&self.date_range),
            anchor: Anchor::from_param(&self.anchor),
            compare: self.compare,
        })
    }
}

/// Parse arguments and dispatch to the appropriate command.
pub async fn dispatch() -> Result<()> {
    init_tracing();

    let args = Args::parse();
    let config =
        config::Config::load_or_default(&args.config).context("failed to load configuration")?;

    match args.command {
        Command::Serve => {
            commands::run_serve(config).await?;
        }
        Command::Report { report } => {
            let request = report.into_request()?;
            commands::run_report(&config, &request).await?;
        }
        Command::Export { export_type } => match export_type {
            ExportType::Csv { output, report } => {
                let request = report.into_request()?;
                commands::run_export_csv(&config, &request, &output).await?;
            }
            ExportType::Json { output, report } => {
                let request = report.into_request()?;
                commands::run_export_json(&config, &request, &output).await?;
            }
        },
        Command::Charts { output, report } => {
            let request = report.into_request()?;
            commands::run_charts(&config, &request, &output).await?;
        }
    }

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
