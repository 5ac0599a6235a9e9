// Copyright (c) The adsight Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end report assembly: resolve the window, fetch, densify, aggregate,
//! and optionally compare against the immediately preceding period.
//!
//! Both HTTP endpoints and the CLI commands go through this one path; the
//! anchor mode and month-span strategy are parameters, not copies of the
//! logic.

use crate::aggregate::{self, DailyMetricRow, PercentChange, PeriodTotals};
use crate::config::{Config, UpstreamFailurePolicy};
use crate::error::AppError;
use crate::facebook::FacebookClient;
use crate::window::{self, Anchor, RangeSelector, ResolvedWindow};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct ReportRequest {
    pub access_token: String,
    pub account_id: String,
    pub selector: RangeSelector,
    pub anchor: Anchor,
    pub compare: bool,
}

#[derive(Debug, Clone)]
pub struct AccountDetails {
    pub name: String,
    pub timezone: String,
    pub currency: String,
}

#[derive(Debug)]
pub struct Report {
    pub account: AccountDetails,
    pub window: ResolvedWindow,
    pub comparison_window: Option<ResolvedWindow>,
    pub current: Vec<DailyMetricRow>,
    pub previous: Option<Vec<DailyMetricRow>>,
    pub totals: PeriodTotals,
    pub summary: Option<BTreeMap<String, PercentChange>>,
    pub completeness_warning: bool,
}

/// Build a full period report for one account.
///
/// The current-period fetch honors the configured upstream-failure policy.
/// The previous-period fetch always soft-fails: a comparison outage must not
/// block the current-period data.
pub async fn build_report(
    client: &FacebookClient,
    config: &Config,
    request: &ReportRequest,
) -> Result<Report, AppError> {
    let info = client
        .fetch_account_info(&request.access_token, &request.account_id)
        .await?;

    let timezone = window::parse_timezone(
        info.timezone_name.as_deref(),
        &config.defaults.timezone,
    )?;
    let resolved = window::resolve(request.selector, timezone, request.anchor);

    let sparse = match client
        .fetch_daily_insights(&request.access_token, &request.account_id, &resolved)
        .await
    {
        Ok(rows) => rows,
        Err(err) => match config.defaults.upstream_failure {
            UpstreamFailurePolicy::ZeroFill => {
                tracing::warn!(
                    account = %request.account_id,
                    "insights fetch failed, rendering period as empty: {err}"
                );
                Vec::new()
            }
            UpstreamFailurePolicy::Error => return Err(err),
        },
    };

    let completeness_warning = aggregate::completeness_warning(&sparse, &resolved);
    let current = aggregate::densify(&sparse, &resolved);
    let totals = aggregate::aggregate(&current);

    let (comparison_window, previous, summary) = if request.compare {
        let prev_window = window::derive_previous(&resolved)?;
        let prev_sparse = match client
            .fetch_daily_insights(&request.access_token, &request.account_id, &prev_window)
            .await
        {
            Ok(rows) => rows,
            Err(err) => {
                tracing::warn!(
                    account = %request.account_id,
                    "previous-period fetch failed, comparing against empty data: {err}"
                );
                Vec::new()
            }
        };
        let prev_series = aggregate::densify(&prev_sparse, &prev_window);
        let prev_totals = aggregate::aggregate(&prev_series);
        let summary = aggregate::summary_changes(&totals, &prev_totals);
        (Some(prev_window), Some(prev_series), Some(summary))
    } else {
        (None, None, None)
    };

    Ok(Report {
        account: AccountDetails {
            name: info.name.unwrap_or_default(),
            timezone: timezone.to_string(),
            currency: info.currency.unwrap_or_default(),
        },
        window: resolved,
        comparison_window,
        current,
        previous,
        totals,
        summary,
        completeness_warning,
    })
}
