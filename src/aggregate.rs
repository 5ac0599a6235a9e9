// Copyright (c) The adsight Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Densification and roll-up of daily insight rows.
//!
//! Upstream data is sparse: a day with zero activity is absent from the
//! response. Charts must never show a gap, so every day in the window appears
//! exactly once in the dense series, zero-filled where the source had nothing.

use crate::window::ResolvedWindow;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One calendar day of account metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyMetricRow {
    pub date: NaiveDate,
    pub spend: f64,
    pub clicks: u64,
    pub impressions: u64,
    pub reach: u64,
    pub ctr: f64,
    pub cpc: f64,
    pub cpm: f64,
    pub revenue: f64,
    pub roas: f64,
}

impl DailyMetricRow {
    /// A synthesized row for a day the upstream source omitted.
    pub fn zero(date: NaiveDate) -> Self {
        DailyMetricRow {
            date,
            spend: 0.0,
            clicks: 0,
            impressions: 0,
            reach: 0,
            ctr: 0.0,
            cpc: 0.0,
            cpm: 0.0,
            revenue: 0.0,
            roas: 0.0,
        }
    }
}

/// Period roll-up. Ratio fields are derived from the summed raw counts, never
/// by averaging per-day ratios: daily CTR/CPC/CPM values weighted equally
/// would misstate periods with uneven traffic volume.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodTotals {
    #[serde(rename = "totalSpent")]
    pub total_spent: f64,
    #[serde(rename = "totalClicks")]
    pub total_clicks: u64,
    #[serde(rename = "totalImpressions")]
    pub total_impressions: u64,
    #[serde(rename = "totalReach")]
    pub total_reach: u64,
    #[serde(rename = "avgCPC")]
    pub avg_cpc: f64,
    #[serde(rename = "avgCPM")]
    pub avg_cpm: f64,
    #[serde(rename = "avgCTR")]
    pub avg_ctr: f64,
}

/// Period-over-period delta for a single metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentChange {
    pub metric: String,
    pub current: f64,
    pub previous: f64,
    pub change_pct: f64,
}

/// Fill a sparse set of daily rows into a gap-free series covering every
/// calendar date in the window, ascending.
pub fn densify(sparse: &[DailyMetricRow], window: &ResolvedWindow) -> Vec<DailyMetricRow> {
    let by_date: HashMap<NaiveDate, &DailyMetricRow> =
        sparse.iter().map(|row| (row.date, row)).collect();

    let mut series = Vec::with_capacity(window.days() as usize);
    let mut day = window.since;
    while day <= window.until {
        match by_date.get(&day) {
            Some(row) => series.push((*row).clone()),
            None => series.push(DailyMetricRow::zero(day)),
        }
        day += Duration::days(1);
    }
    series
}

/// True when the upstream returned fewer (or more) rows than the window has
/// days. Partial data is expected and recoverable; this only annotates the
/// response, it never blocks it.
pub fn completeness_warning(sparse: &[DailyMetricRow], window: &ResolvedWindow) -> bool {
    sparse.len() as i64 != window.days()
}

/// Roll a dense series up into period totals.
pub fn aggregate(series: &[DailyMetricRow]) -> PeriodTotals {
    let total_spent: f64 = series.iter().map(|r| r.spend).sum();
    let total_clicks: u64 = series.iter().map(|r| r.clicks).sum();
    let total_impressions: u64 = series.iter().map(|r| r.impressions).sum();
    let total_reach: u64 = series.iter().map(|r| r.reach).sum();

    let avg_cpc = if total_clicks > 0 {
        total_spent / total_clicks as f64
    } else {
        0.0
    };
    let avg_cpm = if total_impressions > 0 {
        total_spent / total_impressions as f64 * 1000.0
    } else {
        0.0
    };
    let avg_ctr = if total_impressions > 0 {
        total_clicks as f64 / total_impressions as f64 * 100.0
    } else {
        0.0
    };

    PeriodTotals {
        total_spent,
        total_clicks,
        total_impressions,
        total_reach,
        avg_cpc,
        avg_cpm,
        avg_ctr,
    }
}

/// Percentage change between two period values.
///
/// A zero previous value maps to 100 when the current value is positive and 0
/// otherwise. The asymmetry is a product convention; keep it as-is.
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous != 0.0 {
        (current - previous) / previous * 100.0
    } else if current > 0.0 {
        100.0
    } else {
        0.0
    }
}

/// Per-metric deltas between the current and previous period totals, keyed by
/// the metric names used in the response payload.
pub fn summary_changes(
    current: &PeriodTotals,
    previous: &PeriodTotals,
) -> BTreeMap<String, PercentChange> {
    let pairs: [(&str, f64, f64); 7] = [
        ("totalSpent", current.total_spent, previous.total_spent),
        (
            "totalClicks",
            current.total_clicks as f64,
            previous.total_clicks as f64,
        ),
        (
            "totalImpressions",
            current.total_impressions as f64,
            previous.total_impressions as f64,
        ),
        (
            "totalReach",
            current.total_reach as f64,
            previous.total_reach as f64,
        ),
        ("avgCPC", current.avg_cpc, previous.avg_cpc),
        ("avgCPM", current.avg_cpm, previous.avg_cpm),
        ("avgCTR", current.avg_ctr, previous.avg_ctr),
    ];

    pairs
        .into_iter()
        .map(|(metric, cur, prev)| {
            (
                metric.to_string(),
                PercentChange {
                    metric: metric.to_string(),
                    current: cur,
                    previous: prev,
                    change_pct: percent_change(cur, prev),
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::ResolvedWindow;
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn window(since: u32, until: u32) -> ResolvedWindow {
        ResolvedWindow {
            since: date(since),
            until: date(until),
            timezone: chrono_tz::America::New_York,
        }
    }

    fn row(d: u32, spend: f64, clicks: u64) -> DailyMetricRow {
        DailyMetricRow {
            spend,
            clicks,
            ..DailyMetricRow::zero(date(d))
        }
    }

    #[test]
    fn test_densify_one_row_per_day_ascending() {
        let sparse = vec![row(12, 5.0, 2), row(10, 1.0, 1)];
        let dense = densify(&sparse, &window(9, 15));

        assert_eq!(dense.len(), 7);
        for (i, entry) in dense.iter().enumerate() {
            assert_eq!(entry.date, date(9 + i as u32));
        }
    }

    #[test]
    fn test_densify_zero_fills_missing_days() {
        let sparse = vec![row(10, 1.0, 1)];
        let dense = densify(&sparse, &window(9, 11));

        assert_eq!(dense[0], DailyMetricRow::zero(date(9)));
        assert_eq!(dense[1].spend, 1.0);
        assert_eq!(dense[2], DailyMetricRow::zero(date(11)));
    }

    #[test]
    fn test_densify_empty_input_is_all_zero() {
        let dense = densify(&[], &window(1, 30));
        assert_eq!(dense.len(), 30);
        assert!(dense.iter().all(|r| r.spend == 0.0 && r.clicks == 0));
    }

    #[test]
    fn test_aggregate_sums_then_derives() {
        // Daily CPCs are 10.0 and 10/9; their mean is not the right answer.
        let series = vec![row(9, 10.0, 1), row(10, 10.0, 9)];
        let totals = aggregate(&series);

        assert_eq!(totals.total_spent, 20.0);
        assert_eq!(totals.total_clicks, 10);
        assert_eq!(totals.avg_cpc, 2.0);
    }

    #[test]
    fn test_aggregate_zero_denominators() {
        let totals = aggregate(&[DailyMetricRow::zero(date(9))]);
        assert_eq!(totals.avg_cpc, 0.0);
        assert_eq!(totals.avg_cpm, 0.0);
        assert_eq!(totals.avg_ctr, 0.0);
    }

    #[test]
    fn test_aggregate_derived_ratios() {
        let mut a = row(9, 50.0, 100);
        a.impressions = 10_000;
        let totals = aggregate(&[a]);

        assert_eq!(totals.avg_cpc, 0.5);
        assert_eq!(totals.avg_cpm, 5.0);
        assert_eq!(totals.avg_ctr, 1.0);
    }

    #[test]
    fn test_percent_change_zero_handling() {
        assert_eq!(percent_change(5.0, 0.0), 100.0);
        assert_eq!(percent_change(0.0, 0.0), 0.0);
        assert_eq!(percent_change(50.0, 100.0), -50.0);
    }

    #[test]
    fn test_summary_changes_covers_all_metrics() {
        let current = aggregate(&[row(9, 20.0, 10)]);
        let previous = aggregate(&[row(2, 10.0, 10)]);
        let changes = summary_changes(&current, &previous);

        assert_eq!(changes.len(), 7);
        let spent = &changes["totalSpent"];
        assert_eq!(spent.current, 20.0);
        assert_eq!(spent.previous, 10.0);
        assert_eq!(spent.change_pct, 100.0);
        assert_eq!(changes["totalClicks"].change_pct, 0.0);
    }

    #[test]
    fn test_completeness_warning() {
        let sparse = vec![row(10, 1.0, 1)];
        assert!(completeness_warning(&sparse, &window(9, 15)));

        let full: Vec<_> = (9..=15).map(|d| row(d, 1.0, 1)).collect();
        assert!(!completeness_warning(&full, &window(9, 15)));
    }
}
