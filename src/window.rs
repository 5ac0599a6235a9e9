// Copyright (c) The adsight Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Date window resolution for report ranges.
//!
//! Windows are inclusive `[since, until]` calendar-date pairs expressed in the
//! ad account's timezone. Day boundaries are defined in that timezone, not
//! UTC, so accounts east or west of Greenwich don't pick up off-by-one days.

use crate::error::AppError;
use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};
use chrono_tz::Tz;

/// Symbolic date-range selector accepted by the report endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeSelector {
    Last7d,
    Last30d,
    Last90d,
    Last12m,
}

impl RangeSelector {
    /// Parse a selector string, falling back to `last_30d` for anything
    /// unrecognized. Callers send free-form strings; the fallback matches
    /// what the dashboard assumes.
    pub fn from_param(value: &str) -> Self {
        match value {
            "last_7d" => RangeSelector::Last7d,
            "last_90d" => RangeSelector::Last90d,
            "last_12m" => RangeSelector::Last12m,
            _ => RangeSelector::Last30d,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RangeSelector::Last7d => "last_7d",
            RangeSelector::Last30d => "last_30d",
            RangeSelector::Last90d => "last_90d",
            RangeSelector::Last12m => "last_12m",
        }
    }
}

/// Reference date a window is computed relative to.
///
/// `Today` prioritizes freshness and includes the partially-accumulated
/// current day. `Yesterday` prioritizes completeness: every included day has
/// finished accumulating impressions upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Today,
    Yesterday,
}

impl Anchor {
    pub fn from_param(value: &str) -> Self {
        match value {
            "today" => Anchor::Today,
            _ => Anchor::Yesterday,
        }
    }

    /// The month-span strategy each anchor mode pairs with by default.
    pub fn default_month_span(self) -> MonthSpan {
        match self {
            Anchor::Today => MonthSpan::Rolling,
            Anchor::Yesterday => MonthSpan::Completed,
        }
    }
}

/// How a `last_12m` window maps onto calendar months.
///
/// The two strategies are not equivalent and callers depend on which one they
/// invoke, so both are explicit rather than collapsed into one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthSpan {
    /// Start of the anchor's month minus 11 months, through the end of the
    /// anchor's month. Includes the in-progress month.
    Rolling,
    /// Twelve whole completed calendar months ending the last day of the
    /// month before the anchor's month.
    Completed,
}

/// A concrete inclusive date range in an account timezone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedWindow {
    pub since: NaiveDate,
    pub until: NaiveDate,
    pub timezone: Tz,
}

impl ResolvedWindow {
    /// Number of calendar days covered, inclusive of both endpoints.
    pub fn days(&self) -> i64 {
        (self.until - self.since).num_days() + 1
    }
}

/// Parse an IANA timezone name, applying the configured default when the
/// account metadata omits one. An unparseable name is a configuration error,
/// not a silent fallback.
pub fn parse_timezone(name: Option<&str>, default: &str) -> Result<Tz, AppError> {
    let name = match name {
        Some(n) if !n.is_empty() => n,
        _ => default,
    };
    name.parse::<Tz>()
        .map_err(|_| AppError::Configuration(name.to_string()))
}

/// Resolve a selector into a concrete window anchored on the current instant.
pub fn resolve(selector: RangeSelector, timezone: Tz, anchor: Anchor) -> ResolvedWindow {
    resolve_at(selector, timezone, anchor, Utc::now())
}

/// Resolve against an explicit instant. Split out so window arithmetic is
/// testable without touching the wall clock.
pub fn resolve_at(
    selector: RangeSelector,
    timezone: Tz,
    anchor: Anchor,
    now: DateTime<Utc>,
) -> ResolvedWindow {
    resolve_with_span(selector, timezone, anchor, anchor.default_month_span(), now)
}

/// Resolve with an explicit month-span strategy for `last_12m`.
pub fn resolve_with_span(
    selector: RangeSelector,
    timezone: Tz,
    anchor: Anchor,
    month_span: MonthSpan,
    now: DateTime<Utc>,
) -> ResolvedWindow {
    let mut anchor_date = now.with_timezone(&timezone).date_naive();
    if anchor == Anchor::Yesterday {
        anchor_date -= Duration::days(1);
    }

    let (since, until) = match selector {
        RangeSelector::Last7d => (anchor_date - Duration::days(6), anchor_date),
        RangeSelector::Last30d => (anchor_date - Duration::days(29), anchor_date),
        RangeSelector::Last90d => (anchor_date - Duration::days(89), anchor_date),
        RangeSelector::Last12m => twelve_month_window(anchor_date, month_span),
    };

    ResolvedWindow {
        since,
        until,
        timezone,
    }
}

fn twelve_month_window(anchor_date: NaiveDate, span: MonthSpan) -> (NaiveDate, NaiveDate) {
    match span {
        MonthSpan::Rolling => {
            let since = months_back(month_start(anchor_date), 11);
            (since, month_end(anchor_date))
        }
        MonthSpan::Completed => {
            let until = month_start(anchor_date) - Duration::days(1);
            let since = months_back(month_start(until), 11);
            (since, until)
        }
    }
}

/// Derive the immediately preceding window of equal length: same day count,
/// adjacent, no gap or overlap.
pub fn derive_previous(window: &ResolvedWindow) -> Result<ResolvedWindow, AppError> {
    if window.since > window.until {
        return Err(AppError::InvalidWindow {
            since: window.since,
            until: window.until,
        });
    }
    let length = window.days();
    let until = window.since - Duration::days(1);
    let since = until - Duration::days(length - 1);
    Ok(ResolvedWindow {
        since,
        until,
        timezone: window.timezone,
    })
}

fn month_start(date: NaiveDate) -> NaiveDate {
    // Day 1 exists in every month.
    date.with_day(1).expect("day 1 is valid in every month")
}

fn month_end(date: NaiveDate) -> NaiveDate {
    month_start(date) + Months::new(1) - Duration::days(1)
}

fn months_back(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(months))
        .expect("month arithmetic stays within NaiveDate range")
}
