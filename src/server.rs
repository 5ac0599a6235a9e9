// Copyright (c) The adsight Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP endpoints serving the aggregated reports as JSON.
//!
//! Two report routes exist because they make different freshness tradeoffs:
//! `/api/insights` anchors on today and includes the partially-accumulated
//! current day; `/api/ads/summary` anchors on yesterday so every reported day
//! has finished accumulating upstream.

use crate::aggregate::{DailyMetricRow, PercentChange, PeriodTotals};
use crate::config::Config;
use crate::error::AppError;
use crate::facebook::FacebookClient;
use crate::report::{self, Report, ReportRequest};
use crate::window::{Anchor, RangeSelector};
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

#[derive(Clone)]
pub struct AppState {
    pub facebook: FacebookClient,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        AppState {
            facebook: FacebookClient::new(&config.facebook),
            config: Arc::new(config),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/insights", post(insights))
        .route("/api/ads/summary", post(ads_summary))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsRequest {
    pub access_token: Option<String>,
    pub account_id: Option<String>,
    pub date_range: Option<String>,
    pub compare: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsResponse {
    pub success: bool,
    pub data: SeriesPayload,
    pub totals: PeriodTotals,
    pub summary_stats: Option<BTreeMap<String, PercentChange>>,
    pub account_info: AccountPayload,
    pub date_range: DateRangePayload,
    pub data_completeness_warning: bool,
}

#[derive(Debug, Serialize)]
pub struct SeriesPayload {
    pub current: Vec<DailyMetricRow>,
    pub previous: Option<Vec<DailyMetricRow>>,
}

#[derive(Debug, Serialize)]
pub struct AccountPayload {
    pub name: String,
    pub timezone: String,
    pub currency: String,
}

#[derive(Debug, Serialize)]
pub struct DateRangePayload {
    pub since: NaiveDate,
    pub until: NaiveDate,
    pub days: i64,
    pub comparison: Option<ComparisonPayload>,
}

#[derive(Debug, Serialize)]
pub struct ComparisonPayload {
    pub since: NaiveDate,
    pub until: NaiveDate,
}

/// Freshness-first report: includes the in-progress day.
async fn insights(
    State(state): State<AppState>,
    body: Result<Json<InsightsRequest>, JsonRejection>,
) -> Result<Json<InsightsResponse>, AppError> {
    run_report(state, accept_body(body)?, Anchor::Today).await
}

/// Completeness-first report: every included day is fully accumulated.
async fn ads_summary(
    State(state): State<AppState>,
    body: Result<Json<InsightsRequest>, JsonRejection>,
) -> Result<Json<InsightsResponse>, AppError> {
    run_report(state, accept_body(body)?, Anchor::Yesterday).await
}

/// Axum's default rejection for a malformed body is plain text; route it
/// through the error type so clients always get the `{"error": ...}` shape.
fn accept_body(
    body: Result<Json<InsightsRequest>, JsonRejection>,
) -> Result<InsightsRequest, AppError> {
    match body {
        Ok(Json(request)) => Ok(request),
        Err(rejection) => Err(AppError::InvalidRequest(rejection.body_text())),
    }
}

async fn run_report(
    state: AppState,
    body: InsightsRequest,
    anchor: Anchor,
) -> Result<Json<InsightsResponse>, AppError> {
    let access_token = body
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or(AppError::MissingField("accessToken"))?;
    let account_id = body
        .account_id
        .filter(|a| !a.is_empty())
        .ok_or(AppError::MissingField("accountId"))?;
    let selector = RangeSelector::from_param(body.date_range.as_deref().unwrap_or_default());

    let request = ReportRequest {
        access_token,
        account_id,
        selector,
        anchor,
        compare: body.compare.unwrap_or(false),
    };

    let report = report::build_report(&state.facebook, &state.config, &request).await?;
    Ok(Json(to_response(report)))
}

fn to_response(report: Report) -> InsightsResponse {
    let comparison = report.comparison_window.as_ref().map(|w| ComparisonPayload {
        since: w.since,
        until: w.until,
    });

    InsightsResponse {
        success: true,
        data: SeriesPayload {
            current: report.current,
            previous: report.previous,
        },
        totals: report.totals,
        summary_stats: report.summary,
        account_info: AccountPayload {
            name: report.account.name,
            timezone: report.account.timezone,
            currency: report.account.currency,
        },
        date_range: DateRangePayload {
            since: report.window.since,
            until: report.window.until,
            days: report.window.days(),
            comparison,
        },
        data_completeness_warning: report.completeness_warning,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate;
    use crate::report::AccountDetails;
    use crate::window::ResolvedWindow;

    #[test]
    fn test_request_accepts_camel_case() {
        let json = r#"{
            "accessToken": "tok",
            "accountId": "act_1",
            "dateRange": "last_7d",
            "compare": true
        }"#;
        let req: InsightsRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.access_token.as_deref(), Some("tok"));
        assert_eq!(req.account_id.as_deref(), Some("act_1"));
        assert_eq!(req.date_range.as_deref(), Some("last_7d"));
        assert_eq!(req.compare, Some(true));
    }

    #[test]
    fn test_request_optional_fields_default() {
        let req: InsightsRequest = serde_json::from_str("{}").unwrap();
        assert!(req.access_token.is_none());
        assert!(req.date_range.is_none());
        assert!(req.compare.is_none());
    }

    #[tokio::test]
    async fn test_malformed_body_returns_json_error() {
        use axum::body::Body;
        use axum::http::{Request, StatusCode, header};
        use http_body_util::BodyExt;
        use tower::ServiceExt;

        let app = router(AppState::new(Config::default()));
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/insights")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(value["error"].is_string(), "body: {value}");
    }

    #[tokio::test]
    async fn test_missing_content_type_returns_json_error() {
        use axum::body::Body;
        use axum::http::{Request, StatusCode};
        use http_body_util::BodyExt;
        use tower::ServiceExt;

        let app = router(AppState::new(Config::default()));
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/ads/summary")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(value["error"].is_string(), "body: {value}");
    }

    #[test]
    fn test_response_payload_shape() {
        let window = ResolvedWindow {
            since: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
            until: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            timezone: chrono_tz::America::New_York,
        };
        let current = aggregate::densify(&[], &window);
        let totals = aggregate::aggregate(&current);
        let report = Report {
            account: AccountDetails {
                name: "Acme".to_string(),
                timezone: "America/New_York".to_string(),
                currency: "USD".to_string(),
            },
            window,
            comparison_window: None,
            current,
            previous: None,
            totals,
            summary: None,
            completeness_warning: true,
        };

        let value = serde_json::to_value(to_response(report)).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["data"]["current"].as_array().unwrap().len(), 7);
        assert!(value["data"]["previous"].is_null());
        assert!(value["summaryStats"].is_null());
        assert_eq!(value["accountInfo"]["timezone"], "America/New_York");
        assert_eq!(value["dateRange"]["days"], 7);
        assert!(value["dateRange"]["comparison"].is_null());
        assert_eq!(value["dataCompletenessWarning"], true);
        assert_eq!(value["totals"]["totalSpent"], 0.0);
    }
}
