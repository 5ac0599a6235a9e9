// Copyright (c) The adsight Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Facebook Graph API client for ad-account insights.
//!
//! The Graph API returns every numeric metric as a string and omits days with
//! zero activity entirely; parsing is defensive with 0 defaults and the
//! caller densifies the result.

use crate::aggregate::DailyMetricRow;
use crate::config::FacebookConfig;
use crate::error::AppError;
use crate::window::ResolvedWindow;
use chrono::NaiveDate;
use serde::Deserialize;

const INSIGHT_FIELDS: &str = "spend,clicks,impressions,reach,ctr,cpc,cpm,action_values";
const PAGE_LIMIT: &str = "500";

/// The action type whose value we treat as revenue.
const PURCHASE_ACTION: &str = "purchase";

#[derive(Debug, Clone)]
pub struct FacebookClient {
    client: reqwest::Client,
    base_url: String,
    api_version: String,
}

/// Ad-account metadata used to localize report windows.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub timezone_name: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    pub error: Option<GraphError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct InsightsResponse {
    #[serde(default)]
    data: Vec<RawInsightRow>,
    paging: Option<Paging>,
    error: Option<GraphError>,
}

#[derive(Debug, Deserialize)]
struct Paging {
    next: Option<String>,
}

/// One daily row as the Graph API reports it.
#[derive(Debug, Deserialize)]
pub struct RawInsightRow {
    pub date_start: String,
    pub spend: Option<String>,
    pub clicks: Option<String>,
    pub impressions: Option<String>,
    pub reach: Option<String>,
    pub ctr: Option<String>,
    pub cpc: Option<String>,
    pub cpm: Option<String>,
    pub action_values: Option<Vec<ActionValue>>,
}

#[derive(Debug, Deserialize)]
pub struct ActionValue {
    pub action_type: String,
    pub value: String,
}

impl FacebookClient {
    pub fn new(config: &FacebookConfig) -> Self {
        FacebookClient {
            client: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            api_version: config.api_version.clone(),
        }
    }

    /// Fetch account name, timezone, and currency.
    pub async fn fetch_account_info(
        &self,
        access_token: &str,
        account_id: &str,
    ) -> Result<AccountInfo, AppError> {
        let url = format!(
            "{}/{}/{}",
            self.base_url,
            self.api_version,
            normalize_account_id(account_id)
        );

        let response = self
            .client
            .get(&url)
            .query(&[
                ("fields", "name,timezone_name,currency"),
                ("access_token", access_token),
            ])
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("account metadata request failed: {e}")))?;

        let info: AccountInfo = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("failed to parse account metadata: {e}")))?;

        if let Some(error) = &info.error {
            return Err(AppError::Upstream(error.message.clone()));
        }
        Ok(info)
    }

    /// Fetch the daily insight rows for a window, following pagination until
    /// exhausted. Rows come back sparse; zero-activity days are absent.
    pub async fn fetch_daily_insights(
        &self,
        access_token: &str,
        account_id: &str,
        window: &ResolvedWindow,
    ) -> Result<Vec<DailyMetricRow>, AppError> {
        let url = format!(
            "{}/{}/{}/insights",
            self.base_url,
            self.api_version,
            normalize_account_id(account_id)
        );
        let time_range = format!(
            r#"{{"since":"{}","until":"{}"}}"#,
            window.since, window.until
        );

        let mut rows = Vec::new();
        let mut page = self
            .client
            .get(&url)
            .query(&[
                ("fields", INSIGHT_FIELDS),
                ("time_range", &time_range),
                ("time_increment", "1"),
                ("limit", PAGE_LIMIT),
                ("access_token", access_token),
            ])
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("insights request failed: {e}")))?;

        loop {
            let body: InsightsResponse = page
                .json()
                .await
                .map_err(|e| AppError::Upstream(format!("failed to parse insights page: {e}")))?;

            if let Some(error) = body.error {
                return Err(AppError::Upstream(error.message));
            }

            rows.extend(body.data.iter().map(to_metric_row));

            // The `next` link carries the full query string, token included.
            let Some(next) = body.paging.and_then(|p| p.next) else {
                break;
            };
            page = self
                .client
                .get(&next)
                .send()
                .await
                .map_err(|e| AppError::Upstream(format!("insights pagination failed: {e}")))?;
        }

        Ok(rows)
    }
}

/// The insights edge requires the `act_` prefix; dashboard clients send bare
/// numeric ids as often as prefixed ones.
fn normalize_account_id(account_id: &str) -> String {
    if account_id.starts_with("act_") {
        account_id.to_string()
    } else {
        format!("act_{account_id}")
    }
}

/// Convert a raw Graph row into a typed metric row, extracting revenue from
/// the `purchase` action value.
pub fn to_metric_row(raw: &RawInsightRow) -> DailyMetricRow {
    let date = parse_date(&raw.date_start);
    let spend = parse_decimal(raw.spend.as_deref());
    let revenue = raw
        .action_values
        .as_deref()
        .unwrap_or_default()
        .iter()
        .find(|av| av.action_type == PURCHASE_ACTION)
        .map(|av| parse_decimal(Some(av.value.as_str())))
        .unwrap_or(0.0);
    let roas = if spend > 0.0 { revenue / spend } else { 0.0 };

    DailyMetricRow {
        date,
        spend,
        clicks: parse_count(raw.clicks.as_deref()),
        impressions: parse_count(raw.impressions.as_deref()),
        reach: parse_count(raw.reach.as_deref()),
        ctr: parse_decimal(raw.ctr.as_deref()),
        cpc: parse_decimal(raw.cpc.as_deref()),
        cpm: parse_decimal(raw.cpm.as_deref()),
        revenue,
        roas,
    }
}

fn parse_date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap_or_default()
}

fn parse_decimal(value: Option<&str>) -> f64 {
    value.and_then(|v| v.parse().ok()).unwrap_or(0.0)
}

fn parse_count(value: Option<&str>) -> u64 {
    value.and_then(|v| v.parse().ok()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_row() -> RawInsightRow {
        RawInsightRow {
            date_start: "2024-03-09".to_string(),
            spend: Some("10".to_string()),
            clicks: Some("42".to_string()),
            impressions: Some("1000".to_string()),
            reach: Some("800".to_string()),
            ctr: Some("4.2".to_string()),
            cpc: Some("0.238095".to_string()),
            cpm: Some("10".to_string()),
            action_values: Some(vec![
                ActionValue {
                    action_type: "purchase".to_string(),
                    value: "49.99".to_string(),
                },
                ActionValue {
                    action_type: "lead".to_string(),
                    value: "5".to_string(),
                },
            ]),
        }
    }

    #[test]
    fn test_revenue_extracted_from_purchase_action() {
        let row = to_metric_row(&raw_row());
        assert_eq!(row.revenue, 49.99);
        assert!((row.roas - 4.999).abs() < 1e-9);
    }

    #[test]
    fn test_revenue_defaults_to_zero_without_purchase() {
        let mut raw = raw_row();
        raw.action_values = Some(vec![ActionValue {
            action_type: "lead".to_string(),
            value: "5".to_string(),
        }]);
        let row = to_metric_row(&raw);
        assert_eq!(row.revenue, 0.0);
        assert_eq!(row.roas, 0.0);

        raw.action_values = None;
        assert_eq!(to_metric_row(&raw).revenue, 0.0);
    }

    #[test]
    fn test_missing_metrics_parse_as_zero() {
        let raw = RawInsightRow {
            date_start: "2024-03-09".to_string(),
            spend: None,
            clicks: None,
            impressions: None,
            reach: None,
            ctr: None,
            cpc: None,
            cpm: None,
            action_values: None,
        };
        let row = to_metric_row(&raw);
        assert_eq!(row.spend, 0.0);
        assert_eq!(row.clicks, 0);
        assert_eq!(row.impressions, 0);
    }

    #[test]
    fn test_insights_response_shape() {
        let json = r#"{
            "data": [
                {
                    "date_start": "2024-03-09",
                    "date_stop": "2024-03-09",
                    "spend": "12.34",
                    "clicks": "7",
                    "impressions": "900",
                    "action_values": [{"action_type": "purchase", "value": "20"}]
                }
            ],
            "paging": {"next": "https://graph.facebook.com/next-page"}
        }"#;
        let parsed: InsightsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.data.len(), 1);
        assert_eq!(parsed.paging.unwrap().next.as_deref(), Some("https://graph.facebook.com/next-page"));

        let row = to_metric_row(&parsed.data[0]);
        assert_eq!(row.spend, 12.34);
        assert_eq!(row.clicks, 7);
        assert_eq!(row.revenue, 20.0);
    }

    #[test]
    fn test_graph_error_payload() {
        let json = r#"{"error": {"message": "Invalid OAuth access token", "type": "OAuthException"}}"#;
        let parsed: InsightsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.error.unwrap().message, "Invalid OAuth access token");
        assert!(parsed.data.is_empty());
    }

    #[test]
    fn test_normalize_account_id() {
        assert_eq!(normalize_account_id("12345"), "act_12345");
        assert_eq!(normalize_account_id("act_12345"), "act_12345");
    }
}
