// Copyright (c) The adsight Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error taxonomy shared across the aggregation core and the HTTP surface.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::NaiveDate;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid or missing account metadata, e.g. an unparseable IANA timezone.
    #[error("invalid timezone '{0}'")]
    Configuration(String),

    /// A date window where `since` is after `until`. Unreachable from valid
    /// selector input; defensive check between internal functions.
    #[error("invalid date window: since {since} is after until {until}")]
    InvalidWindow { since: NaiveDate, until: NaiveDate },

    /// The upstream ads API returned an error payload or was unreachable.
    #[error("upstream API error: {0}")]
    Upstream(String),

    /// A required request field was absent.
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    /// The request body was not valid JSON or had the wrong content type.
    #[error("invalid request body: {0}")]
    InvalidRequest(String),

    /// Anything else; surfaced as a generic 500 with detail logged server-side.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Configuration(_)
            | AppError::Upstream(_)
            | AppError::MissingField(_)
            | AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            // A malformed window can't be produced by client input; it means
            // an internal function broke its contract.
            AppError::InvalidWindow { .. } | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("internal error: {self:#}");
            "internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_400() {
        assert_eq!(
            AppError::Configuration("Mars/Olympus".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Upstream("invalid token".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::MissingField("accountId").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::InvalidRequest("expected value at line 1".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_internal_maps_to_500() {
        let err = AppError::Internal(anyhow::anyhow!("boom"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);

        // Not producible by client input, so not a client error.
        let err = AppError::InvalidWindow {
            since: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            until: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
        };
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
