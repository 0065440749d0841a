//! Cashflow display endpoint. The backend owns the actual bookkeeping; this
//! reshapes its per-day rows into the summary the dashboard chart renders.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::RequestSpec;
use crate::error::{ApiError, GatewayError};
use crate::response::ApiResponse;
use crate::state::AppState;

use super::forward;

#[derive(Debug, Deserialize)]
pub struct CashflowQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

/// One per-day row as the backend reports it.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct CashflowEntry {
    pub date: String,
    #[serde(default)]
    pub income: f64,
    #[serde(default)]
    pub expense: f64,
}

/// Reshaped view: totals up front, rows behind them.
#[derive(Debug, Serialize, PartialEq)]
pub struct CashflowSummary {
    pub total_income: f64,
    pub total_expense: f64,
    pub net: f64,
    pub entries: Vec<CashflowEntry>,
}

pub fn summarize(entries: Vec<CashflowEntry>) -> CashflowSummary {
    let total_income: f64 = entries.iter().map(|e| e.income).sum();
    let total_expense: f64 = entries.iter().map(|e| e.expense).sum();
    CashflowSummary {
        total_income,
        total_expense,
        net: total_income - total_expense,
        entries,
    }
}

/// GET /api/cashflow
pub async fn summary(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(query): Query<CashflowQuery>,
) -> Result<(CookieJar, ApiResponse<CashflowSummary>), GatewayError> {
    let mut spec = RequestSpec::get(state.config.paths.cashflow.clone());
    if let Some(from) = query.from {
        spec = spec.with_query("from", from);
    }
    if let Some(to) = query.to {
        spec = spec.with_query("to", to);
    }

    let (jar, data) = forward(&state, jar, spec).await?;
    let entries: Vec<CashflowEntry> = match data {
        Value::Array(_) => serde_json::from_value(data).map_err(|e| {
            tracing::error!("unexpected cashflow payload from backend: {}", e);
            ApiError::bad_gateway("Unexpected response from the backend")
        })?,
        Value::Null => Vec::new(),
        other => {
            tracing::error!("unexpected cashflow payload shape: {}", other);
            return Err(ApiError::bad_gateway("Unexpected response from the backend").into());
        }
    };

    Ok((jar, ApiResponse::success(summarize(entries))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summarize_totals_across_days() {
        let summary = summarize(vec![
            CashflowEntry {
                date: "2026-08-01".into(),
                income: 120.0,
                expense: 45.5,
            },
            CashflowEntry {
                date: "2026-08-02".into(),
                income: 80.0,
                expense: 10.0,
            },
        ]);
        assert_eq!(summary.total_income, 200.0);
        assert_eq!(summary.total_expense, 55.5);
        assert_eq!(summary.net, 144.5);
        assert_eq!(summary.entries.len(), 2);
    }

    #[test]
    fn summarize_empty_period() {
        let summary = summarize(vec![]);
        assert_eq!(summary.net, 0.0);
        assert!(summary.entries.is_empty());
    }
}
