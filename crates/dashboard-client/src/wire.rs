//! Response shapes as the backend sends them, before normalization.

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use valuation_core::{BaseFinancials, StockInfo, Ticker};

/// `/projections` body. Missing numbers are treated as zero.
#[derive(Debug, Deserialize)]
pub(crate) struct ProjectionsPayload {
    #[serde(default)]
    price: Option<f64>,
    #[serde(default)]
    market_cap: Option<f64>,
    #[serde(default)]
    shares_outstanding: Option<f64>,
    #[serde(default)]
    revenue: Option<f64>,
    #[serde(default)]
    net_income: Option<f64>,
    #[serde(default)]
    net_income_margin: Option<f64>,
    #[serde(default)]
    eps: Option<f64>,
    #[serde(default)]
    data_year: Option<i32>,
    #[serde(default)]
    current_year: Option<i32>,
}

impl ProjectionsPayload {
    pub(crate) fn into_base_financials(self, ticker: &Ticker) -> BaseFinancials {
        let data_year = self.data_year.or(self.current_year).unwrap_or_else(|| {
            tracing::warn!("{} projections carry no data year, using the current year", ticker);
            Utc::now().year()
        });

        BaseFinancials {
            ticker: ticker.clone(),
            price: self.price.unwrap_or(0.0),
            market_cap: self.market_cap.unwrap_or(0.0),
            shares_outstanding: self.shares_outstanding.unwrap_or(0.0),
            revenue: self.revenue.unwrap_or(0.0),
            net_income: self.net_income.unwrap_or(0.0),
            net_income_margin: self.net_income_margin.unwrap_or(0.0),
            eps: self.eps.unwrap_or(0.0),
            data_year,
        }
    }
}

/// `/info` body; the ticker is taken from the request.
#[derive(Debug, Deserialize)]
pub(crate) struct InfoPayload {
    #[serde(default)]
    price: Option<f64>,
    #[serde(default)]
    market_cap: Option<f64>,
    #[serde(default, rename = "marketCap")]
    market_cap_camel: Option<f64>,
    #[serde(default)]
    shares_outstanding: Option<f64>,
    #[serde(default, rename = "sharesOutstanding")]
    shares_outstanding_camel: Option<f64>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "longName")]
    long_name: Option<String>,
    #[serde(default, rename = "shortName")]
    short_name: Option<String>,
    #[serde(default)]
    exchange: Option<String>,
    #[serde(default)]
    country_code: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

impl InfoPayload {
    pub(crate) fn into_stock_info(self, ticker: &Ticker) -> StockInfo {
        StockInfo {
            ticker: ticker.clone(),
            price: self.price,
            market_cap: self.market_cap.or(self.market_cap_camel),
            shares_outstanding: self.shares_outstanding.or(self.shares_outstanding_camel),
            name: self.name.or(self.long_name).or(self.short_name),
            exchange: self.exchange,
            country_code: self.country_code.or(self.country),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct NewHolding<'a> {
    pub ticker: &'a str,
    pub shares: f64,
    pub cost_basis: f64,
}

const MESSAGE_FIELDS: [&str; 3] = ["detail", "error", "message"];

/// Pull a human-readable message out of an error body, if the backend sent one.
pub(crate) fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    MESSAGE_FIELDS.iter().find_map(|field| match value.get(field)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Null => None,
        Value::String(_) => None,
        other => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projections_missing_numbers_are_zero() {
        let payload: ProjectionsPayload =
            serde_json::from_str(r#"{"revenue": 1340000000, "eps": null, "current_year": 2025}"#)
                .unwrap();
        let base = payload.into_base_financials(&Ticker::parse("acme").unwrap());

        assert_eq!(base.ticker.as_str(), "ACME");
        assert_eq!(base.revenue, 1_340_000_000.0);
        assert_eq!(base.eps, 0.0);
        assert_eq!(base.net_income, 0.0);
        assert_eq!(base.data_year, 2025);
    }

    #[test]
    fn test_info_payload_keeps_gaps() {
        let payload: InfoPayload =
            serde_json::from_str(r#"{"price": 187.5, "name": "Apple Inc."}"#).unwrap();
        let info = payload.into_stock_info(&Ticker::parse("AAPL").unwrap());

        assert_eq!(info.price, Some(187.5));
        assert_eq!(info.shares_outstanding, None);
        assert_eq!(info.name.as_deref(), Some("Apple Inc."));
    }

    #[test]
    fn test_projections_accept_both_year_spellings() {
        let payload: ProjectionsPayload =
            serde_json::from_str(r#"{"revenue": 1.0, "data_year": 2025, "current_year": 2024}"#)
                .unwrap();
        let base = payload.into_base_financials(&Ticker::parse("ACME").unwrap());
        assert_eq!(base.data_year, 2025);

        let payload: ProjectionsPayload =
            serde_json::from_str(r#"{"current_year": 2024}"#).unwrap();
        let base = payload.into_base_financials(&Ticker::parse("ACME").unwrap());
        assert_eq!(base.data_year, 2024);
    }

    #[test]
    fn test_info_payload_with_several_name_spellings() {
        let body = r#"{"price": 187.5, "sharesOutstanding": 1.5e10, "longName": "Apple Inc.",
            "shortName": "Apple", "country": "US", "market_cap": 2.9e12, "marketCap": 1.0}"#;
        let payload: InfoPayload = serde_json::from_str(body).unwrap();
        let info = payload.into_stock_info(&Ticker::parse("AAPL").unwrap());

        assert_eq!(info.shares_outstanding, Some(1.5e10));
        assert_eq!(info.name.as_deref(), Some("Apple Inc."));
        assert_eq!(info.country_code.as_deref(), Some("US"));
        assert_eq!(info.market_cap, Some(2.9e12));
    }

    #[test]
    fn test_error_message_field_order() {
        assert_eq!(
            error_message(r#"{"detail": "Ticker XYZ not found"}"#).as_deref(),
            Some("Ticker XYZ not found")
        );
        assert_eq!(
            error_message(r#"{"error": "bad", "message": "worse"}"#).as_deref(),
            Some("bad")
        );
        assert_eq!(
            error_message(r#"{"detail": null, "message": "fallback"}"#).as_deref(),
            Some("fallback")
        );
        assert_eq!(error_message("<html>502</html>"), None);
        assert_eq!(error_message(r#"{"status": "down"}"#), None);
    }
}
