use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Ticker, ValuationError};

/// Base-year fundamentals for a ticker, as returned by `/projections`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseFinancials {
    pub ticker: Ticker,
    pub price: f64,
    pub market_cap: f64,
    pub shares_outstanding: f64,
    pub revenue: f64,
    pub net_income: f64,
    pub net_income_margin: f64,
    pub eps: f64,
    pub data_year: i32,
}

/// Live quote and share data from `/info`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockInfo {
    pub ticker: Ticker,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub shares_outstanding: Option<f64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub exchange: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
}

/// The stock-info values the projection engine depends on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketInputs {
    pub shares_outstanding: Option<f64>,
    pub current_price: Option<f64>,
}

impl MarketInputs {
    pub fn from_stock_info(info: &StockInfo) -> Self {
        Self {
            shares_outstanding: info.shares_outstanding.filter(|v| is_usable(*v)),
            current_price: info.price.filter(|v| is_usable(*v)),
        }
    }
}

/// Positive and finite. Anything else counts as "not available".
pub fn is_usable(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Key metrics from `/metrics`. Every field is optional because the backend
/// omits whatever its providers could not compute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    #[serde(rename = "TTM_PE", default)]
    pub ttm_pe: Option<f64>,
    #[serde(rename = "Forward_PE", default)]
    pub forward_pe: Option<f64>,
    #[serde(rename = "Two_Year_Forward_PE", default)]
    pub two_year_forward_pe: Option<f64>,
    #[serde(rename = "TTM_EPS_Growth", default)]
    pub ttm_eps_growth: Option<f64>,
    #[serde(rename = "Current_Year_EPS_Growth", default)]
    pub current_year_eps_growth: Option<f64>,
    #[serde(rename = "Next_Year_EPS_Growth", default)]
    pub next_year_eps_growth: Option<f64>,
    #[serde(rename = "TTM_Revenue_Growth", default)]
    pub ttm_revenue_growth: Option<f64>,
    #[serde(rename = "Current_Year_Revenue_Growth", default)]
    pub current_year_revenue_growth: Option<f64>,
    #[serde(rename = "Next_Year_Revenue_Growth", default)]
    pub next_year_revenue_growth: Option<f64>,
    #[serde(rename = "Gross_Margin", default)]
    pub gross_margin: Option<f64>,
    #[serde(rename = "Net_Margin", default)]
    pub net_margin: Option<f64>,
    #[serde(rename = "TTM_PS_Ratio", default)]
    pub ttm_ps_ratio: Option<f64>,
    #[serde(rename = "Forward_PS_Ratio", default)]
    pub forward_ps_ratio: Option<f64>,
}

/// View mode for the `/charts` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartMode {
    Quarterly,
    Ttm,
}

impl ChartMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartMode::Quarterly => "quarterly",
            ChartMode::Ttm => "ttm",
        }
    }
}

impl fmt::Display for ChartMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartMode {
    type Err = ValuationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "quarterly" => Ok(ChartMode::Quarterly),
            "ttm" => Ok(ChartMode::Ttm),
            other => Err(ValuationError::InvalidData(format!(
                "Unknown chart mode: {}",
                other
            ))),
        }
    }
}

/// A single portfolio position as reported by `/portfolio`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub ticker: String,
    pub shares: f64,
    pub cost_basis: f64,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub market_value: Option<f64>,
    #[serde(default)]
    pub gain_loss: Option<f64>,
    #[serde(default)]
    pub gain_loss_percent: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    #[serde(default)]
    pub holdings: Vec<Holding>,
    #[serde(default)]
    pub total_value: Option<f64>,
    #[serde(default)]
    pub total_gain_loss: Option<f64>,
}

impl Portfolio {
    pub fn holding(&self, ticker: &Ticker) -> Option<&Holding> {
        self.holdings
            .iter()
            .find(|h| h.ticker.eq_ignore_ascii_case(ticker.as_str()))
    }
}

/// Request body for creating or updating a holding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoldingInput {
    pub shares: f64,
    pub cost_basis: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_inputs_drop_unusable_values() {
        let info = StockInfo {
            ticker: Ticker::parse("AAPL").unwrap(),
            price: Some(0.0),
            market_cap: None,
            shares_outstanding: Some(f64::NAN),
            name: None,
            exchange: None,
            country_code: None,
        };
        let inputs = MarketInputs::from_stock_info(&info);
        assert_eq!(inputs.current_price, None);
        assert_eq!(inputs.shares_outstanding, None);
    }

    #[test]
    fn test_metrics_snapshot_wire_names() {
        let json = r#"{"TTM_PE": 28.5, "Forward_PE": null, "Net_Margin": 24.3}"#;
        let metrics: MetricsSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(metrics.ttm_pe, Some(28.5));
        assert_eq!(metrics.forward_pe, None);
        assert_eq!(metrics.net_margin, Some(24.3));
        assert_eq!(metrics.gross_margin, None);
    }

    #[test]
    fn test_chart_mode_parse() {
        assert_eq!("TTM".parse::<ChartMode>().unwrap(), ChartMode::Ttm);
        assert_eq!(ChartMode::Quarterly.to_string(), "quarterly");
        assert!("weekly".parse::<ChartMode>().is_err());
    }

    #[test]
    fn test_portfolio_lookup_is_case_insensitive() {
        let portfolio = Portfolio {
            holdings: vec![Holding {
                ticker: "nvda".to_string(),
                shares: 10.0,
                cost_basis: 450.0,
                current_price: None,
                market_value: None,
                gain_loss: None,
                gain_loss_percent: None,
            }],
            ..Default::default()
        };
        let ticker = Ticker::parse("NVDA").unwrap();
        assert_eq!(portfolio.holding(&ticker).map(|h| h.shares), Some(10.0));
    }
}
