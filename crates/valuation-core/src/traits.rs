use async_trait::async_trait;

use crate::{
    ApiError, BaseFinancials, ChartMode, HoldingInput, MetricsSnapshot, Portfolio, StockInfo,
    Ticker,
};

/// Read-only market data the dashboard needs for a ticker.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    async fn fetch_base_financials(&self, ticker: &Ticker) -> Result<BaseFinancials, ApiError>;

    async fn fetch_stock_info(&self, ticker: &Ticker) -> Result<StockInfo, ApiError>;

    async fn fetch_metrics(&self, ticker: &Ticker) -> Result<MetricsSnapshot, ApiError>;

    /// Historical statements, passed through untouched.
    async fn fetch_financials(&self, ticker: &Ticker) -> Result<serde_json::Value, ApiError>;

    async fn fetch_charts(
        &self,
        ticker: &Ticker,
        mode: ChartMode,
    ) -> Result<serde_json::Value, ApiError>;
}

/// Portfolio CRUD against the backend.
#[async_trait]
pub trait PortfolioSource: Send + Sync {
    async fn fetch_portfolio(&self) -> Result<Portfolio, ApiError>;

    async fn add_holding(&self, ticker: &Ticker, input: &HoldingInput) -> Result<(), ApiError>;

    async fn update_holding(&self, ticker: &Ticker, input: &HoldingInput)
        -> Result<(), ApiError>;

    async fn remove_holding(&self, ticker: &Ticker) -> Result<(), ApiError>;

    /// Upload a brokerage export; the backend detects the format.
    async fn upload_holdings_csv(
        &self,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<serde_json::Value, ApiError>;
}
