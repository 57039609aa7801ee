use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use valuation_core::{
    ApiError, BaseFinancials, ChartMode, HoldingInput, MarketDataSource, MetricsSnapshot,
    Portfolio, PortfolioSource, StockInfo, Ticker,
};

use crate::wire::{error_message, InfoPayload, NewHolding, ProjectionsPayload};
use crate::DashboardConfig;

/// HTTP client for the dashboard REST backend.
#[derive(Clone)]
pub struct DashboardClient {
    client: Client,
    base_url: String,
}

impl DashboardClient {
    pub fn new(config: &DashboardConfig) -> Result<Self, ApiError> {
        let mut default_headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            let value = HeaderValue::from_str(key)
                .map_err(|e| ApiError::Config(format!("Invalid API key value: {}", e)))?;
            default_headers.insert(HeaderName::from_static("x-api-key"), value);
            tracing::info!("API authentication configured for dashboard requests");
        } else {
            tracing::debug!("No API_KEY set, dashboard requests will be unauthenticated");
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(default_headers)
            .build()
            .map_err(|e| ApiError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and return the body of a 2xx response.
    async fn send(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !status.is_success() {
            let error = ApiError::from_status(status.as_u16(), error_message(&body));
            tracing::warn!("Dashboard API returned {}: {}", status, error);
            return Err(error);
        }

        Ok(body)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let body = self.send(request).await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn get_for_ticker<T: DeserializeOwned>(
        &self,
        path: &str,
        ticker: &Ticker,
    ) -> Result<T, ApiError> {
        tracing::debug!("GET {} for {}", path, ticker);
        self.send_json(
            self.client
                .get(self.url(path))
                .query(&[("ticker", ticker.as_str())]),
        )
        .await
    }
}

#[async_trait]
impl MarketDataSource for DashboardClient {
    async fn fetch_base_financials(&self, ticker: &Ticker) -> Result<BaseFinancials, ApiError> {
        let payload: ProjectionsPayload = self.get_for_ticker("/projections", ticker).await?;
        Ok(payload.into_base_financials(ticker))
    }

    async fn fetch_stock_info(&self, ticker: &Ticker) -> Result<StockInfo, ApiError> {
        let payload: InfoPayload = self.get_for_ticker("/info", ticker).await?;
        Ok(payload.into_stock_info(ticker))
    }

    async fn fetch_metrics(&self, ticker: &Ticker) -> Result<MetricsSnapshot, ApiError> {
        self.get_for_ticker("/metrics", ticker).await
    }

    async fn fetch_financials(&self, ticker: &Ticker) -> Result<Value, ApiError> {
        self.get_for_ticker("/financials", ticker).await
    }

    async fn fetch_charts(&self, ticker: &Ticker, mode: ChartMode) -> Result<Value, ApiError> {
        tracing::debug!("GET /charts for {} ({})", ticker, mode);
        self.send_json(
            self.client
                .get(self.url("/charts"))
                .query(&[("ticker", ticker.as_str()), ("mode", mode.as_str())]),
        )
        .await
    }
}

#[async_trait]
impl PortfolioSource for DashboardClient {
    async fn fetch_portfolio(&self) -> Result<Portfolio, ApiError> {
        self.send_json(self.client.get(self.url("/portfolio"))).await
    }

    async fn add_holding(&self, ticker: &Ticker, input: &HoldingInput) -> Result<(), ApiError> {
        let body = NewHolding {
            ticker: ticker.as_str(),
            shares: input.shares,
            cost_basis: input.cost_basis,
        };
        self.send(self.client.post(self.url("/portfolio/holdings")).json(&body))
            .await?;
        tracing::info!("Added holding {}", ticker);
        Ok(())
    }

    async fn update_holding(&self, ticker: &Ticker, input: &HoldingInput) -> Result<(), ApiError> {
        self.send(
            self.client
                .put(self.url("/portfolio/holdings"))
                .query(&[("ticker", ticker.as_str())])
                .json(input),
        )
        .await?;
        tracing::info!("Updated holding {}", ticker);
        Ok(())
    }

    async fn remove_holding(&self, ticker: &Ticker) -> Result<(), ApiError> {
        self.send(
            self.client
                .delete(self.url("/portfolio/holdings"))
                .query(&[("ticker", ticker.as_str())]),
        )
        .await?;
        tracing::info!("Removed holding {}", ticker);
        Ok(())
    }

    async fn upload_holdings_csv(&self, file_name: &str, contents: Vec<u8>) -> Result<Value, ApiError> {
        let part = Part::bytes(contents).file_name(file_name.to_string());
        let form = Form::new().part("file", part);
        self.send_json(
            self.client
                .post(self.url("/portfolio/upload"))
                .query(&[("format", "auto")])
                .multipart(form),
        )
        .await
    }
}
