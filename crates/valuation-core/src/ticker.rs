use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValuationError;

const MAX_TICKER_LEN: usize = 10;

/// Normalized (trimmed, uppercased) ticker symbol.
///
/// Every cache in the dashboard is keyed by this value, so two spellings of
/// the same symbol (`" aapl"`, `"AAPL"`) always land on the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    pub fn parse(raw: &str) -> Result<Self, ValuationError> {
        let symbol = raw.trim().to_uppercase();

        if symbol.is_empty() {
            return Err(ValuationError::InvalidTicker(
                "Ticker symbol cannot be empty".to_string(),
            ));
        }
        if symbol.len() > MAX_TICKER_LEN {
            return Err(ValuationError::InvalidTicker(format!(
                "Ticker symbol must be at most {} characters: {}",
                MAX_TICKER_LEN, symbol
            )));
        }
        if !symbol.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return Err(ValuationError::InvalidTicker(format!(
                "Ticker symbol must start with a letter: {}",
                symbol
            )));
        }
        if !symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        {
            return Err(ValuationError::InvalidTicker(format!(
                "Ticker symbol contains invalid characters: {}",
                symbol
            )));
        }

        Ok(Self(symbol))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Ticker {
    type Err = ValuationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ticker::parse(s)
    }
}

impl TryFrom<String> for Ticker {
    type Error = ValuationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Ticker::parse(&value)
    }
}

impl From<Ticker> for String {
    fn from(ticker: Ticker) -> Self {
        ticker.0
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
