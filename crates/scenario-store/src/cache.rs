use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use valuation_core::Ticker;

use crate::ScenarioSet;

/// On-disk form of the most recently edited ticker's scenarios.
#[derive(Debug, Serialize, Deserialize)]
struct ScenarioSnapshot {
    ticker: Ticker,
    saved_at: DateTime<Utc>,
    scenarios: ScenarioSet,
}

/// Per-ticker scenario cache.
///
/// Every ticker edited this session is kept in memory. When a snapshot path
/// is configured, the set for the ticker saved last is also written to disk
/// and read back on startup, so only the active ticker survives a restart.
/// Disk failures are logged and otherwise ignored.
#[derive(Debug, Default)]
pub struct ScenarioCache {
    entries: HashMap<Ticker, ScenarioSet>,
    snapshot_path: Option<PathBuf>,
    snapshot_ticker: Option<Ticker>,
}

impl ScenarioCache {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Cache backed by a JSON snapshot file, preloaded from it if present.
    pub fn with_snapshot(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut cache = Self {
            snapshot_path: Some(path.clone()),
            ..Self::default()
        };

        if let Some(snapshot) = read_snapshot(&path) {
            tracing::info!(
                "Restored scenarios for {} saved at {}",
                snapshot.ticker,
                snapshot.saved_at
            );
            cache.snapshot_ticker = Some(snapshot.ticker.clone());
            cache.entries.insert(snapshot.ticker, snapshot.scenarios);
        }

        cache
    }

    pub fn load(&self, ticker: &Ticker) -> Option<ScenarioSet> {
        self.entries.get(ticker).cloned()
    }

    pub fn save(&mut self, ticker: &Ticker, scenarios: &ScenarioSet) {
        self.entries.insert(ticker.clone(), scenarios.clone());

        let Some(path) = self.snapshot_path.clone() else {
            return;
        };
        let snapshot = ScenarioSnapshot {
            ticker: ticker.clone(),
            saved_at: Utc::now(),
            scenarios: scenarios.clone(),
        };
        match write_snapshot(&path, &snapshot) {
            Ok(()) => self.snapshot_ticker = Some(ticker.clone()),
            Err(e) => tracing::warn!("Failed to write scenario snapshot {:?}: {}", path, e),
        }
    }

    pub fn clear(&mut self, ticker: &Ticker) {
        self.entries.remove(ticker);

        if self.snapshot_ticker.as_ref() != Some(ticker) {
            return;
        }
        self.snapshot_ticker = None;
        if let Some(path) = &self.snapshot_path {
            if let Err(e) = fs::remove_file(path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Failed to remove scenario snapshot {:?}: {}", path, e);
                }
            }
        }
    }

    pub fn contains(&self, ticker: &Ticker) -> bool {
        self.entries.contains_key(ticker)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn read_snapshot(path: &Path) -> Option<ScenarioSnapshot> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!("Failed to read scenario snapshot {:?}: {}", path, e);
            return None;
        }
    };
    match serde_json::from_str(&contents) {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            tracing::warn!("Ignoring unreadable scenario snapshot {:?}: {}", path, e);
            None
        }
    }
}

fn write_snapshot(path: &Path, snapshot: &ScenarioSnapshot) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScenarioName;
    use projection_engine::AssumptionMetric;
    use tempfile::TempDir;

    fn edited_set() -> ScenarioSet {
        let mut set = ScenarioSet {
            active: ScenarioName::Bear,
            ..Default::default()
        };
        set.bear
            .assumptions
            .set(AssumptionMetric::PeHigh, 2026, 24.0);
        set
    }

    #[test]
    fn test_in_memory_save_load_clear() {
        let ticker = Ticker::parse("AAPL").unwrap();
        let mut cache = ScenarioCache::in_memory();
        assert!(cache.load(&ticker).is_none());

        cache.save(&ticker, &edited_set());
        assert_eq!(cache.load(&ticker), Some(edited_set()));

        cache.clear(&ticker);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_snapshot_survives_restart() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state").join("scenarios.json");
        let ticker = Ticker::parse("MSFT").unwrap();

        let mut cache = ScenarioCache::with_snapshot(&path);
        cache.save(&ticker, &edited_set());
        assert!(path.exists());

        let restarted = ScenarioCache::with_snapshot(&path);
        assert_eq!(restarted.load(&ticker), Some(edited_set()));
    }

    #[test]
    fn test_only_last_saved_ticker_is_on_disk() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("scenarios.json");
        let first = Ticker::parse("AAPL").unwrap();
        let second = Ticker::parse("GOOG").unwrap();

        let mut cache = ScenarioCache::with_snapshot(&path);
        cache.save(&first, &edited_set());
        cache.save(&second, &ScenarioSet::default());
        assert_eq!(cache.len(), 2);

        let restarted = ScenarioCache::with_snapshot(&path);
        assert!(restarted.load(&first).is_none());
        assert!(restarted.contains(&second));
    }

    #[test]
    fn test_clear_removes_snapshot_for_that_ticker() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("scenarios.json");
        let ticker = Ticker::parse("NVDA").unwrap();
        let other = Ticker::parse("AMD").unwrap();

        let mut cache = ScenarioCache::with_snapshot(&path);
        cache.save(&ticker, &edited_set());

        cache.clear(&other);
        assert!(path.exists());

        cache.clear(&ticker);
        assert!(!path.exists());
    }

    #[test]
    fn test_corrupt_snapshot_is_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("scenarios.json");
        fs::write(&path, "{not json").unwrap();

        let cache = ScenarioCache::with_snapshot(&path);
        assert!(cache.is_empty());
    }
}
