//! Scenario Store
//!
//! Holds the bear/base/bull assumption sets for the ticker on screen, routes
//! edits to the active scenario, recomputes its projection, and persists the
//! whole set per ticker so edits survive navigating away and back.

pub mod cache;
pub mod error;
pub mod models;
pub mod store;

pub use cache::ScenarioCache;
pub use error::ScenarioError;
pub use models::{Scenario, ScenarioName, ScenarioSet};
pub use store::{LoadOutcome, ScenarioStore};
