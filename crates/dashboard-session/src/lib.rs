//! Dashboard Session
//!
//! Ties the data sources, the response cache and the scenario store together
//! for the ticker on screen. Loads fan out concurrently, each section keeps its
//! own error, and results from superseded loads are dropped.

mod fetch;
pub mod sections;
pub mod session;


pub use fetch::TickerLoad;
pub use sections::{Section, SectionErrors};
pub use session::{ApplyOutcome, DashboardSession, RequestToken};
