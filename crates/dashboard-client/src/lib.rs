pub mod client;
pub mod config;
mod wire;

pub use client::DashboardClient;
pub use config::DashboardConfig;
