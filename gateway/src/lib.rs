pub mod bridge;
pub mod config;
pub mod payload;
pub mod startup;
pub mod time;

pub use bridge::{Bridge, BridgeSettings, BridgeStats, Outcome};
pub use config::{Config, Overrides};
