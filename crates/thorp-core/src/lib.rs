#![deny(warnings)]
pub mod engine;
pub mod model;

pub use engine::{CountingEngine, CountingState, StrategyAdjustments};
pub use model::rank::Rank;

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "thorp"
    }

    pub const fn codename() -> &'static str {
        "Beat the Dealer"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}
