//! Scenario execution module.

mod session;
mod stats;

pub use session::Session;
pub use stats::SessionStats;
