//! Position range watcher.
//!
//! Periodically fetches the liquidity pool positions of each subject and
//! hands them to a notification sink.

mod aggregate;
pub mod config;
mod fan_out;
mod service;

pub use aggregate::AggregatingSource;
pub use config::{Dispatcher, WatchServiceConfig};
pub use fan_out::{FailFastGroup, FanOutError};
pub use service::{CycleOutcome, WatchService};
