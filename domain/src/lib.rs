//! Domain model shared across the watcher workspace.
//!
//! Holds the liquidity pool position snapshot, its range math, the subject
//! being watched and the capabilities the watcher consumes.

mod capabilities;
mod entities;
mod error;
mod range;

pub use capabilities::{Notifier, PositionNotifier, PositionSource, SubjectStore};
pub use entities::{Chain, Dex, LiquidityPoolPosition, Subject, Token};
pub use error::SubjectError;
pub use range::{tick_to_price, TICK_BASE};
