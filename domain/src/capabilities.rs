//! Capabilities the watcher depends on. Concrete clients live in `clients/*`.

use anyhow::Result;
use async_trait::async_trait;

use crate::entities::{LiquidityPoolPosition, Subject};

/// Source of the positions a wallet currently provides liquidity with.
///
/// Implementations must be safe to call concurrently for different wallets.
#[async_trait]
pub trait PositionSource: Send + Sync {
    /// Name used to tell sources apart in errors and logs.
    fn name(&self) -> &str;

    /// Returns every position of `wallet` with non-zero liquidity.
    async fn positions_with_liquidity(&self, wallet: &str) -> Result<Vec<LiquidityPoolPosition>>;
}

/// Sink that renders one consolidated notification for a batch of positions.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_positions(
        &self,
        subject: &Subject,
        positions: &[LiquidityPoolPosition],
    ) -> Result<()>;
}

/// Sink that is notified once per position.
#[async_trait]
pub trait PositionNotifier: Send + Sync {
    async fn notify_in_range(&self, subject: &Subject, position: &LiquidityPoolPosition)
        -> Result<()>;

    async fn notify_out_of_range(
        &self,
        subject: &Subject,
        position: &LiquidityPoolPosition,
    ) -> Result<()>;
}

/// Durable registry of subjects.
#[async_trait]
pub trait SubjectStore: Send + Sync {
    async fn get_all(&self) -> Result<Vec<Subject>>;

    /// Inserts the subject or replaces the one with the same telegram user id.
    async fn add(&self, subject: &Subject) -> Result<()>;
}
