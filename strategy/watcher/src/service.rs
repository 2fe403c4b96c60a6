//! Watch loop: periodic position checks for a subject.
//!
//! Each subject gets its own sequential loop. A tick starts one check cycle
//! (fetch, then dispatch) and the next tick is only observed once that cycle
//! has returned, so cycles of the same subject never overlap.

use std::sync::Arc;

use anyhow::Result;
use tokio::task::JoinSet;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use domain::{LiquidityPoolPosition, PositionNotifier, PositionSource, Subject};

use crate::config::{Dispatcher, WatchServiceConfig};
use crate::fan_out::FailFastGroup;

/// Result of a single check cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A wallet lookup failed; nothing was sent
    FetchFailed,
    /// No wallet holds a position with liquidity; nothing was sent
    NoPositions,
    /// Positions were fetched but the sink reported an error
    DispatchFailed,
    /// The sink accepted the positions
    Notified { positions: usize },
}

/// Periodically checks subjects' positions and notifies them.
#[derive(Clone)]
pub struct WatchService {
    source: Arc<dyn PositionSource>,
    dispatcher: Dispatcher,
}

impl WatchService {
    pub fn new(config: WatchServiceConfig) -> Self {
        Self {
            source: config.source,
            dispatcher: config.dispatcher,
        }
    }

    /// Runs one independent loop per subject until `shutdown` fires.
    pub async fn watch_all(&self, subjects: Vec<Subject>, shutdown: CancellationToken) {
        let mut loops = JoinSet::new();
        for subject in subjects {
            let service = self.clone();
            let shutdown = shutdown.clone();
            loops.spawn(async move { service.watch(subject, shutdown).await });
        }

        while let Some(joined) = loops.join_next().await {
            if let Err(err) = joined {
                error!(error = %err, "watch loop aborted");
            }
        }
    }

    /// Checks `subject` immediately and then every `check_interval` until
    /// `shutdown` fires.
    ///
    /// Shutdown is observed between cycles. A cycle that already started is
    /// carried to completion so an in-flight notification is not cut short.
    pub async fn watch(&self, subject: Subject, shutdown: CancellationToken) {
        if let Err(err) = subject.validate() {
            error!(error = %err, "refusing to watch subject");
            return;
        }

        let mut ticker = interval(subject.check_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            telegram_user_id = subject.telegram_user_id,
            wallets = subject.wallets.len(),
            interval_secs = subject.check_interval.as_secs(),
            "watching subject"
        );

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    self.check_positions(&subject).await;
                }
            }
        }

        info!(telegram_user_id = subject.telegram_user_id, "stopped watching subject");
    }

    /// Performs one check cycle for `subject`.
    ///
    /// Every failure ends the cycle and is only logged; the next tick is the retry.
    pub async fn check_positions(&self, subject: &Subject) -> CycleOutcome {
        let mut positions = Vec::new();
        for wallet in &subject.wallets {
            match self.source.positions_with_liquidity(wallet).await {
                Ok(found) => positions.extend(found),
                Err(err) => {
                    error!(
                        source = self.source.name(),
                        wallet = %wallet,
                        error = %format!("{err:#}"),
                        "failed to fetch positions"
                    );
                    return CycleOutcome::FetchFailed;
                }
            }
        }

        if positions.is_empty() {
            info!(telegram_user_id = subject.telegram_user_id, "no positions found");
            return CycleOutcome::NoPositions;
        }

        let count = positions.len();
        match self.dispatch(subject, positions).await {
            Ok(()) => {
                info!(
                    telegram_user_id = subject.telegram_user_id,
                    positions = count,
                    "subject notified"
                );
                CycleOutcome::Notified { positions: count }
            }
            Err(err) => {
                error!(
                    telegram_user_id = subject.telegram_user_id,
                    error = %format!("{err:#}"),
                    "failed to notify subject"
                );
                CycleOutcome::DispatchFailed
            }
        }
    }

    async fn dispatch(&self, subject: &Subject, positions: Vec<LiquidityPoolPosition>) -> Result<()> {
        match &self.dispatcher {
            Dispatcher::Batched(notifier) => notifier.notify_positions(subject, &positions).await,
            Dispatcher::PerPosition(notifier) => {
                let mut group = FailFastGroup::new();
                for position in positions {
                    let notifier = Arc::clone(notifier);
                    let subject = subject.clone();
                    group.spawn(async move { notify_one(notifier.as_ref(), &subject, &position).await });
                }
                group.wait().await?;
                Ok(())
            }
        }
    }
}

async fn notify_one(
    notifier: &dyn PositionNotifier,
    subject: &Subject,
    position: &LiquidityPoolPosition,
) -> Result<()> {
    if position.is_in_range() {
        notifier.notify_in_range(subject, position).await
    } else {
        warn!(
            telegram_user_id = subject.telegram_user_id,
            dex = %position.dex,
            pair = %format!("{}/{}", position.token0.symbol, position.token1.symbol),
            "position out of range"
        );
        notifier.notify_out_of_range(subject, position).await
    }
}
