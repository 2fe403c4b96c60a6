//! Position source that fans a wallet lookup out to several sources.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use domain::{LiquidityPoolPosition, PositionSource};

use crate::fan_out::FailFastGroup;

/// Queries every underlying source concurrently and merges their positions.
///
/// Either all sources succeed or the whole lookup fails with the first error,
/// prefixed with the name of the source that produced it. A partial merge
/// would under-report the wallet's exposure.
pub struct AggregatingSource {
    sources: Vec<Arc<dyn PositionSource>>,
}

impl AggregatingSource {
    pub fn new(sources: Vec<Arc<dyn PositionSource>>) -> Self {
        Self { sources }
    }

    pub fn sources(&self) -> &[Arc<dyn PositionSource>] {
        &self.sources
    }
}

#[async_trait]
impl PositionSource for AggregatingSource {
    fn name(&self) -> &str {
        "Aggregate"
    }

    async fn positions_with_liquidity(&self, wallet: &str) -> Result<Vec<LiquidityPoolPosition>> {
        let mut group = FailFastGroup::new();
        for source in &self.sources {
            let source = Arc::clone(source);
            let wallet = wallet.to_owned();
            group.spawn(async move {
                let positions = source
                    .positions_with_liquidity(&wallet)
                    .await
                    .with_context(|| source.name().to_owned())?;
                debug!(source = source.name(), wallet = %wallet, count = positions.len(), "source fetched");
                Ok(positions)
            });
        }

        let batches = group.wait().await?;
        Ok(batches.into_iter().flatten().collect())
    }
}
