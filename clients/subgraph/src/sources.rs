//! Protocol specific position sources on Base.

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use domain::{Chain, Dex, LiquidityPoolPosition, PositionSource};

use crate::client::SubgraphClient;
use crate::positions::{
    normalize_wallet, PositionsData, Venue, WalletVariables, POSITIONS_WITH_LIQUIDITY,
};

const UNISWAP_V3_BASE: Venue = Venue {
    chain: Chain::Base,
    dex: Dex::UniswapV3,
    link: uniswap_link,
};

const AERODROME_BASE: Venue = Venue {
    chain: Chain::Base,
    dex: Dex::Aerodrome,
    link: aerodrome_link,
};

fn uniswap_link(id: &str) -> String {
    format!("https://app.uniswap.org/positions/v3/base/{id}")
}

fn aerodrome_link(_id: &str) -> String {
    "https://aerodrome.finance/dash".to_string()
}

async fn fetch(
    client: &SubgraphClient,
    venue: &Venue,
    wallet: &str,
) -> Result<Vec<LiquidityPoolPosition>> {
    let variables = WalletVariables {
        wallet: normalize_wallet(wallet)?,
    };
    let data: PositionsData = client.query(POSITIONS_WITH_LIQUIDITY, variables).await?;
    debug!(dex = %venue.dex, wallet = %wallet, count = data.positions.len(), "positions decoded");
    data.positions
        .into_iter()
        .map(|raw| raw.into_domain(venue))
        .collect()
}

/// Uniswap V3 positions on Base.
pub struct UniswapV3Source {
    client: SubgraphClient,
}

impl UniswapV3Source {
    pub fn new(client: SubgraphClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PositionSource for UniswapV3Source {
    fn name(&self) -> &str {
        "Base Uniswap V3"
    }

    async fn positions_with_liquidity(&self, wallet: &str) -> Result<Vec<LiquidityPoolPosition>> {
        fetch(&self.client, &UNISWAP_V3_BASE, wallet).await
    }
}

/// Aerodrome slipstream positions on Base.
pub struct AerodromeSource {
    client: SubgraphClient,
}

impl AerodromeSource {
    pub fn new(client: SubgraphClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PositionSource for AerodromeSource {
    fn name(&self) -> &str {
        "Base Aerodrome"
    }

    async fn positions_with_liquidity(&self, wallet: &str) -> Result<Vec<LiquidityPoolPosition>> {
        fetch(&self.client, &AERODROME_BASE, wallet).await
    }
}
