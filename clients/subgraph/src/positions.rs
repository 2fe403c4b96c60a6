//! Shared position query and its decoding into domain positions.

use std::str::FromStr;

use alloy::primitives::Address;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use domain::{Chain, Dex, LiquidityPoolPosition, Token};

/// Positions of `$wallet` that still hold liquidity.
pub(crate) const POSITIONS_WITH_LIQUIDITY: &str = r#"
query PositionsWithLiquidity($wallet: String!) {
    positions(where: { owner: $wallet, liquidity_gt: 0 }) {
        id
        tickLower { tickIdx }
        tickUpper { tickIdx }
        pool {
            tick
            token0 { symbol decimals }
            token1 { symbol decimals }
        }
    }
}
"#;

#[derive(Serialize)]
pub(crate) struct WalletVariables {
    pub wallet: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PositionsData {
    pub positions: Vec<RawPosition>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawPosition {
    pub id: String,
    pub tick_lower: RawTick,
    pub tick_upper: RawTick,
    pub pool: RawPool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawTick {
    pub tick_idx: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPool {
    pub tick: Option<String>,
    pub token0: RawToken,
    pub token1: RawToken,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawToken {
    pub symbol: String,
    pub decimals: String,
}

/// Fixed attributes of the positions one subgraph returns.
pub(crate) struct Venue {
    pub chain: Chain,
    pub dex: Dex,
    /// Builds the management link of a position from its id
    pub link: fn(&str) -> String,
}

/// Parses `wallet` as an EVM address and renders it the way subgraphs store owners.
pub(crate) fn normalize_wallet(wallet: &str) -> Result<String> {
    let address = Address::from_str(wallet.trim())
        .with_context(|| format!("invalid wallet address {wallet:?}"))?;
    Ok(format!("{address:#x}"))
}

impl RawPosition {
    pub(crate) fn into_domain(self, venue: &Venue) -> Result<LiquidityPoolPosition> {
        let current_tick = self
            .pool
            .tick
            .as_deref()
            .ok_or_else(|| anyhow!("pool of position {} has no current tick", self.id))
            .and_then(parse_tick)?;

        Ok(LiquidityPoolPosition {
            chain: venue.chain,
            dex: venue.dex,
            position_link: (venue.link)(&self.id),
            token0: self.pool.token0.into_domain()?,
            token1: self.pool.token1.into_domain()?,
            current_tick,
            tick_lower: parse_tick(&self.tick_lower.tick_idx)?,
            tick_upper: parse_tick(&self.tick_upper.tick_idx)?,
        })
    }
}

impl RawToken {
    fn into_domain(self) -> Result<Token> {
        let decimals = self
            .decimals
            .parse::<u8>()
            .with_context(|| format!("invalid decimals {:?} for {}", self.decimals, self.symbol))?;
        Ok(Token::new(self.symbol, decimals))
    }
}

fn parse_tick(value: &str) -> Result<i32> {
    value
        .parse::<i32>()
        .with_context(|| format!("invalid tick {value:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn venue() -> Venue {
        Venue {
            chain: Chain::Base,
            dex: Dex::UniswapV3,
            link: |id| format!("https://example.org/{id}"),
        }
    }

    fn raw(tick: Option<&str>, decimals0: &str) -> RawPosition {
        RawPosition {
            id: "42".to_string(),
            tick_lower: RawTick {
                tick_idx: "-192660".to_string(),
            },
            tick_upper: RawTick {
                tick_idx: "-190940".to_string(),
            },
            pool: RawPool {
                tick: tick.map(str::to_string),
                token0: RawToken {
                    symbol: "WETH".to_string(),
                    decimals: decimals0.to_string(),
                },
                token1: RawToken {
                    symbol: "USDC".to_string(),
                    decimals: "6".to_string(),
                },
            },
        }
    }

    #[test]
    fn test_into_domain() {
        let position = raw(Some("-191000"), "18").into_domain(&venue()).unwrap();
        assert_eq!(position.position_link, "https://example.org/42");
        assert_eq!(position.token0, Token::new("WETH", 18));
        assert_eq!(position.token1, Token::new("USDC", 6));
        assert_eq!(
            (position.tick_lower, position.current_tick, position.tick_upper),
            (-192660, -191000, -190940)
        );
    }

    #[test]
    fn test_into_domain_rejects_bad_numbers() {
        assert!(raw(None, "18").into_domain(&venue()).is_err());
        assert!(raw(Some("abc"), "18").into_domain(&venue()).is_err());
        assert!(raw(Some("-191000"), "eighteen").into_domain(&venue()).is_err());
    }

    #[test]
    fn test_normalize_wallet() {
        assert_eq!(
            normalize_wallet(" 0xD8DA6BF26964AF9D7EED9E03E53415D37AA96045 ").unwrap(),
            "0xd8da6bf26964af9d7eed9e03e53415d37aa96045"
        );
        assert!(normalize_wallet("not-a-wallet").is_err());
    }
}
