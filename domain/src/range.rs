//! Range math over a position's ticks.
//!
//! Everything here is pure and synchronous: prices are derived from ticks,
//! and the token split is a linear interpolation over the tick range.

use crate::entities::LiquidityPoolPosition;

/// Multiplicative price step between two adjacent ticks (0.01%).
pub const TICK_BASE: f64 = 1.0001;

/// Converts a tick to a human readable price of token0 expressed in token1.
///
/// The raw pool price `1.0001^tick` is quoted in the smallest units of both
/// tokens, so it is rescaled by `10^(decimals0 - decimals1)`.
pub fn tick_to_price(tick: i32, decimals0: u8, decimals1: u8) -> f64 {
    let scale = i32::from(decimals0) - i32::from(decimals1);
    TICK_BASE.powf(f64::from(tick)) * 10f64.powi(scale)
}

impl LiquidityPoolPosition {
    /// Whether the pool tick sits inside `[tick_lower, tick_upper]`, both ends included.
    pub fn is_in_range(&self) -> bool {
        self.tick_lower <= self.current_tick && self.current_tick <= self.tick_upper
    }

    /// Share of the position held in token0 and token1, in percent.
    ///
    /// This interpolates linearly over tick indexes. It is an approximation
    /// for display, not the liquidity-weighted value split of the position.
    ///
    /// Below the range everything is token0, above it everything is token1.
    /// A single-tick range (`tick_lower == tick_upper`) therefore reports
    /// 100/0 at its tick and 0/100 above it, without dividing by zero.
    pub fn token_proportions(&self) -> (f64, f64) {
        if self.current_tick <= self.tick_lower {
            return (100.0, 0.0);
        }
        if self.current_tick >= self.tick_upper {
            return (0.0, 100.0);
        }

        // Tick bounds come from upstream data; i32 differences may overflow.
        let covered = i64::from(self.current_tick) - i64::from(self.tick_lower);
        let width = i64::from(self.tick_upper) - i64::from(self.tick_lower);
        let token1 = covered as f64 / width as f64 * 100.0;
        (100.0 - token1, token1)
    }

    pub fn current_price(&self) -> f64 {
        self.price_at(self.current_tick)
    }

    pub fn lower_price(&self) -> f64 {
        self.price_at(self.tick_lower)
    }

    pub fn upper_price(&self) -> f64 {
        self.price_at(self.tick_upper)
    }

    fn price_at(&self, tick: i32) -> f64 {
        tick_to_price(tick, self.token0.decimals, self.token1.decimals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Chain, Dex, Token};

    fn position(tick_lower: i32, current_tick: i32, tick_upper: i32) -> LiquidityPoolPosition {
        LiquidityPoolPosition {
            chain: Chain::Base,
            dex: Dex::UniswapV3,
            position_link: "https://app.uniswap.org/positions/v3/base/1".to_string(),
            token0: Token::new("WETH", 18),
            token1: Token::new("USDC", 6),
            current_tick,
            tick_lower,
            tick_upper,
        }
    }

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() < tolerance,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_in_range_is_closed_interval() {
        assert!(position(-10, -10, 10).is_in_range());
        assert!(position(-10, 0, 10).is_in_range());
        assert!(position(-10, 10, 10).is_in_range());
        assert!(!position(-10, -11, 10).is_in_range());
        assert!(!position(-10, 11, 10).is_in_range());
    }

    #[test]
    fn test_proportions_inside_range() {
        let (token0, token1) = position(-192660, -191000, -190940).token_proportions();
        assert_close(token1, 96.5116, 1e-3);
        assert_close(token0, 3.4884, 1e-3);
        assert_close(token0 + token1, 100.0, 1e-9);
    }

    #[test]
    fn test_proportions_outside_range() {
        assert_eq!(position(0, 0, 100).token_proportions(), (100.0, 0.0));
        assert_eq!(position(0, -5, 100).token_proportions(), (100.0, 0.0));
        assert_eq!(position(0, 100, 100).token_proportions(), (0.0, 100.0));
        assert_eq!(position(0, 250, 100).token_proportions(), (0.0, 100.0));
    }

    #[test]
    fn test_proportions_always_sum_to_hundred() {
        for current in -50..=150 {
            let (token0, token1) = position(0, current, 100).token_proportions();
            assert_close(token0 + token1, 100.0, 1e-9);
            assert!((0.0..=100.0).contains(&token1));
        }
    }

    #[test]
    fn test_single_tick_range() {
        let at = position(42, 42, 42);
        assert!(at.is_in_range());
        assert_eq!(at.token_proportions(), (100.0, 0.0));

        let above = position(42, 43, 42);
        assert!(!above.is_in_range());
        assert_eq!(above.token_proportions(), (0.0, 100.0));

        let below = position(42, 41, 42);
        assert_eq!(below.token_proportions(), (100.0, 0.0));
    }

    #[test]
    fn test_proportions_with_extreme_ticks() {
        let (token0, token1) = position(i32::MIN, 0, i32::MAX).token_proportions();
        assert_close(token0, 50.0, 1e-6);
        assert_close(token1, 50.0, 1e-6);

        let (token0, token1) = position(i32::MIN, i32::MAX - 1, i32::MAX).token_proportions();
        assert_close(token0 + token1, 100.0, 1e-9);
        assert!(token0 > 0.0 && token0 < 1e-6);

        assert_eq!(position(i32::MIN, i32::MIN, i32::MAX).token_proportions(), (100.0, 0.0));
        assert_eq!(position(i32::MIN, i32::MAX, i32::MAX).token_proportions(), (0.0, 100.0));
    }

    #[test]
    fn test_tick_to_price() {
        assert_eq!(tick_to_price(0, 18, 18), 1.0);
        assert_close(tick_to_price(100, 18, 18), 1.010_049_66, 1e-6);
    }

    #[test]
    fn test_position_prices_weth_usdc() {
        let p = position(-192660, -191000, -190940);
        assert_close(p.lower_price(), 4298.34, 0.01);
        assert_close(p.upper_price(), 5105.00, 0.01);
        assert_close(p.current_price(), 5074.46, 0.01);
    }

    #[test]
    fn test_price_direction_follows_token_order() {
        // USDC/WETH pool: token0 has fewer decimals, price is WETH per USDC.
        let price = tick_to_price(191000, 6, 18);
        assert_close(price, 1.0 / 5074.463, 1e-7);
    }
}
