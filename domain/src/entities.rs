//! Entities observed by the watcher.

use std::fmt;
use std::time::Duration;

use crate::error::SubjectError;

/// Chain a position lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Chain {
    Base,
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Chain::Base => f.write_str("Base"),
        }
    }
}

/// Exchange protocol that manages a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dex {
    UniswapV3,
    Aerodrome,
}

impl fmt::Display for Dex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dex::UniswapV3 => f.write_str("Uniswap V3"),
            Dex::Aerodrome => f.write_str("Aerodrome"),
        }
    }
}

/// Token of a pool pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Ticker symbol, e.g. "WETH"
    pub symbol: String,
    /// Decimal precision of the token's on-chain amounts
    pub decimals: u8,
}

impl Token {
    pub fn new(symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            symbol: symbol.into(),
            decimals,
        }
    }
}

/// Person to notify and the wallets watched on their behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    /// Telegram chat that receives the notifications
    pub telegram_user_id: i64,
    /// Wallet addresses whose positions are checked
    pub wallets: Vec<String>,
    /// Delay between two checks
    pub check_interval: Duration,
}

impl Subject {
    /// Creates a subject, rejecting an empty wallet list or a zero interval.
    pub fn new(
        telegram_user_id: i64,
        wallets: Vec<String>,
        check_interval: Duration,
    ) -> Result<Self, SubjectError> {
        let subject = Self {
            telegram_user_id,
            wallets,
            check_interval,
        };
        subject.validate()?;
        Ok(subject)
    }

    pub fn validate(&self) -> Result<(), SubjectError> {
        let telegram_user_id = self.telegram_user_id;
        if self.wallets.is_empty() {
            return Err(SubjectError::NoWallets { telegram_user_id });
        }
        if self.wallets.iter().any(|wallet| wallet.trim().is_empty()) {
            return Err(SubjectError::BlankWallet { telegram_user_id });
        }
        if self.check_interval.is_zero() {
            return Err(SubjectError::ZeroCheckInterval { telegram_user_id });
        }
        Ok(())
    }
}

/// Snapshot of one concentrated liquidity position taken during a check.
#[derive(Debug, Clone, PartialEq)]
pub struct LiquidityPoolPosition {
    pub chain: Chain,
    pub dex: Dex,
    /// Link shown to the subject for managing the position
    pub position_link: String,
    pub token0: Token,
    pub token1: Token,
    /// Current tick of the pool
    pub current_tick: i32,
    /// Lower tick bound of the position
    pub tick_lower: i32,
    /// Upper tick bound of the position
    pub tick_upper: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_validation() {
        let ok = Subject::new(1, vec!["0xabc".into()], Duration::from_secs(60));
        assert!(ok.is_ok());

        let err = Subject::new(7, vec![], Duration::from_secs(60)).unwrap_err();
        assert_eq!(err, SubjectError::NoWallets { telegram_user_id: 7 });

        let err = Subject::new(7, vec!["  ".into()], Duration::from_secs(60)).unwrap_err();
        assert_eq!(err, SubjectError::BlankWallet { telegram_user_id: 7 });

        let err = Subject::new(7, vec!["0xabc".into()], Duration::ZERO).unwrap_err();
        assert_eq!(err, SubjectError::ZeroCheckInterval { telegram_user_id: 7 });
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Chain::Base.to_string(), "Base");
        assert_eq!(Dex::UniswapV3.to_string(), "Uniswap V3");
        assert_eq!(Dex::Aerodrome.to_string(), "Aerodrome");
    }
}
