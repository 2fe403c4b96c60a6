use thiserror::Error;

/// Reasons a [`Subject`](crate::Subject) cannot be watched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubjectError {
    #[error("subject {telegram_user_id} has no wallets")]
    NoWallets { telegram_user_id: i64 },
    #[error("subject {telegram_user_id} has a blank wallet address")]
    BlankWallet { telegram_user_id: i64 },
    #[error("subject {telegram_user_id} has a zero check interval")]
    ZeroCheckInterval { telegram_user_id: i64 },
}
