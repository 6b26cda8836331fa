use crate::db::DbError;
use normie_rs::NormieApiError;
use thiserror::Error;

/// Failure of a payment-code operation, rendered into the response envelope.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Invalid amount: {0}")]
    InvalidAmount(f64),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Payment code not found")]
    CodeNotFound,
    #[error("Checkout data not found")]
    CheckoutMissing,
    #[error("Could not allocate a unique payment code")]
    CodeSpaceExhausted,
    #[error("Payment details not found")]
    DetailsMissing,
    #[error("Payment amount not found")]
    AmountMissing,
    #[error("Liquidity provider not found")]
    ProviderMissing,
    #[error("Payment confirmation failed: {0}")]
    ConfirmFailed(NormieApiError),
    #[error("Payment settlement failed: {0}")]
    SettleFailed(NormieApiError),
    #[error(transparent)]
    Upstream(#[from] NormieApiError),
    #[error(transparent)]
    Db(#[from] DbError),
}
