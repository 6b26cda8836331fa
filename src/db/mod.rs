use crate::models::PaymentCode;
use async_trait::async_trait;
use diesel::result::DatabaseErrorKind;
use thiserror::Error;

mod postgres;

pub use postgres::PostgresDb;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    General(String),
    #[error("Duplicate Id Error")]
    DuplicateId,
}

impl From<diesel::result::Error> for DbError {
    fn from(e: diesel::result::Error) -> Self {
        match e {
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                DbError::DuplicateId
            }
            _ => DbError::General(e.to_string()),
        }
    }
}

impl From<deadpool::managed::PoolError<diesel_async::pooled_connection::PoolError>> for DbError {
    fn from(e: deadpool::managed::PoolError<diesel_async::pooled_connection::PoolError>) -> Self {
        DbError::General(e.to_string())
    }
}

/// Storage of the `payment_codes` table. Rows are insert-only.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentCodesDB: Send + Sync {
    async fn create(&self, code: &PaymentCode) -> Result<PaymentCode, DbError>;
    async fn get(&self, id: &str) -> Result<Option<PaymentCode>, DbError>;
}
