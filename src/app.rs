use crate::{
    code::{generate_code, normalize_code},
    db::{DbError, PaymentCodesDB},
    error::ActionError,
    models::PaymentCode,
    payments::PaymentsApi,
    pricing::{CheckoutQuote, Payment, checkout_amount, round_amount},
};
use chrono::Utc;
use normie_rs::{CheckoutMetadata, CheckoutRequest};
use quick_cache::sync::Cache;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Inserts retried with a fresh code before giving up on collisions.
const MAX_CODE_ATTEMPTS: usize = 5;

const CAPTURE_MESSAGE: &str = "Payment captured successfully";
const SETTLEMENT_ESTIMATE: &str = "1-3 minutes";

/// Checkout parameters shared by every generated code.
#[derive(Clone, Debug)]
pub struct CheckoutConfig {
    pub project_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureReceipt {
    pub transaction_id: String,
    pub message: String,
    pub estimated_time: String,
}

pub struct App {
    db: Arc<dyn PaymentCodesDB>,
    payments: Arc<dyn PaymentsApi>,
    checkout: CheckoutConfig,
    // holds payable rows only; those are never updated, so entries cannot go stale
    cache: Cache<String, PaymentCode>,
}

fn validate_amount(amount: f64) -> Result<f64, ActionError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ActionError::InvalidAmount(amount));
    }

    Ok(round_amount(amount))
}

impl App {
    pub fn new(
        db: Arc<dyn PaymentCodesDB>,
        payments: Arc<dyn PaymentsApi>,
        checkout: CheckoutConfig,
        cache_size: usize,
    ) -> Arc<Self> {
        Arc::new(Self {
            db,
            payments,
            checkout,
            cache: Cache::new(cache_size),
        })
    }

    /// Opens a checkout for `amount` and stores a new code pointing at it.
    #[instrument(skip(self), err)]
    pub async fn generate_code(
        &self,
        payout_address: String,
        amount: f64,
    ) -> Result<PaymentCode, ActionError> {
        let amount = validate_amount(amount)?;

        let request = CheckoutRequest {
            name: self.checkout.name.clone(),
            amount: checkout_amount(amount),
            success_url: String::new(),
            metadata: CheckoutMetadata {
                payout_address: payout_address.clone(),
            },
            forward_fees_to_users_in_checkout: true,
        };

        let session = self
            .payments
            .create_checkout(&self.checkout.project_id, &request)
            .await
            .inspect_err(|e| warn!(error = %e, "checkout creation failed"))?;

        let Some(transaction_id) = session.transaction_id.filter(|id| !id.is_empty()) else {
            warn!(project_id = self.checkout.project_id, "checkout without transaction id");
            return Err(ActionError::CheckoutMissing);
        };

        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let code = PaymentCode {
                id: generate_code(&mut rand::thread_rng()),
                amount,
                payout_address: payout_address.clone(),
                created_at: Utc::now(),
                external_transaction_id: Some(transaction_id.clone()),
            };

            match self.db.create(&code).await {
                Ok(row) => {
                    info!(id = row.id, transaction_id, "payment code created");
                    self.cache.insert(row.id.clone(), row.clone());
                    return Ok(row);
                }
                Err(DbError::DuplicateId) => {
                    warn!(id = code.id, attempt, "code collision");
                }
                Err(e) => {
                    error!("db error: {e}");
                    return Err(e.into());
                }
            }
        }

        Err(ActionError::CodeSpaceExhausted)
    }

    /// Returns the stored row of a payable code.
    #[instrument(skip(self), err)]
    pub async fn validate_code(&self, code: &str) -> Result<PaymentCode, ActionError> {
        let (row, _) = self.resolve(code).await?;

        Ok(row)
    }

    /// Builds the payment instructions a payer needs for `code`.
    #[instrument(skip(self), err)]
    pub async fn payment_details(&self, code: &str) -> Result<Payment, ActionError> {
        let (row, transaction_id) = self.resolve(code).await?;

        let details = self
            .payments
            .zelle_details(&transaction_id)
            .await?
            .ok_or(ActionError::DetailsMissing)?;

        let zelle_id = details
            .payout_details
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(ActionError::ProviderMissing)?;

        let provider = self
            .payments
            .liquidity_provider(zelle_id)
            .await?
            .ok_or(ActionError::ProviderMissing)?;

        Payment::derive(&row.id, &details, &provider).ok_or(ActionError::AmountMissing)
    }

    /// Confirms and then settles the transaction behind `code`.
    ///
    /// A settle failure after a successful confirm is reported as such and
    /// left for manual follow-up.
    #[instrument(skip(self), err)]
    pub async fn capture_payment(&self, code: &str) -> Result<CaptureReceipt, ActionError> {
        let (_, transaction_id) = self.resolve(code).await?;

        self.payments
            .confirm(&transaction_id)
            .await
            .map_err(ActionError::ConfirmFailed)?;

        info!(transaction_id, "payment confirmed");

        self.payments.settle(&transaction_id).await.map_err(|e| {
            error!(transaction_id, error = %e, "confirmed payment failed to settle");
            ActionError::SettleFailed(e)
        })?;

        info!(transaction_id, "payment settled");

        Ok(CaptureReceipt {
            transaction_id,
            message: CAPTURE_MESSAGE.to_string(),
            estimated_time: SETTLEMENT_ESTIMATE.to_string(),
        })
    }

    pub fn quote(&self, amount: f64) -> Result<CheckoutQuote, ActionError> {
        Ok(CheckoutQuote::new(validate_amount(amount)?))
    }

    async fn resolve(&self, code: &str) -> Result<(PaymentCode, String), ActionError> {
        let id = normalize_code(code);

        let Some(row) = self.lookup(&id).await? else {
            info!(id, "unknown payment code");
            return Err(ActionError::CodeNotFound);
        };

        let Some(transaction_id) = row.payable_transaction().map(str::to_string) else {
            warn!(id, "payment code without transaction");
            return Err(ActionError::CodeNotFound);
        };

        Ok((row, transaction_id))
    }

    async fn lookup(&self, id: &str) -> Result<Option<PaymentCode>, DbError> {
        if let Some(row) = self.cache.get(id) {
            return Ok(Some(row));
        }

        let row = self.db.get(id).await?;

        if let Some(row) = row.as_ref().filter(|row| row.payable_transaction().is_some()) {
            self.cache.insert(id.to_string(), row.clone());
        }

        Ok(row)
    }
}
