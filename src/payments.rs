use async_trait::async_trait;
use normie_rs::{
    CheckoutRequest, CheckoutSession, LiquidityProvider, NormieApi, NormieApiError, ZelleDetails,
};

/// Operations the payment-code flow needs from the payments provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentsApi: Send + Sync {
    async fn create_checkout(
        &self,
        project_id: &str,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, NormieApiError>;

    async fn zelle_details(
        &self,
        transaction_id: &str,
    ) -> Result<Option<ZelleDetails>, NormieApiError>;

    async fn liquidity_provider(
        &self,
        zelle_id: &str,
    ) -> Result<Option<LiquidityProvider>, NormieApiError>;

    async fn confirm(&self, transaction_id: &str) -> Result<(), NormieApiError>;

    async fn settle(&self, transaction_id: &str) -> Result<(), NormieApiError>;
}

#[async_trait]
impl PaymentsApi for NormieApi {
    async fn create_checkout(
        &self,
        project_id: &str,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, NormieApiError> {
        NormieApi::create_checkout(self, project_id, request).await
    }

    async fn zelle_details(
        &self,
        transaction_id: &str,
    ) -> Result<Option<ZelleDetails>, NormieApiError> {
        NormieApi::zelle_details(self, transaction_id).await
    }

    async fn liquidity_provider(
        &self,
        zelle_id: &str,
    ) -> Result<Option<LiquidityProvider>, NormieApiError> {
        NormieApi::liquidity_provider(self, zelle_id).await
    }

    async fn confirm(&self, transaction_id: &str) -> Result<(), NormieApiError> {
        NormieApi::confirm(self, transaction_id).await
    }

    async fn settle(&self, transaction_id: &str) -> Result<(), NormieApiError> {
        NormieApi::settle(self, transaction_id).await
    }
}
