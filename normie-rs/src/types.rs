use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request payload for creating a checkout session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    /// Display name of the checkout.
    pub name: String,
    /// Amount in the smallest fiat unit (cents).
    pub amount: i64,
    /// Where the payer is sent after a successful checkout.
    #[serde(rename = "success_url")]
    pub success_url: String,
    pub metadata: CheckoutMetadata,
    /// Let the payer cover processing fees on top of `amount`.
    pub forward_fees_to_users_in_checkout: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutMetadata {
    /// Wallet/account that receives the payout once the transfer settles.
    pub payout_address: String,
}

/// Checkout session returned by the API.
///
/// Every field is optional on the wire; callers must check `transaction_id`
/// before relying on the session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckoutSession {
    pub project_id: Option<String>,
    pub payment_id: Option<String>,
    pub url: Option<String>,
    pub transaction_id: Option<String>,
}

/// Zelle payment details attached to a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZelleDetails {
    #[serde(default)]
    pub id: Option<String>,
    pub transaction_id: String,
    /// Lifecycle label, e.g. `not-started-by-sender` or `payment-confirmed-by-admin`.
    pub confirmation_status: String,
    /// Zelle id of the liquidity provider the payer must send to.
    #[serde(default)]
    pub payout_details: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    /// Sub-amount added to `amount` so incoming transfers can be matched.
    #[serde(default)]
    pub uniqueness_amount: Option<f64>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Zelle-receiving counterparty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LiquidityProvider {
    pub id: Option<String>,
    pub wallet_address: Option<String>,
    pub email: Option<String>,
    pub zelle_id: Option<String>,
    pub zelle_name: Option<String>,
    pub is_business_zelle: Option<bool>,
}

/// Body of the confirm and settle calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub transaction_id: String,
}

/// `{success, data, error}` wrapper most endpoints respond with.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub(crate) struct ApiEnvelope<T> {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
}

fn default_success() -> bool {
    true
}
