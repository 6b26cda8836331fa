//! # normie-rs
//!
//! A Rust client library for the Normie payments API.
//!
//! The crate covers the subset of the API needed to run Zelle-backed payment
//! codes: creating a checkout session, reading the Zelle payment details of a
//! transaction, looking up the liquidity provider that receives the transfer,
//! and confirming/settling the transaction once the fiat leg arrived.
//!
//! Every call is authenticated with the project's API key, sent as the
//! `x-api-key` header. The key is not validated locally; a bad key surfaces as
//! an [`NormieApiError::UnexpectedStatus`] from the server.
//!
//! ## Example
//!
//! ```rust,no_run
//! # async fn example() -> Result<(), normie_rs::NormieApiError> {
//! use normie_rs::NormieApi;
//!
//! let api = NormieApi::new("your-api-key".to_string());
//!
//! if let Some(details) = api.zelle_details("tx_123").await? {
//!     println!("status: {}", details.confirmation_status);
//! }
//! # Ok(())
//! # }
//! ```

mod types;

pub use types::{
    CheckoutMetadata, CheckoutRequest, CheckoutSession, LiquidityProvider, TransactionRequest,
    ZelleDetails,
};

use reqwest::{Response, Url};
use serde::de::{DeserializeOwned, IgnoredAny};
use thiserror::Error;
use tracing::{debug, warn};
use types::ApiEnvelope;

/// Production endpoint of the Normie API.
pub const DEFAULT_API_URL: &str = "https://api.normie.tech";

const API_KEY_HEADER: &str = "x-api-key";

/// Errors that can occur when interacting with the Normie API.
#[derive(Debug, Error)]
pub enum NormieApiError {
    /// The configured endpoint could not be turned into a request URL.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    /// An error occurred while sending the HTTP request or receiving the response.
    #[error("Request error: {0}")]
    RequestError(String),
    /// An error occurred while deserializing the API response.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),
    /// The API answered with a non-success HTTP status.
    #[error("Upstream returned {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
    /// The API answered 200 but flagged the call as unsuccessful.
    #[error("Upstream rejected the request: {0}")]
    Rejected(String),
}

/// A client for the Normie payments API.
#[derive(Clone, Debug)]
pub struct NormieApi {
    url: String,
    key: String,
    client: reqwest::Client,
}

impl NormieApi {
    /// Creates a client for the production endpoint.
    pub fn new(key: String) -> Self {
        Self {
            url: String::from(DEFAULT_API_URL),
            key,
            client: reqwest::Client::new(),
        }
    }

    /// Sets a custom API endpoint URL, e.g. a staging deployment.
    pub fn with_url(mut self, url: &str) -> Self {
        self.url = url.into();
        self
    }

    /// Replaces the underlying HTTP client, e.g. to configure timeouts.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, NormieApiError> {
        let mut url = Url::parse(&self.url)
            .map_err(|e| NormieApiError::ConfigurationError(e.to_string()))?;

        url.path_segments_mut()
            .map_err(|_| {
                NormieApiError::ConfigurationError(format!("invalid base url: {}", self.url))
            })?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    /// Creates a checkout session for `project_id`.
    ///
    /// The returned session may lack a `transaction_id`; callers decide how to
    /// treat that.
    pub async fn create_checkout(
        &self,
        project_id: &str,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, NormieApiError> {
        let url = self.endpoint(&["v1", project_id, "0", "checkout"])?;

        debug!(project_id, amount = request.amount, "creating checkout");

        let resp = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.key)
            .json(request)
            .send()
            .await
            .map_err(|e| NormieApiError::RequestError(e.to_string()))?;

        read_json(resp).await
    }

    /// Fetches the Zelle payment details of a transaction.
    ///
    /// Returns `Ok(None)` when the API answers without data.
    pub async fn zelle_details(
        &self,
        transaction_id: &str,
    ) -> Result<Option<ZelleDetails>, NormieApiError> {
        let url = self.endpoint(&["v1", "payment", "5", "details", transaction_id])?;

        let resp = self
            .client
            .get(url)
            .header(API_KEY_HEADER, &self.key)
            .send()
            .await
            .map_err(|e| NormieApiError::RequestError(e.to_string()))?;

        let envelope: ApiEnvelope<ZelleDetails> = read_json(resp).await?;

        into_data(envelope)
    }

    /// Looks up the liquidity provider registered under `zelle_id`.
    pub async fn liquidity_provider(
        &self,
        zelle_id: &str,
    ) -> Result<Option<LiquidityProvider>, NormieApiError> {
        let url = self.endpoint(&["v1", "payment", "6", "zelle-mail", "lp", zelle_id])?;

        let resp = self
            .client
            .get(url)
            .header(API_KEY_HEADER, &self.key)
            .send()
            .await
            .map_err(|e| NormieApiError::RequestError(e.to_string()))?;

        let envelope: ApiEnvelope<LiquidityProvider> = read_json(resp).await?;

        into_data(envelope)
    }

    /// Marks the Zelle transfer of a transaction as confirmed.
    pub async fn confirm(&self, transaction_id: &str) -> Result<(), NormieApiError> {
        self.transaction_action("confirm", transaction_id).await
    }

    /// Releases the stable-coin payout of a confirmed transaction.
    pub async fn settle(&self, transaction_id: &str) -> Result<(), NormieApiError> {
        self.transaction_action("settle", transaction_id).await
    }

    async fn transaction_action(
        &self,
        action: &str,
        transaction_id: &str,
    ) -> Result<(), NormieApiError> {
        let url = self.endpoint(&["v1", "payment", "6", "zelle-mail", action])?;

        let resp = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.key)
            .json(&TransactionRequest {
                transaction_id: transaction_id.to_string(),
            })
            .send()
            .await
            .map_err(|e| NormieApiError::RequestError(e.to_string()))?;

        let body = read_body(resp).await?;

        // the zelle-mail endpoints may acknowledge with an empty 200
        if body.trim().is_empty() {
            debug!(action, transaction_id, "empty acknowledgement");
            return Ok(());
        }

        let envelope: ApiEnvelope<IgnoredAny> = parse_json(&body)?;

        if !envelope.success {
            return Err(NormieApiError::Rejected(
                envelope.error.unwrap_or_else(|| format!("{action} not successful")),
            ));
        }

        Ok(())
    }
}

async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T, NormieApiError> {
    parse_json(&read_body(resp).await?)
}

fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, NormieApiError> {
    serde_json::from_str(body).map_err(|e| NormieApiError::DeserializationError(e.to_string()))
}

async fn read_body(resp: Response) -> Result<String, NormieApiError> {
    let status = resp.status();

    if status != reqwest::StatusCode::OK {
        let body = resp.text().await.unwrap_or_default();
        warn!(status = %status, body = %body, "normie api request failed");
        return Err(NormieApiError::UnexpectedStatus {
            status: status.as_u16(),
            body,
        });
    }

    resp.text()
        .await
        .map_err(|e| NormieApiError::RequestError(e.to_string()))
}

fn into_data<T>(envelope: ApiEnvelope<T>) -> Result<Option<T>, NormieApiError> {
    if !envelope.success {
        return Err(NormieApiError::Rejected(
            envelope.error.unwrap_or_else(|| "unknown error".to_string()),
        ));
    }

    Ok(envelope.data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        extract::Path,
        http::{HeaderMap, StatusCode},
        response::{IntoResponse, Response},
        routing::{get, post},
    };
    use serde_json::{Value, json};
    use tokio::net::TcpListener;

    const KEY: &str = "test-key";

    fn authorized(headers: &HeaderMap) -> bool {
        headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok()) == Some(KEY)
    }

    async fn checkout(
        Path(project_id): Path<String>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        if !authorized(&headers) {
            return (StatusCode::UNAUTHORIZED, Json(json!({"error": "bad key"})));
        }
        if body["amount"] == 0 {
            return (StatusCode::OK, Json(json!({"projectId": project_id})));
        }
        (
            StatusCode::OK,
            Json(json!({
                "projectId": project_id,
                "paymentId": "0",
                "url": "https://checkout.example/tx_1",
                "transactionId": "tx_1"
            })),
        )
    }

    async fn details(Path(transaction_id): Path<String>) -> (StatusCode, Json<Value>) {
        match transaction_id.as_str() {
            "tx_1" => (
                StatusCode::OK,
                Json(json!({
                    "success": true,
                    "data": {
                        "id": "d1",
                        "transactionId": "tx_1",
                        "confirmationStatus": "not-started-by-sender",
                        "payoutDetails": "lp@zelle.example",
                        "amount": 50.12,
                        "uniquenessAmount": 0.12,
                        "createdAt": "2025-06-01T10:00:00Z",
                        "updatedAt": "2025-06-01T10:00:00Z"
                    }
                })),
            ),
            "tx_empty" => (StatusCode::OK, Json(json!({"success": true}))),
            _ => (
                StatusCode::NOT_FOUND,
                Json(json!({"success": false, "error": "not found"})),
            ),
        }
    }

    async fn lp(Path(zelle_id): Path<String>) -> Json<Value> {
        Json(json!({
            "success": true,
            "data": {
                "id": "lp1",
                "walletAddress": "0x1",
                "zelleId": zelle_id,
                "zelleName": "Jane Doe",
                "isBusinessZelle": false
            }
        }))
    }

    async fn confirm(Json(body): Json<Value>) -> Response {
        match body["transactionId"].as_str() {
            Some("tx_1") => (StatusCode::OK, Json(json!({"success": true}))).into_response(),
            Some("tx_soft") => (StatusCode::OK, Json(json!({"success": false}))).into_response(),
            Some("tx_quiet") => StatusCode::OK.into_response(),
            _ => (StatusCode::BAD_REQUEST, Json(json!({"error": "bad tx"}))).into_response(),
        }
    }

    async fn spawn_server() -> NormieApi {
        let router = Router::new()
            .route("/v1/{project_id}/0/checkout", post(checkout))
            .route("/v1/payment/5/details/{transaction_id}", get(details))
            .route("/v1/payment/6/zelle-mail/lp/{zelle_id}", get(lp))
            .route("/v1/payment/6/zelle-mail/confirm", post(confirm))
            .route("/v1/payment/6/zelle-mail/settle", post(confirm));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        NormieApi::new(KEY.to_string()).with_url(&format!("http://{addr}/"))
    }

    fn checkout_request(amount: i64) -> CheckoutRequest {
        CheckoutRequest {
            name: "Payment Code".to_string(),
            amount,
            success_url: String::new(),
            metadata: CheckoutMetadata {
                payout_address: "0xabc".to_string(),
            },
            forward_fees_to_users_in_checkout: true,
        }
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let api = NormieApi::new(KEY.to_string()).with_url("https://api.example.com/");
        let url = api.endpoint(&["v1", "payment", "5", "details", "a/b"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/v1/payment/5/details/a%2Fb"
        );
    }

    #[test]
    fn test_endpoint_rejects_bad_base() {
        let api = NormieApi::new(KEY.to_string()).with_url("not a url");
        assert!(matches!(
            api.endpoint(&["v1"]),
            Err(NormieApiError::ConfigurationError(_))
        ));
    }

    #[tokio::test]
    async fn test_create_checkout() {
        let api = spawn_server().await;

        let session = api
            .create_checkout("zelle-pal", &checkout_request(2500))
            .await
            .unwrap();

        assert_eq!(session.transaction_id.as_deref(), Some("tx_1"));
        assert_eq!(session.project_id.as_deref(), Some("zelle-pal"));
    }

    #[tokio::test]
    async fn test_create_checkout_without_transaction_id() {
        let api = spawn_server().await;

        let session = api
            .create_checkout("zelle-pal", &checkout_request(0))
            .await
            .unwrap();

        assert_eq!(session.transaction_id, None);
    }

    #[tokio::test]
    async fn test_wrong_key_surfaces_status() {
        let api = spawn_server().await;
        let api = NormieApi {
            key: "wrong".to_string(),
            ..api
        };

        let err = api
            .create_checkout("zelle-pal", &checkout_request(2500))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            NormieApiError::UnexpectedStatus { status: 401, .. }
        ));
    }

    #[tokio::test]
    async fn test_zelle_details() {
        let api = spawn_server().await;

        let details = api.zelle_details("tx_1").await.unwrap().unwrap();
        assert_eq!(details.confirmation_status, "not-started-by-sender");
        assert_eq!(details.amount, Some(50.12));

        assert!(api.zelle_details("tx_empty").await.unwrap().is_none());

        let err = api.zelle_details("missing").await.unwrap_err();
        assert!(matches!(
            err,
            NormieApiError::UnexpectedStatus { status: 404, .. }
        ));
    }

    #[tokio::test]
    async fn test_liquidity_provider() {
        let api = spawn_server().await;

        let lp = api
            .liquidity_provider("lp@zelle.example")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(lp.zelle_id.as_deref(), Some("lp@zelle.example"));
        assert_eq!(lp.zelle_name.as_deref(), Some("Jane Doe"));
    }

    #[tokio::test]
    async fn test_confirm_and_settle() {
        let api = spawn_server().await;

        api.confirm("tx_1").await.unwrap();
        api.settle("tx_1").await.unwrap();

        assert!(matches!(
            api.settle("tx_soft").await,
            Err(NormieApiError::Rejected(_))
        ));
        assert!(matches!(
            api.confirm("tx_bad").await,
            Err(NormieApiError::UnexpectedStatus { status: 400, .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_acknowledgement_succeeds() {
        let api = spawn_server().await;

        api.confirm("tx_quiet").await.unwrap();
        api.settle("tx_quiet").await.unwrap();
    }
}
