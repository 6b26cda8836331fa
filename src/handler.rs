use crate::{
    app::{App, CaptureReceipt},
    auth::{SessionUser, SessionVerifier, require_session},
    error::ActionError,
    models::PaymentCode,
    pricing::{CheckoutQuote, Payment},
};
use axum::{
    Extension, Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// `{success, error, data}` body every payment-code endpoint answers with.
#[derive(Debug, Serialize)]
pub struct ActionResponse<T> {
    pub success: bool,
    pub error: Option<String>,
    pub data: Option<T>,
}

impl<T> ActionResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            error: None,
            data: Some(data),
        })
    }

    pub fn failure(err: &ActionError) -> Json<Self> {
        Json(Self {
            success: false,
            error: Some(err.to_string()),
            data: None,
        })
    }
}

/// Body of the capture endpoint, which reports a message instead of data.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<String>,
}

impl From<CaptureReceipt> for CaptureResponse {
    fn from(receipt: CaptureReceipt) -> Self {
        Self {
            success: true,
            message: receipt.message,
            transaction_id: Some(receipt.transaction_id),
            estimated_time: Some(receipt.estimated_time),
        }
    }
}

fn status_code(err: &ActionError) -> StatusCode {
    match err {
        ActionError::Unauthorized => StatusCode::UNAUTHORIZED,
        ActionError::InvalidAmount(_) | ActionError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        ActionError::CodeNotFound => StatusCode::NOT_FOUND,
        ActionError::CodeSpaceExhausted | ActionError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ActionError::CheckoutMissing
        | ActionError::DetailsMissing
        | ActionError::AmountMissing
        | ActionError::ProviderMissing
        | ActionError::ConfirmFailed(_)
        | ActionError::SettleFailed(_)
        | ActionError::Upstream(_) => StatusCode::BAD_GATEWAY,
    }
}

// Renders an `ActionError` as a failed envelope.
pub struct AppError(ActionError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (status_code(&self.0), ActionResponse::<()>::failure(&self.0)).into_response()
    }
}

impl From<ActionError> for AppError {
    fn from(err: ActionError) -> Self {
        Self(err)
    }
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn handle_health() -> Json<Health> {
    Json(Health {
        status: "ok",
        version: option_env!("VERGEN_GIT_SHA").unwrap_or("unknown"),
    })
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub amount: f64,
}

pub async fn handle_generate(
    Extension(SessionUser(user)): Extension<SessionUser>,
    State(app): State<Arc<App>>,
    req: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<ActionResponse<PaymentCode>>, AppError> {
    let Json(req) = req.map_err(|e| ActionError::InvalidRequest(e.body_text()))?;

    info!(user, amount = req.amount, "handle_generate");

    Ok(ActionResponse::ok(app.generate_code(user, req.amount).await?))
}

pub async fn handle_validate(
    Path(code): Path<String>,
    State(app): State<Arc<App>>,
) -> Result<Json<ActionResponse<PaymentCode>>, AppError> {
    info!("handle_validate: {}", code);

    Ok(ActionResponse::ok(app.validate_code(&code).await?))
}

pub async fn handle_payment_details(
    Path(code): Path<String>,
    State(app): State<Arc<App>>,
) -> Result<Json<ActionResponse<Payment>>, AppError> {
    info!("handle_payment_details: {}", code);

    Ok(ActionResponse::ok(app.payment_details(&code).await?))
}

pub async fn handle_capture(Path(code): Path<String>, State(app): State<Arc<App>>) -> Response {
    info!("handle_capture: {}", code);

    match app.capture_payment(&code).await {
        Ok(receipt) => Json(CaptureResponse::from(receipt)).into_response(),
        Err(e) => (
            status_code(&e),
            Json(CaptureResponse {
                success: false,
                message: e.to_string(),
                transaction_id: None,
                estimated_time: None,
            }),
        )
            .into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct QuoteQuery {
    pub amount: f64,
}

pub async fn handle_quote(
    query: Result<Query<QuoteQuery>, QueryRejection>,
    State(app): State<Arc<App>>,
) -> Result<Json<ActionResponse<CheckoutQuote>>, AppError> {
    let Query(query) = query.map_err(|e| ActionError::InvalidRequest(e.body_text()))?;

    Ok(ActionResponse::ok(app.quote(query.amount)?))
}

pub fn router(app: Arc<App>, verifier: SessionVerifier) -> Router {
    Router::new()
        //authenticated routes
        .route("/api/payment-codes", post(handle_generate))
        .route("/api/payment-codes/{code}", get(handle_validate))
        .route(
            "/api/payment-codes/{code}/payment",
            get(handle_payment_details),
        )
        .route("/api/payment-codes/{code}/capture", post(handle_capture))
        .route_layer(middleware::from_fn_with_state(verifier, require_session))
        //public routes
        .route("/api/quote", get(handle_quote))
        .route("/health", get(handle_health))
        .with_state(app)
}
