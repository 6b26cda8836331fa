use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{error::ActionError, handler::ActionResponse};

/// Claims of the session token issued by the wallet sign-in provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Wallet/account id of the signed-in user.
    pub sub: String,
    pub exp: usize,
}

/// Verifies session tokens signed with the provider's shared secret.
#[derive(Clone)]
pub struct SessionVerifier {
    key: Arc<DecodingKey>,
    validation: Arc<Validation>,
}

/// Caller resolved from a valid session token.
#[derive(Clone, Debug)]
pub struct SessionUser(pub String);

impl SessionVerifier {
    pub fn new(secret: &str) -> Self {
        info!("session verifier configured");

        Self {
            key: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
            validation: Arc::new(Validation::new(Algorithm::HS256)),
        }
    }

    pub fn verify(&self, token: &str) -> Result<SessionUser, jsonwebtoken::errors::Error> {
        let data = decode::<SessionClaims>(token, &self.key, &self.validation)?;

        Ok(SessionUser(data.claims.sub))
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        ActionResponse::<()>::failure(&ActionError::Unauthorized),
    )
        .into_response()
}

pub async fn require_session(
    State(verifier): State<SessionVerifier>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let Some(token) = token else {
        return unauthorized();
    };

    match verifier.verify(token) {
        Ok(user) if !user.0.is_empty() => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Ok(_) => unauthorized(),
        Err(e) => {
            debug!("rejected session token: {e}");
            unauthorized()
        }
    }
}
