use async_trait::async_trait;
use axum::extract::FromRef;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::AppState;

/// JWT claims carried by storefront tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

/// Identity extracted from a `Bearer` token. Any valid token is enough.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
}

/// Identity whose email is on the configured admin allow-list.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub user_id: Uuid,
    pub email: String,
}

pub fn issue_token(
    user_id: Uuid,
    email: &str,
    secret: &str,
    ttl: Duration,
) -> Result<String, ServiceError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        exp: (now + ttl).timestamp(),
        iat: now.timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ServiceError::InternalError(format!("token issuance failed: {e}")))
}

fn decode_bearer(parts: &Parts, secret: &str) -> Result<Claims, ServiceError> {
    let header = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ServiceError::Unauthorized("Missing authorization header".to_string()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ServiceError::Unauthorized("Expected a bearer token".to_string()))?
        .trim();

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        debug!("token rejected: {e}");
        ServiceError::Unauthorized("Invalid or expired token".to_string())
    })?;
    Ok(data.claims)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let claims = decode_bearer(parts, &app_state.config.jwt_secret)?;
        let user_id = claims
            .sub
            .parse::<Uuid>()
            .map_err(|_| ServiceError::Unauthorized("Malformed subject claim".to_string()))?;
        Ok(Self {
            user_id,
            email: claims.email,
        })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let claims = decode_bearer(parts, &app_state.config.jwt_secret)?;
        let user_id = claims
            .sub
            .parse::<Uuid>()
            .map_err(|_| ServiceError::Unauthorized("Malformed subject claim".to_string()))?;

        if !app_state.config.is_admin_email(&claims.email) {
            return Err(ServiceError::Forbidden(
                "Admin access required".to_string(),
            ));
        }
        Ok(Self {
            user_id,
            email: claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_tokens_decode_with_the_same_secret() {
        let user_id = Uuid::new_v4();
        let token = issue_token(user_id, "meera@doree.in", "a-secret-long-enough-for-tests", Duration::hours(1))
            .unwrap();
        let data = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"a-secret-long-enough-for-tests"),
            &Validation::default(),
        )
        .unwrap();
        assert_eq!(data.claims.sub, user_id.to_string());
        assert_eq!(data.claims.email, "meera@doree.in");
    }

    #[test]
    fn tokens_do_not_decode_under_a_different_secret() {
        let token = issue_token(
            Uuid::new_v4(),
            "meera@doree.in",
            "a-secret-long-enough-for-tests",
            Duration::hours(1),
        )
        .unwrap();
        assert!(decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"a-different-secret-entirely-here"),
            &Validation::default(),
        )
        .is_err());
    }
}
