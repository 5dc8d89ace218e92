//! Bearer-token authentication against the external identity endpoint
//!
//! Handlers take an [`AuthUser`] argument; the extractor resolves the token
//! on every request and never trusts identity claims sent by the client.

use crate::{config::AuthConfig, error::AppError};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap, StatusCode},
};
use reqwest::Client;
use serde::Deserialize;
use uuid::Uuid;

/// The authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IdentityUser {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct IdentityClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl IdentityClient {
    pub fn new(http: Client, config: &AuthConfig) -> Self {
        Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    /// Resolve a bearer token via `GET {url}/user`
    #[tracing::instrument(skip(self, token))]
    pub async fn resolve(&self, token: &str) -> Result<AuthUser, AppError> {
        let mut req = self
            .http
            .get(format!("{}/user", self.base_url))
            .bearer_auth(token);

        if let Some(key) = &self.api_key {
            req = req.header("apikey", key);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| AppError::Identity(e.to_string()))?;

        match resp.status() {
            s if s.is_success() => {},
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Err(AppError::Unauthorized),
            s => {
                let body = resp.text().await.unwrap_or_default();
                return Err(AppError::Identity(format!("{}: {}", s, body)));
            },
        }

        let user: IdentityUser = resp
            .json()
            .await
            .map_err(|e| AppError::Identity(format!("Malformed user payload: {}", e)))?;

        tracing::debug!(user_id = %user.id, "Bearer token resolved");

        Ok(AuthUser {
            id: user.id,
            email: user.email.map(|e| e.to_lowercase()),
        })
    }
}

/// Extract the token from `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    IdentityClient: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(AppError::Unauthorized)?;
        let client = IdentityClient::from_ref(state);
        client.resolve(token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        map
    }

    #[test]
    fn test_bearer_token_parsed() {
        assert_eq!(bearer_token(&headers("Bearer abc.def")), Some("abc.def"));
        assert_eq!(bearer_token(&headers("bearer  xyz ")), Some("xyz"));
    }

    #[test]
    fn test_bearer_token_rejects_other_schemes() {
        assert_eq!(bearer_token(&headers("Basic dXNlcg==")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&headers("Bearer")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
