// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ShopPulse

//! Token issuance and verification.
//!
//! Two credential classes share one claims shape but carry independent
//! signing material and lifetimes: access tokens (short-lived) and refresh
//! tokens (long-lived). Verification is pure computation; failures are
//! returned as [`AuthError`] values, never raised.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::{
    ACCESS_TOKEN_TTL_SECS, INSECURE_FALLBACK_SECRET, JWT_SECRET_ENV, REFRESH_TOKEN_SECRET_ENV,
    REFRESH_TOKEN_TTL_SECS,
};

use super::claims::TokenClaims;
use super::error::AuthError;
use super::roles::Role;

/// An access/refresh token pair returned by login, OTP verification and
/// token refresh.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Short-lived bearer credential for API calls.
    pub access_token: String,
    /// Long-lived credential for obtaining new pairs.
    pub refresh_token: String,
}

/// Signing material and lifetimes for both credential classes.
///
/// Modeled as explicit injected configuration so the insecure fallback
/// chain is visible data rather than a default buried in signing code.
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl_secs: i64,
    pub refresh_ttl_secs: i64,
}

impl SecurityConfig {
    /// Build a config with the default lifetimes (1 day / 7 days).
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            access_ttl_secs: ACCESS_TOKEN_TTL_SECS,
            refresh_ttl_secs: REFRESH_TOKEN_TTL_SECS,
        }
    }

    /// Load secrets from the environment, applying the fallback chain:
    /// refresh secret → access secret → hardcoded literal.
    ///
    /// Engaged fallbacks are logged so an incomplete deployment cannot run
    /// with collapsed credential separation silently.
    pub fn from_env() -> Self {
        let access = std::env::var(JWT_SECRET_ENV).ok().filter(|s| !s.is_empty());
        let refresh = std::env::var(REFRESH_TOKEN_SECRET_ENV)
            .ok()
            .filter(|s| !s.is_empty());

        if access.is_none() {
            tracing::warn!(
                "{JWT_SECRET_ENV} is not set; falling back to the built-in insecure secret"
            );
        }
        if refresh.is_none() {
            tracing::warn!(
                "{REFRESH_TOKEN_SECRET_ENV} is not set; refresh tokens share the access secret"
            );
        }

        let (access_secret, refresh_secret) = resolve_secrets(access, refresh);
        Self::new(access_secret, refresh_secret)
    }

    /// Whether the hardcoded fallback secret is in use for either class.
    pub fn uses_fallback_secret(&self) -> bool {
        self.access_secret == INSECURE_FALLBACK_SECRET
            || self.refresh_secret == INSECURE_FALLBACK_SECRET
    }
}

/// Apply the secret fallback chain.
///
/// The refresh secret defaults to the access secret, and both default to
/// the hardcoded literal when unset.
fn resolve_secrets(access: Option<String>, refresh: Option<String>) -> (String, String) {
    let access_secret = access.unwrap_or_else(|| INSECURE_FALLBACK_SECRET.to_string());
    let refresh_secret = refresh.unwrap_or_else(|| access_secret.clone());
    (access_secret, refresh_secret)
}

/// Issues and verifies signed credentials. Stateless; safe to share.
#[derive(Debug, Clone)]
pub struct TokenService {
    config: SecurityConfig,
}

impl TokenService {
    pub fn new(config: SecurityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SecurityConfig {
        &self.config
    }

    /// Issue an access/refresh pair embedding the same claims, each signed
    /// with its own secret and lifetime.
    pub fn issue_token_pair(
        &self,
        user_id: i64,
        email: &str,
        role: Role,
    ) -> Result<TokenPair, AuthError> {
        self.issue_token_pair_at(user_id, email, role, Utc::now())
    }

    /// Deterministic variant of [`Self::issue_token_pair`] used by tests.
    pub fn issue_token_pair_at(
        &self,
        user_id: i64,
        email: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, AuthError> {
        let access_token = self.sign(
            user_id,
            email,
            role,
            now,
            self.config.access_ttl_secs,
            &self.config.access_secret,
        )?;
        let refresh_token = self.sign(
            user_id,
            email,
            role,
            now,
            self.config.refresh_ttl_secs,
            &self.config.refresh_secret,
        )?;
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    fn sign(
        &self,
        user_id: i64,
        email: &str,
        role: Role,
        now: DateTime<Utc>,
        ttl_secs: i64,
        secret: &str,
    ) -> Result<String, AuthError> {
        let iat = now.timestamp();
        let claims = TokenClaims {
            user_id,
            email: email.to_string(),
            role,
            iat,
            exp: iat + ttl_secs,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|e| {
            tracing::error!("failed to encode token: {e}");
            AuthError::Internal
        })
    }

    /// Verify signature and expiry against the access secret.
    pub fn verify_access_token(&self, token: &str) -> Result<TokenClaims, AuthError> {
        verify(token, &self.config.access_secret).map_err(|_| AuthError::InvalidToken)
    }

    /// Verify signature and expiry against the refresh secret.
    pub fn verify_refresh_token(&self, token: &str) -> Result<TokenClaims, AuthError> {
        verify(token, &self.config.refresh_secret).map_err(|_| AuthError::InvalidRefreshToken)
    }
}

fn verify(token: &str, secret: &str) -> Result<TokenClaims, jsonwebtoken::errors::Error> {
    // Expiry is exact: no leeway window.
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn service() -> TokenService {
        TokenService::new(SecurityConfig::new("access-secret", "refresh-secret"))
    }

    #[test]
    fn round_trip_recovers_claims_exactly() {
        let svc = service();
        let pair = svc
            .issue_token_pair(42, "buyer@example.com", Role::Buyer)
            .unwrap();

        let claims = svc.verify_access_token(&pair.access_token).unwrap();
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.email, "buyer@example.com");
        assert_eq!(claims.role, Role::Buyer);
        assert_eq!(claims.exp, claims.iat + ACCESS_TOKEN_TTL_SECS);

        let refresh_claims = svc.verify_refresh_token(&pair.refresh_token).unwrap();
        assert_eq!(refresh_claims.user_id, 42);
        assert_eq!(refresh_claims.exp, refresh_claims.iat + REFRESH_TOKEN_TTL_SECS);
    }

    #[test]
    fn access_and_refresh_secrets_are_independent() {
        let svc = service();
        let pair = svc.issue_token_pair(1, "a@example.com", Role::Admin).unwrap();

        // Crossing the verifiers must fail when the secrets differ.
        assert_eq!(
            svc.verify_access_token(&pair.refresh_token).unwrap_err(),
            AuthError::InvalidToken
        );
        assert_eq!(
            svc.verify_refresh_token(&pair.access_token).unwrap_err(),
            AuthError::InvalidRefreshToken
        );
    }

    #[test]
    fn expired_access_token_is_rejected() {
        let svc = service();
        let issued = Utc::now() - Duration::seconds(ACCESS_TOKEN_TTL_SECS + 5);
        let pair = svc
            .issue_token_pair_at(7, "late@example.com", Role::Seller, issued)
            .unwrap();

        assert_eq!(
            svc.verify_access_token(&pair.access_token).unwrap_err(),
            AuthError::InvalidToken
        );
    }

    #[test]
    fn token_near_expiry_boundary() {
        let svc = service();

        // Still inside the window: verifies.
        let issued = Utc::now() - Duration::seconds(ACCESS_TOKEN_TTL_SECS - 30);
        let pair = svc
            .issue_token_pair_at(7, "edge@example.com", Role::Buyer, issued)
            .unwrap();
        assert!(svc.verify_access_token(&pair.access_token).is_ok());

        // Just past the window: rejected.
        let issued = Utc::now() - Duration::seconds(ACCESS_TOKEN_TTL_SECS + 30);
        let pair = svc
            .issue_token_pair_at(7, "edge@example.com", Role::Buyer, issued)
            .unwrap();
        assert!(svc.verify_access_token(&pair.access_token).is_err());
    }

    #[test]
    fn wrong_secret_fails_verification() {
        let minting = TokenService::new(SecurityConfig::new("secret-a", "secret-a"));
        let verifying = TokenService::new(SecurityConfig::new("secret-b", "secret-b"));

        let pair = minting.issue_token_pair(3, "x@example.com", Role::Buyer).unwrap();
        assert_eq!(
            verifying.verify_access_token(&pair.access_token).unwrap_err(),
            AuthError::InvalidToken
        );
    }

    #[test]
    fn garbage_token_is_invalid_not_a_panic() {
        let svc = service();
        assert_eq!(
            svc.verify_access_token("not-a-jwt").unwrap_err(),
            AuthError::InvalidToken
        );
        assert_eq!(
            svc.verify_refresh_token("").unwrap_err(),
            AuthError::InvalidRefreshToken
        );
    }

    #[test]
    fn secret_fallback_chain_order() {
        // Both set: kept as-is.
        let (a, r) = super::resolve_secrets(Some("acc".into()), Some("ref".into()));
        assert_eq!((a.as_str(), r.as_str()), ("acc", "ref"));

        // Refresh unset: falls back to the access secret.
        let (a, r) = super::resolve_secrets(Some("acc".into()), None);
        assert_eq!((a.as_str(), r.as_str()), ("acc", "acc"));

        // Both unset: hardcoded literal for both.
        let (a, r) = super::resolve_secrets(None, None);
        assert_eq!(a, INSECURE_FALLBACK_SECRET);
        assert_eq!(r, INSECURE_FALLBACK_SECRET);
    }

    #[test]
    fn fallback_secret_is_reported() {
        let config = SecurityConfig::new(INSECURE_FALLBACK_SECRET, INSECURE_FALLBACK_SECRET);
        assert!(config.uses_fallback_secret());

        let config = SecurityConfig::new("real", "real");
        assert!(!config.uses_fallback_secret());
    }

    #[test]
    fn collapsed_secrets_cross_verify() {
        // With the fallback engaged both classes share a secret, so a
        // refresh token passes the access verifier. Deployment hazard, not
        // a code path we block.
        let svc = TokenService::new(SecurityConfig::new("shared", "shared"));
        let pair = svc.issue_token_pair(9, "s@example.com", Role::Buyer).unwrap();
        assert!(svc.verify_access_token(&pair.refresh_token).is_ok());
    }
}
