// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ShopPulse

//! Axum extractor for the authenticated user.
//!
//! Handlers re-derive identity themselves instead of trusting the gate's
//! attached headers: the bearer token is verified again and the full user
//! record is loaded from the store. Both this path and the gate run on
//! every protected request; they must agree on the subject.
//!
//! ```rust,ignore
//! async fn my_handler(user: CurrentUser) -> impl IntoResponse {
//!     let user = user.require_role(Role::Buyer)?;
//!     // ...
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::ApiError;
use crate::models::User;
use crate::state::AppState;

use super::roles::Role;

/// Extractor that resolves the caller to a stored user record.
///
/// Rejection is a plain 401 "Unauthorized" envelope; handlers never see
/// which step failed, mirroring the null-collapsing lookup this replaces.
#[derive(Debug)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    /// The user, provided their role matches exactly.
    ///
    /// Role mismatches are 401 here (not 403): the handler-side check
    /// treats a wrong-role caller as unauthenticated. The gate's
    /// permission table is where 403s come from.
    pub fn require_role(self, role: Role) -> Result<User, ApiError> {
        if self.0.role != role {
            return Err(ApiError::unauthorized("Unauthorized"));
        }
        Ok(self.0)
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let unauthorized = || ApiError::unauthorized("Unauthorized");

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(unauthorized)?;

        let token = header.strip_prefix("Bearer ").ok_or_else(unauthorized)?;

        let claims = state
            .tokens
            .verify_access_token(token)
            .map_err(|_| unauthorized())?;

        let user = state
            .store
            .read()
            .await
            .find_user_by_id(claims.user_id)
            .ok_or_else(unauthorized)?;

        Ok(CurrentUser(user))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    async fn seeded_state() -> (AppState, User, String) {
        let state = AppState::default();
        let user = state
            .store
            .write()
            .await
            .create_user("buyer@example.com", Role::Buyer);
        let pair = state
            .tokens
            .issue_token_pair(user.id, &user.email, user.role)
            .unwrap();
        (state, user, pair.access_token)
    }

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/consumer/rewards");
        if let Some(value) = value {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn resolves_stored_user_from_token() {
        let (state, user, token) = seeded_state().await;
        let mut parts = parts_with_auth(Some(&format!("Bearer {token}")));

        let CurrentUser(found) = CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .expect("extraction succeeds");
        assert_eq!(found.id, user.id);
        assert_eq!(found.email, "buyer@example.com");
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let (state, _, _) = seeded_state().await;
        let mut parts = parts_with_auth(None);

        let err = CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::UNAUTHORIZED);
        assert_eq!(err.message, "Unauthorized");
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_unauthorized() {
        let (state, _, _) = seeded_state().await;
        let mut parts = parts_with_auth(Some("Basic dXNlcjpwdw=="));

        assert!(CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn token_for_deleted_user_is_unauthorized() {
        let (state, _, _) = seeded_state().await;
        // Valid signature, but no such user in the store.
        let pair = state
            .tokens
            .issue_token_pair(9999, "ghost@example.com", Role::Buyer)
            .unwrap();
        let mut parts = parts_with_auth(Some(&format!("Bearer {}", pair.access_token)));

        assert!(CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn require_role_is_strict_equality() {
        let (state, _, token) = seeded_state().await;
        let mut parts = parts_with_auth(Some(&format!("Bearer {token}")));
        let current = CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap();

        // Buyer passes a buyer check...
        let user = current.require_role(Role::Buyer).unwrap();
        assert_eq!(user.role, Role::Buyer);

        // ...but a seller check rejects with 401, not 403.
        let mut parts = parts_with_auth(Some(&format!("Bearer {token}")));
        let current = CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        let err = current.require_role(Role::Seller).unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::UNAUTHORIZED);
    }
}
