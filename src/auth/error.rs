// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ShopPulse

//! Authorization error taxonomy.
//!
//! Every rejection the gate can produce is a variant here; the gate turns
//! them into terminal envelope responses and never lets a fault escape to
//! the transport layer as a panic.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::response::ApiResponse;

/// Authorization failure.
///
/// Verification failures are values, not panics; callers branch on the
/// variant. Messages are part of the public API contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No Authorization header on a protected route.
    #[error("Authorization header is required")]
    MissingAuthHeader,

    /// Header present but empty after stripping the `Bearer ` prefix.
    #[error("Token is required")]
    MissingToken,

    /// Access-token verification failed (malformed, expired, bad signature).
    #[error("Invalid token")]
    InvalidToken,

    /// Refresh-token verification failed.
    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    /// Verified identity's role is not in the route's allowed set.
    #[error("User does not have permission for this route")]
    InsufficientRole,

    /// Unexpected fault during gate processing.
    #[error("Something went wrong.")]
    Internal,
}

impl AuthError {
    /// HTTP status for this rejection.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingAuthHeader
            | AuthError::MissingToken
            | AuthError::InvalidToken
            | AuthError::InvalidRefreshToken => StatusCode::UNAUTHORIZED,
            AuthError::InsufficientRole => StatusCode::FORBIDDEN,
            AuthError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiResponse::failure(self.to_string(), self.status_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn status_mapping_follows_taxonomy() {
        assert_eq!(
            AuthError::MissingAuthHeader.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AuthError::MissingToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::InvalidToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AuthError::InvalidRefreshToken.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::InsufficientRole.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AuthError::Internal.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn missing_header_renders_envelope() {
        let response = AuthError::MissingAuthHeader.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Authorization header is required");
    }

    #[tokio::test]
    async fn insufficient_role_returns_403() {
        let response = AuthError::InsufficientRole.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["message"], "User does not have permission for this route");
    }
}
