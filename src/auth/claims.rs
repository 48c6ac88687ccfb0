// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ShopPulse

//! JWT claims and the per-request identity derived from them.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::roles::Role;

/// Claims embedded in both access and refresh tokens.
///
/// Wire format keeps the `userId` key for compatibility with existing
/// clients. `iat`/`exp` are seconds since the Unix epoch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    /// Subject: the user's numeric id.
    #[serde(rename = "userId")]
    pub user_id: i64,

    /// Contact identifier (email) at issue time.
    pub email: String,

    /// Role at issue time.
    pub role: Role,

    /// Issued-at timestamp.
    pub iat: i64,

    /// Expiry timestamp.
    pub exp: i64,
}

/// Verified identity attached to a request by the authorization gate.
///
/// Created after successful access-token verification, propagated to
/// downstream handlers as a request extension alongside the `x-user-id`,
/// `x-user-role` and `x-user-email` headers, and discarded at end of
/// request. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Identity {
    /// The user's numeric id.
    pub user_id: i64,
    /// The user's role.
    pub role: Role,
    /// The user's email.
    pub email: String,
}

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.user_id,
            role: claims.role,
            email: claims.email,
        }
    }
}
