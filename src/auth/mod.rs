// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ShopPulse

//! # Authorization Module
//!
//! JWT authorization for the ShopPulse API.
//!
//! ## Request Flow
//!
//! 1. Client obtains a token pair via login or OTP verification
//! 2. Client sends `Authorization: Bearer <access token>`
//! 3. The gate middleware, on every API request:
//!    - short-circuits CORS preflight
//!    - exempts public paths
//!    - verifies signature and expiry (HS256)
//!    - checks the role against the route's permission entry
//!    - forwards the verified identity as `x-user-*` headers and a
//!      request extension
//! 4. Handlers re-derive the user independently via [`CurrentUser`]
//!
//! ## Notes
//!
//! - Routes missing from the permission table pass without a role check
//!   (fail-open); the startup audit logs each such route
//! - Token verification has no expiry leeway
//! - Refresh tokens share the access secret when `REFRESH_TOKEN_SECRET`
//!   is unset

pub mod claims;
pub mod error;
pub mod extractor;
pub mod gate;
pub mod permissions;
pub mod roles;
pub mod tokens;

pub use claims::{Identity, TokenClaims};
pub use error::AuthError;
pub use extractor::CurrentUser;
pub use roles::Role;
pub use tokens::{SecurityConfig, TokenPair, TokenService};
