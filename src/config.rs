// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ShopPulse

//! # Runtime Configuration Constants
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `JWT_SECRET` | HS256 signing secret for access tokens | insecure fallback |
//! | `REFRESH_TOKEN_SECRET` | HS256 signing secret for refresh tokens | `JWT_SECRET` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

/// Environment variable name for the server bind address.
pub const HOST_ENV: &str = "HOST";

/// Environment variable name for the server bind port.
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the access-token signing secret.
///
/// When unset, [`crate::auth::tokens::SecurityConfig::from_env`] falls back
/// to [`INSECURE_FALLBACK_SECRET`] and logs a warning. Production
/// deployments must set this.
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";

/// Environment variable name for the refresh-token signing secret.
///
/// Falls back to `JWT_SECRET`, then to [`INSECURE_FALLBACK_SECRET`]. An
/// incomplete deployment therefore collapses the two credential classes onto
/// one key; the fallback is reported at startup so it cannot engage silently.
pub const REFRESH_TOKEN_SECRET_ENV: &str = "REFRESH_TOKEN_SECRET";

/// Hardcoded last-resort signing secret.
///
/// Kept for parity with environments that boot without any secret
/// configured. Never rely on it outside local development.
pub const INSECURE_FALLBACK_SECRET: &str = "your-secret-key";

/// Environment variable selecting the log output format (`json` or `pretty`).
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Environment variable naming an admin account to create at startup.
/// Optional; useful for fresh deployments of the in-memory store.
pub const SEED_ADMIN_EMAIL_ENV: &str = "SEED_ADMIN_EMAIL";

/// Access-token lifetime in seconds (1 day).
pub const ACCESS_TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// Refresh-token lifetime in seconds (7 days).
pub const REFRESH_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// OTP lifetime in seconds (3 minutes).
pub const OTP_TTL_SECS: i64 = 3 * 60;
