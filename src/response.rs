// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ShopPulse

//! Shared JSON response envelope.
//!
//! Every endpoint answers the same shape:
//!
//! ```json
//! { "success": true, "statusCode": 200, "message": "...", "data": ... }
//! ```
//!
//! The HTTP status line mirrors the `statusCode` field. Rejections produced
//! by the authorization gate and handler errors use the same envelope with
//! `success: false` (see [`crate::error::ApiError`]).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// The uniform response body.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    /// Whether the request succeeded.
    pub success: bool,
    /// HTTP status code, duplicated in the body.
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    /// Human-readable outcome message.
    pub message: String,
    /// Payload, `null` when there is nothing to return.
    pub data: T,
}

/// Builder for envelope responses.
pub struct ApiResponse;

impl ApiResponse {
    /// Success envelope carrying `data`. Pass `()` for a `null` payload.
    pub fn success<T: Serialize>(
        message: impl Into<String>,
        status: StatusCode,
        data: T,
    ) -> Response {
        (
            status,
            Json(Envelope {
                success: true,
                status_code: status.as_u16(),
                message: message.into(),
                data,
            }),
        )
            .into_response()
    }

    /// Failure envelope with a `null` payload.
    pub fn failure(message: impl Into<String>, status: StatusCode) -> Response {
        (
            status,
            Json(Envelope {
                success: false,
                status_code: status.as_u16(),
                message: message.into(),
                data: (),
            }),
        )
            .into_response()
    }
}
