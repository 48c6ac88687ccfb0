// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ShopPulse

//! Static lookup endpoints: business categories and user types.

use axum::{http::StatusCode, response::Response};

use crate::response::ApiResponse;

/// Categories a partner store or deal can belong to.
pub const BUSINESS_CATEGORIES: &[&str] =
    &["Food", "Cafe", "Restaurant", "Salon", "Spa", "Retail", "Other"];

/// Account kinds selectable at signup.
pub const USER_TYPES: &[&str] = &["consumer", "partner"];

#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "Meta",
    responses((status = 200, description = "Business categories"))
)]
pub async fn categories() -> Response {
    ApiResponse::success(
        "Categories fetched successfully",
        StatusCode::OK,
        BUSINESS_CATEGORIES,
    )
}

#[utoipa::path(
    get,
    path = "/api/user-types",
    tag = "Meta",
    responses((status = 200, description = "User types"))
)]
pub async fn user_types() -> Response {
    ApiResponse::success("User types fetched successfully", StatusCode::OK, USER_TYPES)
}
