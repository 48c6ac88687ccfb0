// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ShopPulse

//! Request body validation.
//!
//! Validation failures are reported through the shared envelope as
//! `Validation failed: <field>: <reason>` so client error handling stays
//! uniform across endpoints.

use crate::auth::Role;
use crate::error::ApiError;
use crate::models::UpdateProfileRequest;

fn validation_failed(field: &str, reason: &str) -> ApiError {
    ApiError::bad_request(format!("Validation failed: {field}: {reason}"))
}

fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !value.contains(char::is_whitespace)
}

/// Required, well-formed email. Returns the trimmed, lowercased form.
pub fn require_email(email: &Option<String>) -> Result<String, ApiError> {
    let email = email.as_deref().unwrap_or("").trim().to_lowercase();
    if email.is_empty() {
        return Err(validation_failed("email", "Email is required"));
    }
    if !is_valid_email(&email) {
        return Err(validation_failed("email", "Invalid email format"));
    }
    Ok(email)
}

/// Required role drawn from the closed enum.
pub fn require_role(role: &Option<String>) -> Result<Role, ApiError> {
    match role.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => Role::parse(value).ok_or_else(|| {
            validation_failed(
                "role",
                "Invalid role. Allowed roles: ADMIN, BUYER, SELLER, VISITOR",
            )
        }),
        _ => Err(validation_failed(
            "role",
            "Invalid role. Allowed roles: ADMIN, BUYER, SELLER, VISITOR",
        )),
    }
}

/// Optional role; present values must parse.
pub fn optional_role(role: &Option<String>) -> Result<Option<Role>, ApiError> {
    match role.as_deref().map(str::trim) {
        None => Ok(None),
        Some("") => Ok(None),
        Some(value) => Role::parse(value).map(Some).ok_or_else(|| {
            validation_failed(
                "role",
                "Invalid role. Allowed roles: ADMIN, BUYER, SELLER, VISITOR",
            )
        }),
    }
}

/// Required 6-digit OTP code.
pub fn require_otp(otp: &Option<String>) -> Result<String, ApiError> {
    let otp = otp.as_deref().unwrap_or("").trim().to_string();
    if otp.is_empty() {
        return Err(validation_failed("otp", "OTP is required"));
    }
    if otp.len() != 6 {
        return Err(validation_failed("otp", "OTP must be 6 digits"));
    }
    if !otp.chars().all(|c| c.is_ascii_digit()) {
        return Err(validation_failed("otp", "OTP must contain only digits"));
    }
    Ok(otp)
}

/// Password policy: 8..=100 characters with at least one lowercase letter,
/// one uppercase letter and one digit.
pub fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < 8 {
        return Err(validation_failed(
            "password",
            "Password must be at least 8 characters",
        ));
    }
    if password.len() > 100 {
        return Err(validation_failed(
            "password",
            "Password must not exceed 100 characters",
        ));
    }
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !(has_lower && has_upper && has_digit) {
        return Err(validation_failed(
            "password",
            "Password must contain at least one uppercase letter, one lowercase letter, and one number",
        ));
    }
    Ok(())
}

/// Profile updates must carry at least one field; present name fields must
/// be non-empty and bounded.
pub fn validate_profile_update(update: &UpdateProfileRequest) -> Result<(), ApiError> {
    if update.is_empty() {
        return Err(ApiError::bad_request(
            "At least one field must be provided for update",
        ));
    }
    if let Some(first_name) = &update.first_name {
        if first_name.is_empty() {
            return Err(validation_failed("firstName", "First name cannot be empty"));
        }
        if first_name.len() > 100 {
            return Err(validation_failed("firstName", "First name is too long"));
        }
    }
    if let Some(last_name) = &update.last_name {
        if last_name.is_empty() {
            return Err(validation_failed("lastName", "Last name cannot be empty"));
        }
        if last_name.len() > 100 {
            return Err(validation_failed("lastName", "Last name is too long"));
        }
    }
    if let Some(zip_code) = &update.zip_code {
        if zip_code.len() > 20 {
            return Err(validation_failed("zipCode", "Zip code is too long"));
        }
    }
    Ok(())
}
