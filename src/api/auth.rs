// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ShopPulse

//! Authentication endpoints: password login, the OTP flow, and token
//! refresh. Login, send-otp and verify-otp are public paths; the rest sit
//! behind the gate.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::State, http::StatusCode, response::Response, Json};
use chrono::Utc;

use crate::{
    error::ApiError,
    models::{LoginRequest, RefreshTokenRequest, SendOtpRequest, SetPasswordRequest, VerifyOtpRequest},
    otp,
    response::ApiResponse,
    state::AppState,
    validate,
};

fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::internal(format!("Failed to hash password: {e}")))
}

fn password_matches(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    tag = "Auth",
    responses(
        (status = 200, description = "Login successful, returns token pair"),
        (status = 400, description = "Email and password are required"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let (Some(email), Some(password)) = (request.email, request.password) else {
        return Err(ApiError::bad_request("Email and password are required"));
    };
    if email.is_empty() || password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let user = state
        .store
        .read()
        .await
        .find_user_by_email(&email)
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    let stored_hash = user
        .password_hash
        .as_deref()
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;
    if !password_matches(&password, stored_hash) {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let tokens = state
        .tokens
        .issue_token_pair(user.id, &user.email, user.role)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(ApiResponse::success("Login successful", StatusCode::OK, tokens))
}

#[utoipa::path(
    post,
    path = "/api/auth/send-otp",
    request_body = SendOtpRequest,
    tag = "Auth",
    responses(
        (status = 201, description = "OTP sent"),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn send_otp(
    State(state): State<AppState>,
    Json(request): Json<SendOtpRequest>,
) -> Result<Response, ApiError> {
    let email = validate::require_email(&request.email)?;
    let role = validate::require_role(&request.role)?;

    let code = otp::generate_code();
    {
        let mut store = state.store.write().await;
        if store.find_user_by_email(&email).is_none() {
            store.create_user(&email, role);
        }
        store.put_otp(&email, &code, otp::expiry_from(Utc::now()));
    }
    state.mailer.send_otp(&email, &code);

    Ok(ApiResponse::success(
        "OTP sent successfully to your email",
        StatusCode::CREATED,
        (),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/verify-otp",
    request_body = VerifyOtpRequest,
    tag = "Auth",
    responses(
        (status = 200, description = "OTP verified, returns token pair"),
        (status = 400, description = "Validation failed, unknown user or bad code")
    )
)]
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(request): Json<VerifyOtpRequest>,
) -> Result<Response, ApiError> {
    let email = validate::require_email(&request.email)?;
    let code = validate::require_otp(&request.otp)?;
    let role = validate::optional_role(&request.role)?;

    let user = {
        let mut store = state.store.write().await;
        let user = store.find_user_by_email(&email).ok_or_else(|| {
            if role.is_some() {
                ApiError::bad_request("User not found with the provided email and role")
            } else {
                ApiError::bad_request("User not found. Please send OTP first")
            }
        })?;

        if !store.verify_and_consume_otp(&email, &code, Utc::now()) {
            return Err(ApiError::bad_request("Invalid or expired OTP"));
        }
        user
    };

    let tokens = state
        .tokens
        .issue_token_pair(user.id, &user.email, user.role)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(ApiResponse::success(
        "OTP verified successfully",
        StatusCode::OK,
        tokens,
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/setPassword",
    request_body = SetPasswordRequest,
    tag = "Auth",
    responses(
        (status = 200, description = "Password set"),
        (status = 400, description = "Missing fields, weak password or unknown user")
    )
)]
pub async fn set_password(
    State(state): State<AppState>,
    Json(request): Json<SetPasswordRequest>,
) -> Result<Response, ApiError> {
    let (Some(email), Some(password)) = (request.email, request.password) else {
        return Err(ApiError::bad_request("Email and password are required"));
    };
    if email.is_empty() || password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }
    validate::validate_password(&password)?;

    let hash = hash_password(&password)?;
    state.store.write().await.set_password(&email, &hash)?;

    Ok(ApiResponse::success(
        "Password set successfully",
        StatusCode::OK,
        (),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/refreshTocken",
    request_body = RefreshTokenRequest,
    tag = "Auth",
    responses(
        (status = 200, description = "Token refreshed, returns new pair"),
        (status = 400, description = "Refresh token missing"),
        (status = 401, description = "Invalid refresh token")
    )
)]
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(request): Json<RefreshTokenRequest>,
) -> Result<Response, ApiError> {
    let token = request
        .refresh_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::bad_request("Refresh token missing"))?;

    let claims = state
        .tokens
        .verify_refresh_token(&token)
        .map_err(|e| ApiError::unauthorized(e.to_string()))?;

    let tokens = state
        .tokens
        .issue_token_pair(claims.user_id, &claims.email, claims.role)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(ApiResponse::success("Token refreshed", StatusCode::OK, tokens))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses((status = 200, description = "Logged out"))
)]
pub async fn logout() -> Response {
    // Stateless JWT flow: the client discards its tokens. Nothing to
    // revoke server-side.
    ApiResponse::success(
        "Logged out (client should delete token/cookie)",
        StatusCode::OK,
        (),
    )
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;
    use crate::auth::{Role, TokenPair};

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn token_pair(value: &serde_json::Value) -> TokenPair {
        serde_json::from_value(value["data"].clone()).expect("token pair in data")
    }

    #[tokio::test]
    async fn send_otp_creates_user_and_stores_code() {
        let state = AppState::default();
        let response = send_otp(
            State(state.clone()),
            Json(SendOtpRequest {
                email: Some("new@example.com".into()),
                role: Some("BUYER".into()),
            }),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["message"], "OTP sent successfully to your email");

        let store = state.store.read().await;
        let user = store.find_user_by_email("new@example.com").unwrap();
        assert_eq!(user.role, Role::Buyer);
        assert!(!user.is_verified);
    }

    #[tokio::test]
    async fn send_otp_rejects_bad_role() {
        let state = AppState::default();
        let err = send_otp(
            State(state),
            Json(SendOtpRequest {
                email: Some("new@example.com".into()),
                role: Some("WIZARD".into()),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.message.contains("Invalid role"));
    }

    #[tokio::test]
    async fn verify_otp_round_trip_issues_tokens() {
        let state = AppState::default();
        send_otp(
            State(state.clone()),
            Json(SendOtpRequest {
                email: Some("buyer@example.com".into()),
                role: Some("BUYER".into()),
            }),
        )
        .await
        .unwrap();

        // Read the stored code the way the mailer would have received it.
        let code = {
            let mut store = state.store.write().await;
            // Codes are consumed on success, so fetch via a fresh put: the
            // test replaces the code with a known one instead.
            store.put_otp(
                "buyer@example.com",
                "123456",
                otp::expiry_from(Utc::now()),
            );
            "123456".to_string()
        };

        let response = verify_otp(
            State(state.clone()),
            Json(VerifyOtpRequest {
                email: Some("buyer@example.com".into()),
                otp: Some(code),
                role: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["message"], "OTP verified successfully");

        let pair = token_pair(&body);
        let claims = state.tokens.verify_access_token(&pair.access_token).unwrap();
        assert_eq!(claims.email, "buyer@example.com");
        assert_eq!(claims.role, Role::Buyer);
    }

    #[tokio::test]
    async fn verify_otp_unknown_user_message_depends_on_role() {
        let state = AppState::default();

        let err = verify_otp(
            State(state.clone()),
            Json(VerifyOtpRequest {
                email: Some("ghost@example.com".into()),
                otp: Some("123456".into()),
                role: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.message, "User not found. Please send OTP first");

        let err = verify_otp(
            State(state),
            Json(VerifyOtpRequest {
                email: Some("ghost@example.com".into()),
                otp: Some("123456".into()),
                role: Some("BUYER".into()),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.message, "User not found with the provided email and role");
    }

    #[tokio::test]
    async fn verify_otp_bad_code_is_rejected() {
        let state = AppState::default();
        state
            .store
            .write()
            .await
            .create_user("buyer@example.com", Role::Buyer);
        state.store.write().await.put_otp(
            "buyer@example.com",
            "123456",
            otp::expiry_from(Utc::now()),
        );

        let err = verify_otp(
            State(state),
            Json(VerifyOtpRequest {
                email: Some("buyer@example.com".into()),
                otp: Some("000000".into()),
                role: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.message, "Invalid or expired OTP");
    }

    #[tokio::test]
    async fn set_password_then_login() {
        let state = AppState::default();
        state
            .store
            .write()
            .await
            .create_user("buyer@example.com", Role::Buyer);

        let response = set_password(
            State(state.clone()),
            Json(SetPasswordRequest {
                email: Some("buyer@example.com".into()),
                password: Some("Sup3rSecret".into()),
            }),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Wrong password rejected.
        let err = login(
            State(state.clone()),
            Json(LoginRequest {
                email: Some("buyer@example.com".into()),
                password: Some("WrongPass1".into()),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.message, "Invalid credentials");

        // Correct password returns a usable token pair.
        let response = login(
            State(state.clone()),
            Json(LoginRequest {
                email: Some("buyer@example.com".into()),
                password: Some("Sup3rSecret".into()),
            }),
        )
        .await
        .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["message"], "Login successful");
        let pair = token_pair(&body);
        assert!(state.tokens.verify_access_token(&pair.access_token).is_ok());
    }

    #[tokio::test]
    async fn login_requires_both_fields() {
        let state = AppState::default();
        let err = login(
            State(state),
            Json(LoginRequest {
                email: Some("buyer@example.com".into()),
                password: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.message, "Email and password are required");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn login_unknown_user_is_invalid_credentials() {
        let state = AppState::default();
        let err = login(
            State(state),
            Json(LoginRequest {
                email: Some("nobody@example.com".into()),
                password: Some("Whatever1".into()),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn set_password_enforces_policy() {
        let state = AppState::default();
        state
            .store
            .write()
            .await
            .create_user("buyer@example.com", Role::Buyer);

        let err = set_password(
            State(state),
            Json(SetPasswordRequest {
                email: Some("buyer@example.com".into()),
                password: Some("weak".into()),
            }),
        )
        .await
        .unwrap_err();
        assert!(err.message.contains("Password must be at least 8 characters"));
    }

    #[tokio::test]
    async fn refresh_rotates_the_pair() {
        let state = AppState::default();
        let pair = state
            .tokens
            .issue_token_pair(5, "buyer@example.com", Role::Buyer)
            .unwrap();

        let response = refresh_token(
            State(state.clone()),
            Json(RefreshTokenRequest {
                refresh_token: Some(pair.refresh_token),
            }),
        )
        .await
        .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["message"], "Token refreshed");

        let new_pair = token_pair(&body);
        let claims = state
            .tokens
            .verify_access_token(&new_pair.access_token)
            .unwrap();
        assert_eq!(claims.user_id, 5);
        assert_eq!(claims.role, Role::Buyer);
    }

    #[tokio::test]
    async fn refresh_rejects_missing_and_invalid_tokens() {
        let state = AppState::default();

        let err = refresh_token(
            State(state.clone()),
            Json(RefreshTokenRequest { refresh_token: None }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.message, "Refresh token missing");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err = refresh_token(
            State(state),
            Json(RefreshTokenRequest {
                refresh_token: Some("bogus".into()),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.message, "Invalid refresh token");
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn access_token_is_not_a_valid_refresh_token() {
        // The default test state collapses both secrets onto the fallback,
        // so use a service with distinct secrets here.
        let distinct = crate::auth::TokenService::new(crate::auth::SecurityConfig::new(
            "access-only",
            "refresh-only",
        ));
        let pair = distinct
            .issue_token_pair(5, "b@example.com", Role::Buyer)
            .unwrap();
        assert!(distinct.verify_refresh_token(&pair.access_token).is_err());
    }
}
