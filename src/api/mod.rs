// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ShopPulse

//! Router assembly.
//!
//! The authorization gate is layered over the `/api` subtree only, which
//! is exactly the surface the permission table describes. Health probes
//! and the Swagger UI sit outside it.

use axum::{
    http::Method,
    middleware,
    routing::{get, patch, post},
    Router,
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::gate::authorization_gate,
    auth::permissions::paths,
    models::{
        CreateDealRequest, CreateRedemptionRequest, CreateReferralRequest, CreateReviewRequest,
        CreateVisitRequest, Deal, LoginRequest, Notification, PartnerStat, PartnerStore,
        Redemption, RedemptionStatus, Referral, RefreshTokenRequest, Review, Reward,
        SendOtpRequest, SetPasswordRequest, UpdateDealRequest, UpdateProfileRequest,
        UpdateStoreRequest, User, VerifyOtpRequest, Visit, VisitStatus,
    },
    state::AppState,
};

pub mod auth;
pub mod consumer;
pub mod health;
pub mod meta;
pub mod partner;

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Auth
        .route(paths::LOGIN, post(auth::login))
        .route(paths::LOGOUT, post(auth::logout))
        .route(paths::SEND_OTP, post(auth::send_otp))
        .route(paths::VERIFY_OTP, post(auth::verify_otp))
        .route(paths::SET_PASSWORD, post(auth::set_password))
        .route(paths::REFRESH_TOKEN, post(auth::refresh_token))
        // Meta
        .route(paths::CATEGORIES, get(meta::categories))
        .route(paths::USER_TYPES, get(meta::user_types))
        // Consumer
        .route("/api/consumer/deals", get(consumer::list_deals))
        .route("/api/consumer/deals/{id}", get(consumer::deal_detail))
        .route("/api/consumer/stores", get(consumer::list_stores))
        .route("/api/consumer/stores/{id}", get(consumer::store_detail))
        .route("/api/consumer/rewards", get(consumer::rewards))
        .route("/api/consumer/redeem", post(consumer::redeem))
        .route("/api/consumer/redemptions", get(consumer::redemptions))
        .route(
            "/api/consumer/referrals",
            get(consumer::list_referrals).post(consumer::create_referral),
        )
        .route("/api/consumer/reviews", post(consumer::create_review))
        .route(
            "/api/consumer/visits",
            get(consumer::list_visits).post(consumer::create_visit),
        )
        .route(
            "/api/consumer/visits/{id}/complete",
            post(consumer::complete_visit),
        )
        .route("/api/consumer/notifications", get(consumer::list_notifications))
        .route(
            "/api/consumer/notifications/{id}",
            patch(consumer::mark_notification_read),
        )
        .route("/api/consumer/profile/{id}", patch(consumer::update_profile))
        // Partner
        .route(
            "/api/partner/store",
            get(partner::get_store).patch(partner::update_store),
        )
        .route(
            "/api/partner/deals",
            get(partner::list_deals).post(partner::create_deal),
        )
        .route(
            "/api/partner/deals/{id}",
            get(partner::deal_detail).patch(partner::update_deal),
        )
        .route(
            "/api/partner/deals/{id}/deactivate",
            post(partner::deactivate_deal),
        )
        .route("/api/partner/visits", get(partner::list_visits))
        .route(
            "/api/partner/visits/{id}/complete",
            post(partner::complete_visit),
        )
        .route("/api/partner/redemptions", get(partner::redemptions))
        .route("/api/partner/reviews", get(partner::reviews))
        .route("/api/partner/analytics", get(partner::analytics))
        .layer(middleware::from_fn_with_state(
            state.gate_state(),
            authorization_gate,
        ))
        .with_state(state.clone());

    let probes = Router::new()
        .route("/health", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .merge(api_routes)
        .merge(probes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
}

/// Every gate-covered route in permission-pattern form, for the startup
/// coverage audit.
pub fn registered_routes() -> Vec<(Method, &'static str)> {
    vec![
        (Method::POST, paths::LOGIN),
        (Method::POST, paths::LOGOUT),
        (Method::POST, paths::SEND_OTP),
        (Method::POST, paths::VERIFY_OTP),
        (Method::POST, paths::SET_PASSWORD),
        (Method::POST, paths::REFRESH_TOKEN),
        (Method::GET, paths::CATEGORIES),
        (Method::GET, paths::USER_TYPES),
        (Method::GET, paths::CONSUMER_DEALS),
        (Method::GET, paths::CONSUMER_DEAL_BY_ID),
        (Method::GET, paths::CONSUMER_STORES),
        (Method::GET, paths::CONSUMER_STORE_BY_ID),
        (Method::GET, paths::CONSUMER_REWARDS),
        (Method::POST, paths::CONSUMER_REDEEM),
        (Method::GET, paths::CONSUMER_REDEMPTIONS),
        (Method::GET, paths::CONSUMER_REFERRALS),
        (Method::POST, paths::CONSUMER_REFERRALS),
        (Method::POST, paths::CONSUMER_REVIEWS),
        (Method::GET, paths::CONSUMER_VISITS),
        (Method::POST, paths::CONSUMER_VISITS),
        (Method::POST, paths::CONSUMER_VISIT_COMPLETE),
        (Method::GET, paths::CONSUMER_NOTIFICATIONS),
        (Method::PATCH, paths::CONSUMER_NOTIFICATION_BY_ID),
        (Method::PATCH, paths::CONSUMER_PROFILE),
        (Method::GET, paths::PARTNER_STORE),
        (Method::PATCH, paths::PARTNER_STORE),
        (Method::GET, paths::PARTNER_DEALS),
        (Method::POST, paths::PARTNER_DEALS),
        (Method::GET, paths::PARTNER_DEAL_BY_ID),
        (Method::PATCH, paths::PARTNER_DEAL_BY_ID),
        (Method::POST, paths::PARTNER_DEAL_DEACTIVATE),
        (Method::GET, paths::PARTNER_VISITS),
        (Method::POST, paths::PARTNER_VISIT_COMPLETE),
        (Method::GET, paths::PARTNER_REDEMPTIONS),
        (Method::GET, paths::PARTNER_REVIEWS),
        (Method::GET, paths::PARTNER_ANALYTICS),
    ]
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::login,
        auth::logout,
        auth::send_otp,
        auth::verify_otp,
        auth::set_password,
        auth::refresh_token,
        meta::categories,
        meta::user_types,
        consumer::list_deals,
        consumer::deal_detail,
        consumer::list_stores,
        consumer::store_detail,
        consumer::rewards,
        consumer::redeem,
        consumer::redemptions,
        consumer::create_referral,
        consumer::list_referrals,
        consumer::create_review,
        consumer::create_visit,
        consumer::list_visits,
        consumer::complete_visit,
        consumer::list_notifications,
        consumer::mark_notification_read,
        consumer::update_profile,
        partner::get_store,
        partner::update_store,
        partner::list_deals,
        partner::create_deal,
        partner::deal_detail,
        partner::update_deal,
        partner::deactivate_deal,
        partner::list_visits,
        partner::complete_visit,
        partner::redemptions,
        partner::reviews,
        partner::analytics,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            User,
            PartnerStore,
            Deal,
            Visit,
            VisitStatus,
            Review,
            Reward,
            Redemption,
            RedemptionStatus,
            Referral,
            Notification,
            PartnerStat,
            LoginRequest,
            SendOtpRequest,
            VerifyOtpRequest,
            SetPasswordRequest,
            RefreshTokenRequest,
            UpdateProfileRequest,
            UpdateStoreRequest,
            CreateDealRequest,
            UpdateDealRequest,
            CreateVisitRequest,
            CreateReviewRequest,
            CreateRedemptionRequest,
            CreateReferralRequest,
            health::HealthResponse,
            health::ReadyResponse,
            health::HealthChecks,
            crate::auth::TokenPair,
            crate::auth::Role
        )
    ),
    tags(
        (name = "Auth", description = "Login, OTP verification and token refresh"),
        (name = "Consumer", description = "Deal browsing, rewards, visits and referrals"),
        (name = "Partner", description = "Store, deal and redemption management"),
        (name = "Meta", description = "Static lookups"),
        (name = "Health", description = "Probes")
    )
)]
struct ApiDoc;
