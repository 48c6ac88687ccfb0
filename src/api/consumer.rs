// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ShopPulse

//! Consumer endpoints: deal and store browsing (public), rewards,
//! redemptions, referrals, reviews, visits, notifications and profile
//! updates (buyer-gated).
//!
//! Browsing handlers take no identity at all. Account handlers re-derive
//! the caller via [`CurrentUser`] and require the BUYER role directly,
//! independent of the gate's permission table.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    auth::{CurrentUser, Role},
    error::ApiError,
    models::{
        CreateRedemptionRequest, CreateReferralRequest, CreateReviewRequest, CreateVisitRequest,
        DealDetail, DealSummary, DealWithStore, RedemptionWithContext, RewardsOverview,
        StoreDetail, StoreSummary, UpdateProfileRequest, ReviewWithUser, UserSummary,
        VisitWithContext,
    },
    response::ApiResponse,
    state::AppState,
    store::VISIT_REWARD_POINTS,
    validate,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct DealListQuery {
    /// Free-text search over name and description.
    pub query: Option<String>,
    /// Restrict to one category.
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct StoreListQuery {
    pub query: Option<String>,
    pub category: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    /// Search radius in kilometers (default 10).
    pub radius: Option<f64>,
}

#[utoipa::path(
    get,
    path = "/api/consumer/deals",
    params(DealListQuery),
    tag = "Consumer",
    responses((status = 200, description = "Active deals with store summaries"))
)]
pub async fn list_deals(
    State(state): State<AppState>,
    Query(params): Query<DealListQuery>,
) -> Response {
    let store = state.store.read().await;
    let deals = if let Some(category) = params.category.as_deref() {
        store.deals_by_category(category)
    } else if let Some(query) = params.query.as_deref() {
        store.search_deals(query)
    } else {
        store.active_deals()
    };

    let deals_with_store: Vec<DealWithStore> = deals
        .into_iter()
        .map(|deal| {
            let summary = store
                .partner_store_by_id(deal.partner_id)
                .map(|s| StoreSummary::from_store(&s));
            DealWithStore {
                deal,
                store: summary,
            }
        })
        .collect();

    ApiResponse::success("Deals fetched successfully", StatusCode::OK, deals_with_store)
}

#[utoipa::path(
    get,
    path = "/api/consumer/deals/{id}",
    tag = "Consumer",
    responses(
        (status = 200, description = "Deal detail with its store"),
        (status = 404, description = "Deal not found")
    )
)]
pub async fn deal_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let mut store = state.store.write().await;
    let deal = store
        .deal_by_id(id)
        .ok_or_else(|| ApiError::not_found("Deal not found"))?;

    store.increment_deal_views(deal.partner_id);
    let partner = store.partner_store_by_id(deal.partner_id);

    Ok(ApiResponse::success(
        "Deal details fetched successfully",
        StatusCode::OK,
        DealDetail {
            deal,
            store: partner,
        },
    ))
}

#[utoipa::path(
    get,
    path = "/api/consumer/stores",
    params(StoreListQuery),
    tag = "Consumer",
    responses((status = 200, description = "Stores matching the filters"))
)]
pub async fn list_stores(
    State(state): State<AppState>,
    Query(params): Query<StoreListQuery>,
) -> Response {
    let store = state.store.read().await;
    let stores = match (params.lat, params.lng) {
        (Some(lat), Some(lng)) => {
            store.nearby_partner_stores(lat, lng, params.radius.unwrap_or(10.0))
        }
        _ => {
            if let Some(category) = params.category.as_deref() {
                store.partner_stores_by_category(category)
            } else {
                store.search_partner_stores(params.query.as_deref().unwrap_or(""))
            }
        }
    };

    ApiResponse::success("Stores fetched successfully", StatusCode::OK, stores)
}

#[utoipa::path(
    get,
    path = "/api/consumer/stores/{id}",
    tag = "Consumer",
    responses(
        (status = 200, description = "Store detail with active deals and published reviews"),
        (status = 404, description = "Store not found")
    )
)]
pub async fn store_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let mut store = state.store.write().await;
    let partner = store
        .partner_store_by_id(id)
        .ok_or_else(|| ApiError::not_found("Store not found"))?;

    store.increment_store_views(id);

    let deals = store
        .deals_by_partner(id)
        .into_iter()
        .filter(|d| d.is_active)
        .collect();
    let reviews = store
        .reviews_by_partner(id, false)
        .into_iter()
        .map(|review| {
            let user = store.find_user_by_id(review.user_id).map(|u| UserSummary {
                id: u.id,
                first_name: u.first_name,
                last_name: u.last_name,
                email: Some(u.email),
                phone: None,
            });
            ReviewWithUser { review, user }
        })
        .collect();

    Ok(ApiResponse::success(
        "Store details fetched successfully",
        StatusCode::OK,
        StoreDetail {
            store: partner,
            deals,
            reviews,
        },
    ))
}

#[utoipa::path(
    get,
    path = "/api/consumer/rewards",
    tag = "Consumer",
    responses(
        (status = 200, description = "Reward entries and total points"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn rewards(user: CurrentUser, State(state): State<AppState>) -> Result<Response, ApiError> {
    let user = user.require_role(Role::Buyer)?;

    let store = state.store.read().await;
    let overview = RewardsOverview {
        rewards: store.rewards_by_user(user.id),
        total_points: store.total_points(user.id),
    };

    Ok(ApiResponse::success(
        "Rewards fetched successfully",
        StatusCode::OK,
        overview,
    ))
}

#[utoipa::path(
    post,
    path = "/api/consumer/redeem",
    request_body = CreateRedemptionRequest,
    tag = "Consumer",
    responses(
        (status = 201, description = "Redemption created"),
        (status = 400, description = "Validation or business-rule failure"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn redeem(
    user: CurrentUser,
    State(state): State<AppState>,
    Json(request): Json<CreateRedemptionRequest>,
) -> Result<Response, ApiError> {
    let user = user.require_role(Role::Buyer)?;

    if request.partner_id <= 0 {
        return Err(ApiError::bad_request(
            "Validation failed: partnerId: Partner ID must be a positive number",
        ));
    }
    if request.amount <= 0 {
        return Err(ApiError::bad_request(
            "Validation failed: amount: Amount must be a positive number",
        ));
    }
    let code = match request.code.as_deref() {
        Some(code) if !code.is_empty() => code.to_string(),
        // Clients normally supply the counter code; generate one when the
        // field is omitted so older app builds keep working.
        _ => Uuid::new_v4().to_string()[..8].to_uppercase(),
    };

    let redemption = state.store.write().await.create_redemption(
        user.id,
        request.partner_id,
        request.points,
        request.amount,
        request.proof_image_url,
        code,
    )?;

    Ok(ApiResponse::success(
        "Redemption successful",
        StatusCode::CREATED,
        redemption,
    ))
}

#[utoipa::path(
    get,
    path = "/api/consumer/redemptions",
    tag = "Consumer",
    responses(
        (status = 200, description = "The caller's redemptions with partner summaries"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn redemptions(
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    let user = user.require_role(Role::Buyer)?;

    let store = state.store.read().await;
    let redemptions: Vec<RedemptionWithContext> = store
        .redemptions_by_user(user.id)
        .into_iter()
        .map(|redemption| {
            let partner = store
                .partner_store_by_id(redemption.partner_id)
                .map(|s| StoreSummary::from_store(&s));
            RedemptionWithContext {
                redemption,
                partner,
                user: None,
            }
        })
        .collect();

    Ok(ApiResponse::success(
        "Redemptions fetched successfully",
        StatusCode::OK,
        redemptions,
    ))
}

#[utoipa::path(
    post,
    path = "/api/consumer/referrals",
    request_body = CreateReferralRequest,
    tag = "Consumer",
    responses(
        (status = 201, description = "Referral created"),
        (status = 400, description = "Phone already registered"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn create_referral(
    user: CurrentUser,
    State(state): State<AppState>,
    Json(request): Json<CreateReferralRequest>,
) -> Result<Response, ApiError> {
    let user = user.require_role(Role::Buyer)?;

    let mut store = state.store.write().await;
    if store.find_user_by_phone(&request.referred_phone).is_some() {
        return Err(ApiError::bad_request("This phone is already registered"));
    }

    let referral = store.create_referral(user.id, request);
    Ok(ApiResponse::success(
        "Referral created",
        StatusCode::CREATED,
        referral,
    ))
}

#[utoipa::path(
    get,
    path = "/api/consumer/referrals",
    tag = "Consumer",
    responses(
        (status = 200, description = "The caller's referrals"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_referrals(
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    let user = user.require_role(Role::Buyer)?;
    let referrals = state.store.read().await.referrals_by_referrer(user.id);
    Ok(ApiResponse::success(
        "Referrals fetched successfully",
        StatusCode::OK,
        referrals,
    ))
}

#[utoipa::path(
    post,
    path = "/api/consumer/reviews",
    request_body = CreateReviewRequest,
    tag = "Consumer",
    responses(
        (status = 201, description = "Review submitted"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn create_review(
    user: CurrentUser,
    State(state): State<AppState>,
    Json(request): Json<CreateReviewRequest>,
) -> Result<Response, ApiError> {
    let user = user.require_role(Role::Buyer)?;
    let review = state.store.write().await.create_review(user.id, request);
    Ok(ApiResponse::success(
        "Review submitted",
        StatusCode::CREATED,
        review,
    ))
}

#[utoipa::path(
    post,
    path = "/api/consumer/visits",
    request_body = CreateVisitRequest,
    tag = "Consumer",
    responses(
        (status = 201, description = "Visit scheduled"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn create_visit(
    user: CurrentUser,
    State(state): State<AppState>,
    Json(request): Json<CreateVisitRequest>,
) -> Result<Response, ApiError> {
    let user = user.require_role(Role::Buyer)?;
    let visit = state.store.write().await.create_visit(user.id, request);
    Ok(ApiResponse::success(
        "Visit scheduled",
        StatusCode::CREATED,
        visit,
    ))
}

#[utoipa::path(
    get,
    path = "/api/consumer/visits",
    tag = "Consumer",
    responses(
        (status = 200, description = "The caller's visits with store and deal context"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_visits(
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    let user = user.require_role(Role::Buyer)?;

    let store = state.store.read().await;
    let visits: Vec<VisitWithContext> = store
        .visits_by_user(user.id)
        .into_iter()
        .map(|visit| {
            let store_summary = store
                .partner_store_by_id(visit.partner_id)
                .map(|s| StoreSummary::from_store(&s));
            let deal = visit.deal_id.and_then(|deal_id| {
                store.deal_by_id(deal_id).map(|d| DealSummary {
                    id: d.id,
                    name: d.name,
                    deal_type: Some(d.deal_type),
                    discount_percentage: d.discount_percentage,
                })
            });
            VisitWithContext {
                visit,
                store: store_summary,
                deal,
                user: None,
            }
        })
        .collect();

    Ok(ApiResponse::success(
        "Visits fetched successfully",
        StatusCode::OK,
        visits,
    ))
}

#[utoipa::path(
    post,
    path = "/api/consumer/visits/{id}/complete",
    tag = "Consumer",
    responses(
        (status = 200, description = "Visit completed and points credited"),
        (status = 403, description = "Visit belongs to another user"),
        (status = 404, description = "Visit not found"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn complete_visit(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let user = user.require_role(Role::Buyer)?;

    let mut store = state.store.write().await;
    let visit = store
        .visit_by_id(id)
        .ok_or_else(|| ApiError::not_found("Visit not found"))?;
    if visit.user_id != user.id {
        return Err(ApiError::forbidden("Unauthorized"));
    }

    let updated = store.mark_visit_completed(id)?;
    store.create_reward(user.id, VISIT_REWARD_POINTS, "Completed store visit", Some(id));

    Ok(ApiResponse::success(
        "Visit marked as completed",
        StatusCode::OK,
        updated,
    ))
}

#[utoipa::path(
    get,
    path = "/api/consumer/notifications",
    tag = "Consumer",
    responses(
        (status = 200, description = "The caller's notifications"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_notifications(
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    let user = user.require_role(Role::Buyer)?;
    let notifications = state.store.read().await.notifications_by_user(user.id);
    Ok(ApiResponse::success(
        "Notifications fetched successfully",
        StatusCode::OK,
        notifications,
    ))
}

#[utoipa::path(
    patch,
    path = "/api/consumer/notifications/{id}",
    tag = "Consumer",
    responses(
        (status = 200, description = "Notification marked as read"),
        (status = 404, description = "Notification not found"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn mark_notification_read(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    user.require_role(Role::Buyer)?;
    let notification = state.store.write().await.mark_notification_read(id)?;
    Ok(ApiResponse::success(
        "Notification marked as read",
        StatusCode::OK,
        notification,
    ))
}

#[utoipa::path(
    patch,
    path = "/api/consumer/profile/{id}",
    request_body = UpdateProfileRequest,
    tag = "Consumer",
    responses(
        (status = 200, description = "Profile updated"),
        (status = 400, description = "Validation failed or no fields provided"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Response, ApiError> {
    let mut store = state.store.write().await;
    if store.find_user_by_id(id).is_none() {
        return Err(ApiError::not_found("User not found"));
    }
    validate::validate_profile_update(&request)?;

    let updated = store.update_profile(id, &request)?;
    Ok(ApiResponse::success(
        "Profile updated successfully",
        StatusCode::OK,
        updated,
    ))
}
