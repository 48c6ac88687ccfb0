// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ShopPulse

//! Partner endpoints: store profile, deal management, scheduled visits,
//! redemptions, reviews and analytics.
//!
//! Every handler resolves the caller's store first; a partner account
//! without a store answers 404 for the whole surface. Resources belonging
//! to another partner's store answer 403.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
    Json,
};
use chrono::{Duration, Utc};

use crate::{
    auth::{CurrentUser, Role},
    error::ApiError,
    models::{
        AnalyticsTotals, CreateDealRequest, DealSummary, PartnerAnalytics, PartnerRedemptions,
        PartnerStore, RedemptionWithContext, ReviewWithUser, UpdateDealRequest,
        UpdateStoreRequest, UserSummary, VisitWithContext,
    },
    response::ApiResponse,
    state::AppState,
    store::InMemoryStore,
};

/// Days of history the analytics endpoint returns.
const ANALYTICS_WINDOW_DAYS: i64 = 7;

fn owned_store(store: &InMemoryStore, user_id: i64) -> Result<PartnerStore, ApiError> {
    store
        .partner_store_by_user_id(user_id)
        .ok_or_else(|| ApiError::not_found("Store not found"))
}

#[utoipa::path(
    get,
    path = "/api/partner/store",
    tag = "Partner",
    responses(
        (status = 200, description = "The caller's store profile"),
        (status = 404, description = "Store not found"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_store(user: CurrentUser, State(state): State<AppState>) -> Result<Response, ApiError> {
    let user = user.require_role(Role::Seller)?;
    let store = state.store.read().await;
    let partner = owned_store(&store, user.id)?;
    Ok(ApiResponse::success(
        "Store profile fetched successfully",
        StatusCode::OK,
        partner,
    ))
}

#[utoipa::path(
    patch,
    path = "/api/partner/store",
    request_body = UpdateStoreRequest,
    tag = "Partner",
    responses(
        (status = 200, description = "Store updated"),
        (status = 404, description = "Store not found"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn update_store(
    user: CurrentUser,
    State(state): State<AppState>,
    Json(request): Json<UpdateStoreRequest>,
) -> Result<Response, ApiError> {
    let user = user.require_role(Role::Seller)?;
    let mut store = state.store.write().await;
    let partner = owned_store(&store, user.id)?;
    let updated = store.update_partner_store(partner.id, &request)?;
    Ok(ApiResponse::success("Store updated", StatusCode::OK, updated))
}

#[utoipa::path(
    get,
    path = "/api/partner/deals",
    tag = "Partner",
    responses(
        (status = 200, description = "The caller's deals"),
        (status = 404, description = "Store not found"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_deals(user: CurrentUser, State(state): State<AppState>) -> Result<Response, ApiError> {
    let user = user.require_role(Role::Seller)?;
    let store = state.store.read().await;
    let partner = owned_store(&store, user.id)?;
    Ok(ApiResponse::success(
        "Deals fetched successfully",
        StatusCode::OK,
        store.deals_by_partner(partner.id),
    ))
}

#[utoipa::path(
    post,
    path = "/api/partner/deals",
    request_body = CreateDealRequest,
    tag = "Partner",
    responses(
        (status = 201, description = "Deal created"),
        (status = 400, description = "Active-deal cap reached for the category"),
        (status = 404, description = "Store not found"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn create_deal(
    user: CurrentUser,
    State(state): State<AppState>,
    Json(request): Json<CreateDealRequest>,
) -> Result<Response, ApiError> {
    let user = user.require_role(Role::Seller)?;
    let mut store = state.store.write().await;
    let partner = owned_store(&store, user.id)?;
    let deal = store.create_deal(partner.id, request)?;
    Ok(ApiResponse::success("Deal created", StatusCode::CREATED, deal))
}

#[utoipa::path(
    get,
    path = "/api/partner/deals/{id}",
    tag = "Partner",
    responses(
        (status = 200, description = "Deal detail"),
        (status = 403, description = "Deal belongs to another store"),
        (status = 404, description = "Deal or store not found"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn deal_detail(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let user = user.require_role(Role::Seller)?;
    let store = state.store.read().await;
    let deal = store
        .deal_by_id(id)
        .ok_or_else(|| ApiError::not_found("Deal not found"))?;
    let partner = owned_store(&store, user.id)?;
    if deal.partner_id != partner.id {
        return Err(ApiError::forbidden("Forbidden"));
    }
    Ok(ApiResponse::success(
        "Deal fetched successfully",
        StatusCode::OK,
        deal,
    ))
}

#[utoipa::path(
    patch,
    path = "/api/partner/deals/{id}",
    request_body = UpdateDealRequest,
    tag = "Partner",
    responses(
        (status = 200, description = "Deal updated"),
        (status = 403, description = "Deal belongs to another store"),
        (status = 404, description = "Deal or store not found"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn update_deal(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateDealRequest>,
) -> Result<Response, ApiError> {
    let user = user.require_role(Role::Seller)?;
    let mut store = state.store.write().await;
    let deal = store
        .deal_by_id(id)
        .ok_or_else(|| ApiError::not_found("Deal not found"))?;
    let partner = owned_store(&store, user.id)?;
    if deal.partner_id != partner.id {
        return Err(ApiError::forbidden("Forbidden"));
    }
    let updated = store.update_deal(id, &request)?;
    Ok(ApiResponse::success("Deal updated", StatusCode::OK, updated))
}

#[utoipa::path(
    post,
    path = "/api/partner/deals/{id}/deactivate",
    tag = "Partner",
    responses(
        (status = 200, description = "Deal deactivated"),
        (status = 403, description = "Deal belongs to another store"),
        (status = 404, description = "Deal or store not found"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn deactivate_deal(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let user = user.require_role(Role::Seller)?;
    let mut store = state.store.write().await;
    let deal = store
        .deal_by_id(id)
        .ok_or_else(|| ApiError::not_found("Deal not found"))?;
    let partner = owned_store(&store, user.id)?;
    if deal.partner_id != partner.id {
        return Err(ApiError::forbidden("Forbidden"));
    }
    let deactivated = store.deactivate_deal(id)?;
    Ok(ApiResponse::success(
        "Deal deactivated",
        StatusCode::OK,
        deactivated,
    ))
}

#[utoipa::path(
    get,
    path = "/api/partner/visits",
    tag = "Partner",
    responses(
        (status = 200, description = "Scheduled visits with visitor and deal context"),
        (status = 404, description = "Store not found"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_visits(user: CurrentUser, State(state): State<AppState>) -> Result<Response, ApiError> {
    let user = user.require_role(Role::Seller)?;
    let store = state.store.read().await;
    let partner = owned_store(&store, user.id)?;

    let visits: Vec<VisitWithContext> = store
        .scheduled_visits_by_partner(partner.id)
        .into_iter()
        .map(|visit| {
            let visitor = store.find_user_by_id(visit.user_id).map(|u| UserSummary {
                id: u.id,
                first_name: u.first_name,
                last_name: u.last_name,
                email: None,
                phone: u.phone,
            });
            let deal = visit.deal_id.and_then(|deal_id| {
                store.deal_by_id(deal_id).map(|d| DealSummary {
                    id: d.id,
                    name: d.name,
                    deal_type: None,
                    discount_percentage: None,
                })
            });
            VisitWithContext {
                visit,
                store: None,
                deal,
                user: visitor,
            }
        })
        .collect();

    Ok(ApiResponse::success(
        "Scheduled visits fetched successfully",
        StatusCode::OK,
        visits,
    ))
}

#[utoipa::path(
    post,
    path = "/api/partner/visits/{id}/complete",
    tag = "Partner",
    responses(
        (status = 200, description = "Visit marked as completed"),
        (status = 403, description = "Visit targets another store"),
        (status = 404, description = "Visit or store not found"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn complete_visit(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let user = user.require_role(Role::Seller)?;
    let mut store = state.store.write().await;
    let visit = store
        .visit_by_id(id)
        .ok_or_else(|| ApiError::not_found("Visit not found"))?;
    let partner = owned_store(&store, user.id)?;
    if visit.partner_id != partner.id {
        return Err(ApiError::forbidden("Forbidden"));
    }

    let completed = store.mark_visit_completed(id)?;
    Ok(ApiResponse::success(
        "Visit marked as completed",
        StatusCode::OK,
        completed,
    ))
}

#[utoipa::path(
    get,
    path = "/api/partner/redemptions",
    tag = "Partner",
    responses(
        (status = 200, description = "Redemptions with the amount still due"),
        (status = 404, description = "Store not found"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn redemptions(user: CurrentUser, State(state): State<AppState>) -> Result<Response, ApiError> {
    let user = user.require_role(Role::Seller)?;
    let store = state.store.read().await;
    let partner = owned_store(&store, user.id)?;

    let redemptions: Vec<RedemptionWithContext> = store
        .redemptions_by_partner(partner.id)
        .into_iter()
        .map(|redemption| {
            let consumer = store.find_user_by_id(redemption.user_id).map(|u| UserSummary {
                id: u.id,
                first_name: u.first_name,
                last_name: u.last_name,
                email: None,
                phone: None,
            });
            RedemptionWithContext {
                redemption,
                partner: None,
                user: consumer,
            }
        })
        .collect();

    let total_due_amount = redemptions
        .iter()
        .filter(|r| r.redemption.status == crate::models::RedemptionStatus::Pending)
        .map(|r| r.redemption.amount)
        .sum();

    Ok(ApiResponse::success(
        "Redemptions fetched successfully",
        StatusCode::OK,
        PartnerRedemptions {
            redemptions,
            total_due_amount,
        },
    ))
}

#[utoipa::path(
    get,
    path = "/api/partner/reviews",
    tag = "Partner",
    responses(
        (status = 200, description = "All reviews for the caller's store"),
        (status = 404, description = "Store not found"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn reviews(user: CurrentUser, State(state): State<AppState>) -> Result<Response, ApiError> {
    let user = user.require_role(Role::Seller)?;
    let store = state.store.read().await;
    let partner = owned_store(&store, user.id)?;

    // Partners see their unpublished reviews too.
    let reviews: Vec<ReviewWithUser> = store
        .reviews_by_partner(partner.id, true)
        .into_iter()
        .map(|review| {
            let author = store.find_user_by_id(review.user_id).map(|u| UserSummary {
                id: u.id,
                first_name: u.first_name,
                last_name: u.last_name,
                email: None,
                phone: None,
            });
            ReviewWithUser {
                review,
                user: author,
            }
        })
        .collect();

    Ok(ApiResponse::success(
        "Reviews fetched successfully",
        StatusCode::OK,
        reviews,
    ))
}

#[utoipa::path(
    get,
    path = "/api/partner/analytics",
    tag = "Partner",
    responses(
        (status = 200, description = "Last 7 days of stats with totals"),
        (status = 404, description = "Store not found"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn analytics(user: CurrentUser, State(state): State<AppState>) -> Result<Response, ApiError> {
    let user = user.require_role(Role::Seller)?;
    let store = state.store.read().await;
    let partner = owned_store(&store, user.id)?;

    let end = Utc::now().date_naive();
    let start = end - Duration::days(ANALYTICS_WINDOW_DAYS);
    let stats = store.stats_in_range(partner.id, start, end);

    let totals = AnalyticsTotals {
        store_views: stats.iter().map(|s| s.store_views).sum(),
        deal_views: stats.iter().map(|s| s.deal_views).sum(),
        scheduled_visits: stats.iter().map(|s| s.scheduled_visits).sum(),
        actual_visits: stats.iter().map(|s| s.actual_visits).sum(),
    };

    Ok(ApiResponse::success(
        "Analytics fetched successfully",
        StatusCode::OK,
        PartnerAnalytics { stats, totals },
    ))
}
