// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ShopPulse

//! # API Data Models
//!
//! Domain entities and the request/response structures used by the REST
//! API. All types derive `Serialize`/`Deserialize` and `ToSchema` for
//! automatic JSON handling and OpenAPI documentation. Wire format is
//! camelCase throughout.
//!
//! ## Model Categories
//!
//! - **Users**: accounts shared by consumers, partners and admins
//! - **Partner stores**: merchant profiles with location and categories
//! - **Deals**: time-bound offers published by partner stores
//! - **Visits**: consumer visit scheduling and completion
//! - **Reviews / Rewards / Redemptions / Referrals / Notifications**
//! - **Partner stats**: per-day analytics counters

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::Role;

// =============================================================================
// Users
// =============================================================================

/// A user account. One type serves all roles; partners additionally own a
/// [`PartnerStore`] linked by `user_id`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub email: String,
    /// Argon2 hash; never serialized.
    #[serde(skip)]
    pub password_hash: Option<String>,
    pub role: Role,
    pub phone: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub zip_code: Option<String>,
    pub favorite_categories: Vec<String>,
    /// Set once the user has verified via OTP and set a password.
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

/// Profile fields a consumer may update. All optional; at least one must
/// be present (validated at the handler boundary).
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub phone: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub zip_code: Option<String>,
    pub favorite_categories: Option<Vec<String>>,
}

impl UpdateProfileRequest {
    /// Whether the request carries no updatable field at all.
    pub fn is_empty(&self) -> bool {
        self.phone.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.zip_code.is_none()
            && self.favorite_categories.is_none()
    }
}

/// Public projection of a user embedded in partner-facing listings.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

// =============================================================================
// Auth Requests
// =============================================================================

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Body for `POST /api/auth/send-otp`. `role` arrives as a string so that
/// validation failures surface through the shared envelope rather than a
/// deserialization rejection.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SendOtpRequest {
    pub email: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct VerifyOtpRequest {
    pub email: Option<String>,
    pub otp: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SetPasswordRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: Option<String>,
}

// =============================================================================
// Partner Stores
// =============================================================================

/// A partner merchant's store profile.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PartnerStore {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub contact_phone: String,
    pub location: String,
    /// Stored as strings, mirroring upstream clients that send them as text.
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub categories: Vec<String>,
    pub price_rating: Option<i32>,
    pub upi_id: Option<String>,
    pub images: Vec<String>,
    pub services_offered: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Partial store update submitted by the owning partner.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStoreRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub contact_phone: Option<String>,
    pub location: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub categories: Option<Vec<String>>,
    pub price_rating: Option<i32>,
    pub upi_id: Option<String>,
    pub images: Option<Vec<String>>,
    pub services_offered: Option<Vec<String>>,
}

/// Store projection embedded in deal and visit listings.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoreSummary {
    pub id: i64,
    pub name: String,
    pub categories: Vec<String>,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_rating: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<String>,
}

impl StoreSummary {
    pub fn from_store(store: &PartnerStore) -> Self {
        Self {
            id: store.id,
            name: store.name.clone(),
            categories: store.categories.clone(),
            location: store.location.clone(),
            price_rating: store.price_rating,
            latitude: store.latitude.clone(),
            longitude: store.longitude.clone(),
        }
    }
}

// =============================================================================
// Deals
// =============================================================================

/// A time-bound offer published by a partner store.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    pub id: i64,
    pub partner_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// Free-form deal kind, e.g. "discount" or "bogo".
    pub deal_type: String,
    pub discount_percentage: Option<i32>,
    pub category: String,
    pub images: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDealRequest {
    pub name: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub deal_type: String,
    pub discount_percentage: Option<i32>,
    pub category: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDealRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub deal_type: Option<String>,
    pub discount_percentage: Option<i32>,
    pub category: Option<String>,
    pub images: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

/// Deal projection embedded in visit listings.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DealSummary {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deal_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_percentage: Option<i32>,
}

/// A deal with its store attached, as returned by consumer listings.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DealWithStore {
    #[serde(flatten)]
    pub deal: Deal,
    pub store: Option<StoreSummary>,
}

/// Deal detail page payload.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DealDetail {
    pub deal: Deal,
    pub store: Option<PartnerStore>,
}

/// Store detail page payload: the store plus its active deals and
/// published reviews.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreDetail {
    pub store: PartnerStore,
    pub deals: Vec<Deal>,
    pub reviews: Vec<ReviewWithUser>,
}

// =============================================================================
// Visits
// =============================================================================

/// Visit lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum VisitStatus {
    Scheduled,
    Completed,
}

/// A consumer's scheduled (or completed) store visit.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    pub id: i64,
    pub user_id: i64,
    pub partner_id: i64,
    pub deal_id: Option<i64>,
    pub visit_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub status: VisitStatus,
    pub marked_as_visited: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateVisitRequest {
    pub partner_id: i64,
    pub deal_id: Option<i64>,
    pub visit_date: DateTime<Utc>,
    pub notes: Option<String>,
}

/// A visit with embedded store/deal context (consumer view) or user/deal
/// context (partner view). Absent sides are omitted from the JSON.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisitWithContext {
    #[serde(flatten)]
    pub visit: Visit,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<StoreSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deal: Option<DealSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
}

// =============================================================================
// Reviews
// =============================================================================

/// A consumer review of a partner store.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: i64,
    pub user_id: i64,
    pub partner_id: i64,
    /// 1..=5 stars.
    pub rating: i32,
    pub comment: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub partner_id: i64,
    pub rating: i32,
    pub comment: Option<String>,
    pub is_published: Option<bool>,
}

/// A review with its author's public fields attached.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewWithUser {
    #[serde(flatten)]
    pub review: Review,
    pub user: Option<UserSummary>,
}

// =============================================================================
// Rewards & Redemptions
// =============================================================================

/// A reward-point ledger entry. The balance is the sum of `points` over a
/// user's entries.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    pub id: i64,
    pub user_id: i64,
    pub points: i64,
    pub reason: String,
    pub reference_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Rewards listing payload: entries plus the current balance.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RewardsOverview {
    pub rewards: Vec<Reward>,
    pub total_points: i64,
}

/// Redemption settlement state. New redemptions start pending; settlement
/// with the partner happens out-of-band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RedemptionStatus {
    Pending,
    Settled,
}

/// Points redeemed against a partner store for a monetary amount.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Redemption {
    pub id: i64,
    pub user_id: i64,
    pub partner_id: i64,
    pub points: i64,
    pub amount: i64,
    pub proof_image_url: Option<String>,
    /// Short code the partner validates at the counter.
    pub code: String,
    pub status: RedemptionStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRedemptionRequest {
    pub partner_id: i64,
    pub points: i64,
    pub amount: i64,
    pub proof_image_url: Option<String>,
    pub code: Option<String>,
}

/// A redemption with partner or user context attached.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionWithContext {
    #[serde(flatten)]
    pub redemption: Redemption,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partner: Option<StoreSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
}

/// Partner redemptions payload: entries plus the amount still owed for
/// pending ones.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PartnerRedemptions {
    pub redemptions: Vec<RedemptionWithContext>,
    pub total_due_amount: i64,
}

// =============================================================================
// Referrals
// =============================================================================

/// A consumer's referral of a phone number not yet registered.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Referral {
    pub id: i64,
    pub referrer_id: i64,
    pub referred_phone: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReferralRequest {
    pub referred_phone: String,
    pub status: Option<String>,
}

// =============================================================================
// Notifications
// =============================================================================

/// An in-app notification for a consumer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Partner Stats
// =============================================================================

/// Per-day analytics counters for a partner store.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PartnerStat {
    pub id: i64,
    pub partner_id: i64,
    pub date: NaiveDate,
    pub store_views: i64,
    pub deal_views: i64,
    pub scheduled_visits: i64,
    pub actual_visits: i64,
}

/// Aggregated totals over a stats window.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsTotals {
    pub store_views: i64,
    pub deal_views: i64,
    pub scheduled_visits: i64,
    pub actual_visits: i64,
}

/// Partner analytics payload: the raw per-day rows plus totals.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PartnerAnalytics {
    pub stats: Vec<PartnerStat>,
    pub totals: AnalyticsTotals,
}

// =============================================================================
// OTP
// =============================================================================

/// A pending one-time passcode. At most one per identifier; creating a new
/// one replaces any previous record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpRecord {
    pub identifier: String,
    pub code: String,
    pub expires_at: DateTime<Utc>,
}
