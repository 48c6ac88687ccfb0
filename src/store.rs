// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ShopPulse

//! In-memory data store.
//!
//! All data access goes through [`InMemoryStore`]; handlers never touch the
//! maps directly. Persistence schema design is out of scope, so the store
//! is the stable interface a database-backed implementation would replace.
//!
//! Business rules that belong to the data layer (redemption limits, the
//! active-deals-per-category cap, OTP expiry) live here and return
//! [`ApiError`] values with the messages clients rely on.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};

use crate::auth::Role;
use crate::error::ApiError;
use crate::models::{
    CreateDealRequest, CreateReferralRequest, CreateReviewRequest, CreateVisitRequest, Deal,
    Notification, OtpRecord, PartnerStat, PartnerStore, Redemption, RedemptionStatus, Referral,
    Review, Reward, UpdateDealRequest, UpdateProfileRequest, UpdateStoreRequest, User, Visit,
    VisitStatus,
};

/// Minimum points per redemption.
pub const MIN_REDEMPTION_POINTS: i64 = 500;
/// Maximum points per redemption.
pub const MAX_REDEMPTION_POINTS: i64 = 5000;
/// Points credited for a completed store visit.
pub const VISIT_REWARD_POINTS: i64 = 100;
/// A partner may run at most this many active deals per category.
pub const MAX_ACTIVE_DEALS_PER_CATEGORY: usize = 3;

#[derive(Default)]
pub struct InMemoryStore {
    users: HashMap<i64, User>,
    partner_stores: HashMap<i64, PartnerStore>,
    deals: HashMap<i64, Deal>,
    visits: HashMap<i64, Visit>,
    reviews: HashMap<i64, Review>,
    rewards: HashMap<i64, Reward>,
    redemptions: HashMap<i64, Redemption>,
    referrals: HashMap<i64, Referral>,
    notifications: HashMap<i64, Notification>,
    partner_stats: HashMap<i64, PartnerStat>,
    otps: HashMap<String, OtpRecord>,
    next_id: i64,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    // =========================================================================
    // Users
    // =========================================================================

    pub fn find_user_by_email(&self, email: &str) -> Option<User> {
        let needle = normalize_email(email);
        self.users.values().find(|u| u.email == needle).cloned()
    }

    pub fn find_user_by_phone(&self, phone: &str) -> Option<User> {
        self.users
            .values()
            .find(|u| u.phone.as_deref() == Some(phone))
            .cloned()
    }

    pub fn find_user_by_id(&self, id: i64) -> Option<User> {
        self.users.get(&id).cloned()
    }

    pub fn create_user(&mut self, email: &str, role: Role) -> User {
        let id = self.next_id();
        let user = User {
            id,
            email: normalize_email(email),
            password_hash: None,
            role,
            phone: None,
            first_name: None,
            last_name: None,
            zip_code: None,
            favorite_categories: Vec::new(),
            is_verified: false,
            created_at: Utc::now(),
        };
        self.users.insert(id, user.clone());
        user
    }

    pub fn update_profile(
        &mut self,
        id: i64,
        update: &UpdateProfileRequest,
    ) -> Result<User, ApiError> {
        let user = self
            .users
            .get_mut(&id)
            .ok_or_else(|| ApiError::not_found("User not found"))?;

        if let Some(phone) = &update.phone {
            user.phone = Some(phone.clone());
        }
        if let Some(first_name) = &update.first_name {
            user.first_name = Some(first_name.clone());
        }
        if let Some(last_name) = &update.last_name {
            user.last_name = Some(last_name.clone());
        }
        if let Some(zip_code) = &update.zip_code {
            user.zip_code = Some(zip_code.clone());
        }
        if let Some(favorite_categories) = &update.favorite_categories {
            user.favorite_categories = favorite_categories.clone();
        }
        Ok(user.clone())
    }

    /// Store a password hash and mark the user verified.
    pub fn set_password(&mut self, email: &str, password_hash: &str) -> Result<User, ApiError> {
        let needle = normalize_email(email);
        let user = self
            .users
            .values_mut()
            .find(|u| u.email == needle)
            .ok_or_else(|| ApiError::bad_request("User with this email does not exist"))?;
        user.password_hash = Some(password_hash.to_string());
        user.is_verified = true;
        Ok(user.clone())
    }

    // =========================================================================
    // Partner stores
    // =========================================================================

    pub fn create_partner_store(&mut self, user_id: i64, name: &str, location: &str) -> PartnerStore {
        let id = self.next_id();
        let store = PartnerStore {
            id,
            user_id,
            name: name.to_string(),
            description: None,
            contact_phone: String::new(),
            location: location.to_string(),
            latitude: None,
            longitude: None,
            categories: Vec::new(),
            price_rating: None,
            upi_id: None,
            images: Vec::new(),
            services_offered: Vec::new(),
            created_at: Utc::now(),
        };
        self.partner_stores.insert(id, store.clone());
        store
    }

    pub fn partner_store_by_id(&self, id: i64) -> Option<PartnerStore> {
        self.partner_stores.get(&id).cloned()
    }

    pub fn partner_store_by_user_id(&self, user_id: i64) -> Option<PartnerStore> {
        self.partner_stores
            .values()
            .find(|s| s.user_id == user_id)
            .cloned()
    }

    pub fn update_partner_store(
        &mut self,
        id: i64,
        update: &UpdateStoreRequest,
    ) -> Result<PartnerStore, ApiError> {
        let store = self
            .partner_stores
            .get_mut(&id)
            .ok_or_else(|| ApiError::not_found("Store not found"))?;

        if let Some(name) = &update.name {
            store.name = name.clone();
        }
        if let Some(description) = &update.description {
            store.description = Some(description.clone());
        }
        if let Some(contact_phone) = &update.contact_phone {
            store.contact_phone = contact_phone.clone();
        }
        if let Some(location) = &update.location {
            store.location = location.clone();
        }
        if let Some(latitude) = &update.latitude {
            store.latitude = Some(latitude.clone());
        }
        if let Some(longitude) = &update.longitude {
            store.longitude = Some(longitude.clone());
        }
        if let Some(categories) = &update.categories {
            store.categories = categories.clone();
        }
        if let Some(price_rating) = update.price_rating {
            store.price_rating = Some(price_rating);
        }
        if let Some(upi_id) = &update.upi_id {
            store.upi_id = Some(upi_id.clone());
        }
        if let Some(images) = &update.images {
            store.images = images.clone();
        }
        if let Some(services_offered) = &update.services_offered {
            store.services_offered = services_offered.clone();
        }
        Ok(store.clone())
    }

    /// Case-insensitive substring search over name, description and
    /// location. An empty query matches every store.
    pub fn search_partner_stores(&self, query: &str) -> Vec<PartnerStore> {
        let q = query.to_lowercase();
        let mut stores: Vec<PartnerStore> = self
            .partner_stores
            .values()
            .filter(|s| {
                q.is_empty()
                    || s.name.to_lowercase().contains(&q)
                    || s.description
                        .as_ref()
                        .is_some_and(|d| d.to_lowercase().contains(&q))
                    || s.location.to_lowercase().contains(&q)
            })
            .cloned()
            .collect();
        stores.sort_by_key(|s| s.id);
        stores
    }

    pub fn partner_stores_by_category(&self, category: &str) -> Vec<PartnerStore> {
        let mut stores: Vec<PartnerStore> = self
            .partner_stores
            .values()
            .filter(|s| s.categories.iter().any(|c| c == category))
            .cloned()
            .collect();
        stores.sort_by_key(|s| s.id);
        stores
    }

    /// Stores within `radius_km` of the given point, by haversine distance.
    /// Stores without parseable coordinates are skipped.
    pub fn nearby_partner_stores(&self, lat: f64, lng: f64, radius_km: f64) -> Vec<PartnerStore> {
        let mut stores: Vec<PartnerStore> = self
            .partner_stores
            .values()
            .filter(|s| {
                let (Some(s_lat), Some(s_lng)) = (
                    s.latitude.as_deref().and_then(|v| v.parse::<f64>().ok()),
                    s.longitude.as_deref().and_then(|v| v.parse::<f64>().ok()),
                ) else {
                    return false;
                };
                haversine_km(lat, lng, s_lat, s_lng) <= radius_km
            })
            .cloned()
            .collect();
        stores.sort_by_key(|s| s.id);
        stores
    }

    // =========================================================================
    // Deals
    // =========================================================================

    /// Create a deal, enforcing the per-category active-deal cap.
    pub fn create_deal(
        &mut self,
        partner_id: i64,
        request: CreateDealRequest,
    ) -> Result<Deal, ApiError> {
        let active_in_category = self
            .deals
            .values()
            .filter(|d| d.partner_id == partner_id && d.is_active && d.category == request.category)
            .count();
        if active_in_category >= MAX_ACTIVE_DEALS_PER_CATEGORY {
            return Err(ApiError::bad_request(
                "You already have 3 active deals in this category",
            ));
        }

        let id = self.next_id();
        let deal = Deal {
            id,
            partner_id,
            name: request.name,
            description: request.description,
            start_date: request.start_date,
            end_date: request.end_date,
            deal_type: request.deal_type,
            discount_percentage: request.discount_percentage,
            category: request.category,
            images: request.images,
            is_active: request.is_active.unwrap_or(true),
            created_at: Utc::now(),
        };
        self.deals.insert(id, deal.clone());
        Ok(deal)
    }

    pub fn deal_by_id(&self, id: i64) -> Option<Deal> {
        self.deals.get(&id).cloned()
    }

    pub fn deals_by_partner(&self, partner_id: i64) -> Vec<Deal> {
        let mut deals: Vec<Deal> = self
            .deals
            .values()
            .filter(|d| d.partner_id == partner_id)
            .cloned()
            .collect();
        deals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        deals
    }

    pub fn update_deal(&mut self, id: i64, update: &UpdateDealRequest) -> Result<Deal, ApiError> {
        let deal = self
            .deals
            .get_mut(&id)
            .ok_or_else(|| ApiError::not_found("Deal not found"))?;

        if let Some(name) = &update.name {
            deal.name = name.clone();
        }
        if let Some(description) = &update.description {
            deal.description = Some(description.clone());
        }
        if let Some(start_date) = update.start_date {
            deal.start_date = start_date;
        }
        if let Some(end_date) = update.end_date {
            deal.end_date = end_date;
        }
        if let Some(deal_type) = &update.deal_type {
            deal.deal_type = deal_type.clone();
        }
        if let Some(discount_percentage) = update.discount_percentage {
            deal.discount_percentage = Some(discount_percentage);
        }
        if let Some(category) = &update.category {
            deal.category = category.clone();
        }
        if let Some(images) = &update.images {
            deal.images = images.clone();
        }
        if let Some(is_active) = update.is_active {
            deal.is_active = is_active;
        }
        Ok(deal.clone())
    }

    pub fn deactivate_deal(&mut self, id: i64) -> Result<Deal, ApiError> {
        let deal = self
            .deals
            .get_mut(&id)
            .ok_or_else(|| ApiError::not_found("Deal not found"))?;
        deal.is_active = false;
        Ok(deal.clone())
    }

    pub fn active_deals(&self) -> Vec<Deal> {
        let mut deals: Vec<Deal> = self.deals.values().filter(|d| d.is_active).cloned().collect();
        deals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        deals
    }

    pub fn deals_by_category(&self, category: &str) -> Vec<Deal> {
        let mut deals: Vec<Deal> = self
            .deals
            .values()
            .filter(|d| d.is_active && d.category == category)
            .cloned()
            .collect();
        deals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        deals
    }

    /// Case-insensitive substring search over active deals.
    pub fn search_deals(&self, query: &str) -> Vec<Deal> {
        let q = query.to_lowercase();
        let mut deals: Vec<Deal> = self
            .deals
            .values()
            .filter(|d| {
                d.is_active
                    && (q.is_empty()
                        || d.name.to_lowercase().contains(&q)
                        || d.description
                            .as_ref()
                            .is_some_and(|desc| desc.to_lowercase().contains(&q)))
            })
            .cloned()
            .collect();
        deals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        deals
    }

    // =========================================================================
    // Visits
    // =========================================================================

    pub fn create_visit(&mut self, user_id: i64, request: CreateVisitRequest) -> Visit {
        let id = self.next_id();
        let visit = Visit {
            id,
            user_id,
            partner_id: request.partner_id,
            deal_id: request.deal_id,
            visit_date: request.visit_date,
            notes: request.notes,
            status: VisitStatus::Scheduled,
            marked_as_visited: false,
            created_at: Utc::now(),
        };
        self.visits.insert(id, visit.clone());
        self.bump_stat(request.partner_id, |s| s.scheduled_visits += 1);
        visit
    }

    pub fn visit_by_id(&self, id: i64) -> Option<Visit> {
        self.visits.get(&id).cloned()
    }

    pub fn visits_by_user(&self, user_id: i64) -> Vec<Visit> {
        let mut visits: Vec<Visit> = self
            .visits
            .values()
            .filter(|v| v.user_id == user_id)
            .cloned()
            .collect();
        visits.sort_by(|a, b| b.visit_date.cmp(&a.visit_date));
        visits
    }

    pub fn mark_visit_completed(&mut self, id: i64) -> Result<Visit, ApiError> {
        let partner_id = {
            let visit = self
                .visits
                .get_mut(&id)
                .ok_or_else(|| ApiError::not_found("Visit not found"))?;
            visit.status = VisitStatus::Completed;
            visit.marked_as_visited = true;
            visit.partner_id
        };
        self.bump_stat(partner_id, |s| s.actual_visits += 1);
        Ok(self.visits[&id].clone())
    }

    pub fn scheduled_visits_by_partner(&self, partner_id: i64) -> Vec<Visit> {
        let mut visits: Vec<Visit> = self
            .visits
            .values()
            .filter(|v| v.partner_id == partner_id && v.status == VisitStatus::Scheduled)
            .cloned()
            .collect();
        visits.sort_by_key(|v| v.visit_date);
        visits
    }

    // =========================================================================
    // Reviews
    // =========================================================================

    pub fn create_review(&mut self, user_id: i64, request: CreateReviewRequest) -> Review {
        let id = self.next_id();
        let review = Review {
            id,
            user_id,
            partner_id: request.partner_id,
            rating: request.rating,
            comment: request.comment,
            is_published: request.is_published.unwrap_or(true),
            created_at: Utc::now(),
        };
        self.reviews.insert(id, review.clone());
        review
    }

    pub fn reviews_by_partner(&self, partner_id: i64, include_unpublished: bool) -> Vec<Review> {
        let mut reviews: Vec<Review> = self
            .reviews
            .values()
            .filter(|r| r.partner_id == partner_id && (include_unpublished || r.is_published))
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        reviews
    }

    // =========================================================================
    // Rewards & redemptions
    // =========================================================================

    pub fn create_reward(
        &mut self,
        user_id: i64,
        points: i64,
        reason: &str,
        reference_id: Option<i64>,
    ) -> Reward {
        let id = self.next_id();
        let reward = Reward {
            id,
            user_id,
            points,
            reason: reason.to_string(),
            reference_id,
            created_at: Utc::now(),
        };
        self.rewards.insert(id, reward.clone());
        reward
    }

    pub fn rewards_by_user(&self, user_id: i64) -> Vec<Reward> {
        let mut rewards: Vec<Reward> = self
            .rewards
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        rewards.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rewards
    }

    /// Current balance: sum of the user's ledger entries.
    pub fn total_points(&self, user_id: i64) -> i64 {
        self.rewards
            .values()
            .filter(|r| r.user_id == user_id)
            .map(|r| r.points)
            .sum()
    }

    /// Create a redemption after checking the points window, the user's
    /// balance and the partner's existence.
    pub fn create_redemption(
        &mut self,
        user_id: i64,
        partner_id: i64,
        points: i64,
        amount: i64,
        proof_image_url: Option<String>,
        code: String,
    ) -> Result<Redemption, ApiError> {
        if points < MIN_REDEMPTION_POINTS {
            return Err(ApiError::bad_request(format!(
                "Minimum redemption is {MIN_REDEMPTION_POINTS} points"
            )));
        }
        if points > MAX_REDEMPTION_POINTS {
            return Err(ApiError::bad_request(format!(
                "Maximum redemption is {MAX_REDEMPTION_POINTS} points"
            )));
        }
        if self.total_points(user_id) < points {
            return Err(ApiError::bad_request("Not enough points"));
        }
        if !self.partner_stores.contains_key(&partner_id) {
            return Err(ApiError::bad_request("Partner store not found"));
        }

        let id = self.next_id();
        let redemption = Redemption {
            id,
            user_id,
            partner_id,
            points,
            amount,
            proof_image_url,
            code,
            status: RedemptionStatus::Pending,
            created_at: Utc::now(),
        };
        // The ledger is untouched here: points are deducted when the
        // pending redemption settles with the partner, not at creation.
        self.redemptions.insert(id, redemption.clone());
        Ok(redemption)
    }

    pub fn redemptions_by_user(&self, user_id: i64) -> Vec<Redemption> {
        let mut redemptions: Vec<Redemption> = self
            .redemptions
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        redemptions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        redemptions
    }

    pub fn redemptions_by_partner(&self, partner_id: i64) -> Vec<Redemption> {
        let mut redemptions: Vec<Redemption> = self
            .redemptions
            .values()
            .filter(|r| r.partner_id == partner_id)
            .cloned()
            .collect();
        redemptions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        redemptions
    }

    // =========================================================================
    // Referrals
    // =========================================================================

    pub fn create_referral(&mut self, referrer_id: i64, request: CreateReferralRequest) -> Referral {
        let id = self.next_id();
        let referral = Referral {
            id,
            referrer_id,
            referred_phone: request.referred_phone,
            status: request.status.unwrap_or_else(|| "pending".to_string()),
            created_at: Utc::now(),
        };
        self.referrals.insert(id, referral.clone());
        referral
    }

    pub fn referrals_by_referrer(&self, referrer_id: i64) -> Vec<Referral> {
        let mut referrals: Vec<Referral> = self
            .referrals
            .values()
            .filter(|r| r.referrer_id == referrer_id)
            .cloned()
            .collect();
        referrals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        referrals
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    pub fn create_notification(&mut self, user_id: i64, title: &str, message: &str) -> Notification {
        let id = self.next_id();
        let notification = Notification {
            id,
            user_id,
            title: title.to_string(),
            message: message.to_string(),
            is_read: false,
            created_at: Utc::now(),
        };
        self.notifications.insert(id, notification.clone());
        notification
    }

    pub fn notifications_by_user(&self, user_id: i64) -> Vec<Notification> {
        let mut notifications: Vec<Notification> = self
            .notifications
            .values()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        notifications
    }

    pub fn mark_notification_read(&mut self, id: i64) -> Result<Notification, ApiError> {
        let notification = self
            .notifications
            .get_mut(&id)
            .ok_or_else(|| ApiError::not_found("Notification not found"))?;
        notification.is_read = true;
        Ok(notification.clone())
    }

    // =========================================================================
    // Partner stats
    // =========================================================================

    /// Bump today's counter row for a partner, creating it on first use.
    fn bump_stat<F: FnOnce(&mut PartnerStat)>(&mut self, partner_id: i64, update: F) {
        let today = Utc::now().date_naive();
        if let Some(stat) = self
            .partner_stats
            .values_mut()
            .find(|s| s.partner_id == partner_id && s.date == today)
        {
            update(stat);
            return;
        }
        let id = self.next_id();
        let mut stat = PartnerStat {
            id,
            partner_id,
            date: today,
            store_views: 0,
            deal_views: 0,
            scheduled_visits: 0,
            actual_visits: 0,
        };
        update(&mut stat);
        self.partner_stats.insert(id, stat);
    }

    pub fn increment_store_views(&mut self, partner_id: i64) {
        self.bump_stat(partner_id, |s| s.store_views += 1);
    }

    pub fn increment_deal_views(&mut self, partner_id: i64) {
        self.bump_stat(partner_id, |s| s.deal_views += 1);
    }

    /// Per-day rows for a partner within `[start, end]`, ordered by date.
    pub fn stats_in_range(
        &self,
        partner_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<PartnerStat> {
        let mut stats: Vec<PartnerStat> = self
            .partner_stats
            .values()
            .filter(|s| s.partner_id == partner_id && s.date >= start && s.date <= end)
            .cloned()
            .collect();
        stats.sort_by_key(|s| s.date);
        stats
    }

    // =========================================================================
    // OTPs
    // =========================================================================

    /// Store a pending OTP, replacing any previous code for the identifier.
    pub fn put_otp(&mut self, identifier: &str, code: &str, expires_at: DateTime<Utc>) {
        let identifier = normalize_email(identifier);
        self.otps.insert(
            identifier.clone(),
            OtpRecord {
                identifier,
                code: code.to_string(),
                expires_at,
            },
        );
    }

    /// Check a code against the pending record. A successful verification
    /// consumes the record; expired or mismatched codes leave it in place.
    pub fn verify_and_consume_otp(&mut self, identifier: &str, code: &str, now: DateTime<Utc>) -> bool {
        let identifier = normalize_email(identifier);
        let valid = self
            .otps
            .get(&identifier)
            .is_some_and(|record| record.code == code && record.expires_at > now);
        if valid {
            self.otps.remove(&identifier);
        }
        valid
    }
}

/// Great-circle distance in kilometers.
fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn deal_request(name: &str, category: &str) -> CreateDealRequest {
        CreateDealRequest {
            name: name.to_string(),
            description: Some(format!("{name} description")),
            start_date: Utc::now(),
            end_date: Utc::now() + Duration::days(30),
            deal_type: "discount".to_string(),
            discount_percentage: Some(10),
            category: category.to_string(),
            images: Vec::new(),
            is_active: None,
        }
    }

    #[test]
    fn emails_are_normalized_on_create_and_lookup() {
        let mut store = InMemoryStore::new();
        store.create_user("  Buyer@Example.COM ", Role::Buyer);
        let found = store.find_user_by_email("buyer@example.com").unwrap();
        assert_eq!(found.email, "buyer@example.com");
        assert!(store.find_user_by_email(" BUYER@example.com ").is_some());
    }

    #[test]
    fn set_password_requires_existing_user() {
        let mut store = InMemoryStore::new();
        let err = store.set_password("ghost@example.com", "hash").unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);

        store.create_user("real@example.com", Role::Buyer);
        let user = store.set_password("real@example.com", "hash").unwrap();
        assert!(user.is_verified);
        assert_eq!(user.password_hash.as_deref(), Some("hash"));
    }

    #[test]
    fn fourth_active_deal_in_category_is_rejected() {
        let mut store = InMemoryStore::new();
        let owner = store.create_user("seller@example.com", Role::Seller);
        let partner = store.create_partner_store(owner.id, "Cafe One", "Downtown");

        for i in 0..3 {
            store
                .create_deal(partner.id, deal_request(&format!("deal {i}"), "Cafe"))
                .unwrap();
        }
        let err = store
            .create_deal(partner.id, deal_request("deal 3", "Cafe"))
            .unwrap_err();
        assert_eq!(err.message, "You already have 3 active deals in this category");

        // A different category is unaffected.
        assert!(store
            .create_deal(partner.id, deal_request("food deal", "Food"))
            .is_ok());

        // Deactivating one frees a slot.
        let deals = store.deals_by_partner(partner.id);
        let cafe_deal = deals.iter().find(|d| d.category == "Cafe").unwrap();
        store.deactivate_deal(cafe_deal.id).unwrap();
        assert!(store
            .create_deal(partner.id, deal_request("replacement", "Cafe"))
            .is_ok());
    }

    #[test]
    fn search_deals_is_case_insensitive_and_active_only() {
        let mut store = InMemoryStore::new();
        let owner = store.create_user("seller@example.com", Role::Seller);
        let partner = store.create_partner_store(owner.id, "Cafe One", "Downtown");

        let latte = store
            .create_deal(partner.id, deal_request("Latte Special", "Cafe"))
            .unwrap();
        store
            .create_deal(partner.id, deal_request("Muffin Monday", "Cafe"))
            .unwrap();
        store.deactivate_deal(latte.id).unwrap();

        assert!(store.search_deals("LATTE").is_empty());
        let hits = store.search_deals("muffin");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Muffin Monday");
    }

    #[test]
    fn redemption_rules_enforced_in_order() {
        let mut store = InMemoryStore::new();
        let buyer = store.create_user("buyer@example.com", Role::Buyer);
        let owner = store.create_user("seller@example.com", Role::Seller);
        let partner = store.create_partner_store(owner.id, "Cafe One", "Downtown");

        let below = store.create_redemption(buyer.id, partner.id, 499, 50, None, "C1".into());
        assert_eq!(below.unwrap_err().message, "Minimum redemption is 500 points");

        let above = store.create_redemption(buyer.id, partner.id, 5001, 50, None, "C2".into());
        assert_eq!(above.unwrap_err().message, "Maximum redemption is 5000 points");

        let broke = store.create_redemption(buyer.id, partner.id, 500, 50, None, "C3".into());
        assert_eq!(broke.unwrap_err().message, "Not enough points");

        store.create_reward(buyer.id, 600, "Completed store visit", None);
        let missing_partner = store.create_redemption(buyer.id, 9999, 500, 50, None, "C4".into());
        assert_eq!(missing_partner.unwrap_err().message, "Partner store not found");

        let redemption = store
            .create_redemption(buyer.id, partner.id, 500, 50, None, "C5".into())
            .unwrap();
        assert_eq!(redemption.status, RedemptionStatus::Pending);
        // Creation leaves the ledger untouched; deduction happens at
        // settlement.
        assert_eq!(store.total_points(buyer.id), 600);
    }

    #[test]
    fn visit_completion_updates_status_and_stats() {
        let mut store = InMemoryStore::new();
        let buyer = store.create_user("buyer@example.com", Role::Buyer);
        let owner = store.create_user("seller@example.com", Role::Seller);
        let partner = store.create_partner_store(owner.id, "Cafe One", "Downtown");

        let visit = store.create_visit(
            buyer.id,
            CreateVisitRequest {
                partner_id: partner.id,
                deal_id: None,
                visit_date: Utc::now(),
                notes: None,
            },
        );
        assert_eq!(visit.status, VisitStatus::Scheduled);
        assert_eq!(store.scheduled_visits_by_partner(partner.id).len(), 1);

        let completed = store.mark_visit_completed(visit.id).unwrap();
        assert_eq!(completed.status, VisitStatus::Completed);
        assert!(completed.marked_as_visited);
        assert!(store.scheduled_visits_by_partner(partner.id).is_empty());

        let today = Utc::now().date_naive();
        let stats = store.stats_in_range(partner.id, today, today);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].scheduled_visits, 1);
        assert_eq!(stats[0].actual_visits, 1);

        let missing = store.mark_visit_completed(999);
        assert_eq!(missing.unwrap_err().status, axum::http::StatusCode::NOT_FOUND);
    }

    #[test]
    fn reviews_filter_unpublished_for_public_listings() {
        let mut store = InMemoryStore::new();
        let buyer = store.create_user("buyer@example.com", Role::Buyer);
        let owner = store.create_user("seller@example.com", Role::Seller);
        let partner = store.create_partner_store(owner.id, "Cafe One", "Downtown");

        store.create_review(
            buyer.id,
            CreateReviewRequest {
                partner_id: partner.id,
                rating: 5,
                comment: Some("great".into()),
                is_published: Some(true),
            },
        );
        store.create_review(
            buyer.id,
            CreateReviewRequest {
                partner_id: partner.id,
                rating: 1,
                comment: Some("hidden".into()),
                is_published: Some(false),
            },
        );

        assert_eq!(store.reviews_by_partner(partner.id, false).len(), 1);
        assert_eq!(store.reviews_by_partner(partner.id, true).len(), 2);
    }

    #[test]
    fn otp_verification_consumes_the_code() {
        let mut store = InMemoryStore::new();
        let now = Utc::now();
        store.put_otp("buyer@example.com", "123456", now + Duration::minutes(3));

        assert!(!store.verify_and_consume_otp("buyer@example.com", "654321", now));
        assert!(store.verify_and_consume_otp("Buyer@Example.com", "123456", now));
        // Consumed: the same code no longer verifies.
        assert!(!store.verify_and_consume_otp("buyer@example.com", "123456", now));
    }

    #[test]
    fn expired_otp_is_rejected() {
        let mut store = InMemoryStore::new();
        let now = Utc::now();
        store.put_otp("buyer@example.com", "123456", now - Duration::seconds(1));
        assert!(!store.verify_and_consume_otp("buyer@example.com", "123456", now));
    }

    #[test]
    fn new_otp_replaces_previous_code() {
        let mut store = InMemoryStore::new();
        let now = Utc::now();
        store.put_otp("buyer@example.com", "111111", now + Duration::minutes(3));
        store.put_otp("buyer@example.com", "222222", now + Duration::minutes(3));
        assert!(!store.verify_and_consume_otp("buyer@example.com", "111111", now));
        assert!(store.verify_and_consume_otp("buyer@example.com", "222222", now));
    }

    #[test]
    fn nearby_stores_respects_radius() {
        let mut store = InMemoryStore::new();
        let owner = store.create_user("seller@example.com", Role::Seller);

        let near = store.create_partner_store(owner.id, "Near", "Center");
        store
            .update_partner_store(
                near.id,
                &UpdateStoreRequest {
                    latitude: Some("12.9716".into()),
                    longitude: Some("77.5946".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        let far = store.create_partner_store(owner.id, "Far", "Elsewhere");
        store
            .update_partner_store(
                far.id,
                &UpdateStoreRequest {
                    latitude: Some("13.35".into()),
                    longitude: Some("77.10".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        // No coordinates: never matched.
        store.create_partner_store(owner.id, "Unknown", "Nowhere");

        let hits = store.nearby_partner_stores(12.9716, 77.5946, 10.0);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Near");

        let wide = store.nearby_partner_stores(12.9716, 77.5946, 100.0);
        assert_eq!(wide.len(), 2);
    }

    #[test]
    fn view_counters_bucket_by_day() {
        let mut store = InMemoryStore::new();
        let owner = store.create_user("seller@example.com", Role::Seller);
        let partner = store.create_partner_store(owner.id, "Cafe One", "Downtown");

        store.increment_store_views(partner.id);
        store.increment_store_views(partner.id);
        store.increment_deal_views(partner.id);

        let today = Utc::now().date_naive();
        let stats = store.stats_in_range(partner.id, today, today);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].store_views, 2);
        assert_eq!(stats[0].deal_views, 1);
    }

    #[test]
    fn haversine_known_distance() {
        // Bangalore to Chennai is roughly 290 km.
        let d = haversine_km(12.9716, 77.5946, 13.0827, 80.2707);
        assert!((280.0..300.0).contains(&d), "got {d}");
    }
}
