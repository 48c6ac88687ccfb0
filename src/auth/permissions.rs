// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ShopPulse

//! Route patterns, the route matcher, and the role-permission table.
//!
//! The permission table is pure data: one declarative mapping from
//! (HTTP method, route pattern) to the set of roles allowed to call it,
//! consulted only by the authorization gate. Patterns use `:name` wildcard
//! segments; matching is linear segment comparison, not a templating
//! engine, because the route surface is small and flat.
//!
//! A route reachable by the router but absent from this table is NOT
//! blocked (fail-open). [`audit_route_coverage`] surfaces such routes at
//! startup so the gap is at least visible.

use axum::http::Method;

use super::roles::Role;

/// Route pattern constants shared by the permission table, the public-path
/// lists and the router.
pub mod paths {
    // Auth
    pub const LOGIN: &str = "/api/auth/login";
    pub const LOGOUT: &str = "/api/auth/logout";
    pub const SEND_OTP: &str = "/api/auth/send-otp";
    pub const VERIFY_OTP: &str = "/api/auth/verify-otp";
    pub const SET_PASSWORD: &str = "/api/auth/setPassword";
    // Route spelling predates this service; clients depend on it.
    pub const REFRESH_TOKEN: &str = "/api/auth/refreshTocken";

    // Common
    pub const CATEGORIES: &str = "/api/categories";
    pub const USER_TYPES: &str = "/api/user-types";

    // Consumer
    pub const CONSUMER_DEALS: &str = "/api/consumer/deals";
    pub const CONSUMER_DEAL_BY_ID: &str = "/api/consumer/deals/:id";
    pub const CONSUMER_NOTIFICATIONS: &str = "/api/consumer/notifications";
    pub const CONSUMER_NOTIFICATION_BY_ID: &str = "/api/consumer/notifications/:id";
    pub const CONSUMER_PROFILE: &str = "/api/consumer/profile/:id";
    pub const CONSUMER_REDEEM: &str = "/api/consumer/redeem";
    pub const CONSUMER_REDEMPTIONS: &str = "/api/consumer/redemptions";
    pub const CONSUMER_REFERRALS: &str = "/api/consumer/referrals";
    pub const CONSUMER_REVIEWS: &str = "/api/consumer/reviews";
    pub const CONSUMER_REWARDS: &str = "/api/consumer/rewards";
    pub const CONSUMER_STORES: &str = "/api/consumer/stores";
    pub const CONSUMER_STORE_BY_ID: &str = "/api/consumer/stores/:id";
    pub const CONSUMER_VISITS: &str = "/api/consumer/visits";
    pub const CONSUMER_VISIT_COMPLETE: &str = "/api/consumer/visits/:id/complete";

    // Partner
    pub const PARTNER_ANALYTICS: &str = "/api/partner/analytics";
    pub const PARTNER_DEALS: &str = "/api/partner/deals";
    pub const PARTNER_DEAL_BY_ID: &str = "/api/partner/deals/:id";
    pub const PARTNER_DEAL_DEACTIVATE: &str = "/api/partner/deals/:id/deactivate";
    pub const PARTNER_REDEMPTIONS: &str = "/api/partner/redemptions";
    pub const PARTNER_REVIEWS: &str = "/api/partner/reviews";
    pub const PARTNER_STORE: &str = "/api/partner/store";
    pub const PARTNER_VISITS: &str = "/api/partner/visits";
    pub const PARTNER_VISIT_COMPLETE: &str = "/api/partner/visits/:id/complete";
}

/// Exact paths exempt from credential verification.
pub const PUBLIC_PATHS: &[&str] = &[
    paths::LOGIN,
    paths::SEND_OTP,
    paths::VERIFY_OTP,
    paths::CATEGORIES,
    "/api-doc/openapi.json",
    "/docs",
];

/// Parameterized patterns exempt from credential verification
/// (anonymous browsing of deal and store detail pages).
pub const PUBLIC_DYNAMIC: &[&str] = &[paths::CONSUMER_DEAL_BY_ID, paths::CONSUMER_STORE_BY_ID];

/// Match a concrete request path against a `:param` route pattern.
///
/// Both sides are split on `/` with empty segments discarded; the segment
/// counts must be equal, and a pattern segment starting with `:` matches
/// any literal segment. No prefix/suffix matching.
pub fn route_matches(pattern: &str, path: &str) -> bool {
    let pattern_segments: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    let path_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    if pattern_segments.len() != path_segments.len() {
        return false;
    }

    pattern_segments
        .iter()
        .zip(path_segments.iter())
        .all(|(pattern_seg, path_seg)| pattern_seg.starts_with(':') || pattern_seg == path_seg)
}

/// Whether a path bypasses authorization entirely.
pub fn is_public_path(path: &str) -> bool {
    if PUBLIC_PATHS.contains(&path) {
        return true;
    }
    PUBLIC_DYNAMIC
        .iter()
        .any(|pattern| route_matches(pattern, path))
}

const ALL_ROLES: &[Role] = &[Role::Admin, Role::Buyer, Role::Seller, Role::Visitor];
const CONSUMER_ROLES: &[Role] = &[Role::Admin, Role::Buyer];
const PARTNER_ROLES: &[Role] = &[Role::Admin, Role::Seller];

type Entry = (&'static str, &'static [Role]);

/// Static (method, route pattern) → allowed-roles table.
///
/// Loaded once at startup and never mutated; declaration order decides
/// first-match resolution for overlapping patterns.
#[derive(Debug, Clone)]
pub struct PermissionTable {
    tables: Vec<(Method, Vec<Entry>)>,
}

impl PermissionTable {
    /// The production table, mirroring the deployed route surface.
    pub fn standard() -> Self {
        let get: Vec<Entry> = vec![
            // Public/common reads still carry entries so a token presented
            // to them is role-checked consistently.
            (paths::CATEGORIES, ALL_ROLES),
            (paths::USER_TYPES, ALL_ROLES),
            // Consumer browsing
            (paths::CONSUMER_DEALS, ALL_ROLES),
            (paths::CONSUMER_DEAL_BY_ID, ALL_ROLES),
            (paths::CONSUMER_STORES, ALL_ROLES),
            (paths::CONSUMER_STORE_BY_ID, ALL_ROLES),
            // Consumer account
            (paths::CONSUMER_NOTIFICATIONS, CONSUMER_ROLES),
            (paths::CONSUMER_NOTIFICATION_BY_ID, CONSUMER_ROLES),
            (paths::CONSUMER_REDEMPTIONS, CONSUMER_ROLES),
            (paths::CONSUMER_REWARDS, CONSUMER_ROLES),
            (paths::CONSUMER_REFERRALS, CONSUMER_ROLES),
            (paths::CONSUMER_VISITS, CONSUMER_ROLES),
            // Partner
            (paths::PARTNER_STORE, PARTNER_ROLES),
            (paths::PARTNER_DEALS, PARTNER_ROLES),
            (paths::PARTNER_DEAL_BY_ID, PARTNER_ROLES),
            (paths::PARTNER_REDEMPTIONS, PARTNER_ROLES),
            (paths::PARTNER_REVIEWS, PARTNER_ROLES),
            (paths::PARTNER_VISITS, PARTNER_ROLES),
            (paths::PARTNER_ANALYTICS, PARTNER_ROLES),
        ];

        let post: Vec<Entry> = vec![
            // Auth (login and send-otp are public and never reach the
            // role check; verify-otp likewise)
            (paths::LOGOUT, ALL_ROLES),
            (paths::SET_PASSWORD, ALL_ROLES),
            (paths::REFRESH_TOKEN, ALL_ROLES),
            // Consumer actions
            (paths::CONSUMER_REDEEM, CONSUMER_ROLES),
            (paths::CONSUMER_REFERRALS, CONSUMER_ROLES),
            (paths::CONSUMER_REVIEWS, CONSUMER_ROLES),
            (paths::CONSUMER_VISITS, CONSUMER_ROLES),
            (paths::CONSUMER_VISIT_COMPLETE, CONSUMER_ROLES),
            // Partner actions
            (paths::PARTNER_DEALS, PARTNER_ROLES),
            (paths::PARTNER_DEAL_DEACTIVATE, PARTNER_ROLES),
            (paths::PARTNER_VISIT_COMPLETE, PARTNER_ROLES),
        ];

        let patch: Vec<Entry> = vec![
            (paths::CONSUMER_PROFILE, CONSUMER_ROLES),
            (paths::CONSUMER_NOTIFICATION_BY_ID, CONSUMER_ROLES),
            (paths::PARTNER_STORE, PARTNER_ROLES),
            (paths::PARTNER_DEAL_BY_ID, PARTNER_ROLES),
        ];

        // No DELETE routes are deployed yet.
        let delete: Vec<Entry> = vec![];

        Self {
            tables: vec![
                (Method::GET, get),
                (Method::POST, post),
                (Method::PATCH, patch),
                (Method::DELETE, delete),
            ],
        }
    }

    /// An empty table (used by tests to exercise fail-open behavior).
    pub fn empty() -> Self {
        Self { tables: Vec::new() }
    }

    /// Allowed roles for the first declared pattern matching `path` under
    /// `method`, or `None` when no method table or no pattern matches.
    pub fn roles_for(&self, method: &Method, path: &str) -> Option<&'static [Role]> {
        let (_, entries) = self.tables.iter().find(|(m, _)| m == method)?;
        entries
            .iter()
            .find(|(pattern, _)| *pattern == path || route_matches(pattern, path))
            .map(|(_, roles)| *roles)
    }
}

impl Default for PermissionTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Report registered routes that are neither public nor covered by a
/// permission entry. Such routes pass the gate without a role check, so
/// they are logged at startup and returned for tests to assert on.
pub fn audit_route_coverage(
    table: &PermissionTable,
    routes: &[(Method, &str)],
) -> Vec<(Method, String)> {
    let mut uncovered = Vec::new();
    for (method, pattern) in routes {
        if *method == Method::OPTIONS || is_public_path(pattern) {
            continue;
        }
        if table.roles_for(method, pattern).is_none() {
            tracing::warn!(
                %method,
                route = %pattern,
                "route has no permission entry; requests pass without a role check"
            );
            uncovered.push((method.clone(), pattern.to_string()));
        }
    }
    uncovered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matcher_accepts_param_segments() {
        assert!(route_matches(
            "/api/consumer/deals/:id",
            "/api/consumer/deals/42"
        ));
        assert!(route_matches(
            "/api/consumer/deals/:id/complete",
            "/api/consumer/deals/42/complete"
        ));
    }

    #[test]
    fn matcher_requires_equal_segment_count() {
        assert!(!route_matches("/api/consumer/deals/:id", "/api/consumer/deals"));
        assert!(!route_matches(
            "/api/consumer/deals/:id",
            "/api/consumer/deals/42/extra"
        ));
    }

    #[test]
    fn matcher_compares_literal_segments() {
        assert!(!route_matches("/api/partner/store", "/api/partner/stores"));
        assert!(route_matches("/api/partner/store", "/api/partner/store"));
        // Trailing slashes collapse during segment splitting.
        assert!(route_matches("/api/partner/store", "/api/partner/store/"));
    }

    #[test]
    fn param_segment_has_no_format_constraint() {
        assert!(route_matches(
            "/api/consumer/stores/:id",
            "/api/consumer/stores/not-a-number"
        ));
    }

    #[test]
    fn public_paths_cover_exact_and_dynamic_forms() {
        assert!(is_public_path(paths::LOGIN));
        assert!(is_public_path(paths::SEND_OTP));
        assert!(is_public_path(paths::VERIFY_OTP));
        assert!(is_public_path(paths::CATEGORIES));
        assert!(is_public_path("/api/consumer/deals/7"));
        assert!(is_public_path("/api/consumer/stores/19"));

        assert!(!is_public_path(paths::CONSUMER_REWARDS));
        assert!(!is_public_path("/api/consumer/deals"));
        assert!(!is_public_path(paths::USER_TYPES));
    }

    #[test]
    fn roles_for_finds_dynamic_patterns() {
        let table = PermissionTable::standard();

        let roles = table
            .roles_for(&Method::GET, "/api/partner/deals/12")
            .expect("partner deal detail covered");
        assert!(roles.contains(&Role::Seller));
        assert!(roles.contains(&Role::Admin));
        assert!(!roles.contains(&Role::Buyer));

        let roles = table
            .roles_for(&Method::POST, "/api/consumer/visits/3/complete")
            .expect("visit completion covered");
        assert_eq!(roles, CONSUMER_ROLES);
    }

    #[test]
    fn roles_for_is_none_for_unknown_method_or_path() {
        let table = PermissionTable::standard();
        assert!(table.roles_for(&Method::PUT, "/api/partner/store").is_none());
        assert!(table
            .roles_for(&Method::GET, "/api/partner/unknown")
            .is_none());
        assert!(table.roles_for(&Method::DELETE, "/api/partner/store").is_none());
    }

    #[test]
    fn partner_routes_exclude_buyer() {
        let table = PermissionTable::standard();
        let roles = table.roles_for(&Method::GET, paths::PARTNER_STORE).unwrap();
        assert!(!roles.contains(&Role::Buyer));
        assert!(!roles.contains(&Role::Visitor));
    }

    #[test]
    fn first_match_wins_for_overlapping_patterns() {
        // Declaration order decides: an exact pattern declared before a
        // wildcard that also matches takes precedence.
        let earlier: &[Role] = &[Role::Admin];
        let later: &[Role] = ALL_ROLES;
        let table = PermissionTable {
            tables: vec![(
                Method::GET,
                vec![("/api/x/special", earlier), ("/api/x/:id", later)],
            )],
        };
        assert_eq!(
            table.roles_for(&Method::GET, "/api/x/special"),
            Some(earlier)
        );
        assert_eq!(table.roles_for(&Method::GET, "/api/x/other"), Some(later));
    }

    #[test]
    fn audit_reports_uncovered_routes() {
        let table = PermissionTable::standard();

        // Fully covered surface: nothing reported.
        let covered = [
            (Method::GET, paths::CONSUMER_REWARDS),
            (Method::POST, paths::CONSUMER_REDEEM),
            (Method::GET, paths::LOGIN), // public: skipped
        ];
        assert!(audit_route_coverage(&table, &covered).is_empty());

        // A reachable route missing from the table is reported.
        let uncovered = [(Method::GET, "/api/partner/payouts")];
        let report = audit_route_coverage(&table, &uncovered);
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].1, "/api/partner/payouts");
    }
}
