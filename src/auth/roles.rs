// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ShopPulse

//! User roles for authorization.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// User roles for authorization.
///
/// ## Roles
///
/// - `Admin` - Full access across consumer and partner endpoints
/// - `Buyer` - Consumer: browses deals, schedules visits, earns points
/// - `Seller` - Partner merchant: manages a store, deals and redemptions
/// - `Visitor` - Unauthenticated-tier identity: browse-only access
///
/// There is no implicit hierarchy; each route's permission entry lists the
/// allowed roles explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Full administrative access
    Admin,
    /// Consumer user (earns and redeems points)
    Buyer,
    /// Partner merchant (owns a store)
    Seller,
    /// Browse-only identity
    Visitor,
}

impl Role {
    /// Parse role from its wire form (case-insensitive).
    pub fn parse(s: &str) -> Option<Role> {
        match s.to_uppercase().as_str() {
            "ADMIN" => Some(Role::Admin),
            "BUYER" => Some(Role::Buyer),
            "SELLER" => Some(Role::Seller),
            "VISITOR" => Some(Role::Visitor),
            _ => None,
        }
    }

    /// The canonical wire form (`ADMIN`, `BUYER`, `SELLER`, `VISITOR`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Buyer => "BUYER",
            Role::Seller => "SELLER",
            Role::Visitor => "VISITOR",
        }
    }
}

impl Default for Role {
    /// Default role is Visitor (least privilege).
    fn default() -> Self {
        Role::Visitor
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_any_case() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("ADMIN"), Some(Role::Admin));
        assert_eq!(Role::parse("Buyer"), Some(Role::Buyer));
        assert_eq!(Role::parse("seller"), Some(Role::Seller));
        assert_eq!(Role::parse("VISITOR"), Some(Role::Visitor));
        assert_eq!(Role::parse("unknown"), None);
    }

    #[test]
    fn wire_form_round_trips() {
        for role in [Role::Admin, Role::Buyer, Role::Seller, Role::Visitor] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
    }

    #[test]
    fn serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Role::Buyer).unwrap(), "\"BUYER\"");
        let parsed: Role = serde_json::from_str("\"SELLER\"").unwrap();
        assert_eq!(parsed, Role::Seller);
    }

    #[test]
    fn default_role_is_visitor() {
        assert_eq!(Role::default(), Role::Visitor);
    }
}
