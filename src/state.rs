// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ShopPulse

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::auth::gate::GateState;
use crate::auth::permissions::PermissionTable;
use crate::auth::tokens::{SecurityConfig, TokenService};
use crate::config::INSECURE_FALLBACK_SECRET;
use crate::otp::{LogMailer, Mailer};
use crate::store::InMemoryStore;

/// Shared application state. Cheap to clone; the store is the only
/// mutable member and sits behind an async `RwLock`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<InMemoryStore>>,
    pub tokens: Arc<TokenService>,
    pub permissions: Arc<PermissionTable>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub fn new(store: InMemoryStore, tokens: TokenService, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            tokens: Arc::new(tokens),
            permissions: Arc::new(PermissionTable::standard()),
            mailer,
        }
    }

    /// The slice of state the authorization gate needs.
    pub fn gate_state(&self) -> GateState {
        GateState {
            tokens: self.tokens.clone(),
            permissions: self.permissions.clone(),
        }
    }
}

impl Default for AppState {
    /// Development/test state: empty store, fallback signing secrets,
    /// log-only OTP delivery.
    fn default() -> Self {
        Self::new(
            InMemoryStore::new(),
            TokenService::new(SecurityConfig::new(
                INSECURE_FALLBACK_SECRET,
                INSECURE_FALLBACK_SECRET,
            )),
            Arc::new(LogMailer),
        )
    }
}
