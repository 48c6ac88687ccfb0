// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ShopPulse

//! One-time passcodes and their delivery interface.
//!
//! Codes are stored in the data store with a 3-minute expiry and consumed
//! on successful verification. Delivery goes through the [`Mailer`] trait;
//! the only in-tree implementation logs the code, which is also the
//! development fallback the service always had when no mail transport was
//! configured.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::config::OTP_TTL_SECS;

/// Generate a random 6-digit code.
pub fn generate_code() -> String {
    rand::rng().random_range(100_000..1_000_000).to_string()
}

/// Expiry instant for a code issued at `now`.
pub fn expiry_from(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::seconds(OTP_TTL_SECS)
}

/// Outbound OTP delivery.
///
/// Real transports (SMTP, a sending API) live behind this seam; the core
/// never depends on delivery mechanics.
pub trait Mailer: Send + Sync {
    fn send_otp(&self, email: &str, code: &str);
}

/// Logs the code instead of sending mail.
#[derive(Debug, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send_otp(&self, email: &str, code: &str) {
        tracing::info!(email, code, "OTP issued (log delivery)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_are_six_digits() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
            assert_ne!(code.chars().next(), Some('0'));
        }
    }

    #[test]
    fn expiry_is_three_minutes_out() {
        let now = Utc::now();
        assert_eq!(expiry_from(now) - now, Duration::seconds(180));
    }
}
