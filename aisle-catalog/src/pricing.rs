use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// Fare adjustment policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FarePolicy {
    /// Bookings at least this many whole days out get the advance discount
    pub advance_purchase_days: i64,

    pub advance_purchase_multiplier: f64,

    /// Bookings at most this many whole days out pay the last-minute surcharge
    pub last_minute_days: i64,

    pub last_minute_multiplier: f64,

    pub loyalty_multiplier: f64,
}

impl Default for FarePolicy {
    fn default() -> Self {
        Self {
            advance_purchase_days: 30,
            advance_purchase_multiplier: 0.90,
            last_minute_days: 7,
            last_minute_multiplier: 1.20,
            loyalty_multiplier: 0.95,
        }
    }
}

/// Deterministic fare calculator.
///
/// The steps are applied in a fixed order, each multiplying the running
/// total: advance-purchase window, demand (occupancy), loyalty. No rounding
/// is done here.
#[derive(Debug, Clone, Default)]
pub struct PricingEngine {
    policy: FarePolicy,
}

impl PricingEngine {
    pub fn new(policy: FarePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &FarePolicy {
        &self.policy
    }

    /// Whole days between booking and departure, truncated toward zero
    pub fn days_to_departure(departure: DateTime<Utc>, booked_at: DateTime<Utc>) -> i64 {
        (departure - booked_at).num_days()
    }

    pub fn calculate_time_multiplier(&self, departure: DateTime<Utc>, booked_at: DateTime<Utc>) -> f64 {
        let days = Self::days_to_departure(departure, booked_at);

        if days >= self.policy.advance_purchase_days {
            self.policy.advance_purchase_multiplier
        } else if days <= self.policy.last_minute_days {
            self.policy.last_minute_multiplier
        } else {
            1.0
        }
    }

    pub fn quote(
        &self,
        base_fare: f64,
        departure: DateTime<Utc>,
        booked_at: DateTime<Utc>,
        occupancy_ratio: f64,
        loyalty_member: bool,
    ) -> f64 {
        let mut price = base_fare * self.calculate_time_multiplier(departure, booked_at);

        price *= 1.0 + occupancy_ratio;

        if loyalty_member {
            price *= self.policy.loyalty_multiplier;
        }

        price
    }
}
