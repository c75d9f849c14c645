//! Subscription packages, seat tiers and checkout payloads.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Price band for a headcount range (both ends inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatTier {
    pub min_employees: u32,
    pub max_employees: u32,
    /// Monthly price per seat, in whole rupiah.
    pub price_per_user: i64,
}

impl SeatTier {
    pub fn contains(&self, headcount: u32) -> bool {
        self.min_employees <= headcount && headcount <= self.max_employees
    }

    pub fn label(&self) -> String {
        format!("{} - {} employees", self.min_employees, self.max_employees)
    }
}

/// Subscription package offered by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    pub tiers: Vec<SeatTier>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingCycle {
    #[default]
    Monthly,
    Yearly,
}

impl BillingCycle {
    pub fn label(&self) -> &'static str {
        match self {
            BillingCycle::Monthly => "Monthly",
            BillingCycle::Yearly => "Yearly",
        }
    }

    pub fn months(&self) -> i64 {
        match self {
            BillingCycle::Monthly => 1,
            BillingCycle::Yearly => 12,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Trial,
    Active,
    PastDue,
    Cancelled,
}

impl SubscriptionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SubscriptionStatus::Trial => "Trial",
            SubscriptionStatus::Active => "Active",
            SubscriptionStatus::PastDue => "Past Due",
            SubscriptionStatus::Cancelled => "Cancelled",
        }
    }
}

/// Company's current subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub package_id: i64,
    pub package_name: String,
    pub seats: u32,
    pub cycle: BillingCycle,
    pub status: SubscriptionStatus,
    pub current_period_end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub package_id: i64,
    pub seats: u32,
    pub cycle: BillingCycle,
}

/// Order created by the backend; payment happens at `payment_url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub order_id: String,
    pub amount: i64,
    pub payment_url: String,
}
