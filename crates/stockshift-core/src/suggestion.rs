//! The transfer suggestion and its lifecycle state.
//!
//! Status is a tagged union: only approved suggestions carry a tracking code
//! and shipping details, only rejected ones carry a rejection reason.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;

use crate::economics::{Assessment, TransferPlan};
use crate::generator::TransferCandidate;
use crate::urgency::Urgency;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferSuggestion {
    pub id: String,
    /// Bumped on every successful transition.
    pub version: u64,
    #[serde(flatten)]
    pub plan: TransferPlan,
    #[serde(flatten)]
    pub assessment: Assessment,
    pub confidence: f64,
    pub reason: String,
    pub created_at: DateTime<Utc>,
    pub status: SuggestionStatus,
    /// Route the suggestion was admitted on. Edits move `plan`, not this.
    pub admitted_route: RouteKey,
}

/// Source, destination, and SKU of a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RouteKey {
    pub from_store_id: String,
    pub to_store_id: String,
    pub sku: String,
}

impl RouteKey {
    #[must_use]
    pub fn of(plan: &TransferPlan) -> Self {
        Self {
            from_store_id: plan.from_store_id.clone(),
            to_store_id: plan.to_store_id.clone(),
            sku: plan.sku.clone(),
        }
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} ({})", self.from_store_id, self.to_store_id, self.sku)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SuggestionStatus {
    Pending,
    Editing,
    Approved(Approval),
    Rejected(Rejection),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Approval {
    pub approved_by: String,
    pub approved_at: DateTime<Utc>,
    pub tracking_code: String,
    pub shipping_cost: f64,
    pub eta_days: u32,
    pub shipping: ShippingStage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rejection {
    pub rejected_by: String,
    pub rejected_at: DateTime<Utc>,
    pub reason: RejectionReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShippingStage {
    Pending,
    InTransit,
    Delivered,
}

impl ShippingStage {
    /// The following stage; `Delivered` is terminal and maps to itself.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            ShippingStage::Pending => ShippingStage::InTransit,
            ShippingStage::InTransit | ShippingStage::Delivered => ShippingStage::Delivered,
        }
    }
}

/// Why a reviewer turned a suggestion down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RejectionReason {
    CostTooHigh,
    NotNeeded,
    BetterAlternative,
    Other(String),
}

impl RejectionReason {
    /// Parse reviewer input. Blank input is no reason at all.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self::from(trimmed.to_string()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            RejectionReason::CostTooHigh => "Cost too high",
            RejectionReason::NotNeeded => "Not needed",
            RejectionReason::BetterAlternative => "Better alternative available",
            RejectionReason::Other(text) => text,
        }
    }
}

impl From<String> for RejectionReason {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Cost too high" => RejectionReason::CostTooHigh,
            "Not needed" => RejectionReason::NotNeeded,
            "Better alternative available" => RejectionReason::BetterAlternative,
            _ => RejectionReason::Other(value),
        }
    }
}

impl From<RejectionReason> for String {
    fn from(value: RejectionReason) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TransferSuggestion {
    /// A freshly admitted suggestion awaiting review.
    #[must_use]
    pub fn from_candidate(id: String, candidate: TransferCandidate, now: DateTime<Utc>) -> Self {
        Self {
            id,
            version: 0,
            admitted_route: RouteKey::of(&candidate.plan),
            plan: candidate.plan,
            assessment: candidate.assessment,
            confidence: candidate.confidence,
            reason: candidate.reason,
            created_at: now,
            status: SuggestionStatus::Pending,
        }
    }

    #[must_use]
    pub fn urgency(&self) -> Urgency {
        self.assessment.urgency
    }

    #[must_use]
    pub fn tracking_code(&self) -> Option<&str> {
        match &self.status {
            SuggestionStatus::Approved(a) => Some(a.tracking_code.as_str()),
            _ => None,
        }
    }

    /// Not yet approved or rejected.
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(
            self.status,
            SuggestionStatus::Pending | SuggestionStatus::Editing
        )
    }

    #[must_use]
    pub fn is_approved(&self) -> bool {
        matches!(self.status, SuggestionStatus::Approved(_))
    }

    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(self.status, SuggestionStatus::Rejected(_))
    }

    /// Flat status label, with shipping sub-states surfaced for approved transfers.
    #[must_use]
    pub fn status_label(&self) -> &'static str {
        match &self.status {
            SuggestionStatus::Pending => "pending",
            SuggestionStatus::Editing => "editing",
            SuggestionStatus::Approved(a) => match a.shipping {
                ShippingStage::Pending => "approved",
                ShippingStage::InTransit => "in-transit",
                ShippingStage::Delivered => "delivered",
            },
            SuggestionStatus::Rejected(_) => "rejected",
        }
    }

    /// Current route; at most one suggestion sits on any route.
    #[must_use]
    pub fn route_key(&self) -> RouteKey {
        RouteKey::of(&self.plan)
    }

    /// Routes a refresh must not re-admit: the current one and the one the
    /// suggestion was admitted on, which differ after an edit.
    #[must_use]
    pub fn claimed_routes(&self) -> [RouteKey; 2] {
        [self.route_key(), self.admitted_route.clone()]
    }
}
