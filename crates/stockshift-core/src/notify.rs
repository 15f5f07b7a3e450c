//! Reviewer notifications.
//!
//! A notifier runs after a transition has been committed. Its outcome never
//! changes the suggestion; callers log the error and move on.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::network::StoreNetwork;
use crate::suggestion::{SuggestionStatus, TransferSuggestion};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferAction {
    Approved,
    Rejected,
    Edited,
}

impl TransferAction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TransferAction::Approved => "approved",
            TransferAction::Rejected => "rejected",
            TransferAction::Edited => "edited",
        }
    }
}

/// Payload sent to reviewers when a suggestion changes hands.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferEvent {
    pub suggestion_id: String,
    pub action: TransferAction,
    pub actor: String,
    pub from_store_id: String,
    pub from_store_name: String,
    pub to_store_id: String,
    pub to_store_name: String,
    pub sku: String,
    pub product_name: String,
    pub quantity: u32,
    pub estimated_savings: f64,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_code: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl TransferEvent {
    #[must_use]
    pub fn from_suggestion(
        suggestion: &TransferSuggestion,
        action: TransferAction,
        actor: &str,
        network: &StoreNetwork,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        let rejection_reason = match &suggestion.status {
            SuggestionStatus::Rejected(r) => Some(r.reason.to_string()),
            _ => None,
        };
        Self {
            suggestion_id: suggestion.id.clone(),
            action,
            actor: actor.to_string(),
            from_store_id: suggestion.plan.from_store_id.clone(),
            from_store_name: network.store_name(&suggestion.plan.from_store_id).to_string(),
            to_store_id: suggestion.plan.to_store_id.clone(),
            to_store_name: network.store_name(&suggestion.plan.to_store_id).to_string(),
            sku: suggestion.plan.sku.clone(),
            product_name: suggestion.plan.product_name.clone(),
            quantity: suggestion.plan.quantity,
            estimated_savings: suggestion.assessment.estimated_savings,
            reason: suggestion.reason.clone(),
            rejection_reason,
            tracking_code: suggestion.tracking_code().map(str::to_string),
            occurred_at,
        }
    }

    #[must_use]
    pub fn subject(&self) -> String {
        format!(
            "Transfer {} {}: {} x{} from {} to {}",
            self.suggestion_id,
            self.action.as_str(),
            self.product_name,
            self.quantity,
            self.from_store_name,
            self.to_store_name,
        )
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification transport failed: {0}")]
    Transport(String),

    #[error("notification rejected with status {0}")]
    Status(u16),
}

pub trait Notifier: Send + Sync {
    /// # Errors
    ///
    /// Returns [`NotifyError`] when the event could not be handed off.
    fn notify(&self, event: &TransferEvent) -> Result<(), NotifyError>;
}

/// Writes each event to the tracing log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: &TransferEvent) -> Result<(), NotifyError> {
        tracing::info!(
            suggestion_id = %event.suggestion_id,
            action = event.action.as_str(),
            actor = %event.actor,
            "{}",
            event.subject()
        );
        Ok(())
    }
}
