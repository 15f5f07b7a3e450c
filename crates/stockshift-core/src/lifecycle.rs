//! Review and shipping lifecycle of a transfer suggestion.
//!
//! The transition functions are pure: they take the current suggestion and
//! return the next one, or an error with nothing changed. [`LifecycleManager`]
//! applies them in place, enforces the optional version check, and hands a
//! [`TransferEvent`] to the notifier once the new state is committed.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::economics::recompute;
use crate::network::StoreNetwork;
use crate::notify::{Notifier, TransferAction, TransferEvent};
use crate::settings::EngineSettings;
use crate::shipping::ShippingEstimator;
use crate::suggestion::{
    Approval, Rejection, RejectionReason, RouteKey, ShippingStage, SuggestionStatus,
    TransferSuggestion,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Guard(String),

    #[error("suggestion '{0}' not found")]
    NotFound(String),

    #[error("suggestion was modified concurrently (expected version {expected}, found {actual})")]
    Conflict { expected: u64, actual: u64 },
}

impl LifecycleError {
    /// Stable machine-readable code for API envelopes.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            LifecycleError::Validation(_) => "validation_error",
            LifecycleError::Guard(_) => "guard_violation",
            LifecycleError::NotFound(_) => "not_found",
            LifecycleError::Conflict { .. } => "conflict",
        }
    }
}

/// Draft values submitted when saving an edit.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EditRequest {
    pub from_store_id: String,
    pub to_store_id: String,
    /// Signed so that zero and negative drafts reach validation.
    pub quantity: i64,
    #[serde(default)]
    pub reason: Option<String>,
}

fn describe(s: &TransferSuggestion) -> String {
    format!("suggestion '{}' is {}", s.id, s.status_label())
}

fn next_version(mut s: TransferSuggestion) -> TransferSuggestion {
    s.version += 1;
    s
}

/// `pending -> editing`. Already editing is accepted unchanged.
///
/// # Errors
///
/// [`LifecycleError::Guard`] when the suggestion is approved or rejected.
pub fn begin_edit(s: &TransferSuggestion) -> Result<TransferSuggestion, LifecycleError> {
    match s.status {
        SuggestionStatus::Pending => {
            let mut next = s.clone();
            next.status = SuggestionStatus::Editing;
            Ok(next_version(next))
        }
        SuggestionStatus::Editing => Ok(s.clone()),
        _ => Err(LifecycleError::Guard(format!(
            "{}; only pending suggestions can be edited",
            describe(s)
        ))),
    }
}

/// `editing -> pending`, discarding the draft.
///
/// # Errors
///
/// [`LifecycleError::Guard`] when the suggestion is not being edited.
pub fn cancel_edit(s: &TransferSuggestion) -> Result<TransferSuggestion, LifecycleError> {
    if s.status != SuggestionStatus::Editing {
        return Err(LifecycleError::Guard(format!(
            "{}; there is no edit to cancel",
            describe(s)
        )));
    }
    let mut next = s.clone();
    next.status = SuggestionStatus::Pending;
    Ok(next_version(next))
}

/// `editing -> pending` with the draft applied and every derived field
/// recomputed. Surplus and shortage are kept; savings fall back to the
/// avoided-loss proxy.
///
/// # Errors
///
/// [`LifecycleError::Guard`] when not editing, [`LifecycleError::Validation`]
/// for a same-store route, an unknown store, or a quantity outside
/// `1..=surplus`.
pub fn save_edit(
    s: &TransferSuggestion,
    edit: &EditRequest,
    network: &StoreNetwork,
    settings: &EngineSettings,
) -> Result<TransferSuggestion, LifecycleError> {
    if s.status != SuggestionStatus::Editing {
        return Err(LifecycleError::Guard(format!(
            "{}; begin an edit before saving",
            describe(s)
        )));
    }

    let from = edit.from_store_id.trim();
    let to = edit.to_store_id.trim();
    if from == to {
        return Err(LifecycleError::Validation(
            "Source and destination stores cannot be the same".to_string(),
        ));
    }
    for id in [from, to] {
        if network.store(id).is_none() {
            return Err(LifecycleError::Validation(format!("unknown store '{id}'")));
        }
    }
    if edit.quantity <= 0 {
        return Err(LifecycleError::Validation(
            "Quantity must be greater than zero".to_string(),
        ));
    }
    if edit.quantity > i64::from(s.plan.surplus) {
        return Err(LifecycleError::Validation(format!(
            "Quantity cannot exceed available surplus of {}",
            s.plan.surplus
        )));
    }
    let quantity = u32::try_from(edit.quantity)
        .map_err(|_| LifecycleError::Validation("Quantity is out of range".to_string()))?;

    let mut plan = s.plan.clone();
    plan.from_store_id = from.to_string();
    plan.to_store_id = to.to_string();
    plan.quantity = quantity;
    plan.supplied_savings = None;

    let assessment =
        recompute(&plan, network, settings).map_err(|e| LifecycleError::Validation(e.to_string()))?;

    let mut next = s.clone();
    next.plan = plan;
    next.assessment = assessment;
    if let Some(reason) = edit.reason.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
        next.reason = reason.to_string();
    }
    next.status = SuggestionStatus::Pending;
    Ok(next_version(next))
}

fn require_pending(s: &TransferSuggestion, action: &str) -> Result<(), LifecycleError> {
    match s.status {
        SuggestionStatus::Pending => Ok(()),
        SuggestionStatus::Editing => Err(LifecycleError::Guard(format!(
            "{}; save or cancel the edit before it can be {action}",
            describe(s)
        ))),
        _ => Err(LifecycleError::Guard(format!(
            "{}; it can no longer be {action}",
            describe(s)
        ))),
    }
}

fn require_actor(actor: &str) -> Result<&str, LifecycleError> {
    let actor = actor.trim();
    if actor.is_empty() {
        Err(LifecycleError::Validation("actor identity is required".to_string()))
    } else {
        Ok(actor)
    }
}

/// `pending -> approved`, with a tracking code and quote from `estimator`.
///
/// # Errors
///
/// [`LifecycleError::Guard`] unless pending; [`LifecycleError::Validation`]
/// for a blank approver.
pub fn approve(
    s: &TransferSuggestion,
    approved_by: &str,
    estimator: &dyn ShippingEstimator,
    now: DateTime<Utc>,
) -> Result<TransferSuggestion, LifecycleError> {
    require_pending(s, "approved")?;
    let approved_by = require_actor(approved_by)?;

    let quote = estimator.quote(s.assessment.distance_miles);
    let mut next = s.clone();
    next.status = SuggestionStatus::Approved(Approval {
        approved_by: approved_by.to_string(),
        approved_at: now,
        tracking_code: estimator.tracking_code(&s.id),
        shipping_cost: quote.cost,
        eta_days: quote.eta_days,
        shipping: ShippingStage::Pending,
    });
    Ok(next_version(next))
}

/// `pending -> rejected`. A reason is mandatory.
///
/// # Errors
///
/// [`LifecycleError::Guard`] unless pending; [`LifecycleError::Validation`]
/// for a missing reason or blank actor.
pub fn reject(
    s: &TransferSuggestion,
    rejected_by: &str,
    reason: Option<RejectionReason>,
    now: DateTime<Utc>,
) -> Result<TransferSuggestion, LifecycleError> {
    require_pending(s, "rejected")?;
    let rejected_by = require_actor(rejected_by)?;
    let reason = match reason {
        Some(RejectionReason::Other(text)) if text.trim().is_empty() => None,
        other => other,
    }
    .ok_or_else(|| LifecycleError::Validation("A rejection reason is required".to_string()))?;

    let mut next = s.clone();
    next.status = SuggestionStatus::Rejected(Rejection {
        rejected_by: rejected_by.to_string(),
        rejected_at: now,
        reason,
    });
    Ok(next_version(next))
}

/// Move an approved transfer to its next shipping stage. Delivered stays
/// delivered and the suggestion is returned unchanged.
///
/// # Errors
///
/// [`LifecycleError::Guard`] unless approved.
pub fn advance_shipping(s: &TransferSuggestion) -> Result<TransferSuggestion, LifecycleError> {
    let SuggestionStatus::Approved(approval) = &s.status else {
        return Err(LifecycleError::Guard(format!(
            "{}; only approved transfers ship",
            describe(s)
        )));
    };
    if approval.shipping == ShippingStage::Delivered {
        return Ok(s.clone());
    }
    let mut approval = approval.clone();
    approval.shipping = approval.shipping.next();
    let mut next = s.clone();
    next.status = SuggestionStatus::Approved(approval);
    Ok(next_version(next))
}

/// Applies transitions in place and dispatches notifications.
#[derive(Clone)]
pub struct LifecycleManager {
    settings: EngineSettings,
    estimator: Arc<dyn ShippingEstimator>,
    notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for LifecycleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleManager")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl LifecycleManager {
    #[must_use]
    pub fn new(
        settings: EngineSettings,
        estimator: Arc<dyn ShippingEstimator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            settings,
            estimator,
            notifier,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    fn check_version(s: &TransferSuggestion, expected: Option<u64>) -> Result<(), LifecycleError> {
        match expected {
            Some(expected) if expected != s.version => Err(LifecycleError::Conflict {
                expected,
                actual: s.version,
            }),
            _ => Ok(()),
        }
    }

    fn dispatch(
        &self,
        s: &TransferSuggestion,
        action: TransferAction,
        actor: &str,
        network: &StoreNetwork,
    ) {
        let event = TransferEvent::from_suggestion(s, action, actor, network, Utc::now());
        if let Err(e) = self.notifier.notify(&event) {
            tracing::warn!(
                suggestion_id = %s.id,
                action = action.as_str(),
                error = %e,
                "transfer notification failed"
            );
        }
    }

    /// # Errors
    ///
    /// See [`begin_edit`]; also [`LifecycleError::Conflict`] on a version mismatch.
    pub fn begin_edit(
        &self,
        s: &mut TransferSuggestion,
        expected_version: Option<u64>,
    ) -> Result<(), LifecycleError> {
        Self::check_version(s, expected_version)?;
        *s = begin_edit(s)?;
        Ok(())
    }

    /// # Errors
    ///
    /// See [`cancel_edit`]; also [`LifecycleError::Conflict`] on a version mismatch.
    pub fn cancel_edit(
        &self,
        s: &mut TransferSuggestion,
        expected_version: Option<u64>,
    ) -> Result<(), LifecycleError> {
        Self::check_version(s, expected_version)?;
        *s = cancel_edit(s)?;
        Ok(())
    }

    /// `occupied` holds the current routes of every other tracked suggestion;
    /// an edit may not move onto one of them.
    ///
    /// # Errors
    ///
    /// See [`save_edit`]; also [`LifecycleError::Validation`] for an occupied
    /// route and [`LifecycleError::Conflict`] on a version mismatch.
    pub fn save_edit(
        &self,
        s: &mut TransferSuggestion,
        edit: &EditRequest,
        editor: &str,
        network: &StoreNetwork,
        occupied: &HashSet<RouteKey>,
        expected_version: Option<u64>,
    ) -> Result<(), LifecycleError> {
        Self::check_version(s, expected_version)?;
        let editor = require_actor(editor)?;
        let next = save_edit(s, edit, network, &self.settings)?;
        let route = next.route_key();
        if occupied.contains(&route) {
            return Err(LifecycleError::Validation(format!(
                "another suggestion already covers {route}"
            )));
        }
        *s = next;
        tracing::info!(suggestion_id = %s.id, editor, quantity = s.plan.quantity, "suggestion edited");
        self.dispatch(s, TransferAction::Edited, editor, network);
        Ok(())
    }

    /// # Errors
    ///
    /// See [`approve`]; also [`LifecycleError::Conflict`] on a version mismatch.
    pub fn approve(
        &self,
        s: &mut TransferSuggestion,
        approved_by: &str,
        network: &StoreNetwork,
        expected_version: Option<u64>,
    ) -> Result<(), LifecycleError> {
        Self::check_version(s, expected_version)?;
        *s = approve(s, approved_by, self.estimator.as_ref(), Utc::now())?;
        tracing::info!(
            suggestion_id = %s.id,
            tracking_code = s.tracking_code().unwrap_or_default(),
            "suggestion approved"
        );
        self.dispatch(s, TransferAction::Approved, approved_by.trim(), network);
        Ok(())
    }

    /// # Errors
    ///
    /// See [`reject`]; also [`LifecycleError::Conflict`] on a version mismatch.
    pub fn reject(
        &self,
        s: &mut TransferSuggestion,
        rejected_by: &str,
        reason: Option<RejectionReason>,
        network: &StoreNetwork,
        expected_version: Option<u64>,
    ) -> Result<(), LifecycleError> {
        Self::check_version(s, expected_version)?;
        *s = reject(s, rejected_by, reason, Utc::now())?;
        tracing::info!(suggestion_id = %s.id, "suggestion rejected");
        self.dispatch(s, TransferAction::Rejected, rejected_by.trim(), network);
        Ok(())
    }

    /// Returns the shipping stage after the call.
    ///
    /// # Errors
    ///
    /// See [`advance_shipping`]; also [`LifecycleError::Conflict`] on a version mismatch.
    pub fn advance_shipping(
        &self,
        s: &mut TransferSuggestion,
        expected_version: Option<u64>,
    ) -> Result<ShippingStage, LifecycleError> {
        Self::check_version(s, expected_version)?;
        *s = advance_shipping(s)?;
        match &s.status {
            SuggestionStatus::Approved(a) => {
                tracing::debug!(suggestion_id = %s.id, stage = ?a.shipping, "shipping advanced");
                Ok(a.shipping)
            }
            _ => Err(LifecycleError::Guard(describe(s))),
        }
    }
}

#[cfg(test)]
#[path = "lifecycle_test.rs"]
mod tests;
