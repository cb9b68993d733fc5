//! Audit logging for subscription changes.
//!
//! Every lifecycle step the manager takes is reported to a
//! [`SubscriptionAuditLogger`]. The default logger forwards events to
//! `tracing`; plug in your own to keep a history elsewhere.

use std::fmt;

use super::plans::PlanId;

/// Audit event types for subscription operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionAuditEvent {
    /// No usable record was stored, so a default trial was created.
    Created { plan: PlanId, trial_days: u32 },
    /// An existing record was loaded from the store.
    Restored { plan: PlanId, status: String },
    /// The plan was changed and its features copied onto the subscription.
    PlanChanged { from: PlanId, to: PlanId },
    /// The subscription was cancelled.
    Cancelled { plan: PlanId },
}

impl fmt::Display for SubscriptionAuditEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created { plan, trial_days } => {
                write!(f, "Subscription created: plan={}, trial_days={}", plan, trial_days)
            }
            Self::Restored { plan, status } => {
                write!(f, "Subscription restored: plan={}, status={}", plan, status)
            }
            Self::PlanChanged { from, to } => {
                write!(f, "Subscription plan changed: from={}, to={}", from, to)
            }
            Self::Cancelled { plan } => {
                write!(f, "Subscription cancelled: plan={}", plan)
            }
        }
    }
}

/// Trait for audit logging backends.
///
/// Implementations must not fail outward; a lost audit event never blocks a
/// subscription change.
pub trait SubscriptionAuditLogger: Send + Sync {
    /// Log a subscription audit event.
    fn log(&self, event: SubscriptionAuditEvent);
}

/// Audit logger that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpAuditLogger;

impl SubscriptionAuditLogger for NoOpAuditLogger {
    fn log(&self, _event: SubscriptionAuditEvent) {}
}

/// Tracing-based audit logger.
///
/// Logs audit events at INFO level under the `leasekit::billing::audit` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditLogger;

impl SubscriptionAuditLogger for TracingAuditLogger {
    fn log(&self, event: SubscriptionAuditEvent) {
        tracing::info!(
            target: "leasekit::billing::audit",
            event_type = %event_kind(&event),
            "{}", event
        );
    }
}

/// Get the event kind as a string for structured logging.
pub fn event_kind(event: &SubscriptionAuditEvent) -> &'static str {
    match event {
        SubscriptionAuditEvent::Created { .. } => "subscription_created",
        SubscriptionAuditEvent::Restored { .. } => "subscription_restored",
        SubscriptionAuditEvent::PlanChanged { .. } => "subscription_plan_changed",
        SubscriptionAuditEvent::Cancelled { .. } => "subscription_cancelled",
    }
}
