//! Subscription record and lifecycle.
//!
//! [`SubscriptionManager`] is the single owner of the current [`Subscription`].
//! It loads the record once on startup, writes it through to the store on every
//! change, and hands out read-only views to everything else.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::SubscriptionConfig;
use crate::persistence::{Persistence, tagged_date};
use crate::traits::store::KeyValueStore;

use super::audit::{SubscriptionAuditEvent, SubscriptionAuditLogger, TracingAuditLogger};
use super::entitlements::Entitlements;
use super::gating::Gate;
use super::plans::{Feature, LimitCheckResult, PlanCatalog, PlanFeatures, PlanId, ResourceType};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Subscription status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Paid and in good standing.
    Active,
    /// Trial period; see [`Subscription::is_trial_active_at`] for expiry.
    Trial,
    /// Payment failed. Only an external billing integration sets this.
    PastDue,
    /// Cancelled. Plan and features are kept.
    Cancelled,
}

impl SubscriptionStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Trial => "trial",
            Self::PastDue => "past_due",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The persisted subscription record.
///
/// `features` is a copy of the plan's features taken when the plan was last
/// chosen. Later catalog changes do not reach it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub plan: PlanId,
    pub status: SubscriptionStatus,
    #[serde(with = "tagged_date")]
    pub start_date: DateTime<Utc>,
    #[serde(with = "tagged_date")]
    pub end_date: DateTime<Utc>,
    #[serde(default, with = "tagged_date::option", skip_serializing_if = "Option::is_none")]
    pub trial_ends_at: Option<DateTime<Utc>>,
    pub auto_renew: bool,
    pub features: PlanFeatures,
}

impl Subscription {
    /// The record used when nothing valid is stored: a trial of the configured
    /// default plan starting at `now`.
    #[must_use]
    pub fn create_default(
        catalog: &PlanCatalog,
        config: &SubscriptionConfig,
        now: DateTime<Utc>,
    ) -> Self {
        let plan = catalog.get(config.default_plan);
        Self {
            plan: plan.id,
            status: SubscriptionStatus::Trial,
            start_date: now,
            end_date: days_after(now, config.term_days),
            trial_ends_at: Some(days_after(now, config.trial_days)),
            auto_renew: true,
            features: plan.features.clone(),
        }
    }

    /// Whether the trial is still running at `now`.
    ///
    /// Expiry is only visible here; `status` stays `Trial` after the trial ends.
    #[must_use]
    pub fn is_trial_active_at(&self, now: DateTime<Utc>) -> bool {
        self.status == SubscriptionStatus::Trial
            && self.trial_ends_at.is_some_and(|ends_at| now < ends_at)
    }

    /// Whole days left in the trial at `now`, rounded up. Zero once the trial
    /// has ended or when no trial end is set.
    #[must_use]
    pub fn days_left_in_trial_at(&self, now: DateTime<Utc>) -> u32 {
        let Some(ends_at) = self.trial_ends_at else {
            return 0;
        };
        let remaining_ms = (ends_at - now).num_milliseconds();
        if remaining_ms <= 0 {
            return 0;
        }
        let days = (remaining_ms + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY;
        u32::try_from(days).unwrap_or(u32::MAX)
    }

    /// Apply a plan change: copy the plan's features, mark active and clear the trial.
    fn apply_plan(&mut self, catalog: &PlanCatalog, plan: PlanId) {
        self.plan = plan;
        self.features = catalog.get(plan).features.clone();
        self.status = SubscriptionStatus::Active;
        self.trial_ends_at = None;
    }

    fn apply_cancel(&mut self) {
        self.status = SubscriptionStatus::Cancelled;
        self.auto_renew = false;
    }
}

/// `now` plus `days`, clamped to the latest representable instant.
fn days_after(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    now.checked_add_signed(Duration::days(i64::from(days)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Owner of the current subscription.
///
/// Mutations take `&mut self`, so there is exactly one writer at a time. Each
/// mutation is saved before it returns. Saves fail soft: a store error is
/// logged and the in-memory record stays authoritative.
///
/// # Example
///
/// ```rust
/// use leasekit::billing::{Feature, PlanCatalog, PlanId, ResourceType, SubscriptionManager};
/// use leasekit::config::SubscriptionConfig;
/// use leasekit::storage::MemoryStore;
///
/// let mut manager = SubscriptionManager::initialize(
///     MemoryStore::new(),
///     PlanCatalog::standard(),
///     SubscriptionConfig::default(),
/// );
/// assert!(manager.is_trial_active());
///
/// manager.update_subscription(PlanId::Free);
/// assert!(!manager.has_feature(Feature::ApiAccess));
/// assert!(!manager.can_add_more(ResourceType::Properties, 2));
/// ```
pub struct SubscriptionManager<S: KeyValueStore> {
    persistence: Persistence<S>,
    catalog: PlanCatalog,
    config: SubscriptionConfig,
    audit: Arc<dyn SubscriptionAuditLogger>,
    subscription: Subscription,
}

impl<S: KeyValueStore> SubscriptionManager<S> {
    /// Load the stored subscription, or create and store the default one.
    pub fn initialize(store: S, catalog: PlanCatalog, config: SubscriptionConfig) -> Self {
        Self::initialize_at(store, catalog, config, Utc::now())
    }

    /// [`initialize`](Self::initialize) with an explicit current time.
    pub fn initialize_at(
        store: S,
        catalog: PlanCatalog,
        config: SubscriptionConfig,
        now: DateTime<Utc>,
    ) -> Self {
        Self::initialize_with_audit(store, catalog, config, Arc::new(TracingAuditLogger), now)
    }

    /// [`initialize_at`](Self::initialize_at) reporting to a custom audit logger.
    ///
    /// Reads the store exactly once. When nothing usable is stored the default
    /// record is written back immediately.
    pub fn initialize_with_audit(
        store: S,
        catalog: PlanCatalog,
        config: SubscriptionConfig,
        audit: Arc<dyn SubscriptionAuditLogger>,
        now: DateTime<Utc>,
    ) -> Self {
        let persistence = Persistence::new(store);

        let subscription = match persistence.load_existing::<Subscription>(&config.storage_key) {
            Some(stored) => {
                tracing::debug!(
                    target: "leasekit::billing",
                    key = %config.storage_key,
                    plan = %stored.plan,
                    status = %stored.status,
                    "Restored subscription"
                );
                audit.log(SubscriptionAuditEvent::Restored {
                    plan: stored.plan,
                    status: stored.status.to_string(),
                });
                stored
            }
            None => {
                let created = Subscription::create_default(&catalog, &config, now);
                tracing::debug!(
                    target: "leasekit::billing",
                    key = %config.storage_key,
                    plan = %created.plan,
                    "No stored subscription, starting default trial"
                );
                persistence.save(&config.storage_key, &created);
                audit.log(SubscriptionAuditEvent::Created {
                    plan: created.plan,
                    trial_days: config.trial_days,
                });
                created
            }
        };

        Self {
            persistence,
            catalog,
            config,
            audit,
            subscription,
        }
    }

    /// The current subscription record.
    #[must_use]
    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }

    #[must_use]
    pub fn catalog(&self) -> &PlanCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn config(&self) -> &SubscriptionConfig {
        &self.config
    }

    /// Swap in a new catalog.
    ///
    /// The current subscription keeps its feature snapshot. The new catalog
    /// applies from the next [`update_subscription`](Self::update_subscription).
    pub fn replace_catalog(&mut self, catalog: PlanCatalog) {
        self.catalog = catalog;
    }

    /// Move to `plan`: copy its features, mark the subscription active and
    /// clear any trial. `auto_renew` is left as it was.
    pub fn update_subscription(&mut self, plan: PlanId) {
        let from = self.subscription.plan;
        self.subscription.apply_plan(&self.catalog, plan);
        self.persist();

        tracing::debug!(
            target: "leasekit::billing",
            from = %from,
            to = %plan,
            "Subscription plan updated"
        );
        self.audit.log(SubscriptionAuditEvent::PlanChanged { from, to: plan });
    }

    /// Cancel the subscription. Plan and features are left untouched.
    pub fn cancel_subscription(&mut self) {
        self.subscription.apply_cancel();
        self.persist();

        tracing::debug!(
            target: "leasekit::billing",
            plan = %self.subscription.plan,
            "Subscription cancelled"
        );
        self.audit.log(SubscriptionAuditEvent::Cancelled {
            plan: self.subscription.plan,
        });
    }

    fn persist(&self) {
        self.persistence.save(&self.config.storage_key, &self.subscription);
    }

    /// Evaluator view over the current subscription.
    pub fn entitlements(&self) -> Entitlements<'_> {
        Entitlements::new(&self.subscription)
    }

    /// Gating layer over the current subscription.
    pub fn gate(&self) -> Gate<'_> {
        Gate::new(self.entitlements(), &self.catalog)
    }

    #[must_use]
    pub fn has_feature(&self, feature: Feature) -> bool {
        self.entitlements().has_feature(feature)
    }

    #[must_use]
    pub fn can_add_more(&self, resource: ResourceType, current: u64) -> bool {
        self.entitlements().can_add_more(resource, current)
    }

    #[must_use]
    pub fn check_limit(&self, resource: ResourceType, current: u64) -> LimitCheckResult {
        self.entitlements().check_limit(resource, current)
    }

    #[must_use]
    pub fn is_trial_active(&self) -> bool {
        self.is_trial_active_at(Utc::now())
    }

    #[must_use]
    pub fn is_trial_active_at(&self, now: DateTime<Utc>) -> bool {
        self.subscription.is_trial_active_at(now)
    }

    #[must_use]
    pub fn days_left_in_trial(&self) -> u32 {
        self.days_left_in_trial_at(Utc::now())
    }

    #[must_use]
    pub fn days_left_in_trial_at(&self, now: DateTime<Utc>) -> u32 {
        self.subscription.days_left_in_trial_at(now)
    }

    /// The persistence adapter backing this manager.
    pub fn persistence(&self) -> &Persistence<S> {
        &self.persistence
    }
}

impl<S: KeyValueStore> fmt::Debug for SubscriptionManager<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionManager")
            .field("config", &self.config)
            .field("subscription", &self.subscription)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::audit::tests::TestAuditLogger;
    use crate::billing::plans::LimitKind;
    use crate::storage::{MemoryStore, NoOpStore};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap()
    }

    fn manager(store: MemoryStore) -> SubscriptionManager<MemoryStore> {
        SubscriptionManager::initialize_at(
            store,
            PlanCatalog::standard(),
            SubscriptionConfig::default(),
            now(),
        )
    }

    #[test]
    fn test_create_default() {
        let sub = Subscription::create_default(
            &PlanCatalog::standard(),
            &SubscriptionConfig::default(),
            now(),
        );
        assert_eq!(sub.plan, PlanId::Professional);
        assert_eq!(sub.status, SubscriptionStatus::Trial);
        assert_eq!(sub.start_date, now());
        assert_eq!(sub.trial_ends_at, Some(now() + Duration::days(14)));
        assert_eq!(sub.end_date, now() + Duration::days(365));
        assert!(sub.auto_renew);
        assert_eq!(sub.features, PlanCatalog::standard().get(PlanId::Professional).features);
    }

    #[test]
    fn test_create_default_clamps_huge_terms() {
        let config = SubscriptionConfig {
            trial_days: u32::MAX,
            term_days: u32::MAX,
            ..SubscriptionConfig::default()
        };
        let sub = Subscription::create_default(&PlanCatalog::standard(), &config, now());
        assert_eq!(sub.end_date, DateTime::<Utc>::MAX_UTC);
        assert_eq!(sub.trial_ends_at, Some(DateTime::<Utc>::MAX_UTC));
        assert!(sub.is_trial_active_at(now()));
        assert!(sub.days_left_in_trial_at(now()) > 0);

        let manager = SubscriptionManager::initialize_at(
            MemoryStore::new(),
            PlanCatalog::standard(),
            config,
            now(),
        );
        assert_eq!(manager.subscription().status, SubscriptionStatus::Trial);
    }

    #[test]
    fn test_default_trial_is_active() {
        let manager = manager(MemoryStore::new());
        assert!(manager.is_trial_active_at(now()));
        assert_eq!(manager.days_left_in_trial_at(now()), 14);
        assert_eq!(manager.subscription().status, SubscriptionStatus::Trial);
    }

    #[test]
    fn test_days_left_rounds_up() {
        let manager = manager(MemoryStore::new());
        let later = now() + Duration::days(3) + Duration::hours(1);
        assert_eq!(manager.days_left_in_trial_at(later), 11);
        let almost_over = now() + Duration::days(14) - Duration::milliseconds(1);
        assert_eq!(manager.days_left_in_trial_at(almost_over), 1);
    }

    #[test]
    fn test_trial_expiry_keeps_status() {
        let manager = manager(MemoryStore::new());
        let expired = now() + Duration::days(20);
        assert!(!manager.is_trial_active_at(expired));
        assert_eq!(manager.days_left_in_trial_at(expired), 0);
        assert_eq!(manager.subscription().status, SubscriptionStatus::Trial);

        let at_end = now() + Duration::days(14);
        assert!(!manager.is_trial_active_at(at_end));
    }

    #[test]
    fn test_default_is_written_back() {
        let store = MemoryStore::new();
        let manager = manager(store.clone());
        let raw = store.get("subscription").unwrap().expect("default saved");
        let saved: Subscription = serde_json::from_str(&raw).unwrap();
        assert_eq!(&saved, manager.subscription());
    }

    #[test]
    fn test_update_subscription() {
        let mut manager = manager(MemoryStore::new());
        manager.update_subscription(PlanId::Basic);

        let sub = manager.subscription();
        assert_eq!(sub.plan, PlanId::Basic);
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert_eq!(sub.trial_ends_at, None);
        assert_eq!(sub.features, PlanCatalog::standard().get(PlanId::Basic).features);
        assert!(!manager.is_trial_active_at(now()));
        assert_eq!(manager.days_left_in_trial_at(now()), 0);
    }

    #[test]
    fn test_cancel_keeps_plan_and_features() {
        let mut manager = manager(MemoryStore::new());
        manager.update_subscription(PlanId::Enterprise);
        let features = manager.subscription().features.clone();

        manager.cancel_subscription();

        let sub = manager.subscription();
        assert_eq!(sub.status, SubscriptionStatus::Cancelled);
        assert!(!sub.auto_renew);
        assert_eq!(sub.plan, PlanId::Enterprise);
        assert_eq!(sub.features, features);
        assert!(manager.has_feature(Feature::ApiAccess));
    }

    #[test]
    fn test_update_after_cancel_reactivates() {
        let mut manager = manager(MemoryStore::new());
        manager.cancel_subscription();
        manager.update_subscription(PlanId::Free);

        let sub = manager.subscription();
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert!(!sub.auto_renew);
    }

    #[test]
    fn test_mutations_write_through() {
        let store = MemoryStore::new();
        let mut manager = manager(store.clone());
        manager.update_subscription(PlanId::Free);

        let restored = SubscriptionManager::initialize_at(
            store.clone(),
            PlanCatalog::standard(),
            SubscriptionConfig::default(),
            now() + Duration::days(2),
        );
        assert_eq!(restored.subscription(), manager.subscription());

        manager.cancel_subscription();
        let raw = store.get("subscription").unwrap().unwrap();
        assert!(raw.contains(r#""status":"cancelled""#));
        assert!(raw.contains(r#""autoRenew":false"#));
    }

    #[test]
    fn test_corrupt_record_is_replaced() {
        let store = MemoryStore::new();
        store.set("subscription", "{\"plan\": \"free\"").unwrap();
        let manager = manager(store.clone());

        assert_eq!(manager.subscription().status, SubscriptionStatus::Trial);
        let raw = store.get("subscription").unwrap().unwrap();
        assert!(serde_json::from_str::<Subscription>(&raw).is_ok());
    }

    #[test]
    fn test_unavailable_store() {
        let mut manager = SubscriptionManager::initialize_at(
            NoOpStore,
            PlanCatalog::standard(),
            SubscriptionConfig::default(),
            now(),
        );
        assert!(manager.is_trial_active_at(now()));
        manager.update_subscription(PlanId::Basic);
        assert_eq!(manager.subscription().plan, PlanId::Basic);
    }

    #[test]
    fn test_custom_storage_key() {
        let store = MemoryStore::new();
        let config = SubscriptionConfig {
            storage_key: "acme.subscription".to_string(),
            ..SubscriptionConfig::default()
        };
        let _manager = SubscriptionManager::initialize_at(
            store.clone(),
            PlanCatalog::standard(),
            config,
            now(),
        );
        assert!(store.get("acme.subscription").unwrap().is_some());
        assert!(store.get("subscription").unwrap().is_none());
    }

    #[test]
    fn test_replace_catalog_keeps_snapshot() {
        let mut manager = manager(MemoryStore::new());
        let before = manager.subscription().features.clone();

        let catalog = PlanCatalog::builder()
            .plan(PlanId::Professional)
            .max_properties(75)
            .feature(Feature::ApiAccess, true)
            .done()
            .build()
            .unwrap();
        manager.replace_catalog(catalog);

        assert_eq!(manager.subscription().features, before);
        assert!(!manager.has_feature(Feature::ApiAccess));

        manager.update_subscription(PlanId::Professional);
        assert!(manager.has_feature(Feature::ApiAccess));
        assert_eq!(
            manager.subscription().features.limit(LimitKind::Properties),
            crate::billing::Limit::Limited(75)
        );
    }

    #[test]
    fn test_audit_events() {
        let logger = TestAuditLogger::new();
        let mut manager = SubscriptionManager::initialize_with_audit(
            MemoryStore::new(),
            PlanCatalog::standard(),
            SubscriptionConfig::default(),
            Arc::new(logger.clone()),
            now(),
        );
        manager.update_subscription(PlanId::Enterprise);
        manager.cancel_subscription();

        assert_eq!(
            logger.events(),
            vec![
                SubscriptionAuditEvent::Created {
                    plan: PlanId::Professional,
                    trial_days: 14
                },
                SubscriptionAuditEvent::PlanChanged {
                    from: PlanId::Professional,
                    to: PlanId::Enterprise
                },
                SubscriptionAuditEvent::Cancelled {
                    plan: PlanId::Enterprise
                },
            ]
        );
    }

    #[test]
    fn test_restored_event() {
        let store = MemoryStore::new();
        let _first = manager(store.clone());

        let logger = TestAuditLogger::new();
        let _second = SubscriptionManager::initialize_with_audit(
            store,
            PlanCatalog::standard(),
            SubscriptionConfig::default(),
            Arc::new(logger.clone()),
            now(),
        );
        assert!(matches!(
            logger.events().as_slice(),
            [SubscriptionAuditEvent::Restored { plan: PlanId::Professional, .. }]
        ));
    }

    #[test]
    fn test_serialized_shape() {
        let sub = Subscription::create_default(
            &PlanCatalog::standard(),
            &SubscriptionConfig::default(),
            now(),
        );
        let json = serde_json::to_value(&sub).unwrap();
        assert_eq!(json["plan"], "professional");
        assert_eq!(json["status"], "trial");
        assert_eq!(json["autoRenew"], true);
        assert_eq!(json["startDate"]["type"], "date");
        assert_eq!(json["trialEndsAt"]["version"], 1);
        assert_eq!(json["features"]["maxProperties"], 50);

        let mut active = sub;
        active.trial_ends_at = None;
        let json = serde_json::to_value(&active).unwrap();
        assert!(json.get("trialEndsAt").is_none());
    }

    #[test]
    fn test_past_due_deserializes() {
        let status: SubscriptionStatus = serde_json::from_str("\"past_due\"").unwrap();
        assert_eq!(status, SubscriptionStatus::PastDue);
        assert_eq!(status.to_string(), "past_due");
    }
}
