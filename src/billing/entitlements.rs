//! Entitlement evaluation.
//!
//! Pure functions over a [`Subscription`]'s feature snapshot. Nothing here
//! reads the catalog, the store or the clock.

use super::plans::{Feature, LimitCheckResult, PlanFeatures, PlanId, ResourceType};
use super::subscription::{Subscription, SubscriptionStatus};

/// Whether `feature` is enabled on the subscription.
///
/// Reads the stored flag only. Status is not consulted, so a cancelled
/// subscription keeps the features it had.
#[must_use]
pub fn has_feature(subscription: &Subscription, feature: Feature) -> bool {
    subscription.features.flag(feature)
}

/// Check `current` usage of `resource` against the subscription's limit.
#[must_use]
pub fn check_limit(subscription: &Subscription, resource: ResourceType, current: u64) -> LimitCheckResult {
    subscription.features.limit_for(resource).check(current)
}

/// Whether one more `resource` may be added when `current` already exist.
///
/// Unlimited resources always allow more. Otherwise `current` must be
/// strictly below the limit.
#[must_use]
pub fn can_add_more(subscription: &Subscription, resource: ResourceType, current: u64) -> bool {
    check_limit(subscription, resource, current).is_allowed()
}

/// Result of requiring a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureCheckResult {
    /// Feature is available.
    Allowed,
    /// Feature is available but the subscription is cancelled.
    AllowedWhileCancelled,
    /// Feature not included in the subscribed plan.
    FeatureNotIncluded { plan: PlanId },
}

impl FeatureCheckResult {
    /// Check if the feature is allowed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed | Self::AllowedWhileCancelled)
    }
}

/// Check a feature and report why it is or isn't available.
#[must_use = "feature check result must be used to enforce access control"]
pub fn require_feature(subscription: &Subscription, feature: Feature) -> FeatureCheckResult {
    if !has_feature(subscription, feature) {
        return FeatureCheckResult::FeatureNotIncluded {
            plan: subscription.plan,
        };
    }
    if subscription.status == SubscriptionStatus::Cancelled {
        FeatureCheckResult::AllowedWhileCancelled
    } else {
        FeatureCheckResult::Allowed
    }
}

/// Read-only evaluator bound to one subscription snapshot.
#[derive(Debug, Clone, Copy)]
pub struct Entitlements<'a> {
    subscription: &'a Subscription,
}

impl<'a> Entitlements<'a> {
    #[must_use]
    pub fn new(subscription: &'a Subscription) -> Self {
        Self { subscription }
    }

    #[must_use]
    pub fn subscription(&self) -> &'a Subscription {
        self.subscription
    }

    #[must_use]
    pub fn plan(&self) -> PlanId {
        self.subscription.plan
    }

    #[must_use]
    pub fn features(&self) -> &'a PlanFeatures {
        &self.subscription.features
    }

    #[must_use]
    pub fn has_feature(&self, feature: Feature) -> bool {
        has_feature(self.subscription, feature)
    }

    #[must_use]
    pub fn can_add_more(&self, resource: ResourceType, current: u64) -> bool {
        can_add_more(self.subscription, resource, current)
    }

    #[must_use]
    pub fn check_limit(&self, resource: ResourceType, current: u64) -> LimitCheckResult {
        check_limit(self.subscription, resource, current)
    }

    #[must_use = "feature check result must be used to enforce access control"]
    pub fn require_feature(&self, feature: Feature) -> FeatureCheckResult {
        require_feature(self.subscription, feature)
    }

    /// All enabled features, in declaration order.
    #[must_use]
    pub fn enabled_features(&self) -> Vec<Feature> {
        self.subscription.features.enabled_features()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::plans::{Limit, PlanCatalog};
    use crate::config::SubscriptionConfig;
    use chrono::{TimeZone, Utc};

    fn subscription_on(plan: PlanId) -> Subscription {
        let catalog = PlanCatalog::standard();
        let mut sub = Subscription::create_default(
            &catalog,
            &SubscriptionConfig::default(),
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        );
        sub.plan = plan;
        sub.features = catalog.get(plan).features.clone();
        sub.status = SubscriptionStatus::Active;
        sub.trial_ends_at = None;
        sub
    }

    #[test]
    fn test_enterprise_is_unlimited() {
        let sub = subscription_on(PlanId::Enterprise);
        assert!(has_feature(&sub, Feature::ApiAccess));
        assert!(can_add_more(&sub, ResourceType::Properties, 1_000_000));
        assert_eq!(
            check_limit(&sub, ResourceType::Employees, 5_000),
            LimitCheckResult::Unlimited
        );
    }

    #[test]
    fn test_free_tenant_boundary() {
        let sub = subscription_on(PlanId::Free);
        assert!(can_add_more(&sub, ResourceType::Tenants, 9));
        assert!(!can_add_more(&sub, ResourceType::Tenants, 10));
        assert!(!can_add_more(&sub, ResourceType::Tenants, 11));
        assert_eq!(
            check_limit(&sub, ResourceType::Tenants, 10),
            LimitCheckResult::AtLimit { current: 10, max: 10 }
        );
    }

    #[test]
    fn test_zero_limit_forbids_everything() {
        let mut sub = subscription_on(PlanId::Free);
        sub.features.max_employees = Limit::Limited(0);
        assert!(!can_add_more(&sub, ResourceType::Employees, 0));
    }

    #[test]
    fn test_resource_maps_to_its_own_limit() {
        let sub = subscription_on(PlanId::Basic);
        assert!(can_add_more(&sub, ResourceType::Properties, 9));
        assert!(!can_add_more(&sub, ResourceType::Properties, 10));
        assert!(can_add_more(&sub, ResourceType::Tenants, 99));
        assert!(!can_add_more(&sub, ResourceType::Employees, 5));
    }

    #[test]
    fn test_require_feature() {
        let mut sub = subscription_on(PlanId::Basic);
        assert_eq!(require_feature(&sub, Feature::TenantPortal), FeatureCheckResult::Allowed);
        assert_eq!(
            require_feature(&sub, Feature::ApiAccess),
            FeatureCheckResult::FeatureNotIncluded { plan: PlanId::Basic }
        );

        sub.status = SubscriptionStatus::Cancelled;
        let result = require_feature(&sub, Feature::TenantPortal);
        assert_eq!(result, FeatureCheckResult::AllowedWhileCancelled);
        assert!(result.is_allowed());
    }

    #[test]
    fn test_snapshot_is_what_counts() {
        let mut sub = subscription_on(PlanId::Free);
        sub.features.api_access = true;
        assert!(has_feature(&sub, Feature::ApiAccess));
    }

    #[test]
    fn test_view_matches_functions() {
        let sub = subscription_on(PlanId::Professional);
        let view = Entitlements::new(&sub);
        assert_eq!(view.plan(), PlanId::Professional);
        for feature in Feature::ALL {
            assert_eq!(view.has_feature(feature), has_feature(&sub, feature));
        }
        assert_eq!(
            view.enabled_features().len(),
            Feature::ALL.iter().filter(|f| sub.features.flag(**f)).count()
        );
        assert!(view.can_add_more(ResourceType::Properties, 49));
        assert!(!view.can_add_more(ResourceType::Properties, 50));
    }
}
