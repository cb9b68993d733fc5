//! Gating decisions for protected regions of the dashboard.
//!
//! [`Gate`] turns entitlement answers into one of a few render outcomes. It
//! holds no state; the same subscription and inputs always give the same
//! outcome. Content is generic so callers can gate whatever their renderer
//! produces.
//!
//! ```rust
//! use leasekit::billing::{Feature, FeatureGate, PlanCatalog, PlanId, SubscriptionManager};
//! use leasekit::config::SubscriptionConfig;
//! use leasekit::storage::MemoryStore;
//!
//! let mut manager = SubscriptionManager::initialize(
//!     MemoryStore::new(),
//!     PlanCatalog::standard(),
//!     SubscriptionConfig::default(),
//! );
//! manager.update_subscription(PlanId::Free);
//!
//! match manager.gate().feature(Feature::AdvancedReports, "report builder", None) {
//!     FeatureGate::UpgradePrompt(prompt) => {
//!         assert_eq!(prompt.suggested_plan, Some(PlanId::Professional));
//!     }
//!     other => panic!("unexpected outcome: {:?}", other),
//! }
//! ```

use std::fmt;

use super::entitlements::Entitlements;
use super::plans::{BillingCycle, Feature, LimitCheckResult, PlanCatalog, PlanDetails, PlanId, ResourceType};

/// Outcome of gating content behind a feature flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureGate<C> {
    /// Entitled: render the protected content.
    Content(C),
    /// Not entitled: render the caller's fallback.
    Fallback(C),
    /// Not entitled and no fallback given.
    UpgradePrompt(UpgradePrompt),
}

impl<C> FeatureGate<C> {
    #[must_use]
    pub fn is_content(&self) -> bool {
        matches!(self, Self::Content(_))
    }

    /// The content or fallback to render, if either was chosen.
    pub fn into_rendered(self) -> Option<C> {
        match self {
            Self::Content(c) | Self::Fallback(c) => Some(c),
            Self::UpgradePrompt(_) => None,
        }
    }

    /// Map the content type, keeping the outcome.
    pub fn map<D, F: FnOnce(C) -> D>(self, f: F) -> FeatureGate<D> {
        match self {
            Self::Content(c) => FeatureGate::Content(f(c)),
            Self::Fallback(c) => FeatureGate::Fallback(f(c)),
            Self::UpgradePrompt(p) => FeatureGate::UpgradePrompt(p),
        }
    }
}

/// Outcome of gating content behind a resource limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LimitGate<C> {
    /// Below the limit: render the content.
    Content(C),
    /// At the limit: render a notice with the concrete maximum.
    LimitReached(LimitNotice),
}

impl<C> LimitGate<C> {
    #[must_use]
    pub fn is_content(&self) -> bool {
        matches!(self, Self::Content(_))
    }

    pub fn into_content(self) -> Option<C> {
        match self {
            Self::Content(c) => Some(c),
            Self::LimitReached(_) => None,
        }
    }
}

/// Generic upgrade prompt for a feature the current plan lacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradePrompt {
    pub feature: Feature,
    pub current_plan: PlanId,
    /// Lowest higher tier that includes the feature.
    pub suggested_plan: Option<PlanId>,
    /// Display price of the suggested plan, e.g. `$79.00/month`.
    pub suggested_price: Option<String>,
}

impl fmt::Display for UpgradePrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} is not included in the {} plan.",
            self.feature.label(),
            self.current_plan.display_name()
        )?;
        match (&self.suggested_plan, &self.suggested_price) {
            (Some(plan), Some(price)) => write!(
                f,
                " Upgrade to {} ({}) to unlock it.",
                plan.display_name(),
                price
            ),
            (Some(plan), None) => write!(f, " Upgrade to {} to unlock it.", plan.display_name()),
            (None, _) => write!(f, " Upgrade your plan to unlock it."),
        }
    }
}

/// Notice shown when a resource limit is reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitNotice {
    pub resource: ResourceType,
    pub current: u64,
    pub max: u64,
    pub current_plan: PlanId,
    /// Lowest higher tier that would allow one more.
    pub suggested_plan: Option<PlanId>,
}

impl fmt::Display for LimitNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "You have reached the maximum of {} {} on the {} plan.",
            self.max,
            self.resource,
            self.current_plan.display_name()
        )?;
        match self.suggested_plan {
            Some(plan) => write!(f, " Upgrade to {} to add more.", plan.display_name()),
            None => Ok(()),
        }
    }
}

/// Gating layer over one subscription snapshot.
#[derive(Debug, Clone, Copy)]
pub struct Gate<'a> {
    entitlements: Entitlements<'a>,
    catalog: &'a PlanCatalog,
}

impl<'a> Gate<'a> {
    #[must_use]
    pub fn new(entitlements: Entitlements<'a>, catalog: &'a PlanCatalog) -> Self {
        Self { entitlements, catalog }
    }

    /// Gate `content` behind `feature`.
    pub fn feature<C>(&self, feature: Feature, content: C, fallback: Option<C>) -> FeatureGate<C> {
        if self.entitlements.has_feature(feature) {
            return FeatureGate::Content(content);
        }
        match fallback {
            Some(fallback) => FeatureGate::Fallback(fallback),
            None => FeatureGate::UpgradePrompt(self.upgrade_prompt(feature)),
        }
    }

    /// [`feature`](Self::feature) with lazily built content and fallback.
    pub fn feature_with<C, F, G>(&self, feature: Feature, content: F, fallback: Option<G>) -> FeatureGate<C>
    where
        F: FnOnce() -> C,
        G: FnOnce() -> C,
    {
        if self.entitlements.has_feature(feature) {
            return FeatureGate::Content(content());
        }
        match fallback {
            Some(fallback) => FeatureGate::Fallback(fallback()),
            None => FeatureGate::UpgradePrompt(self.upgrade_prompt(feature)),
        }
    }

    /// Gate `content` behind the limit for `resource` at `current` usage.
    pub fn limit<C>(&self, resource: ResourceType, current: u64, content: C) -> LimitGate<C> {
        match self.entitlements.check_limit(resource, current) {
            LimitCheckResult::Unlimited | LimitCheckResult::WithinLimit { .. } => {
                LimitGate::Content(content)
            }
            LimitCheckResult::AtLimit { current, max } => {
                LimitGate::LimitReached(self.limit_notice(resource, current, max))
            }
        }
    }

    /// The prompt shown for `feature` when it is missing.
    #[must_use]
    pub fn upgrade_prompt(&self, feature: Feature) -> UpgradePrompt {
        let current_plan = self.entitlements.plan();
        let suggested = self.catalog.upgrade_with_feature(current_plan, feature);

        UpgradePrompt {
            feature,
            current_plan,
            suggested_plan: suggested.map(|p| p.id),
            suggested_price: suggested.map(price_label),
        }
    }

    fn limit_notice(&self, resource: ResourceType, current: u64, max: u64) -> LimitNotice {
        let current_plan = self.entitlements.plan();
        let suggested_plan = self
            .catalog
            .upgrade_allowing(current_plan, resource, current)
            .map(|p| p.id);

        LimitNotice {
            resource,
            current,
            max,
            current_plan,
            suggested_plan,
        }
    }
}

fn price_label(plan: &PlanDetails) -> String {
    let period = match plan.billing_cycle {
        BillingCycle::Monthly => "month",
        BillingCycle::Yearly => "year",
    };
    format!("{}/{}", plan.formatted_price(), period)
}
