//! Subscription plans, feature entitlements and trial lifecycle.
//!
//! The pieces, leaves first:
//!
//! - [`plans`]: the closed plan catalog with limits and feature flags
//! - [`subscription`]: the persisted subscription record and its single owner
//! - [`entitlements`]: pure "is this allowed" answers over a subscription
//! - [`gating`]: render outcomes built from those answers
//! - [`audit`]: a log of every lifecycle step
//!
//! # Example
//!
//! ```rust
//! use leasekit::billing::{
//!     Feature, LimitGate, PlanCatalog, PlanId, ResourceType, SubscriptionManager,
//! };
//! use leasekit::config::SubscriptionConfig;
//! use leasekit::storage::MemoryStore;
//!
//! // Deployments may adjust prices and limits before handing the catalog over
//! let catalog = PlanCatalog::builder()
//!     .plan(PlanId::Basic)
//!         .price(3900)
//!         .max_properties(15)
//!         .done()
//!     .build()
//!     .expect("limits stay monotonic");
//!
//! let mut manager = SubscriptionManager::initialize(
//!     MemoryStore::new(),
//!     catalog,
//!     SubscriptionConfig::default(),
//! );
//!
//! manager.update_subscription(PlanId::Basic);
//! assert!(manager.has_feature(Feature::TenantPortal));
//! assert!(manager.can_add_more(ResourceType::Properties, 14));
//!
//! if let LimitGate::LimitReached(notice) = manager.gate().limit(ResourceType::Properties, 15, ()) {
//!     println!("{}", notice);
//! }
//! ```

pub mod audit;
pub mod entitlements;
pub mod error;
pub mod gating;
pub mod plans;
pub mod subscription;

// Plan exports
pub use plans::{
    BillingCycle, Feature, FeatureGroup, Limit, LimitCheckResult, LimitKind, PlanBuilder,
    PlanCatalog, PlanCatalogBuilder, PlanDetails, PlanFeatures, PlanId, ResourceType, UNLIMITED,
};

// Subscription exports
pub use subscription::{Subscription, SubscriptionManager, SubscriptionStatus};

// Entitlements exports
pub use entitlements::{
    Entitlements, FeatureCheckResult, can_add_more, check_limit, has_feature, require_feature,
};

// Gating exports
pub use gating::{FeatureGate, Gate, LimitGate, LimitNotice, UpgradePrompt};

// Audit exports
pub use audit::{
    NoOpAuditLogger, SubscriptionAuditEvent, SubscriptionAuditLogger, TracingAuditLogger,
};

// Error exports
pub use error::BillingError;
