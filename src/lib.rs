//! Leasekit - subscription plans and feature entitlements for property-management dashboards
//!
//! Leasekit owns the one piece of mutable billing state a dashboard keeps on
//! the client: the current subscription. It answers "is this feature enabled"
//! and "can one more of these be added", and decides what a gated region of
//! the UI should show.
//!
//! # Features
//!
//! - **Plan catalog**: four fixed tiers with typed limits and feature flags
//! - **Persistence**: fail-soft JSON storage with tagged, versioned dates
//! - **Lifecycle**: default trial, plan changes and cancellation with write-through
//! - **Entitlements**: pure feature and limit checks over a feature snapshot
//! - **Gating**: content, fallback, upgrade prompt or limit-reached outcomes
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use leasekit::billing::{Feature, PlanCatalog, PlanId, SubscriptionManager};
//! use leasekit::{ConfigBuilder, storage};
//!
//! fn main() -> leasekit::Result<()> {
//!     leasekit::init_tracing();
//!
//!     let config = ConfigBuilder::new().from_env().build()?;
//!     let store = storage::open(&config.storage)?;
//!
//!     let mut manager = SubscriptionManager::initialize(
//!         store,
//!         PlanCatalog::standard(),
//!         config.subscription.clone(),
//!     );
//!
//!     if manager.is_trial_active() {
//!         println!("{} days left in trial", manager.days_left_in_trial());
//!     }
//!
//!     manager.update_subscription(PlanId::Enterprise);
//!     assert!(manager.has_feature(Feature::ApiAccess));
//!     Ok(())
//! }
//! ```

pub mod billing;
pub mod config;
mod error;
pub mod persistence;
pub mod storage;
pub mod traits;
pub mod utils;

// Re-exports for public API
pub use billing::{
    Feature, PlanCatalog, PlanId, ResourceType, Subscription, SubscriptionManager,
    SubscriptionStatus,
};
pub use config::{Config, ConfigBuilder, LoggingConfig, SubscriptionConfig};
pub use error::{LeasekitError, Result};
pub use persistence::Persistence;
pub use storage::{FileStore, MemoryStore, NoOpStore, StorageBackend, StorageConfig};
pub use traits::store::KeyValueStore;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging with sensible defaults
///
/// # Environment Variables
///
/// - `RUST_LOG`: Set log level (e.g., "info", "debug", "leasekit=debug")
/// - `LEASEKIT_LOG_JSON`: Set to "true" for JSON formatted logs
///
/// # Example
///
/// ```rust,no_run
/// leasekit::init_tracing();
/// ```
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json_logs = std::env::var("LEASEKIT_LOG_JSON")
        .map(|v| v.parse::<bool>().unwrap_or(false))
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Initialize tracing with a custom configuration
pub fn init_tracing_with_config(config: &Config) {
    let env_filter = EnvFilter::new(&config.logging.level);

    if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
