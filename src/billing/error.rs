//! Billing-specific error types.
//!
//! These cover the places where plan, feature or resource names arrive as
//! strings (configuration, stored records, UI parameters) and fail to map
//! onto the closed enumerations in [`plans`](super::plans).

use std::fmt;

/// Billing-specific errors.
///
/// Converted into [`LeasekitError::Billing`](crate::LeasekitError::Billing)
/// when they cross the crate boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingError {
    /// The plan identifier is not one of the catalog plans.
    UnknownPlan { plan_id: String },
    /// The feature flag name is not part of the feature set.
    UnknownFeature { feature: String },
    /// The resource type is not one of the limited resources.
    UnknownResource { resource: String },
    /// A limit value is neither a non-negative integer nor the unlimited sentinel.
    InvalidLimit { value: i64 },
    /// The billing cycle string is not recognized.
    UnknownBillingCycle { cycle: String },
    /// A catalog limit decreases from one tier to the next.
    NonMonotonicLimit {
        limit: &'static str,
        lower_plan: String,
        higher_plan: String,
    },
    /// The enterprise plan caps a limit instead of leaving it unlimited.
    EnterpriseNotUnlimited { limit: &'static str },
}

impl fmt::Display for BillingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownPlan { plan_id } => {
                write!(f, "Unknown plan: {}", plan_id)
            }
            Self::UnknownFeature { feature } => {
                write!(f, "Unknown feature flag: {}", feature)
            }
            Self::UnknownResource { resource } => {
                write!(f, "Unknown resource type: {}", resource)
            }
            Self::InvalidLimit { value } => {
                write!(f, "Invalid limit {}: must be non-negative or -1 for unlimited", value)
            }
            Self::UnknownBillingCycle { cycle } => {
                write!(f, "Unknown billing cycle: {}", cycle)
            }
            Self::NonMonotonicLimit { limit, lower_plan, higher_plan } => {
                write!(
                    f,
                    "Limit '{}' on plan '{}' is lower than on plan '{}'",
                    limit, higher_plan, lower_plan
                )
            }
            Self::EnterpriseNotUnlimited { limit } => {
                write!(f, "Limit '{}' on plan 'enterprise' must be unlimited", limit)
            }
        }
    }
}

impl std::error::Error for BillingError {}
