//! Plan catalog and definitions.
//!
//! The catalog holds one entry for each [`PlanId`]. Every entry carries the
//! display price, four resource limits and the full set of feature flags.
//!
//! # Standard catalog
//!
//! ```rust
//! use leasekit::billing::{Feature, Limit, PlanCatalog, PlanId, ResourceType};
//!
//! let catalog = PlanCatalog::standard();
//! let free = catalog.get(PlanId::Free);
//! assert_eq!(free.features.limit_for(ResourceType::Tenants), Limit::Limited(10));
//! assert!(catalog.get(PlanId::Enterprise).features.flag(Feature::ApiAccess));
//! ```
//!
//! # Customized catalog
//!
//! The builder starts from the standard catalog, so every plan always has an
//! entry. `build()` rejects catalogs whose limits shrink from one tier to the next.
//!
//! ```rust
//! use leasekit::billing::{Feature, PlanCatalog, PlanId};
//!
//! let catalog = PlanCatalog::builder()
//!     .plan(PlanId::Basic)
//!         .price(3500)
//!         .max_properties(15)
//!         .feature(Feature::SmsNotifications, true)
//!         .done()
//!     .build()
//!     .unwrap();
//! assert_eq!(catalog.get(PlanId::Basic).formatted_price(), "$35.00");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::BillingError;

/// Wire value of [`Limit::Unlimited`].
pub const UNLIMITED: i64 = -1;

/// Subscription plan identifier, in ascending tier order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanId {
    Free,
    Basic,
    Professional,
    Enterprise,
}

impl PlanId {
    /// All plans, lowest tier first.
    pub const ALL: [PlanId; 4] = [
        PlanId::Free,
        PlanId::Basic,
        PlanId::Professional,
        PlanId::Enterprise,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Basic => "basic",
            Self::Professional => "professional",
            Self::Enterprise => "enterprise",
        }
    }

    /// Human-readable plan name.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Free => "Free",
            Self::Basic => "Basic",
            Self::Professional => "Professional",
            Self::Enterprise => "Enterprise",
        }
    }

    /// The next tier up, if any.
    #[must_use]
    pub fn next_tier(&self) -> Option<PlanId> {
        match self {
            Self::Free => Some(Self::Basic),
            Self::Basic => Some(Self::Professional),
            Self::Professional => Some(Self::Enterprise),
            Self::Enterprise => None,
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Free => 0,
            Self::Basic => 1,
            Self::Professional => 2,
            Self::Enterprise => 3,
        }
    }
}

impl FromStr for PlanId {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "basic" => Ok(Self::Basic),
            "professional" => Ok(Self::Professional),
            "enterprise" => Ok(Self::Enterprise),
            _ => Err(BillingError::UnknownPlan { plan_id: s.to_string() }),
        }
    }
}

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Billing interval for a plan. Display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    Monthly,
    Yearly,
}

impl BillingCycle {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl FromStr for BillingCycle {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monthly" | "month" => Ok(Self::Monthly),
            "yearly" | "year" | "annual" => Ok(Self::Yearly),
            _ => Err(BillingError::UnknownBillingCycle { cycle: s.to_string() }),
        }
    }
}

impl fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A resource cap: a fixed maximum or unlimited.
///
/// Serialized as an integer, with `-1` meaning unlimited. `Unlimited` orders
/// above every fixed maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Limit {
    Limited(u32),
    Unlimited,
}

impl Limit {
    #[must_use]
    pub fn is_unlimited(&self) -> bool {
        matches!(self, Self::Unlimited)
    }

    /// The fixed maximum, or `None` when unlimited.
    #[must_use]
    pub fn max(&self) -> Option<u32> {
        match self {
            Self::Limited(max) => Some(*max),
            Self::Unlimited => None,
        }
    }

    /// Check usage against this limit.
    ///
    /// Being exactly at the maximum counts as at-limit: one more is not allowed.
    #[must_use]
    pub fn check(&self, current: u64) -> LimitCheckResult {
        match self {
            Self::Unlimited => LimitCheckResult::Unlimited,
            Self::Limited(max) => {
                let max = u64::from(*max);
                if current < max {
                    LimitCheckResult::WithinLimit { current, max }
                } else {
                    LimitCheckResult::AtLimit { current, max }
                }
            }
        }
    }
}

impl From<u32> for Limit {
    fn from(max: u32) -> Self {
        Self::Limited(max)
    }
}

impl TryFrom<i64> for Limit {
    type Error = BillingError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value == UNLIMITED {
            return Ok(Self::Unlimited);
        }
        u32::try_from(value)
            .map(Self::Limited)
            .map_err(|_| BillingError::InvalidLimit { value })
    }
}

impl From<Limit> for i64 {
    fn from(limit: Limit) -> Self {
        match limit {
            Limit::Limited(max) => i64::from(max),
            Limit::Unlimited => UNLIMITED,
        }
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Limited(max) => write!(f, "{}", max),
            Self::Unlimited => write!(f, "unlimited"),
        }
    }
}

/// Result of checking a resource limit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LimitCheckResult {
    /// No limit on this resource.
    Unlimited,
    /// Usage is below the limit.
    WithinLimit { current: u64, max: u64 },
    /// Usage has reached or exceeded the limit.
    AtLimit { current: u64, max: u64 },
}

impl LimitCheckResult {
    /// Check if one more resource may be added.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Unlimited | Self::WithinLimit { .. })
    }

    /// Check if at or over limit.
    #[must_use]
    pub fn is_at_limit(&self) -> bool {
        matches!(self, Self::AtLimit { .. })
    }

    /// The concrete maximum, if limited.
    #[must_use]
    pub fn max(&self) -> Option<u64> {
        match self {
            Self::Unlimited => None,
            Self::WithinLimit { max, .. } | Self::AtLimit { max, .. } => Some(*max),
        }
    }
}

/// The four limit fields of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LimitKind {
    Properties,
    Tenants,
    Employees,
    UnitsPerProperty,
}

impl LimitKind {
    pub const ALL: [LimitKind; 4] = [
        LimitKind::Properties,
        LimitKind::Tenants,
        LimitKind::Employees,
        LimitKind::UnitsPerProperty,
    ];

    /// Field name in the stored feature record.
    #[must_use]
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::Properties => "maxProperties",
            Self::Tenants => "maxTenants",
            Self::Employees => "maxEmployees",
            Self::UnitsPerProperty => "maxUnitsPerProperty",
        }
    }
}

/// Resources whose count is capped by the active plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Properties,
    Tenants,
    Employees,
}

impl ResourceType {
    pub const ALL: [ResourceType; 3] = [
        ResourceType::Properties,
        ResourceType::Tenants,
        ResourceType::Employees,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Properties => "properties",
            Self::Tenants => "tenants",
            Self::Employees => "employees",
        }
    }

    /// The limit field that caps this resource.
    #[must_use]
    pub fn limit_kind(&self) -> LimitKind {
        match self {
            Self::Properties => LimitKind::Properties,
            Self::Tenants => LimitKind::Tenants,
            Self::Employees => LimitKind::Employees,
        }
    }
}

impl FromStr for ResourceType {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "properties" => Ok(Self::Properties),
            "tenants" => Ok(Self::Tenants),
            "employees" => Ok(Self::Employees),
            _ => Err(BillingError::UnknownResource { resource: s.to_string() }),
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Grouping of feature flags, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureGroup {
    ModuleAccess,
    Advanced,
    Integration,
}

/// Boolean capability flags gated by plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Feature {
    PropertiesModule,
    TenantsModule,
    WorkOrdersModule,
    PaymentsModule,
    EmployeesModule,
    ReportsModule,
    DocumentsModule,
    AdvancedReports,
    BulkOperations,
    CustomBranding,
    AutomatedReminders,
    TenantPortal,
    MultiCurrency,
    AuditLog,
    PrioritySupport,
    ApiAccess,
    AccountingIntegration,
    CalendarSync,
    SmsNotifications,
    PaymentGateway,
}

impl Feature {
    pub const ALL: [Feature; 20] = [
        Feature::PropertiesModule,
        Feature::TenantsModule,
        Feature::WorkOrdersModule,
        Feature::PaymentsModule,
        Feature::EmployeesModule,
        Feature::ReportsModule,
        Feature::DocumentsModule,
        Feature::AdvancedReports,
        Feature::BulkOperations,
        Feature::CustomBranding,
        Feature::AutomatedReminders,
        Feature::TenantPortal,
        Feature::MultiCurrency,
        Feature::AuditLog,
        Feature::PrioritySupport,
        Feature::ApiAccess,
        Feature::AccountingIntegration,
        Feature::CalendarSync,
        Feature::SmsNotifications,
        Feature::PaymentGateway,
    ];

    /// Flag name as stored in the feature record.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PropertiesModule => "propertiesModule",
            Self::TenantsModule => "tenantsModule",
            Self::WorkOrdersModule => "workOrdersModule",
            Self::PaymentsModule => "paymentsModule",
            Self::EmployeesModule => "employeesModule",
            Self::ReportsModule => "reportsModule",
            Self::DocumentsModule => "documentsModule",
            Self::AdvancedReports => "advancedReports",
            Self::BulkOperations => "bulkOperations",
            Self::CustomBranding => "customBranding",
            Self::AutomatedReminders => "automatedReminders",
            Self::TenantPortal => "tenantPortal",
            Self::MultiCurrency => "multiCurrency",
            Self::AuditLog => "auditLog",
            Self::PrioritySupport => "prioritySupport",
            Self::ApiAccess => "apiAccess",
            Self::AccountingIntegration => "accountingIntegration",
            Self::CalendarSync => "calendarSync",
            Self::SmsNotifications => "smsNotifications",
            Self::PaymentGateway => "paymentGateway",
        }
    }

    /// Human-readable name used in upgrade prompts.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::PropertiesModule => "Properties",
            Self::TenantsModule => "Tenants",
            Self::WorkOrdersModule => "Work orders",
            Self::PaymentsModule => "Payments",
            Self::EmployeesModule => "Employees",
            Self::ReportsModule => "Reports",
            Self::DocumentsModule => "Documents",
            Self::AdvancedReports => "Advanced reports",
            Self::BulkOperations => "Bulk operations",
            Self::CustomBranding => "Custom branding",
            Self::AutomatedReminders => "Automated reminders",
            Self::TenantPortal => "Tenant portal",
            Self::MultiCurrency => "Multi-currency",
            Self::AuditLog => "Audit log",
            Self::PrioritySupport => "Priority support",
            Self::ApiAccess => "API access",
            Self::AccountingIntegration => "Accounting integration",
            Self::CalendarSync => "Calendar sync",
            Self::SmsNotifications => "SMS notifications",
            Self::PaymentGateway => "Payment gateway",
        }
    }

    #[must_use]
    pub fn group(&self) -> FeatureGroup {
        match self {
            Self::PropertiesModule
            | Self::TenantsModule
            | Self::WorkOrdersModule
            | Self::PaymentsModule
            | Self::EmployeesModule
            | Self::ReportsModule
            | Self::DocumentsModule => FeatureGroup::ModuleAccess,
            Self::AccountingIntegration
            | Self::CalendarSync
            | Self::SmsNotifications
            | Self::PaymentGateway => FeatureGroup::Integration,
            _ => FeatureGroup::Advanced,
        }
    }
}

impl FromStr for Feature {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| BillingError::UnknownFeature { feature: s.to_string() })
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Limits and feature flags of a plan.
///
/// A subscription stores its own copy of this record, taken when the plan was
/// chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanFeatures {
    pub max_properties: Limit,
    pub max_tenants: Limit,
    pub max_employees: Limit,
    pub max_units_per_property: Limit,

    pub properties_module: bool,
    pub tenants_module: bool,
    pub work_orders_module: bool,
    pub payments_module: bool,
    pub employees_module: bool,
    pub reports_module: bool,
    pub documents_module: bool,

    pub advanced_reports: bool,
    pub bulk_operations: bool,
    pub custom_branding: bool,
    pub automated_reminders: bool,
    pub tenant_portal: bool,
    pub multi_currency: bool,
    pub audit_log: bool,
    pub priority_support: bool,
    pub api_access: bool,

    pub accounting_integration: bool,
    pub calendar_sync: bool,
    pub sms_notifications: bool,
    pub payment_gateway: bool,
}

impl PlanFeatures {
    /// A record with every flag off and every limit at zero.
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_properties: Limit::Limited(0),
            max_tenants: Limit::Limited(0),
            max_employees: Limit::Limited(0),
            max_units_per_property: Limit::Limited(0),
            properties_module: false,
            tenants_module: false,
            work_orders_module: false,
            payments_module: false,
            employees_module: false,
            reports_module: false,
            documents_module: false,
            advanced_reports: false,
            bulk_operations: false,
            custom_branding: false,
            automated_reminders: false,
            tenant_portal: false,
            multi_currency: false,
            audit_log: false,
            priority_support: false,
            api_access: false,
            accounting_integration: false,
            calendar_sync: false,
            sms_notifications: false,
            payment_gateway: false,
        }
    }

    #[must_use]
    pub fn flag(&self, feature: Feature) -> bool {
        match feature {
            Feature::PropertiesModule => self.properties_module,
            Feature::TenantsModule => self.tenants_module,
            Feature::WorkOrdersModule => self.work_orders_module,
            Feature::PaymentsModule => self.payments_module,
            Feature::EmployeesModule => self.employees_module,
            Feature::ReportsModule => self.reports_module,
            Feature::DocumentsModule => self.documents_module,
            Feature::AdvancedReports => self.advanced_reports,
            Feature::BulkOperations => self.bulk_operations,
            Feature::CustomBranding => self.custom_branding,
            Feature::AutomatedReminders => self.automated_reminders,
            Feature::TenantPortal => self.tenant_portal,
            Feature::MultiCurrency => self.multi_currency,
            Feature::AuditLog => self.audit_log,
            Feature::PrioritySupport => self.priority_support,
            Feature::ApiAccess => self.api_access,
            Feature::AccountingIntegration => self.accounting_integration,
            Feature::CalendarSync => self.calendar_sync,
            Feature::SmsNotifications => self.sms_notifications,
            Feature::PaymentGateway => self.payment_gateway,
        }
    }

    pub fn set_flag(&mut self, feature: Feature, enabled: bool) {
        let slot = match feature {
            Feature::PropertiesModule => &mut self.properties_module,
            Feature::TenantsModule => &mut self.tenants_module,
            Feature::WorkOrdersModule => &mut self.work_orders_module,
            Feature::PaymentsModule => &mut self.payments_module,
            Feature::EmployeesModule => &mut self.employees_module,
            Feature::ReportsModule => &mut self.reports_module,
            Feature::DocumentsModule => &mut self.documents_module,
            Feature::AdvancedReports => &mut self.advanced_reports,
            Feature::BulkOperations => &mut self.bulk_operations,
            Feature::CustomBranding => &mut self.custom_branding,
            Feature::AutomatedReminders => &mut self.automated_reminders,
            Feature::TenantPortal => &mut self.tenant_portal,
            Feature::MultiCurrency => &mut self.multi_currency,
            Feature::AuditLog => &mut self.audit_log,
            Feature::PrioritySupport => &mut self.priority_support,
            Feature::ApiAccess => &mut self.api_access,
            Feature::AccountingIntegration => &mut self.accounting_integration,
            Feature::CalendarSync => &mut self.calendar_sync,
            Feature::SmsNotifications => &mut self.sms_notifications,
            Feature::PaymentGateway => &mut self.payment_gateway,
        };
        *slot = enabled;
    }

    #[must_use]
    pub fn limit(&self, kind: LimitKind) -> Limit {
        match kind {
            LimitKind::Properties => self.max_properties,
            LimitKind::Tenants => self.max_tenants,
            LimitKind::Employees => self.max_employees,
            LimitKind::UnitsPerProperty => self.max_units_per_property,
        }
    }

    pub fn set_limit(&mut self, kind: LimitKind, limit: Limit) {
        match kind {
            LimitKind::Properties => self.max_properties = limit,
            LimitKind::Tenants => self.max_tenants = limit,
            LimitKind::Employees => self.max_employees = limit,
            LimitKind::UnitsPerProperty => self.max_units_per_property = limit,
        }
    }

    /// The limit that caps `resource`.
    #[must_use]
    pub fn limit_for(&self, resource: ResourceType) -> Limit {
        self.limit(resource.limit_kind())
    }

    /// All flags that are switched on.
    #[must_use]
    pub fn enabled_features(&self) -> Vec<Feature> {
        Feature::ALL.iter().copied().filter(|f| self.flag(*f)).collect()
    }

    fn with_limits(mut self, properties: Limit, tenants: Limit, employees: Limit, units: Limit) -> Self {
        self.max_properties = properties;
        self.max_tenants = tenants;
        self.max_employees = employees;
        self.max_units_per_property = units;
        self
    }

    fn enable(mut self, features: &[Feature]) -> Self {
        for feature in features {
            self.set_flag(*feature, true);
        }
        self
    }
}

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDetails {
    pub id: PlanId,
    /// Display name for the plan.
    pub name: String,
    pub description: String,
    /// Price in minor currency units (cents).
    pub price_minor_units: u64,
    /// Lowercase currency code (e.g. "usd").
    pub currency: String,
    pub billing_cycle: BillingCycle,
    pub features: PlanFeatures,
}

impl PlanDetails {
    /// Check if this plan has a specific feature.
    #[must_use]
    pub fn has_feature(&self, feature: Feature) -> bool {
        self.features.flag(feature)
    }

    /// Check a resource count against this plan's limit.
    #[must_use]
    pub fn check_limit(&self, resource: ResourceType, current: u64) -> LimitCheckResult {
        self.features.limit_for(resource).check(current)
    }

    /// Get the price formatted for display (e.g., "$79.00").
    #[must_use]
    pub fn formatted_price(&self) -> String {
        let symbol = match self.currency.as_str() {
            "usd" => "$",
            "gbp" => "£",
            "eur" => "€",
            other => other,
        };
        format!(
            "{}{}.{:02}",
            symbol,
            self.price_minor_units / 100,
            self.price_minor_units % 100
        )
    }
}

/// The full set of plans, one per [`PlanId`].
///
/// Loaded once and shared read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanCatalog {
    plans: [PlanDetails; 4],
}

impl PlanCatalog {
    /// The catalog shipped with the dashboard.
    #[must_use]
    pub fn standard() -> Self {
        Self { plans: standard_plans() }
    }

    /// Create a builder seeded with the standard catalog.
    #[must_use]
    pub fn builder() -> PlanCatalogBuilder {
        PlanCatalogBuilder { plans: standard_plans() }
    }

    /// Get a plan by ID. Every ID resolves.
    #[must_use]
    pub fn get(&self, id: PlanId) -> &PlanDetails {
        &self.plans[id.index()]
    }

    /// Iterate over all plans, lowest tier first.
    pub fn iter(&self) -> impl Iterator<Item = &PlanDetails> {
        self.plans.iter()
    }

    /// The lowest tier above `from` that includes `feature`.
    #[must_use]
    pub fn upgrade_with_feature(&self, from: PlanId, feature: Feature) -> Option<&PlanDetails> {
        self.iter().find(|p| p.id > from && p.has_feature(feature))
    }

    /// The lowest tier above `from` that would allow one more `resource` at
    /// `current` usage.
    #[must_use]
    pub fn upgrade_allowing(
        &self,
        from: PlanId,
        resource: ResourceType,
        current: u64,
    ) -> Option<&PlanDetails> {
        self.iter()
            .find(|p| p.id > from && p.check_limit(resource, current).is_allowed())
    }

    /// Check that every limit is non-decreasing from one tier to the next and
    /// that the top tier is unlimited everywhere.
    pub fn validate(&self) -> Result<(), BillingError> {
        for kind in LimitKind::ALL {
            for pair in self.plans.windows(2) {
                let (lower, higher) = (&pair[0], &pair[1]);
                if higher.features.limit(kind) < lower.features.limit(kind) {
                    return Err(BillingError::NonMonotonicLimit {
                        limit: kind.field_name(),
                        lower_plan: lower.id.to_string(),
                        higher_plan: higher.id.to_string(),
                    });
                }
            }

            if !self.get(PlanId::Enterprise).features.limit(kind).is_unlimited() {
                return Err(BillingError::EnterpriseNotUnlimited {
                    limit: kind.field_name(),
                });
            }
        }
        Ok(())
    }
}

impl Default for PlanCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn standard_plans() -> [PlanDetails; 4] {
    use Feature::*;

    let free = PlanFeatures::none()
        .with_limits(Limit::Limited(2), Limit::Limited(10), Limit::Limited(1), Limit::Limited(10))
        .enable(&[PropertiesModule, TenantsModule, WorkOrdersModule, PaymentsModule, ReportsModule]);

    let basic = free
        .clone()
        .with_limits(Limit::Limited(10), Limit::Limited(100), Limit::Limited(5), Limit::Limited(50))
        .enable(&[EmployeesModule, DocumentsModule, AutomatedReminders, TenantPortal, CalendarSync]);

    let professional = basic
        .clone()
        .with_limits(Limit::Limited(50), Limit::Limited(500), Limit::Limited(25), Limit::Limited(200))
        .enable(&[
            AdvancedReports,
            BulkOperations,
            CustomBranding,
            MultiCurrency,
            AuditLog,
            AccountingIntegration,
            SmsNotifications,
            PaymentGateway,
        ]);

    let enterprise = professional
        .clone()
        .with_limits(Limit::Unlimited, Limit::Unlimited, Limit::Unlimited, Limit::Unlimited)
        .enable(&[PrioritySupport, ApiAccess]);

    [
        plan(PlanId::Free, "For a landlord with a couple of units", 0, free),
        plan(PlanId::Basic, "For small portfolios", 2900, basic),
        plan(PlanId::Professional, "For growing property managers", 7900, professional),
        plan(PlanId::Enterprise, "For large portfolios and agencies", 19900, enterprise),
    ]
}

fn plan(id: PlanId, description: &str, price_minor_units: u64, features: PlanFeatures) -> PlanDetails {
    PlanDetails {
        id,
        name: id.display_name().to_string(),
        description: description.to_string(),
        price_minor_units,
        currency: "usd".to_string(),
        billing_cycle: BillingCycle::Monthly,
        features,
    }
}

/// Builder for a customized catalog.
#[derive(Debug)]
pub struct PlanCatalogBuilder {
    plans: [PlanDetails; 4],
}

impl PlanCatalogBuilder {
    /// Start editing a plan.
    #[must_use]
    pub fn plan(self, id: PlanId) -> PlanBuilder {
        let details = self.plans[id.index()].clone();
        PlanBuilder { parent: self, details }
    }

    /// Build the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`BillingError::NonMonotonicLimit`] if a higher tier has a lower
    /// limit than the tier below it.
    pub fn build(self) -> Result<PlanCatalog, BillingError> {
        let catalog = PlanCatalog { plans: self.plans };
        catalog.validate()?;
        Ok(catalog)
    }
}

/// Builder for a single catalog entry.
#[derive(Debug)]
pub struct PlanBuilder {
    parent: PlanCatalogBuilder,
    details: PlanDetails,
}

impl PlanBuilder {
    /// Set the display name.
    #[must_use]
    pub fn name(mut self, name: &str) -> Self {
        self.details.name = name.to_string();
        self
    }

    /// Set the description.
    #[must_use]
    pub fn description(mut self, desc: &str) -> Self {
        self.details.description = desc.to_string();
        self
    }

    /// Set the price in minor currency units.
    #[must_use]
    pub fn price(mut self, minor_units: u64) -> Self {
        self.details.price_minor_units = minor_units;
        self
    }

    /// Set the currency code (e.g., "gbp", "usd", "eur").
    #[must_use]
    pub fn currency(mut self, currency: &str) -> Self {
        self.details.currency = currency.to_lowercase();
        self
    }

    #[must_use]
    pub fn billing_cycle(mut self, cycle: BillingCycle) -> Self {
        self.details.billing_cycle = cycle;
        self
    }

    /// Set any of the four limits.
    #[must_use]
    pub fn limit(mut self, kind: LimitKind, limit: Limit) -> Self {
        self.details.features.set_limit(kind, limit);
        self
    }

    /// Remove the cap on a limit.
    #[must_use]
    pub fn unlimited(self, kind: LimitKind) -> Self {
        self.limit(kind, Limit::Unlimited)
    }

    #[must_use]
    pub fn max_properties(self, max: u32) -> Self {
        self.limit(LimitKind::Properties, Limit::Limited(max))
    }

    #[must_use]
    pub fn max_tenants(self, max: u32) -> Self {
        self.limit(LimitKind::Tenants, Limit::Limited(max))
    }

    #[must_use]
    pub fn max_employees(self, max: u32) -> Self {
        self.limit(LimitKind::Employees, Limit::Limited(max))
    }

    #[must_use]
    pub fn max_units_per_property(self, max: u32) -> Self {
        self.limit(LimitKind::UnitsPerProperty, Limit::Limited(max))
    }

    /// Switch a single flag on or off.
    #[must_use]
    pub fn feature(mut self, feature: Feature, enabled: bool) -> Self {
        self.details.features.set_flag(feature, enabled);
        self
    }

    /// Switch several flags on.
    #[must_use]
    pub fn features<I>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = Feature>,
    {
        for feature in features {
            self.details.features.set_flag(feature, true);
        }
        self
    }

    /// Finish editing this plan and return to the catalog builder.
    #[must_use]
    pub fn done(self) -> PlanCatalogBuilder {
        let mut parent = self.parent;
        let index = self.details.id.index();
        parent.plans[index] = self.details;
        parent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_plan_resolves() {
        let catalog = PlanCatalog::standard();
        for id in PlanId::ALL {
            assert_eq!(catalog.get(id).id, id);
        }
        assert_eq!(catalog.iter().count(), 4);
    }

    #[test]
    fn test_limits_non_decreasing_across_tiers() {
        let catalog = PlanCatalog::standard();
        assert!(catalog.validate().is_ok());

        for kind in LimitKind::ALL {
            let limits: Vec<Limit> = catalog.iter().map(|p| p.features.limit(kind)).collect();
            assert!(limits.windows(2).all(|w| w[0] <= w[1]), "{} decreases", kind.field_name());
        }
    }

    #[test]
    fn test_enterprise_is_unlimited() {
        let enterprise = PlanCatalog::standard().get(PlanId::Enterprise).clone();
        for kind in LimitKind::ALL {
            assert_eq!(enterprise.features.limit(kind), Limit::Unlimited);
        }
        assert_eq!(enterprise.features.enabled_features().len(), Feature::ALL.len());
    }

    #[test]
    fn test_feature_sets_grow_with_tier() {
        let catalog = PlanCatalog::standard();
        let plans: Vec<&PlanDetails> = catalog.iter().collect();
        for pair in plans.windows(2) {
            for feature in pair[0].features.enabled_features() {
                assert!(
                    pair[1].has_feature(feature),
                    "{} loses {}",
                    pair[1].id,
                    feature
                );
            }
        }
    }

    #[test]
    fn test_free_plan_limits() {
        let free = PlanCatalog::standard().get(PlanId::Free).clone();
        assert_eq!(free.features.max_tenants, Limit::Limited(10));
        assert!(free.check_limit(ResourceType::Tenants, 9).is_allowed());
        assert!(free.check_limit(ResourceType::Tenants, 10).is_at_limit());
        assert!(!free.has_feature(Feature::ApiAccess));
    }

    #[test]
    fn test_limit_serde_uses_sentinel() {
        assert_eq!(serde_json::to_string(&Limit::Unlimited).unwrap(), "-1");
        assert_eq!(serde_json::to_string(&Limit::Limited(25)).unwrap(), "25");

        let parsed: Limit = serde_json::from_str("-1").unwrap();
        assert_eq!(parsed, Limit::Unlimited);
        let parsed: Limit = serde_json::from_str("0").unwrap();
        assert_eq!(parsed, Limit::Limited(0));

        assert!(serde_json::from_str::<Limit>("-2").is_err());
        assert!(serde_json::from_str::<Limit>("5000000000").is_err());
    }

    #[test]
    fn test_limit_ordering() {
        assert!(Limit::Limited(0) < Limit::Limited(1));
        assert!(Limit::Limited(u32::MAX) < Limit::Unlimited);
    }

    #[test]
    fn test_limit_check() {
        assert_eq!(
            Limit::Limited(5).check(3),
            LimitCheckResult::WithinLimit { current: 3, max: 5 }
        );
        assert!(Limit::Limited(5).check(5).is_at_limit());
        assert!(Limit::Limited(0).check(0).is_at_limit());
        assert_eq!(Limit::Unlimited.check(u64::MAX), LimitCheckResult::Unlimited);
        assert_eq!(Limit::Unlimited.check(1).max(), None);
    }

    #[test]
    fn test_feature_names_round_trip_through_from_str() {
        for feature in Feature::ALL {
            assert_eq!(feature.as_str().parse::<Feature>().unwrap(), feature);
        }
        assert!(matches!(
            "teleport".parse::<Feature>(),
            Err(BillingError::UnknownFeature { .. })
        ));
    }

    #[test]
    fn test_feature_names_match_record_fields() {
        let mut features = PlanFeatures::none();
        for feature in Feature::ALL {
            features.set_flag(feature, true);
            let json = serde_json::to_value(&features).unwrap();
            assert_eq!(json[feature.as_str()], serde_json::Value::Bool(true));
            features.set_flag(feature, false);
        }
    }

    #[test]
    fn test_plan_features_serialized_in_camel_case() {
        let json = serde_json::to_value(&PlanCatalog::standard().get(PlanId::Enterprise).features).unwrap();
        assert_eq!(json["maxProperties"], -1);
        assert_eq!(json["maxUnitsPerProperty"], -1);
        assert_eq!(json["apiAccess"], true);
    }

    #[test]
    fn test_plan_id_parsing() {
        assert_eq!("Professional".parse::<PlanId>().unwrap(), PlanId::Professional);
        assert_eq!(" free ".parse::<PlanId>().unwrap(), PlanId::Free);
        assert!("platinum".parse::<PlanId>().is_err());
        assert_eq!(PlanId::Professional.next_tier(), Some(PlanId::Enterprise));
        assert_eq!(PlanId::Enterprise.next_tier(), None);
    }

    #[test]
    fn test_resource_maps_to_limit_field() {
        let basic = PlanCatalog::standard().get(PlanId::Basic).clone();
        assert_eq!(basic.features.limit_for(ResourceType::Properties), basic.features.max_properties);
        assert_eq!(basic.features.limit_for(ResourceType::Tenants), basic.features.max_tenants);
        assert_eq!(basic.features.limit_for(ResourceType::Employees), basic.features.max_employees);
        assert_eq!("tenants".parse::<ResourceType>().unwrap(), ResourceType::Tenants);
        assert!("units".parse::<ResourceType>().is_err());
    }

    #[test]
    fn test_formatted_price() {
        let catalog = PlanCatalog::standard();
        assert_eq!(catalog.get(PlanId::Free).formatted_price(), "$0.00");
        assert_eq!(catalog.get(PlanId::Professional).formatted_price(), "$79.00");

        let catalog = PlanCatalog::builder()
            .plan(PlanId::Basic)
            .currency("GBP")
            .price(2499)
            .done()
            .build()
            .unwrap();
        assert_eq!(catalog.get(PlanId::Basic).formatted_price(), "£24.99");
    }

    #[test]
    fn test_builder_overrides() {
        let catalog = PlanCatalog::builder()
            .plan(PlanId::Free)
            .max_tenants(5)
            .feature(Feature::ReportsModule, false)
            .done()
            .plan(PlanId::Basic)
            .features([Feature::ApiAccess])
            .billing_cycle(BillingCycle::Yearly)
            .done()
            .build()
            .unwrap();

        let free = catalog.get(PlanId::Free);
        assert_eq!(free.features.max_tenants, Limit::Limited(5));
        assert!(!free.has_feature(Feature::ReportsModule));

        let basic = catalog.get(PlanId::Basic);
        assert!(basic.has_feature(Feature::ApiAccess));
        assert_eq!(basic.billing_cycle, BillingCycle::Yearly);
    }

    #[test]
    fn test_builder_rejects_shrinking_limits() {
        let result = PlanCatalog::builder()
            .plan(PlanId::Professional)
            .max_properties(3)
            .done()
            .build();

        assert_eq!(
            result.unwrap_err(),
            BillingError::NonMonotonicLimit {
                limit: "maxProperties",
                lower_plan: "basic".to_string(),
                higher_plan: "professional".to_string(),
            }
        );
    }

    #[test]
    fn test_upgrade_lookups() {
        let catalog = PlanCatalog::standard();
        assert_eq!(
            catalog.upgrade_with_feature(PlanId::Free, Feature::AdvancedReports).map(|p| p.id),
            Some(PlanId::Professional)
        );
        assert_eq!(
            catalog.upgrade_with_feature(PlanId::Free, Feature::PropertiesModule).map(|p| p.id),
            Some(PlanId::Basic)
        );
        assert!(catalog.upgrade_with_feature(PlanId::Enterprise, Feature::ApiAccess).is_none());
        assert_eq!(
            catalog.upgrade_allowing(PlanId::Free, ResourceType::Tenants, 10).map(|p| p.id),
            Some(PlanId::Basic)
        );
        assert_eq!(
            catalog.upgrade_allowing(PlanId::Basic, ResourceType::Tenants, 0).map(|p| p.id),
            Some(PlanId::Professional)
        );
        assert_eq!(
            catalog.upgrade_allowing(PlanId::Free, ResourceType::Properties, 1_000).map(|p| p.id),
            Some(PlanId::Enterprise)
        );
    }

    #[test]
    fn test_builder_rejects_capped_enterprise() {
        let result = PlanCatalog::builder()
            .plan(PlanId::Enterprise)
            .max_properties(500)
            .done()
            .build();

        assert_eq!(
            result.unwrap_err(),
            BillingError::EnterpriseNotUnlimited { limit: "maxProperties" }
        );

        let result = PlanCatalog::builder()
            .plan(PlanId::Enterprise)
            .limit(LimitKind::UnitsPerProperty, Limit::Limited(u32::MAX))
            .done()
            .build();
        assert!(matches!(
            result,
            Err(BillingError::EnterpriseNotUnlimited { limit: "maxUnitsPerProperty" })
        ));
    }

    #[test]
    fn test_billing_cycle_parsing() {
        assert_eq!("annual".parse::<BillingCycle>().unwrap(), BillingCycle::Yearly);
        assert_eq!("month".parse::<BillingCycle>().unwrap(), BillingCycle::Monthly);
        assert!("weekly".parse::<BillingCycle>().is_err());
    }
}
