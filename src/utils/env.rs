use std::str::FromStr;

/// Get environment variable with LEASEKIT_ prefix, falling back to unprefixed version
///
/// Checks `LEASEKIT_{key}` first, then falls back to `{key}`.
///
/// # Examples
///
/// ```rust
/// use leasekit::utils::get_env_with_prefix;
///
/// // Checks LEASEKIT_SUBSCRIPTION_KEY first, then SUBSCRIPTION_KEY
/// let key = get_env_with_prefix("SUBSCRIPTION_KEY");
/// ```
pub fn get_env_with_prefix(key: &str) -> Option<String> {
    std::env::var(format!("LEASEKIT_{}", key))
        .or_else(|_| std::env::var(key))
        .ok()
}

/// Read and parse an environment variable looked up as in [`get_env_with_prefix`]
///
/// Returns `None` when the variable is unset. A value that does not parse as
/// `T` is logged under `leasekit::config` and also yields `None`, so callers
/// keep their default.
///
/// ```rust
/// use leasekit::billing::PlanId;
/// use leasekit::utils::parse_env_with_prefix;
///
/// let trial_days: u32 = parse_env_with_prefix("TRIAL_DAYS").unwrap_or(14);
/// let plan: Option<PlanId> = parse_env_with_prefix("DEFAULT_PLAN");
/// ```
pub fn parse_env_with_prefix<T: FromStr>(key: &str) -> Option<T> {
    let raw = get_env_with_prefix(key)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(
                target: "leasekit::config",
                key = %key,
                value = %raw,
                "Ignoring unparseable environment value"
            );
            None
        }
    }
}
