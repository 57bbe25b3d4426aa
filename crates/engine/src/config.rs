//! Engine configuration loaded from the environment.
//!
//! Supported environment variables:
//! - MFS_PLACEMENT_POLICY: `strict` or `overwrite` (default `strict`)
//! - MFS_MAX_JOIN_MODULES: connectivity search cap for joins (range: 2-4096, default 64)
//! - MFS_DEFAULT_MODULE_SIZE: module size used by the demo runner (default 40)

use std::fmt::Display;
use std::str::FromStr;

use mfs_domain::PlacementPolicy;

pub const DEFAULT_MAX_JOIN_MODULES: usize = 64;
pub const DEFAULT_MODULE_SIZE: u32 = 40;

const MAX_JOIN_MODULES_RANGE: std::ops::RangeInclusive<usize> = 2..=4096;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Placement policy given to every furniture the engine creates
    pub placement_policy: PlacementPolicy,
    /// Maximum number of modules a single join may search over
    pub max_join_modules: usize,
    pub default_module_size: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            placement_policy: PlacementPolicy::Strict,
            max_join_modules: DEFAULT_MAX_JOIN_MODULES,
            default_module_size: DEFAULT_MODULE_SIZE,
        }
    }
}

impl EngineConfig {
    /// Read the configuration from process environment variables.
    ///
    /// Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Missing keys keep their defaults. Invalid values are logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            placement_policy: read_var(
                &lookup,
                "MFS_PLACEMENT_POLICY",
                defaults.placement_policy,
                |_| true,
            ),
            max_join_modules: read_var(
                &lookup,
                "MFS_MAX_JOIN_MODULES",
                defaults.max_join_modules,
                |value| MAX_JOIN_MODULES_RANGE.contains(value),
            ),
            default_module_size: read_var(
                &lookup,
                "MFS_DEFAULT_MODULE_SIZE",
                defaults.default_module_size,
                |value| *value > 0,
            ),
        }
    }
}

fn read_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
    accept: impl Fn(&T) -> bool,
) -> T
where
    T: FromStr + Display,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(value) if accept(&value) => {
            tracing::info!(key, value = %value, "Applied environment override");
            value
        }
        Ok(value) => {
            tracing::warn!(key, value = %value, default = %default, "Value out of range, ignoring");
            default
        }
        Err(_) => {
            tracing::warn!(key, val = %raw, default = %default, "Value is not valid, ignoring");
            default
        }
    }
}
