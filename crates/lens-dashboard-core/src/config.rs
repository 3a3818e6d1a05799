//! Dashboard configuration with environment overrides.
//!
//! Every field has a documented default; `from_env` reads `LENS_*`
//! variables and keeps the default when a value is missing or unparseable.

use std::env;
use std::fmt;
use std::str::FromStr;

#[cfg(test)]
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::depth::DepthOption;
use crate::error::Error;
use crate::grouping::GroupByMode;
use crate::scope::ScopeMode;
use crate::workstream::GroupingOptions;

/// Stand-in tree depth for the unbounded depth option.
pub const DEFAULT_UNBOUNDED_DEPTH: usize = 100;

/// Display mode of the dashboard list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Flat,
    Workstream,
    Grouped,
}

impl ViewMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Flat => "flat",
            Self::Workstream => "workstream",
            Self::Grouped => "grouped",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flat" | "tree" => Ok(Self::Flat),
            "workstream" | "workstreams" | "ws" => Ok(Self::Workstream),
            "grouped" | "group" | "groups" => Ok(Self::Grouped),
            other => Err(Error::InvalidViewMode(other.to_string())),
        }
    }
}

/// Tunables shared by every dashboard built from the same process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardConfig {
    pub default_depth: DepthOption,
    /// Epic and bead lenses open in the ego-centered layout.
    pub centered_by_default: bool,
    pub default_view: ViewMode,
    pub default_group_by: GroupByMode,
    pub default_scope_mode: ScopeMode,
    /// Scope labels applied when a dashboard opens.
    pub default_scope: Vec<String>,
    pub unbounded_depth: usize,
    /// Issues listed under a collapsed workstream header.
    pub collapsed_preview: usize,
    /// Label groups below this size are never sub-grouped.
    pub label_subgroup_min_issues: usize,
    pub subdivide_min_group_size: usize,
    pub subdivide_max_depth: usize,
    pub width: u16,
    pub height: u16,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            default_depth: DepthOption::Two,
            centered_by_default: true,
            default_view: ViewMode::Flat,
            default_group_by: GroupByMode::Label,
            default_scope_mode: ScopeMode::Union,
            default_scope: Vec::new(),
            unbounded_depth: DEFAULT_UNBOUNDED_DEPTH,
            collapsed_preview: 3,
            label_subgroup_min_issues: 4,
            subdivide_min_group_size: 2,
            subdivide_max_depth: 1,
            width: 80,
            height: 24,
        }
    }
}

impl DashboardConfig {
    /// Load configuration from `LENS_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_depth: env_parsed("LENS_DEFAULT_DEPTH", defaults.default_depth),
            centered_by_default: env_bool("LENS_CENTERED_DEFAULT", defaults.centered_by_default),
            default_view: env_parsed("LENS_DEFAULT_VIEW", defaults.default_view),
            default_group_by: env_parsed("LENS_GROUP_BY", defaults.default_group_by),
            default_scope_mode: env_parsed("LENS_SCOPE_MODE", defaults.default_scope_mode),
            default_scope: env_value("LENS_SCOPE").map_or(defaults.default_scope, |v| parse_csv(&v)),
            unbounded_depth: env_usize_opt("LENS_UNBOUNDED_DEPTH")
                .filter(|&d| d > 0)
                .unwrap_or(defaults.unbounded_depth),
            collapsed_preview: env_usize("LENS_COLLAPSED_PREVIEW", defaults.collapsed_preview),
            label_subgroup_min_issues: env_usize(
                "LENS_SUBGROUP_MIN_ISSUES",
                defaults.label_subgroup_min_issues,
            ),
            subdivide_min_group_size: env_usize(
                "LENS_SUBDIVIDE_MIN_GROUP",
                defaults.subdivide_min_group_size,
            ),
            subdivide_max_depth: env_usize("LENS_SUBDIVIDE_MAX_DEPTH", defaults.subdivide_max_depth),
            width: env_u16("LENS_WIDTH", defaults.width),
            height: env_u16("LENS_HEIGHT", defaults.height),
        }
    }

    #[must_use]
    pub const fn grouping_options(&self) -> GroupingOptions {
        GroupingOptions {
            max_depth: self.subdivide_max_depth,
            min_group_size: self.subdivide_min_group_size,
        }
    }
}

// Helper functions for environment variable parsing

#[cfg(test)]
thread_local! {
    static TEST_ENV_OVERRIDES: std::cell::RefCell<HashMap<String, String>> =
        std::cell::RefCell::new(HashMap::new());
}

#[cfg(test)]
fn test_env_override_value(key: &str) -> Option<String> {
    TEST_ENV_OVERRIDES.with(|cell| cell.borrow().get(key).cloned())
}

/// Read a value from the process environment.
#[must_use]
pub fn env_value(key: &str) -> Option<String> {
    #[cfg(test)]
    if let Some(v) = test_env_override_value(key) {
        return Some(v);
    }
    env::var(key).ok()
}

fn parse_bool(value: &str, default: bool) -> bool {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" => true,
        "0" | "false" | "f" | "no" | "n" => false,
        _ => default,
    }
}

fn env_bool(key: &str, default: bool) -> bool {
    env_value(key).map_or(default, |v| parse_bool(&v, default))
}

fn env_u16(key: &str, default: u16) -> u16 {
    env_value(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    env_value(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_usize_opt(key: &str) -> Option<usize> {
    env_value(key).and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            trimmed.parse().ok()
        }
    })
}

fn env_parsed<T: FromStr>(key: &str, default: T) -> T {
    env_value(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestEnvOverrideGuard {
        previous: Vec<(String, Option<String>)>,
    }

    impl TestEnvOverrideGuard {
        fn set(vars: &[(&str, &str)]) -> Self {
            let mut previous = Vec::new();
            TEST_ENV_OVERRIDES.with(|cell| {
                let mut map = cell.borrow_mut();
                for (key, value) in vars {
                    let old = map.get(*key).cloned();
                    previous.push(((*key).to_string(), old));
                    map.insert((*key).to_string(), (*value).to_string());
                }
            });
            Self { previous }
        }
    }

    impl Drop for TestEnvOverrideGuard {
        fn drop(&mut self) {
            TEST_ENV_OVERRIDES.with(|cell| {
                let mut map = cell.borrow_mut();
                for (key, value) in self.previous.drain(..) {
                    match value {
                        Some(v) => {
                            map.insert(key, v);
                        }
                        None => {
                            map.remove(&key);
                        }
                    }
                }
            });
        }
    }

    #[test]
    fn test_default_config() {
        let config = DashboardConfig::default();
        assert_eq!(config.default_depth, DepthOption::Two);
        assert!(config.centered_by_default);
        assert_eq!(config.default_view, ViewMode::Flat);
        assert_eq!(config.default_group_by, GroupByMode::Label);
        assert_eq!(config.default_scope_mode, ScopeMode::Union);
        assert_eq!(config.unbounded_depth, 100);
        assert_eq!(config.collapsed_preview, 3);
        assert_eq!((config.width, config.height), (80, 24));
    }

    #[test]
    fn test_config_from_env() {
        let _env = TestEnvOverrideGuard::set(&[
            ("LENS_DEFAULT_DEPTH", "all"),
            ("LENS_CENTERED_DEFAULT", "no"),
            ("LENS_DEFAULT_VIEW", "workstream"),
            ("LENS_GROUP_BY", "status"),
            ("LENS_SCOPE_MODE", "intersection"),
            ("LENS_SCOPE", "ui, backend,,"),
            ("LENS_SUBDIVIDE_MAX_DEPTH", "2"),
            ("LENS_HEIGHT", "40"),
        ]);
        let config = DashboardConfig::from_env();
        assert_eq!(config.default_depth, DepthOption::All);
        assert!(!config.centered_by_default);
        assert_eq!(config.default_view, ViewMode::Workstream);
        assert_eq!(config.default_group_by, GroupByMode::Status);
        assert_eq!(config.default_scope_mode, ScopeMode::Intersection);
        assert_eq!(config.default_scope, vec!["ui".to_string(), "backend".to_string()]);
        assert_eq!(config.grouping_options().max_depth, 2);
        assert_eq!(config.height, 40);
    }

    #[test]
    fn test_unparseable_values_keep_defaults() {
        let _env = TestEnvOverrideGuard::set(&[
            ("LENS_DEFAULT_DEPTH", "seven"),
            ("LENS_CENTERED_DEFAULT", "maybe"),
            ("LENS_UNBOUNDED_DEPTH", "0"),
            ("LENS_WIDTH", "-3"),
        ]);
        let config = DashboardConfig::from_env();
        assert_eq!(config.default_depth, DepthOption::Two);
        assert!(config.centered_by_default);
        assert_eq!(config.unbounded_depth, DEFAULT_UNBOUNDED_DEPTH);
        assert_eq!(config.width, 80);
    }

    #[test]
    fn test_view_mode_parse() {
        assert_eq!("Grouped".parse::<ViewMode>().ok(), Some(ViewMode::Grouped));
        assert!(matches!("list".parse::<ViewMode>(), Err(Error::InvalidViewMode(_))));
    }
}
