use std::path::PathBuf;

use crate::data::aggregate::DEFAULT_TOP_N;

pub const DATA_PATH_ENV: &str = "HEALTH_DASHBOARD_DATA";
pub const TOP_N_ENV: &str = "HEALTH_DASHBOARD_TOP_N";
pub const SHARE_CATEGORY_ENV: &str = "HEALTH_DASHBOARD_SHARE_CATEGORY";

/// Spreadsheet opened when nothing else is configured.
pub const DEFAULT_DATA_PATH: &str = "Public Health Surveillance.xlsx";
/// Objective whose share orders the stacked bar chart.
pub const DEFAULT_SHARE_CATEGORY: &str = "Infodemiology";

/// Start-up settings, resolved once in `main`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    /// Dataset loaded on start-up.
    pub data_path: PathBuf,
    /// Number of data sources shown before bucketing into `Others`.
    pub top_n: usize,
    pub share_category: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            top_n: DEFAULT_TOP_N,
            share_category: DEFAULT_SHARE_CATEGORY.to_string(),
        }
    }
}

impl DashboardConfig {
    /// Resolve from the process arguments and environment.
    pub fn from_env() -> Self {
        Self::resolve(std::env::args().nth(1), |key| std::env::var(key).ok())
    }

    /// Precedence: positional argument, then environment, then defaults.
    pub fn resolve<F>(arg: Option<String>, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = arg.or_else(|| env(DATA_PATH_ENV)).filter(|p| !p.trim().is_empty()) {
            config.data_path = PathBuf::from(path);
        }

        if let Some(raw) = env(TOP_N_ENV) {
            match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => config.top_n = n,
                _ => log::warn!("Ignoring {TOP_N_ENV}={raw:?}; using {}", config.top_n),
            }
        }

        if let Some(category) = env(SHARE_CATEGORY_ENV).filter(|c| !c.trim().is_empty()) {
            config.share_category = category;
        }

        log::debug!("Resolved configuration: {config:?}");
        config
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_input() {
        assert_eq!(DashboardConfig::resolve(None, env_of(&[])), DashboardConfig::default());
    }

    #[test]
    fn argument_beats_environment() {
        let config = DashboardConfig::resolve(
            Some("studies.csv".into()),
            env_of(&[(DATA_PATH_ENV, "other.xlsx")]),
        );
        assert_eq!(config.data_path, PathBuf::from("studies.csv"));

        let config = DashboardConfig::resolve(None, env_of(&[(DATA_PATH_ENV, "other.xlsx")]));
        assert_eq!(config.data_path, PathBuf::from("other.xlsx"));
    }

    #[test]
    fn invalid_top_n_falls_back() {
        for raw in ["0", "ten", "-3"] {
            let config = DashboardConfig::resolve(None, env_of(&[(TOP_N_ENV, raw)]));
            assert_eq!(config.top_n, DEFAULT_TOP_N);
        }
        let config = DashboardConfig::resolve(None, env_of(&[(TOP_N_ENV, " 5 ")]));
        assert_eq!(config.top_n, 5);
    }

    #[test]
    fn share_category_is_configurable() {
        let config = DashboardConfig::resolve(None, env_of(&[(SHARE_CATEGORY_ENV, "Nowcasting")]));
        assert_eq!(config.share_category, "Nowcasting");
    }
}
