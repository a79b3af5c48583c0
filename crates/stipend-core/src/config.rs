//! Dashboard configuration
//!
//! ## Configuration Resolution
//!
//! 1. An explicit path passed by the caller (must exist)
//! 2. Override in the data dir (~/.local/share/stipend/config/stipend.toml)
//! 3. Embedded defaults (compiled into binary)
//!
//! Every key is optional. Keys missing from a file keep their default value.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::cache::DEFAULT_TTL;
use crate::detect::DetectionConfig;
use crate::error::{Error, Result};
use crate::import::{DataPaths, QualityThresholds};
use crate::roi::FallbackSalaries;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/stipend.toml");

/// Where the four source files live
#[derive(Debug, Clone, PartialEq)]
pub struct DataConfig {
    pub dir: PathBuf,
    pub expenses: String,
    pub income: String,
    pub city_costs: String,
    pub salary_reference: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
            expenses: "cost_of_living.csv".into(),
            income: "salary.csv".into(),
            city_costs: "city_costs.csv".into(),
            salary_reference: "salary_data.csv".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub data: DataConfig,
    pub detection: DetectionConfig,
    pub quality: QualityThresholds,
    pub roi: FallbackSalaries,
    pub cache_ttl: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            detection: DetectionConfig::default(),
            quality: QualityThresholds::default(),
            roi: FallbackSalaries::default(),
            cache_ttl: DEFAULT_TTL,
        }
    }
}

impl DashboardConfig {
    /// Resolve and load configuration
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Self::from_toml(DEFAULT_CONFIG),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    /// Parse TOML on top of the defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        let mut config = Self::default();

        if let Some(data) = raw.data {
            if let Some(dir) = data.dir {
                config.data.dir = dir;
            }
            if let Some(v) = data.expenses {
                config.data.expenses = v;
            }
            if let Some(v) = data.income {
                config.data.income = v;
            }
            if let Some(v) = data.city_costs {
                config.data.city_costs = v;
            }
            if let Some(v) = data.salary_reference {
                config.data.salary_reference = v;
            }
        }

        if let Some(threshold) = raw.anomaly.and_then(|a| a.threshold) {
            if !threshold.is_finite() || threshold < 0.0 {
                return Err(Error::Config(format!(
                    "anomaly.threshold must be a non-negative number, got {}",
                    threshold
                )));
            }
            config.detection.threshold = threshold;
        }

        if let Some(quality) = raw.quality {
            if let Some(v) = quality.large_expense {
                config.quality.large_expense = v;
            }
            if let Some(v) = quality.large_income {
                config.quality.large_income = v;
            }
        }

        if let Some(roi) = raw.roi {
            if let Some(v) = roi.fallback_conservative {
                config.roi.conservative = v;
            }
            if let Some(v) = roi.fallback_realistic {
                config.roi.realistic = v;
            }
            if let Some(v) = roi.fallback_optimistic {
                config.roi.optimistic = v;
            }
        }

        if let Some(ttl) = raw.cache.and_then(|c| c.ttl_secs) {
            config.cache_ttl = Duration::from_secs(ttl);
        }

        Ok(config)
    }

    /// Source file paths, with `dir_override` replacing the configured dir
    pub fn data_paths(&self, dir_override: Option<&Path>) -> DataPaths {
        let dir = dir_override.unwrap_or(self.data.dir.as_path());
        DataPaths {
            expenses: dir.join(&self.data.expenses),
            income: dir.join(&self.data.income),
            city_costs: dir.join(&self.data.city_costs),
            salary_reference: dir.join(&self.data.salary_reference),
        }
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("stipend").join("config").join("stipend.toml"))
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    data: Option<RawData>,
    anomaly: Option<RawAnomaly>,
    quality: Option<RawQuality>,
    roi: Option<RawRoi>,
    cache: Option<RawCache>,
}

#[derive(Debug, Deserialize)]
struct RawData {
    dir: Option<PathBuf>,
    expenses: Option<String>,
    income: Option<String>,
    city_costs: Option<String>,
    salary_reference: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawAnomaly {
    threshold: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawQuality {
    large_expense: Option<f64>,
    large_income: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawRoi {
    fallback_conservative: Option<f64>,
    fallback_realistic: Option<f64>,
    fallback_optimistic: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawCache {
    ttl_secs: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_embedded_defaults_match_default_impl() {
        let config = DashboardConfig::from_toml(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn test_partial_override_keeps_other_defaults() {
        let config = DashboardConfig::from_toml(
            r#"
[anomaly]
threshold = 3.5

[roi]
fallback_realistic = 90000.0
"#,
        )
        .unwrap();
        assert_eq!(config.detection.threshold, 3.5);
        assert_eq!(config.roi.realistic, 90000.0);
        assert_eq!(config.roi.conservative, 60000.0);
        assert_eq!(config.quality, QualityThresholds::default());
        assert_eq!(config.data, DataConfig::default());
    }

    #[test]
    fn test_empty_file_is_all_defaults() {
        let config = DashboardConfig::from_toml("").unwrap();
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = DashboardConfig::from_toml("[anomaly\nthreshold = ").unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = DashboardConfig::from_toml("[anomaly]\nthreshold = -1.0").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_data_paths_join_dir() {
        let config = DashboardConfig::from_toml(
            r#"
[data]
dir = "/srv/finance"
expenses = "spend.csv"
"#,
        )
        .unwrap();
        let paths = config.data_paths(None);
        assert_eq!(paths.expenses, PathBuf::from("/srv/finance/spend.csv"));
        assert_eq!(paths.income, PathBuf::from("/srv/finance/salary.csv"));

        let paths = config.data_paths(Some(Path::new("other")));
        assert_eq!(paths.salary_reference, PathBuf::from("other/salary_data.csv"));
        assert_eq!(DashboardConfig::default().data_paths(Some(Path::new("d"))), DataPaths::in_dir("d"));
    }

    #[test]
    fn test_explicit_file_is_read_and_must_exist() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("stipend.toml");
        fs::write(&path, "[cache]\nttl_secs = 60\n").unwrap();

        let config = DashboardConfig::load(Some(path.as_path())).unwrap();
        assert_eq!(config.cache_ttl, Duration::from_secs(60));

        let missing = temp.path().join("missing.toml");
        assert!(matches!(
            DashboardConfig::load(Some(missing.as_path())),
            Err(Error::Config(_))
        ));
    }
}
