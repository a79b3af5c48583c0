//! Stipend Core Library
//!
//! Analytics engine for a student's personal finance dashboard:
//! - CSV loading and cleaning of expenses, income and reference tables
//! - Monthly and category aggregation over date windows
//! - Per-category z-score anomaly detection
//! - What-if budget scenarios against a baseline snapshot
//! - Degree ROI and break-even estimates
//! - Optional TTL memoization for repeated report requests

pub mod aggregate;
pub mod cache;
pub mod categories;
pub mod config;
pub mod detect;
pub mod error;
pub mod import;
pub mod models;
pub mod roi;
pub mod scenario;

/// Test utilities: in-memory fixture builders
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use aggregate::{city_cost_summary, Aggregator};
pub use cache::{CacheStats, TtlCache};
pub use categories::{group_for, CategoryGroup};
pub use config::DashboardConfig;
pub use detect::{AnomalyDetector, CategoryStats, DetectionConfig};
pub use error::{Error, Result};
pub use import::{
    CleaningReport, DataPaths, DataQualityIssue, Dataset, LoadReport, QualityThresholds,
};
pub use models::*;
pub use roi::{roi_analysis, FallbackSalaries, Outlook, RoiAnalysis, RoiScenario, SalarySource};
pub use scenario::{
    ComparisonRow, Scenario, ScenarioChanges, ScenarioComparison, ScenarioEngine, ScenarioMetrics,
};
