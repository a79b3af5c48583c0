//! Spending anomaly detection
//!
//! Flags expenses whose amount sits unusually far from their category's
//! typical spend, measured as a z-score against per-category mean and sample
//! standard deviation. Statistics always come from the whole expense table so
//! they do not shift with whatever window a caller is looking at.

use std::collections::BTreeMap;

use tracing::debug;

use crate::models::{AnomalyRecord, Expense};

pub const DEFAULT_THRESHOLD: f64 = 2.0;

/// Detection configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionConfig {
    /// Standard deviations beyond which an expense is anomalous (strict >)
    pub threshold: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// Amount statistics for one category
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryStats {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; None with fewer than two rows
    pub std: Option<f64>,
}

impl CategoryStats {
    fn from_amounts(amounts: &[f64]) -> Self {
        let count = amounts.len();
        let mean = if count == 0 {
            0.0
        } else {
            amounts.iter().sum::<f64>() / count as f64
        };
        let std = (count > 1).then(|| {
            let variance =
                amounts.iter().map(|a| (a - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
            variance.sqrt()
        });
        Self { count, mean, std }
    }

    /// z-score of `amount`, undefined when the category has no spread
    pub fn z_score(&self, amount: f64) -> Option<f64> {
        match self.std {
            Some(std) if std > 0.0 => Some((amount - self.mean) / std),
            _ => None,
        }
    }
}

pub struct AnomalyDetector<'a> {
    expenses: &'a [Expense],
    config: DetectionConfig,
}

impl<'a> AnomalyDetector<'a> {
    pub fn new(expenses: &'a [Expense]) -> Self {
        Self::with_config(expenses, DetectionConfig::default())
    }

    pub fn with_config(expenses: &'a [Expense], config: DetectionConfig) -> Self {
        Self { expenses, config }
    }

    /// Mean and spread of amounts per category across every expense
    pub fn category_stats(&self) -> BTreeMap<String, CategoryStats> {
        let mut amounts: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for e in self.expenses {
            amounts.entry(e.category.as_str()).or_default().push(e.amount);
        }
        amounts
            .into_iter()
            .map(|(category, values)| (category.to_string(), CategoryStats::from_amounts(&values)))
            .collect()
    }

    /// Detect with the configured threshold
    pub fn detect(&self) -> Vec<AnomalyRecord> {
        self.detect_with_threshold(self.config.threshold)
    }

    /// Expenses with `|z| > threshold` and a positive amount, largest first
    ///
    /// Categories with zero or undefined spread never produce anomalies.
    pub fn detect_with_threshold(&self, threshold: f64) -> Vec<AnomalyRecord> {
        let stats = self.category_stats();

        let mut anomalies: Vec<AnomalyRecord> = self
            .expenses
            .iter()
            .filter(|e| e.amount > 0.0)
            .filter_map(|e| {
                let s = stats.get(&e.category)?;
                let z = s.z_score(e.amount)?;
                (z.abs() > threshold).then(|| AnomalyRecord {
                    date: e.date,
                    category: e.category.clone(),
                    amount: e.amount,
                    payment_type: e.payment_type.clone(),
                    city: e.city.clone(),
                    z_score: z,
                    category_mean: s.mean,
                    category_std: s.std.unwrap_or(0.0),
                })
            })
            .collect();

        anomalies.sort_by(|a, b| b.amount.total_cmp(&a.amount));
        debug!(
            threshold,
            count = anomalies.len(),
            "Anomaly detection complete"
        );
        anomalies
    }
}
