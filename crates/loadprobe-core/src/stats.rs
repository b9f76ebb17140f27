//! Duration statistics over finished attempts.

use tracing::info;

use crate::model::{Attempt, AttemptStatus};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationStats {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

impl DurationStats {
    /// `None` for an empty series.
    pub fn from_series(series: &[f64]) -> Option<Self> {
        if series.is_empty() {
            return None;
        }
        let min = series.iter().copied().fold(f64::INFINITY, f64::min);
        let max = series.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let avg = series.iter().sum::<f64>() / series.len() as f64;
        Some(Self { min, max, avg })
    }

    /// Values rounded to 3 decimals, as displayed.
    pub fn rounded(&self) -> Self {
        Self {
            min: round3(self.min),
            max: round3(self.max),
            avg: round3(self.avg),
        }
    }
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

/// Total-batch and last-statement statistics for one test.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DurationSummary {
    pub total: Option<DurationStats>,
    pub last_query: Option<DurationStats>,
}

impl DurationSummary {
    /// Only FINISHED attempts contribute; anything else is skipped.
    pub fn from_attempts<'a>(attempts: impl IntoIterator<Item = &'a Attempt>) -> Self {
        let mut total = Vec::new();
        let mut last_query = Vec::new();
        for attempt in attempts
            .into_iter()
            .filter(|a| a.status == AttemptStatus::Finished)
        {
            total.push(attempt.duration);
            if let Some(last) = attempt.last_sub_statement() {
                last_query.push(last.duration);
            }
        }
        Self {
            total: DurationStats::from_series(&total),
            last_query: DurationStats::from_series(&last_query),
        }
    }

    pub fn log(&self) {
        for (label, stats) in [("Total", self.total), ("Last query", self.last_query)] {
            let Some(stats) = stats else { continue };
            info!("{} duration stats ({})", label, AttemptStatus::Finished);
            info!("- Min: {:.3} s", stats.min);
            info!("- Max: {:.3} s", stats.max);
            info!("- Avg: {:.3} s", stats.avg);
        }
    }
}
