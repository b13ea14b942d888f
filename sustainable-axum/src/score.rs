//! Built-in scores.

use crate::error::BoxError;
use crate::header::{PerfHeader, SCORE_PRECISION, Score, insert_metric, read_metric};
use crate::state::RequestState;
use axum::response::Response;

/// Grid carbon intensity assumed by [`PerfScoreCo2`], in kg CO2 per kWh.
pub const DEFAULT_CARBON_INTENSITY: f64 = 0.475;

const JOULES_PER_KWH: f64 = 3_600_000.0;

/// Estimated CO2 emitted for the request, in kilograms (`Perf-Score-1`).
///
/// Derived from the `Perf-Energy` header, so clients must opt in to both:
/// `Perf: perf-energy,perf-score-1`. Without an energy reading no header is
/// added.
#[derive(Debug, Clone, Copy)]
pub struct PerfScoreCo2 {
    intensity: f64,
}

impl Default for PerfScoreCo2 {
    fn default() -> Self {
        Self {
            intensity: DEFAULT_CARBON_INTENSITY,
        }
    }
}

impl PerfScoreCo2 {
    /// Use `kg_per_kwh` as the carbon intensity of the power grid.
    pub fn with_intensity(kg_per_kwh: f64) -> Self {
        Self {
            intensity: kg_per_kwh,
        }
    }

    pub fn emissions(&self, joules: f64) -> f64 {
        joules / JOULES_PER_KWH * self.intensity
    }
}

impl PerfHeader for PerfScoreCo2 {
    fn name(&self) -> &str {
        "Perf-Score-1"
    }

    fn after_request(&self, _: &mut RequestState, response: &mut Response) -> Result<(), BoxError> {
        let Some(joules) = read_metric(response, "Perf-Energy") else {
            tracing::warn!(
                target: "sustainable_axum",
                score = self.name(),
                "no Perf-Energy reading on response, score skipped"
            );
            return Ok(());
        };
        insert_metric(response, self.name(), self.emissions(joules), SCORE_PRECISION)
    }
}

impl Score for PerfScoreCo2 {}
