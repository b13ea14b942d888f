//! Registry of indicators and scores.
//!
//! Built once at setup and shared read-only by every request. Both
//! collections are append-only and keep insertion order, which is also the
//! order their hooks run in. Registering the same name twice keeps both
//! entries; both will run.

use crate::error::RegistrationError;
use crate::header::{Indicator, PERF_PREFIX, SCORE_PREFIX, Score};
use axum::http::HeaderName;
use std::fmt;
use std::sync::Arc;

/// Ordered collections of registered capabilities.
///
/// ```
/// use sustainable_axum::indicator::{PerfCpu, PerfTime};
/// use sustainable_axum::score::PerfScoreCo2;
/// use sustainable_axum::Registry;
///
/// let mut registry = Registry::new();
/// registry.register_indicator(PerfTime)?;
/// registry.register_indicator(PerfCpu)?;
/// registry.register_score(PerfScoreCo2::default())?;
/// assert_eq!(registry.allow_headers(), "Perf-Time, Perf-CPU, Perf-Score-1");
/// # Ok::<(), sustainable_axum::RegistrationError>(())
/// ```
#[derive(Clone, Default)]
pub struct Registry {
    indicators: Vec<Arc<dyn Indicator>>,
    scores: Vec<Arc<dyn Score>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an indicator.
    ///
    /// Fails with a contract violation if the name is empty, does not start
    /// with `Perf-`, or is not a valid header name.
    pub fn register_indicator<I: Indicator>(&mut self, indicator: I) -> Result<(), RegistrationError> {
        self.push_indicator(Arc::new(indicator))
    }

    /// Append several indicators, stopping at the first violation.
    ///
    /// Indicators before the failing one stay registered.
    pub fn register_indicators<I>(&mut self, indicators: I) -> Result<(), RegistrationError>
    where
        I: IntoIterator<Item = Box<dyn Indicator>>,
    {
        for indicator in indicators {
            self.push_indicator(Arc::from(indicator))?;
        }
        Ok(())
    }

    /// Append a score.
    ///
    /// Fails with a contract violation unless the name is `Perf-Score-`
    /// followed by a non-negative integer.
    pub fn register_score<S: Score>(&mut self, score: S) -> Result<(), RegistrationError> {
        self.push_score(Arc::new(score))
    }

    /// Append several scores, stopping at the first violation.
    pub fn register_scores<I>(&mut self, scores: I) -> Result<(), RegistrationError>
    where
        I: IntoIterator<Item = Box<dyn Score>>,
    {
        for score in scores {
            self.push_score(Arc::from(score))?;
        }
        Ok(())
    }

    fn push_indicator(&mut self, indicator: Arc<dyn Indicator>) -> Result<(), RegistrationError> {
        validate_indicator_name(indicator.name())?;
        self.indicators.push(indicator);
        Ok(())
    }

    fn push_score(&mut self, score: Arc<dyn Score>) -> Result<(), RegistrationError> {
        validate_score_name(score.name())?;
        self.scores.push(score);
        Ok(())
    }

    pub fn indicators(&self) -> &[Arc<dyn Indicator>] {
        &self.indicators
    }

    pub fn scores(&self) -> &[Arc<dyn Score>] {
        &self.scores
    }

    /// Every registered name, indicators first, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.indicators
            .iter()
            .map(|i| i.name())
            .chain(self.scores.iter().map(|s| s.name()))
    }

    /// Value of the discovery header sent on `OPTIONS` requests.
    pub fn allow_headers(&self) -> String {
        self.names().collect::<Vec<_>>().join(", ")
    }

    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty() && self.scores.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field(
                "indicators",
                &self.indicators.iter().map(|i| i.name()).collect::<Vec<_>>(),
            )
            .field(
                "scores",
                &self.scores.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

fn has_prefix(name: &str, prefix: &str) -> bool {
    name.len() >= prefix.len()
        && name.is_char_boundary(prefix.len())
        && name[..prefix.len()].eq_ignore_ascii_case(prefix)
}

fn validate_header_name(name: &str) -> Result<(), RegistrationError> {
    HeaderName::from_bytes(name.as_bytes())
        .map(|_| ())
        .map_err(|_| RegistrationError::contract(name, "name must be a valid HTTP header name"))
}

fn validate_indicator_name(name: &str) -> Result<(), RegistrationError> {
    if name.is_empty() {
        return Err(RegistrationError::contract(name, "indicator name must not be empty"));
    }
    if !has_prefix(name, PERF_PREFIX) {
        return Err(RegistrationError::contract(
            name,
            "indicator name must start with 'Perf-'",
        ));
    }
    validate_header_name(name)
}

fn validate_score_name(name: &str) -> Result<(), RegistrationError> {
    let numbered = has_prefix(name, SCORE_PREFIX) && {
        let suffix = &name[SCORE_PREFIX.len()..];
        !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit())
    };
    if !numbered {
        return Err(RegistrationError::contract(
            name,
            "score name must be 'Perf-Score-' followed by a number",
        ));
    }
    validate_header_name(name)
}
