//! Built-in indicators.
//!
//! | Type | Header | Unit |
//! |------|--------|------|
//! | [`PerfTime`] | `Perf-Time` | wall-clock milliseconds |
//! | [`PerfCpu`] | `Perf-CPU` | process CPU milliseconds |
//! | [`PerfRam`] | `Perf-RAM` | resident memory, megabytes |
//! | [`PerfEnergy`] | `Perf-Energy` | estimated joules |
//! | [`PerfPower`] | `Perf-Power` | estimated average watts |
//!
//! CPU time is process-wide, so concurrent requests inflate each other's
//! `Perf-CPU`, `Perf-Energy` and `Perf-Power` values.

use crate::error::BoxError;
use crate::header::{INDICATOR_PRECISION, Indicator, PerfHeader, insert_metric};
use crate::state::RequestState;
use axum::response::Response;
use cpu_time::ProcessTime;
use std::time::{Duration, Instant};
use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System};

/// Average CPU package power assumed by the energy estimate, in watts.
pub const DEFAULT_CPU_POWER_WATTS: f64 = 42.5;

const BYTES_PER_MB: f64 = 1_000_000.0;

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

fn missing(name: &str) -> BoxError {
    format!("{name}: before phase did not run for this request").into()
}

/// Wall-clock time spent between the before and after phases.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerfTime;

#[derive(Debug, Clone, Copy)]
struct TimeStart(Instant);

impl PerfHeader for PerfTime {
    fn name(&self) -> &str {
        "Perf-Time"
    }

    fn after_request(&self, state: &mut RequestState, response: &mut Response) -> Result<(), BoxError> {
        let TimeStart(start) = state.get::<TimeStart>().copied().ok_or_else(|| missing(self.name()))?;
        insert_metric(response, self.name(), millis(start.elapsed()), INDICATOR_PRECISION)
    }
}

impl Indicator for PerfTime {
    fn before_request(&self, state: &mut RequestState) -> Result<(), BoxError> {
        state.insert(TimeStart(Instant::now()));
        Ok(())
    }
}

/// CPU time consumed by the process while the request was handled.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerfCpu;

#[derive(Debug, Clone, Copy)]
struct CpuStart(ProcessTime);

impl PerfHeader for PerfCpu {
    fn name(&self) -> &str {
        "Perf-CPU"
    }

    fn after_request(&self, state: &mut RequestState, response: &mut Response) -> Result<(), BoxError> {
        let CpuStart(start) = state.get::<CpuStart>().copied().ok_or_else(|| missing(self.name()))?;
        let elapsed = start.try_elapsed()?;
        insert_metric(response, self.name(), millis(elapsed), INDICATOR_PRECISION)
    }
}

impl Indicator for PerfCpu {
    fn before_request(&self, state: &mut RequestState) -> Result<(), BoxError> {
        state.insert(CpuStart(ProcessTime::try_now()?));
        Ok(())
    }
}

/// Resident memory of the server process once the handler has finished.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerfRam;

impl PerfRam {
    fn resident_bytes() -> Result<u64, BoxError> {
        let pid = sysinfo::get_current_pid()?;
        let mut system = System::new();
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing().with_memory(),
        );
        let process = system
            .process(pid)
            .ok_or("current process not found in process table")?;
        Ok(process.memory())
    }
}

impl PerfHeader for PerfRam {
    fn name(&self) -> &str {
        "Perf-RAM"
    }

    fn after_request(&self, _: &mut RequestState, response: &mut Response) -> Result<(), BoxError> {
        let megabytes = Self::resident_bytes()? as f64 / BYTES_PER_MB;
        insert_metric(response, self.name(), megabytes, INDICATOR_PRECISION)
    }
}

impl Indicator for PerfRam {
    fn before_request(&self, _: &mut RequestState) -> Result<(), BoxError> {
        Ok(())
    }
}

/// Per-request energy estimate shared by [`PerfEnergy`] and [`PerfPower`].
///
/// Created by whichever of the two runs its before phase first.
#[derive(Debug, Clone, Copy)]
pub struct EnergyTracker {
    started: Instant,
    cpu_start: ProcessTime,
    power_watts: f64,
}

impl EnergyTracker {
    pub fn start(power_watts: f64) -> Result<Self, BoxError> {
        Ok(Self {
            started: Instant::now(),
            cpu_start: ProcessTime::try_now()?,
            power_watts,
        })
    }

    /// Estimated energy so far, in joules.
    pub fn joules(&self) -> Result<f64, BoxError> {
        Ok(self.cpu_start.try_elapsed()?.as_secs_f64() * self.power_watts)
    }

    /// Estimated average power since the tracker started, in watts.
    pub fn watts(&self) -> Result<f64, BoxError> {
        let wall = self.started.elapsed().as_secs_f64();
        if wall <= 0.0 {
            return Ok(0.0);
        }
        Ok(self.joules()? / wall)
    }

    fn ensure(state: &mut RequestState, power_watts: f64) -> Result<(), BoxError> {
        if !state.contains::<EnergyTracker>() {
            state.insert(Self::start(power_watts)?);
        }
        Ok(())
    }
}

/// Energy estimated from process CPU time and an assumed power draw.
#[derive(Debug, Clone, Copy)]
pub struct PerfEnergy {
    power_watts: f64,
}

impl Default for PerfEnergy {
    fn default() -> Self {
        Self {
            power_watts: DEFAULT_CPU_POWER_WATTS,
        }
    }
}

impl PerfEnergy {
    pub fn with_power_watts(power_watts: f64) -> Self {
        Self { power_watts }
    }
}

impl PerfHeader for PerfEnergy {
    fn name(&self) -> &str {
        "Perf-Energy"
    }

    fn after_request(&self, state: &mut RequestState, response: &mut Response) -> Result<(), BoxError> {
        let tracker = state.get::<EnergyTracker>().ok_or_else(|| missing(self.name()))?;
        insert_metric(response, self.name(), tracker.joules()?, INDICATOR_PRECISION)
    }
}

impl Indicator for PerfEnergy {
    fn before_request(&self, state: &mut RequestState) -> Result<(), BoxError> {
        EnergyTracker::ensure(state, self.power_watts)
    }
}

/// Average power over the request, from the same estimate as [`PerfEnergy`].
#[derive(Debug, Clone, Copy)]
pub struct PerfPower {
    power_watts: f64,
}

impl Default for PerfPower {
    fn default() -> Self {
        Self {
            power_watts: DEFAULT_CPU_POWER_WATTS,
        }
    }
}

impl PerfPower {
    pub fn with_power_watts(power_watts: f64) -> Self {
        Self { power_watts }
    }
}

impl PerfHeader for PerfPower {
    fn name(&self) -> &str {
        "Perf-Power"
    }

    fn after_request(&self, state: &mut RequestState, response: &mut Response) -> Result<(), BoxError> {
        let tracker = state.get::<EnergyTracker>().ok_or_else(|| missing(self.name()))?;
        insert_metric(response, self.name(), tracker.watts()?, INDICATOR_PRECISION)
    }
}

impl Indicator for PerfPower {
    fn before_request(&self, state: &mut RequestState) -> Result<(), BoxError> {
        EnergyTracker::ensure(state, self.power_watts)
    }
}
