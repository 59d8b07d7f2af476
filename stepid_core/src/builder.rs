//! Builder for `StepExperiment`.
//!
//! Only the channel is mandatory; every other part falls back to the bench
//! defaults. `build()` validates the configuration.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use stepid_traits::{Clock, LineChannel, MonotonicClock};

use crate::config::{ExperimentCfg, SafetyCfg, Timeouts};
use crate::driver::StepExperiment;
use crate::error::{BuildError, Result};

impl<C: LineChannel> StepExperiment<C> {
    /// Start building a StepExperiment.
    pub fn builder() -> StepExperimentBuilder<C> {
        StepExperimentBuilder::default()
    }
}

pub struct StepExperimentBuilder<C: LineChannel> {
    channel: Option<C>,
    experiment: Option<ExperimentCfg>,
    safety: Option<SafetyCfg>,
    timeouts: Option<Timeouts>,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
    cancel: Option<Arc<AtomicBool>>,
}

impl<C: LineChannel> Default for StepExperimentBuilder<C> {
    fn default() -> Self {
        Self {
            channel: None,
            experiment: None,
            safety: None,
            timeouts: None,
            clock: None,
            cancel: None,
        }
    }
}

impl<C: LineChannel> StepExperimentBuilder<C> {
    pub fn with_channel(mut self, channel: C) -> Self {
        self.channel = Some(channel);
        self
    }

    pub fn with_experiment(mut self, experiment: ExperimentCfg) -> Self {
        self.experiment = Some(experiment);
        self
    }

    pub fn with_safety(mut self, safety: SafetyCfg) -> Self {
        self.safety = Some(safety);
        self
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = Some(timeouts);
        self
    }

    /// Clock for wall-time bounds (silence, capture cap).
    pub fn with_clock(mut self, clock: impl Clock + Send + Sync + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Flag polled once per iteration; setting it aborts with `Cancelled`.
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn build(self) -> Result<StepExperiment<C>> {
        let channel = self
            .channel
            .ok_or_else(|| eyre::Report::new(BuildError::MissingChannel))?;
        let experiment = self.experiment.unwrap_or_default();
        let safety = self.safety.unwrap_or_default();
        let timeouts = self.timeouts.unwrap_or_default();

        let d = &experiment.durations;
        if d.before_time < 0 || d.step_time < 0 || d.after_time < 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "phase durations must be >= 0",
            )));
        }
        if experiment.step_target == 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "step_target must be non-zero",
            )));
        }
        if timeouts.read_ms == 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "read timeout must be >= 1 ms",
            )));
        }
        if safety.max_silent_ms == 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "max_silent_ms must be >= 1",
            )));
        }

        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(MonotonicClock::new()));
        Ok(StepExperiment::new(
            channel,
            experiment,
            safety,
            timeouts,
            clock,
            self.cancel,
        ))
    }
}
