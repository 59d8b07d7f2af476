//! Step experiment driver.
//!
//! Enables reporting, then consumes telemetry one line at a time: the first
//! decoded line anchors the phase clock, every later line carrying both
//! time and position becomes a `Sample` tagged with the current phase, and
//! every decoded line is fed to the phase machine, whose actions are the
//! only writes made during the run.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use stepid_traits::{Clock, LineChannel};

use crate::command::{Command, enable_reporting};
use crate::config::{ExperimentCfg, SafetyCfg, Timeouts};
use crate::error::StepIdError;
use crate::hw_error::map_hw_error;
use crate::phase::PhaseState;
use crate::status::CaptureStatus;
use crate::telemetry::TelemetryDecoder;
use crate::types::{Phase, Sample};

pub struct StepExperiment<C: LineChannel> {
    pub(crate) channel: C,
    pub(crate) decoder: TelemetryDecoder,
    pub(crate) experiment: ExperimentCfg,
    pub(crate) safety: SafetyCfg,
    pub(crate) read_timeout: Duration,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
    pub(crate) cancel: Option<Arc<AtomicBool>>,

    // Per-run state, reset by begin()
    state: PhaseState,
    // Device time the current phase started at; None until the first decoded line
    anchor: Option<i64>,
    samples: Vec<Sample>,
    line: String,
    started: bool,
    epoch: Instant,
    last_decoded_ms: u64,
    lines_read: u64,
    lines_skipped: u64,
}

impl<C: LineChannel> core::fmt::Debug for StepExperiment<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StepExperiment")
            .field("motor", &self.experiment.motor)
            .field("state", &self.state)
            .field("samples", &self.samples.len())
            .field("lines_read", &self.lines_read)
            .finish()
    }
}

impl<C: LineChannel> StepExperiment<C> {
    pub(crate) fn new(
        channel: C,
        experiment: ExperimentCfg,
        safety: SafetyCfg,
        timeouts: Timeouts,
        clock: Arc<dyn Clock + Send + Sync>,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Self {
        let epoch = clock.now();
        Self {
            channel,
            decoder: TelemetryDecoder::new(experiment.motor.telemetry_field()),
            experiment,
            safety,
            read_timeout: Duration::from_millis(timeouts.read_ms),
            clock,
            cancel,
            state: PhaseState::INITIAL,
            anchor: None,
            samples: Vec::new(),
            line: String::with_capacity(128),
            started: false,
            epoch,
            last_decoded_ms: 0,
            lines_read: 0,
            lines_skipped: 0,
        }
    }

    /// Reset per-run state and turn reporting on.
    pub fn begin(&mut self) -> Result<(), StepIdError> {
        self.state = PhaseState::INITIAL;
        self.anchor = None;
        self.samples.clear();
        self.epoch = self.clock.now();
        self.last_decoded_ms = 0;
        self.lines_read = 0;
        self.lines_skipped = 0;
        self.started = true;
        tracing::info!(
            motor = self.experiment.motor.name(),
            before_time = self.experiment.durations.before_time,
            step_time = self.experiment.durations.step_time,
            after_time = self.experiment.durations.after_time,
            "step experiment start"
        );
        for cmd in enable_reporting(self.experiment.motor) {
            self.send(cmd)?;
        }
        Ok(())
    }

    /// One iteration of the capture loop: at most one line is read.
    pub fn step(&mut self) -> Result<CaptureStatus, StepIdError> {
        if !self.started {
            self.begin()?;
        }
        if self.state.is_done() {
            return Ok(CaptureStatus::Complete);
        }
        self.check_bounds()?;

        let got = match self.channel.read_line(&mut self.line, self.read_timeout) {
            Ok(got) => got,
            Err(e) => return Err(self.abort(map_hw_error(&*e))),
        };
        if !got {
            self.check_silence()?;
            return Ok(CaptureStatus::Running);
        }
        self.lines_read += 1;

        let Some(reading) = self.decoder.decode(&self.line) else {
            self.lines_skipped += 1;
            tracing::trace!(line = %self.line, "skipping undecodable line");
            self.check_silence()?;
            return Ok(CaptureStatus::Running);
        };
        self.last_decoded_ms = self.clock.ms_since(self.epoch);

        let Some(anchor) = self.anchor else {
            tracing::debug!(time = reading.time, "phase anchor");
            self.anchor = Some(reading.time);
            return Ok(CaptureStatus::Running);
        };

        if let (Some(position), Some(phase)) = (reading.value, self.state.phase()) {
            self.samples.push(Sample {
                time: reading.time,
                position,
                phase,
            });
        }

        let elapsed = reading.time.saturating_sub(anchor);
        let transition = self.state.advance(elapsed, &self.experiment.durations);
        if let Some(action) = transition.action {
            tracing::debug!(
                from = ?self.state,
                to = ?transition.next,
                time = reading.time,
                elapsed,
                "phase transition"
            );
            let cmds = action.commands(self.experiment.motor, self.experiment.step_target);
            for cmd in cmds.into_iter().flatten() {
                self.send(cmd)?;
            }
            self.anchor = Some(reading.time);
        }
        self.state = transition.next;

        if self.state.is_done() {
            tracing::info!(
                samples = self.samples.len(),
                lines = self.lines_read,
                skipped = self.lines_skipped,
                "step experiment complete"
            );
            return Ok(CaptureStatus::Complete);
        }
        Ok(CaptureStatus::Running)
    }

    /// Run the experiment to completion and hand back the samples.
    pub fn run(&mut self) -> Result<Vec<Sample>, StepIdError> {
        self.begin()?;
        while self.step()? == CaptureStatus::Running {}
        Ok(std::mem::take(&mut self.samples))
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn state(&self) -> PhaseState {
        self.state
    }

    /// Lines read that did not decode.
    pub fn lines_skipped(&self) -> u64 {
        self.lines_skipped
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    fn send(&mut self, cmd: Command) -> Result<(), StepIdError> {
        let text = cmd.to_string();
        tracing::debug!(command = %text, "write");
        self.channel
            .write_line(&text)
            .map_err(|e| self.abort(map_hw_error(&*e)))
    }

    fn check_bounds(&mut self) -> Result<(), StepIdError> {
        if self
            .cancel
            .as_ref()
            .is_some_and(|c| c.load(Ordering::Relaxed))
        {
            return Err(self.abort(StepIdError::Cancelled));
        }
        let max_ms = self.safety.max_capture_ms;
        if max_ms > 0 && self.clock.ms_since(self.epoch) > max_ms {
            return Err(self.abort(StepIdError::CaptureLimit(format!(
                "capture exceeded {max_ms} ms"
            ))));
        }
        let max_lines = self.safety.max_lines;
        if max_lines > 0 && self.lines_read >= max_lines {
            return Err(self.abort(StepIdError::CaptureLimit(format!(
                "read {max_lines} lines without completing"
            ))));
        }
        Ok(())
    }

    fn check_silence(&mut self) -> Result<(), StepIdError> {
        let silent_ms = self
            .clock
            .ms_since(self.epoch)
            .saturating_sub(self.last_decoded_ms);
        if silent_ms >= self.safety.max_silent_ms {
            tracing::error!(silent_ms, "no telemetry from link");
            return Err(self.abort(StepIdError::Timeout));
        }
        Ok(())
    }

    /// Best-effort release of an active step before surfacing `err`.
    /// Reporting is left as it is.
    fn abort(&mut self, err: StepIdError) -> StepIdError {
        if self.state.phase() == Some(Phase::Step) {
            let release = Command::MotorSet(self.experiment.motor, 0).to_string();
            if let Err(e) = self.channel.write_line(&release) {
                tracing::warn!(error = %e, "motor release failed on abort");
            }
        }
        tracing::error!(error = %err, state = ?self.state, "capture aborted");
        err
    }
}
