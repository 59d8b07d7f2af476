//! Capture-then-analyze orchestration.
//!
//! Capture produces the complete sample list first; analysis is a single
//! batch pass over it. Any error aborts the whole run and the partial
//! capture is dropped.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use stepid_traits::{Clock, LineChannel, MonotonicClock};

use crate::align::align;
use crate::characterize::Characterizer;
use crate::config::{AnalysisCfg, ExperimentCfg, SafetyCfg, Timeouts};
use crate::driver::StepExperiment;
use crate::error::{Result as CoreResult, StepIdError};
use crate::model::validate_model;
use crate::types::{AlignedVelocitySample, Phase, ResponseModel, Sample, VelocitySample};
use crate::velocity::estimate_velocity;

/// Contiguous stretch of the velocity trace recorded in one phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseSpan {
    pub phase: Phase,
    /// Device time of the first sample in the span.
    pub start: i64,
    /// Device time of the last sample in the span.
    pub end: i64,
}

/// Group consecutive velocity samples of the same phase into spans.
pub fn phase_spans(velocities: &[VelocitySample]) -> Vec<PhaseSpan> {
    let mut spans: Vec<PhaseSpan> = Vec::with_capacity(Phase::ALL.len());
    for v in velocities {
        match spans.last_mut() {
            Some(span) if span.phase == v.phase => span.end = v.time,
            _ => spans.push(PhaseSpan {
                phase: v.phase,
                start: v.time,
                end: v.time,
            }),
        }
    }
    spans
}

/// Everything identified from one experiment.
#[derive(Debug, Clone, PartialEq)]
pub struct StepResponseReport {
    pub samples_captured: usize,
    /// Device time of the onset of motion.
    pub alignment_time: i64,
    pub model: ResponseModel,
    /// Measured velocity after the onset, time re-based to the onset.
    pub aligned: Vec<AlignedVelocitySample>,
    /// Model velocity at each aligned time.
    pub theoretical: Vec<f64>,
    pub rms_error: f64,
    /// Phase spans in device time (before alignment).
    pub phases: Vec<PhaseSpan>,
}

/// Velocity, onset alignment, characterization and model comparison over a
/// complete capture.
pub fn analyze(samples: &[Sample], cfg: &AnalysisCfg) -> Result<StepResponseReport, StepIdError> {
    let velocities = estimate_velocity(samples)?;
    let phases = phase_spans(&velocities);
    let alignment = align(&velocities, cfg.onset_threshold)?;
    let model = Characterizer::from(cfg).characterize(&alignment.samples)?;
    let fit = validate_model(&model, &alignment.samples)?;
    tracing::info!(
        steady_state_velocity = model.steady_state_velocity,
        time_constant = model.time_constant,
        rms_error = fit.rms_error,
        "model identified"
    );
    Ok(StepResponseReport {
        samples_captured: samples.len(),
        alignment_time: alignment.alignment_time,
        model,
        aligned: alignment.samples,
        theoretical: fit.theoretical,
        rms_error: fit.rms_error,
        phases,
    })
}

/// Parameters for one capture-and-identify run.
#[derive(Clone, Default)]
pub struct RunParams {
    pub experiment: ExperimentCfg,
    pub safety: SafetyCfg,
    pub timeouts: Timeouts,
    pub analysis: AnalysisCfg,
    pub cancel: Option<Arc<AtomicBool>>,
}

/// Run the step experiment on `channel`, then analyze the capture.
pub fn run<C: LineChannel>(channel: C, params: RunParams) -> CoreResult<StepResponseReport> {
    run_with_clock(channel, params, MonotonicClock::new())
}

/// As [`run`], with an explicit clock for the wall-time bounds.
pub fn run_with_clock<C, K>(channel: C, params: RunParams, clock: K) -> CoreResult<StepResponseReport>
where
    C: LineChannel,
    K: Clock + Send + Sync + 'static,
{
    let RunParams {
        experiment,
        safety,
        timeouts,
        analysis,
        cancel,
    } = params;
    let mut builder = StepExperiment::builder()
        .with_channel(channel)
        .with_experiment(experiment)
        .with_safety(safety)
        .with_timeouts(timeouts)
        .with_clock(clock);
    if let Some(flag) = cancel {
        builder = builder.with_cancel_flag(flag);
    }
    let mut experiment = builder.build()?;
    let samples = experiment.run()?;
    Ok(analyze(&samples, &analysis)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(time: i64, phase: Phase) -> VelocitySample {
        VelocitySample {
            time,
            phase,
            velocity: 0.0,
        }
    }

    #[test]
    fn spans_follow_phase_changes() {
        let trace = [
            v(0, Phase::Idle),
            v(10, Phase::Idle),
            v(20, Phase::Step),
            v(30, Phase::Step),
            v(40, Phase::Settle),
        ];
        assert_eq!(
            phase_spans(&trace),
            vec![
                PhaseSpan {
                    phase: Phase::Idle,
                    start: 0,
                    end: 10
                },
                PhaseSpan {
                    phase: Phase::Step,
                    start: 20,
                    end: 30
                },
                PhaseSpan {
                    phase: Phase::Settle,
                    start: 40,
                    end: 40
                },
            ]
        );
    }

    #[test]
    fn no_samples_no_spans() {
        assert!(phase_spans(&[]).is_empty());
    }
}
