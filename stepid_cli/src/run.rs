//! Link assembly, config mapping, and experiment execution.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use eyre::WrapErr;
use serde_json::json;
use stepid_core::error::Result as CoreResult;
use stepid_core::mocks::ScriptedChannel;
use stepid_core::{
    AnalysisCfg, ExperimentCfg, PhaseDurations, RunParams, SafetyCfg, StepIdError,
    StepResponseReport, Timeouts,
};
use stepid_hardware::{SimMotorParams, SimulatedMotorLink};

/// Set to run the simulated link without any telemetry (timeout tests).
const SIM_SILENT_ENV: &str = "STEPID_TEST_SIM_SILENT";

pub fn reason_name(e: &StepIdError) -> &'static str {
    match e {
        StepIdError::Data(_) => "Data",
        StepIdError::CrossingNotFound { .. } => "CrossingNotFound",
        StepIdError::EmptyWindow { .. } => "EmptyWindow",
        StepIdError::Channel(_) => "Channel",
        StepIdError::Timeout => "Timeout",
        StepIdError::Cancelled => "Cancelled",
        StepIdError::CaptureLimit(_) => "CaptureLimit",
        StepIdError::InvalidModel(_) => "InvalidModel",
    }
}

/// Map the typed config onto the core run parameters.
fn run_params(cfg: &stepid_config::Config, shutdown: Arc<AtomicBool>) -> RunParams {
    RunParams {
        experiment: ExperimentCfg::from(&cfg.experiment),
        safety: SafetyCfg::from(&cfg.safety),
        timeouts: Timeouts::from(&cfg.link),
        analysis: AnalysisCfg::from(&cfg.analysis),
        cancel: Some(shutdown),
    }
}

fn sim_link(sim: &stepid_config::Sim) -> SimulatedMotorLink {
    let params = SimMotorParams {
        gain: sim.gain,
        time_constant: sim.time_constant,
        tick: sim.tick,
        ..SimMotorParams::default()
    };
    let mut link = SimulatedMotorLink::new(params).with_noise_every(sim.noise_every);
    if std::env::var_os(SIM_SILENT_ENV).is_some() {
        tracing::warn!("simulated link is silent");
        link = link.silent();
    }
    link
}

/// Step experiment on the serial device, or on the simulator with `sim`.
pub fn run_step(
    cfg: &stepid_config::Config,
    sim: bool,
    shutdown: Arc<AtomicBool>,
) -> CoreResult<StepResponseReport> {
    let params = run_params(cfg, shutdown);
    if sim {
        tracing::info!(backend = "sim", motor = params.experiment.motor.name(), "link ready");
        return stepid_core::run(sim_link(&cfg.sim), params);
    }
    let path = Path::new(&cfg.link.device);
    let link = stepid_hardware::open_serial(path)
        .wrap_err_with(|| format!("open serial device {}", path.display()))?;
    tracing::info!(
        backend = "serial",
        device = %path.display(),
        motor = params.experiment.motor.name(),
        "link ready"
    );
    stepid_core::run(link, params)
}

/// Identify from a recorded transcript. Commands are logged, not sent.
pub fn run_replay(
    cfg: &stepid_config::Config,
    transcript: &Path,
    shutdown: Arc<AtomicBool>,
) -> CoreResult<StepResponseReport> {
    let text = std::fs::read_to_string(transcript)
        .wrap_err_with(|| format!("read transcript {}", transcript.display()))?;
    let channel = ScriptedChannel::new(text.lines());
    tracing::info!(
        transcript = %transcript.display(),
        lines = channel.remaining(),
        "replaying transcript"
    );
    stepid_core::run(channel, run_params(cfg, shutdown))
}

/// Short simulated experiment through the whole pipeline.
pub fn run_self_check(
    cfg: &stepid_config::Config,
    shutdown: Arc<AtomicBool>,
) -> CoreResult<StepResponseReport> {
    let mut params = run_params(cfg, shutdown);
    params.experiment.durations = PhaseDurations {
        before_time: 50,
        step_time: 300,
        after_time: 0,
    };
    let report = stepid_core::run(sim_link(&cfg.sim), params)?;
    let ss = report.model.steady_state_velocity;
    if !(ss.is_finite() && ss > 0.0) {
        eyre::bail!("self-check: implausible steady-state velocity {ss}");
    }
    Ok(report)
}

/// One JSON line describing a finished identification.
pub fn report_json(command: &str, report: &StepResponseReport, duration_ms: u64) -> String {
    let phases: Vec<_> = report
        .phases
        .iter()
        .map(|s| json!({ "phase": s.phase.name(), "start": s.start, "end": s.end }))
        .collect();
    json!({
        "timestamp": timestamp_ms(),
        "command": command,
        "duration_ms": duration_ms,
        "samples_captured": report.samples_captured,
        "alignment_time": report.alignment_time,
        "steady_state_velocity": report.model.steady_state_velocity,
        "time_constant": report.model.time_constant,
        "rms_error": report.rms_error,
        "phases": phases,
        "abort_reason": null,
    })
    .to_string()
}

pub fn timestamp_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
