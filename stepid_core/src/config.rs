//! Runtime configuration for the capture driver and the analysis stages.
//!
//! These are separate from the TOML-deserialized config in `stepid_config`;
//! see `conversions` for the mapping.

use crate::phase::PhaseDurations;

/// Which motor the experiment drives. Selects the command prefix and the
/// telemetry field carrying its encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotorSide {
    #[default]
    Left,
    Right,
}

impl MotorSide {
    pub fn name(self) -> &'static str {
        match self {
            MotorSide::Left => "left",
            MotorSide::Right => "right",
        }
    }

    /// Telemetry key of this motor's encoder position.
    pub fn telemetry_field(self) -> &'static str {
        match self {
            MotorSide::Left => "LM",
            MotorSide::Right => "RM",
        }
    }
}

/// What the step experiment commands and for how long.
#[derive(Debug, Clone)]
pub struct ExperimentCfg {
    pub motor: MotorSide,
    pub durations: PhaseDurations,
    /// Value written with `motor <side> set` at the start of the step.
    pub step_target: i32,
}

impl Default for ExperimentCfg {
    fn default() -> Self {
        Self {
            motor: MotorSide::Left,
            durations: PhaseDurations::default(),
            step_target: 10_000,
        }
    }
}

/// Parameters of onset detection and response characterization.
#[derive(Debug, Clone)]
pub struct AnalysisCfg {
    /// Trailing window (device ticks) averaged for the steady state.
    pub window: i64,
    /// Rising-edge threshold marking the onset of motion.
    pub onset_threshold: f64,
    /// Fraction of steady state whose crossing time is the time constant.
    pub crossing_fraction: f64,
}

impl Default for AnalysisCfg {
    fn default() -> Self {
        Self {
            window: 200,
            onset_threshold: 0.0,
            crossing_fraction: 0.632,
        }
    }
}

/// Bounds that stop a capture on a hung or runaway link.
#[derive(Debug, Clone)]
pub struct SafetyCfg {
    /// Abort when no decodable line arrived for this many ms.
    pub max_silent_ms: u64,
    /// Hard cap on capture wall time in ms. 0 disables.
    pub max_capture_ms: u64,
    /// Hard cap on lines read. 0 disables.
    pub max_lines: u64,
}

impl Default for SafetyCfg {
    fn default() -> Self {
        Self {
            max_silent_ms: 5_000,
            max_capture_ms: 0,
            max_lines: 0,
        }
    }
}

/// Timeouts.
#[derive(Debug, Clone)]
pub struct Timeouts {
    /// Max wait per line read (ms)
    pub read_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { read_ms: 1_000 }
    }
}
