//! `From` implementations bridging `stepid_config` types to `stepid_core` types.

use crate::config::{AnalysisCfg, ExperimentCfg, MotorSide, SafetyCfg, Timeouts};
use crate::phase::PhaseDurations;

// ── MotorSide ────────────────────────────────────────────────────────────────

impl From<stepid_config::MotorSide> for MotorSide {
    fn from(c: stepid_config::MotorSide) -> Self {
        match c {
            stepid_config::MotorSide::Left => MotorSide::Left,
            stepid_config::MotorSide::Right => MotorSide::Right,
        }
    }
}

// ── ExperimentCfg ────────────────────────────────────────────────────────────

impl From<&stepid_config::Experiment> for ExperimentCfg {
    fn from(c: &stepid_config::Experiment) -> Self {
        Self {
            motor: c.motor.into(),
            durations: PhaseDurations {
                before_time: c.before_time,
                step_time: c.step_time,
                after_time: c.after_time,
            },
            step_target: c.step_target,
        }
    }
}

// ── AnalysisCfg ──────────────────────────────────────────────────────────────

impl From<&stepid_config::Analysis> for AnalysisCfg {
    fn from(c: &stepid_config::Analysis) -> Self {
        Self {
            window: c.window,
            onset_threshold: c.onset_threshold,
            crossing_fraction: c.crossing_fraction,
        }
    }
}

// ── SafetyCfg ────────────────────────────────────────────────────────────────

impl From<&stepid_config::Safety> for SafetyCfg {
    fn from(c: &stepid_config::Safety) -> Self {
        Self {
            max_silent_ms: c.max_silent_ms,
            max_capture_ms: c.max_capture_ms,
            max_lines: c.max_lines,
        }
    }
}

// ── Timeouts ─────────────────────────────────────────────────────────────────

impl From<&stepid_config::Link> for Timeouts {
    fn from(c: &stepid_config::Link) -> Self {
        Self {
            read_ms: c.read_timeout_ms,
        }
    }
}
