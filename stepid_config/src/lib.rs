#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the step-response identification tool.
//!
//! `Config` and its sections are deserialized from TOML and validated with
//! `Config::validate`. Every section except `[link]` has defaults matching
//! the reference bench experiment (100 / 500 / 0 ticks, 200 tick window).
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Link {
    /// Serial device node, e.g. "/dev/ttyUSB0"
    pub device: String,
    /// Per-read timeout (ms)
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

fn default_read_timeout_ms() -> u64 {
    1000
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MotorSide {
    #[default]
    Left,
    Right,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Experiment {
    pub motor: MotorSide,
    /// Idle phase length in device clock ticks
    pub before_time: i64,
    /// Step phase length in device clock ticks
    pub step_time: i64,
    /// Settle phase length in device clock ticks
    pub after_time: i64,
    /// Value written with `motor <side> set` when the step starts
    pub step_target: i32,
}

impl Default for Experiment {
    fn default() -> Self {
        Self {
            motor: MotorSide::Left,
            before_time: 100,
            step_time: 500,
            after_time: 0,
            step_target: 10_000,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Analysis {
    /// Trailing window for the steady-state average, device clock ticks
    pub window: i64,
    /// Rising-edge threshold used to find the onset of motion
    pub onset_threshold: f64,
    /// Fraction of steady state whose crossing defines the time constant
    pub crossing_fraction: f64,
}

impl Default for Analysis {
    fn default() -> Self {
        Self {
            window: 200,
            onset_threshold: 0.0,
            crossing_fraction: 0.632,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Safety {
    /// Abort when no decodable line arrived for this long (ms)
    pub max_silent_ms: u64,
    /// Hard cap on the whole capture (ms, 0 disables)
    pub max_capture_ms: u64,
    /// Hard cap on lines read (0 disables)
    pub max_lines: u64,
}

impl Default for Safety {
    fn default() -> Self {
        Self {
            max_silent_ms: 5_000,
            max_capture_ms: 0,
            max_lines: 0,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Sim {
    /// Steady-state velocity per unit of motor command
    pub gain: f64,
    /// Time constant in device clock ticks
    pub time_constant: f64,
    /// Device clock ticks between telemetry records
    pub tick: u32,
    /// Garble every n-th record (0 disables)
    pub noise_every: u64,
}

impl Default for Sim {
    fn default() -> Self {
        Self {
            gain: 0.0002,
            time_constant: 50.0,
            tick: 10,
            noise_every: 0,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub link: Link,
    #[serde(default)]
    pub experiment: Experiment,
    #[serde(default)]
    pub analysis: Analysis,
    #[serde(default)]
    pub safety: Safety,
    #[serde(default)]
    pub logging: Logging,
    /// Simulated link parameters (used with `--sim` and self-check)
    #[serde(default)]
    pub sim: Sim,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Link
        if self.link.device.trim().is_empty() {
            eyre::bail!("link.device must not be empty");
        }
        if self.link.read_timeout_ms == 0 {
            eyre::bail!("link.read_timeout_ms must be >= 1");
        }

        // Experiment
        self.experiment.validate()?;

        // Analysis
        self.analysis.validate()?;

        // Safety
        if self.safety.max_silent_ms == 0 {
            eyre::bail!("safety.max_silent_ms must be >= 1");
        }
        if self.safety.max_silent_ms < self.link.read_timeout_ms {
            eyre::bail!("safety.max_silent_ms must be >= link.read_timeout_ms");
        }

        // Logging
        if let Some(rotation) = self.logging.rotation.as_deref()
            && !matches!(rotation, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        // Sim
        if !(self.sim.gain.is_finite() && self.sim.gain > 0.0) {
            eyre::bail!("sim.gain must be > 0");
        }
        if !(self.sim.time_constant.is_finite() && self.sim.time_constant > 0.0) {
            eyre::bail!("sim.time_constant must be > 0");
        }
        if self.sim.tick == 0 {
            eyre::bail!("sim.tick must be >= 1");
        }
        if self.sim.noise_every == 1 {
            eyre::bail!("sim.noise_every must be 0 (off) or >= 2");
        }

        Ok(())
    }
}

impl Experiment {
    pub fn validate(&self) -> eyre::Result<()> {
        if self.before_time < 0 {
            eyre::bail!("experiment.before_time must be >= 0");
        }
        if self.step_time < 0 {
            eyre::bail!("experiment.step_time must be >= 0");
        }
        if self.after_time < 0 {
            eyre::bail!("experiment.after_time must be >= 0");
        }
        if self.step_target == 0 {
            eyre::bail!("experiment.step_target must be non-zero");
        }
        Ok(())
    }
}

impl Analysis {
    pub fn validate(&self) -> eyre::Result<()> {
        if self.window < 0 {
            eyre::bail!("analysis.window must be >= 0");
        }
        if !self.onset_threshold.is_finite() {
            eyre::bail!("analysis.onset_threshold must be finite");
        }
        if !(self.crossing_fraction > 0.0 && self.crossing_fraction < 1.0) {
            eyre::bail!("analysis.crossing_fraction must be in (0.0, 1.0)");
        }
        Ok(())
    }
}
