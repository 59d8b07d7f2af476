#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Step-response system identification (hardware-agnostic).
//!
//! All link interactions go through `stepid_traits::LineChannel`.
//!
//! ## Pipeline
//!
//! - **Telemetry**: `KEY:VALUE,...` record decoding (`telemetry` module)
//! - **Capture**: IDLE -> STEP -> SETTLE experiment driver (`driver`, `phase`)
//! - **Velocity**: adjacent differencing of encoder samples (`velocity`)
//! - **Alignment**: onset detection by rising-edge crossing (`align`)
//! - **Characterization**: trailing-window steady state and 63.2% crossing
//!   time (`characterize`)
//! - **Validation**: first-order step response at the measured times (`model`)
//!
//! Capture is a blocking loop on one thread; every later stage is a pure
//! function over the complete capture.

pub mod align;
pub mod builder;
pub mod characterize;
pub mod command;
pub mod config;
pub mod conversions;
pub mod driver;
pub mod error;
pub mod hw_error;
pub mod mocks;
pub mod model;
pub mod phase;
pub mod runner;
pub mod status;
pub mod telemetry;
pub mod types;
pub mod velocity;

pub use align::{Alignment, align, rising_edge_time};
pub use builder::StepExperimentBuilder;
pub use characterize::{Characterizer, steady_state_velocity, time_constant};
pub use command::Command;
pub use config::{AnalysisCfg, ExperimentCfg, MotorSide, SafetyCfg, Timeouts};
pub use driver::StepExperiment;
pub use error::{BuildError, DataError, StepIdError};
pub use model::{FirstOrderModel, ModelFit, validate_model};
pub use phase::{Action, PhaseDurations, PhaseState, Transition};
pub use runner::{PhaseSpan, RunParams, StepResponseReport, analyze, phase_spans, run};
pub use status::CaptureStatus;
pub use telemetry::{Reading, TelemetryDecoder};
pub use types::{AlignedVelocitySample, Phase, ResponseModel, Sample, VelocityPoint, VelocitySample};
pub use velocity::estimate_velocity;
