//! Theoretical first-order step response for comparison with measurements.
//!
//! `K / (τ s + 1)` driven by a unit step at t = 0 responds with
//! `K (1 - e^(-t/τ))` for t >= 0 and 0 before.

use crate::error::StepIdError;
use crate::types::{AlignedVelocitySample, ResponseModel};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FirstOrderModel {
    gain: f64,
    time_constant: f64,
}

impl FirstOrderModel {
    pub fn new(gain: f64, time_constant: f64) -> Result<Self, StepIdError> {
        if !gain.is_finite() {
            return Err(StepIdError::InvalidModel(format!("gain {gain} is not finite")));
        }
        if !(time_constant.is_finite() && time_constant > 0.0) {
            return Err(StepIdError::InvalidModel(format!(
                "time constant {time_constant} must be finite and > 0"
            )));
        }
        Ok(Self {
            gain,
            time_constant,
        })
    }

    pub fn gain(&self) -> f64 {
        self.gain
    }

    pub fn time_constant(&self) -> f64 {
        self.time_constant
    }

    #[inline]
    pub fn response_at(&self, t: f64) -> f64 {
        if t < 0.0 {
            0.0
        } else {
            self.gain * (1.0 - (-t / self.time_constant).exp())
        }
    }

    /// Step response evaluated at each time point.
    pub fn step_response(&self, times: &[i64]) -> Vec<f64> {
        times.iter().map(|&t| self.response_at(t as f64)).collect()
    }
}

impl TryFrom<&ResponseModel> for FirstOrderModel {
    type Error = StepIdError;
    fn try_from(m: &ResponseModel) -> Result<Self, Self::Error> {
        Self::new(m.steady_state_velocity, m.time_constant)
    }
}

/// Theoretical trace next to the measured one.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelFit {
    /// Model velocity at each aligned sample time.
    pub theoretical: Vec<f64>,
    /// Root-mean-square of measured minus theoretical velocity.
    pub rms_error: f64,
}

/// Evaluate the identified model at the measured time points.
pub fn validate_model(
    model: &ResponseModel,
    aligned: &[AlignedVelocitySample],
) -> Result<ModelFit, StepIdError> {
    let first_order = FirstOrderModel::try_from(model)?;
    let times: Vec<i64> = aligned.iter().map(|s| s.time).collect();
    let theoretical = first_order.step_response(&times);
    let rms_error = if aligned.is_empty() {
        0.0
    } else {
        let sq: f64 = aligned
            .iter()
            .zip(&theoretical)
            .map(|(s, y)| (s.velocity - y).powi(2))
            .sum();
        (sq / aligned.len() as f64).sqrt()
    };
    Ok(ModelFit {
        theoretical,
        rms_error,
    })
}
