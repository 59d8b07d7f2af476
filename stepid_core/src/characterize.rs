//! Steady-state and time-constant estimation on the aligned trace.

use crate::align::rising_edge_time;
use crate::config::AnalysisCfg;
use crate::error::StepIdError;
use crate::types::{AlignedVelocitySample, ResponseModel};

/// Mean velocity of samples with `last.time - time <= window`.
///
/// The distance is taken in `i128`, so extreme device times never wrap.
/// The mean is accumulated as offsets from the last sample so a constant
/// tail averages to exactly that constant.
pub fn steady_state_velocity(
    aligned: &[AlignedVelocitySample],
    window: i64,
) -> Result<f64, StepIdError> {
    let last = aligned.last().ok_or(StepIdError::EmptyWindow { window })?;
    let (sum, n) = aligned
        .iter()
        .filter(|s| i128::from(last.time) - i128::from(s.time) <= i128::from(window))
        .fold((0.0f64, 0usize), |(sum, n), s| {
            (sum + (s.velocity - last.velocity), n + 1)
        });
    if n == 0 {
        return Err(StepIdError::EmptyWindow { window });
    }
    Ok(last.velocity + sum / n as f64)
}

/// Time at which the aligned trace first rises through
/// `fraction * steady_state`.
pub fn time_constant(
    aligned: &[AlignedVelocitySample],
    steady_state: f64,
    fraction: f64,
) -> Result<f64, StepIdError> {
    rising_edge_time(aligned, fraction * steady_state).map(|t| t as f64)
}

/// Estimates the first-order model of an aligned step response.
#[derive(Debug, Clone)]
pub struct Characterizer {
    window: i64,
    crossing_fraction: f64,
}

impl Default for Characterizer {
    fn default() -> Self {
        Self::from(&AnalysisCfg::default())
    }
}

impl From<&AnalysisCfg> for Characterizer {
    fn from(cfg: &AnalysisCfg) -> Self {
        Self {
            window: cfg.window,
            crossing_fraction: cfg.crossing_fraction,
        }
    }
}

impl Characterizer {
    pub fn new(window: i64, crossing_fraction: f64) -> Self {
        Self {
            window,
            crossing_fraction,
        }
    }

    pub fn characterize(
        &self,
        aligned: &[AlignedVelocitySample],
    ) -> Result<ResponseModel, StepIdError> {
        let steady_state_velocity = steady_state_velocity(aligned, self.window)?;
        let time_constant = time_constant(aligned, steady_state_velocity, self.crossing_fraction)?;
        tracing::debug!(
            steady_state_velocity,
            time_constant,
            window = self.window,
            "response characterized"
        );
        Ok(ResponseModel {
            steady_state_velocity,
            time_constant,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aligned(points: &[(i64, f64)]) -> Vec<AlignedVelocitySample> {
        points
            .iter()
            .map(|&(time, velocity)| AlignedVelocitySample { time, velocity })
            .collect()
    }

    #[test]
    fn window_is_inclusive() {
        let a = aligned(&[(0, 10.0), (10, 10.0), (20, 0.0)]);
        assert_eq!(steady_state_velocity(&a, 10).unwrap(), 5.0);
        assert_eq!(steady_state_velocity(&a, 9).unwrap(), 0.0);
        assert_eq!(steady_state_velocity(&a, 20).unwrap(), 20.0 / 3.0);
    }

    #[test]
    fn empty_trace_has_empty_window() {
        assert_eq!(
            steady_state_velocity(&[], 200),
            Err(StepIdError::EmptyWindow { window: 200 })
        );
    }

    #[test]
    fn negative_window_is_empty() {
        let a = aligned(&[(0, 1.0), (10, 2.0)]);
        assert_eq!(
            steady_state_velocity(&a, -1),
            Err(StepIdError::EmptyWindow { window: -1 })
        );
    }

    #[test]
    fn extreme_times_stay_out_of_the_window() {
        let a = aligned(&[(i64::MIN, 100.0), (i64::MAX, 2.0)]);
        assert_eq!(steady_state_velocity(&a, 10).unwrap(), 2.0);
    }

    #[test]
    fn time_constant_uses_crossing_of_fraction() {
        let a = aligned(&[(0, 0.0), (10, 5.0), (20, 7.0), (30, 10.0), (40, 10.0)]);
        // 0.632 * 10 = 6.32: crossed between t=10 (5.0) and t=20 (7.0).
        assert_eq!(time_constant(&a, 10.0, 0.632).unwrap(), 10.0);
    }

    #[test]
    fn characterizer_is_pure() {
        let a = aligned(&[(0, 0.0), (10, 4.0), (20, 8.0), (30, 10.0), (40, 10.0)]);
        let c = Characterizer::new(10, 0.632);
        assert_eq!(c.characterize(&a).unwrap(), c.characterize(&a).unwrap());
    }
}
