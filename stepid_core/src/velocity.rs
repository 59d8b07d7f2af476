//! Position samples to velocity samples by adjacent differencing.

use crate::error::{DataError, StepIdError};
use crate::types::{Sample, VelocitySample};

/// One velocity per adjacent pair: `Δposition / Δtime`, stamped with the
/// earlier sample's time and phase. No smoothing.
///
/// A pair whose time does not strictly increase, or whose time or position
/// difference does not fit in an `i64`, is a `DataError`. Fewer than two
/// samples yield an empty sequence.
pub fn estimate_velocity(samples: &[Sample]) -> Result<Vec<VelocitySample>, StepIdError> {
    samples
        .windows(2)
        .enumerate()
        .map(|(i, pair)| {
            let (a, b) = (pair[0], pair[1]);
            let dt = b.time.checked_sub(a.time).ok_or(DataError::TimeOverflow {
                index: i + 1,
                prev: a.time,
                next: b.time,
            })?;
            if dt <= 0 {
                return Err(DataError::NonIncreasingTime {
                    index: i + 1,
                    prev: a.time,
                    next: b.time,
                }
                .into());
            }
            let dp = b
                .position
                .checked_sub(a.position)
                .ok_or(DataError::PositionOverflow {
                    index: i + 1,
                    prev: a.position,
                    next: b.position,
                })?;
            Ok(VelocitySample {
                time: a.time,
                phase: a.phase,
                velocity: dp as f64 / dt as f64,
            })
        })
        .collect()
}
