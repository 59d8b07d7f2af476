//! Sample records flowing through the pipeline.

/// Stage of the step experiment a sample was recorded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    /// Before the step command; motor at rest.
    Idle = 0,
    /// Step command active.
    Step = 1,
    /// Step released; motor coasting down.
    Settle = 2,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Idle, Phase::Step, Phase::Settle];

    pub fn name(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Step => "step",
            Phase::Settle => "settle",
        }
    }
}

/// One accepted telemetry record: device time, encoder position, phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub time: i64,
    pub position: i64,
    pub phase: Phase,
}

/// Finite difference of two adjacent samples, stamped with the earlier one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocitySample {
    pub time: i64,
    pub phase: Phase,
    pub velocity: f64,
}

/// Velocity sample re-based so that the onset of motion is at time 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignedVelocitySample {
    pub time: i64,
    pub velocity: f64,
}

/// First-order model parameters identified from one experiment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResponseModel {
    /// Encoder ticks per device clock tick.
    pub steady_state_velocity: f64,
    /// Device clock ticks to reach the crossing fraction of steady state.
    pub time_constant: f64,
}

/// A point of a velocity trace, so edge detection works on both the raw
/// and the aligned sequence.
pub trait VelocityPoint {
    fn time(&self) -> i64;
    fn velocity(&self) -> f64;
}

impl VelocityPoint for VelocitySample {
    #[inline]
    fn time(&self) -> i64 {
        self.time
    }
    #[inline]
    fn velocity(&self) -> f64 {
        self.velocity
    }
}

impl VelocityPoint for AlignedVelocitySample {
    #[inline]
    fn time(&self) -> i64 {
        self.time
    }
    #[inline]
    fn velocity(&self) -> f64 {
        self.velocity
    }
}
