//! Phase state machine of the step experiment.
//!
//! IDLE -> STEP -> SETTLE -> DONE, each transition taken once when the time
//! elapsed since the current phase anchor exceeds that phase's duration.
//! The transition function is pure; the driver feeds it device times and
//! writes the commands of the returned action.

use crate::command::{Command, disable_reporting};
use crate::config::MotorSide;
use crate::types::Phase;

/// Phase lengths in device clock ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseDurations {
    pub before_time: i64,
    pub step_time: i64,
    pub after_time: i64,
}

impl Default for PhaseDurations {
    fn default() -> Self {
        Self {
            before_time: 100,
            step_time: 500,
            after_time: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseState {
    Running(Phase),
    Done,
}

/// Side effect attached to a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Command the step target (IDLE -> STEP).
    ApplyStep,
    /// Command zero (STEP -> SETTLE).
    ReleaseStep,
    /// Turn reporting off (SETTLE -> DONE).
    StopReporting,
}

impl Action {
    /// Wire commands for this action, in write order.
    pub fn commands(self, side: MotorSide, step_target: i32) -> [Option<Command>; 2] {
        match self {
            Action::ApplyStep => [Some(Command::MotorSet(side, step_target)), None],
            Action::ReleaseStep => [Some(Command::MotorSet(side, 0)), None],
            Action::StopReporting => disable_reporting(side).map(Some),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: PhaseState,
    pub action: Option<Action>,
}

impl Transition {
    const fn stay(state: PhaseState) -> Self {
        Self {
            next: state,
            action: None,
        }
    }
}

impl PhaseState {
    pub const INITIAL: PhaseState = PhaseState::Running(Phase::Idle);

    pub fn phase(self) -> Option<Phase> {
        match self {
            PhaseState::Running(p) => Some(p),
            PhaseState::Done => None,
        }
    }

    pub fn is_done(self) -> bool {
        matches!(self, PhaseState::Done)
    }

    /// Decide the next state given ticks elapsed since the phase anchor.
    ///
    /// A transition resets the anchor; the caller does that when `action`
    /// is `Some`.
    pub fn advance(self, elapsed: i64, d: &PhaseDurations) -> Transition {
        let (limit, next, action) = match self {
            PhaseState::Running(Phase::Idle) => (
                d.before_time,
                PhaseState::Running(Phase::Step),
                Action::ApplyStep,
            ),
            PhaseState::Running(Phase::Step) => (
                d.step_time,
                PhaseState::Running(Phase::Settle),
                Action::ReleaseStep,
            ),
            PhaseState::Running(Phase::Settle) => {
                (d.after_time, PhaseState::Done, Action::StopReporting)
            }
            PhaseState::Done => return Transition::stay(self),
        };
        if elapsed > limit {
            Transition {
                next,
                action: Some(action),
            }
        } else {
            Transition::stay(self)
        }
    }
}
