//! Command lines written to the motion platform.
use std::fmt;

use crate::config::MotorSide;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `time report on|off`
    TimeReport(bool),
    /// `motor <side> report on|off`
    MotorReport(MotorSide, bool),
    /// `motor <side> set <value>`
    MotorSet(MotorSide, i32),
}

fn on_off(on: bool) -> &'static str {
    if on { "on" } else { "off" }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::TimeReport(on) => write!(f, "time report {}", on_off(*on)),
            Command::MotorReport(side, on) => {
                write!(f, "motor {} report {}", side.name(), on_off(*on))
            }
            Command::MotorSet(side, value) => write!(f, "motor {} set {value}", side.name()),
        }
    }
}

/// Commands that start streaming for one motor.
pub fn enable_reporting(side: MotorSide) -> [Command; 2] {
    [Command::TimeReport(true), Command::MotorReport(side, true)]
}

/// Commands that stop streaming for one motor, in reverse order of enabling.
pub fn disable_reporting(side: MotorSide) -> [Command; 2] {
    [Command::MotorReport(side, false), Command::TimeReport(false)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_wire_text() {
        assert_eq!(Command::TimeReport(true).to_string(), "time report on");
        assert_eq!(
            Command::MotorReport(MotorSide::Left, false).to_string(),
            "motor left report off"
        );
        assert_eq!(
            Command::MotorSet(MotorSide::Right, 10_000).to_string(),
            "motor right set 10000"
        );
        assert_eq!(
            Command::MotorSet(MotorSide::Left, -50).to_string(),
            "motor left set -50"
        );
    }
}
