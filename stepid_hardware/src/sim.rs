//! Simulated motion platform speaking the telemetry line protocol.
//!
//! Each motor is modelled as a first-order system: commanding `set u` drives
//! the velocity towards `gain * u` with time constant `time_constant`. Every
//! read advances the device clock by `tick` and emits one record such as
//! `T:1010,LM:42` containing whichever fields currently have reporting on.
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use stepid_traits::{Clock, LineChannel, MonotonicClock};

use crate::error::{HwError, Result};
use crate::util::split_words;

#[derive(Debug, Clone)]
pub struct SimMotorParams {
    /// Steady-state velocity (encoder ticks per clock tick) per unit of command.
    pub gain: f64,
    /// Time constant in device clock ticks.
    pub time_constant: f64,
    /// Device clock ticks between consecutive telemetry records.
    pub tick: u32,
    /// Device clock value before the first record.
    pub start_time: i64,
}

impl Default for SimMotorParams {
    fn default() -> Self {
        Self {
            gain: 0.0002,
            time_constant: 50.0,
            tick: 10,
            start_time: 1_000,
        }
    }
}

#[derive(Debug, Default, Clone)]
struct SimMotor {
    command: i32,
    velocity: f64,
    position: f64,
    report: bool,
}

impl SimMotor {
    /// Exact discretisation of v' = (gain*u - v) / tau over `dt`.
    fn advance(&mut self, dt: f64, gain: f64, tau: f64) {
        let target = gain * f64::from(self.command);
        let decay = (-dt / tau).exp();
        let dv = self.velocity - target;
        self.position += target * dt + dv * tau * (1.0 - decay);
        self.velocity = target + dv * decay;
    }

    fn encoder(&self) -> i64 {
        self.position.round() as i64
    }
}

pub struct SimulatedMotorLink {
    params: SimMotorParams,
    time: i64,
    time_report: bool,
    left: SimMotor,
    right: SimMotor,
    written: Vec<String>,
    emitted: u64,
    noise_every: Option<u64>,
    silent: bool,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl SimulatedMotorLink {
    pub fn new(params: SimMotorParams) -> Self {
        Self {
            time: params.start_time,
            params,
            time_report: false,
            left: SimMotor::default(),
            right: SimMotor::default(),
            written: Vec::new(),
            emitted: 0,
            noise_every: None,
            silent: false,
            clock: Arc::new(MonotonicClock::new()),
        }
    }

    /// Replace every `n`-th record with a garbled line (n >= 2).
    pub fn with_noise_every(mut self, n: u64) -> Self {
        self.noise_every = (n >= 2).then_some(n);
        self
    }

    /// Never produce any line; every read times out.
    pub fn silent(mut self) -> Self {
        self.silent = true;
        self
    }

    /// Clock used to account for read timeouts when nothing is streamed.
    pub fn with_clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.clock = clock;
        self
    }

    /// Every command line received so far, in order.
    pub fn commands(&self) -> &[String] {
        &self.written
    }

    /// Current device clock value.
    pub fn device_time(&self) -> i64 {
        self.time
    }

    fn streaming(&self) -> bool {
        !self.silent && (self.time_report || self.left.report || self.right.report)
    }

    fn motor_mut(&mut self, side: &str) -> Option<&mut SimMotor> {
        match side {
            "left" => Some(&mut self.left),
            "right" => Some(&mut self.right),
            _ => None,
        }
    }

    fn apply(&mut self, line: &str) -> Result<()> {
        let unknown = || HwError::UnknownCommand(line.to_string());
        let (words, n) = split_words::<4>(line).ok_or_else(unknown)?;
        match &words[..n] {
            ["time", "report", flag] => self.time_report = parse_flag(flag).ok_or_else(unknown)?,
            ["motor", side, "report", flag] => {
                let on = parse_flag(flag).ok_or_else(unknown)?;
                self.motor_mut(side).ok_or_else(unknown)?.report = on;
            }
            ["motor", side, "set", value] => {
                let cmd = value.parse::<i32>().map_err(|_| unknown())?;
                self.motor_mut(side).ok_or_else(unknown)?.command = cmd;
            }
            _ => return Err(unknown()),
        }
        Ok(())
    }

    fn emit(&mut self, buf: &mut String) {
        let dt = f64::from(self.params.tick);
        let (gain, tau) = (self.params.gain, self.params.time_constant);
        self.left.advance(dt, gain, tau);
        self.right.advance(dt, gain, tau);
        self.time += i64::from(self.params.tick);
        self.emitted += 1;

        buf.clear();
        if self.noise_every.is_some_and(|n| self.emitted % n == 0) {
            // Partial record as seen when attaching mid-transmission.
            let _ = write!(buf, "M:{},T", self.left.encoder());
            return;
        }
        let mut fields = Vec::with_capacity(3);
        if self.time_report {
            fields.push(format!("T:{}", self.time));
        }
        if self.left.report {
            fields.push(format!("LM:{}", self.left.encoder()));
        }
        if self.right.report {
            fields.push(format!("RM:{}", self.right.encoder()));
        }
        buf.push_str(&fields.join(","));
    }
}

fn parse_flag(word: &str) -> Option<bool> {
    match word {
        "on" => Some(true),
        "off" => Some(false),
        _ => None,
    }
}

impl LineChannel for SimulatedMotorLink {
    fn write_line(
        &mut self,
        line: &str,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        tracing::debug!(line, "sim command");
        self.written.push(line.to_string());
        Ok(self.apply(line)?)
    }

    fn read_line(
        &mut self,
        buf: &mut String,
        timeout: Duration,
    ) -> std::result::Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        if !self.streaming() {
            self.clock.sleep(timeout);
            return Ok(false);
        }
        self.emit(buf);
        Ok(true)
    }
}
