//! Test and helper mocks for stepid_core

use std::collections::VecDeque;
use std::time::Duration;

use stepid_traits::{Clock, LineChannel, ManualClock};

#[derive(Debug, Clone)]
enum Script {
    Line(String),
    Timeout,
}

/// What a `ScriptedChannel` does once its script is used up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhenExhausted {
    /// Fail every further read, like a closed port or the end of a transcript.
    Disconnect,
    /// Time out every further read.
    Silent,
}

/// A channel that replays a fixed script of telemetry lines and records
/// every command written to it.
///
/// Timed-out reads advance the attached `ManualClock` by the read timeout,
/// so silence bounds can be tested without sleeping.
#[derive(Debug)]
pub struct ScriptedChannel {
    script: VecDeque<Script>,
    written: Vec<String>,
    clock: Option<ManualClock>,
    when_exhausted: WhenExhausted,
}

impl ScriptedChannel {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: lines.into_iter().map(|l| Script::Line(l.into())).collect(),
            written: Vec::new(),
            clock: None,
            when_exhausted: WhenExhausted::Disconnect,
        }
    }

    /// Append `n` reads that time out.
    pub fn then_timeouts(mut self, n: usize) -> Self {
        self.script.extend(std::iter::repeat_n(Script::Timeout, n));
        self
    }

    /// Append more lines after whatever is already scripted.
    pub fn then_lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.script
            .extend(lines.into_iter().map(|l| Script::Line(l.into())));
        self
    }

    pub fn when_exhausted(mut self, behaviour: WhenExhausted) -> Self {
        self.when_exhausted = behaviour;
        self
    }

    pub fn with_clock(mut self, clock: ManualClock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Commands written so far, in order.
    pub fn written(&self) -> &[String] {
        &self.written
    }

    /// Lines and timeouts not consumed yet.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }

    fn time_out(&self, timeout: Duration) {
        if let Some(clock) = &self.clock {
            clock.sleep(timeout);
        }
    }
}

impl LineChannel for ScriptedChannel {
    fn write_line(
        &mut self,
        line: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        tracing::info!(command = line, "command");
        self.written.push(line.to_string());
        Ok(())
    }

    fn read_line(
        &mut self,
        buf: &mut String,
        timeout: Duration,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        match self.script.pop_front() {
            Some(Script::Line(line)) => {
                buf.clear();
                buf.push_str(&line);
                Ok(true)
            }
            Some(Script::Timeout) => {
                self.time_out(timeout);
                Ok(false)
            }
            None => match self.when_exhausted {
                WhenExhausted::Disconnect => Err(Box::new(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "script exhausted",
                ))),
                WhenExhausted::Silent => {
                    self.time_out(timeout);
                    Ok(false)
                }
            },
        }
    }
}
