pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

/// Bidirectional line-oriented link to the motion platform.
///
/// Writes are newline-terminated ASCII commands; reads return one telemetry
/// line at a time.
pub trait LineChannel {
    /// Send one command line. Implementations append the line terminator.
    fn write_line(
        &mut self,
        line: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Read one line into `buf` (cleared first, terminator stripped).
    ///
    /// Returns `Ok(false)` when no complete line arrived within `timeout`.
    fn read_line(
        &mut self,
        buf: &mut String,
        timeout: std::time::Duration,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;
}

impl<C: LineChannel + ?Sized> LineChannel for Box<C> {
    fn write_line(
        &mut self,
        line: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).write_line(line)
    }

    fn read_line(
        &mut self,
        buf: &mut String,
        timeout: std::time::Duration,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        (**self).read_line(buf, timeout)
    }
}
