//! Capture status returned from each iteration of the driver loop.

/// Public status of a single step of the capture loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureStatus {
    /// Keep going; experiment not finished.
    Running,
    /// Settle phase elapsed and reporting has been turned off.
    Complete,
}
