//! Maps `Box<dyn Error>` from trait boundaries to typed `StepIdError`.
//!
//! `stepid_traits::LineChannel` uses `Box<dyn Error + Send + Sync>`; this
//! module converts those to our typed error enum, with an optional
//! feature-gated path for `stepid_hardware::HwError` downcasting.

use crate::error::StepIdError;

/// Map a trait-boundary error to a typed `StepIdError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> StepIdError {
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<stepid_hardware::error::HwError>() {
            return match hw {
                stepid_hardware::error::HwError::Timeout => StepIdError::Timeout,
                other => StepIdError::Channel(other.to_string()),
            };
        }
    }

    // Fallback: string-based detection
    let s = e.to_string();
    if s.to_lowercase().contains("timeout") || s.to_lowercase().contains("timed out") {
        StepIdError::Timeout
    } else {
        StepIdError::Channel(s)
    }
}
