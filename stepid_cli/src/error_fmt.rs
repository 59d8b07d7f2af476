//! Human-readable error descriptions and structured JSON error formatting.

use crate::run::{reason_name, timestamp_ms};

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    use stepid_core::error::{BuildError, StepIdError};

    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingChannel => {
                "What happened: No link was provided to the experiment.\nLikely causes: The serial device or simulator failed to initialize.\nHow to fix: Check link.device or run with --sim.".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range values in the TOML or on the command line.\nHow to fix: Edit the config file or the --before/--step/--after overrides, then rerun."
            ),
        };
    }

    if let Some(se) = err.downcast_ref::<StepIdError>() {
        return match se {
            StepIdError::Timeout => "What happened: Link went silent while waiting for telemetry.\nLikely causes: Wrong device node, baud rate not configured, or the platform is not powered.\nHow to fix: Verify link.device and the tty settings, and consider raising safety.max_silent_ms.".to_string(),
            StepIdError::Channel(msg) => format!(
                "What happened: Link failed ({msg}).\nLikely causes: Device unplugged, or a replayed transcript ended before the experiment finished.\nHow to fix: Reconnect the device, or record a transcript that covers all three phases."
            ),
            StepIdError::Cancelled => "What happened: Capture cancelled.\nLikely causes: Ctrl-C was pressed.\nHow to fix: Start a new run.".to_string(),
            StepIdError::CaptureLimit(msg) => format!(
                "What happened: Capture stopped by a safety bound ({msg}).\nLikely causes: Phase durations longer than the bound, or a device clock that is not advancing.\nHow to fix: Raise safety.max_capture_ms / safety.max_lines or shorten the phases."
            ),
            StepIdError::CrossingNotFound { threshold } => format!(
                "What happened: Velocity never rose through {threshold}.\nLikely causes: The motor did not move, the step was too small, or the capture is too short.\nHow to fix: Check the motor and experiment.step_target, or lengthen experiment.step_time."
            ),
            StepIdError::EmptyWindow { window } => format!(
                "What happened: No samples within the {window}-tick steady-state window.\nLikely causes: Too few samples after the onset, or a negative window.\nHow to fix: Lengthen experiment.step_time or adjust analysis.window."
            ),
            StepIdError::Data(de) => format!(
                "What happened: Captured data is unusable ({de}).\nLikely causes: Device clock reset, duplicated records, or out-of-range clock values.\nHow to fix: Re-run the experiment; check the firmware clock."
            ),
            StepIdError::InvalidModel(msg) => format!(
                "What happened: Identified model is invalid ({msg}).\nLikely causes: The response reached 63.2% within the first sample interval.\nHow to fix: Increase telemetry rate or lower the step target."
            ),
        };
    }

    // String-based heuristics for errors coming from init or config
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("open serial device") {
        return format!(
            "What happened: Failed to open the serial link ({msg}).\nLikely causes: Wrong device path or insufficient permissions.\nHow to fix: Fix link.device (or pass --device), and make sure the user may open the tty."
        );
    }

    if lower.contains("invalid configuration") || lower.contains("failed to parse config") {
        let cause = err
            .source()
            .map(|s| format!(" ({s})"))
            .unwrap_or_default();
        return format!(
            "What happened: Configuration is invalid or incomplete{cause}.\nLikely causes: Missing [link] device, or out-of-range values.\nHow to fix: Edit the TOML config and try again."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes per error kind; anything untyped returns 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    use stepid_core::error::StepIdError;
    match err.downcast_ref::<StepIdError>() {
        Some(StepIdError::CrossingNotFound { .. }) => 3,
        Some(StepIdError::EmptyWindow { .. }) => 4,
        Some(StepIdError::Data(_)) => 5,
        Some(StepIdError::Timeout | StepIdError::Channel(_)) => 6,
        Some(StepIdError::Cancelled) => 7,
        Some(StepIdError::CaptureLimit(_)) => 8,
        Some(StepIdError::InvalidModel(_)) => 9,
        None => 1,
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;
    use stepid_core::error::StepIdError;

    let reason = err
        .downcast_ref::<StepIdError>()
        .map_or("Error", reason_name);
    json!({
        "timestamp": timestamp_ms(),
        "reason": reason,
        "abort_reason": reason,
        "message": humanize(err),
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepid_core::error::{BuildError, DataError, StepIdError};

    #[test]
    fn typed_errors_get_specific_text_and_codes() {
        let e = eyre::Report::new(StepIdError::Timeout);
        assert!(humanize(&e).contains("went silent"));
        assert_eq!(exit_code_for_error(&e), 6);

        let e = eyre::Report::new(StepIdError::CrossingNotFound { threshold: 0.0 });
        assert_eq!(exit_code_for_error(&e), 3);

        let e = eyre::Report::new(BuildError::InvalidConfig("step_target must be non-zero"));
        assert!(humanize(&e).contains("step_target"));
        assert_eq!(exit_code_for_error(&e), 1);
    }

    #[test]
    fn clock_overflow_is_reported_as_unusable_data() {
        let e = eyre::Report::new(StepIdError::from(DataError::TimeOverflow {
            index: 1,
            prev: i64::MIN,
            next: 0,
        }));
        assert!(humanize(&e).contains("out-of-range clock values"));
        assert_eq!(exit_code_for_error(&e), 5);
    }

    #[test]
    fn wrapped_errors_keep_their_kind() {
        use eyre::WrapErr;
        let r: Result<(), StepIdError> = Err(StepIdError::Cancelled);
        let e = r.wrap_err("replaying t.txt").unwrap_err();
        assert_eq!(exit_code_for_error(&e), 7);
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&e)).unwrap();
        assert_eq!(v["reason"], "Cancelled");
    }
}
