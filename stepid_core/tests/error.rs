use std::error::Error;
use std::time::Duration;

use stepid_core::error::StepIdError;
use stepid_core::{StepExperiment, hw_error::map_hw_error};
use stepid_hardware::error::HwError;
use stepid_traits::LineChannel;

/// Streams a couple of records, then fails every read with `err`.
struct FailingLink {
    sent: u32,
    err: fn() -> HwError,
}

impl LineChannel for FailingLink {
    fn write_line(&mut self, _line: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }

    fn read_line(
        &mut self,
        buf: &mut String,
        _timeout: Duration,
    ) -> Result<bool, Box<dyn Error + Send + Sync>> {
        if self.sent < 2 {
            self.sent += 1;
            buf.clear();
            buf.push_str(&format!("T:{},LM:0", self.sent * 10));
            Ok(true)
        } else {
            Err(Box::new((self.err)()))
        }
    }
}

fn run_until_error(err: fn() -> HwError) -> StepIdError {
    StepExperiment::builder()
        .with_channel(FailingLink { sent: 0, err })
        .build()
        .expect("build")
        .run()
        .expect_err("link fails")
}

#[test]
fn link_timeout_maps_to_timeout() {
    assert_eq!(run_until_error(|| HwError::Timeout), StepIdError::Timeout);
}

#[test]
fn link_disconnect_maps_to_channel() {
    match run_until_error(|| HwError::Disconnected) {
        StepIdError::Channel(msg) => assert!(msg.contains("disconnected"), "{msg}"),
        other => panic!("expected Channel, got {other:?}"),
    }
}

#[test]
fn boxed_errors_map_like_the_unboxed_ones() {
    let boxed: Box<dyn Error + Send + Sync> = Box::new(HwError::Timeout);
    assert_eq!(map_hw_error(&*boxed), StepIdError::Timeout);
    let boxed: Box<dyn Error + Send + Sync> = "port vanished".into();
    assert_eq!(
        map_hw_error(&*boxed),
        StepIdError::Channel("port vanished".into())
    );
}
