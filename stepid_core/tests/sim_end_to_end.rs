//! Full capture and identification against the simulated platform.

use std::sync::Arc;

use rstest::rstest;
use stepid_core::{ExperimentCfg, MotorSide, RunParams, SafetyCfg, StepIdError, run};
use stepid_core::runner::run_with_clock;
use stepid_hardware::{SimMotorParams, SimulatedMotorLink};
use stepid_traits::{Clock, ManualClock};

#[rstest]
#[case::clean(None, MotorSide::Left)]
#[case::noisy(Some(7), MotorSide::Left)]
#[case::right(None, MotorSide::Right)]
fn identifies_the_simulated_motor(#[case] noise: Option<u64>, #[case] motor: MotorSide) {
    let mut link = SimulatedMotorLink::new(SimMotorParams::default());
    if let Some(n) = noise {
        link = link.with_noise_every(n);
    }
    let params = RunParams {
        experiment: ExperimentCfg {
            motor,
            ..ExperimentCfg::default()
        },
        ..RunParams::default()
    };
    let report = run(link, params).expect("identify");

    // gain 0.0002 * target 10000 = 2 counts/tick, tau 50 ticks.
    let ss = report.model.steady_state_velocity;
    let tau = report.model.time_constant;
    assert!((ss - 2.0).abs() < 0.1, "steady state {ss}");
    assert!((30.0..=70.0).contains(&tau), "time constant {tau}");
    assert!(report.rms_error < 0.3, "rms {}", report.rms_error);
    assert!(report.samples_captured > 50);
}

#[test]
fn silent_platform_times_out() {
    let clock = ManualClock::new();
    let link = SimulatedMotorLink::new(SimMotorParams::default())
        .silent()
        .with_clock(Arc::new(clock.clone()));
    let params = RunParams {
        safety: SafetyCfg {
            max_silent_ms: 3_000,
            ..SafetyCfg::default()
        },
        ..RunParams::default()
    };
    let epoch = clock.now();
    let err = run_with_clock(link, params, clock.clone()).expect_err("silent link");
    assert_eq!(err.downcast_ref::<StepIdError>(), Some(&StepIdError::Timeout));
    assert_eq!(clock.ms_since(epoch), 3_000);
}
