use std::sync::Arc;
use std::time::Duration;

use rstest::rstest;
use stepid_hardware::error::HwError;
use stepid_hardware::{SimMotorParams, SimulatedMotorLink};
use stepid_traits::{Clock, LineChannel, ManualClock};

const READ: Duration = Duration::from_millis(100);

fn read(link: &mut SimulatedMotorLink) -> Option<String> {
    let mut buf = String::new();
    link.read_line(&mut buf, READ).unwrap().then_some(buf)
}

#[test]
fn quiet_until_reporting_enabled() {
    let clock = ManualClock::new();
    let epoch = clock.now();
    let mut link =
        SimulatedMotorLink::new(SimMotorParams::default()).with_clock(Arc::new(clock.clone()));
    assert_eq!(read(&mut link), None);
    // The timed-out read consumed its timeout on the shared clock.
    assert_eq!(clock.ms_since(epoch), 100);

    link.write_line("time report on").unwrap();
    link.write_line("motor left report on").unwrap();
    assert_eq!(read(&mut link).as_deref(), Some("T:1010,LM:0"));
    assert_eq!(read(&mut link).as_deref(), Some("T:1020,LM:0"));
}

#[test]
fn step_command_moves_the_encoder() {
    let mut link = SimulatedMotorLink::new(SimMotorParams::default());
    link.write_line("time report on").unwrap();
    link.write_line("motor left report on").unwrap();
    link.write_line("motor left set 10000").unwrap();

    let mut last = 0;
    for _ in 0..100 {
        let line = read(&mut link).unwrap();
        let pos: i64 = line.split("LM:").nth(1).unwrap().parse().unwrap();
        assert!(pos >= last, "encoder must be non-decreasing under a positive step");
        last = pos;
    }
    // 1000 ticks at up to 2 counts/tick.
    assert!(last > 1_500 && last <= 2_000, "unexpected position {last}");
}

#[test]
fn right_motor_reports_its_own_field() {
    let mut link = SimulatedMotorLink::new(SimMotorParams::default());
    link.write_line("time report on").unwrap();
    link.write_line("motor right report on").unwrap();
    assert_eq!(read(&mut link).as_deref(), Some("T:1010,RM:0"));
}

#[test]
fn noise_replaces_records_periodically() {
    let mut link = SimulatedMotorLink::new(SimMotorParams::default()).with_noise_every(3);
    link.write_line("time report on").unwrap();
    link.write_line("motor left report on").unwrap();
    let lines: Vec<String> = (0..6).filter_map(|_| read(&mut link)).collect();
    assert!(lines[2].starts_with("M:"));
    assert!(lines[5].starts_with("M:"));
    assert!(lines[3].starts_with("T:1040"));
}

#[test]
fn silent_link_never_streams() {
    let clock = ManualClock::new();
    let mut link = SimulatedMotorLink::new(SimMotorParams::default())
        .silent()
        .with_clock(Arc::new(clock));
    link.write_line("time report on").unwrap();
    assert_eq!(read(&mut link), None);
}

#[rstest]
#[case("motor up set 5")]
#[case("motor left set fast")]
#[case("time report maybe")]
#[case("reboot")]
fn rejects_unknown_commands(#[case] line: &str) {
    let mut link = SimulatedMotorLink::new(SimMotorParams::default());
    let err = link.write_line(line).expect_err("should reject");
    assert!(matches!(
        err.downcast_ref::<HwError>(),
        Some(HwError::UnknownCommand(_))
    ));
    assert_eq!(link.commands(), [line.to_string()]);
}
