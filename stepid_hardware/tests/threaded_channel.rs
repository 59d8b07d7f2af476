use std::io::Cursor;
use std::time::Duration;

use stepid_hardware::ThreadedLineChannel;
use stepid_hardware::error::HwError;
use stepid_traits::LineChannel;

const WAIT: Duration = Duration::from_secs(2);

#[test]
fn delivers_lines_without_terminators() {
    let input = Cursor::new(b"T:1,LM:2\r\nT:2,LM:4\n".to_vec());
    let mut ch = ThreadedLineChannel::spawn(input, Vec::new()).unwrap();
    let mut buf = String::new();

    assert!(ch.read_line(&mut buf, WAIT).unwrap());
    assert_eq!(buf, "T:1,LM:2");
    assert!(ch.read_line(&mut buf, WAIT).unwrap());
    assert_eq!(buf, "T:2,LM:4");
}

#[test]
fn end_of_stream_surfaces_as_disconnect() {
    let input = Cursor::new(b"T:1,LM:2\n".to_vec());
    let mut ch = ThreadedLineChannel::spawn(input, Vec::new()).unwrap();
    let mut buf = String::new();
    assert!(ch.read_line(&mut buf, WAIT).unwrap());

    let err = ch.read_line(&mut buf, WAIT).expect_err("stream ended");
    let hw = err.downcast_ref::<HwError>().expect("typed hardware error");
    assert!(matches!(hw, HwError::Disconnected));
}

#[test]
fn invalid_utf8_is_kept_lossily() {
    let input = Cursor::new(vec![b'T', b':', b'1', b',', 0xff, b'\n']);
    let mut ch = ThreadedLineChannel::spawn(input, Vec::new()).unwrap();
    let mut buf = String::new();
    assert!(ch.read_line(&mut buf, WAIT).unwrap());
    assert!(buf.starts_with("T:1,"));
}

#[test]
fn writes_are_newline_terminated() {
    let mut ch = ThreadedLineChannel::spawn(Cursor::new(Vec::new()), Vec::new()).unwrap();
    ch.write_line("time report on").unwrap();
    ch.write_line("motor left set 10000").unwrap();
    assert_eq!(ch.writer().as_slice(), b"time report on\nmotor left set 10000\n");
}
