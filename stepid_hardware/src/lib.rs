//! Concrete `LineChannel` implementations.
//!
//! - [`SerialLink`]: a device node (e.g. `/dev/ttyUSB0`) read by a background
//!   thread so each read can be bounded by a timeout.
//! - [`SimulatedMotorLink`]: a deterministic first-order motor that speaks the
//!   same line protocol as the firmware; used by `--sim`, self-check and tests.
pub mod error;
pub mod serial;
pub mod sim;
pub mod util;

pub use serial::{SerialLink, ThreadedLineChannel, open_serial};
pub use sim::{SimMotorParams, SimulatedMotorLink};
