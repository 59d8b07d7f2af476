//! Line channel over any blocking byte stream.
//!
//! A reader thread owns the read half and forwards complete lines through a
//! bounded channel, so `read_line` can wait with a timeout even though the
//! underlying `Read` blocks. The thread exits on EOF, on a read error, or
//! when the receiving side has been dropped.
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel as xch;
use stepid_traits::LineChannel;

use crate::error::{HwError, Result};
use crate::util::trim_line_end;

/// Lines buffered between the reader thread and the consumer.
const LINE_QUEUE_DEPTH: usize = 256;

pub struct ThreadedLineChannel<W: Write> {
    rx: xch::Receiver<std::io::Result<String>>,
    writer: W,
    // Detached on drop: a thread blocked in read() cannot be interrupted.
    _reader: JoinHandle<()>,
}

impl<W: Write> ThreadedLineChannel<W> {
    pub fn spawn<R: Read + Send + 'static>(reader: R, writer: W) -> Result<Self> {
        let (tx, rx) = xch::bounded(LINE_QUEUE_DEPTH);
        let handle = std::thread::Builder::new()
            .name("stepid-line-reader".into())
            .spawn(move || {
                let mut reader = BufReader::new(reader);
                let mut raw = Vec::with_capacity(128);
                loop {
                    raw.clear();
                    match reader.read_until(b'\n', &mut raw) {
                        Ok(0) => {
                            tracing::debug!("line reader reached end of stream");
                            break;
                        }
                        Ok(_) => {
                            // Serial noise is not always valid UTF-8; keep what we can.
                            let line = String::from_utf8_lossy(&raw).into_owned();
                            if tx.send(Ok(line)).is_err() {
                                tracing::debug!("line consumer disconnected, exiting reader");
                                break;
                            }
                        }
                        Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                        Err(e) => {
                            tracing::warn!(error = %e, "line reader failed");
                            let _ = tx.send(Err(e));
                            break;
                        }
                    }
                }
                tracing::trace!("line reader thread exiting");
            })?;
        Ok(Self {
            rx,
            writer,
            _reader: handle,
        })
    }

    fn recv_line(&mut self, buf: &mut String, timeout: Duration) -> Result<bool> {
        match self.rx.recv_timeout(timeout) {
            Ok(Ok(line)) => {
                buf.clear();
                buf.push_str(trim_line_end(&line));
                Ok(true)
            }
            Ok(Err(e)) => Err(HwError::Io(e)),
            Err(xch::RecvTimeoutError::Timeout) => Ok(false),
            Err(xch::RecvTimeoutError::Disconnected) => Err(HwError::Disconnected),
        }
    }

    fn send_line(&mut self, line: &str) -> Result<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    /// Access the write half (used by tests to inspect what was sent).
    pub fn writer(&self) -> &W {
        &self.writer
    }
}

impl<W: Write> LineChannel for ThreadedLineChannel<W> {
    fn write_line(
        &mut self,
        line: &str,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        tracing::trace!(line, "link write");
        Ok(self.send_line(line)?)
    }

    fn read_line(
        &mut self,
        buf: &mut String,
        timeout: Duration,
    ) -> std::result::Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.recv_line(buf, timeout)?)
    }
}

/// Serial device opened as a plain file. Line settings (baud rate, raw mode)
/// are expected to be configured on the tty beforehand.
pub type SerialLink = ThreadedLineChannel<File>;

pub fn open_serial(path: &Path) -> Result<SerialLink> {
    let file = OpenOptions::new().read(true).write(true).open(path)?;
    let reader = file.try_clone()?;
    tracing::info!(device = %path.display(), "serial link opened");
    ThreadedLineChannel::spawn(reader, file)
}
