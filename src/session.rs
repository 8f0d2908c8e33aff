//! Reset-and-observe serial session controller
//!
//! Drives one debugging session against an attached dev board:
//! - open the port
//! - pulse a hardware reset through the DTR/RTS control lines
//! - print incoming lines for a bounded observation window
//!
//! The controller talks to the board through the [`Transport`] trait so the
//! session logic can be exercised without hardware.

use crate::serial::{PortConfig, SerialConnection};
use std::io::{self, Write};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Settle time between the control-line assignments of the reset pulse.
///
/// Dev boards that wire DTR/RTS to the reset pin through a
/// capacitor/transistor circuit need the lines held long enough for the
/// pulse to register.
pub const RESET_SETTLE: Duration = Duration::from_millis(100);

/// Default observation window after the reset pulse
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(10);

/// Idle sleep between polls when no bytes are pending
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Errors that end a session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to open {port} at {baud} baud: {source}")]
    Open {
        port: String,
        baud: u32,
        source: serialport::Error,
    },

    #[error("failed to drive reset lines: {0}")]
    ResetLines(#[source] serialport::Error),

    #[error("serial read failed: {0}")]
    Read(#[source] io::Error),

    #[error("console write failed: {0}")]
    Console(#[source] io::Error),
}

/// The serial collaborator as the session sees it
pub trait Transport {
    /// Assign both control lines in one step
    fn set_lines(&mut self, dtr: bool, rts: bool) -> Result<(), SessionError>;

    /// Bytes currently waiting to be read, without blocking
    fn bytes_available(&mut self) -> Result<u32, SessionError>;

    /// One bounded read-until-newline attempt; `None` when it yields nothing
    fn read_line(&mut self) -> Result<Option<Vec<u8>>, SessionError>;
}

impl Transport for SerialConnection {
    fn set_lines(&mut self, dtr: bool, rts: bool) -> Result<(), SessionError> {
        self.set_dtr(dtr).map_err(SessionError::ResetLines)?;
        self.set_rts(rts).map_err(SessionError::ResetLines)
    }

    fn bytes_available(&mut self) -> Result<u32, SessionError> {
        self.bytes_to_read()
            .map_err(|e| SessionError::Read(io::Error::new(io::ErrorKind::Other, e)))
    }

    fn read_line(&mut self) -> Result<Option<Vec<u8>>, SessionError> {
        SerialConnection::read_line(self).map_err(SessionError::Read)
    }
}

/// Configuration for one session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Port settings, including the 1 s per-attempt read timeout
    pub port: PortConfig,
    /// How long to watch the port after the reset pulse
    pub window: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            port: PortConfig::default(),
            window: DEFAULT_WINDOW,
        }
    }
}

/// Open the port and run one full session.
///
/// On open failure nothing is written to `out`; the caller turns the error
/// into its user-visible message. The connection is dropped (and the port
/// released) on every exit path.
pub fn run(config: SessionConfig, out: &mut impl Write) -> Result<(), SessionError> {
    let port_name = config.port.port_path.clone();
    let baud = config.port.baud_rate;

    let mut link = SerialConnection::open(config.port).map_err(|source| SessionError::Open {
        port: port_name.clone(),
        baud,
        source,
    })?;

    run_session(&mut link, &port_name, config.window, out)
}

/// Announce the port, pulse the reset lines, then observe until the window
/// elapses.
pub fn run_session<T: Transport>(
    link: &mut T,
    port_name: &str,
    window: Duration,
    out: &mut impl Write,
) -> Result<(), SessionError> {
    writeln!(out, "Listening on {}...", port_name).map_err(SessionError::Console)?;

    reset_board(link)?;
    observe(link, window, out)
}

/// Pulse the reset line of the attached board.
///
/// Three discrete line-state assignments separated by two settle pauses:
/// both lines low, both high, both low again. Boards wire DTR/RTS to reset
/// so this toggle produces a clean power-on-style restart.
pub fn reset_board<T: Transport>(link: &mut T) -> Result<(), SessionError> {
    link.set_lines(false, false)?;
    thread::sleep(RESET_SETTLE);
    link.set_lines(true, true)?;
    thread::sleep(RESET_SETTLE);
    link.set_lines(false, false)?;

    log::debug!("reset pulse complete");
    Ok(())
}

/// Print incoming lines until `window` has elapsed.
///
/// Polls for pending bytes so the loop never blocks past the per-read
/// timeout; an idle poll sleeps briefly instead of spinning. Lines are
/// decoded tolerantly (invalid sequences become replacement characters) and
/// trimmed of surrounding whitespace including the terminator. The loop
/// ends only on elapsed time or a transport error.
pub fn observe<T: Transport>(
    link: &mut T,
    window: Duration,
    out: &mut impl Write,
) -> Result<(), SessionError> {
    let start = Instant::now();

    while start.elapsed() < window {
        if link.bytes_available()? > 0 {
            if let Some(raw) = link.read_line()? {
                let text = String::from_utf8_lossy(&raw);
                writeln!(out, "{}", text.trim()).map_err(SessionError::Console)?;
            }
        } else {
            thread::sleep(POLL_INTERVAL);
        }
    }

    Ok(())
}
