//! Serial port configuration and connection management
//!
//! Thin wrapper around `serialport` for USB-CDC dev boards: open by path
//! and baud rate, drive the DTR/RTS control lines, poll for pending bytes
//! and read line-at-a-time.

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::Read;
use std::time::Duration;

/// Default port path for USB-CDC boards on Linux
pub const DEFAULT_PORT: &str = "/dev/ttyACM0";

/// Default baud rate for most dev-board consoles
pub const DEFAULT_BAUD: u32 = 115_200;

/// Configuration for a serial port connection
#[derive(Debug, Clone)]
pub struct PortConfig {
    /// Serial port path (e.g., /dev/ttyACM0, /dev/ttyUSB0)
    pub port_path: String,
    /// Baud rate (default: 115200)
    pub baud_rate: u32,
    /// Data bits (default: 8)
    pub data_bits: DataBits,
    /// Parity (default: None)
    pub parity: Parity,
    /// Stop bits (default: 1)
    pub stop_bits: StopBits,
    /// Flow control (default: None)
    pub flow_control: FlowControl,
    /// Read timeout per attempt
    pub timeout: Duration,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            port_path: String::from(DEFAULT_PORT),
            baud_rate: DEFAULT_BAUD,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            flow_control: FlowControl::None,
            timeout: Duration::from_secs(1),
        }
    }
}

impl PortConfig {
    /// Create a new configuration for the given path with default settings
    pub fn new(port_path: &str) -> Self {
        Self {
            port_path: port_path.to_string(),
            ..Default::default()
        }
    }

    /// Set the baud rate
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Set the read timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// An open serial connection
pub struct SerialConnection {
    port: Box<dyn SerialPort>,
}

impl SerialConnection {
    /// Open a serial connection with the given configuration
    pub fn open(config: PortConfig) -> Result<Self, serialport::Error> {
        let port = serialport::new(&config.port_path, config.baud_rate)
            .data_bits(config.data_bits)
            .parity(config.parity)
            .stop_bits(config.stop_bits)
            .flow_control(config.flow_control)
            .timeout(config.timeout)
            .open()?;

        log::debug!(
            "opened {} at {} baud",
            config.port_path,
            config.baud_rate
        );

        Ok(Self { port })
    }

    /// Set the DTR (Data Terminal Ready) signal
    pub fn set_dtr(&mut self, level: bool) -> Result<(), serialport::Error> {
        self.port.write_data_terminal_ready(level)
    }

    /// Set the RTS (Request To Send) signal
    pub fn set_rts(&mut self, level: bool) -> Result<(), serialport::Error> {
        self.port.write_request_to_send(level)
    }

    /// Number of bytes waiting in the input buffer, without blocking
    pub fn bytes_to_read(&mut self) -> Result<u32, serialport::Error> {
        self.port.bytes_to_read()
    }

    /// Read one line from the serial port (until newline).
    ///
    /// Bounded by the configured read timeout: a timeout with data already
    /// accumulated returns the partial line, a timeout with nothing read
    /// returns `None`. Raw bytes are returned so the caller decides how to
    /// decode them.
    pub fn read_line(&mut self) -> std::io::Result<Option<Vec<u8>>> {
        let mut buffer = Vec::new();
        let mut byte = [0u8; 1];

        loop {
            match self.port.read(&mut byte) {
                Ok(1) => {
                    if byte[0] == b'\n' {
                        buffer.push(byte[0]);
                        break;
                    }
                    buffer.push(byte[0]);
                }
                Ok(0) => {
                    if buffer.is_empty() {
                        return Ok(None);
                    }
                    break;
                }
                Ok(_) => unreachable!(),
                Err(ref e) if e.kind() == std::io::ErrorKind::TimedOut => {
                    if buffer.is_empty() {
                        return Ok(None);
                    }
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(Some(buffer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PortConfig::default();
        assert_eq!(config.baud_rate, 115_200);
        assert_eq!(config.port_path, "/dev/ttyACM0");
        assert_eq!(config.timeout, Duration::from_secs(1));
    }

    #[test]
    fn test_config_builder() {
        let config = PortConfig::new("/dev/ttyUSB0")
            .with_baud_rate(9600)
            .with_timeout(Duration::from_millis(250));

        assert_eq!(config.port_path, "/dev/ttyUSB0");
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.timeout, Duration::from_millis(250));
    }
}
