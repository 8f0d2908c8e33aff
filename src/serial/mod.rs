//! Serial port communication module
//!
//! Wraps the `serialport` crate with the small surface this tool needs:
//! open-by-path-and-baud, DTR/RTS control, a non-blocking pending-bytes
//! query and a timeout-bounded line read.

pub mod port;

pub use port::{PortConfig, SerialConnection, DEFAULT_BAUD, DEFAULT_PORT};
