//! boot-watch
//!
//! Reset an attached dev board through its DTR/RTS lines and watch the boot
//! output for a fixed window. Meant for a human at a terminal right after
//! flashing: run it, watch the board come up, done.
//!
//! # Usage
//!
//! ```bash
//! # Defaults: /dev/ttyACM0 at 115200 baud for 10 seconds
//! boot-watch
//!
//! # Pick a port and baud rate, watch for 30 seconds
//! boot-watch --port /dev/ttyUSB0 --baud 921600 --duration 30
//! ```

mod serial;
mod session;

use clap::Parser;
use colored::Colorize;
use serial::{PortConfig, DEFAULT_BAUD, DEFAULT_PORT};
use session::SessionConfig;
use std::io;
use std::time::Duration;

/// Reset a dev board over DTR/RTS and watch its boot output
#[derive(Parser)]
#[command(name = "boot-watch")]
#[command(version)]
#[command(about = "Reset a dev board over DTR/RTS and watch its boot output")]
struct Cli {
    /// Serial port path (e.g., /dev/ttyACM0)
    #[arg(short, long, default_value = DEFAULT_PORT)]
    port: String,

    /// Baud rate
    #[arg(short, long, default_value_t = DEFAULT_BAUD)]
    baud: u32,

    /// Observation window in seconds
    #[arg(short, long, default_value_t = 10)]
    duration: u64,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = SessionConfig {
        port: PortConfig::new(&cli.port).with_baud_rate(cli.baud),
        window: Duration::from_secs(cli.duration),
    };

    let mut stdout = io::stdout().lock();

    // A failed session is reported and the process still exits cleanly;
    // this tool is for a human watching the terminal, not for automation.
    if let Err(e) = session::run(config, &mut stdout) {
        drop(stdout);
        println!("{} {}", "Error:".red().bold(), e);
    }
}
