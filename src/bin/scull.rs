//! scull CLI
//!
//! Drives an in-process scull device set from the command line.

use clap::{Parser, Subcommand};
use scull::{AccessMode, Config, DeviceSet, Result};
use tracing_subscriber::{fmt, EnvFilter};

const SELFTEST_PATTERN: &[u8] = b"atomlzlzatomlzlz";

/// scull
#[derive(Parser, Debug)]
#[command(name = "scull")]
#[command(about = "In-memory scull devices")]
#[command(version)]
struct Args {
    /// Quantum size in bytes
    #[arg(short, long, default_value = "4000")]
    quantum: usize,

    /// Slots per qset node
    #[arg(short = 's', long, default_value = "1000")]
    qset: usize,

    /// Number of devices
    #[arg(short, long, default_value = "4")]
    devices: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a pattern, reopen, and read it back in 4-byte reads
    Selftest,

    /// Write data at an offset, then read it back
    Fill {
        /// Device minor number
        #[arg(short, long, default_value = "0")]
        minor: usize,

        /// Starting offset
        #[arg(short, long, default_value = "0")]
        offset: u64,

        /// Data to write
        data: String,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,scull=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("scull v{}", scull::VERSION);

    let config = Config::builder()
        .quantum(args.quantum)
        .qset(args.qset)
        .device_count(args.devices)
        .build();

    let devices = match DeviceSet::new(config) {
        Ok(devices) => devices,
        Err(e) => {
            tracing::error!("Failed to set up devices: {}", e);
            std::process::exit(1);
        }
    };

    let outcome = match args.command {
        Commands::Selftest => selftest(&devices),
        Commands::Fill { minor, offset, data } => fill(&devices, minor, offset, data.as_bytes()),
    };

    if let Err(e) = outcome {
        tracing::error!("{} (errno {})", e, e.errno());
        std::process::exit(1);
    }
}

fn selftest(devices: &DeviceSet) -> Result<()> {
    let mut file = devices.open(0, AccessMode::ReadWrite)?;
    let written = file.write(SELFTEST_PATTERN)?;
    println!(
        "write {} byte: {}",
        written,
        String::from_utf8_lossy(SELFTEST_PATTERN)
    );
    file.release();

    let mut file = devices.open(0, AccessMode::ReadWrite)?;
    let mut buf = [0u8; 4];
    for _ in 0..2 {
        let read = file.read(&mut buf)?;
        println!("read {} bytes", read);
        println!("s = {}", String::from_utf8_lossy(&buf[..read]));
    }
    file.release();

    Ok(())
}

fn fill(devices: &DeviceSet, minor: usize, offset: u64, data: &[u8]) -> Result<()> {
    let mut file = devices.open(minor, AccessMode::ReadWrite)?;

    file.seek(offset_arg(offset)?, scull::Whence::Set)?;
    let mut written = 0;
    while written < data.len() {
        written += file.write(&data[written..])?;
    }

    file.seek(offset_arg(offset)?, scull::Whence::Set)?;
    let mut back = vec![0u8; data.len()];
    let mut read = 0;
    while read < back.len() {
        let n = file.read(&mut back[read..])?;
        if n == 0 {
            break;
        }
        read += n;
    }
    file.release();

    let stats = devices.device(minor)?.stats();
    println!("wrote {} bytes at {}", written, offset);
    println!("read back {} bytes: {}", read, String::from_utf8_lossy(&back[..read]));
    println!("{:#?}", stats);

    Ok(())
}

fn offset_arg(offset: u64) -> Result<i64> {
    i64::try_from(offset)
        .map_err(|_| scull::ScullError::InvalidArgument(format!("offset {} too large", offset)))
}
