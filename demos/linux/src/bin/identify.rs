//! Identify the sensor and take a single reading
//!
//! Useful to check the wiring before running the swatch demo.

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::WrapErr;
use embedded_hal::delay::DelayNs;
use linux_embedded_hal::Delay;
use tcs34725::linux::{self, BusSelector};
use tcs34725::ll::{integration_time_us, ATIME_DEFAULT};
use tracing_subscriber::EnvFilter;

/// Print the TCS34725 identity and one raw sample
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// I2C adapter device node, defaults to the first /dev/i2c-N
    #[arg(long)]
    bus: Option<PathBuf>,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let selector = args.bus.map_or(BusSelector::First, BusSelector::Path);
    let path = selector.resolve()?;
    tracing::debug!(path = %path.display(), "Selected adapter");

    let mut sensor = linux::initialize(&BusSelector::Path(path))
        .wrap_err("failed to initialise TCS34725")?;
    let id = sensor.device_id()?;
    println!("Device ID: {id:#04x}");

    // The first conversion completes one integration period after AEN
    Delay.delay_us(integration_time_us(ATIME_DEFAULT) + 10_000);

    let sample = sensor.read_sample()?;
    println!(
        "C: {:5} R: {:5} G: {:5} B: {:5}",
        sample.clear, sample.red, sample.green, sample.blue
    );

    match tcs34725::normalize(&sample) {
        Ok(color) => println!("{color} (#{:06X})", color.argb() & 0x00FF_FFFF),
        Err(e) => println!("No colour: {e}"),
    }

    Ok(())
}
