//! Colour swatch example
//!
//! This example demonstrates how to:
//! - Select an I2C adapter and initialise the TCS34725
//! - Poll the sensor on a fixed interval
//! - Render each normalised colour as a terminal swatch with a text label

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::WrapErr;
use linux_embedded_hal::Delay;
use tcs34725::linux::{self, BusSelector};
use tcs34725::poll::DEFAULT_INTERVAL_MS;
use tcs34725::{Color, ColorSink, OverflowPolicy, PollConfig, Poller, TickFailure};
use tracing_subscriber::EnvFilter;

/// Poll a TCS34725 and show the sampled colour
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// I2C adapter device node, defaults to the first /dev/i2c-N
    #[arg(long)]
    bus: Option<PathBuf>,

    /// Milliseconds between two samples
    #[arg(long, default_value_t = DEFAULT_INTERVAL_MS)]
    interval_ms: u32,

    /// Keep the low eight bits of over-range channels instead of clamping
    #[arg(long)]
    wrap: bool,

    /// Exit on the first failed sample instead of skipping it
    #[arg(long)]
    stop_on_error: bool,

    /// Stop after this many samples
    #[arg(long)]
    ticks: Option<u64>,
}

/// Truecolour block followed by the colour label
struct TerminalSwatch<W> {
    out: W,
}

impl<W: Write> ColorSink for TerminalSwatch<W> {
    fn show(&mut self, color: Color) {
        let Color { red, green, blue } = color;
        let swatch = format!("\x1b[48;2;{red};{green};{blue}m{:8}\x1b[0m", "");
        if let Err(e) = writeln!(self.out, "{swatch}  {color}") {
            tracing::warn!("Cannot draw swatch: {e}");
        }
    }
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

    let sensor = linux::initialize(&selector)
        .wrap_err("failed to initialise TCS34725")?;
    tracing::info!(?selector, "TCS34725 ready");

    let config = PollConfig {
        interval_ms: args.interval_ms,
        on_error: if args.stop_on_error {
            TickFailure::Stop
        } else {
            TickFailure::Skip
        },
        overflow: if args.wrap {
            OverflowPolicy::Wrap
        } else {
            OverflowPolicy::Saturate
        },
    };

    let swatch = TerminalSwatch { out: io::stdout() };
    let mut poller = Poller::new(sensor, swatch, config);
    let stats = poller.run(&mut Delay, args.ticks).wrap_err("polling stopped")?;

    tracing::info!(ticks = stats.ticks, failures = stats.failures, "Polling finished");
    Ok(())
}
