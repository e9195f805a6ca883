//! Fixed-cadence polling of the sensor
//!
//! A [`Poller`] owns an initialised driver and a display collaborator. Every
//! tick it reads a sample, normalises it and hands the colour to the
//! [`ColorSink`]. Ticks never overlap: the poller is driven from a single
//! loop and borrows the driver mutably for each acquisition.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::{normalize_with, Color, Error, OverflowPolicy, Tcs34725};

/// Interval between two ticks when nothing else is configured
pub const DEFAULT_INTERVAL_MS: u32 = 3000;

/// Receives the colour of every successful tick
pub trait ColorSink {
    /// Render a freshly sampled colour
    fn show(&mut self, color: Color);
}

impl<F> ColorSink for F
where
    F: FnMut(Color),
{
    fn show(&mut self, color: Color) {
        self(color)
    }
}

/// What [`Poller::run`] does when a tick fails
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum TickFailure {
    /// Log the error and carry on with the next tick
    #[default]
    Skip,
    /// Stop polling and return the error
    Stop,
}

/// Polling configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct PollConfig {
    /// Delay between two ticks, in milliseconds
    pub interval_ms: u32,
    /// Failed tick handling
    pub on_error: TickFailure,
    /// Handling of channels brighter than the clear channel
    pub overflow: OverflowPolicy,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL_MS,
            on_error: TickFailure::Skip,
            overflow: OverflowPolicy::Saturate,
        }
    }
}

/// Counters of a finished [`Poller::run`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct PollStats {
    /// Ticks attempted
    pub ticks: u64,
    /// Ticks that failed and were skipped
    pub failures: u64,
}

/// Drives a [`Tcs34725`] at a fixed cadence
pub struct Poller<I2C, S> {
    driver: Tcs34725<I2C>,
    sink: S,
    config: PollConfig,
}

impl<I2C, E, S> Poller<I2C, S>
where
    I2C: I2c<Error = E>,
    E: core::fmt::Debug,
    S: ColorSink,
{
    /// Create a poller around an already initialised driver
    pub fn new(driver: Tcs34725<I2C>, sink: S, config: PollConfig) -> Self {
        Self { driver, sink, config }
    }

    /// Active configuration
    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Acquire, normalise and show one sample
    pub fn tick(&mut self) -> Result<Color, Error<E>> {
        let sample = self.driver.read_sample()?;
        let color = normalize_with(&sample, self.config.overflow)?;
        log::debug!("Sample {:?} -> {}", sample, color);
        self.sink.show(color);
        Ok(color)
    }

    /// Run ticks separated by the configured interval
    ///
    /// Runs `max_ticks` ticks, or forever with `None`. Under
    /// [`TickFailure::Stop`] the first failure is returned.
    pub fn run<D: DelayNs>(
        &mut self,
        delay: &mut D,
        max_ticks: Option<u64>,
    ) -> Result<PollStats, Error<E>> {
        let mut stats = PollStats::default();

        while max_ticks.map_or(true, |max| stats.ticks < max) {
            if stats.ticks > 0 {
                delay.delay_ms(self.config.interval_ms);
            }
            stats.ticks += 1;

            if let Err(e) = self.tick() {
                match self.config.on_error {
                    TickFailure::Skip => {
                        stats.failures += 1;
                        log::warn!("Tick {} failed, skipping: {:?}", stats.ticks, e);
                    }
                    TickFailure::Stop => {
                        log::error!("Tick {} failed, stopping: {:?}", stats.ticks, e);
                        return Err(e);
                    }
                }
            }
        }

        Ok(stats)
    }

    /// Take the poller apart
    pub fn into_parts(self) -> (Tcs34725<I2C>, S) {
        (self.driver, self.sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::sample_transactions;
    use crate::I2C_ADDRESS;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
    extern crate std;
    use std::vec;
    use std::vec::Vec;

    #[derive(Default)]
    struct RecordingSink {
        colors: Vec<Color>,
    }

    impl ColorSink for RecordingSink {
        fn show(&mut self, color: Color) {
            self.colors.push(color);
        }
    }

    #[derive(Default)]
    struct RecordingDelay {
        waits_ms: Vec<u32>,
    }

    impl DelayNs for RecordingDelay {
        fn delay_ns(&mut self, _ns: u32) {
            unreachable!("poller waits in milliseconds")
        }

        fn delay_ms(&mut self, ms: u32) {
            self.waits_ms.push(ms);
        }
    }

    fn failing_tick() -> I2cTransaction {
        I2cTransaction::write_read(I2C_ADDRESS, vec![0x96], vec![0x00])
            .with_error(ErrorKind::Other)
    }

    #[test]
    fn test_tick_shows_normalized_color() {
        let mut i2c = I2cMock::new(&sample_transactions(100, 50, 0, 100));
        let mut poller = Poller::new(
            Tcs34725::new(i2c.clone()),
            RecordingSink::default(),
            PollConfig::default(),
        );

        assert_eq!(poller.tick().unwrap(), Color::new(255, 128, 0));

        let (_, sink) = poller.into_parts();
        assert_eq!(sink.colors, vec![Color::new(255, 128, 0)]);
        i2c.done();
    }

    #[test]
    fn test_run_waits_between_ticks() {
        let mut expectations = sample_transactions(10, 10, 10, 10);
        expectations.extend(sample_transactions(0, 0, 0, 10));
        expectations.extend(sample_transactions(5, 0, 0, 10));
        let mut i2c = I2cMock::new(&expectations);

        let config = PollConfig {
            interval_ms: 250,
            ..PollConfig::default()
        };
        let mut poller = Poller::new(
            Tcs34725::new(i2c.clone()),
            RecordingSink::default(),
            config,
        );
        let mut delay = RecordingDelay::default();

        let stats = poller.run(&mut delay, Some(3)).unwrap();
        assert_eq!(stats, PollStats { ticks: 3, failures: 0 });
        assert_eq!(delay.waits_ms, vec![250, 250]);

        let (_, sink) = poller.into_parts();
        assert_eq!(
            sink.colors,
            vec![
                Color::new(255, 255, 255),
                Color::new(0, 0, 0),
                Color::new(128, 0, 0)
            ]
        );
        i2c.done();
    }

    #[test]
    fn test_run_skips_failed_ticks() {
        let mut expectations = vec![failing_tick()];
        // Dark clear channel cannot be normalised
        expectations.extend(sample_transactions(1, 2, 3, 0));
        expectations.extend(sample_transactions(20, 40, 60, 80));
        let mut i2c = I2cMock::new(&expectations);

        let mut poller = Poller::new(
            Tcs34725::new(i2c.clone()),
            RecordingSink::default(),
            PollConfig::default(),
        );
        let mut delay = RecordingDelay::default();

        let stats = poller.run(&mut delay, Some(3)).unwrap();
        assert_eq!(stats, PollStats { ticks: 3, failures: 2 });
        assert_eq!(
            delay.waits_ms,
            vec![DEFAULT_INTERVAL_MS, DEFAULT_INTERVAL_MS]
        );

        let (_, sink) = poller.into_parts();
        // 63.75, 127.5, 191.25
        assert_eq!(sink.colors, vec![Color::new(64, 128, 191)]);
        i2c.done();
    }

    #[test]
    fn test_run_stops_on_first_failure() {
        let mut expectations = sample_transactions(1, 1, 1, 1);
        expectations.push(failing_tick());
        let mut i2c = I2cMock::new(&expectations);

        let config = PollConfig {
            on_error: TickFailure::Stop,
            ..PollConfig::default()
        };
        let mut colors: Vec<Color> = Vec::new();
        let mut poller = Poller::new(
            Tcs34725::new(i2c.clone()),
            |color: Color| colors.push(color),
            config,
        );

        let result = poller.run(&mut RecordingDelay::default(), Some(5));
        assert!(matches!(result, Err(Error::I2c(ErrorKind::Other))));

        drop(poller);
        assert_eq!(colors, vec![Color::new(255, 255, 255)]);
        i2c.done();
    }

    #[test]
    fn test_wrap_policy_reaches_sink() {
        let mut i2c = I2cMock::new(&sample_transactions(4, 2, 0, 2));
        let config = PollConfig {
            overflow: OverflowPolicy::Wrap,
            ..PollConfig::default()
        };
        let mut poller = Poller::new(
            Tcs34725::new(i2c.clone()),
            RecordingSink::default(),
            config,
        );

        assert_eq!(poller.tick().unwrap(), Color::new(254, 255, 0));
        i2c.done();
    }
}
