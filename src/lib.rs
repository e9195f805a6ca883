//! # TCS34725 RGB Colour Sensor Driver
//!
//! This is a platform-agnostic Rust driver for the TCS34725 RGB colour sensor,
//! built using the [`embedded-hal`] traits for I2C communication.
//!
//! The TCS34725 provides:
//! - Clear, Red, Green and Blue 16-bit light channels
//! - Programmable gain and integration time
//! - I2C interface (address 0x29)
//!
//! ## Features
//!
//! - **Identity check** on initialisation, refusing to configure anything else
//! - **Raw channel acquisition** of all four channels
//! - **Normalisation** of a raw sample to an 8-bit-per-channel colour
//! - **Fixed-cadence polling** through [`Poller`] and a [`ColorSink`]
//! - **Async/await support** with feature gating (optional)
//! - **Linux bus selection** with the `linux` feature
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tcs34725::Tcs34725;
//!
//! # fn main() {
//! # let i2c = embedded_hal_mock::eh1::i2c::Mock::new(&[]);
//! // Verify the device identity and power the ADC up
//! let mut sensor = Tcs34725::initialize(i2c).unwrap();
//!
//! let sample = sensor.read_sample().unwrap();
//! let color = tcs34725::normalize(&sample).unwrap();
//! println!("{color}");
//! # }
//! ```
//!
//! ## Over-range channels
//!
//! A chromatic channel can read higher than the clear channel because of
//! sensor noise, which scales past 255. [`normalize`] saturates such values;
//! [`normalize_with`] and [`OverflowPolicy::Wrap`] keep only the low eight
//! bits instead, matching a plain narrowing cast.
//!
//! ## Async Usage
//!
//! ```toml
//! [dependencies]
//! tcs34725 = { version = "0.1", features = ["async"] }
//! ```
//!
//! ```rust,ignore
//! # #[cfg(feature = "async")]
//! # async fn example() {
//! use tcs34725::Tcs34725;
//!
//! let i2c = /* your async I2C implementation */;
//! let mut delay = /* your async delay */;
//! let mut sensor = Tcs34725::initialize_async(i2c).await.unwrap();
//!
//! // Give up on a stuck bus after 300ms
//! let sample = sensor.read_sample_within_async(&mut delay, 300).await.unwrap();
//! # }
//! ```
//!
//! [`embedded-hal`]: https://crates.io/crates/embedded-hal

#![cfg_attr(not(feature = "linux"), no_std)]
#![deny(missing_docs)]

use embedded_hal::i2c::I2c;

#[cfg(feature = "async")]
use embedded_hal_async::i2c::I2c as AsyncI2c;

pub mod ll;
pub mod poll;

#[cfg(feature = "linux")]
pub mod linux;

use ll::{enable, Channel, Register};

pub use ll::I2C_ADDRESS;
pub use poll::{ColorSink, PollConfig, PollStats, Poller, TickFailure};

/// All possible errors in this crate
#[derive(Debug, thiserror::Error)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum Error<E> {
    /// I2C communication error
    #[error("I2C transport failure: {0:?}")]
    I2c(E),
    /// No I2C adapter could be found to open the sensor on
    #[error("no I2C adapter found")]
    DeviceNotFound,
    /// The ID register did not hold the TCS34725 identity
    #[error("not connected to expected sensor (expected ID {expected:#04x}, found {found:#04x})")]
    IdentityMismatch {
        /// Expected device ID
        expected: u8,
        /// Found device ID
        found: u8,
    },
    /// The clear channel was zero, so the sample cannot be normalised
    #[error("clear channel is zero")]
    DivideByZero,
    /// The bus did not complete the acquisition in time
    #[error("bus transaction timed out")]
    Timeout,
}

/// Normalisation failure: the clear channel of the sample was zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[error("clear channel is zero")]
pub struct DivideByZero;

impl<E> From<DivideByZero> for Error<E> {
    fn from(_: DivideByZero) -> Self {
        Error::DivideByZero
    }
}

/// Raw channel counts of one acquisition
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct RawSample {
    /// Unfiltered channel count
    pub clear: u16,
    /// Red channel count
    pub red: u16,
    /// Green channel count
    pub green: u16,
    /// Blue channel count
    pub blue: u16,
}

impl RawSample {
    /// Count of a single channel
    pub const fn channel(&self, channel: Channel) -> u16 {
        match channel {
            Channel::Clear => self.clear,
            Channel::Red => self.red,
            Channel::Green => self.green,
            Channel::Blue => self.blue,
        }
    }

    fn set_channel(&mut self, channel: Channel, value: u16) {
        match channel {
            Channel::Clear => self.clear = value,
            Channel::Red => self.red = value,
            Channel::Green => self.green = value,
            Channel::Blue => self.blue = value,
        }
    }
}

/// Displayable colour derived from a [`RawSample`], always fully opaque
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct Color {
    /// Red component
    pub red: u8,
    /// Green component
    pub green: u8,
    /// Blue component
    pub blue: u8,
}

impl Color {
    /// Alpha of every normalised colour
    pub const ALPHA: u8 = 255;

    /// Create a colour from its components
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Packed `0xAARRGGBB` value
    pub const fn argb(&self) -> u32 {
        ((Self::ALPHA as u32) << 24)
            | ((self.red as u32) << 16)
            | ((self.green as u32) << 8)
            | self.blue as u32
    }
}

impl core::fmt::Display for Color {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "R: {} G: {} B: {}", self.red, self.green, self.blue)
    }
}

/// What to do with a scaled channel that does not fit in a byte
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum OverflowPolicy {
    /// Clamp to 255
    #[default]
    Saturate,
    /// Keep the low eight bits
    Wrap,
}

/// Normalise a raw sample, saturating over-range channels
pub fn normalize(sample: &RawSample) -> Result<Color, DivideByZero> {
    normalize_with(sample, OverflowPolicy::Saturate)
}

/// Normalise a raw sample with an explicit [`OverflowPolicy`]
///
/// Each chromatic channel is divided by the clear channel and scaled to
/// 0..=255, rounding half to even.
pub fn normalize_with(sample: &RawSample, policy: OverflowPolicy) -> Result<Color, DivideByZero> {
    if sample.clear == 0 {
        return Err(DivideByZero);
    }

    let scale = |channel: u16| -> u8 {
        let scaled = libm::rint(f64::from(channel) / f64::from(sample.clear) * 255.0);
        match policy {
            OverflowPolicy::Saturate => scaled.min(255.0) as u8,
            // At most 65535 * 255, fits in u32
            OverflowPolicy::Wrap => (scaled as u32 & 0xFF) as u8,
        }
    };

    Ok(Color::new(scale(sample.red), scale(sample.green), scale(sample.blue)))
}

/// High-level TCS34725 driver
pub struct Tcs34725<I2C> {
    i2c: I2C,
}

impl<I2C> Tcs34725<I2C> {
    /// Destroy the driver and return the I2C interface
    pub fn destroy(self) -> I2C {
        self.i2c
    }
}

impl<I2C, E> Tcs34725<I2C>
where
    I2C: I2c<Error = E>,
{
    /// Create a new TCS34725 driver instance
    ///
    /// Nothing is sent on the bus until [`Tcs34725::init`] is called.
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    /// Create a driver and run [`Tcs34725::init`] on it
    pub fn initialize(i2c: I2C) -> Result<Self, Error<E>> {
        let mut sensor = Self::new(i2c);
        sensor.init()?;
        Ok(sensor)
    }

    /// Verify the device identity, then power on and configure the sensor
    ///
    /// Nothing is written when the identity check fails. The oscillator is
    /// powered on in a separate write before the ADC is enabled.
    pub fn init(&mut self) -> Result<(), Error<E>> {
        let id = self.device_id()?;
        if id != ll::DEVICE_ID {
            log::error!("Not connected to a TCS34725, ID register reads {:#04x}", id);
            return Err(Error::IdentityMismatch {
                expected: ll::DEVICE_ID,
                found: id,
            });
        }

        self.write_register(Register::Enable, enable::PON)?;
        self.write_register(Register::Enable, enable::PON | enable::AEN)?;
        self.write_register(Register::Atime, ll::ATIME_DEFAULT)?;
        self.write_register(Register::Control, ll::CONTROL_DEFAULT)?;

        log::debug!("TCS34725 init sequence complete.");
        Ok(())
    }

    /// Read the device ID register
    pub fn device_id(&mut self) -> Result<u8, Error<E>> {
        self.read_register(Register::Id)
    }

    /// Read all four channels
    ///
    /// Performs eight single-byte register reads. The channels are not
    /// latched together, so the result is a best-effort snapshot.
    pub fn read_sample(&mut self) -> Result<RawSample, Error<E>> {
        let mut sample = RawSample::default();
        for channel in Channel::READ_ORDER {
            let (low, high) = channel.registers();
            let low = self.read_register(low)?;
            let high = self.read_register(high)?;
            sample.set_channel(channel, u16::from_le_bytes([low, high]));
        }

        log::debug!("Read sample {:?}", sample);
        Ok(sample)
    }

    // Helper methods for register access
    fn read_register(&mut self, register: Register) -> Result<u8, Error<E>> {
        let mut buffer = [0u8; 1];
        self.i2c
            .write_read(I2C_ADDRESS, &[register.command()], &mut buffer)
            .map_err(Error::I2c)?;
        Ok(buffer[0])
    }

    fn write_register(&mut self, register: Register, value: u8) -> Result<(), Error<E>> {
        self.i2c
            .write(I2C_ADDRESS, &[register.command(), value])
            .map_err(Error::I2c)
    }
}

#[cfg(feature = "async")]
impl<I2C, E> Tcs34725<I2C>
where
    I2C: AsyncI2c<Error = E>,
{
    /// Create a new TCS34725 driver instance (async version)
    pub fn new_async(i2c: I2C) -> Self {
        Self { i2c }
    }

    /// Create a driver and run [`Tcs34725::init_async`] on it
    pub async fn initialize_async(i2c: I2C) -> Result<Self, Error<E>> {
        let mut sensor = Self::new_async(i2c);
        sensor.init_async().await?;
        Ok(sensor)
    }

    /// Verify the device identity, then power on and configure the sensor (async version)
    pub async fn init_async(&mut self) -> Result<(), Error<E>> {
        let id = self.device_id_async().await?;
        if id != ll::DEVICE_ID {
            log::error!("Not connected to a TCS34725, ID register reads {:#04x}", id);
            return Err(Error::IdentityMismatch {
                expected: ll::DEVICE_ID,
                found: id,
            });
        }

        self.write_register_async(Register::Enable, enable::PON).await?;
        self.write_register_async(Register::Enable, enable::PON | enable::AEN)
            .await?;
        self.write_register_async(Register::Atime, ll::ATIME_DEFAULT)
            .await?;
        self.write_register_async(Register::Control, ll::CONTROL_DEFAULT)
            .await?;

        log::debug!("TCS34725 init sequence complete.");
        Ok(())
    }

    /// Read the device ID register (async version)
    pub async fn device_id_async(&mut self) -> Result<u8, Error<E>> {
        self.read_register_async(Register::Id).await
    }

    /// Read all four channels (async version)
    pub async fn read_sample_async(&mut self) -> Result<RawSample, Error<E>> {
        let mut sample = RawSample::default();
        for channel in Channel::READ_ORDER {
            let (low, high) = channel.registers();
            let low = self.read_register_async(low).await?;
            let high = self.read_register_async(high).await?;
            sample.set_channel(channel, u16::from_le_bytes([low, high]));
        }

        log::debug!("Read sample {:?}", sample);
        Ok(sample)
    }

    /// Read all four channels, failing with [`Error::Timeout`] if the bus
    /// has not completed them within `timeout_ms`
    pub async fn read_sample_within_async<D>(
        &mut self,
        delay: &mut D,
        timeout_ms: u32,
    ) -> Result<RawSample, Error<E>>
    where
        D: embedded_hal_async::delay::DelayNs,
    {
        use embassy_futures::select::{select, Either};

        match select(self.read_sample_async(), delay.delay_ms(timeout_ms)).await {
            Either::First(result) => result,
            Either::Second(()) => {
                log::warn!("Sample acquisition exceeded {}ms", timeout_ms);
                Err(Error::Timeout)
            }
        }
    }

    // Helper methods for async register access
    async fn read_register_async(&mut self, register: Register) -> Result<u8, Error<E>> {
        let mut buffer = [0u8; 1];
        self.i2c
            .write_read(I2C_ADDRESS, &[register.command()], &mut buffer)
            .await
            .map_err(Error::I2c)?;
        Ok(buffer[0])
    }

    async fn write_register_async(
        &mut self,
        register: Register,
        value: u8,
    ) -> Result<(), Error<E>> {
        self.i2c
            .write(I2C_ADDRESS, &[register.command(), value])
            .await
            .map_err(Error::I2c)
    }
}
