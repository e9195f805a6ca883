//! Low-level register definitions for the TCS34725
//!
//! Every register access on this device family goes through the command
//! register: the register address is OR'ed with [`COMMAND_BIT`] before it is
//! put on the bus.

/// I2C address of the TCS34725
pub const I2C_ADDRESS: u8 = 0x29;

/// Command bit OR'ed into every register address
pub const COMMAND_BIT: u8 = 0x80;

/// Value of the ID register for the TCS34721/TCS34725
pub const DEVICE_ID: u8 = 0x44;

/// Integration time written during initialisation (longest integration)
pub const ATIME_DEFAULT: u8 = 0x00;

/// Gain control value written during initialisation
pub const CONTROL_DEFAULT: u8 = 0x01;

/// Length of one integration cycle in microseconds
pub const INTEGRATION_CYCLE_US: u32 = 2400;

/// Integration time for an ATIME register value
///
/// Lower values integrate longer: `0x00` is 256 cycles (614.4ms), `0xFF` a
/// single cycle.
pub const fn integration_time_us(atime: u8) -> u32 {
    (256 - atime as u32) * INTEGRATION_CYCLE_US
}

/// Sensor registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[repr(u8)]
pub enum Register {
    /// Enable register (power, ADC, wait, interrupt)
    Enable = 0x00,
    /// RGBC integration time
    Atime = 0x01,
    /// Gain control
    Control = 0x0F,
    /// Device identity
    Id = 0x12,
    /// Clear channel data, low byte
    Cdatal = 0x14,
    /// Clear channel data, high byte
    Cdatah = 0x15,
    /// Red channel data, low byte
    Rdatal = 0x16,
    /// Red channel data, high byte
    Rdatah = 0x17,
    /// Green channel data, low byte
    Gdatal = 0x18,
    /// Green channel data, high byte
    Gdatah = 0x19,
    /// Blue channel data, low byte
    Bdatal = 0x1A,
    /// Blue channel data, high byte
    Bdatah = 0x1B,
}

impl Register {
    /// Register address with the command bit set, as sent on the bus
    pub const fn command(self) -> u8 {
        self as u8 | COMMAND_BIT
    }
}

/// Bits of the [`Register::Enable`] register
pub mod enable {
    /// Power on: activates the internal oscillator
    pub const PON: u8 = 0x01;
    /// RGBC enable: activates the ADC
    pub const AEN: u8 = 0x02;
    /// Wait enable: activates the wait timer
    pub const WEN: u8 = 0x08;
    /// RGBC interrupt enable
    pub const AIEN: u8 = 0x10;
}

/// One of the four colour channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum Channel {
    /// Unfiltered channel
    Clear,
    /// Red filtered channel
    Red,
    /// Green filtered channel
    Green,
    /// Blue filtered channel
    Blue,
}

impl Channel {
    /// Acquisition order used by `read_sample`
    pub const READ_ORDER: [Channel; 4] = [
        Channel::Red,
        Channel::Green,
        Channel::Blue,
        Channel::Clear,
    ];

    /// Low and high byte data registers of this channel
    pub const fn registers(self) -> (Register, Register) {
        match self {
            Channel::Clear => (Register::Cdatal, Register::Cdatah),
            Channel::Red => (Register::Rdatal, Register::Rdatah),
            Channel::Green => (Register::Gdatal, Register::Gdatah),
            Channel::Blue => (Register::Bdatal, Register::Bdatah),
        }
    }
}
