//! I2C adapter selection on Linux hosts
//!
//! Adapters show up as `/dev/i2c-N` character devices. [`BusSelector::First`]
//! picks the lowest-numbered one, which is the only adapter on most
//! single-board computers.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use linux_embedded_hal::{I2CError, I2cdev};

use crate::{Error, Tcs34725};

/// Directory holding the I2C adapter device nodes
pub const DEV_DIR: &str = "/dev";

/// Which I2C adapter to open the sensor on
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum BusSelector {
    /// First adapter found under [`DEV_DIR`]
    #[default]
    First,
    /// Explicit device node, e.g. `/dev/i2c-1`
    Path(PathBuf),
}

impl BusSelector {
    /// Device node this selector designates
    pub fn resolve(&self) -> Result<PathBuf, Error<I2CError>> {
        self.resolve_in(Path::new(DEV_DIR))
    }

    /// Device node this selector designates, looking for adapters in `dir`
    pub fn resolve_in(&self, dir: &Path) -> Result<PathBuf, Error<I2CError>> {
        match self {
            BusSelector::Path(path) => Ok(path.clone()),
            BusSelector::First => {
                let adapters = enumerate_adapters(dir).map_err(|e| {
                    log::error!("Cannot list {}: {}", dir.display(), e);
                    Error::DeviceNotFound
                })?;
                adapters.into_iter().next().ok_or(Error::DeviceNotFound)
            }
        }
    }
}

/// I2C adapter device nodes in `dir`, ordered by bus number
pub fn enumerate_adapters(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut adapters: Vec<(u32, PathBuf)> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let bus = adapter_number(entry.file_name().to_str()?)?;
            Some((bus, entry.path()))
        })
        .collect();

    adapters.sort_by_key(|(bus, _)| *bus);
    Ok(adapters.into_iter().map(|(_, path)| path).collect())
}

fn adapter_number(name: &str) -> Option<u32> {
    name.strip_prefix("i2c-")?.parse().ok()
}

/// Open the selected adapter and initialise the sensor on it
pub fn initialize(selector: &BusSelector) -> Result<Tcs34725<I2cdev>, Error<I2CError>> {
    let path = selector.resolve()?;
    log::debug!("Opening I2C adapter {}", path.display());

    let i2c = I2cdev::new(&path).map_err(|e| Error::I2c(I2CError::from(e)))?;
    Tcs34725::initialize(i2c)
}
