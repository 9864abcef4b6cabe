//! embedded-hal driver for the Sensirion SPS30 particulate matter sensor over I2C.
//!
//! The driver owns the I2C bus and a delay provider. It tracks the sensor's
//! operational state and rejects calls that are invalid in that state before
//! touching the bus.
//!
//! ```text
//!        start()             enter_cleaning()
//!  Measuring ◄──── Idle ─────────────────► Cleaning
//!      │            ▲  ▲                      │
//!      └────────────┘  └──────────────────────┘
//!         stop()        stop() / finish_cleaning()
//! ```
//!
//! Reading a measurement:
//!
//! ```ignore
//! let mut sensor = Sps30::new(i2c, delay);
//! sensor.start(OutputFormat::Float)?;
//! loop {
//!     if sensor.is_data_ready()? {
//!         let m = sensor.read()?;
//!         log::info!("PM2.5 {} μg/m³ ({})", m.mc_2_5, m.aqi());
//!     }
//!     delay.delay_ms(1000);
//! }
//! ```
//!
//! # Concurrency
//!
//! The driver is not thread-safe. It holds `&mut` access to the bus for the
//! duration of every call; callers sharing a bus must serialize access.
//!
//! # Limitations
//!
//! No timeouts are applied to the bus. If the transport blocks, so does the
//! driver. The longest intentional wait is fan cleaning, ten seconds by
//! default.

#![deny(unsafe_code)]
#![cfg_attr(not(test), no_std)]

use embedded_hal as hal;
use hal::delay::DelayNs;
use hal::i2c::I2c;
use log::{debug, warn};

mod commands;
mod config;
mod crc;
mod error;
pub mod frame;
mod types;

pub use commands::Command;
pub use config::{Config, DEFAULT_ADDRESS};
pub use crc::crc;
pub use error::Error;
pub use frame::{build_frame, decode, FrameError, Word};
pub use types::*;

use frame::GROUP_LEN;

/// The largest response is the float measurement, 20 word groups.
const MAX_RESPONSE_WORDS: usize = 20;

const IDLE_OR_MEASURING: &[SensorState] = &[SensorState::Idle, SensorState::Measuring];

/// SPS30 driver.
pub struct Sps30<I2C, D> {
    i2c: I2C,
    delay: D,
    config: Config,
    state: SensorState,
    format: OutputFormat,
}

impl<I2C, D, E> Sps30<I2C, D>
where
    I2C: I2c<Error = E>,
    D: DelayNs,
{
    /// Creates a driver at the default address. The sensor is assumed idle.
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self::with_config(i2c, delay, Config::default())
    }

    /// Creates a driver with explicit address and timings.
    pub fn with_config(i2c: I2C, delay: D, config: Config) -> Self {
        Sps30 {
            i2c,
            delay,
            config,
            state: SensorState::Idle,
            format: OutputFormat::default(),
        }
    }

    /// Current operational state.
    pub fn state(&self) -> SensorState {
        self.state
    }

    /// Layout of measured values, `None` unless measuring.
    pub fn output_format(&self) -> Option<OutputFormat> {
        match self.state {
            SensorState::Measuring => Some(self.format),
            _ => None,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Destroys the driver and returns the bus and delay.
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    /// Starts measuring with values reported in `format`.
    ///
    /// Returns after the settle delay, when the first reading can be polled.
    pub fn start(&mut self, format: OutputFormat) -> Result<(), Error<E>> {
        self.require(Operation::Start, &[SensorState::Idle])?;
        self.write_command(Command::StartMeasurement, &[format.selector()])?;
        self.state = SensorState::Measuring;
        self.format = format;
        self.delay.delay_ms(self.config.settle_delay_ms);
        debug!("SPS30 measuring, {:?} output", format);
        Ok(())
    }

    /// Stops measuring or cleaning and returns to idle.
    pub fn stop(&mut self) -> Result<(), Error<E>> {
        self.require(
            Operation::Stop,
            &[SensorState::Measuring, SensorState::Cleaning],
        )?;
        self.write_command(Command::StopMeasurement, &[])?;
        self.state = SensorState::Idle;
        Ok(())
    }

    /// Checks whether a new measurement is available.
    pub fn is_data_ready(&mut self) -> Result<bool, Error<E>> {
        self.require(Operation::ReadDataReady, &[SensorState::Measuring])?;
        let mut words = [[0u8; 2]; 1];
        self.delayed_read_cmd(Command::ReadDataReadyFlag, &mut words)?;
        Ok(u16::from_be_bytes(words[0]) != 0)
    }

    /// Reads the measured values.
    ///
    /// Call only after [`is_data_ready`](Self::is_data_ready) returned `true`,
    /// otherwise the sensor may return the previous values.
    pub fn read(&mut self) -> Result<Measurement, Error<E>> {
        self.require(Operation::Read, &[SensorState::Measuring])?;
        let mut buf = [[0u8; 2]; MAX_RESPONSE_WORDS];
        let words = &mut buf[..self.format.word_count()];
        self.delayed_read_cmd(Command::ReadMeasuredValues, words)?;
        Ok(Measurement::interpret(self.format, words)?)
    }

    /// Starts fan cleaning. The sensor stays in `Cleaning` until
    /// [`finish_cleaning`](Self::finish_cleaning) or [`stop`](Self::stop).
    pub fn enter_cleaning(&mut self) -> Result<(), Error<E>> {
        self.require(Operation::EnterCleaning, &[SensorState::Idle])?;
        self.write_command(Command::EnterCleaning, &[])?;
        self.state = SensorState::Cleaning;
        debug!("SPS30 fan cleaning started");
        Ok(())
    }

    /// Blocks for the configured cleaning duration, then returns to idle.
    pub fn finish_cleaning(&mut self) -> Result<(), Error<E>> {
        self.require(Operation::FinishCleaning, &[SensorState::Cleaning])?;
        self.delay.delay_ms(self.config.cleaning_duration_ms);
        self.state = SensorState::Idle;
        debug!("SPS30 fan cleaning done");
        Ok(())
    }

    /// Runs a full fan cleaning cycle.
    pub fn clean(&mut self) -> Result<(), Error<E>> {
        self.enter_cleaning()?;
        self.finish_cleaning()
    }

    /// Reads the firmware version.
    ///
    /// Not every firmware answers this reliably. Treat failures as "unknown".
    pub fn read_firmware_version(&mut self) -> Result<FirmwareVersion, Error<E>> {
        self.require(Operation::ReadFirmwareVersion, IDLE_OR_MEASURING)?;
        let mut words = [[0u8; 2]; 1];
        self.delayed_read_cmd(Command::ReadFirmwareVersion, &mut words)?;
        let [major, minor] = words[0];
        Ok(FirmwareVersion { major, minor })
    }

    /// Reads the product type, `"00080000"` on an SPS30.
    pub fn read_product_type(&mut self) -> Result<ProductType, Error<E>> {
        self.require(Operation::ReadProductType, IDLE_OR_MEASURING)?;
        let mut words = [[0u8; 2]; 4];
        self.delayed_read_cmd(Command::ReadProductType, &mut words)?;
        Ok(ProductType::from_words(&words))
    }

    /// Reads the serial number.
    pub fn read_serial_number(&mut self) -> Result<SerialNumber, Error<E>> {
        self.require(Operation::ReadSerialNumber, IDLE_OR_MEASURING)?;
        let mut words = [[0u8; 2]; 16];
        self.delayed_read_cmd(Command::ReadSerialNumber, &mut words)?;
        Ok(SerialNumber::from_words(&words))
    }

    /// Automatic fan cleaning interval in seconds, 0 if disabled.
    pub fn read_auto_cleaning_interval(&mut self) -> Result<u32, Error<E>> {
        self.require(Operation::ReadAutoCleaningInterval, IDLE_OR_MEASURING)?;
        let mut words = [[0u8; 2]; 2];
        self.delayed_read_cmd(Command::ReadAutoCleaningInterval, &mut words)?;
        Ok(u32_from_words(words))
    }

    /// Sets the automatic fan cleaning interval in seconds. 0 disables it.
    ///
    /// A running measurement keeps the old interval until it is restarted.
    pub fn set_auto_cleaning_interval(&mut self, seconds: u32) -> Result<(), Error<E>> {
        self.require(Operation::SetAutoCleaningInterval, IDLE_OR_MEASURING)?;
        let [b0, b1, b2, b3] = seconds.to_be_bytes();
        self.write_command(Command::WriteAutoCleaningInterval, &[[b0, b1], [b2, b3]])
    }

    /// Reads the device status register. Set flags are logged as warnings.
    pub fn read_device_status(&mut self) -> Result<DeviceStatus, Error<E>> {
        self.require(Operation::ReadDeviceStatus, IDLE_OR_MEASURING)?;
        let mut words = [[0u8; 2]; 2];
        self.delayed_read_cmd(Command::ReadDeviceStatusRegister, &mut words)?;
        let status = DeviceStatus(u32_from_words(words));
        if status.fan_error() || status.laser_error() || status.fan_speed_warning() {
            warn!("SPS30 device status flags set: {:#010x}", status.0);
        }
        Ok(status)
    }

    /// Clears all flags of the device status register.
    pub fn clear_device_status(&mut self) -> Result<(), Error<E>> {
        self.require(Operation::ClearDeviceStatus, IDLE_OR_MEASURING)?;
        self.write_command(Command::ClearDeviceStatusRegister, &[])
    }

    /// Soft resets the sensor. Allowed in every state, always ends in `Idle`.
    pub fn device_reset(&mut self) -> Result<(), Error<E>> {
        self.write_command(Command::DeviceReset, &[])?;
        self.state = SensorState::Idle;
        Ok(())
    }

    fn require(&self, attempted: Operation, allowed: &[SensorState]) -> Result<(), Error<E>> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            warn!("Rejected {:?} while {:?}", attempted, self.state);
            Err(Error::InvalidState {
                current: self.state,
                attempted,
            })
        }
    }

    /// Writes `command` with its arguments and waits for its execution time.
    fn write_command(&mut self, command: Command, args: &[Word]) -> Result<(), Error<E>> {
        let frame = build_frame(command, args);
        debug!("Sending {:?}: {:02X?}", command, frame.as_slice());
        self.i2c
            .write(self.config.address, &frame)
            .map_err(Error::Transport)?;
        self.delay.delay_ms(command.delay_ms());
        Ok(())
    }

    /// Reads `words.len()` word groups and validates them.
    fn read_words(&mut self, words: &mut [Word]) -> Result<(), Error<E>> {
        let mut buf = [0u8; GROUP_LEN * MAX_RESPONSE_WORDS];
        let raw = &mut buf[..GROUP_LEN * words.len()];
        self.i2c
            .read(self.config.address, raw)
            .map_err(Error::Transport)?;
        debug!("Received: {:02X?}", raw);
        decode(raw, words).map_err(|e| {
            warn!("Invalid response: {:?}", e);
            Error::from(e)
        })
    }

    fn delayed_read_cmd(&mut self, command: Command, words: &mut [Word]) -> Result<(), Error<E>> {
        self.write_command(command, &[])?;
        self.read_words(words)
    }
}

fn u32_from_words(words: [Word; 2]) -> u32 {
    let [[b0, b1], [b2, b3]] = words;
    u32::from_be_bytes([b0, b1, b2, b3])
}
