use core::fmt;

use crate::frame::{FrameError, Word};

/// Number of channels the sensor reports per measurement.
pub const CHANNELS: usize = 10;

/// Output format selected when starting a measurement.
///
/// The same response pipeline serves both, only the number of words per
/// channel differs.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Big-endian IEEE754 float, two words per channel.
    #[default]
    Float,
    /// Unsigned 16-bit integer, one word per channel.
    Integer,
}

impl OutputFormat {
    /// Argument word sent with the start measurement command.
    pub fn selector(self) -> Word {
        match self {
            OutputFormat::Float => [0x03, 0x00],
            OutputFormat::Integer => [0x05, 0x00],
        }
    }

    /// Data words carrying one channel.
    pub fn words_per_channel(self) -> usize {
        match self {
            OutputFormat::Float => 2,
            OutputFormat::Integer => 1,
        }
    }

    /// Number of word groups in a measured values response.
    pub fn word_count(self) -> usize {
        CHANNELS * self.words_per_channel()
    }
}

/// Operational state of the driver.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SensorState {
    /// Powered and waiting for commands. Initial state.
    Idle,
    /// Producing a measurement every second.
    Measuring,
    /// Fan cleaning in progress.
    Cleaning,
}

/// Driver operations, used to report a call made in the wrong state.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Operation {
    /// [`Sps30::start`](crate::Sps30::start)
    Start,
    /// [`Sps30::stop`](crate::Sps30::stop)
    Stop,
    /// [`Sps30::is_data_ready`](crate::Sps30::is_data_ready)
    ReadDataReady,
    /// [`Sps30::read`](crate::Sps30::read)
    Read,
    /// [`Sps30::enter_cleaning`](crate::Sps30::enter_cleaning)
    EnterCleaning,
    /// [`Sps30::finish_cleaning`](crate::Sps30::finish_cleaning)
    FinishCleaning,
    /// [`Sps30::read_firmware_version`](crate::Sps30::read_firmware_version)
    ReadFirmwareVersion,
    /// [`Sps30::read_product_type`](crate::Sps30::read_product_type)
    ReadProductType,
    /// [`Sps30::read_serial_number`](crate::Sps30::read_serial_number)
    ReadSerialNumber,
    /// [`Sps30::read_auto_cleaning_interval`](crate::Sps30::read_auto_cleaning_interval)
    ReadAutoCleaningInterval,
    /// [`Sps30::set_auto_cleaning_interval`](crate::Sps30::set_auto_cleaning_interval)
    SetAutoCleaningInterval,
    /// [`Sps30::read_device_status`](crate::Sps30::read_device_status)
    ReadDeviceStatus,
    /// [`Sps30::clear_device_status`](crate::Sps30::clear_device_status)
    ClearDeviceStatus,
}

/// Air quality category derived from PM2.5.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AqiCategory {
    /// PM2.5 below 50 μg/m³
    Good,
    /// PM2.5 from 50 up to 100 μg/m³
    Moderate,
    /// PM2.5 above 100 up to 150 μg/m³
    UnhealthyForSensitiveGroups,
    /// PM2.5 above 150 up to 200 μg/m³
    Unhealthy,
    /// PM2.5 above 200 up to 300 μg/m³
    VeryUnhealthy,
    /// PM2.5 above 300 μg/m³
    Hazardous,
}

impl AqiCategory {
    /// Category for a PM2.5 mass concentration in μg/m³.
    ///
    /// Upper bounds are inclusive except for `Good`, which ends below 50.
    /// NaN compares false everywhere and lands in `Hazardous`.
    pub fn from_pm2_5(pm2_5: f32) -> Self {
        if pm2_5 < 50.0 {
            AqiCategory::Good
        } else if pm2_5 <= 100.0 {
            AqiCategory::Moderate
        } else if pm2_5 <= 150.0 {
            AqiCategory::UnhealthyForSensitiveGroups
        } else if pm2_5 <= 200.0 {
            AqiCategory::Unhealthy
        } else if pm2_5 <= 300.0 {
            AqiCategory::VeryUnhealthy
        } else {
            AqiCategory::Hazardous
        }
    }

    /// Human-readable name of the category.
    pub fn label(self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            AqiCategory::Unhealthy => "Unhealthy",
            AqiCategory::VeryUnhealthy => "Very Unhealthy",
            AqiCategory::Hazardous => "Hazardous",
        }
    }
}

impl fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// SPS30 measurement.
///
/// In [`OutputFormat::Integer`] the channels carry the sensor's integer
/// values unscaled, and the typical particle size is in nm instead of μm.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Measurement {
    /// Mass Concentration PM1.0 [μg/m³]
    pub mc_1_0: f32,
    /// Mass Concentration PM2.5 [μg/m³]
    pub mc_2_5: f32,
    /// Mass Concentration PM4.0 [μg/m³]
    pub mc_4_0: f32,
    /// Mass Concentration PM10 [μg/m³]
    pub mc_10_0: f32,
    /// Number Concentration PM0.5 [#/cm³]
    pub nc_0_5: f32,
    /// Number Concentration PM1.0 [#/cm³]
    pub nc_1_0: f32,
    /// Number Concentration PM2.5 [#/cm³]
    pub nc_2_5: f32,
    /// Number Concentration PM4.0 [#/cm³]
    pub nc_4_0: f32,
    /// Number Concentration PM10 [#/cm³]
    pub nc_10_0: f32,
    /// Typical Particle Size [μm]
    pub typical_particle_size: f32,
    /// Layout the values were decoded from.
    pub format: OutputFormat,
}

impl Measurement {
    /// Interprets the data words of a measured values response.
    ///
    /// Fails with [`FrameError::MalformedResponse`] unless `words` holds
    /// exactly `format.word_count()` words.
    pub fn interpret(format: OutputFormat, words: &[Word]) -> Result<Self, FrameError> {
        if words.len() != format.word_count() {
            return Err(FrameError::MalformedResponse {
                expected: format.word_count(),
                actual: words.len(),
            });
        }

        let mut values = [0f32; CHANNELS];
        let chunks = words.chunks_exact(format.words_per_channel());
        for (value, chunk) in values.iter_mut().zip(chunks) {
            *value = match format {
                OutputFormat::Float => {
                    f32::from_be_bytes([chunk[0][0], chunk[0][1], chunk[1][0], chunk[1][1]])
                }
                OutputFormat::Integer => f32::from(u16::from_be_bytes(chunk[0])),
            };
        }

        let [
            mc_1_0,
            mc_2_5,
            mc_4_0,
            mc_10_0,
            nc_0_5,
            nc_1_0,
            nc_2_5,
            nc_4_0,
            nc_10_0,
            typical_particle_size,
        ] = values;
        Ok(Measurement {
            mc_1_0,
            mc_2_5,
            mc_4_0,
            mc_10_0,
            nc_0_5,
            nc_1_0,
            nc_2_5,
            nc_4_0,
            nc_10_0,
            typical_particle_size,
            format,
        })
    }

    /// AQI category of the PM2.5 mass concentration.
    pub fn aqi(&self) -> AqiCategory {
        AqiCategory::from_pm2_5(self.mc_2_5)
    }
}

/// Firmware version as reported by the sensor.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FirmwareVersion {
    /// Major version
    pub major: u8,
    /// Minor version
    pub minor: u8,
}

/// Fixed-size ASCII string read from the sensor, NUL padded.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AsciiString<const N: usize> {
    bytes: [u8; N],
}

impl<const N: usize> AsciiString<N> {
    pub(crate) fn from_words(words: &[Word]) -> Self {
        let mut bytes = [0u8; N];
        for (dst, src) in bytes.iter_mut().zip(words.iter().flatten()) {
            *dst = *src;
        }
        AsciiString { bytes }
    }

    /// The raw bytes including padding.
    pub fn as_bytes(&self) -> &[u8; N] {
        &self.bytes
    }

    /// The text up to the first NUL, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        let end = self.bytes.iter().position(|&b| b == 0).unwrap_or(N);
        core::str::from_utf8(&self.bytes[..end]).ok()
    }
}

/// Product type, `"00080000"` for the SPS30.
pub type ProductType = AsciiString<8>;

/// Serial number, up to 32 ASCII characters.
pub type SerialNumber = AsciiString<32>;

/// Device status register.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DeviceStatus(pub u32);

impl DeviceStatus {
    /// Bit 21, fan speed out of range.
    pub fn fan_speed_warning(self) -> bool {
        self.0 & (1 << 21) != 0
    }

    /// Bit 5, laser current out of range.
    pub fn laser_error(self) -> bool {
        self.0 & (1 << 5) != 0
    }

    /// Bit 4, fan switched on but not turning.
    pub fn fan_error(self) -> bool {
        self.0 & (1 << 4) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn float_words(values: [f32; CHANNELS]) -> [Word; 20] {
        let mut words = [[0u8; 2]; 20];
        for (i, value) in values.iter().enumerate() {
            let b = value.to_be_bytes();
            words[2 * i] = [b[0], b[1]];
            words[2 * i + 1] = [b[2], b[3]];
        }
        words
    }

    #[test]
    fn zero_float_measurement() {
        let m = Measurement::interpret(OutputFormat::Float, &[[0, 0]; 20]).unwrap();
        assert_eq!(m.mc_1_0, 0.0);
        assert_eq!(m.mc_2_5, 0.0);
        assert_eq!(m.nc_10_0, 0.0);
        assert_eq!(m.typical_particle_size, 0.0);
        assert_eq!(m.aqi(), AqiCategory::Good);
    }

    #[test]
    fn float_channel_order() {
        let values = [1.0, 2.5, 4.0, 10.0, 0.5, 1.5, 2.0, 3.0, 4.5, 0.75];
        let m = Measurement::interpret(OutputFormat::Float, &float_words(values)).unwrap();
        assert_eq!(m.mc_1_0, 1.0);
        assert_eq!(m.mc_2_5, 2.5);
        assert_eq!(m.mc_4_0, 4.0);
        assert_eq!(m.mc_10_0, 10.0);
        assert_eq!(m.nc_0_5, 0.5);
        assert_eq!(m.nc_1_0, 1.5);
        assert_eq!(m.nc_2_5, 2.0);
        assert_eq!(m.nc_4_0, 3.0);
        assert_eq!(m.nc_10_0, 4.5);
        assert_eq!(m.typical_particle_size, 0.75);
        assert_eq!(m.format, OutputFormat::Float);
    }

    #[test]
    fn integer_layout() {
        let mut words = [[0u8; 2]; 10];
        for (i, word) in words.iter_mut().enumerate() {
            *word = (i as u16 * 300).to_be_bytes();
        }
        let m = Measurement::interpret(OutputFormat::Integer, &words).unwrap();
        assert_eq!(m.mc_1_0, 0.0);
        assert_eq!(m.mc_2_5, 300.0);
        assert_eq!(m.typical_particle_size, 2700.0);
        assert_eq!(m.aqi(), AqiCategory::VeryUnhealthy);
    }

    #[test]
    fn short_input_is_rejected() {
        assert_eq!(
            Measurement::interpret(OutputFormat::Float, &[[0x42, 0x48], [0x00, 0x00]]),
            Err(FrameError::MalformedResponse {
                expected: 20,
                actual: 2
            })
        );
        // One word short of a full float layout, still a whole integer layout.
        assert_eq!(
            Measurement::interpret(OutputFormat::Float, &[[0, 0]; 19]),
            Err(FrameError::MalformedResponse {
                expected: 20,
                actual: 19
            })
        );
        assert_eq!(
            Measurement::interpret(OutputFormat::Integer, &[[0, 0]; 20]),
            Err(FrameError::MalformedResponse {
                expected: 10,
                actual: 20
            })
        );
    }

    #[test]
    fn aqi_boundaries() {
        assert_eq!(AqiCategory::from_pm2_5(49.9), AqiCategory::Good);
        assert_eq!(AqiCategory::from_pm2_5(50.0), AqiCategory::Moderate);
        assert_eq!(AqiCategory::from_pm2_5(100.0), AqiCategory::Moderate);
        assert_eq!(
            AqiCategory::from_pm2_5(100.1),
            AqiCategory::UnhealthyForSensitiveGroups
        );
        assert_eq!(AqiCategory::from_pm2_5(300.0), AqiCategory::VeryUnhealthy);
        assert_eq!(AqiCategory::from_pm2_5(300.1), AqiCategory::Hazardous);
    }

    #[test]
    fn aqi_label() {
        assert_eq!(
            AqiCategory::UnhealthyForSensitiveGroups.label(),
            "Unhealthy for Sensitive Groups"
        );
        assert_eq!(AqiCategory::VeryUnhealthy.label(), "Very Unhealthy");
    }

    #[test]
    fn ascii_string_trims_padding() {
        let s = ProductType::from_words(&[*b"00", *b"08", *b"00", *b"00"]);
        assert_eq!(s.as_str(), Some("00080000"));
        let s = SerialNumber::from_words(&[*b"AB", [b'C', 0], [0, 0]]);
        assert_eq!(s.as_str(), Some("ABC"));
    }

    #[test]
    fn device_status_flags() {
        let status = DeviceStatus((1 << 21) | (1 << 4));
        assert!(status.fan_speed_warning());
        assert!(status.fan_error());
        assert!(!status.laser_error());
    }
}
