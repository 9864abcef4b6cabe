/// SPS30 I2C commands.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Start measurement mode. Takes the output format selector as argument.
    StartMeasurement,
    /// Return to idle mode.
    StopMeasurement,
    /// Query whether a new measurement can be read.
    ReadDataReadyFlag,
    /// Read the ten measured channels.
    ReadMeasuredValues,
    /// Run the fan at maximum speed to blow out accumulated dust.
    EnterCleaning,
    /// Read the automatic cleaning interval in seconds.
    ReadAutoCleaningInterval,
    /// Write the automatic cleaning interval in seconds, as two argument words.
    WriteAutoCleaningInterval,
    /// Read the product type as ASCII.
    ReadProductType,
    /// Read the serial number as ASCII.
    ReadSerialNumber,
    /// Read the firmware major and minor version.
    ReadFirmwareVersion,
    /// Read the 32-bit device status register.
    ReadDeviceStatusRegister,
    /// Clear the device status register.
    ClearDeviceStatusRegister,
    /// Soft reset, the sensor returns to idle.
    DeviceReset,
}

impl Command {
    /// Command code and the minimum delay in ms before the next bus access.
    pub fn as_tuple(self) -> (u16, u32) {
        match self {
            Self::StartMeasurement => (0x0010, 20),
            Self::StopMeasurement => (0x0104, 100),
            Self::ReadDataReadyFlag => (0x0202, 5),
            Self::ReadMeasuredValues => (0x0300, 50),
            Self::EnterCleaning => (0x1004, 5),
            Self::ReadAutoCleaningInterval => (0x8004, 5),
            Self::WriteAutoCleaningInterval => (0x8004, 20),
            Self::ReadProductType => (0xD002, 5),
            Self::ReadSerialNumber => (0xD033, 5),
            Self::ReadFirmwareVersion => (0xD100, 5),
            Self::ReadDeviceStatusRegister => (0xD206, 5),
            Self::ClearDeviceStatusRegister => (0xD210, 5),
            Self::DeviceReset => (0xD304, 100),
        }
    }

    /// 16-bit command code, sent MSB first.
    pub fn code(self) -> u16 {
        self.as_tuple().0
    }

    /// Execution time of the command in ms.
    pub fn delay_ms(self) -> u32 {
        self.as_tuple().1
    }
}

#[cfg(test)]
mod tests {
    use super::Command;

    #[test]
    fn hardware_codes() {
        assert_eq!(Command::StartMeasurement.code(), 0x0010);
        assert_eq!(Command::StopMeasurement.code(), 0x0104);
        assert_eq!(Command::ReadDataReadyFlag.code(), 0x0202);
        assert_eq!(Command::ReadMeasuredValues.code(), 0x0300);
        assert_eq!(Command::EnterCleaning.code(), 0x1004);
    }

    #[test]
    fn auto_cleaning_interval_delays() {
        assert_eq!(Command::ReadAutoCleaningInterval.as_tuple(), (0x8004, 5));
        assert_eq!(Command::WriteAutoCleaningInterval.as_tuple(), (0x8004, 20));
    }
}
