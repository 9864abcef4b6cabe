/// Default 7-bit I2C address of the SPS30.
pub const DEFAULT_ADDRESS: u8 = 0x69;

/// Configuration settings for the SPS30 driver.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Config {
    /// 7-bit I2C address.
    pub address: u8,
    /// Wait after starting a measurement before the first read, in ms.
    pub settle_delay_ms: u32,
    /// How long the fan cleaning runs, in ms.
    pub cleaning_duration_ms: u32,
}

impl Config {
    /// Sets the I2C address.
    pub fn address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    /// Sets the wait after starting a measurement.
    pub fn settle_delay_ms(mut self, ms: u32) -> Self {
        self.settle_delay_ms = ms;
        self
    }

    /// Sets how long [`finish_cleaning`](crate::Sps30::finish_cleaning) waits.
    pub fn cleaning_duration_ms(mut self, ms: u32) -> Self {
        self.cleaning_duration_ms = ms;
        self
    }
}

impl Default for Config {
    /// Address `0x69`, 100 ms settle delay, 10 s fan cleaning.
    fn default() -> Config {
        Config {
            address: DEFAULT_ADDRESS,
            settle_delay_ms: 100,
            cleaning_duration_ms: 10_000,
        }
    }
}
