use std::fmt;

use clap::ValueEnum;

/// Wire layout emitted by a given RG11 firmware build.
///
/// Every layout is packed, little-endian and unsigned:
/// - `Compact` (14 bytes): drops, drop pulse length (us), millis since boot, Fletcher-16 checksum
/// - `Extended` (22 bytes): drops, drop pulse length (us), condensation pulses,
///   condensation pulse length (ms), millis since boot, u16 millis between updates
/// - `ExtendedChecksum` (26 bytes): as `Extended` but with a u32 update interval
///   followed by a u16 checksum of unknown algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Schema {
    Compact,
    #[default]
    Extended,
    ExtendedChecksum,
}

impl Schema {
    /// Exact number of bytes a payload of this layout occupies
    pub const fn width(self) -> usize {
        match self {
            Schema::Compact => 14,
            Schema::Extended => 22,
            Schema::ExtendedChecksum => 26,
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schema::Compact => write!(f, "compact"),
            Schema::Extended => write!(f, "extended"),
            Schema::ExtendedChecksum => write!(f, "extended-checksum"),
        }
    }
}

/// One decoded device reading. Built fresh every successful poll cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorReport {
    pub schema: Schema,
    pub drop_counter_pulses: u32,
    pub drop_counter_pulse_length_ms: f64,
    pub condensation_pulses: Option<u32>,
    pub condensation_pulse_length_ms: Option<u32>,
    pub time_since_boot_ms: u32,
    pub time_between_updates_ms: Option<u32>,
    pub checksum: Option<u16>,
    /// `None` when the layout carries no checksum or its algorithm is unknown
    pub checksum_valid: Option<bool>,
}

impl SensorReport {
    pub fn time_since_boot_s(&self) -> f64 {
        f64::from(self.time_since_boot_ms) / 1000.0
    }
}

impl fmt::Display for SensorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SensorReport(drop_counter_pulses={}, drop_counter_pulse_length_ms={}",
            self.drop_counter_pulses, self.drop_counter_pulse_length_ms
        )?;
        if let Some(pulses) = self.condensation_pulses {
            write!(f, ", condensation_pulses={}", pulses)?;
        }
        if let Some(length) = self.condensation_pulse_length_ms {
            write!(f, ", condensation_pulse_length_ms={}", length)?;
        }
        write!(f, ", time_since_boot_s={}", self.time_since_boot_s())?;
        if let Some(interval) = self.time_between_updates_ms {
            write!(f, ", time_between_updates_ms={}", interval)?;
        }
        if let Some(checksum) = self.checksum {
            write!(f, ", checksum={:#06x}", checksum)?;
        }
        if let Some(valid) = self.checksum_valid {
            write!(f, ", checksum_valid={}", valid)?;
        }
        write!(f, ")")
    }
}
