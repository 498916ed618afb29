/// RG11 payload decoding
use log::debug;

use crate::error::DecodeError;
use crate::models::{Schema, SensorReport};

// Firmware accumulates drop pulse length with micros()
const MICROS_PER_MILLI: f64 = 1000.0;
const COMPACT_PAYLOAD_LEN: usize = 12;

fn u16_at(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

fn u32_at(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

/// Fletcher-16 checksum as computed by the device firmware
///
/// Both running sums are reduced modulo 255 after every byte; the result packs
/// the second sum into the high byte and the first into the low byte.
pub fn fletcher16(data: &[u8]) -> u16 {
    let mut sum1: u16 = 0;
    let mut sum2: u16 = 0;

    for &byte in data {
        sum1 = (sum1 + u16::from(byte)) % 255;
        sum2 = (sum2 + sum1) % 255;
    }

    (sum2 << 8) | sum1
}

/// Decode a raw device reply into a SensorReport
///
/// The reply must be exactly `schema.width()` bytes. Offsets per layout:
///
/// Compact (14 bytes):
/// - Bytes 0-3: Drop counter pulses
/// - Bytes 4-7: Drop pulse length (microseconds)
/// - Bytes 8-11: Milliseconds since boot
/// - Bytes 12-13: Fletcher-16 over bytes 0-11
///
/// Extended (22 bytes) and ExtendedChecksum (26 bytes):
/// - Bytes 0-3: Drop counter pulses
/// - Bytes 4-7: Drop pulse length (microseconds)
/// - Bytes 8-11: Condensation detector pulses
/// - Bytes 12-15: Condensation pulse length (milliseconds)
/// - Bytes 16-19: Milliseconds since boot
/// - Bytes 20-21: Milliseconds between updates (Extended)
/// - Bytes 20-23: Milliseconds between updates, then 24-25: checksum (ExtendedChecksum)
///
/// The checksum is reported as-is. Only the Compact layout has a known
/// algorithm, so only there is `checksum_valid` filled in.
pub fn decode(schema: Schema, data: &[u8]) -> Result<SensorReport, DecodeError> {
    let expected = schema.width();
    if data.len() != expected {
        return Err(DecodeError::Length {
            schema,
            expected,
            actual: data.len(),
        });
    }

    let drop_counter_pulses = u32_at(data, 0);
    let drop_counter_pulse_length_ms = f64::from(u32_at(data, 4)) / MICROS_PER_MILLI;

    let report = match schema {
        Schema::Compact => {
            let checksum = u16_at(data, 12);
            let computed = fletcher16(&data[..COMPACT_PAYLOAD_LEN]);
            SensorReport {
                schema,
                drop_counter_pulses,
                drop_counter_pulse_length_ms,
                condensation_pulses: None,
                condensation_pulse_length_ms: None,
                time_since_boot_ms: u32_at(data, 8),
                time_between_updates_ms: None,
                checksum: Some(checksum),
                checksum_valid: Some(checksum == computed),
            }
        }
        Schema::Extended => SensorReport {
            schema,
            drop_counter_pulses,
            drop_counter_pulse_length_ms,
            condensation_pulses: Some(u32_at(data, 8)),
            condensation_pulse_length_ms: Some(u32_at(data, 12)),
            time_since_boot_ms: u32_at(data, 16),
            time_between_updates_ms: Some(u32::from(u16_at(data, 20))),
            checksum: None,
            checksum_valid: None,
        },
        Schema::ExtendedChecksum => SensorReport {
            schema,
            drop_counter_pulses,
            drop_counter_pulse_length_ms,
            condensation_pulses: Some(u32_at(data, 8)),
            condensation_pulse_length_ms: Some(u32_at(data, 12)),
            time_since_boot_ms: u32_at(data, 16),
            time_between_updates_ms: Some(u32_at(data, 20)),
            checksum: Some(u16_at(data, 24)),
            checksum_valid: None,
        },
    };

    debug!("Decoded {} payload: {}", schema, report);
    Ok(report)
}

/// Reject a report whose checksum is known to be wrong
///
/// Reports without a verifiable checksum pass through untouched.
pub fn verify_checksum(report: &SensorReport, data: &[u8]) -> Result<(), DecodeError> {
    match (report.checksum, report.checksum_valid) {
        (Some(reported), Some(false)) => Err(DecodeError::ChecksumMismatch {
            reported,
            computed: fletcher16(&data[..COMPACT_PAYLOAD_LEN.min(data.len())]),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extended_frame(
        drops: u32,
        drop_len_us: u32,
        cond: u32,
        cond_len: u32,
        uptime: u32,
        interval: u16,
    ) -> Vec<u8> {
        let mut frame = Vec::with_capacity(22);
        frame.extend_from_slice(&drops.to_le_bytes());
        frame.extend_from_slice(&drop_len_us.to_le_bytes());
        frame.extend_from_slice(&cond.to_le_bytes());
        frame.extend_from_slice(&cond_len.to_le_bytes());
        frame.extend_from_slice(&uptime.to_le_bytes());
        frame.extend_from_slice(&interval.to_le_bytes());
        frame
    }

    fn compact_frame(drops: u32, drop_len_us: u32, millis: u32) -> Vec<u8> {
        let mut frame = Vec::with_capacity(14);
        frame.extend_from_slice(&drops.to_le_bytes());
        frame.extend_from_slice(&drop_len_us.to_le_bytes());
        frame.extend_from_slice(&millis.to_le_bytes());
        let checksum = fletcher16(&frame);
        frame.extend_from_slice(&checksum.to_le_bytes());
        frame
    }

    #[test]
    fn decodes_extended_layout() {
        let frame = extended_frame(3, 1500, 7, 250, 900_000, 1000);
        let report = decode(Schema::Extended, &frame).unwrap();

        assert_eq!(report.drop_counter_pulses, 3);
        assert_eq!(report.drop_counter_pulse_length_ms, 1.5);
        assert_eq!(report.condensation_pulses, Some(7));
        assert_eq!(report.condensation_pulse_length_ms, Some(250));
        assert_eq!(report.time_since_boot_ms, 900_000);
        assert_eq!(report.time_between_updates_ms, Some(1000));
        assert_eq!(report.checksum, None);
        assert_eq!(report.checksum_valid, None);
    }

    #[test]
    fn pulse_length_microseconds_become_milliseconds() {
        let frame = extended_frame(1, 5000, 0, 0, 0, 0);
        let report = decode(Schema::Extended, &frame).unwrap();
        assert_eq!(report.drop_counter_pulse_length_ms, 5.0);
    }

    #[test]
    fn uptime_converts_to_seconds() {
        let frame = compact_frame(0, 0, 2500);
        let report = decode(Schema::Compact, &frame).unwrap();
        assert_eq!(report.time_since_boot_s(), 2.5);
    }

    #[test]
    fn short_payload_is_rejected() {
        let frame = extended_frame(3, 1500, 0, 0, 900_000, 1000);
        let err = decode(Schema::Extended, &frame[..21]).unwrap_err();
        assert_eq!(
            err,
            DecodeError::Length {
                schema: Schema::Extended,
                expected: 22,
                actual: 21,
            }
        );
    }

    #[test]
    fn oversized_and_empty_payloads_are_rejected() {
        let mut frame = extended_frame(3, 1500, 0, 0, 900_000, 1000);
        frame.push(0);
        assert!(decode(Schema::Extended, &frame).is_err());
        assert!(decode(Schema::Compact, &[]).is_err());
    }

    #[test]
    fn decode_is_deterministic() {
        let frame = extended_frame(42, 123_456, 9, 77, 31_337, 500);
        let first = decode(Schema::Extended, &frame).unwrap();
        let second = decode(Schema::Extended, &frame).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn fletcher16_matches_reference_vectors() {
        assert_eq!(fletcher16(b"abcde"), 0xC8F0);
        assert_eq!(fletcher16(b"abcdef"), 0x2057);
        assert_eq!(fletcher16(&[]), 0);
    }

    #[test]
    fn compact_layout_checks_firmware_checksum() {
        let frame = compact_frame(12, 34_000, 60_000);
        let report = decode(Schema::Compact, &frame).unwrap();

        assert_eq!(report.drop_counter_pulses, 12);
        assert_eq!(report.drop_counter_pulse_length_ms, 34.0);
        assert_eq!(report.condensation_pulses, None);
        assert_eq!(report.checksum_valid, Some(true));
        assert!(verify_checksum(&report, &frame).is_ok());
    }

    #[test]
    fn corrupted_compact_frame_is_reported_not_rejected() {
        let mut frame = compact_frame(12, 34_000, 60_000);
        frame[0] ^= 0xFF;
        let report = decode(Schema::Compact, &frame).unwrap();

        assert_eq!(report.checksum_valid, Some(false));
        assert!(matches!(
            verify_checksum(&report, &frame),
            Err(DecodeError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn extended_checksum_layout_reports_opaque_checksum() {
        let mut frame = Vec::new();
        for value in [1u32, 2000, 3, 4, 5000, 60_000] {
            frame.extend_from_slice(&value.to_le_bytes());
        }
        frame.extend_from_slice(&0xBEEFu16.to_le_bytes());

        let report = decode(Schema::ExtendedChecksum, &frame).unwrap();
        assert_eq!(report.drop_counter_pulse_length_ms, 2.0);
        assert_eq!(report.time_between_updates_ms, Some(60_000));
        assert_eq!(report.checksum, Some(0xBEEF));
        assert_eq!(report.checksum_valid, None);
        assert!(verify_checksum(&report, &frame).is_ok());
    }
}
