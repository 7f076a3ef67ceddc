//! Fixed-stride binary records.
//!
//! Each sample is a 12-byte record: 4 instrument-internal bytes that are not
//! interpreted, followed by a little-endian IEEE-754 double.

use crate::error::ChannelError;

/// Size in bytes of one record.
pub const RECORD_SIZE: usize = 12;

/// Offset of the 8-byte double within a record.
pub const VALUE_OFFSET: usize = 4;

/// Number of bytes a subfile must hold for `declared_count` records.
pub fn expected_len(declared_count: usize) -> u64 {
    (declared_count as u64).saturating_mul(RECORD_SIZE as u64)
}

/// Extract `declared_count` doubles from `raw`.
///
/// The buffer length must be exactly `12 * declared_count`; anything else is
/// reported as [`ChannelError::RecordLengthMismatch`] and nothing is decoded.
pub fn decode_records(raw: &[u8], declared_count: usize) -> Result<Vec<f64>, ChannelError> {
    if declared_count == 0 {
        return Ok(Vec::new());
    }

    let expected = expected_len(declared_count);
    let actual = raw.len() as u64;
    if actual != expected {
        return Err(ChannelError::RecordLengthMismatch { expected, actual });
    }

    Ok(raw
        .chunks_exact(RECORD_SIZE)
        .map(|record| {
            let mut value = [0u8; 8];
            value.copy_from_slice(&record[VALUE_OFFSET..RECORD_SIZE]);
            f64::from_le_bytes(value)
        })
        .collect())
}

#[cfg(test)]
pub(crate) fn encode_records(values: &[f64]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * RECORD_SIZE);
    for (i, v) in values.iter().enumerate() {
        // Junk in the skipped prefix must never leak into the values.
        out.extend_from_slice(&(0xA5A5_0000u32 + i as u32).to_le_bytes());
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}
