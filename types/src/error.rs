//! Errors raised while parsing or validating fundamental types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("invalid validator bounds: min {min}, max {max}")]
    InvalidValidatorBounds { min: u32, max: u32 },

    #[error("validators per job {count} outside [{min}, {max}]")]
    InvalidCommitteeSize { count: u32, min: u32, max: u32 },

    #[error("slash percentage {0} exceeds 100")]
    InvalidSlashPct(u8),

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Decode a `0x`-optional hex string into exactly `N` bytes.
pub(crate) fn decode_hex<const N: usize>(s: &str) -> Result<[u8; N], TypesError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    if digits.len() != N * 2 {
        return Err(TypesError::InvalidLength {
            expected: N,
            actual: digits.len() / 2,
        });
    }
    let mut out = [0u8; N];
    hex::decode_to_slice(digits, &mut out).map_err(|_| TypesError::InvalidHex(s.to_string()))?;
    Ok(out)
}
