//! On-disk form of an encoded bitstream.
//!
//! Text is the compatible default: one ASCII `0` or `1` per bit. Packed is
//! eight bits per byte behind a small header:
//!
//! ```text
//! +------+---------+----------------+------------------------+
//! | HUFB | version | bit length     | payload, MSB first,    |
//! |      | (1)     | (u64, BE)      | zero padded to a byte  |
//! +------+---------+----------------+------------------------+
//! ```

use std::convert::TryInto;

use crate::code::{BitStr, Bits};
use crate::error::{Error, Result, StreamFault};

pub const PACKED_MAGIC: &[u8; 4] = b"HUFB";
pub const PACKED_VERSION: u8 = 1;
const PACKED_HEADER_LEN: usize = 4 + 1 + 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    /// one ASCII digit per bit
    Text,
    /// header plus densely packed bits
    Packed,
}

impl WireFormat {
    /// guess the format of a stored payload from its first bytes
    pub fn sniff(bytes: &[u8]) -> Self {
        if bytes.starts_with(PACKED_MAGIC) {
            WireFormat::Packed
        } else {
            WireFormat::Text
        }
    }
}

pub fn write_payload(bits: &BitStr, format: WireFormat) -> Vec<u8> {
    match format {
        WireFormat::Text => to_text(bits).into_bytes(),
        WireFormat::Packed => to_packed(bits),
    }
}

/// read a payload in whichever format it was written
pub fn read_payload(bytes: &[u8]) -> Result<Bits> {
    match WireFormat::sniff(bytes) {
        WireFormat::Text => from_text(bytes),
        WireFormat::Packed => from_packed(bytes),
    }
}

pub fn to_text(bits: &BitStr) -> String {
    bits.iter()
        .by_vals()
        .map(|bit| if bit { '1' } else { '0' })
        .collect()
}

/// parse ASCII digits; one trailing line ending is tolerated
pub fn from_text(bytes: &[u8]) -> Result<Bits> {
    let digits = bytes
        .strip_suffix(b"\r\n")
        .or_else(|| bytes.strip_suffix(b"\n"))
        .unwrap_or(bytes);

    let mut bits = Bits::with_capacity(digits.len());
    for (offset, &byte) in digits.iter().enumerate() {
        match byte {
            b'0' => bits.push(false),
            b'1' => bits.push(true),
            other => return Err(Error::stream(offset, StreamFault::NonBinaryDigit(other))),
        }
    }
    Ok(bits)
}

pub fn to_packed(bits: &BitStr) -> Vec<u8> {
    let mut payload = bits.to_bitvec();
    payload.set_uninitialized(false);

    let mut out = Vec::with_capacity(PACKED_HEADER_LEN + payload.as_raw_slice().len());
    out.extend_from_slice(PACKED_MAGIC);
    out.push(PACKED_VERSION);
    out.extend_from_slice(&(bits.len() as u64).to_be_bytes());
    out.extend_from_slice(payload.as_raw_slice());
    out
}

/// unpack a packed payload; padding bits after the declared length are ignored
pub fn from_packed(bytes: &[u8]) -> Result<Bits> {
    if bytes.len() < PACKED_HEADER_LEN
        || !bytes.starts_with(PACKED_MAGIC)
        || bytes[PACKED_MAGIC.len()] != PACKED_VERSION
    {
        return Err(Error::stream(0, StreamFault::BadHeader));
    }

    let length_start = PACKED_MAGIC.len() + 1;
    let declared = u64::from_be_bytes(
        bytes[length_start..PACKED_HEADER_LEN]
            .try_into()
            .map_err(|_| Error::stream(length_start, StreamFault::BadHeader))?,
    );
    let payload = &bytes[PACKED_HEADER_LEN..];
    let expected_bytes = declared / 8 + u64::from(declared % 8 != 0);
    if expected_bytes != payload.len() as u64 {
        return Err(Error::stream(
            PACKED_HEADER_LEN,
            StreamFault::LengthMismatch {
                declared,
                actual: payload.len(),
            },
        ));
    }

    let mut bits = Bits::from_slice(payload);
    // the length check above bounds `declared` by the payload size
    bits.truncate(declared as usize);
    Ok(bits)
}
