//! Layout of the V1 bitfield.
//!
//! ```text
//!  bits 0-1   version, 00 for V1
//!  bits 2..   mode: m one-bits (m <= 7) terminated by a zero bit
//!  next 3     fetch size f
//!  remaining  offset o
//! ```
//!
//! With `align = 4 KiB << m`, the link covers `fetch_size = (f + 1) * align`
//! bytes (plus `align << 2` for m > 0) starting at `offset = o * align`. The
//! range must end within the first 4 MiB of the upload.

use super::{ParseError, VERSION_MASK};

const MIN_ALIGNMENT: u64 = 4096;
const MAX_MODE: u32 = 7;
const MAX_RANGE_END: u64 = 1 << 22;

/// Byte range addressed by a V1 skylink.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct V1Layout {
    pub offset: u64,
    pub fetch_size: u64,
}

pub(super) fn parse_v1_bitfield(bitfield: u16) -> Result<V1Layout, ParseError> {
    let invalid = |reason| ParseError::InvalidBitfield { bitfield, reason };

    if bitfield & VERSION_MASK != 0 {
        return Err(invalid("version bits do not declare V1"));
    }

    let mut rest = bitfield >> 2;
    let mut mode = 0u32;
    while rest & 1 == 1 {
        mode += 1;
        if mode > MAX_MODE {
            return Err(invalid("mode has more than 7 bits set"));
        }
        rest >>= 1;
    }
    // terminating zero of the mode
    rest >>= 1;

    let fetch_bits = u64::from(rest & 0b111);
    let offset_bits = u64::from(rest >> 3);

    let align = MIN_ALIGNMENT << mode;
    let mut fetch_size = (fetch_bits + 1) * align;
    if mode > 0 {
        fetch_size += align << 2;
    }
    let offset = offset_bits * align;

    if offset + fetch_size > MAX_RANGE_END {
        return Err(invalid("offset and fetch size extend beyond 4 MiB"));
    }

    Ok(V1Layout { offset, fetch_size })
}
