//! Text codes: a checksummed, hyphenated base-36 rendering of an [`Identity`].
//!
//! ## Wire layout
//!
//! Before rendering, an identity is packed big-endian into 12 bytes:
//!
//! ```text
//! [kind:1][difficulty:1][seed:8][checksum:2]
//! ```
//!
//! The checksum is the low 16 bits of the CRC-32 of all 12 bytes with the
//! checksum field zeroed. The buffer is read as one unsigned integer, written
//! in base 36, and split into hyphen-separated groups of four. Lowercase `l`
//! is printed as `L` so it cannot be mistaken for `1`; input is
//! case-insensitive.
//!
//! Codes minted before difficulty existed use an 11-byte layout without the
//! difficulty byte. [`decode`] still accepts them (difficulty reads as 0);
//! [`encode`] always writes the 12-byte layout.

use tracing::debug;

use crate::exercise_engine::{
    error::{Error, Result},
    models::Identity,
};

/// Width of the current layout in bytes.
pub const CODE_BYTES: usize = 12;
/// Width of the layout without a difficulty byte.
pub const LEGACY_CODE_BYTES: usize = 11;
/// Characters per hyphen-separated group.
pub const GROUP_LEN: usize = 4;

const RADIX: u32 = 36;

/// Which byte layout a decoded code matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `[kind][difficulty][seed][checksum]`
    Current,
    /// `[kind][seed][checksum]`
    Legacy,
}

impl Layout {
    fn width(self) -> usize {
        match self {
            Layout::Current => CODE_BYTES,
            Layout::Legacy  => LEGACY_CODE_BYTES,
        }
    }
}

/// Low 16 bits of the CRC-32 of `buf` with its trailing checksum field zeroed.
fn checksum(buf: &[u8]) -> u16 {
    let mut work = buf.to_vec();
    let n = work.len();
    work[n - 2..].fill(0);
    (crc32fast::hash(&work) & 0xFFFF) as u16
}

/// Pack an identity into the current 12-byte layout, checksum included.
pub fn to_bytes(id: &Identity) -> [u8; CODE_BYTES] {
    let mut buf = [0u8; CODE_BYTES];
    buf[0] = id.kind();
    buf[1] = id.difficulty() as u8;
    buf[2..10].copy_from_slice(&id.seed().to_be_bytes());
    let sum = checksum(&buf);
    buf[10..].copy_from_slice(&sum.to_be_bytes());
    buf
}

/// Render an identity as its canonical text code, e.g. `136u-ptxo-3qcm-e0zy-ev`.
pub fn encode(id: &Identity) -> String {
    let mut wide = [0u8; 16];
    wide[16 - CODE_BYTES..].copy_from_slice(&to_bytes(id));
    let mut value = u128::from_be_bytes(wide);

    let mut digits: Vec<char> = Vec::new();
    loop {
        let d = (value % RADIX as u128) as u32;
        digits.push(render_digit(d));
        value /= RADIX as u128;
        if value == 0 {
            break;
        }
    }
    digits.reverse();

    digits
        .chunks(GROUP_LEN)
        .map(|group| group.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("-")
}

fn render_digit(d: u32) -> char {
    match char::from_digit(d, RADIX) {
        Some('l') => 'L',
        Some(c)   => c,
        None      => unreachable!("digit {d} is below the radix"),
    }
}

/// Parse a text code back into its identity.
///
/// Hyphens are ignored and letters may be in any case. Fails with
/// [`Error::Format`] for characters outside `0-9a-zA-Z-`, with
/// [`Error::Overflow`] when the value is wider than [`CODE_BYTES`], and with
/// [`Error::Checksum`] when no layout's checksum matches.
pub fn decode(text: &str) -> Result<Identity> {
    let value = parse_base36(text)?;
    decode_value(value).map(|(id, _)| id)
}

/// Like [`decode`], also reporting which layout matched.
pub fn decode_with_layout(text: &str) -> Result<(Identity, Layout)> {
    decode_value(parse_base36(text)?)
}

fn parse_base36(text: &str) -> Result<u128> {
    let trimmed = text.trim();
    let mut value: u128 = 0;
    let mut seen = 0usize;
    for c in trimmed.chars().filter(|&c| c != '-') {
        let d = c
            .to_digit(RADIX)
            .ok_or_else(|| Error::Format(format!("unexpected character {c:?} in {trimmed:?}")))?;
        seen += 1;
        value = value
            .checked_mul(RADIX as u128)
            .and_then(|v| v.checked_add(d as u128))
            .ok_or(Error::Overflow { bytes: 17, max: CODE_BYTES })?;
    }
    if seen == 0 {
        return Err(Error::Format("empty exercise code".to_string()));
    }
    Ok(value)
}

fn byte_len(value: u128) -> usize {
    (128 - value.leading_zeros() as usize).div_ceil(8)
}

fn decode_value(value: u128) -> Result<(Identity, Layout)> {
    let bytes = byte_len(value);
    if bytes > CODE_BYTES {
        return Err(Error::Overflow { bytes, max: CODE_BYTES });
    }

    let wide = value.to_be_bytes();
    let current = &wide[16 - CODE_BYTES..];
    let stored = u16::from_be_bytes([current[10], current[11]]);
    let computed = checksum(current);
    if stored == computed {
        let seed = be_i64(&current[2..10]);
        let id = identity_from_fields(current[0], current[1] as i8, seed)?;
        debug!(kind = id.kind(), difficulty = id.difficulty(), "decoded exercise code");
        return Ok((id, Layout::Current));
    }

    if bytes <= Layout::Legacy.width() {
        let legacy = &wide[16 - LEGACY_CODE_BYTES..];
        let legacy_stored = u16::from_be_bytes([legacy[9], legacy[10]]);
        if legacy_stored == checksum(legacy) {
            let seed = be_i64(&legacy[1..9]);
            let id = identity_from_fields(legacy[0], 0, seed)?;
            debug!(kind = id.kind(), "decoded exercise code in legacy layout");
            return Ok((id, Layout::Legacy));
        }
    }

    Err(Error::Checksum { stored, computed })
}

fn be_i64(bytes: &[u8]) -> i64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(bytes);
    i64::from_be_bytes(raw)
}

fn identity_from_fields(kind: u8, difficulty: i8, seed: i64) -> Result<Identity> {
    Identity::new(kind, difficulty, seed)
        .map_err(|_| Error::Format(format!("kind byte {kind} is out of range")))
}
