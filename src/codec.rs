//! Reversible credential obfuscation used by the NGW project feed.
//!
//! A hash is a run of 4-digit hex chunks. Decoding with key `version`:
//!
//! 1. parse every chunk and subtract `version` from it;
//! 2. rotate the sequence right by `version` positions;
//! 3. pop the first element as the plaintext length;
//! 4. map the next `length` elements to characters by codepoint.
//!
//! This is obfuscation, not encryption. The scheme must stay byte-compatible
//! with hashes already stored by the remote service.

use std::collections::VecDeque;

/// Width of one encoded element, in hex digits.
const CHUNK_WIDTH: usize = 4;

/// Largest value one chunk can hold.
const CHUNK_MAX: i64 = 0xFFFF;

/// Encoded sequences shorter than this are padded with filler chunks.
const MIN_CHUNKS: usize = 16;

/// Errors produced while decoding or encoding an obfuscated credential.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("hash length {0} is not a multiple of {CHUNK_WIDTH}")]
    InvalidLength(usize),
    #[error("hash chunk {0:?} is not hexadecimal")]
    InvalidChunk(String),
    #[error("hash declares a negative length {0}")]
    NegativeLength(i64),
    #[error("hash value {0} is not a valid character")]
    InvalidCodepoint(i64),
    #[error("value {0} does not fit in a hash chunk")]
    Unencodable(i64),
}

/// Decode `hash` into the plaintext password using `version` as the key.
///
/// An empty hash decodes to an empty string. A declared length longer than
/// the remaining sequence is truncated to what is available.
pub fn decode(hash: &str, version: u32) -> Result<String, CodecError> {
    if hash.is_empty() {
        return Ok(String::new());
    }
    if hash.len() % CHUNK_WIDTH != 0 {
        return Err(CodecError::InvalidLength(hash.len()));
    }

    let offset = i64::from(version);
    let mut values = hash
        .as_bytes()
        .chunks(CHUNK_WIDTH)
        .map(|chunk| parse_chunk(chunk).map(|v| v - offset))
        .collect::<Result<VecDeque<i64>, CodecError>>()?;

    // Rotating n times is the identity, so only the remainder matters.
    let shift = version as usize % values.len();
    values.rotate_right(shift);

    let Some(length) = values.pop_front() else {
        return Ok(String::new());
    };
    let length = usize::try_from(length).map_err(|_| CodecError::NegativeLength(length))?;

    values
        .into_iter()
        .take(length)
        .map(|v| {
            u32::try_from(v)
                .ok()
                .and_then(char::from_u32)
                .ok_or(CodecError::InvalidCodepoint(v))
        })
        .collect()
}

/// Encode `password` so that [`decode`] with the same `version` returns it.
///
/// Short passwords are padded with random filler chunks after the payload so
/// the hash length does not reveal the password length.
pub fn encode(password: &str, version: u32) -> Result<String, CodecError> {
    let mut values: VecDeque<i64> = password.chars().map(|c| i64::from(u32::from(c))).collect();
    values.push_front(values.len() as i64);

    let mut filler = Vec::new();
    while values.len() + filler.len() < MIN_CHUNKS {
        filler.extend(uuid::Uuid::new_v4().as_bytes().iter().map(|b| 0x21 + i64::from(b % 94)));
    }
    let missing = MIN_CHUNKS.saturating_sub(values.len());
    values.extend(filler.into_iter().take(missing));

    let shift = version as usize % values.len();
    values.rotate_left(shift);

    let offset = i64::from(version);
    let mut hash = String::with_capacity(values.len() * CHUNK_WIDTH);
    for value in values {
        let shifted = value + offset;
        if shifted > CHUNK_MAX {
            return Err(CodecError::Unencodable(shifted));
        }
        hash.push_str(&format!("{shifted:04x}"));
    }
    Ok(hash)
}

fn parse_chunk(chunk: &[u8]) -> Result<i64, CodecError> {
    let invalid = || CodecError::InvalidChunk(String::from_utf8_lossy(chunk).into_owned());
    if !chunk.iter().all(u8::is_ascii_hexdigit) {
        return Err(invalid());
    }
    let text = std::str::from_utf8(chunk).map_err(|_| invalid())?;
    i64::from_str_radix(text, 16).map_err(|_| invalid())
}
