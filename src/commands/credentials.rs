//! Password obfuscation commands.

use crate::codec;
use crate::error::AppError;

/// Decode `hash` with key `version`.
pub fn decode_inner(hash: &str, version: u32) -> Result<String, AppError> {
    Ok(codec::decode(hash.trim(), version)?)
}

/// Encode `password` with key `version`.
pub fn encode_inner(password: &str, version: u32) -> Result<String, AppError> {
    Ok(codec::encode(password, version)?)
}
