//! Canonical hashing for LedgerChain
//!
//! Every value is reduced to one canonical JSON text before hashing: map keys
//! are sorted, items are separated by `", "`, keys by `": "`, and non-ASCII
//! characters (and DEL) are written as lowercase `\uXXXX` escapes. Chains
//! exchanged as JSON text therefore hash identically no matter which tool wrote
//! them, as long as it emits this layout.

use crate::error::{ChainError, Result};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;
use std::io;
use std::str::FromStr;

/// Length of a fingerprint in bytes.
pub const FINGERPRINT_LEN: usize = 32;

/// SHA-256 digest of a canonicalized value, as 64 lowercase hex characters.
///
/// A fingerprint read from the wire keeps its text exactly as received, so a
/// block naming its parent by malformed or upper-case text still hashes the way
/// its producer hashed it and simply fails to match. Parsing with [`FromStr`]
/// is strict and accepts only the canonical form.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Fingerprint({})", self.0)
    }
}

impl FromStr for Fingerprint {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self> {
        if s.len() != FINGERPRINT_LEN * 2 {
            return Err(ChainError::SerializationError(format!(
                "Fingerprint must be {} hex digits, got {}",
                FINGERPRINT_LEN * 2,
                s.len()
            )));
        }
        if !s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(ChainError::SerializationError(format!(
                "Fingerprint must be lowercase hex: {:?}",
                s
            )));
        }
        Ok(Fingerprint(s.to_string()))
    }
}

/// Spaced separators, ASCII-only output.
struct CanonicalFormatter;

impl serde_json::ser::Formatter for CanonicalFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if fragment.bytes().all(is_printable_ascii) {
            return writer.write_all(fragment.as_bytes());
        }
        let mut units = [0u16; 2];
        for c in fragment.chars() {
            if c.is_ascii() && is_printable_ascii(c as u8) {
                writer.write_all(&[c as u8])?;
            } else {
                for unit in c.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}

fn is_printable_ascii(b: u8) -> bool {
    (0x20..0x7f).contains(&b)
}

/// Canonical byte form of `value`.
///
/// The value goes through `serde_json::Value` first; its object map is ordered
/// by key, which gives the sorted-key layout regardless of how the caller's
/// maps are ordered. Maps whose keys are neither strings nor integers cannot be
/// canonicalized and yield `SerializationError`.
pub fn canonical_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let value = serde_json::to_value(value)
        .map_err(|e| ChainError::SerializationError(e.to_string()))?;
    let mut out = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, CanonicalFormatter);
    value
        .serialize(&mut serializer)
        .map_err(|e| ChainError::SerializationError(e.to_string()))?;
    Ok(out)
}

/// Fingerprint of any serializable value.
pub fn fingerprint<T: Serialize + ?Sized>(value: &T) -> Result<Fingerprint> {
    let bytes = canonical_bytes(value)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(Fingerprint(hex::encode(hasher.finalize())))
}
