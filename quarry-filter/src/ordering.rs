//! Total ordering over canonically encoded BSON values.
//!
//! Every [`Bson`] value has a deterministic element encoding (type byte plus
//! body). Comparing those bytes gives a total order that is consistent across
//! processes, which is what equality of filter payloads and deterministic
//! sorting of arbitrary stored values rely on.
//!
//! The order is purely byte-wise: values of different types order by their
//! type byte, and values of the same type order by their little-endian body.
//! It is not MongoDB's comparison/sort order.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use bson::{Bson, Document};

use crate::document::encode_element;
use crate::error::FilterResult;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Canonical byte encoding of a single value.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Encode a BSON value.
    pub fn encode(value: &Bson) -> FilterResult<Self> {
        encode_element(value).map(Self)
    }

    /// Wrap an already-encoded byte sequence.
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }

    /// Borrow the encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume into the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Number of encoded bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check whether the sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check whether `self` orders strictly before `other`.
    pub fn less_than(&self, other: &Self) -> bool {
        less_than(&self.0, &other.0)
    }

    /// Check whether `self` orders strictly after `other`.
    pub fn greater_than(&self, other: &Self) -> bool {
        greater_than(&self.0, &other.0)
    }

    /// 64-bit FNV-1a digest over every byte.
    ///
    /// The empty sequence yields the FNV offset basis.
    pub fn fingerprint(&self) -> u64 {
        fingerprint(&self.0)
    }
}

/// Byte-wise less-than with the prefix rule.
///
/// The first differing byte decides; if one sequence is a strict prefix of
/// the other, the shorter one is less.
pub fn less_than(lhs: &[u8], rhs: &[u8]) -> bool {
    for (a, b) in lhs.iter().zip(rhs) {
        if a != b {
            return a < b;
        }
    }
    lhs.len() < rhs.len()
}

/// Byte-wise greater-than, defined as `less_than` with the operands swapped.
pub fn greater_than(lhs: &[u8], rhs: &[u8]) -> bool {
    less_than(rhs, lhs)
}

/// 64-bit FNV-1a over every byte of the sequence.
pub fn fingerprint(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Order two values by their canonical encodings.
///
/// Values that cannot be encoded sort before every encodable value.
pub fn compare_values(lhs: &Bson, rhs: &Bson) -> Ordering {
    match (CanonicalBytes::encode(lhs), CanonicalBytes::encode(rhs)) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        (Err(_), Ok(_)) => Ordering::Less,
        (Ok(_), Err(_)) => Ordering::Greater,
        (Err(_), Err(_)) => Ordering::Equal,
    }
}

/// Compare two values for equality by their canonical encodings.
///
/// Falls back to structural equality when either value cannot be encoded.
/// The fallback compares doubles by bit pattern, so it stays reflexive.
pub fn values_equal(lhs: &Bson, rhs: &Bson) -> bool {
    match (CanonicalBytes::encode(lhs), CanonicalBytes::encode(rhs)) {
        (Ok(a), Ok(b)) => a == b,
        _ => structurally_equal(lhs, rhs),
    }
}

fn structurally_equal(lhs: &Bson, rhs: &Bson) -> bool {
    match (lhs, rhs) {
        (Bson::Double(a), Bson::Double(b)) => a.to_bits() == b.to_bits(),
        (Bson::Array(a), Bson::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| structurally_equal(x, y))
        }
        (Bson::Document(a), Bson::Document(b)) => documents_equal(a, b),
        (Bson::JavaScriptCodeWithScope(a), Bson::JavaScriptCodeWithScope(b)) => {
            a.code == b.code && documents_equal(&a.scope, &b.scope)
        }
        _ => lhs == rhs,
    }
}

fn documents_equal(a: &Document, b: &Document) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b)
            .all(|((ka, va), (kb, vb))| ka == kb && structurally_equal(va, vb))
}

impl PartialOrd for CanonicalBytes {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CanonicalBytes {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.less_than(other) {
            Ordering::Less
        } else if self.greater_than(other) {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }
}

impl Hash for CanonicalBytes {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.fingerprint());
        state.write_usize(self.0.len());
    }
}

impl From<Vec<u8>> for CanonicalBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for CanonicalBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CanonicalBytes(")?;
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        write!(f, ")")
    }
}
