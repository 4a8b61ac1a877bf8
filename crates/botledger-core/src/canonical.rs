//! Canonical CBOR encoding for deterministic hashing and serialization.
//!
//! This module implements RFC 8949 Core Deterministic Encoding:
//! - Integers use smallest valid encoding
//! - Definite lengths only
//! - No floats
//!
//! The canonical encoding is critical twice over. First, it ensures the same
//! record produces identical bytes (and thus an identical hash) across all
//! platforms. Second, CBOR's length-prefixed framing makes the concatenation
//! of `(position, payload, previous_hash)` unambiguous: no two distinct field
//! combinations can collide into the same hashed bytes.

use ciborium::value::Value;

use crate::crypto::Blake3Hash;
use crate::error::CoreError;
use crate::record::Record;

/// Encode the hashed triple `[position, payload, previous_hash]` to
/// canonical CBOR bytes.
///
/// These are the exact bytes a record's hash is derived from.
pub fn canonical_parts(position: u64, payload: &[u8], previous_hash: &Blake3Hash) -> Vec<u8> {
    let mut buf = Vec::with_capacity(payload.len() + 48);
    // Array header: 3 elements
    encode_uint(&mut buf, 4, 3);
    encode_uint(&mut buf, 0, position);
    encode_bytes(&mut buf, payload);
    encode_bytes(&mut buf, &previous_hash.0);
    buf
}

/// Encode a full record to canonical bytes.
///
/// Format: definite-length array `[position, payload, previous_hash, hash]`,
/// the fixed field order the persistence boundary documents.
pub fn canonical_record_bytes(record: &Record) -> Vec<u8> {
    let mut buf = Vec::with_capacity(record.payload.len() + 80);
    encode_uint(&mut buf, 4, 4);
    encode_uint(&mut buf, 0, record.position);
    encode_bytes(&mut buf, &record.payload);
    encode_bytes(&mut buf, &record.previous_hash.0);
    encode_bytes(&mut buf, &record.hash.0);
    buf
}

/// Decode a record from canonical bytes.
///
/// The stored hash is never trusted: the hash is re-derived from the first
/// three fields and compared against the fourth. A mismatch is an error, not
/// a silently accepted record.
pub fn decode_record(bytes: &[u8]) -> Result<Record, CoreError> {
    let cursor = std::io::Cursor::new(bytes);
    let value: Value =
        ciborium::from_reader(cursor).map_err(|e| CoreError::DecodingError(e.to_string()))?;

    let fields = match value {
        Value::Array(fields) if fields.len() == 4 => fields,
        Value::Array(fields) => {
            return Err(CoreError::MalformedRecord(format!(
                "expected 4 fields, got {}",
                fields.len()
            )))
        }
        _ => return Err(CoreError::MalformedRecord("expected array".into())),
    };

    let position = match &fields[0] {
        Value::Integer(i) => {
            let n: i128 = (*i).into();
            u64::try_from(n)
                .map_err(|_| CoreError::MalformedRecord("position out of range".into()))?
        }
        _ => return Err(CoreError::MalformedRecord("invalid position".into())),
    };

    let payload = match &fields[1] {
        Value::Bytes(b) => b.clone(),
        _ => return Err(CoreError::MalformedRecord("invalid payload".into())),
    };

    let previous_hash = decode_digest(&fields[2], "previous_hash")?;
    let stored_hash = decode_digest(&fields[3], "hash")?;

    let record = Record::derive(position, payload, previous_hash);
    if record.hash != stored_hash {
        return Err(CoreError::HashMismatch {
            expected: record.hash.to_hex(),
            actual: stored_hash.to_hex(),
        });
    }

    Ok(record)
}

fn decode_digest(value: &Value, field: &str) -> Result<Blake3Hash, CoreError> {
    match value {
        Value::Bytes(b) if b.len() == 32 => {
            let mut arr = [0u8; 32];
            arr.copy_from_slice(b);
            Ok(Blake3Hash(arr))
        }
        _ => Err(CoreError::MalformedRecord(format!("invalid {}", field))),
    }
}

/// Encode an unsigned integer with the given major type.
///
/// Smallest-encoding rule per RFC 8949 deterministic encoding.
fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffffffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

/// Encode a byte string (major type 2).
fn encode_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    encode_uint(buf, 2, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_roundtrip_any_record(
            position in 0u64..=u64::MAX,
            payload in prop::collection::vec(any::<u8>(), 0..256),
            prev in any::<[u8; 32]>(),
        ) {
            let record = Record::derive(position, payload, Blake3Hash::from_bytes(prev));
            let decoded = decode_record(&canonical_record_bytes(&record)).unwrap();
            prop_assert_eq!(decoded, record);
        }

        #[test]
        fn prop_distinct_triples_encode_distinctly(
            p1 in 0u64..1000, p2 in 0u64..1000,
            b1 in prop::collection::vec(any::<u8>(), 0..64),
            b2 in prop::collection::vec(any::<u8>(), 0..64),
        ) {
            prop_assume!((p1, &b1) != (p2, &b2));
            let a = canonical_parts(p1, &b1, &Blake3Hash::ZERO);
            let b = canonical_parts(p2, &b2, &Blake3Hash::ZERO);
            prop_assert_ne!(a, b);
        }
    }

    #[test]
    fn test_canonical_parts_deterministic() {
        let prev = Blake3Hash::hash(b"prev");
        let b1 = canonical_parts(7, b"payload", &prev);
        let b2 = canonical_parts(7, b"payload", &prev);
        assert_eq!(b1, b2);
    }

    #[test]
    fn test_canonical_parts_layout() {
        // Genesis-shaped input: position 0, empty payload, zero sentinel.
        let bytes = canonical_parts(0, b"", &Blake3Hash::ZERO);

        let mut expected = vec![
            0x83, // array of 3
            0x00, // position 0
            0x40, // empty byte string
            0x58, 0x20, // 32-byte string
        ];
        expected.extend_from_slice(&[0u8; 32]);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_integer_encoding() {
        let mut buf = Vec::new();

        // 0-23: single byte
        encode_uint(&mut buf, 0, 0);
        assert_eq!(buf, vec![0x00]);

        buf.clear();
        encode_uint(&mut buf, 0, 23);
        assert_eq!(buf, vec![0x17]);

        // 24-255: two bytes
        buf.clear();
        encode_uint(&mut buf, 0, 24);
        assert_eq!(buf, vec![0x18, 24]);

        // 256-65535: three bytes
        buf.clear();
        encode_uint(&mut buf, 0, 256);
        assert_eq!(buf, vec![0x19, 0x01, 0x00]);

        // Above 2^32: nine bytes
        buf.clear();
        encode_uint(&mut buf, 0, 1 << 40);
        assert_eq!(buf, vec![0x1b, 0, 0, 0x01, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_framing_is_unambiguous() {
        // The collision risk the design calls out: moving a boundary byte
        // from the end of the payload into the next field must change the
        // encoded bytes. With naive string concatenation these two inputs
        // would collide.
        let mut prev_a = [0u8; 32];
        prev_a[0] = 0xaa;
        let a = canonical_parts(1, b"xy", &Blake3Hash::from_bytes(prev_a));

        let mut prev_b = [0u8; 32];
        prev_b[0] = 0xaa;
        let b = canonical_parts(1, b"x", &Blake3Hash::from_bytes(prev_b));
        assert_ne!(a, b);

        // Likewise for position digits bleeding into the payload.
        let c = canonical_parts(12, b"3", &Blake3Hash::ZERO);
        let d = canonical_parts(1, b"23", &Blake3Hash::ZERO);
        assert_ne!(c, d);
    }

    #[test]
    fn test_record_roundtrip() {
        let record = Record::derive(3, Bytes::from_static(b"hello world"), Blake3Hash::hash(b"p"));
        let bytes = canonical_record_bytes(&record);
        let decoded = decode_record(&bytes).unwrap();

        assert_eq!(decoded.position, record.position);
        assert_eq!(decoded.payload, record.payload);
        assert_eq!(decoded.previous_hash, record.previous_hash);
        assert_eq!(decoded.hash, record.hash);
    }

    #[test]
    fn test_decode_rejects_tampered_hash() {
        let record = Record::derive(0, Bytes::from_static(b"data"), Blake3Hash::ZERO);
        let mut bytes = canonical_record_bytes(&record);

        // Flip a bit in the trailing stored hash.
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;

        let result = decode_record(&bytes);
        assert!(matches!(result, Err(CoreError::HashMismatch { .. })));
    }

    #[test]
    fn test_decode_rejects_tampered_payload() {
        let record = Record::derive(0, Bytes::from_static(b"data"), Blake3Hash::ZERO);
        let mut bytes = canonical_record_bytes(&record);

        // Payload starts after the array header and position byte; the
        // byte-string header is 1 byte for a 4-byte payload.
        bytes[3] ^= 0x01;

        let result = decode_record(&bytes);
        assert!(matches!(result, Err(CoreError::HashMismatch { .. })));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_record(b"not cbor at all").is_err());
        assert!(decode_record(&[0x82, 0x00, 0x40]).is_err()); // 2-element array
    }
}
