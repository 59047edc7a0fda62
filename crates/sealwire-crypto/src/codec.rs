//! Structural encoding (MessagePack) and compression (gzip)

use crate::{CryptoError, Result};
use flate2::{Compression, read::GzDecoder, write::GzEncoder};
use serde::{Serialize, de::DeserializeOwned};
use std::io::{Read, Write};

/// Highest gzip compression level
pub const MAX_COMPRESSION_LEVEL: u32 = 9;

/// Encode any serializable value as MessagePack, maps keyed by field name
pub fn pack<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    rmp_serde::to_vec_named(value).map_err(|e| CryptoError::Serialization(e.to_string()))
}

/// Decode a MessagePack document
pub fn unpack<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    rmp_serde::from_slice(bytes).map_err(|e| CryptoError::Serialization(e.to_string()))
}

/// Gzip `data` at `level` (0 to 9)
pub fn compress(data: &[u8], level: u32) -> Result<Vec<u8>> {
    let level = level.min(MAX_COMPRESSION_LEVEL);
    let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2), Compression::new(level));
    encoder
        .write_all(data)
        .map_err(|e| CryptoError::Compression(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| CryptoError::Compression(e.to_string()))
}

/// Gunzip `data`, refusing to inflate past `max_size` bytes
pub fn decompress(data: &[u8], max_size: usize) -> Result<Vec<u8>> {
    let limit = (max_size as u64).saturating_add(1);
    let mut out = Vec::new();
    GzDecoder::new(data)
        .take(limit)
        .read_to_end(&mut out)
        .map_err(|e| CryptoError::Compression(e.to_string()))?;
    if out.len() > max_size {
        return Err(CryptoError::DataTooLarge {
            size: out.len() as u64,
            max: max_size as u64,
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::BTreeMap;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Login {
        user: String,
        attempts: u32,
        tags: Vec<String>,
    }

    #[test]
    fn test_pack_uses_field_names() {
        let login = Login {
            user: "ada".to_string(),
            attempts: 3,
            tags: vec!["admin".to_string()],
        };
        let packed = pack(&login).unwrap();

        let as_map: BTreeMap<String, serde_json::Value> = unpack(&packed).unwrap();
        assert_eq!(as_map["user"], "ada");
        assert_eq!(as_map["attempts"], 3);

        let back: Login = unpack(&packed).unwrap();
        assert_eq!(back, login);
    }

    #[test]
    fn test_unpack_garbage() {
        let result: Result<Login> = unpack(&[0xc1]);
        assert!(matches!(result, Err(CryptoError::Serialization(_))));
    }

    #[test]
    fn test_compress_roundtrip() {
        let data = b"aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa".repeat(100);
        let compressed = compress(&data, MAX_COMPRESSION_LEVEL).unwrap();
        assert!(compressed.len() < data.len());
        assert_eq!(&compressed[..2], &[0x1f, 0x8b]);
        assert_eq!(decompress(&compressed, data.len()).unwrap(), data);
    }

    #[test]
    fn test_compression_is_deterministic() {
        let data = b"same input, same output".repeat(10);
        assert_eq!(compress(&data, 9).unwrap(), compress(&data, 9).unwrap());
    }

    #[test]
    fn test_decompress_limit() {
        let data = vec![0u8; 10_000];
        let compressed = compress(&data, MAX_COMPRESSION_LEVEL).unwrap();
        let result = decompress(&compressed, 9_999);
        assert!(matches!(result, Err(CryptoError::DataTooLarge { max: 9_999, .. })));
    }

    #[test]
    fn test_decompress_garbage() {
        assert!(matches!(
            decompress(b"definitely not gzip", 1024),
            Err(CryptoError::Compression(_))
        ));
    }
}
