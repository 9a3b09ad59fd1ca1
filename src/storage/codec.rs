use bincode::{config, decode_from_slice, encode_to_vec, Decode, Encode};

use super::StorageError;

/// Encode a record with the standard bincode configuration
pub fn encode<T: Encode>(value: &T) -> Result<Vec<u8>, StorageError> {
    Ok(encode_to_vec(value, config::standard())?)
}

/// Decode a record written by [`encode`]
pub fn decode<T: Decode<()>>(bytes: &[u8]) -> Result<T, StorageError> {
    let (value, _) = decode_from_slice(bytes, config::standard())?;
    Ok(value)
}

/// Big-endian u64 so that byte order matches numeric order in scans
pub fn u64_key(value: u64) -> [u8; 8] {
    value.to_be_bytes()
}

/// Read a big-endian u64 out of `bytes` at `offset`
pub fn read_u64(bytes: &[u8], offset: usize) -> Result<u64, StorageError> {
    bytes
        .get(offset..offset + 8)
        .and_then(|slice| <[u8; 8]>::try_from(slice).ok())
        .map(u64::from_be_bytes)
        .ok_or_else(|| StorageError::CorruptKey(hex::encode(bytes)))
}
