use base64::{engine::general_purpose, Engine as _};

use crate::error::{ConfigError, Result};

/// Encodes text to Base64 over its UTF-16LE bytes.
///
/// UTF-16LE is the text encoding values were stored with by the tooling that
/// originally wrote these configuration files, so encoded values stay
/// readable by both sides.
pub fn encode_b64(input: &str) -> String {
    let bytes: Vec<u8> = input.encode_utf16().flat_map(u16::to_le_bytes).collect();
    general_purpose::STANDARD.encode(bytes)
}

/// Decodes Base64 produced by [`encode_b64`].
///
/// # Returns
/// The decoded text, or an error if the input is not Base64 or the decoded
/// bytes are not well-formed UTF-16LE.
pub fn decode_b64(input: &str) -> Result<String> {
    let bytes = general_purpose::STANDARD.decode(input.trim())?;
    if bytes.len() % 2 != 0 {
        return Err(ConfigError::InvalidText);
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).map_err(|_| ConfigError::InvalidText)
}

/// Encodes a string to Base64 over its UTF-8 bytes.
pub fn encode_b64_utf8(input: &str) -> String {
    general_purpose::STANDARD.encode(input)
}

/// Decodes a Base64 string holding UTF-8 text. Invalid sequences are replaced.
pub fn decode_b64_utf8(input: &str) -> Result<String> {
    let decoded = general_purpose::STANDARD.decode(input.trim())?;
    Ok(String::from_utf8_lossy(&decoded).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf16_known_value() {
        // "hi" as UTF-16LE is 68 00 69 00
        assert_eq!(encode_b64("hi"), "aABpAA==");
        assert_eq!(decode_b64("aABpAA==").unwrap(), "hi");
    }

    #[test]
    fn test_utf16_non_ascii() {
        let text = "Καλημέρα κόσμε";
        assert_eq!(decode_b64(&encode_b64(text)).unwrap(), text);
    }

    #[test]
    fn test_odd_byte_count_rejected() {
        // "YQ==" decodes to the single byte 0x61
        assert!(matches!(decode_b64("YQ=="), Err(ConfigError::InvalidText)));
    }

    #[test]
    fn test_invalid_base64() {
        assert!(matches!(decode_b64("not base64!"), Err(ConfigError::Base64(_))));
    }

    #[test]
    fn test_utf8_variant() {
        assert_eq!(encode_b64_utf8("hello"), "aGVsbG8=");
        assert_eq!(decode_b64_utf8("aGVsbG8=").unwrap(), "hello");
    }
}
