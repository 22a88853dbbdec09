//! # Minimal ABI Codec
//!
//! Just enough of the Solidity ABI to read zero-argument view functions:
//! 4-byte selectors, single `uint256` and `address` return words, fixed-point
//! formatting, and EIP-55 address checksums.

use sha3::{Digest, Keccak256};
use std::fmt;

use crate::error::ContractError;

/// Size of one ABI word in bytes.
pub const WORD_LEN: usize = 32;

/// Size of an Ethereum address in bytes.
pub const ADDRESS_LEN: usize = 20;

/// Keccak-256 of `input`.
pub fn keccak256(input: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Keccak256::digest(input));
    out
}

/// Function selector for a canonical signature such as `"vaultOunces()"`.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Decodes `0x`-prefixed (or bare) hex into bytes.
pub fn decode_hex(data: &str) -> Result<Vec<u8>, ContractError> {
    let stripped = data.strip_prefix("0x").unwrap_or(data);
    hex::decode(stripped).map_err(|e| ContractError::Decode(format!("invalid hex: {e}")))
}

/// Takes the first return word of a call result.
fn first_word(data: &[u8]) -> Result<&[u8; WORD_LEN], ContractError> {
    data.get(..WORD_LEN)
        .and_then(|w| w.try_into().ok())
        .ok_or_else(|| {
            ContractError::Decode(format!(
                "expected at least {WORD_LEN} bytes, got {}",
                data.len()
            ))
        })
}

// ---------------------------------------------------------------------------
// uint256
// ---------------------------------------------------------------------------

/// An unsigned 256-bit integer, stored big-endian as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Uint256([u8; WORD_LEN]);

impl Uint256 {
    pub const ZERO: Uint256 = Uint256([0u8; WORD_LEN]);

    pub fn from_be_bytes(bytes: [u8; WORD_LEN]) -> Self {
        Self(bytes)
    }

    pub fn to_be_bytes(self) -> [u8; WORD_LEN] {
        self.0
    }

    /// Decodes the first return word.
    pub fn decode(data: &[u8]) -> Result<Self, ContractError> {
        Ok(Self(*first_word(data)?))
    }

    /// Base-10 digits, no leading zeros.
    pub fn to_decimal_string(&self) -> String {
        let mut limbs = [0u64; 4];
        for (limb, chunk) in limbs.iter_mut().zip(self.0.chunks_exact(8)) {
            *limb = u64::from_be_bytes(chunk.try_into().unwrap_or_default());
        }

        if limbs == [0; 4] {
            return "0".to_string();
        }

        // Schoolbook long division by 10, most significant limb first.
        let mut digits = Vec::with_capacity(78);
        while limbs != [0; 4] {
            let mut rem: u128 = 0;
            for limb in limbs.iter_mut() {
                let cur = (rem << 64) | u128::from(*limb);
                *limb = (cur / 10) as u64;
                rem = cur % 10;
            }
            digits.push(char::from(b'0' + rem as u8));
        }
        digits.iter().rev().collect()
    }

    /// Renders the value as a fixed-point decimal with `decimals` places.
    pub fn format_units(&self, decimals: u32) -> String {
        format_units(&self.to_decimal_string(), decimals)
    }
}

impl From<u128> for Uint256 {
    fn from(value: u128) -> Self {
        let mut bytes = [0u8; WORD_LEN];
        bytes[16..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }
}

impl fmt::Display for Uint256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal_string())
    }
}

/// Places a decimal point `decimals` digits from the right of `digits`.
///
/// Trailing fractional zeros are dropped but one fractional digit is always
/// kept: `("0", 18)` is `"0.0"`, `("1500000000000000000", 18)` is `"1.5"`.
pub fn format_units(digits: &str, decimals: u32) -> String {
    let decimals = decimals as usize;
    let padded = if digits.len() <= decimals {
        format!("{}{}", "0".repeat(decimals + 1 - digits.len()), digits)
    } else {
        digits.to_string()
    };

    let (int_part, frac_part) = padded.split_at(padded.len() - decimals);
    let frac = frac_part.trim_end_matches('0');
    let frac = if frac.is_empty() { "0" } else { frac };
    format!("{int_part}.{frac}")
}

// ---------------------------------------------------------------------------
// address
// ---------------------------------------------------------------------------

/// Decodes an `address` return word into its EIP-55 checksummed form.
pub fn decode_address(data: &[u8]) -> Result<String, ContractError> {
    let word = first_word(data)?;
    let (padding, addr) = word.split_at(WORD_LEN - ADDRESS_LEN);
    if padding.iter().any(|b| *b != 0) {
        return Err(ContractError::Decode(
            "address word has non-zero padding".to_string(),
        ));
    }
    let mut bytes = [0u8; ADDRESS_LEN];
    bytes.copy_from_slice(addr);
    Ok(to_checksum_address(&bytes))
}

/// Parses a `0x`-prefixed hex address (any case) into bytes.
pub fn parse_address(address: &str) -> Result<[u8; ADDRESS_LEN], ContractError> {
    let stripped = address
        .strip_prefix("0x")
        .ok_or_else(|| ContractError::InvalidAddress(format!("{address}: missing 0x prefix")))?;
    let bytes = hex::decode(stripped)
        .map_err(|e| ContractError::InvalidAddress(format!("{address}: {e}")))?;
    bytes
        .try_into()
        .map_err(|b: Vec<u8>| ContractError::InvalidAddress(format!("{address}: {} bytes", b.len())))
}

/// EIP-55 mixed-case checksum encoding.
pub fn to_checksum_address(address: &[u8; ADDRESS_LEN]) -> String {
    let lower = hex::encode(address);
    let hash = keccak256(lower.as_bytes());

    let mut out = String::with_capacity(2 + 2 * ADDRESS_LEN);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = (hash[i / 2] >> (if i % 2 == 0 { 4 } else { 0 })) & 0x0f;
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_selectors() {
        // Well-known ERC-20 selectors pin the Keccak variant (not SHA3-256).
        assert_eq!(hex::encode(selector("totalSupply()")), "18160ddd");
        assert_eq!(hex::encode(selector("decimals()")), "313ce567");
        assert_eq!(hex::encode(selector("balanceOf(address)")), "70a08231");
    }

    #[test]
    fn test_decimal_string() {
        assert_eq!(Uint256::ZERO.to_decimal_string(), "0");
        assert_eq!(Uint256::from(1u128).to_decimal_string(), "1");
        assert_eq!(
            Uint256::from(u128::MAX).to_decimal_string(),
            "340282366920938463463374607431768211455"
        );
        assert_eq!(
            Uint256::from_be_bytes([0xff; 32]).to_decimal_string(),
            "115792089237316195423570985008687907853269984665640564039457584007913129639935"
        );
    }

    #[test]
    fn test_format_units() {
        assert_eq!(format_units("0", 18), "0.0");
        assert_eq!(format_units("1000000000000000000", 18), "1.0");
        assert_eq!(format_units("1500000000000000000", 18), "1.5");
        assert_eq!(format_units("1", 18), "0.000000000000000001");
        assert_eq!(format_units("123456789000000000000000", 18), "123456.789");
        assert_eq!(format_units("42", 0), "42.0");
    }

    #[test]
    fn test_decode_uint_word() {
        let mut word = [0u8; 32];
        word[31] = 0x2a;
        assert_eq!(Uint256::decode(&word).unwrap().to_decimal_string(), "42");
    }

    #[test]
    fn test_decode_rejects_short_data() {
        assert!(matches!(Uint256::decode(&[]), Err(ContractError::Decode(_))));
        assert!(matches!(Uint256::decode(&[0u8; 31]), Err(ContractError::Decode(_))));
    }

    #[test]
    fn test_checksum_vectors() {
        // Reference vectors from EIP-55.
        for expected in [
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
            "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
            "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
        ] {
            let bytes = parse_address(expected).unwrap();
            assert_eq!(to_checksum_address(&bytes), expected);
        }
    }

    #[test]
    fn test_decode_address_word() {
        let bytes = parse_address("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").unwrap();
        let mut word = [0u8; 32];
        word[12..].copy_from_slice(&bytes);
        assert_eq!(
            decode_address(&word).unwrap(),
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
        );

        word[0] = 1;
        assert!(decode_address(&word).is_err());
    }

    #[test]
    fn test_parse_address_errors() {
        assert!(parse_address("5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").is_err());
        assert!(parse_address("0x1234").is_err());
        assert!(parse_address("0xzz").is_err());
    }

    #[test]
    fn test_decode_hex() {
        assert_eq!(decode_hex("0x").unwrap(), Vec::<u8>::new());
        assert_eq!(decode_hex("0x0a0b").unwrap(), vec![10, 11]);
        assert!(decode_hex("0xabc").is_err());
    }
}
