//! Address parsing, hex quantities and just enough ABI plumbing for the
//! contract calls this app issues. Not a general codec.

use alloy_primitives::{keccak256, Address, Bytes, U256};
use thiserror::Error as ThisError;

/// Address did not match the `0x` + 40 hex digits wire format.
#[derive(Debug, ThisError, PartialEq, Eq)]
#[error("invalid address: must be a 0x-prefixed 40-hex-digit string")]
pub struct InvalidAddress;

/// Strict form of the address format check used at trust boundaries:
/// exactly 42 characters, `0x`-prefixed, hex.
pub fn parse_address(s: &str) -> Result<Address, InvalidAddress> {
    if s.len() != 42 || !s.starts_with("0x") {
        return Err(InvalidAddress);
    }
    let mut out = [0u8; 20];
    hex::decode_to_slice(&s[2..], &mut out).map_err(|_| InvalidAddress)?;
    Ok(Address::from(out))
}

#[derive(Debug, ThisError)]
pub enum HexError {
    #[error("hex value must be 0x-prefixed: {0}")]
    MissingPrefix(String),
    #[error(transparent)]
    Hex(#[from] hex::FromHexError),
    #[error(transparent)]
    Uint(#[from] std::num::ParseIntError),
}

/// Encode a `u64` as a JSON-RPC quantity (`0x`-prefixed, no leading zeros).
pub fn to_quantity(value: u64) -> String {
    format!("{value:#x}")
}

pub fn parse_quantity(s: &str) -> Result<u64, HexError> {
    let digits = s
        .strip_prefix("0x")
        .ok_or_else(|| HexError::MissingPrefix(s.to_owned()))?;
    Ok(u64::from_str_radix(digits, 16)?)
}

pub fn parse_hex_data(s: &str) -> Result<Vec<u8>, HexError> {
    let digits = s
        .strip_prefix("0x")
        .ok_or_else(|| HexError::MissingPrefix(s.to_owned()))?;
    Ok(hex::decode(digits)?)
}

/// First four bytes of the keccak-256 hash of a function signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Call arguments supported by [`encode_call`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiToken {
    Address(Address),
    Uint(U256),
    Bytes(Vec<u8>),
}

/// Standard ABI encoding of a function call. `bytes` arguments get the usual
/// head/tail split: the head slot holds the offset into the argument section,
/// the tail holds length plus right-padded data.
pub fn encode_call(selector: [u8; 4], tokens: &[AbiToken]) -> Bytes {
    let head_len = tokens.len() * 32;
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();
    for token in tokens {
        match token {
            AbiToken::Address(address) => head.extend_from_slice(&address_word(*address)),
            AbiToken::Uint(value) => head.extend_from_slice(&value.to_be_bytes::<32>()),
            AbiToken::Bytes(data) => {
                let offset = U256::from(head_len + tail.len());
                head.extend_from_slice(&offset.to_be_bytes::<32>());
                tail.extend_from_slice(&U256::from(data.len()).to_be_bytes::<32>());
                tail.extend_from_slice(data);
                tail.resize(tail.len() + (32 - data.len() % 32) % 32, 0);
            }
        }
    }
    let mut out = Vec::with_capacity(4 + head.len() + tail.len());
    out.extend_from_slice(&selector);
    out.extend_from_slice(&head);
    out.extend_from_slice(&tail);
    Bytes::from(out)
}

fn address_word(address: Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_slice());
    word
}

#[derive(Debug, ThisError, PartialEq, Eq)]
#[error("return data too short: expected at least {expected} bytes, got {got}")]
pub struct ShortReturnData {
    pub expected: usize,
    pub got: usize,
}

/// Decode the first return word as an address.
pub fn decode_address(data: &[u8]) -> Result<Address, ShortReturnData> {
    let word = first_word(data)?;
    Ok(Address::from_slice(&word[12..]))
}

/// Decode the first return word as a `uint256`.
pub fn decode_uint(data: &[u8]) -> Result<U256, ShortReturnData> {
    Ok(U256::from_be_bytes::<32>(first_word(data)?))
}

fn first_word(data: &[u8]) -> Result<[u8; 32], ShortReturnData> {
    if data.len() < 32 {
        return Err(ShortReturnData {
            expected: 32,
            got: data.len(),
        });
    }
    let mut word = [0u8; 32];
    word.copy_from_slice(&data[..32]);
    Ok(word)
}

/// Human display of a base-unit token amount, truncated to
/// `display_decimals` fractional digits.
pub fn format_units(amount: U256, decimals: u32, display_decimals: u32) -> String {
    let display_decimals = display_decimals.min(decimals);
    let base = U256::from(10u8).pow(U256::from(decimals));
    let int = amount / base;
    if display_decimals == 0 {
        return int.to_string();
    }
    let frac = amount % base;
    let scale = U256::from(10u8).pow(U256::from(decimals - display_decimals));
    let mut frac_digits = (frac / scale).to_string();
    while frac_digits.len() < display_decimals as usize {
        frac_digits.insert(0, '0');
    }
    format!("{int}.{frac_digits}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_selectors() {
        assert_eq!(selector("transfer(address,uint256)"), [0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(selector("balanceOf(address)"), [0x70, 0xa0, 0x82, 0x31]);
    }

    #[test]
    fn address_format_is_strict() {
        let ok = parse_address("0xC361A6E67822a0EDc17D899227dd9FC50BD62F42").unwrap();
        assert_eq!(ok.to_string().to_lowercase(), "0xc361a6e67822a0edc17d899227dd9fc50bd62f42");

        assert_eq!(parse_address("0x1234"), Err(InvalidAddress));
        assert_eq!(
            parse_address("C361A6E67822a0EDc17D899227dd9FC50BD62F4200"),
            Err(InvalidAddress)
        );
        assert_eq!(
            parse_address("0xZ361A6E67822a0EDc17D899227dd9FC50BD62F42"),
            Err(InvalidAddress)
        );
    }

    #[test]
    fn quantities_round_trip() {
        assert_eq!(to_quantity(0), "0x0");
        assert_eq!(to_quantity(436), "0x1b4");
        assert_eq!(parse_quantity("0x1b4").unwrap(), 436);
        assert!(parse_quantity("1b4").is_err());
        assert!(parse_quantity("0xzz").is_err());
    }

    #[test]
    fn static_call_encoding() {
        let user = parse_address("0x00000000000000000000000000000000000000aa").unwrap();
        let data = encode_call([1, 2, 3, 4], &[AbiToken::Address(user)]);
        assert_eq!(data.len(), 4 + 32);
        assert_eq!(&data[..4], &[1, 2, 3, 4]);
        assert_eq!(data[4 + 31], 0xaa);
        assert!(data[4..4 + 31].iter().all(|b| *b == 0));
    }

    #[test]
    fn dynamic_bytes_encoding() {
        let data = encode_call(
            [1, 2, 3, 4],
            &[AbiToken::Uint(U256::from(1u8)), AbiToken::Bytes(vec![0xaa; 3])],
        );
        // selector + two head words + length word + one padded data word
        assert_eq!(data.len(), 4 + 64 + 32 + 32);
        // second head word is the tail offset: 2 * 32
        assert_eq!(U256::from_be_slice(&data[4 + 32..4 + 64]), U256::from(64u8));
        // length word
        assert_eq!(U256::from_be_slice(&data[4 + 64..4 + 96]), U256::from(3u8));
        // payload, right-padded with zeros
        assert_eq!(&data[4 + 96..4 + 99], &[0xaa, 0xaa, 0xaa]);
        assert!(data[4 + 99..].iter().all(|b| *b == 0));
    }

    #[test]
    fn decode_return_words() {
        let mut ret = vec![0u8; 32];
        ret[31] = 7;
        assert_eq!(decode_uint(&ret).unwrap(), U256::from(7u8));
        assert_eq!(
            decode_address(&ret).unwrap(),
            parse_address("0x0000000000000000000000000000000000000007").unwrap()
        );
        assert!(decode_uint(&ret[..16]).is_err());
    }

    #[test]
    fn base_unit_display() {
        let amount = U256::from(1_234_500_000_000_000_000u64);
        assert_eq!(format_units(amount, 18, 4), "1.2345");
        assert_eq!(format_units(U256::ZERO, 18, 4), "0.0000");
        assert_eq!(format_units(amount, 18, 0), "1");
        let small = U256::from(5_000_000_000_000u64);
        assert_eq!(format_units(small, 18, 4), "0.0000");
    }
}
