//! bcrypt's own base64 variant: alphabet `./A-Za-z0-9`, no padding, same
//! 3-byte-to-4-symbol bit grouping as standard base64. This is wire-format
//! encoding for the salt/hash bytes embedded in the hash string, not a
//! general-purpose codec, so it's hand-rolled here rather than pulled in
//! as a crate dependency.

use crate::bcrypt::error::BcryptError;

const ALPHABET: &[u8; 64] = b"./ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

fn index_of(c: u8) -> Option<u8> {
    ALPHABET.iter().position(|&a| a == c).map(|i| i as u8)
}

/// Encode `bytes` using bcrypt's base64 alphabet, no padding.
pub(crate) fn encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity((bytes.len() * 4).div_ceil(3));
    let mut chunks = bytes.chunks(3);
    for chunk in &mut chunks {
        let c1 = chunk[0];
        out.push(ALPHABET[(c1 >> 2) as usize & 0x3f] as char);
        let mut acc = (c1 & 0x03) << 4;
        if chunk.len() == 1 {
            out.push(ALPHABET[acc as usize & 0x3f] as char);
            break;
        }
        let c2 = chunk[1];
        acc |= (c2 >> 4) & 0x0f;
        out.push(ALPHABET[acc as usize & 0x3f] as char);
        acc = (c2 & 0x0f) << 2;
        if chunk.len() == 2 {
            out.push(ALPHABET[acc as usize & 0x3f] as char);
            break;
        }
        let c3 = chunk[2];
        acc |= (c3 >> 6) & 0x03;
        out.push(ALPHABET[acc as usize & 0x3f] as char);
        out.push(ALPHABET[c3 as usize & 0x3f] as char);
    }
    out
}

/// Decode a bcrypt-base64 string into exactly `expected_len` bytes.
pub(crate) fn decode(s: &str, expected_len: usize) -> Result<Vec<u8>, BcryptError> {
    let symbols: Vec<u8> = s
        .bytes()
        .map(|b| index_of(b).ok_or_else(|| BcryptError::InvalidSalt(s.to_string())))
        .collect::<Result<_, _>>()?;

    let mut out = Vec::with_capacity(expected_len);
    let mut chunks = symbols.chunks(4);
    for chunk in &mut chunks {
        let s0 = chunk[0];
        let s1 = *chunk.get(1).unwrap_or(&0);
        out.push((s0 << 2) | (s1 >> 4));
        if chunk.len() < 3 {
            break;
        }
        let s2 = chunk[2];
        out.push((s1 << 4) | (s2 >> 2));
        if chunk.len() < 4 {
            break;
        }
        let s3 = chunk[3];
        out.push((s2 << 6) | s3);
    }

    out.truncate(expected_len);
    if out.len() != expected_len {
        return Err(BcryptError::InvalidSalt(s.to_string()));
    }
    Ok(out)
}
