//! Minimal static-type ABI encoding.
//!
//! Every call the workflows make takes only `address`, `uint` and `bool`
//! arguments, so each argument occupies exactly one 32-byte word and no
//! dynamic tail is ever needed.

use crate::error::{Result, RomeError};
use alloy_primitives::{hex, keccak256, Address, Bytes, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

const WORD: usize = 32;

/// A single static ABI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Token {
    Address(Address),
    Uint(U256),
    Bool(bool),
}

impl Token {
    pub fn word(&self) -> [u8; WORD] {
        let mut out = [0u8; WORD];
        match self {
            Token::Address(a) => out[12..].copy_from_slice(a.as_slice()),
            Token::Uint(v) => out = v.to_be_bytes::<WORD>(),
            Token::Bool(b) => out[WORD - 1] = u8::from(*b),
        }
        out
    }
}

impl From<Address> for Token {
    fn from(a: Address) -> Self {
        Token::Address(a)
    }
}

impl From<u8> for Token {
    fn from(v: u8) -> Self {
        Token::Uint(U256::from(v))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Address(a) => write!(f, "{a}"),
            Token::Uint(v) => write!(f, "{v}"),
            Token::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// First four bytes of keccak256 over the canonical signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&hash[..4]);
    out
}

pub fn encode_args(tokens: &[Token]) -> Vec<u8> {
    let mut out = Vec::with_capacity(tokens.len() * WORD);
    for t in tokens {
        out.extend_from_slice(&t.word());
    }
    out
}

/// Calldata for `signature` invoked with `tokens`.
pub fn encode_call(signature: &str, tokens: &[Token]) -> Bytes {
    let mut out = Vec::with_capacity(4 + tokens.len() * WORD);
    out.extend_from_slice(&selector(signature));
    out.extend_from_slice(&encode_args(tokens));
    Bytes::from(out)
}

/// Creation code followed by the encoded constructor arguments.
pub fn encode_constructor(bytecode: &[u8], tokens: &[Token]) -> Bytes {
    let mut out = bytecode.to_vec();
    out.extend_from_slice(&encode_args(tokens));
    Bytes::from(out)
}

pub fn decode_bool(data: &[u8]) -> Result<bool> {
    let word = first_word(data, "bool")?;
    if word[..WORD - 1].iter().any(|b| *b != 0) || word[WORD - 1] > 1 {
        return Err(RomeError::Rpc(format!(
            "return value is not a bool: 0x{}",
            hex::encode(word)
        )));
    }
    Ok(word[WORD - 1] == 1)
}

pub fn decode_address(data: &[u8]) -> Result<Address> {
    let word = first_word(data, "address")?;
    if word[..12].iter().any(|b| *b != 0) {
        return Err(RomeError::Rpc(format!(
            "return value is not an address: 0x{}",
            hex::encode(word)
        )));
    }
    Ok(Address::from_slice(&word[12..]))
}

fn first_word<'a>(data: &'a [u8], kind: &str) -> Result<&'a [u8]> {
    data.get(..WORD).ok_or_else(|| {
        RomeError::Rpc(format!(
            "expected a 32-byte {kind} return value, got {} bytes",
            data.len()
        ))
    })
}
