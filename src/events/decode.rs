// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Strict log decoding against a parsed [`EventSignature`].
//!
//! ABI decoding is alloy's. On top of it a log must carry exactly the
//! declared topics, every value must fit its declared width, and the data
//! must be the canonical encoding of what was decoded. A log never decodes
//! partially.

use std::fmt;

use alloy::dyn_abi::{DynSolValue, EventExt};
use alloy::primitives::{Address, Bytes, B256, I256, U256};
use serde::{Serialize, Serializer};

use super::signature::{EventSignature, ParamKind};

const WORD: usize = 32;

/// A decoded parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    Address(Address),
    Bool(bool),
    Uint(U256),
    Int(I256),
    /// `bytesN`, exactly N bytes long
    FixedBytes(Bytes),
    Bytes(Bytes),
    String(String),
    /// Indexed dynamic value, only its topic hash is recoverable
    Hashed(B256),
}

impl AbiValue {
    pub fn as_address(&self) -> Option<Address> {
        match self {
            AbiValue::Address(a) => Some(*a),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<U256> {
        match self {
            AbiValue::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<I256> {
        match self {
            AbiValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AbiValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AbiValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for AbiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiValue::Address(a) => write!(f, "{a}"),
            AbiValue::Bool(b) => write!(f, "{b}"),
            AbiValue::Uint(v) => write!(f, "{v}"),
            AbiValue::Int(v) => write!(f, "{v}"),
            AbiValue::FixedBytes(b) | AbiValue::Bytes(b) => {
                write!(f, "0x{}", alloy::hex::encode(b))
            }
            AbiValue::String(s) => f.write_str(s),
            AbiValue::Hashed(h) => write!(f, "{h:#x}"),
        }
    }
}

// Integers serialize as decimal strings so no consumer ever sees a float.
impl Serialize for AbiValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AbiValue::Bool(b) => serializer.serialize_bool(*b),
            other => serializer.collect_str(other),
        }
    }
}

/// One decoded field of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedField {
    pub name: String,
    pub indexed: bool,
    pub value: AbiValue,
}

/// Errors raised when a raw log does not match the declared signature.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("expected {expected} topics, log has {actual}")]
    TopicCount { expected: usize, actual: usize },

    #[error("topic0 {actual} does not match event signature hash {expected}")]
    SignatureMismatch { expected: B256, actual: B256 },

    #[error("expected {expected} bytes of log data, got {actual}")]
    DataLength { expected: usize, actual: usize },

    #[error("parameter `{param}` ({kind}): {reason}")]
    InvalidValue {
        param: String,
        kind: ParamKind,
        reason: &'static str,
    },

    #[error("log data is not the canonical encoding of its values")]
    NonCanonical,

    #[error("ABI decoding failed: {0}")]
    Abi(String),

    #[error("contract return data: {0}")]
    ReturnData(String),
}

/// Decode one log's topics and data into named fields, in declaration order.
pub fn decode_log(
    signature: &EventSignature,
    topics: &[B256],
    data: &[u8],
) -> Result<Vec<DecodedField>, DecodeError> {
    let expected_topics = signature.topic_count();
    if topics.len() != expected_topics {
        return Err(DecodeError::TopicCount {
            expected: expected_topics,
            actual: topics.len(),
        });
    }

    let indexed_topics = if signature.is_anonymous() {
        topics
    } else {
        let expected = signature.topic0();
        if topics[0] != expected {
            return Err(DecodeError::SignatureMismatch {
                expected,
                actual: topics[0],
            });
        }
        &topics[1..]
    };

    let params = signature.params();
    let body_count = params.iter().filter(|p| !p.indexed).count();
    let body_dynamic = (0..params.len())
        .filter(|&i| !params[i].indexed)
        .any(|i| signature.kind(i).is_some_and(ParamKind::is_dynamic));
    if !body_dynamic && data.len() != body_count * WORD {
        return Err(DecodeError::DataLength {
            expected: body_count * WORD,
            actual: data.len(),
        });
    }

    let decoded = signature
        .abi()
        .decode_log_parts(topics.iter().copied(), data)
        .map_err(|e| DecodeError::Abi(e.to_string()))?;

    let canonical = DynSolValue::Tuple(decoded.body.clone()).abi_encode_params();
    if canonical.len() != data.len() {
        return Err(DecodeError::DataLength {
            expected: canonical.len(),
            actual: data.len(),
        });
    }

    let mut indexed = decoded.indexed.into_iter().zip(indexed_topics.iter().copied());
    let mut body = decoded.body.into_iter();
    let mut fields = Vec::with_capacity(params.len());

    for (index, param) in params.iter().enumerate() {
        let name = signature.field_name(index);
        let kind = signature
            .kind(index)
            .ok_or_else(|| DecodeError::Abi(format!("no type for parameter {index}")))?;

        let value = if param.indexed {
            let (value, topic) = indexed.next().ok_or(DecodeError::TopicCount {
                expected: expected_topics,
                actual: topics.len(),
            })?;
            if kind.is_dynamic() {
                AbiValue::Hashed(topic)
            } else {
                if value.as_word() != Some(topic) {
                    return Err(invalid(&name, kind, "dirty topic padding"));
                }
                to_abi_value(&name, kind, value)?
            }
        } else {
            let value = body.next().ok_or(DecodeError::DataLength {
                expected: canonical.len(),
                actual: data.len(),
            })?;
            to_abi_value(&name, kind, value)?
        };

        fields.push(DecodedField {
            name,
            indexed: param.indexed,
            value,
        });
    }

    // Catches dirty padding the decoder accepted silently.
    if canonical != data {
        return Err(DecodeError::NonCanonical);
    }

    Ok(fields)
}

fn invalid(name: &str, kind: ParamKind, reason: &'static str) -> DecodeError {
    DecodeError::InvalidValue {
        param: name.to_string(),
        kind,
        reason,
    }
}

fn to_abi_value(name: &str, kind: ParamKind, value: DynSolValue) -> Result<AbiValue, DecodeError> {
    match value {
        DynSolValue::Address(a) => Ok(AbiValue::Address(a)),
        DynSolValue::Bool(b) => Ok(AbiValue::Bool(b)),
        DynSolValue::Uint(v, bits) => {
            if v.bit_len() > bits {
                return Err(invalid(name, kind, "value exceeds declared width"));
            }
            Ok(AbiValue::Uint(v))
        }
        DynSolValue::Int(v, bits) => {
            // Every bit above the sign bit must be a copy of it.
            let high = v.asr(bits.saturating_sub(1));
            if high != I256::ZERO && high != I256::MINUS_ONE {
                return Err(invalid(name, kind, "value exceeds declared width"));
            }
            Ok(AbiValue::Int(v))
        }
        DynSolValue::FixedBytes(word, len) => {
            if word[len..].iter().any(|b| *b != 0) {
                return Err(invalid(name, kind, "dirty padding"));
            }
            Ok(AbiValue::FixedBytes(Bytes::copy_from_slice(&word[..len])))
        }
        DynSolValue::Bytes(b) => Ok(AbiValue::Bytes(b.into())),
        DynSolValue::String(s) => Ok(AbiValue::String(s)),
        _ => Err(invalid(name, kind, "unexpected ABI value")),
    }
}
