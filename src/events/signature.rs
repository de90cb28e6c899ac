// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Human-readable event signature parsing.
//!
//! Accepts the one-line form used in minimal ABIs:
//!
//! ```text
//! event Transfer(address indexed from, address indexed to, uint amount)
//! ```
//!
//! The fragment is parsed once by alloy's ABI parser and its types are
//! normalised to canonical names, so `uint` and `uint256` hash alike.

use std::fmt;
use std::str::FromStr;

use alloy::dyn_abi::DynSolType;
use alloy::json_abi::{Event, EventParam};
use alloy::primitives::B256;

/// Solidity parameter kinds supported by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Address,
    Bool,
    /// Unsigned integer of the given bit width
    Uint(usize),
    /// Signed integer of the given bit width
    Int(usize),
    /// Fixed-size byte array of the given length (1..=32)
    FixedBytes(usize),
    Bytes,
    String,
}

impl ParamKind {
    /// Dynamic kinds are ABI-encoded out of line in log data and hashed
    /// when indexed.
    pub fn is_dynamic(self) -> bool {
        matches!(self, ParamKind::Bytes | ParamKind::String)
    }

    fn from_sol_type(ty: &DynSolType) -> Option<Self> {
        match ty {
            DynSolType::Address => Some(ParamKind::Address),
            DynSolType::Bool => Some(ParamKind::Bool),
            DynSolType::Uint(bits) => Some(ParamKind::Uint(*bits)),
            DynSolType::Int(bits) => Some(ParamKind::Int(*bits)),
            DynSolType::FixedBytes(len) => Some(ParamKind::FixedBytes(*len)),
            DynSolType::Bytes => Some(ParamKind::Bytes),
            DynSolType::String => Some(ParamKind::String),
            _ => None,
        }
    }
}

impl fmt::Display for ParamKind {
    /// Canonical Solidity type name, as used in the topic hash.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKind::Address => f.write_str("address"),
            ParamKind::Bool => f.write_str("bool"),
            ParamKind::Uint(bits) => write!(f, "uint{bits}"),
            ParamKind::Int(bits) => write!(f, "int{bits}"),
            ParamKind::FixedBytes(len) => write!(f, "bytes{len}"),
            ParamKind::Bytes => f.write_str("bytes"),
            ParamKind::String => f.write_str("string"),
        }
    }
}

/// A parsed event declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSignature {
    /// Event with canonical parameter types
    event: Event,
    /// Parameter kinds, parallel to `event.inputs`
    kinds: Vec<ParamKind>,
}

impl EventSignature {
    /// Parse a human-readable event fragment. The `event` keyword is
    /// optional. Arrays and tuples are rejected.
    pub fn parse(fragment: &str) -> Result<Self, SignatureError> {
        let text = fragment.trim();
        let text = match text.strip_prefix("event") {
            Some(rest) if rest.starts_with(char::is_whitespace) => text.to_string(),
            _ => format!("event {text}"),
        };

        let mut event = Event::parse(&text).map_err(|e| SignatureError::Syntax(e.to_string()))?;

        let mut kinds = Vec::with_capacity(event.inputs.len());
        for param in &mut event.inputs {
            let kind = normalize(param)?;
            kinds.push(kind);
        }

        let indexed = event.inputs.iter().filter(|p| p.indexed).count();
        let limit = if event.anonymous { 4 } else { 3 };
        if indexed > limit {
            return Err(SignatureError::TooManyIndexed { indexed, limit });
        }

        Ok(Self { event, kinds })
    }

    pub fn name(&self) -> &str {
        &self.event.name
    }

    /// Declared parameters, with canonical type names.
    pub fn params(&self) -> &[EventParam] {
        &self.event.inputs
    }

    /// Kind of the parameter at `index`.
    pub fn kind(&self, index: usize) -> Option<ParamKind> {
        self.kinds.get(index).copied()
    }

    pub fn is_anonymous(&self) -> bool {
        self.event.anonymous
    }

    /// Number of indexed parameters (carried in topics).
    pub fn indexed_count(&self) -> usize {
        self.event.inputs.iter().filter(|p| p.indexed).count()
    }

    /// Number of topics a matching log carries.
    pub fn topic_count(&self) -> usize {
        self.indexed_count() + usize::from(!self.is_anonymous())
    }

    /// Canonical form hashed into topic 0, e.g. `Transfer(address,address,uint256)`.
    pub fn canonical(&self) -> String {
        self.event.signature()
    }

    /// keccak256 of the canonical form.
    pub fn topic0(&self) -> B256 {
        self.event.selector()
    }

    /// Name used for a parameter in decoded output.
    pub fn field_name(&self, index: usize) -> String {
        match self.event.inputs.get(index).map(|p| p.name.as_str()) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("arg{index}"),
        }
    }

    pub(crate) fn abi(&self) -> &Event {
        &self.event
    }
}

/// Replace the declared type with its canonical name and classify it.
fn normalize(param: &mut EventParam) -> Result<ParamKind, SignatureError> {
    let declared = if param.ty == "byte" { "bytes1" } else { param.ty.as_str() };
    let unsupported = || SignatureError::UnsupportedType(param.ty.clone());

    let ty = DynSolType::parse(declared).map_err(|_| unsupported())?;
    let kind = ParamKind::from_sol_type(&ty).ok_or_else(unsupported)?;

    param.ty = kind.to_string();
    param.internal_type = None;
    Ok(kind)
}

impl FromStr for EventSignature {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for EventSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "event {}(", self.name())?;
        for (i, p) in self.params().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(&p.ty)?;
            if p.indexed {
                f.write_str(" indexed")?;
            }
            if !p.name.is_empty() {
                write!(f, " {}", p.name)?;
            }
        }
        f.write_str(")")?;
        if self.is_anonymous() {
            f.write_str(" anonymous")?;
        }
        Ok(())
    }
}

/// Errors raised while parsing an event fragment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("malformed event fragment: {0}")]
    Syntax(String),

    #[error("unsupported parameter type `{0}`")]
    UnsupportedType(String),

    #[error("{indexed} indexed parameters exceed the limit of {limit}")]
    TooManyIndexed { indexed: usize, limit: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRANSFER: &str = "event Transfer(address indexed from, address indexed to, uint amount)";

    #[test]
    fn parses_transfer_fragment() {
        let sig = EventSignature::parse(TRANSFER).unwrap();

        assert_eq!(sig.name(), "Transfer");
        assert_eq!(sig.params().len(), 3);
        assert_eq!(sig.indexed_count(), 2);
        assert_eq!(sig.topic_count(), 3);
        assert_eq!(sig.kind(2), Some(ParamKind::Uint(256)));
        assert_eq!(sig.params()[2].name, "amount");
        assert!(!sig.is_anonymous());
    }

    #[test]
    fn transfer_topic_is_correct() {
        let sig: EventSignature = TRANSFER.parse().unwrap();
        assert_eq!(sig.canonical(), "Transfer(address,address,uint256)");

        let expected = "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";
        assert_eq!(format!("{:#x}", sig.topic0()), expected);
    }

    #[test]
    fn shorthand_and_canonical_types_hash_alike() {
        let short = EventSignature::parse(TRANSFER).unwrap();
        let long = EventSignature::parse(
            "event Transfer(address indexed from, address indexed to, uint256 amount)",
        )
        .unwrap();
        assert_eq!(short.topic0(), long.topic0());
    }

    #[test]
    fn keyword_and_names_are_optional() {
        let sig = EventSignature::parse("Approval(address indexed, address indexed, uint256)").unwrap();
        assert_eq!(sig.canonical(), "Approval(address,address,uint256)");
        assert_eq!(sig.field_name(0), "arg0");
        assert_eq!(sig.field_name(2), "arg2");
    }

    #[test]
    fn parses_all_supported_kinds() {
        let sig = EventSignature::parse(
            "event Mixed(bool ok, int24 tick, bytes32 id, byte flag, int delta, bytes blob, string memo) anonymous",
        )
        .unwrap();

        let kinds: Vec<ParamKind> = (0..sig.params().len()).filter_map(|i| sig.kind(i)).collect();
        assert_eq!(
            kinds,
            vec![
                ParamKind::Bool,
                ParamKind::Int(24),
                ParamKind::FixedBytes(32),
                ParamKind::FixedBytes(1),
                ParamKind::Int(256),
                ParamKind::Bytes,
                ParamKind::String,
            ]
        );
        assert!(sig.is_anonymous());
        assert_eq!(sig.topic_count(), 0);
        assert_eq!(
            sig.canonical(),
            "Mixed(bool,int24,bytes32,bytes1,int256,bytes,string)"
        );
    }

    #[test]
    fn display_round_trips_through_parse() {
        let sig = EventSignature::parse(TRANSFER).unwrap();
        let reparsed = EventSignature::parse(&sig.to_string()).unwrap();
        assert_eq!(sig, reparsed);
    }

    #[test]
    fn rejects_unsupported_types() {
        for fragment in [
            "event A(uint7 x)",
            "event A(uint264 x)",
            "event A(bytes33 x)",
            "event A(address[] xs)",
            "event A(float x)",
        ] {
            assert!(EventSignature::parse(fragment).is_err(), "{fragment} should be rejected");
        }
        assert!(matches!(
            EventSignature::parse("event A(address[] xs)"),
            Err(SignatureError::UnsupportedType(_))
        ));
    }

    #[test]
    fn rejects_malformed_fragments() {
        for fragment in [
            "event Transfer",
            "event 1Bad(uint x)",
            "event A(uint x) payable",
            "event A(uint indexed x y)",
        ] {
            assert!(EventSignature::parse(fragment).is_err(), "{fragment} should be rejected");
        }
    }

    #[test]
    fn limits_indexed_parameters() {
        let four = "event A(uint indexed a, uint indexed b, uint indexed c, uint indexed d)";
        assert_eq!(
            EventSignature::parse(four),
            Err(SignatureError::TooManyIndexed {
                indexed: 4,
                limit: 3
            })
        );
        assert!(EventSignature::parse(&format!("{four} anonymous")).is_ok());
    }

    #[test]
    fn empty_parameter_list() {
        let sig = EventSignature::parse("event Paused()").unwrap();
        assert!(sig.params().is_empty());
        assert_eq!(sig.canonical(), "Paused()");
    }
}
