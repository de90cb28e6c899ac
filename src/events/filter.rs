// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Event filters and decoded events.

use alloy::primitives::{Address, B256};
use alloy::rpc::types::{Filter, Log};
use serde::Serialize;

use super::decode::{decode_log, AbiValue, DecodeError, DecodedField};
use super::signature::EventSignature;
use crate::blockchain::ChainQueryError;

/// Historical log query: one contract, one event, inclusive block range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFilter {
    address: Address,
    signature: EventSignature,
    from_block: u64,
    to_block: u64,
}

impl EventFilter {
    /// Create a filter over `[from_block, to_block]`.
    ///
    /// Anonymous events are rejected: without topic 0 the node would return
    /// every log of the contract.
    pub fn new(
        address: Address,
        signature: EventSignature,
        from_block: u64,
        to_block: u64,
    ) -> Result<Self, ChainQueryError> {
        if signature.is_anonymous() {
            return Err(ChainQueryError::InvalidFilter(format!(
                "anonymous event `{}` has no signature topic to filter on",
                signature.name()
            )));
        }
        if from_block > to_block {
            return Err(ChainQueryError::InvalidFilter(format!(
                "from_block {from_block} is after to_block {to_block}"
            )));
        }
        Ok(Self {
            address,
            signature,
            from_block,
            to_block,
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn signature(&self) -> &EventSignature {
        &self.signature
    }

    pub fn from_block(&self) -> u64 {
        self.from_block
    }

    pub fn to_block(&self) -> u64 {
        self.to_block
    }

    /// `eth_getLogs` filter matching the contract, range and topic 0.
    pub(crate) fn to_rpc_filter(&self) -> Filter {
        Filter::new()
            .address(self.address)
            .event_signature(self.signature.topic0())
            .from_block(self.from_block)
            .to_block(self.to_block)
    }
}

impl std::fmt::Display for EventFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}@{} [{}..={}]",
            self.signature.name(),
            self.address,
            self.from_block,
            self.to_block
        )
    }
}

/// A log decoded through an [`EventSignature`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedEvent {
    /// Event name from the signature
    pub event: String,
    /// Emitting contract
    pub address: Address,
    pub block_number: Option<u64>,
    pub log_index: Option<u64>,
    pub transaction_hash: Option<B256>,
    /// Fields in declaration order
    pub fields: Vec<DecodedField>,
}

impl DecodedEvent {
    /// Decode an RPC log. Fails if the log does not match the signature.
    pub fn from_log(signature: &EventSignature, log: &Log) -> Result<Self, DecodeError> {
        let fields = decode_log(signature, log.topics(), &log.data().data)?;
        Ok(Self {
            event: signature.name().to_string(),
            address: log.address(),
            block_number: log.block_number,
            log_index: log.log_index,
            transaction_hash: log.transaction_hash,
            fields,
        })
    }

    /// Look up a field by declared name (or `arg<index>` for unnamed ones).
    pub fn get(&self, name: &str) -> Option<&AbiValue> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }

    /// Chain order key: block height, then position within the block.
    pub(crate) fn position(&self) -> (Option<u64>, Option<u64>) {
        (self.block_number, self.log_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transfer() -> EventSignature {
        EventSignature::parse("event Transfer(address indexed from, address indexed to, uint amount)")
            .unwrap()
    }

    #[test]
    fn rejects_inverted_range() {
        let err = EventFilter::new(Address::ZERO, transfer(), 11, 10).unwrap_err();
        assert!(matches!(err, ChainQueryError::InvalidFilter(_)));
    }

    #[test]
    fn rejects_anonymous_events() {
        let ping = EventSignature::parse("event Ping(address indexed who) anonymous").unwrap();
        let err = EventFilter::new(Address::ZERO, ping, 1, 2).unwrap_err();
        assert!(matches!(err, ChainQueryError::InvalidFilter(ref msg) if msg.contains("Ping")));
    }

    #[test]
    fn single_block_range_is_allowed() {
        let filter = EventFilter::new(Address::ZERO, transfer(), 10, 10).unwrap();
        assert_eq!(filter.from_block(), filter.to_block());
    }

    #[test]
    fn rpc_filter_carries_range() {
        let filter = EventFilter::new(Address::repeat_byte(0xb4), transfer(), 100, 110).unwrap();
        let rpc = filter.to_rpc_filter();

        assert_eq!(rpc.get_from_block(), Some(100));
        assert_eq!(rpc.get_to_block(), Some(110));

        let json = serde_json::to_value(&rpc).unwrap();
        assert_eq!(json["fromBlock"], "0x64");
        assert_eq!(json["toBlock"], "0x6e");
        assert!(json["topics"]
            .to_string()
            .contains("0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"));
    }

    #[test]
    fn display_names_event_and_range() {
        let filter = EventFilter::new(Address::ZERO, transfer(), 1, 2).unwrap();
        assert!(filter.to_string().starts_with("Transfer@0x"));
        assert!(filter.to_string().ends_with("[1..=2]"));
    }
}
