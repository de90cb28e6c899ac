// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relational Chain Query - read-only EVM chain client
//!
//! A typed facade over a single EVM JSON-RPC endpoint. Every query is a
//! fresh round trip; the client caches nothing and never signs.
//!
//! ## Modules
//!
//! - `blockchain` - Chain client, ENS resolution, ERC-20 reads, units
//! - `events` - Event signature parsing and strict log decoding
//! - `config` - Environment configuration for the `chain-query` binary
//! - `logging` - Tracing subscriber setup

pub mod blockchain;
pub mod config;
pub mod events;
pub mod logging;

pub use blockchain::{ChainQueryClient, ChainQueryError};
