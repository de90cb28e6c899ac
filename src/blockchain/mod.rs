// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Read-only EVM chain access.
//!
//! This module provides functionality for:
//! - Querying native balances, blocks, code and fee signals
//! - Resolving ENS names on chains with a registry
//! - Reading ERC-20 token metadata and balances
//! - Per-call timeout and cancellation

pub mod client;
pub mod ens;
pub mod erc20;
pub mod error;
pub mod options;
pub mod types;
pub mod units;

pub use client::ChainQueryClient;
pub use error::ChainQueryError;
pub use options::CallOptions;
pub use types::*;
pub use units::{format_ether, format_units, format_units_truncated, parse_ether, parse_units, UnitsError};
