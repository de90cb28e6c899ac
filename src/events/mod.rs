// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Contract event queries.
//!
//! This module provides:
//! - Parsing of human-readable event signatures (alloy ABI parser)
//! - Strict decoding of raw logs into named fields
//! - Block-range filters for `eth_getLogs`

pub mod decode;
pub mod filter;
pub mod signature;

pub use decode::{decode_log, AbiValue, DecodeError, DecodedField};
pub use filter::{DecodedEvent, EventFilter};
pub use signature::{EventSignature, ParamKind, SignatureError};
