// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Error type for chain queries.
//!
//! Every query failure carries the operation name and its argument so the
//! caller can log it meaningfully. Nothing here retries or recovers.

use alloy::transports::{RpcError, TransportErrorKind};

use crate::events::{DecodeError, SignatureError};

/// Errors that can occur during chain queries.
#[derive(Debug, thiserror::Error)]
pub enum ChainQueryError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid event filter: {0}")]
    InvalidFilter(String),

    #[error("Invalid event signature: {0}")]
    InvalidSignature(#[from] SignatureError),

    #[error("Network error in {operation}({argument}): {message}")]
    Network {
        operation: &'static str,
        argument: String,
        message: String,
    },

    #[error("Endpoint rejected {operation}({argument}): [{code}] {message}")]
    Endpoint {
        operation: &'static str,
        argument: String,
        code: i64,
        message: String,
    },

    #[error("Could not resolve `{name}`: {reason}")]
    Resolution { name: String, reason: String },

    #[error("Not found: {operation}({argument})")]
    NotFound {
        operation: &'static str,
        argument: String,
    },

    #[error("Decode error in {operation}({argument}): {source}")]
    Decode {
        operation: &'static str,
        argument: String,
        #[source]
        source: DecodeError,
    },

    #[error("Chain mismatch: expected chain id {expected}, endpoint reports {actual}")]
    ChainMismatch { expected: u64, actual: u64 },

    #[error("Cancelled: {operation}({argument})")]
    Cancelled {
        operation: &'static str,
        argument: String,
    },
}

impl ChainQueryError {
    /// Classify a transport-level failure for the given operation.
    ///
    /// JSON-RPC error objects become [`ChainQueryError::Endpoint`], a null
    /// result becomes [`ChainQueryError::NotFound`], everything else
    /// (connection, HTTP status, undecodable body) is a network error.
    pub(crate) fn from_rpc(
        operation: &'static str,
        argument: impl Into<String>,
        err: RpcError<TransportErrorKind>,
    ) -> Self {
        let argument = argument.into();
        match err {
            RpcError::ErrorResp(payload) => ChainQueryError::Endpoint {
                operation,
                argument,
                code: payload.code,
                message: payload.message.to_string(),
            },
            RpcError::NullResp => ChainQueryError::NotFound {
                operation,
                argument,
            },
            other => ChainQueryError::Network {
                operation,
                argument,
                message: other.to_string(),
            },
        }
    }

    /// Classify a contract-call failure for the given operation.
    pub(crate) fn from_contract(
        operation: &'static str,
        argument: impl Into<String>,
        err: alloy::contract::Error,
    ) -> Self {
        match err {
            alloy::contract::Error::TransportError(e) => Self::from_rpc(operation, argument, e),
            other => ChainQueryError::Decode {
                operation,
                argument: argument.into(),
                source: DecodeError::ReturnData(other.to_string()),
            },
        }
    }

    /// JSON-RPC "method not found", used to detect unsupported fee fields.
    pub fn is_method_not_found(&self) -> bool {
        matches!(self, ChainQueryError::Endpoint { code: -32601, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_response_maps_to_not_found() {
        let err = ChainQueryError::from_rpc("get_block", "99", RpcError::NullResp);
        assert!(matches!(
            err,
            ChainQueryError::NotFound { operation: "get_block", ref argument } if argument == "99"
        ));
    }

    #[test]
    fn transport_failure_maps_to_network_error() {
        let err = ChainQueryError::from_rpc(
            "get_balance",
            "0xabc",
            RpcError::Transport(TransportErrorKind::BackendGone),
        );
        assert!(matches!(err, ChainQueryError::Network { .. }));
        assert!(!err.is_method_not_found());
    }
}
