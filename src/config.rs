// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! by the `chain-query` binary. Configuration is loaded from the
//! environment at startup; the library itself reads nothing from it.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `RPC_URL` | JSON-RPC endpoint (`http` or `https`) | Required |
//! | `EXPECTED_CHAIN_ID` | Chain id the endpoint must report | Not checked |
//! | `RPC_TIMEOUT_SECS` | Per-call timeout in seconds | No timeout |
//! | `TOUR_ACCOUNT` | Address or ENS name to inspect | `vitalik.eth` |
//! | `TOUR_CODE_ADDRESS` | Address whose bytecode is fetched | Skipped |
//! | `TOUR_EVENT_CONTRACT` | Contract whose events are queried | Skipped |
//! | `TOUR_EVENT_SIGNATURE` | Event signature to decode | ERC-20 `Transfer` |
//! | `TOUR_EVENT_LOOKBACK` | Blocks to look back from the head | `10` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::time::Duration;

use alloy::primitives::Address;

use crate::blockchain::{AccountRef, Endpoint};
use crate::events::EventSignature;
use crate::logging::LogFormat;

/// Environment variable name for the JSON-RPC endpoint URL.
///
/// There is no default; the binary refuses to start without it.
pub const RPC_URL_ENV: &str = "RPC_URL";

/// Environment variable name for the chain id the endpoint must report.
pub const EXPECTED_CHAIN_ID_ENV: &str = "EXPECTED_CHAIN_ID";

/// Environment variable name for the per-call timeout, in whole seconds.
pub const RPC_TIMEOUT_SECS_ENV: &str = "RPC_TIMEOUT_SECS";

/// Environment variable name for the account to inspect.
pub const TOUR_ACCOUNT_ENV: &str = "TOUR_ACCOUNT";

/// Default account: an ENS name, so the tour exercises resolution.
pub const DEFAULT_TOUR_ACCOUNT: &str = "vitalik.eth";

pub const TOUR_CODE_ADDRESS_ENV: &str = "TOUR_CODE_ADDRESS";

pub const TOUR_EVENT_CONTRACT_ENV: &str = "TOUR_EVENT_CONTRACT";

pub const TOUR_EVENT_SIGNATURE_ENV: &str = "TOUR_EVENT_SIGNATURE";

/// Default event signature (ERC-20 `Transfer`).
pub const DEFAULT_EVENT_SIGNATURE: &str =
    "event Transfer(address indexed from, address indexed to, uint amount)";

pub const TOUR_EVENT_LOOKBACK_ENV: &str = "TOUR_EVENT_LOOKBACK";

pub const DEFAULT_EVENT_LOOKBACK: u64 = 10;

/// Environment variable name for the log output format.
///
/// # Values
/// - `json`: one JSON object per line
/// - `pretty`: human-readable multi-line output
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{var} has an invalid value `{value}`: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(var: &'static str, value: &str, reason: impl ToString) -> Self {
        ConfigError::Invalid {
            var,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Settings for the provider tour.
#[derive(Debug, Clone)]
pub struct TourConfig {
    pub endpoint: Endpoint,
    pub expected_chain_id: Option<u64>,
    pub timeout: Option<Duration>,
    pub account: AccountRef,
    pub code_address: Option<Address>,
    /// Contract and signature for the event query, when a contract is set
    pub events: Option<EventTour>,
    pub log_format: LogFormat,
}

/// Event query part of the tour.
#[derive(Debug, Clone)]
pub struct EventTour {
    pub contract: Address,
    pub signature: EventSignature,
    pub lookback: u64,
}

impl TourConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let rpc_url = get(RPC_URL_ENV).ok_or(ConfigError::Missing(RPC_URL_ENV))?;
        let expected_chain_id = get(EXPECTED_CHAIN_ID_ENV)
            .map(|v| parse_u64(EXPECTED_CHAIN_ID_ENV, &v))
            .transpose()?;

        let mut endpoint = Endpoint::new(rpc_url.trim())
            .map_err(|e| ConfigError::invalid(RPC_URL_ENV, &rpc_url, e))?;
        if let Some(chain_id) = expected_chain_id {
            endpoint = endpoint.with_chain_id(chain_id);
        }

        let timeout = get(RPC_TIMEOUT_SECS_ENV)
            .map(|v| match parse_u64(RPC_TIMEOUT_SECS_ENV, &v)? {
                0 => Err(ConfigError::invalid(RPC_TIMEOUT_SECS_ENV, &v, "must be positive")),
                secs => Ok(Duration::from_secs(secs)),
            })
            .transpose()?;

        let account_raw = get(TOUR_ACCOUNT_ENV).unwrap_or_else(|| DEFAULT_TOUR_ACCOUNT.to_string());
        let account: AccountRef = account_raw
            .trim()
            .parse()
            .map_err(|e| ConfigError::invalid(TOUR_ACCOUNT_ENV, &account_raw, e))?;

        let code_address = get(TOUR_CODE_ADDRESS_ENV)
            .map(|v| parse_address(TOUR_CODE_ADDRESS_ENV, &v))
            .transpose()?;

        let events = match get(TOUR_EVENT_CONTRACT_ENV) {
            Some(contract) => {
                let contract = parse_address(TOUR_EVENT_CONTRACT_ENV, &contract)?;
                let signature_raw = get(TOUR_EVENT_SIGNATURE_ENV)
                    .unwrap_or_else(|| DEFAULT_EVENT_SIGNATURE.to_string());
                let signature = EventSignature::parse(&signature_raw)
                    .map_err(|e| ConfigError::invalid(TOUR_EVENT_SIGNATURE_ENV, &signature_raw, e))?;
                let lookback = get(TOUR_EVENT_LOOKBACK_ENV)
                    .map(|v| parse_u64(TOUR_EVENT_LOOKBACK_ENV, &v))
                    .transpose()?
                    .unwrap_or(DEFAULT_EVENT_LOOKBACK);

                Some(EventTour {
                    contract,
                    signature,
                    lookback,
                })
            }
            None => None,
        };

        let log_format = match get(LOG_FORMAT_ENV) {
            Some(v) => v
                .parse()
                .map_err(|e| ConfigError::invalid(LOG_FORMAT_ENV, &v, e))?,
            None => LogFormat::default(),
        };

        Ok(Self {
            endpoint,
            expected_chain_id,
            timeout,
            account,
            code_address,
            events,
            log_format,
        })
    }
}

fn parse_u64(var: &'static str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|e| ConfigError::invalid(var, value, e))
}

fn parse_address(var: &'static str, value: &str) -> Result<Address, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|e| ConfigError::invalid(var, value, e))
}
