// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain types and constants.

use std::fmt;
use std::str::FromStr;

use alloy::primitives::{address, Address, B256, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use super::error::ChainQueryError;

/// Quantity in the chain's smallest unit (wei for native balances).
pub type Amount = U256;

/// Well-known EVM network descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownNetwork {
    /// Network name for display
    pub name: &'static str,
    /// Chain ID
    pub chain_id: u64,
    /// ENS registry deployment, if the network has one
    pub ens_registry: Option<Address>,
}

/// ENS registry shared by every network that deploys ENS.
pub const ENS_REGISTRY: Address = address!("00000000000C2E074eC69A0dFb2997BA6C7d2e1e");

/// Ethereum mainnet.
pub const ETH_MAINNET: KnownNetwork = KnownNetwork {
    name: "mainnet",
    chain_id: 1,
    ens_registry: Some(ENS_REGISTRY),
};

/// Goerli testnet (deprecated, kept for historical endpoints).
pub const ETH_GOERLI: KnownNetwork = KnownNetwork {
    name: "goerli",
    chain_id: 5,
    ens_registry: Some(ENS_REGISTRY),
};

/// Holesky testnet.
pub const ETH_HOLESKY: KnownNetwork = KnownNetwork {
    name: "holesky",
    chain_id: 17_000,
    ens_registry: Some(ENS_REGISTRY),
};

/// Sepolia testnet.
pub const ETH_SEPOLIA: KnownNetwork = KnownNetwork {
    name: "sepolia",
    chain_id: 11_155_111,
    ens_registry: Some(ENS_REGISTRY),
};

const KNOWN_NETWORKS: [KnownNetwork; 4] = [ETH_MAINNET, ETH_GOERLI, ETH_HOLESKY, ETH_SEPOLIA];

/// Look up a well-known network by chain id.
pub fn known_network(chain_id: u64) -> Option<KnownNetwork> {
    KNOWN_NETWORKS.iter().copied().find(|n| n.chain_id == chain_id)
}

/// Connection descriptor for a single JSON-RPC endpoint.
///
/// The optional chain id is what the caller *expects* the endpoint to
/// serve; the client never enforces it on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    url: Url,
    chain_id: Option<u64>,
}

impl Endpoint {
    /// Parse an endpoint URL. Only `http` and `https` are accepted.
    pub fn new(rpc_url: &str) -> Result<Self, ChainQueryError> {
        let url: Url = rpc_url
            .parse()
            .map_err(|e: url::ParseError| ChainQueryError::InvalidRpcUrl(e.to_string()))?;

        match url.scheme() {
            "http" | "https" => Ok(Self {
                url,
                chain_id: None,
            }),
            other => Err(ChainQueryError::InvalidRpcUrl(format!(
                "unsupported scheme `{other}`"
            ))),
        }
    }

    /// Attach the chain id the caller expects this endpoint to serve.
    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn chain_id(&self) -> Option<u64> {
        self.chain_id
    }
}

impl fmt::Display for Endpoint {
    // Host only: provider URLs often carry an API key in the path.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.url.scheme(), self.url.host_str().unwrap_or("?"))
    }
}

/// An account given either as a raw address or as an ENS name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AccountRef {
    Address(Address),
    Name(String),
}

impl FromStr for AccountRef {
    type Err = ChainQueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with("0x") || s.starts_with("0X") {
            return Address::from_str(s)
                .map(AccountRef::Address)
                .map_err(|e| ChainQueryError::InvalidAddress(format!("{s}: {e}")));
        }
        if s.contains('.') && !s.starts_with('.') && !s.ends_with('.') {
            return Ok(AccountRef::Name(s.to_string()));
        }
        Err(ChainQueryError::InvalidAddress(format!(
            "`{s}` is neither a hex address nor an ENS name"
        )))
    }
}

impl From<Address> for AccountRef {
    fn from(address: Address) -> Self {
        AccountRef::Address(address)
    }
}

impl fmt::Display for AccountRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountRef::Address(a) => write!(f, "{a}"),
            AccountRef::Name(n) => f.write_str(n),
        }
    }
}

/// Identity reported by the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInfo {
    /// Display name (`unknown` for chains outside the known table)
    pub name: String,
    /// Chain ID reported by `eth_chainId`
    pub chain_id: u64,
    /// ENS registry address, when the chain has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ens_registry: Option<Address>,
}

impl NetworkInfo {
    pub(crate) fn from_chain_id(chain_id: u64) -> Self {
        match known_network(chain_id) {
            Some(n) => Self {
                name: n.name.to_string(),
                chain_id,
                ens_registry: n.ens_registry,
            },
            None => Self {
                name: "unknown".to_string(),
                chain_id,
                ens_registry: None,
            },
        }
    }

    /// Fail unless the endpoint reports the expected chain.
    pub fn ensure_chain_id(&self, expected: u64) -> Result<(), ChainQueryError> {
        if self.chain_id == expected {
            Ok(())
        } else {
            Err(ChainQueryError::ChainMismatch {
                expected,
                actual: self.chain_id,
            })
        }
    }
}

/// Block header summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInfo {
    /// Block height
    pub number: u64,
    /// Block hash
    pub hash: B256,
    /// Parent block hash
    pub parent_hash: B256,
    /// Unix timestamp in seconds
    pub timestamp: u64,
    /// Fee recipient
    pub miner: Address,
    pub gas_used: u64,
    pub gas_limit: u64,
    /// Base fee, absent before London
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_fee_per_gas: Option<u64>,
    /// Number of transactions included
    pub transaction_count: usize,
}

impl BlockInfo {
    /// Block timestamp as UTC, `None` if out of chrono's range.
    pub fn timestamp_utc(&self) -> Option<DateTime<Utc>> {
        i64::try_from(self.timestamp)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}

/// Current fee signals. Each field is `None` when the chain does not
/// support it; zero is a real value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeEstimate {
    /// Base fee of the latest block (EIP-1559)
    pub base_fee_per_gas: Option<Amount>,
    /// Suggested tip from `eth_maxPriorityFeePerGas`
    pub max_priority_fee_per_gas: Option<Amount>,
    /// `2 * base_fee + priority_fee`
    pub max_fee_per_gas: Option<Amount>,
    /// Legacy `eth_gasPrice`
    pub gas_price: Option<Amount>,
}

impl FeeEstimate {
    pub fn supports_fee_market(&self) -> bool {
        self.base_fee_per_gas.is_some()
    }
}

/// ERC-20 token metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    /// Token contract address
    pub address: Address,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Token balance information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBalance {
    pub token: TokenMetadata,
    /// Account the balance belongs to
    pub owner: Address,
    /// Balance in the token's smallest unit
    pub balance_raw: Amount,
    /// Balance formatted with the token's decimals
    pub balance_formatted: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_ref_parses_address_and_name() {
        let addr: AccountRef = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045".parse().unwrap();
        assert!(matches!(addr, AccountRef::Address(_)));

        let name: AccountRef = "vitalik.eth".parse().unwrap();
        assert_eq!(name, AccountRef::Name("vitalik.eth".to_string()));
    }

    #[test]
    fn account_ref_rejects_garbage() {
        assert!(matches!(
            "0x1234".parse::<AccountRef>(),
            Err(ChainQueryError::InvalidAddress(_))
        ));
        assert!(matches!(
            "vitalik".parse::<AccountRef>(),
            Err(ChainQueryError::InvalidAddress(_))
        ));
        assert!("eth.".parse::<AccountRef>().is_err());
    }

    #[test]
    fn endpoint_rejects_non_http_scheme() {
        assert!(Endpoint::new("https://rpc.example.org/v2/key").is_ok());
        assert!(matches!(
            Endpoint::new("ws://rpc.example.org"),
            Err(ChainQueryError::InvalidRpcUrl(_))
        ));
        assert!(matches!(
            Endpoint::new("not a url"),
            Err(ChainQueryError::InvalidRpcUrl(_))
        ));
    }

    #[test]
    fn endpoint_display_hides_path() {
        let endpoint = Endpoint::new("https://eth.example.org/v2/secret-key").unwrap();
        assert_eq!(endpoint.to_string(), "https://eth.example.org");
    }

    #[test]
    fn network_info_names_known_chains() {
        let mainnet = NetworkInfo::from_chain_id(1);
        assert_eq!(mainnet.name, "mainnet");
        assert_eq!(mainnet.ens_registry, Some(ENS_REGISTRY));

        let other = NetworkInfo::from_chain_id(43114);
        assert_eq!(other.name, "unknown");
        assert_eq!(other.ens_registry, None);
    }

    #[test]
    fn ensure_chain_id_reports_mismatch() {
        let info = NetworkInfo::from_chain_id(11_155_111);
        assert!(info.ensure_chain_id(11_155_111).is_ok());
        assert!(matches!(
            info.ensure_chain_id(1),
            Err(ChainQueryError::ChainMismatch {
                expected: 1,
                actual: 11_155_111
            })
        ));
    }

    #[test]
    fn block_timestamp_converts_to_utc() {
        let block = BlockInfo {
            number: 0,
            hash: B256::ZERO,
            parent_hash: B256::ZERO,
            timestamp: 1_438_269_973,
            miner: Address::ZERO,
            gas_used: 0,
            gas_limit: 5000,
            base_fee_per_gas: None,
            transaction_count: 0,
        };
        let ts = block.timestamp_utc().unwrap();
        assert_eq!(ts.to_rfc3339(), "2015-07-30T15:26:13+00:00");
    }

    #[test]
    fn fee_estimate_distinguishes_absent_from_zero() {
        let legacy = FeeEstimate {
            gas_price: Some(U256::from(1u64)),
            ..Default::default()
        };
        assert!(!legacy.supports_fee_market());

        let zero_base = FeeEstimate {
            base_fee_per_gas: Some(U256::ZERO),
            ..Default::default()
        };
        assert!(zero_base.supports_fee_market());
    }
}
