// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Read-only EVM chain client.
//!
//! [`ChainQueryClient`] is bound to one [`Endpoint`] and holds no state
//! beyond it: every query is a fresh round trip, nothing is cached and
//! nothing is retried. Construct it once and pass it to whoever needs it.

use alloy::{
    eips::BlockNumberOrTag,
    network::Ethereum,
    primitives::{Address, Bytes, U256},
    providers::{Provider, RootProvider},
    rpc::types::Block,
};

use super::ens;
use super::erc20::Erc20Contract;
use super::error::ChainQueryError;
use super::options::CallOptions;
use super::types::*;
use super::units::format_units;
use crate::events::{DecodedEvent, EventFilter, EventSignature};

/// Plain HTTP provider; read-only queries need no fillers.
type HttpProvider = RootProvider<Ethereum>;

/// Read-only chain query client.
#[derive(Clone)]
pub struct ChainQueryClient {
    /// Endpoint descriptor
    endpoint: Endpoint,
    /// Alloy HTTP provider
    provider: HttpProvider,
    /// Limits applied to every call made through this handle
    options: CallOptions,
}

impl std::fmt::Debug for ChainQueryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainQueryClient")
            .field("endpoint", &self.endpoint.to_string())
            .field("options", &self.options)
            .finish()
    }
}

impl ChainQueryClient {
    /// Create a new client for the given endpoint.
    pub fn new(endpoint: Endpoint) -> Self {
        let provider = RootProvider::<Ethereum>::new_http(endpoint.url().clone());

        Self {
            endpoint,
            provider,
            options: CallOptions::default(),
        }
    }

    /// Parse `rpc_url` and create a client for it.
    pub fn connect(rpc_url: &str) -> Result<Self, ChainQueryError> {
        Ok(Self::new(Endpoint::new(rpc_url)?))
    }

    /// A handle sharing this client's connection whose calls obey `options`.
    pub fn with_call_options(&self, options: CallOptions) -> Self {
        Self {
            options,
            ..self.clone()
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Get the balance of an account, resolving ENS names first.
    pub async fn get_balance(&self, account: &AccountRef) -> Result<Amount, ChainQueryError> {
        let argument = account.to_string();
        self.options
            .run("get_balance", &argument, async {
                let address = self.resolve_account("get_balance", account).await?;
                tracing::debug!(account = %argument, address = %address, "Querying balance");

                self.provider
                    .get_balance(address)
                    .await
                    .map_err(|e| ChainQueryError::from_rpc("get_balance", argument.as_str(), e))
            })
            .await
    }

    /// Get the chain identity the endpoint reports.
    ///
    /// The result is not compared against [`Endpoint::chain_id`]; use
    /// [`NetworkInfo::ensure_chain_id`] for that.
    pub async fn get_network_info(&self) -> Result<NetworkInfo, ChainQueryError> {
        self.options
            .run("get_network_info", "", async {
                let chain_id = self.chain_id("get_network_info", "").await?;
                Ok(NetworkInfo::from_chain_id(chain_id))
            })
            .await
    }

    /// Get the current block number.
    pub async fn get_latest_block_height(&self) -> Result<u64, ChainQueryError> {
        self.options
            .run("get_latest_block_height", "", async {
                self.provider
                    .get_block_number()
                    .await
                    .map_err(|e| ChainQueryError::from_rpc("get_latest_block_height", "", e))
            })
            .await
    }

    /// Get a block header by height. Heights above the chain head are
    /// [`ChainQueryError::NotFound`].
    pub async fn get_block(&self, height: u64) -> Result<BlockInfo, ChainQueryError> {
        let argument = height.to_string();
        self.options
            .run("get_block", &argument, async {
                let block = self
                    .provider
                    .get_block_by_number(BlockNumberOrTag::Number(height))
                    .await
                    .map_err(|e| ChainQueryError::from_rpc("get_block", argument.as_str(), e))?
                    .ok_or_else(|| ChainQueryError::NotFound {
                        operation: "get_block",
                        argument: argument.clone(),
                    })?;

                Ok(block_info(&block))
            })
            .await
    }

    /// Get the deployed bytecode at an address. Accounts without code
    /// yield empty bytes, not an error.
    pub async fn get_code(&self, address: Address) -> Result<Bytes, ChainQueryError> {
        let argument = address.to_string();
        self.options
            .run("get_code", &argument, async {
                self.provider
                    .get_code_at(address)
                    .await
                    .map_err(|e| ChainQueryError::from_rpc("get_code", argument.as_str(), e))
            })
            .await
    }

    /// Get the legacy gas price (`eth_gasPrice`).
    pub async fn get_gas_price(&self) -> Result<Amount, ChainQueryError> {
        self.options
            .run("get_gas_price", "", async {
                self.provider
                    .get_gas_price()
                    .await
                    .map(U256::from)
                    .map_err(|e| ChainQueryError::from_rpc("get_gas_price", "", e))
            })
            .await
    }

    /// Get current fee signals.
    ///
    /// The base fee comes from the latest block, the tip from
    /// `eth_maxPriorityFeePerGas` and `max_fee = 2 * base_fee + tip`.
    /// Fields the chain does not support stay `None`; RPC methods the
    /// endpoint does not implement count as unsupported.
    pub async fn get_fee_estimate(&self) -> Result<FeeEstimate, ChainQueryError> {
        const OP: &str = "get_fee_estimate";

        self.options
            .run(OP, "", async {
                let latest = self
                    .provider
                    .get_block_by_number(BlockNumberOrTag::Latest)
                    .await
                    .map_err(|e| ChainQueryError::from_rpc(OP, "latest", e))?
                    .ok_or_else(|| ChainQueryError::NotFound {
                        operation: OP,
                        argument: "latest".to_string(),
                    })?;

                let gas_price = unsupported_as_none(
                    self.provider
                        .get_gas_price()
                        .await
                        .map(U256::from)
                        .map_err(|e| ChainQueryError::from_rpc(OP, "eth_gasPrice", e)),
                )?;

                let base_fee_per_gas = latest.header.base_fee_per_gas.map(U256::from);

                let max_priority_fee_per_gas = match base_fee_per_gas {
                    Some(_) => unsupported_as_none(
                        self.provider
                            .get_max_priority_fee_per_gas()
                            .await
                            .map(U256::from)
                            .map_err(|e| {
                                ChainQueryError::from_rpc(OP, "eth_maxPriorityFeePerGas", e)
                            }),
                    )?,
                    None => None,
                };

                let max_fee_per_gas = match (base_fee_per_gas, max_priority_fee_per_gas) {
                    (Some(base), Some(tip)) => base
                        .checked_mul(U256::from(2u64))
                        .and_then(|doubled| doubled.checked_add(tip)),
                    _ => None,
                };

                Ok(FeeEstimate {
                    base_fee_per_gas,
                    max_priority_fee_per_gas,
                    max_fee_per_gas,
                    gas_price,
                })
            })
            .await
    }

    /// Number of transactions sent from an account.
    pub async fn get_transaction_count(&self, account: &AccountRef) -> Result<u64, ChainQueryError> {
        let argument = account.to_string();
        self.options
            .run("get_transaction_count", &argument, async {
                let address = self.resolve_account("get_transaction_count", account).await?;
                self.provider
                    .get_transaction_count(address)
                    .await
                    .map_err(|e| {
                        ChainQueryError::from_rpc("get_transaction_count", argument.as_str(), e)
                    })
            })
            .await
    }

    /// Resolve an ENS name on the connected chain.
    pub async fn resolve_name(&self, name: &str) -> Result<Address, ChainQueryError> {
        self.options
            .run("resolve_name", name, self.resolve_name_unbounded("resolve_name", name))
            .await
    }

    /// Query logs matching `filter` and decode each through its signature.
    ///
    /// Results are in chain order (block height, then log index). Any log
    /// that does not match the declared signature fails the whole query.
    pub async fn query_events(
        &self,
        filter: &EventFilter,
    ) -> Result<Vec<DecodedEvent>, ChainQueryError> {
        let argument = filter.to_string();
        self.options
            .run("query_events", &argument, async {
                let logs = self
                    .provider
                    .get_logs(&filter.to_rpc_filter())
                    .await
                    .map_err(|e| ChainQueryError::from_rpc("query_events", argument.as_str(), e))?;

                tracing::debug!(filter = %argument, logs = logs.len(), "Fetched logs");

                let mut events = logs
                    .iter()
                    .map(|log| {
                        DecodedEvent::from_log(filter.signature(), log).map_err(|source| {
                            ChainQueryError::Decode {
                                operation: "query_events",
                                argument: format!(
                                    "{argument} block {:?} log {:?}",
                                    log.block_number, log.log_index
                                ),
                                source,
                            }
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                events.sort_by_key(DecodedEvent::position);
                Ok(events)
            })
            .await
    }

    /// Query events over the last `lookback` blocks up to the current head.
    pub async fn query_recent_events(
        &self,
        address: Address,
        signature: EventSignature,
        lookback: u64,
    ) -> Result<Vec<DecodedEvent>, ChainQueryError> {
        let head = self.get_latest_block_height().await?;
        let filter = EventFilter::new(address, signature, head.saturating_sub(lookback), head)?;
        self.query_events(&filter).await
    }

    /// Get ERC-20 token metadata.
    pub async fn token_metadata(&self, token: Address) -> Result<TokenMetadata, ChainQueryError> {
        let argument = token.to_string();
        self.options
            .run("token_metadata", &argument, async {
                Erc20Contract::new(&self.provider, token).metadata().await
            })
            .await
    }

    /// Get an ERC-20 balance, formatted with the token's own decimals.
    pub async fn token_balance(
        &self,
        token: Address,
        owner: &AccountRef,
    ) -> Result<TokenBalance, ChainQueryError> {
        let argument = format!("{token}, {owner}");
        self.options
            .run("token_balance", &argument, async {
                let owner = self.resolve_account("token_balance", owner).await?;
                let contract = Erc20Contract::new(&self.provider, token);

                let metadata = contract.metadata().await?;
                let balance = contract.balance_of(owner).await?;

                Ok(TokenBalance {
                    balance_formatted: format_units(balance, metadata.decimals),
                    token: metadata,
                    owner,
                    balance_raw: balance,
                })
            })
            .await
    }

    /// Resolve on behalf of `operation`; errors carry its name.
    async fn resolve_account(
        &self,
        operation: &'static str,
        account: &AccountRef,
    ) -> Result<Address, ChainQueryError> {
        match account {
            AccountRef::Address(address) => Ok(*address),
            AccountRef::Name(name) => self.resolve_name_unbounded(operation, name).await,
        }
    }

    async fn resolve_name_unbounded(
        &self,
        operation: &'static str,
        name: &str,
    ) -> Result<Address, ChainQueryError> {
        let chain_id = self.chain_id(operation, name).await?;
        let network = NetworkInfo::from_chain_id(chain_id);
        let registry = network
            .ens_registry
            .ok_or_else(|| ChainQueryError::Resolution {
                name: name.to_string(),
                reason: format!("chain {chain_id} has no ENS registry"),
            })?;

        ens::resolve(&self.provider, operation, registry, name).await
    }

    async fn chain_id(
        &self,
        operation: &'static str,
        argument: &str,
    ) -> Result<u64, ChainQueryError> {
        self.provider
            .get_chain_id()
            .await
            .map_err(|e| ChainQueryError::from_rpc(operation, argument, e))
    }
}

/// Treat "method not found" as an unsupported (absent) value.
fn unsupported_as_none<T>(result: Result<T, ChainQueryError>) -> Result<Option<T>, ChainQueryError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_method_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

fn block_info(block: &Block) -> BlockInfo {
    let header = &block.header;
    BlockInfo {
        number: header.number,
        hash: header.hash,
        parent_hash: header.parent_hash,
        timestamp: header.timestamp,
        miner: header.beneficiary,
        gas_used: header.gas_used,
        gas_limit: header.gas_limit,
        base_fee_per_gas: header.base_fee_per_gas,
        transaction_count: block.transactions.len(),
    }
}
