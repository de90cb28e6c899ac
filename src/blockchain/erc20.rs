// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Read-only ERC-20 token queries.

use alloy::{
    primitives::{Address, U256},
    providers::Provider,
    sol,
};

use super::error::ChainQueryError;
use super::types::TokenMetadata;

// Only the view functions; transfers belong to the signing service.
sol! {
    #[sol(rpc)]
    interface IERC20 {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function balanceOf(address account) external view returns (uint256);
    }
}

/// ERC-20 contract wrapper.
pub struct Erc20Contract<P> {
    contract: IERC20::IERC20Instance<P>,
    address: Address,
}

impl<P: Provider + Clone> Erc20Contract<P> {
    /// Create a new ERC-20 contract instance.
    pub fn new(provider: &P, address: Address) -> Self {
        let contract = IERC20::new(address, provider.clone());
        Self { contract, address }
    }

    fn argument(&self) -> String {
        self.address.to_string()
    }

    /// Get the token name.
    pub async fn name(&self) -> Result<String, ChainQueryError> {
        self.contract
            .name()
            .call()
            .await
            .map_err(|e| ChainQueryError::from_contract("token_name", self.argument(), e))
    }

    /// Get the token symbol.
    pub async fn symbol(&self) -> Result<String, ChainQueryError> {
        self.contract
            .symbol()
            .call()
            .await
            .map_err(|e| ChainQueryError::from_contract("token_symbol", self.argument(), e))
    }

    /// Get the token decimals.
    pub async fn decimals(&self) -> Result<u8, ChainQueryError> {
        self.contract
            .decimals()
            .call()
            .await
            .map_err(|e| ChainQueryError::from_contract("token_decimals", self.argument(), e))
    }

    /// Get the raw balance of an address in the token's smallest unit.
    pub async fn balance_of(&self, owner: Address) -> Result<U256, ChainQueryError> {
        self.contract
            .balanceOf(owner)
            .call()
            .await
            .map_err(|e| {
                ChainQueryError::from_contract(
                    "token_balance",
                    format!("{}, {owner}", self.address),
                    e,
                )
            })
    }

    /// Fetch name, symbol and decimals, one call after another.
    pub async fn metadata(&self) -> Result<TokenMetadata, ChainQueryError> {
        let name = self.name().await?;
        let symbol = self.symbol().await?;
        let decimals = self.decimals().await?;

        Ok(TokenMetadata {
            address: self.address,
            name,
            symbol,
            decimals,
        })
    }
}
