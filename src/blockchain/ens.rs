// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! ENS name resolution through the registry on the connected chain.

use alloy::{
    primitives::{keccak256, Address, B256},
    providers::Provider,
    sol,
};

use super::error::ChainQueryError;

sol! {
    #[sol(rpc)]
    interface IEnsRegistry {
        function resolver(bytes32 node) external view returns (address);
    }

    #[sol(rpc)]
    interface IEnsResolver {
        function addr(bytes32 node) external view returns (address);
    }
}

/// EIP-137 namehash. Labels are lowercased; full UTS-46 normalisation is
/// left to the caller.
pub fn namehash(name: &str) -> B256 {
    let mut node = B256::ZERO;
    if name.is_empty() {
        return node;
    }
    for label in name.rsplit('.') {
        let label_hash = keccak256(label.to_lowercase().as_bytes());
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(node.as_slice());
        buf[32..].copy_from_slice(label_hash.as_slice());
        node = keccak256(buf);
    }
    node
}

/// Resolve `name` to an address via the registry at `registry`.
///
/// Transport failures stay network errors; anything the contracts answer
/// that is not a usable address is a resolution error.
pub(crate) async fn resolve<P: Provider + Clone>(
    provider: &P,
    operation: &'static str,
    registry: Address,
    name: &str,
) -> Result<Address, ChainQueryError> {
    let node = namehash(name);

    let registry = IEnsRegistry::new(registry, provider.clone());
    let resolver: Address = registry
        .resolver(node)
        .call()
        .await
        .map_err(|e| resolution_error(operation, name, "resolver", e))?;

    if resolver.is_zero() {
        return Err(ChainQueryError::Resolution {
            name: name.to_string(),
            reason: "no resolver set".to_string(),
        });
    }

    let resolver = IEnsResolver::new(resolver, provider.clone());
    let address: Address = resolver
        .addr(node)
        .call()
        .await
        .map_err(|e| resolution_error(operation, name, "addr", e))?;

    if address.is_zero() {
        return Err(ChainQueryError::Resolution {
            name: name.to_string(),
            reason: "resolver has no address record".to_string(),
        });
    }

    tracing::debug!(name = %name, address = %address, "Resolved ENS name");
    Ok(address)
}

fn resolution_error(
    operation: &'static str,
    name: &str,
    step: &str,
    err: alloy::contract::Error,
) -> ChainQueryError {
    match ChainQueryError::from_contract(operation, name, err) {
        network @ ChainQueryError::Network { .. } => network,
        other => ChainQueryError::Resolution {
            name: name.to_string(),
            reason: format!("{step} lookup failed: {other}"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namehash_matches_eip137_vectors() {
        assert_eq!(namehash(""), B256::ZERO);
        assert_eq!(
            format!("{:#x}", namehash("eth")),
            "0x93cdeb708b7545dc668eb9280176169d1c33cfd8ed6f04690a0bcc88a93fc4ae"
        );
        assert_eq!(
            format!("{:#x}", namehash("foo.eth")),
            "0xde9b09fd7c5f901e23a3f19fecc54828e9c848539801e86591bd9801b019f84f"
        );
    }

    #[test]
    fn namehash_is_case_insensitive() {
        assert_eq!(namehash("Vitalik.ETH"), namehash("vitalik.eth"));
    }
}
