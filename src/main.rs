// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `chain-query`: a tour of the read-only client against one endpoint.

use std::process::ExitCode;

use chain_query::blockchain::{format_ether, format_units, CallOptions, ChainQueryClient};
use chain_query::config::TourConfig;
use chain_query::logging::init_tracing;
use chain_query::ChainQueryError;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match TourConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_tracing(config.log_format) {
        eprintln!("failed to install tracing subscriber: {e}");
        return ExitCode::FAILURE;
    }

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Interrupted, cancelling in-flight query");
                cancel.cancel();
            }
        }
    });

    let mut options = CallOptions::new().with_cancellation(cancel);
    if let Some(timeout) = config.timeout {
        options = options.with_timeout(timeout);
    }
    let client = ChainQueryClient::new(config.endpoint.clone()).with_call_options(options);

    tracing::info!(endpoint = %client.endpoint(), "Starting provider tour");

    match run_tour(&client, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Tour failed");
            ExitCode::FAILURE
        }
    }
}

async fn run_tour(client: &ChainQueryClient, config: &TourConfig) -> Result<(), ChainQueryError> {
    let network = client.get_network_info().await?;
    println!("Network: {} (chain id {})", network.name, network.chain_id);
    if let Some(expected) = config.expected_chain_id {
        network.ensure_chain_id(expected)?;
    }

    let head = client.get_latest_block_height().await?;
    println!("Block number: {head}");

    let gas_price = client.get_gas_price().await?;
    println!("Gas price: {} gwei", format_units(gas_price, 9));

    let fees = client.get_fee_estimate().await?;
    print_json("Fee data", &fees);

    let genesis = client.get_block(0).await?;
    print_json("Genesis block", &genesis);

    let balance = client.get_balance(&config.account).await?;
    println!("Balance of {}: {} ETH", config.account, format_ether(balance));

    let nonce = client.get_transaction_count(&config.account).await?;
    println!("Transaction count of {}: {nonce}", config.account);

    if let Some(address) = config.code_address {
        let code = client.get_code(address).await?;
        println!("Code at {address}: {} bytes", code.len());
    }

    if let Some(events) = &config.events {
        let decoded = client
            .query_recent_events(events.contract, events.signature.clone(), events.lookback)
            .await?;
        println!(
            "{} {} event(s) from {} in the last {} blocks",
            decoded.len(),
            events.signature.name(),
            events.contract,
            events.lookback
        );
        for event in &decoded {
            print_json(events.signature.name(), event);
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(label: &str, value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{label}: {json}"),
        Err(e) => tracing::warn!(error = %e, "Failed to render {label}"),
    }
}
