// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Caller-supplied timeout and cancellation for queries.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::error::ChainQueryError;

/// Per-call limits. The default applies none.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Abort the call after this long
    pub timeout: Option<Duration>,
    /// Abort the call when this token is cancelled
    pub cancel: Option<CancellationToken>,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Run `fut` under these options.
    ///
    /// A timeout surfaces as a network error, a cancelled token as
    /// [`ChainQueryError::Cancelled`]. Both carry the operation context.
    pub async fn run<T, F>(
        &self,
        operation: &'static str,
        argument: &str,
        fut: F,
    ) -> Result<T, ChainQueryError>
    where
        F: Future<Output = Result<T, ChainQueryError>>,
    {
        let bounded = async {
            match self.timeout {
                Some(limit) => match tokio::time::timeout(limit, fut).await {
                    Ok(result) => result,
                    Err(_) => Err(ChainQueryError::Network {
                        operation,
                        argument: argument.to_string(),
                        message: format!("timed out after {limit:?}"),
                    }),
                },
                None => fut.await,
            }
        };

        match &self.cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(ChainQueryError::Cancelled {
                        operation,
                        argument: argument.to_string(),
                    }),
                    result = bounded => result,
                }
            }
            None => bounded.await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn slow() -> Result<u64, ChainQueryError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(1)
    }

    #[tokio::test]
    async fn no_options_passes_result_through() {
        let result = CallOptions::new()
            .run("get_block_number", "", async { Ok::<_, ChainQueryError>(7u64) })
            .await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn timeout_maps_to_network_error() {
        let options = CallOptions::new().with_timeout(Duration::from_millis(10));
        let err = options.run("get_balance", "vitalik.eth", slow()).await.unwrap_err();

        match err {
            ChainQueryError::Network {
                operation,
                argument,
                message,
            } => {
                assert_eq!(operation, "get_balance");
                assert_eq!(argument, "vitalik.eth");
                assert!(message.contains("timed out"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn cancelled_token_aborts_call() {
        let token = CancellationToken::new();
        token.cancel();

        let options = CallOptions::new().with_cancellation(token);
        let err = options.run("get_logs", "Transfer", slow()).await.unwrap_err();
        assert!(matches!(err, ChainQueryError::Cancelled { operation: "get_logs", .. }));
    }
}
