//! Solana RPC client for direct blockchain reading

use async_trait::async_trait;
use solana_account_decoder::UiAccountEncoding;
use solana_client::client_error::ClientError;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig};
use solana_client::rpc_filter::{Memcmp, MemcmpEncodedBytes, RpcFilterType};
use solana_sdk::account::Account;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;
use crate::domain::accounts::{AccountFilter, AccountSource, KeyedAccount};
use crate::shared::errors::BlockchainError;
use super::retry::RetryPolicy;

/// Solana RPC client wrapper with throttling and rate-limit retries
pub struct SolanaRpcClient {
    client: RpcClient,
    retry: RetryPolicy,
    request_delay: Duration,
}

impl SolanaRpcClient {
    /// Create new RPC client
    pub fn new(rpc_url: String, commitment: CommitmentConfig, retry: RetryPolicy, request_delay: Duration) -> Self {
        Self {
            client: RpcClient::new_with_commitment(rpc_url, commitment),
            retry,
            request_delay,
        }
    }

    pub fn url(&self) -> String {
        self.client.url()
    }

    /// Throttle, run, and retry a single RPC call
    async fn call<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T, BlockchainError>
    where
        T: Send,
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T, ClientError>> + Send,
    {
        let delay = self.request_delay;
        self.retry
            .run(label, || {
                let request = op();
                async move {
                    if !delay.is_zero() {
                        sleep(delay).await;
                    }
                    request
                        .await
                        .map_err(|e| BlockchainError::from_rpc_message(e.to_string()))
                }
            })
            .await
    }
}

fn to_rpc_filter(filter: &AccountFilter) -> RpcFilterType {
    match filter {
        AccountFilter::DataSize(size) => RpcFilterType::DataSize(*size),
        AccountFilter::Memcmp { offset, bytes } => RpcFilterType::Memcmp(Memcmp::new(
            *offset,
            MemcmpEncodedBytes::Base58(bs58::encode(bytes).into_string()),
        )),
    }
}

#[async_trait]
impl AccountSource for SolanaRpcClient {
    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        filters: &[AccountFilter],
    ) -> Result<Vec<KeyedAccount>, BlockchainError> {
        let config = RpcProgramAccountsConfig {
            filters: Some(filters.iter().map(to_rpc_filter).collect()),
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                commitment: Some(self.client.commitment()),
                ..RpcAccountInfoConfig::default()
            },
            ..RpcProgramAccountsConfig::default()
        };

        let client = &self.client;
        let accounts = self
            .call("getProgramAccounts", move || {
                let config = config.clone();
                async move { client.get_program_accounts_with_config(program_id, config).await }
            })
            .await?;
        debug!("getProgramAccounts {}: {} accounts", program_id, accounts.len());

        Ok(accounts
            .into_iter()
            .map(|(pubkey, account)| KeyedAccount { pubkey, account })
            .collect())
    }

    async fn get_multiple_accounts(
        &self,
        addresses: &[Pubkey],
    ) -> Result<Vec<Option<Account>>, BlockchainError> {
        if addresses.is_empty() {
            return Ok(Vec::new());
        }
        let client = &self.client;
        self.call("getMultipleAccounts", move || async move {
            client.get_multiple_accounts(addresses).await
        })
        .await
    }
}
