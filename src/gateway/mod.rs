use std::sync::Arc;
use std::time::Duration;

use futures::future::try_join_all;
use solana_client::client_error::ClientError;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use thiserror::Error;
use tracing::{debug, info};

use crate::balance::BalanceSnapshot;

const CONFIRM_POLL_INTERVAL: Duration = Duration::from_millis(400);

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("账本网关请求失败: {0}")]
    Rpc(#[from] ClientError),
    #[error("交易 {signature} 上链失败: {error}")]
    Failed { signature: String, error: String },
}

/// 账本网关适配器：只做余额读取、最新 blockhash 与确认轮询，
/// 超时由网关自身约束，这里不额外设限。
#[derive(Clone)]
pub struct LedgerGateway {
    rpc: Arc<RpcClient>,
}

impl LedgerGateway {
    pub fn new(rpc: Arc<RpcClient>) -> Self {
        Self { rpc }
    }

    pub async fn latest_blockhash(&self) -> Result<Hash, GatewayError> {
        let blockhash = self.rpc.get_latest_blockhash().await?;
        debug!(target: "gateway", blockhash = %blockhash, "获取最新 blockhash");
        Ok(blockhash)
    }

    /// 并发读取各账户余额并按账户合并；账户之间互不依赖，不要求顺序。
    pub async fn snapshot(&self, accounts: &[Pubkey]) -> Result<BalanceSnapshot, GatewayError> {
        let reads = accounts.iter().map(|account| {
            let rpc = Arc::clone(&self.rpc);
            let account = *account;
            async move {
                let lamports = rpc.get_balance(&account).await?;
                Ok::<(Pubkey, u64), GatewayError>((account, lamports))
            }
        });
        let pairs = try_join_all(reads).await?;
        Ok(BalanceSnapshot::from_pairs(pairs))
    }

    /// 并发等待每个签名确认；任一交易在链上执行失败视为基础设施错误上抛。
    pub async fn confirm_signatures(&self, signatures: &[Signature]) -> Result<(), GatewayError> {
        let waits = signatures
            .iter()
            .map(|signature| self.await_confirmation(*signature));
        try_join_all(waits).await?;
        Ok(())
    }

    async fn await_confirmation(&self, signature: Signature) -> Result<(), GatewayError> {
        loop {
            match self.rpc.get_signature_status(&signature).await? {
                Some(Ok(())) => {
                    info!(target: "gateway", signature = %signature, "交易已确认");
                    return Ok(());
                }
                Some(Err(err)) => {
                    return Err(GatewayError::Failed {
                        signature: signature.to_string(),
                        error: err.to_string(),
                    });
                }
                None => tokio::time::sleep(CONFIRM_POLL_INTERVAL).await,
            }
        }
    }
}
