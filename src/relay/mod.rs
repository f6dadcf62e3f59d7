mod error;

pub use error::RelayError;

use bincode::config::legacy;
use bincode::serde::encode_to_vec;
use reqwest::Client;
use serde_json::{Value, json};
use solana_sdk::transaction::Transaction;
use tracing::debug;

pub const METHOD_SEND_TRANSACTION: &str = "sendTransaction";
pub const METHOD_SEND_BUNDLE: &str = "sendTransactionBundle";

/// 提交结果的归一化表示：按场景断言用，避免只依赖签名序列长度。
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// 中继整体拒绝，没有任何交易入账。
    Rejected,
    /// 原子捆绑只接受了前缀，签名数少于提交数。
    PartiallyAccepted(Vec<String>),
    /// 所有提交的交易均被接受。
    FullyAccepted(Vec<String>),
}

impl SubmissionOutcome {
    /// 按「返回签名数 / 提交数」归类中继的应答。
    pub fn classify(accepted: Vec<String>, submitted: usize) -> Self {
        if accepted.is_empty() {
            Self::Rejected
        } else if accepted.len() < submitted {
            Self::PartiallyAccepted(accepted)
        } else {
            Self::FullyAccepted(accepted)
        }
    }

    pub fn signatures(&self) -> &[String] {
        match self {
            Self::Rejected => &[],
            Self::PartiallyAccepted(signatures) | Self::FullyAccepted(signatures) => signatures,
        }
    }

    pub fn settled_count(&self) -> usize {
        self.signatures().len()
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Rejected => "rejected",
            Self::PartiallyAccepted(_) => "partially-accepted",
            Self::FullyAccepted(_) => "fully-accepted",
        }
    }
}

#[derive(Clone)]
pub struct RelayClient {
    endpoint: String,
    client: Client,
}

impl RelayClient {
    pub fn new(endpoint: String, client: Client) -> Self {
        Self { endpoint, client }
    }

    /// 单笔提交。成功返回签名字符串；中继拒绝与传输失败同样以错误抛出，
    /// 二者只能靠场景上下文区分，客户端不做重试。
    pub async fn submit_single(&self, transaction: &Transaction) -> Result<String, RelayError> {
        let encoded = encode_transaction(transaction)?;
        let payload = single_request_payload(&encoded);
        let result = self.post(&payload).await?;
        result
            .as_str()
            .map(|signature| signature.to_string())
            .ok_or_else(|| RelayError::malformed("sendTransaction result 不是签名字符串"))
    }

    /// 捆绑提交。返回中继实际接受的签名序列，长度可能短于提交数，
    /// 由调用方按场景解读。
    pub async fn submit_bundle(
        &self,
        transactions: &[Transaction],
    ) -> Result<Vec<String>, RelayError> {
        let encoded = transactions
            .iter()
            .map(encode_transaction)
            .collect::<Result<Vec<_>, _>>()?;
        let payload = bundle_request_payload(&encoded);
        let result = self.post(&payload).await?;
        let entries = result
            .as_array()
            .ok_or_else(|| RelayError::malformed("sendTransactionBundle result 不是数组"))?;
        entries
            .iter()
            .map(|entry| {
                entry
                    .as_str()
                    .map(|signature| signature.to_string())
                    .ok_or_else(|| RelayError::malformed("捆绑应答包含非字符串签名"))
            })
            .collect()
    }

    async fn post(&self, payload: &Value) -> Result<Value, RelayError> {
        debug!(
            target: "relay::client",
            endpoint = self.endpoint.as_str(),
            request = %payload,
            "提交中继请求"
        );
        let response = self
            .client
            .post(&self.endpoint)
            .json(payload)
            .send()
            .await
            .map_err(RelayError::Network)?
            .error_for_status()
            .map_err(RelayError::Network)?;

        let value: Value = response.json().await.map_err(RelayError::Network)?;
        debug!(
            target: "relay::client",
            endpoint = self.endpoint.as_str(),
            response = %value,
            "收到中继应答"
        );
        extract_result(value)
    }
}

fn encode_transaction(transaction: &Transaction) -> Result<String, RelayError> {
    let bytes = encode_to_vec(transaction, legacy())?;
    Ok(bs58::encode(bytes).into_string())
}

fn single_request_payload(encoded: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": METHOD_SEND_TRANSACTION,
        "params": [encoded, submit_options()],
    })
}

fn bundle_request_payload(encoded: &[String]) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": METHOD_SEND_BUNDLE,
        "params": [encoded, submit_options()],
    })
}

// 刻意跳过预检，让非法交易到达中继自身的校验逻辑。
fn submit_options() -> Value {
    json!({ "skipPreflight": true, "encoding": "base58" })
}

fn extract_result(value: Value) -> Result<Value, RelayError> {
    if let Some(error) = value.get("error") {
        return Err(RelayError::Rpc(error.to_string()));
    }
    match value.get("result") {
        Some(result) => Ok(result.clone()),
        None => Err(RelayError::malformed("应答缺少 result 字段")),
    }
}
