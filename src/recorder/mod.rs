use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use solana_sdk::transaction::Transaction;
use tracing::info;

use crate::builder;
use crate::scenario::Scenario;

/// 一次运行的留档：交易的线上编码字节与场景名，供离线排查。
#[derive(Debug, Serialize, Deserialize)]
pub struct RunArtifact {
    pub transactions: Vec<Vec<u8>>,
    pub mode: String,
}

/// 每次运行覆盖写入同一产物文件，不保留历史。
#[derive(Clone)]
pub struct RunRecorder {
    path: PathBuf,
}

impl RunRecorder {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn record(&self, scenario: Scenario, transactions: &[Transaction]) -> Result<()> {
        let encoded = transactions
            .iter()
            .map(|transaction| {
                builder::serialize_transaction(transaction)
                    .map_err(|err| anyhow::anyhow!("序列化交易失败: {err}"))
            })
            .collect::<Result<Vec<_>>>()?;
        let artifact = RunArtifact {
            transactions: encoded,
            mode: scenario.name().to_string(),
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("创建产物目录失败: {}", parent.display()))?;
            }
        }
        let json = serde_json::to_vec_pretty(&artifact).context("序列化运行产物失败")?;
        fs::write(&self.path, json)
            .with_context(|| format!("写入产物文件失败: {}", self.path.display()))?;
        info!(
            target: "recorder",
            path = %self.path.display(),
            transactions = artifact.transactions.len(),
            mode = artifact.mode.as_str(),
            "运行产物已写入"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::hash::Hash;
    use solana_sdk::pubkey::Pubkey;
    use solana_sdk::signature::{Keypair, Signer};

    fn signed_transfer(signer: &Keypair, lamports: u64) -> Transaction {
        let mut tx = builder::build_transfer(
            &signer.pubkey(),
            &Pubkey::new_unique(),
            lamports,
            Hash::new_unique(),
        );
        builder::sign_transfer(&mut tx, signer).unwrap();
        tx
    }

    #[test]
    fn record_writes_readable_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("artifacts").join("last_run.json");
        let recorder = RunRecorder::new(path.clone());
        let signer = Keypair::new();
        let transactions = vec![signed_transfer(&signer, 10_000), signed_transfer(&signer, 20_000)];

        recorder
            .record(Scenario::ValidBundle, &transactions)
            .unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        let artifact: RunArtifact = serde_json::from_str(&raw).unwrap();
        assert_eq!(artifact.mode, "valid-bundle");
        assert_eq!(artifact.transactions.len(), 2);
        let decoded = builder::deserialize_transaction(&artifact.transactions[0]).unwrap();
        assert_eq!(decoded.signatures, transactions[0].signatures);
    }

    #[test]
    fn record_overwrites_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("last_run.json");
        let recorder = RunRecorder::new(path.clone());
        let signer = Keypair::new();

        recorder
            .record(Scenario::ValidSingle, &[signed_transfer(&signer, 1)])
            .unwrap();
        recorder
            .record(Scenario::InvalidSingle, &[signed_transfer(&signer, 2)])
            .unwrap();

        let artifact: RunArtifact =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(artifact.mode, "invalid-single");
        assert_eq!(artifact.transactions.len(), 1);
    }
}
