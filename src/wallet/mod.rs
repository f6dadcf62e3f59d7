use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};

/// 从本地文件读取付款钱包。文件内容为私钥字节的 JSON 整数数组，
/// 本工具只读取，生成与充值由外部流程负责。
pub fn load_keypair(path: &Path) -> Result<Arc<Keypair>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("读取钱包文件失败: {}", path.display()))?;
    let keypair = parse_keypair_json(&raw)
        .with_context(|| format!("钱包文件 {} 内容非法", path.display()))?;
    Ok(Arc::new(keypair))
}

fn parse_keypair_json(raw: &str) -> Result<Keypair> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("钱包文件为空"));
    }
    let bytes: Vec<u8> = serde_json::from_str(trimmed).context("期望 JSON 整数数组")?;
    Keypair::try_from(bytes.as_slice()).map_err(|err| anyhow!("私钥字节非法: {err}"))
}

/// 为场景生成全新的收款账户，只需要公钥引用。
pub fn fresh_recipients(count: usize) -> Vec<Pubkey> {
    (0..count).map(|_| Keypair::new().pubkey()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_keypair_json_round_trips_secret_bytes() {
        let keypair = Keypair::new();
        let raw = serde_json::to_string(&keypair.to_bytes().to_vec()).unwrap();
        let parsed = parse_keypair_json(&raw).unwrap();
        assert_eq!(parsed.pubkey(), keypair.pubkey());
    }

    #[test]
    fn parse_keypair_json_rejects_empty_and_short_input() {
        assert!(parse_keypair_json("").is_err());
        assert!(parse_keypair_json("[1, 2, 3]").is_err());
        assert!(parse_keypair_json("not json").is_err());
    }

    #[test]
    fn fresh_recipients_are_distinct() {
        let recipients = fresh_recipients(2);
        assert_eq!(recipients.len(), 2);
        assert_ne!(recipients[0], recipients[1]);
    }

    #[test]
    fn load_keypair_reads_json_array_file() {
        let keypair = Keypair::new();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallet.json");
        fs::write(
            &path,
            serde_json::to_string(&keypair.to_bytes().to_vec()).unwrap(),
        )
        .unwrap();
        let loaded = load_keypair(&path).unwrap();
        assert_eq!(loaded.pubkey(), keypair.pubkey());
    }
}
