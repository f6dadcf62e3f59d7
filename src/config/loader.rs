use std::env;
use std::path::PathBuf;

use thiserror::Error;

use super::types::{
    DEFAULT_FEE_LAMPORTS, DEFAULT_TRANSFER_LAMPORTS, HarnessConfig,
};

pub const ENV_RELAY_URL: &str = "MAGELLAN_RELAY_URL";
pub const ENV_GATEWAY_URL: &str = "MAGELLAN_GATEWAY_URL";
pub const ENV_KEYPAIR_PATH: &str = "MAGELLAN_KEYPAIR_PATH";
pub const ENV_ARTIFACT_PATH: &str = "MAGELLAN_ARTIFACT_PATH";
pub const ENV_TRANSFER_LAMPORTS: &str = "MAGELLAN_TRANSFER_LAMPORTS";
pub const ENV_FEE_LAMPORTS: &str = "MAGELLAN_FEE_LAMPORTS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("缺少必需环境变量 {0}，未开始任何工作")]
    MissingEnv(&'static str),
    #[error("环境变量 {name} 非法: {reason}")]
    InvalidEnv { name: &'static str, reason: String },
}

/// 启动时一次性从环境加载配置；中继与网关地址缺失属于致命错误。
pub fn load_from_env() -> Result<HarnessConfig, ConfigError> {
    let relay_url = require_env(ENV_RELAY_URL)?;
    let gateway_url = require_env(ENV_GATEWAY_URL)?;

    let mut config = HarnessConfig::new(relay_url, gateway_url);
    if let Some(path) = optional_env(ENV_KEYPAIR_PATH) {
        config.keypair_path = PathBuf::from(path);
    }
    if let Some(path) = optional_env(ENV_ARTIFACT_PATH) {
        config.artifact_path = PathBuf::from(path);
    }
    config.transfer_lamports = match optional_env(ENV_TRANSFER_LAMPORTS) {
        Some(raw) => parse_lamports(ENV_TRANSFER_LAMPORTS, &raw)?,
        None => DEFAULT_TRANSFER_LAMPORTS,
    };
    config.fee_lamports = match optional_env(ENV_FEE_LAMPORTS) {
        Some(raw) => parse_lamports(ENV_FEE_LAMPORTS, &raw)?,
        None => DEFAULT_FEE_LAMPORTS,
    };

    Ok(config)
}

fn require_env(name: &'static str) -> Result<String, ConfigError> {
    optional_env(name).ok_or(ConfigError::MissingEnv(name))
}

fn optional_env(name: &'static str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_lamports(name: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|err| ConfigError::InvalidEnv {
            name,
            reason: err.to_string(),
        })
}
