use std::fmt;

use bincode::error::EncodeError;
use reqwest::Error as ReqwestError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("网络请求失败: {0}")]
    Network(#[from] ReqwestError),
    #[error("序列化交易失败: {0}")]
    Encode(#[from] EncodeError),
    #[error("中继返回错误: {0}")]
    Rpc(String),
    #[error("{0}")]
    Malformed(String),
}

impl RelayError {
    pub fn malformed(reason: impl fmt::Display) -> Self {
        Self::Malformed(reason.to_string())
    }
}
