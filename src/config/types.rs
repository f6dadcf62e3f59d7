use std::path::PathBuf;

pub const DEFAULT_KEYPAIR_PATH: &str = "wallet.json";
pub const DEFAULT_ARTIFACT_PATH: &str = "run_artifacts.json";
pub const DEFAULT_TRANSFER_LAMPORTS: u64 = 10_000;
pub const DEFAULT_FEE_LAMPORTS: u64 = 5_000;

/// 进程启动时一次性加载的全量配置，之后显式传入各组件，不再隐式读取环境。
#[derive(Clone, Debug)]
pub struct HarnessConfig {
    pub relay_url: String,
    pub gateway_url: String,
    pub keypair_path: PathBuf,
    pub artifact_path: PathBuf,
    pub transfer_lamports: u64,
    pub fee_lamports: u64,
}

impl HarnessConfig {
    pub fn new(relay_url: String, gateway_url: String) -> Self {
        Self {
            relay_url,
            gateway_url,
            keypair_path: PathBuf::from(DEFAULT_KEYPAIR_PATH),
            artifact_path: PathBuf::from(DEFAULT_ARTIFACT_PATH),
            transfer_lamports: DEFAULT_TRANSFER_LAMPORTS,
            fee_lamports: DEFAULT_FEE_LAMPORTS,
        }
    }
}
