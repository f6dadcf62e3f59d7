use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use solana_client::nonblocking::rpc_client::RpcClient;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

mod balance;
mod builder;
mod config;
mod gateway;
mod recorder;
mod relay;
mod scenario;
mod wallet;

use gateway::LedgerGateway;
use recorder::RunRecorder;
use relay::RelayClient;
use scenario::Scenario;
use scenario::runner::ScenarioRunner;

#[derive(Parser, Debug)]
#[command(name = "magellan", version, about = "交易中继端到端正确性校验工具")]
struct Cli {
    /// 要执行的校验场景，每次运行恰好一个
    #[arg(value_enum, value_name = "SCENARIO")]
    scenario: Scenario,
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = config::load_from_env()?;
    info!(
        target: "magellan",
        scenario = %cli.scenario,
        relay = config.relay_url.as_str(),
        gateway = config.gateway_url.as_str(),
        "配置加载完成"
    );

    let signer = wallet::load_keypair(&config.keypair_path)?;
    let gateway = LedgerGateway::new(Arc::new(RpcClient::new(config.gateway_url.clone())));
    let relay = RelayClient::new(config.relay_url.clone(), reqwest::Client::builder().build()?);
    let recorder = RunRecorder::new(config.artifact_path.clone());

    let runner = ScenarioRunner::new(
        relay,
        gateway,
        recorder,
        signer,
        config.transfer_lamports,
        config.fee_lamports,
    );
    let report = runner.run(cli.scenario).await?;

    if report.all_passed() {
        info!(
            target: "magellan",
            scenario = %cli.scenario,
            accounts = report.verdicts.len(),
            "场景校验通过"
        );
    } else {
        warn!(
            target: "magellan",
            scenario = %cli.scenario,
            failed_accounts = report.failed_accounts(),
            settled_expected = report.settled_expected,
            settled_actual = report.settled_actual,
            "场景校验存在差异，详情见上方逐账户结论"
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();
}
