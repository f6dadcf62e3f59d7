use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use solana_sdk::signature::{Keypair, Signature, Signer};
use solana_sdk::transaction::Transaction;
use tracing::{info, warn};

use crate::balance::{self, VerificationReport};
use crate::builder;
use crate::gateway::LedgerGateway;
use crate::recorder::RunRecorder;
use crate::relay::{RelayClient, SubmissionOutcome};
use crate::wallet;

use super::{RelayOp, Scenario};

/// 场景执行器：串起 构造 → 签名 → 提交 → 确认 → 校验 → 持久化。
/// 每次进程只跑一个场景，组件在构造时显式注入。
pub struct ScenarioRunner {
    relay: RelayClient,
    gateway: LedgerGateway,
    recorder: RunRecorder,
    signer: Arc<Keypair>,
    transfer_lamports: u64,
    fee_lamports: u64,
}

impl ScenarioRunner {
    pub fn new(
        relay: RelayClient,
        gateway: LedgerGateway,
        recorder: RunRecorder,
        signer: Arc<Keypair>,
        transfer_lamports: u64,
        fee_lamports: u64,
    ) -> Self {
        Self {
            relay,
            gateway,
            recorder,
            signer,
            transfer_lamports,
            fee_lamports,
        }
    }

    pub async fn run(&self, scenario: Scenario) -> Result<VerificationReport> {
        let spec = scenario.spec();
        let sender = self.signer.pubkey();
        info!(
            target: "scenario::runner",
            scenario = %scenario,
            sender = %sender,
            "开始执行场景"
        );

        // Initialized → RecipientsCreated
        let recipients = wallet::fresh_recipients(spec.recipients);
        info!(
            target: "scenario::runner",
            count = recipients.len(),
            "已生成全新收款账户"
        );

        let mut observed = vec![sender];
        observed.extend_from_slice(&recipients);
        let before = self
            .gateway
            .snapshot(&observed)
            .await
            .context("提交前余额采样失败")?;

        // RecipientsCreated → TransactionsBuilt
        let legs = scenario.legs(self.transfer_lamports);
        let live_blockhash = self
            .gateway
            .latest_blockhash()
            .await
            .context("获取最新 blockhash 失败")?;
        let mut transactions: Vec<Transaction> = legs
            .iter()
            .zip(&recipients)
            .map(|(leg, recipient)| {
                let blockhash = if leg.stale {
                    builder::stale_blockhash()
                } else {
                    live_blockhash
                };
                builder::build_transfer(&sender, recipient, leg.amount, blockhash)
            })
            .collect();
        info!(
            target: "scenario::runner",
            count = transactions.len(),
            stale_leg = ?spec.stale_leg,
            "转账交易构造完成"
        );

        // TransactionsBuilt → Signed
        for transaction in &mut transactions {
            builder::sign_transfer(transaction, self.signer.as_ref())?;
        }

        // Signed → Submitted
        let outcome = match spec.relay_op {
            RelayOp::Single => match self.relay.submit_single(&transactions[0]).await {
                Ok(signature) => SubmissionOutcome::classify(vec![signature], 1),
                Err(err) if scenario.expects_submission_error() => {
                    warn!(
                        target: "scenario::runner",
                        scenario = %scenario,
                        error = %err,
                        "单笔提交被中继拒绝，属该场景预期结果"
                    );
                    SubmissionOutcome::Rejected
                }
                Err(err) => return Err(anyhow!("单笔提交失败: {err}")),
            },
            RelayOp::Bundle => {
                let signatures = self
                    .relay
                    .submit_bundle(&transactions)
                    .await
                    .context("捆绑提交失败")?;
                SubmissionOutcome::classify(signatures, transactions.len())
            }
        };
        info!(
            target: "scenario::runner",
            outcome = outcome.label(),
            settled = outcome.settled_count(),
            "提交阶段完成"
        );

        // Submitted → Confirmed（无返回签名时按构造跳过确认）
        if !outcome.signatures().is_empty() {
            let signatures = outcome
                .signatures()
                .iter()
                .map(|raw| {
                    Signature::from_str(raw)
                        .map_err(|err| anyhow!("中继返回的签名 {raw} 非法: {err}"))
                })
                .collect::<Result<Vec<_>>>()?;
            self.gateway
                .confirm_signatures(&signatures)
                .await
                .context("等待交易确认失败")?;
        }

        // Confirmed → Verified
        let after = self
            .gateway
            .snapshot(&observed)
            .await
            .context("提交后余额采样失败")?;
        let expected = scenario.expected_deltas(
            sender,
            &recipients,
            self.transfer_lamports,
            self.fee_lamports,
        );
        let report = balance::verify(
            &expected,
            &before,
            &after,
            spec.expected_settled,
            outcome.settled_count(),
        );
        self.report_verdicts(scenario, &report);

        // Verified → Persisted
        self.recorder.record(scenario, &transactions)?;
        Ok(report)
    }

    fn report_verdicts(&self, scenario: Scenario, report: &VerificationReport) {
        if !report.settled_count_matches() {
            warn!(
                target: "scenario::runner",
                scenario = %scenario,
                expected = report.settled_expected,
                actual = report.settled_actual,
                "入账笔数与场景预期不符"
            );
        }
        for verdict in &report.verdicts {
            if verdict.passed() {
                info!(
                    target: "scenario::runner",
                    account = %verdict.account,
                    delta = verdict.actual,
                    "账户差额符合预期"
                );
            } else {
                warn!(
                    target: "scenario::runner",
                    account = %verdict.account,
                    expected = verdict.expected,
                    actual = verdict.actual,
                    "账户差额与预期不符"
                );
            }
        }
    }
}
