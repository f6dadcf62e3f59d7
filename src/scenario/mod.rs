pub mod runner;

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use solana_sdk::pubkey::Pubkey;

/// 中继操作：单笔提交或原子捆绑提交。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelayOp {
    Single,
    Bundle,
}

/// 场景描述：收款方数量、过期引用所在的腿、中继操作与期望入账笔数。
/// 期望入账笔数是被测行为，不是协议保证。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScenarioSpec {
    pub recipients: usize,
    pub stale_leg: Option<usize>,
    pub relay_op: RelayOp,
    pub expected_settled: usize,
}

/// 单条转账腿的计划：金额与是否刻意使用过期 blockhash。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LegPlan {
    pub amount: u64,
    pub stale: bool,
}

/// 五个封闭枚举的校验场景，每次运行恰好执行其一。
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    ValidSingle,
    InvalidSingle,
    ValidBundle,
    InvalidBundleFirst,
    InvalidBundleSecond,
}

impl Scenario {
    pub const ALL: [Scenario; 5] = [
        Scenario::ValidSingle,
        Scenario::InvalidSingle,
        Scenario::ValidBundle,
        Scenario::InvalidBundleFirst,
        Scenario::InvalidBundleSecond,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::ValidSingle => "valid-single",
            Scenario::InvalidSingle => "invalid-single",
            Scenario::ValidBundle => "valid-bundle",
            Scenario::InvalidBundleFirst => "invalid-bundle-first",
            Scenario::InvalidBundleSecond => "invalid-bundle-second",
        }
    }

    pub fn spec(&self) -> ScenarioSpec {
        match self {
            Scenario::ValidSingle => ScenarioSpec {
                recipients: 1,
                stale_leg: None,
                relay_op: RelayOp::Single,
                expected_settled: 1,
            },
            Scenario::InvalidSingle => ScenarioSpec {
                recipients: 1,
                stale_leg: Some(0),
                relay_op: RelayOp::Single,
                expected_settled: 0,
            },
            Scenario::ValidBundle => ScenarioSpec {
                recipients: 2,
                stale_leg: None,
                relay_op: RelayOp::Bundle,
                expected_settled: 2,
            },
            Scenario::InvalidBundleFirst => ScenarioSpec {
                recipients: 2,
                stale_leg: Some(0),
                relay_op: RelayOp::Bundle,
                expected_settled: 0,
            },
            Scenario::InvalidBundleSecond => ScenarioSpec {
                recipients: 2,
                stale_leg: Some(1),
                relay_op: RelayOp::Bundle,
                expected_settled: 1,
            },
        }
    }

    /// 该场景是否期望单笔提交被中继直接拒绝（抛错）。
    pub fn expects_submission_error(&self) -> bool {
        matches!(self, Scenario::InvalidSingle)
    }

    /// 每条腿的转账计划；第 i 腿金额为 base × (i + 1)，便于区分两腿差额。
    pub fn legs(&self, base_lamports: u64) -> Vec<LegPlan> {
        let spec = self.spec();
        (0..spec.recipients)
            .map(|index| LegPlan {
                amount: base_lamports * (index as u64 + 1),
                stale: spec.stale_leg == Some(index),
            })
            .collect()
    }

    /// 场景声明的期望差额，顺序为 [付款方, 收款方 1, …]。
    /// 入账腿假定为捆绑的合法前缀：付款方扣除入账金额与每笔固定手续费，
    /// 入账收款方加金额，未入账收款方差额为零。
    pub fn expected_deltas(
        &self,
        sender: Pubkey,
        recipients: &[Pubkey],
        base_lamports: u64,
        fee_lamports: u64,
    ) -> Vec<(Pubkey, i128)> {
        let spec = self.spec();
        let legs = self.legs(base_lamports);
        debug_assert_eq!(recipients.len(), legs.len());

        let settled_amount: i128 = legs[..spec.expected_settled]
            .iter()
            .map(|leg| i128::from(leg.amount))
            .sum();
        let settled_fees = i128::from(fee_lamports) * spec.expected_settled as i128;

        let mut deltas = Vec::with_capacity(1 + recipients.len());
        deltas.push((sender, -settled_amount - settled_fees));
        for (index, (recipient, leg)) in recipients.iter().zip(&legs).enumerate() {
            let delta = if index < spec.expected_settled {
                i128::from(leg.amount)
            } else {
                0
            };
            deltas.push((*recipient, delta));
        }
        deltas
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scenario::ALL
            .iter()
            .find(|scenario| scenario.name() == s)
            .copied()
            .ok_or_else(|| {
                let names: Vec<&str> = Scenario::ALL.iter().map(Scenario::name).collect();
                format!("未知场景 {s}，可选值: {}", names.join(", "))
            })
    }
}
