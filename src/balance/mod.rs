use std::collections::BTreeMap;

use solana_sdk::pubkey::Pubkey;

/// 单一时间点的账户余额切面，仅用于差额计算，不单独持久化。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BalanceSnapshot {
    balances: BTreeMap<Pubkey, u64>,
}

impl BalanceSnapshot {
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Pubkey, u64)>) -> Self {
        Self {
            balances: pairs.into_iter().collect(),
        }
    }

    pub fn get(&self, account: &Pubkey) -> Option<u64> {
        self.balances.get(account).copied()
    }

    /// 提交前后两个切面在某账户上的带符号差额；任一侧未采样返回 None。
    pub fn delta(&self, after: &Self, account: &Pubkey) -> Option<i128> {
        let before = self.get(account)?;
        let after = after.get(account)?;
        Some(i128::from(after) - i128::from(before))
    }
}

/// 单账户校验结论：期望差额与实际差额按整数精确相等。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountVerdict {
    pub account: Pubkey,
    pub expected: i128,
    pub actual: i128,
}

impl AccountVerdict {
    pub fn passed(&self) -> bool {
        self.expected == self.actual
    }
}

/// 一次场景运行的校验报告。差额不符是软失败，只记录不中断。
#[derive(Clone, Debug, Default)]
pub struct VerificationReport {
    pub verdicts: Vec<AccountVerdict>,
    pub settled_expected: usize,
    pub settled_actual: usize,
}

impl VerificationReport {
    pub fn settled_count_matches(&self) -> bool {
        self.settled_expected == self.settled_actual
    }

    pub fn all_passed(&self) -> bool {
        self.settled_count_matches() && self.verdicts.iter().all(AccountVerdict::passed)
    }

    pub fn failed_accounts(&self) -> usize {
        self.verdicts
            .iter()
            .filter(|verdict| !verdict.passed())
            .count()
    }
}

/// 对每个账户比较期望差额与观测差额。缺失采样按实际差额 0 记失败而非 panic。
pub fn verify(
    expected: &[(Pubkey, i128)],
    before: &BalanceSnapshot,
    after: &BalanceSnapshot,
    settled_expected: usize,
    settled_actual: usize,
) -> VerificationReport {
    let verdicts = expected
        .iter()
        .map(|(account, expected)| AccountVerdict {
            account: *account,
            expected: *expected,
            actual: before.delta(after, account).unwrap_or(0),
        })
        .collect();
    VerificationReport {
        verdicts,
        settled_expected,
        settled_actual,
    }
}
