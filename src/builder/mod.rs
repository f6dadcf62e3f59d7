use anyhow::{Result, anyhow};
use bincode::config::legacy;
use bincode::error::{DecodeError, EncodeError};
use solana_sdk::hash::Hash;
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::transaction::Transaction;
use solana_system_interface::instruction as system_instruction;

/// 固定的过期 blockhash 哨兵：语法合法，但链上永远不会出现，
/// 用于刻意构造会被中继拒绝的交易。
pub fn stale_blockhash() -> Hash {
    Hash::new_from_array([0x5A; 32])
}

/// 构造单指令转账交易：sender → recipient，金额为最小单位（lamports）。
/// 绑定调用方给定的 blockhash，不校验其有效性；纯构造，无副作用。
pub fn build_transfer(
    sender: &Pubkey,
    recipient: &Pubkey,
    lamports: u64,
    blockhash: Hash,
) -> Transaction {
    let instruction = system_instruction::transfer(sender, recipient, lamports);
    let message = Message::new_with_blockhash(&[instruction], Some(sender), &blockhash);
    Transaction::new_unsigned(message)
}

/// 用付款方密钥对交易做唯一一次签名；签名后交易不再改动。
pub fn sign_transfer(transaction: &mut Transaction, signer: &Keypair) -> Result<()> {
    let blockhash = transaction.message.recent_blockhash;
    transaction
        .try_sign(&[signer], blockhash)
        .map_err(|err| anyhow!("交易签名失败: {err}"))
}

/// 交易的规范线上编码（bincode 定长字节序），编码解码无损。
pub fn serialize_transaction(transaction: &Transaction) -> Result<Vec<u8>, EncodeError> {
    bincode::serde::encode_to_vec(transaction, legacy())
}

pub fn deserialize_transaction(bytes: &[u8]) -> Result<Transaction, DecodeError> {
    bincode::serde::decode_from_slice(bytes, legacy()).map(|(transaction, _)| transaction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::signature::Signer;

    #[test]
    fn transfer_references_exactly_three_accounts() {
        let sender = Pubkey::new_unique();
        let recipient = Pubkey::new_unique();
        let tx = build_transfer(&sender, &recipient, 10_000, stale_blockhash());

        let keys = &tx.message.account_keys;
        assert_eq!(keys.len(), 3);
        assert_eq!(keys[0], sender);
        assert_eq!(keys[1], recipient);
        assert_eq!(keys[2], solana_system_interface::program::ID);
        assert_eq!(tx.message.header.num_required_signatures, 1);
    }

    #[test]
    fn transfer_compiles_single_instruction_with_sender_and_recipient() {
        let sender = Pubkey::new_unique();
        let recipient = Pubkey::new_unique();
        let lamports = 123_456u64;
        let tx = build_transfer(&sender, &recipient, lamports, stale_blockhash());

        assert_eq!(tx.message.instructions.len(), 1);
        let ix = &tx.message.instructions[0];
        assert_eq!(ix.accounts, vec![0, 1]);
        assert_eq!(ix.program_id_index, 2);
        // 头部：1 个签名账户（可写的付款方），收款方可写，程序只读
        let header = &tx.message.header;
        assert_eq!(header.num_required_signatures, 1);
        assert_eq!(header.num_readonly_signed_accounts, 0);
        assert_eq!(header.num_readonly_unsigned_accounts, 1);

        // system transfer 指令数据：4 字节判别值 2 + 8 字节小端金额
        assert_eq!(ix.data.len(), 12);
        assert_eq!(&ix.data[..4], &[2, 0, 0, 0]);
        assert_eq!(u64::from_le_bytes(ix.data[4..12].try_into().unwrap()), lamports);
    }

    #[test]
    fn builder_binds_caller_supplied_blockhash_unchecked() {
        let sender = Pubkey::new_unique();
        let recipient = Pubkey::new_unique();
        let live = Hash::new_unique();

        let valid = build_transfer(&sender, &recipient, 1, live);
        assert_eq!(valid.message.recent_blockhash, live);

        let stale = build_transfer(&sender, &recipient, 1, stale_blockhash());
        assert_eq!(stale.message.recent_blockhash, stale_blockhash());
        assert_ne!(stale.message.recent_blockhash, live);
    }

    #[test]
    fn zero_lamport_transfer_is_constructible() {
        let sender = Pubkey::new_unique();
        let tx = build_transfer(&sender, &Pubkey::new_unique(), 0, stale_blockhash());
        let ix = &tx.message.instructions[0];
        assert_eq!(u64::from_le_bytes(ix.data[4..12].try_into().unwrap()), 0);
    }

    #[test]
    fn signed_transaction_round_trips_through_wire_encoding() {
        let signer = Keypair::new();
        let recipient = Pubkey::new_unique();
        let mut tx = build_transfer(&signer.pubkey(), &recipient, 10_000, Hash::new_unique());
        sign_transfer(&mut tx, &signer).unwrap();
        assert_eq!(tx.signatures.len(), 1);

        let bytes = serialize_transaction(&tx).unwrap();
        let decoded = deserialize_transaction(&bytes).unwrap();
        assert_eq!(decoded.signatures, tx.signatures);
        assert_eq!(decoded.message, tx.message);
        assert_eq!(
            decoded.message.instructions[0].data,
            tx.message.instructions[0].data
        );
    }
}
