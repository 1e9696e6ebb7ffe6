use ethereum_types::{H256, U256};
use zk_tracer_common::EMPTY_CODE_HASH;

/// The fields of an account the tracer needs to decide whether it exists in
/// the sense of EIP-161.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AccountSnapshot {
    pub nonce: u64,
    pub balance: U256,
    pub code_hash: H256,
}

impl AccountSnapshot {
    /// An account with zero nonce, zero balance and no code.
    pub fn is_empty(&self) -> bool {
        self.nonce == 0 && self.balance.is_zero() && self.code_hash == EMPTY_CODE_HASH
    }
}

impl Default for AccountSnapshot {
    fn default() -> Self {
        Self {
            nonce: 0,
            balance: U256::zero(),
            code_hash: EMPTY_CODE_HASH,
        }
    }
}
