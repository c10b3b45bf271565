/// Validation logic for transactions separated from type definitions
use crate::blockchain::LedgerState;
use crate::transaction::types::{AccountId, Amount, Transaction};

/// Why a transaction was refused against a given state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TxRejection {
    #[error("deltas sum to {net}, expected 0")]
    Unbalanced { net: i128 },
    #[error("account {account} would be overdrawn: balance {balance} + delta {delta} < 0")]
    Overdraft {
        account: AccountId,
        balance: Amount,
        delta: Amount,
    },
    #[error("balance of account {account} would exceed the representable range")]
    Overflow { account: AccountId },
}

impl Transaction {
    /// Checks conservation first, then every account for overdraft.
    /// Accounts missing from `state` count as a zero balance.
    pub fn check(&self, state: &LedgerState) -> Result<(), TxRejection> {
        let net = self.net();
        if net != 0 {
            return Err(TxRejection::Unbalanced { net });
        }

        for (account, delta) in self.iter() {
            let balance = state.balance(account);
            let resulting = balance as i128 + *delta as i128;
            if resulting < 0 {
                return Err(TxRejection::Overdraft {
                    account: account.clone(),
                    balance,
                    delta: *delta,
                });
            }
            if resulting > Amount::MAX as i128 {
                return Err(TxRejection::Overflow {
                    account: account.clone(),
                });
            }
        }

        Ok(())
    }

    pub fn is_valid(&self, state: &LedgerState) -> bool {
        self.check(state).is_ok()
    }
}

/// Whether `txn` conserves value and overdraws no account in `state`.
pub fn is_valid(txn: &Transaction, state: &LedgerState) -> bool {
    txn.is_valid(state)
}
