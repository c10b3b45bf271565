/// Transaction types for LedgerChain
use crate::blockchain::LedgerState;
use std::collections::BTreeMap;
use std::fmt;

/// Account identifier.
pub type AccountId = String;

/// Signed amount of value: a balance in a ledger state, a delta in a transaction.
pub type Amount = i64;

/// A set of signed balance deltas applied atomically to the ledger.
///
/// On the wire a transaction is a bare JSON object of account to delta. Keys are
/// kept ordered so iteration, display and hashing are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Transaction {
    deltas: BTreeMap<AccountId, Amount>,
}

impl Transaction {
    pub fn new(deltas: BTreeMap<AccountId, Amount>) -> Self {
        Transaction { deltas }
    }

    /// Moves `amount` from `sender` to `receiver`.
    ///
    /// `Amount::MIN` has no negation; the sender's delta saturates and the
    /// resulting transaction is unbalanced.
    pub fn transfer(sender: impl Into<AccountId>, receiver: impl Into<AccountId>, amount: Amount) -> Self {
        let mut deltas = BTreeMap::new();
        deltas.insert(sender.into(), amount.saturating_neg());
        *deltas.entry(receiver.into()).or_insert(0) += amount;
        Transaction { deltas }
    }

    /// The entry a genesis block carries: every initial balance as a credit.
    ///
    /// This is not a transfer and does not conserve value; it is only meaningful
    /// when replayed onto the empty state.
    pub fn allocation(initial: &LedgerState) -> Self {
        initial.iter().map(|(account, balance)| (account.clone(), *balance)).collect()
    }

    /// Adds `account` with a zero delta unless it is already present.
    pub fn with_participant(mut self, account: impl Into<AccountId>) -> Self {
        self.deltas.entry(account.into()).or_insert(0);
        self
    }

    pub fn delta(&self, account: &str) -> Option<Amount> {
        self.deltas.get(account).copied()
    }

    pub fn deltas(&self) -> &BTreeMap<AccountId, Amount> {
        &self.deltas
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AccountId, &Amount)> {
        self.deltas.iter()
    }

    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    /// Sum of all deltas. Zero for a value-conserving transaction.
    pub fn net(&self) -> i128 {
        self.deltas.values().map(|d| *d as i128).sum()
    }
}

impl FromIterator<(AccountId, Amount)> for Transaction {
    fn from_iter<I: IntoIterator<Item = (AccountId, Amount)>>(iter: I) -> Self {
        Transaction {
            deltas: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<(&'a str, Amount)> for Transaction {
    fn from_iter<I: IntoIterator<Item = (&'a str, Amount)>>(iter: I) -> Self {
        iter.into_iter().map(|(a, d)| (a.to_string(), d)).collect()
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (account, delta)) in self.deltas.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", account, delta)?;
        }
        write!(f, "}}")
    }
}
