use crate::transaction::{AccountId, Amount, Transaction};
use std::collections::BTreeMap;
use std::fmt;

/// Balances of every known account.
///
/// A state is never modified once built: [`LedgerState::apply`] returns a new
/// snapshot, so verification can replay a chain while callers keep holding
/// earlier states.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct LedgerState {
    balances: BTreeMap<AccountId, Amount>,
}

impl LedgerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_balances<K, I>(balances: I) -> Self
    where
        K: Into<AccountId>,
        I: IntoIterator<Item = (K, Amount)>,
    {
        Self {
            balances: balances.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Balance of `account`, zero when the account has never been seen.
    pub fn balance(&self, account: &str) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn get(&self, account: &str) -> Option<Amount> {
        self.balances.get(account).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AccountId, &Amount)> {
        self.balances.iter()
    }

    pub fn balances(&self) -> &BTreeMap<AccountId, Amount> {
        &self.balances
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    /// Sum of all balances.
    pub fn total_supply(&self) -> i128 {
        self.balances.values().map(|b| *b as i128).sum()
    }

    pub fn is_solvent(&self) -> bool {
        self.balances.values().all(|b| *b >= 0)
    }

    /// Adds every delta of `txn` to the matching balance and returns the result.
    ///
    /// Performs no validity check. Accounts named by `txn` appear in the result
    /// even with a zero delta; untouched accounts carry over. Sums saturate at
    /// the `Amount` bounds.
    pub fn apply(&self, txn: &Transaction) -> LedgerState {
        let mut balances = self.balances.clone();
        for (account, delta) in txn.iter() {
            let balance = balances.entry(account.clone()).or_insert(0);
            *balance = balance.saturating_add(*delta);
        }
        LedgerState { balances }
    }
}

/// Free-function form of [`LedgerState::apply`].
pub fn apply(state: &LedgerState, txn: &Transaction) -> LedgerState {
    state.apply(txn)
}

impl fmt::Display for LedgerState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (account, balance)) in self.balances.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", account, balance)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_transfer() {
        let genesis = LedgerState::from_balances([("A", 50), ("B", 50)]);
        let tx = Transaction::transfer("A", "B", 20);
        let next = genesis.apply(&tx);
        assert_eq!(next, LedgerState::from_balances([("A", 30), ("B", 70)]));
        // Input snapshot is untouched.
        assert_eq!(genesis.balance("A"), 50);
    }

    #[test]
    fn test_apply_does_not_validate() {
        let genesis = LedgerState::from_balances([("A", 50), ("B", 50)]);
        let tx: Transaction = [("A", -60), ("B", 60)].into_iter().collect();
        let next = apply(&genesis, &tx);
        assert_eq!(next.balance("A"), -10);
        assert!(!next.is_solvent());
    }

    #[test]
    fn test_apply_inserts_mentioned_accounts() {
        let state = LedgerState::from_balances([("A", 5)]);
        let tx = Transaction::default().with_participant("Z");
        let next = state.apply(&tx);
        assert_eq!(next.get("Z"), Some(0));
        assert_eq!(next.balance("A"), 5);
        assert_eq!(next.len(), 2);
    }

    #[test]
    fn test_apply_saturates() {
        let state = LedgerState::from_balances([("A", Amount::MAX)]);
        let tx: Transaction = [("A", 1)].into_iter().collect();
        assert_eq!(state.apply(&tx).balance("A"), Amount::MAX);
    }

    #[test]
    fn test_total_supply_is_conserved_by_transfers() {
        let state = LedgerState::from_balances([("A", 50), ("B", 50), ("C", 100)]);
        let next = state
            .apply(&Transaction::transfer("A", "C", 7))
            .apply(&Transaction::transfer("C", "B", 30));
        assert_eq!(next.total_supply(), state.total_supply());
    }

    #[test]
    fn test_display_and_wire_format() {
        let state = LedgerState::from_balances([("Bob", 2), ("Alice", 1)]);
        assert_eq!(state.to_string(), "{Alice: 1, Bob: 2}");
        assert_eq!(serde_json::to_string(&state).unwrap(), r#"{"Alice":1,"Bob":2}"#);
    }
}
