//! Transaction module split into types and validation for better modularity

pub mod types;
pub mod validation;

pub use types::*;
pub use validation::{is_valid, TxRejection};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::LedgerState;

    fn genesis() -> LedgerState {
        LedgerState::from_balances([("A", 50), ("B", 50)])
    }

    #[test]
    fn test_transfer_is_valid() {
        let tx = Transaction::transfer("A", "B", 20);
        assert!(is_valid(&tx, &genesis()));
        assert_eq!(tx.net(), 0);
    }

    #[test]
    fn test_overdraft_is_rejected() {
        let tx: Transaction = [("A", -60), ("B", 60)].into_iter().collect();
        assert_eq!(
            tx.check(&genesis()),
            Err(TxRejection::Overdraft {
                account: "A".to_string(),
                balance: 50,
                delta: -60,
            })
        );
        assert!(!tx.is_valid(&genesis()));
    }

    #[test]
    fn test_unbalanced_is_rejected_before_overdraft() {
        // Would also overdraw A, but conservation is checked first.
        let tx: Transaction = [("A", -80), ("B", 60)].into_iter().collect();
        assert_eq!(tx.check(&genesis()), Err(TxRejection::Unbalanced { net: -20 }));

        let minted: Transaction = [("A", 5)].into_iter().collect();
        assert!(!minted.is_valid(&genesis()));
    }

    #[test]
    fn test_unknown_account_counts_as_zero() {
        let state = genesis();
        let credit_new: Transaction = [("A", -10), ("Carol", 10)].into_iter().collect();
        assert!(credit_new.is_valid(&state));

        let debit_new: Transaction = [("Carol", -1), ("A", 1)].into_iter().collect();
        assert!(matches!(debit_new.check(&state), Err(TxRejection::Overdraft { .. })));
    }

    #[test]
    fn test_draining_an_account_to_zero_is_allowed() {
        let tx = Transaction::transfer("A", "B", 50);
        assert!(tx.is_valid(&genesis()));
        assert_eq!(genesis().apply(&tx).balance("A"), 0);
    }

    #[test]
    fn test_empty_and_zero_transactions_are_valid() {
        assert!(Transaction::default().is_valid(&LedgerState::new()));
        let zeros = Transaction::default().with_participant("A").with_participant("Z");
        assert!(zeros.is_valid(&LedgerState::new()));
    }

    #[test]
    fn test_overflowing_credit_is_rejected() {
        let state = LedgerState::from_balances([("A", Amount::MAX), ("B", 1)]);
        let tx = Transaction::transfer("B", "A", 1);
        assert_eq!(
            tx.check(&state),
            Err(TxRejection::Overflow {
                account: "A".to_string()
            })
        );
    }

    #[test]
    fn test_net_does_not_overflow() {
        let tx: Transaction = [("A", Amount::MAX), ("B", Amount::MAX)].into_iter().collect();
        assert_eq!(tx.net(), 2 * Amount::MAX as i128);
        assert!(!tx.is_valid(&LedgerState::new()));
    }

    #[test]
    fn test_transfer_of_minimum_amount_is_unbalanced() {
        let tx = Transaction::transfer("A", "B", Amount::MIN);
        assert_eq!(tx.delta("A"), Some(Amount::MAX));
        assert_eq!(tx.delta("B"), Some(Amount::MIN));
        assert_eq!(tx.check(&genesis()), Err(TxRejection::Unbalanced { net: -1 }));

        let own = Transaction::transfer("A", "A", Amount::MIN);
        assert_eq!(own.delta("A"), Some(-1));
    }

    #[test]
    fn test_self_transfer_nets_to_zero() {
        let tx = Transaction::transfer("A", "A", 10);
        assert_eq!(tx.delta("A"), Some(0));
        assert_eq!(tx.len(), 1);
    }

    #[test]
    fn test_wire_format_is_a_plain_object() {
        let tx = Transaction::transfer("Alice", "Bob", 3).with_participant("Frank");
        let json = serde_json::to_string(&tx).unwrap();
        assert_eq!(json, r#"{"Alice":-3,"Bob":3,"Frank":0}"#);
        let back: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tx);
        assert_eq!(tx.to_string(), "{Alice: -3, Bob: 3, Frank: 0}");
    }

    #[test]
    fn test_valid_transactions_keep_balances_non_negative() {
        let state = LedgerState::from_balances([("A", 50), ("B", 50), ("C", 0)]);
        let candidates: Vec<Transaction> = vec![
            Transaction::transfer("A", "B", 50),
            Transaction::transfer("C", "A", 1),
            [("A", -25), ("B", -25), ("C", 50)].into_iter().collect(),
            [("A", -51), ("C", 51)].into_iter().collect(),
            [("A", -1), ("B", 2)].into_iter().collect(),
        ];
        for tx in &candidates {
            if tx.is_valid(&state) {
                assert_eq!(tx.net(), 0);
                assert!(state.apply(tx).iter().all(|(_, b)| *b >= 0));
            }
        }
    }
}
