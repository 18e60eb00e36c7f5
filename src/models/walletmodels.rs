// models/walletmodels.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Width of `wallet_transactions.reference`.
pub const LEDGER_REFERENCE_MAX_LEN: usize = 120;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "wallet_tx_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WalletTxKind {
    BookingHold,
    BookingRelease,
    BookingReversal,
    DisputeRelease,
    DisputeRefund,
    Payout,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Wallet {
    pub id: Uuid,
    pub user_id: Uuid,
    pub pending_balance: i64,
    pub available_balance: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct WalletTransaction {
    pub id: Uuid,
    pub wallet_id: Uuid,
    pub user_id: Uuid,
    pub kind: WalletTxKind,
    pub pending_delta: i64,
    pub available_delta: i64,
    pub pending_after: i64,
    pub available_after: i64,
    pub reference: String,
    pub booking_id: Option<Uuid>,
    pub dispute_id: Option<Uuid>,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Balances {
    pub pending: i64,
    pub available: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("insufficient pending balance: required {required}, available {available}")]
    InsufficientPending { required: i64, available: i64 },
    #[error("insufficient available balance: required {required}, available {available}")]
    InsufficientAvailable { required: i64, available: i64 },
    #[error("amount must be positive")]
    NonPositiveAmount,
}

/// A balance movement. Each variant decides both deltas so call sites
/// cannot build an entry that creates or destroys money by accident.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    /// Money expected from a booking lands in pending.
    Hold(i64),
    /// Pending money becomes spendable.
    Release(i64),
    /// Pending money is withdrawn without reaching the worker.
    Reverse(i64),
    /// Spendable money leaves the platform.
    Payout(i64),
}

impl Movement {
    pub fn amount(&self) -> i64 {
        match *self {
            Movement::Hold(a) | Movement::Release(a) | Movement::Reverse(a) | Movement::Payout(a) => a,
        }
    }

    /// (pending_delta, available_delta)
    pub fn deltas(&self) -> (i64, i64) {
        match *self {
            Movement::Hold(a) => (a, 0),
            Movement::Release(a) => (-a, a),
            Movement::Reverse(a) => (-a, 0),
            Movement::Payout(a) => (0, -a),
        }
    }
}

impl Balances {
    pub fn of(wallet: &Wallet) -> Self {
        Balances {
            pending: wallet.pending_balance,
            available: wallet.available_balance,
        }
    }

    pub fn apply(&self, movement: Movement) -> Result<Balances, LedgerError> {
        if movement.amount() <= 0 {
            return Err(LedgerError::NonPositiveAmount);
        }

        let (pending_delta, available_delta) = movement.deltas();
        let next = Balances {
            pending: self.pending + pending_delta,
            available: self.available + available_delta,
        };

        if next.pending < 0 {
            return Err(LedgerError::InsufficientPending {
                required: -pending_delta,
                available: self.pending,
            });
        }
        if next.available < 0 {
            return Err(LedgerError::InsufficientAvailable {
                required: -available_delta,
                available: self.available,
            });
        }
        Ok(next)
    }

    pub fn total(&self) -> i64 {
        self.pending + self.available
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZERO: Balances = Balances { pending: 0, available: 0 };

    #[test]
    fn hold_release_payout_sequence() {
        let b = ZERO.apply(Movement::Hold(14400)).unwrap();
        assert_eq!(b, Balances { pending: 14400, available: 0 });

        let b = b.apply(Movement::Release(14400)).unwrap();
        assert_eq!(b, Balances { pending: 0, available: 14400 });

        let b = b.apply(Movement::Payout(4400)).unwrap();
        assert_eq!(b, Balances { pending: 0, available: 10000 });
    }

    #[test]
    fn release_never_changes_total() {
        let b = Balances { pending: 500, available: 700 };
        let after = b.apply(Movement::Release(200)).unwrap();
        assert_eq!(after.total(), b.total());
    }

    #[test]
    fn overdrawing_is_refused() {
        let b = Balances { pending: 100, available: 50 };
        assert_eq!(
            b.apply(Movement::Release(101)),
            Err(LedgerError::InsufficientPending { required: 101, available: 100 })
        );
        assert_eq!(
            b.apply(Movement::Payout(51)),
            Err(LedgerError::InsufficientAvailable { required: 51, available: 50 })
        );
        assert_eq!(
            b.apply(Movement::Reverse(101)),
            Err(LedgerError::InsufficientPending { required: 101, available: 100 })
        );
    }

    #[test]
    fn zero_and_negative_amounts_are_refused() {
        assert_eq!(ZERO.apply(Movement::Hold(0)), Err(LedgerError::NonPositiveAmount));
        assert_eq!(ZERO.apply(Movement::Hold(-5)), Err(LedgerError::NonPositiveAmount));
    }

    #[test]
    fn balances_equal_sum_of_deltas() {
        let moves = [
            Movement::Hold(1000),
            Movement::Hold(2500),
            Movement::Release(1000),
            Movement::Reverse(500),
            Movement::Payout(800),
        ];
        let mut b = ZERO;
        let (mut pending_sum, mut available_sum) = (0, 0);
        for m in moves {
            b = b.apply(m).unwrap();
            let (p, a) = m.deltas();
            pending_sum += p;
            available_sum += a;
        }
        assert_eq!(b, Balances { pending: pending_sum, available: available_sum });
    }
}
