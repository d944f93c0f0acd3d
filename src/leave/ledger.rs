//! Balance ledger: the only place `LeaveBalance` is ever mutated.
//!
//! Reserved (pending) days are debited from the available pool at submit
//! time, then either committed to `used_days` on approval or released back
//! on rejection. `current_balance` never changes here.

use crate::leave::error::LeaveError;
use crate::model::leave::LeaveBalance;

impl LeaveBalance {
    fn assert_accounting(&self) {
        debug_assert_eq!(
            self.available_days + self.used_days + self.pending_days,
            self.current_balance,
            "accounting identity violated for employee {}",
            self.employee_id
        );
    }

    /// Debits `days` from the available pool into pending. Called exactly
    /// once per request, at submit time, before the request is persisted.
    pub fn reserve(&mut self, days: u32) -> Result<(), LeaveError> {
        if days > self.available_days {
            return Err(LeaveError::InsufficientBalance {
                requested: days,
                available: self.available_days,
            });
        }
        self.available_days -= days;
        self.pending_days += days;
        self.assert_accounting();
        Ok(())
    }

    /// On approval, converts reserved days into consumed days. The available
    /// pool is untouched; it was already debited at reserve time.
    pub fn commit_used(&mut self, days: u32) -> Result<(), LeaveError> {
        if days > self.pending_days {
            return Err(LeaveError::InsufficientBalance {
                requested: days,
                available: self.pending_days,
            });
        }
        self.pending_days -= days;
        self.used_days += days;
        self.assert_accounting();
        Ok(())
    }

    /// On rejection, returns reserved days to the available pool.
    pub fn release(&mut self, days: u32) -> Result<(), LeaveError> {
        if days > self.pending_days {
            return Err(LeaveError::InsufficientBalance {
                requested: days,
                available: self.pending_days,
            });
        }
        self.pending_days -= days;
        self.available_days += days;
        self.assert_accounting();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh(days: u32) -> LeaveBalance {
        LeaveBalance::opening(1000, days)
    }

    #[test]
    fn opening_balance_is_fully_available() {
        let balance = fresh(24);
        assert_eq!(balance.current_balance, 24);
        assert_eq!(balance.available_days, 24);
        assert_eq!(balance.used_days, 0);
        assert_eq!(balance.pending_days, 0);
    }

    #[test]
    fn reserve_moves_available_to_pending() {
        let mut balance = fresh(24);
        balance.reserve(3).unwrap();
        assert_eq!(balance.available_days, 21);
        assert_eq!(balance.pending_days, 3);
        assert_eq!(balance.current_balance, 24);
    }

    #[test]
    fn reserve_beyond_available_fails_without_partial_debit() {
        let mut balance = fresh(2);
        let err = balance.reserve(5).unwrap_err();
        assert_eq!(
            err,
            LeaveError::InsufficientBalance {
                requested: 5,
                available: 2
            }
        );
        assert_eq!(balance, fresh(2));
    }

    #[test]
    fn reserve_on_zero_balance_fails() {
        let mut balance = fresh(0);
        assert!(balance.reserve(1).is_err());
        assert_eq!(balance, fresh(0));
    }

    #[test]
    fn commit_moves_pending_to_used_leaving_available() {
        let mut balance = fresh(24);
        balance.reserve(3).unwrap();
        balance.commit_used(3).unwrap();
        assert_eq!(balance.available_days, 21);
        assert_eq!(balance.used_days, 3);
        assert_eq!(balance.pending_days, 0);
    }

    #[test]
    fn release_returns_pending_to_available() {
        let mut balance = fresh(24);
        balance.reserve(3).unwrap();
        balance.release(3).unwrap();
        assert_eq!(balance.available_days, 24);
        assert_eq!(balance.used_days, 0);
        assert_eq!(balance.pending_days, 0);
    }

    #[test]
    fn commit_more_than_reserved_fails() {
        let mut balance = fresh(24);
        balance.reserve(2).unwrap();
        assert!(balance.commit_used(3).is_err());
        assert_eq!(balance.pending_days, 2);
    }

    #[test]
    fn identity_holds_across_mixed_operations() {
        let mut balance = fresh(24);
        balance.reserve(5).unwrap();
        balance.commit_used(5).unwrap();
        balance.reserve(4).unwrap();
        balance.release(4).unwrap();
        balance.reserve(2).unwrap();
        assert_eq!(
            balance.available_days + balance.used_days + balance.pending_days,
            balance.current_balance
        );
    }
}
