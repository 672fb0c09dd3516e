//! Per-session question budget

use crate::error::{InterviewError, Result};

/// Default number of questions a session may ask
pub const DEFAULT_MAX_TURNS: u32 = 10;

/// Enforces the hard cap on question/answer turns
///
/// Checked before every question. Attempts `1..=cap` are counted and allowed;
/// the next attempt fails with [`InterviewError::BudgetExceeded`] and leaves the
/// count untouched, so it never exceeds the cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetGuard {
    cap: u32,
}

impl BudgetGuard {
    /// Create a guard with the given cap
    #[must_use]
    pub const fn new(cap: u32) -> Self {
        Self { cap }
    }

    /// Question cap
    #[must_use]
    pub const fn cap(&self) -> u32 {
        self.cap
    }

    /// Fail with `BudgetExceeded` if no question is left after `turns`
    pub fn check(&self, turns: u32) -> Result<()> {
        if turns >= self.cap {
            log::info!("Question budget of {} reached", self.cap);
            return Err(InterviewError::budget_exceeded(self.cap));
        }
        Ok(())
    }

    /// Count one more question against `turns`
    ///
    /// Returns the new turn number, or the `BudgetExceeded` control signal once
    /// the cap has been used up.
    pub fn record_turn(&self, turns: &mut u32) -> Result<u32> {
        self.check(*turns)?;
        *turns += 1;
        Ok(*turns)
    }

    /// Questions left before the guard trips
    #[must_use]
    pub const fn remaining(&self, turns: u32) -> u32 {
        self.cap.saturating_sub(turns)
    }
}

impl Default for BudgetGuard {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TURNS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_exactly_cap_questions() {
        let guard = BudgetGuard::default();
        let mut turns = 0;

        for expected in 1..=DEFAULT_MAX_TURNS {
            assert_eq!(guard.record_turn(&mut turns).unwrap(), expected);
        }

        let err = guard.record_turn(&mut turns).unwrap_err();
        assert!(err.is_budget_exceeded());
        assert_eq!(turns, DEFAULT_MAX_TURNS);
    }

    #[test]
    fn check_does_not_count() {
        let guard = BudgetGuard::new(2);
        let turns = 1;
        guard.check(turns).unwrap();
        guard.check(turns).unwrap();
        assert!(guard.check(2).unwrap_err().is_budget_exceeded());
    }

    #[test]
    fn keeps_tripping_after_cap() {
        let guard = BudgetGuard::new(1);
        let mut turns = 0;
        guard.record_turn(&mut turns).unwrap();
        assert!(guard.record_turn(&mut turns).is_err());
        assert!(guard.record_turn(&mut turns).is_err());
        assert_eq!(turns, 1);
    }

    #[test]
    fn remaining_saturates() {
        let guard = BudgetGuard::new(3);
        assert_eq!(guard.remaining(0), 3);
        assert_eq!(guard.remaining(3), 0);
        assert_eq!(guard.remaining(7), 0);
    }
}
