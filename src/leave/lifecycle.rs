//! Request lifecycle: PENDING → APPROVED | REJECTED.
//!
//! Pure transition logic. `submit` turns validated input into a draft to be
//! reserved and persisted as one unit; `decide` turns a pending request plus
//! a decider's verdict into the terminal record and its balance effect. The
//! store applies each result atomically.

use chrono::{DateTime, NaiveDate, Utc};

use crate::leave::calendar;
use crate::leave::error::LeaveError;
use crate::model::leave::{DecideAction, Decider, LeaveRequest, LeaveStatus};

/// A validated submission, not yet persisted. `days` is derived from the
/// date range and is what the ledger reserves.
#[derive(Debug, Clone)]
pub struct LeaveDraft {
    pub employee_id: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub days: u32,
    pub applied_on: DateTime<Utc>,
}

/// Days moved out of `pending_days` when a decision lands.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BalanceEffect {
    /// Approval: pending days become used days.
    Commit(u32),
    /// Rejection: pending days return to the available pool.
    Release(u32),
}

/// A terminal transition for one request, ready to persist.
#[derive(Debug, Clone)]
pub struct Decision {
    pub request_id: u64,
    pub employee_id: u64,
    pub status: LeaveStatus,
    pub effect: BalanceEffect,
    pub decided_by: Decider,
    pub decided_on: DateTime<Utc>,
    pub comments: Option<String>,
}

/// Validates a submit command. Nothing is mutated here: the reason and the
/// date range are checked before the ledger reserve ever runs.
pub fn submit(
    employee_id: u64,
    start_date: NaiveDate,
    end_date: NaiveDate,
    reason: &str,
    now: DateTime<Utc>,
) -> Result<LeaveDraft, LeaveError> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(LeaveError::Validation("reason must not be empty".into()));
    }
    let days = calendar::days_between(start_date, end_date)?;
    Ok(LeaveDraft {
        employee_id,
        start_date,
        end_date,
        reason: reason.to_owned(),
        days,
        applied_on: now,
    })
}

/// Applies a decide command to a pending request. The day count is
/// recomputed from the request's own dates; caller input is not trusted for
/// it. The pending check is repeated here even though the gate also checks,
/// and a third time by the store's conditional write.
pub fn decide(
    request: &LeaveRequest,
    decided_by: Decider,
    action: DecideAction,
    comments: Option<String>,
    now: DateTime<Utc>,
) -> Result<Decision, LeaveError> {
    if !request.is_pending() {
        return Err(LeaveError::AlreadyDecided);
    }
    let days = calendar::days_between(request.start_date, request.end_date)?;
    let (status, effect) = match action {
        DecideAction::Approve => (LeaveStatus::Approved, BalanceEffect::Commit(days)),
        DecideAction::Reject => (LeaveStatus::Rejected, BalanceEffect::Release(days)),
    };
    Ok(Decision {
        request_id: request.id,
        employee_id: request.employee_id,
        status,
        effect,
        decided_by,
        decided_on: now,
        comments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
    }

    fn pending_request() -> LeaveRequest {
        LeaveRequest {
            id: 5,
            employee_id: 1000,
            start_date: date(2024, 6, 10),
            end_date: date(2024, 6, 12),
            reason: "trip".into(),
            status: LeaveStatus::Pending,
            applied_on: now(),
            decided_by: None,
            decided_on: None,
            comments: None,
        }
    }

    fn decider() -> Decider {
        Decider {
            id: 7,
            name: "Maria Keller".into(),
        }
    }

    #[test]
    fn submit_computes_inclusive_days() {
        let draft = submit(1000, date(2024, 6, 10), date(2024, 6, 12), "trip", now()).unwrap();
        assert_eq!(draft.days, 3);
        assert_eq!(draft.reason, "trip");
        assert_eq!(draft.applied_on, now());
    }

    #[test]
    fn submit_trims_reason() {
        let draft = submit(1000, date(2024, 6, 10), date(2024, 6, 10), "  dentist ", now()).unwrap();
        assert_eq!(draft.reason, "dentist");
    }

    #[test]
    fn submit_rejects_empty_reason() {
        for reason in ["", "   "] {
            let err = submit(1000, date(2024, 6, 10), date(2024, 6, 12), reason, now()).unwrap_err();
            assert!(matches!(err, LeaveError::Validation(_)));
        }
    }

    #[test]
    fn submit_rejects_reversed_dates() {
        let err = submit(1000, date(2024, 6, 12), date(2024, 6, 10), "trip", now()).unwrap_err();
        assert!(matches!(err, LeaveError::Validation(_)));
    }

    #[test]
    fn approve_commits_recomputed_days() {
        let decision = decide(
            &pending_request(),
            decider(),
            DecideAction::Approve,
            Some("enjoy".into()),
            now(),
        )
        .unwrap();
        assert_eq!(decision.status, LeaveStatus::Approved);
        assert_eq!(decision.effect, BalanceEffect::Commit(3));
        assert_eq!(decision.decided_by, decider());
        assert_eq!(decision.comments.as_deref(), Some("enjoy"));
    }

    #[test]
    fn reject_releases_recomputed_days() {
        let decision = decide(
            &pending_request(),
            decider(),
            DecideAction::Reject,
            None,
            now(),
        )
        .unwrap();
        assert_eq!(decision.status, LeaveStatus::Rejected);
        assert_eq!(decision.effect, BalanceEffect::Release(3));
    }

    #[test]
    fn decide_on_terminal_request_fails() {
        for status in [LeaveStatus::Approved, LeaveStatus::Rejected] {
            let mut request = pending_request();
            request.status = status;
            let err = decide(&request, decider(), DecideAction::Approve, None, now()).unwrap_err();
            assert_eq!(err, LeaveError::AlreadyDecided);
        }
    }
}
