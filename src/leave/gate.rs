//! Authorization gate: a pure predicate over principal, action, and request.
//!
//! Every authorization decision of the leave subsystem goes through here;
//! the role always comes from verified token claims, never from the client
//! payload.

use crate::leave::error::LeaveError;
use crate::model::leave::LeaveRequest;
use crate::model::role::Role;

/// The authenticated actor issuing a command.
#[derive(Debug, Copy, Clone)]
pub struct Principal {
    pub employee_id: u64,
    pub role: Role,
}

impl Principal {
    pub fn new(employee_id: u64, role: Role) -> Self {
        Self { employee_id, role }
    }

    pub fn is_employee(&self) -> bool {
        self.role == Role::Employee
    }
}

pub enum LeaveAction<'a> {
    SubmitSelf,
    SubmitForOther,
    List,
    Decide(&'a LeaveRequest),
}

/// Closed role table:
///
/// | role     | submit self | submit other | list scope | decide        |
/// |----------|-------------|--------------|------------|---------------|
/// | EMPLOYEE | yes         | no           | own only   | no            |
/// | MANAGER  | yes         | yes          | all        | pending only  |
/// | HR       | yes         | yes          | all        | pending only  |
/// | ADMIN    | yes         | yes          | all        | pending only  |
///
/// Decide on a non-pending request fails `AlreadyDecided` for every role,
/// ahead of the role check.
pub fn can_perform(principal: &Principal, action: &LeaveAction<'_>) -> Result<(), LeaveError> {
    match action {
        LeaveAction::SubmitSelf => Ok(()),
        LeaveAction::SubmitForOther => {
            if principal.is_employee() {
                Err(LeaveError::Authorization(
                    "employees may only submit leave for themselves",
                ))
            } else {
                Ok(())
            }
        }
        LeaveAction::List => Ok(()),
        LeaveAction::Decide(request) => {
            if !request.is_pending() {
                return Err(LeaveError::AlreadyDecided);
            }
            if principal.is_employee() {
                return Err(LeaveError::Authorization(
                    "only managers, HR, or admins may decide leave requests",
                ));
            }
            Ok(())
        }
    }
}

/// List scoping: an EMPLOYEE principal is always pinned to their own
/// requests, whatever the caller put in the filter. Other roles may narrow
/// by any employee id or none.
pub fn scope_employee_filter(principal: &Principal, requested: Option<u64>) -> Option<u64> {
    if principal.is_employee() {
        Some(principal.employee_id)
    } else {
        requested
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::leave::LeaveStatus;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn request(status: LeaveStatus) -> LeaveRequest {
        LeaveRequest {
            id: 1,
            employee_id: 1000,
            start_date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 6, 12).unwrap(),
            reason: "trip".into(),
            status,
            applied_on: Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
            decided_by: None,
            decided_on: None,
            comments: None,
        }
    }

    fn principal(role: Role) -> Principal {
        Principal::new(42, role)
    }

    #[test]
    fn everyone_may_submit_for_self() {
        for role in [Role::Employee, Role::Manager, Role::Hr, Role::Admin] {
            assert!(can_perform(&principal(role), &LeaveAction::SubmitSelf).is_ok());
        }
    }

    #[test]
    fn only_deciding_roles_may_submit_for_other() {
        assert!(matches!(
            can_perform(&principal(Role::Employee), &LeaveAction::SubmitForOther),
            Err(LeaveError::Authorization(_))
        ));
        for role in [Role::Manager, Role::Hr, Role::Admin] {
            assert!(can_perform(&principal(role), &LeaveAction::SubmitForOther).is_ok());
        }
    }

    #[test]
    fn employee_may_not_decide_even_pending() {
        let pending = request(LeaveStatus::Pending);
        assert!(matches!(
            can_perform(&principal(Role::Employee), &LeaveAction::Decide(&pending)),
            Err(LeaveError::Authorization(_))
        ));
    }

    #[test]
    fn deciding_roles_may_decide_pending() {
        let pending = request(LeaveStatus::Pending);
        for role in [Role::Manager, Role::Hr, Role::Admin] {
            assert!(can_perform(&principal(role), &LeaveAction::Decide(&pending)).is_ok());
        }
    }

    #[test]
    fn decided_request_fails_for_every_role() {
        for status in [LeaveStatus::Approved, LeaveStatus::Rejected] {
            let decided = request(status);
            for role in [Role::Employee, Role::Manager, Role::Hr, Role::Admin] {
                assert_eq!(
                    can_perform(&principal(role), &LeaveAction::Decide(&decided)),
                    Err(LeaveError::AlreadyDecided)
                );
            }
        }
    }

    #[test]
    fn employee_list_scope_is_forced_to_self() {
        let me = principal(Role::Employee);
        assert_eq!(scope_employee_filter(&me, None), Some(42));
        assert_eq!(scope_employee_filter(&me, Some(1000)), Some(42));

        let hr = principal(Role::Hr);
        assert_eq!(scope_employee_filter(&hr, Some(1000)), Some(1000));
        assert_eq!(scope_employee_filter(&hr, None), None);
    }
}
