//! Service façade over the leave core: authorize, validate, transition,
//! persist. Handlers stay thin; every invariant is enforced on this side of
//! the HTTP boundary.

use chrono::{NaiveDate, Utc};
use tracing::info;

use crate::leave::error::LeaveError;
use crate::leave::gate::{self, LeaveAction, Principal};
use crate::leave::lifecycle;
use crate::leave::store::{LeaveStore, ListFilter};
use crate::model::leave::{DecideAction, Decider, LeaveBalance, LeaveRequest};

/// Pagination input as it arrives from the transport, before normalization.
#[derive(Debug, Copy, Clone)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
        }
    }
}

/// One page of requests plus the bookkeeping the console's tables need.
#[derive(Debug, Clone)]
pub struct LeavePage {
    pub records: Vec<LeaveRequest>,
    pub count: u64,
    pub num_pages: u64,
    pub current_page: u64,
}

#[derive(Clone)]
pub struct LeaveService<S> {
    store: S,
}

impl<S: LeaveStore> LeaveService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Submits a leave request for the principal, or for another employee
    /// when a deciding role passes `target_employee_id`.
    pub async fn submit(
        &self,
        principal: &Principal,
        target_employee_id: Option<u64>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        reason: &str,
    ) -> Result<LeaveRequest, LeaveError> {
        let employee_id = match target_employee_id {
            Some(target) if target != principal.employee_id => {
                gate::can_perform(principal, &LeaveAction::SubmitForOther)?;
                target
            }
            _ => {
                gate::can_perform(principal, &LeaveAction::SubmitSelf)?;
                principal.employee_id
            }
        };

        self.store
            .find_employee(employee_id)
            .await?
            .ok_or(LeaveError::NotFound("employee"))?;

        let draft = lifecycle::submit(employee_id, start_date, end_date, reason, Utc::now())?;

        // Fail fast on an obviously short balance; the store re-asserts the
        // debit under isolation when it persists.
        let mut balance = self
            .store
            .load_balance(employee_id)
            .await?
            .ok_or(LeaveError::NotFound("leave balance"))?;
        balance.reserve(draft.days)?;

        let request = self.store.persist_submit(&draft).await?;
        info!(
            request_id = request.id,
            employee_id,
            days = draft.days,
            "leave request submitted"
        );
        Ok(request)
    }

    /// Applies an approve/reject verdict to a pending request.
    pub async fn decide(
        &self,
        principal: &Principal,
        request_id: u64,
        action: DecideAction,
        comments: Option<String>,
    ) -> Result<LeaveRequest, LeaveError> {
        let request = self
            .store
            .find_request(request_id)
            .await?
            .ok_or(LeaveError::NotFound("leave request"))?;

        gate::can_perform(principal, &LeaveAction::Decide(&request))?;

        let decider = self
            .store
            .find_employee(principal.employee_id)
            .await?
            .ok_or(LeaveError::NotFound("employee"))?;

        let decision = lifecycle::decide(
            &request,
            Decider {
                id: decider.id,
                name: decider.name,
            },
            action,
            comments,
            Utc::now(),
        )?;

        let request = self.store.persist_decision(&decision).await?;
        info!(
            request_id,
            decided_by = principal.employee_id,
            status = %request.status,
            "leave request decided"
        );
        Ok(request)
    }

    /// Paginated, filtered request listing. An EMPLOYEE principal only ever
    /// sees their own requests, whatever the filter says.
    pub async fn list(
        &self,
        principal: &Principal,
        mut filter: ListFilter,
        page: PageRequest,
    ) -> Result<LeavePage, LeaveError> {
        gate::can_perform(principal, &LeaveAction::List)?;
        filter.employee_id = gate::scope_employee_filter(principal, filter.employee_id);

        let current_page = page.page.max(1);
        let page_size = page.page_size.clamp(1, 100);

        let (records, count) = self
            .store
            .list_requests(&filter, current_page, page_size)
            .await?;
        let num_pages = count.div_ceil(page_size);

        Ok(LeavePage {
            records,
            count,
            num_pages,
            current_page,
        })
    }

    /// Single-request read with the same ownership scoping as listing.
    pub async fn request(
        &self,
        principal: &Principal,
        request_id: u64,
    ) -> Result<LeaveRequest, LeaveError> {
        let request = self
            .store
            .find_request(request_id)
            .await?
            .ok_or(LeaveError::NotFound("leave request"))?;
        if principal.is_employee() && request.employee_id != principal.employee_id {
            return Err(LeaveError::Authorization(
                "employees may only view their own leave requests",
            ));
        }
        Ok(request)
    }

    /// Balance read, defaulting to the caller's own record.
    pub async fn balance(
        &self,
        principal: &Principal,
        employee_id: Option<u64>,
    ) -> Result<LeaveBalance, LeaveError> {
        let target = employee_id.unwrap_or(principal.employee_id);
        if principal.is_employee() && target != principal.employee_id {
            return Err(LeaveError::Authorization(
                "employees may only view their own leave balance",
            ));
        }
        self.store
            .load_balance(target)
            .await?
            .ok_or(LeaveError::NotFound("leave balance"))
    }
}
