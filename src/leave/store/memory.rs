//! In-memory backend. One mutex serializes whole operations, which is what
//! makes the paired request/balance writes atomic and keeps concurrent
//! submits in arrival order.

use std::collections::{BTreeMap, HashMap};

use parking_lot::Mutex;

use crate::leave::error::LeaveError;
use crate::leave::lifecycle::{BalanceEffect, Decision, LeaveDraft};
use crate::leave::store::{LeaveStore, ListFilter};
use crate::model::employee::Employee;
use crate::model::leave::{LeaveBalance, LeaveRequest, LeaveStatus};

#[derive(Default)]
struct MemoryData {
    employees: HashMap<u64, Employee>,
    balances: HashMap<u64, LeaveBalance>,
    requests: BTreeMap<u64, LeaveRequest>,
    next_request_id: u64,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryData>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an employee together with their opening balance, the way
    /// onboarding provisions both rows.
    pub fn add_employee(&self, employee: Employee, opening_days: u32) {
        let mut data = self.inner.lock();
        data.balances.insert(
            employee.id,
            LeaveBalance::opening(employee.id, opening_days),
        );
        data.employees.insert(employee.id, employee);
    }
}

impl MemoryData {
    fn matches(&self, request: &LeaveRequest, filter: &ListFilter) -> bool {
        if let Some(employee_id) = filter.employee_id {
            if request.employee_id != employee_id {
                return false;
            }
        }
        if let Some(status) = filter.status {
            if request.status != status {
                return false;
            }
        }
        if let Some(search) = &filter.search {
            let needle = search.to_lowercase();
            let employee = self.employees.get(&request.employee_id);
            let in_name = employee
                .map(|e| e.name.to_lowercase().contains(&needle))
                .unwrap_or(false);
            let in_email = employee
                .map(|e| e.email.to_lowercase().contains(&needle))
                .unwrap_or(false);
            let in_reason = request.reason.to_lowercase().contains(&needle);
            if !(in_name || in_email || in_reason) {
                return false;
            }
        }
        true
    }
}

impl LeaveStore for MemoryStore {
    async fn find_employee(&self, id: u64) -> Result<Option<Employee>, LeaveError> {
        Ok(self.inner.lock().employees.get(&id).cloned())
    }

    async fn load_balance(&self, employee_id: u64) -> Result<Option<LeaveBalance>, LeaveError> {
        Ok(self.inner.lock().balances.get(&employee_id).cloned())
    }

    async fn find_request(&self, id: u64) -> Result<Option<LeaveRequest>, LeaveError> {
        Ok(self.inner.lock().requests.get(&id).cloned())
    }

    async fn persist_submit(&self, draft: &LeaveDraft) -> Result<LeaveRequest, LeaveError> {
        let mut data = self.inner.lock();
        let balance = data
            .balances
            .get_mut(&draft.employee_id)
            .ok_or(LeaveError::NotFound("leave balance"))?;
        balance.reserve(draft.days)?;

        data.next_request_id += 1;
        let request = LeaveRequest {
            id: data.next_request_id,
            employee_id: draft.employee_id,
            start_date: draft.start_date,
            end_date: draft.end_date,
            reason: draft.reason.clone(),
            status: LeaveStatus::Pending,
            applied_on: draft.applied_on,
            decided_by: None,
            decided_on: None,
            comments: None,
        };
        data.requests.insert(request.id, request.clone());
        Ok(request)
    }

    async fn persist_decision(&self, decision: &Decision) -> Result<LeaveRequest, LeaveError> {
        let mut data = self.inner.lock();

        // Both checks run under the same lock as the writes, so a second
        // decision racing this one observes the terminal status.
        let status = data
            .requests
            .get(&decision.request_id)
            .ok_or(LeaveError::NotFound("leave request"))?
            .status;
        if status != LeaveStatus::Pending {
            return Err(LeaveError::AlreadyDecided);
        }

        let balance = data
            .balances
            .get_mut(&decision.employee_id)
            .ok_or(LeaveError::NotFound("leave balance"))?;
        match decision.effect {
            BalanceEffect::Commit(days) => balance.commit_used(days)?,
            BalanceEffect::Release(days) => balance.release(days)?,
        }

        let request = data
            .requests
            .get_mut(&decision.request_id)
            .expect("request vanished under lock");
        request.status = decision.status;
        request.decided_by = Some(decision.decided_by.clone());
        request.decided_on = Some(decision.decided_on);
        request.comments = decision.comments.clone();
        Ok(request.clone())
    }

    async fn list_requests(
        &self,
        filter: &ListFilter,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<LeaveRequest>, u64), LeaveError> {
        let data = self.inner.lock();
        let mut matching: Vec<&LeaveRequest> = data
            .requests
            .values()
            .filter(|r| data.matches(r, filter))
            .collect();
        matching.sort_by(|a, b| b.applied_on.cmp(&a.applied_on).then(b.id.cmp(&a.id)));

        let count = matching.len() as u64;
        let offset = (page - 1).saturating_mul(page_size) as usize;
        let records = matching
            .into_iter()
            .skip(offset)
            .take(page_size as usize)
            .cloned()
            .collect();
        Ok((records, count))
    }
}
