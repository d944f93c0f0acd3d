//! Persistence port for the leave subsystem.
//!
//! The service talks to one of two backends through [`LeaveStore`]: MySQL in
//! production, an in-memory map store for tests and local runs. Both enforce
//! the same atomicity contract: the request write and the balance write of a
//! submit or decide succeed or fail together, and a decision only lands on a
//! request that is still pending.

use crate::leave::error::LeaveError;
use crate::leave::lifecycle::{Decision, LeaveDraft};
use crate::model::employee::Employee;
use crate::model::leave::{LeaveBalance, LeaveRequest, LeaveStatus};

pub mod memory;
pub mod mysql;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

/// Normalized list filter. `employee_id` arrives here already scoped by the
/// authorization gate.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub status: Option<LeaveStatus>,
    pub search: Option<String>,
    pub employee_id: Option<u64>,
}

#[allow(async_fn_in_trait)]
pub trait LeaveStore: Send + Sync {
    async fn find_employee(&self, id: u64) -> Result<Option<Employee>, LeaveError>;

    async fn load_balance(&self, employee_id: u64) -> Result<Option<LeaveBalance>, LeaveError>;

    async fn find_request(&self, id: u64) -> Result<Option<LeaveRequest>, LeaveError>;

    /// Reserves the draft's days and stores the pending request as one
    /// atomic unit. Fails `InsufficientBalance` without any visible write
    /// when the guarded debit loses to concurrent submissions.
    async fn persist_submit(&self, draft: &LeaveDraft) -> Result<LeaveRequest, LeaveError>;

    /// Applies a terminal decision and its balance effect as one atomic
    /// unit, conditional on the request still being pending. Exactly one of
    /// two racing decisions succeeds; the other gets `AlreadyDecided`.
    async fn persist_decision(&self, decision: &Decision) -> Result<LeaveRequest, LeaveError>;

    /// Filtered page of requests, newest `applied_on` first, plus the total
    /// matching count.
    async fn list_requests(
        &self,
        filter: &ListFilter,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<LeaveRequest>, u64), LeaveError>;
}
