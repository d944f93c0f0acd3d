use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Lifecycle status of a leave request. PENDING is the only non-terminal
/// state; no transition ever leaves APPROVED or REJECTED.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

/// Terminal outcome requested by a decider.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
pub enum DecideAction {
    #[serde(rename = "APPROVED")]
    Approve,
    #[serde(rename = "REJECTED")]
    Reject,
}

/// Who decided a request. Kept as a typed pair so consumers never have to
/// sniff a loosely-shaped object off the wire.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Decider {
    #[schema(example = 7)]
    pub id: u64,
    #[schema(example = "Maria Keller")]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeaveRequest {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-03", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "family trip")]
    pub reason: String,
    #[schema(example = "PENDING")]
    pub status: LeaveStatus,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub applied_on: DateTime<Utc>,
    pub decided_by: Option<Decider>,
    #[schema(example = "2026-01-02T00:00:00Z", format = "date-time", value_type = String, nullable = true)]
    pub decided_on: Option<DateTime<Utc>>,
    #[schema(example = "enjoy", nullable = true)]
    pub comments: Option<String>,
}

impl LeaveRequest {
    pub fn is_pending(&self) -> bool {
        self.status == LeaveStatus::Pending
    }
}

/// Per-employee day accounting. `available_days` is always
/// `current_balance - used_days - pending_days`; every mutation lives in
/// `leave::ledger` and preserves that identity.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "employee_id": 1000,
        "current_balance": 24,
        "used_days": 3,
        "pending_days": 2,
        "available_days": 19
    })
)]
pub struct LeaveBalance {
    pub employee_id: u64,
    pub current_balance: u32,
    pub used_days: u32,
    pub pending_days: u32,
    pub available_days: u32,
}

impl LeaveBalance {
    /// Fresh balance provisioned at employee onboarding.
    pub fn opening(employee_id: u64, days: u32) -> Self {
        Self {
            employee_id,
            current_balance: days,
            used_days: 0,
            pending_days: 0,
            available_days: days,
        }
    }
}
