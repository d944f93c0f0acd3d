//! MySQL backend. Paired writes run inside a transaction; the balance debit
//! and the decision write are conditional updates, so the row itself
//! arbitrates races (`rows_affected() == 0` means the guard lost).

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{MySqlConnection, MySqlPool};

use crate::leave::error::LeaveError;
use crate::leave::lifecycle::{BalanceEffect, Decision, LeaveDraft};
use crate::leave::store::{LeaveStore, ListFilter};
use crate::model::employee::Employee;
use crate::model::leave::{Decider, LeaveBalance, LeaveRequest, LeaveStatus};

#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

// Helper enum for typed SQLx binding
enum FilterValue {
    U64(u64),
    Str(String),
}

#[derive(sqlx::FromRow)]
struct LeaveRow {
    id: u64,
    employee_id: u64,
    start_date: NaiveDate,
    end_date: NaiveDate,
    reason: String,
    status: String,
    applied_on: DateTime<Utc>,
    decided_by: Option<u64>,
    decided_by_name: Option<String>,
    decided_on: Option<DateTime<Utc>>,
    comments: Option<String>,
}

impl LeaveRow {
    fn into_request(self) -> Result<LeaveRequest, LeaveError> {
        let status = self.status.parse::<LeaveStatus>().map_err(|_| {
            LeaveError::Store(format!(
                "unknown status '{}' on leave request {}",
                self.status, self.id
            ))
        })?;
        let decided_by = match (self.decided_by, self.decided_by_name) {
            (Some(id), Some(name)) => Some(Decider { id, name }),
            _ => None,
        };
        Ok(LeaveRequest {
            id: self.id,
            employee_id: self.employee_id,
            start_date: self.start_date,
            end_date: self.end_date,
            reason: self.reason,
            status,
            applied_on: self.applied_on,
            decided_by,
            decided_on: self.decided_on,
            comments: self.comments,
        })
    }
}

const REQUEST_SELECT: &str = r#"
    SELECT
        lr.id,
        lr.employee_id,
        lr.start_date,
        lr.end_date,
        lr.reason,
        lr.status,
        lr.applied_on,
        lr.decided_by,
        d.name AS decided_by_name,
        lr.decided_on,
        lr.comments
    FROM leave_requests lr
    JOIN employees e ON e.id = lr.employee_id
    LEFT JOIN employees d ON d.id = lr.decided_by
"#;

async fn fetch_request(
    conn: &mut MySqlConnection,
    id: u64,
) -> Result<Option<LeaveRequest>, LeaveError> {
    let sql = format!("{REQUEST_SELECT} WHERE lr.id = ?");
    let row = sqlx::query_as::<_, LeaveRow>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?;
    row.map(LeaveRow::into_request).transpose()
}

impl LeaveStore for MySqlStore {
    async fn find_employee(&self, id: u64) -> Result<Option<Employee>, LeaveError> {
        let employee = sqlx::query_as::<_, Employee>(
            r#"
            SELECT id, name, email, role, designation, department
            FROM employees
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(employee)
    }

    async fn load_balance(&self, employee_id: u64) -> Result<Option<LeaveBalance>, LeaveError> {
        let balance = sqlx::query_as::<_, (u64, u32, u32, u32, u32)>(
            r#"
            SELECT employee_id, current_balance, used_days, pending_days, available_days
            FROM leave_balances
            WHERE employee_id = ?
            "#,
        )
        .bind(employee_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(balance.map(
            |(employee_id, current_balance, used_days, pending_days, available_days)| {
                LeaveBalance {
                    employee_id,
                    current_balance,
                    used_days,
                    pending_days,
                    available_days,
                }
            },
        ))
    }

    async fn find_request(&self, id: u64) -> Result<Option<LeaveRequest>, LeaveError> {
        let mut conn = self.pool.acquire().await?;
        fetch_request(&mut conn, id).await
    }

    async fn persist_submit(&self, draft: &LeaveDraft) -> Result<LeaveRequest, LeaveError> {
        let mut tx = self.pool.begin().await?;

        // Guarded relative debit: concurrent submits serialize on the row
        // and the pool can never go negative.
        let reserved = sqlx::query(
            r#"
            UPDATE leave_balances
            SET pending_days = pending_days + ?,
                available_days = available_days - ?
            WHERE employee_id = ?
            AND available_days >= ?
            "#,
        )
        .bind(draft.days)
        .bind(draft.days)
        .bind(draft.employee_id)
        .bind(draft.days)
        .execute(&mut *tx)
        .await?;

        if reserved.rows_affected() == 0 {
            let available: Option<u32> = sqlx::query_scalar(
                "SELECT available_days FROM leave_balances WHERE employee_id = ?",
            )
            .bind(draft.employee_id)
            .fetch_optional(&mut *tx)
            .await?;
            // Dropping the transaction rolls the debit back.
            return Err(match available {
                Some(available) => LeaveError::InsufficientBalance {
                    requested: draft.days,
                    available,
                },
                None => LeaveError::NotFound("leave balance"),
            });
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO leave_requests
                (employee_id, start_date, end_date, reason, status, applied_on)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(draft.employee_id)
        .bind(draft.start_date)
        .bind(draft.end_date)
        .bind(&draft.reason)
        .bind(LeaveStatus::Pending.to_string())
        .bind(draft.applied_on)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(LeaveRequest {
            id: inserted.last_insert_id(),
            employee_id: draft.employee_id,
            start_date: draft.start_date,
            end_date: draft.end_date,
            reason: draft.reason.clone(),
            status: LeaveStatus::Pending,
            applied_on: draft.applied_on,
            decided_by: None,
            decided_on: None,
            comments: None,
        })
    }

    async fn persist_decision(&self, decision: &Decision) -> Result<LeaveRequest, LeaveError> {
        let mut tx = self.pool.begin().await?;

        // Conditional on the request still being pending; of two racing
        // decisions exactly one update takes effect.
        let updated = sqlx::query(
            r#"
            UPDATE leave_requests
            SET status = ?,
                decided_by = ?,
                decided_on = ?,
                comments = ?
            WHERE id = ?
            AND status = ?
            "#,
        )
        .bind(decision.status.to_string())
        .bind(decision.decided_by.id)
        .bind(decision.decided_on)
        .bind(decision.comments.as_deref())
        .bind(decision.request_id)
        .bind(LeaveStatus::Pending.to_string())
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            let exists: Option<u64> =
                sqlx::query_scalar("SELECT id FROM leave_requests WHERE id = ?")
                    .bind(decision.request_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            return Err(match exists {
                Some(_) => LeaveError::AlreadyDecided,
                None => LeaveError::NotFound("leave request"),
            });
        }

        let (balance_sql, days) = match decision.effect {
            BalanceEffect::Commit(days) => (
                r#"
                UPDATE leave_balances
                SET pending_days = pending_days - ?,
                    used_days = used_days + ?
                WHERE employee_id = ?
                AND pending_days >= ?
                "#,
                days,
            ),
            BalanceEffect::Release(days) => (
                r#"
                UPDATE leave_balances
                SET pending_days = pending_days - ?,
                    available_days = available_days + ?
                WHERE employee_id = ?
                AND pending_days >= ?
                "#,
                days,
            ),
        };

        let balanced = sqlx::query(balance_sql)
            .bind(days)
            .bind(days)
            .bind(decision.employee_id)
            .bind(days)
            .execute(&mut *tx)
            .await?;

        if balanced.rows_affected() == 0 {
            // Rolls back the status write; a half-applied decision never
            // becomes visible.
            return Err(LeaveError::Store(format!(
                "leave balance for employee {} is out of step with its requests",
                decision.employee_id
            )));
        }

        let request = fetch_request(&mut *tx, decision.request_id)
            .await?
            .ok_or(LeaveError::NotFound("leave request"))?;
        tx.commit().await?;
        Ok(request)
    }

    async fn list_requests(
        &self,
        filter: &ListFilter,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<LeaveRequest>, u64), LeaveError> {
        let offset = (page - 1) * page_size;

        let mut where_sql = String::from(" WHERE 1=1");
        let mut args: Vec<FilterValue> = Vec::new();

        if let Some(employee_id) = filter.employee_id {
            where_sql.push_str(" AND lr.employee_id = ?");
            args.push(FilterValue::U64(employee_id));
        }

        if let Some(status) = filter.status {
            where_sql.push_str(" AND lr.status = ?");
            args.push(FilterValue::Str(status.to_string()));
        }

        if let Some(search) = filter.search.as_deref() {
            where_sql.push_str(" AND (e.name LIKE ? OR e.email LIKE ? OR lr.reason LIKE ?)");
            let like = format!("%{}%", search);
            args.push(FilterValue::Str(like.clone()));
            args.push(FilterValue::Str(like.clone()));
            args.push(FilterValue::Str(like));
        }

        let count_sql = format!(
            "SELECT COUNT(*) FROM leave_requests lr JOIN employees e ON e.id = lr.employee_id{}",
            where_sql
        );

        let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
        for arg in &args {
            count_q = match arg {
                FilterValue::U64(v) => count_q.bind(*v),
                FilterValue::Str(s) => count_q.bind(s.clone()),
            };
        }
        let count = count_q.fetch_one(&self.pool).await?;

        let data_sql = format!(
            "{REQUEST_SELECT} {} ORDER BY lr.applied_on DESC, lr.id DESC LIMIT ? OFFSET ?",
            where_sql
        );

        let mut data_q = sqlx::query_as::<_, LeaveRow>(&data_sql);
        for arg in args {
            data_q = match arg {
                FilterValue::U64(v) => data_q.bind(v),
                FilterValue::Str(s) => data_q.bind(s),
            };
        }

        let rows = data_q
            .bind(page_size)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let records = rows
            .into_iter()
            .map(LeaveRow::into_request)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((records, count.max(0) as u64))
    }
}
