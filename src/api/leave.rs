use std::str::FromStr;

use crate::auth::auth::AuthUser;
use crate::leave::error::LeaveError;
use crate::leave::service::PageRequest;
use crate::leave::store::{ListFilter, MySqlStore};
use crate::leave::LeaveService;
use crate::model::leave::{DecideAction, LeaveBalance, LeaveRequest, LeaveStatus};
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

/// The production service type the HTTP layer is wired against.
pub type AppLeaveService = LeaveService<MySqlStore>;

#[derive(Deserialize, ToSchema)]
pub struct SubmitLeave {
    /// Employee the leave is for; deciding roles may submit on behalf of
    /// someone else. Defaults to the caller.
    #[schema(example = 1000)]
    pub employee_id: Option<u64>,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-03", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "family trip")]
    pub reason: String,
}

#[derive(Deserialize, ToSchema)]
pub struct DecideLeave {
    #[schema(example = "APPROVED")]
    pub action: DecideAction,
    #[schema(example = "enjoy", nullable = true)]
    pub comments: Option<String>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveListQuery {
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u64>,
    #[schema(example = 10)]
    /// Pagination page size
    pub page_size: Option<u64>,
    #[schema(example = "PENDING")]
    /// Filter by leave status
    pub status: Option<String>,
    #[schema(example = "trip")]
    /// Case-insensitive match on employee name, email, or reason
    pub search: Option<String>,
    #[schema(example = 1000)]
    /// Filter by employee ID (ignored for EMPLOYEE callers)
    pub employee_id: Option<u64>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct BalanceQuery {
    #[schema(example = 1000)]
    /// Employee whose balance to read; defaults to the caller
    pub employee_id: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub status: bool,
    pub records: Vec<LeaveRequest>,
    #[schema(example = 1)]
    pub count: u64,
    #[schema(example = 1)]
    pub num_pages: u64,
    #[schema(example = 1)]
    pub current_page: u64,
}

#[derive(Serialize, ToSchema)]
pub struct BalanceResponse {
    pub status: bool,
    pub data: BalanceData,
}

#[derive(Serialize, ToSchema)]
pub struct BalanceData {
    pub leave_balance: LeaveBalance,
}

/// Maps a core failure onto the tagged `{status: false, message}` body. A
/// `Store` failure is logged and hidden behind a generic 500; everything
/// else carries its own message.
fn failure(err: LeaveError) -> HttpResponse {
    let body = json!({"status": false, "message": err.to_string()});
    match err {
        LeaveError::Validation(_) => HttpResponse::BadRequest().json(body),
        LeaveError::Authorization(_) => HttpResponse::Forbidden().json(body),
        LeaveError::NotFound(_) => HttpResponse::NotFound().json(body),
        LeaveError::AlreadyDecided => HttpResponse::Conflict().json(body),
        LeaveError::InsufficientBalance { .. } => HttpResponse::UnprocessableEntity().json(body),
        LeaveError::Store(e) => {
            tracing::error!(error = %e, "leave store failure");
            HttpResponse::InternalServerError().json(json!({
                "status": false,
                "message": "Internal Server Error"
            }))
        }
    }
}

/* =========================
Submit leave request
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/leave",
    request_body(
        content = SubmitLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Leave request submitted", body = Object, example = json!({
            "status": true,
            "message": "Leave request submitted",
            "data": {"id": 1, "status": "PENDING"}
        })),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 422, description = "Insufficient balance")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn submit_leave(
    auth: AuthUser,
    service: web::Data<AppLeaveService>,
    payload: web::Json<SubmitLeave>,
) -> actix_web::Result<impl Responder> {
    let principal = auth.principal()?;

    match service
        .submit(
            &principal,
            payload.employee_id,
            payload.start_date,
            payload.end_date,
            &payload.reason,
        )
        .await
    {
        Ok(request) => Ok(HttpResponse::Ok().json(json!({
            "status": true,
            "message": "Leave request submitted",
            "data": request
        }))),
        Err(err) => Ok(failure(err)),
    }
}

/* =========================
Decide leave (Manager/HR/Admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/decide",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to decide")
    ),
    request_body = DecideLeave,
    responses(
        (status = 200, description = "Decision applied", body = Object, example = json!({
            "status": true,
            "message": "Leave request decided",
            "data": {"id": 1, "status": "APPROVED"}
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Already decided")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn decide_leave(
    auth: AuthUser,
    service: web::Data<AppLeaveService>,
    path: web::Path<u64>,
    payload: web::Json<DecideLeave>,
) -> actix_web::Result<impl Responder> {
    let principal = auth.principal()?;
    let leave_id = path.into_inner();
    let payload = payload.into_inner();

    match service
        .decide(&principal, leave_id, payload.action, payload.comments)
        .await
    {
        Ok(request) => Ok(HttpResponse::Ok().json(json!({
            "status": true,
            "message": "Leave request decided",
            "data": request
        }))),
        Err(err) => Ok(failure(err)),
    }
}

/* =========================
List leave requests
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/leave",
    params(LeaveListQuery),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    service: web::Data<AppLeaveService>,
    query: web::Query<LeaveListQuery>,
) -> actix_web::Result<impl Responder> {
    let principal = auth.principal()?;

    let status = match query.status.as_deref() {
        Some(raw) => match LeaveStatus::from_str(raw) {
            Ok(s) => Some(s),
            Err(_) => {
                return Ok(failure(LeaveError::Validation(format!(
                    "unknown status '{raw}'"
                ))));
            }
        },
        None => None,
    };

    let filter = ListFilter {
        status,
        search: query.search.clone(),
        employee_id: query.employee_id,
    };
    let page = PageRequest {
        page: query.page.unwrap_or(1),
        page_size: query.page_size.unwrap_or(10),
    };

    match service.list(&principal, filter, page).await {
        Ok(page) => Ok(HttpResponse::Ok().json(LeaveListResponse {
            status: true,
            records: page.records,
            count: page.count,
            num_pages: page.num_pages,
            current_page: page.current_page,
        })),
        Err(err) => Ok(failure(err)),
    }
}

/* =========================
Get one leave request
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequest),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    service: web::Data<AppLeaveService>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let principal = auth.principal()?;
    let leave_id = path.into_inner();

    match service.request(&principal, leave_id).await {
        Ok(request) => Ok(HttpResponse::Ok().json(json!({
            "status": true,
            "data": request
        }))),
        Err(err) => Ok(failure(err)),
    }
}

/* =========================
Leave balance
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/leave/balance",
    params(BalanceQuery),
    responses(
        (status = 200, description = "Leave balance", body = BalanceResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Balance not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_balance(
    auth: AuthUser,
    service: web::Data<AppLeaveService>,
    query: web::Query<BalanceQuery>,
) -> actix_web::Result<impl Responder> {
    let principal = auth.principal()?;

    match service.balance(&principal, query.employee_id).await {
        Ok(balance) => Ok(HttpResponse::Ok().json(BalanceResponse {
            status: true,
            data: BalanceData {
                leave_balance: balance,
            },
        })),
        Err(err) => Ok(failure(err)),
    }
}
