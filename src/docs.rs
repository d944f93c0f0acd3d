use crate::api::employee::{CreateEmployee, EmployeeListResponse, EmployeeQuery};
use crate::api::leave::{
    BalanceData, BalanceQuery, BalanceResponse, DecideLeave, LeaveListQuery, LeaveListResponse,
    SubmitLeave,
};
use crate::model::employee::Employee;
use crate::model::leave::{DecideAction, Decider, LeaveBalance, LeaveRequest, LeaveStatus};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "LeaveDesk API",
        version = "1.0.0",
        description = r#"
## Leave Management Service

This API powers the leave-request workflow of an HR console: balances,
submissions, and approvals.

### 🔹 Key Features
- **Leave Requests**
  - Submit for yourself, or on behalf of an employee (Manager/HR/Admin)
  - Approve or reject pending requests with comments
  - Paginated, filterable history with employee search
- **Leave Balances**
  - Per-employee day accounting: available, pending, and used days
  - Balances and request statuses always move together
- **Employee Management**
  - Create, update, list, and view employee profiles
  - New employees are provisioned with the default leave balance

### 🔐 Security
Endpoints are protected using **JWT Bearer authentication**. Role-based
rules decide who may submit for others, see whose requests, and decide.

### 📦 Response Format
- JSON-based RESTful responses tagged with a `status` flag
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::leave::leave_list,
        crate::api::leave::get_leave,
        crate::api::leave::submit_leave,
        crate::api::leave::decide_leave,
        crate::api::leave::leave_balance,

        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::list_employees,
        crate::api::employee::update_employee,
    ),
    components(
        schemas(
            SubmitLeave,
            DecideLeave,
            DecideAction,
            Decider,
            LeaveStatus,
            LeaveRequest,
            LeaveBalance,
            LeaveListQuery,
            LeaveListResponse,
            BalanceQuery,
            BalanceResponse,
            BalanceData,
            CreateEmployee,
            EmployeeQuery,
            Employee,
            EmployeeListResponse
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Leave", description = "Leave management APIs"),
        (name = "Employee", description = "Employee management APIs"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
