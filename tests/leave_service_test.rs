//! Service public API integration tests over the in-memory store.

use chrono::NaiveDate;
use leavedesk::leave::service::{LeaveService, PageRequest};
use leavedesk::leave::store::{LeaveStore, ListFilter, MemoryStore};
use leavedesk::leave::{LeaveError, Principal};
use leavedesk::model::employee::Employee;
use leavedesk::model::leave::{DecideAction, LeaveStatus};
use leavedesk::model::role::Role;

fn employee(id: u64, name: &str, email: &str, role: Role) -> Employee {
    Employee {
        id,
        name: name.into(),
        email: email.into(),
        role: role.to_string(),
        designation: "Software Engineer".into(),
        department: "Engineering".into(),
    }
}

/// John (employee, 24 days), Ann (employee, 24 days), Maria (manager).
fn service_with_team() -> LeaveService<MemoryStore> {
    let store = MemoryStore::new();
    store.add_employee(
        employee(1000, "John Doe", "john@company.com", Role::Employee),
        24,
    );
    store.add_employee(
        employee(1001, "Ann Smith", "ann@company.com", Role::Employee),
        24,
    );
    store.add_employee(
        employee(7, "Maria Keller", "maria@company.com", Role::Manager),
        24,
    );
    LeaveService::new(store)
}

fn john() -> Principal {
    Principal::new(1000, Role::Employee)
}

fn ann() -> Principal {
    Principal::new(1001, Role::Employee)
}

fn maria() -> Principal {
    Principal::new(7, Role::Manager)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn balance_of(service: &LeaveService<MemoryStore>, employee_id: u64) -> (u32, u32, u32, u32) {
    let balance = service
        .store()
        .load_balance(employee_id)
        .await
        .unwrap()
        .unwrap();
    (
        balance.current_balance,
        balance.available_days,
        balance.pending_days,
        balance.used_days,
    )
}

#[actix_web::test]
async fn submit_reserves_days_and_goes_pending() {
    let service = service_with_team();

    let request = service
        .submit(&john(), None, date(2024, 6, 10), date(2024, 6, 12), "trip")
        .await
        .unwrap();

    assert_eq!(request.employee_id, 1000);
    assert_eq!(request.status, LeaveStatus::Pending);
    assert!(request.decided_by.is_none());
    assert!(request.decided_on.is_none());
    assert!(request.comments.is_none());

    assert_eq!(balance_of(&service, 1000).await, (24, 21, 3, 0));
}

#[actix_web::test]
async fn approve_commits_reserved_days_once() {
    let service = service_with_team();
    let request = service
        .submit(&john(), None, date(2024, 6, 10), date(2024, 6, 12), "trip")
        .await
        .unwrap();

    let approved = service
        .decide(
            &maria(),
            request.id,
            DecideAction::Approve,
            Some("enjoy".into()),
        )
        .await
        .unwrap();

    assert_eq!(approved.status, LeaveStatus::Approved);
    let decider = approved.decided_by.unwrap();
    assert_eq!(decider.id, 7);
    assert_eq!(decider.name, "Maria Keller");
    assert!(approved.decided_on.is_some());
    assert_eq!(approved.comments.as_deref(), Some("enjoy"));

    // Approval converts the reserve; the available pool is untouched by it.
    assert_eq!(balance_of(&service, 1000).await, (24, 21, 0, 3));

    // Second decision on the same request loses.
    let err = service
        .decide(&maria(), request.id, DecideAction::Approve, None)
        .await
        .unwrap_err();
    assert_eq!(err, LeaveError::AlreadyDecided);
    assert_eq!(balance_of(&service, 1000).await, (24, 21, 0, 3));
}

#[actix_web::test]
async fn reject_releases_reserved_days() {
    let service = service_with_team();
    let request = service
        .submit(&john(), None, date(2024, 6, 10), date(2024, 6, 12), "trip")
        .await
        .unwrap();

    let rejected = service
        .decide(&maria(), request.id, DecideAction::Reject, None)
        .await
        .unwrap();

    assert_eq!(rejected.status, LeaveStatus::Rejected);
    assert_eq!(balance_of(&service, 1000).await, (24, 24, 0, 0));

    let err = service
        .decide(&maria(), request.id, DecideAction::Approve, None)
        .await
        .unwrap_err();
    assert_eq!(err, LeaveError::AlreadyDecided);
}

#[actix_web::test]
async fn submit_on_empty_balance_fails_and_changes_nothing() {
    let service = service_with_team();
    service.store().add_employee(
        employee(2000, "Ken Low", "ken@company.com", Role::Employee),
        0,
    );

    let err = service
        .submit(
            &Principal::new(2000, Role::Employee),
            None,
            date(2024, 7, 1),
            date(2024, 7, 1),
            "dentist",
        )
        .await
        .unwrap_err();

    assert_eq!(
        err,
        LeaveError::InsufficientBalance {
            requested: 1,
            available: 0
        }
    );
    assert_eq!(balance_of(&service, 2000).await, (0, 0, 0, 0));

    let page = service
        .list(&maria(), ListFilter::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.count, 0);
}

#[actix_web::test]
async fn submit_beyond_available_fails_without_partial_debit() {
    let service = service_with_team();

    // 20 of 24 days reserved, 4 left.
    service
        .submit(&john(), None, date(2024, 6, 1), date(2024, 6, 20), "long trip")
        .await
        .unwrap();

    let err = service
        .submit(&john(), None, date(2024, 7, 1), date(2024, 7, 5), "more")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        LeaveError::InsufficientBalance {
            requested: 5,
            available: 4
        }
    );
    assert_eq!(balance_of(&service, 1000).await, (24, 4, 20, 0));
}

#[actix_web::test]
async fn submit_validation_failures_leave_no_trace() {
    let service = service_with_team();

    let err = service
        .submit(&john(), None, date(2024, 6, 10), date(2024, 6, 12), "   ")
        .await
        .unwrap_err();
    assert!(matches!(err, LeaveError::Validation(_)));

    let err = service
        .submit(&john(), None, date(2024, 6, 12), date(2024, 6, 10), "trip")
        .await
        .unwrap_err();
    assert!(matches!(err, LeaveError::Validation(_)));

    assert_eq!(balance_of(&service, 1000).await, (24, 24, 0, 0));
    let page = service
        .list(&maria(), ListFilter::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.count, 0);
}

#[actix_web::test]
async fn employee_cannot_submit_for_someone_else() {
    let service = service_with_team();

    let err = service
        .submit(
            &john(),
            Some(1001),
            date(2024, 6, 10),
            date(2024, 6, 12),
            "trip",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LeaveError::Authorization(_)));
    assert_eq!(balance_of(&service, 1001).await, (24, 24, 0, 0));
}

#[actix_web::test]
async fn manager_submits_on_behalf_of_employee() {
    let service = service_with_team();

    let request = service
        .submit(
            &maria(),
            Some(1001),
            date(2024, 6, 10),
            date(2024, 6, 11),
            "offsite",
        )
        .await
        .unwrap();

    assert_eq!(request.employee_id, 1001);
    // Ann's pool is debited, not Maria's.
    assert_eq!(balance_of(&service, 1001).await, (24, 22, 2, 0));
    assert_eq!(balance_of(&service, 7).await, (24, 24, 0, 0));
}

#[actix_web::test]
async fn employee_cannot_decide() {
    let service = service_with_team();
    let request = service
        .submit(&john(), None, date(2024, 6, 10), date(2024, 6, 12), "trip")
        .await
        .unwrap();

    let err = service
        .decide(&ann(), request.id, DecideAction::Approve, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LeaveError::Authorization(_)));
    assert_eq!(balance_of(&service, 1000).await, (24, 21, 3, 0));
}

#[actix_web::test]
async fn deciding_unknown_request_is_not_found() {
    let service = service_with_team();
    let err = service
        .decide(&maria(), 999, DecideAction::Approve, None)
        .await
        .unwrap_err();
    assert_eq!(err, LeaveError::NotFound("leave request"));
}

#[actix_web::test]
async fn racing_decisions_produce_one_winner() {
    let service = service_with_team();
    let request = service
        .submit(&john(), None, date(2024, 6, 10), date(2024, 6, 12), "trip")
        .await
        .unwrap();

    let manager = maria();
    let (first, second) = futures::join!(
        service.decide(&manager, request.id, DecideAction::Approve, None),
        service.decide(&manager, request.id, DecideAction::Reject, None),
    );

    let successes = [&first, &second].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    assert!(
        [&first, &second]
            .iter()
            .any(|r| matches!(r, Err(LeaveError::AlreadyDecided)))
    );

    // Whichever verdict won, the ledger accounted its three days only once.
    let (current, available, pending, used) = balance_of(&service, 1000).await;
    assert_eq!(pending, 0);
    assert_eq!(available + used + pending, current);
}

#[actix_web::test]
async fn employee_list_is_scoped_to_self() {
    let service = service_with_team();
    service
        .submit(&john(), None, date(2024, 6, 10), date(2024, 6, 12), "trip")
        .await
        .unwrap();
    service
        .submit(&ann(), None, date(2024, 6, 20), date(2024, 6, 21), "wedding")
        .await
        .unwrap();

    // John asks for Ann's requests; the filter is overridden to his own.
    let filter = ListFilter {
        employee_id: Some(1001),
        ..Default::default()
    };
    let page = service
        .list(&john(), filter, PageRequest::default())
        .await
        .unwrap();

    assert_eq!(page.count, 1);
    assert!(page.records.iter().all(|r| r.employee_id == 1000));
}

#[actix_web::test]
async fn list_filters_and_paginates() {
    let service = service_with_team();
    let first = service
        .submit(&john(), None, date(2024, 6, 10), date(2024, 6, 12), "trip")
        .await
        .unwrap();
    service
        .submit(&ann(), None, date(2024, 6, 20), date(2024, 6, 21), "wedding")
        .await
        .unwrap();
    service
        .submit(&john(), None, date(2024, 7, 1), date(2024, 7, 2), "move house")
        .await
        .unwrap();
    service
        .decide(&maria(), first.id, DecideAction::Approve, None)
        .await
        .unwrap();

    // Status filter narrows to the still-pending pair.
    let page = service
        .list(
            &maria(),
            ListFilter {
                status: Some(LeaveStatus::Pending),
                ..Default::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(page.count, 2);

    // Search is case-insensitive over employee name/email and reason.
    let page = service
        .list(
            &maria(),
            ListFilter {
                search: Some("ANN".into()),
                ..Default::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(page.count, 1);
    assert_eq!(page.records[0].employee_id, 1001);

    let page = service
        .list(
            &maria(),
            ListFilter {
                search: Some("wedd".into()),
                ..Default::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(page.count, 1);

    // Page size 2 over 3 records: two pages, newest applied_on first.
    let page = service
        .list(
            &maria(),
            ListFilter::default(),
            PageRequest {
                page: 1,
                page_size: 2,
            },
        )
        .await
        .unwrap();
    assert_eq!(page.count, 3);
    assert_eq!(page.num_pages, 2);
    assert_eq!(page.current_page, 1);
    assert_eq!(page.records.len(), 2);
    assert!(page.records[0].applied_on >= page.records[1].applied_on);

    let page = service
        .list(
            &maria(),
            ListFilter::default(),
            PageRequest {
                page: 2,
                page_size: 2,
            },
        )
        .await
        .unwrap();
    assert_eq!(page.records.len(), 1);
}

#[actix_web::test]
async fn balance_reads_are_scoped() {
    let service = service_with_team();

    // Defaults to the caller.
    let own = service.balance(&john(), None).await.unwrap();
    assert_eq!(own.employee_id, 1000);

    // An employee cannot read someone else's balance.
    let err = service.balance(&john(), Some(1001)).await.unwrap_err();
    assert!(matches!(err, LeaveError::Authorization(_)));

    // A manager can.
    let other = service.balance(&maria(), Some(1001)).await.unwrap();
    assert_eq!(other.employee_id, 1001);

    let err = service.balance(&maria(), Some(4242)).await.unwrap_err();
    assert_eq!(err, LeaveError::NotFound("leave balance"));
}

#[actix_web::test]
async fn single_request_reads_are_scoped() {
    let service = service_with_team();
    let request = service
        .submit(&ann(), None, date(2024, 6, 20), date(2024, 6, 21), "wedding")
        .await
        .unwrap();

    let err = service.request(&john(), request.id).await.unwrap_err();
    assert!(matches!(err, LeaveError::Authorization(_)));

    let seen = service.request(&ann(), request.id).await.unwrap();
    assert_eq!(seen.id, request.id);

    let seen = service.request(&maria(), request.id).await.unwrap();
    assert_eq!(seen.employee_id, 1001);
}

#[actix_web::test]
async fn accounting_identity_survives_a_mixed_history() {
    let service = service_with_team();

    let a = service
        .submit(&john(), None, date(2024, 3, 4), date(2024, 3, 8), "spring break")
        .await
        .unwrap();
    let b = service
        .submit(&john(), None, date(2024, 5, 1), date(2024, 5, 1), "errand")
        .await
        .unwrap();
    service
        .decide(&maria(), a.id, DecideAction::Approve, None)
        .await
        .unwrap();
    service
        .decide(&maria(), b.id, DecideAction::Reject, Some("busy week".into()))
        .await
        .unwrap();
    service
        .submit(&john(), None, date(2024, 8, 12), date(2024, 8, 13), "concert")
        .await
        .unwrap();

    // 5 used, 2 pending, 17 available.
    assert_eq!(balance_of(&service, 1000).await, (24, 17, 2, 5));
}
