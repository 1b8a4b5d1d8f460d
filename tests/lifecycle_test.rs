//! Lifecycle state-machine tests over the in-memory store.
//!
//! These exercise the controller end to end without PostgreSQL: creation,
//! time-derived phases, ESD outcomes, the rewash escalation path, and the
//! scrap threshold.

use std::sync::Arc;

use chrono::{Duration, Utc};
use uniform_wash_tracker::error::WashError;
use uniform_wash_tracker::models::api::{CreateWashJobRequest, IssueCodeRequest};
use uniform_wash_tracker::models::garment::{GarmentStatus, InventoryCode};
use uniform_wash_tracker::models::wash::{EsdResult, WashPhase};
use uniform_wash_tracker::services::lifecycle::{AutoConfirm, ConfirmGuard, WashLifecycle};
use uniform_wash_tracker::services::scrap::ScrapPolicy;
use uniform_wash_tracker::services::status;
use uniform_wash_tracker::store::memory::MemStore;
use uniform_wash_tracker::store::WashStore;

struct DenyAll;

impl ConfirmGuard for DenyAll {
    fn confirm(&self, _message: &str) -> bool {
        false
    }
}

fn setup() -> (Arc<MemStore>, WashLifecycle) {
    let store = Arc::new(MemStore::new());
    let lifecycle = WashLifecycle::new(
        store.clone(),
        ScrapPolicy::default(),
        Arc::new(AutoConfirm),
    );
    (store, lifecycle)
}

fn issue_req(code: &str) -> IssueCodeRequest {
    IssueCodeRequest {
        code: code.to_string(),
        uniform_ref: "jacket-m-navy".to_string(),
    }
}

fn job_req(code: &str) -> CreateWashJobRequest {
    CreateWashJobRequest {
        code: code.to_string(),
        employee_id: "emp-42".to_string(),
        size: Some("M".to_string()),
    }
}

#[tokio::test]
async fn wash_cycle_scenario_from_creation_to_rewash() {
    let (_store, lifecycle) = setup();
    lifecycle.issue_code(issue_req("UC-0001")).await.unwrap();

    let job = lifecycle.create_wash_job(job_req("UC-0001")).await.unwrap();
    assert_eq!(job.rewash_count, 0);

    // Immediately after creation the garment is waiting to be sent.
    let now = Utc::now();
    assert_eq!(status::derive_job_phase(&job, now), WashPhase::WaitingToSend);

    // 1.5 days later it is in the washer.
    assert_eq!(
        status::derive_job_phase(&job, now + Duration::hours(36)),
        WashPhase::Washing
    );

    // 3 days later the cycle is complete and the garment awaits retest.
    assert_eq!(
        status::derive_job_phase(&job, now + Duration::days(3)),
        WashPhase::Completed
    );

    // Failed retest: history entry, count 1, job closed.
    let (entry, outcome) = lifecycle.record_esd_fail(job.id).await.unwrap();
    assert_eq!(entry.result, EsdResult::Fail);
    assert_eq!(outcome.rewash_count, 1);
    assert!(!outcome.scrapped);
    assert!(matches!(
        lifecycle.get_wash_job(job.id).await,
        Err(WashError::NotFound(_))
    ));

    let history = lifecycle.code_history("UC-0001").await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].result, EsdResult::Fail);

    // A new job for the same garment starts in the rewash queue.
    let requeued = lifecycle.create_wash_job(job_req("UC-0001")).await.unwrap();
    assert_eq!(requeued.rewash_count, 1);
    assert_eq!(
        status::derive_job_phase(&requeued, Utc::now()),
        WashPhase::WaitingRewash(1)
    );
}

#[tokio::test]
async fn duplicate_active_job_is_rejected_without_mutation() {
    let (store, lifecycle) = setup();
    lifecycle.issue_code(issue_req("UC-0002")).await.unwrap();
    let first = lifecycle.create_wash_job(job_req("UC-0002")).await.unwrap();

    let err = lifecycle.create_wash_job(job_req("UC-0002")).await;
    assert!(matches!(err, Err(WashError::DuplicateActiveJob(_))));

    // The original job and garment state are untouched.
    let jobs = store.list_jobs().await.unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].id, first.id);

    let code = store.get_code("UC-0002").await.unwrap().unwrap();
    assert_eq!(code.rewash_count, 0);
    assert_eq!(code.status, GarmentStatus::InUse);
}

#[tokio::test]
async fn unknown_code_and_unknown_job_fail_explicitly() {
    let (_store, lifecycle) = setup();

    assert!(matches!(
        lifecycle.create_wash_job(job_req("UC-MISSING")).await,
        Err(WashError::NotFound(_))
    ));

    assert!(matches!(
        lifecycle.record_esd_pass(uuid::Uuid::new_v4()).await,
        Err(WashError::NotFound(_))
    ));
}

#[tokio::test]
async fn esd_pass_resets_count_and_returns_garment_to_stock() {
    let (store, lifecycle) = setup();
    lifecycle.issue_code(issue_req("UC-0003")).await.unwrap();

    // One failure first, so the reset is observable.
    let job = lifecycle.create_wash_job(job_req("UC-0003")).await.unwrap();
    lifecycle.record_esd_fail(job.id).await.unwrap();

    let job = lifecycle.create_wash_job(job_req("UC-0003")).await.unwrap();
    assert_eq!(job.rewash_count, 1);

    let entry = lifecycle.record_esd_pass(job.id).await.unwrap();
    assert_eq!(entry.result, EsdResult::Pass);

    let code = store.get_code("UC-0003").await.unwrap().unwrap();
    assert_eq!(code.rewash_count, 0);
    assert_eq!(code.status, GarmentStatus::Available);
    assert!(code.assigned_employee.is_none());
    assert!(store.find_active_job("UC-0003").await.unwrap().is_none());
}

#[tokio::test]
async fn failures_below_threshold_requeue_instead_of_scrapping() {
    let (store, lifecycle) = setup();
    lifecycle.issue_code(issue_req("UC-0004")).await.unwrap();

    for expected in 1..=3 {
        let job = lifecycle.create_wash_job(job_req("UC-0004")).await.unwrap();
        let (_, outcome) = lifecycle.record_esd_fail(job.id).await.unwrap();
        assert_eq!(outcome.rewash_count, expected);
        assert!(!outcome.scrapped);

        let code = store.get_code("UC-0004").await.unwrap().unwrap();
        assert_ne!(code.status, GarmentStatus::Scrap);
    }
}

#[tokio::test]
async fn fourth_failure_scraps_the_garment() {
    let (store, lifecycle) = setup();
    lifecycle.issue_code(issue_req("UC-0005")).await.unwrap();

    for _ in 0..3 {
        let job = lifecycle.create_wash_job(job_req("UC-0005")).await.unwrap();
        lifecycle.record_esd_fail(job.id).await.unwrap();
    }

    let job = lifecycle.create_wash_job(job_req("UC-0005")).await.unwrap();
    assert_eq!(job.rewash_count, 3);

    let (_, outcome) = lifecycle.record_esd_fail(job.id).await.unwrap();
    assert_eq!(outcome.rewash_count, 4);
    assert!(outcome.scrapped);

    let code = store.get_code("UC-0005").await.unwrap().unwrap();
    assert_eq!(code.status, GarmentStatus::Scrap);
    assert!(code.assigned_employee.is_none());

    // A scrapped garment accepts no further wash jobs.
    assert!(matches!(
        lifecycle.create_wash_job(job_req("UC-0005")).await,
        Err(WashError::CodeScrapped(_))
    ));
}

#[tokio::test]
async fn deleting_waiting_job_restores_previous_usage_status() {
    let (store, lifecycle) = setup();

    let mut garment = InventoryCode::new("UC-0006", "trousers-l-grey");
    garment.status = GarmentStatus::Assigned;
    garment.assigned_employee = Some("emp-7".to_string());
    store.insert_code(&garment).await.unwrap();

    let job = lifecycle.create_wash_job(job_req("UC-0006")).await.unwrap();
    assert_eq!(job.previous_status, GarmentStatus::Assigned);
    assert_eq!(
        store.get_code("UC-0006").await.unwrap().unwrap().status,
        GarmentStatus::InUse
    );

    assert!(lifecycle.delete_wash_job(job.id).await.unwrap());

    let code = store.get_code("UC-0006").await.unwrap().unwrap();
    assert_eq!(code.status, GarmentStatus::Assigned);
    assert_eq!(code.rewash_count, 0);
}

#[tokio::test]
async fn deleting_job_past_waiting_keeps_garment_in_use() {
    let (store, lifecycle) = setup();
    lifecycle.issue_code(issue_req("UC-0007")).await.unwrap();

    let job = lifecycle.create_wash_job(job_req("UC-0007")).await.unwrap();
    // Two days in: the garment is already in the washer.
    lifecycle.shift_wash_date(job.id, -2).await.unwrap();

    assert!(lifecycle.delete_wash_job(job.id).await.unwrap());

    let code = store.get_code("UC-0007").await.unwrap().unwrap();
    assert_eq!(code.status, GarmentStatus::InUse);
}

#[tokio::test]
async fn deleting_absent_job_is_a_noop() {
    let (_store, lifecycle) = setup();
    assert!(!lifecycle.delete_wash_job(uuid::Uuid::new_v4()).await.unwrap());
}

#[tokio::test]
async fn declined_confirmation_leaves_the_job_untouched() {
    let store = Arc::new(MemStore::new());
    let lifecycle = WashLifecycle::new(store.clone(), ScrapPolicy::default(), Arc::new(DenyAll));

    lifecycle.issue_code(issue_req("UC-0008")).await.unwrap();
    let job = lifecycle.create_wash_job(job_req("UC-0008")).await.unwrap();

    assert!(!lifecycle.delete_wash_job(job.id).await.unwrap());
    assert!(lifecycle.get_wash_job(job.id).await.is_ok());
}

#[tokio::test]
async fn shift_date_changes_only_the_derived_phase() {
    let (store, lifecycle) = setup();
    lifecycle.issue_code(issue_req("UC-0009")).await.unwrap();

    let job = lifecycle.create_wash_job(job_req("UC-0009")).await.unwrap();
    assert_eq!(lifecycle.derive_status(&job), WashPhase::WaitingToSend);

    let shifted = lifecycle.shift_wash_date(job.id, -3).await.unwrap();
    assert_eq!(lifecycle.derive_status(&shifted), WashPhase::Completed);

    // Nothing else changed.
    assert_eq!(shifted.rewash_count, job.rewash_count);
    let code = store.get_code("UC-0009").await.unwrap().unwrap();
    assert_eq!(code.rewash_count, 0);
}

#[tokio::test]
async fn duplicate_code_issue_is_rejected() {
    let (_store, lifecycle) = setup();
    lifecycle.issue_code(issue_req("UC-0010")).await.unwrap();

    assert!(matches!(
        lifecycle.issue_code(issue_req("UC-0010")).await,
        Err(WashError::Validation(_))
    ));
}

#[tokio::test]
async fn history_survives_code_deletion() {
    let (_store, lifecycle) = setup();
    lifecycle.issue_code(issue_req("UC-0011")).await.unwrap();

    let job = lifecycle.create_wash_job(job_req("UC-0011")).await.unwrap();
    lifecycle.record_esd_fail(job.id).await.unwrap();

    lifecycle.delete_code("UC-0011").await.unwrap();

    let history = lifecycle.code_history("UC-0011").await.unwrap();
    assert_eq!(history.len(), 1);
}
