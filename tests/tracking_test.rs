use std::sync::Arc;

use campustrack::api::dto::{LoginRequest, RegisterRequest};
use campustrack::api::{InMemoryPortalApi, PortalApi};
use campustrack::error::AppError;
use campustrack::models::{Institution, Scholarship};
use campustrack::services::{CollegeTracking, ScholarshipTracking, Tracker};
use campustrack::workflow::{CollegeStatus, ScholarshipStatus};
use chrono::{Duration, NaiveDate, Utc};
use pretty_assertions::assert_eq;
use uuid::Uuid;

fn institution(n: u128, deadline: Option<NaiveDate>) -> Institution {
    Institution {
        id: Uuid::from_u128(n),
        name: format!("Test University {}", n),
        city: "Springfield".to_string(),
        state: "IL".to_string(),
        website: None,
        acceptance_rate: Some(0.42),
        tuition_in_state: Some(11_000.0),
        tuition_out_of_state: Some(29_000.0),
        application_deadline: deadline,
        featured: false,
    }
}

fn scholarship(n: u128, amount_max: Option<f64>) -> Scholarship {
    Scholarship {
        id: Uuid::from_u128(n),
        name: format!("Test Scholarship {}", n),
        organization: "Test Fund".to_string(),
        description: "A test award".to_string(),
        amount_exact: None,
        amount_max,
        deadline: None,
        website: None,
    }
}

async fn signed_in_api() -> (Arc<InMemoryPortalApi>, String) {
    let api = Arc::new(InMemoryPortalApi::new());
    api.register(RegisterRequest {
        email: "student@example.com".to_string(),
        password: "hunter2".to_string(),
        full_name: Some("Test Student".to_string()),
    })
    .await
    .expect("register");
    let token = api
        .login(LoginRequest {
            email: "student@example.com".to_string(),
            password: "hunter2".to_string(),
        })
        .await
        .expect("login");
    (api, token)
}

fn college_tracker(api: Arc<InMemoryPortalApi>) -> Tracker<CollegeStatus> {
    Tracker::new(Box::new(CollegeTracking(api)))
}

fn scholarship_tracker(api: Arc<InMemoryPortalApi>) -> Tracker<ScholarshipStatus> {
    Tracker::new(Box::new(ScholarshipTracking(api)))
}

#[tokio::test]
async fn duplicate_tracking_surfaces_a_conflict_not_a_generic_failure() {
    let (api, token) = signed_in_api().await;
    api.add_institution(institution(1, None));
    let tracker = college_tracker(api);

    tracker
        .track(&token, Uuid::from_u128(1), None, None)
        .await
        .expect("first track succeeds");

    let err = tracker
        .track(&token, Uuid::from_u128(1), None, None)
        .await
        .expect_err("second track must fail");
    assert!(
        matches!(err, AppError::AlreadyTracked(_)),
        "expected the conflict kind, got {:?}",
        err
    );
}

#[tokio::test]
async fn new_applications_start_at_the_initial_status() {
    let (api, token) = signed_in_api().await;
    api.add_institution(institution(1, None));
    api.add_scholarship(scholarship(2, Some(1000.0)));

    let created = college_tracker(api.clone())
        .track(&token, Uuid::from_u128(1), None, None)
        .await
        .expect("track college");
    assert_eq!(created.status, CollegeStatus::Researching);

    let created = scholarship_tracker(api)
        .track(&token, Uuid::from_u128(2), None, None)
        .await
        .expect("track scholarship");
    assert_eq!(created.status, ScholarshipStatus::Interested);
}

#[tokio::test]
async fn college_walk_researching_to_enrolled() {
    let (api, token) = signed_in_api().await;
    api.add_institution(institution(1, None));
    let tracker = college_tracker(api);

    let created = tracker
        .track(&token, Uuid::from_u128(1), None, None)
        .await
        .expect("track");

    use CollegeStatus::*;
    for step in [Planning, InProgress, Submitted, Accepted, Enrolled] {
        let view = tracker
            .advance(&token, created.id, step)
            .await
            .unwrap_or_else(|e| panic!("step to {:?} should succeed: {:?}", step, e));
        let app = view
            .applications
            .iter()
            .find(|a| a.id == created.id)
            .expect("application still present");
        assert_eq!(app.status, step);
    }
}

#[tokio::test]
async fn illegal_jump_is_rejected_before_any_mutation() {
    let (api, token) = signed_in_api().await;
    api.add_institution(institution(1, None));
    let tracker = college_tracker(api);

    let created = tracker
        .track(&token, Uuid::from_u128(1), None, None)
        .await
        .expect("track");

    let err = tracker
        .advance(&token, created.id, CollegeStatus::Enrolled)
        .await
        .expect_err("researching cannot jump to enrolled");
    assert!(matches!(err, AppError::IllegalTransition(_)));

    // The record is untouched.
    let view = tracker.overview(&token).await.expect("overview");
    assert_eq!(view.applications[0].status, CollegeStatus::Researching);
}

#[tokio::test]
async fn dashboard_reads_the_deadline_through_from_the_subject() {
    let (api, token) = signed_in_api().await;
    let deadline = Utc::now().date_naive() + Duration::days(10);
    api.add_institution(institution(1, Some(deadline)));
    let tracker = college_tracker(api);

    tracker
        .track(&token, Uuid::from_u128(1), None, None)
        .await
        .expect("track");

    let view = tracker.overview(&token).await.expect("overview");
    assert_eq!(view.applications[0].deadline, Some(deadline));
    assert_eq!(view.dashboard.upcoming_deadlines.len(), 1);
    assert_eq!(view.dashboard.upcoming_deadlines[0].days_left, 10);
}

#[tokio::test]
async fn award_can_only_be_recorded_once_accepted() {
    let (api, token) = signed_in_api().await;
    api.add_scholarship(scholarship(1, Some(5000.0)));
    let tracker = scholarship_tracker(api);

    let created = tracker
        .track(&token, Uuid::from_u128(1), None, None)
        .await
        .expect("track");

    let err = tracker
        .record_award(&token, created.id, 2500.0)
        .await
        .expect_err("award before acceptance must fail");
    assert!(matches!(err, AppError::Validation { .. }));

    use ScholarshipStatus::*;
    for step in [Planning, InProgress, Submitted, Accepted] {
        tracker
            .advance(&token, created.id, step)
            .await
            .expect("walk to accepted");
    }

    let updated = tracker
        .record_award(&token, created.id, 2500.0)
        .await
        .expect("award after acceptance");
    assert_eq!(updated.award_amount, Some(2500.0));
}

#[tokio::test]
async fn potential_value_tracks_the_remaining_field() {
    let (api, token) = signed_in_api().await;
    api.add_scholarship(scholarship(1, Some(1000.0)));
    api.add_scholarship(scholarship(2, Some(2500.0)));
    let tracker = scholarship_tracker(api);

    let first = tracker
        .track(&token, Uuid::from_u128(1), None, None)
        .await
        .expect("track first");
    tracker
        .track(&token, Uuid::from_u128(2), None, None)
        .await
        .expect("track second");

    let view = tracker.overview(&token).await.expect("overview");
    assert_eq!(view.total_potential_value(), 3500.0);

    use ScholarshipStatus::*;
    for step in [Planning, InProgress, Submitted, Rejected] {
        tracker
            .advance(&token, first.id, step)
            .await
            .expect("walk to rejected");
    }

    let view = tracker.overview(&token).await.expect("overview");
    assert_eq!(view.total_potential_value(), 2500.0);
}

#[tokio::test]
async fn untrack_deletes_hard() {
    let (api, token) = signed_in_api().await;
    api.add_institution(institution(1, None));
    let tracker = college_tracker(api);

    let created = tracker
        .track(&token, Uuid::from_u128(1), None, None)
        .await
        .expect("track");

    let view = tracker.untrack(&token, created.id).await.expect("untrack");
    assert!(view.applications.is_empty());

    let err = tracker
        .untrack(&token, created.id)
        .await
        .expect_err("second delete finds nothing");
    assert!(matches!(err, AppError::NotFound));
}

#[tokio::test]
async fn notes_survive_status_changes() {
    let (api, token) = signed_in_api().await;
    api.add_institution(institution(1, None));
    let tracker = college_tracker(api);

    let created = tracker
        .track(&token, Uuid::from_u128(1), None, None)
        .await
        .expect("track");
    tracker
        .set_notes(&token, created.id, "ask about merit aid".to_string())
        .await
        .expect("set notes");
    tracker
        .advance(&token, created.id, CollegeStatus::Planning)
        .await
        .expect("advance");

    let app = tracker.find(&token, created.id).await.expect("find");
    assert_eq!(app.notes.as_deref(), Some("ask about merit aid"));
}

#[tokio::test]
async fn unknown_token_is_unauthorized() {
    let api = InMemoryPortalApi::new();
    let err = api
        .college_dashboard("token-bogus")
        .await
        .expect_err("bogus token must be rejected");
    assert!(err.is_unauthorized());
}
