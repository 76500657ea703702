//! End-to-end hiring scenarios driven through the public `Board` facade and its
//! HTTP router, against the in-memory store.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use jobboard::applications::{ApplicationStatus, ApplicationSubmission};
use jobboard::auth::{AccountRecord, Principal, Role, StaticTokenVerifier};
use jobboard::config::NotificationConfig;
use jobboard::jobs::{JobDraft, JobRepository};
use jobboard::notifications::{
    spawn_dispatcher, InlineNotifier, NotificationKind, NotificationRepository,
};
use jobboard::{Board, MemoryStore, ServiceError};

type InlineBoard = Board<MemoryStore, InlineNotifier<MemoryStore>>;

fn seeker() -> Principal {
    Principal::seeker("u1", "Sam Seeker")
}

fn employer() -> Principal {
    Principal::employer("u2", "Acme Hiring")
}

fn draft(title: &str) -> JobDraft {
    JobDraft {
        title: title.to_string(),
        description: "Build the hiring workflow".to_string(),
        location: "Remote".to_string(),
        job_type: "Full-time".to_string(),
        experience_level: "Senior".to_string(),
        ..JobDraft::default()
    }
}

fn inline_board() -> (InlineBoard, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    for principal in [seeker(), employer()] {
        store
            .register_principal(principal)
            .expect("principal registered");
    }
    let notifier = Arc::new(InlineNotifier::new(
        store.clone(),
        &NotificationConfig::default(),
    ));
    (Board::new(store.clone(), notifier), store)
}

fn kinds(store: &MemoryStore, principal: &Principal) -> Vec<NotificationKind> {
    store
        .notifications_for(&principal.id)
        .expect("inbox loads")
        .into_iter()
        .map(|notification| notification.kind)
        .collect()
}

#[test]
fn apply_interview_withdraw_scenario() {
    let (board, store) = inline_board();
    let job = board
        .jobs
        .create_job(&employer(), draft("Backend Engineer"))
        .expect("job posted");

    let application = board
        .applications
        .submit(
            &seeker(),
            ApplicationSubmission::new(&job.id).with_cover_letter("Hi"),
        )
        .expect("submission accepted");
    assert_eq!(board.jobs.get_job(&job.id).unwrap().applicant_count, 1);
    assert_eq!(kinds(&store, &employer()), vec![NotificationKind::JobApplied]);

    let updated = board
        .applications
        .set_status(&employer(), &application.id, "Interview")
        .expect("status set");
    assert_eq!(updated.status, ApplicationStatus::Interview);
    let inbox = store.notifications_for(&seeker().id).unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].kind, NotificationKind::ApplicationUpdate);
    assert!(inbox[0].message.contains("Interview"));

    board
        .applications
        .withdraw(&seeker(), &application.id)
        .expect("withdrawn");
    assert!(board
        .applications
        .list_for_applicant(&seeker())
        .unwrap()
        .is_empty());
    assert_eq!(board.jobs.get_job(&job.id).unwrap().applicant_count, 0);
}

#[test]
fn rating_scenario() {
    let (board, _) = inline_board();
    let job = board
        .jobs
        .create_job(&employer(), draft("Backend Engineer"))
        .unwrap();
    let application = board
        .applications
        .submit(&seeker(), ApplicationSubmission::new(&job.id))
        .unwrap();

    assert!(matches!(
        board
            .applications
            .rate(&employer(), &application.id, 6, None),
        Err(ServiceError::Validation(_))
    ));
    for _ in 0..2 {
        let rated = board
            .applications
            .rate(
                &employer(),
                &application.id,
                3,
                Some("Great fit".to_string()),
            )
            .expect("rating stored");
        assert_eq!(rated.rating.map(|rating| rating.value()), Some(3));
    }
}

#[test]
fn counter_tracks_submits_minus_withdrawals() {
    let (board, store) = inline_board();
    let job = board
        .jobs
        .create_job(&employer(), draft("Backend Engineer"))
        .unwrap();

    let applicants: Vec<Principal> = (0..7)
        .map(|index| Principal::seeker(format!("seeker-{index}"), format!("Seeker {index}")))
        .collect();
    let applications: Vec<_> = applicants
        .iter()
        .map(|applicant| {
            board
                .applications
                .submit(applicant, ApplicationSubmission::new(&job.id))
                .expect("submission accepted")
        })
        .collect();
    for (applicant, application) in applicants.iter().zip(&applications).take(3) {
        board
            .applications
            .withdraw(applicant, &application.id)
            .expect("withdrawn");
    }

    let stored = store.fetch_job(&job.id).unwrap().expect("job present");
    assert_eq!(stored.applicant_count, 4);
    assert_eq!(
        board
            .applications
            .list_for_job(&employer(), &job.id)
            .unwrap()
            .len(),
        4
    );
}

#[test]
fn concurrent_identical_submissions_yield_one_success() {
    let (board, store) = inline_board();
    let job = board
        .jobs
        .create_job(&employer(), draft("Backend Engineer"))
        .unwrap();

    let outcomes: Vec<Result<_, ServiceError>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let board = board.clone();
                let job_id = job.id.clone();
                scope.spawn(move || {
                    board
                        .applications
                        .submit(&seeker(), ApplicationSubmission::new(&job_id))
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("submit thread completes"))
            .collect()
    });

    let successes = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    let conflicts = outcomes
        .iter()
        .filter(|outcome| matches!(outcome, Err(ServiceError::Conflict(_))))
        .count();
    assert_eq!(successes, 1);
    assert_eq!(conflicts, 15);
    assert_eq!(store.fetch_job(&job.id).unwrap().unwrap().applicant_count, 1);
}

#[test]
fn job_posted_reaches_only_followers_at_posting_time() {
    let (board, store) = inline_board();
    let early = seeker();
    let late = Principal::seeker("u7", "Late Follower");

    board
        .follows
        .follow(&early, &employer().id)
        .expect("early follower");
    board
        .jobs
        .create_job(&employer(), draft("Backend Engineer"))
        .unwrap();
    board
        .follows
        .follow(&late, &employer().id)
        .expect("late follower");

    assert_eq!(kinds(&store, &early), vec![NotificationKind::JobPosted]);
    assert!(kinds(&store, &late).is_empty());
    assert_eq!(
        kinds(&store, &employer()),
        vec![
            NotificationKind::CompanyFollowed,
            NotificationKind::CompanyFollowed
        ]
    );
}

#[test]
fn role_gating_holds_across_components() {
    let (board, _) = inline_board();
    assert!(matches!(
        board.jobs.create_job(&seeker(), draft("Backend Engineer")),
        Err(ServiceError::Forbidden(_))
    ));

    let job = board
        .jobs
        .create_job(&employer(), draft("Backend Engineer"))
        .unwrap();
    assert!(matches!(
        board
            .applications
            .submit(&employer(), ApplicationSubmission::new(&job.id)),
        Err(ServiceError::Forbidden(_))
    ));
    assert!(matches!(
        board.follows.follow(&employer(), &employer().id),
        Err(ServiceError::Forbidden(_))
    ));
}

#[test]
fn mark_all_read_is_idempotent() {
    let (board, _) = inline_board();
    let job = board
        .jobs
        .create_job(&employer(), draft("Backend Engineer"))
        .unwrap();
    for index in 0..3 {
        let applicant = Principal::seeker(format!("s{index}"), format!("Seeker {index}"));
        board
            .applications
            .submit(&applicant, ApplicationSubmission::new(&job.id))
            .unwrap();
    }

    assert_eq!(board.notifications.mark_all_read(&employer()).unwrap(), 3);
    assert_eq!(board.notifications.mark_all_read(&employer()).unwrap(), 0);
    let feed = board.notifications.list(&employer()).unwrap();
    assert_eq!(feed.unread_count, 0);
    assert!(feed.notifications.iter().all(|notification| notification.read));
}

#[tokio::test]
async fn queued_dispatcher_delivers_after_the_workflow_returns() {
    let store = Arc::new(MemoryStore::new());
    store.register_principal(employer()).unwrap();
    let (notifier, handle) = spawn_dispatcher(store.clone(), &NotificationConfig::default());
    let board = Board::new(store.clone(), Arc::new(notifier));

    board.follows.follow(&seeker(), &employer().id).unwrap();
    board
        .jobs
        .create_job(&employer(), draft("Backend Engineer"))
        .unwrap();

    drop(board);
    let totals = handle.await.expect("dispatcher joins");
    assert_eq!(totals.delivered, 2);
    assert_eq!(kinds(&store, &seeker()), vec![NotificationKind::JobPosted]);
    assert_eq!(
        kinds(&store, &employer()),
        vec![NotificationKind::CompanyFollowed]
    );
}

fn account(token: &str, principal: &Principal) -> AccountRecord {
    AccountRecord {
        token: token.to_string(),
        id: principal.id.0.clone(),
        role: principal.role,
        display_name: principal.display_name.clone(),
    }
}

fn call(method: Method, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"));
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn http_walkthrough() {
    let (board, _) = inline_board();
    let verifier = StaticTokenVerifier::from_accounts(vec![
        account("seeker", &seeker()),
        account("employer", &employer()),
    ])
    .expect("accounts load");
    assert!(verifier.principals().any(|principal| principal.role == Role::Employer));
    let router = board.router(Arc::new(verifier));

    let response = router
        .clone()
        .oneshot(call(
            Method::POST,
            "/api/v1/users/u2/follow",
            "seeker",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .clone()
        .oneshot(call(
            Method::POST,
            "/api/v1/jobs",
            "employer",
            Some(json!({
                "title": "Backend Engineer",
                "description": "Build the hiring workflow",
                "location": "Remote",
                "jobType": "Full-time",
                "experienceLevel": "Senior",
                "salary": { "min": 120000, "max": 150000 }
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    let job_id = body["job"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["job"]["salary"]["currency"], "USD");

    let response = router
        .clone()
        .oneshot(call(
            Method::GET,
            "/api/v1/jobs?search=backend&jobType=FullTime&limit=5",
            "seeker",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["pages"], 1);
    assert_eq!(body["jobs"][0]["jobType"], "Full-time");

    let response = router
        .clone()
        .oneshot(call(Method::GET, "/api/v1/jobs?limit=500", "seeker", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = router
        .clone()
        .oneshot(call(
            Method::POST,
            "/api/v1/applications",
            "seeker",
            Some(json!({ "jobId": job_id, "coverLetter": "Hi" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    let application_id = body["application"]["id"].as_str().unwrap().to_string();

    let response = router
        .clone()
        .oneshot(call(
            Method::PUT,
            &format!("/api/v1/applications/{application_id}"),
            "employer",
            Some(json!({ "status": "Interview" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .clone()
        .oneshot(call(Method::GET, "/api/v1/notifications", "seeker", None))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["unreadCount"], 2);
    assert_eq!(body["notifications"][0]["type"], "application_update");
    assert_eq!(
        body["notifications"][0]["message"],
        "Your application status updated to Interview"
    );

    let response = router
        .clone()
        .oneshot(call(
            Method::PUT,
            "/api/v1/notifications/read-all",
            "seeker",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(json_body(response).await["updated"], 2);

    let response = router
        .clone()
        .oneshot(call(Method::GET, "/api/v1/users/following", "seeker", None))
        .await
        .unwrap();
    assert_eq!(json_body(response).await["following"], json!(["u2"]));

    let response = router
        .oneshot(call(
            Method::DELETE,
            &format!("/api/v1/jobs/{job_id}"),
            "seeker",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
