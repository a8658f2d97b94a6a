mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ak_helper::api::{transition, ApiError, InviteForm, PendingNavigation};
use ak_helper::models::{Action, Cohort};
use ak_helper::panel::{ChangeEvent, ClickEvent};
use ak_helper::prefs::PreferenceStore;
use ak_helper::ui::InviteResult;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use common::{directory, panel, spawn, spawn_mock};

#[tokio::test]
async fn initial_load_fills_both_cohorts() {
    let (_backend, base) = spawn_mock(directory(3, 2)).await;
    let panel = panel(&base, PendingNavigation::default(), PreferenceStore::unavailable());

    panel.initial_load().await;

    let view = panel.snapshot();
    assert_eq!(view.guest.title, "Guests");
    assert_eq!(view.guest.status, "loaded 3 users.");
    assert_eq!(view.member.status, "loaded 2 users.");
    assert_eq!(view.guest.rows.len(), 3);
    assert_eq!(view.member.rows[0].pk, "101");
    assert_eq!(view.member.rows[0].button.label, "Demote");
}

#[tokio::test]
async fn empty_cohort_reports_no_users() {
    let (_backend, base) = spawn_mock(directory(0, 1)).await;
    let panel = panel(&base, PendingNavigation::default(), PreferenceStore::unavailable());

    panel.initial_load().await;

    let view = panel.snapshot();
    assert_eq!(view.guest.status, "no users found.");
    assert!(!view.guest.pager.visible);
}

#[tokio::test]
async fn initial_load_failures_stay_in_their_own_cohort() {
    let router = Router::new()
        .route(
            "/guest-users",
            get(|| async { Json(json!({"group_name": "Visitors", "users": [{"pk": 5, "username": "eve", "email": ""}]})) }),
        )
        .route(
            "/members-users",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"detail": "group lookup failed"}))) }),
        );
    let base = spawn(router).await;
    let panel = panel(&base, PendingNavigation::default(), PreferenceStore::unavailable());

    panel.initial_load().await;

    let view = panel.snapshot();
    assert_eq!(view.guest.title, "Visitors");
    assert_eq!(view.guest.status, "loaded 1 users.");
    assert_eq!(view.member.status, "error: group lookup failed");
}

#[tokio::test]
async fn non_json_401_navigates_to_login() {
    let router = Router::new().route(
        "/guest-users",
        get(|| async {
            (StatusCode::UNAUTHORIZED, [(header::CONTENT_TYPE, "text/plain")], "sign in").into_response()
        }),
    );
    let base = spawn(router).await;
    let navigation = PendingNavigation::default();
    let panel = panel(&base, navigation.clone(), PreferenceStore::unavailable());

    let err = panel.load_cohort(Cohort::Guest).await.unwrap_err();

    assert!(matches!(err, ApiError::AuthRedirect));
    assert_eq!(navigation.peek().as_deref(), Some("/login"));
}

#[tokio::test]
async fn expired_session_redirect_is_detected() {
    let (backend, base) = spawn_mock(directory(2, 0)).await;
    backend.set_session_expired(true);
    let navigation = PendingNavigation::default();
    let panel = panel(&base, navigation.clone(), PreferenceStore::unavailable());

    panel.initial_load().await;

    assert_eq!(navigation.take().as_deref(), Some("/login"));
    // auth failures do not overwrite the status line
    assert_eq!(panel.snapshot().guest.status, "loading…");
}

#[tokio::test]
async fn reload_prunes_vanished_selection() {
    let (_backend, base) = spawn_mock(directory(3, 0)).await;
    let panel = panel(&base, PendingNavigation::default(), PreferenceStore::unavailable());
    panel.initial_load().await;
    panel.toggle_row(Cohort::Guest, "1", Some(true));
    panel.toggle_row(Cohort::Guest, "2", Some(true));

    transition(panel.api(), Action::Promote, "1", false).await.unwrap();
    panel.load_cohort(Cohort::Guest).await.unwrap();

    let selected: Vec<String> = panel.state().guest.selected.into_iter().collect();
    assert_eq!(selected, vec!["2".to_string()]);
    assert_eq!(panel.snapshot().guest.bulk.count_label, "1 selected");
}

#[tokio::test]
async fn bulk_promote_sends_one_request_per_user_and_reloads() {
    let (backend, base) = spawn_mock(directory(4, 1)).await;
    let panel = panel(&base, PendingNavigation::default(), PreferenceStore::unavailable());
    panel.initial_load().await;
    panel.toggle_row(Cohort::Guest, "2", Some(true));
    panel.toggle_row(Cohort::Guest, "3", Some(true));
    let listings_before = backend.counters.listings.load(Ordering::SeqCst);

    panel.bulk_action(Cohort::Guest, true).await;

    assert_eq!(backend.counters.promotions.load(Ordering::SeqCst), 2);
    assert_eq!(backend.counters.mail_requests.load(Ordering::SeqCst), 2);
    assert_eq!(backend.counters.listings.load(Ordering::SeqCst), listings_before + 2);
    let state = panel.state();
    assert!(state.guest.selected.is_empty());
    assert_eq!(state.guest.users.len(), 2);
    assert_eq!(state.member.users.len(), 3);
    let view = panel.snapshot();
    assert_eq!(view.guest.status, "promoted 2 users");
    assert!(view.guest.bulk.hidden);
}

#[tokio::test]
async fn bulk_failure_reports_single_error() {
    let (_backend, base) = spawn_mock(directory(1, 1)).await;
    let panel = panel(&base, PendingNavigation::default(), PreferenceStore::unavailable());
    panel.initial_load().await;
    panel.toggle_row(Cohort::Member, "101", Some(true));
    panel.toggle_row(Cohort::Member, "999", Some(true));

    panel.bulk_action(Cohort::Member, false).await;

    let view = panel.snapshot();
    assert_eq!(view.member.status, "error: User not found");
    assert!(!view.member.bulk.disabled);
    // the failed batch keeps its selection
    assert_eq!(panel.state().member.selected.len(), 2);
}

#[tokio::test]
async fn bulk_with_empty_selection_does_nothing() {
    let (backend, base) = spawn_mock(directory(2, 0)).await;
    let panel = panel(&base, PendingNavigation::default(), PreferenceStore::unavailable());
    panel.initial_load().await;

    panel.bulk_action(Cohort::Guest, false).await;

    assert_eq!(backend.counters.promotions.load(Ordering::SeqCst), 0);
    assert_eq!(panel.snapshot().guest.status, "loaded 2 users.");
}

#[tokio::test]
async fn single_action_click_moves_user() {
    let (backend, base) = spawn_mock(directory(2, 0)).await;
    let panel = panel(&base, PendingNavigation::default(), PreferenceStore::unavailable());
    panel.initial_load().await;

    panel.click(&ClickEvent::action(Action::Promote, "2", false)).await;

    assert_eq!(backend.counters.promotions.load(Ordering::SeqCst), 1);
    assert_eq!(backend.counters.mail_requests.load(Ordering::SeqCst), 0);
    let view = panel.snapshot();
    assert_eq!(view.guest.status, "promoted 1 user");
    assert_eq!(view.member.rows.len(), 1);
    assert_eq!(view.member.rows[0].pk, "2");
}

#[tokio::test]
async fn single_action_failure_marks_the_button() {
    let router = Router::new()
        .route(
            "/members-users",
            get(|| async { Json(json!({"users": [{"pk": "abc", "username": "x", "email": ""}]})) }),
        )
        .route(
            "/demote",
            axum::routing::post(|| async { (StatusCode::BAD_REQUEST, Json(json!({"detail": "pk must be an integer"}))) }),
        );
    let base = spawn(router).await;
    let panel = panel(&base, PendingNavigation::default(), PreferenceStore::unavailable());
    panel.load_cohort(Cohort::Member).await.unwrap();

    panel.click(&ClickEvent::action(Action::Demote, "abc", false)).await;

    let view = panel.snapshot();
    assert_eq!(view.member.status, "error: pk must be an integer");
    assert_eq!(view.member.rows[0].button.label, "Error");
    assert!(!view.member.rows[0].button.disabled);
}

#[tokio::test]
async fn pager_click_and_size_change() {
    let (_backend, base) = spawn_mock(directory(120, 0)).await;
    let dir = tempfile::tempdir().unwrap();
    let prefs = PreferenceStore::new(dir.path().join("prefs.json"));
    let panel = panel(&base, PendingNavigation::default(), prefs.clone());
    panel.initial_load().await;

    panel.click(&ClickEvent::pager(Cohort::Guest, 3)).await;
    let view = panel.snapshot();
    assert_eq!(view.guest.pager.count_label, "101–120 of 120");
    assert_eq!(view.guest.rows.len(), 20);

    panel.change(&ChangeEvent::page_size(Cohort::Guest, 25));
    let state = panel.state();
    assert_eq!((state.guest.page, state.guest.page_size), (1, 25));
    assert_eq!(prefs.load_size(Cohort::Guest.size_key(), 50), 25);

    let restored = common::panel(&base, PendingNavigation::default(), prefs);
    assert_eq!(restored.state().guest.page_size, 25);
    assert_eq!(restored.state().member.page_size, 50);
}

#[tokio::test]
async fn select_all_only_touches_visible_rows() {
    let (_backend, base) = spawn_mock(directory(60, 0)).await;
    let panel = panel(&base, PendingNavigation::default(), PreferenceStore::unavailable());
    panel.initial_load().await;
    panel.toggle_row(Cohort::Guest, "55", Some(true));

    panel.select_all(Cohort::Guest, true);

    let state = panel.state();
    assert_eq!(state.guest.selected.len(), 51);
    let view = panel.snapshot();
    assert!(view.guest.select_all.checked);
    assert!(!view.guest.select_all.indeterminate);

    panel.toggle_row(Cohort::Guest, "1", None);
    let view = panel.snapshot();
    assert!(!view.guest.select_all.checked);
    assert!(view.guest.select_all.indeterminate);
    assert_eq!(view.guest.bulk.count_label, "50 selected");
}

#[tokio::test]
async fn filter_keystrokes_are_debounced() {
    let (_backend, base) = spawn_mock(directory(30, 0)).await;
    let panel = panel(&base, PendingNavigation::default(), PreferenceStore::unavailable());
    panel.initial_load().await;

    let (first, second) = tokio::join!(panel.filter_input(Cohort::Guest, "guest1"), async {
        tokio::time::sleep(common::TEST_DEBOUNCE / 3).await;
        panel.filter_input(Cohort::Guest, "guest2").await
    });

    assert!(!first);
    assert!(second);
    let view = panel.snapshot();
    assert_eq!(view.guest.filter, "guest2");
    // guest2 and guest20..=guest29
    assert_eq!(view.guest.rows.len(), 11);
}

#[tokio::test]
async fn invite_success_offers_link_to_clipboard() {
    let (backend, base) = spawn_mock(directory(0, 0)).await;
    let panel = panel(&base, PendingNavigation::default(), PreferenceStore::unavailable());

    panel
        .submit_invite(InviteForm {
            name: "Ada".into(),
            email: "ada@example.test".into(),
            single_use: true,
            expires_days: "3".into(),
            flow: "enroll".into(),
            ..Default::default()
        })
        .await;

    assert_eq!(backend.counters.invites.load(Ordering::SeqCst), 1);
    let view = panel.snapshot();
    assert_eq!(view.invite.status, "invitation created ✓");
    assert!(view.invite.link().contains("/if/flow/enroll/?itoken="));
    assert!(!view.invite.expires().is_empty());
    let copied = panel.take_clipboard().unwrap();
    assert_eq!(copied, view.invite.link());
    assert_eq!(panel.take_clipboard(), None);
}

#[tokio::test]
async fn invite_validation_failure_skips_the_backend() {
    let (backend, base) = spawn_mock(directory(0, 0)).await;
    let panel = panel(&base, PendingNavigation::default(), PreferenceStore::unavailable());

    panel
        .submit_invite(InviteForm {
            name: "Ada".into(),
            expires_days: "soon".into(),
            ..Default::default()
        })
        .await;

    assert_eq!(backend.counters.invites.load(Ordering::SeqCst), 0);
    let view = panel.snapshot();
    assert_eq!(view.invite.status, "failed");
    assert!(matches!(view.invite.result, InviteResult::Message(_)));
}

#[tokio::test]
async fn invite_with_only_pk_renders_identifier() {
    let router = Router::new().route(
        "/invites",
        axum::routing::post(|| async { Json(json!({"pk": "4f1c"})) }),
    );
    let base = spawn(router).await;
    let panel = panel(&base, PendingNavigation::default(), PreferenceStore::unavailable());

    panel.submit_invite(InviteForm { name: "Ada".into(), ..Default::default() }).await;

    let view = panel.snapshot();
    assert_eq!(view.invite.link(), "");
    assert_eq!(view.invite.text(), "invite uuid: 4f1c");
    assert_eq!(panel.take_clipboard(), None);
}

#[tokio::test]
async fn theme_toggle_persists() {
    let dir = tempfile::tempdir().unwrap();
    let prefs = PreferenceStore::new(dir.path().join("prefs.json"));
    let panel = panel("http://127.0.0.1:9", PendingNavigation::default(), prefs.clone());

    let theme = panel.toggle_theme();

    assert_eq!(theme.as_str(), "dark");
    assert_eq!(panel.snapshot().theme.as_str(), "dark");
    assert_eq!(prefs.load_theme().map(|t| t.as_str()), Some("dark"));
}

/// Counts overlapping `/promote` calls on a hand-written backend.
#[derive(Default)]
struct PromoteLoad {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    completed: AtomicUsize,
}

async fn slow_promote(State(load): State<Arc<PromoteLoad>>, Json(payload): Json<Value>) -> Response {
    if payload["pk"].as_u64() == Some(1) {
        return (StatusCode::NOT_FOUND, Json(json!({"detail": "nope"}))).into_response();
    }
    let now = load.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    load.peak.fetch_max(now, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(150)).await;
    load.in_flight.fetch_sub(1, Ordering::SeqCst);
    load.completed.fetch_add(1, Ordering::SeqCst);
    Json(json!({"status": "ok"})).into_response()
}

async fn promote_backend(load: Arc<PromoteLoad>) -> String {
    let router = Router::new()
        .route(
            "/guest-users",
            get(|| async {
                Json(json!({"users": [
                    {"pk": 1, "username": "a", "email": ""},
                    {"pk": 2, "username": "b", "email": ""},
                    {"pk": 3, "username": "c", "email": ""},
                ]}))
            }),
        )
        .route("/members-users", get(|| async { Json(json!({"users": []})) }))
        .route("/promote", post(slow_promote))
        .with_state(load);
    spawn(router).await
}

#[tokio::test]
async fn bulk_requests_are_in_flight_together() {
    let load = Arc::new(PromoteLoad::default());
    let base = promote_backend(load.clone()).await;
    let panel = panel(&base, PendingNavigation::default(), PreferenceStore::unavailable());
    panel.initial_load().await;
    panel.toggle_row(Cohort::Guest, "2", Some(true));
    panel.toggle_row(Cohort::Guest, "3", Some(true));

    panel.bulk_action(Cohort::Guest, false).await;

    assert_eq!(load.completed.load(Ordering::SeqCst), 2);
    assert_eq!(load.peak.load(Ordering::SeqCst), 2);
    assert_eq!(panel.snapshot().guest.status, "promoted 2 users");
}

#[tokio::test]
async fn bulk_failure_still_completes_slower_siblings() {
    let load = Arc::new(PromoteLoad::default());
    let base = promote_backend(load.clone()).await;
    let panel = panel(&base, PendingNavigation::default(), PreferenceStore::unavailable());
    panel.initial_load().await;
    panel.toggle_row(Cohort::Guest, "1", Some(true));
    panel.toggle_row(Cohort::Guest, "2", Some(true));

    panel.bulk_action(Cohort::Guest, false).await;

    // pk 1 fails at once; pk 2 was already sent and must still finish
    assert_eq!(load.completed.load(Ordering::SeqCst), 1);
    assert_eq!(load.in_flight.load(Ordering::SeqCst), 0);
    let view = panel.snapshot();
    assert_eq!(view.guest.status, "error: nope");
    assert!(!view.guest.bulk.disabled);
}

#[tokio::test]
async fn reload_failure_lets_the_other_cohort_finish() {
    let router = Router::new()
        .route(
            "/guest-users",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"detail": "boom"}))) }),
        )
        .route(
            "/members-users",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(150)).await;
                Json(json!({"users": [{"pk": 101, "username": "m", "email": ""}]}))
            }),
        );
    let base = spawn(router).await;
    let panel = panel(&base, PendingNavigation::default(), PreferenceStore::unavailable());

    let err = panel.load_all().await.unwrap_err();

    assert_eq!(err.to_string(), "boom");
    let view = panel.snapshot();
    assert_eq!(view.member.status, "loaded 1 users.");
    assert_eq!(view.member.rows.len(), 1);
}

fn panel_with_token(base: &str, token: &str, navigation: PendingNavigation) -> ak_helper::panel::Panel {
    ak_helper::api::set_silent(true);
    let api = ak_helper::api::ApiClient::new(
        ak_helper::api::build_http_client().unwrap(),
        base,
        token,
        Arc::new(navigation),
    );
    ak_helper::panel::Panel::new(api, PreferenceStore::unavailable())
}

#[tokio::test]
async fn bearer_token_is_the_backend_credential() {
    let backend = Arc::new(ak_helper::mock::MockBackend::new(directory(1, 0)).with_api_token("right"));
    let base = spawn(ak_helper::mock::router(backend)).await;

    let navigation = PendingNavigation::default();
    let rejected = panel_with_token(&base, "wrong", navigation.clone());
    rejected.initial_load().await;
    assert_eq!(navigation.take().as_deref(), Some("/login"));

    let navigation = PendingNavigation::default();
    let accepted = panel_with_token(&base, "right", navigation.clone());
    accepted.initial_load().await;
    assert_eq!(navigation.take(), None);
    assert_eq!(accepted.snapshot().guest.status, "loaded 1 users.");
}
