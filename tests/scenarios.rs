//! End-to-end form scenarios against a scripted API
mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{FakeApi, valid_values};
use course_registration::api::{Credentials, Method, endpoints};
use course_registration::app::App;
use course_registration::config::AppConfig;
use course_registration::controller::{FormController, GENERIC_FAILURE, SubmitOutcome};
use course_registration::error::ChainError;
use course_registration::navigation::MemoryRouter;
use course_registration::screens::Screen;
use course_registration::status::SubmissionStatus;
use serde_json::{Value, json};
use tempfile::tempdir;
use tokio::sync::Notify;

struct Harness {
    app: App,
    api: Arc<FakeApi>,
    router: Arc<MemoryRouter>,
}

fn harness(api: FakeApi) -> Harness {
    let api = Arc::new(api);
    let router = Arc::new(MemoryRouter::new());
    let app = App::init(&AppConfig::default(), api.clone(), router.clone()).unwrap();

    Harness { app, api, router }
}

fn fill(controller: &FormController, screen: Screen) {
    for (field, value) in valid_values(screen) {
        controller.set_value(field, value).unwrap();
    }
}

#[tokio::test]
async fn login_short_password_is_blocked_locally() {
    let h = harness(FakeApi::new());
    let login = h.app.open(Screen::Login);

    login.set_value("email", "a@b.com").unwrap();
    login.set_value("password", "short").unwrap();

    let outcome = login.submit().await;
    let SubmitOutcome::Invalid(errors) = outcome else {
        panic!("expected validation failure, got {outcome:?}");
    };
    assert_eq!(
        errors.get("password").map(String::as_str),
        Some("Password must be at least 8 characters")
    );
    assert!(!errors.contains_key("email"));
    assert!(h.api.requests().is_empty());
    assert_eq!(login.status(), SubmissionStatus::Idle);
    assert!(h.router.visited().is_empty());
}

#[tokio::test]
async fn login_success_navigates_home_once() {
    let h = harness(FakeApi::new().ok(json!({ "data": { "token": "t" } })));
    let login = h.app.open(Screen::Login);
    fill(&login, Screen::Login);

    let outcome = login.submit().await;

    assert!(matches!(outcome, SubmitOutcome::Succeeded(_)));
    assert_eq!(login.status(), SubmissionStatus::Succeeded);
    assert_eq!(h.router.visited(), vec!["/".to_string()]);

    let requests = h.api.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].endpoint, endpoints::LOGIN);
    assert_eq!(requests[0].method, Method::Post);
    assert_eq!(requests[0].credentials, Credentials::Include);
    assert_eq!(
        requests[0].body,
        json!({ "user": { "email": "a@b.com", "password": "longenough1" } })
    );
    assert_eq!(login.banner(), None);
}

#[tokio::test]
async fn login_rejection_shows_generic_banner() {
    let h = harness(FakeApi::new().reject(endpoints::LOGIN, 401));
    let login = h.app.open(Screen::Login);
    fill(&login, Screen::Login);

    let outcome = login.submit().await;

    assert!(matches!(outcome, SubmitOutcome::Failed(ChainError::Rejected { index: 0, .. })));
    assert_eq!(login.status(), SubmissionStatus::Failed);
    assert_eq!(login.banner(), Some(GENERIC_FAILURE));
    assert!(login.failure_detail().unwrap().contains("401"));
    assert!(h.router.visited().is_empty());
}

#[tokio::test]
async fn failed_login_can_be_retried() {
    let h = harness(FakeApi::new().reject(endpoints::LOGIN, 500).ok(json!({})));
    let login = h.app.open(Screen::Login);
    fill(&login, Screen::Login);

    assert!(matches!(login.submit().await, SubmitOutcome::Failed(_)));
    assert!(matches!(login.submit().await, SubmitOutcome::Succeeded(_)));

    assert_eq!(h.api.requests().len(), 2);
    assert_eq!(login.banner(), None);
    assert_eq!(h.router.visited(), vec!["/".to_string()]);
}

#[tokio::test]
async fn company_id_is_threaded_into_user_creation() {
    let h = harness(
        FakeApi::new()
            .ok(json!({ "data": { "id": 42 } }))
            .ok(json!({ "data": { "id": 9 } })),
    );
    let form = h.app.open(Screen::CompanySignup);
    fill(&form, Screen::CompanySignup);

    let outcome = form.submit().await;

    assert_eq!(outcome, SubmitOutcome::Succeeded(json!({ "data": { "id": 9 } })));
    let requests = h.api.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].endpoint, endpoints::COMPANIES);
    assert_eq!(requests[0].body["company"]["company_name"], json!("Acme"));
    assert!(requests[0].body["company"].get("password").is_none());
    assert_eq!(requests[1].endpoint, endpoints::SIGNUP);
    assert_eq!(requests[1].body["user"]["company_id"], json!(42));
    assert_eq!(requests[1].body["user"]["user_role"], json!("admin"));
    assert_eq!(h.router.visited(), vec!["/login".to_string()]);
}

#[tokio::test]
async fn company_id_is_read_from_a_flat_response() {
    let h = harness(FakeApi::new().ok(json!({ "id": 42 })).ok(json!({})));
    let form = h.app.open(Screen::CompanySignup);
    fill(&form, Screen::CompanySignup);

    form.submit().await;

    assert_eq!(h.api.requests()[1].body["user"]["company_id"], json!(42));
}

#[tokio::test]
async fn second_step_rejection_fails_without_retry() {
    let h = harness(
        FakeApi::new()
            .ok(json!({ "data": { "id": 42 } }))
            .reject(endpoints::SIGNUP, 422),
    );
    let form = h.app.open(Screen::CompanySignup);
    fill(&form, Screen::CompanySignup);

    let outcome = form.submit().await;

    assert!(matches!(outcome, SubmitOutcome::Failed(ChainError::Rejected { index: 1, .. })));
    assert_eq!(h.api.requests().len(), 2);
    assert_eq!(form.status(), SubmissionStatus::Failed);
    assert_eq!(form.banner(), Some(GENERIC_FAILURE));
    assert!(h.router.visited().is_empty());
}

#[tokio::test]
async fn missing_company_id_stops_before_user_creation() {
    let h = harness(FakeApi::new().ok(json!({ "data": {} })));
    let form = h.app.open(Screen::CompanySignup);
    fill(&form, Screen::CompanySignup);

    let outcome = form.submit().await;

    assert!(matches!(outcome, SubmitOutcome::Failed(ChainError::Payload { index: 1, .. })));
    assert_eq!(h.api.requests().len(), 1);
}

#[tokio::test]
async fn create_course_sends_company_id_as_number() {
    let h = harness(FakeApi::new().ok(json!({ "data": { "id": 3 } })));
    let form = h.app.open(Screen::CreateCourse);
    fill(&form, Screen::CreateCourse);

    form.submit().await;

    let requests = h.api.requests();
    assert_eq!(requests[0].endpoint, endpoints::COURSES);
    assert_eq!(requests[0].body["company_id"], json!(7));
    assert_eq!(requests[0].body["start_date"], json!("2025-02-03"));
    assert_eq!(h.router.visited(), vec!["/courses".to_string()]);
}

#[tokio::test]
async fn create_course_sends_any_company_id_the_rule_accepts() {
    for (typed, sent) in [("1.5", json!(1.5)), ("1e3", json!(1000.0)), (" 12 ", json!(12))] {
        let h = harness(FakeApi::new().ok(json!({ "data": { "id": 3 } })));
        let form = h.app.open(Screen::CreateCourse);
        fill(&form, Screen::CreateCourse);
        form.set_value("company_id", typed).unwrap();
        assert_eq!(form.snapshot().errors.get("company_id"), None, "{typed}");

        let outcome = form.submit().await;

        assert!(matches!(outcome, SubmitOutcome::Succeeded(_)), "{typed}: {outcome:?}");
        assert_eq!(h.api.requests()[0].body["company_id"], sent);
        assert_eq!(form.banner(), None);
    }
}

#[tokio::test]
async fn create_course_non_numeric_company_id_is_inline() {
    let h = harness(FakeApi::new());
    let form = h.app.open(Screen::CreateCourse);
    fill(&form, Screen::CreateCourse);
    form.set_value("company_id", "seven").unwrap();

    let SubmitOutcome::Invalid(errors) = form.submit().await else {
        panic!("expected validation failure");
    };
    assert_eq!(
        errors.get("company_id").map(String::as_str),
        Some("Company ID must be a number.")
    );
    assert_eq!(form.status(), SubmissionStatus::Idle);
    assert!(h.api.requests().is_empty());
}

#[tokio::test]
async fn create_course_rejects_malformed_dates() {
    let h = harness(FakeApi::new());
    let form = h.app.open(Screen::CreateCourse);
    fill(&form, Screen::CreateCourse);
    form.set_value("start_date", "2025-13-01").unwrap();

    let SubmitOutcome::Invalid(errors) = form.submit().await else {
        panic!("expected validation failure");
    };
    assert_eq!(
        errors.get("start_date").map(String::as_str),
        Some("Start date must be a valid date.")
    );
    assert!(h.api.requests().is_empty());
}

#[tokio::test]
async fn untouched_required_fields_block_every_screen() {
    for screen in Screen::ALL {
        let h = harness(FakeApi::new());
        let form = h.app.open(screen);

        let outcome = form.submit().await;

        assert!(matches!(outcome, SubmitOutcome::Invalid(_)), "{screen}");
        assert!(h.api.requests().is_empty(), "{screen}");
        assert_eq!(form.status(), SubmissionStatus::Idle, "{screen}");

        let snapshot = form.snapshot();
        for def in screen.schema().fields() {
            assert!(snapshot.is_touched(def.name()), "{screen}: {}", def.name());
        }
    }
}

#[tokio::test]
async fn emptied_required_field_blocks_submission() {
    for screen in Screen::ALL {
        for def in screen.schema().fields() {
            let required = def
                .rules()
                .iter()
                .any(|rule| matches!(rule, course_registration::schema::Rule::Required { .. }));
            if !required {
                continue;
            }

            let h = harness(FakeApi::new());
            let form = h.app.open(screen);
            fill(&form, screen);
            form.set_value(def.name(), "").unwrap();

            let SubmitOutcome::Invalid(errors) = form.submit().await else {
                panic!("{screen}: {} accepted empty", def.name());
            };
            assert!(!errors[def.name()].is_empty());
            assert!(h.api.requests().is_empty());
            assert_eq!(form.status(), SubmissionStatus::Idle);
        }
    }
}

#[tokio::test]
async fn reentrant_submit_is_ignored() {
    let gate = Arc::new(Notify::new());
    let h = harness(FakeApi::new().gated(gate.clone()).ok(json!({})));
    let login = h.app.open(Screen::Login);
    fill(&login, Screen::Login);

    let first = login.submit();
    let second = async {
        while !login.is_busy() {
            tokio::task::yield_now().await;
        }
        // edits are still accepted while the chain is in flight
        login.set_value("email", "c@d.com").unwrap();
        let outcome = login.submit().await;
        gate.notify_one();
        outcome
    };
    let (first, second) = tokio::join!(first, second);

    assert!(matches!(first, SubmitOutcome::Succeeded(_)));
    assert_eq!(second, SubmitOutcome::Ignored);
    assert_eq!(h.api.requests().len(), 1);
    assert_eq!(h.router.visited(), vec!["/".to_string()]);
    assert_eq!(login.snapshot().values.text("email"), "c@d.com");
}

#[tokio::test]
async fn abandoned_submit_does_not_block_the_next_one() {
    let gate = Arc::new(Notify::new());
    let h = harness(FakeApi::new().gated(gate.clone()).ok(json!({})));
    let login = h.app.open(Screen::Login);
    fill(&login, Screen::Login);

    let abandoned = tokio::time::timeout(Duration::from_millis(20), login.submit()).await;
    assert!(abandoned.is_err());
    assert_eq!(login.status(), SubmissionStatus::Failed);
    assert!(!login.is_busy());

    gate.notify_one();
    let outcome = login.submit().await;

    assert!(matches!(outcome, SubmitOutcome::Succeeded(_)));
    assert_eq!(h.api.requests().len(), 2);
    assert_eq!(h.router.visited(), vec!["/".to_string()]);
}

#[tokio::test]
async fn resolve_maps_routes_to_forms() {
    let h = harness(FakeApi::new());

    let form = h.app.resolve("/company_sign_up").unwrap();
    assert_eq!(form.form(), "company_sign_up");
    assert_eq!(form.destination(), Some("/login"));
    assert!(h.app.resolve("/courses").is_none());
}

#[tokio::test]
async fn history_records_terminal_outcomes() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    let mut config = AppConfig::default();
    config.history.path = Some(temp_dir.path().join("history"));

    let api = Arc::new(FakeApi::new().reject(endpoints::LOGIN, 500).ok(Value::Null));
    let app = App::init(&config, api, Arc::new(MemoryRouter::new()))?;
    let login = app.open(Screen::Login);
    fill(&login, Screen::Login);

    login.submit().await;
    login.submit().await;

    let history = app.history().unwrap().history("login")?;
    let statuses: Vec<SubmissionStatus> = history.iter().map(|r| r.status).collect();
    assert_eq!(statuses, vec![SubmissionStatus::Failed, SubmissionStatus::Succeeded]);
    assert!(history[0].failure.is_some());
    assert_ne!(history[0].attempt_id, history[1].attempt_id);

    drop(login);
    app.shutdown()?;
    Ok(())
}
