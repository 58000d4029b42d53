//! Shared setup for the API integration tests. Every `TestApp` gets its own
//! temporary SQLite file so tests can run in parallel.

#![allow(dead_code)]

use actix_http::Request;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web, App};
use leadform_api::config::{ApiConfig, RemoteConfig};
use leadform_api::database::Database;
use leadform_api::handlers::AppState;
use leadform_api::routes::configure_routes;
use serde_json::{json, Value};
use tempfile::TempDir;

pub const TEST_PASSWORD: &str = "s3cret-pass";

pub struct TestApp {
    pub config: ApiConfig,
    pub app_state: web::Data<AppState>,
    _dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    pub fn with_config(customize: impl FnOnce(&mut ApiConfig)) -> Self {
        let dir = tempfile::tempdir().unwrap();

        let mut config = ApiConfig::default();
        config.database.path = dir.path().join("leadform.db");
        config.auth.jwt_secret = Some("integration-test-secret".to_string());
        customize(&mut config);

        let database = Database::new(&config.database.path).unwrap();
        let state = AppState::from_config(&config, &database).unwrap();

        Self {
            config,
            app_state: web::Data::new(state),
            _dir: dir,
        }
    }

    /// App whose remote table store points at `url`.
    pub fn with_remote(url: &str) -> Self {
        let url = url.to_string();
        Self::with_config(move |config| {
            config.remote = Some(RemoteConfig {
                url,
                api_key: "anon-key".to_string(),
                responses_table: "lead_responses".to_string(),
                admin_table: "admin_settings".to_string(),
            });
        })
    }

    pub async fn service(
        &self,
    ) -> impl Service<Request, Response = ServiceResponse, Error = actix_web::Error> {
        test::init_service(
            App::new()
                .app_data(self.app_state.clone())
                .configure(configure_routes),
        )
        .await
    }
}

/// Sets the first admin password and logs in, returning the bearer token.
pub async fn setup_admin<S>(service: &S) -> String
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = test::TestRequest::post()
        .uri("/api/admin/password")
        .set_json(json!({
            "new_password": TEST_PASSWORD,
            "confirm_password": TEST_PASSWORD,
        }))
        .to_request();
    let resp = test::call_service(service, req).await;
    assert_eq!(resp.status(), 204);

    login(service, TEST_PASSWORD).await
}

pub async fn login<S>(service: &S, password: &str) -> String
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = test::TestRequest::post()
        .uri("/api/admin/login")
        .set_json(json!({ "password": password }))
        .to_request();
    let resp = test::call_service(service, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    body["token"].as_str().unwrap().to_string()
}

pub fn bearer(token: &str) -> (actix_web::http::header::HeaderName, String) {
    (
        actix_web::http::header::AUTHORIZATION,
        format!("Bearer {}", token),
    )
}

/// Answers for the default questionnaire: questions 1 to 9, with the given
/// ids answered "no" and everything else "yes".
pub fn answers_with_no(no_ids: &[i64]) -> Value {
    let mut answers = serde_json::Map::new();
    for id in 1..=9 {
        let answer = if no_ids.contains(&id) { "nao" } else { "sim" };
        answers.insert(id.to_string(), json!(answer));
    }
    if no_ids.contains(&6) {
        answers.insert("10".to_string(), json!("sim"));
    }
    Value::Object(answers)
}

pub fn submission(name: &str, phone: &str, no_ids: &[i64]) -> Value {
    json!({
        "name": name,
        "phone": phone,
        "email": "",
        "answers": answers_with_no(no_ids),
    })
}
