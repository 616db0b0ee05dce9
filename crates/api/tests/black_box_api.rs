use std::sync::Arc;

use jobboard_api::app::services::AppServices;
use jobboard_infra::AuthConfig;
use reqwest::StatusCode;
use serde_json::{json, Value};

struct TestServer {
    base_url: String,
    services: Arc<AppServices>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let auth = AuthConfig {
            jwt_secret: "black-box-secret".into(),
            jwt_issuer: "jobboard".into(),
            access_ttl_minutes: 5,
            refresh_ttl_hours: 24,
            bcrypt_cost: 4,
        };
        let services = Arc::new(AppServices::in_memory(&auth));

        // Same router as prod, bound to an ephemeral port.
        let app = jobboard_api::app::build_app(services.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            services,
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn register(client: &reqwest::Client, server: &TestServer, email: &str, name: &str) {
    let res = client
        .post(server.url("/accounts/register/"))
        .json(&json!({ "email": email, "password": "password123", "full_name": name }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
}

/// Returns `(access, refresh)`.
async fn login(client: &reqwest::Client, server: &TestServer, email: &str) -> (String, String) {
    let res = client
        .post(server.url("/accounts/login/"))
        .json(&json!({ "email": email, "password": "password123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    (
        body["access"].as_str().unwrap().to_string(),
        body["refresh"].as_str().unwrap().to_string(),
    )
}

async fn create_job(
    client: &reqwest::Client,
    server: &TestServer,
    token: &str,
    body: Value,
) -> Value {
    let res = client
        .post(server.url("/jobs/company/jobs/create/"))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let server = TestServer::spawn().await;
    let res = reqwest::get(server.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn posting_is_hidden_until_approved() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    register(&client, &server, "hr@acme.io", "Acme").await;
    server
        .services
        .provision_admin("root@jobs.io", "password123", "Root")
        .await
        .unwrap();

    let (company_token, _) = login(&client, &server, "hr@acme.io").await;
    let (admin_token, _) = login(&client, &server, "root@jobs.io").await;

    let job = create_job(
        &client,
        &server,
        &company_token,
        json!({
            "title": "Data Engineer",
            "job_type": "full_time",
            "location": "Berlin",
            "skills": ["Python", "SQL"]
        }),
    )
    .await;
    assert_eq!(job["status"], "pending");
    assert_eq!(job["skills"], json!(["Python", "SQL"]));
    let job_id = job["id"].as_str().unwrap().to_string();

    let public: Value = client
        .get(server.url("/jobs/jobs/"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(public, json!([]));

    // Companies cannot review.
    let res = client
        .patch(server.url(&format!("/jobs/admin/jobs/{job_id}/verify/")))
        .bearer_auth(&company_token)
        .json(&json!({ "action": "approve" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .patch(server.url(&format!("/jobs/admin/jobs/{job_id}/verify/")))
        .bearer_auth(&admin_token)
        .json(&json!({ "action": "approve" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let outcome: Value = res.json().await.unwrap();
    assert_eq!(outcome["message"], "Job approved successfully");

    let res = client
        .get(server.url("/jobs/jobs/"))
        .query(&[("skill", "python")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let found: Vec<Value> = res.json().await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["company_name"], "Acme");
    assert_eq!(found[0]["job_type"], "full_time");

    let admin_view: Vec<Value> = client
        .get(server.url("/jobs/admin/jobs/"))
        .bearer_auth(&admin_token)
        .query(&[("status", "approved"), ("company", "hr@acme.io")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(admin_view.len(), 1);
    assert_eq!(admin_view[0]["company_email"], "hr@acme.io");
}

#[tokio::test]
async fn only_the_owner_can_touch_a_posting() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    register(&client, &server, "hr@acme.io", "Acme").await;
    register(&client, &server, "hr@globex.io", "Globex").await;
    let (acme, _) = login(&client, &server, "hr@acme.io").await;
    let (globex, _) = login(&client, &server, "hr@globex.io").await;

    let job = create_job(
        &client,
        &server,
        &acme,
        json!({ "title": "Backend", "job_type": "part_time", "location": "Remote" }),
    )
    .await;
    let job_id = job["id"].as_str().unwrap().to_string();

    let res = client
        .delete(server.url(&format!("/jobs/job/{job_id}/delete/")))
        .bearer_auth(&globex)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .put(server.url(&format!("/jobs/job/{job_id}/update/")))
        .bearer_auth(&acme)
        .json(&json!({ "location": "Lisbon" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await.unwrap();
    assert_eq!(updated["location"], "Lisbon");
    assert_eq!(updated["title"], "Backend");

    let res = client
        .delete(server.url(&format!("/jobs/company/jobs/{job_id}/")))
        .bearer_auth(&acme)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client
        .get(server.url(&format!("/jobs/company/jobs/{job_id}/")))
        .bearer_auth(&acme)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .get(server.url("/jobs/company/jobs/not-a-uuid/"))
        .bearer_auth(&acme)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["detail"], "Not found.");
}

#[tokio::test]
async fn permissions_are_checked_before_the_body() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    register(&client, &server, "hr@acme.io", "Acme").await;
    register(&client, &server, "hr@globex.io", "Globex").await;
    server
        .services
        .provision_admin("root@jobs.io", "password123", "Root")
        .await
        .unwrap();
    let (acme, _) = login(&client, &server, "hr@acme.io").await;
    let (globex, _) = login(&client, &server, "hr@globex.io").await;
    let (admin, _) = login(&client, &server, "root@jobs.io").await;

    let job = create_job(
        &client,
        &server,
        &acme,
        json!({ "title": "Backend", "job_type": "full_time", "location": "Remote" }),
    )
    .await;
    let job_id = job["id"].as_str().unwrap().to_string();

    let res = client
        .put(server.url(&format!("/jobs/job/{job_id}/update/")))
        .bearer_auth(&globex)
        .json(&json!({ "job_type": "bogus" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .post(server.url("/jobs/company/jobs/create/"))
        .bearer_auth(&admin)
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .patch(server.url(&format!("/jobs/admin/jobs/{job_id}/verify/")))
        .bearer_auth(&acme)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["detail"], "You do not have permission to perform this action.");

    // The owner with the same bad body gets the validation error.
    let res = client
        .put(server.url(&format!("/jobs/job/{job_id}/update/")))
        .bearer_auth(&acme)
        .json(&json!({ "job_type": "bogus" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(server.url("/accounts/profile/"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["detail"], "Authentication credentials were not provided.");

    let res = client
        .get(server.url("/jobs/company/jobs/"))
        .bearer_auth("garbage")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn invalid_bodies_are_rejected() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    register(&client, &server, "hr@acme.io", "Acme").await;
    let (acme, _) = login(&client, &server, "hr@acme.io").await;

    let res = client
        .post(server.url("/accounts/register/"))
        .json(&json!({ "email": "hr@acme.io", "password": "password123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .post(server.url("/jobs/company/jobs/create/"))
        .bearer_auth(&acme)
        .json(&json!({ "title": "Backend", "job_type": "freelance", "location": "Remote" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .post(server.url("/accounts/login/"))
        .json(&json!({ "email": "not-an-email", "password": "password123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .post(server.url("/accounts/login/"))
        .json(&json!({ "email": "hr@acme.io", "password": "nope-nope" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_revokes_the_refresh_token() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    register(&client, &server, "hr@acme.io", "Acme").await;
    let (access, refresh) = login(&client, &server, "hr@acme.io").await;

    let res = client
        .post(server.url("/accounts/token/refresh/"))
        .json(&json!({ "refresh": refresh }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert!(body["access"].as_str().is_some());

    let res = client
        .post(server.url("/accounts/logout/"))
        .bearer_auth(&access)
        .json(&json!({ "refresh": refresh }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::RESET_CONTENT);

    let res = client
        .post(server.url("/accounts/token/refresh/"))
        .json(&json!({ "refresh": refresh }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["detail"], "Token is blacklisted");

    // Profile is still readable with the access token.
    let res = client
        .patch(server.url("/accounts/profile/"))
        .bearer_auth(&access)
        .json(&json!({ "full_name": "Acme Corp" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["full_name"], "Acme Corp");
    assert_eq!(body["role"], "company");
}
