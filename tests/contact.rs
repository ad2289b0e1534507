use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use contact_backend::{
    AppState,
    config::Config,
    mailer::{MailError, MailSender},
    middleware::RateLimiter,
    router::create_router,
    routes::contact::ContactUsRequest,
};
use tower::ServiceExt;

// 记录发送内容的测试邮件器
#[derive(Default)]
struct MockMailer {
    sent: Mutex<Vec<ContactUsRequest>>,
    fail: bool,
}

#[async_trait]
impl MailSender for MockMailer {
    async fn send_contact(&self, req: &ContactUsRequest) -> Result<(), MailError> {
        if self.fail {
            return Err(MailError::Build(lettre::error::Error::MissingFrom));
        }
        self.sent.lock().unwrap().push(req.clone());
        Ok(())
    }
}

fn test_config() -> Config {
    Config {
        server_host: "127.0.0.1".into(),
        server_port: 0,
        api_base_uri: "/api".into(),
        gmail_host: "smtp.example.com".into(),
        gmail_port: 587,
        gmail_email: "owner@example.com".into(),
        gmail_password: "secret".into(),
    }
}

fn test_app(mailer: Arc<MockMailer>) -> Router {
    let state = AppState {
        config: test_config(),
        mailer,
    };
    create_router(state, Arc::new(RateLimiter::new()))
}

fn contact_request(ip: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/contact")
        .header("content-type", "application/json")
        .header("x-real-ip", ip)
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn valid_body() -> serde_json::Value {
    serde_json::json!({
        "email": "visitor@example.com",
        "subject": "Hello",
        "message": "I would like to get in touch."
    })
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn eleventh_request_from_same_ip_gets_429() {
    let app = test_app(Arc::new(MockMailer::default()));
    let body = valid_body();

    for _ in 0..10 {
        let response = app
            .clone()
            .oneshot(contact_request("1.2.3.4", &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(contact_request("1.2.3.4", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"Too many requests");
}

#[tokio::test]
async fn other_ips_are_not_affected_by_a_limited_one() {
    let app = test_app(Arc::new(MockMailer::default()));
    let body = valid_body();

    for _ in 0..11 {
        app.clone()
            .oneshot(contact_request("1.2.3.4", &body))
            .await
            .unwrap();
    }

    let response = app
        .clone()
        .oneshot(contact_request("5.6.7.8", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn valid_submission_is_relayed_to_the_mailer() {
    let mailer = Arc::new(MockMailer::default());
    let app = test_app(mailer.clone());

    let response = app
        .oneshot(contact_request("1.2.3.4", &valid_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert_eq!(json["code"], 0);
    assert_eq!(json["resp_data"], "Mail sent successfully");

    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].email, "visitor@example.com");
    assert_eq!(sent[0].subject, "Hello");
}

#[tokio::test]
async fn empty_fields_are_rejected_without_sending() {
    let mailer = Arc::new(MockMailer::default());
    let app = test_app(mailer.clone());

    let body = serde_json::json!({
        "email": "",
        "subject": "Hello",
        "message": "Hi"
    });
    let response = app.oneshot(contact_request("1.2.3.4", &body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert_eq!(json["code"], 1000);
    assert!(mailer.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn mailer_failure_maps_to_internal_error_code() {
    let mailer = Arc::new(MockMailer {
        sent: Mutex::new(Vec::new()),
        fail: true,
    });
    let app = test_app(mailer);

    let response = app
        .oneshot(contact_request("1.2.3.4", &valid_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert_eq!(json["code"], 5000);
}
