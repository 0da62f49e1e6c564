#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, Utc};
use jobboard_frontend::services::{
    api_client::{ApiClient, EndpointStore},
    context::ServiceContext,
    navigation::History,
    notification_service::RecordingNotifier,
    response_validator::ResponseValidator,
    session_service::SessionStore,
};
use jobboard_frontend::store::Stores;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value as JsonValue};
use wiremock::MockServer;

pub struct Harness {
    pub server: MockServer,
    pub ctx: ServiceContext,
    pub notices: RecordingNotifier,
    pub history: History,
}

impl Harness {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let session = SessionStore::in_memory();
        let api = ApiClient::new(EndpointStore::fixed(server.uri()), session);
        let validator = ResponseValidator::new(api.clone());
        let notices = RecordingNotifier::new();
        let history = History::new();
        let ctx = ServiceContext::new(
            api,
            validator,
            Stores::new(),
            Arc::new(notices.clone()),
            Arc::new(history.clone()),
        );
        Self {
            server,
            ctx,
            notices,
            history,
        }
    }

    pub fn sign_in_as(&self, sub: i64, role: &str) -> String {
        let token = issue_token(sub, role, Duration::hours(1));
        self.ctx.session.set_token(&token);
        token
    }
}

/// Unsigned-for-our-purposes token: the client never checks the signature.
pub fn issue_token(sub: i64, role: &str, ttl: Duration) -> String {
    let claims = json!({
        "sub": sub,
        "username": format!("{}{}", role, sub),
        "role": role,
        "exp": (Utc::now() + ttl).timestamp(),
    });
    encode(&Header::default(), &claims, &EncodingKey::from_secret(b"backend-secret"))
        .expect("encode token")
}

pub fn job(job_id: i64, title: &str) -> JsonValue {
    json!({
        "job_id": job_id,
        "title": title,
        "area": "Tecnologia da Informação",
        "description": "Build and operate REST services.",
        "company": "ACME LTDA",
        "state": "PR",
        "city": "Curitiba",
        "salary": 4500.0,
        "contact": "jobs@acme.example"
    })
}
