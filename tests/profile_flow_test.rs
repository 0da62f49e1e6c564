mod common;

use common::Harness;
use jobboard_frontend::dto::profile_dto::UpdateUserForm;
use jobboard_frontend::services::company_service::CompanyService;
use jobboard_frontend::services::user_service::UserService;
use serde_json::{json, Value as JsonValue};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

fn user_profile() -> JsonValue {
    json!({
        "name": "ANA SOUZA",
        "username": "ana123",
        "email": "ana@example.com",
        "phone": "41999990000",
        "experience": "Three years with Rust",
        "education": "Computer Science"
    })
}

fn company_profile() -> JsonValue {
    json!({
        "name": "ACME LTDA",
        "business": "Software",
        "username": "acme",
        "street": "Rua XV",
        "number": "100",
        "city": "Curitiba",
        "state": "PR",
        "phone": "4133330000",
        "email": "contact@acme.example"
    })
}

#[tokio::test]
async fn profile_is_fetched_once_then_served_from_cache() {
    let h = Harness::start().await;
    h.sign_in_as(12, "user");

    Mock::given(method("GET"))
        .and(path("/users/12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_profile()))
        .expect(1)
        .mount(&h.server)
        .await;

    let users = UserService::new(h.ctx.clone());
    let first = users.fetch().await.expect("profile");
    let second = users.fetch().await.expect("cached profile");

    assert_eq!(first, second);
    assert_eq!(first.username, "ana123");
    assert!(!users.store().snapshot().is_loading);
}

#[tokio::test]
async fn company_session_has_no_user_profile() {
    let h = Harness::start().await;
    h.sign_in_as(7, "company");

    Mock::given(method("GET"))
        .and(path("/users/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_profile()))
        .expect(0)
        .mount(&h.server)
        .await;

    let users = UserService::new(h.ctx.clone());
    assert!(users.fetch().await.is_none());
    assert!(h.notices.notices().is_empty());
}

#[tokio::test]
async fn missing_profile_is_a_not_found_notice() {
    let h = Harness::start().await;
    h.sign_in_as(7, "company");

    Mock::given(method("GET"))
        .and(path("/companies/7"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "gone"})))
        .expect(1)
        .mount(&h.server)
        .await;

    let companies = CompanyService::new(h.ctx.clone());
    assert!(companies.fetch().await.is_none());
    assert_eq!(h.notices.messages(), vec!["Company not found".to_string()]);
    assert!(h.ctx.session.get_token().is_some());
}

#[tokio::test]
async fn update_merges_into_cached_profile() {
    let h = Harness::start().await;
    h.sign_in_as(12, "user");

    Mock::given(method("GET"))
        .and(path("/users/12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_profile()))
        .mount(&h.server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/users/12"))
        .and(body_json(json!({
            "name": "ANA MARIA SOUZA",
            "email": "ana@example.com",
            "education": "Computer Science"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "updated"})))
        .expect(1)
        .mount(&h.server)
        .await;

    let users = UserService::new(h.ctx.clone());
    users.fetch().await;

    let form = UpdateUserForm {
        name: "Ana Maria Souza".into(),
        email: Some("ana@example.com".into()),
        password: Some(String::new()),
        phone: Some("  ".into()),
        experience: None,
        education: Some("Computer Science".into()),
    };
    assert!(users.update(form).await);

    let cached = users.store().profile().expect("cached");
    assert_eq!(cached.name, "ANA MARIA SOUZA");
    assert_eq!(cached.phone, None);
    assert_eq!(h.history.current().as_deref(), Some("/profile"));
    assert_eq!(h.notices.messages(), vec!["Profile updated successfully!".to_string()]);
}

#[tokio::test]
async fn deleting_the_company_ends_the_session() {
    let h = Harness::start().await;
    h.sign_in_as(7, "company");

    Mock::given(method("GET"))
        .and(path("/companies/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(company_profile()))
        .mount(&h.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/companies/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Company removed"})))
        .expect(1)
        .mount(&h.server)
        .await;

    let companies = CompanyService::new(h.ctx.clone());
    assert!(companies.fetch().await.is_some());
    assert!(companies.delete().await);

    assert!(h.ctx.session.get_token().is_none());
    assert!(companies.store().profile().is_none());
    assert_eq!(h.history.current().as_deref(), Some("/sign-in"));
    assert_eq!(h.notices.messages(), vec!["Company removed".to_string()]);
}

#[tokio::test]
async fn forbidden_update_shows_permission_notice() {
    let h = Harness::start().await;
    h.sign_in_as(12, "user");

    Mock::given(method("PATCH"))
        .and(path("/users/12"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"message": "nope"})))
        .expect(1)
        .mount(&h.server)
        .await;

    let users = UserService::new(h.ctx.clone());
    let form = UpdateUserForm {
        name: "Ana Souza".into(),
        ..Default::default()
    };
    assert!(!users.update(form).await);
    assert_eq!(
        h.notices.messages(),
        vec!["You do not have permission to perform this action.".to_string()]
    );
    assert!(h.ctx.session.get_token().is_some());
}
