//! Route-level authentication behavior: protected routes must reject
//! anonymous and garbage-token requests before touching any state.

mod common;

use common::TestApp;

#[tokio::test]
async fn test_login_form_describes_credentials() {
    let app = TestApp::new().await;

    let response = app.client.get(app.url("/login/")).send().await.unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["fields"]["identifier"], "Email or Username");
}

#[tokio::test]
async fn test_dashboard_requires_authentication() {
    let app = TestApp::new().await;

    let response = app.client.get(app.url("/dashboard/")).send().await.unwrap();

    assert_eq!(response.status(), 401);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], "AUTHENTICATION_FAILED");
}

#[tokio::test]
async fn test_workshop_create_requires_authentication() {
    let app = TestApp::new().await;

    let response = app
        .client
        .get(app.url("/workshops/new/"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    let response = app
        .client
        .post(app.url("/workshops/new/"))
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_workshop_edit_requires_authentication() {
    let app = TestApp::new().await;

    let response = app
        .client
        .get(app.url("/workshops/01890a5d-ac96-774b-b0ce-b3f4e7c2a9f1/edit/"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    let response = app
        .client
        .get(app.url("/workshops/01890a5d-ac96-774b-b0ce-b3f4e7c2a9f1/uploads/"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_garbage_bearer_token_rejected() {
    let app = TestApp::new().await;

    let response = app
        .client
        .get(app.url("/dashboard/"))
        .header("authorization", "Bearer not.a.token")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_garbage_cookie_token_rejected() {
    let app = TestApp::new().await;

    let response = app
        .client
        .get(app.url("/dashboard/"))
        .header("cookie", "access_token=bogus")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let app = TestApp::new().await;

    let response = app.client.post(app.url("/logout/")).send().await.unwrap();

    assert_eq!(response.status(), 200);
    let set_cookie = response
        .headers()
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(set_cookie.starts_with("access_token="));
    assert!(set_cookie.ends_with("Max-Age=0"));
}
