mod common;

use common::TestApp;

#[tokio::test]
async fn test_health_endpoint() {
    let app = TestApp::new().await;

    let response = app
        .client
        .get(app.url("/healthz"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_home_banner() {
    let app = TestApp::new().await;

    let response = app.client.get(app.url("/")).send().await.unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["service"], "workshophub");
    assert_eq!(body["endpoints"]["workshops"], "/workshops/");
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = TestApp::new().await;

    let response = app.client.get(app.url("/nope/")).send().await.unwrap();

    assert_eq!(response.status(), 404);
}
