// tests for the http api, driven through the router without a socket

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use failforward::{CrisisDetector, Server, Store};

async fn app() -> Router {
    let store = Store::in_memory().await.unwrap();
    Server::router(store, CrisisDetector::default())
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_post(app: &Router, body: Value) -> Value {
    let (status, post) = send(app, "POST", "/posts", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    post
}

#[tokio::test]
async fn test_health() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_create_ordinary_post() {
    let app = app().await;
    let post = create_post(
        &app,
        json!({"role": "student", "category": "failure_story", "content": "면접에서 떨어졌어요"}),
    )
    .await;

    assert_eq!(post["content"], "면접에서 떨어졌어요");
    assert_eq!(post["category"], "failure_story");
    assert_eq!(post["hearts"], 0);
    assert_eq!(post["crisis"], false);
    assert!(post.get("notice").is_none());
    // share codes are on unless turned off
    assert_eq!(post["share_code"].as_str().unwrap().len(), 6);
}

#[tokio::test]
async fn test_crisis_post_is_saved_with_notice() {
    let app = app().await;
    let post = create_post(
        &app,
        json!({"role": "peer", "category": "feelings", "content": "요즘 죽고 싶다는 생각을 해요", "with_share_code": false}),
    )
    .await;

    assert_eq!(post["crisis"], true);
    assert!(post["notice"]["banner"].as_str().unwrap().contains("1393"));
    assert!(post["share_code"].is_null());

    // persisted like any other post
    let id = post["id"].as_i64().unwrap();
    let (status, thread) = send(&app, "GET", &format!("/posts/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(thread["content"], "요즘 죽고 싶다는 생각을 해요");
    assert_eq!(thread["crisis"], true);
}

#[tokio::test]
async fn test_empty_post_rejected() {
    let app = app().await;
    let (status, body) = send(&app, "POST", "/posts", Some(json!({"content": "   "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (_, posts) = send(&app, "GET", "/posts", None).await;
    assert_eq!(posts.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_anonymous_by_default() {
    let app = app().await;
    let post = create_post(&app, json!({"nickname": "민지", "content": "안녕하세요"})).await;
    assert_eq!(post["role"], "student");
    assert_eq!(post["is_anonymous"], true);
}

#[tokio::test]
async fn test_list_filters() {
    let app = app().await;
    create_post(&app, json!({"role": "student", "category": "feelings", "content": "걱정돼요"})).await;
    create_post(&app, json!({"role": "parent", "category": "gratitude", "content": "고마워요"})).await;

    let (status, posts) = send(&app, "GET", "/posts?category=gratitude", None).await;
    assert_eq!(status, StatusCode::OK);
    let posts = posts.as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["role"], "parent");

    let (_, posts) = send(&app, "GET", "/posts?role=student", None).await;
    assert_eq!(posts[0]["content"], "걱정돼요");

    let (_, posts) = send(&app, "GET", "/posts", None).await;
    // newest first
    assert_eq!(posts[0]["content"], "고마워요");
}

#[tokio::test]
async fn test_comments_and_thread() {
    let app = app().await;
    let post = create_post(&app, json!({"content": "오늘 발표를 망쳤어"})).await;
    let id = post["id"].as_i64().unwrap();

    let (status, comment) = send(
        &app,
        "POST",
        &format!("/posts/{id}/comments"),
        Some(json!({"role": "peer", "content": "괜찮아, 다음에 잘하면 돼"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(comment["post_id"], id);
    assert_eq!(comment["crisis"], false);

    let (_, comment) = send(
        &app,
        "POST",
        &format!("/posts/{id}/comments"),
        Some(json!({"content": "나도 사라지고 싶어"})),
    )
    .await;
    assert_eq!(comment["crisis"], true);
    assert!(comment["notice"]["banner"].is_string());

    let (_, thread) = send(&app, "GET", &format!("/posts/{id}"), None).await;
    let comments = thread["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0]["content"], "괜찮아, 다음에 잘하면 돼");

    let (status, listed) = send(&app, "GET", &format!("/posts/{id}/comments"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_missing_post() {
    let app = app().await;
    for (method, uri) in [
        ("GET", "/posts/99"),
        ("GET", "/posts/99/comments"),
        ("POST", "/posts/99/hearts"),
        ("POST", "/posts/99/flag"),
        ("DELETE", "/posts/99"),
    ] {
        let (status, _) = send(&app, method, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method} {uri}");
    }

    let (status, _) = send(
        &app,
        "POST",
        "/posts/99/comments",
        Some(json!({"content": "안녕"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_hearts_and_flag() {
    let app = app().await;
    let post = create_post(&app, json!({"content": "응원 부탁해요"})).await;
    let id = post["id"].as_i64().unwrap();

    let (_, body) = send(&app, "POST", &format!("/posts/{id}/hearts"), None).await;
    assert_eq!(body["hearts"], 1);
    let (_, body) = send(&app, "POST", &format!("/posts/{id}/hearts"), None).await;
    assert_eq!(body["hearts"], 2);

    let (status, body) = send(&app, "POST", &format!("/posts/{id}/flag"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_flagged"], true);

    let (_, thread) = send(&app, "GET", &format!("/posts/{id}"), None).await;
    assert_eq!(thread["hearts"], 2);
    assert_eq!(thread["is_flagged"], true);
}

#[tokio::test]
async fn test_delete_post() {
    let app = app().await;
    let post = create_post(&app, json!({"content": "지워주세요"})).await;
    let id = post["id"].as_i64().unwrap();
    send(&app, "POST", &format!("/posts/{id}/comments"), Some(json!({"content": "네"}))).await;

    let (status, _) = send(&app, "DELETE", &format!("/posts/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &format!("/posts/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_share_code_lookup() {
    let app = app().await;
    let post = create_post(&app, json!({"content": "부모님께 보여줄 글"})).await;
    let code = post["share_code"].as_str().unwrap().to_lowercase();

    let (status, found) = send(&app, "GET", &format!("/share/{code}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found["id"], post["id"]);

    let (status, _) = send(&app, "GET", "/share/NOPE", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_check() {
    let app = app().await;

    let (status, body) = send(&app, "POST", "/check", Some(json!({"text": "다 끝내고 싶어"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["crisis"], true);
    assert!(body["notice"]["banner"].is_string());

    let (_, body) = send(&app, "POST", "/check", Some(json!({"text": "DESTROY"}))).await;
    assert_eq!(body["crisis"], false);
    assert!(body.get("notice").is_none());

    let (_, body) = send(&app, "POST", "/check", Some(json!({}))).await;
    assert_eq!(body["crisis"], false);
}

#[tokio::test]
async fn test_phrases() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/phrases", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], "ko-1");
    assert_eq!(body["phrases"].as_array().unwrap().len(), failforward::DEFAULT_PHRASES.len());
}

#[tokio::test]
async fn test_register_and_login() {
    let app = app().await;
    let creds = json!({"username": "jisoo", "password": "pw1234"});

    let (status, user) = send(&app, "POST", "/users", Some(creds.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["username"], "jisoo");
    assert!(user.get("password").is_none());
    assert!(user.get("password_hash").is_none());

    let (status, _) = send(&app, "POST", "/users", Some(creds.clone())).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, logged_in) = send(&app, "POST", "/login", Some(creds)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(logged_in["id"], user["id"]);

    let (status, _) = send(
        &app,
        "POST",
        "/login",
        Some(json!({"username": "jisoo", "password": "nope"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        "POST",
        "/users",
        Some(json!({"username": " ", "password": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_filter_spellings() {
    let app = app().await;
    create_post(&app, json!({"category": "failure_story", "content": "떨어졌어요"})).await;
    create_post(&app, json!({"category": "gratitude", "content": "고마워요"})).await;

    // blank or 전체 means no filter
    for uri in ["/posts?category=", "/posts?category=&role=", "/posts?role=%EC%A0%84%EC%B2%B4"] {
        let (status, posts) = send(&app, "GET", uri, None).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(posts.as_array().unwrap().len(), 2, "{uri}");
    }

    // korean label and kebab-case name for the same category
    for uri in ["/posts?category=%EC%8B%A4%ED%8C%A8%EB%8B%B4", "/posts?category=failure-story"] {
        let (status, posts) = send(&app, "GET", uri, None).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        let posts = posts.as_array().unwrap();
        assert_eq!(posts.len(), 1, "{uri}");
        assert_eq!(posts[0]["content"], "떨어졌어요");
    }
}

#[tokio::test]
async fn test_unknown_filter_value_is_json_400() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/posts?category=news", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("news"));
}

#[tokio::test]
async fn test_korean_labels_in_body() {
    let app = app().await;
    let post = create_post(
        &app,
        json!({"role": "학생", "category": "감사/응원", "content": "hi"}),
    )
    .await;
    // stored and returned as keys
    assert_eq!(post["role"], "student");
    assert_eq!(post["category"], "gratitude");
}

#[tokio::test]
async fn test_missing_content_is_empty_body() {
    let app = app().await;
    let (status, body) = send(&app, "POST", "/posts", Some(json!({"role": "student"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Content must not be empty");

    let post = create_post(&app, json!({"content": "글"})).await;
    let id = post["id"].as_i64().unwrap();
    let (status, body) = send(&app, "POST", &format!("/posts/{id}/comments"), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Content must not be empty");
}

#[tokio::test]
async fn test_malformed_requests_are_json_400() {
    let app = app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/posts",
        Some(json!({"role": "admin", "content": "hi"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = send(&app, "POST", "/posts", Some(json!({"content": 5}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = send(&app, "GET", "/posts/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = send(&app, "POST", "/users", Some(json!({"username": "jisoo"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}
