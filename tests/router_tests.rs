mod common;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
};
use common::{DataRoot, TEST_DB, TEST_TABLESQL, seed};
use serde_json::{Value, json};
use sqlitebot::router::{SqlitebotState, sqlitebot_router};
use tower::ServiceExt;

async fn app_with_table(root: &DataRoot) -> Router {
    let store = root.store();
    seed(&store, TEST_DB, &[TEST_TABLESQL]).await;
    sqlitebot_router(SqlitebotState::new(store))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<(&str, String)>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some((content_type, payload)) => builder
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(payload)),
        None => builder.body(Body::empty()),
    }
    .expect("failed to build request");

    app.clone().oneshot(request).await.expect("request failed")
}

fn form(payload: &str) -> Option<(&'static str, String)> {
    Some(("application/x-www-form-urlencoded", payload.to_string()))
}

async fn json_body(resp: Response) -> Value {
    let body = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&body).expect("response body was not JSON")
}

#[tokio::test]
async fn lists_databases_and_tables() {
    let root = DataRoot::new("route-list");
    let app = app_with_table(&root).await;

    let resp = send(&app, "GET", "/", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, json!([TEST_DB]));

    let resp = send(&app, "GET", "/test/", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, json!(["testtbl"]));
}

#[tokio::test]
async fn missing_database_is_not_found() {
    let root = DataRoot::new("route-missing");
    let app = app_with_table(&root).await;

    for (method, uri) in [
        ("GET", "/ghost/"),
        ("GET", "/ghost/testtbl/"),
        ("GET", "/ghost/testtbl/1"),
        ("DELETE", "/ghost/testtbl/1"),
    ] {
        let resp = send(&app, method, uri, None).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{method} {uri}");
        let body = json_body(resp).await;
        assert_eq!(body["error"]["code"], "NO_SUCH_DATABASE");
    }

    let writes = [
        ("POST", "/ghost/testtbl/", form("col1=1")),
        ("POST", "/ghost/testtbl/1", form("col2=def")),
        (
            "PUT",
            "/ghost/testtbl/1",
            Some(("application/json", r#"[1, "x"]"#.to_string())),
        ),
    ];
    for (method, uri, body) in writes {
        let resp = send(&app, method, uri, body).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{method} {uri}");
        let body = json_body(resp).await;
        assert_eq!(body["error"]["code"], "NO_SUCH_DATABASE");
    }
}

#[tokio::test]
async fn record_lifecycle_over_http() {
    let root = DataRoot::new("route-crud");
    let app = app_with_table(&root).await;

    let resp = send(&app, "POST", "/test/testtbl/", form("col1=123&col2=abc")).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap(),
        "/test/testtbl/1"
    );
    assert_eq!(json_body(resp).await, json!("/test/testtbl/1"));

    let resp = send(&app, "GET", "/test/testtbl/1", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        json_body(resp).await,
        json!({"rowid": 1, "col1": 123, "col2": "abc"})
    );

    let resp = send(&app, "POST", "/test/testtbl/1", form("col2=def")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, json!(1));

    let resp = send(&app, "GET", "/test/testtbl/", None).await;
    assert_eq!(
        json_body(resp).await,
        json!([{"rowid": 1, "col1": 123, "col2": "def"}])
    );

    let resp = send(
        &app,
        "PUT",
        "/test/testtbl/1",
        Some(("application/json", r#"[555, "xyz"]"#.to_string())),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = send(&app, "GET", "/test/testtbl/1", None).await;
    assert_eq!(
        json_body(resp).await,
        json!({"rowid": 1, "col1": 555, "col2": "xyz"})
    );

    let resp = send(&app, "DELETE", "/test/testtbl/1", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = send(&app, "GET", "/test/testtbl/1", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, Value::Null);
}

#[tokio::test]
async fn put_and_delete_need_a_rowid() {
    let root = DataRoot::new("route-405");
    let app = app_with_table(&root).await;

    for method in ["PUT", "DELETE"] {
        let resp = send(&app, method, "/test/testtbl/", None).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED, "{method}");
        let body = json_body(resp).await;
        assert_eq!(body["error"]["code"], "METHOD_NOT_ALLOWED");
    }
}

#[tokio::test]
async fn empty_insert_form_creates_nothing() {
    let root = DataRoot::new("route-empty");
    let app = app_with_table(&root).await;

    let resp = send(&app, "POST", "/test/testtbl/", form("")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().get(header::LOCATION).is_none());
    assert_eq!(json_body(resp).await, Value::Null);

    let resp = send(&app, "GET", "/test/testtbl/", None).await;
    assert_eq!(json_body(resp).await, json!([]));
}

#[tokio::test]
async fn empty_update_form_leaves_record_unchanged() {
    let root = DataRoot::new("route-update-empty");
    let app = app_with_table(&root).await;

    let resp = send(&app, "POST", "/test/testtbl/", form("col1=123&col2=abc")).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = send(&app, "POST", "/test/testtbl/1", form("")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, json!(1));

    let resp = send(&app, "GET", "/test/testtbl/1", None).await;
    assert_eq!(
        json_body(resp).await,
        json!({"rowid": 1, "col1": 123, "col2": "abc"})
    );
}

#[tokio::test]
async fn replace_with_wrong_value_count_is_bad_request() {
    let root = DataRoot::new("route-replace");
    let app = app_with_table(&root).await;

    let resp = send(
        &app,
        "PUT",
        "/test/testtbl/1",
        Some(("application/json", "[1]".to_string())),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn unsafe_table_name_is_not_found() {
    let root = DataRoot::new("route-names");
    let app = app_with_table(&root).await;

    let resp = send(&app, "GET", "/test/bad%20name/", None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(resp).await["error"]["code"], "INVALID_NAME");
}
