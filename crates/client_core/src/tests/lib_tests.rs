use super::*;
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use shared::{domain::Company, error::ServiceOperation};
use tokio::net::TcpListener;

use crate::fake_service::{sample_draft, sample_user};

#[derive(Clone, Default)]
struct ApiState {
    users: Arc<Mutex<Vec<User>>>,
    received: Arc<Mutex<Vec<serde_json::Value>>>,
    deleted: Arc<Mutex<Vec<i64>>>,
}

async fn list_users(State(state): State<ApiState>) -> Json<Vec<User>> {
    Json(state.users.lock().expect("users").clone())
}

async fn get_user(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<Json<User>, StatusCode> {
    state
        .users
        .lock()
        .expect("users")
        .iter()
        .find(|user| user.id.0 == id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn create_user(
    State(state): State<ApiState>,
    Json(body): Json<serde_json::Value>,
) -> (StatusCode, Json<serde_json::Value>) {
    state.received.lock().expect("received").push(body.clone());
    let mut echoed = body;
    echoed["id"] = serde_json::json!(11);
    (StatusCode::CREATED, Json(echoed))
}

async fn update_user(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
    Json(body): Json<serde_json::Value>,
) -> Json<serde_json::Value> {
    state.received.lock().expect("received").push(body.clone());
    let mut echoed = body;
    echoed["id"] = serde_json::json!(id);
    Json(echoed)
}

async fn delete_user(State(state): State<ApiState>, Path(id): Path<i64>) -> StatusCode {
    state.deleted.lock().expect("deleted").push(id);
    StatusCode::OK
}

async fn spawn_router(app: Router) -> anyhow::Result<String> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}

async fn spawn_users_api(state: ApiState) -> anyhow::Result<String> {
    let app = Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .with_state(state);
    spawn_router(app).await
}

fn service_for(base_url: &str) -> HttpUserService {
    HttpUserService::new(&ClientConfig::new(base_url)).expect("service")
}

#[tokio::test]
async fn list_returns_remote_users_in_order() {
    let state = ApiState::default();
    *state.users.lock().expect("users") = vec![sample_user(1, "Leanne"), sample_user(10, "Clementina")];
    let base_url = spawn_users_api(state).await.expect("spawn api");

    let users = service_for(&base_url).list().await.expect("list");

    let ids: Vec<i64> = users.iter().map(|user| user.id.0).collect();
    assert_eq!(ids, vec![1, 10]);
    assert_eq!(users[1].company.catch_phrase, "Multi-layered client-server neural-net");
}

#[tokio::test]
async fn get_missing_user_is_a_fetch_failure() {
    let base_url = spawn_users_api(ApiState::default()).await.expect("spawn api");

    let err = service_for(&base_url)
        .get(UserId(99))
        .await
        .expect_err("must fail");

    assert_eq!(err.operation(), ServiceOperation::Fetch);
    let message = err.to_string();
    assert!(
        message.starts_with("Failed to fetch user: "),
        "unexpected message: {message}"
    );
    assert!(message.contains("404"), "unexpected message: {message}");
}

#[tokio::test]
async fn create_posts_camel_case_draft_and_decodes_echo() {
    let state = ApiState::default();
    let base_url = spawn_users_api(state.clone()).await.expect("spawn api");
    let mut draft = sample_draft("Kurtis");
    draft.company = Company {
        name: "Hoeger LLC".into(),
        catch_phrase: "Centralized empowering task-force".into(),
        bs: "target end-to-end models".into(),
    };

    let echoed = service_for(&base_url).create(&draft).await.expect("create");

    assert_eq!(echoed.id, UserId(11));
    let received = state.received.lock().expect("received").clone();
    assert_eq!(received.len(), 1);
    assert_eq!(
        received[0]["company"]["catchPhrase"],
        "Centralized empowering task-force"
    );
    assert!(received[0].get("id").is_none());
}

#[tokio::test]
async fn update_puts_to_user_resource() {
    let state = ApiState::default();
    let base_url = spawn_users_api(state.clone()).await.expect("spawn api");

    let echoed = service_for(&base_url)
        .update(UserId(4), &sample_draft("Patricia"))
        .await
        .expect("update");

    assert_eq!(echoed.id, UserId(4));
    assert_eq!(state.received.lock().expect("received")[0]["name"], "Patricia");
}

#[tokio::test]
async fn delete_hits_user_resource_once() {
    let state = ApiState::default();
    let base_url = spawn_users_api(state.clone()).await.expect("spawn api");

    service_for(&base_url)
        .delete(UserId(3))
        .await
        .expect("delete");

    assert_eq!(*state.deleted.lock().expect("deleted"), vec![3]);
}

#[tokio::test]
async fn server_error_on_delete_is_a_delete_failure() {
    let app = Router::new().route(
        "/users/:id",
        axum::routing::delete(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    );
    let base_url = spawn_router(app).await.expect("spawn api");

    let err = service_for(&base_url)
        .delete(UserId(1))
        .await
        .expect_err("must fail");

    assert_eq!(err.operation(), ServiceOperation::Delete);
    assert!(err.to_string().starts_with("Failed to delete user: "));
    assert!(err.transport_message().contains("500"));
}

#[tokio::test]
async fn unreachable_server_is_a_fetch_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let err = service_for(&format!("http://{addr}"))
        .list()
        .await
        .expect_err("must fail");

    assert!(err.to_string().starts_with("Failed to fetch users: "));
}

#[tokio::test]
async fn slow_response_hits_request_timeout() {
    let app = Router::new().route(
        "/users",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(Vec::<User>::new())
        }),
    );
    let base_url = spawn_router(app).await.expect("spawn api");
    let config = ClientConfig {
        api_base_url: base_url,
        request_timeout: Duration::from_millis(100),
    };
    let service = HttpUserService::new(&config).expect("service");

    let err = service.list().await.expect_err("must time out");

    assert_eq!(err.operation(), ServiceOperation::Fetch);
}

#[test]
fn user_urls_extend_base_path() {
    let service = service_for("http://127.0.0.1:9/api");
    assert_eq!(service.users_url().as_str(), "http://127.0.0.1:9/api/users");
    assert_eq!(
        service.user_url(UserId(7)).as_str(),
        "http://127.0.0.1:9/api/users/7"
    );
}
