use axum::{extract::State, Json};
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

use super::types::*;
use super::{ApiError, ApiJson, ApiPath, RpcState};
use crate::account::AccountView;

/// Liveness check
pub async fn root() -> Json<AliveResponse> {
    Json(AliveResponse { message: "ALIVE!".to_string() })
}

/// Create a new account
///
/// 400 if the login is already registered, 422 on a malformed body.
#[tracing::instrument(skip(state))]
pub async fn create_account(
    State(state): State<RpcState>,
    ApiJson(request): ApiJson<CreateAccountRequest>,
) -> Result<Json<AccountView>, ApiError> {
    request.validate()?;
    let account = state.service.create(request.into()).await?;
    Ok(Json(account.into()))
}

#[tracing::instrument(skip(state))]
pub async fn list_accounts(State(state): State<RpcState>) -> Result<Json<Vec<AccountView>>, ApiError> {
    let accounts = state.service.list().await?;
    debug!(count = accounts.len(), "Listing accounts");
    Ok(Json(accounts.into_iter().map(AccountView::from).collect()))
}

#[tracing::instrument(skip(state))]
pub async fn get_account(
    State(state): State<RpcState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<AccountView>, ApiError> {
    Ok(Json(state.service.get(id).await?.into()))
}

/// Replace the password. An empty body returns the account unchanged.
#[tracing::instrument(skip(state))]
pub async fn update_account(
    State(state): State<RpcState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<UpdateAccountRequest>,
) -> Result<Json<AccountView>, ApiError> {
    request.validate()?;
    Ok(Json(state.service.update(id, request.into()).await?.into()))
}

#[tracing::instrument(skip(state))]
pub async fn delete_account(
    State(state): State<RpcState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<StatusResponse>, ApiError> {
    state.service.delete(id).await?;
    Ok(Json(StatusResponse::success()))
}

/// 400 if the account is already locked
#[tracing::instrument(skip(state))]
pub async fn acquire_lock(
    State(state): State<RpcState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<AccountView>, ApiError> {
    Ok(Json(state.service.acquire_lock(id).await?.into()))
}

/// 400 if the account is not locked
#[tracing::instrument(skip(state))]
pub async fn release_lock(
    State(state): State<RpcState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<AccountView>, ApiError> {
    Ok(Json(state.service.release_lock(id).await?.into()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::account::{AccountService, MemoryStore};
    use crate::rpc::create_router;

    fn create_test_app() -> Router {
        let service = Arc::new(AccountService::new(Arc::new(MemoryStore::new())));
        create_router(RpcState { service })
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, value)
    }

    fn user(login: &str) -> Value {
        json!({
            "login": login,
            "password": "password123",
            "project_id": Uuid::new_v4(),
            "env": "dev",
            "domain": "regular"
        })
    }

    #[tokio::test]
    async fn test_root_is_alive() {
        let app = create_test_app();
        let (status, body) = send(&app, Method::GET, "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "ALIVE!" }));
    }

    #[tokio::test]
    async fn test_create_account_hides_password() {
        let app = create_test_app();
        let (status, body) = send(&app, Method::POST, "/users/", Some(user("test@example.com"))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["login"], "test@example.com");
        assert_eq!(body["is_locked"], false);
        assert!(body["id"].is_string());
        assert!(body.get("password").is_none());
    }

    #[tokio::test]
    async fn test_create_duplicate_login_is_bad_request() {
        let app = create_test_app();
        send(&app, Method::POST, "/users", Some(user("dup@example.com"))).await;
        let (status, body) = send(&app, Method::POST, "/users", Some(user("dup@example.com"))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "login already registered");
    }

    #[tokio::test]
    async fn test_create_invalid_shape_is_unprocessable() {
        let app = create_test_app();

        let mut bad_login = user("x@example.com");
        bad_login["login"] = json!("not-an-email");
        let (status, _) = send(&app, Method::POST, "/users/", Some(bad_login)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let mut short = user("y@example.com");
        short["password"] = json!("123");
        let (status, _) = send(&app, Method::POST, "/users/", Some(short)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let mut bad_project = user("z@example.com");
        bad_project["project_id"] = json!("not-a-uuid");
        let (status, _) = send(&app, Method::POST, "/users/", Some(bad_project)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = send(&app, Method::POST, "/users/", Some(json!({ "login": "q@example.com" }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_list_accounts() {
        let app = create_test_app();
        let (status, body) = send(&app, Method::GET, "/users/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));

        send(&app, Method::POST, "/users/", Some(user("l1@example.com"))).await;
        send(&app, Method::POST, "/users/", Some(user("l2@example.com"))).await;
        let (_, body) = send(&app, Method::GET, "/users", None).await;
        assert_eq!(body.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_account() {
        let app = create_test_app();
        let (_, created) = send(&app, Method::POST, "/users/", Some(user("up@example.com"))).await;
        let uri = format!("/users/{}", created["id"].as_str().unwrap());

        let (status, body) = send(&app, Method::PUT, &uri, Some(json!({ "password": "another-pass" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, created);

        let (status, _) = send(&app, Method::PUT, &uri, Some(json!({ "password": "short" }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, body) = send(&app, Method::PUT, &uri, Some(json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, created);

        let missing = format!("/users/{}", Uuid::new_v4());
        let (status, _) = send(&app, Method::PUT, &missing, Some(json!({}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_and_malformed_ids() {
        let app = create_test_app();
        let id = Uuid::new_v4();

        for (method, uri) in [
            (Method::GET, format!("/users/{}", id)),
            (Method::DELETE, format!("/users/{}", id)),
            (Method::POST, format!("/users/{}/lock", id)),
            (Method::POST, format!("/users/{}/unlock", id)),
        ] {
            let (status, body) = send(&app, method, &uri, None).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body["detail"], "Account not found");
        }

        let (status, _) = send(&app, Method::GET, "/users/not-a-uuid", None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
