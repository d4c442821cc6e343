pub mod handlers;
pub mod types;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequest, FromRequestParts,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::account::{AccountError, AccountService};
use crate::error::ServiceError;
use types::ErrorResponse;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Validation(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::NotFound(_) => ApiError::NotFound("Account not found".to_string()),
            AccountError::Conflict(msg) => ApiError::Conflict(msg),
            AccountError::Validation(msg) => ApiError::Validation(msg),
            AccountError::Storage(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::Validation(errors.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(msg) => {
                error!("Request failed: {}", msg);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(ErrorResponse { detail: self.to_string() })).into_response()
    }
}

/// JSON body extractor whose rejections are reported as validation errors
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Path extractor whose rejections are reported as validation errors
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

#[derive(Clone)]
pub struct RpcState {
    pub service: Arc<AccountService>,
}

pub fn create_router(state: RpcState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/users", get(handlers::list_accounts).post(handlers::create_account))
        .route("/users/", get(handlers::list_accounts).post(handlers::create_account))
        .route(
            "/users/:id",
            get(handlers::get_account)
                .put(handlers::update_account)
                .delete(handlers::delete_account),
        )
        .route("/users/:id/lock", post(handlers::acquire_lock))
        .route("/users/:id/unlock", post(handlers::release_lock))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub struct RpcServer {
    state: RpcState,
    bind_addr: String,
}

impl RpcServer {
    pub fn new(service: Arc<AccountService>, host: &str, port: u16) -> Self {
        Self {
            state: RpcState { service },
            bind_addr: format!("{}:{}", host, port),
        }
    }

    pub async fn start(self) -> Result<(), ServiceError> {
        let app = create_router(self.state);

        let listener = tokio::net::TcpListener::bind(&self.bind_addr)
            .await
            .map_err(|e| ServiceError::Bind(self.bind_addr.clone(), e))?;

        info!("Account service listening on {}", self.bind_addr);
        axum::serve(listener, app).await.map_err(ServiceError::Serve)
    }
}
