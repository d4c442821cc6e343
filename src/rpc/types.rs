// Request and response payloads for the HTTP surface
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::account::{AccountPatch, NewAccount};

#[derive(Deserialize, Validate, Clone)]
pub struct CreateAccountRequest {
    #[validate(email(message = "value is not a valid email address"))]
    pub login: String,
    #[validate(length(min = 7, message = "password must be at least 7 characters"))]
    pub password: String,
    pub project_id: Uuid,
    pub env: String,
    pub domain: String,
}

// Password is left out of Debug so it never reaches the logs
impl std::fmt::Debug for CreateAccountRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateAccountRequest")
            .field("login", &self.login)
            .field("project_id", &self.project_id)
            .field("env", &self.env)
            .field("domain", &self.domain)
            .finish_non_exhaustive()
    }
}

impl From<CreateAccountRequest> for NewAccount {
    fn from(req: CreateAccountRequest) -> Self {
        NewAccount {
            login: req.login,
            password: req.password,
            project_id: req.project_id,
            env: req.env,
            domain: req.domain,
        }
    }
}

#[derive(Deserialize, Validate, Clone, Default)]
pub struct UpdateAccountRequest {
    #[validate(length(min = 7, message = "password must be at least 7 characters"))]
    #[serde(default)]
    pub password: Option<String>,
}

impl std::fmt::Debug for UpdateAccountRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateAccountRequest")
            .field("password_set", &self.password.is_some())
            .finish()
    }
}

impl From<UpdateAccountRequest> for AccountPatch {
    fn from(req: UpdateAccountRequest) -> Self {
        AccountPatch { password: req.password }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn success() -> Self {
        Self { status: "success".to_string() }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct AliveResponse {
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub detail: String,
}
