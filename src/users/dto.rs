use serde::{Deserialize, Serialize};

/// Request body for user creation.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedUserResponse {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
