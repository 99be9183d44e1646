use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    pub email: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub password: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CheckTokenRequest {
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ForgotUsernameRequest {
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FoundResponse {
    pub found: bool,
}
