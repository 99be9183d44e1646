use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub email: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SentResponse {
    pub sent: bool,
}
