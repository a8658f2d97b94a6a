use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use super::client::{ApiClient, ApiError};
use crate::utils::{parse_positive_int, value_to_string};

/// Body of `POST /invites`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InviteRequest {
    pub name: String,
    pub username: String,
    pub email: String,
    pub single_use: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_days: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow: Option<String>,
}

/// Raw invite form fields as typed by the operator.
#[derive(Clone, Debug, Default)]
pub struct InviteForm {
    pub name: String,
    pub username: String,
    pub email: String,
    pub single_use: bool,
    pub expires_days: String,
    pub flow: String,
}

#[derive(Debug, Error, PartialEq)]
pub enum InviteFormError {
    #[error("invalid email address: {0}")]
    InvalidEmail(String),
    #[error("expires days must be a positive whole number")]
    InvalidExpiry,
}

impl InviteForm {
    /// Trim and validate the form. A blank username falls back to the name.
    pub fn into_request(self) -> Result<InviteRequest, InviteFormError> {
        let name = self.name.trim().to_string();
        let username = match self.username.trim() {
            "" => name.clone(),
            u => u.to_string(),
        };
        let email = self.email.trim().to_string();
        if !email.is_empty() && !looks_like_email(&email) {
            return Err(InviteFormError::InvalidEmail(email));
        }
        let expires_days = match self.expires_days.trim() {
            "" => None,
            raw => Some(parse_positive_int(raw).ok_or(InviteFormError::InvalidExpiry)?),
        };
        let flow = Some(self.flow.trim().to_string()).filter(|f| !f.is_empty());
        Ok(InviteRequest {
            name,
            username,
            email,
            single_use: self.single_use,
            expires_days,
            flow,
        })
    }
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

/// Interesting parts of an invite creation response.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InviteResponse {
    pub invite_url: Option<String>,
    pub pk: Option<String>,
    pub expires_friendly: Option<String>,
}

impl InviteResponse {
    pub fn from_value(payload: &Value) -> Self {
        let text = |key: &str| {
            payload
                .get(key)
                .map(value_to_string)
                .filter(|s| !s.is_empty())
        };
        InviteResponse {
            invite_url: text("invite_url"),
            pk: text("pk"),
            expires_friendly: text("expires_friendly"),
        }
    }
}

pub async fn create_invite(api: &ApiClient, request: &InviteRequest) -> Result<InviteResponse, ApiError> {
    let body = serde_json::to_value(request).map_err(|_| ApiError::InvalidJson)?;
    let payload = api.post("/invites", &body).await?;
    Ok(InviteResponse::from_value(&payload))
}
