use serde_json::{json, Value};

use super::client::{ApiClient, ApiError};
use crate::models::Action;

/// Wire form of a pk: integers go out as JSON numbers, anything else as text.
pub fn pk_value(pk: &str) -> Value {
    match pk.trim().parse::<i64>() {
        Ok(n) => Value::from(n),
        Err(_) => Value::from(pk),
    }
}

/// Move a guest into the members group.
pub async fn promote(api: &ApiClient, pk: &str, send_mail: bool) -> Result<Value, ApiError> {
    api.post(Action::Promote.endpoint(), &json!({"pk": pk_value(pk), "send_mail": send_mail}))
        .await
}

/// Move a member back into the guests group.
pub async fn demote(api: &ApiClient, pk: &str) -> Result<Value, ApiError> {
    api.post(Action::Demote.endpoint(), &json!({"pk": pk_value(pk)})).await
}

/// Run the transition `action` for a single pk.
pub async fn transition(api: &ApiClient, action: Action, pk: &str, send_mail: bool) -> Result<Value, ApiError> {
    match action {
        Action::Promote => promote(api, pk, send_mail).await,
        Action::Demote => demote(api, pk).await,
    }
}
