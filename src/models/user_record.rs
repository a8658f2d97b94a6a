use serde::Serialize;
use serde_json::Value;

use super::cohort::Action;
use crate::utils::value_to_string;

/// A user row as held by the panel. `pk` is always kept in its string form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    pub pk: String,
    pub username: String,
    pub email: String,
    pub action: Action,
}

impl UserRecord {
    pub fn new(pk: impl Into<String>, username: impl Into<String>, email: impl Into<String>, action: Action) -> Self {
        UserRecord {
            pk: pk.into(),
            username: username.into(),
            email: email.into(),
            action,
        }
    }

    /// Build a record from one entry of a listing payload. Missing or null
    /// fields become empty strings.
    pub fn from_value(value: &Value, action: Action) -> Self {
        let field = |key: &str| value.get(key).map(value_to_string).unwrap_or_default();
        UserRecord {
            pk: field("pk"),
            username: field("username"),
            email: field("email"),
            action,
        }
    }
}
