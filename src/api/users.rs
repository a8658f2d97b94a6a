use serde_json::Value;

use super::client::{ApiClient, ApiError};
use crate::models::{Cohort, UserRecord};

/// Result of `GET /guest-users` or `GET /members-users`.
#[derive(Clone, Debug)]
pub struct CohortListing {
    pub group_name: Option<String>,
    pub users: Vec<UserRecord>,
}

impl CohortListing {
    /// Interpret a listing payload. A missing or non-array `users` field is an
    /// empty list; every record is tagged with the cohort's action.
    pub fn from_value(payload: &Value, cohort: Cohort) -> Self {
        let group_name = payload
            .get("group_name")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let action = cohort.action();
        let users = payload
            .get("users")
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().map(|u| UserRecord::from_value(u, action)).collect())
            .unwrap_or_default();
        CohortListing { group_name, users }
    }

    pub fn title(&self, cohort: Cohort) -> String {
        self.group_name
            .clone()
            .unwrap_or_else(|| cohort.default_title().to_string())
    }
}

/// Load one cohort's user listing.
pub async fn list_cohort(api: &ApiClient, cohort: Cohort) -> Result<CohortListing, ApiError> {
    let payload = api.get(cohort.endpoint()).await?;
    Ok(CohortListing::from_value(&payload, cohort))
}
