use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::preferences::repo::UserPreferences;

/// Request body for saving chat preferences. Every field is optional.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePreferencesRequest {
    pub chat_name: Option<String>,
    pub occupation: Option<String>,
    pub traits: Option<String>,
    pub additional_info: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesResponse {
    pub chat_name: Option<String>,
    pub occupation: Option<String>,
    pub traits: Option<String>,
    pub additional_info: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<UserPreferences> for PreferencesResponse {
    fn from(p: UserPreferences) -> Self {
        Self {
            chat_name: p.chat_name,
            occupation: p.occupation,
            traits: p.traits,
            additional_info: p.additional_info,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveStatus {
    Success,
    Failed,
}

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub status: SaveStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_request_accepts_partial_camel_case_body() {
        let req: SavePreferencesRequest =
            serde_json::from_str(r#"{"chatName":"Bee","additionalInfo":"likes rust"}"#).unwrap();
        assert_eq!(req.chat_name.as_deref(), Some("Bee"));
        assert_eq!(req.additional_info.as_deref(), Some("likes rust"));
        assert!(req.occupation.is_none());
        assert!(req.traits.is_none());
    }

    #[test]
    fn save_status_serializes_to_snake_case() {
        assert_eq!(
            serde_json::to_string(&SaveStatus::Success).unwrap(),
            "\"success\""
        );
        assert_eq!(
            serde_json::to_string(&SaveStatus::Failed).unwrap(),
            "\"failed\""
        );
    }
}
