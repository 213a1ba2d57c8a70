use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request body for sign-in.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// Request body for an authenticated password change.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Request body for a reset-link request.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Request body for consuming a reset token.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email: String,
    pub token: String,
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginStatus {
    Success,
    Failed,
    InvalidData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegisterStatus {
    Success,
    UserExists,
    Failed,
    InvalidData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangePasswordStatus {
    Success,
    Failed,
    WrongPassword,
    InvalidData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ForgotPasswordStatus {
    Success,
    Failed,
    InvalidData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetPasswordStatus {
    Success,
    Failed,
    InvalidData,
    InvalidToken,
    TokenExpired,
}

/// Public part of the user returned alongside a fresh session.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
}

/// Response for sign-in: the session token is present on success only.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub status: LoginStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<PublicUser>,
}

impl LoginResponse {
    pub fn status(status: LoginStatus) -> Self {
        Self {
            status,
            token: None,
            user: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub status: RegisterStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<PublicUser>,
}

impl RegisterResponse {
    pub fn status(status: RegisterStatus) -> Self {
        Self {
            status,
            token: None,
            user: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusResponse<S> {
    pub status: S,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_serialize_to_snake_case() {
        assert_eq!(
            serde_json::to_string(&RegisterStatus::UserExists).unwrap(),
            "\"user_exists\""
        );
        assert_eq!(
            serde_json::to_string(&ChangePasswordStatus::WrongPassword).unwrap(),
            "\"wrong_password\""
        );
        assert_eq!(
            serde_json::to_string(&ResetPasswordStatus::TokenExpired).unwrap(),
            "\"token_expired\""
        );
        assert_eq!(
            serde_json::to_string(&ResetPasswordStatus::InvalidToken).unwrap(),
            "\"invalid_token\""
        );
        assert_eq!(
            serde_json::to_string(&LoginStatus::InvalidData).unwrap(),
            "\"invalid_data\""
        );
    }

    #[test]
    fn failed_login_omits_token_and_user() {
        let json = serde_json::to_string(&LoginResponse::status(LoginStatus::Failed)).unwrap();
        assert_eq!(json, r#"{"status":"failed"}"#);
    }

    #[test]
    fn change_password_request_uses_camel_case_fields() {
        let req: ChangePasswordRequest = serde_json::from_str(
            r#"{"currentPassword":"a","newPassword":"b","confirmPassword":"c"}"#,
        )
        .unwrap();
        assert_eq!(req.current_password, "a");
        assert_eq!(req.new_password, "b");
        assert_eq!(req.confirm_password, "c");
    }
}
