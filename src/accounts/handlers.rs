use axum::{
    extract::{FromRef, State},
    routing::post,
    Json, Router,
};
use time::Duration;
use tracing::{error, info, instrument, warn};

use crate::{
    accounts::{
        dto::{
            ChangePasswordRequest, ChangePasswordStatus, ForgotPasswordRequest,
            ForgotPasswordStatus, LoginRequest, LoginResponse, LoginStatus, PublicUser,
            RegisterRequest, RegisterResponse, RegisterStatus, ResetPasswordRequest,
            ResetPasswordStatus, StatusResponse,
        },
        password,
        repo::{TokenCheck, User},
        session::{CurrentUser, SessionKeys, SessionUser},
        validate,
    },
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/password", post(change_password))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password", post(reset_password))
}

/// Sign in with email and password.
///
/// Unknown email, wrong password, and store errors all collapse to
/// `failed` so the response never reveals whether the account exists.
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Json<LoginResponse> {
    let creds = match validate::credentials(&payload.email, &payload.password) {
        Ok(c) => c,
        Err(errors) => {
            warn!(?errors, "login rejected by validation");
            return Json(LoginResponse::status(LoginStatus::InvalidData));
        }
    };

    match try_login(&state, &creds).await {
        Ok(Some((token, user))) => {
            info!(user_id = %user.id, "user logged in");
            Json(LoginResponse {
                status: LoginStatus::Success,
                token: Some(token),
                user: Some(user),
            })
        }
        Ok(None) => {
            warn!("login verification failed");
            Json(LoginResponse::status(LoginStatus::Failed))
        }
        Err(e) => {
            error!(error = %e, "login failed");
            Json(LoginResponse::status(LoginStatus::Failed))
        }
    }
}

async fn try_login(
    state: &AppState,
    creds: &validate::Credentials,
) -> anyhow::Result<Option<(String, PublicUser)>> {
    let Some(user) = User::find_by_email(&state.db, &creds.email).await? else {
        return Ok(None);
    };
    if !password::verify_stored(&creds.password, user.password_hash.as_deref()) {
        return Ok(None);
    }
    let token = SessionKeys::from_ref(state).sign(user.id, &user.email)?;
    Ok(Some((
        token,
        PublicUser {
            id: user.id,
            email: user.email,
        },
    )))
}

/// Create an account and sign in.
#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Json<RegisterResponse> {
    let creds = match validate::credentials(&payload.email, &payload.password) {
        Ok(c) => c,
        Err(errors) => {
            warn!(?errors, "registration rejected by validation");
            return Json(RegisterResponse::status(RegisterStatus::InvalidData));
        }
    };

    match try_register(&state, &creds).await {
        Ok(response) => Json(response),
        Err(e) => {
            error!(error = %e, "registration failed");
            Json(RegisterResponse::status(RegisterStatus::Failed))
        }
    }
}

async fn try_register(
    state: &AppState,
    creds: &validate::Credentials,
) -> anyhow::Result<RegisterResponse> {
    if User::find_by_email(&state.db, &creds.email).await?.is_some() {
        warn!(email = %creds.email, "email already registered");
        return Ok(RegisterResponse::status(RegisterStatus::UserExists));
    }

    let user = User::create(&state.db, &creds.email, &creds.password).await?;

    // Best effort; a mail hiccup must not fail the registration.
    if let Err(e) = state.mailer.send_welcome(&user.email).await {
        warn!(error = %e, "welcome email failed");
    }

    let token = SessionKeys::from_ref(state).sign(user.id, &user.email)?;
    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(RegisterResponse {
        status: RegisterStatus::Success,
        token: Some(token),
        user: Some(PublicUser {
            id: user.id,
            email: user.email,
        }),
    })
}

/// Change the password of the session holder.
#[instrument(skip(state, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> Json<StatusResponse<ChangePasswordStatus>> {
    let change = match validate::password_change(
        &payload.current_password,
        &payload.new_password,
        &payload.confirm_password,
    ) {
        Ok(c) => c,
        Err(errors) => {
            warn!(?errors, "password change rejected by validation");
            return Json(StatusResponse {
                status: ChangePasswordStatus::InvalidData,
            });
        }
    };

    let Some(session) = session else {
        warn!("password change without a session");
        return Json(StatusResponse {
            status: ChangePasswordStatus::Failed,
        });
    };

    let status = match try_change_password(&state, &session, &change).await {
        Ok(status) => status,
        Err(e) => {
            error!(error = %e, "password change failed");
            ChangePasswordStatus::Failed
        }
    };
    Json(StatusResponse { status })
}

async fn try_change_password(
    state: &AppState,
    session: &SessionUser,
    change: &validate::PasswordChange,
) -> anyhow::Result<ChangePasswordStatus> {
    let Some(user) = User::find_by_email(&state.db, &session.email).await? else {
        return Ok(ChangePasswordStatus::Failed);
    };

    if !password::verify_stored(&change.current_password, user.password_hash.as_deref()) {
        warn!(user_id = %user.id, "password change with wrong current password");
        return Ok(ChangePasswordStatus::WrongPassword);
    }

    User::update_password(&state.db, &user.email, &change.new_password).await?;
    info!(user_id = %user.id, "password changed");
    Ok(ChangePasswordStatus::Success)
}

/// Request a password-reset link.
///
/// An unknown email still reports `success` and skips the store and the
/// mailer entirely, so the endpoint cannot be used to enumerate accounts.
#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Json<StatusResponse<ForgotPasswordStatus>> {
    let email = match validate::email_only(&payload.email) {
        Ok(e) => e,
        Err(errors) => {
            warn!(?errors, "reset request rejected by validation");
            return Json(StatusResponse {
                status: ForgotPasswordStatus::InvalidData,
            });
        }
    };

    let status = match try_forgot_password(&state, &email).await {
        Ok(status) => status,
        Err(e) => {
            error!(error = %e, "reset request failed");
            ForgotPasswordStatus::Failed
        }
    };
    Json(StatusResponse { status })
}

async fn try_forgot_password(
    state: &AppState,
    email: &str,
) -> anyhow::Result<ForgotPasswordStatus> {
    let Some(user) = User::find_by_email(&state.db, email).await? else {
        info!(%email, "password reset requested for unknown email");
        return Ok(ForgotPasswordStatus::Success);
    };

    let ttl = Duration::minutes(state.config.reset_token_ttl_minutes);
    let issued = User::create_reset_token(&state.db, &user.email, ttl).await?;

    if let Err(e) = state
        .mailer
        .send_password_reset(&user.email, &issued.token, issued.expires_at)
        .await
    {
        error!(error = %e, user_id = %user.id, "reset email dispatch failed");
        return Ok(ForgotPasswordStatus::Failed);
    }

    info!(user_id = %user.id, "password reset issued");
    Ok(ForgotPasswordStatus::Success)
}

/// Consume a reset token and set a new password.
#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Json<StatusResponse<ResetPasswordStatus>> {
    let reset = match validate::password_reset(
        &payload.email,
        &payload.token,
        &payload.new_password,
        &payload.confirm_password,
    ) {
        Ok(r) => r,
        Err(errors) => {
            warn!(?errors, "password reset rejected by validation");
            return Json(StatusResponse {
                status: ResetPasswordStatus::InvalidData,
            });
        }
    };

    let status = match try_reset_password(&state, &reset).await {
        Ok(status) => status,
        Err(e) => {
            error!(error = %e, "password reset failed");
            ResetPasswordStatus::Failed
        }
    };
    Json(StatusResponse { status })
}

async fn try_reset_password(
    state: &AppState,
    reset: &validate::PasswordReset,
) -> anyhow::Result<ResetPasswordStatus> {
    match User::verify_reset_token(&state.db, &reset.email, &reset.token).await? {
        TokenCheck::Invalid => {
            warn!("password reset with invalid token");
            return Ok(ResetPasswordStatus::InvalidToken);
        }
        TokenCheck::Expired => {
            warn!("password reset with expired token");
            return Ok(ResetPasswordStatus::TokenExpired);
        }
        TokenCheck::Valid => {}
    }

    User::reset_password_with_token(&state.db, &reset.email, &reset.new_password).await?;
    info!(email = %reset.email, "password reset completed");
    Ok(ResetPasswordStatus::Success)
}
