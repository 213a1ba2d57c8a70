use axum::{
    extract::State,
    routing::{get, put},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    accounts::session::CurrentUser,
    preferences::{
        dto::{PreferencesResponse, SavePreferencesRequest, SaveResponse, SaveStatus},
        repo::{PreferenceFields, UserPreferences},
    },
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/preferences", get(get_preferences))
        .route("/preferences", put(save_preferences))
}

/// The session holder's preferences, or `null` when none exist yet.
/// Without a session the response is also `null`, not an error.
#[instrument(skip(state))]
pub async fn get_preferences(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
) -> Json<Option<PreferencesResponse>> {
    let Some(session) = session else {
        return Json(None);
    };

    match UserPreferences::find_by_user(&state.db, session.id).await {
        Ok(prefs) => Json(prefs.map(PreferencesResponse::from)),
        Err(e) => {
            error!(error = %e, user_id = %session.id, "load preferences failed");
            Json(None)
        }
    }
}

/// Create the preference record on first save, update it afterwards.
#[instrument(skip(state, payload))]
pub async fn save_preferences(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Json(payload): Json<SavePreferencesRequest>,
) -> Json<SaveResponse> {
    let Some(session) = session else {
        warn!("preference save without a session");
        return Json(SaveResponse {
            status: SaveStatus::Failed,
        });
    };

    let fields = PreferenceFields {
        chat_name: payload.chat_name,
        occupation: payload.occupation,
        traits: payload.traits,
        additional_info: payload.additional_info,
    };

    match UserPreferences::upsert(&state.db, session.id, &fields).await {
        Ok(()) => {
            info!(user_id = %session.id, "preferences saved");
            Json(SaveResponse {
                status: SaveStatus::Success,
            })
        }
        Err(e) => {
            error!(error = %e, user_id = %session.id, "save preferences failed");
            Json(SaveResponse {
                status: SaveStatus::Failed,
            })
        }
    }
}
