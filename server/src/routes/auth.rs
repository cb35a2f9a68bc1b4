use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use lakbay_shared::{
    ApiMessage, LoginRequest, RegisterRequest, SessionResponse, normalize_email,
    validate_registration,
};
use tracing::{info, warn};

use crate::error::AppError;
use crate::password::{hash_password, verify_password};
use crate::session::{
    clear_session_cookie, new_session_token, session_cookie, session_token, token_digest,
};
use crate::state::AppState;
use crate::store::{NewUser, StoreError};

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiMessage>), AppError> {
    if let Err(e) = validate_registration(&request) {
        state.observability.record_registration_rejection();
        return Err(e.into());
    }

    let email = normalize_email(&request.email);
    if request.is_admin {
        warn!(%email, "ignoring is_admin on self-registration");
    }

    let password_hash = hash_password(request.password, state.auth.bcrypt_cost).await?;
    let user = match state
        .store
        .create_user(NewUser {
            email,
            display_name: request.display_name.trim().to_string(),
            password_hash,
            is_admin: false,
        })
        .await
    {
        Ok(user) => user,
        Err(StoreError::DuplicateEmail) => {
            state.observability.record_registration_rejection();
            return Err(AppError::EmailTaken);
        }
        Err(e) => return Err(e.into()),
    };

    state.observability.record_registration();
    info!(user_id = user.id, "account registered");
    Ok((
        StatusCode::CREATED,
        Json(ApiMessage {
            message: "success".to_string(),
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, AppError> {
    let email = normalize_email(&request.email);
    let user = state.store.find_user_by_email(&email).await?;
    let stored_hash = user.as_ref().map(|user| user.password_hash.clone());
    let verified = verify_password(request.password, stored_hash).await?;

    let Some(user) = user.filter(|_| verified) else {
        state.observability.record_login_failure();
        return Err(AppError::InvalidCredentials);
    };

    let token = new_session_token();
    let expires_at = Utc::now() + state.auth.session_ttl;
    state
        .store
        .create_session(&token_digest(&token), user.id, expires_at)
        .await?;

    state.observability.record_login();
    info!(user_id = user.id, "signed in");
    let cookie = session_cookie(&token, state.auth.session_ttl, state.auth.cookie_secure);
    Ok(([(header::SET_COOKIE, cookie)], Json(user.session_user())).into_response())
}

pub async fn session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let session = match session_token(&headers) {
        Some(token) => {
            state
                .store
                .session_user(&token_digest(&token), Utc::now())
                .await?
        }
        None => None,
    };
    Ok((
        [(header::CACHE_CONTROL, "no-store")],
        Json(SessionResponse { session }),
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    if let Some(token) = session_token(&headers) {
        state.store.delete_session(&token_digest(&token)).await?;
        state.observability.record_logout();
    }
    Ok((
        [(header::SET_COOKIE, clear_session_cookie(state.auth.cookie_secure))],
        Json(ApiMessage {
            message: "signed out".to_string(),
        }),
    ))
}
