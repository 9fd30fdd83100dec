use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    error::AppResult,
    identity::Session,
    middleware::CurrentUser,
    state::AppState,
    types::{ChangePasswordRequest, LoginRequest, SignupRequest, TokenResponse, UserResponse},
};

fn token_response(session: Session) -> TokenResponse {
    TokenResponse {
        access_token: session.token,
        token_type: "Bearer".to_string(),
        expires_in: session.ttl_seconds,
        user_id: session.user.id,
        role: session.user.role,
    }
}

pub async fn signup(State(state): State<AppState>, Json(req): Json<SignupRequest>) -> AppResult<impl IntoResponse> {
    let user = state.identity.register(req.username.trim(), &req.password, req.email.trim()).await?;
    let resp = UserResponse { id: user.id, username: user.username, role: user.role };
    Ok((StatusCode::CREATED, Json(resp)))
}

pub async fn login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> AppResult<impl IntoResponse> {
    let session = state.identity.authenticate(req.username.trim(), &req.password).await?;
    state.metrics.inc_logins();
    Ok(Json(token_response(session)))
}

pub async fn logout(State(state): State<AppState>, caller: CurrentUser) -> AppResult<impl IntoResponse> {
    state.identity.revoke(&caller.token).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn refresh(State(state): State<AppState>, caller: CurrentUser) -> AppResult<impl IntoResponse> {
    let session = state.identity.refresh(&caller.token).await?;
    Ok(Json(token_response(session)))
}

pub async fn change_password(
    State(state): State<AppState>,
    caller: CurrentUser,
    Json(req): Json<ChangePasswordRequest>,
) -> AppResult<impl IntoResponse> {
    state.identity.change_password(caller.id(), &req.old_password, &req.new_password).await?;
    Ok(StatusCode::NO_CONTENT)
}
