use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::{
    error::AppError,
    models::{Capability, User},
    state::AppState,
};

/// A request whose `Authorization: Bearer <token>` resolved to a live session.
///
/// Adding this to a handler's arguments makes the route require authentication;
/// rejection is `401 UNAUTHENTICATED`.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub token: String,
    pub user: User,
}

impl CurrentUser {
    pub fn id(&self) -> i64 {
        self.user.id
    }

    pub fn require(&self, capability: Capability) -> Result<(), AppError> {
        if self.user.role.can(capability) {
            Ok(())
        } else {
            tracing::debug!(user.id = self.user.id, role = self.user.role.as_str(), ?capability, "capability denied");
            Err(AppError::Forbidden("You do not have permission to perform this action.".to_string()))
        }
    }
}

/// An authenticated caller whose role may manage the catalog.
///
/// Unauthenticated requests get 401, authenticated non-admins get 403.
#[derive(Debug, Clone)]
pub struct CatalogAdmin(pub CurrentUser);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Unauthenticated("Authentication credentials were not provided.".to_string()))?
            .to_string();

        let user_id = state
            .identity
            .resolve_token(&token)
            .await?
            .ok_or_else(|| AppError::Unauthenticated("Token is invalid or expired".to_string()))?;
        let user = state
            .identity
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthenticated("Token is invalid or expired".to_string()))?;

        Ok(Self { token, user })
    }
}

impl FromRequestParts<AppState> for CatalogAdmin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let current = CurrentUser::from_request_parts(parts, state).await?;
        current.require(Capability::ManageCatalog)?;
        Ok(Self(current))
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}
