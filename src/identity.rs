//! Accounts, credentials and bearer sessions.
//!
//! The lending core only needs three things from here: who holds a token, what
//! role they have, and an admin account at startup. [`IdentityProvider`] is that
//! seam; [`SqliteIdentityProvider`] backs it with the same database as the ledger.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    config::{AdminConfig, AuthConfig},
    error::{validation, AppError, AppResult},
    models::{Role, User},
};

const MAX_USERNAME_CHARS: usize = 150;
const MIN_PASSWORD_CHARS: usize = 8;
const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// A freshly issued bearer token.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: User,
    /// Unix seconds.
    pub expires_at: i64,
    pub ttl_seconds: i64,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Creates an account with role `user`.
    async fn register(&self, username: &str, password: &str, email: &str) -> AppResult<User>;

    /// Verifies credentials and issues a session.
    async fn authenticate(&self, username: &str, password: &str) -> AppResult<Session>;

    /// The owner of an unexpired token.
    async fn resolve_token(&self, token: &str) -> AppResult<Option<i64>>;

    async fn find_user(&self, user_id: i64) -> AppResult<Option<User>>;

    /// Swaps `token` for a new one with a fresh lifetime.
    async fn refresh(&self, token: &str) -> AppResult<Session>;

    async fn revoke(&self, token: &str) -> AppResult<()>;

    /// Replaces the password and revokes every session of the user.
    async fn change_password(&self, user_id: i64, old_password: &str, new_password: &str) -> AppResult<()>;

    /// Creates the admin account unless `username` already exists. Returns whether it was created.
    async fn ensure_admin(&self, username: &str, password: &str, email: &str) -> AppResult<bool>;
}

#[derive(Clone)]
pub struct SqliteIdentityProvider {
    db: SqlitePool,
    token_ttl_seconds: i64,
    bcrypt_cost: u32,
}

impl SqliteIdentityProvider {
    pub fn new(db: SqlitePool, auth: &AuthConfig) -> Self {
        Self { db, token_ttl_seconds: auth.token_ttl_seconds, bcrypt_cost: auth.bcrypt_cost }
    }

    async fn issue_session(&self, user: User) -> AppResult<Session> {
        let token = Uuid::new_v4().simple().to_string();
        let expires_at = chrono::Utc::now().timestamp() + self.token_ttl_seconds;
        sqlx::query("INSERT INTO sessions (token, user_id, expires_at) VALUES (?1, ?2, ?3)")
            .bind(&token)
            .bind(user.id)
            .bind(expires_at)
            .execute(&self.db)
            .await?;
        Ok(Session { token, user, expires_at, ttl_seconds: self.token_ttl_seconds })
    }

    async fn password_hash(&self, username: &str) -> AppResult<Option<(i64, String)>> {
        let row: Option<(i64, String)> =
            sqlx::query_as("SELECT id, password_hash FROM users WHERE username = ?1")
                .bind(username)
                .fetch_optional(&self.db)
                .await?;
        Ok(row)
    }
}

#[async_trait]
impl IdentityProvider for SqliteIdentityProvider {
    async fn register(&self, username: &str, password: &str, email: &str) -> AppResult<User> {
        validate_username(username)?;
        validate_password(password, "password")?;

        let hash = hash_password(password.to_string(), self.bcrypt_cost).await?;
        let result = sqlx::query(
            r#"INSERT INTO users (username, email, password_hash, role, is_verified)
               VALUES (?1, ?2, ?3, ?4, 0)
               ON CONFLICT(username) DO NOTHING"#,
        )
        .bind(username)
        .bind(email)
        .bind(&hash)
        .bind(Role::User)
        .execute(&self.db)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::Conflict("A user with that username already exists.".to_string()));
        }

        let id = result.last_insert_rowid();
        tracing::info!(user.id = id, username, "user registered");
        Ok(User { id, username: username.to_string(), email: email.to_string(), role: Role::User, is_verified: false })
    }

    async fn authenticate(&self, username: &str, password: &str) -> AppResult<Session> {
        let (user_id, hash) = self
            .password_hash(username)
            .await?
            .ok_or_else(|| AppError::Unauthenticated(INVALID_CREDENTIALS.to_string()))?;
        if !verify_password(password.to_string(), hash).await? {
            tracing::warn!(username, "failed login");
            return Err(AppError::Unauthenticated(INVALID_CREDENTIALS.to_string()));
        }
        let user = self
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthenticated(INVALID_CREDENTIALS.to_string()))?;
        self.issue_session(user).await
    }

    async fn resolve_token(&self, token: &str) -> AppResult<Option<i64>> {
        let user_id: Option<i64> =
            sqlx::query_scalar("SELECT user_id FROM sessions WHERE token = ?1 AND expires_at > ?2")
                .bind(token)
                .bind(chrono::Utc::now().timestamp())
                .fetch_optional(&self.db)
                .await?;
        Ok(user_id)
    }

    async fn find_user(&self, user_id: i64) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, role, is_verified FROM users WHERE id = ?1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn refresh(&self, token: &str) -> AppResult<Session> {
        let user_id = self
            .resolve_token(token)
            .await?
            .ok_or_else(|| AppError::Unauthenticated("Token is invalid or expired".to_string()))?;
        let user = self
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthenticated("Token is invalid or expired".to_string()))?;
        self.revoke(token).await?;
        self.issue_session(user).await
    }

    async fn revoke(&self, token: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM sessions WHERE token = ?1").bind(token).execute(&self.db).await?;
        Ok(())
    }

    async fn change_password(&self, user_id: i64, old_password: &str, new_password: &str) -> AppResult<()> {
        validate_password(new_password, "new_password")?;
        let hash: String = sqlx::query_scalar("SELECT password_hash FROM users WHERE id = ?1")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::Unauthenticated(INVALID_CREDENTIALS.to_string()))?;
        if !verify_password(old_password.to_string(), hash).await? {
            return Err(AppError::Unauthenticated("Old password is incorrect".to_string()));
        }

        let new_hash = hash_password(new_password.to_string(), self.bcrypt_cost).await?;
        let mut tx = self.db.begin().await?;
        sqlx::query("UPDATE users SET password_hash = ?1 WHERE id = ?2")
            .bind(&new_hash)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM sessions WHERE user_id = ?1").bind(user_id).execute(&mut *tx).await?;
        tx.commit().await?;
        tracing::info!(user.id = user_id, "password changed, sessions revoked");
        Ok(())
    }

    async fn ensure_admin(&self, username: &str, password: &str, email: &str) -> AppResult<bool> {
        if self.password_hash(username).await?.is_some() {
            return Ok(false);
        }
        let hash = hash_password(password.to_string(), self.bcrypt_cost).await?;
        let created = sqlx::query(
            r#"INSERT INTO users (username, email, password_hash, role, is_verified)
               VALUES (?1, ?2, ?3, ?4, 1)
               ON CONFLICT(username) DO NOTHING"#,
        )
        .bind(username)
        .bind(email)
        .bind(&hash)
        .bind(Role::Admin)
        .execute(&self.db)
        .await?
        .rows_affected()
            == 1;
        Ok(created)
    }
}

/// Startup step: make sure the configured admin account exists.
pub async fn bootstrap_admin(identity: &dyn IdentityProvider, admin: &AdminConfig) -> anyhow::Result<()> {
    let created = identity
        .ensure_admin(&admin.username, &admin.password, &admin.email)
        .await
        .map_err(|e| anyhow::anyhow!("admin bootstrap failed: {}", e))?;
    if created {
        tracing::info!(username = %admin.username, "admin user created");
    } else {
        tracing::debug!(username = %admin.username, "admin user already present");
    }
    Ok(())
}

fn validate_username(username: &str) -> AppResult<()> {
    validation::validate_text(username, "username", MAX_USERNAME_CHARS)?;
    if !username.chars().all(|c| c.is_alphanumeric() || "@.+-_".contains(c)) {
        return Err(AppError::validation(
            "username",
            "may contain only letters, digits and @/./+/-/_",
        ));
    }
    Ok(())
}

fn validate_password(password: &str, field: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(AppError::validation(
            field,
            format!("must be at least {} characters", MIN_PASSWORD_CHARS),
        ));
    }
    Ok(())
}

async fn hash_password(password: String, cost: u32) -> AppResult<String> {
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
    Ok(hash)
}

async fn verify_password(password: String, hash: String) -> AppResult<bool> {
    let ok = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??;
    Ok(ok)
}
