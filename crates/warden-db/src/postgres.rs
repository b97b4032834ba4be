//! PostgreSQL-backed [`UserStore`].
//!
//! Queries are built at runtime rather than with the `query!` macros so the
//! crate compiles without a live database or an offline query cache.

use std::str::FromStr;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::instrument;
use uuid::Uuid;

use warden_core::StoreError;
use warden_models::{
    NewUser, Role, SignupMethod, User, UserCredentials, VerificationDetails, VerificationKind,
};

use crate::store::UserStore;

#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    role: String,
    signup_method: String,
    is_verified: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            username: row.username,
            email: row.email,
            role: Role::from_str(&row.role).map_err(StoreError::backend)?,
            signup_method: SignupMethod::from_str(&row.signup_method)
                .map_err(StoreError::backend)?,
            is_verified: row.is_verified,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct CredentialsRow {
    id: Uuid,
    password_hash: Option<String>,
}

#[derive(FromRow)]
struct VerificationRow {
    user_id: Uuid,
    kind: String,
    pending_value: String,
    token: String,
    expires_at: DateTime<Utc>,
}

impl VerificationRow {
    fn into_details(self) -> Result<(Uuid, VerificationDetails), StoreError> {
        let kind = VerificationKind::from_str(&self.kind).map_err(StoreError::backend)?;
        Ok((
            self.user_id,
            VerificationDetails {
                kind,
                pending_value: self.pending_value,
                token: self.token,
                expires_at: self.expires_at,
            },
        ))
    }
}

/// Maps unique-constraint violations to [`StoreError::DuplicateKey`] and
/// everything else to a backend error carrying `context`.
fn db_error(err: sqlx::Error, context: &'static str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::DuplicateKey;
        }
    }
    StoreError::backend(anyhow::Error::new(err).context(context))
}

fn expect_row(rows_affected: u64) -> Result<(), StoreError> {
    if rows_affected == 0 {
        Err(StoreError::NotFound)
    } else {
        Ok(())
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    #[instrument(skip(self, user), fields(username = %user.username))]
    async fn add_user(&self, user: NewUser) -> Result<Uuid, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")
            .map_err(StoreError::backend)?;

        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, role, signup_method, is_verified)
            VALUES ($1, $2, LOWER($3), $4, $5, $6)
            "#,
        )
        .bind(id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(user.role.as_str())
        .bind(user.signup_method.as_str())
        .bind(user.is_verified)
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error(e, "Failed to insert user"))?;

        if let Some(password_hash) = &user.password_hash {
            sqlx::query("INSERT INTO user_credentials (user_id, password_hash) VALUES ($1, $2)")
                .bind(id)
                .bind(password_hash)
                .execute(&mut *tx)
                .await
                .map_err(|e| db_error(e, "Failed to insert credentials"))?;
        }

        tx.commit()
            .await
            .context("Failed to commit user creation")
            .map_err(StoreError::backend)?;

        Ok(id)
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, role, signup_method, is_verified, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error(e, "Failed to fetch user"))?;

        row.map(User::try_from).transpose()
    }

    async fn get_user_password_and_id_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, StoreError> {
        let row = sqlx::query_as::<_, CredentialsRow>(
            r#"
            SELECT u.id, c.password_hash
            FROM users u
            LEFT JOIN user_credentials c ON c.user_id = u.id
            WHERE u.email = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error(e, "Failed to fetch credentials by email"))?;

        Ok(row.map(|r| UserCredentials {
            id: r.id,
            password_hash: r.password_hash,
        }))
    }

    async fn get_user_password_and_id_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, StoreError> {
        let row = sqlx::query_as::<_, CredentialsRow>(
            r#"
            SELECT u.id, c.password_hash
            FROM users u
            LEFT JOIN user_credentials c ON c.user_id = u.id
            WHERE u.username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error(e, "Failed to fetch credentials by username"))?;

        Ok(row.map(|r| UserCredentials {
            id: r.id,
            password_hash: r.password_hash,
        }))
    }

    async fn get_user_password_by_id(&self, id: Uuid) -> Result<Option<String>, StoreError> {
        let row = sqlx::query_as::<_, CredentialsRow>(
            r#"
            SELECT u.id, c.password_hash
            FROM users u
            LEFT JOIN user_credentials c ON c.user_id = u.id
            WHERE u.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error(e, "Failed to fetch password hash"))?;

        row.map(|r| r.password_hash).ok_or(StoreError::NotFound)
    }

    async fn set_user_password(&self, id: Uuid, password_hash: &str) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO user_credentials (user_id, password_hash)
            SELECT id, $2 FROM users WHERE id = $1
            ON CONFLICT (user_id) DO UPDATE SET password_hash = EXCLUDED.password_hash
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error(e, "Failed to update password"))?;

        expect_row(result.rows_affected())
    }

    async fn set_user_email(&self, id: Uuid, email: &str) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE users SET email = LOWER($2) WHERE id = $1")
            .bind(id)
            .bind(email)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error(e, "Failed to update email"))?;

        expect_row(result.rows_affected())
    }

    async fn set_username(&self, id: Uuid, username: &str) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE users SET username = $2 WHERE id = $1")
            .bind(id)
            .bind(username)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error(e, "Failed to update username"))?;

        expect_row(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error(e, "Failed to delete user"))?;

        expect_row(result.rows_affected())
    }

    async fn get_is_verified(&self, id: Uuid) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>("SELECT is_verified FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error(e, "Failed to fetch verification flag"))?
            .ok_or(StoreError::NotFound)
    }

    async fn set_is_verified(&self, id: Uuid, verified: bool) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE users SET is_verified = $2 WHERE id = $1")
            .bind(id)
            .bind(verified)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error(e, "Failed to update verification flag"))?;

        expect_row(result.rows_affected())
    }

    async fn get_signup_method(&self, id: Uuid) -> Result<SignupMethod, StoreError> {
        let method = sqlx::query_scalar::<_, String>("SELECT signup_method FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error(e, "Failed to fetch signup method"))?
            .ok_or(StoreError::NotFound)?;

        SignupMethod::from_str(&method).map_err(StoreError::backend)
    }

    async fn set_signup_method(&self, id: Uuid, method: SignupMethod) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE users SET signup_method = $2 WHERE id = $1")
            .bind(id)
            .bind(method.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error(e, "Failed to update signup method"))?;

        expect_row(result.rows_affected())
    }

    async fn get_refresh_token(&self, id: Uuid) -> Result<String, StoreError> {
        sqlx::query_scalar::<_, String>("SELECT refresh_token FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error(e, "Failed to fetch refresh token"))?
            .ok_or(StoreError::NotFound)
    }

    async fn set_refresh_token(&self, id: Uuid, token: &str) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE users SET refresh_token = $2 WHERE id = $1")
            .bind(id)
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error(e, "Failed to update refresh token"))?;

        expect_row(result.rows_affected())
    }

    async fn rotate_refresh_token(
        &self,
        id: Uuid,
        current: &str,
        next: &str,
    ) -> Result<bool, StoreError> {
        if current.is_empty() {
            return Ok(false);
        }

        let result = sqlx::query(
            "UPDATE users SET refresh_token = $3 WHERE id = $1 AND refresh_token = $2",
        )
        .bind(id)
        .bind(current)
        .bind(next)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error(e, "Failed to rotate refresh token"))?;

        Ok(result.rows_affected() == 1)
    }

    async fn set_user_verification_details(
        &self,
        id: Uuid,
        details: &VerificationDetails,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO user_verifications (user_id, kind, pending_value, token, expires_at)
            SELECT id, $2, $3, $4, $5 FROM users WHERE id = $1
            ON CONFLICT (user_id) DO UPDATE
            SET kind = EXCLUDED.kind,
                pending_value = EXCLUDED.pending_value,
                token = EXCLUDED.token,
                expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(id)
        .bind(details.kind.as_str())
        .bind(&details.pending_value)
        .bind(&details.token)
        .bind(details.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error(e, "Failed to store verification details"))?;

        expect_row(result.rows_affected())
    }

    async fn get_user_verification_details(
        &self,
        id: Uuid,
    ) -> Result<Option<VerificationDetails>, StoreError> {
        let row = sqlx::query_as::<_, VerificationRow>(
            r#"
            SELECT user_id, kind, pending_value, token, expires_at
            FROM user_verifications
            WHERE user_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error(e, "Failed to fetch verification details"))?;

        match row {
            Some(row) => Ok(Some(row.into_details()?.1)),
            None if self.get_user(id).await?.is_some() => Ok(None),
            None => Err(StoreError::NotFound),
        }
    }

    async fn get_verification_by_token(
        &self,
        token: &str,
    ) -> Result<Option<(Uuid, VerificationDetails)>, StoreError> {
        let row = sqlx::query_as::<_, VerificationRow>(
            r#"
            SELECT user_id, kind, pending_value, token, expires_at
            FROM user_verifications
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error(e, "Failed to fetch verification by token"))?;

        row.map(VerificationRow::into_details).transpose()
    }

    async fn clear_user_verification_details(
        &self,
        id: Uuid,
        token: Option<&str>,
    ) -> Result<bool, StoreError> {
        let result = match token {
            Some(token) => {
                sqlx::query("DELETE FROM user_verifications WHERE user_id = $1 AND token = $2")
                    .bind(id)
                    .bind(token)
                    .execute(&self.pool)
                    .await
            }
            None => {
                sqlx::query("DELETE FROM user_verifications WHERE user_id = $1")
                    .bind(id)
                    .execute(&self.pool)
                    .await
            }
        }
        .map_err(|e| db_error(e, "Failed to clear verification details"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_login_fingerprint(&self, id: Uuid) -> Result<Option<String>, StoreError> {
        sqlx::query_scalar::<_, Option<String>>(
            "SELECT login_fingerprint FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error(e, "Failed to fetch login fingerprint"))?
        .ok_or(StoreError::NotFound)
    }

    async fn set_login_fingerprint(&self, id: Uuid, fingerprint: &str) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE users SET login_fingerprint = $2 WHERE id = $1")
            .bind(id)
            .bind(fingerprint)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error(e, "Failed to update login fingerprint"))?;

        expect_row(result.rows_affected())
    }

    async fn get_user_image(&self, id: Uuid) -> Result<Option<Vec<u8>>, StoreError> {
        sqlx::query_scalar::<_, Option<Vec<u8>>>("SELECT image FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error(e, "Failed to fetch user image"))?
            .ok_or(StoreError::NotFound)
    }

    async fn set_user_image(&self, id: Uuid, image: &[u8]) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE users SET image = $2 WHERE id = $1")
            .bind(id)
            .bind(image)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error(e, "Failed to update user image"))?;

        expect_row(result.rows_affected())
    }

    async fn user_exists(&self, username: &str) -> Result<bool, StoreError> {
        Ok(self.get_user_id_by_username(username).await?.is_some())
    }

    async fn user_exists_by_email(&self, email: &str) -> Result<bool, StoreError> {
        Ok(self.get_user_id_by_email(email).await?.is_some())
    }

    async fn get_user_id_by_username(&self, username: &str) -> Result<Option<Uuid>, StoreError> {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error(e, "Failed to look up user by username"))
    }

    async fn get_user_id_by_email(&self, email: &str) -> Result<Option<Uuid>, StoreError> {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE email = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error(e, "Failed to look up user by email"))
    }
}
