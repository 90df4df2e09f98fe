use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::common::UserId;
use crate::kernel::StoreError;

/// A registered account.
///
/// Not `Serialize`: responses go through `UserProfile`, which has no
/// password hash field.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a user. The email arrives already normalized
/// (trimmed and lowercased).
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
}

/// Client-facing user fields.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    pub name: String,
}

impl User {
    /// Materialize a user record with a fresh id and timestamps.
    pub fn new(new: NewUser) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            email: new.email,
            password_hash: new.password_hash,
            name: new.name,
            created_at: now,
            updated_at: now,
        }
    }

    /// The outward shape of this account.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
        }
    }

    /// Insert a user row. A duplicate email surfaces as `StoreError::Conflict`.
    pub async fn insert(user: User, pool: &PgPool) -> Result<Self, StoreError> {
        let user = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO users (id, email, password_hash, name, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(pool)
        .await?;
        Ok(user)
    }

    /// Find a user by normalized email.
    pub async fn find_by_email(email: &str, pool: &PgPool) -> Result<Option<Self>, StoreError> {
        let user = sqlx::query_as::<_, Self>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(pool)
            .await?;
        Ok(user)
    }

    /// Find a user by id.
    pub async fn find_by_id(id: UserId, pool: &PgPool) -> Result<Option<Self>, StoreError> {
        let user = sqlx::query_as::<_, Self>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(user)
    }
}
