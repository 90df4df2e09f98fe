use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::common::{ActivityLogId, ContactId, PageRequest, UserId};
use crate::kernel::StoreError;

const MAX_DETAILS_LEN: usize = 500;

/// What a log entry records having happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityAction {
    Add,
    Edit,
    Delete,
}

impl std::fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActivityAction::Add => write!(f, "add"),
            ActivityAction::Edit => write!(f, "edit"),
            ActivityAction::Delete => write!(f, "delete"),
        }
    }
}

impl std::str::FromStr for ActivityAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(ActivityAction::Add),
            "edit" => Ok(ActivityAction::Edit),
            "delete" => Ok(ActivityAction::Delete),
            _ => Err(anyhow::anyhow!("Invalid action: {}", s)),
        }
    }
}

impl sqlx::Type<sqlx::Postgres> for ActivityAction {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

impl sqlx::Encode<'_, sqlx::Postgres> for ActivityAction {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.to_string(), buf)
    }
}

impl sqlx::Decode<'_, sqlx::Postgres> for ActivityAction {
    fn decode(value: sqlx::postgres::PgValueRef<'_>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        s.parse().map_err(|err: anyhow::Error| err.into())
    }
}

/// One line of a user's audit trail. Append-only; entries are never edited
/// or removed, and they outlive the entity they describe.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogEntry {
    pub id: ActivityLogId,
    pub user_id: UserId,
    pub action: ActivityAction,
    pub entity_type: String,
    pub entity_id: Uuid,
    pub details: String,
    pub created_at: DateTime<Utc>,
}

impl ActivityLogEntry {
    /// Builds an entry describing an action on a contact. Details longer
    /// than 500 chars are truncated.
    pub fn contact(
        user_id: UserId,
        action: ActivityAction,
        contact_id: ContactId,
        details: String,
    ) -> Self {
        let details = if details.chars().count() > MAX_DETAILS_LEN {
            details.chars().take(MAX_DETAILS_LEN).collect()
        } else {
            details
        };
        Self {
            id: ActivityLogId::new(),
            user_id,
            action,
            entity_type: "contact".to_string(),
            entity_id: contact_id.into_uuid(),
            details,
            created_at: Utc::now(),
        }
    }

    pub async fn insert(entry: ActivityLogEntry, pool: &PgPool) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO activity_log (
                id, user_id, action, entity_type, entity_id, details, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(entry.id)
        .bind(entry.user_id)
        .bind(entry.action)
        .bind(entry.entity_type)
        .bind(entry.entity_id)
        .bind(entry.details)
        .bind(entry.created_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Lists one user's entries, newest first, with the total count.
    pub async fn list_for_user(
        user: UserId,
        page: &PageRequest,
        pool: &PgPool,
    ) -> Result<(Vec<Self>, i64), StoreError> {
        let entries = sqlx::query_as::<_, Self>(
            r#"
            SELECT *
            FROM activity_log
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM activity_log WHERE user_id = $1")
                .bind(user)
                .fetch_one(pool)
                .await?;

        Ok((entries, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_entry_carries_entity_reference() {
        let user = UserId::new();
        let contact = ContactId::new();

        let entry = ActivityLogEntry::contact(
            user,
            ActivityAction::Add,
            contact,
            "Added contact: Bob".to_string(),
        );

        assert_eq!(entry.user_id, user);
        assert_eq!(entry.entity_id, contact.into_uuid());
        assert_eq!(entry.entity_type, "contact");
    }

    #[test]
    fn test_details_truncated_to_limit() {
        let entry = ActivityLogEntry::contact(
            UserId::new(),
            ActivityAction::Edit,
            ContactId::new(),
            "x".repeat(600),
        );
        assert_eq!(entry.details.chars().count(), 500);
    }

    #[test]
    fn test_action_serializes_lowercase() {
        let json = serde_json::to_string(&ActivityAction::Delete).unwrap();
        assert_eq!(json, "\"delete\"");
        assert_eq!(ActivityAction::Edit.to_string(), "edit");
    }
}
