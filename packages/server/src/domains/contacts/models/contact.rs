use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::validate::is_valid_email;
use crate::common::{AppError, ContactId, PageRequest, UserId};
use crate::kernel::StoreError;

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_PHONE_LEN: usize = 20;
pub const MAX_COMPANY_LEN: usize = 100;
pub const MAX_NOTES_LEN: usize = 1000;

const STATUS_MESSAGE: &str = "Status must be one of: Lead, Prospect, Customer";

/// Pipeline stage of a contact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactStatus {
    #[default]
    Lead,
    Prospect,
    Customer,
}

impl std::fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContactStatus::Lead => write!(f, "Lead"),
            ContactStatus::Prospect => write!(f, "Prospect"),
            ContactStatus::Customer => write!(f, "Customer"),
        }
    }
}

impl std::str::FromStr for ContactStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Lead" => Ok(ContactStatus::Lead),
            "Prospect" => Ok(ContactStatus::Prospect),
            "Customer" => Ok(ContactStatus::Customer),
            _ => Err(anyhow::anyhow!("Invalid status: {}", s)),
        }
    }
}

// Stored as TEXT; delegate the sqlx traits to String.

impl sqlx::Type<sqlx::Postgres> for ContactStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

impl sqlx::Encode<'_, sqlx::Postgres> for ContactStatus {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.to_string(), buf)
    }
}

impl sqlx::Decode<'_, sqlx::Postgres> for ContactStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'_>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        s.parse().map_err(|err: anyhow::Error| err.into())
    }
}

/// A contact in one user's personal list.
///
/// `owner_user_id` is set at creation and never changes; every query in this
/// module filters on it.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: ContactId,
    pub owner_user_id: UserId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub status: ContactStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw creation fields as they arrive over the wire.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// Creation fields that passed validation.
#[derive(Debug, Clone)]
pub struct ContactDraft {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub status: ContactStatus,
    pub notes: Option<String>,
}

/// Raw update fields as they arrive over the wire.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// Validated update fields. `None` leaves the stored value unchanged.
#[derive(Debug, Clone, Default)]
pub struct ContactChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub status: Option<ContactStatus>,
    pub notes: Option<String>,
}

/// Narrowing criteria for contact listings.
#[derive(Debug, Clone, Default)]
pub struct ContactFilter {
    pub status: Option<ContactStatus>,
    /// Case-insensitive substring matched against name or email.
    pub search: Option<String>,
}

impl ContactInput {
    /// Validates creation fields, collecting every problem before failing.
    pub fn validate(self) -> Result<ContactDraft, AppError> {
        let name = self.name.as_deref().unwrap_or("").trim().to_string();
        let email = self
            .email
            .as_deref()
            .unwrap_or("")
            .trim()
            .to_lowercase();
        let phone = clean_optional(self.phone);
        let company = clean_optional(self.company);
        let notes = clean_optional(self.notes);
        let status_raw = clean_optional(self.status);

        let mut problems = Vec::new();
        if name.is_empty() {
            problems.push("Name required".to_string());
        } else if name.chars().count() > MAX_NAME_LEN {
            problems.push("Name too long".to_string());
        }
        if !is_valid_email(&email) {
            problems.push("Valid email required".to_string());
        }
        if let Some(phone) = &phone {
            if phone.chars().count() > MAX_PHONE_LEN {
                problems.push("Phone too long".to_string());
            }
        }
        if let Some(company) = &company {
            if company.chars().count() > MAX_COMPANY_LEN {
                problems.push("Company name too long".to_string());
            }
        }
        if let Some(notes) = &notes {
            if notes.chars().count() > MAX_NOTES_LEN {
                problems.push("Notes too long".to_string());
            }
        }
        let status = match status_raw {
            None => ContactStatus::default(),
            Some(raw) => match raw.parse() {
                Ok(status) => status,
                Err(_) => {
                    problems.push(STATUS_MESSAGE.to_string());
                    ContactStatus::default()
                }
            },
        };

        if !problems.is_empty() {
            return Err(AppError::Validation(problems));
        }
        Ok(ContactDraft {
            name,
            email,
            phone,
            company,
            status,
            notes,
        })
    }
}

impl ContactPatch {
    /// Validates update fields. Only fields present in the patch are checked;
    /// absent or blank fields leave the stored value alone, except that a
    /// blank name or email is rejected rather than silently dropped.
    pub fn validate(self) -> Result<ContactChanges, AppError> {
        let mut problems = Vec::new();
        let mut changes = ContactChanges::default();

        if let Some(raw) = self.name {
            let name = raw.trim().to_string();
            if name.is_empty() {
                problems.push("Name required".to_string());
            } else if name.chars().count() > MAX_NAME_LEN {
                problems.push("Name too long".to_string());
            } else {
                changes.name = Some(name);
            }
        }
        if let Some(raw) = self.email {
            let email = raw.trim().to_lowercase();
            if !is_valid_email(&email) {
                problems.push("Valid email required".to_string());
            } else {
                changes.email = Some(email);
            }
        }
        if let Some(phone) = clean_optional(self.phone) {
            if phone.chars().count() > MAX_PHONE_LEN {
                problems.push("Phone too long".to_string());
            } else {
                changes.phone = Some(phone);
            }
        }
        if let Some(company) = clean_optional(self.company) {
            if company.chars().count() > MAX_COMPANY_LEN {
                problems.push("Company name too long".to_string());
            } else {
                changes.company = Some(company);
            }
        }
        if let Some(raw) = clean_optional(self.status) {
            match raw.parse() {
                Ok(status) => changes.status = Some(status),
                Err(_) => problems.push(STATUS_MESSAGE.to_string()),
            }
        }
        if let Some(notes) = clean_optional(self.notes) {
            if notes.chars().count() > MAX_NOTES_LEN {
                problems.push("Notes too long".to_string());
            } else {
                changes.notes = Some(notes);
            }
        }

        if !problems.is_empty() {
            return Err(AppError::Validation(problems));
        }
        Ok(changes)
    }
}

impl ContactChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.company.is_none()
            && self.status.is_none()
            && self.notes.is_none()
    }
}

impl Contact {
    pub fn new(owner: UserId, draft: ContactDraft) -> Self {
        let now = Utc::now();
        Self {
            id: ContactId::new(),
            owner_user_id: owner,
            name: draft.name,
            email: draft.email,
            phone: draft.phone,
            company: draft.company,
            status: draft.status,
            notes: draft.notes,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies validated changes in place and bumps `updated_at`.
    pub fn apply(&mut self, changes: ContactChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(email) = changes.email {
            self.email = email;
        }
        if let Some(phone) = changes.phone {
            self.phone = Some(phone);
        }
        if let Some(company) = changes.company {
            self.company = Some(company);
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
        if let Some(notes) = changes.notes {
            self.notes = Some(notes);
        }
        self.updated_at = Utc::now();
    }

    pub async fn insert(contact: Contact, pool: &PgPool) -> Result<Self, StoreError> {
        let contact = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO contacts (
                id, owner_user_id, name, email, phone, company, status, notes,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(contact.id)
        .bind(contact.owner_user_id)
        .bind(contact.name)
        .bind(contact.email)
        .bind(contact.phone)
        .bind(contact.company)
        .bind(contact.status)
        .bind(contact.notes)
        .bind(contact.created_at)
        .bind(contact.updated_at)
        .fetch_one(pool)
        .await?;
        Ok(contact)
    }

    pub async fn find_for_owner(
        owner: UserId,
        id: ContactId,
        pool: &PgPool,
    ) -> Result<Option<Self>, StoreError> {
        let contact = sqlx::query_as::<_, Self>(
            "SELECT * FROM contacts WHERE id = $1 AND owner_user_id = $2",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(pool)
        .await?;
        Ok(contact)
    }

    pub async fn update_for_owner(
        owner: UserId,
        id: ContactId,
        changes: ContactChanges,
        pool: &PgPool,
    ) -> Result<Option<Self>, StoreError> {
        let contact = sqlx::query_as::<_, Self>(
            r#"
            UPDATE contacts
            SET name = COALESCE($3, name),
                email = COALESCE($4, email),
                phone = COALESCE($5, phone),
                company = COALESCE($6, company),
                status = COALESCE($7, status),
                notes = COALESCE($8, notes),
                updated_at = now()
            WHERE id = $1 AND owner_user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(changes.name)
        .bind(changes.email)
        .bind(changes.phone)
        .bind(changes.company)
        .bind(changes.status.map(|s| s.to_string()))
        .bind(changes.notes)
        .fetch_optional(pool)
        .await?;
        Ok(contact)
    }

    pub async fn delete_for_owner(
        owner: UserId,
        id: ContactId,
        pool: &PgPool,
    ) -> Result<Option<Self>, StoreError> {
        let contact = sqlx::query_as::<_, Self>(
            "DELETE FROM contacts WHERE id = $1 AND owner_user_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(pool)
        .await?;
        Ok(contact)
    }

    /// Lists one owner's contacts, newest change first, with the total count
    /// for pagination.
    pub async fn search(
        owner: UserId,
        filter: &ContactFilter,
        page: &PageRequest,
        pool: &PgPool,
    ) -> Result<(Vec<Self>, i64), StoreError> {
        let status = filter.status.map(|s| s.to_string());
        let pattern = filter
            .search
            .as_deref()
            .map(|s| format!("%{}%", escape_like(s)));

        let contacts = sqlx::query_as::<_, Self>(
            r#"
            SELECT *
            FROM contacts
            WHERE owner_user_id = $1
              AND ($2::text IS NULL OR status = $2)
              AND ($3::text IS NULL OR name ILIKE $3 OR email ILIKE $3)
            ORDER BY updated_at DESC, id DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(owner)
        .bind(&status)
        .bind(&pattern)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM contacts
            WHERE owner_user_id = $1
              AND ($2::text IS NULL OR status = $2)
              AND ($3::text IS NULL OR name ILIKE $3 OR email ILIKE $3)
            "#,
        )
        .bind(owner)
        .bind(&status)
        .bind(&pattern)
        .fetch_one(pool)
        .await?;

        Ok((contacts, total))
    }
}

/// Escapes LIKE metacharacters so user input matches literally.
fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

fn clean_optional(value: Option<String>) -> Option<String> {
    let value = value?.trim().to_string();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
