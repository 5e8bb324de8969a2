//! Postgres-backed user store.
//!
//! Users live in `users`; membership edges in `family_members` (one row per
//! direction); dependents in `dependents`. Reads hydrate all three.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use super::models::{Dependent, ProfileUpdate, Relationship, Role, User};
use crate::common::{DependentId, StoreError, UserId};
use crate::kernel::BaseUserStore;

#[derive(sqlx::FromRow, Debug)]
struct UserRow {
    id: UserId,
    email: String,
    password_hash: String,
    first_name: String,
    last_name: String,
    profile_picture: String,
    role: String,
    family_code: Option<String>,
    is_email_verified: bool,
    last_login: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Debug)]
struct MemberRow {
    user_id: UserId,
    member_id: UserId,
}

#[derive(sqlx::FromRow, Debug)]
struct DependentRow {
    id: DependentId,
    user_id: UserId,
    name: String,
    birth_date: Option<NaiveDate>,
    profile_picture: Option<String>,
    relationship: String,
}

impl TryFrom<DependentRow> for Dependent {
    type Error = StoreError;

    fn try_from(row: DependentRow) -> Result<Self, StoreError> {
        Ok(Dependent {
            id: row.id,
            name: row.name,
            birth_date: row.birth_date,
            profile_picture: row.profile_picture,
            relationship: row.relationship.parse::<Relationship>()?,
        })
    }
}

const USER_COLUMNS: &str = "id, email, password_hash, first_name, last_name, profile_picture, \
     role, family_code, is_email_verified, last_login, created_at, updated_at";

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Attach membership edges and dependents to a batch of user rows.
    async fn hydrate(&self, rows: Vec<UserRow>) -> Result<Vec<User>, StoreError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<UserId> = rows.iter().map(|r| r.id).collect();

        let edges = sqlx::query_as::<_, MemberRow>(
            "SELECT user_id, member_id
             FROM family_members
             WHERE user_id = ANY($1)
             ORDER BY added_at, member_id",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let dependents = sqlx::query_as::<_, DependentRow>(
            "SELECT id, user_id, name, birth_date, profile_picture, relationship
             FROM dependents
             WHERE user_id = ANY($1)
             ORDER BY created_at, id",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut members_by_user: HashMap<UserId, Vec<UserId>> = HashMap::new();
        for edge in edges {
            members_by_user
                .entry(edge.user_id)
                .or_default()
                .push(edge.member_id);
        }

        let mut dependents_by_user: HashMap<UserId, Vec<Dependent>> = HashMap::new();
        for row in dependents {
            let owner = row.user_id;
            dependents_by_user
                .entry(owner)
                .or_default()
                .push(Dependent::try_from(row)?);
        }

        rows.into_iter()
            .map(|row| {
                let role = row.role.parse::<Role>()?;
                Ok(User {
                    family_members: members_by_user.remove(&row.id).unwrap_or_default(),
                    dependents: dependents_by_user.remove(&row.id).unwrap_or_default(),
                    id: row.id,
                    email: row.email,
                    password_hash: row.password_hash,
                    first_name: row.first_name,
                    last_name: row.last_name,
                    profile_picture: row.profile_picture,
                    role,
                    family_code: row.family_code,
                    is_email_verified: row.is_email_verified,
                    last_login: row.last_login,
                    created_at: row.created_at,
                    updated_at: row.updated_at,
                })
            })
            .collect()
    }

    async fn find_one_where(
        &self,
        predicate: &str,
        value: &str,
    ) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE {} = $1",
            USER_COLUMNS, predicate
        ))
        .bind(value)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl BaseUserStore for PgUserStore {
    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO users (
                id, email, password_hash, first_name, last_name, profile_picture,
                role, family_code, is_email_verified, last_login, created_at, updated_at
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.profile_picture)
        .bind(user.role.to_string())
        .bind(&user.family_code)
        .bind(user.is_email_verified)
        .bind(user.last_login)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&mut *tx)
        .await?;

        for dependent in &user.dependents {
            insert_dependent_row(&mut tx, user.id, dependent).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.find_one_where("email", email).await
    }

    async fn find_by_family_code(&self, code: &str) -> Result<Option<User>, StoreError> {
        self.find_one_where("family_code", code).await
    }

    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = ANY($1)",
            USER_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_id: HashMap<UserId, User> = self
            .hydrate(rows)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    async fn family_code_exists(&self, code: &str) -> Result<bool, StoreError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE family_code = $1)")
                .bind(code)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn add_family_member(
        &self,
        user_id: UserId,
        member_id: UserId,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            "INSERT INTO family_members (user_id, member_id)
             VALUES ($1, $2)
             ON CONFLICT (user_id, member_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(member_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            sqlx::query("UPDATE users SET updated_at = NOW() WHERE id = $1")
                .bind(user_id)
                .execute(&self.pool)
                .await?;
        }
        Ok(())
    }

    async fn repair_family_links(&self, dry_run: bool) -> Result<u64, StoreError> {
        if dry_run {
            let count: i64 = sqlx::query_scalar(
                "SELECT COUNT(*)
                 FROM family_members fm
                 WHERE NOT EXISTS (
                     SELECT 1 FROM family_members r
                     WHERE r.user_id = fm.member_id AND r.member_id = fm.user_id
                 )",
            )
            .fetch_one(&self.pool)
            .await?;
            return Ok(count.max(0) as u64);
        }

        let result = sqlx::query(
            "INSERT INTO family_members (user_id, member_id)
             SELECT fm.member_id, fm.user_id
             FROM family_members fm
             WHERE NOT EXISTS (
                 SELECT 1 FROM family_members r
                 WHERE r.user_id = fm.member_id AND r.member_id = fm.user_id
             )
             ON CONFLICT (user_id, member_id) DO NOTHING",
        )
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn update_profile(
        &self,
        id: UserId,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, StoreError> {
        let updated = sqlx::query(
            "UPDATE users
             SET first_name = COALESCE($2, first_name),
                 last_name = COALESCE($3, last_name),
                 profile_picture = COALESCE($4, profile_picture),
                 updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(&update.profile_picture)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    async fn record_login(&self, id: UserId, at: DateTime<Utc>) -> Result<(), StoreError> {
        sqlx::query("UPDATE users SET last_login = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_dependent(
        &self,
        user_id: UserId,
        dependent: &Dependent,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        insert_dependent_row(&mut tx, user_id, dependent).await?;
        sqlx::query("UPDATE users SET updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn update_dependent(
        &self,
        user_id: UserId,
        dependent: &Dependent,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE dependents
             SET name = $3, birth_date = $4, profile_picture = $5, relationship = $6
             WHERE id = $1 AND user_id = $2",
        )
        .bind(dependent.id)
        .bind(user_id)
        .bind(&dependent.name)
        .bind(dependent.birth_date)
        .bind(&dependent.profile_picture)
        .bind(dependent.relationship.to_string())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_dependent(
        &self,
        user_id: UserId,
        dependent_id: DependentId,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM dependents WHERE id = $1 AND user_id = $2")
            .bind(dependent_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

async fn insert_dependent_row(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    user_id: UserId,
    dependent: &Dependent,
) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO dependents (id, user_id, name, birth_date, profile_picture, relationship)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(dependent.id)
    .bind(user_id)
    .bind(&dependent.name)
    .bind(dependent.birth_date)
    .bind(&dependent.profile_picture)
    .bind(dependent.relationship.to_string())
    .execute(&mut **tx)
    .await?;
    Ok(())
}
