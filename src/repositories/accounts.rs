use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    errors::{AppError, DbResultExt},
    models::{
        account::{Account, AccountFilter},
        listing::escape_like,
    },
    repositories::AccountRepository,
};

const ACCOUNT_COLUMNS: &str = "id, nip, name, role, password, access, identity_card_scan_img, \
                               refresh_token, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    nip: String,
    name: String,
    role: String,
    password: Option<String>,
    access: bool,
    identity_card_scan_img: Option<String>,
    refresh_token: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<AccountRow> for Account {
    type Error = AppError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        Ok(Account {
            role: row.role.parse().map_err(AppError::Internal)?,
            id: row.id,
            nip: row.nip,
            name: row.name,
            password_hash: row.password,
            access: row.access,
            identity_card_scan_img: row.identity_card_scan_img,
            refresh_token_hash: row.refresh_token,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Clone)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    async fn find_by_nip(&self, nip: &str) -> Result<Option<Account>, AppError> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE nip = $1");
        sqlx::query_as::<_, AccountRow>(&sql)
            .bind(nip)
            .fetch_optional(&self.pool)
            .await
            .db_context("failed to get user")?
            .map(Account::try_from)
            .transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AppError> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, AccountRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .db_context("failed to get user")?
            .map(Account::try_from)
            .transpose()
    }

    async fn create(&self, account: &Account) -> Result<(), AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .db_context("failed to begin transaction")?;

        let taken: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE nip = $1)")
            .bind(&account.nip)
            .fetch_one(&mut *tx)
            .await
            .db_context("failed to get existing user")?;
        if taken {
            return Err(AppError::Conflict("user already exists".into()));
        }

        sqlx::query(
            "INSERT INTO users (id, nip, name, role, password, access, identity_card_scan_img, \
             refresh_token, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(account.id)
        .bind(&account.nip)
        .bind(&account.name)
        .bind(account.role.as_str())
        .bind(&account.password_hash)
        .bind(account.access)
        .bind(&account.identity_card_scan_img)
        .bind(&account.refresh_token_hash)
        .bind(account.created_at)
        .execute(&mut *tx)
        .await
        .db_context("failed to create user")?;

        tx.commit().await.db_context("failed to create user")
    }

    async fn update_refresh_token(
        &self,
        id: Uuid,
        refresh_token_hash: &str,
    ) -> Result<u64, AppError> {
        let res = sqlx::query("UPDATE users SET refresh_token = $1 WHERE id = $2")
            .bind(refresh_token_hash)
            .bind(id)
            .execute(&self.pool)
            .await
            .db_context("failed to update refresh token")?;
        Ok(res.rows_affected())
    }

    async fn update_profile(&self, id: Uuid, nip: &str, name: &str) -> Result<u64, AppError> {
        let res = sqlx::query("UPDATE users SET nip = $1, name = $2, updated_at = now() WHERE id = $3")
            .bind(nip)
            .bind(name)
            .bind(id)
            .execute(&self.pool)
            .await
            .db_context("failed to update nurse")?;
        Ok(res.rows_affected())
    }

    async fn grant_access(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<Option<Account>, AppError> {
        let sql = format!(
            "UPDATE users SET password = $1, access = true, updated_at = now() \
             WHERE id = $2 RETURNING {ACCOUNT_COLUMNS}"
        );
        sqlx::query_as::<_, AccountRow>(&sql)
            .bind(password_hash)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .db_context("failed to update nurse")?
            .map(Account::try_from)
            .transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<u64, AppError> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .db_context("failed to delete nurse")?;
        Ok(res.rows_affected())
    }

    async fn list(&self, filter: &AccountFilter) -> Result<Vec<Account>, AppError> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {ACCOUNT_COLUMNS} FROM users"));
        let mut sep = " WHERE ";

        if let Some(id) = filter.user_id {
            qb.push(sep).push("id = ").push_bind(id);
            sep = " AND ";
        }
        if let Some(name) = &filter.name {
            qb.push(sep)
                .push("name ILIKE ")
                .push_bind(format!("%{}%", escape_like(name)));
            sep = " AND ";
        }
        if let Some(nip) = &filter.nip_prefix {
            qb.push(sep)
                .push("nip LIKE ")
                .push_bind(format!("{}%", escape_like(nip)));
            sep = " AND ";
        }
        if let Some(role) = filter.role {
            qb.push(sep).push("role = ").push_bind(role.as_str());
        }

        qb.push(" ORDER BY created_at ")
            .push(filter.order.as_sql())
            .push(" LIMIT ")
            .push_bind(filter.page.limit)
            .push(" OFFSET ")
            .push_bind(filter.page.offset);

        qb.build_query_as::<AccountRow>()
            .fetch_all(&self.pool)
            .await
            .db_context("failed to get users")?
            .into_iter()
            .map(Account::try_from)
            .collect()
    }
}
