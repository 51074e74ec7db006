use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    errors::{AppError, DbResultExt},
    models::{
        listing::escape_like,
        patient::{Gender, Patient, PatientFilter},
    },
    repositories::PatientRepository,
};

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PatientRow {
    pub identity_number: i64,
    pub phone_number: String,
    pub name: String,
    pub birth_date: DateTime<Utc>,
    pub gender: String,
    pub identity_card_scan_img: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<PatientRow> for Patient {
    type Error = AppError;

    fn try_from(row: PatientRow) -> Result<Self, Self::Error> {
        let gender = Gender::parse(&row.gender)
            .ok_or_else(|| AppError::Internal(format!("unknown gender `{}`", row.gender)))?;
        Ok(Patient {
            identity_number: row.identity_number,
            phone_number: row.phone_number,
            name: row.name,
            birth_date: row.birth_date,
            gender,
            identity_card_scan_img: row.identity_card_scan_img,
            created_at: row.created_at,
        })
    }
}

#[derive(Clone)]
pub struct PgPatientRepository {
    pool: PgPool,
}

impl PgPatientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PatientRepository for PgPatientRepository {
    async fn exists(&self, identity_number: i64) -> Result<bool, AppError> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM patients WHERE identity_number = $1)")
            .bind(identity_number)
            .fetch_one(&self.pool)
            .await
            .db_context("failed to get patient")
    }

    async fn create(&self, patient: &Patient) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO patients (identity_number, phone_number, name, birth_date, gender, \
             identity_card_scan_img, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(patient.identity_number)
        .bind(&patient.phone_number)
        .bind(&patient.name)
        .bind(patient.birth_date)
        .bind(patient.gender.as_str())
        .bind(&patient.identity_card_scan_img)
        .bind(patient.created_at)
        .execute(&self.pool)
        .await
        // unique violation surfaces as Conflict
        .db_context("patient with this identity number")?;
        Ok(())
    }

    async fn list(&self, filter: &PatientFilter) -> Result<Vec<Patient>, AppError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT identity_number, phone_number, name, birth_date, gender, \
             identity_card_scan_img, created_at FROM patients",
        );
        let mut sep = " WHERE ";

        if let Some(n) = filter.identity_number {
            qb.push(sep).push("identity_number = ").push_bind(n);
            sep = " AND ";
        }
        if let Some(name) = &filter.name {
            qb.push(sep)
                .push("name ILIKE ")
                .push_bind(format!("%{}%", escape_like(name)));
            sep = " AND ";
        }
        if let Some(phone) = &filter.phone_prefix {
            qb.push(sep)
                .push("phone_number LIKE ")
                .push_bind(format!("+{}%", escape_like(phone)));
        }

        qb.push(" ORDER BY created_at ")
            .push(filter.order.as_sql())
            .push(" LIMIT ")
            .push_bind(filter.page.limit)
            .push(" OFFSET ")
            .push_bind(filter.page.offset);

        qb.build_query_as::<PatientRow>()
            .fetch_all(&self.pool)
            .await
            .db_context("failed to get patients")?
            .into_iter()
            .map(Patient::try_from)
            .collect()
    }
}
