use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    errors::{AppError, DbResultExt},
    models::{
        medical_record::{CreatorSnapshot, MedicalRecord, MedicalRecordFilter, NewMedicalRecord},
        patient::Patient,
    },
    repositories::{patients::PatientRow, MedicalRecordRepository},
};

const RECORD_SELECT: &str = "SELECT r.symptoms, r.medications, r.created_by_user_id, \
     r.created_by_nip, r.created_by_name, r.created_at, \
     p.identity_number, p.phone_number, p.name, p.birth_date, p.gender, \
     p.identity_card_scan_img, p.created_at AS patient_created_at \
     FROM medical_records r JOIN patients p ON p.identity_number = r.identity_number";

#[derive(Debug, sqlx::FromRow)]
struct RecordRow {
    symptoms: String,
    medications: String,
    created_by_user_id: Uuid,
    created_by_nip: String,
    created_by_name: String,
    created_at: DateTime<Utc>,

    identity_number: i64,
    phone_number: String,
    name: String,
    birth_date: DateTime<Utc>,
    gender: String,
    identity_card_scan_img: String,
    patient_created_at: DateTime<Utc>,
}

impl TryFrom<RecordRow> for MedicalRecord {
    type Error = AppError;

    fn try_from(row: RecordRow) -> Result<Self, Self::Error> {
        let patient = Patient::try_from(PatientRow {
            identity_number: row.identity_number,
            phone_number: row.phone_number,
            name: row.name,
            birth_date: row.birth_date,
            gender: row.gender,
            identity_card_scan_img: row.identity_card_scan_img,
            created_at: row.patient_created_at,
        })?;

        Ok(MedicalRecord {
            patient,
            symptoms: row.symptoms,
            medications: row.medications,
            created_by: CreatorSnapshot {
                nip: row.created_by_nip,
                name: row.created_by_name,
                user_id: row.created_by_user_id,
            },
            created_at: row.created_at,
        })
    }
}

#[derive(Clone)]
pub struct PgMedicalRecordRepository {
    pool: PgPool,
}

impl PgMedicalRecordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MedicalRecordRepository for PgMedicalRecordRepository {
    async fn create(&self, record: &NewMedicalRecord) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO medical_records (identity_number, symptoms, medications, \
             created_by_user_id, created_by_nip, created_by_name) VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(record.identity_number)
        .bind(&record.symptoms)
        .bind(&record.medications)
        .bind(record.created_by.user_id)
        .bind(&record.created_by.nip)
        .bind(&record.created_by.name)
        .execute(&self.pool)
        .await
        .db_context("failed to create medical record")?;
        Ok(())
    }

    async fn list(&self, filter: &MedicalRecordFilter) -> Result<Vec<MedicalRecord>, AppError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(RECORD_SELECT);
        let mut sep = " WHERE ";

        if let Some(n) = filter.identity_number {
            qb.push(sep).push("r.identity_number = ").push_bind(n);
            sep = " AND ";
        }
        if let Some(nip) = &filter.created_by_nip {
            qb.push(sep).push("r.created_by_nip = ").push_bind(nip.as_str());
            sep = " AND ";
        }
        if let Some(user_id) = filter.created_by_user_id {
            qb.push(sep).push("r.created_by_user_id = ").push_bind(user_id);
        }

        qb.push(" ORDER BY r.created_at ")
            .push(filter.order.as_sql())
            .push(" LIMIT ")
            .push_bind(filter.page.limit)
            .push(" OFFSET ")
            .push_bind(filter.page.offset);

        qb.build_query_as::<RecordRow>()
            .fetch_all(&self.pool)
            .await
            .db_context("failed to get medical records")?
            .into_iter()
            .map(MedicalRecord::try_from)
            .collect()
    }
}
