use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{sqlite::SqliteRow, Row};
use uuid::Uuid;
use voicequote_core::workflows::{PricingStore, StoreError};
use voicequote_core::{
    PricingRecord, ProspectId, DEFAULT_CLIENT_NAME, DEFAULT_COMPANY_NAME, DEFAULT_EMAIL,
};

use crate::DbPool;

/// SQLite-backed pricing store.
///
/// Prices are persisted as TEXT and cast back on read so the decimal
/// value round-trips exactly; timestamps are RFC 3339 strings, which
/// keeps `ORDER BY created_at` chronological.
pub struct SqlPricingStore {
    pool: DbPool,
}

const RECORD_COLUMNS: &str = "id, client_name, company_name, email, phone, website, minutes, \
     CAST(cost_per_minute AS TEXT) AS cost_per_minute_text, created_at, updated_at";

impl SqlPricingStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn record_from_row(row: &SqliteRow) -> Result<PricingRecord, StoreError> {
        let id_text: String = row.try_get("id").map_err(Self::db_error)?;
        let minutes_raw: i64 = row.try_get("minutes").map_err(Self::db_error)?;
        let minutes = u32::try_from(minutes_raw).map_err(|_| {
            StoreError::Backend(format!("minutes `{minutes_raw}` on row {id_text} exceeds u32"))
        })?;
        let cost_per_minute_text: String =
            row.try_get("cost_per_minute_text").map_err(Self::db_error)?;
        let created_at_text: String = row.try_get("created_at").map_err(Self::db_error)?;
        let updated_at_text: String = row.try_get("updated_at").map_err(Self::db_error)?;

        Ok(PricingRecord {
            id: ProspectId(Self::parse_uuid(&id_text)?),
            client_name: row.try_get("client_name").map_err(Self::db_error)?,
            company_name: row.try_get("company_name").map_err(Self::db_error)?,
            email: row.try_get("email").map_err(Self::db_error)?,
            phone: row.try_get("phone").map_err(Self::db_error)?,
            website: row.try_get("website").map_err(Self::db_error)?,
            minutes,
            cost_per_minute: Self::parse_decimal("cost_per_minute", &cost_per_minute_text)?,
            created_at: Self::parse_timestamp("created_at", &created_at_text)?,
            updated_at: Self::parse_timestamp("updated_at", &updated_at_text)?,
        })
    }

    fn parse_uuid(value: &str) -> Result<Uuid, StoreError> {
        Uuid::parse_str(value)
            .map_err(|error| StoreError::Backend(format!("invalid record id `{value}`: {error}")))
    }

    fn parse_decimal(field: &str, value: &str) -> Result<Decimal, StoreError> {
        Decimal::from_str(value).map_err(|error| {
            StoreError::Backend(format!("invalid decimal value for {field}: {error}"))
        })
    }

    fn parse_timestamp(field: &str, value: &str) -> Result<DateTime<Utc>, StoreError> {
        DateTime::parse_from_rfc3339(value)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(|error| {
                StoreError::Backend(format!("invalid timestamp for {field}: {error}"))
            })
    }

    fn db_error(error: sqlx::Error) -> StoreError {
        StoreError::Backend(format!("database error: {error}"))
    }
}

#[async_trait]
impl PricingStore for SqlPricingStore {
    async fn get_default(&self) -> Result<PricingRecord, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {RECORD_COLUMNS} FROM client_pricing \
             WHERE client_name = ? AND company_name = ? AND email = ?"
        ))
        .bind(DEFAULT_CLIENT_NAME)
        .bind(DEFAULT_COMPANY_NAME)
        .bind(DEFAULT_EMAIL)
        .fetch_optional(&self.pool)
        .await
        .map_err(Self::db_error)?;

        let row = row.ok_or_else(|| StoreError::NotFound("default pricing record".to_string()))?;
        Self::record_from_row(&row)
    }

    async fn set_default_price(
        &self,
        price: Decimal,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE client_pricing SET cost_per_minute = ?, updated_at = ? \
             WHERE client_name = ? AND company_name = ? AND email = ?",
        )
        .bind(price.to_string())
        .bind(updated_at.to_rfc3339())
        .bind(DEFAULT_CLIENT_NAME)
        .bind(DEFAULT_COMPANY_NAME)
        .bind(DEFAULT_EMAIL)
        .execute(&self.pool)
        .await
        .map_err(Self::db_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("default pricing record".to_string()));
        }
        Ok(())
    }

    async fn get_by_id(&self, id: &ProspectId) -> Result<PricingRecord, StoreError> {
        let row =
            sqlx::query(&format!("SELECT {RECORD_COLUMNS} FROM client_pricing WHERE id = ?"))
                .bind(id.0.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(Self::db_error)?;

        let row = row.ok_or_else(|| StoreError::NotFound(format!("prospect {id}")))?;
        Self::record_from_row(&row)
    }

    async fn update_price(
        &self,
        id: &ProspectId,
        price: Decimal,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE client_pricing SET cost_per_minute = ?, updated_at = ? WHERE id = ?",
        )
        .bind(price.to_string())
        .bind(updated_at.to_rfc3339())
        .bind(id.0.to_string())
        .execute(&self.pool)
        .await
        .map_err(Self::db_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("prospect {id}")));
        }
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<PricingRecord>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {RECORD_COLUMNS} FROM client_pricing ORDER BY created_at DESC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(Self::db_error)?;

        rows.iter().map(Self::record_from_row).collect()
    }

    async fn upsert_submission(
        &self,
        record: PricingRecord,
    ) -> Result<PricingRecord, StoreError> {
        sqlx::query(
            "INSERT INTO client_pricing ( \
                 id, client_name, company_name, email, phone, website, minutes, \
                 cost_per_minute, created_at, updated_at \
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT (client_name, company_name, email) DO UPDATE SET \
                 phone = excluded.phone, \
                 website = excluded.website, \
                 minutes = excluded.minutes, \
                 cost_per_minute = excluded.cost_per_minute, \
                 updated_at = excluded.updated_at",
        )
        .bind(record.id.0.to_string())
        .bind(&record.client_name)
        .bind(&record.company_name)
        .bind(&record.email)
        .bind(&record.phone)
        .bind(&record.website)
        .bind(i64::from(record.minutes))
        .bind(record.cost_per_minute.to_string())
        .bind(record.created_at.to_rfc3339())
        .bind(record.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(Self::db_error)?;

        // On conflict the original row id survives; re-read by the
        // identity composite to return what is actually stored.
        let row = sqlx::query(&format!(
            "SELECT {RECORD_COLUMNS} FROM client_pricing \
             WHERE client_name = ? AND company_name = ? AND email = ?"
        ))
        .bind(&record.client_name)
        .bind(&record.company_name)
        .bind(&record.email)
        .fetch_one(&self.pool)
        .await
        .map_err(Self::db_error)?;

        Self::record_from_row(&row)
    }
}
