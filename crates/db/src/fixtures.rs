use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;
use voicequote_core::{DEFAULT_CLIENT_NAME, DEFAULT_COMPANY_NAME, DEFAULT_EMAIL};

use crate::DbPool;

/// Inserts the sentinel default pricing record if it does not exist
/// yet. Returns whether a row was created. Idempotent: an existing
/// sentinel (and whatever price an operator has set on it) is left
/// alone.
pub async fn ensure_default_pricing(
    pool: &DbPool,
    cost_per_minute: Decimal,
    now: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO client_pricing ( \
             id, client_name, company_name, email, phone, website, minutes, \
             cost_per_minute, created_at, updated_at \
         ) VALUES (?, ?, ?, ?, NULL, NULL, 0, ?, ?, ?) \
         ON CONFLICT (client_name, company_name, email) DO NOTHING",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(DEFAULT_CLIENT_NAME)
    .bind(DEFAULT_COMPANY_NAME)
    .bind(DEFAULT_EMAIL)
    .bind(cost_per_minute.to_string())
    .bind(now.to_rfc3339())
    .bind(now.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Deterministic demo prospects for local development and smoke
/// checks. Fixed ids so repeated seeding never duplicates rows.
const DEMO_PROSPECTS: &[(&str, &str, &str, &str, i64, &str)] = &[
    (
        "5f9c2f60-0001-4a7e-9d5e-000000000001",
        "Avery Quinn",
        "Northwind Outreach",
        "avery@northwind.example",
        3_000,
        "0.05",
    ),
    (
        "5f9c2f60-0002-4a7e-9d5e-000000000002",
        "Rowan Ellis",
        "Beacon Support Co",
        "rowan@beaconsupport.example",
        12_000,
        "0.05",
    ),
    (
        "5f9c2f60-0003-4a7e-9d5e-000000000003",
        "Sam Okafor",
        "Brightline Clinics",
        "sam@brightline.example",
        800,
        "0.08",
    ),
];

pub struct DemoDataset;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedResult {
    pub prospects_seeded: usize,
}

impl DemoDataset {
    pub async fn load(pool: &DbPool, now: DateTime<Utc>) -> Result<SeedResult, sqlx::Error> {
        let mut seeded = 0;
        for (id, client_name, company_name, email, minutes, cost_per_minute) in DEMO_PROSPECTS {
            let result = sqlx::query(
                "INSERT INTO client_pricing ( \
                     id, client_name, company_name, email, phone, website, minutes, \
                     cost_per_minute, created_at, updated_at \
                 ) VALUES (?, ?, ?, ?, NULL, NULL, ?, ?, ?, ?) \
                 ON CONFLICT (client_name, company_name, email) DO NOTHING",
            )
            .bind(id)
            .bind(client_name)
            .bind(company_name)
            .bind(email)
            .bind(minutes)
            .bind(cost_per_minute)
            .bind(now.to_rfc3339())
            .bind(now.to_rfc3339())
            .execute(pool)
            .await?;
            seeded += usize::try_from(result.rows_affected()).unwrap_or(0);
        }

        Ok(SeedResult { prospects_seeded: seeded })
    }

    /// Verifies the demo rows are present, for smoke checks.
    pub async fn verify(pool: &DbPool) -> Result<bool, sqlx::Error> {
        let ids: Vec<String> =
            DEMO_PROSPECTS.iter().map(|(id, ..)| format!("'{id}'")).collect();
        let query = format!(
            "SELECT COUNT(*) FROM client_pricing WHERE id IN ({})",
            ids.join(", ")
        );
        let count: i64 = sqlx::query_scalar(&query).fetch_one(pool).await?;
        Ok(count == DEMO_PROSPECTS.len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use voicequote_core::workflows::PricingStore;

    use super::{ensure_default_pricing, DemoDataset};
    use crate::{connect_with_settings, migrations, SqlPricingStore};

    #[tokio::test]
    async fn sentinel_seed_is_idempotent_and_preserves_operator_changes() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30)
            .await
            .expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        let now = Utc.with_ymd_and_hms(2026, 8, 6, 9, 0, 0).unwrap();

        let created = ensure_default_pricing(&pool, Decimal::new(5, 2), now).await.expect("seed");
        assert!(created);

        let store = SqlPricingStore::new(pool.clone());
        store.set_default_price(Decimal::new(9, 2), now).await.expect("operator change");

        let created_again =
            ensure_default_pricing(&pool, Decimal::new(5, 2), now).await.expect("reseed");
        assert!(!created_again, "existing sentinel must not be replaced");
        assert_eq!(
            store.get_default().await.expect("sentinel").cost_per_minute,
            Decimal::new(9, 2),
            "reseeding must not clobber the operator's price"
        );

        pool.close().await;
    }

    #[tokio::test]
    async fn demo_dataset_loads_once_and_verifies() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30)
            .await
            .expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        let now = Utc.with_ymd_and_hms(2026, 8, 6, 9, 0, 0).unwrap();

        let first = DemoDataset::load(&pool, now).await.expect("first load");
        assert_eq!(first.prospects_seeded, 3);
        assert!(DemoDataset::verify(&pool).await.expect("verify"));

        let second = DemoDataset::load(&pool, now).await.expect("second load");
        assert_eq!(second.prospects_seeded, 0, "demo seed is idempotent");

        pool.close().await;
    }
}
