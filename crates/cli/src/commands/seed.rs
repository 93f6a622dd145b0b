use chrono::Utc;

use crate::commands::CommandResult;
use voicequote_core::config::{AppConfig, LoadOptions};
use voicequote_db::{connect_with_settings, fixtures, migrations};

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "seed",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "seed",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let result = runtime.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;

        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        let now = Utc::now();
        let sentinel_created =
            fixtures::ensure_default_pricing(&pool, config.pricing.default_cost_per_minute, now)
                .await
                .map_err(|error| ("seed", error.to_string(), 6u8))?;
        let demo = fixtures::DemoDataset::load(&pool, now)
            .await
            .map_err(|error| ("seed", error.to_string(), 6u8))?;

        pool.close().await;
        Ok::<(bool, usize), (&'static str, String, u8)>((sentinel_created, demo.prospects_seeded))
    });

    match result {
        Ok((sentinel_created, prospects_seeded)) => CommandResult::success(
            "seed",
            format!(
                "default pricing {}; {prospects_seeded} demo prospect(s) seeded",
                if sentinel_created { "created" } else { "already present" },
            ),
        ),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}
