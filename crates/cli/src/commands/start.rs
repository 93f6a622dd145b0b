use crate::commands::CommandResult;
use voicequote_core::config::{AppConfig, LoadOptions};
use voicequote_db::{connect_with_settings, migrations};

/// Preflight for the server: validates config, reaches the database,
/// and confirms the schema is current. Run before handing the process
/// over to a supervisor.
pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "start",
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
                "start",
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

        let known = migrations::known_migration_count();
        let applied = migrations::applied_migration_count(&pool).await;

        pool.close().await;
        Ok::<(usize, i64), (&'static str, String, u8)>((known, applied))
    });

    match result {
        Ok((known, applied)) if applied as usize >= known => CommandResult::success(
            "start",
            format!("preflight passed: database reachable, {applied} migration(s) applied"),
        ),
        Ok((known, applied)) => CommandResult::failure(
            "start",
            "migration",
            format!("schema is behind: {applied}/{known} migration(s) applied; run `voicequote migrate`"),
            5,
        ),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("start", error_class, message, exit_code)
        }
    }
}
