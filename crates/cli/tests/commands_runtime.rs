use std::env;
use std::sync::{Mutex, OnceLock};

use serde_json::Value;
use voicequote_cli::commands::{migrate, seed, start};

#[test]
fn migrate_returns_success_with_valid_env() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    let url = format!("sqlite://{}/voicequote-migrate.db?mode=rwc", dir.path().display());

    with_env(&[("VOICEQUOTE_DATABASE_URL", &url)], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 0, "expected successful migrate run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "ok");
    });
}

#[test]
fn migrate_returns_config_failure_for_invalid_email_setup() {
    // Enabling email without an api key fails config validation.
    with_env(&[("VOICEQUOTE_EMAIL_ENABLED", "true")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn start_reports_pending_migrations_on_a_fresh_database() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    let url = format!("sqlite://{}/voicequote-fresh.db?mode=rwc", dir.path().display());

    with_env(&[("VOICEQUOTE_DATABASE_URL", &url)], || {
        let result = start::run();
        assert_eq!(result.exit_code, 5, "fresh database has no applied migrations");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "start");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "migration");
    });
}

#[test]
fn start_passes_preflight_after_migrate_on_a_durable_database() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    let url = format!("sqlite://{}/voicequote-test.db?mode=rwc", dir.path().display());

    with_env(&[("VOICEQUOTE_DATABASE_URL", &url)], || {
        let migrated = migrate::run();
        assert_eq!(migrated.exit_code, 0, "migrations should apply to the file database");

        let result = start::run();
        assert_eq!(result.exit_code, 0, "preflight should pass once migrated");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "start");
        assert_eq!(payload["status"], "ok");
    });
}

#[test]
fn seed_creates_default_pricing_and_demo_prospects() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    let url = format!("sqlite://{}/voicequote-seed-fresh.db?mode=rwc", dir.path().display());

    with_env(&[("VOICEQUOTE_DATABASE_URL", &url)], || {
        let result = seed::run();
        assert_eq!(result.exit_code, 0, "expected seed success");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "seed");
        assert_eq!(payload["status"], "ok");

        let message = payload["message"].as_str().unwrap_or("");
        assert!(message.contains("default pricing created"));
        assert!(message.contains("3 demo prospect(s) seeded"));
    });
}

#[test]
fn seed_is_idempotent_on_a_durable_database() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    let url = format!("sqlite://{}/voicequote-seed.db?mode=rwc", dir.path().display());

    with_env(&[("VOICEQUOTE_DATABASE_URL", &url)], || {
        let first = seed::run();
        assert_eq!(first.exit_code, 0, "expected first seed invocation success");
        let first_payload = parse_payload(&first.output);
        assert_eq!(first_payload["status"], "ok");

        let second = seed::run();
        assert_eq!(second.exit_code, 0, "expected second seed invocation success");
        let second_payload = parse_payload(&second.output);
        assert_eq!(second_payload["status"], "ok");

        let message = second_payload["message"].as_str().unwrap_or("");
        assert!(message.contains("already present"), "sentinel must not be re-created");
        assert!(message.contains("0 demo prospect(s) seeded"), "demo rows must not duplicate");
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "VOICEQUOTE_DATABASE_URL",
        "VOICEQUOTE_DATABASE_MAX_CONNECTIONS",
        "VOICEQUOTE_DATABASE_TIMEOUT_SECS",
        "VOICEQUOTE_EMAIL_ENABLED",
        "VOICEQUOTE_EMAIL_API_KEY",
        "VOICEQUOTE_EMAIL_API_BASE_URL",
        "VOICEQUOTE_EMAIL_FROM_ADDRESS",
        "VOICEQUOTE_SERVER_BIND_ADDRESS",
        "VOICEQUOTE_SERVER_PORT",
        "VOICEQUOTE_SERVER_HEALTH_CHECK_PORT",
        "VOICEQUOTE_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "VOICEQUOTE_SERVER_ADMIN_TOKEN",
        "VOICEQUOTE_PRICING_DEFAULT_COST_PER_MINUTE",
        "VOICEQUOTE_LOGGING_LEVEL",
        "VOICEQUOTE_LOGGING_FORMAT",
        "VOICEQUOTE_LOG_LEVEL",
        "VOICEQUOTE_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
