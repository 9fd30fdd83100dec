#[cfg(test)]
mod tests {
    use std::io::Write;

    use crate::config::{self, AppConfig};

    #[test]
    fn test_default_config() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.database.url, "sqlite://data/bookledger.db");
        assert_eq!(cfg.auth.token_ttl_seconds, 86400);
        assert_eq!(cfg.auth.bcrypt_cost, 12);
        assert_eq!(cfg.admin.username, "admin");
        assert_eq!(cfg.lending.default_loan_days, 14);
        assert!(config::validate(&cfg).is_ok());
    }

    fn assert_rejected(mutate: impl FnOnce(&mut AppConfig), expected: &str) {
        let mut cfg = AppConfig::default();
        mutate(&mut cfg);
        let err = config::validate(&cfg).unwrap_err().to_string();
        assert!(err.contains(expected), "{} should mention {}", err, expected);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert_rejected(|c| c.server.port = 0, "invalid server.port");
        assert_rejected(|c| c.database.url = "  ".to_string(), "database.url");
        assert_rejected(|c| c.auth.token_ttl_seconds = 0, "auth.token_ttl_seconds");
        assert_rejected(|c| c.auth.bcrypt_cost = 3, "auth.bcrypt_cost");
        assert_rejected(|c| c.admin.username = String::new(), "admin.username");
        assert_rejected(|c| c.lending.default_loan_days = 0, "lending.default_loan_days");
        assert_rejected(|c| c.lending.default_loan_days = 400, "lending.default_loan_days");
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("override.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[server]\nport = 9191\n\n[lending]\ndefault_loan_days = 21").unwrap();

        // config resolves the extension itself
        let stem = dir.path().join("override");
        let cfg = config::from_sources(stem.to_str(), false).unwrap();
        assert_eq!(cfg.server.port, 9191);
        assert_eq!(cfg.lending.default_loan_days, 21);
        assert_eq!(cfg.server.host, "127.0.0.1");
    }

    #[test]
    fn test_invalid_file_value_fails_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[auth]\nbcrypt_cost = 2\n").unwrap();

        let stem = dir.path().join("broken");
        let err = config::from_sources(stem.to_str(), false).unwrap_err().to_string();
        assert!(err.contains("auth.bcrypt_cost"));
    }

    #[test]
    fn test_env_overrides_file() {
        // Only test touching BOOKLEDGER__* variables
        std::env::set_var("BOOKLEDGER__LENDING__DEFAULT_LOAN_DAYS", "30");
        let cfg = config::from_sources(None, true);
        std::env::remove_var("BOOKLEDGER__LENDING__DEFAULT_LOAN_DAYS");
        assert_eq!(cfg.unwrap().lending.default_loan_days, 30);
    }

    #[test]
    fn test_ensure_sqlite_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let url = format!("sqlite://{}/ledger.db?mode=rwc", nested.display());

        config::ensure_sqlite_parent_dir(&url).unwrap();
        assert!(nested.is_dir());

        config::ensure_sqlite_parent_dir("sqlite::memory:").unwrap();
        config::ensure_sqlite_parent_dir("postgres://localhost/db").unwrap();
    }
}
