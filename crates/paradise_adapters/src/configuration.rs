use std::path::PathBuf;

use config::{Config, Environment, File};
use directories::ProjectDirs;
use paradise_core::config::{Settings, DEFAULT_ENDPOINT, DEFAULT_TOKEN_EXPIRY_DAYS};

pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "paradise", "paradise")
}

pub fn get_configuration_with_paths(
    current_dir_path: Option<PathBuf>,
    system_config_dir_path: Option<PathBuf>,
) -> Result<Settings, config::ConfigError> {
    let config_directory = current_dir_path.unwrap_or_else(|| {
        std::env::current_dir()
            .map(|p| p.join("config"))
            .unwrap_or_else(|_| PathBuf::from("config"))
    });

    let system_config_dir = if let Some(path) = system_config_dir_path {
        path
    } else {
        project_dirs()
            .map(|d| d.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("config"))
    };

    let settings = Config::builder()
        .set_default("graphql.endpoint", DEFAULT_ENDPOINT)?
        .set_default("graphql.timeout_secs", 30)?
        .set_default("graphql.connect_timeout_secs", 10)?
        .set_default("storage.backend", "file")?
        .set_default("storage.token_key", "apollo-token")?
        .set_default("storage.refresh_token_key", "apollo-token-refresh")?
        .set_default("storage.expiry_days", i64::from(DEFAULT_TOKEN_EXPIRY_DAYS))?
        .set_default("cache.max_entries", 500)?
        .set_default("log_level", "info")?
        .add_source(File::from(system_config_dir.join("config.toml")).required(false))
        .add_source(File::from(config_directory.join("config.toml")).required(false))
        .add_source(Environment::with_prefix("PARADISE").separator("__"))
        .build()?;

    settings.try_deserialize::<Settings>()
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    get_configuration_with_paths(None, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use paradise_core::config::StorageBackend;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::tempdir;

    fn clear_env() {
        for (key, _) in std::env::vars() {
            if key.starts_with("PARADISE__") {
                std::env::remove_var(&key);
            }
        }
    }

    fn nowhere() -> Option<PathBuf> {
        Some(PathBuf::from("/nonexistent"))
    }

    #[serial]
    #[test]
    fn test_get_configuration_defaults() {
        clear_env();

        let settings = get_configuration_with_paths(nowhere(), nowhere()).unwrap();

        assert_eq!(settings.graphql.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(settings.graphql.timeout_secs, 30);
        assert_eq!(settings.storage.backend, StorageBackend::File);
        assert_eq!(settings.storage.token_key, "apollo-token");
        assert_eq!(settings.storage.refresh_token_key, "apollo-token-refresh");
        assert_eq!(settings.storage.expiry_days, DEFAULT_TOKEN_EXPIRY_DAYS);
        assert_eq!(settings.cache.max_entries, 500);
        assert_eq!(
            settings.auth.message_markers,
            vec!["Unauthenticated", "The token has expired"]
        );
        assert_eq!(settings.auth.login_route, "/login");
        assert!(settings.routes.protected.contains(&"/account".to_string()));
        assert_eq!(settings.log_level, "info");
    }

    #[serial]
    #[test]
    fn test_get_configuration_file_override() {
        clear_env();

        let dir = tempdir().unwrap();
        let config_content = r#"
        log_level = "debug"

        [graphql]
        endpoint = "https://api.paradise.example/graphql"

        [storage]
        backend = "keyring"

        [auth]
        message_markers = ["Session revoked"]
        reason_markers = []
        login_route = "/sign-in"
        home_route = "/"
        "#;

        let mut file = std::fs::File::create(dir.path().join("config.toml")).unwrap();
        file.write_all(config_content.as_bytes()).unwrap();

        let settings =
            get_configuration_with_paths(Some(dir.path().to_path_buf()), nowhere()).unwrap();

        assert_eq!(settings.graphql.endpoint, "https://api.paradise.example/graphql");
        assert_eq!(settings.graphql.timeout_secs, 30);
        assert_eq!(settings.storage.backend, StorageBackend::Keyring);
        assert_eq!(settings.auth.message_markers, vec!["Session revoked"]);
        assert!(settings.auth.reason_markers.is_empty());
        assert_eq!(settings.auth.login_route, "/sign-in");
        assert_eq!(settings.log_level, "debug");
    }

    #[serial]
    #[test]
    fn test_get_configuration_env_override() {
        clear_env();

        std::env::set_var("PARADISE__GRAPHQL__ENDPOINT", "http://staging:4000/graphql");
        std::env::set_var("PARADISE__STORAGE__BACKEND", "memory");
        std::env::set_var("PARADISE__LOG_LEVEL", "trace");

        let settings = get_configuration_with_paths(nowhere(), nowhere()).unwrap();

        assert_eq!(settings.graphql.endpoint, "http://staging:4000/graphql");
        assert_eq!(settings.storage.backend, StorageBackend::Memory);
        assert_eq!(settings.log_level, "trace");

        clear_env();
    }

    #[serial]
    #[test]
    fn test_get_configuration_precedence_env_over_file() {
        clear_env();

        let dir = tempdir().unwrap();
        let config_content = r#"
        log_level = "debug"

        [cache]
        max_entries = 10
        "#;

        let mut file = std::fs::File::create(dir.path().join("config.toml")).unwrap();
        file.write_all(config_content.as_bytes()).unwrap();

        std::env::set_var("PARADISE__CACHE__MAX_ENTRIES", "25");
        std::env::set_var("PARADISE__LOG_LEVEL", "trace");

        let settings =
            get_configuration_with_paths(Some(dir.path().to_path_buf()), nowhere()).unwrap();

        assert_eq!(settings.cache.max_entries, 25);
        assert_eq!(settings.log_level, "trace");

        clear_env();
    }
}
