//! Configuration file management for coresync.
//!
//! Provides a TOML-based config file at `~/.config/coresync/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use coresync_core::exercise;
use coresync_core::generator::openai::{self, GeneratorConfig};
use coresync_core::nutrition::fatsecret::FatSecretConfig;
use coresync_core::token::{SECRET_ENV_VAR, TokenConfig};
use coresync_db::config::DbConfig;

pub const LLM_BASE_URL_ENV: &str = "CORESYNC_LLM_BASE_URL";
pub const LLM_MODEL_ENV: &str = "CORESYNC_LLM_MODEL";
pub const LLM_API_KEY_ENV: &str = "CORESYNC_LLM_API_KEY";
pub const FATSECRET_ID_ENV: &str = "FATSECRET_CLIENT_ID";
pub const FATSECRET_SECRET_ENV: &str = "FATSECRET_CLIENT_SECRET";
pub const EXERCISEDB_URL_ENV: &str = "CORESYNC_EXERCISEDB_URL";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    pub database: DatabaseSection,
    pub auth: AuthSection,
    #[serde(default)]
    pub services: ServicesSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub url: String,
    /// Connection pool size; `DbConfig::DEFAULT_MAX_CONNECTIONS` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthSection {
    /// Hex-encoded token secret (64 hex chars = 32 bytes).
    pub token_secret: String,
}

/// Upstream services. Every key is optional.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ServicesSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fatsecret_client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fatsecret_client_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercisedb_base_url: Option<String>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the coresync config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/coresync` or
/// `~/.config/coresync`, never the macOS `Application Support` directory.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("coresync");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("coresync")
}

/// Return the path to the coresync config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> Result<ConfigFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    save_config_to(&config_path(), config)
}

/// Write `config` to `path` with mode 0600 on Unix.
pub fn save_config_to(path: &Path, config: &ConfigFile) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create config directory {}", dir.display()))?;
    }

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Token secret generation
// -----------------------------------------------------------------------

/// Generate a random token secret: 32 random bytes, hex-encoded (64 chars).
pub fn generate_token_secret() -> String {
    use rand::Rng;
    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    hex::encode(bytes)
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct CoresyncConfig {
    pub db_config: DbConfig,
    pub token_config: TokenConfig,
    pub generator: GeneratorConfig,
    /// `None` when no FatSecret credentials are configured anywhere.
    pub fatsecret: Option<FatSecretConfig>,
    pub exercisedb_base_url: String,
}

impl CoresyncConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - DB URL: `cli_db_url` > `CORESYNC_DATABASE_URL` > `[database] url` > `DbConfig::DEFAULT_URL`
    /// - Token secret: `CORESYNC_TOKEN_SECRET` > `[auth] token_secret` > error
    /// - Services: `CORESYNC_LLM_*`, `FATSECRET_CLIENT_*`, `CORESYNC_EXERCISEDB_URL` > `[services]` > built-in defaults
    pub fn resolve(cli_db_url: Option<&str>) -> Result<Self> {
        let file_config = load_config().ok();
        Self::resolve_with(cli_db_url, file_config.as_ref())
    }

    /// Resolve against an already-loaded config file.
    pub fn resolve_with(cli_db_url: Option<&str>, file_config: Option<&ConfigFile>) -> Result<Self> {
        let db_url = if let Some(url) = cli_db_url {
            url.to_string()
        } else if let Ok(url) = std::env::var(DbConfig::ENV_VAR) {
            url
        } else if let Some(cfg) = file_config {
            cfg.database.url.clone()
        } else {
            DbConfig::DEFAULT_URL.to_string()
        };
        let mut db_config = DbConfig::new(db_url);
        if let Some(max) = file_config.and_then(|cfg| cfg.database.max_connections) {
            db_config = db_config.with_max_connections(max);
        }

        let token_config = if let Ok(secret_hex) = std::env::var(SECRET_ENV_VAR) {
            TokenConfig::from_hex(&secret_hex)
                .with_context(|| format!("{SECRET_ENV_VAR} env var is not valid hex"))?
        } else if let Some(cfg) = file_config {
            TokenConfig::from_hex(&cfg.auth.token_secret)
                .context("invalid hex in config file token_secret")?
        } else {
            bail!(
                "token secret not found; set {SECRET_ENV_VAR} or run `coresync init` to create a config file"
            );
        };

        let services = file_config.map(|cfg| &cfg.services);
        let pick = |env_var: &str, from_file: fn(&ServicesSection) -> &Option<String>| {
            std::env::var(env_var)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .or_else(|| services.and_then(|s| from_file(s).clone()))
        };

        let generator = GeneratorConfig {
            base_url: pick(LLM_BASE_URL_ENV, |s| &s.llm_base_url)
                .unwrap_or_else(|| openai::DEFAULT_BASE_URL.to_string()),
            model: pick(LLM_MODEL_ENV, |s| &s.llm_model)
                .unwrap_or_else(|| openai::DEFAULT_MODEL.to_string()),
            api_key: pick(LLM_API_KEY_ENV, |s| &s.llm_api_key),
        };

        let fatsecret = match (
            pick(FATSECRET_ID_ENV, |s| &s.fatsecret_client_id),
            pick(FATSECRET_SECRET_ENV, |s| &s.fatsecret_client_secret),
        ) {
            (Some(id), Some(secret)) => Some(FatSecretConfig::new(id, secret)),
            _ => None,
        };

        let exercisedb_base_url = pick(EXERCISEDB_URL_ENV, |s| &s.exercisedb_base_url)
            .unwrap_or_else(|| exercise::DEFAULT_BASE_URL.to_string());

        Ok(Self {
            db_config,
            token_config,
            generator,
            fatsecret,
            exercisedb_base_url,
        })
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET_HEX: &str = "aa55aa55aa55aa55aa55aa55aa55aa55aa55aa55aa55aa55aa55aa55aa55aa55";

    const ALL_VARS: &[&str] = &[
        DbConfig::ENV_VAR,
        SECRET_ENV_VAR,
        LLM_BASE_URL_ENV,
        LLM_MODEL_ENV,
        LLM_API_KEY_ENV,
        FATSECRET_ID_ENV,
        FATSECRET_SECRET_ENV,
        EXERCISEDB_URL_ENV,
    ];

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        crate::test_util::lock_env()
    }

    fn clear_vars() {
        for var in ALL_VARS {
            unsafe { std::env::remove_var(var) };
        }
    }

    fn sample_file() -> ConfigFile {
        ConfigFile {
            database: DatabaseSection {
                url: "postgresql://file:5432/filedb".to_string(),
                max_connections: Some(4),
            },
            auth: AuthSection {
                token_secret: "bb".repeat(32),
            },
            services: ServicesSection {
                llm_model: Some("file-model".to_string()),
                fatsecret_client_id: Some("file-id".to_string()),
                fatsecret_client_secret: Some("file-secret".to_string()),
                ..ServicesSection::default()
            },
        }
    }

    #[test]
    fn generate_token_secret_is_64_hex_chars() {
        let secret = generate_token_secret();
        assert_eq!(secret.len(), 64);
        assert!(
            secret.chars().all(|c| c.is_ascii_hexdigit()),
            "expected all hex digits, got: {secret}"
        );
    }

    #[test]
    fn generate_token_secret_is_random() {
        assert_ne!(generate_token_secret(), generate_token_secret());
    }

    #[test]
    fn save_and_load_config_roundtrip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("coresync").join("config.toml");

        save_config_to(&path, &sample_file()).unwrap();
        let loaded = load_config_from(&path).unwrap();

        assert_eq!(loaded.database.url, "postgresql://file:5432/filedb");
        assert_eq!(loaded.auth.token_secret, "bb".repeat(32));
        assert_eq!(loaded.services.llm_model.as_deref(), Some("file-model"));
        assert!(loaded.services.llm_api_key.is_none());
    }

    #[test]
    fn config_without_services_section_parses() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(
            &path,
            "[database]\nurl = \"postgresql://h/db\"\n\n[auth]\ntoken_secret = \"00\"\n",
        )
        .unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert!(loaded.services.llm_base_url.is_none());
        assert!(loaded.services.exercisedb_base_url.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn save_config_sets_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        save_config_to(&path, &sample_file()).unwrap();

        let meta = std::fs::metadata(&path).unwrap();
        assert_eq!(meta.permissions().mode() & 0o777, 0o600);
    }

    #[test]
    fn resolve_with_cli_flag_overrides_all() {
        let _lock = lock_env();
        clear_vars();
        unsafe { std::env::set_var(DbConfig::ENV_VAR, "postgresql://env:5432/envdb") };

        let file = sample_file();
        let config =
            CoresyncConfig::resolve_with(Some("postgresql://cli:5432/clidb"), Some(&file)).unwrap();
        assert_eq!(config.db_config.database_url, "postgresql://cli:5432/clidb");

        clear_vars();
    }

    #[test]
    fn resolve_with_env_var_overrides_config_file() {
        let _lock = lock_env();
        clear_vars();
        unsafe { std::env::set_var(DbConfig::ENV_VAR, "postgresql://env:5432/envdb") };
        unsafe { std::env::set_var(SECRET_ENV_VAR, SECRET_HEX) };
        unsafe { std::env::set_var(LLM_MODEL_ENV, "env-model") };

        let file = sample_file();
        let config = CoresyncConfig::resolve_with(None, Some(&file)).unwrap();
        assert_eq!(config.db_config.database_url, "postgresql://env:5432/envdb");
        assert_eq!(config.token_config.secret, hex::decode(SECRET_HEX).unwrap());
        assert_eq!(config.generator.model, "env-model");

        clear_vars();
    }

    #[test]
    fn resolve_falls_back_to_config_file() {
        let _lock = lock_env();
        clear_vars();

        let file = sample_file();
        let config = CoresyncConfig::resolve_with(None, Some(&file)).unwrap();
        assert_eq!(config.db_config.database_url, "postgresql://file:5432/filedb");
        assert_eq!(config.db_config.max_connections, 4);
        assert_eq!(config.generator.model, "file-model");
        assert_eq!(config.generator.base_url, openai::DEFAULT_BASE_URL);
        let fatsecret = config.fatsecret.expect("credentials come from the file");
        assert_eq!(fatsecret.client_id, "file-id");
        assert_eq!(config.exercisedb_base_url, exercise::DEFAULT_BASE_URL);
    }

    #[test]
    fn resolve_defaults_when_nothing_set() {
        let _lock = lock_env();
        clear_vars();
        unsafe { std::env::set_var(SECRET_ENV_VAR, SECRET_HEX) };

        let config = CoresyncConfig::resolve_with(None, None).unwrap();
        assert_eq!(config.db_config.database_url, DbConfig::DEFAULT_URL);
        assert_eq!(config.generator, GeneratorConfig::default());
        assert!(config.fatsecret.is_none());

        clear_vars();
    }

    #[test]
    fn resolve_requires_both_fatsecret_credentials() {
        let _lock = lock_env();
        clear_vars();
        unsafe { std::env::set_var(SECRET_ENV_VAR, SECRET_HEX) };
        unsafe { std::env::set_var(FATSECRET_ID_ENV, "only-the-id") };

        let config = CoresyncConfig::resolve_with(None, None).unwrap();
        assert!(config.fatsecret.is_none());

        clear_vars();
    }

    #[test]
    fn resolve_errors_when_no_token_secret() {
        let _lock = lock_env();
        clear_vars();

        let result = CoresyncConfig::resolve_with(Some("postgresql://localhost:5432/coresync"), None);
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("token secret not found"), "unexpected error: {msg}");
    }

    #[test]
    fn resolve_rejects_non_hex_secret() {
        let _lock = lock_env();
        clear_vars();
        unsafe { std::env::set_var(SECRET_ENV_VAR, "not-hex") };

        assert!(CoresyncConfig::resolve_with(None, None).is_err());

        clear_vars();
    }

    #[test]
    fn config_path_ends_with_expected_filename() {
        let path = config_path();
        assert!(
            path.ends_with("coresync/config.toml"),
            "unexpected config path: {}",
            path.display()
        );
    }
}
