use crate::core::ConfigProvider;
use crate::utils::error::{Result, RoomError};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

pub const DEFAULT_LISTINGS_TABLE: &str = "rooms";
pub const DEFAULT_IMAGE_BUCKET: &str = "room-images";
pub const DEFAULT_CACHE_CONTROL_SECONDS: u64 = 3600;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_SESSION_FILE: &str = "session.json";

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub database: Option<DatabaseConfig>,
    pub storage: Option<StorageConfig>,
    pub session: Option<SessionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub url: String,
    pub anon_key: String,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub listings_table: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub bucket: Option<String>,
    pub cache_control_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub dir: Option<String>,
    pub file: Option<String>,
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(RoomError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        let mut config: AppConfig =
            toml::from_str(&processed_content).map_err(|e| RoomError::ConfigError {
                message: format!("TOML parsing error: {}", e),
            })?;
        config.fill_session_defaults();
        Ok(config)
    }

    /// 只用環境變數建立配置 (SUPABASE_URL、SUPABASE_ANON_KEY …)
    pub fn from_env() -> Result<Self> {
        let required = |name: &str| {
            std::env::var(name).map_err(|_| RoomError::MissingConfigError {
                field: name.to_string(),
            })
        };
        let optional_number = |name: &str| -> Result<Option<u64>> {
            match std::env::var(name) {
                Ok(value) => value.parse().map(Some).map_err(|_| {
                    RoomError::InvalidConfigValueError {
                        field: name.to_string(),
                        value,
                        reason: "must be a whole number".to_string(),
                    }
                }),
                Err(_) => Ok(None),
            }
        };

        let mut config = AppConfig {
            backend: BackendConfig {
                url: required("SUPABASE_URL")?,
                anon_key: required("SUPABASE_ANON_KEY")?,
                timeout_seconds: optional_number("ROOMFINDER_TIMEOUT_SECONDS")?,
            },
            database: Some(DatabaseConfig {
                listings_table: std::env::var("ROOMFINDER_TABLE").ok(),
            }),
            storage: Some(StorageConfig {
                bucket: std::env::var("ROOMFINDER_BUCKET").ok(),
                cache_control_seconds: None,
            }),
            session: Some(SessionConfig {
                dir: std::env::var("ROOMFINDER_SESSION_DIR").ok(),
                file: None,
            }),
        };
        config.fill_session_defaults();
        Ok(config)
    }

    /// 替換環境變數 (例如 ${SUPABASE_ANON_KEY})；未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    fn fill_session_defaults(&mut self) {
        let session = self.session.get_or_insert(SessionConfig {
            dir: None,
            file: None,
        });
        if session.dir.is_none() {
            session.dir = Some(default_session_dir());
        }
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_url("backend.url", &self.backend.url)?;
        validate_non_empty_string("backend.anon_key", &self.backend.anon_key)?;
        if self.backend.anon_key.contains("${") {
            return Err(RoomError::MissingConfigError {
                field: "backend.anon_key".to_string(),
            });
        }

        if let Some(timeout) = self.backend.timeout_seconds {
            validate_positive_number("backend.timeout_seconds", timeout, 1)?;
        }
        validate_non_empty_string("database.listings_table", self.listings_table())?;
        validate_non_empty_string("storage.bucket", self.image_bucket())?;
        validate_path("session.dir", self.session_dir())?;
        validate_path("session.file", self.session_file())?;

        Ok(())
    }
}

fn default_session_dir() -> String {
    match std::env::var("HOME") {
        Ok(home) if !home.is_empty() => format!("{}/.roomfinder", home),
        _ => ".roomfinder".to_string(),
    }
}

impl ConfigProvider for AppConfig {
    fn backend_url(&self) -> &str {
        &self.backend.url
    }

    fn anon_key(&self) -> &str {
        &self.backend.anon_key
    }

    fn listings_table(&self) -> &str {
        self.database
            .as_ref()
            .and_then(|d| d.listings_table.as_deref())
            .unwrap_or(DEFAULT_LISTINGS_TABLE)
    }

    fn image_bucket(&self) -> &str {
        self.storage
            .as_ref()
            .and_then(|s| s.bucket.as_deref())
            .unwrap_or(DEFAULT_IMAGE_BUCKET)
    }

    fn cache_control_seconds(&self) -> u64 {
        self.storage
            .as_ref()
            .and_then(|s| s.cache_control_seconds)
            .unwrap_or(DEFAULT_CACHE_CONTROL_SECONDS)
    }

    fn request_timeout_seconds(&self) -> u64 {
        self.backend.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    fn session_dir(&self) -> &str {
        self.session
            .as_ref()
            .and_then(|s| s.dir.as_deref())
            .unwrap_or(".roomfinder")
    }

    fn session_file(&self) -> &str {
        self.session
            .as_ref()
            .and_then(|s| s.file.as_deref())
            .unwrap_or(DEFAULT_SESSION_FILE)
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
