use config::{Config, ConfigError, Environment, File};
use leadform_core::gate::GateConfig;
use leadform_core::messaging::{DEFAULT_DESTINATION, DEFAULT_MESSAGE};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ApiConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub remote: Option<RemoteConfig>,
    pub auth: AuthConfig,
    pub messaging: MessagingConfig,
    pub cors: Option<CorsConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

/// Hosted table service speaking the PostgREST dialect.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RemoteConfig {
    pub url: String,
    pub api_key: String,
    #[serde(default = "default_responses_table")]
    pub responses_table: String,
    #[serde(default = "default_admin_table")]
    pub admin_table: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: Option<String>,
    pub token_hours: i64,
    pub max_attempts: u32,
    pub lockout_secs: u64,
    pub allow_password_reset: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct MessagingConfig {
    pub message_template: String,
    pub default_destination: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

fn default_responses_table() -> String {
    "lead_responses".to_string()
}

fn default_admin_table() -> String {
    "admin_settings".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                path: get_default_db_path(),
            },
            remote: None,
            auth: AuthConfig::default(),
            messaging: MessagingConfig::default(),
            cors: Some(CorsConfig {
                allowed_origins: vec!["http://localhost:5173".to_string()],
            }),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_hours: 24,
            max_attempts: 5,
            lockout_secs: 30,
            allow_password_reset: true,
        }
    }
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            message_template: DEFAULT_MESSAGE.to_string(),
            default_destination: DEFAULT_DESTINATION.to_string(),
        }
    }
}

impl AuthConfig {
    pub fn gate_config(&self) -> GateConfig {
        GateConfig {
            max_attempts: self.max_attempts,
            lockout: Duration::from_secs(self.lockout_secs),
            allow_password_reset: self.allow_password_reset,
        }
    }
}

impl ApiConfig {
    /// Loads `~/.config/leadform/api.toml` (creating it on first run), then the
    /// optional explicit file, then `LEADFORM__SECTION__KEY` variables.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, PathBuf), ConfigError> {
        let config_path = get_config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::Message(format!("Failed to create config directory: {e}"))
            })?;
        }

        if !config_path.exists() {
            write_default_config(&config_path)?;
        }

        let config = Self::load_from(&config_path, explicit)?;
        let source = explicit.map(Path::to_path_buf).unwrap_or(config_path);
        Ok((config, source))
    }

    pub fn load_from(base: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder =
            Config::builder().add_source(File::from(base.to_path_buf()).required(false));

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::Message(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
            builder = builder.add_source(File::from(path.to_path_buf()));
        }

        let builder = builder.add_source(
            Environment::with_prefix("LEADFORM")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let mut config: ApiConfig = builder.build()?.try_deserialize()?;

        // Expand tilde in database path
        if config.database.path.starts_with("~") {
            if let Some(home) = home::home_dir() {
                let path_str = config.database.path.to_string_lossy();
                let expanded = path_str.replacen("~", &home.to_string_lossy(), 1);
                config.database.path = PathBuf::from(expanded);
            }
        }

        if config.auth.jwt_secret.as_deref().map_or(true, str::is_empty) {
            config.auth.jwt_secret = Some(generate_jwt_secret());
            tracing::info!("Generated JWT secret for this run; admin sessions end on restart");
        }

        Ok(config)
    }

    pub fn jwt_secret(&self) -> &str {
        self.auth.jwt_secret.as_deref().unwrap_or_default()
    }
}

fn write_default_config(config_path: &Path) -> Result<(), ConfigError> {
    let default_config = format!(
        r#"
[server]
host = "127.0.0.1"
port = 8080

[database]
path = "{}"

[auth]
# jwt_secret = "change-this-to-a-secure-random-string"
token_hours = 24
max_attempts = 5
lockout_secs = 30
# Allows replacing the admin password without logging in first
allow_password_reset = true

[messaging]
message_template = "{}"
default_destination = "{}"

[cors]
allowed_origins = ["http://localhost:5173"]

# [remote]
# url = "https://your-project.supabase.co"
# api_key = "your-anon-key"
# responses_table = "lead_responses"
# admin_table = "admin_settings"
"#,
        get_default_db_path().display(),
        DEFAULT_MESSAGE,
        DEFAULT_DESTINATION
    );
    std::fs::write(config_path, default_config)
        .map_err(|e| ConfigError::Message(format!("Failed to write default config: {e}")))
}

fn get_config_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join("leadform/api.toml")
    } else {
        PathBuf::from("api.toml")
    }
}

fn get_default_db_path() -> PathBuf {
    if let Some(data_dir) = dirs::data_local_dir() {
        data_dir.join("leadform/leadform.db")
    } else {
        PathBuf::from("leadform.db")
    }
}

/// Equivalent to `openssl rand -base64 48`
fn generate_jwt_secret() -> String {
    let mut rng = rand::rng();
    let random_bytes: Vec<u8> = (0..48).map(|_| rng.random()).collect();
    base64::Engine::encode(&base64::engine::general_purpose::STANDARD, &random_bytes)
}
