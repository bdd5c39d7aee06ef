//! Configuration management for fsrctl
//!
//! The effective configuration is built from defaults plus three overlay
//! passes, in order: the YAML file, `PYFSR_*` environment variables, and
//! command-line flags. Every pass only writes fields its source actually
//! supplies, so later sources win and absent values never reset anything.

use crate::cli::{Cli, OutputFormat};
use clap::ValueEnum;
use figment::{
    providers::{Format, Yaml},
    Figment,
};
use fsr_core::auth::{derive_credential, AuthMode, Credential};
use fsr_core::errors::{FsrError, FsrResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name of the per-user configuration, relative to the home directory
pub const CONFIG_FILE: &str = ".pyfsr.yaml";

/// Overrides the configuration file location
pub const CONFIG_PATH_ENV: &str = "PYFSR_CONFIG";

pub const ENV_SERVER: &str = "PYFSR_SERVER";
pub const ENV_TOKEN: &str = "PYFSR_TOKEN";
pub const ENV_USERNAME: &str = "PYFSR_USERNAME";
pub const ENV_PASSWORD: &str = "PYFSR_PASSWORD";
pub const ENV_VERIFY_SSL: &str = "PYFSR_VERIFY_SSL";
pub const ENV_OUTPUT_FORMAT: &str = "PYFSR_OUTPUT_FORMAT";
pub const ENV_SAVE_PASSWORD: &str = "PYFSR_SAVE_PASSWORD";

/// Resolved settings for one invocation
#[derive(Clone, PartialEq, Eq)]
pub struct FsrConfig {
    /// FortiSOAR base URL
    pub server: Option<String>,
    pub token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub verify_ssl: bool,
    pub output_format: OutputFormat,
    /// Whether `save` may write the password to disk
    pub save_password: bool,
}

impl Default for FsrConfig {
    fn default() -> Self {
        Self {
            server: None,
            token: None,
            username: None,
            password: None,
            verify_ssl: true,
            output_format: OutputFormat::Json,
            save_password: false,
        }
    }
}

impl fmt::Debug for FsrConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |secret: &Option<String>| secret.as_ref().map(|_| "***");
        f.debug_struct("FsrConfig")
            .field("server", &self.server)
            .field("token", &redact(&self.token))
            .field("username", &self.username)
            .field("password", &redact(&self.password))
            .field("verify_ssl", &self.verify_ssl)
            .field("output_format", &self.output_format)
            .field("save_password", &self.save_password)
            .finish()
    }
}

impl FsrConfig {
    /// The credential the client would use: token first, then the
    /// username/password pair, otherwise none.
    pub fn auth(&self) -> Option<Credential> {
        derive_credential(
            self.token.as_deref(),
            self.username.as_deref(),
            self.password.as_deref(),
        )
    }

    pub fn auth_method(&self) -> Option<AuthMode> {
        self.auth().map(|credential| credential.mode())
    }

    /// Apply one configuration source on top of this record
    pub fn overlay(mut self, layer: ConfigLayer) -> Self {
        if let Some(server) = layer.server {
            self.server = Some(server);
        }
        if let Some(token) = layer.token {
            self.token = Some(token);
        }
        if let Some(username) = layer.username {
            self.username = Some(username);
        }
        if let Some(password) = layer.password {
            self.password = Some(password);
        }
        if let Some(verify_ssl) = layer.verify_ssl {
            self.verify_ssl = verify_ssl;
        }
        if let Some(output_format) = layer.output_format {
            self.output_format = output_format;
        }
        if let Some(save_password) = layer.save_password {
            self.save_password = save_password;
        }
        self
    }

    /// Reject a record carrying both a token and a full username/password pair
    pub fn check_exclusive_auth(&self) -> FsrResult<()> {
        let set = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.is_empty());

        if set(&self.token) && set(&self.username) && set(&self.password) {
            return Err(FsrError::usage(
                "Cannot use both token and username/password authentication",
            ));
        }
        Ok(())
    }

    fn to_persisted(&self) -> PersistedConfig<'_> {
        let password = if self.save_password {
            self.password.as_deref().filter(|p| !p.is_empty())
        } else {
            None
        };

        PersistedConfig {
            server: self.server.as_deref(),
            token: self.token.as_deref(),
            username: self.username.as_deref(),
            password,
            verify_ssl: self.verify_ssl,
            output_format: self.output_format,
        }
    }
}

/// What ends up on disk; `password` only when saving it was requested
#[derive(Serialize)]
struct PersistedConfig<'a> {
    server: Option<&'a str>,
    token: Option<&'a str>,
    username: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<&'a str>,
    verify_ssl: bool,
    output_format: OutputFormat,
}

/// One configuration source; `None` means "not supplied here"
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    pub server: Option<String>,
    pub token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub verify_ssl: Option<bool>,
    pub output_format: Option<OutputFormat>,
    pub save_password: Option<bool>,
}

/// Shape of the YAML file as read from disk
#[derive(Deserialize, Default)]
struct FileLayer {
    server: Option<String>,
    token: Option<String>,
    username: Option<String>,
    password: Option<String>,
    verify_ssl: Option<bool>,
    output_format: Option<String>,
    save_password: Option<bool>,
}

impl ConfigLayer {
    /// Read the YAML file; a missing or empty file supplies nothing
    pub fn from_file(path: &Path) -> FsrResult<Self> {
        if !path.exists() {
            debug!("No configuration file at {}", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        let file: FileLayer = Figment::from(Yaml::string(&contents))
            .extract()
            .map_err(|e| {
                FsrError::Configuration(format!(
                    "Failed to parse configuration file {}: {}",
                    path.display(),
                    e
                ))
            })?;

        let output_format = file
            .output_format
            .as_deref()
            .map(|value| parse_output_format(value, "output_format"))
            .transpose()?;

        Ok(Self {
            server: file.server,
            token: file.token,
            username: file.username,
            password: file.password,
            verify_ssl: file.verify_ssl,
            output_format,
            save_password: file.save_password,
        })
    }

    /// Read `PYFSR_*` variables through `lookup`; empty values are ignored
    pub fn from_lookup<F>(lookup: F) -> FsrResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let output_format = get(ENV_OUTPUT_FORMAT)
            .map(|value| parse_output_format(&value, ENV_OUTPUT_FORMAT))
            .transpose()?;

        Ok(Self {
            server: get(ENV_SERVER),
            token: get(ENV_TOKEN),
            username: get(ENV_USERNAME),
            password: get(ENV_PASSWORD),
            verify_ssl: get(ENV_VERIFY_SSL).map(|value| parse_env_bool(&value)),
            output_format,
            save_password: get(ENV_SAVE_PASSWORD).map(|value| parse_env_bool(&value)),
        })
    }

    /// Take the global flags; boolean switches count when either form was given
    pub fn from_cli(args: &Cli) -> Self {
        let non_empty = |value: &Option<String>| value.clone().filter(|v| !v.is_empty());

        Self {
            server: non_empty(&args.server),
            token: non_empty(&args.token),
            username: non_empty(&args.username),
            password: non_empty(&args.password),
            verify_ssl: args.verify_ssl_flag(),
            output_format: args.output,
            save_password: args.save_password_flag(),
        }
    }
}

/// Environment booleans: `true`, `1` and `yes` (any case) are true, anything else false
pub fn parse_env_bool(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}

fn parse_output_format(value: &str, source: &str) -> FsrResult<OutputFormat> {
    OutputFormat::from_str(value.trim(), true).map_err(|_| {
        FsrError::Configuration(format!(
            "Invalid output format '{}' in {} (expected json, table or yaml)",
            value, source
        ))
    })
}

/// Loads and persists the configuration file
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Pick the file location: explicit path, then `PYFSR_CONFIG`, then `~/.pyfsr.yaml`
    pub fn locate(explicit: Option<PathBuf>) -> FsrResult<Self> {
        if let Some(path) = explicit {
            return Ok(Self::new(path));
        }

        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
            return Ok(Self::new(PathBuf::from(path)));
        }

        let home = dirs::home_dir().ok_or_else(|| {
            FsrError::Configuration(
                "Could not locate the home directory; use --config to choose a file".to_string(),
            )
        })?;
        Ok(Self::new(home.join(CONFIG_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Build the effective configuration from file, process environment and CLI flags
    pub fn load(&self, cli: Option<ConfigLayer>) -> FsrResult<FsrConfig> {
        self.load_with(cli, |key| std::env::var(key).ok())
    }

    /// Same as [`ConfigStore::load`] with an explicit environment lookup
    pub fn load_with<F>(&self, cli: Option<ConfigLayer>, lookup: F) -> FsrResult<FsrConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = FsrConfig::default()
            .overlay(ConfigLayer::from_file(&self.path)?)
            .overlay(ConfigLayer::from_lookup(lookup)?);

        if let Some(cli) = cli {
            config = config.overlay(cli);
        }

        debug!("Resolved configuration: {:?}", config);
        Ok(config)
    }

    /// Write the configuration file. The password is only written when
    /// `save_password` is set and the password is non-empty.
    pub fn save(&self, config: &FsrConfig) -> FsrResult<()> {
        let persisted = config.to_persisted();
        if persisted.password.is_some() {
            warn!("Saving password in {}", self.path.display());
        }

        let yaml = serde_yaml::to_string(&persisted).map_err(|e| {
            FsrError::Configuration(format!("Failed to serialize configuration: {}", e))
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, yaml)?;

        debug!("Configuration written to {}", self.path.display());
        Ok(())
    }

    /// Remove the configuration file, returning whether one existed
    pub fn clear(&self) -> FsrResult<bool> {
        if !self.exists() {
            return Ok(false);
        }
        fs::remove_file(&self.path)?;
        Ok(true)
    }
}
