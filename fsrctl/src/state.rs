//! Per-invocation state shared by all command handlers

use crate::auth::exchange_token;
use crate::cli::OutputFormat;
use crate::client::{parse_server, ClientBuildError, FortiSoarClient};
use crate::config::{ConfigStore, FsrConfig};
use fsr_core::auth::{resolve_credentials, Credential, MISSING_CREDENTIALS};
use fsr_core::errors::{FsrError, FsrResult};
use tracing::{debug, info, warn};

/// Resolved configuration plus the lazily created API session
pub struct CliState {
    config: FsrConfig,
    store: ConfigStore,
    client: Option<FortiSoarClient>,
}

impl CliState {
    pub fn new(config: FsrConfig, store: ConfigStore) -> Self {
        Self {
            config,
            store,
            client: None,
        }
    }

    pub fn config(&self) -> &FsrConfig {
        &self.config
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn output_format(&self) -> OutputFormat {
        self.config.output_format
    }

    /// Whether a session has been created yet
    pub fn has_client(&self) -> bool {
        self.client.is_some()
    }

    /// Replace the configuration. Any existing session was built from the
    /// old settings and is dropped.
    pub fn set_config(&mut self, config: FsrConfig) {
        self.config = config;
        self.client = None;
    }

    /// Return the API session, creating it on first use.
    ///
    /// Later calls hand back the same session without re-validating or
    /// re-authenticating.
    pub async fn ensure_client(&mut self) -> FsrResult<&FortiSoarClient> {
        let client = match self.client.take() {
            Some(client) => client,
            None => connect(&self.config).await?,
        };
        Ok(&*self.client.insert(client))
    }

    /// Persist the current configuration through the store
    pub fn save_config(&self) -> FsrResult<()> {
        self.store.save(&self.config)
    }
}

fn init_failure(err: ClientBuildError) -> FsrError {
    FsrError::Usage(format!("Failed to initialize client: {}", err))
}

/// Build a session from a resolved configuration.
///
/// In username/password mode the pair is exchanged for a token first and
/// the session authenticates with that token.
pub async fn connect(config: &FsrConfig) -> FsrResult<FortiSoarClient> {
    let server = config
        .server
        .as_deref()
        .filter(|server| !server.is_empty())
        .ok_or_else(|| FsrError::usage("Server must be provided"))?;

    config.check_exclusive_auth()?;

    let (mode, credential) = resolve_credentials(
        Some(server),
        config.token.as_deref(),
        config.username.as_deref(),
        config.password.as_deref(),
    )
    .map_err(|_| FsrError::usage(MISSING_CREDENTIALS))?;

    let base_url = parse_server(server).map_err(init_failure)?;
    if !config.verify_ssl {
        warn!("SSL certificate verification disabled for {}", base_url);
    }
    debug!("Using {} authentication against {}", mode, base_url);

    let token = match credential {
        Credential::Token(token) => token,
        Credential::UserPass { username, password } => {
            exchange_token(&base_url, &username, &password, config.verify_ssl).await?
        }
    };

    let client = FortiSoarClient::new(base_url, &token, config.verify_ssl).map_err(init_failure)?;
    info!("Connected client for {}", client.base_url());
    Ok(client)
}
