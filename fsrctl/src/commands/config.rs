//! Local configuration commands
//!
//! `show` and `clear` never build a client. `init` prompts for whatever
//! the resolved configuration is missing, proves the settings work by
//! connecting once, and then saves them.

use super::confirm;
use crate::cli::ConfigCommands;
use crate::config::FsrConfig;
use crate::output;
use crate::state::CliState;
use dialoguer::{Input, Password, Select};
use fsr_core::errors::{FsrError, FsrResult};
use fsr_core::View;
use serde_json::{json, Value};
use tracing::info;

/// Handle config commands
pub async fn handle_config_command(command: ConfigCommands, state: &mut CliState) -> FsrResult<()> {
    match command {
        ConfigCommands::Show => {
            output::print(config_summary(state), state.output_format(), None, View::Full);
            Ok(())
        }
        ConfigCommands::Init => init_config(state).await,
        ConfigCommands::Clear { yes } => clear_config(state, yes),
    }
}

/// Non-secret view of the resolved configuration
fn config_summary(state: &CliState) -> Value {
    let config = state.config();
    json!({
        "server": config.server,
        "verify_ssl": config.verify_ssl,
        "output_format": config.output_format,
        "auth_method": config.auth_method().map(|mode| mode.to_string()),
        "config_path": state.store().path().display().to_string(),
    })
}

/// What `init` still has to ask for before the credentials are complete
#[derive(Debug, PartialEq, Eq)]
enum AuthPrompt {
    Nothing,
    Password,
    Username,
    Method,
}

fn missing_auth(config: &FsrConfig) -> AuthPrompt {
    let set = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.is_empty());

    match (set(&config.token), set(&config.username), set(&config.password)) {
        (true, _, _) | (false, true, true) => AuthPrompt::Nothing,
        (false, true, false) => AuthPrompt::Password,
        (false, false, true) => AuthPrompt::Username,
        (false, false, false) => AuthPrompt::Method,
    }
}

fn prompt_failed(err: dialoguer::Error) -> FsrError {
    FsrError::Usage(format!("Prompt failed: {}", err))
}

fn ask(prompt: &str) -> FsrResult<String> {
    Input::<String>::new()
        .with_prompt(prompt)
        .interact_text()
        .map_err(prompt_failed)
}

fn ask_secret(prompt: &str) -> FsrResult<String> {
    Password::new().with_prompt(prompt).interact().map_err(prompt_failed)
}

async fn init_config(state: &mut CliState) -> FsrResult<()> {
    let mut config = state.config().clone();

    if config.server.as_deref().map_or(true, str::is_empty) {
        config.server = Some(ask("FortiSOAR server address")?);
    }

    config.check_exclusive_auth()?;

    match missing_auth(&config) {
        AuthPrompt::Nothing => {}
        AuthPrompt::Password => config.password = Some(ask_secret("Password")?),
        AuthPrompt::Username => config.username = Some(ask("Username")?),
        AuthPrompt::Method => {
            let methods = ["token", "userpass"];
            let choice = Select::new()
                .with_prompt("Authentication method")
                .items(&methods)
                .default(0)
                .interact()
                .map_err(prompt_failed)?;

            if methods[choice] == "token" {
                config.token = Some(ask_secret("Authentication token")?);
            } else {
                config.username = Some(ask("Username")?);
                config.password = Some(ask_secret("Password")?);
            }
        }
    }

    if config.save_password && config.password.is_some() {
        output::warning("Saving password in config file is not recommended");
        if !confirm("Are you sure?")? {
            config.save_password = false;
        }
    }

    state.set_config(config);
    state.ensure_client().await?;
    info!("Configuration verified against the server");

    state.save_config()?;
    output::success(&format!(
        "Configuration saved successfully to {}",
        state.store().path().display()
    ));
    Ok(())
}

fn clear_config(state: &CliState, yes: bool) -> FsrResult<()> {
    if !state.store().exists() {
        output::warning("No configuration file found");
        return Ok(());
    }

    if !yes && !confirm("Are you sure you want to clear the configuration?")? {
        println!("Clear cancelled");
        return Ok(());
    }

    state.store().clear()?;
    output::success("Configuration cleared successfully");
    Ok(())
}
