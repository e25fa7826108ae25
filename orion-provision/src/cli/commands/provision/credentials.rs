//! Interactive credential prompts

use anyhow::{Context, Result, bail};
use dialoguer::Input;
use is_terminal::IsTerminal;

use crate::api::Credentials;
use crate::config::{Config, env_vars};

/// Resolve the Orion account, prompting for whatever is not configured.
/// The password comes from `ORION_PASSWORD` or a masked prompt.
pub fn resolve_credentials(config: &Config) -> Result<Credentials> {
    let username = match config.account.username.as_deref() {
        Some(username) if !username.trim().is_empty() => username.to_string(),
        _ => {
            ensure_terminal(env_vars::USERNAME)?;
            Input::<String>::new()
                .with_prompt("Username")
                .interact_text()
                .context("Failed to read username")?
        }
    };

    let password = match std::env::var(env_vars::PASSWORD) {
        Ok(password) if !password.is_empty() => password,
        _ => {
            ensure_terminal(env_vars::PASSWORD)?;
            rpassword::prompt_password("Password: ").context("Failed to read password")?
        }
    };

    Ok(Credentials { username, password })
}

fn ensure_terminal(variable: &str) -> Result<()> {
    if !std::io::stdin().is_terminal() {
        bail!(
            "Cannot prompt for credentials: stdin is not a terminal. Set {} instead.",
            variable
        );
    }
    Ok(())
}
