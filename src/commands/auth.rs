//! Authentication command handlers for OAuth flow.
//!
//! This module implements the CLI commands for:
//! - `gagyebu auth` - Initial OAuth consent flow
//! - `gagyebu auth --verify` - Verify and refresh authentication

use crate::api::TokenProvider;
use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;

/// Handles the `gagyebu auth` command - runs the OAuth consent flow
///
/// This is the only command that asks the user to visit Google in a browser. It:
/// 1. Loads client_secret.json from the secrets directory
/// 2. Prints the consent URL and waits for Google's redirect on localhost
/// 3. Saves tokens to token.json with the spreadsheets scope
///
/// # Errors
/// Returns an error if the OAuth flow fails or if client_secret.json is missing
pub async fn auth(config: &Config) -> Result<Out<()>> {
    let _ = TokenProvider::initialize(config.client_secret_path(), config.token_path()).await?;
    Ok(format!(
        "Authorization complete, the token was saved to {}",
        config.token_path().display()
    )
    .into())
}

/// Handles the `gagyebu auth --verify` command - verifies authentication
///
/// This command never starts the interactive flow. It loads the saved token, checks its scopes
/// and exchanges the refresh token for a new access token.
///
/// # Errors
/// Returns an error if the token is missing, has the wrong scopes, or cannot be refreshed.
pub async fn auth_verify(config: &Config) -> Result<Out<()>> {
    let mut token_provider = TokenProvider::load(config.client_secret_path(), config.token_path())
        .await
        .context(
            "Unable to use the existing tokens found in the token JSON file. \n\n\
            You should run 'gagyebu auth' (without the --verify flag).",
        )?;
    token_provider
        .refresh()
        .await
        .context("Unable to refresh the token")?;
    Ok("Your OAuth token is valid!".into())
}
