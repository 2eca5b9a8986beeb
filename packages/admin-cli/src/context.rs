//! Application context with shared state and utilities

use std::sync::Arc;

use anyhow::{Context, Result};
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Password};
use mosques_client::{ClientConfig, FileCredentialStore, MosquesClient, Session};

/// Application context passed to all commands
pub struct AppContext {
    pub quiet: bool,
    pub client: MosquesClient,
}

impl AppContext {
    /// Build the client and pick up a session stored by an earlier run.
    pub async fn new(quiet: bool) -> Result<Self> {
        let config = ClientConfig::from_env().context("Failed to load configuration")?;
        let store = FileCredentialStore::new(config.token_file.clone());
        let session = Session::new(Arc::new(store));
        session
            .restore()
            .await
            .context("Failed to read stored session")?;

        let client = MosquesClient::with_session(config, session)?;
        Ok(Self { quiet, client })
    }

    pub fn theme(&self) -> ColorfulTheme {
        ColorfulTheme::default()
    }

    pub fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        if self.quiet {
            return Ok(default);
        }
        Ok(Confirm::with_theme(&self.theme())
            .with_prompt(prompt)
            .default(default)
            .interact()?)
    }

    pub fn input(&self, prompt: &str) -> Result<String> {
        Ok(Input::with_theme(&self.theme())
            .with_prompt(prompt)
            .interact_text()?)
    }

    pub fn password(&self, prompt: &str) -> Result<String> {
        Ok(Password::with_theme(&self.theme())
            .with_prompt(prompt)
            .interact()?)
    }

    pub fn print_header(&self, msg: &str) {
        if !self.quiet {
            println!();
            println!("{}", style(msg).bold());
        }
    }

    pub fn print_success(&self, msg: &str) {
        if !self.quiet {
            println!("{}", style(msg).green());
        }
    }

    pub fn print_warning(&self, msg: &str) {
        if !self.quiet {
            println!("{}", style(msg).yellow());
        }
    }

    pub fn print_info(&self, msg: &str) {
        if !self.quiet {
            println!("{}", style(msg).cyan());
        }
    }
}
