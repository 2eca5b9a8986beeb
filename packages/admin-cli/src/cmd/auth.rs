//! Session commands

use anyhow::Result;
use console::style;
use mosques_client::{ClientError, LoginRequest};

use crate::context::AppContext;

pub async fn login(ctx: &AppContext, username: Option<String>) -> Result<()> {
    let username = match username {
        Some(username) => username,
        None => ctx.input("Username")?,
    };
    let password = ctx.password("Password")?;

    let credential = ctx
        .client
        .login(LoginRequest::password(username, password))
        .await?;

    let user = credential
        .user_id
        .map(|id| format!(" (user #{})", id))
        .unwrap_or_default();
    ctx.print_success(&format!("Signed in as {}{}", credential.role, user));
    Ok(())
}

pub async fn logout(ctx: &AppContext) -> Result<()> {
    ctx.client.logout().await?;
    ctx.print_success("Signed out");
    Ok(())
}

pub async fn whoami(ctx: &AppContext) -> Result<()> {
    let Some(credential) = ctx.client.session().current().await else {
        ctx.print_warning("Not signed in. Run `mosques-admin login` first.");
        return Ok(());
    };

    // The stored token may have expired since it was saved.
    match ctx.client.me().await {
        Ok(me) => {
            println!(
                "{} {} (user #{})",
                style("Signed in as").bold(),
                credential.role,
                me.user_id
            );
            Ok(())
        }
        Err(ClientError::Auth(_)) => {
            ctx.print_warning("Session expired. Sign in again.");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
