//! Moderation queue commands

use anyhow::Result;
use console::style;
use mosques_client::{ActionOutcome, Page};
use mosques_core::workflow::{ModerationAction, Moderated, Transition};
use mosques_core::{ModerationItem, ModerationStatus, ResourceType, StatusFilter};

use crate::context::AppContext;

pub async fn list(
    ctx: &AppContext,
    resource: ResourceType,
    status: StatusFilter,
    limit: u32,
    offset: u32,
) -> Result<()> {
    let moderation = ctx.client.moderation();
    let items = moderation
        .list_entities(resource, status, Page::new(limit, offset))
        .await?;

    ctx.print_header(&format!("{} ({})", resource, status));
    if items.is_empty() {
        ctx.print_info("Nothing to show");
        return Ok(());
    }

    for item in &items {
        print_item(item);
        if let Some(hint) = moderation.hint_for(item) {
            println!("        {}", style(hint).dim());
        }
    }
    Ok(())
}

pub async fn approve(ctx: &AppContext, resource: ResourceType, id: i64) -> Result<()> {
    act(ctx, resource, id, ModerationAction::Approve).await
}

pub async fn reject(ctx: &AppContext, resource: ResourceType, id: i64) -> Result<()> {
    act(ctx, resource, id, ModerationAction::Reject).await
}

pub async fn delete(ctx: &AppContext, resource: ResourceType, id: i64, yes: bool) -> Result<()> {
    if needs_prompt(ctx.quiet, yes)?
        && !ctx.confirm(&format!("Delete {} #{} permanently?", resource, id), false)?
    {
        ctx.print_warning("Aborted");
        return Ok(());
    }
    act(ctx, resource, id, ModerationAction::Delete).await
}

/// Quiet mode cannot prompt, so it must not fall back to "no" and exit 0.
fn needs_prompt(quiet: bool, yes: bool) -> Result<bool> {
    if yes {
        return Ok(false);
    }
    if quiet {
        anyhow::bail!("Refusing to delete without a prompt: pass --yes in quiet mode");
    }
    Ok(true)
}

pub async fn confirm(ctx: &AppContext, resource: ResourceType, id: i64) -> Result<()> {
    let outcome = ctx.client.moderation().confirm_entity(resource, id).await?;

    let count = outcome
        .confirmations_count
        .map(|n| format!(" ({} so far)", n))
        .unwrap_or_default();
    ctx.print_success(&format!("Confirmed {}{}", outcome.target, count));
    if let Some(hint) = outcome.hint {
        ctx.print_info(&hint.to_string());
    }
    Ok(())
}

async fn act(ctx: &AppContext, resource: ResourceType, id: i64, action: ModerationAction) -> Result<()> {
    let outcome = ctx
        .client
        .moderation()
        .perform_action(resource, id, action)
        .await?;
    ctx.print_success(&describe(&outcome));
    Ok(())
}

fn describe(outcome: &ActionOutcome) -> String {
    match outcome.transition {
        Some(Transition::Unchanged { status }) => {
            format!("{} was already {}", outcome.target, status)
        }
        Some(Transition::Reversal { from, to }) => {
            format!("{} moved from {} to {}", outcome.target, from, to)
        }
        Some(Transition::Removed { .. }) => format!("{} deleted", outcome.target),
        Some(Transition::Changed { to, .. }) => format!("{} is now {}", outcome.target, to),
        None => format!("{}: {} done", outcome.target, outcome.action),
    }
}

fn print_item(item: &ModerationItem) {
    let status = item.status();
    let label = match status {
        ModerationStatus::PendingApproval => style(status.to_string()).yellow(),
        ModerationStatus::Approved => style(status.to_string()).green(),
        ModerationStatus::Rejected => style(status.to_string()).red(),
    };
    println!(
        "{:>6}  {:<18} {}",
        style(format!("#{}", item.raw_id())).dim(),
        label,
        style(item.title()).bold()
    );
    let subtitle = item.subtitle();
    if !subtitle.is_empty() {
        println!("        {}", subtitle);
    }
}
