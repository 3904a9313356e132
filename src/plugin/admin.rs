//! Admin-only account surgery: `give`, `reset`, `logs`.

use crate::{
    context::Context,
    event::*,
    helper::{MessageHelper, UserIdHelper},
    plugin::*,
};
use anyhow::Result;
use serenity::all::{CreateEmbed, CreateEmbedFooter, CreateMessage, Message, UserId};

pub struct Admin;

#[serenity::async_trait]
impl Plugin for Admin {
    fn name(&self) -> &'static str {
        "admin"
    }

    async fn usage(&self, ctx: &Context<'_>) -> Option<String> {
        let prefix = &ctx.cfg.read().await.general.command_prefix;
        Some(format!(
            "{p}give @user <amount> - grant waifame (admin)\n\
             {p}reset [@user] - wipe an account (admin)\n\
             {p}logs <user_id> - show stored account data (admin)",
            p = prefix
        ))
    }

    async fn handle(&self, ctx: &Context<'_>, event: &Event) -> Result<EventHandled> {
        for cmd in ["give", "reset", "logs"] {
            let Some((msg, args)) = event.is_bot_cmd(ctx, cmd).await else {
                continue;
            };

            if !msg.is_from_admin(ctx).await {
                msg.reply(ctx.cache_http, "❌ This command is admin-only.")
                    .await?;
                return Ok(EventHandled::Yes);
            }

            match cmd {
                "give" => give(ctx, msg, args).await?,
                "reset" => reset(ctx, msg).await?,
                _ => logs(ctx, msg, args).await?,
            }
            return Ok(EventHandled::Yes);
        }

        Ok(EventHandled::No)
    }
}

async fn give(ctx: &Context<'_>, msg: &Message, args: &str) -> Result<()> {
    let amount: i64 = args
        .split_whitespace()
        .last()
        .and_then(|w| w.parse().ok())
        .unwrap_or(0);

    let target = match msg.mentions.first() {
        Some(target) if amount != 0 => target,
        _ => {
            let prefix = ctx.cfg.read().await.general.command_prefix.clone();
            msg.reply(
                ctx.cache_http,
                format!("❌ Usage: `{}give @user <amount>`", prefix),
            )
            .await?;
            return Ok(());
        }
    };

    let total = {
        let mut pstate = ctx.pstate.write().await;
        let total = {
            // Admin override: the one path allowed to push a balance negative.
            let account = pstate.account_mut(target.id);
            account.waifame += amount;
            account.waifame
        };
        pstate.save().await;
        total
    };

    msg.reply(
        ctx.cache_http,
        format!(
            "✅ **{}** waifame granted to **{}**! (Total: {})",
            amount, target.name, total
        ),
    )
    .await?;
    Ok(())
}

async fn reset(ctx: &Context<'_>, msg: &Message) -> Result<()> {
    // With no mention the admin resets their own account.
    let (target_id, target_name) = match msg.mentions.first() {
        Some(user) => (user.id, user.name.clone()),
        None => (msg.author.id, "yourself".to_owned()),
    };

    let found = {
        let mut pstate = ctx.pstate.write().await;
        let found = pstate.reset(target_id);
        if found {
            pstate.save().await;
        }
        found
    };

    let reply = if found {
        format!("✅ Account data for **{}** has been reset!", target_name)
    } else {
        "❌ That user has no stored data.".to_owned()
    };
    msg.reply(ctx.cache_http, reply).await?;
    Ok(())
}

async fn logs(ctx: &Context<'_>, msg: &Message, args: &str) -> Result<()> {
    let Some(user_id) = args
        .split_whitespace()
        .next()
        .and_then(|w| w.parse::<u64>().ok())
        .filter(|id| *id != 0)
    else {
        let prefix = ctx.cfg.read().await.general.command_prefix.clone();
        msg.reply(ctx.cache_http, format!("❌ Usage: `{}logs <user_id>`", prefix))
            .await?;
        return Ok(());
    };
    let user_id = UserId::new(user_id);

    let Some(account) = ctx.pstate.read().await.existing(user_id).cloned() else {
        msg.reply(
            ctx.cache_http,
            format!(
                "❌ No data stored for user `{}`.\nThey have never used the bot.",
                user_id
            ),
        )
        .await?;
        return Ok(());
    };

    let username = user_id.display_name(ctx).await;
    let last_fav = account
        .last_fav_date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "Never".to_owned());

    let mut embed = CreateEmbed::new()
        .title(format!("🔍 Logs - {}", username))
        .colour(0xFF6600)
        .field("🆔 User ID", user_id.to_string(), true)
        .field("👁️ Posts Viewed", account.view_count.to_string(), true)
        .field("❤️ Favorites", account.favorites.len().to_string(), true)
        .field("💰 Waifame", account.waifame.to_string(), true)
        .field("⭐ Favorites Today", format!("{}/5", account.daily_favs), true)
        .field("📅 Last Favorite", last_fav, true);

    if !account.favorites.is_empty() {
        let mut ids: Vec<String> = account
            .favorites
            .iter()
            .take(10)
            .map(|f| f.id.to_string())
            .collect();
        if account.favorites.len() > 10 {
            ids.push(format!("... (+{} more)", account.favorites.len() - 10));
        }
        embed = embed.field("📋 Favorite IDs", ids.join(", "), false);
    }

    let embed = embed.footer(CreateEmbedFooter::new(format!(
        "Requested by {}",
        msg.author.name
    )));
    msg.channel_id
        .send_message(ctx.cache_http, CreateMessage::new().embed(embed))
        .await?;
    Ok(())
}
