//! `stats` and `leaderboard`: account statistics and the waifame ranking.

use crate::{context::Context, economy, event::*, helper, helper::UserIdHelper, plugin::*};
use anyhow::Result;
use serenity::all::{CreateEmbed, CreateEmbedFooter, CreateMessage, Message, UserId};

pub struct Stats;

#[serenity::async_trait]
impl Plugin for Stats {
    fn name(&self) -> &'static str {
        "stats"
    }

    async fn usage(&self, ctx: &Context<'_>) -> Option<String> {
        let prefix = &ctx.cfg.read().await.general.command_prefix;
        Some(format!(
            "{}stats - show your statistics\n{}leaderboard - waifame ranking",
            prefix, prefix
        ))
    }

    async fn handle(&self, ctx: &Context<'_>, event: &Event) -> Result<EventHandled> {
        if let Some((msg, _)) = event.is_bot_cmd(ctx, "stats").await {
            return stats(ctx, msg).await;
        }
        if let Some((msg, _)) = event.is_bot_cmd(ctx, "leaderboard").await {
            return leaderboard(ctx, msg).await;
        }
        Ok(EventHandled::No)
    }
}

async fn stats(ctx: &Context<'_>, msg: &Message) -> Result<EventHandled> {
    let account = ctx.pstate.write().await.account(msg.author.id).clone();
    let remaining = economy::remaining_daily_favorites(&account, helper::today());

    let embed = CreateEmbed::new()
        .title("📊 Your Statistics")
        .colour(0x00FF88)
        .field("👁️ Posts Viewed", account.view_count.to_string(), true)
        .field("❤️ Favorites", account.favorites.len().to_string(), true)
        .field("💰 Waifame", account.waifame.to_string(), true)
        .field(
            "⭐ Favorites Left",
            format!("{}/5 today", remaining),
            true,
        )
        .field("🎣 Fish Caught", account.fish_caught.to_string(), true)
        .field("🔥 Daily Streak", account.daily_streak.to_string(), true);

    msg.channel_id
        .send_message(ctx.cache_http, CreateMessage::new().embed(embed))
        .await?;
    Ok(EventHandled::Yes)
}

async fn leaderboard(ctx: &Context<'_>, msg: &Message) -> Result<EventHandled> {
    // Only accounts that actually hold waifame are ranked.
    let mut ranked: Vec<(UserId, i64)> = {
        let pstate = ctx.pstate.read().await;
        pstate
            .accounts()
            .iter()
            .filter(|(_, account)| account.waifame > 0)
            .map(|(user_id, account)| (*user_id, account.waifame))
            .collect()
    };
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    if ranked.is_empty() {
        msg.reply(
            ctx.cache_http,
            "Nobody has any waifame yet! Use `next` to start earning some.",
        )
        .await?;
        return Ok(EventHandled::Yes);
    }

    let medals = ["🥇", "🥈", "🥉"];
    let mut description = String::new();
    for (i, (user_id, waifame)) in ranked.iter().take(10).enumerate() {
        let name = user_id.display_name(ctx).await;
        let rank = match medals.get(i) {
            Some(medal) => (*medal).to_owned(),
            None => format!("**{}.**", i + 1),
        };
        description.push_str(&format!("{} {} — **{}** 💰\n", rank, name, waifame));
    }

    let embed = CreateEmbed::new()
        .title("🏆 Waifame Leaderboard")
        .colour(0xFFD700)
        .description(description)
        .footer(CreateEmbedFooter::new(format!(
            "Total: {} participant(s)",
            ranked.len()
        )));

    msg.channel_id
        .send_message(ctx.cache_http, CreateMessage::new().embed(embed))
        .await?;
    Ok(EventHandled::Yes)
}
