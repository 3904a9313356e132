//! The quick mini-games: `slots`, `daily`, `fish`, `steal`, and the `games`
//! catalog.  Blackjack has enough state to warrant its own plugin.

use crate::{
    context::Context,
    economy::{self, GameError, StealOutcome, SLOT_SYMBOLS},
    event::*,
    helper,
    plugin::*,
};
use anyhow::Result;
use serenity::all::{CreateEmbed, CreateEmbedFooter, CreateMessage, Message};

pub struct Games;

#[serenity::async_trait]
impl Plugin for Games {
    fn name(&self) -> &'static str {
        "games"
    }

    async fn usage(&self, ctx: &Context<'_>) -> Option<String> {
        let prefix = &ctx.cfg.read().await.general.command_prefix;
        Some(format!(
            "{p}slots <wager> - slot machine\n\
             {p}daily - claim your daily reward\n\
             {p}fish - go fishing (30 min cooldown)\n\
             {p}steal @user - rob someone (1 h cooldown)\n\
             {p}games - list the mini-games",
            p = prefix
        ))
    }

    async fn handle(&self, ctx: &Context<'_>, event: &Event) -> Result<EventHandled> {
        if let Some((msg, args)) = event.is_bot_cmd(ctx, "slots").await {
            return slots(ctx, msg, args).await;
        }
        if let Some((msg, _)) = event.is_bot_cmd(ctx, "daily").await {
            return daily(ctx, msg).await;
        }
        if let Some((msg, _)) = event.is_bot_cmd(ctx, "fish").await {
            return fish(ctx, msg).await;
        }
        if let Some((msg, _)) = event.is_bot_cmd(ctx, "steal").await {
            return steal(ctx, msg).await;
        }
        if let Some((msg, _)) = event.is_bot_cmd(ctx, "games").await {
            return catalog(ctx, msg).await;
        }
        Ok(EventHandled::No)
    }
}

async fn slots(ctx: &Context<'_>, msg: &Message, args: &str) -> Result<EventHandled> {
    let wager: i64 = args.split_whitespace().next().and_then(|w| w.parse().ok()).unwrap_or(0);

    let outcome = {
        let mut pstate = ctx.pstate.write().await;
        let result = {
            let account = pstate.account_mut(msg.author.id);
            let mut rng = rand::thread_rng();
            economy::play_slots(account, wager, &mut rng)
        };
        if result.is_ok() {
            pstate.save().await;
        }
        result
    };

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(GameError::WagerTooSmall(min)) => {
            let prefix = ctx.cfg.read().await.general.command_prefix.clone();
            msg.reply(
                ctx.cache_http,
                format!("❌ Minimum wager: **{} waifame**. Usage: `{}slots 50`", min, prefix),
            )
            .await?;
            return Ok(EventHandled::Yes);
        }
        Err(GameError::InsufficientFunds(balance)) => {
            msg.reply(
                ctx.cache_http,
                format!("❌ You don't have enough waifame! You hold **{}** 💰", balance),
            )
            .await?;
            return Ok(EventHandled::Yes);
        }
        Err(err) => {
            msg.reply(ctx.cache_http, format!("❌ {}", err)).await?;
            return Ok(EventHandled::Yes);
        }
    };

    let [a, b, c] = outcome.reel;
    let title = if outcome.multiplier >= 20 {
        "🎉 MEGA JACKPOT !!! 🎉"
    } else if outcome.multiplier == 15 {
        "💎 DIAMOND JACKPOT! 💎"
    } else if outcome.multiplier == 10 {
        "🎰 JACKPOT!"
    } else if outcome.multiplier == 2 {
        "✨ Small win!"
    } else {
        "😢 Lost..."
    };

    let mut embed = CreateEmbed::new()
        .title(title)
        .colour(if outcome.winnings > 0 { 0xFFD700 } else { 0xFF0000 })
        .field(
            "🎰 Result",
            format!(
                "『 {} │ {} │ {} 』",
                SLOT_SYMBOLS[a], SLOT_SYMBOLS[b], SLOT_SYMBOLS[c]
            ),
            false,
        );
    if outcome.winnings > 0 {
        embed = embed.field(
            "💰 Winnings",
            format!("+{} waifame (x{})", outcome.winnings, outcome.multiplier),
            true,
        );
    } else {
        embed = embed.field("💸 Loss", format!("-{} waifame", wager), true);
    }
    embed = embed
        .field("💳 Balance", format!("{} waifame", outcome.balance), true)
        .footer(CreateEmbedFooter::new(format!("Player: {}", msg.author.name)));

    msg.channel_id
        .send_message(ctx.cache_http, CreateMessage::new().embed(embed))
        .await?;
    Ok(EventHandled::Yes)
}

async fn daily(ctx: &Context<'_>, msg: &Message) -> Result<EventHandled> {
    let reward = {
        let mut pstate = ctx.pstate.write().await;
        let result = {
            let account = pstate.account_mut(msg.author.id);
            let mut rng = rand::thread_rng();
            economy::claim_daily(account, helper::today(), &mut rng)
        };
        if result.is_ok() {
            pstate.save().await;
        }
        result
    };

    let reward = match reward {
        Ok(reward) => reward,
        Err(_) => {
            msg.reply(
                ctx.cache_http,
                "❌ You already claimed today's reward! Come back tomorrow 🌅",
            )
            .await?;
            return Ok(EventHandled::Yes);
        }
    };

    let embed = CreateEmbed::new()
        .title("🎁 Daily Reward!")
        .colour(0x00FF88)
        .field("💰 Reward", format!("+{} waifame", reward.base), true)
        .field(
            "🔥 Streak Bonus",
            format!("+{} (day {})", reward.streak_bonus, reward.streak),
            true,
        )
        .field("💳 Total Received", format!("**+{}** waifame", reward.total), false)
        .field("💰 New Balance", format!("{} waifame", reward.balance), true)
        .footer(CreateEmbedFooter::new(
            "Come back tomorrow to grow your streak!",
        ));

    msg.channel_id
        .send_message(ctx.cache_http, CreateMessage::new().embed(embed))
        .await?;
    Ok(EventHandled::Yes)
}

async fn fish(ctx: &Context<'_>, msg: &Message) -> Result<EventHandled> {
    let catch = {
        let mut pstate = ctx.pstate.write().await;
        let result = {
            let account = pstate.account_mut(msg.author.id);
            let mut rng = rand::thread_rng();
            economy::go_fishing(account, helper::epoch_secs(), &mut rng)
        };
        if result.is_ok() {
            pstate.save().await;
        }
        result
    };

    let catch = match catch {
        Ok(catch) => catch,
        Err(GameError::Cooldown(remaining)) => {
            msg.reply(
                ctx.cache_http,
                format!(
                    "🎣 You need to wait **{}m {}s** before fishing again!",
                    remaining / 60,
                    remaining % 60
                ),
            )
            .await?;
            return Ok(EventHandled::Yes);
        }
        Err(err) => {
            msg.reply(ctx.cache_http, format!("❌ {}", err)).await?;
            return Ok(EventHandled::Yes);
        }
    };

    let embed = CreateEmbed::new()
        .title("🎣 Gone Fishing!")
        .colour(catch.entry.rarity.colour())
        .field(
            "🐟 Catch",
            format!("{} **{}**", catch.entry.emoji, catch.entry.name),
            true,
        )
        .field("⭐ Rarity", catch.entry.rarity.label(), true)
        .field("💰 Value", format!("+{} waifame", catch.value), true)
        .field("💳 Balance", format!("{} waifame", catch.balance), true)
        .field("🎣 Total Caught", format!("{} fish", catch.total_caught), true)
        .footer(CreateEmbedFooter::new("Come back in 30 minutes!"));

    msg.channel_id
        .send_message(ctx.cache_http, CreateMessage::new().embed(embed))
        .await?;
    Ok(EventHandled::Yes)
}

async fn steal(ctx: &Context<'_>, msg: &Message) -> Result<EventHandled> {
    let prefix = ctx.cfg.read().await.general.command_prefix.clone();
    let Some(target) = msg.mentions.first() else {
        msg.reply(ctx.cache_http, format!("❌ Usage: `{}steal @user`", prefix))
            .await?;
        return Ok(EventHandled::Yes);
    };
    if target.id == msg.author.id {
        msg.reply(ctx.cache_http, "❌ You can't rob yourself!").await?;
        return Ok(EventHandled::Yes);
    }
    if target.bot {
        msg.reply(ctx.cache_http, "❌ You can't rob a bot!").await?;
        return Ok(EventHandled::Yes);
    }

    let outcome = {
        let mut pstate = ctx.pstate.write().await;
        let result = pstate.with_pair(msg.author.id, target.id, |thief, victim| {
            let mut rng = rand::thread_rng();
            economy::attempt_steal(thief, victim, helper::epoch_secs(), &mut rng)
        });
        if matches!(result, Some(Ok(_))) {
            pstate.save().await;
        }
        result
    };

    let outcome = match outcome {
        Some(Ok(outcome)) => outcome,
        Some(Err(GameError::Cooldown(remaining))) => {
            msg.reply(
                ctx.cache_http,
                format!(
                    "🕐 You need to wait **{} minutes** before stealing again!",
                    remaining / 60
                ),
            )
            .await?;
            return Ok(EventHandled::Yes);
        }
        Some(Err(GameError::TargetTooPoor(min))) => {
            msg.reply(
                ctx.cache_http,
                format!("❌ **{}** is too poor to rob (< {} waifame)", target.name, min),
            )
            .await?;
            return Ok(EventHandled::Yes);
        }
        Some(Err(err)) => {
            msg.reply(ctx.cache_http, format!("❌ {}", err)).await?;
            return Ok(EventHandled::Yes);
        }
        None => {
            msg.reply(ctx.cache_http, "❌ You can't rob yourself!").await?;
            return Ok(EventHandled::Yes);
        }
    };

    let embed = match outcome {
        StealOutcome::Success { stolen, balance } => CreateEmbed::new()
            .title("💰 Heist succeeded!")
            .colour(0x00FF00)
            .field("🎭 Victim", target.name.clone(), true)
            .field("💸 Stolen", format!("+{} waifame", stolen), true)
            .field("💳 Your Balance", format!("{} waifame", balance), true),
        StealOutcome::Caught { fine, balance } => CreateEmbed::new()
            .title("🚨 Heist failed!")
            .colour(0xFF0000)
            .field("👮 Busted!", "You were caught red-handed!", false)
            .field("💸 Fine", format!("-{} waifame", fine), true)
            .field("💳 Your Balance", format!("{} waifame", balance), true),
    };
    let embed = embed.footer(CreateEmbedFooter::new(format!(
        "Thief: {} | Cooldown: 1 hour",
        msg.author.name
    )));

    msg.channel_id
        .send_message(ctx.cache_http, CreateMessage::new().embed(embed))
        .await?;
    Ok(EventHandled::Yes)
}

async fn catalog(ctx: &Context<'_>, msg: &Message) -> Result<EventHandled> {
    let p = ctx.cfg.read().await.general.command_prefix.clone();

    let embed = CreateEmbed::new()
        .title("🎮 Available Mini-Games")
        .colour(0x9B59B6)
        .field(
            format!("🎰 {}slots <wager>", p),
            "Slot machine! Three of a kind = jackpot (x10-x20)",
            false,
        )
        .field(
            format!("🃏 {}blackjack <wager>", p),
            "Play blackjack against the bot. Natural = x2.5",
            false,
        )
        .field(
            format!("🎣 {}fish", p),
            "Catch a fish! Rarity: Common → Legendary (cooldown: 30 min)",
            false,
        )
        .field(
            format!("🎁 {}daily", p),
            "Daily reward (50-150 💰) plus a streak bonus",
            false,
        )
        .field(
            format!("💰 {}steal @user", p),
            "Try to rob someone (40% success, cooldown: 1 h)",
            false,
        )
        .field(
            format!("📊 {}stats", p),
            "Show your statistics and waifame",
            false,
        )
        .field(
            format!("🏆 {}leaderboard", p),
            "Waifame ranking",
            false,
        )
        .footer(CreateEmbedFooter::new(
            "💡 Minimum wager: 10 waifame | Earn waifame by ❤️-favoriting posts",
        ));

    msg.channel_id
        .send_message(ctx.cache_http, CreateMessage::new().embed(embed))
        .await?;
    Ok(EventHandled::Yes)
}
