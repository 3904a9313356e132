//! `blackjack`: the dealt round lives in volatile state keyed by the player,
//! bound to the message carrying the hit/stand buttons.  One open round per
//! user; a second `blackjack` while one is active is refused.

use crate::{
    blackjack::{self, Round},
    context::Context,
    economy,
    event::*,
    plugin::*,
    session::{self, ids},
};
use anyhow::Result;
use serenity::all::{
    ComponentInteraction, CreateEmbed, CreateInteractionResponse, CreateInteractionResponseMessage,
    CreateMessage, Message,
};

pub struct Blackjack;

#[serenity::async_trait]
impl Plugin for Blackjack {
    fn name(&self) -> &'static str {
        "blackjack"
    }

    async fn usage(&self, ctx: &Context<'_>) -> Option<String> {
        let prefix = &ctx.cfg.read().await.general.command_prefix;
        Some(format!(
            "{}blackjack <wager> - play blackjack against the bot",
            prefix
        ))
    }

    async fn handle(&self, ctx: &Context<'_>, event: &Event) -> Result<EventHandled> {
        if let Some((msg, args)) = event.is_bot_cmd(ctx, "blackjack").await {
            return start(ctx, msg, args).await;
        }

        if let Some(component) = event.as_component() {
            match component.data.custom_id.as_str() {
                ids::BLACKJACK_HIT => {
                    hit(ctx, component).await?;
                    return Ok(EventHandled::Yes);
                }
                ids::BLACKJACK_STAND => {
                    stand(ctx, component).await?;
                    return Ok(EventHandled::Yes);
                }
                _ => {}
            }
        }

        Ok(EventHandled::No)
    }
}

async fn start(ctx: &Context<'_>, msg: &Message, args: &str) -> Result<EventHandled> {
    let wager: i64 = args.split_whitespace().next().and_then(|w| w.parse().ok()).unwrap_or(0);

    if wager < economy::MIN_WAGER {
        let prefix = ctx.cfg.read().await.general.command_prefix.clone();
        msg.reply(
            ctx.cache_http,
            format!(
                "❌ Minimum wager: **{} waifame**. Usage: `{}blackjack 50`",
                economy::MIN_WAGER,
                prefix
            ),
        )
        .await?;
        return Ok(EventHandled::Yes);
    }

    let balance = ctx.pstate.write().await.account(msg.author.id).waifame;
    if balance < wager {
        msg.reply(
            ctx.cache_http,
            format!("❌ You don't have enough waifame! You hold **{}** 💰", balance),
        )
        .await?;
        return Ok(EventHandled::Yes);
    }

    if ctx.vstate.read().await.blackjack.has_active(msg.author.id) {
        msg.reply(
            ctx.cache_http,
            "❌ You already have a blackjack round going — finish it first!",
        )
        .await?;
        return Ok(EventHandled::Yes);
    }

    let round = {
        let mut rng = rand::thread_rng();
        Round::deal(wager, &mut rng)
    };

    // A natural 21 settles immediately; the round is never stored.
    if round.is_natural() {
        let winnings = wager * 5 / 2;
        let balance = {
            let mut pstate = ctx.pstate.write().await;
            let balance = {
                let account = pstate.account_mut(msg.author.id);
                account.waifame += blackjack::natural_delta(wager);
                account.waifame
            };
            pstate.save().await;
            balance
        };

        let embed = CreateEmbed::new()
            .title("🃏 BLACKJACK!")
            .colour(0xFFD700)
            .field(
                "Your cards",
                format!("{} = **21**", blackjack::format_hand(&round.player, false)),
                false,
            )
            .field("💰 Winnings", format!("+{} waifame (x2.5)", winnings), true)
            .field("💳 Balance", format!("{} waifame", balance), true);
        msg.channel_id
            .send_message(ctx.cache_http, CreateMessage::new().embed(embed))
            .await?;
        return Ok(EventHandled::Yes);
    }

    let embed = CreateEmbed::new()
        .title("🃏 Blackjack")
        .colour(0x2ECC71)
        .field(
            "Your cards",
            format!(
                "{} = **{}**",
                blackjack::format_hand(&round.player, false),
                round.player_value()
            ),
            false,
        )
        .field(
            "Dealer",
            blackjack::format_hand(&round.dealer, true),
            false,
        )
        .field("💰 Wager", format!("{} waifame", wager), true);

    let sent = msg
        .channel_id
        .send_message(
            ctx.cache_http,
            CreateMessage::new()
                .embed(embed)
                .components(session::blackjack_components(false)),
        )
        .await?;

    if ctx
        .vstate
        .write()
        .await
        .blackjack
        .start(msg.author.id, round, sent.id)
        .is_err()
    {
        // Raced with another invocation; the newer message wins nothing.
        msg.reply(ctx.cache_http, "❌ You already have a round going!")
            .await?;
    }

    Ok(EventHandled::Yes)
}

/// Settles `delta` against the player's balance, floored at zero, and
/// flushes.  Returns the new balance.
async fn settle_balance(ctx: &Context<'_>, user: serenity::all::UserId, delta: i64) -> i64 {
    let mut pstate = ctx.pstate.write().await;
    let balance = {
        let account = pstate.account_mut(user);
        account.waifame = (account.waifame + delta).max(0);
        account.waifame
    };
    pstate.save().await;
    balance
}

async fn hit(ctx: &Context<'_>, component: &ComponentInteraction) -> Result<()> {
    let step = {
        let mut vstate = ctx.vstate.write().await;
        match vstate.blackjack.get_mut(component.user.id) {
            Some(open) if open.round.active => {
                if open.message != component.message.id {
                    HitStep::WrongMessage
                } else {
                    let value = open.round.hit();
                    if value > 21 {
                        open.round.active = false;
                        HitStep::Bust {
                            hand: blackjack::format_hand(&open.round.player, false),
                            value,
                            wager: open.round.wager,
                        }
                    } else {
                        HitStep::Continue {
                            player: blackjack::format_hand(&open.round.player, false),
                            value,
                            dealer: blackjack::format_hand(&open.round.dealer, true),
                        }
                    }
                }
            }
            _ => HitStep::NoRound,
        }
    };

    match step {
        HitStep::NoRound => {
            ephemeral(ctx, component, "❌ You don't have an active round!").await
        }
        HitStep::WrongMessage => ephemeral(ctx, component, "❌ This isn't your game!").await,
        HitStep::Continue {
            player,
            value,
            dealer,
        } => {
            let embed = CreateEmbed::new()
                .title("🃏 Blackjack")
                .colour(0x2ECC71)
                .field("Your cards", format!("{} = **{}**", player, value), false)
                .field("Dealer", dealer, false);
            update(ctx, component, embed, session::blackjack_components(false)).await
        }
        HitStep::Bust { hand, value, wager } => {
            ctx.vstate.write().await.blackjack.finish(component.user.id);
            settle_balance(ctx, component.user.id, -wager).await;

            let embed = CreateEmbed::new()
                .title("💥 BUST! You lose!")
                .colour(0xFF0000)
                .field("Your cards", format!("{} = **{}**", hand, value), false)
                .field("💸 Loss", format!("-{} waifame", wager), true);
            update(ctx, component, embed, session::blackjack_components(true)).await
        }
    }
}

enum HitStep {
    NoRound,
    WrongMessage,
    Continue {
        player: String,
        value: u32,
        dealer: String,
    },
    Bust {
        hand: String,
        value: u32,
        wager: i64,
    },
}

async fn stand(ctx: &Context<'_>, component: &ComponentInteraction) -> Result<()> {
    enum StandStep {
        NoRound,
        WrongMessage,
        Done,
    }

    let step = {
        let mut vstate = ctx.vstate.write().await;
        match vstate.blackjack.get_mut(component.user.id) {
            Some(open) if open.round.active => {
                if open.message != component.message.id {
                    StandStep::WrongMessage
                } else {
                    open.round.active = false;
                    open.round.dealer_play();
                    StandStep::Done
                }
            }
            _ => StandStep::NoRound,
        }
    };

    let finished = match step {
        StandStep::NoRound => {
            return ephemeral(ctx, component, "❌ You don't have an active round!").await;
        }
        StandStep::WrongMessage => {
            return ephemeral(ctx, component, "❌ This isn't your game!").await;
        }
        StandStep::Done => ctx.vstate.write().await.blackjack.finish(component.user.id),
    };

    let Some(open) = finished else {
        return ephemeral(ctx, component, "❌ You don't have an active round!").await;
    };

    let round = open.round;
    let player_value = round.player_value();
    let dealer_value = round.dealer_value();
    let outcome = blackjack::settle(player_value, dealer_value);
    let delta = blackjack::settlement_delta(outcome, round.wager);
    let balance = settle_balance(ctx, component.user.id, delta).await;

    let (title, colour, result) = match outcome {
        blackjack::RoundOutcome::Win => (
            "🃏 🎉 You win!",
            0x00FF00,
            format!("+{} waifame", round.wager * 2),
        ),
        blackjack::RoundOutcome::Lose => (
            "🃏 😢 You lose...",
            0xFF0000,
            format!("-{} waifame", round.wager),
        ),
        blackjack::RoundOutcome::Push => (
            "🃏 🤝 Push!",
            0xFFFF00,
            "0 waifame (wager returned)".to_owned(),
        ),
    };

    let embed = CreateEmbed::new()
        .title(title)
        .colour(colour)
        .field(
            "Your cards",
            format!(
                "{} = **{}**",
                blackjack::format_hand(&round.player, false),
                player_value
            ),
            false,
        )
        .field(
            "Dealer",
            format!(
                "{} = **{}**",
                blackjack::format_hand(&round.dealer, false),
                dealer_value
            ),
            false,
        )
        .field("💰 Result", result, true)
        .field("💳 Balance", format!("{} waifame", balance), true);

    update(ctx, component, embed, session::blackjack_components(true)).await
}

async fn update(
    ctx: &Context<'_>,
    component: &ComponentInteraction,
    embed: CreateEmbed,
    components: Vec<serenity::all::CreateActionRow>,
) -> Result<()> {
    component
        .create_response(
            ctx.http,
            CreateInteractionResponse::UpdateMessage(
                CreateInteractionResponseMessage::new()
                    .embed(embed)
                    .components(components),
            ),
        )
        .await
        .map_err(Into::into)
}

async fn ephemeral(ctx: &Context<'_>, component: &ComponentInteraction, text: &str) -> Result<()> {
    component
        .create_response(
            ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(text)
                    .ephemeral(true),
            ),
        )
        .await
        .map_err(Into::into)
}
