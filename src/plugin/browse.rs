//! `next` / `vnext`: random image and video browsing.
//!
//! Each command posts an embed with the session controls and registers a
//! `Session` bound to the invoking user; the session router handles every
//! button press from there.  The helpers here are shared with the router so
//! navigation renders exactly like the initial post.

use crate::{
    booru::Post,
    context::Context,
    economy,
    event::*,
    log_internal,
    plugin::*,
    session::{self, BrowseState, Session, SessionKind, VideoState},
};
use anyhow::Result;
use serenity::all::{
    ChannelId, CreateAttachment, CreateEmbed, CreateEmbedFooter, CreateMessage, MessageId, UserId,
};

/// Discord rejects larger attachments for regular guilds.
const MAX_ATTACHMENT_BYTES: usize = 8_000_000;

pub struct Browse;

#[serenity::async_trait]
impl Plugin for Browse {
    fn name(&self) -> &'static str {
        "browse"
    }

    async fn usage(&self, ctx: &Context<'_>) -> Option<String> {
        let prefix = &ctx.cfg.read().await.general.command_prefix;
        Some(format!(
            "{}next [tags] - fetch a random image\n{}vnext [tags] - fetch a random video",
            prefix, prefix
        ))
    }

    async fn handle(&self, ctx: &Context<'_>, event: &Event) -> Result<EventHandled> {
        if let Some((msg, args)) = event.is_bot_cmd(ctx, "next").await {
            return next_image(ctx, msg.channel_id, msg.author.id, args).await;
        }
        if let Some((msg, args)) = event.is_bot_cmd(ctx, "vnext").await {
            return next_video(ctx, msg.channel_id, msg.author.id, args).await;
        }
        Ok(EventHandled::No)
    }
}

/// Tag filter for a command invocation; empty args fall back to the
/// configured default.
pub async fn resolve_filter(ctx: &Context<'_>, args: &str) -> String {
    if args.trim().is_empty() {
        ctx.cfg.read().await.booru.default_filter.clone()
    } else {
        args.trim().to_owned()
    }
}

/// Bumps the view counter and, when the `reward_views` policy is on, awards
/// waifame for the post.  Flushes accounts before returning.
pub async fn record_view_and_award(
    ctx: &Context<'_>,
    user: UserId,
    post: &Post,
) -> (u64, Option<(i64, i64)>) {
    let reward_views = ctx.cfg.read().await.economy.reward_views;
    // Resolve the fame bonus before taking the account lock; the lookup can
    // stall on the network.
    let bonus = if reward_views {
        Some(ctx.fame.artist_fame_bonus(ctx.booru, post).await)
    } else {
        None
    };

    let mut pstate = ctx.pstate.write().await;
    let (views, earned) = {
        let account = pstate.account_mut(user);
        let views = economy::record_view(account);
        let earned = bonus.map(|bonus| {
            let earned = economy::earned_waifame(post, bonus);
            account.waifame += earned;
            (earned, account.waifame)
        });
        (views, earned)
    };
    pstate.save().await;
    (views, earned)
}

pub fn image_embed(post: &Post, api_url: &str, footer: &str) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(format!("Post #{}", post.id))
        .url(post.page_url(api_url))
        .colour(0xBB86FC)
        .footer(CreateEmbedFooter::new(footer));
    if let Some(url) = post.media_url() {
        embed = embed.image(url);
    }
    embed
}

pub fn image_footer(views: u64, earned: Option<(i64, i64)>) -> String {
    match earned {
        Some((earned, total)) => {
            format!("👁️ {} views | 💰 +{} waifame ({} total)", views, earned, total)
        }
        None => format!("👁️ {} views | ❤️ Favorite to earn waifame", views),
    }
}

pub fn video_embed(
    post: &Post,
    api_url: &str,
    views: Option<u64>,
    earned: Option<(i64, i64)>,
) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(format!("🎬 Video #{}", post.id))
        .url(post.page_url(api_url))
        .colour(0x9B59B6)
        .footer(CreateEmbedFooter::new(format!(
            "Tags: {:.60}",
            post.tag_string
        )));
    if let Some(views) = views {
        embed = embed.field("👁️ Views", views.to_string(), true);
    }
    if let Some((earned, total)) = earned {
        embed = embed.field("💰 Waifame", format!("+{} ({} total)", earned, total), true);
    }
    embed
}

/// Posts the video itself alongside the embed message: as an attachment when
/// it fits the platform limit, as a bare link otherwise.  Navigation deletes
/// the previous companion and calls this again.
pub async fn send_video_companion(
    ctx: &Context<'_>,
    channel: ChannelId,
    post: &Post,
) -> Option<MessageId> {
    let url = post.media_url()?;

    let message = match ctx.booru.download(url).await {
        Some(bytes) if bytes.len() < MAX_ATTACHMENT_BYTES => {
            let filename = format!("video_{}.{}", post.id, post.file_ext);
            let attachment = CreateAttachment::bytes(bytes, filename);
            channel
                .send_message(ctx.cache_http, CreateMessage::new().add_file(attachment))
                .await
        }
        Some(_) => {
            channel
                .send_message(
                    ctx.cache_http,
                    CreateMessage::new().content(format!("📹 Video too large to attach: {}", url)),
                )
                .await
        }
        None => {
            channel
                .send_message(ctx.cache_http, CreateMessage::new().content(format!("📹 {}", url)))
                .await
        }
    };

    match message {
        Ok(message) => Some(message.id),
        Err(err) => {
            log_internal!("Could not post video companion: {}", err);
            None
        }
    }
}

async fn next_image(
    ctx: &Context<'_>,
    channel: ChannelId,
    author: UserId,
    args: &str,
) -> Result<EventHandled> {
    let filter = resolve_filter(ctx, args).await;

    let Some(post) = ctx.booru.fetch_image(&filter).await else {
        channel
            .say(ctx.cache_http, "Couldn't find an image with those tags.")
            .await?;
        return Ok(EventHandled::Yes);
    };

    let (views, earned) = record_view_and_award(ctx, author, &post).await;
    let is_favorite = ctx.pstate.write().await.account(author).is_favorite(post.id);

    let embed = image_embed(&post, ctx.booru.api_url(), &image_footer(views, earned));
    let components = session::image_components(&filter, is_favorite, post.media_url());
    let sent = channel
        .send_message(
            ctx.cache_http,
            CreateMessage::new().embed(embed).components(components),
        )
        .await?;

    let mut vstate = ctx.vstate.write().await;
    vstate.image_history.append(channel, post.clone());
    vstate.sessions.insert(
        sent.id,
        Session::new(Some(author), SessionKind::Image(BrowseState { filter, post })),
    );

    Ok(EventHandled::Yes)
}

async fn next_video(
    ctx: &Context<'_>,
    channel: ChannelId,
    author: UserId,
    args: &str,
) -> Result<EventHandled> {
    let filter = resolve_filter(ctx, args).await;

    let Some(post) = ctx.booru.fetch_video(&filter).await else {
        channel
            .say(
                ctx.cache_http,
                "Couldn't find a video with those tags. Try different ones!",
            )
            .await?;
        return Ok(EventHandled::Yes);
    };

    let (views, earned) = record_view_and_award(ctx, author, &post).await;
    let companion = send_video_companion(ctx, channel, &post).await;

    let embed = video_embed(&post, ctx.booru.api_url(), Some(views), earned);
    let components = session::video_components(&filter, post.media_url());
    let sent = channel
        .send_message(
            ctx.cache_http,
            CreateMessage::new().embed(embed).components(components),
        )
        .await?;

    let mut vstate = ctx.vstate.write().await;
    vstate.video_history.append(channel, post.clone());
    vstate.sessions.insert(
        sent.id,
        Session::new(
            Some(author),
            SessionKind::Video(VideoState {
                filter,
                post,
                companion,
            }),
        ),
    );

    Ok(EventHandled::Yes)
}
