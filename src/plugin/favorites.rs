//! `favorites_list`: private favorites browser, delivered over DM.

use crate::{
    context::Context,
    event::*,
    persistent_state::FavoriteEntry,
    plugin::*,
    session::{self, FavoritesState, Session, SessionKind},
};
use anyhow::Result;
use serenity::all::{CreateEmbed, CreateEmbedFooter, CreateMessage};

pub struct FavoritesList;

#[serenity::async_trait]
impl Plugin for FavoritesList {
    fn name(&self) -> &'static str {
        "favorites"
    }

    async fn usage(&self, ctx: &Context<'_>) -> Option<String> {
        let prefix = &ctx.cfg.read().await.general.command_prefix;
        Some(format!(
            "{}favorites_list - browse your favorites (sent via DM)",
            prefix
        ))
    }

    async fn handle(&self, ctx: &Context<'_>, event: &Event) -> Result<EventHandled> {
        let Some((msg, _)) = event.is_bot_cmd(ctx, "favorites_list").await else {
            return Ok(EventHandled::No);
        };

        let favorites = ctx
            .pstate
            .write()
            .await
            .account(msg.author.id)
            .favorites
            .clone();

        if favorites.is_empty() {
            msg.reply(
                ctx.cache_http,
                "You don't have any favorites yet. Add some with the ❤️ button!",
            )
            .await?;
            return Ok(EventHandled::Yes);
        }

        let embed = favorite_embed(
            &favorites[0],
            ctx.booru.api_url(),
            0,
            favorites.len(),
            None,
        );
        let components = session::favorites_components(0, favorites.len());

        let dm = msg
            .author
            .dm(
                ctx.cache_http,
                CreateMessage::new().embed(embed).components(components),
            )
            .await;

        match dm {
            Ok(dm) => {
                ctx.vstate.write().await.sessions.insert(
                    dm.id,
                    Session::new(
                        Some(msg.author.id),
                        SessionKind::Favorites(FavoritesState { index: 0 }),
                    ),
                );
                msg.reply(ctx.cache_http, "📬 Check your DMs for your favorites!")
                    .await?;
            }
            Err(_) => {
                msg.reply(
                    ctx.cache_http,
                    "Couldn't DM you — are your direct messages open?",
                )
                .await?;
            }
        }

        Ok(EventHandled::Yes)
    }
}

/// One favorites-browser page.  `note` prepends a transient status (e.g. a
/// deletion confirmation) to the footer.
pub fn favorite_embed(
    entry: &FavoriteEntry,
    api_url: &str,
    index: usize,
    len: usize,
    note: Option<&str>,
) -> CreateEmbed {
    let mut footer = format!("{}/{} | Only visible to you", index + 1, len);
    if let Some(note) = note {
        footer = format!("{} | {}", note, footer);
    }

    let mut embed = CreateEmbed::new()
        .title(format!("❤️ Favorite #{}", entry.id))
        .url(format!("{}/posts/{}", api_url, entry.id))
        .colour(0xFF0055)
        .footer(CreateEmbedFooter::new(footer));
    if let Some(url) = &entry.file_url {
        embed = embed.image(url);
    }
    embed
}
