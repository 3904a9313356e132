//! Routes component and modal interactions to the session they belong to.
//!
//! Actions resolve against the `Session` registered for the message the
//! component lives on.  Authorization runs before anything mutates; denials
//! and expired sessions get a non-mutating ephemeral notice.  Blackjack
//! buttons use their own custom ids and are handled by the blackjack plugin.

use crate::{
    booru::{Post, Rating},
    context::Context,
    economy,
    event::*,
    helper, log_internal,
    persistent_state::FavoriteEntry,
    plugin::{browse, favorites, *},
    session::{self, ids, Action, Session, SessionKind},
};
use anyhow::Result;
use serenity::all::{
    ActionRowComponent, ChannelId, ComponentInteraction, ComponentInteractionDataKind,
    CreateActionRow, CreateEmbed, CreateInputText, CreateInteractionResponse,
    CreateInteractionResponseFollowup, CreateInteractionResponseMessage, CreateModal,
    EditInteractionResponse, EditMessage, InputTextStyle, MessageId, ModalInteraction, UserId,
};

const EXPIRED_NOTICE: &str = "These controls have expired. Run the command again.";
const WRONG_SURFACE_NOTICE: &str = "That control doesn't work here.";

pub struct SessionRouter;

#[serenity::async_trait]
impl Plugin for SessionRouter {
    fn name(&self) -> &'static str {
        "sessions"
    }

    async fn usage(&self, _ctx: &Context<'_>) -> Option<String> {
        None
    }

    async fn handle(&self, ctx: &Context<'_>, event: &Event) -> Result<EventHandled> {
        if let Some(component) = event.as_component() {
            let Some(action) = Action::parse(&component.data.custom_id) else {
                return Ok(EventHandled::No);
            };
            handle_action(ctx, component, action).await?;
            return Ok(EventHandled::Yes);
        }

        if let Some(modal) = event.as_modal() {
            if modal.data.custom_id.starts_with(ids::SEARCH_MODAL) {
                handle_search_modal(ctx, modal).await?;
                return Ok(EventHandled::Yes);
            }
        }

        Ok(EventHandled::No)
    }
}

async fn handle_action(
    ctx: &Context<'_>,
    component: &ComponentInteraction,
    action: Action,
) -> Result<()> {
    // Authorize before anything can mutate.
    {
        let mut vstate = ctx.vstate.write().await;
        let Some(session) = vstate.sessions.get_mut(component.message.id) else {
            drop(vstate);
            return ephemeral(ctx, component, EXPIRED_NOTICE).await;
        };
        if let Err(denied) = session.authorize(component.user.id) {
            drop(vstate);
            return ephemeral(ctx, component, &format!("❌ {}", denied)).await;
        }
    }

    match action {
        Action::SetFilter(rating) => advance(ctx, component, Some(rating)).await,
        Action::Advance => advance(ctx, component, None).await,
        Action::Rewind => rewind(ctx, component).await,
        Action::ToggleFavorite => toggle_favorite(ctx, component).await,
        Action::Search => open_search_modal(ctx, component).await,
        Action::Help => help_notice(ctx, component).await,
        Action::FavPrev | Action::FavNext | Action::FavDelete => {
            favorites_nav(ctx, component, action).await
        }
        Action::QuizAnswer(choice) => quiz_answer(ctx, component, choice).await,
        Action::PickTag => pick_tag(ctx, component).await,
    }
}

// ---------------------------------------------------------------------------
// Image/video navigation

enum Surface {
    Image,
    Video,
}

/// Filter change and "next" share a path: both fetch a fresh post under the
/// session's current filter and append it to the history.
async fn advance(
    ctx: &Context<'_>,
    component: &ComponentInteraction,
    rating: Option<Rating>,
) -> Result<()> {
    let picked = {
        let mut vstate = ctx.vstate.write().await;
        let Some(session) = vstate.sessions.get_mut(component.message.id) else {
            drop(vstate);
            return ephemeral(ctx, component, EXPIRED_NOTICE).await;
        };
        match &mut session.kind {
            SessionKind::Image(state) => {
                if let Some(rating) = rating {
                    state.filter = rating.tag().to_owned();
                }
                Some((Surface::Image, state.filter.clone()))
            }
            SessionKind::Video(state) => {
                if let Some(rating) = rating {
                    state.filter = rating.tag().to_owned();
                }
                Some((Surface::Video, state.filter.clone()))
            }
            _ => None,
        }
    };
    let Some((surface, filter)) = picked else {
        return ephemeral(ctx, component, WRONG_SURFACE_NOTICE).await;
    };

    // Acknowledge now; the upstream fetch can outlive the interaction window.
    component
        .create_response(ctx.http, CreateInteractionResponse::Acknowledge)
        .await?;

    match surface {
        Surface::Image => advance_image(ctx, component, &filter).await,
        Surface::Video => advance_video(ctx, component, &filter).await,
    }
}

async fn advance_image(
    ctx: &Context<'_>,
    component: &ComponentInteraction,
    filter: &str,
) -> Result<()> {
    let Some(post) = ctx.booru.fetch_image(filter).await else {
        return followup_ephemeral(ctx, component, "Couldn't fetch a new image.").await;
    };

    let (views, earned) = browse::record_view_and_award(ctx, component.user.id, &post).await;
    let is_favorite = is_favorite(ctx, component.user.id, post.id).await;

    {
        let mut guard = ctx.vstate.write().await;
        let vstate = &mut *guard;
        vstate.image_history.append(component.channel_id, post.clone());
        if let Some(session) = vstate.sessions.get_mut(component.message.id) {
            if let SessionKind::Image(state) = &mut session.kind {
                state.post = post.clone();
            }
        }
    }

    let embed = browse::image_embed(
        &post,
        ctx.booru.api_url(),
        &browse::image_footer(views, earned),
    );
    let components = session::image_components(filter, is_favorite, post.media_url());
    component
        .channel_id
        .edit_message(
            ctx.cache_http,
            component.message.id,
            EditMessage::new().embed(embed).components(components),
        )
        .await?;
    Ok(())
}

async fn advance_video(
    ctx: &Context<'_>,
    component: &ComponentInteraction,
    filter: &str,
) -> Result<()> {
    let Some(post) = ctx.booru.fetch_video(filter).await else {
        return followup_ephemeral(ctx, component, "Couldn't fetch a new video.").await;
    };

    let (views, earned) = browse::record_view_and_award(ctx, component.user.id, &post).await;

    // The companion attachment is replaced on every step: delete the old
    // message, upload the new file, then remember the new id.
    let old_companion = {
        let mut vstate = ctx.vstate.write().await;
        match vstate
            .sessions
            .get_mut(component.message.id)
            .map(|s| &mut s.kind)
        {
            Some(SessionKind::Video(state)) => state.companion.take(),
            _ => None,
        }
    };
    if let Some(old) = old_companion {
        if let Err(err) = component.channel_id.delete_message(ctx.cache_http, old).await {
            log_internal!("Could not delete old video companion: {}", err);
        }
    }
    let companion = browse::send_video_companion(ctx, component.channel_id, &post).await;

    {
        let mut guard = ctx.vstate.write().await;
        let vstate = &mut *guard;
        vstate.video_history.append(component.channel_id, post.clone());
        if let Some(session) = vstate.sessions.get_mut(component.message.id) {
            if let SessionKind::Video(state) = &mut session.kind {
                state.post = post.clone();
                state.companion = companion;
            }
        }
    }

    let embed = browse::video_embed(&post, ctx.booru.api_url(), Some(views), earned);
    let components = session::video_components(filter, post.media_url());
    component
        .channel_id
        .edit_message(
            ctx.cache_http,
            component.message.id,
            EditMessage::new().embed(embed).components(components),
        )
        .await?;
    Ok(())
}

enum Rewound {
    Image { filter: String, post: Post },
    Video {
        filter: String,
        post: Post,
        old_companion: Option<MessageId>,
    },
    Nothing,
    WrongSurface,
}

async fn rewind(ctx: &Context<'_>, component: &ComponentInteraction) -> Result<()> {
    let rewound = {
        let mut guard = ctx.vstate.write().await;
        let vstate = &mut *guard;
        let Some(session) = vstate.sessions.get_mut(component.message.id) else {
            drop(guard);
            return ephemeral(ctx, component, EXPIRED_NOTICE).await;
        };
        match &mut session.kind {
            SessionKind::Image(state) => {
                match vstate.image_history.rewind(component.channel_id) {
                    Some(prev) => {
                        state.post = prev.clone();
                        Rewound::Image {
                            filter: state.filter.clone(),
                            post: prev.clone(),
                        }
                    }
                    None => Rewound::Nothing,
                }
            }
            SessionKind::Video(state) => {
                match vstate.video_history.rewind(component.channel_id) {
                    Some(prev) => {
                        let post = prev.clone();
                        state.post = post.clone();
                        Rewound::Video {
                            filter: state.filter.clone(),
                            post,
                            old_companion: state.companion.take(),
                        }
                    }
                    None => Rewound::Nothing,
                }
            }
            _ => Rewound::WrongSurface,
        }
    };

    match rewound {
        Rewound::Nothing => ephemeral(ctx, component, "Nothing to go back to.").await,
        Rewound::WrongSurface => ephemeral(ctx, component, WRONG_SURFACE_NOTICE).await,
        Rewound::Image { filter, post } => {
            let is_favorite = is_favorite(ctx, component.user.id, post.id).await;
            let footer = format!("Tags: {:.100}", post.tag_string);
            let embed = browse::image_embed(&post, ctx.booru.api_url(), &footer);
            let components = session::image_components(&filter, is_favorite, post.media_url());
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
        Rewound::Video {
            filter,
            post,
            old_companion,
        } => {
            component
                .create_response(ctx.http, CreateInteractionResponse::Acknowledge)
                .await?;

            if let Some(old) = old_companion {
                if let Err(err) = component.channel_id.delete_message(ctx.cache_http, old).await {
                    log_internal!("Could not delete old video companion: {}", err);
                }
            }
            let companion = browse::send_video_companion(ctx, component.channel_id, &post).await;
            {
                let mut vstate = ctx.vstate.write().await;
                if let Some(session) = vstate.sessions.get_mut(component.message.id) {
                    if let SessionKind::Video(state) = &mut session.kind {
                        state.companion = companion;
                    }
                }
            }

            let embed = browse::video_embed(&post, ctx.booru.api_url(), None, None);
            let components = session::video_components(&filter, post.media_url());
            component
                .channel_id
                .edit_message(
                    ctx.cache_http,
                    component.message.id,
                    EditMessage::new().embed(embed).components(components),
                )
                .await?;
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Favorite toggle

async fn toggle_favorite(ctx: &Context<'_>, component: &ComponentInteraction) -> Result<()> {
    let user = component.user.id;
    let picked = {
        let mut vstate = ctx.vstate.write().await;
        match vstate.sessions.get_mut(component.message.id).map(|s| &s.kind) {
            Some(SessionKind::Image(state)) => Some((state.filter.clone(), state.post.clone())),
            _ => None,
        }
    };
    let Some((filter, post)) = picked else {
        return ephemeral(ctx, component, WRONG_SURFACE_NOTICE).await;
    };

    let already_favorite = is_favorite(ctx, user, post.id).await;
    let notice;
    let now_favorite;

    if already_favorite {
        // Removal is always allowed, no daily limit.
        let mut pstate = ctx.pstate.write().await;
        pstate.account_mut(user).remove_favorite(post.id);
        pstate.save().await;
        notice = "💔 Removed from your favorites.".to_owned();
        now_favorite = false;
    } else {
        let reward_views = ctx.cfg.read().await.economy.reward_views;
        // Fame lookup can hit the network; resolve it before the lock.
        let bonus = if reward_views {
            0
        } else {
            ctx.fame.artist_fame_bonus(ctx.booru, &post).await
        };

        let mut pstate = ctx.pstate.write().await;
        let added = {
            let account = pstate.account_mut(user);
            match economy::use_daily_favorite(account, helper::today()) {
                None => None,
                Some(remaining) => {
                    account.favorites.push(FavoriteEntry::snapshot(&post));
                    let earned = (!reward_views).then(|| {
                        let earned = economy::earned_waifame(&post, bonus);
                        account.waifame += earned;
                        (earned, account.waifame)
                    });
                    Some((remaining, earned))
                }
            }
        };
        match added {
            None => {
                drop(pstate);
                return ephemeral(
                    ctx,
                    component,
                    "❌ You've reached your limit of 5 favorites per day!\nCome back tomorrow. 💫",
                )
                .await;
            }
            Some((remaining, earned)) => {
                pstate.save().await;
                notice = match earned {
                    Some((earned, total)) => format!(
                        "❤️ Added to your favorites! ({}/5 left today) 💰 +{} waifame ({} total)",
                        remaining, earned, total
                    ),
                    None => format!("❤️ Added to your favorites! ({}/5 left today)", remaining),
                };
                now_favorite = true;
            }
        }
    }

    ephemeral(ctx, component, &notice).await?;

    // Refresh the heart button on the session message.
    let components = session::image_components(&filter, now_favorite, post.media_url());
    component
        .channel_id
        .edit_message(
            ctx.cache_http,
            component.message.id,
            EditMessage::new().components(components),
        )
        .await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tag search

async fn open_search_modal(ctx: &Context<'_>, component: &ComponentInteraction) -> Result<()> {
    let modal = CreateModal::new(
        format!("{}:{}", ids::SEARCH_MODAL, component.message.id),
        "Search the image board",
    )
    .components(vec![CreateActionRow::InputText(
        CreateInputText::new(InputTextStyle::Short, "Enter tags", ids::SEARCH_INPUT)
            .placeholder("e.g. cat_girl blue_eyes")
            .required(true),
    )]);

    component
        .create_response(ctx.http, CreateInteractionResponse::Modal(modal))
        .await
        .map_err(Into::into)
}

async fn handle_search_modal(ctx: &Context<'_>, modal: &ModalInteraction) -> Result<()> {
    let target = modal
        .data
        .custom_id
        .strip_prefix(ids::SEARCH_MODAL)
        .and_then(|rest| rest.strip_prefix(':'))
        .and_then(|raw| raw.parse::<u64>().ok())
        .map(MessageId::new);
    let Some(target) = target else {
        return Ok(());
    };

    let mut query = String::new();
    for row in &modal.data.components {
        for item in &row.components {
            if let ActionRowComponent::InputText(input) = item {
                if input.custom_id == ids::SEARCH_INPUT {
                    if let Some(value) = &input.value {
                        query = value.trim().to_owned();
                    }
                }
            }
        }
    }
    if query.is_empty() {
        modal
            .create_response(
                ctx.http,
                CreateInteractionResponse::Message(
                    CreateInteractionResponseMessage::new()
                        .content("No tags given.")
                        .ephemeral(true),
                ),
            )
            .await?;
        return Ok(());
    }

    // The suggestion lookup can outlive the interaction window.
    modal
        .create_response(
            ctx.http,
            CreateInteractionResponse::Defer(
                CreateInteractionResponseMessage::new().ephemeral(true),
            ),
        )
        .await?;

    let suggestions = ctx.booru.tag_suggestions(&query).await;
    if suggestions.len() > 1 {
        let components = session::tag_picker_components(&suggestions, &query);
        let picker = modal
            .create_followup(
                ctx.http,
                CreateInteractionResponseFollowup::new()
                    .content("🏷️ **Tag suggestions** — pick one, or keep your original query:")
                    .components(components)
                    .ephemeral(true),
            )
            .await?;

        ctx.vstate.write().await.sessions.insert(
            picker.id,
            Session::new(
                Some(modal.user.id),
                SessionKind::TagPicker(crate::session::TagPickerState {
                    query: query.clone(),
                    target,
                }),
            ),
        );
        return Ok(());
    }

    // No suggestions worth showing: search with the raw query directly.
    let found = retarget_image(ctx, modal.user.id, modal.channel_id, target, &query).await?;
    let note = if found {
        format!("🔍 Showing results for **{}**", query)
    } else {
        format!("Couldn't find any images for: {}", query)
    };
    modal
        .create_followup(
            ctx.http,
            CreateInteractionResponseFollowup::new().content(note).ephemeral(true),
        )
        .await?;
    Ok(())
}

async fn pick_tag(ctx: &Context<'_>, component: &ComponentInteraction) -> Result<()> {
    let ComponentInteractionDataKind::StringSelect { values } = &component.data.kind else {
        return ephemeral(ctx, component, WRONG_SURFACE_NOTICE).await;
    };
    let Some(tag) = values.first().cloned() else {
        return ephemeral(ctx, component, WRONG_SURFACE_NOTICE).await;
    };

    let target = {
        let mut vstate = ctx.vstate.write().await;
        match vstate.sessions.get_mut(component.message.id).map(|s| &s.kind) {
            Some(SessionKind::TagPicker(state)) => Some(state.target),
            _ => None,
        }
    };
    let Some(target) = target else {
        return ephemeral(ctx, component, EXPIRED_NOTICE).await;
    };

    component
        .create_response(ctx.http, CreateInteractionResponse::Acknowledge)
        .await?;

    let found = retarget_image(ctx, component.user.id, component.channel_id, target, &tag).await?;
    let note = if found {
        // The picker has served its purpose.
        ctx.vstate.write().await.sessions.remove(component.message.id);
        format!("🔍 Showing results for **{}**", tag)
    } else {
        format!("Couldn't find any images for: {}", tag)
    };
    component
        .edit_response(
            ctx.http,
            EditInteractionResponse::new().content(note).components(vec![]),
        )
        .await?;
    Ok(())
}

/// Points an existing image session at search results: new filter, new post,
/// history entry, and a rerendered message.
async fn retarget_image(
    ctx: &Context<'_>,
    user: UserId,
    channel: ChannelId,
    target: MessageId,
    tag: &str,
) -> Result<bool> {
    let Some(post) = ctx.booru.fetch_image(tag).await else {
        return Ok(false);
    };

    let _ = browse::record_view_and_award(ctx, user, &post).await;
    let is_favorite = is_favorite(ctx, user, post.id).await;

    {
        let mut guard = ctx.vstate.write().await;
        let vstate = &mut *guard;
        vstate.image_history.append(channel, post.clone());
        if let Some(session) = vstate.sessions.get_mut(target) {
            if let SessionKind::Image(state) = &mut session.kind {
                state.filter = tag.to_owned();
                state.post = post.clone();
            }
        }
    }

    let mut embed = CreateEmbed::new()
        .title(format!("🔍 Search: {}", tag))
        .url(post.page_url(ctx.booru.api_url()))
        .colour(0x00FFFF)
        .footer(serenity::all::CreateEmbedFooter::new(format!("ID: {}", post.id)));
    if let Some(url) = post.media_url() {
        embed = embed.image(url);
    }
    let components = session::image_components(tag, is_favorite, post.media_url());
    channel
        .edit_message(
            ctx.cache_http,
            target,
            EditMessage::new().embed(embed).components(components),
        )
        .await?;
    Ok(true)
}

// ---------------------------------------------------------------------------
// Favorites browser

async fn favorites_nav(
    ctx: &Context<'_>,
    component: &ComponentInteraction,
    action: Action,
) -> Result<()> {
    let user = component.user.id;

    if action == Action::FavDelete {
        let index = {
            let mut vstate = ctx.vstate.write().await;
            match vstate.sessions.get_mut(component.message.id).map(|s| &s.kind) {
                Some(SessionKind::Favorites(state)) => Some(state.index),
                _ => None,
            }
        };
        let Some(index) = index else {
            return ephemeral(ctx, component, WRONG_SURFACE_NOTICE).await;
        };

        let removed = {
            let mut pstate = ctx.pstate.write().await;
            let account = pstate.account_mut(user);
            let removed = (index < account.favorites.len())
                .then(|| account.favorites.remove(index));
            if removed.is_some() {
                pstate.save().await;
            }
            removed
        };

        let Some(removed) = removed else {
            return ephemeral(ctx, component, "Nothing to delete.").await;
        };

        let remaining = ctx.pstate.write().await.account(user).favorites.clone();
        if remaining.is_empty() {
            ctx.vstate.write().await.sessions.remove(component.message.id);
            return component
                .create_response(
                    ctx.http,
                    CreateInteractionResponse::UpdateMessage(
                        CreateInteractionResponseMessage::new()
                            .content("Your favorites list is now empty!")
                            .embeds(vec![])
                            .components(vec![]),
                    ),
                )
                .await
                .map_err(Into::into);
        }

        let index = {
            let mut vstate = ctx.vstate.write().await;
            match vstate.sessions.get_mut(component.message.id).map(|s| &mut s.kind) {
                Some(SessionKind::Favorites(state)) => {
                    state.clamp(remaining.len());
                    state.index
                }
                _ => 0,
            }
        };

        let note = format!("🗑️ Post #{} removed", removed.id);
        let embed = favorites::favorite_embed(
            &remaining[index],
            ctx.booru.api_url(),
            index,
            remaining.len(),
            Some(&note),
        );
        let components = session::favorites_components(index, remaining.len());
        return component
            .create_response(
                ctx.http,
                CreateInteractionResponse::UpdateMessage(
                    CreateInteractionResponseMessage::new()
                        .embed(embed)
                        .components(components),
                ),
            )
            .await
            .map_err(Into::into);
    }

    // Cursor movement.
    let favorites = ctx.pstate.write().await.account(user).favorites.clone();
    if favorites.is_empty() {
        return ephemeral(ctx, component, "Your favorites list is empty.").await;
    }

    let index = {
        let mut vstate = ctx.vstate.write().await;
        match vstate.sessions.get_mut(component.message.id).map(|s| &mut s.kind) {
            Some(SessionKind::Favorites(state)) => {
                match action {
                    Action::FavPrev => state.step_back(),
                    _ => state.step_forward(favorites.len()),
                }
                state.clamp(favorites.len());
                Some(state.index)
            }
            _ => None,
        }
    };
    let Some(index) = index else {
        return ephemeral(ctx, component, WRONG_SURFACE_NOTICE).await;
    };

    let embed = favorites::favorite_embed(
        &favorites[index],
        ctx.booru.api_url(),
        index,
        favorites.len(),
        None,
    );
    let components = session::favorites_components(index, favorites.len());
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

// ---------------------------------------------------------------------------
// Quiz

async fn quiz_answer(
    ctx: &Context<'_>,
    component: &ComponentInteraction,
    choice: usize,
) -> Result<()> {
    let result = {
        let mut vstate = ctx.vstate.write().await;
        let Some(session) = vstate.sessions.get_mut(component.message.id) else {
            drop(vstate);
            return ephemeral(ctx, component, EXPIRED_NOTICE).await;
        };
        let SessionKind::Quiz(quiz) = &mut session.kind else {
            drop(vstate);
            return ephemeral(ctx, component, WRONG_SURFACE_NOTICE).await;
        };
        let Some(label) = quiz.options.get(choice).cloned() else {
            drop(vstate);
            return ephemeral(ctx, component, WRONG_SURFACE_NOTICE).await;
        };
        quiz.answer(&label)
            .map(|correct| (correct, label, quiz.correct.clone(), quiz.options.clone()))
    };

    match result {
        Err(denied) => ephemeral(ctx, component, &format!("❌ {}", denied)).await,
        Ok((correct, chosen, answer, options)) => {
            let description = if correct {
                "✅ **Correct!** Nice one!".to_owned()
            } else {
                format!("❌ **Wrong!** The answer was: **{}**", answer)
            };

            // Keep the quiz image; only the verdict and buttons change.
            let mut embed = match component.message.embeds.first() {
                Some(existing) => CreateEmbed::from(existing.clone()),
                None => CreateEmbed::new().title("🎮 Character Quiz!"),
            };
            embed = embed
                .description(description)
                .colour(if correct { 0x00FF00 } else { 0xFF0000 });

            let components = session::quiz_components(&options, &answer, Some(&chosen));
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
    }
}

// ---------------------------------------------------------------------------
// Small helpers

async fn help_notice(ctx: &Context<'_>, component: &ComponentInteraction) -> Result<()> {
    let prefix = ctx.cfg.read().await.general.command_prefix.clone();
    let text = format!(
        "**📜 Commands:**\n\
         `{p}next [tags]` - fetch a random image\n\
         `{p}vnext [tags]` - fetch a random video\n\
         `{p}favorites_list` - browse your favorites (DM)\n\
         `{p}stats` - show your statistics\n\
         `{p}quiz` - character guessing game\n\n\
         **🔘 Buttons:**\n\
         • **Safe/Questionable/Explicit** - filter by rating\n\
         • **Next** - another random post\n\
         • **Back** - return to the previous one\n\
         • **🔍 Search** - search with tags\n\
         • **❤️** - add/remove favorite\n\
         • **📥** - download the media",
        p = prefix
    );
    ephemeral(ctx, component, &text).await
}

async fn is_favorite(ctx: &Context<'_>, user: UserId, post_id: u64) -> bool {
    ctx.pstate.write().await.account(user).is_favorite(post_id)
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

async fn followup_ephemeral(
    ctx: &Context<'_>,
    component: &ComponentInteraction,
    text: &str,
) -> Result<()> {
    component
        .create_followup(
            ctx.http,
            CreateInteractionResponseFollowup::new()
                .content(text)
                .ephemeral(true),
        )
        .await?;
    Ok(())
}
