//! `quiz`: guess the character on a random image.  One answer per round; an
//! unanswered round times out after 30 seconds and reveals the answer.

use crate::{
    context::Context,
    event::*,
    plugin::*,
    session::{self, QuizState, Session, SessionKind},
};
use anyhow::Result;
use rand::seq::SliceRandom;
use serenity::all::{CreateEmbed, CreateEmbedFooter, CreateMessage, EditMessage, Message};
use std::time::Duration;

const QUIZ_TIMEOUT_SECS: u64 = 30;

/// Well-known character names used to pad the answer buttons.
const DECOYS: &[&str] = &[
    "Hatsune Miku", "Sakura Haruno", "Rem", "Emilia", "Zero Two", "Asuna Yuuki",
    "Mikasa Ackerman", "Hinata Hyuga", "Naruto Uzumaki", "Sasuke Uchiha",
    "Goku", "Vegeta", "Luffy", "Zoro", "Nami", "Robin", "Erza Scarlet",
    "Lucy Heartfilia", "Natsu Dragneel", "Megumin", "Aqua", "Darkness",
    "Tohru", "Kanna Kamui", "Saber", "Rin Tohsaka", "Shinobu Oshino",
    "Taiga Aisaka", "Misaka Mikoto", "Kurisu Makise", "Mai Sakurajima",
    "Nezuko Kamado", "Tanjiro Kamado", "Zenitsu Agatsuma", "Inosuke Hashibira",
    "Yor Forger", "Anya Forger", "Power", "Makima", "Denji", "Aki Hayakawa",
    "Marin Kitagawa", "Chika Fujiwara", "Kaguya Shinomiya", "Ai Hoshino",
    "Frieren", "Fern", "Bocchi", "Ryo Yamada", "Kobayashi", "Elma",
    "Yuki Nagato", "Haruhi Suzumiya", "C.C.", "Lelouch", "Levi Ackerman",
    "Eren Yeager", "Historia Reiss", "Annie Leonhart", "Violet Evergarden",
    "Raphtalia", "Naofumi", "Aqua Hoshino", "Ruby Hoshino", "Kana Arima",
];

pub struct Quiz;

#[serenity::async_trait]
impl Plugin for Quiz {
    fn name(&self) -> &'static str {
        "quiz"
    }

    async fn usage(&self, ctx: &Context<'_>) -> Option<String> {
        let prefix = &ctx.cfg.read().await.general.command_prefix;
        Some(format!(
            "{}{} - guess the character on a random image",
            prefix,
            self.name()
        ))
    }

    async fn handle(&self, ctx: &Context<'_>, event: &Event) -> Result<EventHandled> {
        let Some((msg, _)) = event.is_bot_cmd(ctx, self.name()).await else {
            return Ok(EventHandled::No);
        };

        start_quiz(ctx, msg).await
    }
}

async fn start_quiz(ctx: &Context<'_>, msg: &Message) -> Result<EventHandled> {
    // A quiz needs an image with a character tag; retry once with a broader
    // filter before giving up.
    let mut post = ctx.booru.fetch_image("rating:safe 1girl").await;
    if post.as_ref().and_then(|p| p.main_character()).is_none() {
        post = ctx.booru.fetch_image("rating:safe solo").await;
    }
    let Some(post) = post.filter(|p| p.main_character().is_some()) else {
        msg.reply(
            ctx.cache_http,
            "Couldn't find a quiz image with a character tag. Try again!",
        )
        .await?;
        return Ok(EventHandled::Yes);
    };

    let correct = title_case(post.main_character().unwrap_or_default());

    let options = {
        let mut rng = rand::thread_rng();
        let decoys: Vec<&str> = DECOYS
            .iter()
            .copied()
            .filter(|d| d.to_lowercase() != correct.to_lowercase())
            .collect();
        let mut options: Vec<String> = decoys
            .choose_multiple(&mut rng, 3)
            .map(|d| (*d).to_owned())
            .collect();
        options.push(correct.clone());
        options.shuffle(&mut rng);
        options
    };

    let mut embed = CreateEmbed::new()
        .title("🎮 Character Quiz!")
        .description("Who is this character?")
        .colour(0xFFD700)
        .footer(CreateEmbedFooter::new("Pick the right answer below!"));
    let image_url = post.media_url().map(str::to_owned);
    if let Some(url) = &image_url {
        embed = embed.image(url);
    }

    let components = session::quiz_components(&options, &correct, None);
    let sent = msg
        .channel_id
        .send_message(
            ctx.cache_http,
            CreateMessage::new().embed(embed).components(components),
        )
        .await?;

    // Anyone may answer; the first click ends the round.
    ctx.vstate.write().await.sessions.insert(
        sent.id,
        Session::new(
            None,
            SessionKind::Quiz(QuizState {
                correct: correct.clone(),
                options: options.clone(),
                answered: false,
            }),
        ),
    );

    // Timeout watchdog: an unanswered round is an implicit wrong answer.
    let vstate = std::sync::Arc::clone(ctx.vstate);
    let http = std::sync::Arc::clone(ctx.http);
    let channel = msg.channel_id;
    let message = sent.id;
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(QUIZ_TIMEOUT_SECS)).await;

        let timed_out = {
            let mut vstate = vstate.write().await;
            match vstate.sessions.get_mut(message).map(|s| &mut s.kind) {
                Some(SessionKind::Quiz(quiz)) if !quiz.answered => {
                    quiz.answered = true;
                    true
                }
                _ => false,
            }
        };
        if !timed_out {
            return;
        }

        let mut embed = CreateEmbed::new()
            .title("🎮 Character Quiz!")
            .description(format!("⏰ Time's up! The answer was: **{}**", correct))
            .colour(0xFF0000);
        if let Some(url) = &image_url {
            embed = embed.image(url);
        }
        let components = session::quiz_components(&options, &correct, Some(""));
        let _ = channel
            .edit_message(
                http.clone(),
                message,
                EditMessage::new().embed(embed).components(components),
            )
            .await;
    });

    Ok(EventHandled::Yes)
}

/// `hatsune_miku` -> `Hatsune Miku`
fn title_case(tag: &str) -> String {
    tag.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_case_replaces_underscores() {
        assert_eq!(title_case("hatsune_miku"), "Hatsune Miku");
        assert_eq!(title_case("c.c."), "C.c.");
        assert_eq!(title_case("rem"), "Rem");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn decoy_pool_is_large_enough_for_three_picks() {
        // Even after filtering out a matching answer there are 3+ decoys.
        assert!(DECOYS.len() > 4);
    }
}
