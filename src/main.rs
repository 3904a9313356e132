mod blackjack;
mod booru;
mod config;
mod context;
mod economy;
mod event;
mod handler;
mod helper;
mod logging;
mod persistent_state;
mod plugin;
mod session;
mod volatile_state;

use crate::booru::BooruClient;
use serenity::{all::GatewayIntents, Client};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = crate::config::Config::load().await?;
    let token = cfg.general.discord_token.clone();
    let pstate =
        crate::persistent_state::PersistentState::load(cfg.storage.database_url.as_deref()).await?;
    let booru = BooruClient::new(&cfg.booru.api_url, &cfg.booru.user_agent);
    let handler = handler::Handler::new(cfg, pstate, booru);

    // Things we want discord to tell us about.
    let intents = GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    Client::builder(&token, intents)
        .event_handler(handler)
        .await?
        .start()
        .await
        .map_err(Into::into)
}
