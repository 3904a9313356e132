use crate::{
    booru::BooruClient, config::Config, context::Context, economy::FameCache, event::Event,
    persistent_state::PersistentState, volatile_state::VolatileState,
};
use serenity::all::{Interaction, Message, Ready};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Discord event handler
pub struct Handler {
    cfg: RwLock<Config>,
    pstate: RwLock<PersistentState>,
    vstate: Arc<RwLock<VolatileState>>,
    booru: BooruClient,
    fame: FameCache,
}

impl<'a> Handler {
    pub fn new(cfg: Config, pstate: PersistentState, booru: BooruClient) -> Self {
        Self {
            cfg: RwLock::new(cfg),
            pstate: RwLock::new(pstate),
            vstate: Arc::new(RwLock::new(VolatileState::new())),
            booru,
            fame: FameCache::default(),
        }
    }

    fn ctx(&'a self, discord_ctx: &'a serenity::all::Context) -> Context<'a> {
        Context {
            cfg: &self.cfg,
            pstate: &self.pstate,
            vstate: &self.vstate,
            booru: &self.booru,
            fame: &self.fame,
            cache: &discord_ctx.cache,
            http: &discord_ctx.http,
            cache_http: discord_ctx,
        }
    }
}

#[serenity::async_trait]
impl serenity::all::EventHandler for Handler {
    async fn ready(&self, discord_ctx: serenity::all::Context, ready: Ready) {
        Event::Ready(ready).handle(self.ctx(&discord_ctx)).await;
    }

    async fn message(&self, discord_ctx: serenity::all::Context, msg: Message) {
        Event::Message(msg).handle(self.ctx(&discord_ctx)).await;
    }

    async fn interaction_create(&self, discord_ctx: serenity::all::Context, interaction: Interaction) {
        match interaction {
            Interaction::Component(component) => {
                Event::Component(component)
                    .handle(self.ctx(&discord_ctx))
                    .await;
            }
            Interaction::Modal(modal) => {
                Event::Modal(modal).handle(self.ctx(&discord_ctx)).await;
            }
            _ => {}
        }
    }
}
