use crate::{context::Context, event::EventHandled};
use anyhow::Result;

mod admin;
mod blackjack;
mod browse;
mod debug;
mod favorites;
mod games;
mod help;
mod ignore_bots;
mod quiz;
mod ready;
mod reload;
mod session_router;
mod stats;

#[serenity::async_trait]
pub trait Plugin: Sync + Send {
    /// Plugin name.  Used for debug
    fn name(&self) -> &'static str;
    /// Help message line(s).  None if no help message
    async fn usage(&self, ctx: &Context<'_>) -> Option<String>;
    /// Potentially handle event.  Returns:
    /// - Ok(EventHandled::Yes) if the event has been handled and no other plugin should attempt to
    ///   handle it
    /// - Ok(EventHandled::No) if another plugin should attempt to handle the event
    /// - Err if an error occurred
    async fn handle(&self, ctx: &Context<'_>, event: &crate::event::Event) -> Result<EventHandled>;
}

/// Ordered list of available plugins
pub fn plugins() -> Vec<Box<dyn Plugin>> {
    use crate::plugin::*;

    vec![
        // Core bot operations
        Box::new(debug::Debug),
        Box::new(ignore_bots::IgnoreBots),
        Box::new(ready::Ready),
        Box::new(help::Help),
        Box::new(reload::Reload),
        // Browsing and interactive sessions
        Box::new(browse::Browse),
        Box::new(favorites::FavoritesList),
        Box::new(session_router::SessionRouter),
        // Economy
        Box::new(stats::Stats),
        Box::new(games::Games),
        Box::new(blackjack::Blackjack),
        Box::new(quiz::Quiz),
        // Admin
        Box::new(admin::Admin),
    ]
}
