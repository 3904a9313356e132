use crate::{context::Context, event::*, log_event, logging::*, plugin::*};
use anyhow::Result;

/// Prints debug information about events to stdout
pub struct Debug;

#[serenity::async_trait]
impl Plugin for Debug {
    fn name(&self) -> &'static str {
        "debug"
    }

    async fn usage(&self, _ctx: &Context<'_>) -> Option<String> {
        None
    }

    async fn handle(&self, ctx: &Context<'_>, event: &Event) -> Result<EventHandled> {
        match event {
            Event::Ready(ready) => {
                log_event!(
                    "Connected to {} server(s) as {}",
                    ready.guilds.len(),
                    ctx.cache.current_user().color(),
                );
            }
            Event::Message(msg) => {
                log_event!(
                    "{}{}{}{}{}{} {}",
                    msg.guild_id.color(ctx.http).await,
                    Glue {}.color(),
                    msg.channel_id.color(ctx.http).await,
                    Glue {}.color(),
                    msg.author.color(),
                    Glue {}.color(),
                    msg.content,
                );
            }
            Event::Component(component) => {
                log_event!(
                    "{}{}{} pressed `{}`",
                    component.channel_id.color(ctx.http).await,
                    Glue {}.color(),
                    component.user.color(),
                    component.data.custom_id,
                );
            }
            Event::Modal(modal) => {
                log_event!(
                    "{}{}{} submitted `{}`",
                    modal.channel_id.color(ctx.http).await,
                    Glue {}.color(),
                    modal.user.color(),
                    modal.data.custom_id,
                );
            }
        }

        Ok(EventHandled::No)
    }
}
