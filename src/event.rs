//! The Serenity crate we're using for the Discord API is designed around callbacks to handle
//! events.  However, this does not mesh well with our plugin framework here.  To resolve this,
//! the handler translates the callbacks into a distinct Event enum that plugins match on.

use crate::{context::Context, log_internal};
use serenity::all::{ComponentInteraction, Message, ModalInteraction, Ready};

/// A Discord event
pub enum Event {
    Ready(Ready),
    Message(Message),
    Component(ComponentInteraction),
    Modal(ModalInteraction),
}

impl Event {
    // When an event occurs, iterate over all the plugins to see if any can/should handle it.
    pub async fn handle(self, ctx: Context<'_>) {
        for plugin in crate::plugin::plugins() {
            match plugin.handle(&ctx, &self).await {
                Ok(EventHandled::Yes) => return,
                Ok(EventHandled::No) => continue,
                Err(err) => log_internal!("Error in plugin {}: {}", plugin.name(), err),
            }
        }
    }

    /// Check if a message should be interpreted as a special bot command.
    ///
    /// These are prefixed with the configured command prefix, e.g. `?slots 50`.
    /// Returns the message and the argument remainder after the command word.
    pub async fn is_bot_cmd(&self, ctx: &Context<'_>, cmd: &str) -> Option<(&Message, &str)> {
        let Event::Message(msg) = self else {
            return None;
        };

        let command = {
            let prefix = &ctx.cfg.read().await.general.command_prefix;
            format!("{}{}", prefix, cmd)
        };

        let content = msg.content.trim();
        let (first, args) = match content.split_once(char::is_whitespace) {
            Some((first, rest)) => (first, rest.trim_start()),
            None => (content, ""),
        };

        (first == command).then_some((msg, args))
    }

    pub fn as_component(&self) -> Option<&ComponentInteraction> {
        match self {
            Event::Component(component) => Some(component),
            _ => None,
        }
    }

    pub fn as_modal(&self) -> Option<&ModalInteraction> {
        match self {
            Event::Modal(modal) => Some(modal),
            _ => None,
        }
    }
}

pub enum EventHandled {
    Yes,
    No,
}
