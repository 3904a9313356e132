//! Miscellaneous convenience methods

use crate::context::Context;
use chrono::NaiveDate;
use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the unix epoch; the cooldown clock for fishing and theft.
pub fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Local calendar date; the daily-limit and streak clock.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[serenity::async_trait]
pub trait MessageHelper {
    /// Whether the author is listed as a bot admin in the configuration.
    async fn is_from_admin(&self, ctx: &Context<'_>) -> bool;
}

#[serenity::async_trait]
impl MessageHelper for serenity::all::Message {
    async fn is_from_admin(&self, ctx: &Context<'_>) -> bool {
        let admins = &ctx.cfg.read().await.general.admin_ids;
        admins.contains(&self.author.id.get())
    }
}

#[serenity::async_trait]
pub trait UserIdHelper {
    /// Global username, or a placeholder when the user cannot be fetched.
    async fn display_name(&self, ctx: &Context<'_>) -> String;
}

#[serenity::async_trait]
impl UserIdHelper for serenity::all::UserId {
    async fn display_name(&self, ctx: &Context<'_>) -> String {
        match self.to_user(ctx.cache_http).await {
            Ok(user) => user.name,
            Err(_) => format!("User #{}", self.get()),
        }
    }
}
