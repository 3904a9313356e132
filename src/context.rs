use crate::{
    booru::BooruClient, config::Config, economy::FameCache, persistent_state::PersistentState,
    volatile_state::VolatileState,
};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Collection of data that is shared across events
pub struct Context<'a> {
    // Waifubot's own context types
    pub cfg: &'a RwLock<Config>,
    pub pstate: &'a RwLock<PersistentState>,
    /// `Arc` so detached tasks (the quiz timeout) can keep it alive.
    pub vstate: &'a Arc<RwLock<VolatileState>>,
    pub booru: &'a BooruClient,
    pub fame: &'a FameCache,
    // Discord/Serenity context types
    pub cache: &'a Arc<serenity::all::Cache>,
    pub http: &'a Arc<serenity::all::Http>,
    pub cache_http: &'a CacheHttp,
}

/// Many Serenity functions take a `impl CacheHttp` in order to first check the cache if the item
/// is available and fall back to an http request otherwise.  The most readily available type that
/// impl's this is named very differently in a way that could be confusing, and so we alias it.
pub type CacheHttp = serenity::all::Context;
