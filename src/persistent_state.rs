//! State which persists across sessions: one `Account` per user.
//!
//! The backend is chosen once at startup: Postgres when a connection string
//! is configured and reachable, otherwise a single JSON document on disk.
//! Every save is a full replace of each row (last writer wins); mid-session
//! save failures are logged and swallowed so a flaky database only ever
//! costs the in-flight flush.

use crate::{booru::Post, log_internal};
use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serenity::all::UserId;
use sqlx::{postgres::PgPool, Row};
use std::{collections::HashMap, path::PathBuf};
use tokio::io::AsyncReadExt;

const FALLBACK_PATH_REL_HOME: &str = ".config/waifubot/user_data.json";

/// Snapshot of a post at the moment it was favorited.  Deliberately
/// independent of the live upstream record; never refreshed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FavoriteEntry {
    pub id: u64,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub tag_string: String,
    #[serde(default)]
    pub tag_string_character: String,
}

impl FavoriteEntry {
    pub fn snapshot(post: &Post) -> Self {
        Self {
            id: post.id,
            file_url: post.media_url().map(str::to_owned),
            rating: post.rating.clone(),
            tag_string: post.tag_string.clone(),
            tag_string_character: post.tag_string_character.clone(),
        }
    }
}

/// Per-user persisted record.  Fields added after a record was first written
/// backfill to their defaults on read.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Account {
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub waifame: i64,
    #[serde(default)]
    pub favorites: Vec<FavoriteEntry>,
    #[serde(default)]
    pub daily_favs: u8,
    #[serde(default)]
    pub last_fav_date: Option<NaiveDate>,
    #[serde(default)]
    pub last_daily: Option<NaiveDate>,
    #[serde(default)]
    pub daily_streak: u32,
    /// Epoch seconds; 0 = never.
    #[serde(default)]
    pub last_fish: u64,
    /// Epoch seconds; 0 = never.
    #[serde(default)]
    pub last_steal: u64,
    #[serde(default)]
    pub fish_caught: u64,
}

impl Account {
    pub fn is_favorite(&self, post_id: u64) -> bool {
        self.favorites.iter().any(|f| f.id == post_id)
    }

    /// Removes the entry matching `post_id`, preserving the order of the
    /// remaining entries.  Returns whether anything was removed.
    pub fn remove_favorite(&mut self, post_id: u64) -> bool {
        let before = self.favorites.len();
        self.favorites.retain(|f| f.id != post_id);
        self.favorites.len() != before
    }
}

/// Mini-game fields serialized into one column on the relational backend,
/// so records written by the original five-column schema read back cleanly.
#[derive(Default, Serialize, Deserialize)]
struct GameColumns {
    #[serde(default)]
    last_daily: Option<NaiveDate>,
    #[serde(default)]
    daily_streak: u32,
    #[serde(default)]
    last_fish: u64,
    #[serde(default)]
    last_steal: u64,
    #[serde(default)]
    fish_caught: u64,
}

enum Backend {
    Postgres(PgPool),
    File(PathBuf),
}

/// State which persists across sessions
pub struct PersistentState {
    accounts: HashMap<UserId, Account>,
    backend: Backend,
}

impl PersistentState {
    fn fallback_path() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|p| p.join(FALLBACK_PATH_REL_HOME))
            .ok_or(anyhow!("Could not find home directory"))
    }

    /// Loads all accounts, choosing the backend once.  An unreachable
    /// database degrades to the JSON file; a missing JSON file is an empty
    /// account map, not an error.
    pub async fn load(database_url: Option<&str>) -> Result<Self> {
        if let Some(url) = database_url {
            match Self::load_postgres(url).await {
                Ok(pstate) => return Ok(pstate),
                Err(err) => {
                    log_internal!("Database unavailable, using local file: {}", err);
                }
            }
        }

        let path = Self::fallback_path()?;
        let accounts = Self::load_file(&path).await?;
        log_internal!("Loaded {} account(s) from {}", accounts.len(), path.display());
        Ok(Self {
            accounts,
            backend: Backend::File(path),
        })
    }

    async fn load_postgres(url: &str) -> Result<Self> {
        let pool = PgPool::connect(url).await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS users (
                user_id TEXT PRIMARY KEY,
                view_count BIGINT NOT NULL DEFAULT 0,
                waifame BIGINT NOT NULL DEFAULT 0,
                daily_favs INT NOT NULL DEFAULT 0,
                last_fav_date TEXT NOT NULL DEFAULT '',
                favorites TEXT NOT NULL DEFAULT '[]',
                games TEXT NOT NULL DEFAULT '{}'
            )",
        )
        .execute(&pool)
        .await?;
        // Tables created before the mini-games existed lack this column.
        sqlx::query("ALTER TABLE users ADD COLUMN IF NOT EXISTS games TEXT NOT NULL DEFAULT '{}'")
            .execute(&pool)
            .await?;

        let rows = sqlx::query(
            "SELECT user_id, view_count, waifame, daily_favs, last_fav_date, favorites, games \
             FROM users",
        )
        .fetch_all(&pool)
        .await?;

        let mut accounts = HashMap::new();
        for row in rows {
            let user_id: String = row.get("user_id");
            let parsed = user_id.parse::<u64>();
            let Ok(user_id) = parsed else {
                log_internal!("Skipping account with malformed user id `{}`", user_id);
                continue;
            };
            if user_id == 0 {
                continue;
            }

            let favorites: String = row.get("favorites");
            let favorites = serde_json::from_str(&favorites).unwrap_or_default();
            let games: String = row.get("games");
            let games: GameColumns = serde_json::from_str(&games).unwrap_or_default();
            let last_fav_date: String = row.get("last_fav_date");

            let account = Account {
                view_count: row.get::<i64, _>("view_count").max(0) as u64,
                waifame: row.get("waifame"),
                favorites,
                daily_favs: row.get::<i32, _>("daily_favs").clamp(0, u8::MAX as i32) as u8,
                last_fav_date: last_fav_date.parse().ok(),
                last_daily: games.last_daily,
                daily_streak: games.daily_streak,
                last_fish: games.last_fish,
                last_steal: games.last_steal,
                fish_caught: games.fish_caught,
            };
            accounts.insert(UserId::new(user_id), account);
        }

        log_internal!("Loaded {} account(s) from database", accounts.len());
        Ok(Self {
            accounts,
            backend: Backend::Postgres(pool),
        })
    }

    async fn load_file(path: &PathBuf) -> Result<HashMap<UserId, Account>> {
        let mut file = match tokio::fs::File::open(path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => {
                return Err(anyhow!("Could not open accounts at `{}`: {}", path.display(), e))
            }
        };

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .await
            .map_err(|e| anyhow!("Could not read accounts at `{}`: {}", path.display(), e))?;

        let by_key: HashMap<String, Account> = serde_json::from_str(&contents)
            .map_err(|e| anyhow!("Could not parse accounts at `{}`: {}", path.display(), e))?;

        let mut accounts = HashMap::new();
        for (key, account) in by_key {
            let Ok(user_id) = key.parse::<u64>() else {
                log_internal!("Skipping account with malformed user id `{}`", key);
                continue;
            };
            if user_id == 0 {
                continue;
            }
            accounts.insert(UserId::new(user_id), account);
        }
        Ok(accounts)
    }

    /// Account for `user_id`, created with all-zero defaults on first access.
    pub fn account_mut(&mut self, user_id: UserId) -> &mut Account {
        self.accounts.entry(user_id).or_default()
    }

    pub fn account(&mut self, user_id: UserId) -> &Account {
        self.account_mut(user_id)
    }

    /// Read-only view of a stored account, without creating one.
    pub fn existing(&self, user_id: UserId) -> Option<&Account> {
        self.accounts.get(&user_id)
    }

    pub fn accounts(&self) -> &HashMap<UserId, Account> {
        &self.accounts
    }

    /// Runs `f` with the actor's and target's accounts borrowed together
    /// (theft needs both sides of the transfer).  `None` when actor and
    /// target are the same user.
    pub fn with_pair<R>(
        &mut self,
        actor: UserId,
        target: UserId,
        f: impl FnOnce(&mut Account, &mut Account) -> R,
    ) -> Option<R> {
        if actor == target {
            return None;
        }
        // Take the actor's record out of the map so both sides can be
        // borrowed mutably, then put it back.
        let mut actor_account = self.accounts.remove(&actor).unwrap_or_default();
        let target_account = self.accounts.entry(target).or_default();
        let result = f(&mut actor_account, target_account);
        self.accounts.insert(actor, actor_account);
        Some(result)
    }

    /// Admin reset: replaces the whole record with a zeroed one.
    pub fn reset(&mut self, user_id: UserId) -> bool {
        if !self.accounts.contains_key(&user_id) {
            return false;
        }
        self.accounts.insert(user_id, Account::default());
        true
    }

    /// Flushes every in-memory account, fully replacing each stored row.
    /// Failures are logged and swallowed; only this flush is lost.
    pub async fn save(&self) {
        let result = match &self.backend {
            Backend::Postgres(pool) => self.save_postgres(pool).await,
            Backend::File(path) => self.save_file(path).await,
        };
        if let Err(err) = result {
            log_internal!("Could not persist accounts: {}", err);
        }
    }

    async fn save_postgres(&self, pool: &PgPool) -> Result<()> {
        for (user_id, account) in &self.accounts {
            let games = GameColumns {
                last_daily: account.last_daily,
                daily_streak: account.daily_streak,
                last_fish: account.last_fish,
                last_steal: account.last_steal,
                fish_caught: account.fish_caught,
            };
            let last_fav_date = account
                .last_fav_date
                .map(|d| d.to_string())
                .unwrap_or_default();

            sqlx::query(
                "INSERT INTO users (user_id, view_count, waifame, daily_favs, last_fav_date, favorites, games) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7) \
                 ON CONFLICT (user_id) DO UPDATE SET \
                    view_count = EXCLUDED.view_count, \
                    waifame = EXCLUDED.waifame, \
                    daily_favs = EXCLUDED.daily_favs, \
                    last_fav_date = EXCLUDED.last_fav_date, \
                    favorites = EXCLUDED.favorites, \
                    games = EXCLUDED.games",
            )
            .bind(user_id.get().to_string())
            .bind(account.view_count as i64)
            .bind(account.waifame)
            .bind(account.daily_favs as i32)
            .bind(last_fav_date)
            .bind(serde_json::to_string(&account.favorites)?)
            .bind(serde_json::to_string(&games)?)
            .execute(pool)
            .await?;
        }
        Ok(())
    }

    async fn save_file(&self, path: &PathBuf) -> Result<()> {
        let by_key: HashMap<String, &Account> = self
            .accounts
            .iter()
            .map(|(user_id, account)| (user_id.get().to_string(), account))
            .collect();
        let contents = serde_json::to_string_pretty(&by_key)
            .map_err(|e| anyhow!("Could not serialize accounts: {}", e))?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| anyhow!("Could not create directory `{}`: {}", parent.display(), e))?;
        }

        // Write a temporary file, then atomically rename it over the target.
        let tmp_path = path.with_extension("json.new");
        tokio::fs::write(&tmp_path, contents)
            .await
            .map_err(|e| anyhow!("Could not write accounts to `{}`: {}", tmp_path.display(), e))?;
        tokio::fs::rename(&tmp_path, path).await.map_err(|e| {
            anyhow!(
                "Could not rename `{}` to `{}`: {}",
                tmp_path.display(),
                path.display(),
                e
            )
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_backfill_to_defaults() {
        // A record written before the economy fields existed.
        let json = r#"{"view_count": 42, "favorites": [{"id": 7}]}"#;
        let account: Account = serde_json::from_str(json).unwrap();
        assert_eq!(account.view_count, 42);
        assert_eq!(account.waifame, 0);
        assert_eq!(account.daily_favs, 0);
        assert_eq!(account.last_fav_date, None);
        assert_eq!(account.daily_streak, 0);
        assert_eq!(account.favorites.len(), 1);
        assert_eq!(account.favorites[0].id, 7);
    }

    #[test]
    fn favorite_removal_is_exact_and_order_preserving() {
        let mut account = Account::default();
        for id in [3, 1, 2] {
            account.favorites.push(FavoriteEntry {
                id,
                file_url: None,
                rating: String::new(),
                tag_string: String::new(),
                tag_string_character: String::new(),
            });
        }

        assert!(account.remove_favorite(1));
        let remaining: Vec<u64> = account.favorites.iter().map(|f| f.id).collect();
        assert_eq!(remaining, vec![3, 2]);

        // Removing an id that is not present is a no-op.
        assert!(!account.remove_favorite(9));
        assert_eq!(account.favorites.len(), 2);
    }

    #[test]
    fn empty_game_columns_parse_to_defaults() {
        let games: GameColumns = serde_json::from_str("{}").unwrap();
        assert_eq!(games.daily_streak, 0);
        assert_eq!(games.last_fish, 0);
        assert!(games.last_daily.is_none());
    }
}
