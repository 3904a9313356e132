//! Waifame economy: view/favorite accounting, the artist fame cache, and the
//! mini-game payout logic.
//!
//! Everything here is synchronous bookkeeping over an `Account`.  Randomness
//! comes in through `rand::Rng` parameters and the current date/instant is
//! supplied by the caller, so the payout rules are deterministic under test.

use crate::{
    booru::{BooruClient, Post},
    persistent_state::Account,
};
use chrono::NaiveDate;
use rand::{distributions::WeightedIndex, prelude::Distribution, Rng};
use std::{collections::HashMap, sync::Mutex};

pub const DAILY_FAVORITE_LIMIT: u8 = 5;
pub const MIN_WAGER: i64 = 10;
pub const FISH_COOLDOWN_SECS: u64 = 30 * 60;
pub const STEAL_COOLDOWN_SECS: u64 = 60 * 60;
pub const STEAL_MIN_TARGET_BALANCE: i64 = 50;

/// Recoverable rejections.  These are reported to the user and never mutate
/// any account state.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("minimum wager is {0} waifame")]
    WagerTooSmall(i64),
    #[error("not enough waifame (balance: {0})")]
    InsufficientFunds(i64),
    #[error("daily reward already claimed today")]
    AlreadyClaimed,
    #[error("on cooldown for {0} more seconds")]
    Cooldown(u64),
    #[error("target holds fewer than {0} waifame")]
    TargetTooPoor(i64),
}

// ---------------------------------------------------------------------------
// Views and favorites

/// Pure view-count increment.  Whether a view also earns waifame is decided
/// by the `economy.reward_views` config flag at the call site.
pub fn record_view(account: &mut Account) -> u64 {
    account.view_count += 1;
    account.view_count
}

/// Waifame earned from one post: a base point plus popularity bonuses.
pub fn earned_waifame(post: &Post, fame_bonus: i64) -> i64 {
    let base = 1;
    let score_bonus = post.score.max(0) / 50;
    let fav_bonus = (post.fav_count / 100) as i64;
    base + score_bonus + fav_bonus + fame_bonus
}

/// Rolls the daily window forward if the stored date is not `today`.
fn refresh_daily_favorites(account: &mut Account, today: NaiveDate) {
    if account.last_fav_date != Some(today) {
        account.daily_favs = 0;
        account.last_fav_date = Some(today);
    }
}

pub fn can_add_favorite(account: &mut Account, today: NaiveDate) -> bool {
    refresh_daily_favorites(account, today);
    account.daily_favs < DAILY_FAVORITE_LIMIT
}

/// Consumes one daily favorite slot; `None` when the day's budget is spent
/// (the account is left untouched).  Returns the remaining slot count.
pub fn use_daily_favorite(account: &mut Account, today: NaiveDate) -> Option<u8> {
    refresh_daily_favorites(account, today);
    if account.daily_favs >= DAILY_FAVORITE_LIMIT {
        return None;
    }
    account.daily_favs += 1;
    Some(DAILY_FAVORITE_LIMIT - account.daily_favs)
}

/// Non-mutating variant for stats displays.
pub fn remaining_daily_favorites(account: &Account, today: NaiveDate) -> u8 {
    if account.last_fav_date != Some(today) {
        DAILY_FAVORITE_LIMIT
    } else {
        DAILY_FAVORITE_LIMIT.saturating_sub(account.daily_favs)
    }
}

// ---------------------------------------------------------------------------
// Artist fame

/// Process-lifetime memo of artist name -> upstream post count.  Unbounded
/// and never invalidated; artist fame changes slowly enough that a stale
/// entry is harmless.  Owned by the handler and injected where needed.
#[derive(Default)]
pub struct FameCache(Mutex<HashMap<String, u64>>);

impl FameCache {
    /// Fame bonus for the post's main artist.  Lookup failures count as an
    /// unknown artist (bonus 0) and are cached like any other answer.
    pub async fn artist_fame_bonus(&self, booru: &BooruClient, post: &Post) -> i64 {
        let Some(artist) = post.main_artist() else {
            return 0;
        };

        if let Some(count) = self.0.lock().ok().and_then(|c| c.get(artist).copied()) {
            return fame_bonus(count);
        }

        let count = booru.artist_post_count(artist).await.unwrap_or(0);
        if let Ok(mut cache) = self.0.lock() {
            cache.insert(artist.to_owned(), count);
        }
        fame_bonus(count)
    }
}

/// Maps an artist's cataloged output to a flat waifame bonus.
pub fn fame_bonus(post_count: u64) -> i64 {
    match post_count {
        10000.. => 10,
        5000.. => 7,
        2000.. => 5,
        1000.. => 3,
        500.. => 2,
        100.. => 1,
        _ => 0,
    }
}

// ---------------------------------------------------------------------------
// Slots

pub const SLOT_SYMBOLS: [&str; 5] = ["🍒", "🍋", "🍊", "💎", "7️⃣"];
/// Draw weights, commonest first; sevens are rarest.
const SLOT_WEIGHTS: [u32; 5] = [30, 25, 20, 15, 10];
const SLOT_DIAMOND: usize = 3;
const SLOT_SEVEN: usize = 4;

pub struct SlotsOutcome {
    /// Indices into `SLOT_SYMBOLS`.
    pub reel: [usize; 3],
    pub multiplier: i64,
    pub winnings: i64,
    pub balance: i64,
}

/// Payout multiplier for one spin.
pub fn slot_multiplier(reel: [usize; 3]) -> i64 {
    let [a, b, c] = reel;
    if a == b && b == c {
        match a {
            SLOT_SEVEN => 20,
            SLOT_DIAMOND => 15,
            _ => 10,
        }
    } else if a == b || b == c || a == c {
        2
    } else {
        0
    }
}

pub fn play_slots(
    account: &mut Account,
    wager: i64,
    rng: &mut impl Rng,
) -> Result<SlotsOutcome, GameError> {
    if wager < MIN_WAGER {
        return Err(GameError::WagerTooSmall(MIN_WAGER));
    }
    if account.waifame < wager {
        return Err(GameError::InsufficientFunds(account.waifame));
    }

    let dist = WeightedIndex::new(SLOT_WEIGHTS).expect("static weights");
    let reel = [dist.sample(rng), dist.sample(rng), dist.sample(rng)];
    let multiplier = slot_multiplier(reel);
    let winnings = wager * multiplier;

    account.waifame = account.waifame - wager + winnings;
    Ok(SlotsOutcome {
        reel,
        multiplier,
        winnings,
        balance: account.waifame,
    })
}

// ---------------------------------------------------------------------------
// Daily claim

pub struct DailyReward {
    pub base: i64,
    pub streak_bonus: i64,
    pub streak: u32,
    pub total: i64,
    pub balance: i64,
}

/// One claim per calendar day.  The streak continues only when the previous
/// claim was exactly yesterday.
pub fn claim_daily(
    account: &mut Account,
    today: NaiveDate,
    rng: &mut impl Rng,
) -> Result<DailyReward, GameError> {
    if account.last_daily == Some(today) {
        return Err(GameError::AlreadyClaimed);
    }

    let yesterday = today.pred_opt();
    let streak = if account.last_daily.is_some() && account.last_daily == yesterday {
        account.daily_streak + 1
    } else {
        1
    };

    let base = rng.gen_range(50..=150);
    let streak_bonus = (streak as i64 * 10).min(100);
    let total = base + streak_bonus;

    account.waifame += total;
    account.last_daily = Some(today);
    account.daily_streak = streak;

    Ok(DailyReward {
        base,
        streak_bonus,
        streak,
        total,
        balance: account.waifame,
    })
}

// ---------------------------------------------------------------------------
// Fishing

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
    Junk,
}

impl Rarity {
    pub fn label(self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
            Rarity::Junk => "Junk",
        }
    }

    pub fn colour(self) -> u32 {
        match self {
            Rarity::Common => 0x808080,
            Rarity::Rare => 0x0099FF,
            Rarity::Epic => 0x9B59B6,
            Rarity::Legendary => 0xFFD700,
            Rarity::Junk => 0x8B4513,
        }
    }
}

pub struct FishEntry {
    pub emoji: &'static str,
    pub name: &'static str,
    pub rarity: Rarity,
    pub min: i64,
    pub max: i64,
    weight: u32,
}

pub const FISH_TABLE: [FishEntry; 9] = [
    FishEntry { emoji: "🐟", name: "Fish", rarity: Rarity::Common, min: 5, max: 15, weight: 40 },
    FishEntry { emoji: "🐠", name: "Tropical Fish", rarity: Rarity::Common, min: 8, max: 18, weight: 35 },
    FishEntry { emoji: "🐡", name: "Fugu", rarity: Rarity::Rare, min: 20, max: 40, weight: 15 },
    FishEntry { emoji: "🦐", name: "Royal Shrimp", rarity: Rarity::Rare, min: 25, max: 45, weight: 12 },
    FishEntry { emoji: "🦑", name: "Giant Squid", rarity: Rarity::Epic, min: 50, max: 80, weight: 5 },
    FishEntry { emoji: "🐙", name: "Octopus", rarity: Rarity::Epic, min: 55, max: 85, weight: 4 },
    FishEntry { emoji: "🦈", name: "Shark", rarity: Rarity::Legendary, min: 100, max: 150, weight: 2 },
    FishEntry { emoji: "🐋", name: "Whale", rarity: Rarity::Legendary, min: 150, max: 250, weight: 1 },
    FishEntry { emoji: "👟", name: "Old Shoe", rarity: Rarity::Junk, min: 1, max: 3, weight: 10 },
];

pub struct Catch {
    pub entry: &'static FishEntry,
    pub value: i64,
    pub balance: i64,
    pub total_caught: u64,
}

pub fn go_fishing(
    account: &mut Account,
    now_secs: u64,
    rng: &mut impl Rng,
) -> Result<Catch, GameError> {
    let ready_at = account.last_fish + FISH_COOLDOWN_SECS;
    if now_secs < ready_at {
        return Err(GameError::Cooldown(ready_at - now_secs));
    }

    let weights: Vec<u32> = FISH_TABLE.iter().map(|f| f.weight).collect();
    let dist = WeightedIndex::new(weights).expect("static weights");
    let entry = &FISH_TABLE[dist.sample(rng)];
    let value = rng.gen_range(entry.min..=entry.max);

    account.waifame += value;
    account.last_fish = now_secs;
    account.fish_caught += 1;

    Ok(Catch {
        entry,
        value,
        balance: account.waifame,
        total_caught: account.fish_caught,
    })
}

// ---------------------------------------------------------------------------
// Theft

pub enum StealOutcome {
    Success { stolen: i64, balance: i64 },
    Caught { fine: i64, balance: i64 },
}

/// Moves `fraction` of the victim's balance (minimum 10) to the thief.
/// Returns the stolen amount.  The victim can never go negative: the gate in
/// `attempt_steal` guarantees the minimum transfer is covered.
fn transfer_loot(thief: &mut Account, victim: &mut Account, fraction: f64) -> i64 {
    let stolen = ((victim.waifame as f64 * fraction) as i64).max(10);
    let stolen = stolen.min(victim.waifame);
    victim.waifame -= stolen;
    thief.waifame += stolen;
    stolen
}

/// Fines the thief 20% of their own balance (minimum 10), floored at zero.
fn apply_fine(thief: &mut Account) -> i64 {
    let fine = (thief.waifame / 5).max(10);
    thief.waifame = (thief.waifame - fine).max(0);
    fine
}

pub fn attempt_steal(
    thief: &mut Account,
    victim: &mut Account,
    now_secs: u64,
    rng: &mut impl Rng,
) -> Result<StealOutcome, GameError> {
    let ready_at = thief.last_steal + STEAL_COOLDOWN_SECS;
    if now_secs < ready_at {
        return Err(GameError::Cooldown(ready_at - now_secs));
    }
    if victim.waifame < STEAL_MIN_TARGET_BALANCE {
        return Err(GameError::TargetTooPoor(STEAL_MIN_TARGET_BALANCE));
    }

    thief.last_steal = now_secs;

    if rng.gen_bool(0.40) {
        let fraction = rng.gen_range(0.10..=0.30);
        let stolen = transfer_loot(thief, victim, fraction);
        Ok(StealOutcome::Success {
            stolen,
            balance: thief.waifame,
        })
    } else {
        let fine = apply_fine(thief);
        Ok(StealOutcome::Caught {
            fine,
            balance: thief.waifame,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn rich_account(waifame: i64) -> Account {
        Account {
            waifame,
            ..Account::default()
        }
    }

    #[test]
    fn fame_bonus_thresholds() {
        assert_eq!(fame_bonus(0), 0);
        assert_eq!(fame_bonus(99), 0);
        assert_eq!(fame_bonus(100), 1);
        assert_eq!(fame_bonus(500), 2);
        assert_eq!(fame_bonus(1000), 3);
        assert_eq!(fame_bonus(2000), 5);
        assert_eq!(fame_bonus(5000), 7);
        assert_eq!(fame_bonus(10000), 10);
        assert_eq!(fame_bonus(123456), 10);
    }

    #[test]
    fn earned_waifame_adds_popularity_bonuses() {
        let post = Post {
            score: 127,
            fav_count: 250,
            ..Post::default()
        };
        // 1 base + 2 score + 2 favorites + 3 fame
        assert_eq!(earned_waifame(&post, 3), 8);

        let unpopular = Post {
            score: -40,
            ..Post::default()
        };
        assert_eq!(earned_waifame(&unpopular, 0), 1);
    }

    #[test]
    fn daily_favorites_cap_at_five() {
        let mut account = Account::default();
        let today = date("2026-08-06");

        for expected_remaining in (0..5).rev() {
            let remaining = use_daily_favorite(&mut account, today);
            assert_eq!(remaining, Some(expected_remaining));
        }
        assert_eq!(account.daily_favs, 5);

        // The sixth consume is rejected without incrementing.
        assert_eq!(use_daily_favorite(&mut account, today), None);
        assert_eq!(account.daily_favs, 5);
        assert!(!can_add_favorite(&mut account, today));
    }

    #[test]
    fn daily_favorites_reset_on_a_new_day() {
        let mut account = Account::default();
        let monday = date("2026-08-03");
        for _ in 0..5 {
            let _ = use_daily_favorite(&mut account, monday);
        }

        let tuesday = date("2026-08-04");
        assert!(can_add_favorite(&mut account, tuesday));
        assert_eq!(account.daily_favs, 0);
        assert_eq!(remaining_daily_favorites(&account, tuesday), 5);
    }

    #[test]
    fn slot_multipliers() {
        assert_eq!(slot_multiplier([4, 4, 4]), 20); // triple seven
        assert_eq!(slot_multiplier([3, 3, 3]), 15); // triple diamond
        assert_eq!(slot_multiplier([0, 0, 0]), 10);
        assert_eq!(slot_multiplier([0, 0, 1]), 2);
        assert_eq!(slot_multiplier([1, 0, 0]), 2);
        assert_eq!(slot_multiplier([0, 1, 0]), 2);
        assert_eq!(slot_multiplier([0, 1, 2]), 0);
    }

    #[test]
    fn slots_reject_bad_wagers_without_mutation() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut account = rich_account(100);

        let err = play_slots(&mut account, 5, &mut rng).map(|_| ()).unwrap_err();
        assert_eq!(err, GameError::WagerTooSmall(MIN_WAGER));
        assert_eq!(account.waifame, 100);

        let err = play_slots(&mut account, 500, &mut rng).map(|_| ()).unwrap_err();
        assert_eq!(err, GameError::InsufficientFunds(100));
        assert_eq!(account.waifame, 100);
    }

    #[test]
    fn slots_balance_never_goes_negative() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut account = rich_account(10);
            let outcome = play_slots(&mut account, 10, &mut rng).unwrap();
            assert_eq!(account.waifame, outcome.winnings);
            assert!(account.waifame >= 0);
        }
    }

    #[test]
    fn daily_claim_streak_progression() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut account = Account::default();

        let mut day = date("2026-01-01");
        for expected_streak in 1..=12u32 {
            let reward = claim_daily(&mut account, day, &mut rng).unwrap();
            assert_eq!(reward.streak, expected_streak);
            assert!((50..=150).contains(&reward.base));
            // Bonus saturates at 100 from streak 10 onward.
            assert_eq!(reward.streak_bonus, (expected_streak as i64 * 10).min(100));
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn daily_claim_same_day_rejected_without_state_change() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut account = Account::default();
        let today = date("2026-08-06");

        claim_daily(&mut account, today, &mut rng).unwrap();
        let balance = account.waifame;
        let streak = account.daily_streak;

        let err = claim_daily(&mut account, today, &mut rng).map(|_| ()).unwrap_err();
        assert_eq!(err, GameError::AlreadyClaimed);
        assert_eq!(account.waifame, balance);
        assert_eq!(account.daily_streak, streak);
    }

    #[test]
    fn daily_claim_gap_resets_streak() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut account = Account::default();

        claim_daily(&mut account, date("2026-08-01"), &mut rng).unwrap();
        claim_daily(&mut account, date("2026-08-02"), &mut rng).unwrap();
        assert_eq!(account.daily_streak, 2);

        // Skipping the 3rd resets the streak.
        claim_daily(&mut account, date("2026-08-04"), &mut rng).unwrap();
        assert_eq!(account.daily_streak, 1);
    }

    #[test]
    fn fishing_respects_cooldown() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut account = Account::default();

        let catch = go_fishing(&mut account, 10_000, &mut rng).unwrap();
        assert!((catch.entry.min..=catch.entry.max).contains(&catch.value));
        assert_eq!(account.fish_caught, 1);

        let err = go_fishing(&mut account, 10_060, &mut rng).map(|_| ()).unwrap_err();
        assert_eq!(err, GameError::Cooldown(FISH_COOLDOWN_SECS - 60));

        // Cooldown elapsed.
        assert!(go_fishing(&mut account, 10_000 + FISH_COOLDOWN_SECS, &mut rng).is_ok());
        assert_eq!(account.fish_caught, 2);
    }

    #[test]
    fn steal_success_transfers_exact_fraction() {
        let mut thief = rich_account(0);
        let mut victim = rich_account(100);

        let stolen = transfer_loot(&mut thief, &mut victim, 0.20);
        assert_eq!(stolen, 20);
        assert_eq!(victim.waifame, 80);
        assert_eq!(thief.waifame, 20);
    }

    #[test]
    fn steal_minimum_take_is_ten() {
        let mut thief = rich_account(0);
        let mut victim = rich_account(50);

        // 10% of 50 is 5, bumped to the minimum of 10.
        let stolen = transfer_loot(&mut thief, &mut victim, 0.10);
        assert_eq!(stolen, 10);
        assert_eq!(victim.waifame, 40);
        assert!(victim.waifame >= 0);
    }

    #[test]
    fn steal_fine_floors_at_zero() {
        let mut thief = rich_account(4);
        let fine = apply_fine(&mut thief);
        assert_eq!(fine, 10);
        assert_eq!(thief.waifame, 0);

        let mut wealthy = rich_account(1000);
        assert_eq!(apply_fine(&mut wealthy), 200);
        assert_eq!(wealthy.waifame, 800);
    }

    #[test]
    fn steal_rejects_poor_targets_and_cooldown() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut thief = rich_account(100);
        let mut victim = rich_account(49);

        let err = attempt_steal(&mut thief, &mut victim, 5_000, &mut rng)
            .map(|_| ())
            .unwrap_err();
        assert_eq!(err, GameError::TargetTooPoor(STEAL_MIN_TARGET_BALANCE));
        // A rejected attempt does not start the cooldown.
        assert_eq!(thief.last_steal, 0);

        victim.waifame = 100;
        attempt_steal(&mut thief, &mut victim, 5_000, &mut rng).unwrap();
        let err = attempt_steal(&mut thief, &mut victim, 5_100, &mut rng)
            .map(|_| ())
            .unwrap_err();
        assert!(matches!(err, GameError::Cooldown(_)));
    }
}
